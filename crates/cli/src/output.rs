//! Result rendering: plain text for terminals, JSON report for files and pipes.

use std::io::{self, Write};

use merinfo_core::{PersonRecord, Query};
use serde::Serialize;

const UNKNOWN: &str = "unknown";

/// Distinct values listed per hint line.
const MAX_HINT_VALUES: usize = 5;

/// JSON report of one search.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub query: &'a Query,
    pub count: usize,
    /// Wall time of the search, cache hits included.
    pub elapsed_ms: u64,
    pub results: &'a [PersonRecord],
    pub suggestions: Vec<String>,
}

impl<'a> Report<'a> {
    pub fn new(query: &'a Query, results: &'a [PersonRecord], elapsed_ms: u64) -> Self {
        Self { query, count: results.len(), elapsed_ms, results, suggestions: suggestions(results) }
    }
}

/// Hints for narrowing a search that matched several people.
///
/// Lists distinct streets and ages in result order. Empty for zero or one
/// result.
pub fn suggestions(records: &[PersonRecord]) -> Vec<String> {
    if records.len() <= 1 {
        return Vec::new();
    }

    let mut hints = Vec::new();

    let streets = distinct(records.iter().filter_map(|r| r.street.clone()));
    if !streets.is_empty() {
        hints.push(format!("street: {}", streets.join(", ")));
    }

    let ages = distinct(records.iter().filter_map(|r| r.age.map(|a| a.to_string())));
    if !ages.is_empty() {
        hints.push(format!("age: {}", ages.join(", ")));
    }

    hints
}

fn distinct(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
        if seen.len() == MAX_HINT_VALUES {
            break;
        }
    }
    seen
}

fn or_unknown(value: Option<&str>) -> &str {
    value.unwrap_or(UNKNOWN)
}

/// Human-readable listing.
pub fn write_text(out: &mut dyn Write, query: &Query, records: &[PersonRecord]) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(out, "No results for {query}.");
    }

    let noun = if records.len() == 1 { "result" } else { "results" };
    writeln!(out, "Found {} {noun} for {query}:", records.len())?;

    for (i, record) in records.iter().enumerate() {
        let age = record.age.map(|a| a.to_string());
        let gender = record.gender.map(|g| g.to_string());

        writeln!(out)?;
        writeln!(out, "{}. {}", i + 1, record.name)?;
        writeln!(out, "   Address:   {}", or_unknown(record.address.as_deref()))?;
        writeln!(out, "   Age:       {}", or_unknown(age.as_deref()))?;
        writeln!(out, "   Phone:     {}", or_unknown(record.phone.as_deref()))?;
        writeln!(out, "   Gender:    {}", or_unknown(gender.as_deref()))?;
        writeln!(out, "   Profile:   {}", or_unknown(record.profile_url.as_deref()))?;
        if record.has_company_roles {
            writeln!(out, "   Company roles: yes")?;
        }
    }

    let hints = suggestions(records);
    if !hints.is_empty() {
        writeln!(out)?;
        writeln!(out, "Narrow your search by:")?;
        for hint in hints {
            writeln!(out, "- {hint}")?;
        }
    }

    Ok(())
}

/// Pretty-printed JSON report.
pub fn write_json(out: &mut dyn Write, report: &Report<'_>) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use merinfo_core::Gender;

    fn anna() -> Query {
        Query::new("Anna", "Svensson", "Stockholm").unwrap()
    }

    fn record(name: &str, street: Option<&str>, age: Option<u32>) -> PersonRecord {
        PersonRecord { street: street.map(String::from), age, ..PersonRecord::named(name) }
    }

    fn render(records: &[PersonRecord]) -> String {
        let mut buf = Vec::new();
        write_text(&mut buf, &anna(), records).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_text_no_results() {
        assert_eq!(render(&[]), "No results for Anna Svensson in Stockholm.\n");
    }

    #[test]
    fn test_text_missing_fields_print_unknown() {
        let text = render(&[PersonRecord::named("Anna Svensson")]);
        assert!(text.starts_with("Found 1 result for Anna Svensson in Stockholm:"));
        assert!(text.contains("1. Anna Svensson"));
        assert!(text.contains("Address:   unknown"));
        assert!(text.contains("Age:       unknown"));
        assert!(text.contains("Phone:     unknown"));
        assert!(!text.contains("Narrow your search"));
        assert!(!text.contains("Company roles"));
    }

    #[test]
    fn test_text_full_record() {
        let full = PersonRecord {
            address: Some("Storgatan 12, 114 51 Stockholm".into()),
            age: Some(40),
            phone: Some("08-123 456 78".into()),
            gender: Some(Gender::Female),
            has_company_roles: true,
            ..PersonRecord::named("Anna Svensson")
        };
        let text = render(&[full]);
        assert!(text.contains("Address:   Storgatan 12, 114 51 Stockholm"));
        assert!(text.contains("Age:       40"));
        assert!(text.contains("Phone:     08-123 456 78"));
        assert!(text.contains("Gender:    female"));
        assert!(text.contains("Company roles: yes"));
    }

    #[test]
    fn test_text_lists_narrowing_hints() {
        let text = render(&[
            record("Anna Svensson", Some("Storgatan"), Some(40)),
            record("Anna Maria Svensson", Some("Kungsgatan"), Some(63)),
        ]);
        assert!(text.starts_with("Found 2 results"));
        assert!(text.contains("Narrow your search by:\n- street: Storgatan, Kungsgatan\n- age: 40, 63\n"));
    }

    #[test]
    fn test_suggestions_distinct_and_capped() {
        let records: Vec<_> = (0..8)
            .map(|i| record("Anna", Some(&format!("Gata{}", i % 7)), Some(40)))
            .collect();
        let hints = suggestions(&records);
        assert_eq!(hints, vec!["street: Gata0, Gata1, Gata2, Gata3, Gata4".to_string(), "age: 40".to_string()]);
    }

    #[test]
    fn test_suggestions_skip_missing_values() {
        let hints = suggestions(&[record("A", None, Some(30)), record("B", None, None)]);
        assert_eq!(hints, vec!["age: 30".to_string()]);
        assert!(suggestions(&[record("A", Some("Storgatan"), Some(30))]).is_empty());
    }

    #[test]
    fn test_json_report() {
        let query = anna();
        let records = vec![record("Anna Svensson", Some("Storgatan"), Some(40)), PersonRecord::named("Anna Lind")];
        let mut buf = Vec::new();
        write_json(&mut buf, &Report::new(&query, &records, 37)).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["query"]["first_name"], "Anna");
        assert_eq!(value["count"], 2);
        assert_eq!(value["elapsed_ms"], 37);
        assert_eq!(value["results"][0]["name"], "Anna Svensson");
        assert_eq!(value["results"][1]["age"], serde_json::Value::Null);
        assert_eq!(value["suggestions"][0], "street: Storgatan");
    }
}
