//! Person extraction from a search result page.
//!
//! ### Container location
//! - Configured container selectors are tried in order; the first one that
//!   matches anything defines the result blocks.
//! - No match is an empty result, not an error.
//!
//! ### Record building
//! - Every field has its own extractor in [`fields`] returning an `Option`.
//! - A block without a usable name is dropped.
//! - Text is trimmed and otherwise left as the page shows it.

mod fields;

use std::sync::LazyLock;

use chrono::{Datelike, Utc};
use merinfo_core::{ParseError, PersonRecord, ResultSet, SelectorConfig};
use scraper::{ElementRef, Html, Selector};
use url::Url;

static PERSON_LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="/person/"]"#).expect("invalid selector"));

/// Parser for result pages.
///
/// Selectors are compiled on every [`PersonParser::parse`] call, so a bad
/// configured selector surfaces as a `ParseError` for that page.
#[derive(Debug, Clone)]
pub struct PersonParser {
    selectors: SelectorConfig,
    base_url: Url,
    reference_year: i32,
}

impl PersonParser {
    /// Create a parser resolving profile links against `base_url`.
    pub fn new(selectors: SelectorConfig, base_url: Url) -> Self {
        Self { selectors, base_url, reference_year: Utc::now().year() }
    }

    /// Year ages are computed against (default: current UTC year).
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    /// Extract person records from a result page, in page order.
    pub fn parse(&self, html: &str) -> Result<ResultSet, ParseError> {
        let containers = compile(&self.selectors.containers)?;
        let name_links = compile(&self.selectors.name_links)?;

        let document = Html::parse_document(html);

        let Some((selector, blocks)) = self.selectors.containers.iter().zip(&containers).find_map(|(raw, selector)| {
            let blocks: Vec<ElementRef<'_>> = document.select(selector).collect();
            (!blocks.is_empty()).then_some((raw, blocks))
        }) else {
            if document.select(&PERSON_LINKS).next().is_some() {
                tracing::warn!("page has person links but no result container matched; the markup may have changed");
            } else {
                tracing::debug!("no result containers found");
            }
            return Ok(Vec::new());
        };

        tracing::debug!(selector = %selector, count = blocks.len(), "found result containers");

        let records: ResultSet = blocks
            .into_iter()
            .filter_map(|block| {
                let record = self.build_record(block, &name_links);
                if record.is_none() {
                    tracing::debug!("dropping result container without a name");
                }
                record
            })
            .collect();

        tracing::info!(count = records.len(), "extracted person records");

        Ok(records)
    }

    /// Compose the field extractors into one record.
    ///
    /// Returns None only when the name is missing or empty.
    fn build_record(&self, container: ElementRef<'_>, name_links: &[Selector]) -> Option<PersonRecord> {
        let link = fields::name_link(container, name_links)?;
        let name = fields::name(link)?;
        let personal_number = fields::personal_number(container);

        Some(PersonRecord {
            name,
            address: fields::address(container),
            age: fields::age(container, personal_number.as_deref(), self.reference_year),
            phone: fields::phone(container),
            profile_url: fields::profile_url(link, &self.base_url),
            street: fields::street(container),
            personal_number,
            gender: fields::gender(container),
            has_company_roles: fields::has_company_roles(container),
        })
    }
}

fn compile(selectors: &[String]) -> Result<Vec<Selector>, ParseError> {
    selectors
        .iter()
        .map(|raw| {
            Selector::parse(raw)
                .map_err(|e| ParseError::InvalidSelector { selector: raw.clone(), reason: e.to_string() })
        })
        .collect()
}
