//! Domain model: search queries, raw responses and parsed person records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A three-field people search.
///
/// Fields are trimmed on construction and must not be empty. The trimmed,
/// original-case values go into the request; [`Query::normalized`] gives the
/// case-folded form used for cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Query {
    first_name: String,
    last_name: String,
    city: String,
}

impl Query {
    /// Build a query, trimming each field.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if any field is empty after trimming.
    pub fn new(first_name: &str, last_name: &str, city: &str) -> Result<Self, Error> {
        Ok(Self {
            first_name: required("first_name", first_name)?,
            last_name: required("last_name", last_name)?,
            city: required("city", city)?,
        })
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// Lowercased fields with internal whitespace collapsed.
    pub fn normalized(&self) -> [String; 3] {
        [normalize(&self.first_name), normalize(&self.last_name), normalize(&self.city)]
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} in {}", self.first_name, self.last_name, self.city)
    }
}

fn required(field: &str, value: &str) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn normalize(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Unparsed search page for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawResponse {
    pub query: Query,
    /// URL the page was fetched from (after redirects)
    pub url: String,
    /// HTTP status code
    pub status: u16,
    pub html: String,
    pub fetched_at: DateTime<Utc>,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => f.write_str("male"),
            Gender::Female => f.write_str("female"),
        }
    }
}

/// One person extracted from a result page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    /// Never empty.
    pub name: String,
    pub address: Option<String>,
    pub age: Option<u32>,
    pub phone: Option<String>,
    pub profile_url: Option<String>,
    /// Street part of the first address line.
    pub street: Option<String>,
    /// Birth date part of the Swedish personal identity number, e.g. `19800101-`.
    pub personal_number: Option<String>,
    pub gender: Option<Gender>,
    /// Whether the listing marks the person as holding company roles.
    pub has_company_roles: bool,
}

impl PersonRecord {
    /// A record with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            age: None,
            phone: None,
            profile_url: None,
            street: None,
            personal_number: None,
            gender: None,
            has_company_roles: false,
        }
    }
}

/// Person records of one query, in page order.
pub type ResultSet = Vec<PersonRecord>;
