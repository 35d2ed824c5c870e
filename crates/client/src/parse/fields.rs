//! Per-field extractors for a single result container.
//!
//! Each extractor looks for one value and returns `None` when it is absent.
//! None of them fail: a missing field never costs the rest of the record.

use std::sync::LazyLock;

use merinfo_core::Gender;
use regex::Regex;
use scraper::{ElementRef, Selector};
use url::Url;

static ADDRESS_SPANS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("address span").expect("invalid selector"));
static SPANS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").expect("invalid selector"));
static TEL_LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href^="tel:"]"#).expect("invalid selector"));
static PHONE_CANDIDATES: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span, a").expect("invalid selector"));
static TITLED_SPANS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span[data-original-title]").expect("invalid selector"));

static POSTCODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]{3}\s*[0-9]{2}\s+\w+").expect("invalid regex"));
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\+46|0)[0-9\s-]{5,14}[0-9]$").expect("invalid regex"));
static PERSONAL_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{8}|[0-9]{6})-").expect("invalid regex"));
static STATED_AGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([0-9]{1,3}) år\b").expect("invalid regex"));
static STREET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([^0-9]+)").expect("invalid regex"));

/// Concatenated text of an element, trimmed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

/// The link carrying the person's name.
///
/// Selectors are tried in order; within a selector the first link with any
/// alphanumeric text wins.
pub(crate) fn name_link<'a>(container: ElementRef<'a>, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|selector| {
        container
            .select(selector)
            .find(|link| link.text().any(|t| t.chars().any(char::is_alphanumeric)))
    })
}

pub(crate) fn name(link: ElementRef<'_>) -> Option<String> {
    non_empty(element_text(link))
}

/// Absolute profile URL from the name link's href.
pub(crate) fn profile_url(link: ElementRef<'_>, base_url: &Url) -> Option<String> {
    let href = link.value().attr("href")?.trim();
    if href.is_empty() {
        return None;
    }
    base_url.join(href).ok().map(|u| u.to_string())
}

fn address_lines(container: ElementRef<'_>) -> Vec<String> {
    container
        .select(&ADDRESS_SPANS)
        .map(element_text)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Address lines joined with `", "`, or a lone postcode line as fallback.
pub(crate) fn address(container: ElementRef<'_>) -> Option<String> {
    let lines = address_lines(container);
    if !lines.is_empty() {
        return Some(lines.join(", "));
    }

    container
        .select(&SPANS)
        .map(element_text)
        .find(|text| POSTCODE.is_match(text))
}

/// Leading non-digit part of the first address line, e.g. `Storgatan` from `Storgatan 1`.
pub(crate) fn street(container: ElementRef<'_>) -> Option<String> {
    let first = address_lines(container).into_iter().next()?;
    let street = STREET.captures(&first)?.get(1)?.as_str().trim().to_string();
    non_empty(street)
}

/// Phone number from a `tel:` link, or any span/link that looks like a Swedish number.
pub(crate) fn phone(container: ElementRef<'_>) -> Option<String> {
    if let Some(link) = container.select(&TEL_LINKS).next() {
        let text = element_text(link);
        if !text.is_empty() {
            return Some(text);
        }
        let href = link.value().attr("href").unwrap_or_default();
        if let Some(number) = non_empty(href.trim_start_matches("tel:").trim().to_string()) {
            return Some(number);
        }
    }

    container
        .select(&PHONE_CANDIDATES)
        .map(element_text)
        .find(|text| PHONE.is_match(text))
}

/// Text of the first span starting with a personal identity number date part.
pub(crate) fn personal_number(container: ElementRef<'_>) -> Option<String> {
    container
        .select(&SPANS)
        .map(element_text)
        .find(|text| PERSONAL_NUMBER.is_match(text))
}

/// Age as stated on the page (`45 år`), else derived from the personal number.
pub(crate) fn age(container: ElementRef<'_>, personal_number: Option<&str>, reference_year: i32) -> Option<u32> {
    let text = container.text().collect::<Vec<_>>().join(" ");
    if let Some(stated) = STATED_AGE.captures(&text).and_then(|c| c[1].parse::<u32>().ok()) {
        return Some(stated);
    }

    let year = birth_year(personal_number?, reference_year)?;
    u32::try_from(reference_year - year).ok()
}

/// Birth year from the date part of a personal identity number.
///
/// Eight digits carry the full year. Six digits carry two, mapped to the
/// current century when not after the reference year, else the previous one.
pub(crate) fn birth_year(personal_number: &str, reference_year: i32) -> Option<i32> {
    let digits = PERSONAL_NUMBER.captures(personal_number)?.get(1)?.as_str();

    let year = if digits.len() == 8 {
        digits[..4].parse::<i32>().ok()?
    } else {
        let two: i32 = digits[..2].parse().ok()?;
        let century = reference_year - reference_year % 100;
        if two <= reference_year % 100 { century + two } else { century - 100 + two }
    };

    (1900..=reference_year).contains(&year).then_some(year)
}

fn titles(container: ElementRef<'_>) -> impl Iterator<Item = String> + '_ {
    container
        .select(&TITLED_SPANS)
        .filter_map(|span| span.value().attr("data-original-title"))
        .map(str::to_lowercase)
}

pub(crate) fn gender(container: ElementRef<'_>) -> Option<Gender> {
    titles(container).find_map(|title| {
        if title.contains("är man") {
            Some(Gender::Male)
        } else if title.contains("är kvinna") {
            Some(Gender::Female)
        } else {
            None
        }
    })
}

pub(crate) fn has_company_roles(container: ElementRef<'_>) -> bool {
    titles(container).any(|title| title.contains("bolagsengagemang"))
}
