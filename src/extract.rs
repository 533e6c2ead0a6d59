//! Offer extraction from listing-page markup.
//!
//! Every field lookup goes through one declarative selector schema, so a
//! markup change on the source site is a rule edit, not a new code path.
//! Extraction has no side effects on its input; re-running it over the
//! same markup restarts the sequence and yields identical results.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{CollectionError, Result};
use crate::models::{ListingSummary, OfferRecord, RowDiagnostic};

lazy_static! {
    /// Numeric token inside a price string: digits with optional group
    /// separators and decimal part, e.g. "1,234.56" in "$1,234.56 USD".
    static ref PRICE_TOKEN: Regex = Regex::new(r"\d[\d,]*(?:\.\d+)?").unwrap();
}

/// Listing table selectors; absence of the table is fatal for the page.
const TABLE_SELECTORS: [&str; 2] = ["table.offers", "#offers_table"];
/// Offer rows within the listing table.
const ROW_SELECTOR: &str = "tr.offer";

/// Selectors for the page-reported summary region.
const SUMMARY_VALUE_SELECTORS: [&str; 2] = ["#collection_value span.js-price", "td.total span.js-price"];
const SUMMARY_COUNT_SELECTORS: [&str; 2] = ["#collection_count", "span.card-count"];

/// What a field rule captures from its matched element.
#[derive(Debug, Clone, Copy)]
enum Capture {
    Text,
    Href,
}

/// One field-selector rule: primary selector, fallback selector, and the
/// substitute used when neither matches (`None` marks the field mandatory,
/// failing the row instead of defaulting).
struct FieldRule {
    field: &'static str,
    primary: &'static str,
    fallback: &'static str,
    capture: Capture,
    default: Option<&'static str>,
}

const NAME_RULE: FieldRule = FieldRule {
    field: "name",
    primary: "p.title a",
    fallback: "td.title a",
    capture: Capture::Text,
    default: None,
};

const GRADING_RULE: FieldRule = FieldRule {
    field: "grading",
    primary: "td.includes",
    fallback: "span.grade",
    capture: Capture::Text,
    default: Some("Ungraded"),
};

const PRICE_RULE: FieldRule = FieldRule {
    field: "price",
    primary: "span.js-price",
    fallback: "td.price",
    capture: Capture::Text,
    default: None,
};

const DETAIL_RULE: FieldRule = FieldRule {
    field: "detail",
    primary: "p.title a",
    fallback: "a[href]",
    capture: Capture::Href,
    default: Some(""),
};

impl FieldRule {
    /// Runs the rule against one row: primary selector, then fallback,
    /// then the rule's default.
    fn apply(&self, row: &ElementRef) -> Option<String> {
        for sel in [self.primary, self.fallback] {
            if let Ok(selector) = Selector::parse(sel) {
                if let Some(element) = row.select(&selector).next() {
                    let value = match self.capture {
                        Capture::Text => collapse_text(&element),
                        Capture::Href => element
                            .value()
                            .attr("href")
                            .unwrap_or_default()
                            .to_string(),
                    };
                    if !value.is_empty() {
                        return Some(value);
                    }
                }
            }
        }
        self.default.map(str::to_string)
    }
}

/// Element text with runs of whitespace collapsed to single spaces.
fn collapse_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// First non-empty text match among `selectors`, searched document-wide.
fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    for sel in selectors {
        if let Ok(selector) = Selector::parse(sel) {
            if let Some(element) = document.select(&selector).next() {
                let text = collapse_text(&element);
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
    }
    None
}

/// Strips currency glyphs and group separators from a price string and
/// parses the remaining decimal amount.
pub fn parse_price_text(raw: &str) -> Option<f64> {
    let token = PRICE_TOKEN.find(raw)?;
    token.as_str().replace(',', "").parse::<f64>().ok()
}

/// Result of extracting one listing page.
#[derive(Debug)]
pub struct Extraction {
    pub offers: Vec<OfferRecord>,
    pub diagnostics: Vec<RowDiagnostic>,
    /// Page-reported totals; `None` degrades the snapshot's totals without
    /// touching the card list.
    pub summary: Option<ListingSummary>,
}

/// Extracts all offer rows and the summary region from listing markup.
///
/// A missing listing table is fatal. A row missing a mandatory field, or
/// with unparseable price text, is skipped with a diagnostic and
/// extraction continues with the next row.
pub fn extract_listing(html: &str) -> Result<Extraction> {
    let document = Html::parse_document(html);

    let table = TABLE_SELECTORS
        .iter()
        .find_map(|sel| {
            Selector::parse(sel)
                .ok()
                .and_then(|selector| document.select(&selector).next())
        })
        .ok_or(CollectionError::TableNotFound)?;

    let mut offers = Vec::new();
    let mut diagnostics = Vec::new();

    if let Ok(rows) = Selector::parse(ROW_SELECTOR) {
        for (index, row) in table.select(&rows).enumerate() {
            match extract_row(&row, index) {
                Ok(offer) => offers.push(offer),
                Err(diagnostic) => {
                    log::warn!("Skipping offer row {}: {}", diagnostic.row, diagnostic.message);
                    diagnostics.push(diagnostic);
                }
            }
        }
    }

    let summary = parse_summary(&document);
    if summary.is_none() {
        log::warn!("Summary region not parseable; totals will be absent");
    }

    Ok(Extraction {
        offers,
        diagnostics,
        summary,
    })
}

/// Extracts one offer row via the field-rule schema.
fn extract_row(row: &ElementRef, index: usize) -> std::result::Result<OfferRecord, RowDiagnostic> {
    let raw_name = NAME_RULE.apply(row).ok_or_else(|| RowDiagnostic {
        row: index,
        field: NAME_RULE.field,
        message: "card name element not found".to_string(),
    })?;

    let raw_price_usd = PRICE_RULE.apply(row).ok_or_else(|| RowDiagnostic {
        row: index,
        field: PRICE_RULE.field,
        message: "price element not found".to_string(),
    })?;

    if parse_price_text(&raw_price_usd).is_none() {
        return Err(RowDiagnostic {
            row: index,
            field: PRICE_RULE.field,
            message: format!("unparseable price text: {:?}", raw_price_usd),
        });
    }

    // Defaulted rules always yield a value.
    let raw_grading = GRADING_RULE.apply(row).unwrap_or_default();
    let detail_ref = DETAIL_RULE.apply(row).filter(|href| !href.is_empty());

    Ok(OfferRecord {
        raw_name,
        raw_grading,
        raw_price_usd,
        detail_ref,
    })
}

/// Parses the page-reported total value and card count. Both parts must
/// parse; otherwise the whole summary is absent.
fn parse_summary(document: &Html) -> Option<ListingSummary> {
    let total_text = first_text(document, &SUMMARY_VALUE_SELECTORS)?;
    let total_value_usd = parse_price_text(&total_text)?;

    let count_text = first_text(document, &SUMMARY_COUNT_SELECTORS)?;
    let card_count = PRICE_TOKEN
        .find(&count_text)?
        .as_str()
        .replace(',', "")
        .parse::<u32>()
        .ok()?;

    Some(ListingSummary {
        total_value_usd,
        card_count,
    })
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
