use chrono::{DateTime, Utc};
use serde::Serialize;

/// One row of the source listing: a single card/grading/price combination.
/// Transient; consumed by the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferRecord {
    pub raw_name: String,
    pub raw_grading: String,
    pub raw_price_usd: String,
    pub detail_ref: Option<String>,
}

/// Price of one grading tier of a card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradingPrice {
    pub grading_label: String,
    pub amount_usd: f64,
    /// `None` when no rate was available at conversion time, never zero.
    pub amount_aud: Option<f64>,
    pub amount_jpy: Option<f64>,
    pub detail_ref: Option<String>,
}

/// A card with all its grading tiers.
///
/// Within a snapshot the canonical (trimmed, case-folded) name identifies
/// exactly one entity, and no two gradings share a label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardEntity {
    /// First-seen casing from the source; the display name.
    pub name: String,
    /// Detail-page reference of the first offer seen for this card.
    pub detail_ref: Option<String>,
    pub image_ref: Option<String>,
    /// Insertion order is first-seen order in the source.
    pub gradings: Vec<GradingPrice>,
}

impl CardEntity {
    /// Grouping key: trimmed, case-folded name.
    pub fn canonical_key(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

/// Page-reported totals from the listing's summary region.
///
/// The page's own total may include offers outside the visible table, so
/// it is never re-derived by summing grading prices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListingSummary {
    pub total_value_usd: f64,
    pub card_count: u32,
}

/// Diagnostic for a skipped or defective row, recorded alongside the data
/// instead of printed to a console.
#[derive(Debug, Clone, PartialEq)]
pub struct RowDiagnostic {
    pub row: usize,
    pub field: &'static str,
    pub message: String,
}

/// One complete, immutable result of a pipeline run. A new fetch produces
/// a wholly new snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionSnapshot {
    pub cards: Vec<CardEntity>,
    pub total_value_usd: Option<f64>,
    pub total_value_aud: Option<f64>,
    pub total_value_jpy: Option<f64>,
    pub card_count: Option<u32>,
    pub generated_at: DateTime<Utc>,
}
