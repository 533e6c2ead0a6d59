//! Collection Sync - Trading Card Collection Pipeline
//!
//! Scrapes a seller's public listing page, merges per-offer rows into
//! card-level entities with multiple grading tiers, converts prices into
//! additional currencies through a persisted rate cache, and produces an
//! immutable snapshot suitable for display.

pub mod aggregate;
pub mod assemble;
pub mod config;
pub mod convert;
pub mod error;
pub mod extract;
pub mod images;
pub mod models;
pub mod pipeline;
pub mod rates;

// Re-export commonly used items
pub use aggregate::aggregate;
pub use assemble::assemble;
pub use config::Config;
pub use convert::convert;
pub use error::{CollectionError, Result};
pub use extract::{extract_listing, parse_price_text, Extraction};
pub use images::ImageResolver;
pub use models::{
    CardEntity, CollectionSnapshot, GradingPrice, ListingSummary, OfferRecord, RowDiagnostic,
};
pub use pipeline::{run_once, CollectionPipeline};
pub use rates::{ExchangeRate, RateCache, RateProvider};

/// User-Agent header sent with every outbound request.
pub(crate) const USER_AGENT: &str = "CollectionSync/0.1";
