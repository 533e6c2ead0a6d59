//! Persisted, time-bounded cache of currency conversion rates.
//!
//! One JSON file keyed by currency pair. A missing, unreadable or corrupt
//! file is a cold start, never an error. Writes go through a temp-file
//! rename so a concurrent reader never observes a half-written cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rates::provider::{fetch_rates, RateProvider};

/// Currency pairs the pipeline needs quotes for.
pub const REQUIRED_PAIRS: [(&str, &str); 2] = [("USD", "AUD"), ("USD", "JPY")];

/// A single cached conversion rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub value: f64,
    pub fetched_at: DateTime<Utc>,
}

/// Persistent rate cache keyed by currency pair.
///
/// The cache never fabricates a rate: when every provider fails, existing
/// entries stay in place however stale, and `age` exposes how stale.
#[derive(Debug)]
pub struct RateCache {
    rates: HashMap<String, ExchangeRate>,
    ttl: Duration,
    path: PathBuf,
}

impl RateCache {
    /// Load the cache from disk; missing or corrupt state starts empty.
    pub fn load(path: &Path, ttl: Duration) -> Self {
        let rates = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<HashMap<String, ExchangeRate>>(&content) {
                Ok(rates) => {
                    log::info!("Loaded rate cache with {} entries", rates.len());
                    rates
                }
                Err(e) => {
                    log::warn!("Failed to parse rate cache, starting cold: {}", e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No rate cache at {}, starting cold", path.display());
                HashMap::new()
            }
            Err(e) => {
                log::warn!("Failed to read rate cache, starting cold: {}", e);
                HashMap::new()
            }
        };

        Self {
            rates,
            ttl,
            path: path.to_path_buf(),
        }
    }

    /// Persist the cache: write a temp file, then rename over the old one.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.rates)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;

        log::debug!("Saved rate cache with {} entries", self.rates.len());
        Ok(())
    }

    fn key(base: &str, quote: &str) -> String {
        format!("{}/{}", base, quote)
    }

    /// Cached rate for a pair, regardless of age. Whether stale data is
    /// usable is the caller's decision; `age` exposes the staleness.
    pub fn get(&self, base: &str, quote: &str) -> Option<f64> {
        self.rates.get(&Self::key(base, quote)).map(|rate| rate.value)
    }

    /// Age of the cached rate for a pair.
    pub fn age(&self, base: &str, quote: &str, now: DateTime<Utc>) -> Option<Duration> {
        self.rates
            .get(&Self::key(base, quote))
            .map(|rate| now - rate.fetched_at)
    }

    /// True when a cached rate exists and is within the TTL.
    pub fn is_fresh(&self, base: &str, quote: &str, now: DateTime<Utc>) -> bool {
        self.age(base, quote, now)
            .map(|age| age <= self.ttl)
            .unwrap_or(false)
    }

    /// True when any required pair is missing or past the TTL.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        REQUIRED_PAIRS
            .iter()
            .any(|(base, quote)| !self.is_fresh(base, quote, now))
    }

    /// Insert a rate. Non-positive values are rejected.
    pub fn insert(&mut self, base: &str, quote: &str, value: f64, fetched_at: DateTime<Utc>) {
        if value <= 0.0 {
            log::warn!("Ignoring non-positive rate {} for {}/{}", value, base, quote);
            return;
        }
        self.rates
            .insert(Self::key(base, quote), ExchangeRate { value, fetched_at });
    }

    /// Refresh from the provider chain. On success both required pairs get
    /// one shared `fetched_at` and the cache is persisted; on total
    /// failure existing entries stay untouched and `false` comes back.
    pub async fn refresh(
        &mut self,
        client: &reqwest::Client,
        providers: &[RateProvider],
    ) -> bool {
        match fetch_rates(client, providers).await {
            Some(quotes) => {
                let now = Utc::now();
                self.insert("USD", "AUD", quotes.aud, now);
                self.insert("USD", "JPY", quotes.jpy, now);
                if let Err(e) = self.save() {
                    log::warn!("Failed to persist rate cache: {}", e);
                }
                true
            }
            None => {
                log::warn!("All rate providers failed; keeping existing rates");
                false
            }
        }
    }

    /// Number of cached pairs.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
