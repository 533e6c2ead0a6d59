use std::path::PathBuf;
use std::time::Duration;

use crate::rates::RateProvider;

/// Pipeline configuration: endpoints, listing filters, rate providers,
/// cache location and TTL, request timeout.
#[derive(Debug, Clone)]
pub struct Config {
    /// Seller identifier in the marketplace.
    pub seller_id: String,
    /// Listing endpoint; seller and filter query parameters are appended
    /// per request.
    pub listing_url: String,
    /// Base URL that detail-page references are resolved against.
    pub detail_base_url: String,
    /// Sort order for the listing request.
    pub sort: String,
    /// Category filter for the listing request.
    pub category: String,
    /// Status filter for the listing request.
    pub status: String,
    /// Rate-quote providers, tried in order.
    pub rate_providers: Vec<RateProvider>,
    /// Location of the persisted rate cache.
    pub cache_path: PathBuf,
    /// Rates older than this are refreshed before conversion.
    pub cache_ttl: chrono::Duration,
    /// Timeout applied to every external call.
    pub request_timeout: Duration,
    /// Extra attempts for the listing fetch before giving up.
    pub listing_retries: u32,
}

/// Returns the default cache path: ~/.cache/collection_sync/rate_cache.json
fn default_cache_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("collection_sync")
        .join("rate_cache.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seller_id: String::new(),
            listing_url: "https://www.pricecharting.com/offers".to_string(),
            detail_base_url: "https://www.pricecharting.com".to_string(),
            sort: "name".to_string(),
            category: "all".to_string(),
            status: "collection".to_string(),
            rate_providers: vec![
                RateProvider {
                    name: "open-er-api".to_string(),
                    url: "https://open.er-api.com/v6/latest/USD".to_string(),
                },
                RateProvider {
                    name: "frankfurter".to_string(),
                    url: "https://api.frankfurter.app/latest?from=USD&to=AUD,JPY".to_string(),
                },
            ],
            cache_path: default_cache_path(),
            cache_ttl: chrono::Duration::hours(12),
            request_timeout: Duration::from_secs(30),
            listing_retries: 2,
        }
    }
}

impl Config {
    /// Default configuration for the given seller.
    pub fn for_seller(seller_id: &str) -> Self {
        Self {
            seller_id: seller_id.to_string(),
            ..Self::default()
        }
    }

    /// Default configuration with environment overrides applied.
    ///
    /// Recognized variables: `COLLECTION_SELLER`, `COLLECTION_LISTING_URL`,
    /// `COLLECTION_DETAIL_URL`, `COLLECTION_CACHE_PATH` and
    /// `COLLECTION_RATE_PROVIDERS` (comma-separated endpoint URLs, keys
    /// included).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(seller) = std::env::var("COLLECTION_SELLER") {
            config.seller_id = seller;
        }
        if let Ok(url) = std::env::var("COLLECTION_LISTING_URL") {
            config.listing_url = url;
        }
        if let Ok(url) = std::env::var("COLLECTION_DETAIL_URL") {
            config.detail_base_url = url;
        }
        if let Ok(path) = std::env::var("COLLECTION_CACHE_PATH") {
            config.cache_path = PathBuf::from(path);
        }
        if let Ok(list) = std::env::var("COLLECTION_RATE_PROVIDERS") {
            let providers: Vec<RateProvider> = list
                .split(',')
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .enumerate()
                .map(|(i, url)| RateProvider {
                    name: format!("provider-{}", i + 1),
                    url: url.to_string(),
                })
                .collect();
            if !providers.is_empty() {
                config.rate_providers = providers;
            }
        }
        config
    }

    /// Full listing URL with seller and filter query parameters.
    pub fn listing_request_url(&self) -> String {
        format!(
            "{}?status={}&seller={}&sort={}&category={}&condition-id=all",
            self.listing_url,
            urlencoding::encode(&self.status),
            urlencoding::encode(&self.seller_id),
            urlencoding::encode(&self.sort),
            urlencoding::encode(&self.category),
        )
    }
}
