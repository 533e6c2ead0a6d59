//! The extraction-aggregation-conversion pipeline.
//!
//! One logical run per invocation: fetch the listing, extract offers,
//! aggregate into entities, refresh rates when the cache demands it,
//! resolve images, assemble the snapshot. The rate cache is the only
//! state carried between runs; an external scheduler decides when to
//! invoke `run` again.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;

use crate::aggregate::aggregate;
use crate::assemble::assemble;
use crate::config::Config;
use crate::error::{CollectionError, Result};
use crate::extract::extract_listing;
use crate::images::ImageResolver;
use crate::models::{CardEntity, CollectionSnapshot};
use crate::rates::RateCache;

/// Concurrent detail-page fetches per run.
const MAX_CONCURRENT_IMAGE_FETCHES: usize = 5;

/// One pipeline instance per seller. Each `run` call produces a wholly
/// new snapshot; dropping the future mid-run discards in-flight results.
pub struct CollectionPipeline {
    config: Config,
    client: reqwest::Client,
    rate_cache: RateCache,
}

impl CollectionPipeline {
    /// Builds the HTTP client and loads the persisted rate cache.
    pub fn new(config: Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let rate_cache = RateCache::load(&config.cache_path, config.cache_ttl);

        Ok(Self {
            config,
            client,
            rate_cache,
        })
    }

    /// Runs one full pipeline pass.
    ///
    /// Fatal outcomes: listing fetch failure after retries, or a listing
    /// page without the offer table. Everything else degrades to null
    /// fields or skipped rows inside a still-usable snapshot.
    pub async fn run(&mut self) -> Result<CollectionSnapshot> {
        let html = self.fetch_listing().await?;

        let extraction = extract_listing(&html)?;
        log::info!(
            "Extracted {} offers ({} rows skipped)",
            extraction.offers.len(),
            extraction.diagnostics.len()
        );

        let (mut entities, _) = aggregate(&extraction.offers);
        log::info!("Aggregated into {} cards", entities.len());

        if self.rate_cache.needs_refresh(Utc::now()) {
            self.rate_cache
                .refresh(&self.client, &self.config.rate_providers)
                .await;
        } else {
            log::debug!("Rate cache fresh, skipping provider refresh");
        }
        let rate_aud = self.rate_cache.get("USD", "AUD");
        let rate_jpy = self.rate_cache.get("USD", "JPY");

        self.resolve_images(&mut entities).await;

        Ok(assemble(entities, rate_aud, rate_jpy, extraction.summary))
    }

    /// Fetches the listing page, retrying failed attempts up to the
    /// configured count before surfacing the last error.
    async fn fetch_listing(&self) -> Result<String> {
        let url = self.config.listing_request_url();
        let mut attempt = 0;

        loop {
            attempt += 1;
            log::info!("Fetching listing (attempt {}): {}", attempt, url);

            let error = match self
                .client
                .get(&url)
                .header("User-Agent", crate::USER_AGENT)
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => {
                    return Ok(response.text().await?);
                }
                Ok(response) => CollectionError::HttpStatus(response.status()),
                Err(e) => CollectionError::Network(e),
            };

            if attempt > self.config.listing_retries {
                return Err(error);
            }
            log::warn!("Listing fetch failed ({}), retrying", error);
        }
    }

    /// Resolves card images with bounded fan-out. Each entity resolves its
    /// first offer's detail reference at most once; results are collected
    /// per entity index, so the card order survives whatever order the
    /// fetches finish in.
    async fn resolve_images(&self, entities: &mut [CardEntity]) {
        let resolver = ImageResolver::new(self.client.clone(), &self.config.detail_base_url);
        let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_IMAGE_FETCHES));

        let mut handles = Vec::with_capacity(entities.len());
        for entity in entities.iter() {
            let detail_ref = entity.detail_ref.clone();
            let resolver = resolver.clone();
            let semaphore = Arc::clone(&semaphore);

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.ok()?;
                resolver.resolve(&detail_ref?).await
            }));
        }

        for (entity, handle) in entities.iter_mut().zip(handles) {
            entity.image_ref = handle.await.unwrap_or_else(|e| {
                log::warn!("Image resolution task failed: {}", e);
                None
            });
        }
    }
}

/// Convenience entry point: one pipeline run with the given config.
pub async fn run_once(config: Config) -> Result<CollectionSnapshot> {
    CollectionPipeline::new(config)?.run().await
}
