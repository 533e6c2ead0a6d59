//! High-resolution image lookup against card detail pages.
//!
//! An external collaborator from the pipeline's point of view: given a
//! detail-page reference it returns a best-effort image URL or nothing.
//! Every failure here is soft - the card renders with a placeholder
//! downstream, never an error.

use scraper::{Html, Selector};

/// Semantic selectors tried before the content-type heuristic.
const IMAGE_SELECTORS: [&str; 3] = ["img.product-image", "#product_image img", ".cover img"];
/// `src` substrings that mark a JPEG image element.
const JPEG_MARKERS: [&str; 2] = [".jpg", ".jpeg"];

/// Resolves detail-page references to image URLs.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    client: reqwest::Client,
    base_url: String,
}

impl ImageResolver {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Best-effort image URL for a detail-page reference.
    pub async fn resolve(&self, detail_ref: &str) -> Option<String> {
        let url = if detail_ref.starts_with("http") {
            detail_ref.to_string()
        } else {
            format!("{}{}", self.base_url, detail_ref)
        };
        log::debug!("Resolving image via {}", url);

        let response = match self
            .client
            .get(&url)
            .header("User-Agent", crate::USER_AGENT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Detail page fetch failed for {}: {}", url, e);
                return None;
            }
        };

        if !response.status().is_success() {
            log::warn!("Detail page {} returned HTTP {}", url, response.status());
            return None;
        }

        let html = match response.text().await {
            Ok(html) => html,
            Err(e) => {
                log::warn!("Failed to read detail page {}: {}", url, e);
                return None;
            }
        };

        self.find_image(&html)
    }

    /// Locates the image element: semantic selectors first, then any
    /// `img` whose `src` looks like a JPEG.
    fn find_image(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);

        for sel in IMAGE_SELECTORS {
            if let Ok(selector) = Selector::parse(sel) {
                if let Some(src) = document
                    .select(&selector)
                    .next()
                    .and_then(|element| element.value().attr("src"))
                {
                    return Some(self.absolutize(src));
                }
            }
        }

        if let Ok(selector) = Selector::parse("img[src]") {
            for element in document.select(&selector) {
                if let Some(src) = element.value().attr("src") {
                    let lower = src.to_lowercase();
                    if JPEG_MARKERS.iter().any(|marker| lower.contains(marker)) {
                        return Some(self.absolutize(src));
                    }
                }
            }
        }

        None
    }

    fn absolutize(&self, src: &str) -> String {
        if src.starts_with("http") {
            src.to_string()
        } else if src.starts_with("//") {
            format!("https:{}", src)
        } else if src.starts_with('/') {
            format!("{}{}", self.base_url, src)
        } else {
            src.to_string()
        }
    }
}

#[cfg(test)]
#[path = "images_tests.rs"]
mod tests;
