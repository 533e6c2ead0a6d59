//! External rate-quote providers.
//!
//! Providers are queried in order until one returns a complete AUD + JPY
//! set against USD. Malformed, partial, timed-out or failed responses all
//! fall through to the next provider; a timed-out call is treated the
//! same as a malformed one.

use serde_json::Value;

/// One rate-quote endpoint. The URL carries any API key.
#[derive(Debug, Clone, PartialEq)]
pub struct RateProvider {
    pub name: String,
    pub url: String,
}

/// A complete set of USD quotes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateQuotes {
    pub aud: f64,
    pub jpy: f64,
}

/// Queries providers in order; the first complete, parseable response
/// wins. Returns `None` when every provider is exhausted - the caller
/// decides what stale or absent rates mean.
pub async fn fetch_rates(
    client: &reqwest::Client,
    providers: &[RateProvider],
) -> Option<RateQuotes> {
    for provider in providers {
        log::info!("Fetching rates from {}", provider.name);
        match fetch_one(client, provider).await {
            Some(quotes) => {
                log::info!(
                    "Got rates from {}: AUD {} JPY {}",
                    provider.name,
                    quotes.aud,
                    quotes.jpy
                );
                return Some(quotes);
            }
            None => {
                log::warn!("Provider {} returned no usable rates, trying next", provider.name);
            }
        }
    }
    None
}

async fn fetch_one(client: &reqwest::Client, provider: &RateProvider) -> Option<RateQuotes> {
    let response = match client
        .get(&provider.url)
        .header("User-Agent", crate::USER_AGENT)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            log::warn!("Rate request to {} failed: {}", provider.name, e);
            return None;
        }
    };

    if !response.status().is_success() {
        log::warn!(
            "Rate provider {} returned HTTP {}",
            provider.name,
            response.status()
        );
        return None;
    }

    let body: Value = match response.json().await {
        Ok(body) => body,
        Err(e) => {
            log::warn!("Rate provider {} sent malformed JSON: {}", provider.name, e);
            return None;
        }
    };

    parse_quotes(&body)
}

/// Accepts the two common quote shapes:
/// `{"rates": {"AUD": x, "JPY": y}}` and
/// `{"quotes": {"USDAUD": x, "USDJPY": y}}`, values numeric or string.
/// A response missing either currency is partial and rejected whole.
fn parse_quotes(body: &Value) -> Option<RateQuotes> {
    let aud = quote_value(body, "AUD")?;
    let jpy = quote_value(body, "JPY")?;
    Some(RateQuotes { aud, jpy })
}

fn quote_value(body: &Value, currency: &str) -> Option<f64> {
    let value = body
        .get("rates")
        .and_then(|rates| rates.get(currency))
        .or_else(|| {
            body.get("quotes")
                .and_then(|quotes| quotes.get(format!("USD{}", currency).as_str()))
        })?;

    match value {
        Value::Number(number) => number.as_f64().filter(|v| *v > 0.0),
        Value::String(text) => text.parse::<f64>().ok().filter(|v| *v > 0.0),
        _ => None,
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
