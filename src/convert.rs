//! USD to foreign-currency conversion.

/// Converts a USD amount with the given rates.
///
/// A missing rate yields `None` for that currency - absence of a rate is
/// data, not an error, and is never reported as zero.
pub fn convert(
    amount_usd: f64,
    rate_aud: Option<f64>,
    rate_jpy: Option<f64>,
) -> (Option<f64>, Option<f64>) {
    (
        rate_aud.map(|rate| amount_usd * rate),
        rate_jpy.map(|rate| amount_usd * rate),
    )
}
