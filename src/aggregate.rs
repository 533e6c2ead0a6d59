//! Merging raw offers into card-level entities.

use std::collections::HashMap;

use crate::extract::parse_price_text;
use crate::models::{CardEntity, GradingPrice, OfferRecord, RowDiagnostic};

/// Groups offers into one entity per canonical name, in first-seen order.
///
/// The first offer for a name creates the entity and supplies its
/// detail-page reference; later offers append grading entries. A repeated
/// grading label on the same card replaces the earlier entry rather than
/// duplicating it - the source may re-list a grading with a corrected
/// price, and the last listing wins.
///
/// Entities come back unpriced: `amount_aud`/`amount_jpy` stay `None`
/// until assembly applies the current rates.
pub fn aggregate(offers: &[OfferRecord]) -> (Vec<CardEntity>, Vec<RowDiagnostic>) {
    let mut entities: Vec<CardEntity> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();
    let mut diagnostics = Vec::new();

    for (row, offer) in offers.iter().enumerate() {
        let amount_usd = match parse_price_text(&offer.raw_price_usd) {
            Some(amount) => amount,
            None => {
                let diagnostic = RowDiagnostic {
                    row,
                    field: "price",
                    message: format!("unparseable price text: {:?}", offer.raw_price_usd),
                };
                log::warn!("Skipping offer {}: {}", row, diagnostic.message);
                diagnostics.push(diagnostic);
                continue;
            }
        };

        let grading = GradingPrice {
            grading_label: offer.raw_grading.clone(),
            amount_usd,
            amount_aud: None,
            amount_jpy: None,
            detail_ref: offer.detail_ref.clone(),
        };

        let key = CardEntity::canonical_key(&offer.raw_name);
        match index_by_key.get(&key) {
            Some(&index) => {
                let entity = &mut entities[index];
                match entity
                    .gradings
                    .iter_mut()
                    .find(|existing| existing.grading_label == grading.grading_label)
                {
                    Some(existing) => *existing = grading,
                    None => entity.gradings.push(grading),
                }
            }
            None => {
                index_by_key.insert(key, entities.len());
                entities.push(CardEntity {
                    name: offer.raw_name.trim().to_string(),
                    detail_ref: offer.detail_ref.clone(),
                    image_ref: None,
                    gradings: vec![grading],
                });
            }
        }
    }

    (entities, diagnostics)
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod tests;
