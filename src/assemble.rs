//! Snapshot assembly: pricing entities and attaching collection totals.

use chrono::Utc;

use crate::convert::convert;
use crate::models::{CardEntity, CollectionSnapshot, GradingPrice, ListingSummary};

/// Builds the final snapshot from aggregated entities and current rates.
///
/// Totals are the page-reported figures, not a re-summation of grading
/// prices - the page's own total may include offers outside the visible
/// table. A missing summary degrades all totals and the count to `None`
/// while the card list stays fully populated.
pub fn assemble(
    entities: Vec<CardEntity>,
    rate_aud: Option<f64>,
    rate_jpy: Option<f64>,
    summary: Option<ListingSummary>,
) -> CollectionSnapshot {
    let cards = entities
        .into_iter()
        .map(|entity| price_entity(entity, rate_aud, rate_jpy))
        .collect();

    let (total_value_usd, total_value_aud, total_value_jpy, card_count) = match summary {
        Some(summary) => {
            let (aud, jpy) = convert(summary.total_value_usd, rate_aud, rate_jpy);
            (
                Some(summary.total_value_usd),
                aud,
                jpy,
                Some(summary.card_count),
            )
        }
        None => (None, None, None, None),
    };

    CollectionSnapshot {
        cards,
        total_value_usd,
        total_value_aud,
        total_value_jpy,
        card_count,
        generated_at: Utc::now(),
    }
}

/// Produces a new priced entity; the unpriced input is consumed, never
/// mutated in place.
fn price_entity(entity: CardEntity, rate_aud: Option<f64>, rate_jpy: Option<f64>) -> CardEntity {
    let gradings = entity
        .gradings
        .into_iter()
        .map(|grading| {
            let (amount_aud, amount_jpy) = convert(grading.amount_usd, rate_aud, rate_jpy);
            GradingPrice {
                amount_aud,
                amount_jpy,
                ..grading
            }
        })
        .collect();

    CardEntity { gradings, ..entity }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(name: &str, prices: &[(&str, f64)]) -> CardEntity {
        CardEntity {
            name: name.to_string(),
            detail_ref: None,
            image_ref: None,
            gradings: prices
                .iter()
                .map(|(label, amount)| GradingPrice {
                    grading_label: label.to_string(),
                    amount_usd: *amount,
                    amount_aud: None,
                    amount_jpy: None,
                    detail_ref: None,
                })
                .collect(),
        }
    }

    #[test]
    fn prices_every_grading() {
        let entities = vec![entity("Charizard", &[("PSA 10", 500.0), ("Ungraded", 50.0)])];
        let summary = Some(ListingSummary {
            total_value_usd: 550.0,
            card_count: 1,
        });

        let snapshot = assemble(entities, Some(1.5), Some(150.0), summary);

        let gradings = &snapshot.cards[0].gradings;
        assert_eq!(gradings[0].amount_aud, Some(750.0));
        assert_eq!(gradings[0].amount_jpy, Some(75000.0));
        assert_eq!(gradings[1].amount_aud, Some(75.0));
        assert_eq!(gradings[1].amount_jpy, Some(7500.0));
    }

    #[test]
    fn totals_come_from_summary_not_resummed() {
        // Page total deliberately differs from the sum of grading prices.
        let entities = vec![entity("Pikachu", &[("Ungraded", 10.0)])];
        let summary = Some(ListingSummary {
            total_value_usd: 999.0,
            card_count: 3,
        });

        let snapshot = assemble(entities, Some(2.0), None, summary);

        assert_eq!(snapshot.total_value_usd, Some(999.0));
        assert_eq!(snapshot.total_value_aud, Some(1998.0));
        assert_eq!(snapshot.total_value_jpy, None);
        assert_eq!(snapshot.card_count, Some(3));
    }

    #[test]
    fn missing_summary_degrades_totals_only() {
        let entities = vec![entity("Pikachu", &[("Ungraded", 10.0)])];

        let snapshot = assemble(entities, Some(1.5), Some(150.0), None);

        assert_eq!(snapshot.total_value_usd, None);
        assert_eq!(snapshot.total_value_aud, None);
        assert_eq!(snapshot.total_value_jpy, None);
        assert_eq!(snapshot.card_count, None);
        assert_eq!(snapshot.cards.len(), 1);
        assert_eq!(snapshot.cards[0].gradings[0].amount_aud, Some(15.0));
    }

    #[test]
    fn missing_rates_leave_usd_intact() {
        let entities = vec![entity("Mew", &[("PSA 9", 200.0)])];
        let summary = Some(ListingSummary {
            total_value_usd: 200.0,
            card_count: 1,
        });

        let snapshot = assemble(entities, None, None, summary);

        let grading = &snapshot.cards[0].gradings[0];
        assert_eq!(grading.amount_usd, 200.0);
        assert_eq!(grading.amount_aud, None);
        assert_eq!(grading.amount_jpy, None);
        assert_eq!(snapshot.total_value_usd, Some(200.0));
        assert_eq!(snapshot.total_value_aud, None);
    }

    #[test]
    fn generated_at_is_set_at_assembly() {
        let before = Utc::now();
        let snapshot = assemble(Vec::new(), None, None, None);
        let after = Utc::now();

        assert!(snapshot.generated_at >= before);
        assert!(snapshot.generated_at <= after);
    }
}
