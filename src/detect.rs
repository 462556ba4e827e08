//! Change detection
//!
//! Compares a batch of fresh results against the previously persisted
//! state and decides which of them are worth telling anyone about. Output
//! order follows input order.

use crate::model::{Availability, ScrapeResult};
use crate::storage::State;

/// Price differences at or below this are treated as equal
pub const PRICE_EPSILON: f64 = 0.01;

/// What kind of report a change record is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// URL was not in the prior state
    New,
    /// Price and/or availability moved
    Change,
}

/// One reportable difference between a result and the prior state
#[derive(Debug, Clone)]
pub struct ChangeRecord {
    pub kind: ChangeKind,
    pub result: ScrapeResult,
    pub prior_price: Option<f64>,
    pub prior_availability: Option<Availability>,
    pub price_changed: bool,
    pub availability_changed: bool,
}

/// Classifies each result against the prior state
///
/// Rules, per result:
/// - a URL absent from prior state always yields a `New` record, even when
///   the scrape errored and found no price
/// - a repeat URL whose result carries an error with neither confirmation
///   flag set is suppressed entirely; an inconclusive scrape with no
///   corroborating identity signal must not generate noise
/// - prices count as changed when both readings exist and differ by more
///   than [`PRICE_EPSILON`]
/// - availability counts as changed when the readings differ and neither
///   side is unknown; an unknown-to-anything transition carries no
///   information
pub fn detect_changes(results: &[ScrapeResult], prior: &State) -> Vec<ChangeRecord> {
    let mut changes = Vec::new();

    for result in results {
        let Some(old) = prior.get(&result.url) else {
            changes.push(ChangeRecord {
                kind: ChangeKind::New,
                result: result.clone(),
                prior_price: None,
                prior_availability: None,
                price_changed: false,
                availability_changed: false,
            });
            continue;
        };

        if result.error.is_some() && !result.variant_confirmed && !result.sku_confirmed {
            tracing::info!(
                "[{}] inconclusive scrape, suppressing: {}",
                result.name,
                result.error.as_deref().unwrap_or("")
            );
            continue;
        }

        let price_changed = match (old.price, result.price) {
            (Some(before), Some(after)) => (before - after).abs() > PRICE_EPSILON,
            _ => false,
        };
        let availability_changed = old.availability != result.availability
            && old.availability.is_known()
            && result.availability.is_known();

        if price_changed || availability_changed {
            changes.push(ChangeRecord {
                kind: ChangeKind::Change,
                result: result.clone(),
                prior_price: old.price,
                prior_availability: Some(old.availability),
                price_changed,
                availability_changed,
            });
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SiteConfig;
    use crate::scrape::strategy::StrategyKind;
    use crate::storage::StateEntry;
    use chrono::Utc;

    fn result(url: &str, price: Option<f64>, availability: Availability) -> ScrapeResult {
        let site = SiteConfig {
            url: url.to_string(),
            name: "Test Shop".to_string(),
            kind: StrategyKind::Generic,
            sku_hint: "RROFY08".to_string(),
        };
        let mut r = ScrapeResult::new(&site);
        r.price = price;
        r.availability = availability;
        r.variant_confirmed = true;
        r.sku_confirmed = true;
        r
    }

    fn state_with(url: &str, price: Option<f64>, availability: Availability) -> State {
        let mut state = State::default();
        state.set(
            url,
            StateEntry {
                price,
                availability,
                variant_confirmed: true,
                sku_confirmed: true,
                timestamp: Utc::now(),
                error: None,
            },
        );
        state
    }

    const URL: &str = "https://example.com/p";

    #[test]
    fn test_price_drop_produces_one_change() {
        let prior = state_with(URL, Some(2499.00), Availability::InStock);
        let batch = vec![result(URL, Some(2120.00), Availability::InStock)];

        let changes = detect_changes(&batch, &prior);
        assert_eq!(changes.len(), 1);
        let change = &changes[0];
        assert_eq!(change.kind, ChangeKind::Change);
        assert!(change.price_changed);
        assert!(!change.availability_changed);
        assert_eq!(change.prior_price, Some(2499.00));
    }

    #[test]
    fn test_identical_price_produces_nothing() {
        let prior = state_with(URL, Some(2499.00), Availability::InStock);
        let batch = vec![result(URL, Some(2499.00), Availability::InStock)];
        assert!(detect_changes(&batch, &prior).is_empty());
    }

    #[test]
    fn test_sub_epsilon_difference_is_not_a_change() {
        let prior = state_with(URL, Some(2499.00), Availability::InStock);
        let batch = vec![result(URL, Some(2499.005), Availability::InStock)];
        assert!(detect_changes(&batch, &prior).is_empty());
    }

    #[test]
    fn test_availability_flip_is_a_change() {
        let prior = state_with(URL, Some(2499.00), Availability::InStock);
        let batch = vec![result(URL, Some(2499.00), Availability::OutOfStock)];

        let changes = detect_changes(&batch, &prior);
        assert_eq!(changes.len(), 1);
        assert!(!changes[0].price_changed);
        assert!(changes[0].availability_changed);
        assert_eq!(changes[0].prior_availability, Some(Availability::InStock));
    }

    #[test]
    fn test_unknown_transitions_are_never_reported() {
        let prior = state_with(URL, Some(2499.00), Availability::Unknown);
        let batch = vec![result(URL, Some(2499.00), Availability::InStock)];
        assert!(detect_changes(&batch, &prior).is_empty());

        let prior = state_with(URL, Some(2499.00), Availability::InStock);
        let batch = vec![result(URL, Some(2499.00), Availability::Unknown)];
        assert!(detect_changes(&batch, &prior).is_empty());
    }

    #[test]
    fn test_missing_price_on_either_side_is_not_a_price_change() {
        let prior = state_with(URL, None, Availability::InStock);
        let batch = vec![result(URL, Some(2120.00), Availability::InStock)];
        assert!(detect_changes(&batch, &prior).is_empty());

        let prior = state_with(URL, Some(2120.00), Availability::InStock);
        let batch = vec![result(URL, None, Availability::InStock)];
        assert!(detect_changes(&batch, &prior).is_empty());
    }

    #[test]
    fn test_new_url_always_reported_even_with_error() {
        let prior = State::default();
        let mut r = result(URL, None, Availability::Unknown);
        r.error = Some("timeout".to_string());
        r.variant_confirmed = false;
        r.sku_confirmed = false;

        let changes = detect_changes(&[r], &prior);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::New);
        assert_eq!(changes[0].result.price, None);
    }

    #[test]
    fn test_repeat_url_with_unconfirmed_error_is_suppressed() {
        let prior = state_with(URL, Some(2499.00), Availability::InStock);
        let mut r = result(URL, None, Availability::Unknown);
        r.error = Some("timeout".to_string());
        r.variant_confirmed = false;
        r.sku_confirmed = false;

        assert!(detect_changes(&[r], &prior).is_empty());
    }

    #[test]
    fn test_confirmed_error_result_is_not_suppressed() {
        // The result carries an error, but the SKU was seen on the page,
        // so the reading is about our product and must go through
        let prior = state_with(URL, Some(2499.00), Availability::InStock);
        let mut r = result(URL, Some(2120.00), Availability::InStock);
        r.error = Some("HTTP 503".to_string());
        r.variant_confirmed = false;
        r.sku_confirmed = true;

        let changes = detect_changes(&[r], &prior);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::Change);
        assert!(changes[0].price_changed);
    }

    #[test]
    fn test_variant_confirmed_error_result_is_not_suppressed() {
        let prior = state_with(URL, Some(2499.00), Availability::InStock);
        let mut r = result(URL, Some(2120.00), Availability::InStock);
        r.error = Some("HTTP 503".to_string());
        r.variant_confirmed = true;
        r.sku_confirmed = false;

        let changes = detect_changes(&[r], &prior);
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn test_output_preserves_input_order() {
        let prior = State::default();
        let batch = vec![
            result("https://a.example/p", Some(100.0), Availability::InStock),
            result("https://b.example/p", Some(200.0), Availability::InStock),
            result("https://c.example/p", Some(300.0), Availability::InStock),
        ];

        let changes = detect_changes(&batch, &prior);
        let urls: Vec<&str> = changes.iter().map(|c| c.result.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://a.example/p",
                "https://b.example/p",
                "https://c.example/p"
            ]
        );
    }
}
