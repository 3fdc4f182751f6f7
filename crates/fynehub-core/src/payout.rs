//! Payout computation
//!
//! Pure functions; the selected payout is fixed at approval time and never
//! recomputed when view counts change later.

use fynehub_common::types::RewardTier;
use rust_decimal::{Decimal, RoundingStrategy};

/// Select the applicable rate for a tracked view count.
///
/// Tiers are evaluated highest-threshold-first: the greatest `min_views`
/// not exceeding `tracked_views` wins. Below every tier (or with no tiers)
/// the base rate applies. Tier order in the input does not matter.
pub fn select_rate(base_rate: Decimal, tiers: &[RewardTier], tracked_views: i64) -> Decimal {
    tiers
        .iter()
        .filter(|tier| tier.min_views <= tracked_views)
        .max_by_key(|tier| tier.min_views)
        .map(|tier| tier.rate)
        .unwrap_or(base_rate)
}

/// Compute the payout for a tracked view count at the given rate.
///
/// `rate` is per `rate_unit_views` views (typically per 1000); the result
/// is rounded to 2 decimal places, half away from zero.
pub fn compute_payout(rate: Decimal, tracked_views: i64, rate_unit_views: i64) -> Decimal {
    if rate_unit_views <= 0 {
        return Decimal::ZERO;
    }

    (rate * Decimal::from(tracked_views) / Decimal::from(rate_unit_views))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn tiers() -> Vec<RewardTier> {
        vec![
            RewardTier {
                min_views: 10_000,
                rate: dec("3.00"),
            },
            RewardTier {
                min_views: 50_000,
                rate: dec("5.00"),
            },
        ]
    }

    #[test]
    fn test_base_rate_below_every_tier() {
        assert_eq!(select_rate(dec("1.50"), &tiers(), 9_999), dec("1.50"));
    }

    #[test]
    fn test_highest_qualifying_tier_selected() {
        assert_eq!(select_rate(dec("1.50"), &tiers(), 10_000), dec("3.00"));
        assert_eq!(select_rate(dec("1.50"), &tiers(), 49_999), dec("3.00"));
        assert_eq!(select_rate(dec("1.50"), &tiers(), 50_000), dec("5.00"));
        assert_eq!(select_rate(dec("1.50"), &tiers(), 1_000_000), dec("5.00"));
    }

    #[test]
    fn test_tier_order_is_irrelevant() {
        let mut reversed = tiers();
        reversed.reverse();
        assert_eq!(select_rate(dec("1.50"), &reversed, 60_000), dec("5.00"));
    }

    #[test]
    fn test_no_tiers_uses_base_rate() {
        assert_eq!(select_rate(dec("1.50"), &[], 1_000_000), dec("1.50"));
    }

    #[test]
    fn test_payout_per_thousand_views() {
        // 15000 views at $3.00 per 1000 views
        assert_eq!(compute_payout(dec("3.00"), 15_000, 1000), dec("45.00"));
    }

    #[test]
    fn test_payout_rounds_to_currency_precision() {
        // 1234 views at $1.50 per 1000 = 1.851 -> 1.85
        assert_eq!(compute_payout(dec("1.50"), 1_234, 1000), dec("1.85"));
        // 1235 views at $1.50 per 1000 = 1.8525 -> 1.85
        assert_eq!(compute_payout(dec("1.50"), 1_235, 1000), dec("1.85"));
        // 333 views at $1.50 per 1000 = 0.4995 -> 0.50
        assert_eq!(compute_payout(dec("1.50"), 333, 1000), dec("0.50"));
    }

    #[test]
    fn test_payout_with_degenerate_unit() {
        assert_eq!(compute_payout(dec("1.50"), 1000, 0), Decimal::ZERO);
    }

    #[test]
    fn test_spec_scenario() {
        // base $1.50/1000, tier [(10000, $3.00)], 15000 tracked views
        let tiers = vec![RewardTier {
            min_views: 10_000,
            rate: dec("3.00"),
        }];
        let rate = select_rate(dec("1.50"), &tiers, 15_000);
        assert_eq!(compute_payout(rate, 15_000, 1000), dec("45.00"));
    }
}
