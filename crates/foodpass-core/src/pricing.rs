//! # Pricing Calculator
//!
//! Computes the amount charged to a worker's employer for one consumption.
//!
//! ## The Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   enhanced flag set? ──yes──► rates.enhanced  (regardless of period)    │
//! │          │                                                              │
//! │          no                                                             │
//! │          ▼                                                              │
//! │   rates.rate_for(period)   breakfast / lunch / dinner / snack           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The snack rate is only reachable when the period is explicitly `Snack`,
//! which the clock never produces - it exists for manual/administrative
//! overrides outside the normal scan path.
//!
//! The cost is computed from the employer's *current* rate table and frozen
//! into the consumption record; later rate changes never rewrite history.

use crate::money::Money;
use crate::types::{MealPeriod, RateTable};

/// Returns the charge for one consumption.
pub const fn price(rates: &RateTable, period: MealPeriod, enhanced: bool) -> Money {
    if enhanced {
        rates.enhanced
    } else {
        rates.rate_for(period)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rates() -> RateTable {
        RateTable {
            breakfast: Money::from_pesos(3500),
            lunch: Money::from_pesos(4500),
            dinner: Money::from_pesos(4000),
            snack: Money::from_pesos(2000),
            enhanced: Money::from_pesos(5500),
        }
    }

    #[test]
    fn test_period_rates() {
        let r = rates();
        assert_eq!(price(&r, MealPeriod::Breakfast, false).pesos(), 3500);
        assert_eq!(price(&r, MealPeriod::Lunch, false).pesos(), 4500);
        assert_eq!(price(&r, MealPeriod::Dinner, false).pesos(), 4000);
        assert_eq!(price(&r, MealPeriod::Snack, false).pesos(), 2000);
    }

    #[test]
    fn test_enhanced_overrides_every_period() {
        let r = rates();
        for period in [
            MealPeriod::Breakfast,
            MealPeriod::Lunch,
            MealPeriod::Dinner,
            MealPeriod::Snack,
        ] {
            assert_eq!(price(&r, period, true), r.enhanced, "{period}");
        }
    }

    #[test]
    fn test_enhanced_wins_even_when_cheaper() {
        let mut r = rates();
        r.enhanced = Money::from_pesos(1000);
        assert_eq!(price(&r, MealPeriod::Lunch, true).pesos(), 1000);
    }
}
