//! # Meal Period Clock
//!
//! Maps local wall-clock time to a meal period.
//!
//! ## Service Windows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   hour:  0    5         11         17                    24             │
//! │          ├────┼──────────┼──────────┼─────────────────────┤             │
//! │          │ Dinner │ Breakfast │  Lunch  │      Dinner      │             │
//! │          └────┴──────────┴──────────┴─────────────────────┘             │
//! │                                                                         │
//! │   [5,11)  → Breakfast                                                   │
//! │   [11,17) → Lunch                                                       │
//! │   [17,24) ∪ [0,5) → Dinner (the night shift window)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The windows are total over all 24 hours and non-overlapping, so every
//! scan gets exactly one period. `Snack` is never produced here.
//!
//! Note: a dinner scan at 23:50 and another at 00:10 fall on different
//! calendar days and therefore count as separate registrations, even though
//! they belong to the same night shift. This matches the production system's
//! observed behavior; see DESIGN.md.

use chrono::{NaiveDateTime, Timelike};

use crate::types::MealPeriod;

/// Hour at which breakfast service opens.
pub const BREAKFAST_OPENS: u32 = 5;
/// Hour at which lunch service opens (breakfast closes).
pub const LUNCH_OPENS: u32 = 11;
/// Hour at which dinner service opens (lunch closes).
pub const DINNER_OPENS: u32 = 17;

/// Returns the meal period in effect at the given local hour (0-23).
pub const fn meal_period_for_hour(hour: u32) -> MealPeriod {
    if hour >= BREAKFAST_OPENS && hour < LUNCH_OPENS {
        MealPeriod::Breakfast
    } else if hour >= LUNCH_OPENS && hour < DINNER_OPENS {
        MealPeriod::Lunch
    } else {
        MealPeriod::Dinner
    }
}

/// Returns the meal period in effect at the given local wall-clock time.
///
/// Pure and deterministic; callers supply `now` (production code passes
/// `Local::now().naive_local()`).
pub fn meal_period_at(now: NaiveDateTime) -> MealPeriod {
    meal_period_for_hour(now.hour())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 25)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_every_hour_has_exactly_one_period() {
        for hour in 0..24 {
            let period = meal_period_for_hour(hour);
            let expected = match hour {
                5..=10 => MealPeriod::Breakfast,
                11..=16 => MealPeriod::Lunch,
                _ => MealPeriod::Dinner,
            };
            assert_eq!(period, expected, "hour {hour}");
            assert_ne!(period, MealPeriod::Snack, "clock must never yield snack");
        }
    }

    #[test]
    fn test_exact_boundaries() {
        assert_eq!(meal_period_at(at(4, 59, 59)), MealPeriod::Dinner);
        assert_eq!(meal_period_at(at(5, 0, 0)), MealPeriod::Breakfast);
        assert_eq!(meal_period_at(at(10, 59, 59)), MealPeriod::Breakfast);
        assert_eq!(meal_period_at(at(11, 0, 0)), MealPeriod::Lunch);
        assert_eq!(meal_period_at(at(16, 59, 59)), MealPeriod::Lunch);
        assert_eq!(meal_period_at(at(17, 0, 0)), MealPeriod::Dinner);
        assert_eq!(meal_period_at(at(23, 59, 59)), MealPeriod::Dinner);
        assert_eq!(meal_period_at(at(0, 0, 0)), MealPeriod::Dinner);
    }
}
