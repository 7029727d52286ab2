//! Minute and money rounding.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// How raw minutes are snapped to a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Minutes are used as-is.
    #[default]
    None,
    /// Round down to the step.
    Floor,
    /// Round up to the step.
    Ceil,
    /// Round to the nearest step, ties to even.
    Nearest,
}

/// A rounding mode plus the step it rounds to.
///
/// A non-positive step disables rounding rather than dividing by zero.
///
/// # Example
///
/// ```
/// use shift_billing_engine::calculation::{RoundingMode, RoundingPolicy};
///
/// let policy = RoundingPolicy { mode: RoundingMode::Ceil, step_minutes: 5 };
/// assert_eq!(policy.apply(41), 45);
/// assert_eq!(policy.apply(45), 45);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingPolicy {
    /// Rounding mode.
    #[serde(default)]
    pub mode: RoundingMode,
    /// Step in minutes.
    #[serde(default = "default_step")]
    pub step_minutes: i64,
}

fn default_step() -> i64 {
    5
}

impl Default for RoundingPolicy {
    fn default() -> Self {
        Self {
            mode: RoundingMode::None,
            step_minutes: default_step(),
        }
    }
}

impl RoundingPolicy {
    /// Returns true when applying the policy can change a value.
    pub fn is_active(&self) -> bool {
        self.mode != RoundingMode::None && self.step_minutes > 0
    }

    /// Rounds `minutes` according to the policy.
    pub fn apply(&self, minutes: i64) -> i64 {
        if !self.is_active() {
            return minutes;
        }
        let step = self.step_minutes;
        match self.mode {
            RoundingMode::None => minutes,
            RoundingMode::Floor => minutes.div_euclid(step) * step,
            RoundingMode::Ceil => {
                let floor = minutes.div_euclid(step) * step;
                if floor == minutes { floor } else { floor + step }
            }
            RoundingMode::Nearest => {
                let units = (Decimal::from(minutes) / Decimal::from(step)).round();
                units.to_i64().map_or(minutes, |units| units * step)
            }
        }
    }
}

/// Rounds an amount to cents, halves away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(mode: RoundingMode, step_minutes: i64) -> RoundingPolicy {
        RoundingPolicy { mode, step_minutes }
    }

    #[test]
    fn test_none_leaves_minutes() {
        assert_eq!(policy(RoundingMode::None, 5).apply(43), 43);
    }

    #[test]
    fn test_floor_and_ceil() {
        assert_eq!(policy(RoundingMode::Floor, 5).apply(43), 40);
        assert_eq!(policy(RoundingMode::Ceil, 5).apply(43), 45);
        assert_eq!(policy(RoundingMode::Ceil, 5).apply(0), 0);
        assert_eq!(policy(RoundingMode::Ceil, 15).apply(1), 15);
    }

    #[test]
    fn test_nearest_ties_to_even() {
        assert_eq!(policy(RoundingMode::Nearest, 5).apply(42), 40);
        assert_eq!(policy(RoundingMode::Nearest, 5).apply(43), 45);
        // 12.5 units rounds to 12, 37.5 units rounds to 38
        assert_eq!(policy(RoundingMode::Nearest, 2).apply(25), 24);
        assert_eq!(policy(RoundingMode::Nearest, 2).apply(75), 76);
    }

    #[test]
    fn test_non_positive_step_disables_rounding() {
        assert_eq!(policy(RoundingMode::Ceil, 0).apply(43), 43);
        assert_eq!(policy(RoundingMode::Floor, -5).apply(43), 43);
        assert!(!policy(RoundingMode::Ceil, 0).is_active());
    }

    #[test]
    fn test_round_money_half_away_from_zero() {
        use std::str::FromStr;
        assert_eq!(round_money(Decimal::from_str("107.025").unwrap()), Decimal::from_str("107.03").unwrap());
        assert_eq!(round_money(Decimal::from_str("11.244").unwrap()), Decimal::from_str("11.24").unwrap());
        assert_eq!(round_money(Decimal::from_str("120").unwrap()), Decimal::from_str("120").unwrap());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let policy: RoundingPolicy = serde_yaml::from_str("mode: ceil").unwrap();
        assert_eq!(policy.mode, RoundingMode::Ceil);
        assert_eq!(policy.step_minutes, 5);
    }
}
