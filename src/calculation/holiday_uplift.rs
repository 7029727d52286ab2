//! Holiday uplift and final block total.
//!
//! The multiplier is applied once to the unrounded subtotal and only the
//! result is rounded, so a 100.00 subtotal at +20% is exactly 120.00.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::HolidayRule;
use crate::models::AuditStep;

use super::rounding::round_money;

/// Pre-holiday component amounts of a block, unrounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentAmounts {
    /// Base amount.
    pub base: Decimal,
    /// Overtime amount.
    pub overtime: Decimal,
    /// Night surcharge.
    pub night: Decimal,
    /// Ancillary services.
    pub ancillary: Decimal,
}

impl ComponentAmounts {
    /// Sum of all components.
    pub fn subtotal(&self) -> Decimal {
        self.base + self.overtime + self.night + self.ancillary
    }
}

/// The result of applying the holiday rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayUpliftResult {
    /// Sum of components before the uplift, unrounded.
    pub subtotal: Decimal,
    /// Final amount, rounded to cents.
    pub total: Decimal,
    /// Whether the multiplier was applied.
    pub applied: bool,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Applies the holiday multiplier to a block's components.
///
/// When the rule excludes night, the night amount is added after the
/// multiplier rather than uplifted with the rest.
///
/// # Arguments
///
/// * `rule` - The partner's holiday rule
/// * `holiday` - Whether the block falls on a holiday
/// * `components` - The unrounded component amounts
/// * `policy_ref` - The policy section recorded on the audit step
/// * `step_number` - The step number for audit trail sequencing
///
/// # Returns
///
/// Returns a `HolidayUpliftResult` whose total is rounded once, after the
/// multiplier.
///
/// # Example
///
/// ```
/// use shift_billing_engine::calculation::{ComponentAmounts, apply_holiday_uplift};
/// use shift_billing_engine::config::HolidayRule;
/// use rust_decimal::Decimal;
///
/// let rule = HolidayRule {
///     multiplier: Decimal::new(120, 2),
///     include_night: true,
///     use_calendar: true,
///     use_row_hint: true,
/// };
/// let components = ComponentAmounts { base: Decimal::new(100, 0), ..Default::default() };
/// let result = apply_holiday_uplift(&rule, true, components, "alpitour/holiday", 5);
/// assert_eq!(result.total, Decimal::new(12000, 2));
/// ```
pub fn apply_holiday_uplift(
    rule: &HolidayRule,
    holiday: bool,
    components: ComponentAmounts,
    policy_ref: &str,
    step_number: u32,
) -> HolidayUpliftResult {
    let subtotal = components.subtotal();
    let (total, reasoning) = if !holiday {
        (round_money(subtotal), "Not a holiday, no uplift".to_string())
    } else if rule.include_night {
        (
            round_money(subtotal * rule.multiplier),
            format!("Holiday: subtotal x {}", rule.multiplier),
        )
    } else {
        let uplifted = (subtotal - components.night) * rule.multiplier + components.night;
        (
            round_money(uplifted),
            format!("Holiday: subtotal without night x {}, night added after", rule.multiplier),
        )
    };

    HolidayUpliftResult {
        subtotal,
        total,
        applied: holiday,
        audit_step: AuditStep {
            step_number,
            rule_id: "holiday_uplift".to_string(),
            rule_name: "Holiday Uplift".to_string(),
            policy_ref: policy_ref.to_string(),
            input: serde_json::json!({
                "holiday": holiday,
                "subtotal": subtotal.round_dp(4).to_string(),
                "multiplier": rule.multiplier.to_string(),
                "include_night": rule.include_night,
            }),
            output: serde_json::json!({
                "total": total.to_string(),
            }),
            reasoning,
        },
    }
}
