//! Ancillary services billed alongside a block.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::BoardingCardRule;
use crate::models::AuditStep;

/// The result of pricing boarding cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardingCardResult {
    /// Passengers billed.
    pub passengers: u32,
    /// Rate applied per passenger.
    pub rate: Decimal,
    /// Amount, unrounded.
    pub amount: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Prices boarding cards for a block's passenger count.
///
/// One rate applies to every passenger: the lower one up to the threshold,
/// the higher one once the count exceeds it. No count means no cards.
///
/// # Example
///
/// ```
/// use shift_billing_engine::calculation::calculate_boarding_cards;
/// use shift_billing_engine::config::BoardingCardRule;
/// use rust_decimal::Decimal;
///
/// let rule = BoardingCardRule {
///     threshold: 20,
///     rate_up_to_threshold: Decimal::new(18, 2),
///     rate_above_threshold: Decimal::new(25, 2),
/// };
/// let result = calculate_boarding_cards(&rule, Some(30), "rusconi/ancillary", 4);
/// assert_eq!(result.amount, Decimal::new(750, 2));
/// ```
pub fn calculate_boarding_cards(
    rule: &BoardingCardRule,
    passenger_count: Option<u32>,
    policy_ref: &str,
    step_number: u32,
) -> BoardingCardResult {
    let passengers = passenger_count.unwrap_or(0);
    let rate = if passengers > rule.threshold {
        rule.rate_above_threshold
    } else {
        rule.rate_up_to_threshold
    };
    let amount = Decimal::from(passengers) * rate;

    let reasoning = if passengers == 0 {
        "No passengers recorded, no boarding cards".to_string()
    } else {
        format!("{} passengers at {} = {}", passengers, rate, amount)
    };

    BoardingCardResult {
        passengers,
        rate,
        amount,
        audit_step: AuditStep {
            step_number,
            rule_id: "boarding_cards".to_string(),
            rule_name: "Boarding Cards".to_string(),
            policy_ref: policy_ref.to_string(),
            input: serde_json::json!({
                "passenger_count": passenger_count,
                "threshold": rule.threshold,
            }),
            output: serde_json::json!({
                "rate": rate.to_string(),
                "amount": amount.to_string(),
            }),
            reasoning,
        },
    }
}
