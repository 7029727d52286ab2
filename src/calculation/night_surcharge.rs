//! Night surcharge calculation.

use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{NightRate, NightRule, NightSpan};
use crate::models::{AuditStep, Block};

use super::interval::night_overlap_minutes;
use super::overtime::OvertimeResult;

/// The result of computing the night surcharge for a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightSurchargeResult {
    /// Night minutes before rounding.
    pub minutes_raw: i64,
    /// Night minutes billed.
    pub minutes: i64,
    /// Surcharge amount, unrounded.
    pub amount: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Intervals whose night minutes are counted, per the policy's span.
///
/// For [`NightSpan::BasePlusOvertime`] this is the shift up to its nominal
/// end plus the billed overtime stretch after it; for
/// [`NightSpan::StartToDeparture`] it runs from the start to the first
/// actual departure, or to the block end when there is none.
pub fn night_segments(
    block: &Block,
    span: NightSpan,
    overtime: &OvertimeResult,
) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    let Some(start) = block.start_datetime else {
        return Vec::new();
    };
    match span {
        NightSpan::BasePlusOvertime => {
            let Some(nominal_end) = overtime.nominal_end else {
                return Vec::new();
            };
            let mut segments = vec![(start, nominal_end)];
            if overtime.minutes > 0 && !block.no_departure {
                segments.push((nominal_end, nominal_end + Duration::minutes(overtime.minutes)));
            }
            segments
        }
        NightSpan::StartToDeparture => {
            let end = block.actual_departures.first().copied().or(block.end_datetime);
            end.map(|end| vec![(start, end)]).unwrap_or_default()
        }
    }
}

/// Computes a block's night surcharge.
///
/// Night minutes are counted over the segments of [`night_segments`]. The
/// proportional rate values a night hour as the hourly share of the base
/// times the surcharge percentage.
///
/// # Arguments
///
/// * `block` - The block to price
/// * `rule` - The partner's night rule
/// * `base_amount` - The block's base amount, used by proportional rates
/// * `overtime` - The overtime result, which bounds the counted span
/// * `policy_ref` - The policy section recorded on the audit step
/// * `step_number` - The step number for audit trail sequencing
///
/// # Returns
///
/// Returns a `NightSurchargeResult` with raw and billed night minutes and
/// the unrounded amount.
pub fn calculate_night_surcharge(
    block: &Block,
    rule: &NightRule,
    base_amount: Decimal,
    overtime: &OvertimeResult,
    policy_ref: &str,
    step_number: u32,
) -> NightSurchargeResult {
    let segments = night_segments(block, rule.span, overtime);
    let minutes_raw: i64 = segments
        .iter()
        .map(|(from, to)| night_overlap_minutes(*from, *to, rule.window.start, rule.window.end))
        .sum();
    let minutes = rule.rounding.apply(minutes_raw).max(0);
    let night_minutes = Decimal::from(minutes);
    let minutes_per_hour = Decimal::from(60);

    let (amount, rate_text) = match &rule.rate {
        NightRate::PerHour { default, by_location } => {
            let rate = by_location.get(block.location()).copied().unwrap_or(*default);
            (night_minutes * rate / minutes_per_hour, format!("{}/h", rate))
        }
        NightRate::Proportional { percent, base_hours } => {
            let (hourly, amount) = if base_hours.is_zero() {
                (Decimal::ZERO, Decimal::ZERO)
            } else {
                let hourly = base_amount / *base_hours;
                let amount = base_amount * night_minutes * *percent
                    / (*base_hours * minutes_per_hour);
                (hourly, amount)
            };
            (amount, format!("{} of {}/h", percent, hourly.round_dp(2)))
        }
    };

    let reasoning = if minutes > 0 {
        format!(
            "{} night minutes in {}-{} at {} = {}",
            minutes,
            rule.window.start.format("%H:%M"),
            rule.window.end.format("%H:%M"),
            rate_text,
            amount.round_dp(2)
        )
    } else {
        format!(
            "No minutes in the {}-{} night window",
            rule.window.start.format("%H:%M"),
            rule.window.end.format("%H:%M")
        )
    };

    NightSurchargeResult {
        minutes_raw,
        minutes,
        amount,
        audit_step: AuditStep {
            step_number,
            rule_id: "night_surcharge".to_string(),
            rule_name: "Night Surcharge".to_string(),
            policy_ref: policy_ref.to_string(),
            input: serde_json::json!({
                "segments": segments
                    .iter()
                    .map(|(from, to)| format!("{from} - {to}"))
                    .collect::<Vec<_>>(),
                "window_start": rule.window.start.format("%H:%M").to_string(),
                "window_end": rule.window.end.format("%H:%M").to_string(),
            }),
            output: serde_json::json!({
                "minutes_raw": minutes_raw,
                "minutes": minutes,
                "amount": amount.round_dp(2).to_string(),
            }),
            reasoning,
        },
    }
}
