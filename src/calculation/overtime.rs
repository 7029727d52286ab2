//! Overtime calculation.
//!
//! Overtime is the stretch between a nominal end (the reference) and a
//! departure chosen by the partner's anchor rule, plus any post-departure
//! grace. It is never negative, and a block carrying the "no departure"
//! marker earns none.

use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{AnchorRule, OvertimeReference, OvertimeRule};
use crate::models::{AuditStep, Block};

/// Warning attached when no departure could anchor overtime.
pub const NO_ANCHOR_WARNING: &str = "no departure time available, overtime set to zero";

/// Warning attached when the nominal end could not be determined.
pub const NO_REFERENCE_WARNING: &str = "no reference time for overtime, overtime set to zero";

/// The result of computing overtime for a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeResult {
    /// Departure the overtime was measured to.
    pub anchor: Option<NaiveDateTime>,
    /// Nominal end the overtime was measured from; the block end when the
    /// reference could not be resolved.
    pub nominal_end: Option<NaiveDateTime>,
    /// Minutes before rounding, clamped at zero.
    pub minutes_raw: i64,
    /// Minutes billed.
    pub minutes: i64,
    /// Amount billed, unrounded.
    pub amount: Decimal,
    /// Why overtime degraded to zero, if it did.
    pub warning: Option<String>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Chooses the departure overtime is measured to.
///
/// `end` is the block's anchored end, used by the rules that prefer
/// departures after it. With `scheduled_fallback`, scheduled departures are
/// tried under the same rule when no actual departure qualifies.
///
/// # Example
///
/// ```
/// use shift_billing_engine::calculation::select_anchor;
/// use shift_billing_engine::config::AnchorRule;
/// use chrono::NaiveDateTime;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
/// let end = Some(at("2025-03-04 11:00"));
/// let actual = [at("2025-03-04 10:40"), at("2025-03-04 10:50")];
///
/// let anchor = select_anchor(AnchorRule::AfterEndElseLatest, false, end, &actual, &[]);
/// assert_eq!(anchor, Some(at("2025-03-04 10:50")));
///
/// let anchor = select_anchor(AnchorRule::LatestActualAfterEnd, false, end, &actual, &[]);
/// assert_eq!(anchor, None);
/// ```
pub fn select_anchor(
    rule: AnchorRule,
    scheduled_fallback: bool,
    end: Option<NaiveDateTime>,
    actual: &[NaiveDateTime],
    scheduled: &[NaiveDateTime],
) -> Option<NaiveDateTime> {
    let after_end = |times: &[NaiveDateTime]| -> Option<NaiveDateTime> {
        let end = end?;
        times.iter().filter(|&&t| t > end).max().copied()
    };
    let latest = |times: &[NaiveDateTime]| times.iter().max().copied();
    let fallback = |pick: Option<NaiveDateTime>| {
        if scheduled_fallback { pick } else { None }
    };

    match rule {
        AnchorRule::LatestActual => latest(actual).or_else(|| fallback(latest(scheduled))),
        AnchorRule::LatestActualAfterEnd => {
            after_end(actual).or_else(|| fallback(latest(scheduled)))
        }
        AnchorRule::AfterEndElseLatest => after_end(actual)
            .or_else(|| latest(actual))
            .or_else(|| fallback(after_end(scheduled).or_else(|| latest(scheduled)))),
        AnchorRule::FirstActual => actual
            .first()
            .copied()
            .or_else(|| fallback(scheduled.first().copied())),
    }
}

/// Resolves the nominal end overtime is measured from.
pub fn resolve_reference(reference: &OvertimeReference, block: &Block) -> Option<NaiveDateTime> {
    match reference {
        OvertimeReference::ShiftEnd => block.end_datetime,
        OvertimeReference::StartPlus { minutes } => {
            block.start_datetime.map(|start| start + Duration::minutes(*minutes))
        }
        OvertimeReference::FirstScheduled => block.scheduled_departures.first().copied(),
    }
}

/// Computes a block's overtime.
///
/// The anchor departure plus the grace period is measured against the
/// reference end; the difference is clamped at zero and rounded per the
/// rule. A no-departure marker forces zero. Missing anchor or reference data
/// degrades to zero with a warning instead of failing.
///
/// # Arguments
///
/// * `block` - The block to price
/// * `rule` - The partner's overtime rule
/// * `policy_ref` - The policy section recorded on the audit step
/// * `step_number` - The step number for audit trail sequencing
///
/// # Returns
///
/// Returns an `OvertimeResult` with raw and billed minutes, the unrounded
/// amount, the chosen anchor, the nominal end and any warning.
pub fn calculate_overtime(
    block: &Block,
    rule: &OvertimeRule,
    policy_ref: &str,
    step_number: u32,
) -> OvertimeResult {
    let anchor = select_anchor(
        rule.anchor,
        rule.scheduled_fallback,
        block.end_datetime,
        &block.actual_departures,
        &block.scheduled_departures,
    );
    let reference = resolve_reference(&rule.reference, block);
    let nominal_end = reference.or(block.end_datetime);
    let no_departure_data = block.actual_departures.is_empty()
        && (!rule.scheduled_fallback || block.scheduled_departures.is_empty());

    let (minutes_raw, warning, reasoning) = if block.no_departure {
        (0, None, "No-departure marker suppresses overtime".to_string())
    } else {
        match (anchor, reference) {
            (Some(anchor), Some(reference)) => {
                let covered_until = anchor + Duration::minutes(rule.grace_minutes);
                let raw = (covered_until - reference).num_minutes().max(0);
                let reasoning = if raw > 0 {
                    format!(
                        "Departure {} + {} min grace ends {} min after {}",
                        anchor.format("%H:%M"),
                        rule.grace_minutes,
                        raw,
                        reference.format("%H:%M")
                    )
                } else {
                    format!(
                        "Departure {} + {} min grace is within the shift ending {}",
                        anchor.format("%H:%M"),
                        rule.grace_minutes,
                        reference.format("%H:%M")
                    )
                };
                (raw, None, reasoning)
            }
            (None, _) if no_departure_data => {
                (0, Some(NO_ANCHOR_WARNING.to_string()), NO_ANCHOR_WARNING.to_string())
            }
            (None, _) => (0, None, "No departure qualifies under the anchor rule".to_string()),
            (_, None) => (
                0,
                Some(NO_REFERENCE_WARNING.to_string()),
                NO_REFERENCE_WARNING.to_string(),
            ),
        }
    };

    let minutes = rule.rounding.apply(minutes_raw).max(0);
    let amount = Decimal::from(minutes) * rule.rate_per_hour / Decimal::from(60);

    OvertimeResult {
        anchor,
        nominal_end,
        minutes_raw,
        minutes,
        amount,
        warning,
        audit_step: AuditStep {
            step_number,
            rule_id: "overtime".to_string(),
            rule_name: "Overtime".to_string(),
            policy_ref: policy_ref.to_string(),
            input: serde_json::json!({
                "anchor_rule": rule.anchor,
                "anchor": anchor.map(|a| a.to_string()),
                "reference": reference.map(|r| r.to_string()),
                "grace_minutes": rule.grace_minutes,
                "no_departure": block.no_departure,
                "rate_per_hour": rule.rate_per_hour.to_string(),
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
