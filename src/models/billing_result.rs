//! Billing result models.
//!
//! This module contains the three output relations of a run (per-block
//! detail, period totals, discrepancies), the collaborator payout relation,
//! and the audit types that explain each computed amount.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Provenance, ProvidedValues};

/// A single step in the audit trace recording a tariff decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number within the block.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The policy section the rule comes from (e.g. "alpitour/base").
    pub policy_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during a run.
///
/// Warnings describe rows that were excluded or rules that fell back; they
/// never stop the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// A block with every derived time and money field.
///
/// Component amounts are pre-holiday and rounded to cents; `total_amount` is
/// the holiday-adjusted subtotal rounded once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedBlock {
    /// Service date.
    pub date: NaiveDate,
    /// Airport code.
    pub location: String,
    /// Sub-operator, when present.
    pub secondary_operator_id: Option<String>,
    /// Assistant who worked the block, when known.
    pub assistant: Option<String>,
    /// Shift text after forward fill.
    pub shift_text: String,
    /// Normalized shift or placeholder label.
    pub shift_label: String,
    /// Start of the billed interval.
    pub start_datetime: Option<NaiveDateTime>,
    /// End of the billed interval.
    pub end_datetime: Option<NaiveDateTime>,
    /// Shift duration in minutes, `end_datetime - start_datetime`.
    pub duration_minutes: i64,
    /// Minutes billed: up to the nominal end, plus billed overtime.
    #[serde(default)]
    pub billed_minutes: i64,
    /// Overtime was suppressed by a "no departure" marker.
    pub no_departure: bool,
    /// The holiday uplift applied.
    pub holiday: bool,
    /// Departure chosen as the overtime anchor.
    pub anchor_departure: Option<NaiveDateTime>,
    /// Catalog service the base amount was priced as.
    pub service: Option<String>,
    /// Base amount.
    pub base_amount: Decimal,
    /// Overtime minutes before rounding.
    pub overtime_minutes_raw: i64,
    /// Overtime minutes billed.
    pub overtime_minutes: i64,
    /// Overtime amount.
    pub overtime_amount: Decimal,
    /// Night minutes before rounding.
    pub night_minutes_raw: i64,
    /// Night minutes billed.
    pub night_minutes: i64,
    /// Night surcharge amount.
    pub night_amount: Decimal,
    /// Ancillary services amount (boarding cards).
    pub ancillary_amount: Decimal,
    /// Sum of the components before the holiday uplift.
    pub subtotal: Decimal,
    /// Final amount for the block.
    pub total_amount: Decimal,
    /// Set when the block could not be priced; all amounts are then zero.
    pub error: Option<String>,
    /// Non-fatal notes, e.g. overtime degraded to zero.
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Values the source already carried for the block.
    #[serde(default)]
    pub provided: ProvidedValues,
    /// Provenance of the first row of the block.
    pub provenance: Provenance,
    /// Number of rows merged into the block.
    pub row_count: usize,
    /// Ordered explanation of every amount.
    #[serde(default)]
    pub audit_steps: Vec<AuditStep>,
}

/// Which slice of the month a total covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    /// Days 1 to 15.
    FirstHalf,
    /// Days 16 to the end of the month.
    SecondHalf,
    /// Every block of the run.
    WholePeriod,
}

impl std::fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeriodKind::FirstHalf => write!(f, "1-15"),
            PeriodKind::SecondHalf => write!(f, "16-31"),
            PeriodKind::WholePeriod => write!(f, "MONTH"),
        }
    }
}

/// Summed amounts and minutes for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTotal {
    /// Partner the blocks were billed to.
    pub partner_id: String,
    /// Sub-operator, when the run mixed more than one.
    pub secondary_operator_id: Option<String>,
    /// Year and month ("2025-03") for half-month rows.
    pub month: Option<String>,
    /// The slice covered.
    pub period: PeriodKind,
    /// Number of blocks summed.
    pub block_count: usize,
    /// Sum of base amounts.
    pub base_amount: Decimal,
    /// Sum of billed overtime minutes.
    pub overtime_minutes: i64,
    /// Sum of overtime amounts.
    pub overtime_amount: Decimal,
    /// Sum of billed night minutes.
    pub night_minutes: i64,
    /// Sum of night amounts.
    pub night_amount: Decimal,
    /// Sum of ancillary amounts.
    pub ancillary_amount: Decimal,
    /// Sum of block totals.
    pub total_amount: Decimal,
}

/// Computed against provided value for one quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityDelta<T> {
    /// Value computed by the engine.
    pub computed: T,
    /// Value found in the source.
    pub provided: T,
    /// `computed - provided`.
    pub delta: T,
}

/// A block whose computed values disagree with the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscrepancyRecord {
    /// Service date.
    pub date: NaiveDate,
    /// Airport code.
    pub location: String,
    /// Sub-operator, when present.
    pub secondary_operator_id: Option<String>,
    /// Normalized shift or placeholder label.
    pub shift_label: String,
    /// Overtime minutes comparison, when the source gave one.
    pub overtime_minutes: Option<QuantityDelta<i64>>,
    /// Night minutes comparison, when the source gave one.
    pub night_minutes: Option<QuantityDelta<i64>>,
    /// Total amount comparison, when the source gave one.
    pub total_amount: Option<QuantityDelta<Decimal>>,
    /// Provenance of the first row of the block.
    pub provenance: Provenance,
}

/// What a collaborator is owed for one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorPayout {
    /// Collaborator name as written on the schedule.
    pub assistant: String,
    /// Name of the tariff that matched, or "default".
    pub tariff_name: String,
    /// Service date.
    pub date: NaiveDate,
    /// Airport code.
    pub location: String,
    /// Net base amount.
    pub base_amount: Decimal,
    /// Net overtime amount.
    pub overtime_amount: Decimal,
    /// Net night amount.
    pub night_amount: Decimal,
    /// Gross total, holiday included.
    pub gross_total: Decimal,
    /// Net total after the tax regime.
    pub net_total: Decimal,
    /// Provenance of the first row of the block.
    pub provenance: Provenance,
}

/// Counters describing a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Rows received across all sheets.
    pub rows_received: usize,
    /// Rows excluded for missing date, location or shift.
    pub rows_skipped: usize,
    /// Blocks produced.
    pub blocks: usize,
    /// Blocks that could not be priced.
    pub error_blocks: usize,
    /// Wall-clock duration of the run in microseconds.
    pub duration_us: u64,
}

/// Everything a run hands to the reporting layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingOutput {
    /// Partner the run was billed to.
    pub partner_id: String,
    /// One record per block, in reporting order.
    pub details: Vec<ComputedBlock>,
    /// Half-month and whole-period totals.
    pub period_totals: Vec<PeriodTotal>,
    /// Blocks disagreeing with provided values.
    pub discrepancies: Vec<DiscrepancyRecord>,
    /// Per-block collaborator payouts.
    #[serde(default)]
    pub collaborator_payouts: Vec<CollaboratorPayout>,
    /// Run counters.
    pub summary: RunSummary,
    /// Rows excluded and rules that fell back.
    #[serde(default)]
    pub warnings: Vec<AuditWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_kind_serializes_snake_case() {
        let json = serde_json::to_string(&PeriodKind::FirstHalf).unwrap();
        assert_eq!(json, "\"first_half\"");
        let json = serde_json::to_string(&PeriodKind::WholePeriod).unwrap();
        assert_eq!(json, "\"whole_period\"");
    }

    #[test]
    fn test_period_kind_display() {
        assert_eq!(PeriodKind::FirstHalf.to_string(), "1-15");
        assert_eq!(PeriodKind::SecondHalf.to_string(), "16-31");
        assert_eq!(PeriodKind::WholePeriod.to_string(), "MONTH");
    }

    #[test]
    fn test_period_kind_orders_halves_before_whole() {
        assert!(PeriodKind::FirstHalf < PeriodKind::SecondHalf);
        assert!(PeriodKind::SecondHalf < PeriodKind::WholePeriod);
    }
}
