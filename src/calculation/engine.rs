//! One billing run, end to end.
//!
//! Sheets are scanned strictly in input order (file, sheet, row): forward
//! fill and first-seen provenance both depend on it. Everything after
//! aggregation works on the consolidated blocks.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::{CollaboratorConfig, TariffPolicy};
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditWarning, BillingOutput, ComputedBlock, RunSummary, SourceSheet};

use super::block_aggregator::BlockAggregator;
use super::block_tariff::compute_block;
use super::collaborator::collaborator_payouts;
use super::forward_fill::forward_fill_sheet;
use super::holidays::HolidayCalendar;
use super::period_totals::calculate_period_totals;
use super::reconciliation::reconcile;
use super::row_normalizer::normalize_row;

fn block_warnings(block: &ComputedBlock) -> Vec<AuditWarning> {
    let at = format!(
        "{} {} '{}' ({}/{} row {})",
        block.date,
        block.location,
        block.shift_label,
        block.provenance.file_id,
        block.provenance.sheet_id,
        block.provenance.row_ordinal
    );
    let mut warnings = Vec::new();
    if let Some(error) = &block.error {
        warnings.push(AuditWarning {
            code: "BLOCK_UNPRICED".to_string(),
            message: format!("{}: {}", at, error),
            severity: "medium".to_string(),
        });
    }
    warnings.extend(block.warnings.iter().map(|w| AuditWarning {
        code: "OVERTIME_DEGRADED".to_string(),
        message: format!("{}: {}", at, w),
        severity: "low".to_string(),
    }));
    warnings
}

/// Runs the full pipeline for one partner.
///
/// Returns the per-block detail (sorted by date, location, then first-seen
/// order), half-month and whole-period totals, discrepancies against
/// provided values, and collaborator payouts. Rows lacking a date,
/// location or shift are skipped with a warning; blocks that cannot be
/// priced are reported with an error and zero amounts.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] when no sheets are given.
pub fn run_billing(
    sheets: &[SourceSheet],
    policy: &TariffPolicy,
    calendar: &HolidayCalendar,
    collaborators: &CollaboratorConfig,
) -> EngineResult<BillingOutput> {
    if sheets.is_empty() {
        return Err(EngineError::InvalidInput {
            message: "no sheets to process".to_string(),
        });
    }

    let started = Instant::now();
    let mut summary = RunSummary::default();
    let mut warnings = Vec::new();
    let mut aggregator = BlockAggregator::new(policy.grouping.clone());

    for sheet in sheets {
        for filled in forward_fill_sheet(&sheet.rows, policy.forward_fill.group_by_date) {
            summary.rows_received += 1;
            match normalize_row(filled.row, &filled.shift_text, policy, calendar) {
                Ok(row) => {
                    aggregator.add(filled.row, row);
                }
                Err(reason) => {
                    let provenance = &filled.row.provenance;
                    debug!(
                        file = %provenance.file_id,
                        sheet = %provenance.sheet_id,
                        row = provenance.row_ordinal,
                        reason = %reason,
                        "Row skipped"
                    );
                    summary.rows_skipped += 1;
                    warnings.push(AuditWarning {
                        code: reason.code().to_string(),
                        message: format!(
                            "{}/{} row {}: {}",
                            provenance.file_id, provenance.sheet_id, provenance.row_ordinal, reason
                        ),
                        severity: "low".to_string(),
                    });
                }
            }
        }
    }

    let details: Vec<ComputedBlock> = aggregator
        .into_blocks()
        .iter()
        .map(|block| compute_block(block, policy))
        .collect();

    for block in &details {
        warnings.extend(block_warnings(block));
    }

    summary.blocks = details.len();
    summary.error_blocks = details.iter().filter(|b| b.error.is_some()).count();
    if summary.error_blocks > 0 {
        warn!(
            partner = %policy.id(),
            error_blocks = summary.error_blocks,
            "Some blocks could not be priced"
        );
    }

    let period_totals = calculate_period_totals(policy.id(), &details);
    let discrepancies = reconcile(&details);
    let collaborator_payouts = collaborator_payouts(collaborators, &details);

    summary.duration_us = started.elapsed().as_micros() as u64;
    info!(
        partner = %policy.id(),
        rows = summary.rows_received,
        skipped = summary.rows_skipped,
        blocks = summary.blocks,
        discrepancies = discrepancies.len(),
        duration_us = summary.duration_us,
        "Billing run completed"
    );

    Ok(BillingOutput {
        partner_id: policy.id().to_string(),
        details,
        period_totals,
        discrepancies,
        collaborator_payouts,
        summary,
        warnings,
    })
}
