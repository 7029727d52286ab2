//! Comparison of computed values against values already in the source.
//!
//! Purely diagnostic: nothing here feeds back into pricing.

use rust_decimal::Decimal;

use crate::models::{ComputedBlock, DiscrepancyRecord, QuantityDelta};

fn compare<T>(computed: T, provided: Option<T>) -> Option<QuantityDelta<T>>
where
    T: Copy + std::ops::Sub<Output = T>,
{
    provided.map(|provided| QuantityDelta {
        computed,
        provided,
        delta: computed - provided,
    })
}

/// Builds the discrepancy record for one block, if it has one.
///
/// A record is produced only when the source carried at least one
/// comparable value and at least one comparison disagrees. Each quantity
/// with a provided counterpart is reported, including those that agree.
pub fn discrepancy_for(block: &ComputedBlock) -> Option<DiscrepancyRecord> {
    let provided = &block.provided;
    if !provided.any() {
        return None;
    }

    let overtime_minutes = compare(block.overtime_minutes, provided.overtime_minutes);
    let night_minutes = compare(block.night_minutes, provided.night_minutes);
    let total_amount = compare(block.total_amount, provided.amount);

    let disagrees = overtime_minutes.as_ref().is_some_and(|d| d.delta != 0)
        || night_minutes.as_ref().is_some_and(|d| d.delta != 0)
        || total_amount.as_ref().is_some_and(|d| d.delta != Decimal::ZERO);
    if !disagrees {
        return None;
    }

    Some(DiscrepancyRecord {
        date: block.date,
        location: block.location.clone(),
        secondary_operator_id: block.secondary_operator_id.clone(),
        shift_label: block.shift_label.clone(),
        overtime_minutes,
        night_minutes,
        total_amount,
        provenance: block.provenance.clone(),
    })
}

/// Reports every block that disagrees with its source, in detail order.
pub fn reconcile(blocks: &[ComputedBlock]) -> Vec<DiscrepancyRecord> {
    blocks.iter().filter_map(discrepancy_for).collect()
}
