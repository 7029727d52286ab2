//! Half-month and whole-period totals.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use rust_decimal::Decimal;

use crate::models::{ComputedBlock, PeriodKind, PeriodTotal};

/// Day of month closing the first half.
pub const FIRST_HALF_LAST_DAY: u32 = 15;

/// Which half of its month a day falls in.
pub fn half_of_month(day: u32) -> PeriodKind {
    if day <= FIRST_HALF_LAST_DAY {
        PeriodKind::FirstHalf
    } else {
        PeriodKind::SecondHalf
    }
}

fn empty_total(
    partner_id: &str,
    secondary_operator_id: Option<String>,
    month: Option<String>,
    period: PeriodKind,
) -> PeriodTotal {
    PeriodTotal {
        partner_id: partner_id.to_string(),
        secondary_operator_id,
        month,
        period,
        block_count: 0,
        base_amount: Decimal::ZERO,
        overtime_minutes: 0,
        overtime_amount: Decimal::ZERO,
        night_minutes: 0,
        night_amount: Decimal::ZERO,
        ancillary_amount: Decimal::ZERO,
        total_amount: Decimal::ZERO,
    }
}

fn accumulate(total: &mut PeriodTotal, block: &ComputedBlock) {
    total.block_count += 1;
    total.base_amount += block.base_amount;
    total.overtime_minutes += block.overtime_minutes;
    total.overtime_amount += block.overtime_amount;
    total.night_minutes += block.night_minutes;
    total.night_amount += block.night_amount;
    total.ancillary_amount += block.ancillary_amount;
    total.total_amount += block.total_amount;
}

/// Sums computed blocks into period totals.
///
/// Emits one row per (month, half) that has blocks, followed by one
/// whole-period row. When the blocks carry more than one distinct
/// sub-operator, every row is additionally split by sub-operator. Sums are of
/// the already-rounded block amounts, so period rows add up to the detail.
pub fn calculate_period_totals(partner_id: &str, blocks: &[ComputedBlock]) -> Vec<PeriodTotal> {
    let operators: BTreeSet<Option<&str>> = blocks
        .iter()
        .map(|b| b.secondary_operator_id.as_deref())
        .collect();
    let split_by_operator = operators.len() > 1;

    let mut halves: BTreeMap<(Option<String>, String, PeriodKind), PeriodTotal> = BTreeMap::new();
    let mut wholes: BTreeMap<Option<String>, PeriodTotal> = BTreeMap::new();

    for block in blocks {
        let operator = if split_by_operator {
            block.secondary_operator_id.clone()
        } else {
            None
        };
        let month = block.date.format("%Y-%m").to_string();
        let half = half_of_month(block.date.day());

        let entry = halves
            .entry((operator.clone(), month.clone(), half))
            .or_insert_with(|| empty_total(partner_id, operator.clone(), Some(month), half));
        accumulate(entry, block);

        let whole = wholes
            .entry(operator.clone())
            .or_insert_with(|| empty_total(partner_id, operator, None, PeriodKind::WholePeriod));
        accumulate(whole, block);
    }

    let mut totals = Vec::with_capacity(halves.len() + wholes.len());
    for (operator, whole) in wholes {
        totals.extend(
            halves
                .iter()
                .filter(|((op, _, _), _)| *op == operator)
                .map(|(_, total)| total.clone()),
        );
        totals.push(whole);
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Provenance, ProvidedValues};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_block(date: &str, operator: Option<&str>, total: &str, overtime_minutes: i64) -> ComputedBlock {
        ComputedBlock {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            location: "BGY".to_string(),
            secondary_operator_id: operator.map(str::to_string),
            assistant: None,
            shift_text: String::new(),
            shift_label: String::new(),
            start_datetime: None,
            end_datetime: None,
            duration_minutes: 0,
            billed_minutes: 0,
            no_departure: false,
            holiday: false,
            anchor_departure: None,
            service: None,
            base_amount: dec(total),
            overtime_minutes_raw: overtime_minutes,
            overtime_minutes,
            overtime_amount: Decimal::ZERO,
            night_minutes_raw: 0,
            night_minutes: 0,
            night_amount: Decimal::ZERO,
            ancillary_amount: Decimal::ZERO,
            subtotal: dec(total),
            total_amount: dec(total),
            error: None,
            warnings: vec![],
            provided: ProvidedValues::default(),
            provenance: Provenance {
                file_id: "f".to_string(),
                sheet_id: "s".to_string(),
                row_ordinal: 0,
                global_ordinal: 0,
            },
            row_count: 1,
            audit_steps: vec![],
        }
    }

    #[test]
    fn test_half_of_month_boundary() {
        assert_eq!(half_of_month(15), PeriodKind::FirstHalf);
        assert_eq!(half_of_month(16), PeriodKind::SecondHalf);
    }

    #[test]
    fn test_halves_and_whole_period() {
        let blocks = vec![
            make_block("2025-03-02", None, "75.00", 10),
            make_block("2025-03-15", None, "90.00", 0),
            make_block("2025-03-16", None, "100.00", 5),
        ];
        let totals = calculate_period_totals("alpitour", &blocks);

        assert_eq!(totals.len(), 3);
        assert_eq!(totals[0].period, PeriodKind::FirstHalf);
        assert_eq!(totals[0].month.as_deref(), Some("2025-03"));
        assert_eq!(totals[0].block_count, 2);
        assert_eq!(totals[0].total_amount, dec("165.00"));
        assert_eq!(totals[0].overtime_minutes, 10);

        assert_eq!(totals[1].period, PeriodKind::SecondHalf);
        assert_eq!(totals[1].total_amount, dec("100.00"));

        assert_eq!(totals[2].period, PeriodKind::WholePeriod);
        assert_eq!(totals[2].month, None);
        assert_eq!(totals[2].block_count, 3);
        assert_eq!(totals[2].total_amount, dec("265.00"));
        assert_eq!(totals[2].overtime_minutes, 15);
    }

    #[test]
    fn test_single_operator_is_not_split() {
        let blocks = vec![
            make_block("2025-03-02", Some("OPA"), "75.00", 0),
            make_block("2025-03-20", Some("OPA"), "75.00", 0),
        ];
        let totals = calculate_period_totals("aliservice", &blocks);
        assert_eq!(totals.len(), 3);
        assert!(totals.iter().all(|t| t.secondary_operator_id.is_none()));
    }

    #[test]
    fn test_multiple_operators_split_every_row() {
        let blocks = vec![
            make_block("2025-03-02", Some("OPB"), "55.00", 0),
            make_block("2025-03-03", Some("OPA"), "65.00", 0),
            make_block("2025-03-20", Some("OPA"), "130.00", 0),
        ];
        let totals = calculate_period_totals("aliservice", &blocks);

        let labels: Vec<(Option<&str>, PeriodKind)> = totals
            .iter()
            .map(|t| (t.secondary_operator_id.as_deref(), t.period))
            .collect();
        assert_eq!(
            labels,
            vec![
                (Some("OPA"), PeriodKind::FirstHalf),
                (Some("OPA"), PeriodKind::SecondHalf),
                (Some("OPA"), PeriodKind::WholePeriod),
                (Some("OPB"), PeriodKind::FirstHalf),
                (Some("OPB"), PeriodKind::WholePeriod),
            ]
        );
        assert_eq!(totals[2].total_amount, dec("195.00"));
    }

    #[test]
    fn test_months_are_kept_apart() {
        let blocks = vec![
            make_block("2025-02-28", None, "75.00", 0),
            make_block("2025-03-01", None, "75.00", 0),
        ];
        let totals = calculate_period_totals("alpitour", &blocks);
        assert_eq!(totals.len(), 3);
        assert_eq!(totals[0].month.as_deref(), Some("2025-02"));
        assert_eq!(totals[0].period, PeriodKind::SecondHalf);
        assert_eq!(totals[1].month.as_deref(), Some("2025-03"));
    }

    #[test]
    fn test_no_blocks_no_totals() {
        assert!(calculate_period_totals("alpitour", &[]).is_empty());
    }
}
