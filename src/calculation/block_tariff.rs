//! Pricing of a single block under a partner's tariff.
//!
//! Runs the rules in order (base, overtime, night, ancillary, holiday) and
//! collects their audit steps. A block whose interval cannot be resolved is
//! turned into an error record with every amount at zero.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::TariffPolicy;
use crate::models::{Block, ComputedBlock};

use super::ancillary::calculate_boarding_cards;
use super::base_amount::{BaseInput, calculate_base_amount};
use super::holiday_uplift::{ComponentAmounts, apply_holiday_uplift};
use super::night_surcharge::calculate_night_surcharge;
use super::overtime::calculate_overtime;
use super::rounding::round_money;

/// Error recorded when a block has no usable start or end.
pub const MISSING_INTERVAL_ERROR: &str = "shift start or end unavailable";

/// Error recorded when a block's end does not come after its start.
pub const EMPTY_INTERVAL_ERROR: &str = "shift end is not after its start";

fn interval_error(block: &Block) -> Option<String> {
    if let Some(err) = &block.parse_error {
        return Some(err.clone());
    }
    match (block.start_datetime, block.end_datetime) {
        (Some(start), Some(end)) if end > start => None,
        (Some(_), Some(_)) => Some(EMPTY_INTERVAL_ERROR.to_string()),
        _ => Some(MISSING_INTERVAL_ERROR.to_string()),
    }
}

fn empty_record(block: &Block, error: Option<String>) -> ComputedBlock {
    ComputedBlock {
        date: block.date(),
        location: block.location().to_string(),
        secondary_operator_id: block.key.secondary_operator_id.clone(),
        assistant: block.assistant.clone(),
        shift_text: block.shift_text.clone(),
        shift_label: block.shift_label.clone(),
        start_datetime: block.start_datetime,
        end_datetime: block.end_datetime,
        duration_minutes: 0,
        billed_minutes: 0,
        no_departure: block.no_departure,
        holiday: block.holiday,
        anchor_departure: None,
        service: None,
        base_amount: Decimal::ZERO,
        overtime_minutes_raw: 0,
        overtime_minutes: 0,
        overtime_amount: Decimal::ZERO,
        night_minutes_raw: 0,
        night_minutes: 0,
        night_amount: Decimal::ZERO,
        ancillary_amount: Decimal::ZERO,
        subtotal: Decimal::ZERO,
        total_amount: Decimal::ZERO,
        error,
        warnings: Vec::new(),
        provided: block.provided.clone(),
        provenance: block.first_source.clone(),
        row_count: block.row_count,
        audit_steps: Vec::new(),
    }
}

/// Prices one block.
///
/// Component amounts on the record are rounded to cents; the total is the
/// holiday-adjusted sum of the unrounded components, rounded once.
pub fn compute_block(block: &Block, policy: &TariffPolicy) -> ComputedBlock {
    if let Some(error) = interval_error(block) {
        debug!(
            date = %block.date(),
            location = %block.location(),
            shift = %block.shift_label,
            error = %error,
            "Block cannot be priced"
        );
        return empty_record(block, Some(error));
    }

    let partner = policy.id();
    let mut record = empty_record(block, None);
    let mut step_number: u32 = 1;

    let base = calculate_base_amount(
        &policy.base,
        BaseInput {
            location: block.location(),
            duration_minutes: block.duration_minutes().unwrap_or(0),
            service_category: block.service_category.as_deref(),
            service_note: block.service_note.as_deref(),
        },
        &format!("{}/base", partner),
        step_number,
    );
    record.audit_steps.push(base.audit_step);
    step_number += 1;

    let overtime = calculate_overtime(block, &policy.overtime, &format!("{}/overtime", partner), step_number);
    record.audit_steps.push(overtime.audit_step.clone());
    step_number += 1;

    let night = calculate_night_surcharge(
        block,
        &policy.night,
        base.amount,
        &overtime,
        &format!("{}/night", partner),
        step_number,
    );
    record.audit_steps.push(night.audit_step);
    step_number += 1;

    let ancillary = match &policy.ancillary.boarding_cards {
        Some(rule) => {
            let cards = calculate_boarding_cards(
                rule,
                block.passenger_count,
                &format!("{}/ancillary", partner),
                step_number,
            );
            record.audit_steps.push(cards.audit_step);
            step_number += 1;
            cards.amount
        }
        None => Decimal::ZERO,
    };

    let components = ComponentAmounts {
        base: base.amount,
        overtime: overtime.amount,
        night: night.amount,
        ancillary,
    };
    let uplift = apply_holiday_uplift(
        &policy.holiday,
        block.holiday,
        components,
        &format!("{}/holiday", partner),
        step_number,
    );
    record.audit_steps.push(uplift.audit_step);

    let nominal_minutes = match (block.start_datetime, overtime.nominal_end) {
        (Some(start), Some(nominal_end)) => (nominal_end - start).num_minutes().max(0),
        _ => 0,
    };

    record.duration_minutes = block.duration_minutes().unwrap_or(0);
    record.billed_minutes = nominal_minutes + overtime.minutes;
    record.anchor_departure = overtime.anchor;
    record.service = base.service;
    record.base_amount = round_money(base.amount);
    record.overtime_minutes_raw = overtime.minutes_raw;
    record.overtime_minutes = overtime.minutes;
    record.overtime_amount = round_money(overtime.amount);
    record.night_minutes_raw = night.minutes_raw;
    record.night_minutes = night.minutes;
    record.night_amount = round_money(night.amount);
    record.ancillary_amount = round_money(ancillary);
    record.subtotal = round_money(uplift.subtotal);
    record.total_amount = uplift.total;
    record.warnings.extend(overtime.warning);
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::{NO_ANCHOR_WARNING, UNPARSED_SHIFT_ERROR};
    use crate::config::shipped_policy;
    use crate::models::{BlockKey, Provenance, ProvidedValues};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn make_block(location: &str, start: Option<&str>, end: Option<&str>, actual: &[&str]) -> Block {
        Block {
            key: BlockKey {
                date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
                location: location.to_string(),
                shift_key: "k".to_string(),
                secondary_operator_id: None,
                row_disambiguator: None,
            },
            shift_text: "text".to_string(),
            shift_label: "label".to_string(),
            start_datetime: start.map(at),
            end_datetime: end.map(at),
            no_departure: false,
            holiday: false,
            actual_departures: actual.iter().map(|s| at(s)).collect(),
            scheduled_departures: vec![],
            passenger_count: None,
            service_category: None,
            service_note: None,
            assistant: None,
            provided: ProvidedValues::default(),
            first_source: Provenance {
                file_id: "f".to_string(),
                sheet_id: "s".to_string(),
                row_ordinal: 3,
                global_ordinal: 7,
            },
            row_count: 2,
            parse_error: None,
        }
    }

    // ==========================================================================
    // Priced blocks
    // ==========================================================================

    #[test]
    fn test_daytime_block_with_overtime() {
        let policy = shipped_policy("alpitour");
        // 08:00-11:00 at BGY, departure 11:10 + 30 grace = 40 min overtime
        let block = make_block(
            "BGY",
            Some("2025-03-04 08:00"),
            Some("2025-03-04 11:00"),
            &["2025-03-04 11:10"],
        );
        let record = compute_block(&block, &policy);

        assert_eq!(record.error, None);
        assert_eq!(record.base_amount, dec("75.00"));
        assert_eq!(record.overtime_minutes, 40);
        assert_eq!(record.overtime_amount, dec("13.33"));
        assert_eq!(record.night_minutes, 0);
        assert_eq!(record.duration_minutes, 180);
        assert_eq!(record.billed_minutes, 220);
        assert_eq!(record.total_amount, dec("88.33"));
        assert_eq!(record.anchor_departure, Some(at("2025-03-04 11:10")));
        assert_eq!(record.row_count, 2);
        assert_eq!(record.provenance.global_ordinal, 7);
    }

    #[test]
    fn test_audit_steps_are_numbered_in_order() {
        let policy = shipped_policy("rusconi");
        let block = make_block(
            "BGY",
            Some("2025-03-04 04:00"),
            Some("2025-03-04 06:30"),
            &["2025-03-04 07:00"],
        );
        let record = compute_block(&block, &policy);
        let numbers: Vec<u32> = record.audit_steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert_eq!(record.audit_steps[0].policy_ref, "rusconi/base");
        assert_eq!(record.audit_steps[3].rule_id, "boarding_cards");
        assert_eq!(record.audit_steps[4].rule_id, "holiday_uplift");
    }

    #[test]
    fn test_holiday_total_uses_unrounded_components() {
        let policy = shipped_policy("alpitour");
        let mut block = make_block(
            "BGY",
            Some("2025-03-04 08:00"),
            Some("2025-03-04 11:00"),
            &["2025-03-04 11:10"],
        );
        block.holiday = true;
        let record = compute_block(&block, &policy);
        // (75 + 40/60 * 20) * 1.20 = 106.00 exactly
        assert_eq!(record.total_amount, dec("106.00"));
        assert!(record.holiday);
    }

    #[test]
    fn test_missing_departures_warns() {
        let policy = shipped_policy("veratour");
        let block = make_block("BGY", Some("2025-03-04 08:00"), Some("2025-03-04 11:00"), &[]);
        let record = compute_block(&block, &policy);
        assert_eq!(record.overtime_minutes, 0);
        assert_eq!(record.warnings, vec![NO_ANCHOR_WARNING.to_string()]);
        assert_eq!(record.total_amount, dec("75.00"));
    }

    // ==========================================================================
    // Error records
    // ==========================================================================

    #[test]
    fn test_parse_error_becomes_error_record() {
        let policy = shipped_policy("alpitour");
        let mut block = make_block("BGY", None, None, &["2025-03-04 11:10"]);
        block.parse_error = Some(UNPARSED_SHIFT_ERROR.to_string());
        let record = compute_block(&block, &policy);
        assert_eq!(record.error.as_deref(), Some(UNPARSED_SHIFT_ERROR));
        assert_eq!(record.total_amount, Decimal::ZERO);
        assert!(record.audit_steps.is_empty());
    }

    #[test]
    fn test_zero_length_interval_is_an_error() {
        let policy = shipped_policy("alpitour");
        let block = make_block("BGY", Some("2025-03-04 08:00"), Some("2025-03-04 08:00"), &[]);
        let record = compute_block(&block, &policy);
        assert_eq!(record.error.as_deref(), Some(EMPTY_INTERVAL_ERROR));
        assert_eq!(record.base_amount, Decimal::ZERO);
    }

    #[test]
    fn test_missing_end_is_an_error() {
        let policy = shipped_policy("alpitour");
        let block = make_block("BGY", Some("2025-03-04 08:00"), None, &[]);
        let record = compute_block(&block, &policy);
        assert_eq!(record.error.as_deref(), Some(MISSING_INTERVAL_ERROR));
    }
}
