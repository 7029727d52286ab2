//! Collaborator payouts.
//!
//! What the assistant who worked a block is owed, from their own tariff
//! rather than the partner's. The shift duration and overtime of the block
//! are reused; night minutes are recounted over the collaborator's own band.

use std::sync::LazyLock;

use chrono::{Duration, NaiveTime};
use regex::Regex;
use rust_decimal::Decimal;

use crate::config::{CollaboratorConfig, CollaboratorTariff, NightWindow, TaxRegime};
use crate::models::{CollaboratorPayout, ComputedBlock};

use super::interval::night_overlap_minutes;
use super::rounding::round_money;
use super::time_range::normalize_spaces;

/// Night band assumed when a tariff label carries none.
pub const DEFAULT_COLLABORATOR_NIGHT: (u32, u32) = (23, 6);

static NIGHT_BAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})(?:[:.](\d{2}))?\s*[-–]\s*(\d{1,2})(?:[:.](\d{2}))?")
        .expect("night band pattern compiles")
});

/// Reads the night band out of a label such as `+15% (23:00-06:00)`.
///
/// # Example
///
/// ```
/// use shift_billing_engine::calculation::parse_night_label;
/// use chrono::NaiveTime;
///
/// let window = parse_night_label("+20% (22-06)").unwrap();
/// assert_eq!(window.start, NaiveTime::from_hms_opt(22, 0, 0).unwrap());
/// assert_eq!(window.end, NaiveTime::from_hms_opt(6, 0, 0).unwrap());
/// ```
pub fn parse_night_label(label: &str) -> Option<NightWindow> {
    let caps = NIGHT_BAND_RE.captures(label)?;
    let part = |i: usize| -> u32 { caps.get(i).and_then(|m| m.as_str().parse().ok()).unwrap_or(0) };
    let start = NaiveTime::from_hms_opt(part(1) % 24, part(2), 0)?;
    let end = NaiveTime::from_hms_opt(part(3) % 24, part(4), 0)?;
    Some(NightWindow { start, end })
}

fn default_window() -> NightWindow {
    let (start, end) = DEFAULT_COLLABORATOR_NIGHT;
    NightWindow {
        start: NaiveTime::from_hms_opt(start, 0, 0).unwrap_or_default(),
        end: NaiveTime::from_hms_opt(end, 0, 0).unwrap_or_default(),
    }
}

fn airport_matches(tariff: &CollaboratorTariff, airport: &str) -> bool {
    tariff
        .airport
        .as_deref()
        .is_none_or(|a| a.trim().eq_ignore_ascii_case(airport.trim()))
}

/// Finds the tariff for a collaborator at an airport.
///
/// Exact name first, then either name containing the other
/// (case-insensitive), then the configured default. A tariff without an
/// airport applies everywhere.
pub fn find_tariff<'a>(config: &'a CollaboratorConfig, airport: &str, name: &str) -> &'a CollaboratorTariff {
    let wanted = normalize_spaces(name);
    if wanted.is_empty() {
        return &config.default;
    }

    let at_airport = || config.collaborators.iter().filter(|t| airport_matches(t, airport));

    if let Some(exact) = at_airport().find(|t| normalize_spaces(&t.name) == wanted) {
        return exact;
    }

    let wanted = wanted.to_lowercase();
    at_airport()
        .find(|t| {
            let candidate = normalize_spaces(&t.name).to_lowercase();
            !candidate.is_empty() && (candidate.contains(&wanted) || wanted.contains(&candidate))
        })
        .unwrap_or(&config.default)
}

fn net_of(regime: TaxRegime, gross: Decimal) -> Decimal {
    match regime {
        TaxRegime::VatRegistered => gross,
        TaxRegime::Withholding => gross * Decimal::new(80, 2),
    }
}

/// Computes the payout for a priced block under a collaborator tariff.
///
/// The base covers `base_hours` of the shift; longer shifts add the base's
/// hourly value pro rata. Night pays `night_percent` of the (pro-rated)
/// hourly value per night hour of the billed stretch. The holiday
/// percentage uplifts the whole subtotal.
///
/// # Arguments
///
/// * `block` - The priced block
/// * `assistant` - The collaborator's name as written on the schedule
/// * `tariff` - The tariff found by [`find_tariff`]
///
/// # Returns
///
/// The payout with net components, or `None` for blocks that could not be
/// priced.
pub fn calculate_payout(
    block: &ComputedBlock,
    assistant: &str,
    tariff: &CollaboratorTariff,
) -> Option<CollaboratorPayout> {
    if block.error.is_some() {
        return None;
    }
    let start = block.start_datetime?;

    let sixty = Decimal::from(60);
    let shift_minutes = Decimal::from(block.duration_minutes.max(0));
    let covered_minutes = tariff.base_hours * sixty;

    let base = if covered_minutes > Decimal::ZERO && shift_minutes > covered_minutes {
        tariff.base_amount
            + (shift_minutes - covered_minutes) * tariff.base_amount / covered_minutes
    } else {
        tariff.base_amount
    };

    let overtime = Decimal::from(block.overtime_minutes) * tariff.overtime_per_hour / sixty;

    let window = tariff
        .night_label
        .as_deref()
        .and_then(parse_night_label)
        .unwrap_or_else(default_window);
    let billed_end = start + Duration::minutes(block.billed_minutes);
    let night_minutes = night_overlap_minutes(start, billed_end, window.start, window.end);
    let night = if covered_minutes > Decimal::ZERO {
        base * Decimal::from(night_minutes) * tariff.night_percent / covered_minutes
    } else {
        Decimal::ZERO
    };

    let subtotal = base + overtime + night;
    let gross = if block.holiday {
        subtotal * (Decimal::ONE + tariff.holiday_percent)
    } else {
        subtotal
    };

    Some(CollaboratorPayout {
        assistant: assistant.to_string(),
        tariff_name: tariff.name.clone(),
        date: block.date,
        location: block.location.clone(),
        base_amount: round_money(net_of(tariff.tax_regime, base)),
        overtime_amount: round_money(net_of(tariff.tax_regime, overtime)),
        night_amount: round_money(net_of(tariff.tax_regime, night)),
        gross_total: round_money(gross),
        net_total: round_money(net_of(tariff.tax_regime, gross)),
        provenance: block.provenance.clone(),
    })
}

/// Computes payouts for every priced block that names an assistant.
pub fn collaborator_payouts(config: &CollaboratorConfig, blocks: &[ComputedBlock]) -> Vec<CollaboratorPayout> {
    blocks
        .iter()
        .filter_map(|block| {
            let assistant = block.assistant.as_deref().map(str::trim).filter(|a| !a.is_empty())?;
            let tariff = find_tariff(config, &block.location, assistant);
            calculate_payout(block, assistant, tariff)
        })
        .collect()
}
