//! Base amount pricing.
//!
//! A partner prices the base of a shift in one of three ways: a tier table by
//! whole hours extended per hour, a flat fee by location, or a flat fee by
//! service type from a catalog.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{BaseRule, ServiceEntry};
use crate::models::AuditStep;

/// The result of pricing a block's base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseAmountResult {
    /// Base amount, unrounded.
    pub amount: Decimal,
    /// Catalog service the block was priced as, for catalog pricing.
    pub service: Option<String>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// What the base rule needs to know about a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseInput<'a> {
    /// Canonical airport code.
    pub location: &'a str,
    /// Minutes from start to the anchored end.
    pub duration_minutes: i64,
    /// Service category text.
    pub service_category: Option<&'a str>,
    /// Service note text.
    pub service_note: Option<&'a str>,
}

/// Looks up a tier table.
///
/// Tiers are whole hours. The largest tier not above `duration_minutes` is
/// used, plus `extension_per_hour` pro rata for every minute beyond it. Durations under the smallest
/// tier are billed at the smallest tier. An empty table prices at zero.
///
/// # Example
///
/// ```
/// use shift_billing_engine::calculation::tier_amount;
/// use rust_decimal::Decimal;
/// use std::collections::BTreeMap;
///
/// let table = BTreeMap::from([(3, Decimal::new(75, 0)), (4, Decimal::new(90, 0))]);
/// // 4.5 hours
/// assert_eq!(tier_amount(&table, 270, Decimal::new(15, 0)), Decimal::new(975, 1));
/// ```
pub fn tier_amount(
    table: &BTreeMap<u32, Decimal>,
    duration_minutes: i64,
    extension_per_hour: Decimal,
) -> Decimal {
    let reached = table
        .iter()
        .rev()
        .find(|(tier, _)| i64::from(**tier) * 60 <= duration_minutes);
    match reached {
        Some((tier, amount)) => {
            let beyond = Decimal::from(duration_minutes - i64::from(*tier) * 60);
            *amount + beyond * extension_per_hour / Decimal::from(60)
        }
        None => table.values().next().copied().unwrap_or(Decimal::ZERO),
    }
}

/// Picks the catalog entry for a block.
///
/// Note keywords are checked first, then the category against each entry's
/// name (either containing the other, case-insensitively), in catalog order.
/// Falls back to the entry named `fallback`.
pub fn match_service<'a>(
    entries: &'a [ServiceEntry],
    fallback: &str,
    category: Option<&str>,
    note: Option<&str>,
) -> Option<&'a ServiceEntry> {
    if let Some(note) = note.map(str::to_uppercase) {
        let by_note = entries.iter().find(|entry| {
            entry
                .note_keywords
                .iter()
                .any(|keyword| note.contains(&keyword.to_uppercase()))
        });
        if by_note.is_some() {
            return by_note;
        }
    }

    if let Some(category) = category.map(|c| c.trim().to_lowercase()).filter(|c| !c.is_empty()) {
        let by_category = entries.iter().find(|entry| {
            let name = entry.name.to_lowercase();
            name.contains(&category) || category.contains(&name)
        });
        if by_category.is_some() {
            return by_category;
        }
    }

    entries.iter().find(|entry| entry.name.eq_ignore_ascii_case(fallback))
}

/// Prices the base of a block.
///
/// # Arguments
///
/// * `rule` - The partner's base rule (tier table, flat fee or catalog)
/// * `input` - The block's location, shift duration and service cells
/// * `policy_ref` - The policy section recorded on the audit step
/// * `step_number` - The step number for audit trail sequencing
///
/// # Returns
///
/// Returns a `BaseAmountResult` with the unrounded amount and, for catalog
/// pricing, the matched service name.
pub fn calculate_base_amount(
    rule: &BaseRule,
    input: BaseInput<'_>,
    policy_ref: &str,
    step_number: u32,
) -> BaseAmountResult {
    let hours = Decimal::from(input.duration_minutes) / Decimal::from(60);

    let (amount, service, rule_id, rule_name, reasoning) = match rule {
        BaseRule::TieredDuration {
            tables,
            default_location,
            extension_per_hour,
        } => {
            let table_location = if tables.contains_key(input.location) {
                input.location
            } else {
                default_location.as_str()
            };
            let amount = tables
                .get(table_location)
                .map(|table| tier_amount(table, input.duration_minutes, *extension_per_hour))
                .unwrap_or(Decimal::ZERO);
            (
                amount,
                None,
                "base_tiered_duration",
                "Tiered Duration Base",
                format!(
                    "{} hours at {} tier table = {}",
                    hours.round_dp(2).normalize(),
                    table_location,
                    amount.round_dp(2)
                ),
            )
        }
        BaseRule::LocationFlat {
            default_amount,
            amounts,
            ..
        } => {
            let amount = amounts.get(input.location).copied().unwrap_or(*default_amount);
            (
                amount,
                None,
                "base_location_flat",
                "Location Flat Base",
                format!("Flat amount for {} = {}", input.location, amount),
            )
        }
        BaseRule::ServiceCatalog { entries, fallback } => {
            let entry = match_service(entries, fallback, input.service_category, input.service_note);
            let amount = entry.map(|e| e.amount).unwrap_or(Decimal::ZERO);
            let service = entry.map(|e| e.name.clone());
            let reasoning = match &service {
                Some(name) => format!("Service '{}' = {}", name, amount),
                None => "No catalog entry matched".to_string(),
            };
            (amount, service, "base_service_catalog", "Service Catalog Base", reasoning)
        }
    };

    BaseAmountResult {
        amount,
        service: service.clone(),
        audit_step: AuditStep {
            step_number,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            policy_ref: policy_ref.to_string(),
            input: serde_json::json!({
                "location": input.location,
                "duration_minutes": input.duration_minutes,
                "service_category": input.service_category,
                "service_note": input.service_note,
            }),
            output: serde_json::json!({
                "amount": amount.round_dp(2).to_string(),
                "service": service,
            }),
            reasoning,
        },
    }
}
