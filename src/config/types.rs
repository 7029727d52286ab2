//! Configuration types for partner tariff policies.
//!
//! This module contains the strongly-typed structures deserialized from the
//! YAML files under `partners/` and from `collaborators.yaml`. Every rule
//! that differs between partners is a field or a tagged variant here, so a
//! new partner is a new file rather than new code.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::RoundingPolicy;

/// Identifying information about a partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerMetadata {
    /// Short identifier used in requests (e.g. "alpitour").
    pub id: String,
    /// Display name.
    pub name: String,
}

/// How the last shift descriptor is carried over blank rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardFillPolicy {
    /// Restart the carried descriptor whenever the date changes.
    #[serde(default)]
    pub group_by_date: bool,
}

/// How rows are grouped into blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingPolicy {
    /// Include the sub-operator in the block key.
    #[serde(default)]
    pub use_secondary_operator: bool,
    /// Merge rows sharing a key; when false every row is its own block.
    #[serde(default = "default_true")]
    pub merge_rows: bool,
    /// Move the block end to the latest departure seen.
    #[serde(default)]
    pub extend_end_to_latest_departure: bool,
    /// Let a merged row with an earlier start move the block start back.
    #[serde(default)]
    pub merge_moves_start_earlier: bool,
}

impl Default for GroupingPolicy {
    fn default() -> Self {
        Self {
            use_secondary_operator: false,
            merge_rows: true,
            extend_end_to_latest_departure: false,
            merge_moves_start_earlier: false,
        }
    }
}

/// Where the billed interval starts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StartRule {
    /// From the parsed shift descriptor.
    #[default]
    Parsed,
    /// A fixed lead before the first scheduled departure.
    BeforeFirstScheduled {
        /// Minutes between start and scheduled departure.
        lead_minutes: i64,
    },
}

/// Shift synthesized from a check-in time when the descriptor is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinRule {
    /// Minutes before check-in that the shift starts.
    pub lead_minutes: i64,
    /// Length of the synthesized shift.
    pub duration_minutes: i64,
}

/// Shift interval rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftPolicy {
    /// Where the billed interval starts.
    #[serde(default)]
    pub start: StartRule,
    /// Optional check-in synthesis.
    #[serde(default)]
    pub checkin: Option<CheckinRule>,
}

/// One service in a priced catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntry {
    /// Catalog name, matched case-insensitively against the row's category.
    pub name: String,
    /// Flat amount for the service.
    pub amount: Decimal,
    /// Markers that select this service when found in the service note.
    #[serde(default)]
    pub note_keywords: Vec<String>,
}

/// How the base amount is priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BaseRule {
    /// Amount by whole-hour tier, extended per hour past the tier reached.
    TieredDuration {
        /// Tier tables by location: hours to amount.
        tables: HashMap<String, BTreeMap<u32, Decimal>>,
        /// Table used for locations without their own.
        default_location: String,
        /// Amount per hour beyond the tier reached.
        extension_per_hour: Decimal,
    },
    /// Flat amount by location for a fixed duration.
    LocationFlat {
        /// Duration the flat amount covers.
        duration_minutes: i64,
        /// Amount for locations not listed.
        default_amount: Decimal,
        /// Amounts by location.
        #[serde(default)]
        amounts: HashMap<String, Decimal>,
    },
    /// Flat amount by service type.
    ServiceCatalog {
        /// Services in match priority order; note keywords are checked first.
        entries: Vec<ServiceEntry>,
        /// Name of the entry used when nothing matches.
        fallback: String,
    },
}

/// Which departure anchors overtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorRule {
    /// The latest actual departure.
    LatestActual,
    /// The latest actual departure, only when after the nominal end.
    LatestActualAfterEnd,
    /// The latest departure after the nominal end, else the latest overall.
    AfterEndElseLatest,
    /// The first actual departure recorded.
    FirstActual,
}

/// The point overtime is measured from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OvertimeReference {
    /// The block's anchored end.
    ShiftEnd,
    /// A fixed duration after the block start.
    StartPlus {
        /// Nominal shift length.
        minutes: i64,
    },
    /// The first scheduled departure.
    FirstScheduled,
}

/// Overtime rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeRule {
    /// Anchor selection.
    pub anchor: AnchorRule,
    /// Fall back to scheduled departures when no actual one qualifies.
    #[serde(default)]
    pub scheduled_fallback: bool,
    /// Nominal end overtime is measured from.
    pub reference: OvertimeReference,
    /// Minutes of post-departure work added to the anchor.
    #[serde(default)]
    pub grace_minutes: i64,
    /// Overtime rate per hour.
    pub rate_per_hour: Decimal,
    /// Rounding applied to raw overtime minutes.
    #[serde(default)]
    pub rounding: RoundingPolicy,
}

/// Recurring night band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightWindow {
    /// Start of the band.
    pub start: NaiveTime,
    /// End of the band; before `start` when it crosses midnight.
    pub end: NaiveTime,
}

/// How night minutes are priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NightRate {
    /// Fixed hourly surcharge, optionally by location.
    PerHour {
        /// Rate for locations not listed.
        default: Decimal,
        /// Rates by location.
        #[serde(default)]
        by_location: HashMap<String, Decimal>,
    },
    /// A percentage of the hourly value of the base amount.
    Proportional {
        /// Surcharge fraction (0.15 for +15%).
        percent: Decimal,
        /// Hours the base amount pays for.
        base_hours: Decimal,
    },
}

/// Which interval night minutes are counted over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NightSpan {
    /// Start to nominal end, plus the overtime stretch after it.
    #[default]
    BasePlusOvertime,
    /// Start to the first actual departure (or the block end).
    StartToDeparture,
}

/// Night surcharge rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightRule {
    /// Night band.
    pub window: NightWindow,
    /// Pricing.
    pub rate: NightRate,
    /// Interval counted.
    #[serde(default)]
    pub span: NightSpan,
    /// Rounding applied to raw night minutes.
    #[serde(default)]
    pub rounding: RoundingPolicy,
}

/// Holiday uplift rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayRule {
    /// Multiplier applied on holidays (1.20 for +20%).
    pub multiplier: Decimal,
    /// Whether the night amount is uplifted too.
    #[serde(default = "default_true")]
    pub include_night: bool,
    /// Consult the public holiday calendar.
    #[serde(default = "default_true")]
    pub use_calendar: bool,
    /// Honor holiday markers on rows.
    #[serde(default = "default_true")]
    pub use_row_hint: bool,
}

/// Boarding card pricing by passenger count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardingCardRule {
    /// Passenger count up to which the lower rate applies.
    pub threshold: u32,
    /// Rate per passenger up to the threshold.
    pub rate_up_to_threshold: Decimal,
    /// Rate per passenger when the count exceeds the threshold.
    pub rate_above_threshold: Decimal,
}

/// Ancillary services billed with the block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncillaryPolicy {
    /// Boarding card pricing.
    #[serde(default)]
    pub boarding_cards: Option<BoardingCardRule>,
}

/// A partner's complete tariff policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffPolicy {
    /// Partner identity.
    pub partner: PartnerMetadata,
    /// Forward fill behavior.
    #[serde(default)]
    pub forward_fill: ForwardFillPolicy,
    /// Block grouping behavior.
    #[serde(default)]
    pub grouping: GroupingPolicy,
    /// Shift interval rules.
    #[serde(default)]
    pub shift: ShiftPolicy,
    /// Base amount pricing.
    pub base: BaseRule,
    /// Overtime rules.
    pub overtime: OvertimeRule,
    /// Night surcharge rules.
    pub night: NightRule,
    /// Holiday uplift rules.
    pub holiday: HolidayRule,
    /// Ancillary services.
    #[serde(default)]
    pub ancillary: AncillaryPolicy,
}

impl TariffPolicy {
    /// The partner identifier.
    pub fn id(&self) -> &str {
        &self.partner.id
    }
}

/// Tax treatment of a collaborator's pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxRegime {
    /// VAT-registered: tariffs are already net.
    VatRegistered,
    /// Withholding tax at 20%.
    #[default]
    Withholding,
}

impl TaxRegime {
    /// Reads a regime as written in tariff sheets ("Partita IVA",
    /// "Ritenuta d'acconto"). Anything not VAT-registered is withholding.
    pub fn from_label(label: &str) -> Self {
        let upper = label.trim().to_uppercase();
        if ["PARTITA IVA", "P.IVA", "P IVA"].iter().any(|marker| upper.contains(marker)) {
            TaxRegime::VatRegistered
        } else {
            TaxRegime::Withholding
        }
    }
}

/// Pay rules for one collaborator (or the defaults).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorTariff {
    /// Collaborator name; "default" for the fallback tariff.
    pub name: String,
    /// Airport the tariff applies at, when specific.
    #[serde(default)]
    pub airport: Option<String>,
    /// Amount for a shift up to the base duration.
    pub base_amount: Decimal,
    /// Hours covered by the base amount.
    pub base_hours: Decimal,
    /// Overtime rate per hour.
    pub overtime_per_hour: Decimal,
    /// Night surcharge fraction.
    pub night_percent: Decimal,
    /// Night band label, e.g. "+15% (23:00-06:00)".
    #[serde(default)]
    pub night_label: Option<String>,
    /// Holiday surcharge fraction.
    pub holiday_percent: Decimal,
    /// Tax treatment.
    #[serde(default)]
    pub tax_regime: TaxRegime,
}

impl Default for CollaboratorTariff {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            airport: None,
            base_amount: Decimal::new(58, 0),
            base_hours: Decimal::new(3, 0),
            overtime_per_hour: Decimal::new(12, 0),
            night_percent: Decimal::new(15, 2),
            night_label: Some("+15% (23:00-06:00)".to_string()),
            holiday_percent: Decimal::new(20, 2),
            tax_regime: TaxRegime::Withholding,
        }
    }
}

/// The collaborator tariff file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorConfig {
    /// Tariff used when no collaborator matches.
    #[serde(default)]
    pub default: CollaboratorTariff,
    /// Specific tariffs, in lookup order.
    #[serde(default)]
    pub collaborators: Vec<CollaboratorTariff>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::RoundingMode;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_tiered_base_rule_deserializes() {
        let yaml = r#"
kind: tiered_duration
default_location: BGY
extension_per_hour: "15.00"
tables:
  BGY:
    3: "75.00"
    4: "90.00"
"#;
        let rule: BaseRule = serde_yaml::from_str(yaml).unwrap();
        match rule {
            BaseRule::TieredDuration { tables, default_location, extension_per_hour } => {
                assert_eq!(default_location, "BGY");
                assert_eq!(extension_per_hour, dec("15"));
                assert_eq!(tables["BGY"][&4], dec("90"));
            }
            other => panic!("unexpected rule {other:?}"),
        }
    }

    #[test]
    fn test_overtime_rule_deserializes_with_defaults() {
        let yaml = r#"
anchor: after_end_else_latest
reference:
  kind: shift_end
rate_per_hour: "20.00"
"#;
        let rule: OvertimeRule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rule.anchor, AnchorRule::AfterEndElseLatest);
        assert!(!rule.scheduled_fallback);
        assert_eq!(rule.grace_minutes, 0);
        assert_eq!(rule.rounding.mode, RoundingMode::None);
    }

    #[test]
    fn test_night_rule_deserializes() {
        let yaml = r#"
window:
  start: "23:00:00"
  end: "03:30:00"
rate:
  kind: per_hour
  default: "1.86"
"#;
        let rule: NightRule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rule.window.end, NaiveTime::from_hms_opt(3, 30, 0).unwrap());
        assert_eq!(rule.span, NightSpan::BasePlusOvertime);
    }

    #[test]
    fn test_start_rule_variants() {
        let rule: StartRule = serde_yaml::from_str("kind: parsed").unwrap();
        assert_eq!(rule, StartRule::Parsed);
        let rule: StartRule =
            serde_yaml::from_str("kind: before_first_scheduled\nlead_minutes: 150").unwrap();
        assert_eq!(rule, StartRule::BeforeFirstScheduled { lead_minutes: 150 });
    }

    #[test]
    fn test_tax_regime_from_label() {
        assert_eq!(TaxRegime::from_label("Partita IVA"), TaxRegime::VatRegistered);
        assert_eq!(TaxRegime::from_label("p.iva"), TaxRegime::VatRegistered);
        assert_eq!(TaxRegime::from_label("Ritenuta d'acconto"), TaxRegime::Withholding);
        assert_eq!(TaxRegime::from_label(""), TaxRegime::Withholding);
    }

    #[test]
    fn test_grouping_defaults_merge_rows() {
        let grouping: GroupingPolicy = serde_yaml::from_str("use_secondary_operator: true").unwrap();
        assert!(grouping.merge_rows);
        assert!(grouping.use_secondary_operator);
        assert!(!grouping.extend_end_to_latest_departure);
    }
}
