//! Configuration loading for partner tariff policies.
//!
//! Each partner's rules live in one YAML file deserialized into a
//! [`TariffPolicy`]; the engine never branches on partner names.
//!
//! # Example
//!
//! ```no_run
//! use shift_billing_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config").unwrap();
//! println!("Partners: {:?}", config.partner_ids());
//! ```

mod loader;
mod types;

#[cfg(test)]
pub(crate) use loader::shipped_policy;
pub use loader::{ConfigLoader, validate_policy};
pub use types::{
    AncillaryPolicy, AnchorRule, BaseRule, BoardingCardRule, CheckinRule, CollaboratorConfig,
    CollaboratorTariff, ForwardFillPolicy, GroupingPolicy, HolidayRule, NightRate, NightRule,
    NightSpan, NightWindow, OvertimeReference, OvertimeRule, PartnerMetadata, ServiceEntry,
    ShiftPolicy, StartRule, TariffPolicy, TaxRegime,
};
