//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading partner tariff
//! policies and collaborator tariffs from YAML files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};

use super::types::{BaseRule, CollaboratorConfig, NightRate, TariffPolicy};

/// Loads and provides access to partner policies.
///
/// # Directory Structure
///
/// ```text
/// config/
/// ├── collaborators.yaml   # Optional collaborator tariffs
/// └── partners/
///     ├── alpitour.yaml    # One TariffPolicy per file
///     └── rusconi.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use shift_billing_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config").unwrap();
/// let policy = loader.get_policy("alpitour").unwrap();
/// println!("Partner: {}", policy.partner.name);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    policies: BTreeMap<String, TariffPolicy>,
    collaborators: CollaboratorConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Every `*.yaml` file under `partners/` is parsed as a [`TariffPolicy`]
    /// and validated. `collaborators.yaml` is optional; built-in defaults
    /// apply when it is absent.
    ///
    /// # Errors
    ///
    /// - [`EngineError::ConfigNotFound`] when `partners/` is missing or unreadable
    /// - [`EngineError::ConfigParseError`] when a file is not valid YAML for its type
    /// - [`EngineError::InvalidPolicy`] when a policy fails validation or an id repeats
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let policies = Self::load_policies(&path.join("partners"))?;

        let collaborators_path = path.join("collaborators.yaml");
        let collaborators = if collaborators_path.exists() {
            Self::load_yaml::<CollaboratorConfig>(&collaborators_path)?
        } else {
            debug!(path = %collaborators_path.display(), "no collaborator tariffs, using defaults");
            CollaboratorConfig::default()
        };

        Self::from_parts(policies, collaborators)
    }

    /// Builds a loader from already-parsed policies, validating each one.
    pub fn from_parts(
        policies: Vec<TariffPolicy>,
        collaborators: CollaboratorConfig,
    ) -> EngineResult<Self> {
        let mut by_id = BTreeMap::new();
        for policy in policies {
            validate_policy(&policy)?;
            let id = policy.id().to_lowercase();
            if by_id.contains_key(&id) {
                return Err(EngineError::InvalidPolicy {
                    partner: id,
                    message: "partner id defined more than once".to_string(),
                });
            }
            by_id.insert(id, policy);
        }
        Ok(Self {
            policies: by_id,
            collaborators,
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads every policy file in the partners directory, in file name order.
    fn load_policies(partners_dir: &Path) -> EngineResult<Vec<TariffPolicy>> {
        let dir_str = partners_dir.display().to_string();

        let entries = fs::read_dir(partners_dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml" || ext == "yml") {
                paths.push(path);
            }
        }
        paths.sort();

        paths.iter().map(|path| Self::load_yaml::<TariffPolicy>(path)).collect()
    }

    /// Gets the policy for a partner id (case-insensitive).
    pub fn get_policy(&self, partner: &str) -> EngineResult<&TariffPolicy> {
        self.policies
            .get(&partner.trim().to_lowercase())
            .ok_or_else(|| EngineError::PartnerNotFound {
                partner: partner.to_string(),
            })
    }

    /// Ids of all configured partners, sorted.
    pub fn partner_ids(&self) -> Vec<&str> {
        self.policies.keys().map(String::as_str).collect()
    }

    /// Collaborator tariffs.
    pub fn collaborators(&self) -> &CollaboratorConfig {
        &self.collaborators
    }
}

/// Checks a policy for values the calculation cannot work with.
///
/// Non-positive rounding steps are accepted with a warning: rounding is
/// then skipped rather than dividing by zero.
pub fn validate_policy(policy: &TariffPolicy) -> EngineResult<()> {
    let invalid = |message: &str| EngineError::InvalidPolicy {
        partner: policy.id().to_string(),
        message: message.to_string(),
    };

    if policy.id().trim().is_empty() {
        return Err(invalid("partner id is empty"));
    }

    match &policy.base {
        BaseRule::TieredDuration {
            tables,
            default_location,
            extension_per_hour,
        } => {
            if tables.is_empty() || tables.values().any(|table| table.is_empty()) {
                return Err(invalid("tier table is empty"));
            }
            if !tables.contains_key(default_location) {
                return Err(invalid("default location has no tier table"));
            }
            if extension_per_hour.is_sign_negative() {
                return Err(invalid("extension rate is negative"));
            }
        }
        BaseRule::LocationFlat {
            duration_minutes, ..
        } => {
            if *duration_minutes <= 0 {
                return Err(invalid("flat base duration must be positive"));
            }
        }
        BaseRule::ServiceCatalog { entries, fallback } => {
            if entries.is_empty() {
                return Err(invalid("service catalog is empty"));
            }
            if !entries.iter().any(|entry| entry.name.eq_ignore_ascii_case(fallback)) {
                return Err(invalid("fallback service is not in the catalog"));
            }
        }
    }

    if policy.overtime.rate_per_hour.is_sign_negative() {
        return Err(invalid("overtime rate is negative"));
    }
    if let NightRate::Proportional { base_hours, .. } = &policy.night.rate {
        if *base_hours <= Decimal::ZERO {
            return Err(invalid("proportional night rate needs positive base hours"));
        }
    }
    if policy.holiday.multiplier <= Decimal::ZERO {
        return Err(invalid("holiday multiplier must be positive"));
    }

    for (section, rounding) in [("overtime", &policy.overtime.rounding), ("night", &policy.night.rounding)] {
        if rounding.mode != crate::calculation::RoundingMode::None && rounding.step_minutes <= 0 {
            warn!(
                partner = %policy.id(),
                section,
                step_minutes = rounding.step_minutes,
                "non-positive rounding step, rounding disabled"
            );
        }
    }

    Ok(())
}

/// Parses one of the shipped partner files, for tests.
#[cfg(test)]
pub(crate) fn shipped_policy(partner: &str) -> TariffPolicy {
    let yaml = match partner {
        "alpitour" => include_str!("../../config/partners/alpitour.yaml"),
        "rusconi" => include_str!("../../config/partners/rusconi.yaml"),
        "aliservice" => include_str!("../../config/partners/aliservice.yaml"),
        "veratour" => include_str!("../../config/partners/veratour.yaml"),
        other => panic!("no shipped policy for {other}"),
    };
    serde_yaml::from_str(yaml).unwrap()
}
