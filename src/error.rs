//! Error types for the shift billing engine.
//!
//! Data-quality problems in schedule rows are not errors: they travel as
//! fields on the computed records. The variants here cover configuration
//! and run-level failures only.

use thiserror::Error;

/// The main error type for the shift billing engine.
///
/// # Example
///
/// ```
/// use shift_billing_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/file.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/file.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No tariff policy is configured for the requested partner.
    #[error("Partner not found: {partner}")]
    PartnerNotFound {
        /// The partner identifier that was requested.
        partner: String,
    },

    /// A tariff policy parsed but its numbers are unusable.
    #[error("Invalid policy for partner '{partner}': {message}")]
    InvalidPolicy {
        /// The partner whose policy is invalid.
        partner: String,
        /// What is wrong with the policy.
        message: String,
    },

    /// The run input cannot be processed at all.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// A description of the problem.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/file.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/file.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/partners/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/partners/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_partner_not_found_displays_partner() {
        let error = EngineError::PartnerNotFound {
            partner: "unknown".to_string(),
        };
        assert_eq!(error.to_string(), "Partner not found: unknown");
    }

    #[test]
    fn test_invalid_policy_displays_partner_and_message() {
        let error = EngineError::InvalidPolicy {
            partner: "alpitour".to_string(),
            message: "tier table for BGY is empty".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid policy for partner 'alpitour': tier table for BGY is empty"
        );
    }

    #[test]
    fn test_invalid_input_displays_message() {
        let error = EngineError::InvalidInput {
            message: "no sheets supplied".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid input: no sheets supplied");
    }

    #[test]
    fn test_calculation_error_displays_message() {
        let error = EngineError::CalculationError {
            message: "negative duration".to_string(),
        };
        assert_eq!(error.to_string(), "Calculation error: negative duration");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_partner_not_found() -> EngineResult<()> {
            Err(EngineError::PartnerNotFound {
                partner: "x".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_partner_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
