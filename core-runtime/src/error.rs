//! Errors raised while assembling the runtime: player settings, logging
//! setup and the host bridges a service needs.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A player or cache setting is out of range.
    #[error("Invalid setting `{field}`: {reason}")]
    InvalidSetting { field: &'static str, reason: String },

    /// Player configuration JSON could not be parsed.
    #[error("Invalid player config: {0}")]
    MalformedConfig(#[from] serde_json::Error),

    /// The tracing subscriber could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(String),

    /// The host did not provide a required bridge.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing {
        capability: &'static str,
        message: String,
    },
}

impl Error {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidSetting {
            field,
            reason: reason.into(),
        }
    }

    /// Whether the host can fix this by changing configuration values.
    pub fn is_invalid_config(&self) -> bool {
        matches!(
            self,
            Error::InvalidSetting { .. } | Error::MalformedConfig(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_setting_names_the_field() {
        let err = Error::invalid("sample_interval", "must be greater than zero");
        assert_eq!(
            err.to_string(),
            "Invalid setting `sample_interval`: must be greater than zero"
        );
        assert!(err.is_invalid_config());
    }

    #[test]
    fn test_malformed_json_converts() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::from(parse);
        assert!(matches!(err, Error::MalformedConfig(_)));
        assert!(err.to_string().starts_with("Invalid player config:"));
        assert!(err.is_invalid_config());
    }

    #[test]
    fn test_missing_bridge_is_not_a_config_value_problem() {
        let err = Error::CapabilityMissing {
            capability: "PlayerFactory",
            message: "inject a native player".to_string(),
        };
        assert!(!err.is_invalid_config());
        assert!(!Error::Logging("subscriber already set".to_string()).is_invalid_config());
    }
}
