//! Error types for the delay check.
//!
//! The rule evaluators are total and never fail; every error here comes from
//! the wizard boundary, configuration, or the terminal channel.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Navigation and answer validation errors raised by the step sequencer.
///
/// These block navigation; they never reach a rule evaluator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("Step '{step}' needs an answer before continuing")]
    StepIncomplete { step: String },

    #[error("Invalid answer '{input}' for step '{step}': {reason}")]
    InvalidAnswer {
        step: String,
        input: String,
        reason: String,
    },

    #[error("No question is active at position {position}")]
    NotAtQuestion { position: String },

    #[error("This check is only for people who are Medicare-eligible now")]
    Ineligible,

    #[error("Profile is missing required field: {field}")]
    IncompleteProfile { field: String },
}

/// Terminal channel errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from evaluating a profile file outside the wizard.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Failed to read profile file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse profile: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Inconsistent profile: {0}")]
    Inconsistent(String),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_module_errors() {
        let err: Error = WizardError::StepIncomplete {
            step: "age".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Wizard error: Step 'age' needs an answer before continuing"
        );

        let err: Error = BatchError::Inconsistent("creditable must be skipped".into()).into();
        assert!(matches!(err, Error::Batch(_)));
    }

    #[test]
    fn read_error_keeps_source() {
        let err = BatchError::Read {
            path: "profile.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("profile.json"));
    }
}
