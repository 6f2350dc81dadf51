use thiserror::Error;

use crate::fit::ContainerId;

/// Library-level error type.
///
/// None of these are fatal to the host: a failed dispatch or a sync against a
/// container that has since been removed leaves the visual state untouched.
#[derive(Debug, Error)]
pub enum FitBoxError {
    #[error("Container not found: {0}")]
    ContainerNotFound(ContainerId),

    #[error("Unknown fitbox method: {0}")]
    UnknownMethod(String),

    #[error("Missing argument for {0}")]
    MissingArgument(&'static str),

    #[error("adjustAfterResize needs a local task set to run the resize timer")]
    NoTaskSet,

    #[error("Invalid fitbox options: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_method_message() {
        let err = FitBoxError::UnknownMethod("explode".to_string());
        assert_eq!(err.to_string(), "Unknown fitbox method: explode");
    }

    #[test]
    fn test_invalid_config_wraps_serde_error() {
        let serde_err = serde_json::from_str::<u32>("\"nope\"").unwrap_err();
        let err: FitBoxError = serde_err.into();
        assert!(matches!(err, FitBoxError::InvalidConfig(_)));
        assert!(err.to_string().starts_with("Invalid fitbox options"));
    }
}
