use thiserror::Error;

pub const EXIT_INVALID_ARGUMENT: i32 = 127;
pub const EXIT_INVALID_OPERATION: i32 = 3;
pub const EXIT_RUNTIME_ERROR: i32 = 1;

/// Failure categories surfaced to the invoking shell.
///
/// Each variant maps to a fixed exit code so the shell wrapper can tell a
/// bad invocation apart from a refused operation or an I/O failure.
#[derive(Debug, Error)]
pub enum DvmError {
    /// Required input missing or malformed
    #[error("{0}")]
    InvalidArgument(String),
    /// Request is well formed but not allowed in the current state
    #[error("{0}")]
    InvalidOperation(String),
    /// Filesystem, network or process failure
    #[error("{message}")]
    Runtime {
        message: String,
        cause: Option<anyhow::Error>,
    },
}

impl DvmError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        DvmError::InvalidArgument(message.into())
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        DvmError::InvalidOperation(message.into())
    }

    pub fn runtime_with(message: impl Into<String>, cause: impl Into<anyhow::Error>) -> Self {
        DvmError::Runtime {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            DvmError::InvalidArgument(_) => EXIT_INVALID_ARGUMENT,
            DvmError::InvalidOperation(_) => EXIT_INVALID_OPERATION,
            DvmError::Runtime { .. } => EXIT_RUNTIME_ERROR,
        }
    }

    /// Underlying error chain, shown only in debug mode.
    pub fn detail(&self) -> Option<String> {
        match self {
            DvmError::Runtime {
                cause: Some(cause), ..
            } => Some(format!("{:#}", cause)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_exit_codes_are_distinct() {
        assert_eq!(DvmError::invalid_argument("x").exit_code(), 127);
        assert_eq!(DvmError::invalid_operation("x").exit_code(), 3);
        assert_eq!(DvmError::runtime_with("x", anyhow!("io")).exit_code(), 1);
    }

    #[test]
    fn test_detail_only_for_runtime_causes() {
        let err = DvmError::runtime_with("Unable to remove alias", anyhow!("permission denied"));
        assert_eq!(err.to_string(), "Unable to remove alias");
        assert_eq!(err.detail().as_deref(), Some("permission denied"));

        let bare = DvmError::Runtime {
            message: "no cause".to_string(),
            cause: None,
        };
        assert!(bare.detail().is_none());
        assert!(DvmError::invalid_operation("nope").detail().is_none());
    }
}
