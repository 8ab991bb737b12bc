use foodify_shared::{ErrorEnvelope, ErrorKind};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok = 0,
    Internal = 1,
    InvalidInput = 2,
    Io = 3,
    NotFound = 4,
    Upstream = 5,
}

impl ExitCode {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Exit code for a failed operation.
    #[must_use]
    pub fn for_envelope(error: &ErrorEnvelope) -> Self {
        if error.is_not_found() {
            return Self::NotFound;
        }
        match (error.code.namespace(), error.kind) {
            ("config" | "prefs", _) | (_, ErrorKind::Expected) => Self::InvalidInput,
            (_, ErrorKind::Invariant) => Self::Internal,
            _ => Self::Upstream,
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("{}", .0.message)]
    Operation(Box<ErrorEnvelope>),
}

impl CliError {
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidInput(_) => ExitCode::InvalidInput,
            Self::Io(_) => ExitCode::Io,
            Self::Serialization(_) => ExitCode::Internal,
            Self::Operation(error) => ExitCode::for_envelope(error),
        }
    }
}

impl From<ErrorEnvelope> for CliError {
    fn from(error: ErrorEnvelope) -> Self {
        Self::Operation(Box::new(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodify_shared::{ErrorClass, ErrorCode};

    #[test]
    fn envelopes_map_to_exit_codes() {
        let not_found = ErrorEnvelope::expected(ErrorCode::not_found(), "Product not found");
        let config = ErrorEnvelope::expected(ErrorCode::new("config", "invalid_json"), "bad");
        let upstream = ErrorEnvelope::unexpected(
            ErrorCode::rate_limited(),
            "slow down",
            ErrorClass::Retriable,
        );

        assert_eq!(ExitCode::for_envelope(&not_found), ExitCode::NotFound);
        assert_eq!(ExitCode::for_envelope(&config), ExitCode::InvalidInput);
        assert_eq!(ExitCode::for_envelope(&upstream), ExitCode::Upstream);
        assert_eq!(CliError::from(upstream).exit_code().as_u8(), 5);
    }
}
