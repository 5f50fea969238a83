use compensate::RollbackError;
use thiserror::Error;

use crate::services::ServiceError;

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("signup for '{customer}' failed and was rolled back")]
    SignupFailed {
        customer: String,
        #[source]
        source: ServiceError,
    },

    #[error(
        "signup for '{customer}' failed ({reason}) and rollback left external state inconsistent"
    )]
    RollbackFailed {
        customer: String,
        reason: ServiceError,
        #[source]
        source: RollbackError<ServiceError>,
    },

    #[error("failed to render JSON output")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// 1 for an ordinary failure, 2 when compensations failed and a human
    /// needs to look at the collaborators.
    pub(crate) fn exit_code(&self) -> u8 {
        match self {
            Self::RollbackFailed { .. } => 2,
            Self::SignupFailed { .. } | Self::Json(_) => 1,
        }
    }
}

pub(crate) type Result<T> = std::result::Result<T, CliError>;
