use thiserror::Error;

use murmur_db::StoreError;
use murmur_types::models::Role;

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("permission denied: requires {required}, caller is {actual}")]
    Denied { required: Role, actual: Role },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Everything a command handler can fail with. Resolved at the router into
/// a fixed reply; never escalated past it.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("permission denied: requires {required}")]
    PermissionDenied { required: Role },

    /// Malformed or missing arguments; carries the usage string.
    #[error("bad input, usage: {0}")]
    Input(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<GuardError> for CommandError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Denied { required, .. } => CommandError::PermissionDenied { required },
            GuardError::Store(e) => CommandError::Store(e),
        }
    }
}
