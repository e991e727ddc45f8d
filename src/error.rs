//! Error types for rpn-control.

use crate::types::{GroupId, RpnType};

/// Remote error code returned when an RPN group no longer exists.
pub const GROUP_NOT_FOUND_CODE: i64 = 7;

/// Result type alias using [`RpnError`].
pub type RpnResult<T> = Result<T, RpnError>;

/// Errors that can occur while talking to the RPN control plane.
#[derive(Debug, thiserror::Error)]
pub enum RpnError {
    /// Transport-level failure (request construction or network I/O).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A response body did not decode into the expected shape.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Error reported by the remote API through its error envelope.
    #[error("{message} (code {code})")]
    Api {
        /// Numeric error code from the envelope.
        code: i64,
        /// Human-readable message from the envelope.
        message: String,
    },

    /// A mutation endpoint answered with a literal `false`.
    #[error("operation refused by the remote API")]
    Rejected,

    /// A response body was neither the expected payload nor a recognizable
    /// error envelope.
    #[error("unexpected answer from server: {0}")]
    UnexpectedResponse(String),

    /// The group type cannot change once the group exists.
    #[error("rpn type can't change after creation (remote is {current}, requested {requested})")]
    TypeImmutable {
        /// Type reported by the remote snapshot.
        current: RpnType,
        /// Type carried by the desired state.
        requested: RpnType,
    },

    /// The group did not settle within the caller's wait budget.
    #[error("timeout waiting for group {group} changes to apply")]
    Timeout {
        /// Group that was being waited on.
        group: GroupId,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl RpnError {
    /// Create an API error from a decoded envelope.
    #[must_use]
    pub fn api(code: i64, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
        }
    }

    /// Whether this is the remote "group not found" error.
    ///
    /// [`Reconciler::delete`](crate::reconcile::Reconciler::delete) maps this
    /// specific error to success, since the group may already be gone by the
    /// time the delete or the follow-up poll observes it.
    #[must_use]
    pub fn is_group_not_found(&self) -> bool {
        matches!(self, Self::Api { code, .. } if *code == GROUP_NOT_FOUND_CODE)
    }
}
