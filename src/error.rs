//! Session failure taxonomy.
//!
//! `SessionBootstrapper` is the sole boundary converting lower-level errors into
//! these kinds; nothing below it leaks an implementation-specific message to the
//! UI. Each kind maps to exactly one stable user-facing message and code.

use std::time::Duration;

/// Terminal failure of a resolve/resume attempt. Any of these leaves no partial
/// session behind (fail-closed).
#[derive(Debug, thiserror::Error)]
pub enum SessionFailure {
    /// No role table matched the presented code.
    #[error("no role matched the presented login code")]
    InvalidCode,

    /// The backend rejected the tenant read for policy reasons, or the tenant
    /// itself is in a state only an operator can fix (e.g. deactivated).
    #[error("tenant read rejected by backend policy: {0}")]
    PolicyMissing(String),

    /// The auxiliary credential step could not create or validate a token.
    #[error("credential provisioning failed: {0}")]
    CredentialProvisioningFailed(String),

    /// A code matched, but the resolved entity could not be located in the
    /// subsequently-fetched tenant view - data drifted between the two reads.
    #[error("resolved entity missing from tenant view: {0}")]
    InternalInconsistency(String),

    #[error("session bootstrap timed out after {0:?}")]
    Timeout(Duration),

    #[error("backend i/o error: {0}")]
    Io(String),
}

impl SessionFailure {
    /// Stable code for client-side handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            SessionFailure::InvalidCode => "INVALID_CODE",
            SessionFailure::PolicyMissing(_) => "POLICY_MISSING",
            SessionFailure::CredentialProvisioningFailed(_) => "CREDENTIAL_PROVISIONING_FAILED",
            SessionFailure::InternalInconsistency(_) => "INTERNAL_INCONSISTENCY",
            SessionFailure::Timeout(_) => "TIMEOUT",
            SessionFailure::Io(_) => "IO_ERROR",
        }
    }

    /// The one user-facing message per kind. Detail stays in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            SessionFailure::InvalidCode => "Invalid login code",
            SessionFailure::PolicyMissing(_) => {
                "Your school's data is not accessible right now. Please contact your administrator."
            }
            SessionFailure::CredentialProvisioningFailed(_) => {
                "We could not sign you in. Please contact your administrator."
            }
            SessionFailure::InternalInconsistency(_) => {
                "Something went wrong loading your school. Please try again."
            }
            SessionFailure::Timeout(_) => "The connection timed out. Please try again.",
            SessionFailure::Io(_) => "Could not reach the server. Please try again.",
        }
    }

    /// Kinds an operator must act on get logged with full detail; the rest only
    /// matter to the user retrying.
    pub fn log(&self) {
        match self {
            SessionFailure::PolicyMissing(detail) => {
                tracing::error!(code = self.error_code(), %detail, "tenant policy misconfiguration");
            }
            SessionFailure::CredentialProvisioningFailed(detail) => {
                tracing::error!(code = self.error_code(), %detail, "credential provisioning failure");
            }
            SessionFailure::InternalInconsistency(detail) => {
                tracing::error!(code = self.error_code(), %detail, "tenant view inconsistency");
            }
            other => {
                tracing::warn!(code = other.error_code(), "session bootstrap failed");
            }
        }
    }
}

impl From<crate::directory::DirectoryError> for SessionFailure {
    fn from(err: crate::directory::DirectoryError) -> Self {
        match err {
            crate::directory::DirectoryError::PermissionDenied(detail) => {
                SessionFailure::PolicyMissing(detail)
            }
            // A tenant that vanished between probe and fetch is drift, not a
            // user-resolvable condition.
            crate::directory::DirectoryError::TenantNotFound(id) => {
                SessionFailure::InternalInconsistency(format!("tenant {} not found after probe match", id))
            }
            crate::directory::DirectoryError::Io(detail) => SessionFailure::Io(detail),
        }
    }
}

impl From<crate::credentials::CredentialError> for SessionFailure {
    fn from(err: crate::credentials::CredentialError) -> Self {
        SessionFailure::CredentialProvisioningFailed(err.to_string())
    }
}

impl From<crate::denormalize::ShapeError> for SessionFailure {
    fn from(err: crate::denormalize::ShapeError) -> Self {
        // The payload came from a tenant the resolver just matched; a shape
        // mismatch means the stored record drifted from the contract.
        SessionFailure::InternalInconsistency(err.to_string())
    }
}
