//! Credential-provisioning seam.
//!
//! An external identity system backs each login code with a real credential,
//! created lazily the first time a code is seen. The core's contract is small:
//! a session-equivalent token for `(code, tenant)`, and the reverse lookup a
//! resume needs. Token transport encoding belongs to the collaborator.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;

/// Opaque session token handed back to the shell for storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("provisioning disabled: {0}")]
    ProvisioningDisabled(String),

    #[error("unknown or expired token")]
    UnknownToken,

    #[error("identity backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait CredentialBroker: Send + Sync {
    /// Token for `(code, tenant)`, provisioning the backing credential on
    /// first sight if the identity system requires one.
    async fn issue(&self, code: &str, school_id: Option<&str>) -> Result<SessionToken, CredentialError>;

    /// Map a previously-issued token back to its login code, for `resume`.
    async fn code_for(&self, token: &SessionToken) -> Result<String, CredentialError>;
}

/// In-process broker deriving stable tokens by hashing `(code, tenant)`.
/// Serves the offline mode and tests; a live deployment wires a real identity
/// collaborator behind the same trait.
#[derive(Default)]
pub struct DerivedCredentialBroker {
    issued: Mutex<HashMap<String, String>>,
}

impl DerivedCredentialBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn derive(code: &str, school_id: Option<&str>) -> String {
        let mut hasher = Sha256::new();
        hasher.update(code.as_bytes());
        hasher.update([0x1f]);
        hasher.update(school_id.unwrap_or("-").as_bytes());
        let hash = format!("{:x}", hasher.finalize());

        // First 16 characters keep tokens short but stable per (code, tenant)
        format!("tok_{}", &hash[..16])
    }
}

#[async_trait]
impl CredentialBroker for DerivedCredentialBroker {
    async fn issue(&self, code: &str, school_id: Option<&str>) -> Result<SessionToken, CredentialError> {
        let token = Self::derive(code, school_id);
        let mut issued = self
            .issued
            .lock()
            .map_err(|_| CredentialError::Backend("credential store poisoned".to_string()))?;
        issued.insert(token.clone(), code.to_string());
        Ok(SessionToken::new(token))
    }

    async fn code_for(&self, token: &SessionToken) -> Result<String, CredentialError> {
        let issued = self
            .issued
            .lock()
            .map_err(|_| CredentialError::Backend("credential store poisoned".to_string()))?;
        issued.get(token.as_str()).cloned().ok_or(CredentialError::UnknownToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tokens_are_stable_per_code_and_tenant() {
        let broker = DerivedCredentialBroker::new();
        let a = broker.issue("g1", Some("T1")).await.unwrap();
        let b = broker.issue("g1", Some("T1")).await.unwrap();
        let c = broker.issue("g1", Some("T2")).await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn resume_lookup_round_trips() {
        let broker = DerivedCredentialBroker::new();
        let token = broker.issue("g1", Some("T1")).await.unwrap();
        assert_eq!(broker.code_for(&token).await.unwrap(), "g1");

        let stranger = SessionToken::new("tok_ffffffffffffffff");
        assert!(matches!(
            broker.code_for(&stranger).await,
            Err(CredentialError::UnknownToken)
        ));
    }
}
