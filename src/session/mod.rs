//! Session bootstrap façade.
//!
//! Turns "a login code was presented" (or "a stored token was found") into
//! either a populated [`Session`] or a [`SessionFailure`], and owns the
//! offline/demo fallback. The UI calls nothing below this boundary.
//!
//! One logical session per instance: the slot moves Idle -> Resolving ->
//! {Ready, Failed}, back to Idle on logout. Overlapping resolve/resume calls
//! are cancel-and-replace - each attempt takes an epoch, and only the latest
//! epoch may commit to the slot, so two in-flight pipelines can never
//! interleave writes into an inconsistent (role, tenant) pair.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use crate::casing;
use crate::config;
use crate::credentials::{CredentialBroker, DerivedCredentialBroker, SessionToken};
use crate::denormalize;
use crate::directory::TenantDirectory;
use crate::error::SessionFailure;
use crate::fixture::FixtureDirectory;
use crate::identity::{self, ResolvedIdentity, Role};
use crate::model::Tenant;

/// An established session. A value, not ambient state: consumers receive it
/// from the bootstrapper and read it through their own handle.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub role: Role,
    pub actor: ResolvedIdentity,
    /// `None` only for the cross-tenant superuser before a school is chosen.
    pub tenant: Option<Tenant>,
    pub token: SessionToken,
    pub established_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    Idle,
    Resolving,
    Ready,
    Failed,
}

struct Slot {
    state: BootstrapState,
    session: Option<Session>,
}

pub struct SessionBootstrapper {
    directory: Arc<dyn TenantDirectory>,
    credentials: Arc<dyn CredentialBroker>,
    resolve_timeout: Duration,
    epoch: AtomicU64,
    slot: Mutex<Slot>,
}

impl SessionBootstrapper {
    pub fn new(directory: Arc<dyn TenantDirectory>, credentials: Arc<dyn CredentialBroker>) -> Self {
        Self {
            directory,
            credentials,
            resolve_timeout: Duration::from_secs(config::config().session.resolve_timeout_secs),
            epoch: AtomicU64::new(0),
            slot: Mutex::new(Slot { state: BootstrapState::Idle, session: None }),
        }
    }

    /// Override the configured pipeline deadline.
    pub fn with_resolve_timeout(mut self, deadline: Duration) -> Self {
        self.resolve_timeout = deadline;
        self
    }

    /// Demo mode: the fixture tenant set behind the same contracts, no network
    /// I/O anywhere in the pipeline.
    pub fn offline() -> Self {
        Self::new(
            Arc::new(FixtureDirectory::demo()),
            Arc::new(DerivedCredentialBroker::new()),
        )
    }

    /// Pick collaborators per configuration. Offline mode (or a deployment
    /// that supplies no live pair) serves the fixtures; callers cannot tell
    /// which mode is active from the returned shapes.
    pub fn from_config(live: Option<(Arc<dyn TenantDirectory>, Arc<dyn CredentialBroker>)>) -> Self {
        match live {
            Some((directory, credentials)) if !config::config().backend.offline => {
                Self::new(directory, credentials)
            }
            _ => Self::offline(),
        }
    }

    /// Resolve a freshly presented login code into a session.
    pub async fn resolve(&self, code: &str) -> Result<Session, SessionFailure> {
        let epoch = self.begin();
        let outcome = self.run_with_timeout(self.pipeline(code)).await;
        self.commit(epoch, outcome)
    }

    /// Re-establish a session from a previously-issued token. Role is
    /// reconstructed from the token's code with the same matching rules as
    /// [`resolve`](Self::resolve).
    pub async fn resume(&self, token: &SessionToken) -> Result<Session, SessionFailure> {
        let epoch = self.begin();
        let outcome = self
            .run_with_timeout(async {
                let code = self.credentials.code_for(token).await?;
                self.pipeline(&code).await
            })
            .await;
        self.commit(epoch, outcome)
    }

    /// Force reload after a mutation: full re-fetch and re-denormalization of
    /// the current session's tenant. There is no incremental sync.
    pub async fn refresh(&self) -> Result<Session, SessionFailure> {
        let token = {
            let slot = self.lock_slot();
            slot.session.as_ref().map(|s| s.token.clone())
        };
        match token {
            Some(token) => self.resume(&token).await,
            None => Err(SessionFailure::InternalInconsistency(
                "refresh called without an active session".to_string(),
            )),
        }
    }

    pub fn current_session(&self) -> Option<Session> {
        self.lock_slot().session.clone()
    }

    pub fn state(&self) -> BootstrapState {
        self.lock_slot().state
    }

    /// Destroy the session. Also supersedes any in-flight resolve so a stale
    /// pipeline cannot repopulate the slot afterward.
    pub fn logout(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let mut slot = self.lock_slot();
        slot.state = BootstrapState::Idle;
        slot.session = None;
    }

    /// Claim the slot for a new attempt. Entering Resolving clears whatever
    /// session was there: the attempt either replaces it or fails closed.
    fn begin(&self) -> u64 {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let mut slot = self.lock_slot();
        slot.state = BootstrapState::Resolving;
        slot.session = None;
        epoch
    }

    /// Write the outcome, unless a later attempt (or logout) claimed the slot
    /// in the meantime - then the outcome is returned to its caller but the
    /// slot stays with the latest owner.
    fn commit(&self, epoch: u64, outcome: Result<Session, SessionFailure>) -> Result<Session, SessionFailure> {
        if let Err(failure) = &outcome {
            failure.log();
        }

        let mut slot = self.lock_slot();
        if self.epoch.load(Ordering::SeqCst) != epoch {
            tracing::debug!(epoch, "bootstrap outcome superseded; slot untouched");
            return outcome;
        }

        match &outcome {
            Ok(session) => {
                tracing::info!(role = session.role.as_str(), session_id = %session.id, "session established");
                slot.state = BootstrapState::Ready;
                slot.session = Some(session.clone());
            }
            Err(_) => {
                slot.state = BootstrapState::Failed;
                slot.session = None;
            }
        }
        outcome
    }

    async fn run_with_timeout(
        &self,
        pipeline: impl std::future::Future<Output = Result<Session, SessionFailure>>,
    ) -> Result<Session, SessionFailure> {
        let deadline = self.resolve_timeout;
        match tokio::time::timeout(deadline, pipeline).await {
            Ok(outcome) => outcome,
            Err(_) => Err(SessionFailure::Timeout(deadline)),
        }
    }

    async fn pipeline(&self, code: &str) -> Result<Session, SessionFailure> {
        let matched = identity::resolve_code(self.directory.as_ref(), code).await?;
        let token = self.credentials.issue(code, matched.school_id.as_deref()).await?;

        let tenant = match matched.school_id.as_deref() {
            Some(school_id) => Some(self.load_tenant(school_id).await?),
            None => None,
        };

        let actor = identity::attach(&matched, tenant.as_ref())?;

        Ok(Session {
            id: Uuid::new_v4(),
            role: matched.role,
            actor,
            tenant,
            token,
            established_at: Utc::now(),
        })
    }

    async fn load_tenant(&self, school_id: &str) -> Result<Tenant, SessionFailure> {
        let raw = self.directory.fetch_tenant(school_id).await?;
        let domain = casing::to_domain(&raw);
        let tenant = denormalize::denormalize(&domain)?;

        if !tenant.is_active {
            return Err(SessionFailure::PolicyMissing(format!(
                "school {} is deactivated",
                tenant.id
            )));
        }
        Ok(tenant)
    }

    fn lock_slot(&self) -> std::sync::MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
