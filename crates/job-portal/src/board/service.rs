use std::sync::Arc;

use axum::http::HeaderMap;

use super::catalog::JobCatalog;
use super::credentials::CredentialStore;
use super::domain::Identity;
use super::error::BoardError;
use super::repository::{BoardRepository, Clock, SystemClock};
use super::session::{token_from_headers, SessionKeys};
use super::workflow::ApplicationWorkflow;
use crate::config::BoardConfig;

/// Service composing the credential store, session keys, job catalog and application
/// workflow over one shared repository.
pub struct JobBoard<R> {
    catalog: JobCatalog<R>,
    workflow: ApplicationWorkflow<R>,
    credentials: CredentialStore<R>,
    sessions: SessionKeys,
}

impl<R> JobBoard<R>
where
    R: BoardRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: &BoardConfig) -> Result<Self, BoardError> {
        Self::with_clock(repository, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        repository: Arc<R>,
        config: &BoardConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, BoardError> {
        let sessions = SessionKeys::new(config.secret_key.as_bytes())?;
        Ok(Self {
            catalog: JobCatalog::new(repository.clone(), clock.clone()),
            workflow: ApplicationWorkflow::new(
                repository.clone(),
                clock,
                config.transition_policy,
            ),
            credentials: CredentialStore::new(repository),
            sessions,
        })
    }

    pub fn catalog(&self) -> &JobCatalog<R> {
        &self.catalog
    }

    pub fn workflow(&self) -> &ApplicationWorkflow<R> {
        &self.workflow
    }

    pub fn credentials(&self) -> &CredentialStore<R> {
        &self.credentials
    }

    pub fn sessions(&self) -> &SessionKeys {
        &self.sessions
    }

    /// Verifies the credentials and issues a session token for the resulting identity.
    pub fn login(&self, username: &str, password: &str) -> Result<(Identity, String), BoardError> {
        let identity = self.credentials.authenticate(username, password)?;
        let token = self.sessions.issue(identity.user_id);
        Ok((identity, token))
    }

    /// Resolves the caller from request headers. Missing, tampered or stale tokens yield `None`.
    pub fn resolve(&self, headers: &HeaderMap) -> Result<Option<Identity>, BoardError> {
        let Some(user_id) = token_from_headers(headers).and_then(|token| self.sessions.verify(token))
        else {
            return Ok(None);
        };
        self.credentials.identity(user_id)
    }
}
