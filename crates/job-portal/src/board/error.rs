use super::credentials::CredentialError;
use super::domain::{ApplicationId, ApplicationStatus, JobId};
use super::repository::RepositoryError;
use super::validation::ValidationError;

/// Error raised by catalog, workflow and credential operations.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("authentication required")]
    Unauthenticated,
    #[error("unauthorized: {0}")]
    Forbidden(&'static str),
    #[error("already applied to job {job_id} (application {application_id})")]
    DuplicateApplication {
        job_id: JobId,
        application_id: ApplicationId,
    },
    #[error("username already exists")]
    UsernameTaken,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("application cannot move from {from} to {to}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl BoardError {
    pub(crate) fn job_not_found(id: JobId) -> Self {
        BoardError::NotFound {
            entity: "job",
            id: id.0,
        }
    }

    pub(crate) fn application_not_found(id: ApplicationId) -> Self {
        BoardError::NotFound {
            entity: "application",
            id: id.0,
        }
    }
}
