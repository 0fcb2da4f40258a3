use chrono::{DateTime, Utc};

use super::domain::{
    Application, ApplicationDetails, ApplicationId, ApplicationStatus, CascadeReport,
    DetailsUpsert, Job, JobId, NewApplication, NewJob, NewUser, User, UserId,
};
use super::search::JobFilter;

/// Storage abstraction so the catalog and workflow can be exercised in isolation.
///
/// Every method is one atomic unit: implementations must never leave a partially applied
/// cascade or upsert behind.
pub trait BoardRepository: Send + Sync {
    /// Fails with [`RepositoryError::Conflict`] when the username is taken.
    fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError>;
    fn user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
    fn user_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;
    fn count_users(&self) -> Result<usize, RepositoryError>;

    fn insert_job(&self, job: NewJob) -> Result<Job, RepositoryError>;
    fn job(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;
    /// Jobs matching the filter, newest first. An empty filter lists everything.
    fn search_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, RepositoryError>;
    fn jobs_by_employer(&self, employer_id: UserId) -> Result<Vec<Job>, RepositoryError>;
    /// Removes the job's application details, then its applications, then the job.
    fn delete_job_cascade(&self, id: JobId) -> Result<CascadeReport, RepositoryError>;

    /// Fails with [`RepositoryError::Conflict`] when the seeker already applied to the job.
    fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, RepositoryError>;
    fn application(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn application_for(
        &self,
        job_id: JobId,
        applicant_id: UserId,
    ) -> Result<Option<Application>, RepositoryError>;
    fn applications_for_job(&self, job_id: JobId) -> Result<Vec<Application>, RepositoryError>;
    fn applications_by_applicant(
        &self,
        applicant_id: UserId,
    ) -> Result<Vec<Application>, RepositoryError>;
    fn update_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, RepositoryError>;

    fn upsert_details(&self, details: ApplicationDetails)
        -> Result<DetailsUpsert, RepositoryError>;
    fn details(
        &self,
        application_id: ApplicationId,
    ) -> Result<Option<ApplicationDetails>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Source of creation timestamps for jobs and applications.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
