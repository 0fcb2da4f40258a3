use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    ApplicationDetails, ApplicationId, ApplicationStatus, Identity, Job, JobId, UserId,
};
use super::search::JobFilter;

/// Listing page payload for `/` and `/search`.
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer: Option<Identity>,
    pub user_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<JobFilter>,
    pub jobs: Vec<Job>,
}

/// `/my_jobs` payload; the shape depends on the caller's role.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Dashboard {
    Employer { jobs: Vec<EmployerJobView> },
    Seeker { applications: Vec<SeekerApplicationView> },
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployerJobView {
    pub job: Job,
    pub applicant_count: usize,
    pub applicants: Vec<ApplicantView>,
}

/// One applicant row of an employer's job, joined with the stored profile if any.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicantView {
    pub user_id: UserId,
    pub username: String,
    pub applied_at: DateTime<Utc>,
    pub application_id: ApplicationId,
    pub status: ApplicationStatus,
    pub details: Option<ApplicationDetails>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeekerApplicationView {
    pub application_id: ApplicationId,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub job_id: JobId,
    pub job_title: String,
    pub company: String,
    pub location: String,
    /// Seekers can only submit profile details once accepted.
    pub can_submit_details: bool,
}
