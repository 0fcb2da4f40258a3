use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Identifier of a registered user.
    UserId
);
record_id!(
    /// Identifier of a job posting.
    JobId
);
record_id!(
    /// Identifier of a seeker's application to a job.
    ApplicationId
);

/// Role flag fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Employer,
    Seeker,
}

impl UserRole {
    pub const fn from_employer_flag(is_employer: bool) -> Self {
        if is_employer {
            UserRole::Employer
        } else {
            UserRole::Seeker
        }
    }

    pub const fn is_employer(self) -> bool {
        matches!(self, UserRole::Employer)
    }

    pub const fn label(self) -> &'static str {
        match self {
            UserRole::Employer => "employer",
            UserRole::Seeker => "seeker",
        }
    }
}

/// Stored user row. The credential hash never leaves the process in responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
}

impl User {
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.id,
            username: self.username.clone(),
            role: self.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Authenticated caller handed to every catalog and workflow operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
    pub role: UserRole,
}

impl Identity {
    pub const fn is_employer(&self) -> bool {
        self.role.is_employer()
    }
}

/// Raw job form as submitted by an employer. Missing fields deserialize as empty strings so
/// validation can report all of them at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobPosting {
    pub title: String,
    pub description: String,
    pub salary: String,
    pub country: String,
    pub state: String,
    pub category: String,
    pub job_type: String,
    pub company: String,
}

/// Validated job ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub salary: String,
    pub country: String,
    pub state: String,
    pub location: String,
    pub category: String,
    pub job_type: String,
    pub company: String,
    pub posted_at: DateTime<Utc>,
    pub employer_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub salary: String,
    pub country: String,
    pub state: String,
    pub location: String,
    pub category: String,
    pub job_type: String,
    pub company: String,
    pub posted_at: DateTime<Utc>,
    pub employer_id: UserId,
}

impl Job {
    pub fn from_new(id: JobId, job: NewJob) -> Self {
        Self {
            id,
            title: job.title,
            description: job.description,
            salary: job.salary,
            country: job.country,
            state: job.state,
            location: job.location,
            category: job.category,
            job_type: job.job_type,
            company: job.company,
            posted_at: job.posted_at,
            employer_id: job.employer_id,
        }
    }

    pub fn is_owned_by(&self, identity: &Identity) -> bool {
        self.employer_id == identity.user_id
    }
}

/// Location label shown on listings and matched by the location search filter.
pub fn derive_location(state: &str, country: &str) -> String {
    format!("{state}, {country}")
}

/// Lifecycle status of an application.
///
/// `pending -> {accepted, rejected}`, `accepted -> {hired, canceled}`; rejected, hired and
/// canceled have no outgoing edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
    Hired,
    Canceled,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Hired => "hired",
            ApplicationStatus::Canceled => "canceled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Rejected | ApplicationStatus::Hired | ApplicationStatus::Canceled
        )
    }

    /// Whether `self -> next` is an edge of the lifecycle graph.
    pub const fn can_transition_to(self, next: ApplicationStatus) -> bool {
        matches!(
            (self, next),
            (ApplicationStatus::Pending, ApplicationStatus::Accepted)
                | (ApplicationStatus::Pending, ApplicationStatus::Rejected)
                | (ApplicationStatus::Accepted, ApplicationStatus::Hired)
                | (ApplicationStatus::Accepted, ApplicationStatus::Canceled)
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(ApplicationStatus::Pending),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "hired" => Ok(ApplicationStatus::Hired),
            "canceled" => Ok(ApplicationStatus::Canceled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Employer-triggered status changes exposed over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusAction {
    Accept,
    Reject,
    Hire,
    CancelHire,
}

impl StatusAction {
    pub const fn target(self) -> ApplicationStatus {
        match self {
            StatusAction::Accept => ApplicationStatus::Accepted,
            StatusAction::Reject => ApplicationStatus::Rejected,
            StatusAction::Hire => ApplicationStatus::Hired,
            StatusAction::CancelHire => ApplicationStatus::Canceled,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            StatusAction::Accept => "accept",
            StatusAction::Reject => "reject",
            StatusAction::Hire => "hire",
            StatusAction::CancelHire => "cancel_hire",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub job_id: JobId,
    pub applicant_id: UserId,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub applicant_id: UserId,
    pub applied_at: DateTime<Utc>,
    pub status: ApplicationStatus,
}

impl Application {
    pub fn from_new(id: ApplicationId, application: NewApplication) -> Self {
        Self {
            id,
            job_id: application.job_id,
            applicant_id: application.applicant_id,
            applied_at: application.applied_at,
            status: ApplicationStatus::Pending,
        }
    }
}

/// Profile form submitted by a seeker once accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSubmission {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub qualification: String,
    pub experience: String,
    pub percentage_cgpa: String,
    pub skills: String,
    pub hobbies: Option<String>,
}

/// Stored applicant profile, one per application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationDetails {
    pub application_id: ApplicationId,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub qualification: String,
    pub experience: String,
    pub percentage_cgpa: String,
    pub skills: String,
    pub hobbies: Option<String>,
}

/// Outcome of an applicant profile upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailsUpsert {
    Created,
    Updated,
}

/// Rows removed by a cascading job delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub applications: usize,
    pub details: usize,
}
