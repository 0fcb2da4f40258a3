//! Job board: employers post jobs, seekers apply, employers move applications through
//! their lifecycle and accepted seekers submit a profile.
//!
//! Everything persists through [`BoardRepository`], with an in-memory implementation for
//! tests and demos and a SQLite implementation for deployments.

pub mod catalog;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod memory;
pub mod repository;
pub mod router;
pub mod schema;
pub mod search;
pub mod service;
pub mod session;
pub mod sqlite;
pub(crate) mod validation;
pub mod views;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use catalog::JobCatalog;
pub use credentials::{CredentialError, CredentialStore, PasswordHasher, ScryptHasher};
pub use domain::{
    derive_location, Application, ApplicationDetails, ApplicationId, ApplicationStatus,
    CascadeReport, DetailsUpsert, Identity, Job, JobId, JobPosting, NewApplication, NewJob,
    NewUser, ProfileSubmission, StatusAction, UnknownStatus, User, UserId, UserRole,
};
pub use error::BoardError;
pub use memory::InMemoryBoardRepository;
pub use repository::{BoardRepository, Clock, RepositoryError, SystemClock};
pub use router::board_router;
pub use schema::init_schema;
pub use search::JobFilter;
pub use service::JobBoard;
pub use session::{SessionKeys, SESSION_COOKIE};
pub use sqlite::SqliteBoardRepository;
pub use validation::ValidationError;
pub use views::{ApplicantView, Dashboard, EmployerJobView, ListingView, SeekerApplicationView};
pub use workflow::{ApplicationWorkflow, TransitionPolicy};
