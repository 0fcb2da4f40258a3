use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{
    Application, ApplicationDetails, ApplicationId, ApplicationStatus, DetailsUpsert, Identity,
    JobId, NewApplication, ProfileSubmission, StatusAction,
};
use super::error::BoardError;
use super::repository::{BoardRepository, Clock, RepositoryError};
use super::validation;

/// How strictly employer status actions follow the lifecycle graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Every action overwrites the current status.
    #[default]
    Permissive,
    /// Only edges of [`ApplicationStatus::can_transition_to`] are accepted.
    Strict,
}

impl TransitionPolicy {
    pub const fn permits(self, from: ApplicationStatus, to: ApplicationStatus) -> bool {
        match self {
            TransitionPolicy::Permissive => true,
            TransitionPolicy::Strict => from.can_transition_to(to),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            TransitionPolicy::Permissive => "permissive",
            TransitionPolicy::Strict => "strict",
        }
    }
}

impl fmt::Display for TransitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(TransitionPolicy::Permissive),
            "strict" => Ok(TransitionPolicy::Strict),
            other => Err(other.to_string()),
        }
    }
}

/// Seeker applications and the employer-driven status lifecycle.
pub struct ApplicationWorkflow<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
    policy: TransitionPolicy,
}

impl<R> ApplicationWorkflow<R>
where
    R: BoardRepository + 'static,
{
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>, policy: TransitionPolicy) -> Self {
        Self {
            repository,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Creates a pending application, or reports the existing one as a duplicate.
    pub fn apply(&self, seeker: &Identity, job_id: JobId) -> Result<Application, BoardError> {
        if seeker.is_employer() {
            warn!(user_id = %seeker.user_id, %job_id, "employer attempted to apply");
            return Err(BoardError::Forbidden("employers cannot apply to jobs"));
        }

        let job = self
            .repository
            .job(job_id)?
            .ok_or_else(|| BoardError::job_not_found(job_id))?;
        if let Some(existing) = self.repository.application_for(job.id, seeker.user_id)? {
            return Err(self.duplicate(seeker, &existing));
        }

        let application = NewApplication {
            job_id: job.id,
            applicant_id: seeker.user_id,
            applied_at: self.clock.now(),
        };
        match self.repository.insert_application(application) {
            Ok(stored) => {
                info!(
                    application_id = %stored.id,
                    %job_id,
                    applicant_id = %seeker.user_id,
                    "application submitted"
                );
                Ok(stored)
            }
            // A concurrent request for the same pair won the insert.
            Err(RepositoryError::Conflict) => {
                let existing = self
                    .repository
                    .application_for(job.id, seeker.user_id)?
                    .ok_or(RepositoryError::Conflict)?;
                Err(self.duplicate(seeker, &existing))
            }
            Err(RepositoryError::NotFound) => Err(BoardError::job_not_found(job_id)),
            Err(other) => Err(other.into()),
        }
    }

    fn duplicate(&self, seeker: &Identity, existing: &Application) -> BoardError {
        warn!(
            application_id = %existing.id,
            job_id = %existing.job_id,
            applicant_id = %seeker.user_id,
            "duplicate application ignored"
        );
        BoardError::DuplicateApplication {
            job_id: existing.job_id,
            application_id: existing.id,
        }
    }

    /// Applies an employer action after checking job ownership and the transition policy.
    pub fn set_status(
        &self,
        requester: &Identity,
        application_id: ApplicationId,
        action: StatusAction,
    ) -> Result<Application, BoardError> {
        let application = self.application(application_id)?;
        let job = self
            .repository
            .job(application.job_id)?
            .ok_or_else(|| BoardError::job_not_found(application.job_id))?;
        if !job.is_owned_by(requester) {
            warn!(
                user_id = %requester.user_id,
                %application_id,
                action = action.label(),
                "status change by non-owner refused"
            );
            return Err(BoardError::Forbidden(
                "only the job's employer can change application status",
            ));
        }

        let next = action.target();
        if !self.policy.permits(application.status, next) {
            return Err(BoardError::InvalidTransition {
                from: application.status,
                to: next,
            });
        }

        let updated = self
            .repository
            .update_status(application_id, next)
            .map_err(|err| match err {
                RepositoryError::NotFound => BoardError::application_not_found(application_id),
                other => other.into(),
            })?;
        info!(
            %application_id,
            from = %application.status,
            to = %updated.status,
            terminal = updated.status.is_terminal(),
            "application status changed"
        );
        Ok(updated)
    }

    pub fn accept(
        &self,
        requester: &Identity,
        application_id: ApplicationId,
    ) -> Result<Application, BoardError> {
        self.set_status(requester, application_id, StatusAction::Accept)
    }

    pub fn reject(
        &self,
        requester: &Identity,
        application_id: ApplicationId,
    ) -> Result<Application, BoardError> {
        self.set_status(requester, application_id, StatusAction::Reject)
    }

    pub fn hire(
        &self,
        requester: &Identity,
        application_id: ApplicationId,
    ) -> Result<Application, BoardError> {
        self.set_status(requester, application_id, StatusAction::Hire)
    }

    pub fn cancel_hire(
        &self,
        requester: &Identity,
        application_id: ApplicationId,
    ) -> Result<Application, BoardError> {
        self.set_status(requester, application_id, StatusAction::CancelHire)
    }

    /// The application and any stored profile, for pre-filling the details form.
    pub fn details_form(
        &self,
        seeker: &Identity,
        application_id: ApplicationId,
    ) -> Result<(Application, Option<ApplicationDetails>), BoardError> {
        let application = self.details_access(seeker, application_id)?;
        let details = self.repository.details(application.id)?;
        Ok((application, details))
    }

    /// Creates or overwrites the applicant profile of an accepted application.
    pub fn submit_details(
        &self,
        seeker: &Identity,
        application_id: ApplicationId,
        submission: &ProfileSubmission,
    ) -> Result<(ApplicationDetails, DetailsUpsert), BoardError> {
        let application = self.details_access(seeker, application_id)?;
        let details = validation::application_details(application.id, submission)?;
        let outcome = self.repository.upsert_details(details.clone())?;
        info!(%application_id, ?outcome, "applicant details stored");
        Ok((details, outcome))
    }

    fn details_access(
        &self,
        seeker: &Identity,
        application_id: ApplicationId,
    ) -> Result<Application, BoardError> {
        let application = self.application(application_id)?;
        if application.applicant_id != seeker.user_id
            || application.status != ApplicationStatus::Accepted
        {
            warn!(
                user_id = %seeker.user_id,
                %application_id,
                status = %application.status,
                "details access refused"
            );
            return Err(BoardError::Forbidden(
                "Unauthorized or Application not accepted",
            ));
        }
        Ok(application)
    }

    pub fn application(&self, id: ApplicationId) -> Result<Application, BoardError> {
        self.repository
            .application(id)?
            .ok_or_else(|| BoardError::application_not_found(id))
    }
}
