use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{ApplicationStatus, CascadeReport, Identity, Job, JobId, JobPosting};
use super::error::BoardError;
use super::repository::{BoardRepository, Clock, RepositoryError};
use super::search::JobFilter;
use super::validation;
use super::views::{ApplicantView, Dashboard, EmployerJobView, SeekerApplicationView};

/// Job postings owned by employers, plus the read views built on top of them.
pub struct JobCatalog<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> JobCatalog<R>
where
    R: BoardRepository + 'static,
{
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub fn create_job(&self, employer: &Identity, posting: &JobPosting) -> Result<Job, BoardError> {
        if !employer.is_employer() {
            warn!(user_id = %employer.user_id, "non-employer attempted to post a job");
            return Err(BoardError::Forbidden("only employers can post jobs"));
        }

        let job = validation::new_job(posting, employer.user_id, self.clock.now())?;
        let stored = self.repository.insert_job(job)?;
        info!(job_id = %stored.id, employer_id = %employer.user_id, "job posted");
        Ok(stored)
    }

    /// Every job, newest first.
    pub fn list_jobs(&self) -> Result<Vec<Job>, BoardError> {
        self.search_jobs(&JobFilter::default())
    }

    pub fn search_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, BoardError> {
        Ok(self.repository.search_jobs(filter)?)
    }

    pub fn job(&self, id: JobId) -> Result<Job, BoardError> {
        self.repository
            .job(id)?
            .ok_or_else(|| BoardError::job_not_found(id))
    }

    /// Deletes a job with its applications and their details in one repository transaction.
    pub fn delete_job(
        &self,
        requester: &Identity,
        job_id: JobId,
    ) -> Result<CascadeReport, BoardError> {
        if !requester.is_employer() {
            warn!(user_id = %requester.user_id, %job_id, "non-employer attempted job delete");
            return Err(BoardError::Forbidden("only employers can delete jobs"));
        }

        let job = self.job(job_id)?;
        if !job.is_owned_by(requester) {
            warn!(user_id = %requester.user_id, %job_id, "job delete by non-owner refused");
            return Err(BoardError::Forbidden("job belongs to another employer"));
        }

        let report = self
            .repository
            .delete_job_cascade(job_id)
            .map_err(|err| match err {
                RepositoryError::NotFound => BoardError::job_not_found(job_id),
                other => other.into(),
            })?;
        info!(
            %job_id,
            applications = report.applications,
            details = report.details,
            "job deleted"
        );
        Ok(report)
    }

    pub fn dashboard(&self, requester: &Identity) -> Result<Dashboard, BoardError> {
        if requester.is_employer() {
            self.employer_dashboard(requester)
        } else {
            self.seeker_dashboard(requester)
        }
    }

    fn employer_dashboard(&self, employer: &Identity) -> Result<Dashboard, BoardError> {
        let mut jobs = Vec::new();
        for job in self.repository.jobs_by_employer(employer.user_id)? {
            let applications = self.repository.applications_for_job(job.id)?;
            let mut applicants = Vec::with_capacity(applications.len());
            for application in applications {
                let Some(applicant) = self.repository.user(application.applicant_id)? else {
                    continue;
                };
                applicants.push(ApplicantView {
                    user_id: applicant.id,
                    username: applicant.username,
                    applied_at: application.applied_at,
                    application_id: application.id,
                    status: application.status,
                    details: self.repository.details(application.id)?,
                });
            }

            jobs.push(EmployerJobView {
                applicant_count: applicants.len(),
                job,
                applicants,
            });
        }
        Ok(Dashboard::Employer { jobs })
    }

    fn seeker_dashboard(&self, seeker: &Identity) -> Result<Dashboard, BoardError> {
        let mut applications = Vec::new();
        for application in self.repository.applications_by_applicant(seeker.user_id)? {
            let Some(job) = self.repository.job(application.job_id)? else {
                continue;
            };
            applications.push(SeekerApplicationView {
                application_id: application.id,
                status: application.status,
                applied_at: application.applied_at,
                job_id: job.id,
                job_title: job.title,
                company: job.company,
                location: job.location,
                can_submit_details: application.status == ApplicationStatus::Accepted,
            });
        }
        Ok(Dashboard::Seeker { applications })
    }
}
