use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{
    Application, ApplicationDetails, ApplicationId, ApplicationStatus, CascadeReport,
    DetailsUpsert, Job, JobId, NewApplication, NewJob, NewUser, User, UserId,
};
use super::repository::{BoardRepository, RepositoryError};
use super::search::{newest_first, JobFilter};

/// Process-local repository. All tables share one lock so every call is atomic.
#[derive(Default, Clone)]
pub struct InMemoryBoardRepository {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<UserId, User>,
    jobs: BTreeMap<JobId, Job>,
    applications: BTreeMap<ApplicationId, Application>,
    details: BTreeMap<ApplicationId, ApplicationDetails>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

impl InMemoryBoardRepository {
    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl BoardRepository for InMemoryBoardRepository {
    fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.lock()?;
        if tables
            .users
            .values()
            .any(|existing| existing.username == user.username)
        {
            return Err(RepositoryError::Conflict);
        }

        let id = UserId(tables.next_id());
        let stored = User {
            id,
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
        };
        tables.users.insert(id, stored.clone());
        Ok(stored)
    }

    fn user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    fn user_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    fn count_users(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.users.len())
    }

    fn insert_job(&self, job: NewJob) -> Result<Job, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.users.contains_key(&job.employer_id) {
            return Err(RepositoryError::NotFound);
        }

        let id = JobId(tables.next_id());
        let stored = Job::from_new(id, job);
        tables.jobs.insert(id, stored.clone());
        Ok(stored)
    }

    fn job(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.lock()?.jobs.get(&id).cloned())
    }

    fn search_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, RepositoryError> {
        let filter = filter.normalized();
        let mut jobs: Vec<Job> = self
            .lock()?
            .jobs
            .values()
            .filter(|job| filter.matches(job))
            .cloned()
            .collect();
        newest_first(&mut jobs);
        Ok(jobs)
    }

    fn jobs_by_employer(&self, employer_id: UserId) -> Result<Vec<Job>, RepositoryError> {
        let mut jobs: Vec<Job> = self
            .lock()?
            .jobs
            .values()
            .filter(|job| job.employer_id == employer_id)
            .cloned()
            .collect();
        newest_first(&mut jobs);
        Ok(jobs)
    }

    fn delete_job_cascade(&self, id: JobId) -> Result<CascadeReport, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.jobs.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }

        let application_ids: Vec<ApplicationId> = tables
            .applications
            .values()
            .filter(|application| application.job_id == id)
            .map(|application| application.id)
            .collect();

        let mut report = CascadeReport::default();
        for application_id in &application_ids {
            if tables.details.remove(application_id).is_some() {
                report.details += 1;
            }
        }
        for application_id in &application_ids {
            if tables.applications.remove(application_id).is_some() {
                report.applications += 1;
            }
        }
        tables.jobs.remove(&id);
        Ok(report)
    }

    fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.jobs.contains_key(&application.job_id)
            || !tables.users.contains_key(&application.applicant_id)
        {
            return Err(RepositoryError::NotFound);
        }
        if tables.applications.values().any(|existing| {
            existing.job_id == application.job_id
                && existing.applicant_id == application.applicant_id
        }) {
            return Err(RepositoryError::Conflict);
        }

        let id = ApplicationId(tables.next_id());
        let stored = Application::from_new(id, application);
        tables.applications.insert(id, stored.clone());
        Ok(stored)
    }

    fn application(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(self.lock()?.applications.get(&id).cloned())
    }

    fn application_for(
        &self,
        job_id: JobId,
        applicant_id: UserId,
    ) -> Result<Option<Application>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .applications
            .values()
            .find(|application| {
                application.job_id == job_id && application.applicant_id == applicant_id
            })
            .cloned())
    }

    fn applications_for_job(&self, job_id: JobId) -> Result<Vec<Application>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .applications
            .values()
            .filter(|application| application.job_id == job_id)
            .cloned()
            .collect())
    }

    fn applications_by_applicant(
        &self,
        applicant_id: UserId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .applications
            .values()
            .filter(|application| application.applicant_id == applicant_id)
            .cloned()
            .collect())
    }

    fn update_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, RepositoryError> {
        let mut tables = self.lock()?;
        let application = tables
            .applications
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        application.status = status;
        Ok(application.clone())
    }

    fn upsert_details(
        &self,
        details: ApplicationDetails,
    ) -> Result<DetailsUpsert, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.applications.contains_key(&details.application_id) {
            return Err(RepositoryError::NotFound);
        }

        match tables.details.insert(details.application_id, details) {
            Some(_) => Ok(DetailsUpsert::Updated),
            None => Ok(DetailsUpsert::Created),
        }
    }

    fn details(
        &self,
        application_id: ApplicationId,
    ) -> Result<Option<ApplicationDetails>, RepositoryError> {
        Ok(self.lock()?.details.get(&application_id).cloned())
    }
}
