//! SQLite board repository.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::domain::{
    Application, ApplicationDetails, ApplicationId, ApplicationStatus, CascadeReport,
    DetailsUpsert, Job, JobId, NewApplication, NewJob, NewUser, User, UserId, UserRole,
};
use super::repository::{BoardRepository, RepositoryError};
use super::schema::init_schema;
use super::search::JobFilter;

const USER_COLUMNS: &str = "id, username, password_hash, is_employer";
const JOB_COLUMNS: &str = "id, title, description, salary, country, state, location, category, \
                           job_type, company, date_posted, employer_id";
const APPLICATION_COLUMNS: &str = "id, job_id, applicant_id, date_applied, status";
const DETAILS_COLUMNS: &str = "application_id, full_name, email, phone_number, address, \
                               qualification, experience, percentage_cgpa, skills, hobbies";

/// SQLite-backed repository. One connection guarded by a mutex; multi-statement writes run in
/// a transaction.
pub struct SqliteBoardRepository {
    conn: Mutex<Connection>,
}

impl SqliteBoardRepository {
    /// Open (or create) a file-backed database and bootstrap the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, RepositoryError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, RepositoryError> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.conn
            .lock()
            .map_err(|_| RepositoryError::Unavailable("connection mutex poisoned".to_string()))
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                RepositoryError::NotFound
            }
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                RepositoryError::Conflict
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound,
            other => RepositoryError::Unavailable(other.to_string()),
        }
    }
}

fn encode_time(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_time(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let is_employer: bool = row.get(3)?;
    Ok(User {
        id: UserId(row.get(0)?),
        username: row.get(1)?,
        password_hash: row.get(2)?,
        role: UserRole::from_employer_flag(is_employer),
    })
}

fn job_from_row(row: &Row<'_>) -> rusqlite::Result<Job> {
    Ok(Job {
        id: JobId(row.get(0)?),
        title: row.get(1)?,
        description: row.get(2)?,
        salary: row.get(3)?,
        country: row.get(4)?,
        state: row.get(5)?,
        location: row.get(6)?,
        category: row.get(7)?,
        job_type: row.get(8)?,
        company: row.get(9)?,
        posted_at: decode_time(row, 10)?,
        employer_id: UserId(row.get(11)?),
    })
}

fn application_from_row(row: &Row<'_>) -> rusqlite::Result<Application> {
    let status: String = row.get(4)?;
    let status = status
        .parse::<ApplicationStatus>()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(err)))?;
    Ok(Application {
        id: ApplicationId(row.get(0)?),
        job_id: JobId(row.get(1)?),
        applicant_id: UserId(row.get(2)?),
        applied_at: decode_time(row, 3)?,
        status,
    })
}

fn details_from_row(row: &Row<'_>) -> rusqlite::Result<ApplicationDetails> {
    Ok(ApplicationDetails {
        application_id: ApplicationId(row.get(0)?),
        full_name: row.get(1)?,
        email: row.get(2)?,
        phone_number: row.get(3)?,
        address: row.get(4)?,
        qualification: row.get(5)?,
        experience: row.get(6)?,
        percentage_cgpa: row.get(7)?,
        skills: row.get(8)?,
        hobbies: row.get(9)?,
    })
}

fn fetch_application(
    conn: &Connection,
    id: ApplicationId,
) -> rusqlite::Result<Option<Application>> {
    conn.query_row(
        &format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = ?1"),
        [id.0],
        application_from_row,
    )
    .optional()
}

fn collect<T>(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>, RepositoryError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map)?;
    Ok(rows.collect::<rusqlite::Result<Vec<T>>>()?)
}

impl BoardRepository for SqliteBoardRepository {
    fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO users (username, password_hash, is_employer) VALUES (?1, ?2, ?3)",
            params![user.username, user.password_hash, user.role.is_employer()],
        )?;
        Ok(User {
            id: UserId(conn.last_insert_rowid()),
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
        })
    }

    fn user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let conn = self.lock()?;
        Ok(conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                [id.0],
                user_from_row,
            )
            .optional()?)
    }

    fn user_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let conn = self.lock()?;
        Ok(conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                [username],
                user_from_row,
            )
            .optional()?)
    }

    fn count_users(&self) -> Result<usize, RepositoryError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn insert_job(&self, job: NewJob) -> Result<Job, RepositoryError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO jobs (title, description, salary, country, state, location, category, \
             job_type, company, date_posted, employer_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                job.title,
                job.description,
                job.salary,
                job.country,
                job.state,
                job.location,
                job.category,
                job.job_type,
                job.company,
                encode_time(job.posted_at),
                job.employer_id.0,
            ],
        )?;
        Ok(Job::from_new(JobId(conn.last_insert_rowid()), job))
    }

    fn job(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        let conn = self.lock()?;
        Ok(conn
            .query_row(
                &format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?1"),
                [id.0],
                job_from_row,
            )
            .optional()?)
    }

    fn search_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, RepositoryError> {
        let filter = filter.normalized();
        let conn = self.lock()?;
        let jobs = collect(
            &conn,
            &format!("SELECT {JOB_COLUMNS} FROM jobs ORDER BY date_posted DESC, id DESC"),
            [],
            job_from_row,
        )?;
        // Filtered in Rust: SQLite's lower() folds ASCII only.
        Ok(jobs.into_iter().filter(|job| filter.matches(job)).collect())
    }

    fn jobs_by_employer(&self, employer_id: UserId) -> Result<Vec<Job>, RepositoryError> {
        let conn = self.lock()?;
        collect(
            &conn,
            &format!(
                "SELECT {JOB_COLUMNS} FROM jobs WHERE employer_id = ?1 \
                 ORDER BY date_posted DESC, id DESC"
            ),
            [employer_id.0],
            job_from_row,
        )
    }

    fn delete_job_cascade(&self, id: JobId) -> Result<CascadeReport, RepositoryError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM jobs WHERE id = ?1)",
            [id.0],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(RepositoryError::NotFound);
        }

        let details = tx.execute(
            "DELETE FROM application_details WHERE application_id IN \
             (SELECT id FROM applications WHERE job_id = ?1)",
            [id.0],
        )?;
        let applications = tx.execute("DELETE FROM applications WHERE job_id = ?1", [id.0])?;
        tx.execute("DELETE FROM jobs WHERE id = ?1", [id.0])?;
        tx.commit()?;

        Ok(CascadeReport {
            applications,
            details,
        })
    }

    fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, RepositoryError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO applications (job_id, applicant_id, date_applied, status) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                application.job_id.0,
                application.applicant_id.0,
                encode_time(application.applied_at),
                ApplicationStatus::Pending.label(),
            ],
        )?;
        Ok(Application::from_new(
            ApplicationId(conn.last_insert_rowid()),
            application,
        ))
    }

    fn application(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let conn = self.lock()?;
        Ok(fetch_application(&conn, id)?)
    }

    fn application_for(
        &self,
        job_id: JobId,
        applicant_id: UserId,
    ) -> Result<Option<Application>, RepositoryError> {
        let conn = self.lock()?;
        Ok(conn
            .query_row(
                &format!(
                    "SELECT {APPLICATION_COLUMNS} FROM applications \
                     WHERE job_id = ?1 AND applicant_id = ?2"
                ),
                [job_id.0, applicant_id.0],
                application_from_row,
            )
            .optional()?)
    }

    fn applications_for_job(&self, job_id: JobId) -> Result<Vec<Application>, RepositoryError> {
        let conn = self.lock()?;
        collect(
            &conn,
            &format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE job_id = ?1 ORDER BY id"),
            [job_id.0],
            application_from_row,
        )
    }

    fn applications_by_applicant(
        &self,
        applicant_id: UserId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let conn = self.lock()?;
        collect(
            &conn,
            &format!(
                "SELECT {APPLICATION_COLUMNS} FROM applications WHERE applicant_id = ?1 ORDER BY id"
            ),
            [applicant_id.0],
            application_from_row,
        )
    }

    fn update_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, RepositoryError> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE applications SET status = ?1 WHERE id = ?2",
            params![status.label(), id.0],
        )?;
        if updated == 0 {
            return Err(RepositoryError::NotFound);
        }
        fetch_application(&conn, id)?.ok_or(RepositoryError::NotFound)
    }

    fn upsert_details(
        &self,
        details: ApplicationDetails,
    ) -> Result<DetailsUpsert, RepositoryError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM application_details WHERE application_id = ?1",
                [details.application_id.0],
                |row| row.get(0),
            )
            .optional()?;

        let outcome = match existing {
            Some(row_id) => {
                tx.execute(
                    "UPDATE application_details SET full_name = ?1, email = ?2, \
                     phone_number = ?3, address = ?4, qualification = ?5, experience = ?6, \
                     percentage_cgpa = ?7, skills = ?8, hobbies = ?9 WHERE id = ?10",
                    params![
                        details.full_name,
                        details.email,
                        details.phone_number,
                        details.address,
                        details.qualification,
                        details.experience,
                        details.percentage_cgpa,
                        details.skills,
                        details.hobbies,
                        row_id,
                    ],
                )?;
                DetailsUpsert::Updated
            }
            None => {
                tx.execute(
                    &format!(
                        "INSERT INTO application_details ({DETAILS_COLUMNS}) \
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
                    ),
                    params![
                        details.application_id.0,
                        details.full_name,
                        details.email,
                        details.phone_number,
                        details.address,
                        details.qualification,
                        details.experience,
                        details.percentage_cgpa,
                        details.skills,
                        details.hobbies,
                    ],
                )?;
                DetailsUpsert::Created
            }
        };

        tx.commit()?;
        Ok(outcome)
    }

    fn details(
        &self,
        application_id: ApplicationId,
    ) -> Result<Option<ApplicationDetails>, RepositoryError> {
        let conn = self.lock()?;
        Ok(conn
            .query_row(
                &format!(
                    "SELECT {DETAILS_COLUMNS} FROM application_details WHERE application_id = ?1"
                ),
                [application_id.0],
                details_from_row,
            )
            .optional()?)
    }
}
