//! SQLite schema bootstrap.

use rusqlite::Connection;

/// Creates the board tables if they do not exist yet. Safe to run on every start.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}

const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    is_employer INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS jobs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    salary TEXT NOT NULL,
    location TEXT NOT NULL,
    country TEXT NOT NULL,
    state TEXT NOT NULL,
    category TEXT NOT NULL,
    job_type TEXT NOT NULL,
    company TEXT NOT NULL,
    date_posted TEXT NOT NULL,
    employer_id INTEGER NOT NULL REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS applications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    job_id INTEGER NOT NULL REFERENCES jobs(id),
    applicant_id INTEGER NOT NULL REFERENCES users(id),
    date_applied TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    UNIQUE (job_id, applicant_id)
);

CREATE TABLE IF NOT EXISTS application_details (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    application_id INTEGER NOT NULL UNIQUE REFERENCES applications(id),
    full_name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone_number TEXT NOT NULL,
    address TEXT NOT NULL,
    qualification TEXT NOT NULL,
    experience TEXT NOT NULL,
    percentage_cgpa TEXT NOT NULL,
    skills TEXT NOT NULL,
    hobbies TEXT
);

CREATE INDEX IF NOT EXISTS idx_jobs_posted ON jobs(date_posted);
CREATE INDEX IF NOT EXISTS idx_jobs_employer ON jobs(employer_id);
CREATE INDEX IF NOT EXISTS idx_applications_applicant ON applications(applicant_id);
"#;
