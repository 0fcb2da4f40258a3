use std::fmt;

use chrono::{DateTime, Utc};

use super::domain::{
    derive_location, ApplicationDetails, ApplicationId, JobPosting, NewJob, ProfileSubmission,
    UserId,
};

/// Required form fields that were absent or blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing required fields: {}", self.missing.join(", "))
    }
}

impl std::error::Error for ValidationError {}

/// Collects trimmed field values, remembering which required ones were blank.
#[derive(Default)]
struct FieldCheck {
    missing: Vec<&'static str>,
}

impl FieldCheck {
    fn required(&mut self, name: &'static str, value: &str) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.missing.push(name);
        }
        trimmed.to_string()
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        if self.missing.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError {
                missing: self.missing,
            })
        }
    }
}

pub(crate) fn new_job(
    posting: &JobPosting,
    employer_id: UserId,
    posted_at: DateTime<Utc>,
) -> Result<NewJob, ValidationError> {
    let mut check = FieldCheck::default();
    let title = check.required("title", &posting.title);
    let description = check.required("description", &posting.description);
    let salary = check.required("salary", &posting.salary);
    let country = check.required("country", &posting.country);
    let state = check.required("state", &posting.state);
    let category = check.required("category", &posting.category);
    let job_type = check.required("job_type", &posting.job_type);
    let company = check.required("company", &posting.company);

    let location = derive_location(&state, &country);
    check.finish(NewJob {
        title,
        description,
        salary,
        country,
        state,
        location,
        category,
        job_type,
        company,
        posted_at,
        employer_id,
    })
}

pub(crate) fn application_details(
    application_id: ApplicationId,
    submission: &ProfileSubmission,
) -> Result<ApplicationDetails, ValidationError> {
    let mut check = FieldCheck::default();
    let full_name = check.required("full_name", &submission.full_name);
    let email = check.required("email", &submission.email);
    let phone_number = check.required("phone_number", &submission.phone_number);
    let address = check.required("address", &submission.address);
    let qualification = check.required("qualification", &submission.qualification);
    let experience = check.required("experience", &submission.experience);
    let percentage_cgpa = check.required("percentage_cgpa", &submission.percentage_cgpa);
    let skills = check.required("skills", &submission.skills);
    let hobbies = submission
        .hobbies
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    check.finish(ApplicationDetails {
        application_id,
        full_name,
        email,
        phone_number,
        address,
        qualification,
        experience,
        percentage_cgpa,
        skills,
        hobbies,
    })
}

pub(crate) fn credentials<'a>(
    username: &'a str,
    password: &'a str,
) -> Result<(&'a str, &'a str), ValidationError> {
    let mut missing = Vec::new();
    let username = username.trim();
    if username.is_empty() {
        missing.push("username");
    }
    if password.is_empty() {
        missing.push("password");
    }
    if missing.is_empty() {
        Ok((username, password))
    } else {
        Err(ValidationError { missing })
    }
}
