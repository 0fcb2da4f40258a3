use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::domain::{ApplicationId, Identity, JobId, JobPosting, ProfileSubmission, StatusAction};
use super::error::BoardError;
use super::repository::BoardRepository;
use super::search::JobFilter;
use super::service::JobBoard;
use super::session::{cleared_session_cookie, session_cookie};
use super::views::ListingView;

const JOB_FIELDS: &[&str] = &[
    "title",
    "description",
    "salary",
    "country",
    "state",
    "category",
    "job_type",
    "company",
];
const PROFILE_FIELDS: &[&str] = &[
    "full_name",
    "email",
    "phone_number",
    "address",
    "qualification",
    "experience",
    "percentage_cgpa",
    "skills",
];

type BoardState<R> = State<Arc<JobBoard<R>>>;

/// Router builder exposing the job board pages and actions.
pub fn board_router<R>(board: Arc<JobBoard<R>>) -> Router
where
    R: BoardRepository + 'static,
{
    Router::new()
        .route("/", get(home_handler::<R>))
        .route("/register", get(register_form).post(register_handler::<R>))
        .route("/login", get(login_form).post(login_handler::<R>))
        .route("/logout", get(logout_handler))
        .route(
            "/post_job",
            get(post_job_form::<R>).post(post_job_handler::<R>),
        )
        .route("/my_jobs", get(my_jobs_handler::<R>))
        .route("/delete_job/:job_id", post(delete_job_handler::<R>))
        .route("/apply/:job_id", get(apply_handler::<R>))
        .route(
            "/accept_application/:application_id",
            get(accept_handler::<R>),
        )
        .route(
            "/reject_application/:application_id",
            get(reject_handler::<R>),
        )
        .route("/hire_applicant/:application_id", get(hire_handler::<R>))
        .route("/cancel_hire/:application_id", get(cancel_hire_handler::<R>))
        .route(
            "/submit_details/:application_id",
            get(details_form::<R>).post(submit_details_handler::<R>),
        )
        .route("/search", get(search_handler::<R>))
        .with_state(board)
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        match self {
            BoardError::Unauthenticated => redirect("/login"),
            BoardError::Validation(err) => {
                let payload = json!({
                    "error": err.to_string(),
                    "missing": err.missing,
                });
                (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
            }
            BoardError::Forbidden(reason) => {
                let payload = json!({ "error": "Unauthorized", "reason": reason });
                (StatusCode::FORBIDDEN, Json(payload)).into_response()
            }
            BoardError::DuplicateApplication {
                job_id,
                application_id,
            } => {
                let payload = json!({
                    "status": "warning",
                    "message": "You have already applied for this job.",
                    "job_id": job_id,
                    "application_id": application_id,
                });
                (StatusCode::OK, Json(payload)).into_response()
            }
            BoardError::UsernameTaken => {
                let payload = json!({ "error": "Username already exists!" });
                (StatusCode::CONFLICT, Json(payload)).into_response()
            }
            BoardError::InvalidCredentials => {
                let payload = json!({ "error": "Invalid username or password!" });
                (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
            }
            BoardError::NotFound { .. } => {
                let payload = json!({ "error": self.to_string() });
                (StatusCode::NOT_FOUND, Json(payload)).into_response()
            }
            BoardError::InvalidTransition { from, to } => {
                let payload = json!({
                    "error": self.to_string(),
                    "from": from,
                    "to": to,
                });
                (StatusCode::CONFLICT, Json(payload)).into_response()
            }
            BoardError::Credential(_) | BoardError::Repository(_) => {
                error!(error = %self, "job board request failed");
                let payload = json!({ "error": self.to_string() });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
            }
        }
    }
}

fn redirect(location: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Redirect that still carries the affected record for API clients.
fn redirect_with<T: Serialize>(location: &'static str, body: T) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)], Json(body)).into_response()
}

/// Anonymous callers get a 403 on mutating routes rather than a login redirect.
fn require_for_action(identity: Option<Identity>) -> Result<Identity, BoardError> {
    identity.ok_or(BoardError::Forbidden("login required"))
}

/// Like `require_for_action`, but an unknown application answers 404 before the anonymous 403.
fn require_for_application<R>(
    board: &JobBoard<R>,
    identity: Option<Identity>,
    application_id: i64,
) -> Result<Identity, BoardError>
where
    R: BoardRepository + 'static,
{
    match identity {
        Some(identity) => Ok(identity),
        None => {
            board.workflow().application(ApplicationId(application_id))?;
            Err(BoardError::Forbidden("login required"))
        }
    }
}

#[derive(Debug, Serialize)]
struct FormView {
    form: &'static str,
    fields: &'static [&'static str],
    optional: &'static [&'static str],
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RegisterForm {
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) is_employer: Option<String>,
}

impl RegisterForm {
    fn is_employer(&self) -> bool {
        matches!(self.is_employer.as_deref(), Some("on" | "true" | "1"))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct LoginForm {
    pub(crate) username: String,
    pub(crate) password: String,
}

pub(crate) async fn home_handler<R>(
    State(board): BoardState<R>,
    headers: HeaderMap,
) -> Result<Json<ListingView>, BoardError>
where
    R: BoardRepository + 'static,
{
    Ok(Json(ListingView {
        viewer: board.resolve(&headers)?,
        user_count: board.credentials().user_count()?,
        filter: None,
        jobs: board.catalog().list_jobs()?,
    }))
}

pub(crate) async fn search_handler<R>(
    State(board): BoardState<R>,
    headers: HeaderMap,
    Query(filter): Query<JobFilter>,
) -> Result<Json<ListingView>, BoardError>
where
    R: BoardRepository + 'static,
{
    let jobs = board.catalog().search_jobs(&filter)?;
    Ok(Json(ListingView {
        viewer: board.resolve(&headers)?,
        user_count: board.credentials().user_count()?,
        filter: Some(filter).filter(|filter| !filter.is_empty()),
        jobs,
    }))
}

async fn register_form() -> Json<FormView> {
    Json(FormView {
        form: "register",
        fields: &["username", "password"],
        optional: &["is_employer"],
    })
}

pub(crate) async fn register_handler<R>(
    State(board): BoardState<R>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let user = board
        .credentials()
        .register(&form.username, &form.password, form.is_employer())?;
    Ok(redirect_with("/login", json!({ "user": user })))
}

async fn login_form() -> Json<FormView> {
    Json(FormView {
        form: "login",
        fields: &["username", "password"],
        optional: &[],
    })
}

pub(crate) async fn login_handler<R>(
    State(board): BoardState<R>,
    Form(form): Form<LoginForm>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let (identity, token) = board.login(&form.username, &form.password)?;
    let response = (
        StatusCode::FOUND,
        [
            (header::LOCATION, "/".to_string()),
            (header::SET_COOKIE, session_cookie(&token)),
        ],
        Json(json!({ "identity": identity, "token": token })),
    );
    Ok(response.into_response())
}

async fn logout_handler() -> Response {
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, "/".to_string()),
            (header::SET_COOKIE, cleared_session_cookie()),
        ],
    )
        .into_response()
}

pub(crate) async fn post_job_form<R>(
    State(board): BoardState<R>,
    headers: HeaderMap,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    match board.resolve(&headers)? {
        Some(identity) if identity.is_employer() => Ok(Json(FormView {
            form: "post_job",
            fields: JOB_FIELDS,
            optional: &[],
        })
        .into_response()),
        _ => Ok(redirect("/login")),
    }
}

pub(crate) async fn post_job_handler<R>(
    State(board): BoardState<R>,
    headers: HeaderMap,
    Form(posting): Form<JobPosting>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let Some(identity) = board.resolve(&headers)? else {
        return Ok(redirect("/login"));
    };
    match board.catalog().create_job(&identity, &posting) {
        Ok(job) => Ok(redirect_with("/my_jobs", job)),
        Err(BoardError::Forbidden(_)) => Ok(redirect("/login")),
        Err(other) => Err(other),
    }
}

pub(crate) async fn my_jobs_handler<R>(
    State(board): BoardState<R>,
    headers: HeaderMap,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let identity = board.resolve(&headers)?.ok_or(BoardError::Unauthenticated)?;
    let dashboard = board.catalog().dashboard(&identity)?;
    Ok(Json(dashboard).into_response())
}

pub(crate) async fn delete_job_handler<R>(
    State(board): BoardState<R>,
    headers: HeaderMap,
    Path(job_id): Path<i64>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let identity = require_for_action(board.resolve(&headers)?)?;
    let report = board.catalog().delete_job(&identity, JobId(job_id))?;
    Ok(redirect_with(
        "/my_jobs",
        json!({ "deleted_job_id": job_id, "removed": report }),
    ))
}

pub(crate) async fn apply_handler<R>(
    State(board): BoardState<R>,
    headers: HeaderMap,
    Path(job_id): Path<i64>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let Some(identity) = board.resolve(&headers)? else {
        return Ok(redirect("/login"));
    };
    match board.workflow().apply(&identity, JobId(job_id)) {
        Ok(application) => {
            let payload = json!({
                "status": "success",
                "message": "Application submitted successfully!",
                "application": application,
            });
            Ok((StatusCode::OK, Json(payload)).into_response())
        }
        Err(BoardError::Forbidden(_)) => Ok(redirect("/login")),
        Err(other) => Err(other),
    }
}

async fn transition<R>(
    board: &JobBoard<R>,
    headers: &HeaderMap,
    application_id: i64,
    action: StatusAction,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let identity = require_for_application(board, board.resolve(headers)?, application_id)?;
    let application =
        board
            .workflow()
            .set_status(&identity, ApplicationId(application_id), action)?;
    Ok(redirect_with("/my_jobs", application))
}

pub(crate) async fn accept_handler<R>(
    State(board): BoardState<R>,
    headers: HeaderMap,
    Path(application_id): Path<i64>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    transition(&board, &headers, application_id, StatusAction::Accept).await
}

pub(crate) async fn reject_handler<R>(
    State(board): BoardState<R>,
    headers: HeaderMap,
    Path(application_id): Path<i64>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    transition(&board, &headers, application_id, StatusAction::Reject).await
}

pub(crate) async fn hire_handler<R>(
    State(board): BoardState<R>,
    headers: HeaderMap,
    Path(application_id): Path<i64>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    transition(&board, &headers, application_id, StatusAction::Hire).await
}

pub(crate) async fn cancel_hire_handler<R>(
    State(board): BoardState<R>,
    headers: HeaderMap,
    Path(application_id): Path<i64>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    transition(&board, &headers, application_id, StatusAction::CancelHire).await
}

pub(crate) async fn details_form<R>(
    State(board): BoardState<R>,
    headers: HeaderMap,
    Path(application_id): Path<i64>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let identity = require_for_application(&board, board.resolve(&headers)?, application_id)?;
    let (application, details) = board
        .workflow()
        .details_form(&identity, ApplicationId(application_id))?;
    let payload = json!({
        "form": "submit_details",
        "fields": PROFILE_FIELDS,
        "optional": ["hobbies"],
        "application": application,
        "details": details,
    });
    Ok(Json(payload).into_response())
}

pub(crate) async fn submit_details_handler<R>(
    State(board): BoardState<R>,
    headers: HeaderMap,
    Path(application_id): Path<i64>,
    Form(submission): Form<ProfileSubmission>,
) -> Result<Response, BoardError>
where
    R: BoardRepository + 'static,
{
    let identity = require_for_application(&board, board.resolve(&headers)?, application_id)?;
    let (details, outcome) = board.workflow().submit_details(
        &identity,
        ApplicationId(application_id),
        &submission,
    )?;
    let payload = json!({
        "status": "success",
        "message": "Details submitted successfully! Your employer will review your information.",
        "outcome": outcome,
        "details": details,
    });
    Ok((StatusCode::OK, Json(payload)).into_response())
}
