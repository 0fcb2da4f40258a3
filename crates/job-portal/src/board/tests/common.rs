use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::board::{
    board_router, Clock, Identity, InMemoryBoardRepository, JobBoard, JobPosting,
    ProfileSubmission, TransitionPolicy,
};
use crate::config::BoardConfig;

/// Clock that advances one minute per reading so creation order is observable.
#[derive(Default)]
pub(super) struct SteppingClock {
    ticks: AtomicI64,
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap() + Duration::minutes(tick)
    }
}

pub(super) type MemoryBoard = JobBoard<InMemoryBoardRepository>;

pub(super) fn build_board(
    policy: TransitionPolicy,
) -> (Arc<InMemoryBoardRepository>, Arc<MemoryBoard>) {
    let repository = Arc::new(InMemoryBoardRepository::default());
    let config = BoardConfig {
        transition_policy: policy,
        ..BoardConfig::development()
    };
    let board = JobBoard::with_clock(
        repository.clone(),
        &config,
        Arc::new(SteppingClock::default()),
    )
    .expect("board builds");
    (repository, Arc::new(board))
}

pub(super) fn permissive_board() -> (Arc<InMemoryBoardRepository>, Arc<MemoryBoard>) {
    build_board(TransitionPolicy::Permissive)
}

pub(super) fn register(board: &MemoryBoard, username: &str, is_employer: bool) -> Identity {
    board
        .credentials()
        .register(username, "password", is_employer)
        .expect("user registers")
        .identity()
}

pub(super) fn posting(title: &str, category: &str) -> JobPosting {
    JobPosting {
        title: title.to_string(),
        description: format!("{title} role on the platform team"),
        salary: "90000".to_string(),
        country: "India".to_string(),
        state: "Karnataka".to_string(),
        category: category.to_string(),
        job_type: "Full-time".to_string(),
        company: "Acme".to_string(),
    }
}

pub(super) fn profile() -> ProfileSubmission {
    ProfileSubmission {
        full_name: "Sam Seeker".to_string(),
        email: "sam@example.com".to_string(),
        phone_number: "555-0100".to_string(),
        address: "1 Main St".to_string(),
        qualification: "BSc".to_string(),
        experience: "3 years".to_string(),
        percentage_cgpa: "8.4".to_string(),
        skills: "Rust, SQL".to_string(),
        hobbies: Some("Chess".to_string()),
    }
}

pub(super) fn router(board: Arc<MemoryBoard>) -> axum::Router {
    board_router(board)
}

pub(super) fn token_for(board: &MemoryBoard, identity: &Identity) -> String {
    board.sessions().issue(identity.user_id)
}

/// Encodes simple form pairs; values may contain spaces but no other reserved characters.
pub(super) fn form_body(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(name, value)| format!("{name}={}", value.replace(' ', "+")))
        .collect::<Vec<_>>()
        .join("&")
}

pub(super) fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub(super) fn post_form(uri: &str, token: Option<&str>, pairs: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::post(uri).header(
        header::CONTENT_TYPE,
        "application/x-www-form-urlencoded",
    );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(form_body(pairs))).unwrap()
}

pub(super) fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

pub(super) async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
