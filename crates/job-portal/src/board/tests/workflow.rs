use axum::http::{header, HeaderMap, HeaderValue};

use super::common::*;
use crate::board::{
    ApplicationId, ApplicationStatus, BoardError, BoardRepository, DetailsUpsert, JobId,
    ProfileSubmission, StatusAction, TransitionPolicy,
};

#[test]
fn applying_twice_keeps_a_single_row() {
    let (repository, board) = permissive_board();
    let employer = register(&board, "acme", true);
    let seeker = register(&board, "sam", false);
    let job = board
        .catalog()
        .create_job(&employer, &posting("Rust Engineer", "Engineering"))
        .unwrap();

    let first = board.workflow().apply(&seeker, job.id).unwrap();
    assert_eq!(first.status, ApplicationStatus::Pending);

    match board.workflow().apply(&seeker, job.id) {
        Err(BoardError::DuplicateApplication {
            job_id,
            application_id,
        }) => {
            assert_eq!(job_id, job.id);
            assert_eq!(application_id, first.id);
        }
        other => panic!("expected duplicate warning, got {other:?}"),
    }
    assert_eq!(repository.applications_for_job(job.id).unwrap().len(), 1);
}

#[test]
fn employers_cannot_apply_and_unknown_jobs_are_missing() {
    let (_, board) = permissive_board();
    let employer = register(&board, "acme", true);
    let seeker = register(&board, "sam", false);
    let job = board
        .catalog()
        .create_job(&employer, &posting("Rust Engineer", "Engineering"))
        .unwrap();

    assert!(matches!(
        board.workflow().apply(&employer, job.id),
        Err(BoardError::Forbidden(_))
    ));
    assert!(matches!(
        board.workflow().apply(&seeker, JobId(999)),
        Err(BoardError::NotFound { entity: "job", .. })
    ));
}

#[test]
fn only_the_job_owner_changes_status() {
    let (repository, board) = permissive_board();
    let owner = register(&board, "acme", true);
    let rival = register(&board, "globex", true);
    let seeker = register(&board, "sam", false);
    let job = board
        .catalog()
        .create_job(&owner, &posting("Rust Engineer", "Engineering"))
        .unwrap();
    let application = board.workflow().apply(&seeker, job.id).unwrap();

    for requester in [&rival, &seeker] {
        assert!(matches!(
            board.workflow().accept(requester, application.id),
            Err(BoardError::Forbidden(_))
        ));
    }
    assert!(matches!(
        board.workflow().reject(&owner, ApplicationId(999)),
        Err(BoardError::NotFound {
            entity: "application",
            ..
        })
    ));

    let stored = repository.application(application.id).unwrap().unwrap();
    assert_eq!(stored.status, ApplicationStatus::Pending);
}

#[test]
fn permissive_policy_overwrites_any_status() {
    let (_, board) = permissive_board();
    let employer = register(&board, "acme", true);
    let seeker = register(&board, "sam", false);
    let job = board
        .catalog()
        .create_job(&employer, &posting("Rust Engineer", "Engineering"))
        .unwrap();
    let application = board.workflow().apply(&seeker, job.id).unwrap();

    let hired = board.workflow().hire(&employer, application.id).unwrap();
    assert_eq!(hired.status, ApplicationStatus::Hired);

    let reopened = board.workflow().accept(&employer, application.id).unwrap();
    assert_eq!(reopened.status, ApplicationStatus::Accepted);
}

#[test]
fn strict_policy_only_follows_lifecycle_edges() {
    let (repository, board) = build_board(TransitionPolicy::Strict);
    let employer = register(&board, "acme", true);
    let seeker = register(&board, "sam", false);
    let job = board
        .catalog()
        .create_job(&employer, &posting("Rust Engineer", "Engineering"))
        .unwrap();
    let application = board.workflow().apply(&seeker, job.id).unwrap();

    match board.workflow().hire(&employer, application.id) {
        Err(BoardError::InvalidTransition { from, to }) => {
            assert_eq!(from, ApplicationStatus::Pending);
            assert_eq!(to, ApplicationStatus::Hired);
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }
    assert_eq!(
        repository.application(application.id).unwrap().unwrap().status,
        ApplicationStatus::Pending
    );

    board.workflow().accept(&employer, application.id).unwrap();
    let canceled = board
        .workflow()
        .set_status(&employer, application.id, StatusAction::CancelHire)
        .unwrap();
    assert_eq!(canceled.status, ApplicationStatus::Canceled);
    assert!(matches!(
        board.workflow().hire(&employer, application.id),
        Err(BoardError::InvalidTransition { .. })
    ));
}

#[test]
fn details_require_an_accepted_application_owned_by_the_seeker() {
    let (repository, board) = permissive_board();
    let employer = register(&board, "acme", true);
    let seeker = register(&board, "sam", false);
    let other = register(&board, "alex", false);
    let job = board
        .catalog()
        .create_job(&employer, &posting("Rust Engineer", "Engineering"))
        .unwrap();
    let application = board.workflow().apply(&seeker, job.id).unwrap();

    assert!(matches!(
        board
            .workflow()
            .submit_details(&seeker, application.id, &profile()),
        Err(BoardError::Forbidden(_))
    ));

    board.workflow().accept(&employer, application.id).unwrap();
    assert!(matches!(
        board
            .workflow()
            .submit_details(&other, application.id, &profile()),
        Err(BoardError::Forbidden(_))
    ));
    assert!(matches!(
        board.workflow().details_form(&other, application.id),
        Err(BoardError::Forbidden(_))
    ));
    assert!(matches!(
        board
            .workflow()
            .submit_details(&seeker, ApplicationId(999), &profile()),
        Err(BoardError::NotFound { .. })
    ));
    assert!(repository.details(application.id).unwrap().is_none());
}

#[test]
fn details_upsert_creates_then_overwrites() {
    let (repository, board) = permissive_board();
    let employer = register(&board, "acme", true);
    let seeker = register(&board, "sam", false);
    let job = board
        .catalog()
        .create_job(&employer, &posting("Rust Engineer", "Engineering"))
        .unwrap();
    let application = board.workflow().apply(&seeker, job.id).unwrap();
    board.workflow().accept(&employer, application.id).unwrap();

    let (_, outcome) = board
        .workflow()
        .submit_details(&seeker, application.id, &profile())
        .unwrap();
    assert_eq!(outcome, DetailsUpsert::Created);

    let revised = ProfileSubmission {
        skills: "Rust, Kubernetes".to_string(),
        hobbies: Some("  ".to_string()),
        ..profile()
    };
    let (details, outcome) = board
        .workflow()
        .submit_details(&seeker, application.id, &revised)
        .unwrap();
    assert_eq!(outcome, DetailsUpsert::Updated);
    assert_eq!(details.hobbies, None);

    let stored = repository.details(application.id).unwrap().unwrap();
    assert_eq!(stored.skills, "Rust, Kubernetes");

    let (_, prefill) = board
        .workflow()
        .details_form(&seeker, application.id)
        .unwrap();
    assert_eq!(prefill, Some(stored));
}

#[test]
fn details_validation_lists_missing_fields() {
    let (repository, board) = permissive_board();
    let employer = register(&board, "acme", true);
    let seeker = register(&board, "sam", false);
    let job = board
        .catalog()
        .create_job(&employer, &posting("Rust Engineer", "Engineering"))
        .unwrap();
    let application = board.workflow().apply(&seeker, job.id).unwrap();
    board.workflow().accept(&employer, application.id).unwrap();

    let incomplete = ProfileSubmission {
        email: String::new(),
        skills: " ".to_string(),
        hobbies: None,
        ..profile()
    };
    match board
        .workflow()
        .submit_details(&seeker, application.id, &incomplete)
    {
        Err(BoardError::Validation(err)) => assert_eq!(err.missing, vec!["email", "skills"]),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(repository.details(application.id).unwrap().is_none());
}

#[test]
fn hiring_scenario_runs_end_to_end() {
    let (_, board) = permissive_board();
    let employer = register(&board, "acme", true);
    let seeker = register(&board, "sam", false);
    let workflow = board.workflow();

    let job = board
        .catalog()
        .create_job(&employer, &posting("Rust Engineer", "Engineering"))
        .unwrap();
    let application = workflow.apply(&seeker, job.id).unwrap();
    assert_eq!(application.status, ApplicationStatus::Pending);

    let accepted = workflow.accept(&employer, application.id).unwrap();
    assert_eq!(accepted.status, ApplicationStatus::Accepted);

    let (_, outcome) = workflow
        .submit_details(&seeker, application.id, &profile())
        .unwrap();
    assert_eq!(outcome, DetailsUpsert::Created);

    let hired = workflow.hire(&employer, application.id).unwrap();
    assert_eq!(hired.status, ApplicationStatus::Hired);

    assert!(matches!(
        workflow.apply(&seeker, job.id),
        Err(BoardError::DuplicateApplication { .. })
    ));
}

#[test]
fn credentials_and_sessions_resolve_identities() {
    let (_, board) = permissive_board();
    let seeker = register(&board, "sam", false);

    assert!(matches!(
        board.credentials().register("sam", "other", true),
        Err(BoardError::UsernameTaken)
    ));
    assert!(matches!(
        board.login("sam", "wrong"),
        Err(BoardError::InvalidCredentials)
    ));
    assert!(matches!(
        board.login("nobody", "password"),
        Err(BoardError::InvalidCredentials)
    ));
    assert_eq!(board.credentials().user_count().unwrap(), 1);

    let (identity, token) = board.login("sam", "password").unwrap();
    assert_eq!(identity, seeker);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::COOKIE,
        HeaderValue::from_str(&format!("session={token}")).unwrap(),
    );
    assert_eq!(board.resolve(&headers).unwrap(), Some(seeker.clone()));

    let tampered = format!("{}.{}", seeker.user_id.0 + 1, token.split_once('.').unwrap().1);
    headers.insert(
        header::COOKIE,
        HeaderValue::from_str(&format!("session={tampered}")).unwrap(),
    );
    assert_eq!(board.resolve(&headers).unwrap(), None);
}
