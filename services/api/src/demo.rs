use chrono::{SecondsFormat, Utc};
use clap::Args;
use job_portal::board::{
    BoardError, Dashboard, DetailsUpsert, InMemoryBoardRepository, JobBoard, JobFilter, JobPosting,
    ProfileSubmission, TransitionPolicy,
};
use job_portal::config::BoardConfig;
use job_portal::error::AppError;
use serde::Serialize;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Enforce the lifecycle graph on status changes instead of overwriting.
    #[arg(long)]
    pub(crate) strict: bool,
    /// Print each step as a JSON line.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Serialize)]
struct DemoStep {
    step: usize,
    action: &'static str,
    outcome: String,
    at: String,
}

struct Narrator {
    json: bool,
    steps: usize,
}

impl Narrator {
    fn record(&mut self, action: &'static str, outcome: impl Into<String>) -> Result<(), AppError> {
        self.steps += 1;
        let step = DemoStep {
            step: self.steps,
            action,
            outcome: outcome.into(),
            at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        };

        if self.json {
            let line = serde_json::to_string(&step).map_err(std::io::Error::from)?;
            println!("{line}");
        } else {
            println!("{:>2}. {:<16} {}", step.step, step.action, step.outcome);
        }
        Ok(())
    }
}

/// Walks an employer and a seeker through the hiring lifecycle on an in-memory board.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let policy = if args.strict {
        TransitionPolicy::Strict
    } else {
        TransitionPolicy::Permissive
    };
    let config = BoardConfig {
        transition_policy: policy,
        ..BoardConfig::development()
    };
    let board = JobBoard::new(Arc::new(InMemoryBoardRepository::default()), &config)?;
    let mut narrator = Narrator {
        json: args.json,
        steps: 0,
    };

    if !args.json {
        println!(
            "Job portal demo ({} transitions)",
            board.workflow().policy()
        );
    }

    let employer = board
        .credentials()
        .register("acme-hiring", "demo-password", true)?
        .identity();
    let seeker = board
        .credentials()
        .register("sam", "demo-password", false)?
        .identity();
    narrator.record(
        "register",
        format!(
            "employer '{}' and seeker '{}' ({} users)",
            employer.username,
            seeker.username,
            board.credentials().user_count()?
        ),
    )?;

    let job = board.catalog().create_job(&employer, &demo_posting())?;
    narrator.record(
        "post_job",
        format!("job {} '{}' in {}", job.id, job.title, job.location),
    )?;

    let application = board.workflow().apply(&seeker, job.id)?;
    narrator.record(
        "apply",
        format!("application {} is {}", application.id, application.status),
    )?;

    let accepted = board.workflow().accept(&employer, application.id)?;
    narrator.record("accept", format!("application is {}", accepted.status))?;

    let (details, outcome) =
        board
            .workflow()
            .submit_details(&seeker, application.id, &demo_profile())?;
    let verb = match outcome {
        DetailsUpsert::Created => "created",
        DetailsUpsert::Updated => "updated",
    };
    narrator.record(
        "submit_details",
        format!("{verb} profile for {}", details.full_name),
    )?;

    let hired = board.workflow().hire(&employer, application.id)?;
    narrator.record("hire", format!("application is {}", hired.status))?;

    match board.workflow().apply(&seeker, job.id) {
        Err(BoardError::DuplicateApplication { application_id, .. }) => narrator.record(
            "reapply",
            format!("already applied (application {application_id})"),
        )?,
        Ok(unexpected) => narrator.record(
            "reapply",
            format!("unexpected new application {}", unexpected.id),
        )?,
        Err(other) => return Err(other.into()),
    }

    let filter = JobFilter {
        category: Some("engineering".to_string()),
        ..JobFilter::default()
    };
    let matches = board.catalog().search_jobs(&filter)?;
    narrator.record(
        "search",
        format!("{} job(s) in category 'engineering'", matches.len()),
    )?;

    if let Dashboard::Employer { jobs } = board.catalog().dashboard(&employer)? {
        for view in jobs {
            narrator.record(
                "my_jobs",
                format!(
                    "'{}' has {} applicant(s)",
                    view.job.title, view.applicant_count
                ),
            )?;
        }
    }

    let report = board.catalog().delete_job(&employer, job.id)?;
    narrator.record(
        "delete_job",
        format!(
            "removed {} application(s) and {} profile(s)",
            report.applications, report.details
        ),
    )?;

    Ok(())
}

fn demo_posting() -> JobPosting {
    JobPosting {
        title: "Backend Engineer".to_string(),
        description: "Design and operate the hiring platform APIs".to_string(),
        salary: "95000".to_string(),
        country: "India".to_string(),
        state: "Karnataka".to_string(),
        category: "Engineering".to_string(),
        job_type: "Full-time".to_string(),
        company: "Acme".to_string(),
    }
}

fn demo_profile() -> ProfileSubmission {
    ProfileSubmission {
        full_name: "Sam Seeker".to_string(),
        email: "sam@example.com".to_string(),
        phone_number: "+91 80 5550 0100".to_string(),
        address: "12 MG Road, Bengaluru".to_string(),
        qualification: "B.Tech Computer Science".to_string(),
        experience: "4 years".to_string(),
        percentage_cgpa: "8.6".to_string(),
        skills: "Rust, PostgreSQL, Kubernetes".to_string(),
        hobbies: Some("Chess".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_runs_under_both_policies() {
        run_demo(DemoArgs::default()).expect("permissive demo");
        run_demo(DemoArgs {
            strict: true,
            json: true,
        })
        .expect("strict demo");
    }
}
