use serde::{Deserialize, Serialize};

use super::domain::Job;

/// Optional listing filters from `/search`. Blank values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFilter {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl JobFilter {
    /// Drops blank filters and lowercases the rest so matching is case-insensitive.
    pub fn normalized(&self) -> JobFilter {
        fn clean(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_lowercase)
        }

        JobFilter {
            query: clean(&self.query),
            location: clean(&self.location),
            category: clean(&self.category),
        }
    }

    pub fn is_empty(&self) -> bool {
        let normalized = self.normalized();
        normalized.query.is_none() && normalized.location.is_none() && normalized.category.is_none()
    }

    /// Matches a job against an already normalized filter.
    pub fn matches(&self, job: &Job) -> bool {
        let contains = |haystack: &str, needle: &str| haystack.to_lowercase().contains(needle);

        let query = self.query.as_deref().map_or(true, |needle| {
            contains(&job.title, needle)
                || contains(&job.description, needle)
                || contains(&job.company, needle)
        });
        let location = self
            .location
            .as_deref()
            .map_or(true, |needle| contains(&job.location, needle));
        let category = self
            .category
            .as_deref()
            .map_or(true, |needle| contains(&job.category, needle));

        query && location && category
    }
}

/// Newest postings first; ids break ties between postings with the same timestamp.
pub fn newest_first(jobs: &mut [Job]) {
    jobs.sort_by(|a, b| b.posted_at.cmp(&a.posted_at).then(b.id.cmp(&a.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::domain::{JobId, UserId};
    use chrono::{TimeZone, Utc};

    fn job(id: i64, title: &str, category: &str, location: &str) -> Job {
        Job {
            id: JobId(id),
            title: title.to_string(),
            description: "Work on things".to_string(),
            salary: "100".to_string(),
            country: "India".to_string(),
            state: "Goa".to_string(),
            location: location.to_string(),
            category: category.to_string(),
            job_type: "Full-time".to_string(),
            company: "Acme Corp".to_string(),
            posted_at: Utc.with_ymd_and_hms(2025, 1, id as u32, 0, 0, 0).unwrap(),
            employer_id: UserId(1),
        }
    }

    #[test]
    fn blank_filters_are_dropped() {
        let filter = JobFilter {
            query: Some("  ".to_string()),
            location: Some(String::new()),
            category: Some(" Engineering ".to_string()),
        };

        let normalized = filter.normalized();
        assert_eq!(normalized.query, None);
        assert_eq!(normalized.location, None);
        assert_eq!(normalized.category.as_deref(), Some("engineering"));
        assert!(JobFilter::default().is_empty());
    }

    #[test]
    fn query_matches_title_description_or_company() {
        let posting = job(1, "Rust Developer", "Engineering", "Goa, India");
        let by = |query: &str| {
            JobFilter {
                query: Some(query.to_string()),
                ..JobFilter::default()
            }
            .normalized()
            .matches(&posting)
        };

        assert!(by("rust"));
        assert!(by("THINGS"));
        assert!(by("acme"));
        assert!(!by("python"));
    }

    #[test]
    fn filters_are_anded() {
        let posting = job(1, "Rust Developer", "Engineering", "Goa, India");
        let filter = JobFilter {
            query: Some("rust".to_string()),
            location: Some("kerala".to_string()),
            category: Some("engineering".to_string()),
        }
        .normalized();

        assert!(!filter.matches(&posting));
    }

    #[test]
    fn newest_first_orders_by_timestamp_then_id() {
        let mut jobs = vec![
            job(1, "a", "x", "y"),
            job(3, "c", "x", "y"),
            job(2, "b", "x", "y"),
        ];
        newest_first(&mut jobs);
        let ids: Vec<i64> = jobs.iter().map(|job| job.id.0).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }
}
