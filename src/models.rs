use serde::{Deserialize, Serialize};

pub type SessionId = i64;

/// One listing crawl invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSession {
    pub id: SessionId,
    pub terms: String,
    pub location: Option<String>,
    /// Serialized `Vec<FilterTag>`, stored as-is and never read back by the crawler.
    pub filter_tags: String,
    pub page_count: u32,
    pub started_at: String,
    pub ended_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub terms: String,
    pub location: Option<String>,
    pub filter_tags: String,
    pub page_count: u32,
    pub started_at: String,
}

/// A filter dropdown found on a results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterTag {
    pub name: String,
    pub options: Vec<String>,
}

/// What a single job card yielded. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialPosting {
    pub job_unique_id: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub company: Option<String>,
}

impl PartialPosting {
    /// Attaches the owning session. Cards without an id cannot be stored.
    pub fn into_posting(self, session_id: SessionId) -> Option<JobPosting> {
        let job_unique_id = self.job_unique_id.filter(|id| !id.trim().is_empty())?;
        Some(JobPosting {
            job_unique_id,
            title: self.title,
            link: self.link,
            session_id,
            company: self.company,
            description: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub job_unique_id: String,
    pub title: Option<String>,
    pub link: Option<String>,
    pub session_id: SessionId,
    pub company: Option<String>,
    pub description: Option<String>,
}

/// Deeper capture of a posting page, keyed like [`JobPosting`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDetail {
    pub job_unique_id: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub job_types: Vec<String>,
    pub benefits: Vec<String>,
    pub captured_at: String,
}

impl JobDetail {
    pub fn new(job_unique_id: impl Into<String>, captured_at: impl Into<String>) -> Self {
        Self {
            job_unique_id: job_unique_id.into(),
            captured_at: captured_at.into(),
            ..Default::default()
        }
    }
}

/// Joins list-typed detail fields into the flat form the store keeps.
pub fn flatten_list(values: &[String]) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_without_id_is_not_a_posting() {
        let card = PartialPosting {
            job_unique_id: None,
            title: Some("Data Analyst".into()),
            ..Default::default()
        };
        assert_eq!(card.into_posting(1), None);

        let blank = PartialPosting {
            job_unique_id: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(blank.into_posting(1), None);
    }

    #[test]
    fn card_keeps_missing_fields_as_none() {
        let card = PartialPosting {
            job_unique_id: Some("job_1a2b".into()),
            title: Some("Data Analyst".into()),
            link: None,
            company: None,
        };
        let posting = card.into_posting(7).unwrap();
        assert_eq!(posting.job_unique_id, "job_1a2b");
        assert_eq!(posting.session_id, 7);
        assert_eq!(posting.link, None);
        assert_eq!(posting.description, None);
    }

    #[test]
    fn lists_flatten_with_comma_space() {
        assert_eq!(flatten_list(&[]), None);
        assert_eq!(
            flatten_list(&["Full-time".into(), "Contract".into()]).as_deref(),
            Some("Full-time, Contract")
        );
    }
}
