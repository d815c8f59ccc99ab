mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::models::{JobDetail, JobPosting, NewSession, SessionId};
use crate::Result;

/// Which postings to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingQuery {
    /// Has a link and no usable description: missing, empty, or a
    /// verification / "enable JavaScript" placeholder left by a blocked fetch.
    NeedsDescription,
    Session(SessionId),
    All,
}

/// Persistence the crawler needs. Every write is atomic per record.
pub trait Store {
    fn create_session(&self, session: &NewSession) -> Result<SessionId>;

    fn finish_session(&self, id: SessionId, ended_at: &str) -> Result<()>;

    /// First writer wins: an existing posting keeps its session, title, link
    /// and company. Returns whether a row was inserted.
    fn insert_posting_if_absent(&self, posting: &JobPosting) -> Result<bool>;

    /// Last writer wins for the description.
    fn update_description(&self, job_unique_id: &str, text: &str) -> Result<()>;

    fn query(&self, query: PostingQuery) -> Result<Vec<JobPosting>>;

    fn insert_job_detail(&self, detail: &JobDetail) -> Result<()>;
}
