use super::schema::SCHEMA;
use super::{PostingQuery, Store};
use crate::models::{flatten_list, JobDetail, JobPosting, NewSession, SearchSession, SessionId};
use crate::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::{debug, info};

const POSTING_COLUMNS: &str =
    "job_unique_id, job_title, job_link, session_id, job_company, job_description";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "opening store");
        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn session(&self, id: SessionId) -> Result<Option<SearchSession>> {
        let session = self
            .conn
            .query_row(
                "SELECT session_id, terms, location, filter_tags, n_pages, started_at, ended_at
                 FROM search_sessions WHERE session_id = ?",
                [id],
                |r| {
                    Ok(SearchSession {
                        id: r.get(0)?,
                        terms: r.get(1)?,
                        location: r.get(2)?,
                        filter_tags: r.get(3)?,
                        page_count: r.get(4)?,
                        started_at: r.get(5)?,
                        ended_at: r.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(session)
    }

    pub fn job_detail(&self, job_unique_id: &str) -> Result<Option<JobDetail>> {
        let detail = self
            .conn
            .query_row(
                "SELECT job_unique_id, job_title, job_company, job_location, salary, job_types, benefits, captured_at
                 FROM job_details WHERE job_unique_id = ?",
                [job_unique_id],
                |r| {
                    Ok(JobDetail {
                        job_unique_id: r.get(0)?,
                        title: r.get(1)?,
                        company: r.get(2)?,
                        location: r.get(3)?,
                        salary: r.get(4)?,
                        job_types: split_list(r.get(5)?),
                        benefits: split_list(r.get(6)?),
                        captured_at: r.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(detail)
    }
}

fn split_list(flat: Option<String>) -> Vec<String> {
    flat.map(|s| s.split(", ").map(str::to_string).collect())
        .unwrap_or_default()
}

fn posting_from_row(r: &Row<'_>) -> rusqlite::Result<JobPosting> {
    Ok(JobPosting {
        job_unique_id: r.get(0)?,
        title: r.get(1)?,
        link: r.get(2)?,
        session_id: r.get(3)?,
        company: r.get(4)?,
        description: r.get(5)?,
    })
}

impl Store for SqliteStore {
    fn create_session(&self, session: &NewSession) -> Result<SessionId> {
        self.conn.execute(
            "INSERT INTO search_sessions (terms, location, filter_tags, n_pages, started_at, ended_at)
             VALUES (?, ?, ?, ?, ?, NULL)",
            params![
                session.terms,
                session.location,
                session.filter_tags,
                session.page_count,
                session.started_at
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(session_id = id, "search session started");
        Ok(id)
    }

    fn finish_session(&self, id: SessionId, ended_at: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE search_sessions SET ended_at = ? WHERE session_id = ?",
            params![ended_at, id],
        )?;
        Ok(())
    }

    fn insert_posting_if_absent(&self, posting: &JobPosting) -> Result<bool> {
        let changed = self.conn.execute(
            "INSERT INTO job_postings (job_unique_id, job_title, job_link, session_id, job_company)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(job_unique_id) DO NOTHING",
            params![
                posting.job_unique_id,
                posting.title,
                posting.link,
                posting.session_id,
                posting.company
            ],
        )?;
        debug!(id = %posting.job_unique_id, inserted = changed > 0, "posting written");
        Ok(changed > 0)
    }

    fn update_description(&self, job_unique_id: &str, text: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE job_postings SET job_description = ? WHERE job_unique_id = ?",
            params![text, job_unique_id],
        )?;
        Ok(())
    }

    fn query(&self, query: PostingQuery) -> Result<Vec<JobPosting>> {
        let (filter, session) = match query {
            PostingQuery::NeedsDescription => (
                "job_link IS NOT NULL AND (
                   job_description IS NULL
                   OR job_description = ''
                   OR job_description LIKE 'Verify% you are human%'
                   OR job_description LIKE '%nable JavaScript%')",
                None,
            ),
            PostingQuery::Session(id) => ("session_id = ?1", Some(id)),
            PostingQuery::All => ("1 = 1", None),
        };
        let sql = format!("SELECT {POSTING_COLUMNS} FROM job_postings WHERE {filter} ORDER BY rowid");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = match session {
            Some(id) => stmt.query_map([id], posting_from_row)?,
            None => stmt.query_map([], posting_from_row)?,
        };
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn insert_job_detail(&self, detail: &JobDetail) -> Result<()> {
        self.conn.execute(
            "INSERT INTO job_details (job_unique_id, job_title, job_company, job_location, salary, job_types, benefits, captured_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(job_unique_id) DO UPDATE SET
               job_title = excluded.job_title,
               job_company = excluded.job_company,
               job_location = excluded.job_location,
               salary = excluded.salary,
               job_types = excluded.job_types,
               benefits = excluded.benefits,
               captured_at = excluded.captured_at",
            params![
                detail.job_unique_id,
                detail.title,
                detail.company,
                detail.location,
                detail.salary,
                flatten_list(&detail.job_types),
                flatten_list(&detail.benefits),
                detail.captured_at
            ],
        )?;
        Ok(())
    }
}
