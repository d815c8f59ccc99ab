pub const SCHEMA: &str = r#"
BEGIN;

CREATE TABLE IF NOT EXISTS search_sessions (
  session_id      INTEGER PRIMARY KEY AUTOINCREMENT,
  terms           TEXT NOT NULL,
  location        TEXT,
  filter_tags     TEXT NOT NULL DEFAULT '[]',
  n_pages         INTEGER NOT NULL,
  started_at      TEXT NOT NULL,
  ended_at        TEXT
);

CREATE TABLE IF NOT EXISTS job_postings (
  job_unique_id   TEXT PRIMARY KEY NOT NULL,
  job_title       TEXT,
  job_link        TEXT,
  session_id      INTEGER NOT NULL REFERENCES search_sessions(session_id),
  job_company     TEXT,
  job_description TEXT
);

CREATE TABLE IF NOT EXISTS job_details (
  job_unique_id   TEXT PRIMARY KEY NOT NULL,
  job_title       TEXT,
  job_company     TEXT,
  job_location    TEXT,
  salary          TEXT,
  job_types       TEXT,
  benefits        TEXT,
  captured_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_postings_session ON job_postings(session_id);

COMMIT;
"#;
