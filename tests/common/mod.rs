#![allow(dead_code)]

use indeed_crawler::config::PacingConfig;
use indeed_crawler::models::{JobDetail, JobPosting, NewSession, SessionId};
use indeed_crawler::{
    build_query_url, Browser, BrowserKind, ChallengeDetector, CoordinateSolver, CrawlError,
    Navigation, Node, PostingQuery, SearchParams, SqliteStore, Store,
};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

pub type Result<T> = indeed_crawler::Result<T>;

pub const CHALLENGE_PAGE: &str =
    "<html><body><h1>Verify you are human</h1><p>Complete the action below.</p></body></html>";

/// What the fake browser was asked to do, in order.
#[derive(Debug, Default)]
pub struct Journal {
    pub events: Vec<String>,
    pub launches: usize,
}

impl Journal {
    pub fn count(&self, prefix: &str) -> usize {
        self.events.iter().filter(|e| e.starts_with(prefix)).count()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| e.strip_prefix("navigate ").map(str::to_string))
            .collect()
    }
}

/// A browser that serves canned HTML per URL. A click on the registered
/// challenge point swaps a challenged page for its `solved` version.
#[derive(Clone, Default)]
pub struct ScriptedBrowser {
    pages: HashMap<String, String>,
    solved: HashMap<String, String>,
    broken: HashSet<String>,
    current: String,
    journal: Rc<RefCell<Journal>>,
}

impl ScriptedBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    pub fn solves_to(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.solved.insert(url.into(), html.into());
        self
    }

    pub fn broken(mut self, url: impl Into<String>) -> Self {
        self.broken.insert(url.into());
        self
    }

    pub fn journal(&self) -> Rc<RefCell<Journal>> {
        Rc::clone(&self.journal)
    }

    /// A launcher handing out clones that share this browser's journal.
    pub fn launcher(&self) -> impl Fn() -> Result<ScriptedBrowser> + '_ {
        move || {
            self.journal.borrow_mut().launches += 1;
            Ok(self.clone())
        }
    }

    fn record(&self, event: impl Into<String>) {
        self.journal.borrow_mut().events.push(event.into());
    }
}

impl Browser for ScriptedBrowser {
    fn kind(&self) -> BrowserKind {
        BrowserKind::Firefox
    }

    fn navigate(&mut self, url: &str) -> Result<Navigation> {
        self.record(format!("navigate {url}"));
        if self.broken.contains(url) {
            return Err(CrawlError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_CONNECTION_RESET".into(),
            });
        }
        self.current = url.to_string();
        Ok(Navigation {
            requested: url.to_string(),
            landed: url.to_string(),
        })
    }

    fn current_url(&self) -> Result<String> {
        Ok(self.current.clone())
    }

    fn page_source(&self) -> Result<String> {
        Ok(self
            .pages
            .get(&self.current)
            .cloned()
            .unwrap_or_else(|| "<html><body></body></html>".to_string()))
    }

    fn click(&mut self, selector: &str) -> Result<()> {
        Node::document(self.page_source()?).find_one(selector)?;
        self.record(format!("click {selector}"));
        Ok(())
    }

    fn click_at(&mut self, x: f64, y: f64) -> Result<()> {
        self.record(format!("click_at {x} {y}"));
        if let Some(html) = self.solved.remove(&self.current) {
            self.pages.insert(self.current.clone(), html);
        }
        Ok(())
    }

    fn fullscreen(&mut self) -> Result<()> {
        self.record("fullscreen");
        Ok(())
    }

    fn minimize(&mut self) -> Result<()> {
        self.record("minimize");
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.record("close");
        Ok(())
    }
}

pub fn detector() -> ChallengeDetector {
    let solver = CoordinateSolver::default().with_point(BrowserKind::Firefox, 537.0, 286.0);
    ChallengeDetector::new(vec!["Verify you are human".into()], Box::new(solver))
        .with_pacing(&PacingConfig::immediate())
}

pub fn page_url(params: &SearchParams, page: u32) -> String {
    build_query_url(params, Some(page)).unwrap()
}

pub fn card(id: &str, title: &str, href: Option<&str>, company: &str) -> String {
    let href = href.map(|h| format!(" href=\"{h}\"")).unwrap_or_default();
    format!(
        r#"<div class="cardOutline">
             <h2 class="jobTitle"><a id="{id}"{href} class="jcs-JobTitle"><span>{title}</span></a></h2>
             <span data-testid="company-name">{company}</span>
           </div>"#
    )
}

pub fn results_page(cards: &[String]) -> String {
    format!(
        "<html><body><div id=\"mosaic\">{}</div></body></html>",
        cards.concat()
    )
}

pub fn description_page(body: &str) -> String {
    format!(
        "<html><body><div class=\"jobsearch-JobComponent\">{body}</div></body></html>"
    )
}

pub fn session(store: &SqliteStore) -> SessionId {
    store
        .create_session(&NewSession {
            terms: "Data Analyst".into(),
            location: Some("Remote".into()),
            filter_tags: "[]".into(),
            page_count: 1,
            started_at: "2026-10-18T09:00:00+00:00".into(),
        })
        .unwrap()
}

pub fn posting(id: &str, session_id: SessionId, link: Option<&str>) -> JobPosting {
    JobPosting {
        job_unique_id: id.into(),
        title: Some(format!("Title {id}")),
        link: link.map(str::to_string),
        session_id,
        company: None,
        description: None,
    }
}

pub fn by_id(store: &SqliteStore, id: &str) -> JobPosting {
    store
        .query(PostingQuery::All)
        .unwrap()
        .into_iter()
        .find(|p| p.job_unique_id == id)
        .unwrap()
}

/// Delegates to SQLite but rejects writes for the listed ids.
pub struct RejectingStore {
    pub inner: SqliteStore,
    pub reject: HashSet<String>,
}

impl RejectingStore {
    fn check(&self, id: &str) -> Result<()> {
        if self.reject.contains(id) {
            Err(CrawlError::Persistence(rusqlite::Error::InvalidQuery))
        } else {
            Ok(())
        }
    }
}

impl Store for RejectingStore {
    fn create_session(&self, session: &NewSession) -> Result<SessionId> {
        self.inner.create_session(session)
    }

    fn finish_session(&self, id: SessionId, ended_at: &str) -> Result<()> {
        self.inner.finish_session(id, ended_at)
    }

    fn insert_posting_if_absent(&self, posting: &JobPosting) -> Result<bool> {
        self.check(&posting.job_unique_id)?;
        self.inner.insert_posting_if_absent(posting)
    }

    fn update_description(&self, job_unique_id: &str, text: &str) -> Result<()> {
        self.check(job_unique_id)?;
        self.inner.update_description(job_unique_id, text)
    }

    fn query(&self, query: PostingQuery) -> Result<Vec<JobPosting>> {
        self.inner.query(query)
    }

    fn insert_job_detail(&self, detail: &JobDetail) -> Result<()> {
        self.inner.insert_job_detail(detail)
    }
}
