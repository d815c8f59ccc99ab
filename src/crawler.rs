//! The listing crawl: walks search result pages in order and records every
//! job card it can identify.
//!
//! ```text
//! Start -> SessionOpen -> PopupDismiss -> ChallengeCheck -> Extract -> Persist
//!            ^                                                          |
//!            |                                                          v
//!         PageLoad <------------------------------------------ PaginateDecision -> Done
//! ```
//!
//! Any browser failure leaves the machine; the browser is closed either way.

use crate::browser::{Browser, Navigation};
use crate::challenge::ChallengeDetector;
use crate::config::PacingConfig;
use crate::extractor::{discover_filters, PageExtractor};
use crate::models::{JobPosting, NewSession, SessionId};
use crate::query::{build_query_url, SearchParams};
use crate::store::Store;
use crate::utils::pause;
use crate::{CrawlError, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

const POPUP_CLOSE: &str = r#"button[aria-label="close"]"#;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub session_id: Option<SessionId>,
    pub pages: u32,
    pub cards: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub skipped_without_id: usize,
    pub failed_writes: usize,
}

#[derive(Debug)]
enum Step {
    SessionOpen { url: String },
    PageLoad { page: u32 },
    PopupDismiss { page: u32, nav: Navigation },
    ChallengeCheck { page: u32, nav: Navigation },
    Extract { page: u32, nav: Navigation },
    Persist { page: u32, postings: Vec<JobPosting> },
    PaginateDecision { page: u32 },
    Done,
}

pub struct ListingCrawler<'a, S: Store> {
    store: &'a S,
    challenge: &'a ChallengeDetector,
    extractor: PageExtractor,
    pacing: PacingConfig,
}

impl<'a, S: Store> ListingCrawler<'a, S> {
    pub fn new(store: &'a S, challenge: &'a ChallengeDetector, pacing: PacingConfig) -> Self {
        Self {
            store,
            challenge,
            extractor: PageExtractor,
            pacing,
        }
    }

    /// Crawls pages `1..=page_count`. Inputs are validated before `launch`
    /// is called, so a bad query never opens a browser.
    pub fn crawl<B, F>(
        &self,
        params: &SearchParams,
        page_count: u32,
        launch: F,
    ) -> Result<CrawlReport>
    where
        B: Browser,
        F: FnOnce() -> Result<B>,
    {
        let first_page = build_query_url(params, Some(1))?;
        if page_count == 0 {
            return Err(CrawlError::InvalidQuery(
                "max pages must be at least 1".into(),
            ));
        }

        let mut browser = launch()?;
        let outcome = self.walk(&mut browser, params, page_count, first_page);
        if let Err(e) = browser.close() {
            warn!(error = %e, "browser did not close cleanly");
        }
        outcome
    }

    fn walk<B: Browser>(
        &self,
        browser: &mut B,
        params: &SearchParams,
        page_count: u32,
        first_page: String,
    ) -> Result<CrawlReport> {
        let mut report = CrawlReport::default();
        let mut session_id: SessionId = 0;
        let mut step = Step::SessionOpen { url: first_page };

        loop {
            debug!(?step, "listing crawl step");
            step = match step {
                Step::SessionOpen { url } => {
                    let nav = browser.navigate(&url)?;
                    pause(self.pacing.page_settle(), self.pacing.jitter());
                    session_id = self.open_session(browser, params, page_count)?;
                    report.session_id = Some(session_id);
                    Step::PopupDismiss { page: 1, nav }
                }
                Step::PageLoad { page } => {
                    let url = build_query_url(params, Some(page))?;
                    let nav = browser.navigate(&url)?;
                    pause(self.pacing.page_settle(), self.pacing.jitter());
                    Step::PopupDismiss { page, nav }
                }
                Step::PopupDismiss { page, nav } => {
                    println!("Page {page} of {page_count}");
                    self.dismiss_popup(browser);
                    Step::ChallengeCheck { page, nav }
                }
                Step::ChallengeCheck { page, nav } => {
                    // one attempt; a page still blocked just yields no cards
                    self.challenge.guard(browser)?;
                    Step::Extract { page, nav }
                }
                Step::Extract { page, nav } => {
                    if nav.redirected() {
                        debug!(requested = %nav.requested, landed = %nav.landed, "search redirected");
                    }
                    let mut postings = Vec::new();
                    for card in self.extractor.extract(&*browser)? {
                        report.cards += 1;
                        match card.into_posting(session_id) {
                            Some(posting) => postings.push(posting),
                            None => report.skipped_without_id += 1,
                        }
                    }
                    Step::Persist { page, postings }
                }
                Step::Persist { page, postings } => {
                    self.persist(&postings, &mut report);
                    report.pages = page;
                    Step::PaginateDecision { page }
                }
                Step::PaginateDecision { page } => {
                    if page < page_count {
                        Step::PageLoad { page: page + 1 }
                    } else {
                        Step::Done
                    }
                }
                Step::Done => break,
            };
        }

        if let Err(e) = self.store.finish_session(session_id, &Utc::now().to_rfc3339()) {
            warn!(session_id, error = %e, "could not stamp session end");
        }
        info!(?report, "listing crawl finished");
        Ok(report)
    }

    fn open_session<B: Browser>(
        &self,
        browser: &mut B,
        params: &SearchParams,
        page_count: u32,
    ) -> Result<SessionId> {
        let filters = discover_filters(browser);
        self.store.create_session(&NewSession {
            terms: params.keywords.clone().unwrap_or_default(),
            location: params.location.clone(),
            filter_tags: serde_json::to_string(&filters)?,
            page_count,
            started_at: Utc::now().to_rfc3339(),
        })
    }

    /// The interstitial is usually absent; nothing here escapes.
    fn dismiss_popup<B: Browser>(&self, browser: &mut B) {
        match browser.click(POPUP_CLOSE) {
            Ok(()) => {
                debug!("closed popup");
                pause(self.pacing.popup_settle(), self.pacing.jitter());
            }
            Err(e) => debug!(error = %e, "no popup to close"),
        }
    }

    fn persist(&self, postings: &[JobPosting], report: &mut CrawlReport) {
        for posting in postings {
            match self.store.insert_posting_if_absent(posting) {
                Ok(true) => report.inserted += 1,
                Ok(false) => report.duplicates += 1,
                Err(e) => {
                    warn!(id = %posting.job_unique_id, error = %e, "could not store posting");
                    report.failed_writes += 1;
                }
            }
        }
    }
}
