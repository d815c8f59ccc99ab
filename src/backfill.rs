use crate::browser::Browser;
use crate::challenge::ChallengeDetector;
use crate::config::{BackfillConfig, PacingConfig};
use crate::extractor::DetailExtractor;
use crate::models::JobPosting;
use crate::normalize::MarkdownNormalizer;
use crate::store::{PostingQuery, Store};
use crate::utils::pause;
use crate::{CrawlError, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

const DESCRIPTION: &str = ".jobsearch-JobComponent";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub passes: usize,
    /// Postings picked up, summed over passes.
    pub selected: usize,
    pub updated: usize,
    /// Postings given up on after the retry ladder, summed over passes.
    pub abandoned: usize,
    pub failed_writes: usize,
    pub details_captured: usize,
    /// Still selectable when the run ended.
    pub remaining: usize,
}

/// Revisits postings without a usable description and stores the text.
pub struct DescriptionBackfill<'a, S: Store> {
    store: &'a S,
    challenge: &'a ChallengeDetector,
    normalizer: MarkdownNormalizer,
    details: Option<DetailExtractor>,
    pacing: PacingConfig,
    max_passes: usize,
}

impl<'a, S: Store> DescriptionBackfill<'a, S> {
    pub fn new(
        store: &'a S,
        challenge: &'a ChallengeDetector,
        config: &BackfillConfig,
        pacing: PacingConfig,
    ) -> Self {
        Self {
            store,
            challenge,
            normalizer: MarkdownNormalizer::new(config.link_placeholder.clone()),
            details: config.capture_details.then_some(DetailExtractor),
            pacing,
            max_passes: config.max_passes.max(1),
        }
    }

    /// Runs passes until nothing is left to fetch or the pass limit is hit.
    /// The browser is only launched when there is work.
    pub fn run<B, F>(&self, launch: F) -> Result<BackfillReport>
    where
        B: Browser,
        F: FnOnce() -> Result<B>,
    {
        let pending = self.store.query(PostingQuery::NeedsDescription)?;
        if pending.is_empty() {
            println!("No job postings to update.");
            return Ok(BackfillReport::default());
        }

        let mut browser = launch()?;
        let outcome = self.drain(&mut browser, pending);
        if let Err(e) = browser.close() {
            warn!(error = %e, "browser did not close cleanly");
        }
        outcome
    }

    fn drain<B: Browser>(&self, browser: &mut B, mut pending: Vec<JobPosting>) -> Result<BackfillReport> {
        let mut report = BackfillReport::default();

        while !pending.is_empty() && report.passes < self.max_passes {
            report.passes += 1;
            println!("Updating {} job postings.", pending.len());
            self.run_pass(browser, &pending, &mut report)?;
            pending = self.store.query(PostingQuery::NeedsDescription)?;
        }

        report.remaining = pending.len();
        info!(?report, "description backfill finished");
        Ok(report)
    }

    /// One sweep over `postings` in store order.
    pub fn run_pass<B: Browser>(
        &self,
        browser: &mut B,
        postings: &[JobPosting],
        report: &mut BackfillReport,
    ) -> Result<()> {
        let total = postings.len();
        report.selected += total;

        for (idx, posting) in postings.iter().enumerate() {
            let Some(link) = posting.link.as_deref() else {
                continue;
            };
            println!("Job {} of {}: {}", idx + 1, total, link);

            match self.fetch_with_retries(browser, link)? {
                Some(html) => self.save(browser, posting, &html, report),
                None => report.abandoned += 1,
            }
        }
        Ok(())
    }

    /// Navigation failures propagate. Missing content and challenge pages are
    /// retried once per configured delay, then the posting is left for a
    /// later run. Each read or retry makes at most one solver attempt.
    fn fetch_with_retries<B: Browser>(&self, browser: &mut B, link: &str) -> Result<Option<String>> {
        browser.navigate(link)?;
        pause(self.pacing.page_settle(), self.pacing.jitter());

        let mut outcome = self.read_description(browser);
        for (retry, delay) in self.pacing.retry_delays().enumerate() {
            match outcome {
                Ok(html) => return Ok(Some(html)),
                Err(e) if e.is_recoverable() => {
                    debug!(retry = retry + 1, error = %e, "description unreadable, retrying");
                    pause(delay, self.pacing.jitter());
                    // a challenged body was already resolved by the read itself
                    if !matches!(e, CrawlError::ChallengePresented { .. }) {
                        self.challenge.guard(browser)?;
                    }
                    outcome = self.read_description(browser);
                }
                Err(e) => return Err(e),
            }
        }

        match outcome {
            Ok(html) => Ok(Some(html)),
            Err(e) if e.is_recoverable() => {
                warn!(%link, error = %e, "giving up on posting for this run");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn read_description<B: Browser>(&self, browser: &mut B) -> Result<String> {
        match browser.find_one(DESCRIPTION) {
            Ok(node) => Ok(node.inner_html().to_string()),
            Err(CrawlError::ElementNotFound { .. }) => {
                // off-site postings have no description container, take the whole body
                let body = browser.find_one("body")?;
                if self.challenge.is_challenged(body.inner_html()) {
                    pause(self.pacing.challenge_settle(), self.pacing.jitter());
                    self.challenge.resolve(browser);
                    return Err(CrawlError::ChallengePresented {
                        url: browser.current_url().unwrap_or_default(),
                    });
                }
                Ok(body.inner_html().to_string())
            }
            Err(e) => Err(e),
        }
    }

    fn save<B: Browser>(&self, browser: &B, posting: &JobPosting, html: &str, report: &mut BackfillReport) {
        let text = match self.normalizer.to_text(html) {
            Ok(text) => text,
            Err(e) => {
                warn!(id = %posting.job_unique_id, error = %e, "could not normalize description");
                report.abandoned += 1;
                return;
            }
        };

        match self.store.update_description(&posting.job_unique_id, &text) {
            Ok(()) => report.updated += 1,
            Err(e) => {
                warn!(id = %posting.job_unique_id, error = %e, "could not store description");
                report.failed_writes += 1;
            }
        }

        if let Some(details) = &self.details {
            let captured = details
                .extract(browser, &posting.job_unique_id, &Utc::now().to_rfc3339())
                .and_then(|detail| self.store.insert_job_detail(&detail));
            match captured {
                Ok(()) => report.details_captured += 1,
                Err(e) => warn!(id = %posting.job_unique_id, error = %e, "could not capture job detail"),
            }
        }
    }
}
