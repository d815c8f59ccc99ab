use crate::backfill::{BackfillReport, DescriptionBackfill};
use crate::browser::Browser;
use crate::challenge::{ChallengeDetector, ChallengeSolver};
use crate::config::CrawlerConfig;
use crate::crawler::{CrawlReport, ListingCrawler};
use crate::query::SearchParams;
use crate::store::Store;
use crate::{CrawlError, Result};

/// What a run should do.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub params: SearchParams,
    pub max_pages: u32,
    pub search: bool,
    pub update_descriptions: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub listing: Option<CrawlReport>,
    /// Set when the listing crawl stopped early. The backfill still runs.
    pub listing_error: Option<String>,
    pub backfill: Option<BackfillReport>,
}

/// Listing crawl, then description backfill. The phases share nothing but
/// the store.
pub struct CrawlPipeline<'a, S: Store> {
    store: &'a S,
    config: &'a CrawlerConfig,
    challenge: ChallengeDetector,
}

impl<'a, S: Store> CrawlPipeline<'a, S> {
    pub fn new(store: &'a S, config: &'a CrawlerConfig) -> Self {
        Self {
            store,
            config,
            challenge: ChallengeDetector::from_config(&config.challenge, &config.pacing),
        }
    }

    pub fn with_solver(mut self, solver: Box<dyn ChallengeSolver>) -> Self {
        self.challenge = ChallengeDetector::new(self.config.challenge.markers.clone(), solver)
            .with_pacing(&self.config.pacing);
        self
    }

    /// `launch` opens a fresh browser; each phase that has work calls it once.
    /// An invalid query or a failed backfill ends the run with an error. A
    /// listing crawl that stops early is reported in
    /// [`RunSummary::listing_error`] and the backfill runs anyway.
    pub fn run<B, F>(&self, plan: &RunPlan, launch: F) -> Result<RunSummary>
    where
        B: Browser,
        F: Fn() -> Result<B>,
    {
        let mut summary = RunSummary::default();

        if plan.search {
            println!("Searching for {} pages of job postings.", plan.max_pages);
            let crawler = ListingCrawler::new(self.store, &self.challenge, self.config.pacing.clone());
            match crawler.crawl(&plan.params, plan.max_pages, &launch) {
                Ok(report) => {
                    println!("✅ {} new postings over {} pages", report.inserted, report.pages);
                    summary.listing = Some(report);
                }
                Err(e @ CrawlError::InvalidQuery(_)) => {
                    eprintln!("❌ invalid search: {e}");
                    return Err(e);
                }
                Err(e) => {
                    // postings from earlier pages are stored and still need descriptions
                    eprintln!("❌ listing crawl failed: {e}");
                    summary.listing_error = Some(e.to_string());
                }
            }
        } else {
            println!("Skipping search. Only updating job descriptions.");
        }

        if plan.update_descriptions {
            let backfill = DescriptionBackfill::new(
                self.store,
                &self.challenge,
                &self.config.backfill,
                self.config.pacing.clone(),
            );
            let report = backfill
                .run(&launch)
                .inspect(|r| println!("✅ {} job descriptions updated", r.updated))
                .inspect_err(|e| eprintln!("❌ description update failed: {e}"))?;
            summary.backfill = Some(report);
        } else {
            println!("Skipping job description updates.");
        }

        Ok(summary)
    }
}
