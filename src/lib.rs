pub mod backfill;
pub mod browser;
pub mod challenge;
pub mod config;
pub mod crawler;
pub mod error;
pub mod extractor;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod query;
pub mod store;
pub mod utils;
pub mod writer;

pub use backfill::{BackfillReport, DescriptionBackfill};
pub use browser::{Browser, BrowserKind, ChromeBrowser, Navigation, Node};
pub use challenge::{ChallengeDetector, ChallengeSolver, CoordinateSolver, NoopSolver};
pub use config::{load_config, CrawlerConfig};
pub use crawler::{CrawlReport, ListingCrawler};
pub use error::CrawlError;
pub use extractor::{DetailExtractor, JobFieldExtractor, PageExtractor};
pub use models::{FilterTag, JobDetail, JobPosting, PartialPosting, SearchSession, SessionId};
pub use normalize::MarkdownNormalizer;
pub use pipeline::{CrawlPipeline, RunPlan, RunSummary};
pub use query::{build_query_url, Country, SearchParams, SortBy};
pub use store::{PostingQuery, SqliteStore, Store};
pub use writer::save_to_csv;

pub type Result<T> = std::result::Result<T, CrawlError>;
