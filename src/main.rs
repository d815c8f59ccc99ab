use anyhow::{Context, Result};
use clap::Parser;
use indeed_crawler::{
    load_config, save_to_csv, ChromeBrowser, Country, CrawlPipeline, PostingQuery, RunPlan,
    SearchParams, SortBy, SqliteStore, Store,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "indeed-crawler", version, about = "Scrape job listings from Indeed.")]
struct Cli {
    /// Keywords to search for.
    #[arg(long, default_value = "Data Analyst")]
    keywords: String,
    /// Location to search in, or "Remote".
    #[arg(long, default_value = "Remote")]
    location: String,
    /// Country to search in (USA or CANADA).
    #[arg(long, default_value = "USA")]
    country: Country,
    /// Sort by date or relevance.
    #[arg(long, default_value = "date")]
    sort_by: SortBy,
    /// Search radius around the location. Ignored for remote searches.
    #[arg(long, default_value_t = 50)]
    radius: u32,
    /// Maximum number of result pages to walk.
    #[arg(long, default_value_t = 5)]
    max_pages: u32,
    /// Skip the listing crawl, only update job descriptions.
    #[arg(long)]
    dont_search: bool,
    /// Skip updating job descriptions.
    #[arg(long)]
    dont_update_job_descriptions: bool,
    /// Config file (YAML). If omitted, loads ./crawler.yaml if present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// SQLite database, overrides the config file.
    #[arg(long)]
    database: Option<PathBuf>,
    /// Write every stored posting to this CSV file when done.
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,
    /// Run the browser without a window.
    #[arg(long)]
    headless: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,headless_chrome=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("failed to load config")?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    if cli.headless {
        config.browser.headless = true;
    }

    let params = SearchParams::new(cli.keywords, cli.country)
        .location(cli.location)
        .sort_by(cli.sort_by)
        .radius(Some(cli.radius));
    let plan = RunPlan {
        params,
        max_pages: cli.max_pages,
        search: !cli.dont_search,
        update_descriptions: !cli.dont_update_job_descriptions,
    };

    if plan.search {
        println!(
            "Searching for {} jobs in {}.",
            plan.params.keywords.as_deref().unwrap_or_default(),
            plan.params.location.as_deref().unwrap_or_default()
        );
    }

    let store = SqliteStore::open(&config.database_path).context("failed to open database")?;
    let summary = CrawlPipeline::new(&store, &config)
        .run(&plan, || ChromeBrowser::launch(&config.browser))?;
    tracing::info!(?summary, "run complete");

    if let Some(path) = cli.export {
        let postings = store.query(PostingQuery::All)?;
        save_to_csv(&postings, &path)
            .with_context(|| format!("failed to export to {}", path.display()))?;
        println!("✅ exported {} postings to {}", postings.len(), path.display());
    }

    if let Some(reason) = summary.listing_error {
        anyhow::bail!("listing crawl did not finish: {reason}");
    }
    Ok(())
}
