use crate::browser::BrowserKind;
use crate::{CrawlError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

const DEFAULT_CONFIG_FILE: &str = "crawler.yaml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    pub database_path: PathBuf,
    pub browser: BrowserConfig,
    pub pacing: PacingConfig,
    pub challenge: ChallengeConfig,
    pub backfill: BackfillConfig,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("indeed.db"),
            browser: BrowserConfig::default(),
            pacing: PacingConfig::default(),
            challenge: ChallengeConfig::default(),
            backfill: BackfillConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub kind: BrowserKind,
    pub headless: bool,
    pub user_agent: String,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            kind: BrowserKind::Chrome,
            headless: false,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            window_width: 1920,
            window_height: 1080,
        }
    }
}

/// Every pause the crawler takes, in milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub page_settle_ms: u64,
    pub popup_settle_ms: u64,
    pub challenge_settle_ms: u64,
    /// Delay before each backfill retry. Its length is the number of retries.
    pub retry_delays_ms: Vec<u64>,
    /// Upper bound of random extra time added to every pause.
    pub jitter_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            page_settle_ms: 1000,
            popup_settle_ms: 1000,
            challenge_settle_ms: 2000,
            retry_delays_ms: vec![0, 3000],
            jitter_ms: 0,
        }
    }
}

impl PacingConfig {
    /// No pauses at all.
    pub fn immediate() -> Self {
        Self {
            page_settle_ms: 0,
            popup_settle_ms: 0,
            challenge_settle_ms: 0,
            retry_delays_ms: vec![0, 0],
            jitter_ms: 0,
        }
    }

    pub fn page_settle(&self) -> Duration {
        Duration::from_millis(self.page_settle_ms)
    }

    pub fn popup_settle(&self) -> Duration {
        Duration::from_millis(self.popup_settle_ms)
    }

    pub fn challenge_settle(&self) -> Duration {
        Duration::from_millis(self.challenge_settle_ms)
    }

    pub fn retry_delays(&self) -> impl Iterator<Item = Duration> + '_ {
        self.retry_delays_ms.iter().map(|ms| Duration::from_millis(*ms))
    }

    pub fn jitter(&self) -> Duration {
        Duration::from_millis(self.jitter_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ClickPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    /// Page text that identifies an anti-automation interstitial.
    pub markers: Vec<String>,
    /// Where the "I am human" control sits, per browser, on a fullscreen window.
    pub click_points: HashMap<BrowserKind, ClickPoint>,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            markers: vec![
                "Verify you are human".to_string(),
                "Verifying you are human".to_string(),
                "Additional Verification Required".to_string(),
            ],
            // measured on a 1920x1080 display
            click_points: HashMap::from([
                (BrowserKind::Chrome, ClickPoint { x: 537.0, y: 286.0 }),
                (BrowserKind::Firefox, ClickPoint { x: 537.0, y: 286.0 }),
            ]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackfillConfig {
    /// Upper bound on selection passes per run.
    pub max_passes: usize,
    pub capture_details: bool,
    pub link_placeholder: String,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            max_passes: 2,
            capture_details: false,
            link_placeholder: "<url removed>".to_string(),
        }
    }
}

/// Reads `path`, or `./crawler.yaml` when present, or falls back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<CrawlerConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = Path::new(DEFAULT_CONFIG_FILE);
            if p.exists() {
                p.to_path_buf()
            } else {
                return Ok(CrawlerConfig::default());
            }
        }
    };

    info!(path = %path.display(), "loading config");
    let raw = fs::read_to_string(&path)?;
    parse_config(&raw)
}

pub fn parse_config(raw: &str) -> Result<CrawlerConfig> {
    serde_yaml::from_str(raw).map_err(|e| CrawlError::Config(e.to_string()))
}
