//! Anti-automation interstitials: spotting them and poking at them.
//!
//! Recovery is best-effort. [`ChallengeDetector::resolve`] never reports
//! success; callers look at the page again afterwards.

use crate::browser::{Browser, BrowserKind};
use crate::config::{ChallengeConfig, ClickPoint, PacingConfig};
use crate::utils::pause;
use crate::Result;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The one recovery action tried per challenge.
pub trait ChallengeSolver {
    fn attempt(&self, browser: &mut dyn Browser, kind: BrowserKind) -> Result<()>;
}

/// Clicks a fixed viewport point registered for the browser in use.
#[derive(Debug, Clone, Default)]
pub struct CoordinateSolver {
    points: HashMap<BrowserKind, ClickPoint>,
}

impl CoordinateSolver {
    pub fn new(points: HashMap<BrowserKind, ClickPoint>) -> Self {
        Self { points }
    }

    pub fn with_point(mut self, kind: BrowserKind, x: f64, y: f64) -> Self {
        self.points.insert(kind, ClickPoint { x, y });
        self
    }
}

impl ChallengeSolver for CoordinateSolver {
    fn attempt(&self, browser: &mut dyn Browser, kind: BrowserKind) -> Result<()> {
        match self.points.get(&kind) {
            Some(point) => {
                debug!(%kind, x = point.x, y = point.y, "clicking challenge control");
                browser.click_at(point.x, point.y)
            }
            None => {
                warn!(%kind, "no challenge click point registered");
                Ok(())
            }
        }
    }
}

/// Leaves the challenge alone, for runs where a human is watching.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSolver;

impl ChallengeSolver for NoopSolver {
    fn attempt(&self, _browser: &mut dyn Browser, _kind: BrowserKind) -> Result<()> {
        Ok(())
    }
}

pub struct ChallengeDetector {
    markers: Vec<String>,
    solver: Box<dyn ChallengeSolver>,
    settle: Duration,
    jitter: Duration,
}

impl ChallengeDetector {
    pub fn new(markers: Vec<String>, solver: Box<dyn ChallengeSolver>) -> Self {
        Self {
            markers,
            solver,
            settle: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    pub fn from_config(config: &ChallengeConfig, pacing: &PacingConfig) -> Self {
        let solver = CoordinateSolver::new(config.click_points.clone());
        Self::new(config.markers.clone(), Box::new(solver)).with_pacing(pacing)
    }

    pub fn with_pacing(mut self, pacing: &PacingConfig) -> Self {
        self.settle = pacing.challenge_settle();
        self.jitter = pacing.jitter();
        self
    }

    pub fn is_challenged(&self, page_content: &str) -> bool {
        self.markers
            .iter()
            .any(|marker| page_content.contains(marker.as_str()))
    }

    /// Fullscreen, settle, one solver attempt, settle, restore.
    pub fn resolve(&self, browser: &mut dyn Browser) {
        let kind = browser.kind();
        info!(%kind, "attempting to clear challenge");

        if let Err(e) = browser.fullscreen() {
            warn!(error = %e, "could not fullscreen for challenge");
        }
        pause(self.settle, self.jitter);

        if let Err(e) = self.solver.attempt(browser, kind) {
            warn!(error = %e, "challenge solver failed");
        }
        pause(self.settle, self.jitter);

        if let Err(e) = browser.minimize() {
            warn!(error = %e, "could not restore window after challenge");
        }
    }

    /// Checks the current page and runs [`resolve`](Self::resolve) once if it
    /// is a challenge. Returns whether a challenge was seen.
    pub fn guard(&self, browser: &mut dyn Browser) -> Result<bool> {
        let source = browser.page_source()?;
        if !self.is_challenged(&source) {
            return Ok(false);
        }
        info!("challenge page detected");
        self.resolve(browser);
        Ok(true)
    }
}
