use super::{Browser, BrowserKind, Navigation};
use crate::config::BrowserConfig;
use crate::{CrawlError, Result};
use headless_chrome::browser::tab::point::Point;
use headless_chrome::types::Bounds;
use headless_chrome::{LaunchOptions, Tab};
use std::ffi::OsString;
use std::sync::Arc;
use tracing::{debug, info};

/// A single-tab Chrome session.
pub struct ChromeBrowser {
    // keeps the browser process alive for as long as the tab is used
    _process: headless_chrome::Browser,
    tab: Arc<Tab>,
    kind: BrowserKind,
    window: (u32, u32),
    headless: bool,
    closed: bool,
}

impl ChromeBrowser {
    pub fn launch(config: &BrowserConfig) -> Result<Self> {
        check_kind(config.kind)?;
        info!(kind = %config.kind, headless = config.headless, "opening browser");

        let user_agent = OsString::from(format!("--user-agent={}", config.user_agent));
        let automation = OsString::from("--disable-blink-features=AutomationControlled");
        let window = (config.window_width, config.window_height);

        let process = headless_chrome::Browser::new(LaunchOptions {
            headless: config.headless,
            window_size: Some(window),
            args: vec![user_agent.as_os_str(), automation.as_os_str()],
            ..Default::default()
        })
        .map_err(CrawlError::browser)?;
        let tab = process.new_tab().map_err(CrawlError::browser)?;

        Ok(Self {
            _process: process,
            tab,
            kind: config.kind,
            window,
            headless: config.headless,
            closed: false,
        })
    }
}

/// Only Chromium is driven here; other kinds exist for custom `Browser` impls.
fn check_kind(kind: BrowserKind) -> Result<()> {
    match kind {
        BrowserKind::Chrome => Ok(()),
        other => Err(CrawlError::Config(format!(
            "browser kind {other} is not supported by the Chrome driver"
        ))),
    }
}

impl Browser for ChromeBrowser {
    fn kind(&self) -> BrowserKind {
        self.kind
    }

    fn navigate(&mut self, url: &str) -> Result<Navigation> {
        debug!(%url, "navigating");
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| CrawlError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Navigation {
            requested: url.to_string(),
            landed: self.tab.get_url(),
        })
    }

    fn current_url(&self) -> Result<String> {
        Ok(self.tab.get_url())
    }

    fn page_source(&self) -> Result<String> {
        self.tab.get_content().map_err(CrawlError::browser)
    }

    fn click(&mut self, selector: &str) -> Result<()> {
        let element = self
            .tab
            .find_element(selector)
            .map_err(|_| CrawlError::not_found(selector))?;
        element.click().map_err(CrawlError::browser)?;
        Ok(())
    }

    fn click_at(&mut self, x: f64, y: f64) -> Result<()> {
        self.tab
            .click_point(Point { x, y })
            .map_err(CrawlError::browser)?;
        Ok(())
    }

    fn fullscreen(&mut self) -> Result<()> {
        self.tab
            .set_bounds(Bounds::Fullscreen)
            .map_err(CrawlError::browser)?;
        Ok(())
    }

    fn minimize(&mut self) -> Result<()> {
        // headless windows cannot be minimized, restore the launch size instead
        let bounds = if !self.headless {
            Bounds::Minimized
        } else {
            Bounds::Normal {
                left: Some(0),
                top: Some(0),
                width: Some(self.window.0 as f64),
                height: Some(self.window.1 as f64),
            }
        };
        self.tab.set_bounds(bounds).map_err(CrawlError::browser)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        info!("closing browser");
        self.closed = true;
        self.tab.close(true).map_err(CrawlError::browser)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_chrome_kind_is_launchable() {
        assert!(check_kind(BrowserKind::Chrome).is_ok());
        for kind in [BrowserKind::Edge, BrowserKind::Firefox] {
            assert!(matches!(check_kind(kind), Err(CrawlError::Config(_))));
        }
    }

    #[test]
    fn firefox_config_fails_before_any_process_starts() {
        let config = BrowserConfig {
            kind: BrowserKind::Firefox,
            ..Default::default()
        };
        assert!(matches!(
            ChromeBrowser::launch(&config),
            Err(CrawlError::Config(_))
        ));
    }
}
