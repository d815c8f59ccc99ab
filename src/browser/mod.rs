//! The browser capability the crawler drives.
//!
//! Drivers supply navigation, clicks and window control. Element lookup is
//! answered from the page source with `scraper`, so every `find_*` call
//! returns an owned [`Node`] snapshot rather than a live handle.

pub mod chrome;

pub use chrome::ChromeBrowser;

use crate::{CrawlError, Result};
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Chrome,
    Edge,
    Firefox,
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chrome => f.write_str("chrome"),
            Self::Edge => f.write_str("edge"),
            Self::Firefox => f.write_str("firefox"),
        }
    }
}

/// Where a navigation was asked to go and where the browser ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub requested: String,
    pub landed: String,
}

impl Navigation {
    pub fn redirected(&self) -> bool {
        self.requested != self.landed
    }
}

pub trait Browser {
    fn kind(&self) -> BrowserKind;

    fn navigate(&mut self, url: &str) -> Result<Navigation>;

    fn current_url(&self) -> Result<String>;

    fn page_source(&self) -> Result<String>;

    fn click(&mut self, selector: &str) -> Result<()>;

    /// Clicks a viewport coordinate, whatever is rendered there.
    fn click_at(&mut self, x: f64, y: f64) -> Result<()>;

    fn fullscreen(&mut self) -> Result<()>;

    fn minimize(&mut self) -> Result<()>;

    fn close(&mut self) -> Result<()>;

    fn find_all(&self, selector: &str) -> Result<Vec<Node>> {
        Node::document(self.page_source()?).find_all(selector)
    }

    fn find_one(&self, selector: &str) -> Result<Node> {
        Node::document(self.page_source()?).find_one(selector)
    }
}

/// Owned snapshot of an element (or a whole document).
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    html: String,
    inner_html: String,
    text: String,
    attrs: HashMap<String, String>,
    is_document: bool,
}

impl Node {
    pub fn document(html: impl Into<String>) -> Self {
        let html = html.into();
        Self {
            inner_html: html.clone(),
            html,
            text: String::new(),
            attrs: HashMap::new(),
            is_document: true,
        }
    }

    fn from_element(element: ElementRef<'_>) -> Self {
        let value = element.value();
        Self {
            html: element.html(),
            inner_html: element.inner_html(),
            text: collapse_whitespace(&element.text().collect::<String>()),
            attrs: value
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            is_document: false,
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }

    /// Visible text with whitespace runs collapsed.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Descendants matching `selector`, in document order.
    pub fn find_all(&self, selector: &str) -> Result<Vec<Node>> {
        let compiled = parse_selector(selector)?;
        let tree = if self.is_document {
            Html::parse_document(&self.html)
        } else {
            Html::parse_fragment(&self.inner_html)
        };
        Ok(tree.select(&compiled).map(Node::from_element).collect())
    }

    pub fn find_one(&self, selector: &str) -> Result<Node> {
        self.find_all(selector)?
            .into_iter()
            .next()
            .ok_or_else(|| CrawlError::not_found(selector))
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| CrawlError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
