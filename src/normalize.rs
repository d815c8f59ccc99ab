use crate::{CrawlError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid markdown link pattern"));

/// Turns description HTML into single-line Markdown with link targets hidden.
#[derive(Debug, Clone)]
pub struct MarkdownNormalizer {
    placeholder: String,
}

impl Default for MarkdownNormalizer {
    fn default() -> Self {
        Self::new("<url removed>")
    }
}

impl MarkdownNormalizer {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
        }
    }

    pub fn to_text(&self, html: &str) -> Result<String> {
        let markdown = htmd::convert(html).map_err(|e| CrawlError::Normalize(e.to_string()))?;
        debug!(len = markdown.len(), "converted description to markdown");
        Ok(self.strip_links(&markdown))
    }

    /// Keeps each link label, swaps its target for the placeholder and drops
    /// line breaks.
    pub fn strip_links(&self, markdown: &str) -> String {
        MARKDOWN_LINK
            .replace_all(markdown, |caps: &regex::Captures<'_>| {
                format!("[{}]({})", &caps[1], self.placeholder)
            })
            .replace(['\n', '\r'], "")
    }
}
