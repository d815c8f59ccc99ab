use crate::{CrawlError, Result};
use std::fmt;
use std::str::FromStr;
use tracing::info;

const SITE_HOST: &str = "www.indeed";
const DEFAULT_RADIUS: u32 = 50;
/// Results per page; the site addresses pages by result offset.
const PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Country {
    Usa,
    Canada,
}

impl Country {
    pub fn region_code(&self) -> &'static str {
        match self {
            Self::Usa => "com",
            Self::Canada => "ca",
        }
    }
}

impl FromStr for Country {
    type Err = CrawlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USA" => Ok(Self::Usa),
            "CANADA" => Ok(Self::Canada),
            other => Err(CrawlError::InvalidQuery(format!(
                "unsupported country `{other}`, use USA or CANADA"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    Date,
    Relevance,
}

impl FromStr for SortBy {
    type Err = CrawlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "relevance" => Ok(Self::Relevance),
            other => Err(CrawlError::InvalidQuery(format!(
                "invalid sort `{other}`, use date or relevance"
            ))),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date => f.write_str("date"),
            Self::Relevance => f.write_str("relevance"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub keywords: Option<String>,
    pub country: Option<Country>,
    /// City, province, state, or "Remote".
    pub location: Option<String>,
    pub sort_by: SortBy,
    /// In the country's default unit. Ignored for remote searches.
    pub radius: Option<u32>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            keywords: None,
            country: None,
            location: None,
            sort_by: SortBy::Date,
            radius: Some(DEFAULT_RADIUS),
        }
    }
}

impl SearchParams {
    pub fn new(keywords: impl Into<String>, country: Country) -> Self {
        Self {
            keywords: Some(keywords.into()),
            country: Some(country),
            ..Default::default()
        }
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn radius(mut self, radius: Option<u32>) -> Self {
        self.radius = radius;
        self
    }

    pub fn is_remote(&self) -> bool {
        self.location
            .as_deref()
            .is_some_and(|l| l.trim().eq_ignore_ascii_case("remote"))
    }
}

/// Builds the canonical search URL. `page_number` is 1-based.
pub fn build_query_url(params: &SearchParams, page_number: Option<u32>) -> Result<String> {
    let keywords = params
        .keywords
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| CrawlError::InvalidQuery("keywords are required".into()))?;
    let country = params
        .country
        .ok_or_else(|| CrawlError::InvalidQuery("country is required".into()))?;

    let mut url = format!(
        "https://{}.{}/jobs?q={}",
        SITE_HOST,
        country.region_code(),
        encode_spaces(keywords)
    );

    if let Some(location) = &params.location {
        url.push_str(&format!("&l={}", encode_spaces(location.trim())));
    }

    // remote or location-less searches have no geographic scope
    if let (Some(radius), Some(_)) = (params.radius, &params.location) {
        if !params.is_remote() {
            url.push_str(&format!("&radius={radius}"));
        }
    }

    if params.sort_by == SortBy::Date {
        url.push_str("&sort=date");
    }

    if let Some(page) = page_number {
        url.push_str(&format!("&start={}", page_offset(page)?));
    }

    info!(%url, "built search url");
    Ok(url)
}

fn page_offset(page_number: u32) -> Result<u32> {
    match page_number {
        0 => Err(CrawlError::InvalidQuery("page numbers start at 1".into())),
        page => (page - 1).checked_mul(PAGE_SIZE).ok_or_else(|| {
            CrawlError::InvalidQuery(format!("page {page} is past the last addressable result"))
        }),
    }
}

fn encode_spaces(s: &str) -> String {
    s.replace(' ', "%20")
}
