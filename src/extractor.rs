use crate::browser::{Browser, Node};
use crate::models::{FilterTag, JobDetail, PartialPosting};
use crate::Result;
use tracing::{debug, warn};
use url::Url;

const JOB_CARD: &str = ".cardOutline";
const FILTER_CONTAINER: &str = ".yosegi-FilterPill-dropdownPillContainer";
const FILTER_OPTION: &str = ".yosegi-FilterPill-dropdownListItemLink";

/// Per-field lookups on a single job card. Each one fails on its own.
pub trait JobFieldExtractor {
    fn extract_job_id(&self, card: &Node) -> Option<String>;

    fn extract_title(&self, card: &Node) -> Option<String>;

    fn extract_link(&self, card: &Node, base: Option<&Url>) -> Option<String>;

    fn extract_company(&self, card: &Node) -> Option<String>;

    fn extract_card(&self, card: &Node, base: Option<&Url>) -> PartialPosting {
        let posting = PartialPosting {
            job_unique_id: self.extract_job_id(card),
            title: self.extract_title(card),
            link: self.extract_link(card, base),
            company: self.extract_company(card),
        };
        if posting.title.is_none() {
            debug!("card without title");
        }
        if posting.link.is_none() {
            debug!("card without link");
        }
        posting
    }
}

/// Reads the job cards of an Indeed results page.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageExtractor;

impl PageExtractor {
    /// One record per rendered card, in page order. The iterator is consumed
    /// as it goes; call again to re-read the page.
    pub fn extract<B: Browser + ?Sized>(
        &self,
        browser: &B,
    ) -> Result<impl Iterator<Item = PartialPosting> + '_> {
        let base = browser.current_url().ok().and_then(|u| Url::parse(&u).ok());
        let cards = browser.find_all(JOB_CARD)?;
        debug!(cards = cards.len(), "job cards on page");
        Ok(cards
            .into_iter()
            .map(move |card| self.extract_card(&card, base.as_ref())))
    }
}

impl JobFieldExtractor for PageExtractor {
    fn extract_job_id(&self, card: &Node) -> Option<String> {
        let anchor = card.find_one(".jobTitle a").ok()?;
        anchor
            .attr("id")
            .or_else(|| anchor.attr("data-jk"))
            .map(str::to_string)
            .filter(|id| !id.is_empty())
    }

    fn extract_title(&self, card: &Node) -> Option<String> {
        non_empty(card.find_one(".jcs-JobTitle").ok()?.text())
    }

    fn extract_link(&self, card: &Node, base: Option<&Url>) -> Option<String> {
        let anchor = card.find_one("a").ok()?;
        let href = anchor.attr("href")?;
        match base {
            Some(base) => base.join(href).ok().map(String::from),
            None => Some(href.to_string()),
        }
    }

    fn extract_company(&self, card: &Node) -> Option<String> {
        non_empty(card.find_one(r#"[data-testid="company-name"]"#).ok()?.text())
    }
}

/// Opens each filter dropdown on a results page and records its options.
/// Anything that goes wrong yields an empty list.
pub fn discover_filters<B: Browser + ?Sized>(browser: &mut B) -> Vec<FilterTag> {
    match try_discover_filters(browser) {
        Ok(tags) => {
            debug!(filters = tags.len(), "filter options found");
            tags
        }
        Err(e) => {
            warn!(error = %e, "could not read filter options");
            Vec::new()
        }
    }
}

fn try_discover_filters<B: Browser + ?Sized>(browser: &mut B) -> Result<Vec<FilterTag>> {
    let containers = browser.find_all(FILTER_CONTAINER)?;
    let mut tags = Vec::new();

    for (idx, container) in containers.iter().enumerate() {
        let Ok(button) = container.find_one("button") else {
            continue;
        };
        let Some(id) = button.attr("id").filter(|id| id.starts_with("filter")) else {
            continue;
        };
        if let Err(e) = browser.click(&format!("#{id}")) {
            debug!(%id, error = %e, "filter dropdown did not open");
            continue;
        }

        // options only render once the dropdown is open
        let opened = browser.find_all(FILTER_CONTAINER)?;
        let options = opened
            .get(idx)
            .map(|c| c.find_all(FILTER_OPTION))
            .transpose()?
            .unwrap_or_default()
            .iter()
            .map(|o| o.text().to_string())
            .collect();

        tags.push(FilterTag {
            name: button.text().to_string(),
            options,
        });
    }

    Ok(tags)
}

/// Reads the wider detail record from an open posting page.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetailExtractor;

impl DetailExtractor {
    pub fn extract<B: Browser + ?Sized>(
        &self,
        browser: &B,
        job_unique_id: &str,
        captured_at: &str,
    ) -> Result<JobDetail> {
        let page = Node::document(browser.page_source()?);

        let mut detail = JobDetail::new(job_unique_id, captured_at);
        detail.title = first_text(&page, "h1.jobsearch-JobInfoHeader-title");
        detail.company = first_text(&page, r#"[data-testid="inlineHeader-companyName"]"#);
        detail.location = first_text(&page, r#"[data-testid="inlineHeader-companyLocation"]"#);
        detail.salary = first_text(&page, "#salaryInfoAndJobType span");
        detail.job_types = all_texts(&page, r#"[aria-label="Job type"] li"#);
        detail.benefits = all_texts(&page, "#benefits li");
        Ok(detail)
    }
}

fn first_text(page: &Node, selector: &str) -> Option<String> {
    non_empty(page.find_one(selector).ok()?.text())
}

fn all_texts(page: &Node, selector: &str) -> Vec<String> {
    page.find_all(selector)
        .unwrap_or_default()
        .iter()
        .filter_map(|n| non_empty(n.text()))
        .collect()
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
