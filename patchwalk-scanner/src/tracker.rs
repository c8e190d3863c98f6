use crate::error::{Result, ScanError};
use crate::http::HttpClient;
use crate::result::{BugMetadata, BugPage, DependencyLink};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info};
use url::Url;

const METADATA_FIELDS: &str = "id,summary,status,assigned_to,cf_last_resolved";

/// Source of bug pages and bug metadata. The walker only talks to this
/// trait, so it can be driven by fixtures in tests.
#[async_trait]
pub trait BugSource: Send + Sync {
    /// Fetch the bug page at `url` and extract the fields the walk needs.
    async fn fetch_page(&self, url: &str) -> Result<BugPage>;

    /// Fetch tracker metadata for an already fetched page.
    async fn fetch_metadata(&self, page: &BugPage) -> Result<BugMetadata>;
}

/// Bugzilla over plain HTTP: the HTML bug page for comments, keywords and
/// dependencies, the REST API for metadata.
pub struct BugTracker {
    http: HttpClient,
    revision_prefix: String,
}

#[derive(Debug, Deserialize)]
struct BugSearchResponse {
    bugs: Vec<BugMetadata>,
}

impl BugTracker {
    /// `repository` is the revision server repository whose `/rev/<id>`
    /// links count as landed fixes.
    pub fn new(http: HttpClient, repository: &Url) -> Self {
        Self {
            http,
            revision_prefix: revision_prefix(repository),
        }
    }
}

#[async_trait]
impl BugSource for BugTracker {
    async fn fetch_page(&self, url: &str) -> Result<BugPage> {
        debug!("Fetching {}", url);
        let body = self.http.get(url).await?.text().await?;
        let page = extract_bug_page(&body, url, &self.revision_prefix)?;

        info!(
            "Completed {}: {} dependencies and {} revisions",
            url,
            page.dependencies.len(),
            page.revisions.len()
        );
        Ok(page)
    }

    async fn fetch_metadata(&self, page: &BugPage) -> Result<BugMetadata> {
        let url = metadata_url(&page.url, page.bug_id)?;
        let response: BugSearchResponse = self.http.get(url.as_str()).await?.json().await?;

        let mut bugs = response.bugs;
        if bugs.len() != 1 {
            return Err(ScanError::Consistency(format!(
                "expected exactly one bug for id {}, tracker returned {}",
                page.bug_id,
                bugs.len()
            )));
        }
        let metadata = bugs.remove(0);
        if metadata.id != page.bug_id {
            return Err(ScanError::Consistency(format!(
                "asked for bug {}, tracker returned bug {}",
                page.bug_id, metadata.id
            )));
        }
        Ok(metadata)
    }
}

/// `https://hg.example.org/repo` -> `https://hg.example.org/repo/rev/`
pub fn revision_prefix(repository: &Url) -> String {
    format!("{}/rev/", repository.as_str().trim_end_matches('/'))
}

/// Numeric bug id from either `show_bug.cgi?id=N` or a short `/N` URL.
pub fn bug_id_from_url(url: &str) -> Result<u64> {
    let parsed = Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;

    if let Some((_, id)) = parsed.query_pairs().find(|(key, _)| key == "id") {
        return id
            .parse()
            .map_err(|_| ScanError::InvalidUrl(format!("{}: bug id '{}' is not numeric", url, id)));
    }

    parsed
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .and_then(|segment| segment.parse().ok())
        .ok_or_else(|| ScanError::InvalidUrl(format!("{}: no bug id", url)))
}

/// The one URL form used as a bug's identity: `{origin}/show_bug.cgi?id={id}`.
pub fn canonical_bug_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScanError::InvalidUrl(format!("{}: not an http(s) URL", url)));
    }
    let id = bug_id_from_url(url)?;
    Ok(format!(
        "{}/show_bug.cgi?id={}",
        parsed.origin().ascii_serialization(),
        id
    ))
}

fn metadata_url(page_url: &str, bug_id: u64) -> Result<Url> {
    let base = Url::parse(page_url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", page_url, e)))?;
    let mut url = base
        .join("/rest/bug")
        .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", page_url, e)))?;
    url.query_pairs_mut()
        .append_pair("id", &bug_id.to_string())
        .append_pair("include_fields", METADATA_FIELDS);
    Ok(url)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScanError::ParseError(format!("bad selector '{}': {}", css, e)))
}

/// Extract keywords, bugherder revisions and closed dependencies from a
/// Bugzilla bug page.
pub fn extract_bug_page(html: &str, page_url: &str, revision_prefix: &str) -> Result<BugPage> {
    let bug_id = bug_id_from_url(page_url)?;
    let document = Html::parse_document(html);
    let mut page = BugPage::new(page_url.to_string(), bug_id);

    page.is_meta = document
        .select(&selector("#field-value-keywords a")?)
        .any(|a| a.text().collect::<String>().trim() == "meta");

    let link_selector = selector("a[href]")?;
    let time_selector = selector("[data-time]")?;

    let comment_texts: HashMap<&str, ElementRef> = document
        .select(&selector(".comment-text[data-comment-id]")?)
        .filter_map(|el| el.value().attr("data-comment-id").map(|id| (id, el)))
        .collect();

    for comment in document.select(&selector(r#".comment[data-tags~="bugherder"]"#)?) {
        let Some(text) = comment
            .value()
            .attr("data-id")
            .and_then(|id| comment_texts.get(id))
        else {
            continue;
        };

        let revisions: Vec<String> = text
            .select(&link_selector)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| resolve_url(page_url, href))
            .filter_map(|url| revision_id(&url, revision_prefix))
            .collect();
        if revisions.is_empty() {
            continue;
        }

        for revision in revisions {
            if !page.revisions.contains(&revision) {
                page.revisions.push(revision);
            }
        }
        // A fix comment without a timestamp keeps the one seen before it
        if let Some(raw) = comment
            .select(&time_selector)
            .find_map(|el| el.value().attr("data-time"))
        {
            page.last_fix_comment = Some(parse_epoch(raw)?);
        }
    }

    let dependency_selector = selector("#field-value-dependson a.bz_bug_link.bz_closed[href]")?;
    for link in document.select(&dependency_selector) {
        let Some(absolute) = link
            .value()
            .attr("href")
            .and_then(|href| resolve_url(page_url, href))
        else {
            continue;
        };
        let url = canonical_bug_url(&absolute)?;
        let id = bug_id_from_url(&url)?;
        if page.dependencies.iter().all(|d| d.id != id) {
            page.dependencies.push(DependencyLink { id, url });
        }
    }

    Ok(page)
}

fn parse_epoch(raw: &str) -> Result<DateTime<Utc>> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
        .ok_or_else(|| ScanError::ParseError(format!("invalid comment timestamp '{}'", raw)))
}

fn resolve_url(base: &str, href: &str) -> Option<String> {
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with('#')
    {
        return None;
    }

    let base_url = Url::parse(base).ok()?;
    let mut url = base_url.join(href).ok()?;
    url.set_fragment(None);

    Some(url.to_string())
}

/// Trailing path segment of a `{prefix}{id}` revision link.
fn revision_id(url: &str, revision_prefix: &str) -> Option<String> {
    let rest = url.strip_prefix(revision_prefix)?;
    let path = rest.split(['?', '#']).next()?.trim_end_matches('/');
    path.rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}
