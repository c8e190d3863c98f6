use chrono::{DateTime, NaiveDate, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use indicatif::{ProgressBar, ProgressStyle};
use patchwalk_scanner::error::{Result, ScanError};
use patchwalk_scanner::{BugMetadata, BugPage, BugSource};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};

/// Options for configuring a dependency walk
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Deepest level visited; the root is depth 0.
    pub max_depth: usize,
    pub after: Option<NaiveDate>,
    pub show_progress: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_depth: 1,
            after: None,
            show_progress: false,
        }
    }
}

/// A bug whose revisions count toward the report.
#[derive(Debug, Clone, Serialize)]
pub struct BugRecord {
    pub url: String,
    pub bug_id: u64,
    pub depth: usize,
    pub revisions: Vec<String>,
    pub last_fix_comment: Option<DateTime<Utc>>,
    pub metadata: BugMetadata,
}

/// Everything a walk produced. Records are in pre-order: a bug always comes
/// before any of its dependencies.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub root: String,
    pub visited: HashSet<String>,
    pub bugs: Vec<BugRecord>,
    pub skipped_meta: Vec<String>,
    pub excluded_by_date: Vec<String>,
}

impl WalkOutcome {
    /// `(bug url, revisions)` in record order.
    pub fn revisions_by_bug(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.bugs
            .iter()
            .map(|bug| (bug.url.as_str(), bug.revisions.as_slice()))
    }

    pub fn revision_count(&self) -> usize {
        self.bugs.iter().map(|bug| bug.revisions.len()).sum()
    }
}

/// Depth-first walk over a bug's resolved dependencies.
pub struct Walker<S> {
    source: S,
    options: WalkOptions,
    progress: Option<ProgressBar>,
}

impl<S: BugSource> Walker<S> {
    pub fn new(source: S, options: WalkOptions) -> Self {
        let progress = options.show_progress.then(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.cyan} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });

        Self {
            source,
            options,
            progress,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Walk from `root_url` and return what was recorded.
    pub async fn walk(&self, root_url: &str) -> Result<WalkOutcome> {
        info!(
            "Walking dependencies of {} (max depth {})",
            root_url, self.options.max_depth
        );

        let mut outcome = WalkOutcome {
            root: root_url.to_string(),
            ..WalkOutcome::default()
        };
        let result = self.visit(root_url.to_string(), 0, &mut outcome).await;

        if let Some(ref pb) = self.progress {
            pb.finish_and_clear();
        }
        result?;

        info!(
            "Walk complete: {} bugs visited, {} recorded, {} revisions",
            outcome.visited.len(),
            outcome.bugs.len(),
            outcome.revision_count()
        );
        Ok(outcome)
    }

    /// Visit one bug and, recursively, its dependencies.
    pub fn visit<'a>(
        &'a self,
        url: String,
        depth: usize,
        outcome: &'a mut WalkOutcome,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            if depth > self.options.max_depth {
                return Ok(());
            }
            if !outcome.visited.insert(url.clone()) {
                info!("Already seen {}", url);
                return Ok(());
            }

            if let Some(ref pb) = self.progress {
                pb.set_message(format!(
                    "Visiting {} (depth {}, {} bugs so far)",
                    url,
                    depth,
                    outcome.visited.len()
                ));
            }

            let page = self.source.fetch_page(&url).await?;

            if depth > 0 && page.is_meta {
                info!("Skipping metabug {}", url);
                outcome.skipped_meta.push(url);
                return Ok(());
            }

            check_consistency(&page)?;

            let metadata = self.source.fetch_metadata(&page).await?;

            if self.include_revisions(&page) {
                outcome.bugs.push(BugRecord {
                    url: url.clone(),
                    bug_id: page.bug_id,
                    depth,
                    revisions: page.revisions.clone(),
                    last_fix_comment: page.last_fix_comment,
                    metadata,
                });
            } else {
                info!(
                    "Excluding {}: last fix comment is before {}",
                    url,
                    self.options
                        .after
                        .map(|d| d.to_string())
                        .unwrap_or_default()
                );
                outcome.excluded_by_date.push(url.clone());
            }

            debug!(
                "{} has {} resolved dependencies",
                url,
                page.dependencies.len()
            );
            for dependency in page.dependencies {
                self.visit(dependency.url, depth + 1, outcome).await?;
            }
            Ok(())
        }
        .boxed()
    }

    fn include_revisions(&self, page: &BugPage) -> bool {
        match (self.options.after, page.last_fix_comment) {
            (Some(after), Some(last_fix)) => last_fix.date_naive() >= after,
            _ => true,
        }
    }
}

/// Revisions and the last fix comment timestamp come from the same comments,
/// so one without the other means the page was misread.
pub fn check_consistency(page: &BugPage) -> Result<()> {
    match (page.revisions.is_empty(), page.last_fix_comment.is_some()) {
        (false, false) => Err(ScanError::Consistency(format!(
            "{} has {} revisions but no fix comment timestamp",
            page.url,
            page.revisions.len()
        ))),
        (true, true) => Err(ScanError::Consistency(format!(
            "{} has a fix comment timestamp but no revisions",
            page.url
        ))),
        _ => Ok(()),
    }
}
