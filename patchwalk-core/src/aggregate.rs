use crate::cache::ArtifactCache;
use crate::report::{BugSummary, Report};
use crate::stats::{PatchStats, parse_diffstat};
use crate::walk::WalkOutcome;
use indicatif::{ProgressBar, ProgressStyle};
use patchwalk_scanner::error::{Result, ScanError};
use patchwalk_scanner::{RevisionFetcher, StatTool};
use std::collections::HashSet;
use tracing::{debug, info};

/// Turns recorded revisions into line-change totals.
pub struct Aggregator<F, T> {
    cache: ArtifactCache,
    fetcher: F,
    stat_tool: T,
    show_progress: bool,
}

impl<F: RevisionFetcher, T: StatTool> Aggregator<F, T> {
    pub fn new(cache: ArtifactCache, fetcher: F, stat_tool: T) -> Self {
        Self {
            cache,
            fetcher,
            stat_tool,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Make sure the patch for `revision` is on disk and return its stats.
    pub async fn revision_stats(&self, revision: &str) -> Result<PatchStats> {
        let path = self.cache.path_for(revision);
        if self.cache.needs_download(revision) {
            self.fetcher.download(revision, &path).await?;
        } else {
            debug!("Using cached patch {}", path.display());
        }

        let output = self.stat_tool.run(&path).await?;
        parse_diffstat(&output).map_err(|e| match e {
            ScanError::ParseError(msg) => {
                ScanError::ParseError(format!("revision {}: {}", revision, msg))
            }
            other => other,
        })
    }

    /// Sum stats over every recorded revision. Revisions shared by several
    /// bugs are counted once per bug.
    pub async fn aggregate(&self, outcome: &WalkOutcome) -> Result<Report> {
        self.cache.ensure_dir()?;

        let total = outcome.revision_count();
        info!(
            "Aggregating {} revisions from {} bugs",
            total,
            outcome.bugs.len()
        );

        let progress = self.show_progress.then(|| {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-"),
            );
            pb
        });

        let mut totals = PatchStats::default();
        let mut unique = HashSet::new();
        let mut bugs = Vec::with_capacity(outcome.bugs.len());

        for bug in &outcome.bugs {
            let mut bug_stats = PatchStats::default();
            for revision in &bug.revisions {
                if let Some(ref pb) = progress {
                    pb.set_message(revision.clone());
                }

                let stats = match self.revision_stats(revision).await {
                    Ok(stats) => stats,
                    Err(e) => {
                        if let Some(ref pb) = progress {
                            pb.abandon();
                        }
                        return Err(e);
                    }
                };
                debug!(
                    "{}: +{} -{} ({} modified)",
                    revision, stats.insertions, stats.deletions, stats.files_changed
                );

                bug_stats += stats;
                unique.insert(revision.as_str());
                if let Some(ref pb) = progress {
                    pb.inc(1);
                }
            }
            totals += bug_stats;
            bugs.push(BugSummary::from_record(bug, bug_stats));
        }

        if let Some(ref pb) = progress {
            pb.finish_and_clear();
        }

        Ok(Report {
            root: outcome.root.clone(),
            bug_count: outcome.bugs.len(),
            revision_count: total,
            unique_revision_count: unique.len(),
            total_insertions: totals.insertions,
            total_deletions: totals.deletions,
            total_files_changed: totals.files_changed,
            net_lines: totals.net_lines(),
            skipped_meta: outcome.skipped_meta.clone(),
            excluded_by_date: outcome.excluded_by_date.clone(),
            bugs,
        })
    }
}
