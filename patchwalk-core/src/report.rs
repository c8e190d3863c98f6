// Report generation from aggregated patch statistics

use crate::stats::PatchStats;
use crate::walk::BugRecord;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Final totals for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub root: String,
    pub bug_count: usize,
    pub revision_count: usize,
    pub unique_revision_count: usize,
    pub total_insertions: u64,
    pub total_deletions: u64,
    pub total_files_changed: u64,
    pub net_lines: i64,
    pub skipped_meta: Vec<String>,
    pub excluded_by_date: Vec<String>,
    pub bugs: Vec<BugSummary>,
}

/// One recorded bug with its own line totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BugSummary {
    pub url: String,
    pub bug_id: u64,
    pub depth: usize,
    pub summary: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_resolved: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fix_comment: Option<DateTime<Utc>>,
    pub revisions: Vec<String>,
    pub stats: PatchStats,
}

impl BugSummary {
    pub fn from_record(record: &BugRecord, stats: PatchStats) -> Self {
        Self {
            url: record.url.clone(),
            bug_id: record.bug_id,
            depth: record.depth,
            summary: record.metadata.summary.clone(),
            status: record.metadata.status.clone(),
            assignee: record.metadata.assignee.clone(),
            last_resolved: record.metadata.last_resolved,
            last_fix_comment: record.last_fix_comment,
            revisions: record.revisions.clone(),
            stats,
        }
    }
}

pub fn generate_report(report: &Report, format: ReportFormat) -> Result<String, String> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(report)),
        ReportFormat::Json => generate_json_report(report),
    }
}

pub fn generate_json_report(report: &Report) -> Result<String, String> {
    serde_json::to_string_pretty(report).map_err(|e| format!("Failed to serialize report: {}", e))
}

pub fn generate_text_report(report: &Report) -> String {
    let mut out = String::new();

    out.push_str(RULE);
    out.push('\n');
    out.push_str("                         PATCHWALK CHANGE REPORT\n");
    out.push_str(RULE);
    out.push_str("\n\n");

    out.push_str(&format!("Root bug:     {}\n", report.root));
    out.push_str(&format!("Bugs:         {}\n", report.bug_count));
    out.push_str(&format!(
        "Revisions:    {} ({} unique)\n",
        report.revision_count, report.unique_revision_count
    ));
    if !report.skipped_meta.is_empty() {
        out.push_str(&format!("Metabugs:     {} skipped\n", report.skipped_meta.len()));
    }
    if !report.excluded_by_date.is_empty() {
        out.push_str(&format!(
            "Too old:      {} excluded\n",
            report.excluded_by_date.len()
        ));
    }
    out.push('\n');

    out.push_str(RULE);
    out.push('\n');
    out.push_str("TOTALS\n");
    out.push_str(RULE);
    out.push_str("\n\n");

    out.push_str(&format!(
        "  Insertions:     {}\n",
        format!("+{}", report.total_insertions).green()
    ));
    out.push_str(&format!(
        "  Deletions:      {}\n",
        format!("-{}", report.total_deletions).red()
    ));
    out.push_str(&format!("  Files changed:  {}\n", report.total_files_changed));
    let net = if report.net_lines > 0 {
        format!("+{}", report.net_lines).green()
    } else if report.net_lines < 0 {
        report.net_lines.to_string().red()
    } else {
        "0".normal()
    };
    out.push_str(&format!("  Net lines:      {}\n\n", net));

    if report.bugs.is_empty() {
        return out;
    }

    out.push_str(RULE);
    out.push('\n');
    out.push_str("BUGS\n");
    out.push_str(RULE);
    out.push_str("\n\n");

    for bug in &report.bugs {
        let indent = "  ".repeat(bug.depth + 1);
        out.push_str(&format!(
            "{}{} {}\n",
            indent,
            format!("Bug {}", bug.bug_id).bold(),
            bug.summary
        ));
        out.push_str(&format!("{}  {}\n", indent, bug.url.dimmed()));

        let mut details = vec![bug.status.clone()];
        if let Some(ref assignee) = bug.assignee {
            details.push(assignee.clone());
        }
        if let Some(last_fix) = bug.last_fix_comment {
            details.push(format!("fixed {}", last_fix.format("%Y-%m-%d")));
        }
        out.push_str(&format!("{}  {}\n", indent, details.join(" · ")));

        out.push_str(&format!(
            "{}  {} revisions  {} {}\n",
            indent,
            bug.revisions.len(),
            format!("+{}", bug.stats.insertions).green(),
            format!("-{}", bug.stats.deletions).red()
        ));
        out.push('\n');
    }

    out
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
