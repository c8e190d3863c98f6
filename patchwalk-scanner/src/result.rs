use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A resolved or closed bug listed under "Depends on".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyLink {
    pub id: u64,
    pub url: String,
}

/// Everything the walker needs from one bug page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BugPage {
    pub url: String,
    pub bug_id: u64,
    pub is_meta: bool,
    /// Revision ids from bugherder comments, in comment order.
    pub revisions: Vec<String>,
    /// Timestamp of the last bugherder comment that linked a revision.
    pub last_fix_comment: Option<DateTime<Utc>>,
    pub dependencies: Vec<DependencyLink>,
}

impl BugPage {
    pub fn new(url: String, bug_id: u64) -> Self {
        Self {
            url,
            bug_id,
            is_meta: false,
            revisions: Vec::new(),
            last_fix_comment: None,
            dependencies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BugMetadata {
    pub id: u64,
    pub summary: String,
    pub status: String,
    #[serde(rename = "assigned_to")]
    pub assignee: Option<String>,
    #[serde(rename = "cf_last_resolved")]
    pub last_resolved: Option<DateTime<Utc>>,
}
