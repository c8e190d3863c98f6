// Validated run configuration

use chrono::NaiveDate;
use patchwalk_scanner::revisions::DEFAULT_REPOSITORY;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_MAX_DEPTH: usize = 1;
pub const DEFAULT_CACHE_DIR: &str = "cache";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RETRIES: u32 = 2;

/// Everything a run needs, checked once at startup.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Canonical URL of the root bug.
    pub root_bug: String,
    /// Bugs whose last fix comment is strictly before this date are left out
    /// of the report.
    pub after: Option<NaiveDate>,
    /// No interactive progress output.
    pub headless: bool,
    pub disable_cache: bool,
    pub max_depth: usize,
    pub cache_dir: PathBuf,
    pub repository: Url,
    pub diffstat: String,
    pub timeout_secs: u64,
    pub retries: u32,
}

impl RunConfig {
    pub fn new(root_bug: impl Into<String>) -> Self {
        Self {
            root_bug: root_bug.into(),
            after: None,
            headless: false,
            disable_cache: false,
            max_depth: DEFAULT_MAX_DEPTH,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            repository: default_repository(),
            diffstat: "diffstat".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retries: DEFAULT_RETRIES,
        }
    }

    pub fn show_progress(&self) -> bool {
        !self.headless
    }
}

pub fn default_repository() -> Url {
    Url::parse(DEFAULT_REPOSITORY).expect("default repository URL is valid")
}

/// Parse a `YYYY-MM-DD` calendar date. The shape is checked before chrono
/// sees it, so `2019-1-5` or `2019-11-10T00:00` are rejected.
pub fn parse_after_date(value: &str) -> Result<NaiveDate, String> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
        && matches!(bytes[0], b'1' | b'2');

    if !well_formed {
        return Err(format!(
            "'{}' is not a YYYY-MM-DD date (for example: --after 2019-11-10)",
            value
        ));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("'{}' is not a valid calendar date: {}", value, e))
}
