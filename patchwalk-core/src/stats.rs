// Parser for `diffstat -t` output

use patchwalk_scanner::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

pub const DIFFSTAT_HEADER: &str = "INSERTED,DELETED,MODIFIED,FILENAME";

/// Line-change counts for one patch, or a sum of patches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchStats {
    pub insertions: u64,
    pub deletions: u64,
    /// Sum of the tool's MODIFIED column.
    pub files_changed: u64,
}

impl PatchStats {
    pub fn net_lines(&self) -> i64 {
        self.insertions as i64 - self.deletions as i64
    }
}

impl AddAssign for PatchStats {
    fn add_assign(&mut self, other: Self) {
        self.insertions += other.insertions;
        self.deletions += other.deletions;
        self.files_changed += other.files_changed;
    }
}

/// Parse the CSV produced by `diffstat -t`.
///
/// The input must be the exact header line, zero or more
/// `<inserted>,<deleted>,<modified>,<filename>` rows and exactly one
/// trailing empty line (`HEADER\nrow\n\n`). The filename column is not
/// used and may contain commas.
pub fn parse_diffstat(raw: &str) -> Result<PatchStats> {
    let lines: Vec<&str> = raw.lines().collect();

    let Some((header, rest)) = lines.split_first() else {
        return Err(ScanError::ParseError("empty diffstat output".to_string()));
    };
    if *header != DIFFSTAT_HEADER {
        return Err(ScanError::ParseError(format!(
            "unexpected diffstat header '{}'",
            header
        )));
    }

    let Some((trailer, rows)) = rest.split_last() else {
        return Err(ScanError::ParseError(
            "diffstat output is missing the trailing blank line".to_string(),
        ));
    };
    if !trailer.is_empty() {
        return Err(ScanError::ParseError(format!(
            "expected a trailing blank line, found '{}'",
            trailer
        )));
    }

    let mut stats = PatchStats::default();
    for row in rows {
        stats += parse_row(row)?;
    }
    Ok(stats)
}

fn parse_row(row: &str) -> Result<PatchStats> {
    let mut columns = row.splitn(4, ',');
    let mut next_count = |name: &str| -> Result<u64> {
        let column = columns.next().ok_or_else(|| {
            ScanError::ParseError(format!("diffstat row '{}' has no {} column", row, name))
        })?;
        column.trim().parse().map_err(|_| {
            ScanError::ParseError(format!(
                "diffstat row '{}' has a non-numeric {} column '{}'",
                row, name, column
            ))
        })
    };

    let insertions = next_count("INSERTED")?;
    let deletions = next_count("DELETED")?;
    let files_changed = next_count("MODIFIED")?;
    if columns.next().is_none() {
        return Err(ScanError::ParseError(format!(
            "diffstat row '{}' has no FILENAME column",
            row
        )));
    }

    Ok(PatchStats {
        insertions,
        deletions,
        files_changed,
    })
}
