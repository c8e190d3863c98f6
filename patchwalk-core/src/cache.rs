use std::fs;
use std::io;
use std::path::PathBuf;

/// On-disk patch cache: one `{revision}.diff` file per revision.
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    dir: PathBuf,
    enabled: bool,
}

impl ArtifactCache {
    pub fn new(dir: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            dir: dir.into(),
            enabled,
        }
    }

    /// Create the cache directory if it is missing.
    pub fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    pub fn path_for(&self, revision: &str) -> PathBuf {
        self.dir.join(format!("{}.diff", revision))
    }

    /// True when the patch must be fetched: caching is off or the file is absent.
    pub fn needs_download(&self, revision: &str) -> bool {
        !self.enabled || !self.path_for(revision).is_file()
    }
}
