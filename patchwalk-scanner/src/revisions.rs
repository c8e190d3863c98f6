use crate::error::{Result, ScanError};
use crate::http::HttpClient;
use async_trait::async_trait;
use futures::StreamExt;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_REPOSITORY: &str = "https://hg.mozilla.org/mozilla-central";

/// Downloads the raw patch for a revision.
#[async_trait]
pub trait RevisionFetcher: Send + Sync {
    async fn download(&self, revision: &str, dest: &Path) -> Result<()>;
}

/// Runs a diff statistics tool on a patch file and returns its raw output.
#[async_trait]
pub trait StatTool: Send + Sync {
    async fn run(&self, patch: &Path) -> Result<String>;
}

/// Mercurial server exposing `{repository}/raw-rev/{id}`.
pub struct RevisionServer {
    http: HttpClient,
    repository: Url,
}

impl RevisionServer {
    pub fn new(http: HttpClient, repository: Url) -> Self {
        Self { http, repository }
    }

    pub fn raw_revision_url(&self, revision: &str) -> String {
        format!(
            "{}/raw-rev/{}",
            self.repository.as_str().trim_end_matches('/'),
            revision
        )
    }
}

#[async_trait]
impl RevisionFetcher for RevisionServer {
    async fn download(&self, revision: &str, dest: &Path) -> Result<()> {
        let url = self.raw_revision_url(revision);
        info!("Downloading {} to {}", url, dest.display());

        let response = self.http.get(&url).await?;

        // Stream into a sibling file and rename once complete, so an
        // interrupted download never looks like a cached patch.
        let partial = dest.with_extension("diff.part");
        let mut file = fs::File::create(&partial).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);
        fs::rename(&partial, dest).await?;

        debug!("Wrote {} bytes for {}", written, revision);
        Ok(())
    }
}

/// `diffstat -t`, which prints one CSV row per file.
pub struct Diffstat {
    program: String,
}

impl Diffstat {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl StatTool for Diffstat {
    async fn run(&self, patch: &Path) -> Result<String> {
        debug!("Running {} -t {}", self.program, patch.display());
        let output = Command::new(&self.program)
            .arg("-t")
            .arg(patch)
            .output()
            .await
            .map_err(|e| ScanError::StatTool(format!("could not run '{}': {}", self.program, e)))?;

        if !output.status.success() {
            return Err(ScanError::StatTool(format!(
                "'{}' exited with {} for {}: {}",
                self.program,
                output.status,
                patch.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| ScanError::ParseError(format!("non UTF-8 output from '{}': {}", self.program, e)))
    }
}
