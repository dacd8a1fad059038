//! Destinations for generated artifacts.
//!
//! [`FileSink`] only touches a file when its content hash changed, so
//! regenerating from an unchanged graph leaves the output tree untouched.

use crate::pipeline::Artifact;
use astbridge_core::{BootstrapError, BootstrapResult};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What happened to one artifact handed to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

/// Receives complete artifacts.
pub trait ArtifactSink {
    fn write(&mut self, artifact: &Artifact) -> BootstrapResult<WriteOutcome>;
}

/// Counts of written and unchanged artifacts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: usize,
    pub unchanged: usize,
}

/// Hand every artifact to `sink`, stopping at the first failure.
pub fn write_all(
    sink: &mut dyn ArtifactSink,
    artifacts: &[Artifact],
) -> BootstrapResult<WriteSummary> {
    let mut summary = WriteSummary::default();
    for artifact in artifacts {
        match sink.write(artifact)? {
            WriteOutcome::Written => summary.written += 1,
            WriteOutcome::Unchanged => summary.unchanged += 1,
        }
    }
    Ok(summary)
}

/// Compute SHA256 checksum of data.
pub fn compute_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// Writes artifacts below an output directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    root: PathBuf,
}

impl FileSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_current(path: &Path, contents: &str) -> BootstrapResult<bool> {
        match fs::read(path) {
            Ok(existing) => Ok(compute_sha256(&existing) == compute_sha256(contents.as_bytes())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(BootstrapError::io(path, err)),
        }
    }
}

impl ArtifactSink for FileSink {
    fn write(&mut self, artifact: &Artifact) -> BootstrapResult<WriteOutcome> {
        let path = self.root.join(&artifact.relative_path);
        if Self::is_current(&path, &artifact.contents)? {
            debug!(file = %path.display(), "Artifact unchanged");
            return Ok(WriteOutcome::Unchanged);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BootstrapError::io(parent, e))?;
        }
        info!("Writing '{}'", path.display());
        fs::write(&path, &artifact.contents).map_err(|e| BootstrapError::io(&path, e))?;
        Ok(WriteOutcome::Written)
    }
}

/// Keeps artifacts in memory, keyed by relative path.
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: Vec<Artifact>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn get(&self, relative_path: impl AsRef<Path>) -> Option<&Artifact> {
        let relative_path = relative_path.as_ref();
        self.artifacts
            .iter()
            .find(|a| a.relative_path == relative_path)
    }
}

impl ArtifactSink for MemorySink {
    fn write(&mut self, artifact: &Artifact) -> BootstrapResult<WriteOutcome> {
        match self
            .artifacts
            .iter_mut()
            .find(|a| a.relative_path == artifact.relative_path)
        {
            Some(existing) if existing.contents == artifact.contents => {
                Ok(WriteOutcome::Unchanged)
            }
            Some(existing) => {
                *existing = artifact.clone();
                Ok(WriteOutcome::Written)
            }
            None => {
                self.artifacts.push(artifact.clone());
                Ok(WriteOutcome::Written)
            }
        }
    }
}
