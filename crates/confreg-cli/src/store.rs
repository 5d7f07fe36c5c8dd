use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use confreg_registry::{ConferenceRegistry, RecordingPayout, RegistrySnapshot};
use tempfile::NamedTempFile;

/// A registry persisted as a JSON snapshot on disk.
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Restore the registry. Refunds are recorded by the returned payout.
    pub fn load(&self) -> anyhow::Result<(ConferenceRegistry, Arc<RecordingPayout>)> {
        if !self.exists() {
            bail!(
                "no registry at {}; run `confreg deploy` first",
                self.path.display()
            );
        }
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        let snapshot = RegistrySnapshot::from_json(&text)
            .with_context(|| format!("parsing {}", self.path.display()))?;

        let payout = Arc::new(RecordingPayout::new());
        let registry = ConferenceRegistry::restore(snapshot, payout.clone())?;
        Ok((registry, payout))
    }

    /// Write the registry snapshot, replacing the file atomically.
    pub fn save(&self, registry: &ConferenceRegistry) -> anyhow::Result<()> {
        let json = registry.snapshot()?.to_json_pretty()?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("creating temporary file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .with_context(|| format!("writing {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), "registry saved");
        Ok(())
    }
}
