use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use ck_core::ports::SettingsPort;
use ck_core::SettingsSnapshot;

/// JSON-file settings repository.
///
/// A missing file is seeded with the default values. Loading merges any
/// missing default keys into the stored values and persists the merge,
/// so callers always observe a complete mapping. Saving returns the
/// canonical merged snapshot, which is what was actually written.
pub struct FileSettingsRepository {
    path: PathBuf,
}

impl FileSettingsRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn dir(&self) -> Option<&Path> {
        self.path.parent()
    }

    async fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(dir) = self.dir() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create settings dir failed: {}", dir.display()))?;
        }
        Ok(())
    }

    /// Write the content to a temporary file adjacent to the target and
    /// rename it into place, so the target is either the previous or the
    /// fully written new contents.
    async fn atomic_write(&self, content: &str) -> Result<()> {
        self.ensure_parent_dir().await?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("write temp settings failed: {}", tmp_path.display()))?;

        fs::rename(&tmp_path, &self.path).await.with_context(|| {
            format!(
                "rename temp settings to target failed: {} -> {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    async fn write_snapshot(&self, snapshot: &SettingsSnapshot) -> Result<()> {
        let content =
            serde_json::to_string_pretty(snapshot).context("serialize settings failed")?;
        self.atomic_write(&content).await
    }
}

#[async_trait]
impl SettingsPort for FileSettingsRepository {
    async fn load(&self) -> Result<SettingsSnapshot> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let defaults = SettingsSnapshot::defaults();
                self.write_snapshot(&defaults).await?;
                return Ok(defaults);
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("read settings failed: {}", self.path.display()))
            }
        };

        let mut snapshot: SettingsSnapshot = serde_json::from_str(&content)
            .with_context(|| format!("parse settings failed: {}", self.path.display()))?;

        let before = snapshot.clone();
        snapshot.merge_defaults(&SettingsSnapshot::defaults());
        if snapshot != before {
            self.write_snapshot(&snapshot).await?;
        }

        Ok(snapshot)
    }

    async fn save(&self, snapshot: &SettingsSnapshot) -> Result<SettingsSnapshot> {
        let mut canonical = snapshot.clone();
        canonical.merge_defaults(&SettingsSnapshot::defaults());

        self.write_snapshot(&canonical).await?;
        Ok(canonical)
    }
}
