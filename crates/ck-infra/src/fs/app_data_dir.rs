use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs;

/// Resolve and create the per-user data directory for `app_key`.
pub async fn app_data_dir(app_key: &str) -> Result<PathBuf> {
    let base = dirs::config_dir().context("no user config directory available")?;
    let dir = base.join(app_key);

    fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("create app data dir failed: {}", dir.display()))?;

    Ok(dir)
}
