use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

use ck_core::ports::LocalizationPort;
use ck_core::Catalog;

/// Loads the translation catalog from a JSON file.
///
/// A missing file yields the built-in default catalog, so a bare
/// installation still boots with the default language.
pub struct FileCatalogRepository {
    path: PathBuf,
}

impl FileCatalogRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl LocalizationPort for FileCatalogRepository {
    async fn load_catalog(&self) -> Result<Catalog> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Catalog::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("read catalog failed: {}", self.path.display()))
            }
        };

        serde_json::from_str(&content)
            .with_context(|| format!("parse catalog failed: {}", self.path.display()))
    }
}
