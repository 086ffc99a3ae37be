use anyhow::Result;

/// The active UI context the bootstrapper applies preferences to.
#[async_trait::async_trait]
pub trait UiShellPort: Send + Sync {
    async fn apply_language(&self, lang: &str) -> Result<()>;
    async fn apply_theme(&self, theme: &str) -> Result<()>;
}
