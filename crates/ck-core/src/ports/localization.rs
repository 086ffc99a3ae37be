use async_trait::async_trait;

use crate::localization::Catalog;

#[async_trait]
pub trait LocalizationPort: Send + Sync {
    async fn load_catalog(&self) -> anyhow::Result<Catalog>;
}
