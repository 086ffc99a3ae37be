use async_trait::async_trait;

use crate::settings::SettingsSnapshot;

#[async_trait]
pub trait SettingsPort: Send + Sync {
    async fn load(&self) -> anyhow::Result<SettingsSnapshot>;

    /// Persist the snapshot and return the canonical post-save values.
    ///
    /// The sink may normalize or reject fields, so callers must not
    /// assume the echo equals what was sent.
    async fn save(&self, snapshot: &SettingsSnapshot) -> anyhow::Result<SettingsSnapshot>;
}
