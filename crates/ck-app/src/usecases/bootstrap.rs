//! Startup sequencing.
//!
//! Later steps read values only the earlier steps establish, so the
//! sequence is strictly ordered: settings first (language and theme come
//! from there), then the localization catalog, then the lock state
//! (which may implicitly open an unprotected store), and finally the UI
//! preferences. Steps are never issued concurrently.

use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use ck_core::ports::{LocalizationPort, UiShellPort};
use ck_core::settings::{self, keys};
use ck_core::LockState;

use crate::usecases::lock::{LockController, LockError};
use crate::usecases::settings::SettingsStore;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("settings load failed: {0}")]
    Settings(#[source] anyhow::Error),

    #[error("localization load failed: {0}")]
    Localization(#[source] anyhow::Error),

    #[error("lock initialization failed: {0}")]
    Lock(#[from] LockError),

    #[error("applying ui preferences failed: {0}")]
    UiShell(#[source] anyhow::Error),
}

/// Drives the fixed startup order and surfaces the first failure.
///
/// No partial silent continuation: a failing step aborts the whole
/// sequence.
pub struct Bootstrapper {
    settings: Arc<SettingsStore>,
    localization: Arc<dyn LocalizationPort>,
    lock: Arc<LockController>,
    ui: Arc<dyn UiShellPort>,
}

impl Bootstrapper {
    pub fn new(
        settings: Arc<SettingsStore>,
        localization: Arc<dyn LocalizationPort>,
        lock: Arc<LockController>,
        ui: Arc<dyn UiShellPort>,
    ) -> Self {
        Self {
            settings,
            localization,
            lock,
            ui,
        }
    }

    /// Run the startup sequence, returning the settled lock state.
    pub async fn run(&self) -> Result<LockState, BootstrapError> {
        let span = info_span!("usecase.bootstrap.run");

        async {
            let snapshot = self
                .settings
                .load()
                .await
                .map_err(BootstrapError::Settings)?;

            let catalog = self
                .localization
                .load_catalog()
                .await
                .map_err(BootstrapError::Localization)?;
            let lang = catalog.select_lang(snapshot.get(keys::LANG)).to_string();

            let state = self.lock.initialize().await?;

            self.ui
                .apply_language(&lang)
                .await
                .map_err(BootstrapError::UiShell)?;
            let theme = snapshot.get(keys::THEME).unwrap_or(settings::DEFAULT_THEME);
            self.ui
                .apply_theme(theme)
                .await
                .map_err(BootstrapError::UiShell)?;

            info!(lang = %lang, theme = %theme, locked = state.locked, "bootstrap completed");
            Ok(state)
        }
        .instrument(span)
        .await
    }
}
