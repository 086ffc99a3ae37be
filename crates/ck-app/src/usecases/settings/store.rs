//! Settings store.
//!
//! Holds two copies of the settings mapping: `persisted`, the last state
//! known to be saved, and `working`, the live editable copy. The dirty
//! flag is derived by structural comparison, never by reference identity.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tracing::{info, info_span, Instrument};

use ck_core::ports::SettingsPort;
use ck_core::SettingsSnapshot;

#[derive(Default)]
struct Copies {
    persisted: SettingsSnapshot,
    working: SettingsSnapshot,
}

/// Change-tracked settings against a persisted baseline.
///
/// `persisted` is replaced wholesale only by an initial load or by the
/// canonical snapshot a successful save returns. The sink may normalize
/// or reject fields, so the store never assumes `working == persisted`
/// after a save without re-syncing from the authoritative response.
pub struct SettingsStore {
    port: Arc<dyn SettingsPort>,
    copies: Mutex<Copies>,
}

impl SettingsStore {
    pub fn new(port: Arc<dyn SettingsPort>) -> Self {
        Self {
            port,
            copies: Mutex::new(Copies::default()),
        }
    }

    /// Fetch current settings and reset both copies to them.
    pub async fn load(&self) -> Result<SettingsSnapshot> {
        let span = info_span!("usecase.settings.load");

        async {
            let snapshot = self.port.load().await?;

            let mut copies = self.copies.lock().await;
            copies.persisted = snapshot.clone();
            copies.working = snapshot.clone();

            info!(entries = snapshot.len(), "settings loaded");
            Ok(snapshot)
        }
        .instrument(span)
        .await
    }

    /// Persist the working copy.
    ///
    /// On success `persisted` becomes the sink's canonical echo, not the
    /// working copy that was sent. On failure both copies are left
    /// untouched, so `modified` keeps signaling the pending edits.
    pub async fn save(&self) -> Result<SettingsSnapshot> {
        let span = info_span!("usecase.settings.save");

        async {
            let mut copies = self.copies.lock().await;

            let canonical = self.port.save(&copies.working).await?;
            copies.persisted = canonical.clone();

            info!(entries = canonical.len(), "settings saved");
            Ok(canonical)
        }
        .instrument(span)
        .await
    }

    /// Whether the working copy differs from the persisted baseline.
    pub async fn modified(&self) -> bool {
        let copies = self.copies.lock().await;
        copies.persisted != copies.working
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.copies
            .lock()
            .await
            .working
            .get(key)
            .map(str::to_string)
    }

    pub async fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.copies.lock().await.working.set(key, value);
    }

    pub async fn remove(&self, key: &str) {
        self.copies.lock().await.working.remove(key);
    }

    /// Copy of the current working state.
    pub async fn snapshot(&self) -> SettingsSnapshot {
        self.copies.lock().await.working.clone()
    }
}
