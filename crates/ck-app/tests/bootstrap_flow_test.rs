//! Startup sequence over real files.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ck_app::{Bootstrapper, LockController, SettingsStore};
use ck_core::ports::UiShellPort;
use ck_core::Catalog;
use ck_infra::store::{EncryptedFileStore, KdfParams};
use ck_infra::{FileCatalogRepository, FileSettingsRepository};
use tempfile::TempDir;
use tokio::fs;

#[derive(Default)]
struct RecordingShell {
    lang: Mutex<Option<String>>,
    theme: Mutex<Option<String>>,
}

#[async_trait]
impl UiShellPort for RecordingShell {
    async fn apply_language(&self, lang: &str) -> anyhow::Result<()> {
        *self.lang.lock().unwrap() = Some(lang.to_string());
        Ok(())
    }

    async fn apply_theme(&self, theme: &str) -> anyhow::Result<()> {
        *self.theme.lock().unwrap() = Some(theme.to_string());
        Ok(())
    }
}

fn test_kdf() -> KdfParams {
    KdfParams {
        mem_kib: 32,
        iters: 1,
        parallelism: 1,
    }
}

struct Harness {
    settings: Arc<SettingsStore>,
    bootstrapper: Bootstrapper,
    shell: Arc<RecordingShell>,
}

async fn harness(dir: &TempDir) -> Harness {
    let settings = Arc::new(SettingsStore::new(Arc::new(FileSettingsRepository::new(
        dir.path().join("settings.json"),
    ))));
    let store = Arc::new(
        EncryptedFileStore::open_with_params(dir.path().join("store.json"), test_kdf())
            .await
            .expect("open store"),
    );
    let shell = Arc::new(RecordingShell::default());
    let bootstrapper = Bootstrapper::new(
        settings.clone(),
        Arc::new(FileCatalogRepository::new(dir.path().join("catalog.json"))),
        Arc::new(LockController::new(store)),
        shell.clone(),
    );
    Harness {
        settings,
        bootstrapper,
        shell,
    }
}

#[tokio::test]
async fn first_boot_applies_defaults_and_opens_store() {
    let dir = TempDir::new().unwrap();
    let harness = harness(&dir).await;

    let state = harness.bootstrapper.run().await.unwrap();

    assert!(!state.locked, "fresh store must come up open");
    assert!(state.first_run);
    assert_eq!(harness.shell.lang.lock().unwrap().as_deref(), Some("en"));
    assert_eq!(harness.shell.theme.lock().unwrap().as_deref(), Some("light"));
}

#[tokio::test]
async fn saved_preferences_survive_restart() {
    let dir = TempDir::new().unwrap();

    {
        let harness = harness(&dir).await;
        harness.bootstrapper.run().await.unwrap();

        harness.settings.set("theme", "dark").await;
        assert!(harness.settings.modified().await);
        harness.settings.save().await.unwrap();
        assert!(!harness.settings.modified().await);
    }

    let harness = harness(&dir).await;
    harness.bootstrapper.run().await.unwrap();

    assert_eq!(harness.shell.theme.lock().unwrap().as_deref(), Some("dark"));
}

#[tokio::test]
async fn configured_language_is_selected_when_catalog_carries_it() {
    let dir = TempDir::new().unwrap();

    let mut catalog = Catalog::new("en");
    catalog.insert("en", "greeting", "Hello");
    catalog.insert("es", "greeting", "Hola");
    fs::write(
        dir.path().join("catalog.json"),
        serde_json::to_string(&catalog).unwrap(),
    )
    .await
    .unwrap();

    {
        let harness = harness(&dir).await;
        harness.bootstrapper.run().await.unwrap();
        harness.settings.set("lang", "es").await;
        harness.settings.save().await.unwrap();
    }

    let harness = harness(&dir).await;
    harness.bootstrapper.run().await.unwrap();

    assert_eq!(harness.shell.lang.lock().unwrap().as_deref(), Some("es"));
}
