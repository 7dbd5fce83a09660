//! Local build output integration tests
//!
//! Drives the build hooks in local mode against temporary project and output
//! directories, verifying the `hub.config.json` manifest and the bundled
//! database artifacts.

use hublink::build::{BuildHooks, BuildMode, NoopMigrator};
use hublink::config::{FeatureFlags, HubConfig};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn local_config() -> HubConfig {
    HubConfig {
        features: FeatureFlags {
            ai: true,
            database: true,
            ..FeatureFlags::default()
        },
        url: "https://admin.hublink.dev".to_string(),
        project_secret_key: None,
        hub_dir: ".hub".to_string(),
        remote: false,
        workers: false,
        websocket: false,
        preset: None,
        dev: false,
        ai_endpoint: None,
        ai_token: None,
    }
}

fn local_hooks(config: &mut HubConfig) -> BuildHooks {
    BuildHooks::from_config(config, BuildMode::Local, Arc::new(NoopMigrator))
}

/// Creates `<root>/<hub dir>/database` with a migration and a query file
fn seed_database_dir(root: &Path, hub_dir: &str) {
    let database = root.join(hub_dir).join("database");
    fs::create_dir_all(database.join("migrations")).unwrap();
    fs::create_dir_all(database.join("queries")).unwrap();
    fs::write(
        database.join("migrations/0001_init.sql"),
        "CREATE TABLE users (id INTEGER PRIMARY KEY);\n",
    )
    .unwrap();
    fs::write(
        database.join("queries/seed.sql"),
        "INSERT INTO users (id) VALUES (1);\n",
    )
    .unwrap();
}

fn read_manifest(dist: &Path) -> Value {
    let contents = fs::read_to_string(dist.join("hub.config.json")).unwrap();
    serde_json::from_str(&contents).unwrap()
}

#[tokio::test]
async fn test_local_build_writes_manifest_and_bundles_database() {
    let root = TempDir::new().unwrap();
    seed_database_dir(root.path(), ".hub");
    let dist = root.path().join("dist");

    let mut config = local_config();
    let mut hooks = local_hooks(&mut config);

    hooks.modules_done().await.unwrap();
    hooks.compiled().await.unwrap();
    hooks.public_assets(root.path(), &dist).await.unwrap();

    let manifest = read_manifest(&dist);
    assert_eq!(manifest["ai"], true);
    assert_eq!(manifest["database"], true);
    assert_eq!(manifest["kv"], false);
    assert_eq!(manifest["preset"], "cloudflare_pages");

    let migration = dist.join("database/migrations/0001_init.sql");
    let contents = fs::read_to_string(&migration).unwrap();
    assert!(contents.contains("CREATE TABLE users"));
    assert!(dist.join("database/queries/seed.sql").exists());
}

#[tokio::test]
async fn test_missing_database_dir_is_skipped() {
    let root = TempDir::new().unwrap();
    let dist = root.path().join("dist");

    // Database feature on, but the project has no migrations yet
    let mut config = local_config();
    let mut hooks = local_hooks(&mut config);

    hooks.public_assets(root.path(), &dist).await.unwrap();

    assert!(dist.join("hub.config.json").exists());
    assert!(!dist.join("database").exists());
}

#[tokio::test]
async fn test_database_flag_off_skips_bundling() {
    let root = TempDir::new().unwrap();
    seed_database_dir(root.path(), ".hub");
    let dist = root.path().join("dist");

    let mut config = local_config();
    config.features.database = false;
    let mut hooks = local_hooks(&mut config);

    hooks.public_assets(root.path(), &dist).await.unwrap();

    let manifest = read_manifest(&dist);
    assert_eq!(manifest["database"], false);
    assert!(!dist.join("database").exists());
}

#[tokio::test]
async fn test_custom_hub_dir_is_bundled() {
    let root = TempDir::new().unwrap();
    seed_database_dir(root.path(), "custom-hub");
    let dist = root.path().join("dist");

    let mut config = local_config();
    config.hub_dir = "custom-hub".to_string();
    let mut hooks = local_hooks(&mut config);

    hooks.public_assets(root.path(), &dist).await.unwrap();

    assert!(dist.join("database/migrations/0001_init.sql").exists());
}

#[tokio::test]
async fn test_manifest_preset_follows_the_runtime_knobs() {
    let root = TempDir::new().unwrap();
    let dist = root.path().join("dist");

    let mut config = local_config();
    config.features.database = false;
    config.workers = true;
    let mut hooks = local_hooks(&mut config);

    hooks.public_assets(root.path(), &dist).await.unwrap();
    assert_eq!(read_manifest(&dist)["preset"], "cloudflare_module");
}

#[tokio::test]
async fn test_manifest_honors_an_explicit_preset() {
    let root = TempDir::new().unwrap();
    let dist = root.path().join("dist");

    let mut config = local_config();
    config.features.database = false;
    config.preset = Some("cloudflare-durable".to_string());
    let mut hooks = local_hooks(&mut config);

    hooks.public_assets(root.path(), &dist).await.unwrap();
    assert_eq!(read_manifest(&dist)["preset"], "cloudflare_durable");
}

#[tokio::test]
async fn test_manifest_is_written_into_an_existing_dist() {
    let root = TempDir::new().unwrap();
    let dist = root.path().join("dist");
    fs::create_dir_all(&dist).unwrap();
    fs::write(dist.join("index.html"), "<html></html>").unwrap();

    let mut config = local_config();
    config.features.database = false;
    let mut hooks = local_hooks(&mut config);

    hooks.public_assets(root.path(), &dist).await.unwrap();

    // Existing build output is left alone
    assert!(dist.join("index.html").exists());
    assert!(dist.join("hub.config.json").exists());
}
