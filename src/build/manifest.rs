//! Build output manifest
//!
//! Local builds never talk to the control-plane. Instead the build output
//! receives a `hub.config.json` describing the enabled features and the
//! resolved deployment preset, which the platform reads at deploy time.
//! Projects with the database feature additionally get their migration
//! artifacts bundled next to it so remote data changes can be applied on
//! first deploy.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::FeatureFlags;

/// Manifest filename inside the build output directory
pub const MANIFEST_FILENAME: &str = "hub.config.json";

/// Name of the database artifact directory, both in the hub directory and in
/// the build output
pub const DATABASE_DIR: &str = "database";

/// Errors while assembling the local build output
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest could not be serialized
    #[error("Failed to serialize the build manifest: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The manifest file could not be written
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Copying the database artifacts failed for a reason other than a
    /// missing source directory
    #[error("Failed to copy database artifacts from {} to {}: {source}", .from.display(), .to.display())]
    CopyDatabase {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The `hub.config.json` document
///
/// Written once per build and immutable afterwards. The feature flags are
/// flattened into the same flat record the build notifications use, with the
/// resolved preset added alongside.
#[derive(Debug, Clone, Serialize)]
pub struct HubManifest {
    #[serde(flatten)]
    pub features: FeatureFlags,

    /// Resolved deployment preset
    pub preset: String,
}

/// Writes the manifest as pretty-printed JSON into the build output directory
///
/// Creates the output directory when missing. Returns the path of the
/// written file.
pub fn write_manifest(dist_dir: &Path, manifest: &HubManifest) -> Result<PathBuf, ManifestError> {
    let path = dist_dir.join(MANIFEST_FILENAME);
    let json = serde_json::to_string_pretty(manifest)?;

    fs::create_dir_all(dist_dir).map_err(|e| ManifestError::Write {
        path: dist_dir.to_path_buf(),
        source: e,
    })?;
    fs::write(&path, json).map_err(|e| ManifestError::Write {
        path: path.clone(),
        source: e,
    })?;

    debug!("Wrote build manifest to {}", path.display());
    Ok(path)
}

/// Copies the project's database artifacts into the build output
///
/// The source is `<root>/<hub dir>/database`. Returns `true` when artifacts
/// were bundled and `false` when the project has none, which is a normal
/// state for projects that enabled the database feature but have not created
/// migrations yet.
pub fn bundle_database(
    root_dir: &Path,
    hub_dir: &str,
    dist_dir: &Path,
) -> Result<bool, ManifestError> {
    let source = root_dir.join(hub_dir).join(DATABASE_DIR);
    let target = dist_dir.join(DATABASE_DIR);

    if !source.exists() {
        info!("Skipping database bundling - no migrations found");
        return Ok(false);
    }

    copy_dir_recursive(&source, &target).map_err(|e| ManifestError::CopyDatabase {
        from: source,
        to: target,
        source: e,
    })?;

    info!("Database migrations and queries included in build");
    Ok(true)
}

/// Recursively copies a directory tree
fn copy_dir_recursive(from: &Path, to: &Path) -> io::Result<()> {
    let entries = fs::read_dir(from)?;
    fs::create_dir_all(to)?;

    for entry in entries {
        let entry = entry?;
        let target = to.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}
