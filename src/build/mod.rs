//! Build lifecycle integration
//!
//! Everything hublink does around a framework build: resolving which mode
//! the build runs in, reporting progress to the control-plane during
//! platform CI builds, applying remote database changes, and emitting the
//! `hub.config.json` manifest for local builds.

pub mod control_plane;
pub mod hooks;
pub mod manifest;
pub mod migrate;
pub mod mode;
pub mod preset;

// Re-export commonly used types
pub use control_plane::{BuildErrorInfo, ControlPlaneClient, NotifyError};
pub use hooks::{BuildHookError, BuildHooks, NotifyState};
pub use manifest::{HubManifest, ManifestError, MANIFEST_FILENAME};
pub use migrate::{DatabaseMigrator, MigrateError, MockMigrator, NoopMigrator};
pub use mode::{BuildMode, RemoteBuildEnv};
pub use preset::resolve_preset;
