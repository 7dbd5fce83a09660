//! Build lifecycle hooks
//!
//! One [`BuildHooks`] value drives everything hublink does around a build.
//! The build mode, resolved once up front, decides what each phase does:
//!
//! - **Remote** builds notify the control-plane at three lifecycle points
//!   (before the build, on build failure, and once the output is compiled)
//!   and apply pending remote database changes after a successful build.
//! - **Local** builds skip the notifications entirely and instead write the
//!   `hub.config.json` manifest, plus bundled database artifacts, once the
//!   public assets are finalized.
//!
//! Phase failures come back as typed [`BuildHookError`] values; the hooks
//! never terminate the process themselves, the caller decides what a failed
//! phase means for the build.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::build::control_plane::{
    BeforePayload, BuildErrorInfo, ControlPlaneClient, DonePayload, ErrorPayload, NotifyError,
};
use crate::build::manifest::{bundle_database, write_manifest, HubManifest, ManifestError};
use crate::build::migrate::{DatabaseMigrator, MigrateError};
use crate::build::mode::BuildMode;
use crate::build::preset::resolve_preset;
use crate::config::{FeatureFlags, HubConfig};

/// How long a superseded deployment waits before failing, giving the
/// control-plane time to cancel it upstream
pub const BINDINGS_CHANGED_GRACE: Duration = Duration::from_secs(2);

/// Errors from the build lifecycle hooks
#[derive(Debug, Error)]
pub enum BuildHookError {
    /// The "before" notification failed; the build must not proceed
    #[error("Failed to run the build:before hook on the control-plane: {0}")]
    BeforeFailed(NotifyError),

    /// The control-plane reconfigured the project's bindings and replaced
    /// this deployment with a fresh one
    #[error("Project bindings changed, this deployment is superseded")]
    BindingsChanged,

    /// The "done" notification failed
    #[error("Failed to run the build:done hook on the control-plane: {0}")]
    DoneFailed(NotifyError),

    /// Applying pending remote database migrations failed
    #[error("Failed to apply remote database migrations: {0}")]
    MigrationsFailed(MigrateError),

    /// Applying pending remote database queries failed
    #[error("Failed to apply remote database queries: {0}")]
    QueriesFailed(MigrateError),

    /// Writing the local build output failed
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Progress of the control-plane notification sequence
///
/// A build moves `Pending -> BeforeSent` and then to either `DoneSent` or
/// `ErrorSent`. Local builds stay `Pending` for their whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyState {
    /// Nothing delivered yet
    Pending,

    /// The "before" notification was accepted
    BeforeSent,

    /// The "error" notification was delivered
    ErrorSent,

    /// The "done" notification was accepted
    DoneSent,
}

/// Remote-mode collaborators, absent for local builds
struct RemoteNotifier {
    client: ControlPlaneClient,
    pages_url: Option<String>,
}

/// Lifecycle hook driver for one build
///
/// Constructed once per build from the resolved [`BuildMode`]; the phase
/// methods are called in pipeline order and each one decides, based on the
/// mode, whether it has anything to do.
pub struct BuildHooks {
    features: FeatureFlags,
    hub_dir: String,
    preset: Option<String>,
    workers: bool,
    websocket: bool,
    remote: Option<RemoteNotifier>,
    migrator: Arc<dyn DatabaseMigrator>,
    grace: Duration,
    state: NotifyState,
}

impl BuildHooks {
    /// Creates the hooks for one build
    ///
    /// In remote mode this force-disables the project's remote bindings
    /// override: platform CI builds always use the bindings the platform
    /// injects, whatever the local configuration says.
    pub fn from_config(
        config: &mut HubConfig,
        mode: BuildMode,
        migrator: Arc<dyn DatabaseMigrator>,
    ) -> Self {
        let remote = match mode {
            BuildMode::Remote(env) => {
                if config.remote {
                    debug!("Platform CI build, disabling the remote bindings override");
                }
                config.remote = false;

                Some(RemoteNotifier {
                    client: ControlPlaneClient::new(config.url.clone(), &env),
                    pages_url: env.pages_url,
                })
            }
            BuildMode::Local => None,
        };

        Self {
            features: config.features,
            hub_dir: config.hub_dir.clone(),
            preset: config.preset.clone(),
            workers: config.workers,
            websocket: config.websocket,
            remote,
            migrator,
            grace: BINDINGS_CHANGED_GRACE,
            state: NotifyState::Pending,
        }
    }

    /// Replaces the bindings-changed grace delay (used by tests)
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Current progress of the notification sequence
    pub fn state(&self) -> NotifyState {
        self.state
    }

    /// Whether this build reports to the control-plane
    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Modules-done phase: announce the build to the control-plane
    ///
    /// Sends the "before" notification with the public deployment URL and
    /// the feature flags. When the control-plane answers that the project's
    /// bindings changed, the deployment it belongs to is already superseded:
    /// after the grace delay the hook fails with
    /// [`BuildHookError::BindingsChanged`] so the build never reaches "done".
    pub async fn modules_done(&mut self) -> Result<(), BuildHookError> {
        let Some(remote) = &self.remote else {
            debug!("Local build, skipping the build:before notification");
            return Ok(());
        };

        let payload = BeforePayload {
            pages_url: remote.pages_url.clone(),
            features: self.features,
        };

        let response = match remote.client.notify_before(&payload).await {
            Ok(response) => response,
            Err(e) => {
                log_notify_failure("before", &e);
                return Err(BuildHookError::BeforeFailed(e));
            }
        };

        self.state = NotifyState::BeforeSent;
        debug!("build:before notification accepted");

        if response.bindings_changed {
            info!(
                "The project bindings changed and the deployment settings were updated on the platform."
            );
            info!(
                "This deployment will be cancelled and a fresh one picks up the new bindings."
            );

            // Give the control-plane time to cancel the in-flight deployment
            tokio::time::sleep(self.grace).await;

            return Err(BuildHookError::BindingsChanged);
        }

        Ok(())
    }

    /// Build-error phase: report the failure to the control-plane
    ///
    /// Best-effort. A failed send must not replace the build error it
    /// reports, so it is swallowed and only logged at debug severity.
    pub async fn build_error(&mut self, error: &BuildErrorInfo) {
        let Some(remote) = &self.remote else {
            return;
        };

        let payload = ErrorPayload {
            pages_url: remote.pages_url.clone(),
            error: error.clone(),
        };

        match remote.client.notify_error(&payload).await {
            Ok(()) => {
                self.state = NotifyState::ErrorSent;
                debug!("build:error notification sent");
            }
            Err(e) => {
                debug!("Failed to send the build:error notification: {}", e);
            }
        }
    }

    /// Compiled phase: confirm the build and apply remote data changes
    ///
    /// Sends the "done" notification, then, for projects with the database
    /// feature, applies pending remote migrations followed by pending remote
    /// queries. Queries are never attempted after failed migrations.
    pub async fn compiled(&mut self) -> Result<(), BuildHookError> {
        let Some(remote) = &self.remote else {
            debug!("Local build, skipping the build:done notification");
            return Ok(());
        };

        let payload = DonePayload {
            pages_url: remote.pages_url.clone(),
        };

        if let Err(e) = remote.client.notify_done(&payload).await {
            log_notify_failure("done", &e);
            return Err(BuildHookError::DoneFailed(e));
        }

        self.state = NotifyState::DoneSent;
        debug!("build:done notification accepted");

        if self.features.database {
            debug!("Applying pending remote database migrations");
            if let Err(e) = self.migrator.apply_migrations().await {
                error!("Failed to apply remote database migrations: {}", e);
                return Err(BuildHookError::MigrationsFailed(e));
            }

            debug!("Applying pending remote database queries");
            if let Err(e) = self.migrator.apply_queries().await {
                error!("Failed to apply remote database queries: {}", e);
                return Err(BuildHookError::QueriesFailed(e));
            }
        }

        Ok(())
    }

    /// Public-assets phase: emit the local build manifest
    ///
    /// Writes `hub.config.json` with the feature flags and the resolved
    /// preset into the build output, and bundles the project's database
    /// artifacts when the database feature is enabled. Remote builds skip
    /// this phase, the control-plane already has the configuration.
    pub async fn public_assets(&mut self, root: &Path, dist: &Path) -> Result<(), BuildHookError> {
        if self.remote.is_some() {
            debug!("Remote build, skipping the local build manifest");
            return Ok(());
        }

        match self.emit_local_output(root, dist) {
            Ok(()) => Ok(()),
            Err(e) => {
                error!("{}", e);
                Err(e.into())
            }
        }
    }

    fn emit_local_output(&self, root: &Path, dist: &Path) -> Result<(), ManifestError> {
        let manifest = HubManifest {
            features: self.features,
            preset: resolve_preset(self.preset.as_deref(), self.workers, self.websocket),
        };

        write_manifest(dist, &manifest)?;

        if self.features.database {
            bundle_database(root, &self.hub_dir, dist)?;
        }

        Ok(())
    }
}

/// Logs a failed notification, preferring the control-plane's own message
fn log_notify_failure(phase: &str, error: &NotifyError) {
    match error.server_message() {
        Some(message) => error!("{}", message),
        None => error!(
            "Failed to run the build:{} hook on the control-plane: {}",
            phase, error
        ),
    }
}
