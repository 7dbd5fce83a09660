//! Build mode resolution
//!
//! A build runs in exactly one of two modes, decided once at startup and
//! never re-derived mid-build:
//!
//! - **Remote**: the build runs inside the platform CI with deployment
//!   credentials present, and build progress is reported to the control-plane.
//! - **Local**: everything else. No notifications are sent; the build output
//!   gets a `hub.config.json` manifest instead.

use std::env;
use tracing::debug;

/// Set by the platform CI for builds it runs
pub const ENV_PLATFORM_CI: &str = "CF_PAGES";

/// Public URL of the deployment being built, set by the platform CI
pub const ENV_PAGES_URL: &str = "CF_PAGES_URL";

/// Deploy token used to authenticate against the control-plane
pub const ENV_DEPLOY_TOKEN: &str = "HUBLINK_PROJECT_DEPLOY_TOKEN";

/// Project key identifying the project on the control-plane
pub const ENV_PROJECT_KEY: &str = "HUBLINK_PROJECT_KEY";

/// Environment name of the deployment (e.g., production, preview)
pub const ENV_ENVIRONMENT: &str = "HUBLINK_ENV";

/// Deployment credentials captured from the platform CI environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteBuildEnv {
    pub deploy_token: String,
    pub project_key: String,
    pub environment: String,
    pub pages_url: Option<String>,
}

impl RemoteBuildEnv {
    /// Captures the deployment credentials from the environment
    ///
    /// Returns `None` unless the platform CI marker and all three credential
    /// variables are present and non-empty. `CF_PAGES_URL` stays optional.
    pub fn capture() -> Option<Self> {
        env_present(ENV_PLATFORM_CI)?;

        Some(Self {
            deploy_token: env_present(ENV_DEPLOY_TOKEN)?,
            project_key: env_present(ENV_PROJECT_KEY)?,
            environment: env_present(ENV_ENVIRONMENT)?,
            pages_url: env_present(ENV_PAGES_URL),
        })
    }
}

/// The two build modes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildMode {
    /// Platform CI build, reporting progress to the control-plane
    Remote(RemoteBuildEnv),

    /// Local build, emitting a manifest into the build output
    Local,
}

impl BuildMode {
    /// Resolves the build mode from the environment, once
    ///
    /// Development builds are always local, whatever the environment says.
    pub fn resolve(dev: bool) -> Self {
        if dev {
            debug!("Development build, using local build mode");
            return BuildMode::Local;
        }

        match RemoteBuildEnv::capture() {
            Some(remote) => {
                debug!(
                    "Platform CI detected, using remote build mode: project={} env={}",
                    remote.project_key, remote.environment
                );
                BuildMode::Remote(remote)
            }
            None => {
                debug!("No platform CI credentials, using local build mode");
                BuildMode::Local
            }
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, BuildMode::Remote(_))
    }
}

/// Returns the variable's value if it is set and non-empty
fn env_present(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
