//! hublink - Hub platform integration for framework builds
//!
//! This library connects a framework build pipeline to the Hub deployment
//! platform. It serves the platform's managed AI binding over HTTP and
//! reports build lifecycle events to the Hub control-plane, falling back to
//! a static configuration manifest when no control-plane is configured.
//!
//! # Core Concepts
//!
//! - **AI Binding**: a platform-provided handle to managed AI inference,
//!   exposed through the [`AiBinding`] trait and dispatched over the
//!   `POST /_hub/ai/{command}` endpoint
//! - **Build Mode**: resolved once per build, either *remote* (platform CI
//!   with control-plane credentials) or *local* (everything else)
//! - **Manifest**: the `hub.config.json` file describing enabled features
//!   and the deployment preset, consumed by the platform at deploy time
//!
//! # Example Usage
//!
//! ```ignore
//! use hublink::build::{BuildHooks, BuildMode, NoopMigrator};
//! use hublink::HubConfig;
//! use std::sync::Arc;
//!
//! async fn run_build() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = HubConfig::default();
//!     config.validate()?;
//!
//!     let mode = BuildMode::resolve(config.dev);
//!     let mut hooks = BuildHooks::from_config(&mut config, mode, Arc::new(NoopMigrator));
//!
//!     hooks.modules_done().await?;
//!     // ... run the framework build ...
//!     hooks.compiled().await?;
//!     hooks.public_assets("/project".as_ref(), "/project/dist".as_ref()).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`ai`]: AI binding abstraction, REST dispatch client, and test double
//! - [`server`]: HTTP endpoint serving the AI commands
//! - [`build`]: build mode resolution, control-plane notifications, manifest
//! - [`cli`]: `serve` and `build` subcommands

// Public modules
pub mod ai;
pub mod build;
pub mod cli;
pub mod config;
pub mod server;
pub mod util;

// Re-export key types for convenient access
pub use ai::binding::{AiBinding, AiError, RunOutput};
pub use ai::mock::MockAiBinding;
pub use ai::rest::RestAiBinding;
pub use build::hooks::{BuildHookError, BuildHooks, NotifyState};
pub use build::mode::{BuildMode, RemoteBuildEnv};
pub use config::{ConfigError, FeatureFlags, HubConfig};
pub use server::{serve, ApiError, AppState};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_hublink() {
        assert_eq!(NAME, "hublink");
    }
}
