//! Command handlers for the hublink CLI
//!
//! Each handler owns one subcommand end to end and returns a process exit
//! code; only `main` actually exits. Build lifecycle failures are logged
//! where they happen, so the handlers translate them into exit codes
//! without re-reporting.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::ai::rest::RestAiBinding;
use crate::build::control_plane::BuildErrorInfo;
use crate::build::hooks::BuildHooks;
use crate::build::migrate::NoopMigrator;
use crate::build::mode::BuildMode;
use crate::cli::commands::{BuildArgs, ServeArgs};
use crate::config::HubConfig;
use crate::server::auth::AuthPolicy;
use crate::server::{serve, AppState};

/// Serves the AI binding endpoint until shutdown
pub async fn handle_serve(args: &ServeArgs) -> i32 {
    let config = HubConfig::default();

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return 1;
    }

    let auth = match AuthPolicy::from_config(&config) {
        Ok(auth) => auth,
        Err(e) => {
            error!("Configuration error: {}", e);
            return 1;
        }
    };

    let ai = match RestAiBinding::from_config(&config) {
        Ok(binding) => Arc::new(binding),
        Err(e) => {
            error!("Configuration error: {}", e);
            return 1;
        }
    };

    if !config.features.ai {
        warn!("The ai feature is disabled; requests will be rejected until HUBLINK_AI=true");
    }

    let state = AppState {
        ai,
        features: config.features,
        auth,
    };

    match serve(args.bind, state).await {
        Ok(()) => 0,
        Err(e) => {
            error!("Server error: {}", e);
            1
        }
    }
}

/// Runs a framework build wrapped in the Hub build lifecycle
pub async fn handle_build(args: &BuildArgs, quiet: bool) -> i32 {
    if args.command.is_empty() {
        error!("No build command given");
        return 1;
    }

    let mut config = HubConfig::default();

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return 1;
    }

    let root = args
        .root
        .clone()
        .unwrap_or_else(|| env::current_dir().expect("Failed to get current directory"));

    if !root.exists() {
        error!("Project root does not exist: {}", root.display());
        return 1;
    }

    if !root.is_dir() {
        error!("Project root is not a directory: {}", root.display());
        return 1;
    }

    let root: PathBuf = match root.canonicalize() {
        Ok(path) => path,
        Err(e) => {
            error!("Failed to canonicalize project root: {}", e);
            return 1;
        }
    };
    debug!("Project root: {}", root.display());

    let dist = resolve_dist(&root, args.dist.clone());
    debug!("Build output directory: {}", dist.display());

    let mode = BuildMode::resolve(config.dev);
    info!(
        "Running the build in {} mode",
        if mode.is_remote() { "remote" } else { "local" }
    );

    let mut hooks = BuildHooks::from_config(&mut config, mode, Arc::new(NoopMigrator));

    if let Err(e) = hooks.modules_done().await {
        debug!("Build aborted: {}", e);
        return 1;
    }

    let status = match run_build_command(&args.command, &root).await {
        Ok(status) => status,
        Err(e) => {
            error!("Failed to start the build command: {}", e);
            hooks
                .build_error(&BuildErrorInfo {
                    message: format!("Failed to start the build command: {}", e),
                    name: "BuildSpawnError".to_string(),
                    stack: None,
                })
                .await;
            return 1;
        }
    };

    if !status.success() {
        let code = status.code().unwrap_or(1);
        error!("Build command failed with exit code {}", code);
        hooks
            .build_error(&BuildErrorInfo {
                message: format!("Build command exited with status {}", code),
                name: "BuildCommandError".to_string(),
                stack: None,
            })
            .await;
        return code;
    }

    if let Err(e) = hooks.compiled().await {
        debug!("Build aborted: {}", e);
        return 1;
    }

    if let Err(e) = hooks.public_assets(&root, &dist).await {
        debug!("Build aborted: {}", e);
        return 1;
    }

    if !quiet {
        println!("Build complete: {}", dist.display());
    }

    0
}

/// Resolves the build output directory against the project root
fn resolve_dist(root: &Path, dist: Option<PathBuf>) -> PathBuf {
    match dist {
        Some(dir) if dir.is_absolute() => dir,
        Some(dir) => root.join(dir),
        None => root.join("dist"),
    }
}

/// Runs the wrapped build command with inherited stdio
async fn run_build_command(command: &[String], root: &Path) -> io::Result<ExitStatus> {
    info!("Running build command: {}", command.join(" "));

    Command::new(&command[0])
        .args(&command[1..])
        .current_dir(root)
        .status()
        .await
}
