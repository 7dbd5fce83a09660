//! Deployment preset resolution
//!
//! Picks the platform runtime preset for a build. An explicit preset always
//! wins and is only normalized; otherwise the workers and websocket knobs
//! select between the three platform runtimes.

/// Default multi-asset pages runtime
pub const PRESET_PAGES: &str = "cloudflare_pages";

/// Single-worker runtime
pub const PRESET_MODULE: &str = "cloudflare_module";

/// Single-worker runtime with durable websocket support
pub const PRESET_DURABLE: &str = "cloudflare_durable";

/// Resolves the deployment preset
///
/// # Arguments
///
/// * `explicit` - A user-supplied preset override, if any
/// * `workers` - Whether the project targets the single-worker runtime
/// * `websocket` - Whether websocket support is enabled
///
/// An explicit preset is returned with hyphens replaced by underscores and is
/// never second-guessed. Without one, `workers` plus `websocket` selects the
/// durable runtime, `workers` alone the module runtime, and everything else
/// falls back to the pages runtime.
pub fn resolve_preset(explicit: Option<&str>, workers: bool, websocket: bool) -> String {
    if let Some(preset) = explicit {
        return preset.replace('-', "_");
    }

    if workers {
        if websocket {
            return PRESET_DURABLE.to_string();
        }
        return PRESET_MODULE.to_string();
    }

    PRESET_PAGES.to_string()
}
