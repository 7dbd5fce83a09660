use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Hub platform integration for framework builds
#[derive(Parser, Debug)]
#[command(
    name = "hublink",
    about = "Hub platform integration: AI binding endpoint and build status reporting",
    version,
    author,
    long_about = "hublink connects a framework build to the Hub deployment platform. It serves \
                  the platform's AI binding over HTTP and reports build lifecycle events to the \
                  Hub control-plane during platform CI builds, falling back to a static \
                  hub.config.json manifest everywhere else."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Increase verbosity (can be used multiple times)"
    )]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Serve the AI binding endpoint",
        long_about = "Starts the HTTP endpoint exposing the project's AI binding at \
                      POST /_hub/ai/{command}.\n\n\
                      Examples:\n  \
                      hublink serve\n  \
                      hublink serve --bind 0.0.0.0:8787"
    )]
    Serve(ServeArgs),

    #[command(
        about = "Run a framework build with Hub lifecycle reporting",
        long_about = "Wraps a framework build command with the Hub build lifecycle. During \
                      platform CI builds the control-plane is notified before and after the \
                      build; everywhere else the build output receives a hub.config.json \
                      manifest.\n\n\
                      Examples:\n  \
                      hublink build -- npm run build\n  \
                      hublink build --dist .output/public -- pnpm build"
    )]
    Build(BuildArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    #[arg(
        short = 'b',
        long,
        value_name = "ADDR",
        default_value = "127.0.0.1:8787",
        help = "Address to bind the endpoint to"
    )]
    pub bind: SocketAddr,
}

#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    #[arg(
        long,
        value_name = "DIR",
        help = "Project root directory (defaults to the current directory)"
    )]
    pub root: Option<PathBuf>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Build output directory (defaults to <root>/dist)"
    )]
    pub dist: Option<PathBuf>,

    #[arg(
        value_name = "COMMAND",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        help = "The framework build command to run"
    )]
    pub command: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        // Verify that CLI structure is valid
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_serve_args() {
        let args = CliArgs::parse_from(["hublink", "serve"]);
        match args.command {
            Commands::Serve(serve_args) => {
                assert_eq!(serve_args.bind, "127.0.0.1:8787".parse().unwrap());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_serve_with_bind() {
        let args = CliArgs::parse_from(["hublink", "serve", "--bind", "0.0.0.0:9000"]);
        match args.command {
            Commands::Serve(serve_args) => {
                assert_eq!(serve_args.bind, "0.0.0.0:9000".parse().unwrap());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_build_with_trailing_command() {
        let args = CliArgs::parse_from(["hublink", "build", "--", "npm", "run", "build"]);
        match args.command {
            Commands::Build(build_args) => {
                assert_eq!(build_args.command, vec!["npm", "run", "build"]);
                assert!(build_args.root.is_none());
                assert!(build_args.dist.is_none());
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_build_command_keeps_hyphen_flags() {
        let args = CliArgs::parse_from(["hublink", "build", "--", "cargo", "build", "--release"]);
        match args.command {
            Commands::Build(build_args) => {
                assert_eq!(build_args.command, vec!["cargo", "build", "--release"]);
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_build_with_dirs() {
        let args = CliArgs::parse_from([
            "hublink",
            "build",
            "--root",
            "/tmp/project",
            "--dist",
            ".output/public",
            "--",
            "pnpm",
            "build",
        ]);
        match args.command {
            Commands::Build(build_args) => {
                assert_eq!(build_args.root, Some(PathBuf::from("/tmp/project")));
                assert_eq!(build_args.dist, Some(PathBuf::from(".output/public")));
                assert_eq!(build_args.command, vec!["pnpm", "build"]);
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_build_requires_a_command() {
        assert!(CliArgs::try_parse_from(["hublink", "build"]).is_err());
    }

    #[test]
    fn test_global_verbose_flag() {
        let args = CliArgs::parse_from(["hublink", "-v", "serve"]);
        assert!(args.verbose);
        assert!(!args.quiet);
    }

    #[test]
    fn test_global_quiet_flag() {
        let args = CliArgs::parse_from(["hublink", "-q", "serve"]);
        assert!(!args.verbose);
        assert!(args.quiet);
    }

    #[test]
    fn test_log_level_flag() {
        let args = CliArgs::parse_from(["hublink", "--log-level", "debug", "serve"]);
        assert_eq!(args.log_level, Some("debug".to_string()));
    }
}
