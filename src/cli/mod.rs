pub mod commands;
pub mod handlers;

pub use commands::{BuildArgs, CliArgs, Commands, ServeArgs};
pub use handlers::{handle_build, handle_serve};
