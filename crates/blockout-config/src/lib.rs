//! Configuration for Blockout.
//!
//! Default color parameters, naming rules, session and logging settings that
//! persist to disk as RON. Supports CLI overrides via clap.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, SessionConfig, default_config_dir};
pub use error::ConfigError;
