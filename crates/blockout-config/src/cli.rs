//! Command-line argument parsing for the `blockout` binary.

use std::path::PathBuf;

use blockout_materials::{CHANNEL_RANGE, COLOR_SEED_RANGE};
use clap::Parser;

use crate::Config;

/// Blockout command-line arguments.
///
/// CLI values override settings loaded from `config.ron`. Numeric color
/// parameters are range-checked here, before anything is generated.
#[derive(Parser, Debug, Default)]
#[command(name = "blockout", about = "Assign deterministic blocking-material colors")]
pub struct CliArgs {
    /// Scene file (RON) listing materials and targets.
    pub scene: PathBuf,

    /// Color seed multiplier (1-1000).
    #[arg(long, value_parser = parse_color_seed)]
    pub color_seed: Option<u32>,

    /// HSV saturation (0.1-1.0).
    #[arg(long, value_parser = parse_channel)]
    pub saturation: Option<f32>,

    /// HSV value (0.1-1.0).
    #[arg(long, value_parser = parse_channel)]
    pub value: Option<f32>,

    /// Only add a material slot to the scene's active target.
    #[arg(long)]
    pub active: bool,

    /// Pin the seed stream for reproducible colors.
    #[arg(long)]
    pub rng_seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn parse_color_seed(s: &str) -> Result<u32, String> {
    let seed: u32 = s.parse().map_err(|e| format!("{e}"))?;
    if COLOR_SEED_RANGE.contains(&seed) {
        Ok(seed)
    } else {
        Err(format!(
            "must be between {} and {}",
            COLOR_SEED_RANGE.start(),
            COLOR_SEED_RANGE.end()
        ))
    }
}

fn parse_channel(s: &str) -> Result<f32, String> {
    let x: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if CHANNEL_RANGE.contains(&x) {
        Ok(x)
    } else {
        Err(format!(
            "must be between {} and {}",
            CHANNEL_RANGE.start(),
            CHANNEL_RANGE.end()
        ))
    }
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.color_seed {
            self.color.color_seed = seed;
        }
        if let Some(s) = args.saturation {
            self.color.saturation = s;
        }
        if let Some(v) = args.value {
            self.color.value = v;
        }
        if let Some(rng_seed) = args.rng_seed {
            self.session.rng_seed = Some(rng_seed);
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
