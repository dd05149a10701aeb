//! `blockout`: applies blocking materials to the targets of a scene file and
//! prints the invocation report plus the resulting scene as RON.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p blockout-cli -- scene.ron --color-seed 7` to shift hues.

mod scene;

use std::process::ExitCode;

use blockout_config::{CliArgs, Config, default_config_dir};
use blockout_materials::{AssignmentPolicy, InvocationReport, SeedTable};
use clap::Parser;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::scene::{SceneError, SceneFile};

/// Everything that can stop a run.
#[derive(Debug, Error)]
enum RunError {
    #[error("scene: {0}")]
    Scene(#[from] SceneError),

    #[error("assignment: {0}")]
    Assign(#[from] blockout_materials::AssignError),

    #[error("output: {0}")]
    Output(#[from] ron::Error),
}

/// What gets printed on success.
#[derive(Serialize)]
struct RunOutput {
    report: InvocationReport,
    scene: SceneFile,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);
    config
        .debug
        .log_dir
        .get_or_insert_with(|| config_dir.join("logs"));

    blockout_log::init_logging(Some(&config), cfg!(debug_assertions));

    match run(&args, &config) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs, config: &Config) -> Result<String, RunError> {
    let mut seeds = match config.session.rng_seed {
        Some(rng_seed) => SeedTable::with_rng_seed(rng_seed),
        None => SeedTable::new(),
    };

    let file = SceneFile::load(&args.scene)?;
    let mut scene = file.resolve(&config.naming, &mut seeds)?;
    info!(
        scene = %args.scene.display(),
        materials = scene.library.len(),
        targets = scene.targets.targets.len(),
        "scene loaded"
    );

    let policy = AssignmentPolicy::new(config.naming.clone());
    let report = if args.active {
        policy.invoke_on_active(&mut seeds, &mut scene.library, &mut scene.targets, &config.color)?
    } else {
        policy.invoke(&mut seeds, &mut scene.library, &mut scene.targets, &config.color)?
    };

    let output = RunOutput {
        report,
        scene: SceneFile::capture(&scene, &seeds),
    };
    let pretty = ron::ser::PrettyConfig::new().depth_limit(4);
    Ok(ron::ser::to_string_pretty(&output, pretty)?)
}
