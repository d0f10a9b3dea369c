//! CLI command definitions and dispatch.

pub mod build;
pub mod findver;
pub mod listver;
pub mod new;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use jojo_common::config::{self, ImageBuildConfig};
use jojo_common::constants::{
    BUILDER_ENV, DEFAULT_BUILDER, DEFAULT_LOG_LEVEL, DRY_RUN_ENV, IMAGES_PATH_ENV, LOG_LEVEL_ENV,
};

/// jojo: upstream version tracking and image builds.
#[derive(Parser, Debug)]
#[command(name = "jojo", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Flags shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Directory holding one subdirectory per image.
    #[arg(short, long, global = true, env = IMAGES_PATH_ENV, default_value = ".")]
    pub path: PathBuf,

    /// Report what would change without writing files or running builds.
    #[arg(
        long,
        global = true,
        env = DRY_RUN_ENV,
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub dry_run: bool,

    /// Build backend: podman, buildah or buildkit.
    #[arg(long, global = true, env = BUILDER_ENV, default_value = DEFAULT_BUILDER)]
    pub builder: String,

    /// Log level, overridden by `RUST_LOG` when set.
    #[arg(
        long,
        global = true,
        env = LOG_LEVEL_ENV,
        default_value = DEFAULT_LOG_LEVEL,
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an image directory with a starter buildfile.
    New(new::NewArgs),
    /// List the most recent upstream versions of an image.
    Listver(listver::ListverArgs),
    /// Record the latest stable upstream version in the buildfile.
    Findver(findver::FindverArgs),
    /// Build, tag, and push an image.
    Build(build::BuildArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::New(args) => new::execute(&args, &cli.global),
        Command::Listver(args) => listver::execute(&args, &cli.global),
        Command::Findver(args) => findver::execute(&args, &cli.global),
        Command::Build(args) => build::execute(&args, &cli.global),
    }
}

/// Loads the buildfile of `image`, returning its path alongside.
fn load_buildfile(global: &GlobalArgs, image: &str) -> anyhow::Result<(PathBuf, ImageBuildConfig)> {
    let path = config::buildfile_path(&global.path, image)?;
    let buildfile = ImageBuildConfig::load(&path)
        .with_context(|| format!("cannot load buildfile of image `{image}`"))?;
    Ok((path, buildfile))
}
