//! `jojo build` — Build, tag, and push an image.

use clap::Args;
use jojo_build::backend::{self, BuildOptions, BuildRequest};
use jojo_build::{CommandRunner, Invocation, SystemRunner};
use jojo_common::config::{self, ImageBuildConfig};

use super::GlobalArgs;

/// Arguments for the `build` command.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Image directory name under the images path.
    pub image: String,

    /// Also tag the image as `latest`.
    #[arg(long)]
    pub tag_latest: bool,

    /// Push the built tags to the registry.
    #[arg(long)]
    pub push: bool,

    /// Build daemon address (buildkit only).
    #[arg(long)]
    pub addr: Option<String>,
}

/// Executes the `build` command.
///
/// # Errors
///
/// Returns an error if the buildfile is invalid, the backend is unknown, or
/// any build step fails.
pub fn execute(args: &BuildArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let _ = run(args, global, &SystemRunner)?;
    Ok(())
}

/// Builds `args.image` with the configured backend, running steps through `runner`.
///
/// # Errors
///
/// Same as [`execute`].
pub fn run(
    args: &BuildArgs,
    global: &GlobalArgs,
    runner: &dyn CommandRunner,
) -> anyhow::Result<Vec<Invocation>> {
    let image_dir = config::image_dir(&global.path, &args.image)?;
    let buildfile = ImageBuildConfig::load(&config::buildfile_path(&global.path, &args.image)?)?;
    let backend = backend::backend_named(&global.builder)?;

    let options = BuildOptions {
        dry_run: global.dry_run,
        tag_latest: args.tag_latest,
        push: args.push,
        addr: args.addr.clone(),
    };
    let request = BuildRequest::from_config(&buildfile, options)?;
    tracing::info!(image = %request.image, backend = %backend.kind(), "building image");
    Ok(backend::execute(backend.as_ref(), &request, &image_dir, runner)?)
}
