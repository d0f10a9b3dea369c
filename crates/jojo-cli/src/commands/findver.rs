//! `jojo findver` — Record the latest stable upstream version in the buildfile.

use anyhow::Context;
use clap::Args;
use jojo_common::constants::DEFAULT_FIND_LIMIT;
use jojo_version::ResolverRegistry;

use super::GlobalArgs;

/// Arguments for the `findver` command.
#[derive(Args, Debug)]
pub struct FindverArgs {
    /// Image directory name under the images path.
    pub image: String,

    /// Number of most recent versions to search for a stable one.
    #[arg(long, default_value_t = DEFAULT_FIND_LIMIT)]
    pub first_versions: u32,
}

/// Executes the `findver` command.
///
/// # Errors
///
/// Returns an error if the buildfile is invalid, resolution fails, or the
/// buildfile cannot be written back.
pub fn execute(args: &FindverArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let _ = run(args, global, &ResolverRegistry::default())?;
    Ok(())
}

/// Finds the latest stable version of `args.image` and stores it in the
/// buildfile as both image tag and tag-build version.
///
/// # Errors
///
/// Same as [`execute`].
pub fn run(
    args: &FindverArgs,
    global: &GlobalArgs,
    registry: &ResolverRegistry,
) -> anyhow::Result<Option<String>> {
    let (path, mut buildfile) = super::load_buildfile(global, &args.image)?;
    let Some(source) = buildfile.version_source()? else {
        tracing::info!(image = %args.image, "no version source configured");
        return Ok(None);
    };

    let latest = registry
        .resolver_for(&source)?
        .get_latest(args.first_versions)
        .with_context(|| format!("cannot find version of image `{}`", args.image))?;
    let Some(version) = latest else {
        tracing::warn!(image = %args.image, "no stable version found");
        return Ok(None);
    };
    tracing::info!(image = %args.image, version = %version, "found version");

    if global.dry_run {
        tracing::info!(path = %path.display(), "dry run, buildfile left unchanged");
    } else {
        buildfile.set_version(&version);
        buildfile.save(&path)?;
        tracing::info!(path = %path.display(), "buildfile updated");
    }
    Ok(Some(version))
}
