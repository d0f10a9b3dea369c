//! `jojo listver` — List the most recent upstream versions of an image.

use anyhow::Context;
use clap::Args;
use jojo_common::constants::DEFAULT_LIST_LIMIT;
use jojo_common::types::ResolvedVersions;
use jojo_version::ResolverRegistry;

use super::GlobalArgs;

/// Arguments for the `listver` command.
#[derive(Args, Debug)]
pub struct ListverArgs {
    /// Image directory name under the images path.
    pub image: String,

    /// Number of most recent versions to fetch.
    #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
    pub last_versions: u32,
}

/// Executes the `listver` command.
///
/// # Errors
///
/// Returns an error if the buildfile is invalid or resolution fails.
pub fn execute(args: &ListverArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let _ = run(args, global, &ResolverRegistry::default())?;
    Ok(())
}

/// Resolves and logs the versions of `args.image` using `registry`.
///
/// # Errors
///
/// Same as [`execute`].
pub fn run(
    args: &ListverArgs,
    global: &GlobalArgs,
    registry: &ResolverRegistry,
) -> anyhow::Result<ResolvedVersions> {
    let (_, buildfile) = super::load_buildfile(global, &args.image)?;
    let Some(source) = buildfile.version_source()? else {
        tracing::info!(image = %args.image, "no version source configured");
        return Ok(ResolvedVersions::empty());
    };

    let versions = registry
        .resolver_for(&source)?
        .get_all(args.last_versions)
        .with_context(|| format!("cannot list versions of image `{}`", args.image))?;

    for version in &versions.stable {
        tracing::info!("stable: {version}");
    }
    for version in &versions.unstable {
        tracing::info!("unstable: {version}");
    }
    Ok(versions)
}
