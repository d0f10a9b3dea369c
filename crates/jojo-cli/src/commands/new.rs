//! `jojo new` — Create a new image project.

use std::io::ErrorKind;
use std::str::FromStr;

use clap::Args;
use jojo_common::config::{ImageBuildConfig, ImageTagFrom, TagBuild, VersionFromConfig};
use jojo_common::constants::BUILDFILE_NAME;
use jojo_common::error::{JojoError, Result};
use jojo_common::types::{ImageRef, SourceKind};

use super::GlobalArgs;

/// Arguments for the `new` command.
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Image directory name to create under the images path.
    pub name: String,

    /// Image to build, as `registry/name:tag`.
    #[arg(long, default_value = "registry/name:tag")]
    pub image: String,

    /// Base image, as `registry/name:tag`.
    #[arg(long)]
    pub from_image: Option<String>,

    /// Builder-stage image, as `registry/name:tag`.
    #[arg(long)]
    pub from_image_builder: Option<String>,

    /// Kind of version source to prepare: index, release, alpine or github.
    #[arg(long, value_parser = SourceKind::from_str)]
    pub version_from: Option<SourceKind>,
}

/// Executes the `new` command.
///
/// # Errors
///
/// Returns an error if an image reference is malformed or the project
/// cannot be written.
pub fn execute(args: &NewArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let _ = run(args, global)?;
    Ok(())
}

/// Creates the image directory and its starter buildfile, returning the
/// buildfile content. Nothing is written under dry-run.
///
/// # Errors
///
/// Same as [`execute`].
pub fn run(args: &NewArgs, global: &GlobalArgs) -> anyhow::Result<ImageBuildConfig> {
    check_name(&args.name)?;
    let buildfile = scaffold(args)?;
    tracing::debug!("\n{}", buildfile.to_yaml()?);

    let image_dir = global.path.join(&args.name);
    let path = image_dir.join(BUILDFILE_NAME);
    if global.dry_run {
        tracing::info!(path = %path.display(), "dry run, image project not written");
        return Ok(buildfile);
    }

    match std::fs::create_dir(&image_dir) {
        Ok(()) => tracing::info!(dir = %image_dir.display(), "created image directory"),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            tracing::info!(dir = %image_dir.display(), "image directory already exists");
        }
        Err(e) => return Err(JojoError::io(&image_dir, e).into()),
    }
    if path.is_file() {
        tracing::warn!(path = %path.display(), "replacing existing buildfile");
    }
    buildfile.save(&path)?;
    tracing::info!(path = %path.display(), "buildfile written");
    Ok(buildfile)
}

fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(JojoError::Config {
            message: format!("`{name}` is not a valid image directory name"),
        });
    }
    Ok(())
}

fn scaffold(args: &NewArgs) -> Result<ImageBuildConfig> {
    let image = ImageRef::parse(&args.image)?;

    Ok(ImageBuildConfig {
        image: ImageTagFrom {
            registry: image.registry,
            name: image.name,
            tag: Some(image.tag),
            tag_build: Some(TagBuild {
                version_from: args.version_from.map(|kind| VersionFromConfig {
                    kind: kind.as_str().to_string(),
                    ..VersionFromConfig::default()
                }),
                ..TagBuild::default()
            }),
            build_args: None,
        },
        from_image: args.from_image.as_deref().map(ImageRef::parse).transpose()?,
        from_image_builder: args
            .from_image_builder
            .as_deref()
            .map(ImageRef::parse)
            .transpose()?,
    })
}
