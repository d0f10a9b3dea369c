//! Build backend abstraction and the name-to-backend table.
//!
//! A backend only plans: it turns a [`BuildRequest`] into the ordered
//! invocations of its tool. [`execute`] runs a plan, or only logs it under
//! dry-run. A dry-run plan is therefore the exact list a real build submits.

pub mod buildah;
pub mod buildkit;
pub mod podman;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use jojo_common::config::ImageBuildConfig;
use jojo_common::error::{JojoError, Result};
use jojo_common::types::{ImageRef, derive_latest};

use crate::args::BuildArgs;
use crate::command::{CommandRunner, Invocation};
use crate::workdir::WorkingDir;

/// Discriminant of a build backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// `podman build`.
    Podman,
    /// `buildah bud`.
    Buildah,
    /// `buildctl build` against a buildkit daemon.
    Buildkit,
}

impl BackendKind {
    /// Every supported backend.
    pub const ALL: [Self; 3] = [Self::Podman, Self::Buildah, Self::Buildkit];

    /// Name used on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Podman => "podman",
            Self::Buildah => "buildah",
            Self::Buildkit => "buildkit",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = JojoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| JojoError::UnknownBackend {
                name: s.to_string(),
            })
    }
}

/// Flags of a build run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Log the planned invocations instead of running them.
    pub dry_run: bool,
    /// Also tag the image as `latest`.
    pub tag_latest: bool,
    /// Push the built tags to the registry.
    pub push: bool,
    /// Address of the build daemon, for backends that use one.
    pub addr: Option<String>,
}

/// Everything a backend needs to plan a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Image to produce.
    pub image: ImageRef,
    /// Build arguments, without `VERSION`.
    pub args: BuildArgs,
    /// Resolved version, passed as the last build argument.
    pub version: Option<String>,
    /// Run flags.
    pub options: BuildOptions,
}

impl BuildRequest {
    /// Derives the request for the image described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`JojoError::Config`] if the image has neither a tag nor a
    /// resolved version.
    pub fn from_config(config: &ImageBuildConfig, options: BuildOptions) -> Result<Self> {
        Ok(Self {
            image: config.image_ref()?,
            args: BuildArgs::from_config(config),
            version: config.version().map(str::to_string),
            options,
        })
    }

    /// Build arguments with `VERSION` appended when a version is known.
    #[must_use]
    pub fn build_args(&self) -> BuildArgs {
        let mut args = self.args.clone();
        if let Some(version) = &self.version {
            args.push("VERSION", version);
        }
        args
    }

    /// Full name of the extra `latest` target, when requested and not
    /// already the image tag.
    ///
    /// # Errors
    ///
    /// Returns [`JojoError::InvalidImageReference`] if the full name has no tag.
    pub fn latest_target(&self) -> Result<Option<String>> {
        if !self.options.tag_latest || self.image.is_latest() {
            return Ok(None);
        }
        derive_latest(&self.image.full_name()).map(Some)
    }
}

/// A build tool able to produce an image from the current directory.
pub trait BuildBackend {
    /// Kind of this backend.
    fn kind(&self) -> BackendKind;

    /// Plans the invocations that build, tag, and push the requested image.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be expressed with this tool.
    fn plan(&self, request: &BuildRequest) -> Result<Vec<Invocation>>;
}

/// Returns the backend serving `kind`.
#[must_use]
pub fn backend_for(kind: BackendKind) -> Box<dyn BuildBackend> {
    match kind {
        BackendKind::Podman => Box::new(podman::PodmanBackend),
        BackendKind::Buildah => Box::new(buildah::BuildahBackend),
        BackendKind::Buildkit => Box::new(buildkit::BuildkitBackend),
    }
}

/// Returns the backend registered under `name`.
///
/// # Errors
///
/// Returns [`JojoError::UnknownBackend`] if no backend has that name.
pub fn backend_named(name: &str) -> Result<Box<dyn BuildBackend>> {
    let kind: BackendKind = name.parse()?;
    tracing::debug!(backend = %kind, "selected build backend");
    Ok(backend_for(kind))
}

/// Plans `request` with `backend` and runs it inside `context_dir`.
///
/// Under dry-run the plan is logged and nothing is executed. The plan is
/// returned in both cases.
///
/// # Errors
///
/// Returns an error if planning fails, `context_dir` cannot be entered, or
/// any invocation fails. Invocations after a failing one are not run.
pub fn execute(
    backend: &dyn BuildBackend,
    request: &BuildRequest,
    context_dir: &Path,
    runner: &dyn CommandRunner,
) -> Result<Vec<Invocation>> {
    let plan = backend.plan(request)?;
    tracing::info!(
        backend = %backend.kind(),
        image = %request.image,
        steps = plan.len(),
        "build planned"
    );

    if request.options.dry_run {
        for invocation in &plan {
            tracing::info!(command = %invocation, "dry run, not executing");
        }
        return Ok(plan);
    }

    let _guard = WorkingDir::enter(context_dir)?;
    for invocation in &plan {
        tracing::info!(command = %invocation, "running");
        runner.run(invocation)?;
    }
    tracing::info!(image = %request.image, "build finished");
    Ok(plan)
}
