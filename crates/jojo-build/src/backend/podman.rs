//! `podman` backend, and the build/tag/push layout it shares with `buildah`.

use jojo_common::error::Result;

use super::{BackendKind, BuildBackend, BuildRequest};
use crate::command::Invocation;

/// Builds with `podman build`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PodmanBackend;

impl BuildBackend for PodmanBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Podman
    }

    fn plan(&self, request: &BuildRequest) -> Result<Vec<Invocation>> {
        tag_and_push_plan("podman", "build", request)
    }
}

/// Plans a build with repeated `--build-arg`, then the optional `latest` tag
/// and the pushes, each as its own invocation of `program`.
pub(super) fn tag_and_push_plan(
    program: &str,
    build_command: &str,
    request: &BuildRequest,
) -> Result<Vec<Invocation>> {
    let full_name = request.image.full_name();
    let latest = request.latest_target()?;

    let build = request
        .build_args()
        .assignments()
        .fold(
            Invocation::new(program).args([build_command, "-t", full_name.as_str()]),
            |invocation, assignment| invocation.args(["--build-arg".to_string(), assignment]),
        )
        .arg(".");
    let mut plan = vec![build];

    if let Some(latest) = &latest {
        plan.push(Invocation::new(program).args(["tag", full_name.as_str(), latest.as_str()]));
    }
    if request.options.push {
        plan.push(Invocation::new(program).args(["push", full_name.as_str()]));
        if let Some(latest) = &latest {
            plan.push(Invocation::new(program).args(["push", latest.as_str()]));
        }
    }
    Ok(plan)
}
