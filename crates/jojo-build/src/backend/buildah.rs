//! `buildah` backend.

use jojo_common::error::Result;

use super::podman::tag_and_push_plan;
use super::{BackendKind, BuildBackend, BuildRequest};
use crate::command::Invocation;

/// Builds with `buildah bud`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildahBackend;

impl BuildBackend for BuildahBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Buildah
    }

    fn plan(&self, request: &BuildRequest) -> Result<Vec<Invocation>> {
        tag_and_push_plan("buildah", "bud", request)
    }
}

#[cfg(test)]
mod tests {
    use jojo_common::types::ImageRef;

    use super::*;
    use crate::args::BuildArgs;
    use crate::backend::BuildOptions;

    #[test]
    fn buildah_mirrors_podman_layout() {
        let mut args = BuildArgs::default();
        args.push("FROM_IMAGE_BUILDER", "r/build:1");
        let request = BuildRequest {
            image: ImageRef::new("quay.io/team", "tool", "0.9"),
            args,
            version: Some("0.9".into()),
            options: BuildOptions {
                tag_latest: true,
                push: true,
                ..BuildOptions::default()
            },
        };
        let plan: Vec<_> = BuildahBackend
            .plan(&request)
            .expect("plan")
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            plan,
            vec![
                "buildah bud -t quay.io/team/tool:0.9 --build-arg FROM_IMAGE_BUILDER=r/build:1 \
                 --build-arg VERSION=0.9 .",
                "buildah tag quay.io/team/tool:0.9 quay.io/team/tool:latest",
                "buildah push quay.io/team/tool:0.9",
                "buildah push quay.io/team/tool:latest",
            ]
        );
    }
}
