//! `buildctl` backend for a buildkit daemon.
//!
//! Everything happens in one invocation: build arguments become frontend
//! options, and every tag is a name of the single image output, which also
//! carries the push flag.

use jojo_common::error::Result;

use super::{BackendKind, BuildBackend, BuildRequest};
use crate::command::Invocation;

/// Builds with `buildctl build` and the dockerfile frontend.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildkitBackend;

impl BuildBackend for BuildkitBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Buildkit
    }

    fn plan(&self, request: &BuildRequest) -> Result<Vec<Invocation>> {
        let mut invocation = Invocation::new("buildctl");
        if let Some(addr) = &request.options.addr {
            invocation = invocation.args(["--addr", addr.as_str()]);
        }
        invocation = invocation.args([
            "build",
            "--frontend",
            "dockerfile.v0",
            "--local",
            "context=.",
            "--local",
            "dockerfile=.",
        ]);
        for assignment in request.build_args().assignments() {
            invocation = invocation.args(["--opt".to_string(), format!("build-arg:{assignment}")]);
        }

        let mut names = request.image.full_name();
        if let Some(latest) = request.latest_target()? {
            names = format!("{names},{latest}");
        }
        let output = format!("type=image,\"name={names}\",push={}", request.options.push);
        Ok(vec![invocation.args(["--output".to_string(), output])])
    }
}
