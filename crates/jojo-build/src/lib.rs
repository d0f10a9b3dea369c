//! Image build driving for jojo.
//!
//! Derives the ordered build arguments of an image from its buildfile, turns
//! them into the invocations of one of the supported build tools, and runs
//! those invocations from inside the image directory.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod args;
pub mod backend;
pub mod command;
pub mod workdir;

pub use args::BuildArgs;
pub use backend::{BackendKind, BuildBackend, BuildOptions, BuildRequest};
pub use command::{CommandRunner, Invocation, SystemRunner};
pub use workdir::WorkingDir;
