//! # jojo-version
//!
//! Upstream version resolution for image builds.
//!
//! Handles:
//! - **Index**: OS package repository indexes (`APKINDEX.tar.gz`).
//! - **Release**: Release lists from a hosting API, split into stable and prerelease.
//! - **Registry**: The table mapping a source kind to the resolver that serves it.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod index;
pub mod registry;
pub mod release;

pub use index::{IndexResolver, PackageIndex};
pub use registry::{ResolverRegistry, VersionResolver};
pub use release::{ReleaseResolver, normalize_tag};
