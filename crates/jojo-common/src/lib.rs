//! # jojo-common
//!
//! Shared types, error definitions, buildfile model, and constants
//! used across the entire jojo workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate and provides the primitives that the version resolvers,
//! the build backends, and the CLI build upon.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
