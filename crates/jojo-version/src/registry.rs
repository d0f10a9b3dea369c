//! Resolver capability and the kind-to-resolver table.
//!
//! Every version source kind is served by exactly one resolver. The table is
//! explicit: a [`SourceKind`] maps to a constructor, and a lookup for a kind
//! with no entry fails with [`JojoError::UnknownSourceKind`].

use jojo_common::error::{JojoError, Result};
use jojo_common::types::{ResolvedVersions, SourceKind, VersionSource};

use crate::index::IndexResolver;
use crate::release::ReleaseResolver;

/// Resolves the upstream versions of a single configured source.
pub trait VersionResolver {
    /// Kind of source this resolver serves.
    fn kind(&self) -> SourceKind;

    /// Fetches up to `limit` of the most recent versions.
    ///
    /// # Errors
    ///
    /// Returns an error when the source cannot be fetched or decoded.
    fn get_all(&self, limit: u32) -> Result<ResolvedVersions>;

    /// Returns the newest stable version among the `limit` most recent ones.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`VersionResolver::get_all`].
    fn get_latest(&self, limit: u32) -> Result<Option<String>> {
        Ok(self.get_all(limit)?.latest().map(str::to_string))
    }
}

/// Constructor registered for a source kind.
pub type ResolverFactory = fn(&VersionSource) -> Result<Box<dyn VersionResolver>>;

/// Table mapping each source kind to its resolver constructor.
#[derive(Debug, Clone)]
pub struct ResolverRegistry {
    entries: Vec<(SourceKind, ResolverFactory)>,
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(SourceKind::Index, index_resolver);
        registry.register(SourceKind::Release, release_resolver);
        registry
    }
}

impl ResolverRegistry {
    /// Creates a table with no registered resolver.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers `factory` for `kind`, replacing any previous entry.
    pub fn register(&mut self, kind: SourceKind, factory: ResolverFactory) {
        self.entries.retain(|(k, _)| *k != kind);
        self.entries.push((kind, factory));
    }

    /// Looks up the constructor for a `type` discriminant.
    ///
    /// # Errors
    ///
    /// Returns [`JojoError::UnknownSourceKind`] if the discriminant matches no entry.
    pub fn get(&self, kind: &str) -> Result<ResolverFactory> {
        let parsed: SourceKind = kind.parse()?;
        self.entries
            .iter()
            .find(|(k, _)| *k == parsed)
            .map(|(_, factory)| *factory)
            .ok_or_else(|| JojoError::UnknownSourceKind {
                kind: kind.to_string(),
            })
    }

    /// Builds the resolver serving `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if no resolver is registered for the source kind or
    /// the resolver cannot be constructed.
    pub fn resolver_for(&self, source: &VersionSource) -> Result<Box<dyn VersionResolver>> {
        let factory = self.get(source.kind().as_str())?;
        tracing::debug!(kind = %source.kind(), "selected version resolver");
        factory(source)
    }
}

fn index_resolver(source: &VersionSource) -> Result<Box<dyn VersionResolver>> {
    match source {
        VersionSource::Index(index) => Ok(Box::new(IndexResolver::new(index.clone())?)),
        VersionSource::Release(_) => Err(mismatch(SourceKind::Index, source)),
    }
}

fn release_resolver(source: &VersionSource) -> Result<Box<dyn VersionResolver>> {
    match source {
        VersionSource::Release(release) => Ok(Box::new(ReleaseResolver::new(release.clone())?)),
        VersionSource::Index(_) => Err(mismatch(SourceKind::Release, source)),
    }
}

fn mismatch(expected: SourceKind, source: &VersionSource) -> JojoError {
    JojoError::Config {
        message: format!("{expected} resolver cannot serve a {} source", source.kind()),
    }
}
