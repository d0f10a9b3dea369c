//! Domain primitive types used across the jojo workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ARCH, DEFAULT_MIRROR, INDEX_ARCHIVE_NAME, INDEX_OS_SEGMENT, LATEST_TAG,
};
use crate::error::{JojoError, Result};

/// Joins URL-ish segments with a single `/` between each pair.
///
/// The first segment loses its trailing slashes, inner segments lose both
/// leading and trailing slashes, and the last segment loses its leading ones.
#[must_use]
pub fn urljoin(parts: &[&str]) -> String {
    match parts {
        [] => String::new(),
        [only] => (*only).to_string(),
        [first, middle @ .., last] => {
            let mut joined = Vec::with_capacity(parts.len());
            joined.push(first.trim_end_matches('/'));
            joined.extend(middle.iter().map(|s| s.trim_matches('/')));
            joined.push(last.trim_start_matches('/'));
            joined.join("/")
        }
    }
}

/// Replaces everything after the last `:` of a full image name with `latest`.
///
/// # Errors
///
/// Returns [`JojoError::InvalidImageReference`] if the name carries no tag.
pub fn derive_latest(full_name: &str) -> Result<String> {
    match full_name.rsplit_once(':') {
        Some((name, tag)) if !tag.contains('/') => Ok(format!("{name}:{LATEST_TAG}")),
        _ => Err(JojoError::InvalidImageReference {
            reference: full_name.to_string(),
        }),
    }
}

/// Identity of a container image: `registry/name:tag`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef {
    /// Registry host, optionally with a namespace path.
    pub registry: String,
    /// Repository name inside the registry.
    pub name: String,
    /// Image tag.
    pub tag: String,
}

impl ImageRef {
    /// Creates an image reference from its parts.
    #[must_use]
    pub fn new(registry: impl Into<String>, name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            registry: registry.into(),
            name: name.into(),
            tag: tag.into(),
        }
    }

    /// Parses `registry/name:tag`, splitting on the last `/` and then the last `:`.
    ///
    /// # Errors
    ///
    /// Returns [`JojoError::InvalidImageReference`] if either separator is missing.
    pub fn parse(reference: &str) -> Result<Self> {
        let invalid = || JojoError::InvalidImageReference {
            reference: reference.to_string(),
        };
        let (registry, name_tag) = reference.rsplit_once('/').ok_or_else(invalid)?;
        let (name, tag) = name_tag.rsplit_once(':').ok_or_else(invalid)?;
        if registry.is_empty() || name.is_empty() || tag.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(registry, name, tag))
    }

    /// Returns `registry/name:tag` with slash boundaries normalized.
    #[must_use]
    pub fn full_name(&self) -> String {
        let name_tag = format!("{}:{}", self.name, self.tag);
        urljoin(&[self.registry.as_str(), name_tag.as_str()])
    }

    /// Whether this reference already points at the `latest` tag.
    #[must_use]
    pub fn is_latest(&self) -> bool {
        self.tag == LATEST_TAG
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Discriminant selecting which resolver handles a [`VersionSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// OS package repository index.
    Index,
    /// Hosting API release list.
    Release,
}

impl SourceKind {
    /// Canonical name used in buildfiles.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Release => "release",
        }
    }
}

impl FromStr for SourceKind {
    type Err = JojoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "index" | "alpine" => Ok(Self::Index),
            "release" | "github" => Ok(Self::Release),
            _ => Err(JojoError::UnknownSourceKind { kind: s.to_string() }),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coordinates of a package inside an OS repository index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSource {
    package: String,
    repository: String,
    version_id: String,
    arch: String,
    mirror: String,
}

impl IndexSource {
    /// Builds a fully-defaulted index source.
    ///
    /// The version id gains a `v` prefix when missing; `arch` and `mirror`
    /// fall back to [`DEFAULT_ARCH`] and [`DEFAULT_MIRROR`].
    #[must_use]
    pub fn new(
        package: impl Into<String>,
        repository: impl Into<String>,
        version_id: &str,
        arch: Option<String>,
        mirror: Option<String>,
    ) -> Self {
        let version_id = if version_id.starts_with('v') {
            version_id.to_string()
        } else {
            format!("v{version_id}")
        };
        Self {
            package: package.into(),
            repository: repository.into(),
            version_id,
            arch: arch.unwrap_or_else(|| DEFAULT_ARCH.to_string()),
            mirror: mirror.unwrap_or_else(|| DEFAULT_MIRROR.to_string()),
        }
    }

    /// Package looked up in the index.
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Repository name (`main`, `community`, ...).
    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// `v`-prefixed distribution version id.
    #[must_use]
    pub fn version_id(&self) -> &str {
        &self.version_id
    }

    /// Package architecture.
    #[must_use]
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Mirror base URL.
    #[must_use]
    pub fn mirror(&self) -> &str {
        &self.mirror
    }

    /// Location of the compressed index archive on the mirror.
    #[must_use]
    pub fn index_url(&self) -> String {
        urljoin(&[
            self.mirror.as_str(),
            INDEX_OS_SEGMENT,
            self.version_id.as_str(),
            self.repository.as_str(),
            self.arch.as_str(),
            INDEX_ARCHIVE_NAME,
        ])
    }
}

/// Coordinates of a repository on the release hosting API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSource {
    owner: String,
    repository: String,
}

impl ReleaseSource {
    /// Creates a release source.
    #[must_use]
    pub fn new(owner: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repository: repository.into(),
        }
    }

    /// Repository owner (user or organization).
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }
}

/// Where to look up the upstream version of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    /// OS package repository index.
    Index(IndexSource),
    /// Hosting API release list.
    Release(ReleaseSource),
}

impl VersionSource {
    /// Discriminant of the populated variant.
    #[must_use]
    pub const fn kind(&self) -> SourceKind {
        match self {
            Self::Index(_) => SourceKind::Index,
            Self::Release(_) => SourceKind::Release,
        }
    }
}

/// Versions produced by a single resolution call.
///
/// Each sequence keeps the newest-first order delivered by the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedVersions {
    /// Stable versions.
    pub stable: Vec<String>,
    /// Prerelease versions.
    pub unstable: Vec<String>,
    /// Version matching a requested constraint, if any.
    pub matched: Option<String>,
}

impl ResolvedVersions {
    /// Result of a resolution that yielded nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Newest stable version.
    #[must_use]
    pub fn latest(&self) -> Option<&str> {
        self.stable.first().map(String::as_str)
    }

    /// Whether neither sequence holds a version.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stable.is_empty() && self.unstable.is_empty()
    }
}
