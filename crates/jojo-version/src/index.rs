//! OS package repository index resolution.
//!
//! Downloads the compressed `APKINDEX.tar.gz` published by a distribution
//! mirror, extracts its `APKINDEX` member, and reads the version of one
//! package from it. The index yields at most one version per package.

use std::collections::HashMap;
use std::io::Read;

use jojo_common::constants::{APP_NAME, INDEX_MEMBER_NAME};
use jojo_common::error::{JojoError, Result};
use jojo_common::types::{IndexSource, ResolvedVersions, SourceKind};
use reqwest::blocking::Client;

use crate::registry::VersionResolver;

/// Package name to version mapping, in first-seen order.
///
/// When a package name appears more than once, the first record wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageIndex {
    entries: Vec<(String, String)>,
    positions: HashMap<String, usize>,
}

impl PackageIndex {
    /// Parses the text of an `APKINDEX` member.
    ///
    /// Records are blocks of `KEY:value` lines closed by a blank line. Only
    /// `P:` (package) and `V:` (version) are read. A record still open at end
    /// of input is incomplete and discarded; a closed record without `P:` is
    /// skipped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut index = Self::default();
        let mut package: Option<&str> = None;
        let mut version: Option<&str> = None;

        for line in text.lines() {
            if line.is_empty() {
                match package.take() {
                    Some(name) => index.insert(name, version.take().unwrap_or_default()),
                    None => version = None,
                }
                continue;
            }
            if let Some(value) = line.strip_prefix("P:") {
                package = Some(value);
            } else if let Some(value) = line.strip_prefix("V:") {
                version = Some(value);
            }
        }

        if let Some(name) = package {
            tracing::debug!(package = name, "discarding unterminated index record");
        }
        index
    }

    /// Decompresses a gzip-tar index archive and parses its `APKINDEX` member.
    ///
    /// # Errors
    ///
    /// Returns [`JojoError::IndexArchive`] if the archive is not gzip-tar, the
    /// member is missing, or its content is not UTF-8.
    pub fn from_archive(data: &[u8]) -> Result<Self> {
        let decoder = flate2::read::MultiGzDecoder::new(data);
        let mut archive = tar::Archive::new(decoder);
        archive.set_ignore_zeros(true);

        let entries = archive
            .entries()
            .map_err(|e| archive_error("unreadable tar stream", &e))?;
        for entry in entries {
            let mut entry = entry.map_err(|e| archive_error("unreadable tar entry", &e))?;
            let is_index = entry
                .path()
                .map_err(|e| archive_error("unreadable entry path", &e))?
                .to_str()
                == Some(INDEX_MEMBER_NAME);
            if !is_index {
                continue;
            }

            let mut content = Vec::new();
            let _ = entry
                .read_to_end(&mut content)
                .map_err(|e| archive_error("unreadable index member", &e))?;
            let text = String::from_utf8(content).map_err(|e| JojoError::IndexArchive {
                message: format!("{INDEX_MEMBER_NAME} is not UTF-8: {e}"),
            })?;
            return Ok(Self::parse(&text));
        }

        Err(JojoError::IndexArchive {
            message: format!("archive has no {INDEX_MEMBER_NAME} member"),
        })
    }

    fn insert(&mut self, package: &str, version: &str) {
        if self.positions.contains_key(package) {
            tracing::debug!(package, "ignoring duplicate index record");
            return;
        }
        let _ = self
            .positions
            .insert(package.to_string(), self.entries.len());
        self.entries.push((package.to_string(), version.to_string()));
    }

    /// Version recorded for `package`.
    #[must_use]
    pub fn version(&self, package: &str) -> Option<&str> {
        self.positions
            .get(package)
            .map(|&i| self.entries[i].1.as_str())
    }

    /// Number of packages in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no package.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(package, version)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }
}

fn archive_error(context: &str, err: &std::io::Error) -> JojoError {
    JojoError::IndexArchive {
        message: format!("{context}: {err}"),
    }
}

/// Resolves a package version from an OS repository index.
#[derive(Debug)]
pub struct IndexResolver {
    source: IndexSource,
    client: Client,
}

impl IndexResolver {
    /// Creates a resolver for `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(source: IndexSource) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("jojo/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| JojoError::Http {
                url: source.index_url(),
                message: format!("cannot initialize {APP_NAME} HTTP client: {e}"),
            })?;
        Ok(Self { source, client })
    }

    /// The source this resolver reads.
    #[must_use]
    pub const fn source(&self) -> &IndexSource {
        &self.source
    }

    /// Downloads and parses the whole index.
    ///
    /// # Errors
    ///
    /// Returns [`JojoError::Http`] on network failure or error status, and
    /// [`JojoError::IndexArchive`] if the body is not a valid index archive.
    pub fn fetch_index(&self) -> Result<PackageIndex> {
        let url = self.source.index_url();
        tracing::info!(url = %url, "downloading package index");

        let http_error = |message: String| JojoError::Http {
            url: url.clone(),
            message,
        };
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| http_error(e.to_string()))?;
        if !response.status().is_success() {
            return Err(http_error(format!("HTTP {}", response.status())));
        }
        let body = response.bytes().map_err(|e| http_error(e.to_string()))?;

        let index = PackageIndex::from_archive(&body)?;
        tracing::debug!(url = %url, packages = index.len(), "package index parsed");
        Ok(index)
    }
}

impl VersionResolver for IndexResolver {
    fn kind(&self) -> SourceKind {
        SourceKind::Index
    }

    /// The index holds one version per package, so `limit` has no effect.
    fn get_all(&self, _limit: u32) -> Result<ResolvedVersions> {
        let index = self.fetch_index()?;
        let stable = index
            .version(self.source.package())
            .map(|v| vec![v.to_string()])
            .unwrap_or_default();
        if stable.is_empty() {
            tracing::info!(package = self.source.package(), "package not found in index");
        }
        Ok(ResolvedVersions {
            stable,
            unstable: Vec::new(),
            matched: None,
        })
    }
}
