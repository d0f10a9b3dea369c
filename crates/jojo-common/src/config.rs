//! Buildfile model for an image project.
//!
//! Every image lives in its own directory under the images path and carries
//! a YAML buildfile ([`BUILDFILE_NAME`]) describing the image identity, its
//! base images, free-form build arguments, and where its version comes from.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::BUILDFILE_NAME;
use crate::error::{JojoError, Result};
use crate::types::{ImageRef, IndexSource, ReleaseSource, SourceKind, VersionSource};

/// How the image tag is derived from the resolved version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagType {
    /// The tag is used as written.
    #[default]
    Tag,
    /// The tag is the resolved version.
    Version,
    /// The tag is the resolved version suffixed with a date.
    VersionDate,
    /// The tag is the resolved version suffixed with a git revision.
    VersionGit,
}

/// Raw `version_from` section: a `type` discriminant plus optional fields.
///
/// Converted into a [`VersionSource`] by [`VersionFromConfig::to_source`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionFromConfig {
    /// Source kind discriminant (`index`/`alpine` or `release`/`github`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Package name (index sources).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Repository name (both kinds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Distribution version id (index sources).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    /// Package architecture (index sources).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    /// Mirror base URL (index sources).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror: Option<String>,
    /// Repository owner (release sources).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Version constraint, carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semver: Option<String>,
}

impl VersionFromConfig {
    /// Builds the fully-defaulted [`VersionSource`] this section describes.
    ///
    /// # Errors
    ///
    /// Returns [`JojoError::UnknownSourceKind`] if `type` names no resolver, or
    /// [`JojoError::Config`] if a field required by that kind is missing.
    pub fn to_source(&self) -> Result<VersionSource> {
        let kind: SourceKind = self.kind.parse()?;
        let source = match kind {
            SourceKind::Index => VersionSource::Index(IndexSource::new(
                required(kind, "package", self.package.as_deref())?,
                required(kind, "repository", self.repository.as_deref())?,
                required(kind, "version_id", self.version_id.as_deref())?,
                self.arch.clone(),
                self.mirror.clone(),
            )),
            SourceKind::Release => VersionSource::Release(ReleaseSource::new(
                required(kind, "owner", self.owner.as_deref())?,
                required(kind, "repository", self.repository.as_deref())?,
            )),
        };
        Ok(source)
    }
}

fn required<'a>(kind: SourceKind, field: &str, value: Option<&'a str>) -> Result<&'a str> {
    value.ok_or_else(|| JojoError::Config {
        message: format!("{kind} version source requires `{field}`"),
    })
}

/// `tag_build` section: the resolved version and where it comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagBuild {
    /// Last resolved version.
    #[serde(default)]
    pub version: Option<String>,
    /// Where to resolve the version from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_from: Option<VersionFromConfig>,
    /// Tag derivation strategy.
    #[serde(rename = "type", default)]
    pub tag_type: TagType,
}

/// The image being built, with its optional tag-building settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageTagFrom {
    /// Registry host.
    pub registry: String,
    /// Repository name.
    pub name: String,
    /// Image tag; falls back to the resolved version when unset.
    #[serde(default)]
    pub tag: Option<String>,
    /// Version resolution settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_build: Option<TagBuild>,
    /// Free-form build arguments, in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_args: Option<serde_yaml::Mapping>,
}

/// Root of a buildfile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBuildConfig {
    /// Image to build.
    pub image: ImageTagFrom,
    /// Base image, exposed as `FROM_IMAGE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_image: Option<ImageRef>,
    /// Builder-stage image, exposed as `FROM_IMAGE_BUILDER`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_image_builder: Option<ImageRef>,
}

impl ImageBuildConfig {
    /// Parses a buildfile from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML does not match the buildfile model.
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Serializes the buildfile to YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Loads a buildfile from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "loading buildfile");
        let content = std::fs::read_to_string(path).map_err(|e| JojoError::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// Writes the buildfile to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        tracing::debug!(path = %path.display(), "writing buildfile");
        let yaml = self.to_yaml()?;
        std::fs::write(path, yaml).map_err(|e| JojoError::io(path, e))
    }

    /// Tag-building settings, if configured.
    #[must_use]
    pub const fn tag_build(&self) -> Option<&TagBuild> {
        self.image.tag_build.as_ref()
    }

    /// Last resolved version.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.tag_build().and_then(|t| t.version.as_deref())
    }

    /// The configured version source, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the `version_from` section is invalid.
    pub fn version_source(&self) -> Result<Option<VersionSource>> {
        self.tag_build()
            .and_then(|t| t.version_from.as_ref())
            .map(VersionFromConfig::to_source)
            .transpose()
    }

    /// Records a resolved version as both the image tag and the tag-build version.
    pub fn set_version(&mut self, version: &str) {
        self.image.tag = Some(version.to_string());
        self.image
            .tag_build
            .get_or_insert_with(TagBuild::default)
            .version = Some(version.to_string());
    }

    /// Identity of the image to build.
    ///
    /// # Errors
    ///
    /// Returns [`JojoError::Config`] if neither a tag nor a resolved version is set.
    pub fn image_ref(&self) -> Result<ImageRef> {
        let tag = self
            .image
            .tag
            .as_deref()
            .or_else(|| self.version())
            .ok_or_else(|| JojoError::Config {
                message: format!("image `{}` has no tag and no resolved version", self.image.name),
            })?;
        Ok(ImageRef::new(&self.image.registry, &self.image.name, tag))
    }
}

/// Returns the directory of `image_name` under `images_path`.
///
/// # Errors
///
/// Returns [`JojoError::NotFound`] if the directory does not exist.
pub fn image_dir(images_path: &Path, image_name: &str) -> Result<PathBuf> {
    let dir = images_path.join(image_name);
    if !dir.is_dir() {
        return Err(JojoError::NotFound {
            kind: "image directory",
            id: dir.display().to_string(),
        });
    }
    Ok(dir)
}

/// Returns the buildfile path of `image_name` under `images_path`.
///
/// # Errors
///
/// Returns [`JojoError::NotFound`] if the image directory or its buildfile is missing.
pub fn buildfile_path(images_path: &Path, image_name: &str) -> Result<PathBuf> {
    let buildfile = image_dir(images_path, image_name)?.join(BUILDFILE_NAME);
    if !buildfile.is_file() {
        return Err(JojoError::NotFound {
            kind: "buildfile",
            id: buildfile.display().to_string(),
        });
    }
    Ok(buildfile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_ARCH, DEFAULT_MIRROR};

    const INDEX_BUILDFILE: &str = r"
image:
  registry: registry.example.com
  name: curl
  tag: 8.5.0-r0
  tag_build:
    version: 8.5.0-r0
    type: VERSION
    version_from:
      type: alpine
      package: curl
      repository: main
      version_id: '3.19'
  build_args:
    zeta: last
    alpha: first
from_image:
  registry: registry.example.com
  name: alpine
  tag: '3.19'
";

    #[test]
    fn parse_index_buildfile() {
        let config = ImageBuildConfig::from_yaml(INDEX_BUILDFILE).expect("parse");
        assert_eq!(config.image.name, "curl");
        assert_eq!(config.version(), Some("8.5.0-r0"));
        assert_eq!(
            config.tag_build().map(|t| t.tag_type),
            Some(TagType::Version)
        );
        assert_eq!(
            config.from_image.as_ref().map(ImageRef::full_name).as_deref(),
            Some("registry.example.com/alpine:3.19")
        );
        assert!(config.from_image_builder.is_none());
    }

    #[test]
    fn build_args_keep_declaration_order() {
        let config = ImageBuildConfig::from_yaml(INDEX_BUILDFILE).expect("parse");
        let keys: Vec<_> = config
            .image
            .build_args
            .as_ref()
            .expect("build args")
            .keys()
            .filter_map(serde_yaml::Value::as_str)
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn version_source_applies_defaults() {
        let config = ImageBuildConfig::from_yaml(INDEX_BUILDFILE).expect("parse");
        let source = config.version_source().expect("valid").expect("configured");
        assert_eq!(
            source,
            VersionSource::Index(IndexSource::new(
                "curl",
                "main",
                "v3.19",
                Some(DEFAULT_ARCH.into()),
                Some(DEFAULT_MIRROR.into()),
            ))
        );
    }

    #[test]
    fn release_source_requires_owner() {
        let raw = VersionFromConfig {
            kind: "github".into(),
            repository: Some("cli".into()),
            ..VersionFromConfig::default()
        };
        assert!(matches!(raw.to_source(), Err(JojoError::Config { .. })));

        let raw = VersionFromConfig {
            owner: Some("cli".into()),
            ..raw
        };
        assert_eq!(
            raw.to_source().expect("valid"),
            VersionSource::Release(ReleaseSource::new("cli", "cli"))
        );
    }

    #[test]
    fn unknown_source_kind_is_rejected() {
        let raw = VersionFromConfig {
            kind: "pypi".into(),
            ..VersionFromConfig::default()
        };
        assert!(matches!(
            raw.to_source(),
            Err(JojoError::UnknownSourceKind { .. })
        ));
    }

    #[test]
    fn image_ref_falls_back_to_resolved_version() {
        let mut config = ImageBuildConfig::from_yaml(INDEX_BUILDFILE).expect("parse");
        config.image.tag = None;
        assert_eq!(
            config.image_ref().expect("image").full_name(),
            "registry.example.com/curl:8.5.0-r0"
        );

        config.image.tag_build = None;
        assert!(matches!(config.image_ref(), Err(JojoError::Config { .. })));
    }

    #[test]
    fn set_version_updates_tag_and_tag_build() {
        let mut config = ImageBuildConfig::from_yaml(
            "image:\n  registry: r\n  name: app\n  tag: null\n",
        )
        .expect("parse");
        config.set_version("2.0.0");
        assert_eq!(config.image.tag.as_deref(), Some("2.0.0"));
        assert_eq!(config.version(), Some("2.0.0"));
    }

    #[test]
    fn save_then_load_preserves_buildfile() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(BUILDFILE_NAME);
        let config = ImageBuildConfig::from_yaml(INDEX_BUILDFILE).expect("parse");

        config.save(&path).expect("save");
        let reloaded = ImageBuildConfig::load(&path).expect("load");
        assert_eq!(reloaded, config);
    }

    #[test]
    fn buildfile_path_requires_directory_and_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            buildfile_path(dir.path(), "app"),
            Err(JojoError::NotFound { kind: "image directory", .. })
        ));

        std::fs::create_dir(dir.path().join("app")).expect("mkdir");
        assert!(matches!(
            buildfile_path(dir.path(), "app"),
            Err(JojoError::NotFound { kind: "buildfile", .. })
        ));

        std::fs::write(dir.path().join("app").join(BUILDFILE_NAME), "").expect("write");
        assert!(buildfile_path(dir.path(), "app").is_ok());
    }
}
