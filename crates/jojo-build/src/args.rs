//! Build-time variables derived from a buildfile.

use jojo_common::config::ImageBuildConfig;

/// Ordered `KEY=VALUE` build arguments.
///
/// Free-form arguments come first in buildfile order, then `FROM_IMAGE`, then
/// `FROM_IMAGE_BUILDER`. The resolved `VERSION` is not part of the set; build
/// backends append it when they lay out the command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildArgs {
    pairs: Vec<(String, String)>,
}

impl BuildArgs {
    /// Derives the build arguments of `config`.
    ///
    /// Free-form entries whose key or value is not a plain string are skipped.
    /// Keys are upper-cased.
    #[must_use]
    pub fn from_config(config: &ImageBuildConfig) -> Self {
        let mut args = Self::default();

        if let Some(mapping) = &config.image.build_args {
            for (key, value) in mapping {
                match (key.as_str(), value.as_str()) {
                    (Some(key), Some(value)) => args.push(key.to_uppercase(), value),
                    _ => tracing::debug!(key = ?key, "skipping non-string build argument"),
                }
            }
        }
        if let Some(from_image) = &config.from_image {
            args.push("FROM_IMAGE", from_image.full_name());
        }
        if let Some(builder) = &config.from_image_builder {
            args.push("FROM_IMAGE_BUILDER", builder.full_name());
        }
        args
    }

    /// Appends a pair.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// The pairs in order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Iterates the pairs formatted as `KEY=VALUE`.
    pub fn assignments(&self) -> impl Iterator<Item = String> + '_ {
        self.pairs.iter().map(|(k, v)| format!("{k}={v}"))
    }

    /// Number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no argument was derived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
