//! System-wide constants and defaults.

/// OS path segment of the distribution mirror layout.
pub const INDEX_OS_SEGMENT: &str = "alpine";

/// Default distribution mirror.
pub const DEFAULT_MIRROR: &str = "http://dl-cdn.alpinelinux.org";

/// Default package architecture.
pub const DEFAULT_ARCH: &str = "x86_64";

/// File name of the compressed package index on the mirror.
pub const INDEX_ARCHIVE_NAME: &str = "APKINDEX.tar.gz";

/// Name of the index member inside the compressed archive.
pub const INDEX_MEMBER_NAME: &str = "APKINDEX";

/// Query endpoint of the release hosting API.
pub const RELEASE_API_ENDPOINT: &str = "https://api.github.com/graphql";

/// Largest page size the release API accepts.
pub const RELEASE_API_MAX_PAGE: u32 = 100;

/// Environment variable holding the release API bearer token.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Environment variable selecting the build backend.
pub const BUILDER_ENV: &str = "JOJO_BUILDER";

/// Environment variable enabling dry-run mode.
pub const DRY_RUN_ENV: &str = "JOJO_DRY_RUN";

/// Environment variable pointing at the images directory.
pub const IMAGES_PATH_ENV: &str = "JOJO_IMAGES_PATH";

/// Environment variable for the log level.
pub const LOG_LEVEL_ENV: &str = "JOJO_LOG_LEVEL";

/// Name of the buildfile inside an image directory.
pub const BUILDFILE_NAME: &str = ".jojo.yaml";

/// Default build backend name.
pub const DEFAULT_BUILDER: &str = "podman";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Number of versions requested when listing.
pub const DEFAULT_LIST_LIMIT: u32 = 10;

/// Number of versions requested when looking for the latest one.
pub const DEFAULT_FIND_LIMIT: u32 = 100;

/// Floating tag applied next to the version tag.
pub const LATEST_TAG: &str = "latest";

/// Application name used in the user agent and CLI output.
pub const APP_NAME: &str = "jojo";
