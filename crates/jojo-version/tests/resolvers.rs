//! Resolver tests against a loopback HTTP responder.
//!
//! Covers the network side of both resolvers: the index archive download and
//! the release query, including the transport-failure and payload-error paths.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod support;

use jojo_common::error::JojoError;
use jojo_common::types::{IndexSource, ReleaseSource, SourceKind, VersionSource};
use jojo_version::{IndexResolver, ReleaseResolver, ResolverRegistry, VersionResolver};
use support::Responder;

const APKINDEX: &str = "\
P:busybox
V:1.36.1-r15

P:curl
V:8.5.0-r0

";

fn index_archive(text: &str) -> Vec<u8> {
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    let mut header = tar::Header::new_gnu();
    header.set_size(text.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, "APKINDEX", text.as_bytes())
        .expect("append");
    builder
        .into_inner()
        .expect("finish tar")
        .finish()
        .expect("finish gzip")
}

fn index_source(mirror: &str, package: &str) -> IndexSource {
    IndexSource::new(package, "main", "3.19", None, Some(mirror.to_string()))
}

fn release_resolver(endpoint: &str, token: Option<&str>) -> ReleaseResolver {
    ReleaseResolver::new(ReleaseSource::new("cli", "cli"))
        .expect("resolver")
        .with_endpoint(endpoint)
        .with_token(token.map(str::to_string))
}

// ── Index ────────────────────────────────────────────────────────────

#[test]
fn index_resolver_downloads_mirror_layout() {
    let responder = Responder::serve("200 OK", index_archive(APKINDEX));
    let resolver = IndexResolver::new(index_source(&responder.url, "curl")).expect("resolver");

    let versions = resolver.get_all(10).expect("versions");
    assert_eq!(versions.stable, vec!["8.5.0-r0"]);
    assert!(versions.unstable.is_empty());
    assert!(versions.matched.is_none());

    let request = responder.request();
    assert!(request.starts_with("GET /alpine/v3.19/main/x86_64/APKINDEX.tar.gz "));
}

#[test]
fn index_resolver_latest_matches_first_stable() {
    let responder = Responder::serve("200 OK", index_archive(APKINDEX));
    let resolver = IndexResolver::new(index_source(&responder.url, "busybox")).expect("resolver");
    assert_eq!(
        resolver.get_latest(1).expect("latest").as_deref(),
        Some("1.36.1-r15")
    );
}

#[test]
fn index_resolver_absent_package_yields_nothing() {
    let responder = Responder::serve("200 OK", index_archive(APKINDEX));
    let resolver = IndexResolver::new(index_source(&responder.url, "wget")).expect("resolver");
    assert!(resolver.get_latest(10).expect("latest").is_none());
}

#[test]
fn index_resolver_error_status_is_fatal() {
    let responder = Responder::serve("404 Not Found", b"missing".to_vec());
    let resolver = IndexResolver::new(index_source(&responder.url, "curl")).expect("resolver");
    assert!(matches!(resolver.get_all(10), Err(JojoError::Http { .. })));
}

#[test]
fn index_resolver_rejects_plain_body() {
    let responder = Responder::serve("200 OK", APKINDEX.as_bytes().to_vec());
    let resolver = IndexResolver::new(index_source(&responder.url, "curl")).expect("resolver");
    assert!(matches!(
        resolver.get_all(10),
        Err(JojoError::IndexArchive { .. })
    ));
}

// ── Release ──────────────────────────────────────────────────────────

const RELEASES: &str = r#"{"data":{"repository":{"releases":{"nodes":[
    {"tagName":"v2.40.0","isPrerelease":false},
    {"tagName":"v2.40.0-rc.1","isPrerelease":true},
    {"tagName":"v2.39.2","isPrerelease":false}
]}}}}"#;

#[test]
fn release_resolver_sends_query_with_token() {
    let responder = Responder::serve("200 OK", RELEASES.as_bytes().to_vec());
    let resolver = release_resolver(&responder.url, Some("s3cret"));

    let versions = resolver.get_all(5).expect("versions");
    assert_eq!(versions.stable, vec!["2.40.0", "2.39.2"]);
    assert_eq!(versions.unstable, vec!["2.40.0-rc.1"]);

    let request = responder.request();
    assert!(request.starts_with("POST / "));
    assert!(request.to_ascii_lowercase().contains("authorization: bearer s3cret"));
    assert!(request.contains(r#""first":5"#));
    assert!(request.contains(r#""owner":"cli""#));
    assert!(request.contains("direction: DESC"));
}

#[test]
fn release_resolver_without_token_sends_no_authorization() {
    let responder = Responder::serve("200 OK", RELEASES.as_bytes().to_vec());
    let resolver = release_resolver(&responder.url, None);
    assert_eq!(
        resolver.get_latest(100).expect("latest").as_deref(),
        Some("2.40.0")
    );
    assert!(!responder.request().to_ascii_lowercase().contains("authorization:"));
}

#[test]
fn release_resolver_caps_page_size() {
    let responder = Responder::serve("200 OK", RELEASES.as_bytes().to_vec());
    let resolver = release_resolver(&responder.url, None);
    let _ = resolver.get_all(500).expect("versions");
    assert!(responder.request().contains(r#""first":100"#));
}

#[test]
fn release_resolver_error_status_yields_empty_result() {
    let responder = Responder::serve("502 Bad Gateway", b"upstream down".to_vec());
    let resolver = release_resolver(&responder.url, None);
    assert!(resolver.get_all(10).expect("not fatal").is_empty());
}

#[test]
fn release_resolver_payload_errors_are_fatal() {
    let responder = Responder::serve(
        "200 OK",
        br#"{"errors":[{"message":"Could not resolve to a Repository"}]}"#.to_vec(),
    );
    let resolver = release_resolver(&responder.url, None);
    assert!(matches!(
        resolver.get_all(10),
        Err(JojoError::ReleaseQuery { errors }) if errors == ["Could not resolve to a Repository"]
    ));
}

#[test]
fn release_resolver_rejects_malformed_payload() {
    let responder = Responder::serve("200 OK", b"<html>rate limited</html>".to_vec());
    let resolver = release_resolver(&responder.url, None);
    assert!(matches!(resolver.get_all(10), Err(JojoError::Json { .. })));
}

// ── Registry ─────────────────────────────────────────────────────────

#[test]
fn registry_resolves_index_source_end_to_end() {
    let responder = Responder::serve("200 OK", index_archive(APKINDEX));
    let source = VersionSource::Index(index_source(&responder.url, "curl"));

    let resolver = ResolverRegistry::default()
        .resolver_for(&source)
        .expect("resolver");
    assert_eq!(resolver.kind(), SourceKind::Index);
    assert_eq!(
        resolver.get_latest(10).expect("latest").as_deref(),
        Some("8.5.0-r0")
    );
}
