//! Source validation and resolution.
//!
//! | Origin    | Valid when                                   | Bound as        |
//! |-----------|----------------------------------------------|-----------------|
//! | URL       | path starts with `http` (covers `https`)     | network stream  |
//! | RAW       | path is a `u32` id the resolver can open     | descriptor      |
//! | ASSETS    | the resolver can open the asset path         | descriptor      |
//! | FILE_PATH | the resolver reports that the path exists    | local file      |

use crate::error::{PlaybackError, Result};
use crate::types::{AudioRequest, Origin};
use bridge_traits::{AssetDescriptor, DataSource, ResourceResolver};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A validated source, ready to bind to an engine.
///
/// Descriptor-backed sources own the open handle; dropping the value after
/// binding closes it.
#[derive(Debug)]
pub(crate) enum ResolvedSource {
    Network(String),
    Descriptor(AssetDescriptor),
    LocalFile(PathBuf),
}

impl ResolvedSource {
    pub(crate) fn data_source(&self) -> DataSource<'_> {
        match self {
            ResolvedSource::Network(url) => DataSource::Network { url },
            ResolvedSource::Descriptor(descriptor) => DataSource::Descriptor(descriptor),
            ResolvedSource::LocalFile(path) => DataSource::LocalFile { path },
        }
    }
}

/// Validate `request` against its origin and open whatever it needs.
pub(crate) async fn resolve(
    request: &AudioRequest,
    resolver: &dyn ResourceResolver,
) -> Result<ResolvedSource> {
    let path = request.path();
    let origin = request.origin();
    let invalid = || PlaybackError::invalid_source(origin, path);

    match origin {
        Origin::Url => {
            if path.starts_with("http") {
                Ok(ResolvedSource::Network(path.to_string()))
            } else {
                Err(invalid())
            }
        }
        Origin::Raw => {
            let id: u32 = path.parse().map_err(|_| invalid())?;
            let descriptor = resolver.open_raw(id).await.map_err(|err| {
                debug!(id, error = %err, "Raw resource did not open");
                invalid()
            })?;
            Ok(ResolvedSource::Descriptor(descriptor))
        }
        Origin::Assets => {
            let descriptor = resolver.open_asset(path).await.map_err(|err| {
                debug!(error = %err, "Asset did not open");
                invalid()
            })?;
            Ok(ResolvedSource::Descriptor(descriptor))
        }
        Origin::FilePath => match resolver.file_exists(Path::new(path)).await {
            Ok(true) => Ok(ResolvedSource::LocalFile(PathBuf::from(path))),
            Ok(false) => Err(invalid()),
            Err(err) => {
                debug!(error = %err, "Existence check failed");
                Err(invalid())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::{error::Result as BridgeResult, BridgeError};
    use mockall::mock;
    use std::fs::File;
    use uuid::Uuid;

    mock! {
        Resolver {}

        #[async_trait]
        impl ResourceResolver for Resolver {
            async fn open_raw(&self, id: u32) -> BridgeResult<AssetDescriptor>;
            async fn open_asset(&self, path: &str) -> BridgeResult<AssetDescriptor>;
            async fn file_exists(&self, path: &Path) -> BridgeResult<bool>;
        }
    }

    fn descriptor(name: &str) -> AssetDescriptor {
        let path = std::env::temp_dir().join(format!("core-playback-src-{}", Uuid::new_v4()));
        std::fs::write(&path, b"audio").unwrap();
        let file = File::open(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        AssetDescriptor::new(file, 0, 5, name)
    }

    #[tokio::test]
    async fn test_url_requires_http_prefix() {
        let resolver = MockResolver::new();

        for url in ["http://x/a.mp3", "https://x/a.mp3", "httpfoo"] {
            let resolved = resolve(&AudioRequest::url(url), &resolver).await.unwrap();
            assert!(matches!(resolved, ResolvedSource::Network(ref u) if u == url));
        }

        for url in ["ftp://x/a.mp3", "", "HTTP://X/A.MP3", "/music/a.mp3"] {
            let err = resolve(&AudioRequest::url(url), &resolver).await.unwrap_err();
            assert!(matches!(err, PlaybackError::UrlInvalid { ref path } if path == url));
        }
    }

    #[tokio::test]
    async fn test_raw_opens_descriptor() {
        let mut resolver = MockResolver::new();
        resolver
            .expect_open_raw()
            .withf(|id| *id == 42)
            .times(1)
            .returning(|_| Ok(descriptor("42")));

        let resolved = resolve(&AudioRequest::raw(42), &resolver).await.unwrap();
        match resolved {
            ResolvedSource::Descriptor(d) => assert_eq!(d.name(), "42"),
            other => panic!("expected descriptor, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_raw_rejects_non_numeric_without_resolver_call() {
        let mut resolver = MockResolver::new();
        resolver.expect_open_raw().times(0);

        let err = resolve(&AudioRequest::new("intro", Origin::Raw), &resolver)
            .await
            .unwrap_err();
        assert!(matches!(err, PlaybackError::RawInvalid { ref path } if path == "intro"));
    }

    #[tokio::test]
    async fn test_raw_missing_resource() {
        let mut resolver = MockResolver::new();
        resolver
            .expect_open_raw()
            .returning(|_| Err(BridgeError::NotAvailable("no such id".to_string())));

        let err = resolve(&AudioRequest::raw(9), &resolver).await.unwrap_err();
        assert!(matches!(err, PlaybackError::RawInvalid { .. }));
    }

    #[tokio::test]
    async fn test_assets() {
        let mut resolver = MockResolver::new();
        resolver
            .expect_open_asset()
            .withf(|path| path.to_string() == "sounds/intro.ogg")
            .returning(|path| Ok(descriptor(path)));
        resolver
            .expect_open_asset()
            .returning(|_| Err(BridgeError::NotAvailable("missing".to_string())));

        assert!(resolve(&AudioRequest::asset("sounds/intro.ogg"), &resolver)
            .await
            .is_ok());

        let err = resolve(&AudioRequest::asset("sounds/missing.ogg"), &resolver)
            .await
            .unwrap_err();
        assert!(
            matches!(err, PlaybackError::AssetsInvalid { ref path } if path == "sounds/missing.ogg")
        );
    }

    #[tokio::test]
    async fn test_file_path() {
        let mut resolver = MockResolver::new();
        resolver
            .expect_file_exists()
            .withf(|path| path.to_string_lossy() == "/music/a.mp3")
            .returning(|_| Ok(true));
        resolver
            .expect_file_exists()
            .withf(|path| path.to_string_lossy() == "/denied/a.mp3")
            .returning(|_| {
                Err(BridgeError::Io(std::io::Error::from(
                    std::io::ErrorKind::PermissionDenied,
                )))
            });
        resolver.expect_file_exists().returning(|_| Ok(false));

        let resolved = resolve(&AudioRequest::file_path("/music/a.mp3"), &resolver)
            .await
            .unwrap();
        assert!(matches!(resolved.data_source(), DataSource::LocalFile { .. }));

        for path in ["/nonexistent", "/denied/a.mp3"] {
            let err = resolve(&AudioRequest::file_path(path), &resolver)
                .await
                .unwrap_err();
            assert!(matches!(err, PlaybackError::FilePathInvalid { .. }));
        }
    }
}
