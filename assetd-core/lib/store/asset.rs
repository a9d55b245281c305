use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use assetd_utils::{
    has_parent_segment, normalize_path, SupportedPathType, DEFAULT_CONTENT_TYPE,
};
use tokio::fs::{self, File};
use tokio_util::io::ReaderStream;

use crate::{
    config::Config,
    store::{StoreError, StoreResult},
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A read-only view of the static root.
///
/// Cloning is cheap. The store holds no mutable state, so clones can serve requests
/// concurrently without coordination.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: Arc<PathBuf>,
}

/// An asset opened for reading.
#[derive(Debug)]
pub struct Asset {
    relative_path: String,
    content_type: &'static str,
    len: u64,
    file: File,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl AssetStore {
    /// Creates a store rooted at `root`.
    ///
    /// The root is canonicalized so containment checks compare like with like. A root that
    /// cannot be canonicalized is kept as given and every lookup under it fails.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = match std::fs::canonicalize(&root) {
            Ok(canonical) => canonical,
            Err(e) => {
                tracing::warn!(
                    root = %root.display(),
                    "static root cannot be canonicalized, assets will not be served: {}",
                    e
                );
                root
            }
        };
        Self {
            root: Arc::new(root),
        }
    }

    /// Creates a store rooted at the configured static root.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.get_static_root().clone())
    }

    /// The static root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Opens the asset at `relative_path`.
    ///
    /// `relative_path` is untrusted input. Any `..` segment is refused with
    /// [`StoreError::Forbidden`] before touching the filesystem, and the resolved path
    /// (symlinks included) must still lie under the root.
    pub async fn get(&self, relative_path: &str) -> StoreResult<Asset> {
        if relative_path.is_empty() {
            return Err(StoreError::NotFound(String::new()));
        }

        if relative_path.starts_with('/')
            || relative_path.contains('\\')
            || relative_path.contains('\0')
            || has_parent_segment(relative_path)
        {
            tracing::warn!(
                path = %relative_path.escape_debug(),
                "refused asset path outside the static root"
            );
            return Err(StoreError::Forbidden(relative_path.to_string()));
        }

        let normalized = normalize_path(relative_path, SupportedPathType::Relative)
            .map_err(|_| StoreError::Forbidden(relative_path.to_string()))?;
        if normalized.is_empty() {
            return Err(StoreError::NotFound(relative_path.to_string()));
        }

        let resolved = fs::canonicalize(self.root.join(&normalized))
            .await
            .map_err(|e| StoreError::from_io(&normalized, e))?;

        if !resolved.starts_with(self.root.as_path()) {
            tracing::warn!(path = %normalized, "refused asset resolving outside the static root");
            return Err(StoreError::Forbidden(normalized));
        }

        let metadata = fs::metadata(&resolved)
            .await
            .map_err(|e| StoreError::from_io(&normalized, e))?;
        if !metadata.is_file() {
            return Err(StoreError::NotFound(normalized));
        }

        let file = File::open(&resolved)
            .await
            .map_err(|e| StoreError::from_io(&normalized, e))?;

        tracing::debug!(path = %normalized, len = metadata.len(), "opened asset");

        Ok(Asset {
            content_type: content_type_for(&resolved),
            len: metadata.len(),
            relative_path: normalized,
            file,
        })
    }
}

impl Asset {
    /// The normalized path of the asset relative to the static root.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// The content type inferred from the file extension.
    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// The size of the asset in bytes, as of when it was opened.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the asset is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Turns the asset into a stream of chunks. Dropping the stream closes the file.
    pub fn into_stream(self) -> ReaderStream<File> {
        ReaderStream::new(self.file)
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Returns the content type for a path based on its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use tempfile::TempDir;

    use super::*;

    async fn read_all(asset: Asset) -> Vec<u8> {
        let mut stream = asset.into_stream();
        let mut bytes = Vec::new();
        while let Some(chunk) = stream.next().await {
            bytes.extend_from_slice(&chunk.unwrap());
        }
        bytes
    }

    fn fixture() -> (TempDir, AssetStore) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("static");
        std::fs::create_dir_all(root.join("profile_images")).unwrap();
        std::fs::create_dir_all(root.join("News/images")).unwrap();

        let png: Vec<u8> = (0..10240u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(root.join("profile_images/29.png"), &png).unwrap();
        std::fs::write(root.join("News/images/a b.jpg"), b"jpeg").unwrap();
        std::fs::write(root.join("notes.unknownext"), b"opaque").unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"outside").unwrap();

        let store = AssetStore::new(&root);
        (dir, store)
    }

    #[tokio::test]
    async fn test_get_returns_exact_bytes_and_content_type() {
        let (dir, store) = fixture();
        let expected = std::fs::read(dir.path().join("static/profile_images/29.png")).unwrap();

        let asset = store.get("profile_images/29.png").await.unwrap();
        assert_eq!(asset.content_type(), "image/png");
        assert_eq!(asset.len(), 10240);
        assert_eq!(asset.relative_path(), "profile_images/29.png");
        assert_eq!(read_all(asset).await, expected);

        let asset = store.get("News/images/a b.jpg").await.unwrap();
        assert_eq!(asset.content_type(), "image/jpeg");
        assert_eq!(read_all(asset).await, b"jpeg");
    }

    #[tokio::test]
    async fn test_get_defaults_unknown_extension_to_octet_stream() {
        let (_dir, store) = fixture();
        let asset = store.get("notes.unknownext").await.unwrap();
        assert_eq!(asset.content_type(), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_get_normalizes_redundant_segments() {
        let (_dir, store) = fixture();
        let asset = store.get("profile_images//./29.png").await.unwrap();
        assert_eq!(asset.relative_path(), "profile_images/29.png");
    }

    #[tokio::test]
    async fn test_get_is_idempotent() {
        let (_dir, store) = fixture();
        let first = read_all(store.get("profile_images/29.png").await.unwrap()).await;
        for _ in 0..5 {
            let again = read_all(store.get("profile_images/29.png").await.unwrap()).await;
            assert_eq!(again, first);
        }
    }

    #[tokio::test]
    async fn test_get_forbids_traversal_even_when_target_exists() {
        let (_dir, store) = fixture();
        for path in [
            "../secret.txt",
            "../../etc/passwd",
            "profile_images/../../secret.txt",
            "profile_images/../29.png",
            "..",
            "/etc/passwd",
            "..\\secret.txt",
            "profile_images/29.png\0",
        ] {
            assert!(
                matches!(store.get(path).await, Err(StoreError::Forbidden(_))),
                "{path:?} should be forbidden"
            );
        }
    }

    #[tokio::test]
    async fn test_get_forbids_symlink_escaping_root() {
        let (dir, store) = fixture();
        std::os::unix::fs::symlink(
            dir.path().join("secret.txt"),
            dir.path().join("static/link.txt"),
        )
        .unwrap();

        assert!(matches!(
            store.get("link.txt").await,
            Err(StoreError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_get_follows_symlink_inside_root() {
        let (dir, store) = fixture();
        std::os::unix::fs::symlink(
            dir.path().join("static/profile_images/29.png"),
            dir.path().join("static/avatar.png"),
        )
        .unwrap();

        let asset = store.get("avatar.png").await.unwrap();
        assert_eq!(asset.len(), 10240);
    }

    #[tokio::test]
    async fn test_missing_root_serves_nothing() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("static");
        let store = AssetStore::new(&missing);
        assert_eq!(store.root(), missing.as_path());

        std::fs::write(dir.path().join("secret.txt"), b"outside").unwrap();
        assert!(matches!(
            store.get("29.png").await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.get("../secret.txt").await,
            Err(StoreError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (_dir, store) = fixture();
        for path in [
            "",
            "profile_images/30.png",
            "missing/dir/file.png",
            "profile_images",
            "profile_images/29.png/child",
            ".",
        ] {
            assert!(
                matches!(store.get(path).await, Err(StoreError::NotFound(_))),
                "{path:?} should be not found"
            );
        }
    }
}
