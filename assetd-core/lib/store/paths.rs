//! Helpers for code that writes into the static root or links to it.
//!
//! Upload handlers store asset locations as `static/<category>/<file>` (sometimes with a
//! leading slash, sometimes as a full URL). These helpers turn such values back into the
//! relative path the store understands and into public URLs.

use std::path::PathBuf;

use assetd_utils::{PUBLIC_PREFIX, STATIC_SEGMENT};
use tokio::fs;

use crate::{store::AssetStore, AssetdError, AssetdResult};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Extracts the path relative to the static root from a stored asset location.
///
/// Accepts `static/a/b.png`, `/static/a/b.png`, `a/b.png` and
/// `https://host/static/a/b.png`. Returns `None` when nothing is left.
pub fn normalize_static_subpath(stored: &str) -> Option<String> {
    let mut path = stored.trim();

    if let Some((_, rest)) = path.split_once("://") {
        path = rest.find('/').map(|i| &rest[i..]).unwrap_or("");
    }

    let path = path.split(['?', '#']).next().unwrap_or("");
    let path = path.trim_start_matches('/');
    let path = match path.strip_prefix(STATIC_SEGMENT) {
        Some("") => "",
        Some(rest) if rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => path,
    };

    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

/// Builds the public URL of a stored asset location.
///
/// Each segment is percent-encoded; the separators are kept.
///
/// ## Examples
///
/// ```
/// use assetd_core::store::paths::public_url;
///
/// assert_eq!(
///     public_url("http://localhost:8000/", "static/News/images/a b.jpg").as_deref(),
///     Some("http://localhost:8000/static/News/images/a%20b.jpg")
/// );
/// assert_eq!(public_url("http://localhost:8000", ""), None);
/// ```
pub fn public_url(base_url: &str, stored: &str) -> Option<String> {
    let relative = normalize_static_subpath(stored)?;
    let encoded = relative
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");

    Some(format!(
        "{}{}/{}",
        base_url.trim_end_matches('/'),
        PUBLIC_PREFIX,
        encoded
    ))
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl AssetStore {
    /// Returns the absolute directory for a category such as `["Products", "images"]`.
    ///
    /// When `ensure` is set the directory is created if missing. Existing content is never
    /// touched.
    pub async fn category_dir(&self, category: &[&str], ensure: bool) -> AssetdResult<PathBuf> {
        let mut dir = self.root().to_path_buf();
        for segment in category {
            validate_segment(segment)?;
            dir.push(segment);
        }

        if ensure {
            fs::create_dir_all(&dir).await?;
        }

        Ok(dir)
    }

    /// Returns where an upload named `filename` in `category` should be written, and the
    /// location string to store for it (`static/<category>/<filename>`).
    pub async fn file_paths(
        &self,
        filename: &str,
        category: &[&str],
    ) -> AssetdResult<(PathBuf, String)> {
        validate_segment(filename)?;
        let dir = self.category_dir(category, true).await?;

        let mut stored = vec![STATIC_SEGMENT];
        stored.extend_from_slice(category);
        stored.push(filename);

        Ok((dir.join(filename), stored.join("/")))
    }
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn validate_segment(segment: &str) -> AssetdResult<()> {
    if segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\', '\0'])
    {
        return Err(AssetdError::InvalidArgument(format!(
            "invalid static path segment: {:?}",
            segment
        )));
    }

    Ok(())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_normalize_static_subpath() {
        let cases = [
            ("static/profile_images/29.png", Some("profile_images/29.png")),
            ("/static/profile_images/29.png", Some("profile_images/29.png")),
            ("profile_images/29.png", Some("profile_images/29.png")),
            (
                "https://api.example.com/static/videos/x.png?v=2",
                Some("videos/x.png"),
            ),
            ("staticfiles/x.png", Some("staticfiles/x.png")),
            ("static", None),
            ("/static/", None),
            ("", None),
            ("  ", None),
        ];

        for (stored, expected) in cases {
            assert_eq!(
                normalize_static_subpath(stored).as_deref(),
                expected,
                "stored value {stored:?}"
            );
        }
    }

    #[test]
    fn test_public_url_encodes_segments() {
        assert_eq!(
            public_url("http://host", "/static/manual_guides/guide v1.pdf").as_deref(),
            Some("http://host/static/manual_guides/guide%20v1.pdf")
        );
        assert_eq!(
            public_url("http://host/", "profile_images/29.png").as_deref(),
            Some("http://host/static/profile_images/29.png")
        );
    }

    #[tokio::test]
    async fn test_file_paths_creates_category_and_preserves_content() {
        let dir = TempDir::new().unwrap();
        let store = AssetStore::new(dir.path());

        std::fs::create_dir_all(store.root().join("videos")).unwrap();
        std::fs::write(store.root().join("videos/old.png"), b"old").unwrap();

        let (absolute, stored) = store.file_paths("new.png", &["videos"]).await.unwrap();
        assert_eq!(absolute, store.root().join("videos/new.png"));
        assert_eq!(stored, "static/videos/new.png");
        assert_eq!(
            std::fs::read(store.root().join("videos/old.png")).unwrap(),
            b"old"
        );

        let (absolute, stored) = store
            .file_paths("cover.jpg", &["Products", "images"])
            .await
            .unwrap();
        assert!(absolute.parent().unwrap().is_dir());
        assert_eq!(stored, "static/Products/images/cover.jpg");
    }

    #[tokio::test]
    async fn test_file_paths_rejects_escaping_segments() {
        let dir = TempDir::new().unwrap();
        let store = AssetStore::new(dir.path());

        assert!(store.file_paths("../x.png", &["videos"]).await.is_err());
        assert!(store.file_paths("x.png", &[".."]).await.is_err());
        assert!(store.category_dir(&["a/b"], false).await.is_err());
        assert!(store.category_dir(&[""], false).await.is_err());
    }
}
