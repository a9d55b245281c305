use std::{
    collections::BTreeMap,
    fs::File,
    io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::AssetdResult;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Size and digest of one file in a mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Size in bytes.
    pub size: u64,

    /// Hex encoded SHA-256 of the content.
    pub sha256: String,
}

/// The regular files under a directory, keyed by their slash-separated relative path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountManifest {
    entries: BTreeMap<String, ManifestEntry>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl MountManifest {
    /// Walks `root` and digests every regular file under it. Symlinks are not followed.
    pub async fn capture(root: impl Into<PathBuf>) -> AssetdResult<Self> {
        let root = root.into();
        tokio::task::spawn_blocking(move || Self::capture_blocking(&root))
            .await
            .map_err(io::Error::other)?
    }

    /// Returns the relative paths that were captured but are now missing or different.
    ///
    /// Files added since the capture are not reported.
    pub async fn verify(&self, root: impl Into<PathBuf>) -> AssetdResult<Vec<String>> {
        let current = Self::capture(root).await?;
        Ok(self
            .entries
            .iter()
            .filter(|(path, entry)| current.entries.get(*path) != Some(*entry))
            .map(|(path, _)| path.clone())
            .collect())
    }

    /// The captured entries.
    pub fn entries(&self) -> &BTreeMap<String, ManifestEntry> {
        &self.entries
    }

    /// Number of files captured.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no files were captured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn capture_blocking(root: &Path) -> AssetdResult<Self> {
        let mut entries = BTreeMap::new();
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(root)
                .map_err(io::Error::other)?
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let mut hasher = Sha256::new();
            let size = io::copy(&mut File::open(entry.path())?, &mut hasher)?;
            entries.insert(
                relative,
                ManifestEntry {
                    size,
                    sha256: hex::encode(hasher.finalize()),
                },
            );
        }

        Ok(Self { entries })
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_capture_and_verify() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("profile_images")).unwrap();
        std::fs::write(dir.path().join("profile_images/29.png"), b"png").unwrap();
        std::fs::write(dir.path().join("faq.pdf"), b"pdf").unwrap();

        let manifest = MountManifest::capture(dir.path()).await.unwrap();
        assert_eq!(manifest.len(), 2);
        let entry = &manifest.entries()["profile_images/29.png"];
        assert_eq!(entry.size, 3);
        assert_eq!(entry.sha256.len(), 64);

        std::fs::write(dir.path().join("new.png"), b"new").unwrap();
        assert!(manifest.verify(dir.path()).await.unwrap().is_empty());

        std::fs::write(dir.path().join("faq.pdf"), b"changed").unwrap();
        std::fs::remove_file(dir.path().join("profile_images/29.png")).unwrap();
        assert_eq!(
            manifest.verify(dir.path()).await.unwrap(),
            vec!["faq.pdf".to_string(), "profile_images/29.png".to_string()]
        );
    }

    #[tokio::test]
    async fn test_capture_missing_root_fails() {
        let dir = TempDir::new().unwrap();
        assert!(MountManifest::capture(dir.path().join("missing"))
            .await
            .is_err());
    }
}
