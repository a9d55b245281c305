//! Utility functions for working with slash-separated paths.

use typed_path::{Utf8UnixComponent, Utf8UnixPath};

use crate::{AssetdUtilsError, AssetdUtilsResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The kind of path a caller expects to get back from [`normalize_path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedPathType {
    /// The path may be absolute or relative.
    Any,

    /// The path must be absolute.
    Absolute,

    /// The path must be relative.
    Relative,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Normalizes a slash-separated path.
///
/// Collapses repeated separators and `.` segments and resolves `..` against earlier segments.
/// A `..` that would climb above the start of the path is an error, as is a path whose kind
/// does not match `path_type`.
///
/// ## Examples
///
/// ```
/// use assetd_utils::{normalize_path, SupportedPathType};
///
/// assert_eq!(
///     normalize_path("profile_images//./29.png", SupportedPathType::Relative).unwrap(),
///     "profile_images/29.png"
/// );
/// assert!(normalize_path("../etc/passwd", SupportedPathType::Relative).is_err());
/// ```
pub fn normalize_path(path: &str, path_type: SupportedPathType) -> AssetdUtilsResult<String> {
    if path.is_empty() {
        return Err(AssetdUtilsError::PathValidation(
            "path cannot be empty".to_string(),
        ));
    }

    let is_absolute = path.starts_with('/');
    match (path_type, is_absolute) {
        (SupportedPathType::Absolute, false) => {
            return Err(AssetdUtilsError::PathValidation(format!(
                "path must be absolute: {path}"
            )));
        }
        (SupportedPathType::Relative, true) => {
            return Err(AssetdUtilsError::PathValidation(format!(
                "path must be relative: {path}"
            )));
        }
        _ => {}
    }

    let mut normalized: Vec<&str> = Vec::new();
    for component in Utf8UnixPath::new(path).components() {
        match component {
            Utf8UnixComponent::RootDir | Utf8UnixComponent::CurDir => {}
            Utf8UnixComponent::ParentDir => {
                if normalized.pop().is_none() {
                    return Err(AssetdUtilsError::PathValidation(format!(
                        "path cannot traverse above its root: {path}"
                    )));
                }
            }
            Utf8UnixComponent::Normal(segment) => {
                if !segment.is_empty() {
                    normalized.push(segment);
                }
            }
        }
    }

    let joined = normalized.join("/");
    if is_absolute {
        Ok(format!("/{joined}"))
    } else {
        Ok(joined)
    }
}

/// Returns true if any segment of the path is `..`.
///
/// This is stricter than [`normalize_path`]: `a/../b` stays inside its root but still
/// counts as a traversal attempt.
pub fn has_parent_segment(path: &str) -> bool {
    Utf8UnixPath::new(path)
        .components()
        .any(|component| matches!(component, Utf8UnixComponent::ParentDir))
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
