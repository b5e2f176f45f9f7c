//! Mapping of a pushed repository name onto a checkout below the parent directory

use std::path::{Component, Path, PathBuf};

use crate::error::{HookError, Result};

/// ASCII letters, digits, `.`, `-` and `_`.
pub fn is_allowed_char(chr: char) -> bool {
    chr.is_ascii_alphanumeric() || matches!(chr, '.' | '-' | '_')
}

/// Returns true if `name` may be used as a folder name.
pub fn is_valid_repository_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_allowed_char) && !name.contains("..")
}

/// Folder name for a repository: `name` plus `suffix`, unless already suffixed.
pub fn folder_name(name: &str, suffix: &str) -> String {
    if name.ends_with(suffix) {
        name.to_string()
    } else {
        format!("{}{}", name, suffix)
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Compute the working copy directory for `name`.
///
/// The result is always a strict descendant of `parent`; anything else is
/// reported as [`HookError::UnsafeRepositoryName`].
pub fn resolve_target_directory(name: &str, parent: &Path, suffix: &str) -> Result<PathBuf> {
    if !is_valid_repository_name(name) {
        return Err(HookError::UnsafeRepositoryName(name.to_string()));
    }

    let folder = folder_name(name, suffix);
    let parent = normalize_lexically(parent);
    let workdir = normalize_lexically(&parent.join(&folder));

    if !workdir.starts_with(&parent) || workdir == parent {
        return Err(HookError::UnsafeRepositoryName(format!(
            "{} resolves to {}",
            name,
            workdir.display()
        )));
    }

    Ok(workdir)
}
