/*!
 * Path canonicalization and display helpers
 */

use std::path::{Path, PathBuf};

use path_absolutize::Absolutize;

/// Marker that hides an entry from listings and tree walks
pub const HIDDEN_MARKER: char = '.';

/// Canonical form used for every set operation: absolute, `.`/`..` resolved
/// lexically, no trailing separator, symlinks left as they are.
pub fn normalize(path: &Path) -> PathBuf {
    match path.absolutize() {
        Ok(abs) => abs.into_owned(),
        Err(e) => {
            log::debug!("Could not absolutize {}: {}", path.display(), e);
            path.components().collect()
        }
    }
}

/// Canonical form of `path`, resolving relative input against `base` instead of
/// the process working directory.
pub fn normalize_from(path: &Path, base: &Path) -> PathBuf {
    match path.absolutize_from(base) {
        Ok(abs) => abs.into_owned(),
        Err(_) => normalize(&base.join(path)),
    }
}

/// Render `path` relative to `base` for the artifact; `base` itself is `.`
pub fn display_relative(path: &Path, base: &Path) -> String {
    match pathdiff::diff_paths(path, base) {
        Some(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Some(rel) => rel.display().to_string(),
        None => path.display().to_string(),
    }
}

/// Final component of `path` as text (empty for a filesystem root)
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Whether an entry name is hidden on this host
pub fn is_hidden(name: &str) -> bool {
    name.starts_with(HIDDEN_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_resolves_dots_and_trailing_separators() {
        assert_eq!(
            normalize(Path::new("/proj/src/../build/./out/")),
            PathBuf::from("/proj/build/out")
        );
    }

    #[test]
    fn test_normalize_from_uses_base_for_relative_input() {
        assert_eq!(
            normalize_from(Path::new("src/lib.rs"), Path::new("/proj")),
            PathBuf::from("/proj/src/lib.rs")
        );
        assert_eq!(
            normalize_from(Path::new("/abs/file"), Path::new("/proj")),
            PathBuf::from("/abs/file")
        );
    }

    #[test]
    fn test_display_relative() {
        let base = Path::new("/proj");
        assert_eq!(display_relative(Path::new("/proj"), base), ".");
        assert_eq!(display_relative(Path::new("/proj/src/main.rs"), base), "src/main.rs");
        assert_eq!(display_relative(Path::new("/other/x"), base), "../other/x");
    }

    #[test]
    fn test_hidden_names() {
        assert!(is_hidden(".git"));
        assert!(!is_hidden("src"));
        assert_eq!(file_name(Path::new("/")), "");
    }
}
