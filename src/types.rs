/*!
 * Core types and data structures for promptgen
 */

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::paths;

/// One entry produced by listing a directory; never persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Entry name (last path component)
    pub name: String,
    /// Whether the entry is a directory (symlinks are classified by their target)
    pub is_dir: bool,
    /// Full canonical path
    pub path: PathBuf,
}

/// The user's selection intent: explicit roots plus explicit exclusions.
///
/// Both sets only ever hold canonical paths (see [`paths::normalize`]). The
/// effective selection of any path is derived from them by
/// [`crate::selection::is_selected`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub(crate) roots: BTreeSet<PathBuf>,
    pub(crate) exclusions: BTreeSet<PathBuf>,
}

impl SelectionState {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from raw sets, canonicalizing every path
    pub fn from_sets<R, E>(roots: R, exclusions: E) -> Self
    where
        R: IntoIterator,
        R::Item: AsRef<Path>,
        E: IntoIterator,
        E::Item: AsRef<Path>,
    {
        Self {
            roots: roots
                .into_iter()
                .map(|p| paths::normalize(p.as_ref()))
                .collect(),
            exclusions: exclusions
                .into_iter()
                .map(|p| paths::normalize(p.as_ref()))
                .collect(),
        }
    }

    /// Selection roots, sorted
    pub fn roots(&self) -> &BTreeSet<PathBuf> {
        &self.roots
    }

    /// Explicit exclusions, sorted
    pub fn exclusions(&self) -> &BTreeSet<PathBuf> {
        &self.exclusions
    }

    /// True when nothing has been selected
    pub fn has_roots(&self) -> bool {
        !self.roots.is_empty()
    }
}
