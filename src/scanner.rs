/*!
 * Depth-first tree serialization of the selected paths
 */

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ContentPolicy;
use crate::listing;
use crate::paths;
use crate::types::{DirectoryEntry, SelectionState};

/// Indentation added per tree level
pub const INDENT: &str = "    ";
/// Prefix of every entry below a walk's root
pub const BRANCH: &str = "├── ";

/// Output of one or more root walks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeListing {
    /// Structure lines, in emission order
    pub lines: Vec<String>,
    /// Files whose content must be embedded, sorted
    pub files: BTreeSet<PathBuf>,
}

/// Walks selection roots and builds the combined project structure.
///
/// One serializer is shared by all roots of a generation run so that a path
/// emitted by an earlier root is not emitted again.
pub struct TreeSerializer<'a> {
    policy: &'a ContentPolicy,
    selection: &'a SelectionState,
    base_dir: &'a Path,
    /// Never listed (the artifact being written)
    skip_file: Option<PathBuf>,
    emitted: HashSet<PathBuf>,
    listing: TreeListing,
}

impl<'a> TreeSerializer<'a> {
    /// Create a serializer; relative root lines are computed against `base_dir`
    pub fn new(
        policy: &'a ContentPolicy,
        selection: &'a SelectionState,
        base_dir: &'a Path,
    ) -> Self {
        Self {
            policy,
            selection,
            base_dir,
            skip_file: None,
            emitted: HashSet::new(),
            listing: TreeListing::default(),
        }
    }

    /// Leave `path` out of the tree and the content set
    pub fn skip_file(mut self, path: &Path) -> Self {
        self.skip_file = Some(paths::normalize(path));
        self
    }

    /// Walk every selection root in sorted order
    pub fn serialize_all(mut self) -> TreeListing {
        let selection = self.selection;
        for root in selection.roots() {
            self.serialize_root(root);
        }
        self.finish()
    }

    /// Walk a single root, appending to the combined listing
    pub fn serialize_root(&mut self, root: &Path) {
        let root = paths::normalize(root);
        let metadata = match fs::metadata(&root) {
            Ok(metadata) => metadata,
            Err(e) => {
                log::warn!("Skipping selection root {}: {}", root.display(), e);
                return;
            }
        };
        let is_dir = metadata.is_dir();

        if self.is_filtered_root(&root, is_dir) || self.is_skipped_file(&root) {
            log::debug!("Selection root {} is hidden or ignored", root.display());
            return;
        }
        if !self.selection.is_selected(&root) {
            return;
        }

        if self.emitted.insert(root.clone()) {
            let rel = paths::display_relative(&root, self.base_dir);
            let slash = if is_dir { "/" } else { "" };
            self.listing.lines.push(format!("{rel}{slash}"));
        }

        if is_dir {
            let mut ancestry = Vec::new();
            if let Ok(real) = fs::canonicalize(&root) {
                ancestry.push(real);
            }
            self.walk(&root, 1, &mut ancestry);
        } else {
            self.listing.files.insert(root);
        }
    }

    /// Finish and hand out the combined listing
    pub fn finish(self) -> TreeListing {
        self.listing
    }

    fn walk(&mut self, dir: &Path, depth: usize, ancestry: &mut Vec<PathBuf>) {
        let entries = match listing::read_entries(dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("Skipping unreadable directory {}: {}", dir.display(), e);
                return;
            }
        };

        let indent = INDENT.repeat(depth);
        let (dirs, files): (Vec<DirectoryEntry>, Vec<DirectoryEntry>) =
            entries.into_iter().partition(|entry| entry.is_dir);

        for entry in dirs {
            if self.is_filtered(&entry.name, true) || !self.selection.is_selected(&entry.path) {
                continue;
            }
            if self.emitted.insert(entry.path.clone()) {
                self.listing
                    .lines
                    .push(format!("{indent}{BRANCH}{}/", entry.name));
            }

            let real = match fs::canonicalize(&entry.path) {
                Ok(real) => real,
                Err(e) => {
                    log::debug!("Cannot resolve {}: {}", entry.path.display(), e);
                    continue;
                }
            };
            if ancestry.contains(&real) {
                log::warn!("Not descending into {}: symlink cycle", entry.path.display());
                continue;
            }
            ancestry.push(real);
            self.walk(&entry.path, depth + 1, ancestry);
            ancestry.pop();
        }

        for entry in files {
            if self.is_filtered(&entry.name, false)
                || self.is_skipped_file(&entry.path)
                || !self.selection.is_selected(&entry.path)
            {
                continue;
            }
            if self.emitted.insert(entry.path.clone()) {
                self.listing
                    .lines
                    .push(format!("{indent}{BRANCH}{}", entry.name));
            }
            self.listing.files.insert(entry.path);
        }
    }

    /// Hidden or ignored by name
    fn is_filtered(&self, name: &str, is_dir: bool) -> bool {
        paths::is_hidden(name)
            || if is_dir {
                self.policy.ignores_dir(name)
            } else {
                self.policy.ignores_file(name)
            }
    }

    /// Hidden or ignored by its own name, or by any directory between it and
    /// the nearest enclosing root (`base_dir` when there is none)
    fn is_filtered_root(&self, root: &Path, is_dir: bool) -> bool {
        if self.is_filtered(&paths::file_name(root), is_dir) {
            return true;
        }
        let anchor = root
            .ancestors()
            .skip(1)
            .find(|ancestor| self.selection.roots().contains(*ancestor))
            .unwrap_or(self.base_dir);
        let Some(parent) = root.parent() else {
            return false;
        };
        let Ok(between) = parent.strip_prefix(anchor) else {
            return false;
        };
        between.components().any(|component| {
            self.is_filtered(&component.as_os_str().to_string_lossy(), true)
        })
    }

    fn is_skipped_file(&self, path: &Path) -> bool {
        self.skip_file.as_deref() == Some(path)
    }
}
