/*!
 * Effective selection and the toggle state machine
 *
 * A path is selected when its nearest enclosing root exists and no path
 * strictly between that root and the path (the path itself included) is an
 * explicit exclusion. Roots are always selected.
 */

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::paths;
use crate::types::SelectionState;

/// Observable selection state of a single path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStatus {
    /// The path is itself a selection root
    Root,
    /// Selected through an enclosing root
    Implicit,
    /// Below a root, and the path itself is an explicit exclusion
    Excluded,
    /// Not selected under any root. Covers inert exclusions with no enclosing
    /// root and paths hidden by an excluded ancestor.
    Unselected,
}

impl SelectionStatus {
    /// Whether the path ends up in the generated artifact
    pub fn is_selected(self) -> bool {
        matches!(self, Self::Root | Self::Implicit)
    }
}

/// The transition applied by [`SelectionState::toggle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    /// A root was demoted and dropped from both sets
    RootRemoved,
    /// An implicitly selected path became an exclusion
    Excluded,
    /// An exclusion was lifted
    Reincluded,
    /// An unselected path became a root
    RootAdded,
}

/// Closest ancestor of `path` (inclusive) present in `roots`
pub fn nearest_root<'a>(path: &'a Path, roots: &BTreeSet<PathBuf>) -> Option<&'a Path> {
    path.ancestors().find(|ancestor| roots.contains(*ancestor))
}

/// Effective selection of `path`. Pure: depends only on its three arguments.
pub fn is_selected(path: &Path, roots: &BTreeSet<PathBuf>, exclusions: &BTreeSet<PathBuf>) -> bool {
    let Some(root) = nearest_root(path, roots) else {
        return false;
    };
    if root == path {
        return true;
    }

    !path
        .ancestors()
        .take_while(|ancestor| *ancestor != root)
        .any(|ancestor| exclusions.contains(ancestor))
}

/// Classify `path` into one of the four observable states
pub fn selection_status(path: &Path, state: &SelectionState) -> SelectionStatus {
    if state.roots.contains(path) {
        SelectionStatus::Root
    } else if is_selected(path, &state.roots, &state.exclusions) {
        SelectionStatus::Implicit
    } else if state.exclusions.contains(path) && nearest_root(path, &state.roots).is_some() {
        SelectionStatus::Excluded
    } else {
        SelectionStatus::Unselected
    }
}

/// Pure form of [`SelectionState::toggle`]: returns the updated sets
pub fn toggle(path: &Path, state: &SelectionState) -> SelectionState {
    let mut next = state.clone();
    next.toggle(path);
    next
}

impl SelectionState {
    /// Effective selection of `path` under this state
    pub fn is_selected(&self, path: &Path) -> bool {
        is_selected(path, &self.roots, &self.exclusions)
    }

    /// Observable state of `path`
    pub fn status(&self, path: &Path) -> SelectionStatus {
        selection_status(path, self)
    }

    /// Apply one user toggle to `path`.
    ///
    /// The transition depends on the effective state, not on raw membership.
    /// Demoting a root removes it from both sets and never turns it into an
    /// exclusion under an outer root.
    pub fn toggle(&mut self, path: &Path) -> Toggled {
        let path = paths::normalize(path);

        match selection_status(&path, self) {
            SelectionStatus::Root => {
                self.roots.remove(&path);
                self.exclusions.remove(&path);
                Toggled::RootRemoved
            }
            SelectionStatus::Implicit => {
                self.exclusions.insert(path);
                Toggled::Excluded
            }
            SelectionStatus::Excluded => {
                self.exclusions.remove(&path);
                Toggled::Reincluded
            }
            SelectionStatus::Unselected => {
                self.exclusions.remove(&path);
                self.roots.insert(path);
                Toggled::RootAdded
            }
        }
    }

    /// Make `path` selected if it is not, through [`SelectionState::toggle`].
    /// Returns `None` when it already was.
    pub fn select(&mut self, path: &Path) -> Option<Toggled> {
        let path = paths::normalize(path);
        match selection_status(&path, self) {
            SelectionStatus::Root | SelectionStatus::Implicit => None,
            SelectionStatus::Excluded | SelectionStatus::Unselected => Some(self.toggle(&path)),
        }
    }

    /// Exclude an implicitly selected `path`. Returns `None` when the path is
    /// not below a root, or is a root itself.
    pub fn exclude(&mut self, path: &Path) -> Option<Toggled> {
        let path = paths::normalize(path);
        match selection_status(&path, self) {
            SelectionStatus::Implicit => Some(self.toggle(&path)),
            _ => None,
        }
    }
}
