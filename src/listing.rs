/*!
 * One-level directory listing
 */

use std::cmp::Ordering;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{PromptGenError, Result};
use crate::paths;
use crate::types::DirectoryEntry;

/// Directories first, then files; each group by case-insensitive name, exact
/// name as the tie-break.
pub fn entry_order(a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
    b.is_dir
        .cmp(&a.is_dir)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}

/// Read the immediate children of `dir`, unfiltered and sorted by [`entry_order`].
///
/// Fails only when `dir` itself cannot be read; unreadable individual entries
/// are dropped.
pub fn read_entries(dir: &Path) -> io::Result<Vec<DirectoryEntry>> {
    let mut entries = Vec::new();

    for item in WalkDir::new(dir).min_depth(0).max_depth(1) {
        let entry = match item {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(io::Error::from(e)),
            Err(e) => {
                log::debug!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        let path = paths::normalize(entry.path());
        // Follows symlinks so a linked directory lists as a directory
        let is_dir = entry.file_type().is_dir() || path.is_dir();
        entries.push(DirectoryEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
            path,
        });
    }

    entries.sort_by(entry_order);
    Ok(entries)
}

/// List `dir` for the browser: hidden entries removed, directories first.
pub fn list_directory(dir: &Path) -> Result<Vec<DirectoryEntry>> {
    let mut entries = read_entries(dir).map_err(|e| PromptGenError::listing(dir, e))?;
    entries.retain(|entry| !paths::is_hidden(&entry.name));
    Ok(entries)
}
