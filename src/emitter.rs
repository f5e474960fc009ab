/*!
 * File content embedding
 *
 * Every file becomes one block with a start marker and an end marker that
 * names the outcome, so the artifact can be split back into files later.
 */

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;

use crate::config::ContentPolicy;
use crate::error::FsErrorKind;
use crate::paths;
use crate::utils::format_file_size;

/// Why a file's content was left out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The extension is on the ignore list
    IgnoredType,
    /// The file is larger than the configured maximum
    TooLarge { size: u64 },
}

/// Result of embedding one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Content embedded
    Included,
    /// Zero-length file
    Empty,
    /// Content deliberately left out
    Skipped(SkipReason),
    /// The file could not be read
    Error(FsErrorKind),
}

impl Outcome {
    /// Suffix of the end marker
    fn marker_suffix(&self) -> &'static str {
        match self {
            Self::Included => "",
            Self::Empty => " (EMPTY)",
            Self::Skipped(_) => " (SKIPPED)",
            Self::Error(_) => " (ERROR)",
        }
    }

    /// Short label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Included => "included",
            Self::Empty => "empty",
            Self::Skipped(SkipReason::IgnoredType) => "skipped (type)",
            Self::Skipped(SkipReason::TooLarge { .. }) => "skipped (size)",
            Self::Error(_) => "error",
        }
    }
}

/// One formatted file block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlock {
    /// Absolute path of the file
    pub path: PathBuf,
    /// Path as shown in the artifact
    pub relative: String,
    /// What happened to the file
    pub outcome: Outcome,
    /// Block body: the content, or a one-line marker
    pub body: String,
    /// Invalid UTF-8 was replaced while decoding
    pub lossy: bool,
}

impl FileBlock {
    /// Whether the file counts as included in the artifact
    pub fn is_included(&self) -> bool {
        matches!(self.outcome, Outcome::Included | Outcome::Empty)
    }

    /// Append the block, markers included, to `out`
    pub fn render_into(&self, out: &mut String) {
        let _ = write!(out, "\n--- File: {} ---\n", self.relative);
        out.push_str(&self.body);
        let _ = write!(
            out,
            "\n--- END OF {}{} ---\n",
            self.relative,
            self.outcome.marker_suffix()
        );
    }
}

/// Reads and formats file contents under a [`ContentPolicy`]
pub struct ContentEmitter<'a> {
    policy: &'a ContentPolicy,
    base_dir: &'a Path,
    progress: ProgressBar,
}

impl<'a> ContentEmitter<'a> {
    /// Create an emitter; block paths are shown relative to `base_dir`
    pub fn new(policy: &'a ContentPolicy, base_dir: &'a Path, progress: ProgressBar) -> Self {
        Self {
            policy,
            base_dir,
            progress,
        }
    }

    /// One block per file, in sorted path order
    pub fn emit_all(&self, files: &BTreeSet<PathBuf>) -> Vec<FileBlock> {
        self.progress.set_length(files.len() as u64);
        files.iter().map(|path| self.emit_file(path)).collect()
    }

    /// Build the block for a single file. Never fails: read errors become an
    /// error block.
    pub fn emit_file(&self, path: &Path) -> FileBlock {
        self.progress.inc(1);
        self.progress
            .set_message(format!("Current file: {}", paths::file_name(path)));

        let relative = paths::display_relative(path, self.base_dir);
        let (outcome, body, lossy) = match self.read_block(path) {
            Ok(parts) => parts,
            Err(e) => {
                log::warn!("Error reading file {}: {}", path.display(), e);
                (
                    Outcome::Error(FsErrorKind::of(&e)),
                    format!("Error reading file {}: {}", relative, e),
                    false,
                )
            }
        };

        FileBlock {
            path: path.to_path_buf(),
            relative,
            outcome,
            body,
            lossy,
        }
    }

    fn read_block(&self, path: &Path) -> io::Result<(Outcome, String, bool)> {
        if self.policy.ignores_extension(path) {
            return Ok((
                Outcome::Skipped(SkipReason::IgnoredType),
                "(Skipped – ignored file type)".to_string(),
                false,
            ));
        }

        let size = fs::metadata(path)?.len();
        if size > self.policy.max_file_size_bytes {
            let body = format!(
                "Content skipped: File size ({}) exceeds the configured maximum ({}).",
                format_file_size(size),
                format_file_size(self.policy.max_file_size_bytes)
            );
            return Ok((Outcome::Skipped(SkipReason::TooLarge { size }), body, false));
        }
        if size == 0 {
            return Ok((Outcome::Empty, "(This file is empty)".to_string(), false));
        }

        let (content, lossy) = read_lossy(path)?;
        if lossy {
            log::debug!("Replaced invalid UTF-8 in {}", path.display());
        }
        Ok((Outcome::Included, content, lossy))
    }
}

/// Read a whole file, replacing invalid UTF-8 sequences
fn read_lossy(path: &Path) -> io::Result<(String, bool)> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok((text, false)),
        Err(e) => Ok((String::from_utf8_lossy(e.as_bytes()).into_owned(), true)),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::tempdir;

    use super::*;

    fn write_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(bytes)
    }

    fn emitter(policy: &ContentPolicy, base: &Path) -> Vec<FileBlock> {
        let files: BTreeSet<PathBuf> = fs::read_dir(base)
            .expect("read_dir")
            .map(|e| paths::normalize(&e.expect("entry").path()))
            .collect();
        ContentEmitter::new(policy, base, ProgressBar::hidden()).emit_all(&files)
    }

    #[test]
    fn test_outcomes_and_markers() -> io::Result<()> {
        let temp = tempdir()?;
        let base = paths::normalize(temp.path());
        write_file(&base.join("a_main.rs"), b"fn main() {}\n")?;
        write_file(&base.join("b_empty.txt"), b"")?;
        write_file(&base.join("c_big.txt"), &[b'x'; 64])?;
        write_file(&base.join("d_logo.png"), b"\x89PNG")?;

        let mut policy = ContentPolicy::permissive(32);
        policy.ignore_extensions = vec![".png".to_string()];
        let blocks = emitter(&policy, &base);

        let outcomes: Vec<&Outcome> = blocks.iter().map(|b| &b.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                &Outcome::Included,
                &Outcome::Empty,
                &Outcome::Skipped(SkipReason::TooLarge { size: 64 }),
                &Outcome::Skipped(SkipReason::IgnoredType),
            ]
        );
        assert_eq!(blocks.iter().filter(|b| b.is_included()).count(), 2);

        let mut text = String::new();
        for block in &blocks {
            block.render_into(&mut text);
        }
        assert!(text.contains(
            "\n--- File: a_main.rs ---\nfn main() {}\n\n--- END OF a_main.rs ---\n"
        ));
        assert!(text.contains(
            "\n--- File: b_empty.txt ---\n(This file is empty)\n--- END OF b_empty.txt (EMPTY) ---\n"
        ));
        assert!(text.contains("exceeds the configured maximum (32 bytes)."));
        assert!(text.contains("--- END OF c_big.txt (SKIPPED) ---"));
        assert!(text.contains(
            "(Skipped – ignored file type)\n--- END OF d_logo.png (SKIPPED) ---"
        ));
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_is_replaced() -> io::Result<()> {
        let temp = tempdir()?;
        let base = paths::normalize(temp.path());
        write_file(&base.join("latin1.txt"), b"caf\xe9 ok")?;

        let blocks = emitter(&ContentPolicy::permissive(1024), &base);
        assert_eq!(blocks[0].outcome, Outcome::Included);
        assert!(blocks[0].lossy);
        assert_eq!(blocks[0].body, "caf\u{FFFD} ok");
        Ok(())
    }

    #[test]
    fn test_vanished_file_becomes_error_block() -> io::Result<()> {
        let temp = tempdir()?;
        let base = paths::normalize(temp.path());
        let gone = base.join("gone.txt");

        let policy = ContentPolicy::permissive(1024);
        let emitter = ContentEmitter::new(&policy, &base, ProgressBar::hidden());
        let block = emitter.emit_file(&gone);

        assert_eq!(block.outcome, Outcome::Error(FsErrorKind::NotFound));
        assert!(!block.is_included());
        assert!(block.body.starts_with("Error reading file gone.txt: "));

        let mut text = String::new();
        block.render_into(&mut text);
        assert!(text.ends_with("--- END OF gone.txt (ERROR) ---\n"));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_becomes_error_block() -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir()?;
        let base = paths::normalize(temp.path());
        let locked = base.join("locked.txt");
        write_file(&locked, b"secret\n")?;
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;

        // Mode bits are not enforced for the superuser
        if File::open(&locked).is_ok() {
            return Ok(());
        }

        let policy = ContentPolicy::permissive(1024);
        let emitter = ContentEmitter::new(&policy, &base, ProgressBar::hidden());
        let block = emitter.emit_file(&locked);

        assert_eq!(block.outcome, Outcome::Error(FsErrorKind::PermissionDenied));
        assert!(block.body.starts_with("Error reading file locked.txt: "));

        let mut text = String::new();
        block.render_into(&mut text);
        assert!(text.ends_with("--- END OF locked.txt (ERROR) ---\n"));
        Ok(())
    }
}
