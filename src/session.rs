/*!
 * Browser session state
 *
 * Holds everything the interactive browser shows and changes, independent of
 * how it is drawn or how keys are read.
 */

use std::path::{Path, PathBuf};

use crate::keymap::Action;
use crate::listing;
use crate::paths;
use crate::types::{DirectoryEntry, SelectionState};
use crate::writer::ArtifactWriter;

/// Shown while a generation request runs
pub const GENERATING_MESSAGE: &str = "Generating output... please wait.";
/// Shown when generation is requested with nothing selected
pub const NO_ROOTS_MESSAGE: &str = "No selection roots. Use 'Select' key to mark items.";

/// Whether the browser keeps running after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// State of one interactive browsing session
pub struct Session {
    current_dir: PathBuf,
    entries: Vec<DirectoryEntry>,
    cursor: usize,
    selection: SelectionState,
    writer: ArtifactWriter,
    /// Replaces the default status line until the next action
    status: Option<String>,
    /// Last listing failure, cleared on the next action
    error: Option<String>,
}

impl Session {
    /// Start browsing at `initial`
    pub fn new(initial: &Path, writer: ArtifactWriter) -> Self {
        let mut session = Self {
            current_dir: paths::normalize(initial),
            entries: Vec::new(),
            cursor: 0,
            selection: SelectionState::new(),
            writer,
            status: None,
            error: None,
        };
        session.relist();
        session
    }

    /// Directory being shown
    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    /// Entries of the current directory
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Index of the highlighted entry
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Highlighted entry, if the listing is not empty
    pub fn current_entry(&self) -> Option<&DirectoryEntry> {
        self.entries.get(self.cursor)
    }

    /// Current selection
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Last listing error, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the next generation request will actually write
    pub fn has_roots(&self) -> bool {
        self.selection.has_roots()
    }

    /// Text for the status bar
    pub fn status_line(&self) -> String {
        match &self.status {
            Some(status) => status.clone(),
            None => format!(
                "Items: {} | Selected Roots: {}",
                self.entries.len(),
                self.selection.roots().len()
            ),
        }
    }

    /// Apply one action. Messages from the previous action are cleared first.
    pub fn apply(&mut self, action: Action) -> Flow {
        self.status = None;
        self.error = None;

        match action {
            Action::Quit => return Flow::Quit,
            Action::NavigateUp => {
                if !self.entries.is_empty() {
                    self.cursor = (self.cursor + self.entries.len() - 1) % self.entries.len();
                }
            }
            Action::NavigateDown => {
                if !self.entries.is_empty() {
                    self.cursor = (self.cursor + 1) % self.entries.len();
                }
            }
            Action::EnterDirectory => self.enter_directory(),
            Action::ParentDirectory => {
                if let Some(parent) = self.current_dir.parent().map(Path::to_path_buf) {
                    self.current_dir = parent;
                    self.cursor = 0;
                    self.relist();
                }
            }
            Action::ToggleSelect => {
                if let Some(entry) = self.entries.get(self.cursor) {
                    let path = entry.path.clone();
                    let change = self.selection.toggle(&path);
                    log::debug!("Toggled {}: {:?}", path.display(), change);
                }
            }
            Action::GenerateOutput => self.generate(),
        }

        self.clamp_cursor();
        Flow::Continue
    }

    fn enter_directory(&mut self) {
        let Some(entry) = self.entries.get(self.cursor).filter(|e| e.is_dir) else {
            return;
        };
        let target = entry.path.clone();

        match listing::list_directory(&target) {
            Ok(entries) => {
                self.current_dir = target;
                self.entries = entries;
                self.cursor = 0;
            }
            Err(e) => self.error = Some(e.short_message()),
        }
    }

    fn generate(&mut self) {
        if !self.selection.has_roots() {
            self.status = Some(NO_ROOTS_MESSAGE.to_string());
            return;
        }

        let result = self.writer.write(&self.selection);
        if let Err(e) = &result {
            log::error!("{}", e);
        }
        self.status = Some(ArtifactWriter::status_line(&result));
        // The artifact may have appeared in the current directory
        self.relist();
    }

    fn relist(&mut self) {
        match listing::list_directory(&self.current_dir) {
            Ok(entries) => self.entries = entries,
            Err(e) => {
                self.entries.clear();
                self.error = Some(e.short_message());
            }
        }
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.entries.len().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io;

    use tempfile::{Builder, TempDir};

    use super::*;
    use crate::config::{Config, ContentPolicy};

    fn project() -> io::Result<(TempDir, Session)> {
        let temp = Builder::new().prefix("proj").tempdir()?;
        let base = paths::normalize(temp.path());
        fs::create_dir(base.join("src"))?;
        fs::write(base.join("src/lib.rs"), "pub fn f() {}\n")?;
        fs::write(base.join("README.md"), "# proj\n")?;
        fs::write(base.join(".env"), "SECRET=1\n")?;

        let mut config = Config::new(&base);
        config.policy = ContentPolicy::permissive(1024);
        let session = Session::new(&base, ArtifactWriter::new(&config));
        Ok((temp, session))
    }

    fn names(session: &Session) -> Vec<&str> {
        session.entries().iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_cursor_wraps_both_ways() -> io::Result<()> {
        let (_temp, mut session) = project()?;
        assert_eq!(names(&session), vec!["src", "README.md"]);

        session.apply(Action::NavigateUp);
        assert_eq!(session.cursor(), 1);
        session.apply(Action::NavigateDown);
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.status_line(), "Items: 2 | Selected Roots: 0");
        Ok(())
    }

    #[test]
    fn test_enter_and_parent() -> io::Result<()> {
        let (temp, mut session) = project()?;
        let base = paths::normalize(temp.path());

        session.apply(Action::EnterDirectory);
        assert_eq!(session.current_dir(), base.join("src"));
        assert_eq!(names(&session), vec!["lib.rs"]);

        // Entering a file does nothing
        session.apply(Action::EnterDirectory);
        assert_eq!(session.current_dir(), base.join("src"));

        session.apply(Action::ParentDirectory);
        assert_eq!(session.current_dir(), base);
        assert_eq!(session.cursor(), 0);
        Ok(())
    }

    #[test]
    fn test_enter_vanished_directory_keeps_location() -> io::Result<()> {
        let (temp, mut session) = project()?;
        let base = paths::normalize(temp.path());
        fs::remove_dir_all(base.join("src"))?;

        session.apply(Action::EnterDirectory);
        assert_eq!(session.current_dir(), base);
        assert_eq!(session.error(), Some("File Not Found"));

        // Cleared by the next action
        session.apply(Action::NavigateDown);
        assert_eq!(session.error(), None);
        Ok(())
    }

    #[test]
    fn test_generate_without_roots() -> io::Result<()> {
        let (temp, mut session) = project()?;
        assert_eq!(session.apply(Action::GenerateOutput), Flow::Continue);
        assert_eq!(session.status_line(), NO_ROOTS_MESSAGE);
        assert!(!temp.path().join("output.txt").exists());
        Ok(())
    }

    #[test]
    fn test_toggle_and_generate() -> io::Result<()> {
        let (temp, mut session) = project()?;
        let base = paths::normalize(temp.path());

        session.apply(Action::ToggleSelect);
        assert!(session.selection().roots().contains(&base.join("src")));
        assert!(session.has_roots());

        session.apply(Action::GenerateOutput);
        assert_eq!(
            session.status_line(),
            "Output generated to output.txt. 1 files' content included."
        );
        // The new artifact shows up in the listing
        assert_eq!(names(&session), vec!["src", "output.txt", "README.md"]);

        let text = fs::read_to_string(base.join("output.txt"))?;
        assert!(text.contains("--- File: src/lib.rs ---"));
        assert!(!text.contains("README.md"));

        // Status reverts to the default line after the next action
        session.apply(Action::NavigateDown);
        assert_eq!(session.status_line(), "Items: 3 | Selected Roots: 1");
        Ok(())
    }

    #[test]
    fn test_empty_directory_actions_are_noops() -> io::Result<()> {
        let temp = Builder::new().prefix("empty").tempdir()?;
        let config = Config::new(paths::normalize(temp.path()));
        let mut session = Session::new(temp.path(), ArtifactWriter::new(&config));

        for action in [Action::NavigateUp, Action::NavigateDown, Action::ToggleSelect] {
            assert_eq!(session.apply(action), Flow::Continue);
        }
        assert_eq!(session.cursor(), 0);
        assert!(!session.has_roots());
        assert_eq!(session.apply(Action::Quit), Flow::Quit);
        Ok(())
    }
}
