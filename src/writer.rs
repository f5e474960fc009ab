/*!
 * Project overview writer for promptgen
 *
 * Assembles the preamble, the selection summary, the combined tree and the
 * file blocks into one text artifact.
 */

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use indicatif::ProgressBar;

use crate::config::{Config, ContentPolicy};
use crate::emitter::{ContentEmitter, FileBlock};
use crate::error::{PromptGenError, Result};
use crate::paths;
use crate::report::GenerationReport;
use crate::scanner::TreeSerializer;
use crate::types::SelectionState;

/// Instructions placed at the top of every overview
pub const PREAMBLE: &str = "The following is a detailed overview of a software project.\n\n\
It includes the directory structure and the content of selected source code files.\n\n\
Please analyze this information to understand the project's components, relationships, and \
functionality. This context can be used to answer questions about the project, assist with \
debugging, suggest refactorings, or generate documentation.\n\n";

/// A rendered overview, before it is written out
#[derive(Debug, Clone)]
pub struct Overview {
    /// Full artifact text
    pub text: String,
    /// Number of lines in the combined structure
    pub tree_lines: usize,
    /// One block per embedded file, in emission order
    pub blocks: Vec<FileBlock>,
}

impl Overview {
    /// Files counted as included (normal and empty)
    pub fn included_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_included()).count()
    }
}

/// Writes the project overview for a selection
pub struct ArtifactWriter {
    policy: ContentPolicy,
    base_dir: PathBuf,
    output_file: PathBuf,
    progress: ProgressBar,
}

impl ArtifactWriter {
    /// Create a writer from the application configuration
    pub fn new(config: &Config) -> Self {
        Self {
            policy: config.policy.clone(),
            base_dir: paths::normalize(&config.base_dir),
            output_file: paths::normalize_from(&config.output_file, &config.base_dir),
            progress: ProgressBar::hidden(),
        }
    }

    /// Report per-file progress on `progress`
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Absolute path of the artifact
    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    /// Build the artifact text without touching the output file
    pub fn render(&self, selection: &SelectionState) -> Overview {
        let mut text = String::from(PREAMBLE);
        text.push_str("PROJECT CONTEXT OVERVIEW\n========================\n\n");

        text.push_str("SELECTION ROOTS (items explicitly chosen to start the project scan):\n");
        if !selection.has_roots() {
            text.push_str("(None – the overview will be empty.)\n");
        }
        for root in selection.roots() {
            let _ = writeln!(text, "- {}", self.relative(root));
        }

        if !selection.exclusions().is_empty() {
            text.push_str("\nEXPLICIT EXCLUSIONS (items specifically excluded from the scan):\n");
            for exclusion in selection.exclusions() {
                let _ = writeln!(text, "- {}", self.relative(exclusion));
            }
        }

        text.push_str("\nCOMBINED PROJECT STRUCTURE (based on selections and exclusions):\n");
        self.progress.set_message("Walking selection roots");
        let listing = TreeSerializer::new(&self.policy, selection, &self.base_dir)
            .skip_file(&self.output_file)
            .serialize_all();
        if !selection.has_roots() {
            text.push_str("(Project structure is empty.)\n");
        }
        for line in &listing.lines {
            text.push_str(line);
            text.push('\n');
        }

        text.push_str("\n\n--- File Contents ---\n");
        let emitter = ContentEmitter::new(&self.policy, &self.base_dir, self.progress.clone());
        let blocks = emitter.emit_all(&listing.files);
        if blocks.is_empty() {
            text.push_str("(No files selected for content inclusion.)\n");
        }
        for block in &blocks {
            block.render_into(&mut text);
        }

        text.push_str("\n\n--- End of Project Overview ---\n");

        Overview {
            text,
            tree_lines: listing.lines.len(),
            blocks,
        }
    }

    /// Render the overview and write it to the output file
    pub fn write(&self, selection: &SelectionState) -> Result<GenerationReport> {
        let start_time = Instant::now();
        let overview = self.render(selection);

        let write_error = |source| PromptGenError::Write {
            path: self.output_file.clone(),
            source,
        };
        let file = File::create(&self.output_file).map_err(write_error)?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(overview.text.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(write_error)?;

        log::info!(
            "Wrote {} ({} files included)",
            self.output_file.display(),
            overview.included_count()
        );

        Ok(GenerationReport::new(
            self.relative(&self.output_file),
            start_time.elapsed(),
            &overview,
        ))
    }

    /// One-line outcome of a generation request, as shown in the status bar
    pub fn status_line(result: &Result<GenerationReport>) -> String {
        match result {
            Ok(report) => format!(
                "Output generated to {}. {} files' content included.",
                report.output_file, report.files_included
            ),
            Err(e) => format!("Error: {e}"),
        }
    }

    fn relative(&self, path: &Path) -> String {
        paths::display_relative(path, &self.base_dir)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io;

    use tempfile::{Builder, TempDir};

    use super::*;

    fn scratch() -> io::Result<(TempDir, Config)> {
        let temp = Builder::new().prefix("proj").tempdir()?;
        let mut config = Config::new(paths::normalize(temp.path()));
        config.policy = ContentPolicy::permissive(1024);
        Ok((temp, config))
    }

    #[test]
    fn test_empty_selection_sections() -> io::Result<()> {
        let (_temp, config) = scratch()?;
        let overview = ArtifactWriter::new(&config).render(&SelectionState::new());

        assert!(overview.text.starts_with(PREAMBLE));
        assert!(overview.text.contains(
            "SELECTION ROOTS (items explicitly chosen to start the project scan):\n\
             (None – the overview will be empty.)\n\n\
             COMBINED PROJECT STRUCTURE (based on selections and exclusions):\n\
             (Project structure is empty.)\n\n\n\
             --- File Contents ---\n\
             (No files selected for content inclusion.)\n"
        ));
        assert!(!overview.text.contains("EXPLICIT EXCLUSIONS"));
        assert!(overview.text.ends_with("\n\n--- End of Project Overview ---\n"));
        Ok(())
    }

    #[test]
    fn test_exclusions_section_and_status() -> Result<()> {
        let (temp, config) = scratch()?;
        let base = paths::normalize(temp.path());
        fs::create_dir(base.join("src"))?;
        fs::create_dir(base.join("gen"))?;
        fs::write(base.join("src/main.rs"), "fn main() {}\n")?;
        fs::write(base.join("gen/out.rs"), "// generated\n")?;

        let selection = SelectionState::from_sets([&base], [base.join("gen")]);
        let writer = ArtifactWriter::new(&config);
        let result = writer.write(&selection);
        let text = fs::read_to_string(writer.output_file())?;

        assert!(text.contains(
            "SELECTION ROOTS (items explicitly chosen to start the project scan):\n- .\n"
        ));
        assert!(text.contains(
            "\nEXPLICIT EXCLUSIONS (items specifically excluded from the scan):\n- gen\n"
        ));
        assert!(text.contains("./\n    ├── src/\n        ├── main.rs\n"));
        assert!(!text.contains("out.rs"));
        assert!(!text.contains("--- File: output.txt ---"));

        assert_eq!(
            ArtifactWriter::status_line(&result),
            "Output generated to output.txt. 1 files' content included."
        );
        Ok(())
    }

    #[test]
    fn test_write_failure_is_reported() -> io::Result<()> {
        let (temp, mut config) = scratch()?;
        config.output_file = temp.path().join("missing/dir/out.txt");

        let result = ArtifactWriter::new(&config).write(&SelectionState::new());
        assert!(matches!(result, Err(PromptGenError::Write { .. })));

        let status = ArtifactWriter::status_line(&result);
        assert!(status.starts_with("Error: could not write "));
        assert!(status.contains("out.txt"));
        Ok(())
    }
}
