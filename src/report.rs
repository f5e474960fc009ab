/*!
 * Reporting functionality for promptgen
 *
 * Summarizes a generation run as console tables using the tabled library.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::emitter::Outcome;
use crate::writer::Overview;

/// Information about one embedded file
#[derive(Debug, Clone)]
pub struct FileReportInfo {
    /// Path as shown in the artifact
    pub path: String,
    /// What happened to the file
    pub outcome: Outcome,
    /// Number of lines embedded
    pub lines: usize,
    /// Number of characters embedded
    pub chars: usize,
}

/// Statistics for one generation run
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// Output file, relative to the invocation directory when possible
    pub output_file: String,
    /// Time taken to walk, read and write
    pub duration: Duration,
    /// Lines in the combined project structure
    pub tree_lines: usize,
    /// Files counted as included (normal and empty)
    pub files_included: usize,
    /// Files whose content was skipped by policy
    pub files_skipped: usize,
    /// Files that could not be read
    pub files_failed: usize,
    /// Total characters of embedded content
    pub total_chars: usize,
    /// Details for each file, in artifact order
    pub file_details: Vec<FileReportInfo>,
}

impl GenerationReport {
    /// Collect statistics from a rendered overview
    pub fn new(output_file: String, duration: Duration, overview: &Overview) -> Self {
        let mut report = Self {
            output_file,
            duration,
            tree_lines: overview.tree_lines,
            files_included: 0,
            files_skipped: 0,
            files_failed: 0,
            total_chars: 0,
            file_details: Vec::with_capacity(overview.blocks.len()),
        };

        for block in &overview.blocks {
            let (lines, chars) = match block.outcome {
                Outcome::Included => (block.body.lines().count(), block.body.chars().count()),
                _ => (0, 0),
            };
            match block.outcome {
                Outcome::Included | Outcome::Empty => report.files_included += 1,
                Outcome::Skipped(_) => report.files_skipped += 1,
                Outcome::Error(_) => report.files_failed += 1,
            }
            report.total_chars += chars;
            report.file_details.push(FileReportInfo {
                path: block.relative.clone(),
                outcome: block.outcome.clone(),
                lines,
                chars,
            });
        }

        report
    }
}

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
}

/// Report generator for generation results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate a report string
    pub fn generate_report(&self, report: &GenerationReport) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(report),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &GenerationReport) {
        println!("\n{}", self.generate_report(report));
    }

    /// Keep the tail of long paths, cut at a separator
    fn format_path(&self, path: &str, max_len: usize) -> String {
        if path.chars().count() <= max_len {
            return path.to_string();
        }

        let mut segments = Vec::new();
        let mut current_len = 3; // "..."
        for part in path.rsplit('/') {
            let part_len = part.chars().count() + 1;
            if current_len + part_len > max_len {
                break;
            }
            segments.push(part);
            current_len += part_len;
        }

        let mut result = String::from("...");
        for part in segments.iter().rev() {
            result.push('/');
            result.push_str(part);
        }
        result
    }

    fn styled(mut table: Table) -> String {
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));
        table.to_string()
    }

    fn create_summary_table(&self, report: &GenerationReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: &'static str,

            #[tabled(rename = "Value")]
            value: String,
        }

        let rows = vec![
            SummaryRow {
                key: "Output File",
                value: report.output_file.clone(),
            },
            SummaryRow {
                key: "Process Time",
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "Structure Lines",
                value: self.format_number(report.tree_lines),
            },
            SummaryRow {
                key: "Files Included",
                value: self.format_number(report.files_included),
            },
            SummaryRow {
                key: "Files Skipped",
                value: self.format_number(report.files_skipped),
            },
            SummaryRow {
                key: "Read Errors",
                value: self.format_number(report.files_failed),
            },
            SummaryRow {
                key: "LLM Tokens",
                value: format!(
                    "{} tokens (estimated)",
                    self.format_number(report.total_chars / 4)
                ),
            },
        ];

        Self::styled(Table::new(rows))
    }

    fn create_files_table(&self, report: &GenerationReport) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Status")]
            status: &'static str,

            #[tabled(rename = "Lines")]
            lines: String,

            #[tabled(rename = "Est. Tokens")]
            tokens: String,
        }

        // Largest first
        let mut files: Vec<&FileReportInfo> = report.file_details.iter().collect();
        files.sort_by(|a, b| b.chars.cmp(&a.chars));
        if files.len() > 15 {
            files.truncate(10);
        }

        let rows: Vec<FileRow> = files
            .into_iter()
            .map(|info| FileRow {
                path: self.format_path(&info.path, 60),
                status: info.outcome.label(),
                lines: self.format_number(info.lines),
                tokens: self.format_number(info.chars / 4),
            })
            .collect();

        Self::styled(Table::new(rows))
    }

    fn generate_console_report(&self, report: &GenerationReport) -> String {
        let summary_table = self.create_summary_table(report);
        let summary_title = "OVERVIEW GENERATED";

        if report.file_details.is_empty() {
            return format!("{}\n{}", summary_title, summary_table);
        }

        let files_table = self.create_files_table(report);
        let files_title = if report.file_details.len() > 15 {
            "TOP 10 LARGEST FILES BY CHARACTER COUNT"
        } else {
            "EMBEDDED FILES"
        };

        format!(
            "{}\n{}\n\n{}\n{}",
            files_title, files_table, summary_title, summary_table
        )
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::emitter::{FileBlock, SkipReason};

    fn block(relative: &str, outcome: Outcome, body: &str) -> FileBlock {
        FileBlock {
            path: PathBuf::from("/proj").join(relative),
            relative: relative.to_string(),
            outcome,
            body: body.to_string(),
            lossy: false,
        }
    }

    fn sample() -> GenerationReport {
        let overview = Overview {
            text: String::new(),
            tree_lines: 5,
            blocks: vec![
                block("src/main.rs", Outcome::Included, "fn main() {\n}\n"),
                block("empty.txt", Outcome::Empty, "(This file is empty)"),
                block(
                    "big.bin",
                    Outcome::Skipped(SkipReason::TooLarge { size: 10 }),
                    "Content skipped",
                ),
            ],
        };
        GenerationReport::new("output.txt".to_string(), Duration::from_millis(3), &overview)
    }

    #[test]
    fn test_counts_follow_outcomes() {
        let report = sample();
        assert_eq!(report.files_included, 2);
        assert_eq!(report.files_skipped, 1);
        assert_eq!(report.files_failed, 0);
        assert_eq!(report.file_details[0].lines, 2);
        assert_eq!(report.file_details[1].chars, 0);
    }

    #[test]
    fn test_console_report_has_both_tables() {
        let text = Reporter::new(ReportFormat::ConsoleTable).generate_report(&sample());
        assert!(text.contains("EMBEDDED FILES"));
        assert!(text.contains("src/main.rs"));
        assert!(text.contains("skipped (size)"));
        assert!(text.contains("Files Included"));
    }

    #[test]
    fn test_format_path_keeps_tail() {
        let reporter = Reporter::new(ReportFormat::ConsoleTable);
        assert_eq!(reporter.format_path("src/lib.rs", 60), "src/lib.rs");
        assert_eq!(reporter.format_path("aaaa/bbbb/cccc/d.rs", 13), ".../cccc/d.rs");
    }
}
