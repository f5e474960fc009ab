/*!
 * Configuration handling for promptgen
 */

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use clap_complete::Shell;
use glob_match::glob_match;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{PromptGenError, Result};
use crate::paths;
use crate::types::SelectionState;
use crate::utils::{
    DEFAULT_IGNORE_DIRS, DEFAULT_IGNORE_EXTENSIONS, DEFAULT_IGNORE_FILES,
    DEFAULT_MAX_FILE_SIZE_BYTES,
};
use crate::ensure;

/// Directory (under the user config dir) holding promptgen's files
pub const CONFIG_DIR_NAME: &str = "promptgen";
/// Content policy file name
pub const POLICY_FILE_NAME: &str = "config.json";
/// Key binding file name
pub const KEYBINDS_FILE_NAME: &str = "keybinds.json";
/// Default artifact file name
pub const DEFAULT_OUTPUT_FILE: &str = "output.txt";

/// Command-line arguments for promptgen
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "promptgen",
    version = env!("CARGO_PKG_VERSION"),
    about = "Interactively select project files and generate an overview for LLM context",
    long_about = "Browse a project, mark files and directories, and write a single text file containing the selected directory structure and file contents, ready to hand to a Large Language Model (LLM)."
)]
pub struct Args {
    /// Directory to start browsing from
    #[clap(default_value = ".")]
    pub initial_path: String,

    /// Output file for the generated overview
    #[clap(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output: String,

    /// JSON file with the content policy (ignored names, extensions, size limit)
    #[clap(long, value_name = "FILE")]
    pub config: Option<String>,

    /// JSON file with key bindings (created with defaults when missing)
    #[clap(long, value_name = "FILE")]
    pub keybinds: Option<String>,

    /// Select a path and generate without the interactive browser (repeatable)
    #[clap(long, value_name = "PATH")]
    pub select: Vec<String>,

    /// Exclude a path below a selected one in one-shot mode (repeatable)
    #[clap(long, value_name = "PATH", requires = "select")]
    pub exclude: Vec<String>,

    /// Maximum size in bytes of an embedded file
    #[clap(long, value_name = "BYTES")]
    pub max_size: Option<u64>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Silence all logging
    #[clap(short, long)]
    pub quiet: bool,

    /// Print shell completions and exit
    #[clap(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

/// What gets embedded: ignored names, ignored extensions and the size limit.
///
/// Read-only to the tree walk and the content emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPolicy {
    /// Directory names (or glob patterns) never walked
    pub ignore_dirs: Vec<String>,
    /// File names (or glob patterns) never listed
    pub ignore_files: Vec<String>,
    /// Extensions listed but never embedded, lower-case with a leading dot
    pub ignore_extensions: Vec<String>,
    /// Largest file whose content is embedded
    pub max_file_size_bytes: u64,
}

impl Default for ContentPolicy {
    fn default() -> Self {
        Self {
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(|s| s.to_string()).collect(),
            ignore_files: DEFAULT_IGNORE_FILES.iter().map(|s| s.to_string()).collect(),
            ignore_extensions: DEFAULT_IGNORE_EXTENSIONS
                .iter()
                .map(|s| normalize_extension(s))
                .collect(),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
        }
    }
}

impl ContentPolicy {
    /// A policy that ignores nothing and embeds files up to `max_file_size_bytes`
    pub fn permissive(max_file_size_bytes: u64) -> Self {
        Self {
            ignore_dirs: Vec::new(),
            ignore_files: Vec::new(),
            ignore_extensions: Vec::new(),
            max_file_size_bytes,
        }
    }

    /// Whether a directory with this name is skipped entirely
    pub fn ignores_dir(&self, name: &str) -> bool {
        matches_any(&self.ignore_dirs, name)
    }

    /// Whether a file with this name is skipped entirely
    pub fn ignores_file(&self, name: &str) -> bool {
        matches_any(&self.ignore_files, name)
    }

    /// Whether the content of `path` is never embedded because of its extension
    pub fn ignores_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension() else {
            return false;
        };
        let ext = normalize_extension(&ext.to_string_lossy());
        self.ignore_extensions.iter().any(|e| *e == ext)
    }

    /// Overlay a JSON object on the defaults.
    ///
    /// Unknown keys are reported and ignored; a known key with the wrong type
    /// is an error.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let file: PolicyFile = serde_json::from_str(text)?;
        for key in file.unknown.keys() {
            log::warn!("Unknown content policy key '{}', ignoring", key);
        }

        let mut policy = Self::default();
        if let Some(dirs) = file.ignore_dirs {
            policy.ignore_dirs = dirs;
        }
        if let Some(files) = file.ignore_files {
            policy.ignore_files = files;
        }
        if let Some(exts) = file.ignore_extensions {
            policy.ignore_extensions = exts.iter().map(|e| normalize_extension(e)).collect();
        }
        if let Some(mb) = file.max_file_size_mb {
            ensure!(mb >= 0.0, Config, "max_file_size_mb must not be negative");
            policy.max_file_size_bytes = (mb * 1024.0 * 1024.0) as u64;
        }
        if let Some(bytes) = file.max_file_size_bytes {
            policy.max_file_size_bytes = bytes;
        }

        Ok(policy)
    }

    /// Load a policy file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            PromptGenError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let policy = Self::from_json_str(&text)?;
        log::info!("Loaded content policy from {}", path.display());
        Ok(policy)
    }
}

/// On-disk shape of a content policy file; every key is optional
#[derive(Debug, Deserialize)]
struct PolicyFile {
    ignore_dirs: Option<Vec<String>>,
    ignore_files: Option<Vec<String>>,
    ignore_extensions: Option<Vec<String>>,
    max_file_size_bytes: Option<u64>,
    max_file_size_mb: Option<f64>,
    #[serde(flatten)]
    unknown: BTreeMap<String, Value>,
}

fn matches_any(patterns: &[String], name: &str) -> bool {
    patterns
        .iter()
        .any(|pattern| pattern == name || glob_match(pattern, name))
}

/// `"PNG"`, `".png"` and `"png"` all become `".png"`
pub fn normalize_extension(ext: &str) -> String {
    format!(".{}", ext.trim_start_matches('.').to_lowercase())
}

/// Default location of a promptgen config file, if the platform has a config dir
pub fn default_config_file(name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(name))
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Directory the browser starts in
    pub initial_path: PathBuf,

    /// Directory paths in the artifact are relative to
    pub base_dir: PathBuf,

    /// Artifact path
    pub output_file: PathBuf,

    /// Content policy
    pub policy: ContentPolicy,

    /// Key binding file
    pub keybinds_file: Option<PathBuf>,

    /// Paths to select in one-shot mode
    pub select: Vec<PathBuf>,

    /// Paths to exclude in one-shot mode
    pub exclude: Vec<PathBuf>,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Result<Self> {
        let base_dir = env::current_dir()?;

        let policy_file = match &args.config {
            Some(path) => Some(PathBuf::from(path)),
            None => default_config_file(POLICY_FILE_NAME).filter(|path| path.is_file()),
        };
        let mut policy = match policy_file {
            Some(path) => ContentPolicy::load(&path)?,
            None => ContentPolicy::default(),
        };
        if let Some(max) = args.max_size {
            policy.max_file_size_bytes = max;
        }

        Ok(Self {
            initial_path: PathBuf::from(&args.initial_path),
            output_file: PathBuf::from(&args.output),
            policy,
            keybinds_file: args
                .keybinds
                .map(PathBuf::from)
                .or_else(|| default_config_file(KEYBINDS_FILE_NAME)),
            select: args.select.iter().map(PathBuf::from).collect(),
            exclude: args.exclude.iter().map(PathBuf::from).collect(),
            base_dir,
        })
    }

    /// Configuration for library use: default policy, artifact in `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            initial_path: base_dir.clone(),
            output_file: base_dir.join(DEFAULT_OUTPUT_FILE),
            policy: ContentPolicy::default(),
            keybinds_file: None,
            select: Vec::new(),
            exclude: Vec::new(),
            base_dir,
        }
    }

    /// True when paths were given on the command line
    pub fn is_one_shot(&self) -> bool {
        !self.select.is_empty()
    }

    /// Artifact path resolved against the base directory
    pub fn output_path(&self) -> PathBuf {
        if self.output_file.is_absolute() {
            self.output_file.clone()
        } else {
            self.base_dir.join(&self.output_file)
        }
    }

    /// Selection built from `--select` and `--exclude`, applied in that order
    /// through the toggle rules. Paths that need no change are reported.
    pub fn one_shot_selection(&self) -> SelectionState {
        let mut selection = SelectionState::new();

        for path in &self.select {
            let path = paths::normalize_from(path, &self.base_dir);
            if selection.select(&path).is_none() {
                log::warn!("{} is already selected", path.display());
            }
        }
        for path in &self.exclude {
            let path = paths::normalize_from(path, &self.base_dir);
            if selection.exclude(&path).is_none() {
                log::warn!(
                    "{} is not below a selected directory, nothing to exclude",
                    path.display()
                );
            }
        }

        selection
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let initial = self.base_dir.join(&self.initial_path);
        ensure!(
            initial.is_dir(),
            InvalidArgument,
            "Initial path '{}' is not a valid directory.",
            self.initial_path.display()
        );

        // Check if output file directory exists
        if let Some(parent) = self.output_path().parent() {
            ensure!(
                parent.is_dir(),
                InvalidArgument,
                "Output directory not found: {}",
                parent.display()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_matches_names_and_patterns() {
        let policy = ContentPolicy::default();
        assert!(policy.ignores_dir("node_modules"));
        assert!(policy.ignores_dir("mypkg.egg-info"));
        assert!(!policy.ignores_dir("src"));
        assert!(policy.ignores_file("Cargo.lock"));
        assert!(policy.ignores_file("cache.pyc"));
        assert!(!policy.ignores_file("main.py"));
    }

    #[test]
    fn test_extension_matching_is_case_insensitive() {
        let policy = ContentPolicy::default();
        assert!(policy.ignores_extension(Path::new("/p/logo.PNG")));
        assert!(policy.ignores_extension(Path::new("/p/bundle.tar.gz")));
        assert!(!policy.ignores_extension(Path::new("/p/main.rs")));
        assert!(!policy.ignores_extension(Path::new("/p/Makefile")));
    }

    #[test]
    fn test_json_overlay_keeps_unset_defaults() -> Result<()> {
        let policy = ContentPolicy::from_json_str(
            r#"{ "ignore_extensions": ["LOG", ".tmp"], "max_file_size_mb": 2, "colour": "blue" }"#,
        )?;
        assert_eq!(policy.ignore_extensions, vec![".log", ".tmp"]);
        assert_eq!(policy.max_file_size_bytes, 2 * 1024 * 1024);
        assert_eq!(policy.ignore_dirs, ContentPolicy::default().ignore_dirs);
        Ok(())
    }

    #[test]
    fn test_json_overlay_rejects_wrong_types() {
        assert!(ContentPolicy::from_json_str(r#"{ "ignore_dirs": "target" }"#).is_err());
        assert!(ContentPolicy::from_json_str(r#"["target"]"#).is_err());
        assert!(ContentPolicy::from_json_str("not json").is_err());
    }

    #[test]
    fn test_output_path_resolves_against_base() {
        let mut config = Config::new("/work/proj");
        assert_eq!(config.output_path(), PathBuf::from("/work/proj/output.txt"));

        config.output_file = PathBuf::from("/tmp/out.txt");
        assert_eq!(config.output_path(), PathBuf::from("/tmp/out.txt"));
    }

    #[test]
    fn test_one_shot_selection_resolves_against_base() {
        let mut config = Config::new("/work/proj");
        config.select = vec![PathBuf::from("src"), PathBuf::from("src/bin")];
        config.exclude = vec![PathBuf::from("src/gen"), PathBuf::from("docs")];

        let selection = config.one_shot_selection();
        assert_eq!(
            selection,
            SelectionState::from_sets(["/work/proj/src"], ["/work/proj/src/gen"])
        );
    }

    #[test]
    fn test_args_parse_one_shot_flags() {
        let args = Args::parse_from([
            "promptgen",
            "proj",
            "--select",
            "proj/src",
            "--exclude",
            "proj/src/gen",
            "--max-size",
            "10",
            "-vv",
        ]);
        assert_eq!(args.initial_path, "proj");
        assert_eq!(args.select, vec!["proj/src"]);
        assert_eq!(args.exclude, vec!["proj/src/gen"]);
        assert_eq!(args.max_size, Some(10));
        assert_eq!(args.verbose, 2);
        assert_eq!(args.output, DEFAULT_OUTPUT_FILE);
    }
}
