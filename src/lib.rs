/*!
 * promptgen - Select project files and generate a text overview for LLM context
 *
 * The user marks selection roots and exclusions while browsing a project; the
 * combined directory structure and the content of every selected file are then
 * written to a single plain-text artifact.
 */

pub mod config;
pub mod emitter;
pub mod error;
pub mod keymap;
pub mod listing;
pub mod paths;
pub mod report;
pub mod scanner;
pub mod selection;
pub mod session;
pub mod tui;
pub mod types;
pub mod utils;
pub mod writer;


// Re-export main components for easier access
pub use config::{Config, ContentPolicy};
pub use emitter::{ContentEmitter, FileBlock, Outcome};
pub use error::{PromptGenError, Result};
pub use keymap::{Action, KeyMap, KeyPress};
pub use report::{GenerationReport, ReportFormat, Reporter};
pub use scanner::{TreeListing, TreeSerializer};
pub use selection::{is_selected, SelectionStatus, Toggled};
pub use session::{Flow, Session};
pub use types::{DirectoryEntry, SelectionState};
pub use utils::format_file_size;
pub use writer::ArtifactWriter;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
