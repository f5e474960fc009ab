/*!
 * Key bindings for the interactive browser
 *
 * Bindings are read from a JSON object mapping action names to lists of key
 * specifiers. Anything unusable in the file is reported and replaced by the
 * built-in default for that action.
 */

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::Result;

/// Something the user can ask the browser to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    Quit,
    NavigateUp,
    NavigateDown,
    EnterDirectory,
    ParentDirectory,
    ToggleSelect,
    GenerateOutput,
}

impl Action {
    /// Every action, in binding order
    pub const ALL: [Action; 7] = [
        Action::Quit,
        Action::NavigateUp,
        Action::NavigateDown,
        Action::EnterDirectory,
        Action::ParentDirectory,
        Action::ToggleSelect,
        Action::GenerateOutput,
    ];

    /// Name used in the key binding file
    pub fn name(self) -> &'static str {
        match self {
            Self::Quit => "QUIT",
            Self::NavigateUp => "NAVIGATE_UP",
            Self::NavigateDown => "NAVIGATE_DOWN",
            Self::EnterDirectory => "ENTER_DIRECTORY",
            Self::ParentDirectory => "PARENT_DIRECTORY",
            Self::ToggleSelect => "TOGGLE_SELECT",
            Self::GenerateOutput => "GENERATE_OUTPUT",
        }
    }

    /// Look an action up by its file name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.name() == name)
    }

    /// Built-in key specifiers
    pub fn default_specs(self) -> &'static [&'static str] {
        match self {
            Self::Quit => &["q"],
            Self::NavigateUp => &["KEY_UP", "k"],
            Self::NavigateDown => &["KEY_DOWN", "j"],
            Self::EnterDirectory => &["KEY_ENTER", "\n", "l"],
            Self::ParentDirectory => &["h"],
            Self::ToggleSelect => &[" "],
            Self::GenerateOutput => &["g"],
        }
    }
}

/// A decoded key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPress {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Char(char),
    /// A character typed with Alt held (an escape prefix on most terminals)
    Alt(char),
}

/// Named special keys accepted in specifiers
const NAMED_KEYS: [(&str, KeyPress); 5] = [
    ("KEY_UP", KeyPress::Up),
    ("KEY_DOWN", KeyPress::Down),
    ("KEY_LEFT", KeyPress::Left),
    ("KEY_RIGHT", KeyPress::Right),
    ("KEY_ENTER", KeyPress::Enter),
];

/// Parse one key specifier: a `KEY_*` name (case-insensitive), `ALT+<c>`, or a
/// single character.
pub fn parse_spec(spec: &str) -> Option<KeyPress> {
    let upper = spec.to_uppercase();

    if upper.starts_with("ALT+") {
        let mut rest = spec.get(4..)?.chars();
        return match (rest.next(), rest.next()) {
            (Some(c), None) => Some(KeyPress::Alt(c)),
            _ => None,
        };
    }

    if let Some((_, key)) = NAMED_KEYS.iter().find(|(name, _)| *name == upper) {
        return Some(*key);
    }

    let mut chars = spec.chars();
    match (chars.next(), chars.next()) {
        (Some('\n' | '\r'), None) => Some(KeyPress::Enter),
        (Some(c), None) => Some(KeyPress::Char(c)),
        _ => None,
    }
}

/// Human form of a specifier for the instruction bar
pub fn display_spec(spec: &str) -> String {
    let upper = spec.to_uppercase();
    if upper.starts_with("ALT+") {
        return format!("Alt+{}", spec.get(4..).unwrap_or_default());
    }
    if NAMED_KEYS.iter().any(|(name, _)| *name == upper) {
        let name = &upper["KEY_".len()..];
        let mut chars = name.chars();
        return match chars.next() {
            Some(first) => first.to_string() + &chars.as_str().to_lowercase(),
            None => String::new(),
        };
    }
    match spec {
        " " => "Space".to_string(),
        "\n" | "\r" => "Enter".to_string(),
        other => other.to_string(),
    }
}

/// Mapping from key presses to actions
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: HashMap<KeyPress, Action>,
    specs: BTreeMap<Action, Vec<String>>,
}

impl Default for KeyMap {
    fn default() -> Self {
        let specs = Action::ALL
            .into_iter()
            .map(|action| {
                let keys = action.default_specs().iter().map(|s| s.to_string()).collect();
                (action, keys)
            })
            .collect();
        Self::from_specs(specs)
    }
}

impl KeyMap {
    fn from_specs(specs: BTreeMap<Action, Vec<String>>) -> Self {
        let mut bindings = HashMap::new();
        for (action, keys) in &specs {
            for spec in keys {
                if let Some(key) = parse_spec(spec) {
                    bindings.insert(key, *action);
                }
            }
        }
        Self { bindings, specs }
    }

    /// Overlay a key binding file on the defaults. Never fails: problems are
    /// logged and the affected entries keep their defaults.
    pub fn from_json_str(text: &str) -> Self {
        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Could not decode key bindings ({}), using defaults", e);
                return Self::default();
            }
        };
        let Value::Object(map) = value else {
            log::warn!("Key bindings must be a JSON object, using defaults");
            return Self::default();
        };

        let mut specs = Self::default().specs;
        for (name, value) in map {
            let Some(action) = Action::from_name(&name) else {
                log::warn!("Unknown action '{}' in key bindings, ignoring", name);
                continue;
            };
            let Value::Array(items) = value else {
                log::warn!("Keys for '{}' are not a list, using defaults", name);
                continue;
            };

            let mut keys = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(spec) if parse_spec(&spec).is_some() => keys.push(spec),
                    Value::String(spec) => {
                        log::warn!("Invalid key specifier {:?} for '{}', ignoring", spec, name)
                    }
                    other => log::warn!(
                        "Key specifier {} for '{}' is not a string, ignoring",
                        other,
                        name
                    ),
                }
            }
            specs.insert(action, keys);
        }

        Self::from_specs(specs)
    }

    /// Load bindings from `path`, writing the defaults there when it does not exist
    pub fn load_or_create(path: &Path) -> Self {
        if !path.exists() {
            match write_defaults(path) {
                Ok(()) => log::info!("Created default key bindings at {}", path.display()),
                Err(e) => log::warn!("Could not create {}: {}", path.display(), e),
            }
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(text) => {
                log::info!("Loaded key bindings from {}", path.display());
                Self::from_json_str(&text)
            }
            Err(e) => {
                log::warn!("Could not read {}: {}, using default key bindings", path.display(), e);
                Self::default()
            }
        }
    }

    /// Action bound to `key`, if any
    pub fn action_for(&self, key: KeyPress) -> Option<Action> {
        self.bindings.get(&key).copied()
    }

    /// Display forms of the keys bound to `action`, in file order
    pub fn display_keys(&self, action: Action) -> Vec<String> {
        self.specs
            .get(&action)
            .map(|keys| keys.iter().map(|spec| display_spec(spec)).collect())
            .unwrap_or_default()
    }

    /// Keys for `action` joined for the instruction bar, e.g. `Up/k`.
    /// Specifiers that display the same are shown once.
    pub fn hint(&self, action: Action) -> String {
        let mut shown: Vec<String> = Vec::new();
        for key in self.display_keys(action) {
            if !shown.contains(&key) {
                shown.push(key);
            }
        }
        shown.join("/")
    }
}

/// The built-in bindings as pretty JSON with sorted keys
pub fn default_json() -> Result<String> {
    let table: BTreeMap<&str, &[&str]> = Action::ALL
        .into_iter()
        .map(|action| (action.name(), action.default_specs()))
        .collect();
    Ok(serde_json::to_string_pretty(&table)?)
}

fn write_defaults(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, default_json()?)?;
    Ok(())
}
