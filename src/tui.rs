/*!
 * Terminal front end for the interactive browser
 *
 * Draws a [`Session`] full-screen and feeds decoded key presses back into it.
 */

use std::io;

use console::{pad_str, style, truncate_str, Alignment, Key, Term};
use log::LevelFilter;

use crate::keymap::{Action, KeyMap, KeyPress};
use crate::session::{Flow, Session, GENERATING_MESSAGE};

/// Decode a terminal key into a bindable key press
pub fn key_press(key: Key) -> Option<KeyPress> {
    match key {
        Key::ArrowUp => Some(KeyPress::Up),
        Key::ArrowDown => Some(KeyPress::Down),
        Key::ArrowLeft => Some(KeyPress::Left),
        Key::ArrowRight => Some(KeyPress::Right),
        Key::Enter => Some(KeyPress::Enter),
        Key::Char(c) => Some(KeyPress::Char(c)),
        // Escape followed by a single character
        Key::UnknownEscSeq(seq) if seq.len() == 1 => Some(KeyPress::Alt(seq[0])),
        _ => None,
    }
}

/// Fit `text` to exactly `width` columns
fn fit(text: &str, width: usize) -> String {
    pad_str(&truncate_str(text, width, ""), width, Alignment::Left, None).into_owned()
}

/// The instruction bar, built from the active bindings
pub fn instructions(keymap: &KeyMap) -> String {
    [
        format!(
            "[{}/{}] Nav",
            keymap.hint(Action::NavigateUp),
            keymap.hint(Action::NavigateDown)
        ),
        format!("[{}] Enter", keymap.hint(Action::EnterDirectory)),
        format!("[{}] Parent", keymap.hint(Action::ParentDirectory)),
        format!("[{}] Sel", keymap.hint(Action::ToggleSelect)),
        format!("[{}] Gen", keymap.hint(Action::GenerateOutput)),
        format!("[{}] Quit", keymap.hint(Action::Quit)),
    ]
    .join(" | ")
}

/// Render one screen of `rows` lines, each `cols - 1` columns wide.
///
/// `status` replaces the session's own status line when given.
pub fn render_frame(
    session: &Session,
    keymap: &KeyMap,
    status: Option<&str>,
    rows: usize,
    cols: usize,
) -> Vec<String> {
    let width = cols.saturating_sub(1);
    let mut frame = Vec::with_capacity(rows);
    if rows == 0 {
        return frame;
    }

    let header = format!(
        "Interactive Project Lister - Path: {}",
        session.current_dir().display()
    );
    frame.push(style(fit(&header, width)).bold().cyan().to_string());

    if let Some(error) = session.error() {
        frame.push(style(fit(&format!("Error: {error}"), width)).red().to_string());
    }

    // Header, optional error, instructions and status bar
    let visible = rows.saturating_sub(frame.len() + 2);
    let cursor = session.cursor();
    let offset = if visible > 0 && cursor >= visible {
        cursor + 1 - visible
    } else {
        0
    };

    for (i, entry) in session.entries().iter().enumerate().skip(offset).take(visible) {
        let selected = session.selection().is_selected(&entry.path);
        let marker = if selected { "[*] " } else { "[ ] " };
        let name = if entry.is_dir {
            format!("{}/", entry.name)
        } else {
            entry.name.clone()
        };

        let mut item = style(fit(&name, width.saturating_sub(marker.len())));
        if entry.is_dir {
            item = item.blue().bold();
        }
        if i == cursor {
            item = item.reverse();
        }
        let marker = if selected {
            style(marker).green()
        } else {
            style(marker).dim()
        };
        frame.push(format!("{marker}{item}"));
    }

    while frame.len() + 2 < rows {
        frame.push(" ".repeat(width));
    }
    frame.push(style(fit(&instructions(keymap), width)).dim().to_string());
    let status = status.map_or_else(|| session.status_line(), str::to_string);
    frame.push(style(fit(&status, width)).reverse().to_string());

    // Too short for everything: the bottom lines win
    if frame.len() > rows {
        frame.drain(..frame.len() - rows);
    }
    frame
}

fn draw(term: &Term, session: &Session, keymap: &KeyMap, status: Option<&str>) -> io::Result<()> {
    let (rows, cols) = term.size();
    let frame = render_frame(session, keymap, status, rows as usize, cols as usize);
    term.move_cursor_to(0, 0)?;
    term.clear_screen()?;
    term.write_str(&frame.join("\n"))?;
    term.flush()
}

fn event_loop(term: &Term, session: &mut Session, keymap: &KeyMap) -> io::Result<()> {
    loop {
        draw(term, session, keymap, None)?;

        let Some(action) = key_press(term.read_key()?).and_then(|key| keymap.action_for(key))
        else {
            continue;
        };
        if action == Action::GenerateOutput && session.has_roots() {
            draw(term, session, keymap, Some(GENERATING_MESSAGE))?;
        }
        if session.apply(action) == Flow::Quit {
            return Ok(());
        }
    }
}

/// Run the browser until the user quits.
///
/// Logging is limited to errors while the screen is taken over.
pub fn run(session: &mut Session, keymap: &KeyMap) -> io::Result<()> {
    let term = Term::stdout();
    if !term.is_term() {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            "the interactive browser needs a terminal; use --select for one-shot mode",
        ));
    }

    let previous = log::max_level();
    log::set_max_level(previous.min(LevelFilter::Error));
    term.hide_cursor()?;

    let result = event_loop(&term, session, keymap);

    term.clear_screen()?;
    term.show_cursor()?;
    log::set_max_level(previous);
    result
}
