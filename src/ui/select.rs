//! Inline single-select prompt
//!
//! Draws a scrolling list below the cursor and lets the user pick one row.
//! Key handling lives in [`SelectState`] so it can be driven without a
//! terminal.

use std::io::{self, Write};
use std::ops::Range;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Stylize;
use crossterm::{cursor, queue, terminal};
use thiserror::Error;

use super::templates::ItemTemplate;
use crate::terminal::RawModeGuard;

/// Rows shown at once unless configured otherwise
pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("^C")]
    Interrupted,
    #[error("^D")]
    Aborted,
    #[error("nothing to select")]
    Empty,
    #[error("unable to run prompt: {0}")]
    Io(#[from] io::Error),
}

/// A prompt row pre-rendered in its three states
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptItem {
    pub active: String,
    pub inactive: String,
    pub selected: String,
}

impl PromptItem {
    pub fn render<T>(item: &T, template: &impl ItemTemplate<T>) -> Self {
        Self {
            active: template.active(item),
            inactive: template.inactive(item),
            selected: template.selected(item),
        }
    }
}

/// Something that asks the user to pick one of `items`
pub trait Chooser {
    /// Index of the chosen item
    fn choose(&self, label: &str, items: &[PromptItem]) -> Result<usize, PromptError>;
}

/// Outcome of a single key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAction {
    /// Nothing changed
    None,
    /// Cursor moved, list must be redrawn
    Redraw,
    /// Row confirmed
    Select(usize),
    Interrupt,
    Abort,
}

/// Cursor and scroll window over a list of `len` rows
#[derive(Debug, Clone)]
pub struct SelectState {
    cursor: usize,
    top: usize,
    len: usize,
    page_size: usize,
    vim_mode: bool,
}

impl SelectState {
    pub fn new(len: usize, page_size: usize, vim_mode: bool) -> Self {
        Self {
            cursor: 0,
            top: 0,
            len,
            page_size: page_size.max(1),
            vim_mode,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Indices of the rows currently on screen
    pub fn visible(&self) -> Range<usize> {
        self.top..(self.top + self.page_size).min(self.len)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> SelectAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => SelectAction::Interrupt,
                KeyCode::Char('d') => SelectAction::Abort,
                _ => SelectAction::None,
            };
        }

        match key.code {
            KeyCode::Enter => SelectAction::Select(self.cursor),
            KeyCode::Esc => SelectAction::Abort,
            KeyCode::Up => self.move_by(-1),
            KeyCode::Down => self.move_by(1),
            KeyCode::Left | KeyCode::PageUp => self.move_by(-(self.page_size as isize)),
            KeyCode::Right | KeyCode::PageDown => self.move_by(self.page_size as isize),
            KeyCode::Home => self.move_to(0),
            KeyCode::End => self.move_to(self.len.saturating_sub(1)),
            KeyCode::Char(c) if self.vim_mode => match c {
                'k' => self.move_by(-1),
                'j' => self.move_by(1),
                'h' => self.move_by(-(self.page_size as isize)),
                'l' => self.move_by(self.page_size as isize),
                'g' => self.move_to(0),
                'G' => self.move_to(self.len.saturating_sub(1)),
                _ => SelectAction::None,
            },
            _ => SelectAction::None,
        }
    }

    fn move_by(&mut self, delta: isize) -> SelectAction {
        let last = self.len.saturating_sub(1) as isize;
        let target = (self.cursor as isize + delta).clamp(0, last);
        self.move_to(target as usize)
    }

    fn move_to(&mut self, index: usize) -> SelectAction {
        let index = index.min(self.len.saturating_sub(1));
        if index == self.cursor {
            return SelectAction::None;
        }

        self.cursor = index;
        if self.cursor < self.top {
            self.top = self.cursor;
        } else if self.cursor >= self.top + self.page_size {
            self.top = self.cursor + 1 - self.page_size;
        }
        SelectAction::Redraw
    }
}

fn help_line(vim_mode: bool) -> &'static str {
    if vim_mode {
        "Use j/k to move, h/l to page, enter to select"
    } else {
        "Use the arrow keys to navigate: ↓ ↑ → ←"
    }
}

/// Lines making up one frame of the prompt
pub fn render_frame(
    label: &str,
    items: &[PromptItem],
    state: &SelectState,
    naked: bool,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(state.page_size + 2);

    let header = if naked {
        format!("? {}", label)
    } else {
        format!("{} {}", "?".blue().bold(), label.bold())
    };
    lines.push(header);
    lines.push(help_line(state.vim_mode).to_string());

    for index in state.visible() {
        let item = &items[index];
        if index == state.cursor {
            lines.push(item.active.clone());
        } else {
            lines.push(item.inactive.clone());
        }
    }

    lines
}

/// Replace the previous frame (`previous` screen rows tall) with `lines`
///
/// Returns the number of screen rows the new frame occupies on a terminal
/// `width` columns wide; `0` means unknown and counts one row per line.
/// Expects raw mode, hence `\r\n`.
pub fn paint<W: Write>(
    out: &mut W,
    previous: usize,
    lines: &[String],
    width: u16,
) -> io::Result<usize> {
    erase(out, previous)?;
    write!(out, "{}", lines.join("\r\n"))?;
    out.flush()?;
    Ok(screen_rows(lines, width))
}

/// Rows `lines` take up once the terminal has wrapped them
pub fn screen_rows(lines: &[String], width: u16) -> usize {
    let width = usize::from(width);
    lines
        .iter()
        .map(|line| match width {
            0 => 1,
            w => display_width(line).div_ceil(w).max(1),
        })
        .sum()
}

/// Printable columns in `line`, skipping CSI escape sequences
fn display_width(line: &str) -> usize {
    let mut chars = line.chars();
    let mut width = 0;

    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            if chars.next() == Some('[') {
                // Parameters run until a final byte in '@'..='~'
                for c in chars.by_ref() {
                    if ('@'..='~').contains(&c) {
                        break;
                    }
                }
            }
            continue;
        }
        width += 1;
    }

    width
}

fn terminal_width() -> u16 {
    terminal::size().map(|(cols, _)| cols).unwrap_or(0)
}

fn erase<W: Write>(out: &mut W, previous: usize) -> io::Result<()> {
    if previous > 1 {
        queue!(out, cursor::MoveUp((previous - 1) as u16))?;
    }
    queue!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(terminal::ClearType::FromCursorDown)
    )
}

/// [`Chooser`] drawing on the controlling terminal
#[derive(Debug, Clone)]
pub struct TerminalChooser {
    pub vim_mode: bool,
    pub naked: bool,
    pub page_size: usize,
}

impl Default for TerminalChooser {
    fn default() -> Self {
        Self {
            vim_mode: false,
            naked: false,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TerminalChooser {
    fn run<W: Write>(
        &self,
        out: &mut W,
        label: &str,
        items: &[PromptItem],
    ) -> Result<usize, PromptError> {
        let mut state = SelectState::new(items.len(), self.page_size, self.vim_mode);
        let mut height = paint(
            out,
            0,
            &render_frame(label, items, &state, self.naked),
            terminal_width(),
        )?;

        loop {
            let key = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => key,
                Event::Resize(cols, _) => {
                    height = paint(out, height, &render_frame(label, items, &state, self.naked), cols)?;
                    continue;
                }
                _ => continue,
            };

            match state.handle_key(key) {
                SelectAction::None => {}
                SelectAction::Redraw => {
                    height = paint(
                        out,
                        height,
                        &render_frame(label, items, &state, self.naked),
                        terminal_width(),
                    )?;
                }
                SelectAction::Select(index) => {
                    erase(out, height)?;
                    write!(out, "{}\r\n", items[index].selected)?;
                    out.flush()?;
                    return Ok(index);
                }
                SelectAction::Interrupt => {
                    erase(out, height)?;
                    out.flush()?;
                    return Err(PromptError::Interrupted);
                }
                SelectAction::Abort => {
                    erase(out, height)?;
                    out.flush()?;
                    return Err(PromptError::Aborted);
                }
            }
        }
    }
}

impl Chooser for TerminalChooser {
    fn choose(&self, label: &str, items: &[PromptItem]) -> Result<usize, PromptError> {
        if items.is_empty() {
            return Err(PromptError::Empty);
        }

        let mut out = io::stdout();
        let raw = RawModeGuard::enable()?;
        queue!(out, cursor::Hide)?;

        let result = self.run(&mut out, label, items);

        if let Err(e) = queue!(out, cursor::Show).and_then(|_| out.flush()) {
            tracing::warn!("Failed to restore cursor: {}", e);
        }
        drop(raw);

        result
    }
}
