use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode as CrosstermKeyCode, KeyEvent as CrosstermKeyEvent,
    KeyEventKind, KeyModifiers as CrosstermKeyModifiers,
};
use crossterm::style::{
    Color as CrosstermColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
    SetForegroundColor,
};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};

use crate::ui::span::SpanLine;
use crate::ui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Unknown,
    Char(char),
    Enter,
    Tab,
    Esc,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyModifiers(u8);

impl KeyModifiers {
    pub const NONE: Self = Self(0);
    pub const SHIFT: Self = Self(1 << 0);
    pub const CONTROL: Self = Self(1 << 1);
    pub const ALT: Self = Self(1 << 2);

    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    pub fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalEvent {
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
}

/// Minimal crossterm backend for the demo host: raw-mode alternate screen,
/// key events, span-line drawing.
pub struct Terminal {
    out: Stdout,
}

impl Terminal {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }

    pub fn enter(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(self.out, EnterAlternateScreen, Hide)
    }

    pub fn exit(&mut self) -> io::Result<()> {
        execute!(self.out, Show, LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn poll(&self, timeout: Duration) -> io::Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event(&mut self) -> io::Result<Option<TerminalEvent>> {
        match event::read()? {
            CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => {
                Ok(Some(TerminalEvent::Key(map_key(key))))
            }
            CrosstermEvent::Resize(width, height) => {
                Ok(Some(TerminalEvent::Resize { width, height }))
            }
            _ => Ok(None),
        }
    }

    pub fn draw(&mut self, lines: &[SpanLine]) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        for (row, line) in lines.iter().enumerate() {
            queue!(self.out, MoveTo(0, row as u16))?;
            for span in line {
                if let Some(color) = span.style.color {
                    queue!(self.out, SetForegroundColor(map_color(color)))?;
                }
                if let Some(color) = span.style.background {
                    queue!(self.out, SetBackgroundColor(map_color(color)))?;
                }
                if span.style.bold {
                    queue!(
                        self.out,
                        SetAttribute(crossterm::style::Attribute::Bold)
                    )?;
                }
                queue!(self.out, Print(span.text.as_str()), ResetColor)?;
                if span.style.bold {
                    queue!(
                        self.out,
                        SetAttribute(crossterm::style::Attribute::Reset)
                    )?;
                }
            }
        }
        self.out.flush()
    }
}

fn map_key(key: CrosstermKeyEvent) -> KeyEvent {
    let code = match key.code {
        CrosstermKeyCode::Char(ch) => KeyCode::Char(ch),
        CrosstermKeyCode::Enter => KeyCode::Enter,
        CrosstermKeyCode::Tab => KeyCode::Tab,
        CrosstermKeyCode::Esc => KeyCode::Esc,
        CrosstermKeyCode::Backspace => KeyCode::Backspace,
        CrosstermKeyCode::Delete => KeyCode::Delete,
        CrosstermKeyCode::Left => KeyCode::Left,
        CrosstermKeyCode::Right => KeyCode::Right,
        CrosstermKeyCode::Up => KeyCode::Up,
        CrosstermKeyCode::Down => KeyCode::Down,
        _ => KeyCode::Unknown,
    };
    let mut modifiers = KeyModifiers::NONE;
    if key.modifiers.contains(CrosstermKeyModifiers::SHIFT) {
        modifiers = KeyModifiers(modifiers.0 | KeyModifiers::SHIFT.0);
    }
    if key.modifiers.contains(CrosstermKeyModifiers::CONTROL) {
        modifiers = KeyModifiers(modifiers.0 | KeyModifiers::CONTROL.0);
    }
    if key.modifiers.contains(CrosstermKeyModifiers::ALT) {
        modifiers = KeyModifiers(modifiers.0 | KeyModifiers::ALT.0);
    }
    KeyEvent { code, modifiers }
}

fn map_color(color: Color) -> CrosstermColor {
    match color {
        Color::Reset => CrosstermColor::Reset,
        Color::Black => CrosstermColor::Black,
        Color::Red => CrosstermColor::Red,
        Color::Green => CrosstermColor::Green,
        Color::Yellow => CrosstermColor::Yellow,
        Color::Blue => CrosstermColor::Blue,
        Color::Magenta => CrosstermColor::Magenta,
        Color::Cyan => CrosstermColor::Cyan,
        Color::White => CrosstermColor::White,
        Color::DarkGrey => CrosstermColor::DarkGrey,
        Color::Tomato => CrosstermColor::Rgb {
            r: 255,
            g: 99,
            b: 71,
        },
        Color::Orange => CrosstermColor::Rgb {
            r: 255,
            g: 165,
            b: 0,
        },
        Color::Grey => CrosstermColor::Grey,
    }
}
