//! Keystroke grammar.
//!
//! Alphabetic keys are case-insensitive. Anything not listed here is
//! ignored by the input loop.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A classified keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `0`-`9` or `.`
    Digit(char),
    Backspace,
    Multiply,
    Divide,
    Plus,
    Minus,
    /// `n`: flip the sign of the current line.
    Negate,
    /// `=` or Enter.
    Calculate,
    /// `s`
    Subtotal,
    /// `c`
    Cut,
    /// `z`
    Clear,
    /// `d`: prompt for the number of significant digits.
    SetDigits,
    /// `p`: prompt for the printer device.
    SetPrinter,
    /// `?`
    Help,
    /// Alt+F4 (or Ctrl+C, which raw mode turns into a key).
    Exit,
}

impl Command {
    /// Classifies a typed character.
    pub fn from_char(c: char) -> Option<Command> {
        let command = match c.to_ascii_lowercase() {
            '0'..='9' | '.' => Command::Digit(c),
            '*' => Command::Multiply,
            '/' => Command::Divide,
            '+' => Command::Plus,
            '-' => Command::Minus,
            'n' => Command::Negate,
            '=' | '\r' | '\n' => Command::Calculate,
            '\u{8}' | '\u{7f}' => Command::Backspace,
            'c' => Command::Cut,
            's' => Command::Subtotal,
            'z' => Command::Clear,
            'd' => Command::SetDigits,
            'p' => Command::SetPrinter,
            '?' => Command::Help,
            _ => return None,
        };
        Some(command)
    }

    /// Classifies a terminal key event. Key releases and repeats are ignored.
    pub fn from_key_event(event: &KeyEvent) -> Option<Command> {
        if event.kind != KeyEventKind::Press {
            return None;
        }

        match event.code {
            KeyCode::F(4) if event.modifiers.contains(KeyModifiers::ALT) => Some(Command::Exit),
            KeyCode::Char('c') | KeyCode::Char('C')
                if event.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                Some(Command::Exit)
            }
            KeyCode::Char(c) => Self::from_char(c),
            KeyCode::Enter => Some(Command::Calculate),
            KeyCode::Backspace => Some(Command::Backspace),
            _ => None,
        }
    }
}
