//! Input loop: reads keystrokes, keeps the status region up to date, and
//! asks the questions the engine needs answered.
//!
//! One keystroke is processed to completion, printer I/O included, before
//! the next one is read.

use crate::engine::{CalculatorEngine, Flow, Prompt};
use crate::error::Result;
use crate::keys::Command;
use crate::printer::Printer;
use crate::settings::Settings;
use crossterm::cursor::{MoveToColumn, MoveToPreviousLine};
use crossterm::event::{self, Event};
use crossterm::style::Print;
use crossterm::terminal::{self, ClearType};
use crossterm::{queue, QueueableCommand};
use log::{debug, warn};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Where keystrokes come from.
pub trait KeySource {
    /// Blocks for the next recognised keystroke. `None` means input ended.
    fn next_command(&mut self) -> Result<Option<Command>>;

    /// Asks `prompt` and returns the raw answer line.
    fn read_answer(&mut self, prompt: Prompt) -> Result<String>;

    /// Redraws the two-line status region. Sources without a screen skip it.
    fn show_status(&mut self, _entry: &str, _subtotal: &str) -> Result<()> {
        Ok(())
    }
}

/// Restores cooked mode when dropped, even if reading the key failed.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("Could not leave raw mode: {}", e);
        }
    }
}

/// Live terminal, one raw key at a time.
///
/// Raw mode is only held while waiting for a key, so tape lines and
/// prompts print with ordinary line discipline.
#[derive(Debug, Default)]
pub struct TerminalKeys;

impl TerminalKeys {
    pub fn new() -> Self {
        TerminalKeys
    }

    /// Blanks the status region, leaving the cursor at its start.
    fn clear_status(&mut self) -> io::Result<()> {
        let mut out = io::stdout();
        queue!(out, MoveToColumn(0), terminal::Clear(ClearType::FromCursorDown))?;
        out.flush()
    }
}

impl KeySource for TerminalKeys {
    fn next_command(&mut self) -> Result<Option<Command>> {
        let command = {
            let _raw = RawModeGuard::enable()?;
            loop {
                if let Event::Key(key) = event::read()? {
                    match Command::from_key_event(&key) {
                        Some(command) => break command,
                        None => debug!("Unknown key {:?}", key),
                    }
                }
            }
        };
        self.clear_status()?;
        Ok(Some(command))
    }

    fn read_answer(&mut self, prompt: Prompt) -> Result<String> {
        let mut out = io::stdout();
        writeln!(out)?;
        writeln!(out)?;
        writeln!(out, "{}", prompt.title())?;
        write!(out, "{}", prompt.question())?;
        out.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(answer)
    }

    fn show_status(&mut self, entry: &str, subtotal: &str) -> Result<()> {
        let mut out = io::stdout();
        let column = u16::try_from(entry.chars().count()).unwrap_or(u16::MAX);
        queue!(
            out,
            MoveToColumn(0),
            terminal::Clear(ClearType::FromCursorDown),
            Print(entry),
            Print("\r\n"),
            Print(subtotal),
            MoveToPreviousLine(1),
        )?;
        out.queue(MoveToColumn(column))?;
        out.flush()?;
        Ok(())
    }
}

/// Keystrokes replayed from text, one character per key.
///
/// After `d` or `p` the characters up to the next newline are the answer.
#[derive(Debug, Clone)]
pub struct ScriptKeys {
    keys: VecDeque<char>,
}

impl ScriptKeys {
    pub fn new(script: &str) -> Self {
        ScriptKeys {
            keys: script.chars().collect(),
        }
    }
}

impl KeySource for ScriptKeys {
    fn next_command(&mut self) -> Result<Option<Command>> {
        while let Some(c) = self.keys.pop_front() {
            match Command::from_char(c) {
                Some(command) => return Ok(Some(command)),
                None => debug!("Unknown key {:?}", c),
            }
        }
        Ok(None)
    }

    fn read_answer(&mut self, _prompt: Prompt) -> Result<String> {
        let mut answer = String::new();
        while let Some(c) = self.keys.pop_front() {
            if c == '\n' {
                break;
            }
            answer.push(c);
        }
        Ok(answer)
    }
}

/// Ties the engine to a key source and the persisted settings.
pub struct Session<K: KeySource, P: Printer, W: Write> {
    keys: K,
    engine: CalculatorEngine<P, W>,
    settings: Settings,
    settings_path: PathBuf,
}

impl<K: KeySource, P: Printer, W: Write> Session<K, P, W> {
    pub fn new(
        keys: K,
        engine: CalculatorEngine<P, W>,
        settings: Settings,
        settings_path: PathBuf,
    ) -> Self {
        Session {
            keys,
            engine,
            settings,
            settings_path,
        }
    }

    /// Runs until the exit key or the end of input. Paper is cut either way.
    pub fn run(&mut self) -> Result<()> {
        self.engine.start();

        loop {
            self.keys
                .show_status(&self.engine.display_line(), &self.engine.status_line())?;

            let command = match self.keys.next_command()? {
                Some(command) => command,
                None => {
                    debug!("End of input");
                    self.engine.cut();
                    return Ok(());
                }
            };

            match self.engine.apply(command) {
                Flow::Continue => {}
                Flow::Exit => return Ok(()),
                Flow::Ask(prompt) => {
                    let answer = self.keys.read_answer(prompt)?;
                    self.answer(prompt, &answer);
                }
            }
        }
    }

    /// Hands an answer to the engine and persists a new printer target.
    fn answer(&mut self, prompt: Prompt, answer: &str) {
        match prompt {
            Prompt::SignificantDigits => {
                // Rejections are reported by the engine
                let _ = self.engine.set_significant_digits(answer);
            }
            Prompt::PrinterTarget => {
                if let Ok(port) = self.engine.change_printer_target(answer) {
                    self.settings.port = port;
                    if let Err(e) = self.settings.save(&self.settings_path) {
                        warn!("{}", e);
                        eprintln!("{}", e);
                    }
                }
            }
        }
    }

    pub fn engine(&self) -> &CalculatorEngine<P, W> {
        &self.engine
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
