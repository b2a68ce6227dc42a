//! Buffer for the operand currently being typed.

use log::{debug, warn};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Digits and at most one decimal point, exactly as keyed in.
///
/// Entry is filtered per character, so the buffer always holds text that
/// parses as a non-negative decimal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberBuffer {
    text: String,
}

impl NumberBuffer {
    /// Longest operand accepted; more digits would not fit a 96-bit decimal.
    pub const MAX_LEN: usize = 28;

    pub fn new() -> Self {
        NumberBuffer::default()
    }

    /// Appends a digit or decimal point.
    ///
    /// A second decimal point, any non-digit character, and anything past
    /// [`MAX_LEN`](Self::MAX_LEN) are ignored.
    pub fn push(&mut self, c: char) {
        if c == '.' && self.text.contains('.') {
            return;
        }
        if c != '.' && !c.is_ascii_digit() {
            debug!("Ignoring non-digit operand character {:?}", c);
            return;
        }
        if self.text.len() >= Self::MAX_LEN {
            debug!("Operand already {} characters long, ignoring {:?}", Self::MAX_LEN, c);
            return;
        }
        self.text.push(c);
    }

    /// Removes the last character. No-op on an empty buffer.
    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Parses and clears the buffer.
    ///
    /// Returns `None` for an empty buffer; whether that means 0 or 1 is up
    /// to the caller. A lone `.` resolves to zero.
    pub fn take(&mut self) -> Option<Decimal> {
        if self.text.is_empty() {
            return None;
        }

        let text = std::mem::take(&mut self.text);
        let digits = text.trim_end_matches('.');
        if digits.is_empty() {
            return Some(Decimal::ZERO);
        }

        let value = if let Some(fraction) = digits.strip_prefix('.') {
            Decimal::from_str(&format!("0.{}", fraction))
        } else {
            Decimal::from_str(digits)
        };

        Some(value.unwrap_or_else(|e| {
            warn!("Operand {:?} did not parse ({}), using 0", text, e);
            Decimal::ZERO
        }))
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}
