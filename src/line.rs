//! The addition line being built: its printed text and multiplicative total.
//!
//! A line starts with a two-character sign/indent prefix and grows one
//! operand at a time. Between a flush and the next reset the text is
//! deliberately absent; reading it in that window is a bug in the caller.

use crate::error::{Result, TapeError};
use crate::format::DecimalFormatter;
use crate::number::NumberBuffer;
use rust_decimal::Decimal;

/// Operator joining the next operand to the line total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOperator {
    Multiply,
    Divide,
}

impl LineOperator {
    /// Glyph printed between operands.
    pub fn glyph(self) -> &'static str {
        match self {
            LineOperator::Multiply => " * ",
            LineOperator::Divide => " / ",
        }
    }
}

/// Text and sub-total of the current addition line.
#[derive(Debug, Clone)]
pub struct LineAccumulator {
    /// `None` between a [`flush`](Self::flush) and the next [`reset`](Self::reset).
    text: Option<String>,

    /// Product/quotient of the operands folded in so far.
    total: Decimal,

    /// Operator recorded by the last multiply/divide key, if any.
    operator: Option<LineOperator>,

    /// Sign applied to the whole line when it is flushed.
    negative: bool,
}

impl LineAccumulator {
    /// Length of the sign/indent prefix.
    pub const PREFIX_LEN: usize = 2;

    /// Prefix of a line started by Clear.
    pub const BLANK_PREFIX: &'static str = "  ";

    pub fn new() -> Self {
        LineAccumulator {
            text: Some(Self::BLANK_PREFIX.to_string()),
            total: Decimal::ONE,
            operator: None,
            negative: false,
        }
    }

    /// Starts a fresh line with the given prefix and sign.
    pub fn reset(&mut self, prefix: &str, negative: bool) {
        self.text = Some(prefix.to_string());
        self.total = Decimal::ONE;
        self.operator = None;
        self.negative = negative;
    }

    /// Printed text so far.
    ///
    /// # Panics
    ///
    /// Panics if called after [`flush`](Self::flush) and before
    /// the next [`reset`](Self::reset).
    pub fn text(&self) -> &str {
        self.text
            .as_deref()
            .expect("line text read between flush and reset")
    }

    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn operator(&self) -> Option<LineOperator> {
        self.operator
    }

    /// Glyph of the pending operator, or `""`.
    pub fn header(&self) -> &'static str {
        self.operator.map(LineOperator::glyph).unwrap_or("")
    }

    pub fn set_operator(&mut self, operator: LineOperator) {
        self.operator = Some(operator);
    }

    /// Flips the line sign and the leading prefix character to match.
    pub fn negate(&mut self) {
        self.negative = !self.negative;
        let lead = if self.negative { '-' } else { '+' };
        let text = self
            .text
            .as_mut()
            .expect("line negated between flush and reset");
        text.replace_range(..1, &lead.to_string());
    }

    /// Folds the buffered operand into the line.
    ///
    /// The first operand on a line seeds the total (an empty buffer counts
    /// as 0 here). Later operands multiply or divide it (an empty buffer
    /// counts as 1), and dividing by zero sets the total to zero.
    pub fn finish_number(
        &mut self,
        number: &mut NumberBuffer,
        formatter: &DecimalFormatter,
    ) -> Result<()> {
        let operator = self.operator;
        let text = self
            .text
            .as_mut()
            .expect("operand finished between flush and reset");

        let value = if text.len() > Self::PREFIX_LEN {
            let value = number.take().unwrap_or(Decimal::ONE);
            let combined = match operator {
                Some(LineOperator::Divide) if value.is_zero() => Some(Decimal::ZERO),
                Some(LineOperator::Divide) => self.total.checked_div(value),
                _ => self.total.checked_mul(value),
            };
            self.total = combined.ok_or_else(|| TapeError::Overflow(formatter.format(value)))?;
            text.push_str(operator.map(LineOperator::glyph).unwrap_or(""));
            value
        } else {
            let value = number.take().unwrap_or(Decimal::ZERO);
            self.total = value;
            value
        };

        text.push_str(&formatter.format(value));
        Ok(())
    }

    /// Applies the line sign to the total and returns it.
    pub fn signed_total(&self) -> Decimal {
        if self.negative {
            -self.total
        } else {
            self.total
        }
    }

    /// Ends the line: returns its text and signed total, resets the total
    /// to 1 and drops the pending operator.
    ///
    /// The text stays invalid until the next [`reset`](Self::reset).
    pub fn flush(&mut self) -> (String, Decimal) {
        let text = self
            .text
            .take()
            .expect("line flushed twice without reset");
        let total = self.signed_total();
        self.total = Decimal::ONE;
        self.operator = None;
        (text, total)
    }
}

impl Default for LineAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn number(keys: &str) -> NumberBuffer {
        let mut b = NumberBuffer::new();
        keys.chars().for_each(|c| b.push(c));
        b
    }

    #[test]
    fn test_first_operand_seeds_total() {
        let f = DecimalFormatter::default();
        let mut line = LineAccumulator::new();
        line.finish_number(&mut number("12.5"), &f).unwrap();

        assert_eq!(line.total(), dec!(12.5));
        assert_eq!(line.text(), "  12.5");
    }

    #[test]
    fn test_empty_first_operand_is_zero() {
        let f = DecimalFormatter::default();
        let mut line = LineAccumulator::new();
        line.finish_number(&mut NumberBuffer::new(), &f).unwrap();

        assert_eq!(line.total(), Decimal::ZERO);
        assert_eq!(line.text(), "  0");
    }

    #[test]
    fn test_empty_later_operand_is_one() {
        let f = DecimalFormatter::default();
        let mut line = LineAccumulator::new();
        line.finish_number(&mut number("7"), &f).unwrap();
        line.set_operator(LineOperator::Multiply);
        line.finish_number(&mut NumberBuffer::new(), &f).unwrap();

        assert_eq!(line.total(), dec!(7));
        assert_eq!(line.text(), "  7 * 1");
    }

    #[test]
    fn test_multiply_and_divide() {
        let f = DecimalFormatter::default();
        let mut line = LineAccumulator::new();
        line.finish_number(&mut number("6"), &f).unwrap();
        line.set_operator(LineOperator::Multiply);
        line.finish_number(&mut number("4"), &f).unwrap();
        line.set_operator(LineOperator::Divide);
        line.finish_number(&mut number("8"), &f).unwrap();

        assert_eq!(line.total(), dec!(3));
        assert_eq!(line.text(), "  6 * 4 / 8");
    }

    #[test]
    fn test_divide_by_zero_resolves_to_zero() {
        let f = DecimalFormatter::default();
        let mut line = LineAccumulator::new();
        line.finish_number(&mut number("10"), &f).unwrap();
        line.set_operator(LineOperator::Divide);
        line.finish_number(&mut number("0.0"), &f).unwrap();

        assert_eq!(line.total(), Decimal::ZERO);
        assert_eq!(line.text(), "  10 / 0");
    }

    #[test]
    fn test_overflow_keeps_previous_total() {
        let f = DecimalFormatter::default();
        let mut line = LineAccumulator::new();
        let big = "9".repeat(NumberBuffer::MAX_LEN);
        line.finish_number(&mut number(&big), &f).unwrap();
        line.set_operator(LineOperator::Multiply);

        let err = line.finish_number(&mut number(&big), &f).unwrap_err();
        assert!(matches!(err, TapeError::Overflow(_)));
        assert_eq!(line.total().to_string(), big);
    }

    #[test]
    fn test_negate_rewrites_lead_character_only() {
        let f = DecimalFormatter::default();
        let mut line = LineAccumulator::new();
        line.finish_number(&mut number("5"), &f).unwrap();

        line.negate();
        assert_eq!(line.text(), "- 5");
        assert!(line.is_negative());
        assert_eq!(line.signed_total(), dec!(-5));

        line.negate();
        assert_eq!(line.text(), "+ 5");
        assert!(!line.is_negative());
        assert_eq!(line.signed_total(), dec!(5));
    }

    #[test]
    fn test_flush_returns_signed_total_and_resets() {
        let f = DecimalFormatter::default();
        let mut line = LineAccumulator::new();
        line.reset("- ", true);
        line.finish_number(&mut number("3"), &f).unwrap();
        line.set_operator(LineOperator::Multiply);
        line.finish_number(&mut number("2"), &f).unwrap();

        let (text, total) = line.flush();
        assert_eq!(text, "- 3 * 2");
        assert_eq!(total, dec!(-6));
        assert_eq!(line.total(), Decimal::ONE);
        assert_eq!(line.header(), "");
        assert!(!line.has_text());

        line.reset("+ ", false);
        assert_eq!(line.text(), "+ ");
        assert!(!line.is_negative());
    }

    #[test]
    #[should_panic(expected = "between flush and reset")]
    fn test_reading_text_after_flush_panics() {
        let mut line = LineAccumulator::new();
        line.flush();
        let _ = line.text();
    }
}
