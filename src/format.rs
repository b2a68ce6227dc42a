//! Decimal rendering for the tape and the status line.
//!
//! Values are rounded half away from zero to the configured number of
//! fractional digits, trailing zeros are dropped, and the integer part is
//! grouped in threes with `,`.

use crate::error::{Result, TapeError};
use rust_decimal::{Decimal, RoundingStrategy};

/// Renders decimals with a runtime-configurable number of fractional digits.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use tapecalc::DecimalFormatter;
///
/// let formatter = DecimalFormatter::default();
/// assert_eq!(formatter.format(Decimal::new(12345678, 3)), "12,345.68");
/// assert_eq!(formatter.format(Decimal::new(5, 1)), "0.5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalFormatter {
    significant_digits: u8,
}

impl DecimalFormatter {
    /// Fractional digits shown until reconfigured.
    pub const DEFAULT_SIGNIFICANT_DIGITS: u8 = 2;

    /// Creates a formatter showing at most `significant_digits` fractional digits.
    pub fn new(significant_digits: u8) -> Self {
        DecimalFormatter { significant_digits }
    }

    pub fn significant_digits(&self) -> u8 {
        self.significant_digits
    }

    /// Reconfigures the fractional digit count from user input.
    ///
    /// Surrounding whitespace is ignored. Anything that is not an integer in
    /// `0..=255` is rejected and the previous configuration is kept.
    pub fn set_significant_digits(&mut self, input: &str) -> Result<u8> {
        let digits = input
            .trim()
            .parse::<u8>()
            .map_err(|_| TapeError::InvalidDigits(input.to_string()))?;
        self.significant_digits = digits;
        Ok(digits)
    }

    /// Formats `value` using grouping separators and up to the configured
    /// number of fractional digits.
    pub fn format(&self, value: Decimal) -> String {
        let rounded = value
            .round_dp_with_strategy(
                u32::from(self.significant_digits),
                RoundingStrategy::MidpointAwayFromZero,
            )
            .normalize();

        if rounded.is_zero() {
            return "0".to_string();
        }

        group_thousands(&rounded.to_string())
    }
}

impl Default for DecimalFormatter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIGNIFICANT_DIGITS)
    }
}

/// Inserts `,` between every three digits of the integer part.
fn group_thousands(plain: &str) -> String {
    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (unsigned, None),
    };

    let mut result = String::with_capacity(plain.len() + integer.len() / 3);
    result.push_str(sign);

    let len = integer.len();
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    if let Some(fraction) = fraction {
        result.push('.');
        result.push_str(fraction);
    }

    result
}
