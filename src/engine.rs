//! Core adding-machine engine.
//!
//! Interprets one classified keystroke at a time. Multiplication and
//! division build up a line total; plus, minus, subtotal and calculate
//! flush that line onto the tape and fold it into the grand total.

use crate::error::{Result, TapeError};
use crate::format::DecimalFormatter;
use crate::keys::Command;
use crate::line::{LineAccumulator, LineOperator};
use crate::number::NumberBuffer;
use crate::printer::{Printer, CUT_PAPER, REMOVE_WATERMARK};
use log::{debug, warn};
use rust_decimal::Decimal;
use std::io::Write;

/// Separator printed around the paper cut on Clear.
pub const SEPARATOR: &str = "--------------------------------------------";

/// Usage text shown by the help key.
pub const HELP: &[&str] = &[
    "TapeCalc usage:",
    "Each line is added to the total, and may contain multiplications and divisions inside it.",
    "Supported operations: +, -, *, /",
    "Press = or enter to calculate the result and start over.",
    "Press n to negate the current line",
    "Press z to clear",
    "Press c to cut the printer paper",
    "Press s to print a subtotal",
    "Press d to change the number of significant digits",
    "Press p to change the printer's port",
    "Press Alt+F4 to cut the paper and exit",
];

/// Independent status toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateFlags {
    /// Paper should be cut before the next clear.
    pub should_cut: bool,

    /// An implicit subtotal line is pending.
    pub should_calculate: bool,

    /// The current line used `*` or `/`, so its result is echoed on flush.
    pub should_calculate_line: bool,
}

/// Question the input loop must ask before the engine can continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    SignificantDigits,
    PrinterTarget,
}

impl Prompt {
    pub fn title(self) -> &'static str {
        match self {
            Prompt::SignificantDigits => "Change number of significant digits.",
            Prompt::PrinterTarget => "Change printer port.",
        }
    }

    pub fn question(self) -> &'static str {
        match self {
            Prompt::SignificantDigits => "New number? ",
            Prompt::PrinterTarget => "New port? ",
        }
    }
}

/// What the input loop should do after a keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Ask(Prompt),
    Exit,
}

/// The adding machine.
///
/// Every printed line goes both to `echo` (the on-screen tape) and to the
/// printer. Printer failures are reported and otherwise ignored.
pub struct CalculatorEngine<P: Printer, W: Write> {
    /// Sum of all flushed lines since the last clear.
    grand_total: Decimal,

    line: LineAccumulator,

    number: NumberBuffer,

    flags: StateFlags,

    formatter: DecimalFormatter,

    printer: P,

    echo: W,
}

impl<P: Printer, W: Write> CalculatorEngine<P, W> {
    /// Creates an engine in the cleared state. Nothing is printed until
    /// [`start`](Self::start).
    pub fn new(printer: P, echo: W, formatter: DecimalFormatter) -> Self {
        CalculatorEngine {
            grand_total: Decimal::ZERO,
            line: LineAccumulator::new(),
            number: NumberBuffer::new(),
            flags: StateFlags::default(),
            formatter,
            printer,
            echo,
        }
    }

    /// Removes the printer watermark and prints a fresh tape header.
    pub fn start(&mut self) {
        if let Err(e) = self.printer.write_raw(&REMOVE_WATERMARK) {
            self.report(&e);
        }
        self.clear();
    }

    /// Dispatches one keystroke.
    pub fn apply(&mut self, command: Command) -> Flow {
        debug!("Key {:?}", command);
        match command {
            Command::Digit(c) => self.input(c),
            Command::Backspace => self.backspace(),
            Command::Multiply => self.multiply(),
            Command::Divide => self.divide(),
            Command::Plus => self.plus(),
            Command::Minus => self.minus(),
            Command::Negate => self.negate(),
            Command::Calculate => self.calculate(),
            Command::Subtotal => self.subtotal(),
            Command::Cut => self.cut(),
            Command::Clear => self.clear(),
            Command::Help => self.help(),
            Command::SetDigits => return Flow::Ask(Prompt::SignificantDigits),
            Command::SetPrinter => return Flow::Ask(Prompt::PrinterTarget),
            Command::Exit => {
                self.cut();
                return Flow::Exit;
            }
        }
        Flow::Continue
    }

    /// Feeds the answer to a [`Flow::Ask`] back into the engine.
    ///
    /// Always ends with a clear, whether or not the answer was accepted.
    pub fn answer(&mut self, prompt: Prompt, answer: &str) -> Result<()> {
        match prompt {
            Prompt::SignificantDigits => self.set_significant_digits(answer).map(|_| ()),
            Prompt::PrinterTarget => self.change_printer_target(answer).map(|_| ()),
        }
    }

    pub fn input(&mut self, c: char) {
        self.number.push(c);
    }

    pub fn backspace(&mut self) {
        self.number.backspace();
    }

    pub fn multiply(&mut self) {
        self.multiply_divide(LineOperator::Multiply);
    }

    pub fn divide(&mut self) {
        self.multiply_divide(LineOperator::Divide);
    }

    fn multiply_divide(&mut self, operator: LineOperator) {
        self.finish_number();
        self.line.set_operator(operator);
        self.flags.should_calculate_line = true;
        self.flags.should_calculate = true;
        self.flags.should_cut = true;
    }

    pub fn plus(&mut self) {
        self.plus_minus(false, "+ ");
    }

    pub fn minus(&mut self) {
        self.plus_minus(true, "- ");
    }

    fn plus_minus(&mut self, negative: bool, prefix: &str) {
        self.finish_line();
        self.line.reset(prefix, negative);
        self.flags.should_calculate_line = false;
        self.flags.should_calculate = true;
        self.flags.should_cut = true;
    }

    /// Flips the sign of the line being entered.
    pub fn negate(&mut self) {
        self.line.negate();
    }

    /// Flushes the line, prints the grand total and starts over.
    pub fn calculate(&mut self) {
        self.finish_line();
        let total = format!("= {}", self.formatter.format(self.grand_total));
        self.print_line(&total);
        self.clear();
    }

    /// Flushes the line like plus and prints the running total.
    pub fn subtotal(&mut self) {
        self.plus();
        let total = format!("Subtotal: {}", self.formatter.format(self.grand_total));
        self.print_line(&total);
    }

    /// Feeds and cuts the paper. Calculator state is untouched.
    pub fn cut(&mut self) {
        self.echo_line("");
        self.echo_line("");
        if let Err(e) = self.printer.write_raw(&CUT_PAPER) {
            self.report(&e);
        }
    }

    /// Prints separators around a paper cut and resets all state.
    pub fn clear(&mut self) {
        self.print_line(SEPARATOR);
        self.cut();
        self.print_line(SEPARATOR);

        self.grand_total = Decimal::ZERO;
        self.line = LineAccumulator::new();
        self.number.clear();
        self.flags = StateFlags::default();
    }

    pub fn help(&mut self) {
        self.echo_line("");
        for line in HELP {
            self.echo_line(line);
        }
        self.clear();
    }

    /// Reconfigures the fractional digit count, then clears.
    ///
    /// Invalid input is reported and leaves the formatting unchanged.
    pub fn set_significant_digits(&mut self, input: &str) -> Result<u8> {
        let result = self.formatter.set_significant_digits(input);
        if let Err(e) = &result {
            self.report(e);
        }
        self.clear();
        result
    }

    /// Points the printer at another device, then clears.
    ///
    /// Returns the trimmed identifier so the caller can persist it. A blank
    /// identifier is reported and leaves the printer target unchanged.
    pub fn change_printer_target(&mut self, input: &str) -> Result<String> {
        let target = input.trim();
        let result = if target.is_empty() {
            Err(TapeError::BlankPrinterTarget)
        } else {
            self.printer.retarget(target.to_string());
            Ok(target.to_string())
        };
        if let Err(e) = &result {
            self.report(e);
        }
        self.clear();
        result
    }

    fn finish_number(&mut self) {
        if let Err(e) = self.line.finish_number(&mut self.number, &self.formatter) {
            self.report(&e);
        }
    }

    /// Folds the current line into the grand total and prints it.
    fn finish_line(&mut self) {
        self.finish_number();
        let (text, line_total) = self.line.flush();

        match self.grand_total.checked_add(line_total) {
            Some(total) => self.grand_total = total,
            None => self.report(&TapeError::Overflow(self.formatter.format(line_total))),
        }
        debug!("Flushed {:?} = {}, total {}", text, line_total, self.grand_total);

        self.print_line(&text);
        if self.flags.should_calculate_line {
            self.flags.should_calculate_line = false;
            let result = format!("  (=== {})", self.formatter.format(line_total));
            self.print_line(&result);
        }
    }

    fn print_line(&mut self, line: &str) {
        self.echo_line(line);
        if let Err(e) = self.printer.write_line(line) {
            self.report(&e);
        }
    }

    fn echo_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.echo, "{}", line) {
            warn!("Could not echo tape line: {}", e);
        }
    }

    fn report(&self, e: &TapeError) {
        warn!("{}", e);
        eprintln!();
        eprintln!("{}", e);
    }

    /// The in-progress entry as shown on the status line.
    pub fn display_line(&self) -> String {
        format!("{}{}{}", self.line.text(), self.line.header(), self.number.as_str())
    }

    /// `Subtotal: <grand total>` as shown under the entry.
    pub fn status_line(&self) -> String {
        format!("Subtotal: {}", self.formatter.format(self.grand_total))
    }

    pub fn grand_total(&self) -> Decimal {
        self.grand_total
    }

    pub fn line_total(&self) -> Decimal {
        self.line.total()
    }

    pub fn line_text(&self) -> &str {
        self.line.text()
    }

    pub fn line_negative(&self) -> bool {
        self.line.is_negative()
    }

    pub fn number_text(&self) -> &str {
        self.number.as_str()
    }

    pub fn header(&self) -> &'static str {
        self.line.header()
    }

    pub fn flags(&self) -> StateFlags {
        self.flags
    }

    pub fn formatter(&self) -> &DecimalFormatter {
        &self.formatter
    }

    pub fn printer(&self) -> &P {
        &self.printer
    }

    pub fn echo(&self) -> &W {
        &self.echo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::MemoryPrinter;
    use rust_decimal_macros::dec;

    type TestEngine = CalculatorEngine<MemoryPrinter, Vec<u8>>;

    fn engine() -> TestEngine {
        CalculatorEngine::new(MemoryPrinter::new(), Vec::new(), DecimalFormatter::default())
    }

    fn press(engine: &mut TestEngine, keys: &str) {
        for c in keys.chars() {
            let command = Command::from_char(c).expect("test key is recognised");
            engine.apply(command);
        }
    }

    fn assert_cleared(engine: &TestEngine) {
        assert_eq!(engine.grand_total(), Decimal::ZERO);
        assert_eq!(engine.line_total(), Decimal::ONE);
        assert_eq!(engine.line_text(), "  ");
        assert_eq!(engine.number_text(), "");
        assert_eq!(engine.header(), "");
        assert!(!engine.line_negative());
        assert_eq!(engine.flags(), StateFlags::default());
    }

    #[test]
    fn test_new_engine_is_cleared() {
        let e = engine();
        assert_cleared(&e);
        assert!(e.printer().emissions.is_empty());
    }

    #[test]
    fn test_start_removes_watermark_and_clears() {
        let mut e = engine();
        e.start();

        let p = e.printer();
        assert_eq!(p.emissions[0], crate::printer::Emission::Raw(REMOVE_WATERMARK.to_vec()));
        assert_eq!(p.lines(), vec![SEPARATOR, SEPARATOR]);
        assert_eq!(p.cuts(), 1);
    }

    #[test]
    fn test_multiply_then_plus_then_calculate() {
        let mut e = engine();
        press(&mut e, "5*4+");

        assert_eq!(e.grand_total(), dec!(20));
        assert_eq!(e.printer().lines(), vec!["  5 * 4", "  (=== 20)"]);

        press(&mut e, "=");
        let lines = e.printer().lines();
        assert_eq!(lines[2], "+ 0");
        assert_eq!(lines[3], "= 20");
        assert_cleared(&e);
    }

    #[test]
    fn test_divide_by_zero_folds_zero() {
        let mut e = engine();
        press(&mut e, "7+10/0");
        e.apply(Command::Calculate);

        let lines = e.printer().lines();
        assert_eq!(lines[0], "  7");
        assert_eq!(lines[1], "+ 10 / 0");
        assert_eq!(lines[2], "  (=== 0)");
        assert_eq!(lines[3], "= 7");
    }

    #[test]
    fn test_minus_line_is_subtracted() {
        let mut e = engine();
        press(&mut e, "100-30-2*5+");
        assert_eq!(e.grand_total(), dec!(60));
        assert_eq!(
            e.printer().lines(),
            vec!["  100", "- 30", "- 2 * 5", "  (=== -10)"]
        );
        assert_eq!(e.line_text(), "+ ");
    }

    #[test]
    fn test_flags_follow_operators() {
        let mut e = engine();
        press(&mut e, "3*");
        assert_eq!(
            e.flags(),
            StateFlags {
                should_cut: true,
                should_calculate: true,
                should_calculate_line: true,
            }
        );
        assert_eq!(e.header(), " * ");
        assert_eq!(e.display_line(), "  3 * ");

        press(&mut e, "2+");
        assert_eq!(
            e.flags(),
            StateFlags {
                should_cut: true,
                should_calculate: true,
                should_calculate_line: false,
            }
        );
        assert_eq!(e.header(), "");
        assert_eq!(e.line_total(), Decimal::ONE);
    }

    #[test]
    fn test_negate_twice_restores_line() {
        let mut e = engine();
        press(&mut e, "4+");
        let before = e.line_text().to_string();

        press(&mut e, "n");
        assert_eq!(e.line_text(), "- ");
        assert!(e.line_negative());

        press(&mut e, "n");
        assert_eq!(e.line_text(), before);
        assert!(!e.line_negative());
    }

    #[test]
    fn test_negate_flips_minus_line() {
        let mut e = engine();
        press(&mut e, "10-3n=");
        let lines = e.printer().lines();
        assert_eq!(lines[1], "+ 3");
        assert_eq!(lines[2], "= 13");
    }

    #[test]
    fn test_subtotal_prints_total_without_clearing() {
        let mut e = engine();
        press(&mut e, "2+3s");

        assert_eq!(e.grand_total(), dec!(5));
        assert_eq!(e.printer().lines(), vec!["  2", "+ 3", "Subtotal: 5"]);
        assert_eq!(e.line_text(), "+ ");
        assert_eq!(e.status_line(), "Subtotal: 5");
    }

    #[test]
    fn test_backspace_edits_operand() {
        let mut e = engine();
        press(&mut e, "129");
        e.apply(Command::Backspace);
        assert_eq!(e.number_text(), "12");
        assert_eq!(e.display_line(), "  12");
    }

    #[test]
    fn test_cut_leaves_state_alone() {
        let mut e = engine();
        press(&mut e, "6*7");
        e.apply(Command::Cut);

        assert_eq!(e.number_text(), "7");
        assert_eq!(e.line_total(), dec!(6));
        assert_eq!(e.printer().cuts(), 1);
        assert!(e.printer().lines().is_empty());
    }

    #[test]
    fn test_failing_printer_does_not_disturb_state() {
        let mut e = CalculatorEngine::new(
            MemoryPrinter::failing(),
            Vec::new(),
            DecimalFormatter::default(),
        );
        press(&mut e, "8*2+1");
        let flags = e.flags();
        let total = e.grand_total();
        let line_total = e.line_total();

        e.apply(Command::Cut);

        assert_eq!(e.flags(), flags);
        assert_eq!(e.grand_total(), total);
        assert_eq!(e.line_total(), line_total);
        assert_eq!(total, dec!(16));
    }

    #[test]
    fn test_echo_receives_every_printed_line() {
        let mut e = engine();
        press(&mut e, "1+1=");
        let echo = String::from_utf8(e.echo().clone()).unwrap();
        assert!(echo.contains("  1\n+ 1\n= 2\n"));
        assert!(echo.contains(SEPARATOR));
    }

    #[test]
    fn test_significant_digits_prompt() {
        let mut e = engine();
        assert_eq!(e.apply(Command::SetDigits), Flow::Ask(Prompt::SignificantDigits));

        e.answer(Prompt::SignificantDigits, "4").unwrap();
        assert_eq!(e.formatter().significant_digits(), 4);
        press(&mut e, "1/3=");
        assert!(e.printer().lines().contains(&"= 0.3333"));
    }

    #[test]
    fn test_invalid_significant_digits_keep_format_and_clear() {
        let mut e = engine();
        press(&mut e, "5+");
        let err = e.answer(Prompt::SignificantDigits, "lots").unwrap_err();

        assert!(matches!(err, TapeError::InvalidDigits(_)));
        assert_eq!(e.formatter().significant_digits(), 2);
        assert_cleared(&e);
    }

    #[test]
    fn test_change_printer_target() {
        let mut e = engine();
        assert_eq!(e.apply(Command::SetPrinter), Flow::Ask(Prompt::PrinterTarget));

        let target = e.change_printer_target("  /dev/ttyS2 \n").unwrap();
        assert_eq!(target, "/dev/ttyS2");
        assert_eq!(e.printer().target(), "/dev/ttyS2");

        let err = e.change_printer_target("   ").unwrap_err();
        assert!(matches!(err, TapeError::BlankPrinterTarget));
        assert_eq!(e.printer().target(), "/dev/ttyS2");
    }

    #[test]
    fn test_help_then_clear() {
        let mut e = engine();
        press(&mut e, "9?");
        let echo = String::from_utf8(e.echo().clone()).unwrap();
        assert!(echo.contains("TapeCalc usage:"));
        assert_cleared(&e);
    }

    #[test]
    fn test_exit_cuts() {
        let mut e = engine();
        assert_eq!(e.apply(Command::Exit), Flow::Exit);
        assert_eq!(e.printer().cuts(), 1);
    }
}
