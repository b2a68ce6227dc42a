//! # TapeCalc
//!
//! An adding-machine emulator. Each line is added to a running total and
//! may itself multiply or divide several numbers; every finished line is
//! printed to a receipt printer as it would be on a paper tape.
//!
//! ## Design Principles
//!
//! - **Decimal arithmetic**: `rust_decimal`, no floating point
//! - **One keystroke at a time**: the engine is a plain state machine,
//!   testable without a terminal or printer
//! - **Printer failures are never fatal**: reported and skipped
//!
//! ## Example
//!
//! ```
//! use tapecalc::{CalculatorEngine, Command, DecimalFormatter, MemoryPrinter};
//!
//! let mut engine = CalculatorEngine::new(MemoryPrinter::new(), Vec::new(), DecimalFormatter::default());
//! for c in "5*4+".chars() {
//!     engine.apply(Command::from_char(c).unwrap());
//! }
//! assert_eq!(engine.printer().lines(), vec!["  5 * 4", "  (=== 20)"]);
//! assert_eq!(engine.status_line(), "Subtotal: 20");
//! ```

pub mod console;
pub mod engine;
pub mod error;
pub mod format;
pub mod keys;
pub mod line;
pub mod number;
pub mod printer;
pub mod settings;

pub use console::{KeySource, ScriptKeys, Session, TerminalKeys};
pub use engine::{CalculatorEngine, Flow, Prompt, StateFlags};
pub use error::{Result, TapeError};
pub use format::DecimalFormatter;
pub use keys::Command;
pub use line::{LineAccumulator, LineOperator};
pub use number::NumberBuffer;
pub use printer::{Emission, MemoryPrinter, Printer, SerialPrinter, CUT_PAPER, REMOVE_WATERMARK};
pub use settings::Settings;
