//! TapeCalc CLI
//!
//! Turns the terminal into an adding machine that prints to a serial
//! receipt printer.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --port /dev/ttyUSB0
//! printf '5*4+3=' | cargo run -- --script -
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use tapecalc::{
    CalculatorEngine, DecimalFormatter, Printer, Result, ScriptKeys, SerialPrinter, Session,
    Settings, TerminalKeys,
};

#[derive(Debug, Parser)]
#[command(name = "tapecalc", version, about = "Adding machine with a receipt printer tape")]
struct Cli {
    /// Settings file holding the printer port
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Printer device for this run only (not saved)
    #[arg(long, value_name = "ID")]
    port: Option<String>,

    /// Replay keystrokes from a file, or `-` for stdin, instead of the terminal
    #[arg(long, value_name = "FILE")]
    script: Option<String>,

    /// Fractional digits shown until changed with `d`
    #[arg(long, value_name = "N", default_value_t = DecimalFormatter::DEFAULT_SIGNIFICANT_DIGITS)]
    digits: u8,
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings_path = cli.config.unwrap_or_else(Settings::default_path);
    let settings = Settings::load(&settings_path)?;

    let mut printer = SerialPrinter::from_settings(&settings);
    if let Some(port) = cli.port {
        printer.retarget(port);
    }

    let engine = CalculatorEngine::new(printer, io::stdout(), DecimalFormatter::new(cli.digits));

    match cli.script {
        Some(source) => {
            let script = read_script(&source)?;
            Session::new(ScriptKeys::new(&script), engine, settings, settings_path).run()
        }
        None => Session::new(TerminalKeys::new(), engine, settings, settings_path).run(),
    }
}

fn read_script(source: &str) -> Result<String> {
    if source == "-" {
        let mut script = String::new();
        io::stdin().read_to_string(&mut script)?;
        Ok(script)
    } else {
        Ok(fs::read_to_string(source)?)
    }
}
