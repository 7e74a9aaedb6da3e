//! CLI logic for the Weft diagram tool.
//!
//! Each subcommand reads one input file: `check` reports its diagnostics,
//! `fmt` rewrites it in canonical form and `highlight` prints its lines with
//! HTML highlighting markers.

pub mod report;

mod args;
mod config;

pub use args::{Args, Command};

use std::{
    fs,
    io::{self, Write},
};

use log::{info, warn};

use weft::{Editor, WeftError};

/// Run the Weft CLI application, writing command output to stdout.
///
/// # Errors
///
/// Returns `WeftError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
pub fn run(args: &Args) -> Result<(), WeftError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with_output(args, &mut out)
}

/// Run the Weft CLI application, writing command output to `out`.
///
/// # Errors
///
/// See [`run`].
pub fn run_with_output(args: &Args, out: &mut dyn Write) -> Result<(), WeftError> {
    let input = args.command.input();
    info!(input_path = input; "Processing file");

    let app_config = config::load_config(args.config.as_ref())?;
    let source = fs::read_to_string(input)?;
    let mut editor = Editor::new(app_config);

    match &args.command {
        Command::Check { .. } => {
            let forest = editor.parse(&source)?;
            info!(elements = forest.len(); "No problems found");
        }
        Command::Fmt { output, .. } => {
            let report = editor.apply(&source)?;
            for edge in &report.unresolved {
                warn!(edge:% = edge; "Edge endpoint names no node, dropped from the output");
            }
            let text = editor.to_text();
            match output {
                Some(path) => {
                    fs::write(path, text)?;
                    info!(output_file = path; "Formatted file written");
                }
                None => out.write_all(text.as_bytes())?,
            }
        }
        Command::Highlight { .. } => {
            let output = weft_parser::parse(&source);
            if output.has_errors() {
                warn!(lines = output.errors.lines().count(); "Highlighting file with errors");
            }
            let lines: Vec<&str> = source.lines().collect();
            for line in weft_parser::highlight::highlight(&lines, &output.errors) {
                writeln!(out, "{line}")?;
            }
        }
    }

    Ok(())
}
