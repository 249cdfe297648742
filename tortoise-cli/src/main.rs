//! `tortoise` CLI: run turtle programs and write SVG.

use std::fs;
use std::io::{self, Write};
use std::process;

use clap::Parser;

use tortoise_core::error::Severity;
use tortoise_core::interpreter::{Interpreter, RunOptions};
use tortoise_svg::{RenderOptions, render_to_bytes};

#[derive(Parser)]
#[command(version, about = "Tortoise: run turtle programs and render them as SVG")]
struct Cli {
    /// Program file to run
    file: Option<String>,

    /// Run the given program text instead of reading a file
    #[arg(short = 'e', long = "eval")]
    eval: Option<String>,

    /// Output SVG file; standard output when omitted or "-"
    #[arg(short, long)]
    output: Option<String>,

    /// Canvas width
    #[arg(long, default_value_t = 500.0)]
    width: f64,

    /// Canvas height
    #[arg(long, default_value_t = 500.0)]
    height: f64,

    /// Operations allowed before the run is stopped
    #[arg(long = "max-operations", default_value_t = 1_000_000)]
    max_operations: u64,

    /// Draw the turtle at its final position
    #[arg(long)]
    cursor: bool,

    /// Do not print diagnostics
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    let source = read_source(&cli);

    let mut interp = Interpreter::with_options(RunOptions {
        width: cli.width,
        height: cli.height,
        max_operations: cli.max_operations,
        draw_cursor: cli.cursor,
    });
    interp.run(&source);

    let to_stdout = cli.output.as_deref().is_none_or(|o| o == "-");
    if !cli.quiet {
        print_diagnostics(&interp, to_stdout);
    }

    let bytes = render_to_bytes(interp.picture(), &RenderOptions::default());
    match cli.output.as_deref() {
        Some(path) if path != "-" => write_svg(path, &bytes, cli.quiet),
        _ => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = stdout.write_all(&bytes).and_then(|()| stdout.flush()) {
                eprintln!("Error writing SVG: {e}");
                process::exit(1);
            }
        }
    }
}

fn read_source(cli: &Cli) -> String {
    if let Some(ref program) = cli.eval {
        return program.clone();
    }
    if let Some(ref file) = cli.file {
        match fs::read(file) {
            Ok(bytes) => return String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                eprintln!("Error reading {file}: {e}");
                process::exit(1);
            }
        }
    }
    eprintln!("No input file or program specified");
    process::exit(1);
}

/// Info goes to stdout unless the SVG itself is written there.
fn print_diagnostics(interp: &Interpreter, svg_on_stdout: bool) {
    for err in &interp.errors {
        match err.severity {
            Severity::Info if !svg_on_stdout => println!("{err}"),
            Severity::Info => eprintln!("{err}"),
            Severity::Warning => eprintln!("Warning: {err}"),
            Severity::Error => eprintln!("Error: {err}"),
        }
    }
}

fn write_svg(path: &str, content: &[u8], quiet: bool) {
    match fs::write(path, content) {
        Ok(()) => {
            if !quiet {
                eprintln!("Wrote {path}");
            }
        }
        Err(e) => {
            eprintln!("Error writing {path}: {e}");
            process::exit(1);
        }
    }
}
