use std::{
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use viper::{EvaluationContext, Report};

const PROMPT: &str = ">>> ";

/// Interpreter for the viper scripting language. Starts an interactive shell
/// unless a script is given.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Script to run as a single program.
    script: Option<PathBuf>,

    /// Print every outcome as a JSON line.
    #[arg(long)]
    json: bool,

    /// Log parser and evaluator activity to stderr. Overrides `RUST_LOG`.
    #[arg(long)]
    trace: bool,

    /// Skip the greeting line of the shell.
    #[arg(long)]
    no_banner: bool,
}

fn init_tracing(trace: bool) -> anyhow::Result<()> {
    let filter = if trace {
        EnvFilter::try_new("viper=trace")?
    } else {
        EnvFilter::from_default_env()
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .init();
    Ok(())
}

fn print_report(out: &mut impl Write, report: &Report, json: bool) -> anyhow::Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string(report)?)?;
    } else if *report != Report::Empty {
        writeln!(out, "{}", report)?;
    }
    Ok(())
}

fn run_shell(args: &Args) -> anyhow::Result<()> {
    let mut context = EvaluationContext::new();
    let mut stdout = io::stdout().lock();

    if !args.no_banner {
        writeln!(
            stdout,
            "Viper {} on {}({})",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS,
            std::env::consts::ARCH
        )?;
    }

    let mut lines = io::stdin().lock().lines();
    loop {
        write!(stdout, "{}", PROMPT)?;
        stdout.flush()?;

        let Some(line) = lines.next() else { break };
        let report = context.report(&line?);
        print_report(&mut stdout, &report, args.json)?;
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.trace)?;

    let Some(path) = &args.script else { return run_shell(&args) };

    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read the script '{}'", path.display()))?;

    let report = EvaluationContext::new().report(&source);
    print_report(&mut io::stdout().lock(), &report, args.json)?;

    if !report.is_ok() {
        std::process::exit(1);
    }
    Ok(())
}
