use std::io::{self, IsTerminal, Read};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use cmlformula::{formula_from_cml, FormulaOptions, HydrogenPolicy};
use log::info;

mod cli;
mod logger;

fn main() -> ExitCode {
    let cli = cli::parse();
    logger::init(logger::level_for(cli.verbose, cli.quiet));

    match run(&cli) {
        Ok(formula) => {
            println!("{formula}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &cli::Cli) -> Result<String> {
    let doc = match cli.input_path() {
        Some(path) => {
            info!("reading {}", path.display());
            std::fs::read_to_string(path)
                .with_context(|| format!("cannot read '{}'", path.display()))?
        }
        None => {
            if io::stdin().is_terminal() {
                bail!("no input file given and stdin is a terminal\n\nUsage: cmlformula <FILE> or pipe a CML document via stdin");
            }
            info!("reading CML from stdin");
            let mut doc = String::new();
            io::stdin()
                .read_to_string(&mut doc)
                .context("cannot read stdin")?;
            doc
        }
    };

    let options = FormulaOptions {
        hydrogens: if cli.clamp_hydrogens {
            HydrogenPolicy::Clamp
        } else {
            HydrogenPolicy::Reject
        },
    };
    Ok(formula_from_cml(&doc, &options)?)
}

fn print_error(err: &anyhow::Error) {
    eprintln!("error: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}
