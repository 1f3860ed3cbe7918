use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Parser)]
#[command(
    name = "cmlformula",
    about = "Print the molecular formula of a CML structure document",
    version
)]
pub struct Cli {
    /// CML document to read (stdin if omitted or '-')
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Count atoms whose charge leaves negative hydrogens as carrying none,
    /// instead of failing
    #[arg(long)]
    pub clamp_hydrogens: bool,

    /// Log progress to stderr; repeat for more detail
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only print the formula, never warnings
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// `None` means stdin.
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input.as_ref().filter(|p| p.as_os_str() != "-")
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
