use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "statblock",
    version,
    about = "Creature statblock text parsing and rendering"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse statblock text into a creature record.
    Parse(ParseArgs),
    /// Render a parsed creature record back to statblock text.
    Render(RenderArgs),
    /// Parse, render, and re-parse, reporting anything that drifts.
    Check(CheckArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    /// Statblock text file; stdin when omitted.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// JSON file of section hints: [{"text": ..., "section": ...}].
    #[arg(long)]
    pub hints: Option<PathBuf>,

    /// Emit the full parse result (sections, unknown lines, annotations)
    /// instead of just the record.
    #[arg(long, default_value_t = false)]
    pub full: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Creature record JSON as produced by parse; stdin when omitted.
    #[arg(long)]
    pub input: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Statblock text file; stdin when omitted.
    #[arg(long)]
    pub input: Option<PathBuf>,

    #[arg(long)]
    pub hints: Option<PathBuf>,
}
