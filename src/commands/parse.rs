use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use statblock::parser;

use crate::cli::ParseArgs;
use crate::commands::{load_hints, read_input};

pub fn run(args: ParseArgs) -> Result<()> {
    let text = read_input(args.input.as_deref())?;
    let hints = load_hints(args.hints.as_deref())?;

    let Some(result) = parser::parse(&text, &hints)? else {
        bail!("input contains no statblock text");
    };

    for line in &result.unknown_lines {
        warn!(line = line.number, text = %line.text, "unclassified line");
    }

    let output = if args.full {
        serde_json::to_string_pretty(&result).context("failed to serialize parse result")?
    } else {
        serde_json::to_string_pretty(&result.record).context("failed to serialize record")?
    };
    println!("{output}");

    info!(
        name = %result.record.name,
        sections = result.sections.len(),
        unknown = result.unknown_lines.len(),
        "parse completed"
    );
    Ok(())
}
