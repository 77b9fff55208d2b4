use anyhow::{Context, Result};
use tracing::info;

use statblock::model::CreatureRecord;
use statblock::render;

use crate::cli::RenderArgs;
use crate::commands::read_input;

pub fn run(args: RenderArgs) -> Result<()> {
    let raw = read_input(args.input.as_deref())?;
    let record: CreatureRecord =
        serde_json::from_str(&raw).context("failed to parse creature record JSON")?;

    print!("{}", render::to_canonical_text(&record));

    info!(name = %record.name, "render completed");
    Ok(())
}
