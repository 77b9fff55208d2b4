pub mod check;
pub mod parse;
pub mod render;

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use statblock::model::Hint;

pub(crate) fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}

pub(crate) fn load_hints(path: Option<&Path>) -> Result<Vec<Hint>> {
    match path {
        Some(path) => {
            let raw = fs::read(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_slice(&raw)
                .with_context(|| format!("failed to parse hints from {}", path.display()))
        }
        None => Ok(Vec::new()),
    }
}
