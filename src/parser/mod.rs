//! The statblock parser: normalize, segment, split, extract.

pub mod entries;
pub mod extract;
pub mod normalize;
pub mod patterns;
pub mod segment;

#[cfg(test)]
mod tests;

use anyhow::Result;
use tracing::debug;

use crate::model::{CreatureRecord, Hint, ParseResult, Section, SectionId};
use crate::parser::patterns::Patterns;

/// Parses statblock text into a creature record. Returns `Ok(None)` when
/// the input holds no usable lines. The only error is a pattern set that
/// fails to compile.
pub fn parse(text: &str, hints: &[Hint]) -> Result<Option<ParseResult>> {
    let patterns = Patterns::new()?;
    Ok(parse_with(&patterns, text, hints))
}

/// Like [`parse`] with a caller-provided pattern set, for callers parsing
/// many blocks in a row.
pub fn parse_with(patterns: &Patterns, text: &str, hints: &[Hint]) -> Option<ParseResult> {
    let lines = normalize::normalize(text, patterns);
    let first = lines.first()?;

    // The mode decision looks at every line, the name line included: a
    // lowercase name start is as good a prose signal as any.
    let mode = normalize::ParseMode::detect(&lines);

    let mut record = CreatureRecord::new(first.text.clone());
    let mut name_section = Section::new(SectionId::Name);
    name_section.lines.push(first.clone());

    let segmentation = segment::segment(&lines[1..], hints, patterns);

    let mut annotations = Vec::new();
    for section in &segmentation.sections {
        extract::apply(&mut record, section, mode, patterns, &mut annotations);
    }

    debug!(
        name = %record.name,
        mode = ?mode,
        sections = segmentation.sections.len(),
        unknown = segmentation.unknown_lines.len(),
        "parsed statblock"
    );

    let mut sections = vec![name_section];
    sections.extend(segmentation.sections);

    Some(ParseResult {
        record,
        sections,
        unknown_lines: segmentation.unknown_lines,
        lines,
        annotations,
    })
}
