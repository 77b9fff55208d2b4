//! Single forward pass that partitions normalized lines into sections.
//!
//! Each line either matches a section opener, continues the section that is
//! currently open, or (with no open section) lands in the unknown pile.
//! Segmentation itself never fails; bad input degrades to unknown lines.

use std::collections::HashSet;

use tracing::debug;

use crate::model::{Hint, RawLine, Section, SectionId};
use crate::parser::patterns::Patterns;

pub struct Segmentation {
    pub sections: Vec<Section>,
    pub unknown_lines: Vec<RawLine>,
}

pub fn segment(lines: &[RawLine], hints: &[Hint], patterns: &Patterns) -> Segmentation {
    let mut sections: Vec<Section> = Vec::new();
    let mut unknown_lines: Vec<RawLine> = Vec::new();
    let mut current: Option<usize> = None;
    let mut seen: HashSet<SectionId> = HashSet::new();

    // The features that sit under the top rows have no heading of their
    // own, so the pass tracks whether it is still inside the top region and
    // treats the first title-shaped line after it as the start of an
    // implicit features section.
    let mut in_top_region = true;

    // Ability score layouts vary wildly; once the ability section opens,
    // further ability-looking lines are swallowed into it rather than
    // treated as new sections.
    let mut in_ability_run = false;

    for line in lines {
        // Lines flagged with the ignore marker stay out of every section.
        if line.text.starts_with('*') {
            unknown_lines.push(line.clone());
            continue;
        }

        let hint = hints.iter().find(|h| h.text.trim() == line.text);
        let matched: Option<SectionId> = match hint {
            Some(h) => Some(h.section),
            None => patterns
                .registry
                .iter()
                .filter(|(id, _)| !seen.contains(id))
                .filter(|(id, _)| !id.is_top() || in_top_region)
                .find(|(_, matcher)| matcher.is_match(&line.text))
                .map(|(id, _)| *id),
        };

        // No match while still among the top rows: a title-shaped line here
        // is the first implicit feature. The title requirement matters
        // because an unmatched line could also be the continuation of a
        // long damage-immunities row.
        if matched.is_none() && in_top_region && is_title_line(&line.text, patterns) {
            in_top_region = false;
            seen.insert(SectionId::Features);
            sections.push(Section::new(SectionId::Features));
            current = Some(sections.len() - 1);
        }

        // Final fallback: a short capitalized heading opens (or reopens)
        // the free-form info section.
        if matched.is_none() && !in_ability_run && patterns.other_block.is_match(&line.text) {
            in_top_region = false;
            let index = sections
                .iter()
                .position(|section| section.id == SectionId::OtherInfo)
                .unwrap_or_else(|| {
                    sections.push(Section::new(SectionId::OtherInfo));
                    sections.len() - 1
                });
            current = Some(index);
        }

        if let Some(id) = matched {
            in_top_region = id.is_top();
            if in_ability_run && id != SectionId::Abilities {
                in_ability_run = false;
            }

            if !in_ability_run {
                // A hinted line may append to a section that already
                // exists; a pattern match always opens a fresh one.
                let existing = hint
                    .and_then(|_| sections.iter().position(|section| section.id == id));
                let index = existing.unwrap_or_else(|| {
                    sections.push(Section::new(id));
                    sections.len() - 1
                });
                current = Some(index);
                seen.insert(id);
                in_ability_run = id == SectionId::Abilities;
            }
        }

        match current {
            Some(index) => sections[index].lines.push(line.clone()),
            None => unknown_lines.push(line.clone()),
        }
    }

    debug!(
        sections = sections.len(),
        unknown = unknown_lines.len(),
        "segmented statblock lines"
    );

    Segmentation {
        sections,
        unknown_lines,
    }
}

/// Single-line title test used for the implicit-features transition. On one
/// line the prose and clean-line variants agree, so no mode is needed.
fn is_title_line(text: &str, patterns: &Patterns) -> bool {
    patterns.block_title(text).is_some() || patterns.villain_title(text).is_some()
}
