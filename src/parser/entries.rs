//! Splits a block section's lines into named entries.
//!
//! A spellcasting feature is the awkward case: its spell lists contain
//! capitalized spell names that look exactly like entry titles, so each
//! spellcasting run is pulled out first and re-appended at the end, where
//! only its first line may open an entry.

use crate::model::{DESCRIPTION_ENTRY, Entry, RawLine};
use crate::parser::normalize::ParseMode;
use crate::parser::patterns::Patterns;

pub fn split_entries(lines: &[RawLine], mode: ParseMode, patterns: &Patterns) -> Vec<Entry> {
    let (plain, spell_runs) = pull_out_spell_blocks(lines, patterns);

    let mut ordered: Vec<RawLine> = plain;
    // Inside a relocated spell run only the heading line may start an entry.
    let mut title_allowed: Vec<bool> = vec![true; ordered.len()];
    for run in spell_runs {
        for (index, line) in run.into_iter().enumerate() {
            ordered.push(line);
            title_allowed.push(index == 0);
        }
    }

    let mut titles: Vec<Option<String>> = ordered
        .iter()
        .enumerate()
        .map(|(index, line)| {
            if !title_allowed[index] {
                return None;
            }
            if mode == ParseMode::Prose && !sentence_boundary_before(&ordered, index, &['.', ':', '!']) {
                return None;
            }
            patterns.block_title(&line.text)
        })
        .collect();

    // Numbered villain actions put a whole sentence in the title position.
    // The generic title shape would truncate them at the colon, so any
    // villain-shaped line switches the whole section to the villain pass.
    let has_villain_lines = ordered
        .iter()
        .any(|line| patterns.villain_title(&line.text).is_some());
    if has_villain_lines || titles.iter().all(Option::is_none) {
        titles = ordered
            .iter()
            .enumerate()
            .map(|(index, line)| {
                if mode == ParseMode::Prose && !sentence_boundary_before(&ordered, index, &['.', '!']) {
                    return None;
                }
                patterns.villain_title(&line.text)
            })
            .collect();
    }

    let mut entries: Vec<Entry> = Vec::new();
    for (line, title) in ordered.into_iter().zip(titles) {
        if let Some(title) = title {
            entries.push(Entry::new(title));
        } else if entries.is_empty() {
            entries.push(Entry::new(DESCRIPTION_ENTRY));
        }
        entries
            .last_mut()
            .map(|entry| entry.lines.push(line));
    }

    entries
}

/// Separates every spellcasting run (heading plus its spell-list lines) from
/// the rest of the section. A run ends at the first line that looks like an
/// entry title but not like a spell group header; that line may itself open
/// the next run, as with an innate block followed by a leveled one.
fn pull_out_spell_blocks(
    lines: &[RawLine],
    patterns: &Patterns,
) -> (Vec<RawLine>, Vec<Vec<RawLine>>) {
    let mut plain: Vec<RawLine> = Vec::new();
    let mut runs: Vec<Vec<RawLine>> = Vec::new();
    let mut current: Option<Vec<RawLine>> = None;

    for line in lines {
        if current.is_some() {
            let is_title = patterns.block_title(&line.text).is_some();
            let is_group = patterns.spell_group.is_match(&line.text);
            if !is_title || is_group {
                if let Some(run) = current.as_mut() {
                    run.push(line.clone());
                }
                continue;
            }
            if let Some(run) = current.take() {
                runs.push(close_run(run));
            }
        }

        if patterns.spellcasting_block_start.is_match(&line.text) {
            let mut heading = line.clone();
            // A bare heading gets its terminal period back so the title
            // shape recognizes it after relocation.
            if heading.text == "Spellcasting" || heading.text == "Innate Spellcasting" {
                heading.text.push('.');
            }
            current = Some(vec![heading]);
        } else {
            plain.push(line.clone());
        }
    }
    if let Some(run) = current.take() {
        runs.push(close_run(run));
    }

    (plain, runs)
}

fn close_run(mut run: Vec<RawLine>) -> Vec<RawLine> {
    if let Some(last) = run.last_mut() {
        if !last.text.ends_with('.') {
            last.text.push('.');
        }
    }
    run
}

fn sentence_boundary_before(lines: &[RawLine], index: usize, enders: &[char]) -> bool {
    match index.checked_sub(1).and_then(|prev| lines.get(prev)) {
        Some(previous) => previous.text.ends_with(enders),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[&str]) -> Vec<RawLine> {
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| RawLine::new(index + 1, *text))
            .collect()
    }

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    #[test]
    fn splits_clean_lines_on_titles() {
        let patterns = Patterns::new().expect("patterns compile");
        let input = lines(&[
            "Multiattack. The aboleth makes two tentacle attacks.",
            "Tentacle. Melee Weapon Attack: +9 to hit, reach 10 ft., one target.",
            "Hit: 12 (2d6 + 5) bludgeoning damage.",
        ]);
        let entries = split_entries(&input, ParseMode::CleanLines, &patterns);
        assert_eq!(names(&entries), vec!["Multiattack", "Tentacle"]);
        assert_eq!(entries[1].lines.len(), 2);
    }

    #[test]
    fn prose_mode_requires_a_sentence_boundary_before_a_title() {
        let patterns = Patterns::new().expect("patterns compile");
        let input = lines(&[
            "Enslave (3/Day). The aboleth targets one creature it can see within",
            "30 feet of it. The target must succeed on a DC 14 Wisdom saving",
            "Magic Resistance looks like a title here but continues the sentence",
            "above, ending it now.",
            "Tail. Melee Weapon Attack: +9 to hit.",
        ]);
        let entries = split_entries(&input, ParseMode::Prose, &patterns);
        assert_eq!(names(&entries), vec!["Enslave", "Tail"]);
        assert_eq!(entries[0].lines.len(), 4);
    }

    #[test]
    fn leading_untitled_lines_become_a_description_entry() {
        let patterns = Patterns::new().expect("patterns compile");
        let input = lines(&[
            "The aboleth can take 3 legendary actions, choosing from the options below.",
            "Detect. The aboleth makes a Wisdom (Perception) check.",
        ]);
        let entries = split_entries(&input, ParseMode::CleanLines, &patterns);
        assert_eq!(names(&entries), vec![DESCRIPTION_ENTRY, "Detect"]);
    }

    #[test]
    fn spell_block_moves_to_the_end_without_splitting() {
        let patterns = Patterns::new().expect("patterns compile");
        let input = lines(&[
            "Spellcasting. The archmage is an 18th-level spellcaster. Its spellcasting ability is Intelligence (spell save DC 17).",
            "Cantrips (at will): fire bolt, light, mage hand",
            "1st level (4 slots): detect magic, identify, mage armor",
            "Magic Resistance. The archmage has advantage on saving throws.",
        ]);
        let entries = split_entries(&input, ParseMode::CleanLines, &patterns);
        assert_eq!(names(&entries), vec!["Magic Resistance", "Spellcasting"]);

        let spellcasting = &entries[1];
        assert_eq!(spellcasting.lines.len(), 3);
        assert!(spellcasting.lines[2].text.ends_with('.'));
    }

    #[test]
    fn each_spell_block_is_pulled_out_on_its_own() {
        let patterns = Patterns::new().expect("patterns compile");
        let input = lines(&[
            "Fey Ancestry. The drow has advantage on saving throws against being charmed.",
            "Innate Spellcasting. The drow's spellcasting ability is Charisma (spell save DC 15). She can innately cast the following spells:",
            "At will: dancing lights",
            "1/day each: darkness, faerie fire",
            "Spellcasting. The drow is a 10th-level spellcaster. Her spellcasting ability is Wisdom (spell save DC 14).",
            "Cantrips (at will): guidance, poison spray",
            "1st level (4 slots): bless, cure wounds",
        ]);
        let entries = split_entries(&input, ParseMode::CleanLines, &patterns);
        assert_eq!(
            names(&entries),
            vec!["Fey Ancestry", "Innate Spellcasting", "Spellcasting"]
        );
        assert_eq!(entries[1].lines.len(), 3);
        assert_eq!(entries[2].lines.len(), 3);
    }

    #[test]
    fn bare_spellcasting_heading_gains_its_period() {
        let patterns = Patterns::new().expect("patterns compile");
        let input = lines(&["Spellcasting", "Cantrips (at will): fire bolt"]);
        let entries = split_entries(&input, ParseMode::CleanLines, &patterns);
        assert_eq!(names(&entries), vec!["Spellcasting"]);
        assert_eq!(entries[0].lines[0].text, "Spellcasting.");
    }

    #[test]
    fn villain_actions_fall_back_to_numbered_titles() {
        let patterns = Patterns::new().expect("patterns compile");
        let input = lines(&[
            "Action 1: Terrify! Each enemy within 60 feet must make a save.",
            "Action 2: Relentless Pursuit. The warlord moves up to its speed.",
        ]);
        let entries = split_entries(&input, ParseMode::CleanLines, &patterns);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].name.starts_with("Action 1:"));
        assert!(entries[1].name.starts_with("Action 2:"));
    }
}
