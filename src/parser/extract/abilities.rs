//! Ability score and saving throw extraction.
//!
//! Score layouts vary by source: one line per ability, a names row over a
//! values row, or the newer three-column base/modifier/save table. Names and
//! values are collected independently and zipped at the end, which covers
//! all three without caring which one is in front of us.

use crate::model::{CreatureRecord, MatchSpan, Section};
use crate::parser::extract::Joined;
use crate::parser::patterns::Patterns;
use crate::util;

pub fn scores(
    record: &mut CreatureRecord,
    section: &Section,
    patterns: &Patterns,
    annotations: &mut Vec<MatchSpan>,
) {
    let mut names: Vec<String> = Vec::new();
    let mut values: Vec<i32> = Vec::new();
    let mut proficient: Vec<bool> = Vec::new();

    for line in &section.lines {
        if values.len() >= 6 {
            break;
        }

        for caps in patterns.ability_names.captures_iter(&line.text) {
            let name: String = caps["name"].to_lowercase().chars().take(3).collect();
            names.push(name);
        }

        let single = Joined::from_lines(std::slice::from_ref(line));
        let table: Vec<_> = patterns
            .ability_values_2024
            .captures_iter(&line.text)
            .collect();
        if !table.is_empty() {
            // Three-column layout: the save column differing from the
            // modifier column marks a proficient saving throw.
            for caps in table {
                if values.len() >= 6 {
                    break;
                }
                if let Some(base) = util::parse_signed(&caps["base"]) {
                    single.annotate(&patterns.ability_values_2024, &caps, annotations);
                    values.push(base);
                    let modifier = caps.name("modifier").and_then(|m| util::parse_signed(m.as_str()));
                    let save = caps.name("save").and_then(|m| util::parse_signed(m.as_str()));
                    proficient.push(modifier != save);
                }
            }
        } else {
            for caps in patterns.ability_values.captures_iter(&line.text) {
                if values.len() >= 6 {
                    break;
                }
                if let Some(base) = util::parse_signed(&caps["base"]) {
                    single.annotate(&patterns.ability_values, &caps, annotations);
                    values.push(base);
                    proficient.push(false);
                }
            }
        }
    }

    for (name, (value, flagged)) in names.iter().zip(values.iter().zip(proficient)) {
        record.abilities.set(name, *value);
        if flagged && !record.saving_throws.contains(name) {
            record.saving_throws.push(name.clone());
        }
    }
}

pub fn saving_throws(record: &mut CreatureRecord, section: &Section, patterns: &Patterns) {
    let joined = Joined::from_lines(&section.lines);
    for caps in patterns.ability_names.captures_iter(&joined.text) {
        let name: String = caps["name"].to_lowercase().chars().take(3).collect();
        if !record.saving_throws.contains(&name) {
            record.saving_throws.push(name);
        }
    }
}
