//! Field extraction: turns classified sections into record fields.
//!
//! Extractors are deliberately forgiving. A detail pattern that fails to
//! match leaves its field at the default instead of failing the parse; the
//! section lines stay available in the parse result either way.

use regex::{Captures, Regex};

use crate::model::{CreatureRecord, MatchSpan, RawLine, Section, SectionId};
use crate::parser::normalize::ParseMode;
use crate::parser::patterns::Patterns;

mod abilities;
mod actions;
mod defenses;
mod spells;
mod stats;

/// Applies the extractor for one section to the record.
pub fn apply(
    record: &mut CreatureRecord,
    section: &Section,
    mode: ParseMode,
    patterns: &Patterns,
    annotations: &mut Vec<MatchSpan>,
) {
    match section.id {
        SectionId::Name => {}
        SectionId::Abilities => abilities::scores(record, section, patterns, annotations),
        SectionId::SavingThrows => abilities::saving_throws(record, section, patterns),
        SectionId::Armor => stats::armor(record, section, patterns, annotations),
        SectionId::Initiative => stats::initiative(record, section, patterns, annotations),
        SectionId::Challenge => stats::challenge(record, section, patterns, annotations),
        SectionId::ProficiencyBonus => stats::proficiency_bonus(record, section, patterns),
        SectionId::Health => stats::health(record, section, patterns, annotations),
        SectionId::Souls => stats::souls(record, section, patterns, annotations),
        SectionId::Gear => stats::gear(record, section, patterns),
        SectionId::RacialDetails => stats::racial_details(record, section, patterns, annotations),
        SectionId::Senses => stats::senses(record, section, patterns, annotations),
        SectionId::Skills => stats::skills(record, section, patterns, annotations),
        SectionId::Source => stats::source(record, section, patterns),
        SectionId::Speed => stats::speed(record, section, patterns, annotations),
        SectionId::ConditionImmunities
        | SectionId::DamageImmunities
        | SectionId::Immunities
        | SectionId::DamageResistances
        | SectionId::DamageVulnerabilities => defenses::extract(record, section, patterns),
        SectionId::Languages => defenses::languages(record, section, patterns),
        SectionId::OtherInfo => {
            record.other_info = section.lines.iter().map(|line| line.text.clone()).collect();
        }
        SectionId::Actions
        | SectionId::BonusActions
        | SectionId::Features
        | SectionId::LairActions
        | SectionId::LegendaryActions
        | SectionId::MythicActions
        | SectionId::Reactions
        | SectionId::Traits
        | SectionId::UtilitySpells
        | SectionId::VillainActions => actions::extract(record, section, mode, patterns),
    }
}

/// Section lines joined with `\n` plus the bookkeeping to map a match in the
/// joined text back onto a source line for annotation.
pub(crate) struct Joined {
    pub text: String,
    ranges: Vec<(usize, std::ops::Range<usize>)>,
}

impl Joined {
    pub fn from_lines(lines: &[RawLine]) -> Joined {
        let mut text = String::new();
        let mut ranges = Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            if index > 0 {
                text.push('\n');
            }
            let start = text.len();
            text.push_str(&line.text);
            ranges.push((line.number, start..text.len()));
        }
        Joined { text, ranges }
    }

    /// Records a span for every named capture that participated in `caps`.
    /// A capture spanning a line break is clamped to its first line.
    pub fn annotate(&self, regex: &Regex, caps: &Captures, out: &mut Vec<MatchSpan>) {
        for name in regex.capture_names().flatten() {
            if let Some(capture) = caps.name(name) {
                if let Some((line, start, end)) = self.locate(capture.start(), capture.end()) {
                    out.push(MatchSpan {
                        line,
                        label: name.to_string(),
                        start,
                        end,
                    });
                }
            }
        }
    }

    fn locate(&self, start: usize, end: usize) -> Option<(usize, usize, usize)> {
        self.ranges
            .iter()
            .find(|(_, range)| range.contains(&start))
            .map(|(line, range)| (*line, start - range.start, end.min(range.end) - range.start))
    }
}
