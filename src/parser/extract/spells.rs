//! Spellcasting feature parsing: the prose heading, the group headers
//! ("Cantrips (at will):", "1st level (4 slots):", "1/day each:"), and the
//! spell name lists under them.

use regex::Captures;

use crate::model::{Entry, SpellEntry, SpellGroup, SpellRef, SpellUseKind, Spellcasting};
use crate::parser::patterns::Patterns;
use crate::util;

/// A parsed spellcasting feature plus the two facts the caller routes on.
pub struct SpellBlock {
    pub casting: Spellcasting,
    /// Innate lists ("At will:", "3/day each:") go to the innate slot.
    pub innate: bool,
    /// Mage armor marked "(included in AC)" feeds back into the armor types.
    pub mage_armor: bool,
}

pub fn get_spells(entry: &Entry, patterns: &Patterns) -> SpellBlock {
    let text = entry.text();
    let flattened = text.replace('\n', " ");

    // When neither list style appears the block is treated as leveled
    // spellcasting; only an explicit innate marker routes it the other way.
    let innate = patterns.spell_line_innate.is_match(&text);

    let mut casting = Spellcasting {
        feature_name: entry.name.clone(),
        ..Spellcasting::default()
    };

    for caps in patterns.spellcasting_details.captures_iter(&flattened) {
        if let Some(ability) = caps.name("ability").or_else(|| caps.name("innate_ability")) {
            casting.ability = Some(ability.as_str().to_lowercase());
        }
        if let Some(save_dc) = caps.name("save_dc") {
            casting.save_dc = util::parse_signed(save_dc.as_str());
        }
        if let Some(level) = caps.name("level") {
            casting.caster_level = util::parse_grouped_number(level.as_str());
        }
    }

    let headers: Vec<Captures> = patterns.spell_group.captures_iter(&flattened).collect();

    let description_end = headers
        .first()
        .and_then(|caps| caps.get(0))
        .map(|m| m.start())
        .unwrap_or(flattened.len());
    let description = flattened[..description_end].trim();
    if !description.is_empty() {
        casting.description = Some(description.to_string());
    }

    let mut mage_armor = false;
    for (index, caps) in headers.iter().enumerate() {
        let Some(whole) = caps.get(0) else { continue };
        let window_end = headers
            .get(index + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(flattened.len());
        let window = &flattened[whole.end()..window_end];

        let label = caps["group"].trim().to_string();
        let lowered = label.to_lowercase();
        let (use_kind, count) = if let Some(slots) = caps.name("slots") {
            (SpellUseKind::Slots, util::parse_grouped_number(slots.as_str()))
        } else if let Some(per_day) = caps.name("per_day") {
            (SpellUseKind::Innate, util::parse_grouped_number(per_day.as_str()))
        } else if lowered.contains("at will") || lowered.contains("at-will") {
            (if innate { SpellUseKind::AtWill } else { SpellUseKind::Cantrip }, None)
        } else if lowered.starts_with("cantrip") {
            (SpellUseKind::Cantrip, None)
        } else {
            (if innate { SpellUseKind::Innate } else { SpellUseKind::Slots }, None)
        };
        let group_level = caps
            .name("level")
            .and_then(|m| util::parse_grouped_number(m.as_str()))
            .or_else(|| lowered.starts_with("cantrip").then_some(0));

        let mut group = SpellGroup {
            label,
            spells: Vec::new(),
        };
        for token in window.split(',') {
            let Some((mut spell, affects_ac)) = parse_spell_token(token, patterns) else {
                continue;
            };
            spell.use_kind = Some(use_kind);
            spell.count = count;
            if spell.level.is_none() {
                spell.level = group_level;
            }
            if affects_ac && spell.name.eq_ignore_ascii_case("mage armor") {
                mage_armor = true;
            }
            group.spells.push(spell);
        }
        casting.groups.push(group);
    }

    SpellBlock {
        casting,
        innate,
        mage_armor,
    }
}

/// Cleans one comma-separated token from a spell list. Returns the entry and
/// whether it carried an "(included in AC)" marker.
fn parse_spell_token(token: &str, patterns: &Patterns) -> Option<(SpellEntry, bool)> {
    let mut name = token.replace('*', "").trim().to_string();
    if name.is_empty() {
        return None;
    }

    let affects_ac = patterns.spell_included_in_ac.is_match(&name);
    if affects_ac {
        name = patterns.spell_included_in_ac.replace(&name, "").to_string();
    }

    let mut level = None;
    if let Some(caps) = patterns.spell_level_suffix.captures(&name) {
        level = caps
            .name("level")
            .and_then(|m| util::parse_grouped_number(m.as_str()));
        name = patterns.spell_level_suffix.replace(&name, "").to_string();
    }

    name = patterns.spell_trailing_paren.replace(&name, "").to_string();
    name = patterns.spell_trailing_marker.replace(&name, "").to_string();
    let name = name.trim_matches(|c: char| c == '.' || c == ':' || c.is_whitespace());
    if name.is_empty() {
        return None;
    }

    Some((
        SpellEntry {
            name: util::title_case(name),
            use_kind: None,
            count: None,
            level,
        },
        affects_ac,
    ))
}

/// Cleans one token from a "casts ..." action's spell list.
pub fn parse_spell_ref(token: &str, patterns: &Patterns) -> Option<SpellRef> {
    parse_spell_token(token, patterns).map(|(spell, _)| SpellRef {
        name: spell.name,
        level: spell.level,
    })
}
