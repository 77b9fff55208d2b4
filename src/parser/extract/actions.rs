//! Block-section handling: splits a section into entries, routes them to
//! the right record list (pulling spellcasting features out along the way),
//! and runs the typed field pass over each stored entry.

use crate::model::{
    ActionKind, Attack, AttackRange, CreatureRecord, DamageRoll, Entry, SaveEffect, Section,
    SectionId, SpellAction, Target, DESCRIPTION_ENTRY,
};
use crate::parser::entries::split_entries;
use crate::parser::extract::spells::{self, SpellBlock};
use crate::parser::normalize::ParseMode;
use crate::parser::patterns::Patterns;
use crate::util;

pub fn extract(
    record: &mut CreatureRecord,
    section: &Section,
    mode: ParseMode,
    patterns: &Patterns,
) {
    // The implicit features section has no heading line to skip.
    let body = if section.id == SectionId::Features {
        &section.lines[..]
    } else {
        section.lines.get(1..).unwrap_or(&[])
    };
    let entries = split_entries(body, mode, patterns);

    match section.id {
        SectionId::Features | SectionId::Traits => {
            for entry in entries {
                let heading = entry
                    .lines
                    .first()
                    .is_some_and(|line| patterns.spellcasting_entry_heading.is_match(&line.text));
                if heading {
                    store_spellcasting(record, spells::get_spells(&entry, patterns));
                } else {
                    record.features.push(entry);
                }
            }
            populate_all(&mut record.features, patterns);
        }
        SectionId::UtilitySpells => {
            if let [entry] = entries.as_slice() {
                let block = spells::get_spells(entry, patterns);
                record.utility_spells = Some(block.casting);
            } else {
                record.features.extend(entries);
                populate_all(&mut record.features, patterns);
            }
        }
        _ => {
            let mut kept: Vec<Entry> = Vec::new();
            for entry in entries {
                let lowered = entry.name.to_lowercase();
                if lowered == "spellcasting" || lowered == "innate spellcasting" {
                    store_spellcasting(record, spells::get_spells(&entry, patterns));
                } else {
                    kept.push(entry);
                }
            }

            let target = match section.id {
                SectionId::BonusActions => &mut record.bonus_actions,
                SectionId::Reactions => &mut record.reactions,
                SectionId::LegendaryActions => &mut record.legendary_actions,
                SectionId::MythicActions => &mut record.mythic_actions,
                SectionId::LairActions => &mut record.lair_actions,
                SectionId::VillainActions => &mut record.villain_actions,
                _ => &mut record.actions,
            };
            target.extend(kept);
            populate_all(target, patterns);
        }
    }
}

fn store_spellcasting(record: &mut CreatureRecord, block: SpellBlock) {
    if block.mage_armor {
        if let Some(armor) = record.armor.as_mut() {
            armor.types.push("mage armor".to_string());
        }
    }
    if block.innate {
        record.innate_spellcasting = Some(block.casting);
    } else {
        record.spellcasting = Some(block.casting);
    }
}

fn populate_all(entries: &mut [Entry], patterns: &Patterns) {
    for entry in entries {
        let bare_heading = entry
            .lines
            .first()
            .is_some_and(|line| patterns.spellcasting_bare_heading.is_match(&line.text));
        if !bare_heading {
            populate_fields(entry, patterns);
        }
    }
}

/// Runs every field pattern over the entry's flattened text. A miss leaves
/// the field at its default.
fn populate_fields(entry: &mut Entry, patterns: &Patterns) {
    let text = entry.text().replace('\n', " ");

    attack_or_save(entry, &text, patterns);

    if let Some(caps) = patterns.per_day_marker.captures(&text) {
        entry.fields.per_day = util::parse_grouped_number(&caps["per_day"]);
    }

    if let Some(caps) = patterns.recharge.captures(&text) {
        entry.fields.recharge = util::parse_grouped_number(&caps["recharge"]);
    }

    let kind = if patterns.spell_attack_text.is_match(&text) {
        ActionKind::Spell
    } else {
        ActionKind::Weapon
    };
    if let Some(caps) = patterns.reach.captures(&text) {
        entry.fields.reach = util::parse_grouped_number(&caps["reach"]);
        entry.fields.kind = Some(kind);
    }
    if let Some(caps) = patterns.range.captures(&text) {
        entry.fields.range = Some(AttackRange {
            near: util::parse_grouped_number(&caps["near"]).unwrap_or(0),
            far: caps.name("far").and_then(|m| util::parse_grouped_number(m.as_str())),
        });
        entry.fields.kind = Some(kind);
    }

    if let Some(caps) = patterns.target.captures(&text) {
        entry.fields.target = Some(match caps.name("area_range") {
            Some(area) => Target {
                range: util::parse_grouped_number(area.as_str()),
                shape: caps.name("shape").map(|m| m.as_str().to_lowercase()),
                creature: false,
                amount: None,
            },
            None => Target {
                range: caps
                    .name("range")
                    .and_then(|m| util::parse_grouped_number(m.as_str())),
                shape: None,
                creature: true,
                amount: caps
                    .name("amount")
                    .map(|m| m.as_str().to_lowercase())
                    .filter(|amount| amount == "one" || amount == "a")
                    .map(|_| 1),
            },
        });
    }

    major_feature_info(entry, &text, patterns);
    spell_action(entry, &text, patterns);
    cast_action(entry, &text, patterns);
}

fn attack_or_save(entry: &mut Entry, text: &str, patterns: &Patterns) {
    let save = patterns
        .saving_throw_details
        .captures(text)
        .or_else(|| patterns.saving_throw_details_2024.captures(text));
    if let Some(caps) = save {
        if let Some(dc) = util::parse_signed(&caps["save_dc"]) {
            entry.fields.save = Some(SaveEffect {
                dc,
                ability: caps["save_ability"].to_lowercase(),
                condition: caps.name("condition").map(|m| m.as_str().to_lowercase()),
                half_on_save: caps.name("half_damage").is_some(),
            });
        }
    }

    let attack = patterns
        .attack_to_hit
        .captures(text)
        .or_else(|| patterns.attack_roll_2024.captures(text));
    if let Some(caps) = attack {
        let to_hit = caps.name("to_hit").and_then(|m| util::parse_signed(m.as_str()));

        // A rider condition ("and the target is grappled") belongs to the
        // attack only up to the first save clause; past a DC the condition
        // is the save's business.
        let window_start = caps.get(0).map(|m| m.end()).unwrap_or(0);
        let window = &text[window_start..];
        let window = match patterns.dc_clause.find(window) {
            Some(dc) => &window[..dc.start()],
            None => window,
        };
        let condition = patterns
            .condition_types
            .captures(window)
            .map(|c| c["condition"].to_lowercase());

        entry.fields.attack = Some(Attack { to_hit, condition });
    }

    if let Some(caps) = patterns.damage_roll.captures(text) {
        entry.fields.damage = Some(DamageRoll {
            roll: caps["base_roll"].to_string(),
            modifier: caps.name("base_modifier").map(clean_modifier),
            damage_type: caps.name("base_type").map(|m| m.as_str().to_lowercase()),
            plus_roll: caps.name("plus_roll").map(|m| m.as_str().to_string()),
            plus_modifier: caps.name("plus_modifier").map(clean_modifier),
            plus_type: caps.name("plus_type").map(|m| m.as_str().to_lowercase()),
            versatile_roll: caps.name("versatile_roll").map(|m| m.as_str().to_string()),
            versatile_modifier: caps.name("versatile_modifier").map(clean_modifier),
            versatile_type: caps.name("versatile_type").map(|m| m.as_str().to_lowercase()),
        });
    }
}

fn clean_modifier(capture: regex::Match) -> String {
    capture.as_str().replace(['+', ' '], "")
}

fn major_feature_info(entry: &mut Entry, text: &str, patterns: &Patterns) {
    if entry.name == DESCRIPTION_ENTRY {
        // The preamble names how many legendary actions (or which lair
        // initiative count) the creature gets.
        if let Some(caps) = patterns.legendary_action_count.captures(text) {
            entry.fields.legendary_action_count = caps
                .name("count")
                .or_else(|| caps.name("uses"))
                .and_then(|m| util::parse_grouped_number(m.as_str()));
        }
        if let Some(caps) = patterns.lair_initiative_count.captures(text) {
            entry.fields.lair_initiative_count = util::parse_grouped_number(&caps["count"]);
        }
    } else if entry.name.to_lowercase().starts_with("legendary resistance") {
        entry.fields.legendary_resistance_count = entry.fields.per_day;
    } else if let Some(caps) = patterns.action_cost.captures(text) {
        entry.fields.action_cost = util::parse_grouped_number(&caps["cost"]);
    }
}

fn spell_action(entry: &mut Entry, text: &str, patterns: &Patterns) {
    if let Some(caps) = patterns.spell_action_title.captures(text) {
        let level = caps
            .name("level")
            .and_then(|m| util::parse_grouped_number(m.as_str()));
        let concentration = caps.name("concentration").is_some();
        if level.is_some() || concentration {
            entry.fields.spell = Some(SpellAction {
                level,
                concentration,
            });
        }
    }
}

fn cast_action(entry: &mut Entry, text: &str, patterns: &Patterns) {
    let Some(caps) = patterns.cast_action.captures(text) else {
        return;
    };
    let Some(list) = caps.name("spell_list") else {
        return;
    };

    // "casts a spell" / "casts one of the following" name no particular
    // spell; only concrete lists count.
    let lowered = list.as_str().to_lowercase();
    if lowered.starts_with("a ") || lowered.starts_with("one of ") {
        return;
    }

    for token in list.as_str().replace(" or ", ",").split(',') {
        let token = token.trim().trim_start_matches("or ");
        if let Some(spell) = spells::parse_spell_ref(token, patterns) {
            entry.fields.cast_spells.push(spell);
        }
    }
}
