//! Renders a creature record back into canonical statblock text.
//!
//! The output is the plain single-column layout: one top row per line, a
//! blank line before each block heading, entries as "Name. Body" sentences.
//! Rendered output parses back into an equivalent record, which the check
//! command leans on.

use crate::model::{
    Bypass, ConditionList, CreatureRecord, DamageList, Entry, Spellcasting, DESCRIPTION_ENTRY,
};
use crate::util;

/// Legendary action count used when the statblock never stated one.
pub const DEFAULT_LEGENDARY_ACTION_COUNT: u32 = 3;

/// Initiative count lair actions trigger on when unstated.
pub const DEFAULT_LAIR_INITIATIVE: u32 = 20;

/// Canonical display text for a challenge rating.
pub fn display_for_cr(cr: f64) -> String {
    if cr == 0.125 {
        "1/8".to_string()
    } else if cr == 0.25 {
        "1/4".to_string()
    } else if cr == 0.5 {
        "1/2".to_string()
    } else if cr.fract() == 0.0 {
        format!("{}", cr as i64)
    } else {
        format!("{cr}")
    }
}

/// Standard XP award by challenge rating (nearest rating at or below).
pub fn xp_for_cr(cr: f64) -> u32 {
    const TABLE: [(f64, u32); 34] = [
        (0.0, 10),
        (0.125, 25),
        (0.25, 50),
        (0.5, 100),
        (1.0, 200),
        (2.0, 450),
        (3.0, 700),
        (4.0, 1100),
        (5.0, 1800),
        (6.0, 2300),
        (7.0, 2900),
        (8.0, 3900),
        (9.0, 5000),
        (10.0, 5900),
        (11.0, 7200),
        (12.0, 8400),
        (13.0, 10000),
        (14.0, 11500),
        (15.0, 13000),
        (16.0, 15000),
        (17.0, 18000),
        (18.0, 20000),
        (19.0, 22000),
        (20.0, 25000),
        (21.0, 33000),
        (22.0, 41000),
        (23.0, 50000),
        (24.0, 62000),
        (25.0, 75000),
        (26.0, 90000),
        (27.0, 105000),
        (28.0, 120000),
        (29.0, 135000),
        (30.0, 155000),
    ];
    TABLE
        .iter()
        .rev()
        .find(|(rating, _)| cr >= *rating)
        .map(|(_, xp)| *xp)
        .unwrap_or(10)
}

/// Standard proficiency bonus by challenge rating.
pub fn proficiency_for_cr(cr: f64) -> u32 {
    match cr {
        cr if cr <= 4.0 => 2,
        cr if cr <= 8.0 => 3,
        cr if cr <= 12.0 => 4,
        cr if cr <= 16.0 => 5,
        cr if cr <= 20.0 => 6,
        cr if cr <= 24.0 => 7,
        cr if cr <= 28.0 => 8,
        _ => 9,
    }
}

pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

pub fn to_canonical_text(record: &CreatureRecord) -> String {
    let mut out: Vec<String> = Vec::new();

    out.push(record.name.clone());
    out.push(type_line(record));

    if let Some(armor) = &record.armor {
        let mut line = format!("Armor Class {}", armor.ac);
        if !armor.types.is_empty() {
            line.push_str(&format!(" ({})", armor.types.join(", ")));
        }
        out.push(line);
    }
    if let Some(initiative) = &record.initiative {
        let mut line = format!("Initiative {}", util::signed(initiative.modifier));
        if let Some(score) = initiative.score {
            line.push_str(&format!(" ({score})"));
        }
        out.push(line);
    }
    if let Some(health) = &record.health {
        out.push(roll_line("Hit Points", health.value, health.formula.as_deref()));
    }
    if let Some(souls) = &record.souls {
        out.push(roll_line("Souls", souls.value, souls.formula.as_deref()));
    }
    out.push(speed_line(record));

    if let Some(abilities) = ability_line(record) {
        out.push(abilities);
    }

    if let Some(challenge) = &record.challenge {
        let xp = if challenge.xp > 0 { challenge.xp } else { xp_for_cr(challenge.cr) };
        let role = challenge
            .role
            .as_deref()
            .map(|role| format!(" {role}"))
            .unwrap_or_default();
        out.push(format!(
            "Challenge {}{} ({} XP)",
            challenge.display,
            role,
            util::group_digits(xp)
        ));
        let pb = challenge
            .proficiency_bonus
            .unwrap_or_else(|| proficiency_for_cr(challenge.cr));
        out.push(format!("Proficiency Bonus +{pb}"));
    }

    out.push(String::new());
    let before_optional = out.len();

    if !record.saving_throws.is_empty() {
        out.push(format!("Saving Throws {}", saving_throw_list(record)));
    }
    if !record.skills.is_empty() {
        let skills: Vec<String> = record
            .skills
            .iter()
            .map(|skill| format!("{} {}", util::title_case(&skill.name), util::signed(skill.modifier)))
            .collect();
        out.push(format!("Skills {}", skills.join(", ")));
    }
    push_damage_list(&mut out, "Damage Vulnerabilities", &record.damage_vulnerabilities);
    push_damage_list(&mut out, "Damage Resistances", &record.damage_resistances);
    push_damage_list(&mut out, "Damage Immunities", &record.damage_immunities);
    push_condition_list(&mut out, &record.condition_immunities);
    if !record.senses.is_empty() || record.special_senses.is_some() {
        out.push(format!("Senses {}", sense_list(record)));
    }
    if !record.languages.is_empty() {
        out.push(format!("Languages {}", language_list(record)));
    }
    if !record.gear.is_empty() {
        let items: Vec<String> = record
            .gear
            .iter()
            .map(|item| {
                if item.quantity > 1 {
                    format!("{} ({})", item.name, item.quantity)
                } else {
                    item.name.clone()
                }
            })
            .collect();
        out.push(format!("Gear {}", items.join(", ")));
    }
    if let Some(source) = &record.source {
        match source.page {
            Some(page) => out.push(format!("Source {}, pg. {page}", source.book)),
            None => out.push(format!("Source {}", source.book)),
        }
    }
    if out.len() == before_optional {
        out.pop();
    }

    push_traits(&mut out, record);
    push_entries(&mut out, "Actions", &record.actions, None);
    push_entries(&mut out, "Bonus Actions", &record.bonus_actions, None);
    push_entries(&mut out, "Reactions", &record.reactions, None);
    push_entries(
        &mut out,
        "Legendary Actions",
        &record.legendary_actions,
        Some(legendary_preamble(record)),
    );
    push_entries(&mut out, "Mythic Actions", &record.mythic_actions, None);
    push_entries(
        &mut out,
        "Lair Actions",
        &record.lair_actions,
        Some(lair_preamble(record)),
    );
    push_entries(&mut out, "Villain Actions", &record.villain_actions, None);
    push_entries(&mut out, "Regional Effects", &record.regional_effects, None);

    if let Some(utility) = &record.utility_spells {
        out.push(String::new());
        out.push("Utility Spells".to_string());
        push_spellcasting(&mut out, utility);
    }

    let mut text = out.join("\n");
    text.push('\n');
    text
}

fn type_line(record: &CreatureRecord) -> String {
    let size = record.size.map(|s| s.display()).unwrap_or("Medium");
    let kind = record
        .creature_type
        .as_deref()
        .or(record.custom_type.as_deref())
        .unwrap_or("creature");

    let mut line = match record.swarm_size {
        Some(swarm) => format!("{} swarm of {} {}s", size, swarm.display(), kind),
        None => format!("{size} {kind}"),
    };
    if let Some(race) = &record.race {
        line.push_str(&format!(" ({race})"));
    }
    if let Some(alignment) = &record.alignment {
        line.push_str(&format!(", {alignment}"));
    }
    line
}

fn roll_line(label: &str, value: i32, formula: Option<&str>) -> String {
    match formula {
        Some(formula) => format!("{label} {value} ({formula})"),
        None => format!("{label} {value}"),
    }
}

fn speed_line(record: &CreatureRecord) -> String {
    let mut parts: Vec<String> = Vec::new();

    // Walking speed leads and goes unlabeled; a block with no movement at
    // all still gets the standard 30 feet.
    let walk = record.speeds.get("walk").unwrap_or(30);
    parts.push(format!("{walk} ft."));

    for entry in &record.speeds.entries {
        if entry.mode == "walk" {
            continue;
        }
        let mut part = format!("{} {} ft.", entry.mode, entry.distance);
        if entry.mode == "fly" && record.speeds.hover {
            part.push_str(" (hover)");
        }
        parts.push(part);
    }
    format!("Speed {}", parts.join(", "))
}

fn ability_line(record: &CreatureRecord) -> Option<String> {
    let any = crate::model::ABILITY_NAMES
        .iter()
        .any(|name| record.abilities.get(name).is_some());
    if !any {
        return None;
    }

    let pairs: Vec<String> = crate::model::ABILITY_NAMES
        .iter()
        .map(|name| {
            let score = record.abilities.get(name).unwrap_or(10);
            format!(
                "{} {} ({})",
                name.to_uppercase(),
                score,
                util::signed(ability_modifier(score))
            )
        })
        .collect();
    Some(pairs.join("  "))
}

fn saving_throw_list(record: &CreatureRecord) -> String {
    let pb = record
        .challenge
        .as_ref()
        .map(|challenge| {
            challenge
                .proficiency_bonus
                .unwrap_or_else(|| proficiency_for_cr(challenge.cr))
        })
        .unwrap_or(2) as i32;

    let throws: Vec<String> = record
        .saving_throws
        .iter()
        .map(|name| {
            let score = record.abilities.get(name).unwrap_or(10);
            format!(
                "{} {}",
                util::capitalize(name),
                util::signed(ability_modifier(score) + pb)
            )
        })
        .collect();
    throws.join(", ")
}

fn push_damage_list(out: &mut Vec<String>, label: &str, list: &DamageList) {
    if list.is_empty() {
        return;
    }
    let mut text = list.types.join(", ");
    if !list.bypasses.is_empty() {
        let phrases: Vec<&str> = list
            .bypasses
            .iter()
            .map(|bypass| match bypass {
                Bypass::Nonmagical => "nonmagical attacks",
                Bypass::Adamantine => "adamantine weapons",
                Bypass::Silvered => "silvered weapons",
            })
            .collect();
        text.push_str(&format!(" from {}", phrases.join(" or ")));
    }
    if let Some(special) = &list.special {
        if !text.is_empty() {
            text.push_str(", ");
        }
        text.push_str(special);
    }
    out.push(format!("{label} {text}"));
}

fn push_condition_list(out: &mut Vec<String>, list: &ConditionList) {
    if list.is_empty() {
        return;
    }
    let mut parts: Vec<String> = list.types.clone();
    if let Some(special) = &list.special {
        parts.push(special.clone());
    }
    out.push(format!("Condition Immunities {}", parts.join(", ")));
}

fn sense_list(record: &CreatureRecord) -> String {
    let mut parts: Vec<String> = record
        .senses
        .iter()
        .map(|sense| {
            if sense.name == "perception" {
                format!("passive Perception {}", sense.value)
            } else {
                format!("{} {} ft.", sense.name, sense.value)
            }
        })
        .collect();
    if let Some(special) = &record.special_senses {
        parts.push(special.clone());
    }
    parts.join(", ")
}

fn language_list(record: &CreatureRecord) -> String {
    let mut parts: Vec<String> = record
        .languages
        .known
        .iter()
        .map(|key| match key.as_str() {
            "deep" => "Deep Speech".to_string(),
            "cant" => "Thieves' Cant".to_string(),
            other => util::capitalize(other),
        })
        .collect();
    parts.extend(record.languages.unknown.iter().cloned());
    if let Some(telepathy) = record.languages.telepathy {
        parts.push(format!("telepathy {telepathy} ft."));
    }
    parts.join(", ")
}

fn legendary_preamble(record: &CreatureRecord) -> String {
    let count = record
        .legendary_actions
        .iter()
        .find_map(|entry| entry.fields.legendary_action_count)
        .unwrap_or(DEFAULT_LEGENDARY_ACTION_COUNT);
    let name = record.name.to_lowercase();
    format!(
        "The {name} can take {count} legendary actions, choosing from the options below. \
         Only one legendary action option can be used at a time and only at the end of \
         another creature's turn. The {name} regains spent legendary actions at the start \
         of its turn."
    )
}

fn lair_preamble(record: &CreatureRecord) -> String {
    let count = record
        .lair_actions
        .iter()
        .find_map(|entry| entry.fields.lair_initiative_count)
        .unwrap_or(DEFAULT_LAIR_INITIATIVE);
    format!(
        "On initiative count {count} (losing initiative ties), the {} takes a lair action \
         to cause one of the following effects:",
        record.name.to_lowercase()
    )
}

fn push_traits(out: &mut Vec<String>, record: &CreatureRecord) {
    let has_spellcasting = record.spellcasting.is_some() || record.innate_spellcasting.is_some();
    if record.features.is_empty() && !has_spellcasting {
        return;
    }

    out.push(String::new());
    out.push("Traits".to_string());
    for entry in &record.features {
        out.push(entry_text(entry));
    }
    if let Some(casting) = &record.innate_spellcasting {
        push_spellcasting(out, casting);
    }
    if let Some(casting) = &record.spellcasting {
        push_spellcasting(out, casting);
    }
}

fn push_spellcasting(out: &mut Vec<String>, casting: &Spellcasting) {
    match &casting.description {
        Some(description) => out.push(description.clone()),
        None => out.push(format!("{}.", casting.feature_name)),
    }
    for group in &casting.groups {
        let names: Vec<String> = group
            .spells
            .iter()
            .map(|spell| spell.name.to_lowercase())
            .collect();
        out.push(format!("{}: {}", group.label, names.join(", ")));
    }
}

fn push_entries(out: &mut Vec<String>, heading: &str, entries: &[Entry], preamble: Option<String>) {
    if entries.is_empty() {
        return;
    }
    out.push(String::new());
    out.push(heading.to_string());

    let has_description = entries.iter().any(|entry| entry.name == DESCRIPTION_ENTRY);
    if let Some(preamble) = preamble {
        if !has_description {
            out.push(preamble);
        }
    }
    for entry in entries {
        out.push(entry_text(entry));
    }
}

fn entry_text(entry: &Entry) -> String {
    if entry.name == DESCRIPTION_ENTRY || entry.name.starts_with("Action ") {
        return ensure_sentence(&entry.text().replace('\n', " "));
    }
    format!(
        "{}{}. {}",
        entry.name,
        entry_markers(entry),
        ensure_sentence(&entry.description())
    )
}

/// Rebuilds the parenthetical markers the parser stripped out of the title,
/// so a rendered entry carries the same typed facts its source did.
fn entry_markers(entry: &Entry) -> String {
    let mut markers: Vec<String> = Vec::new();

    let mut use_parts: Vec<String> = Vec::new();
    if let Some(per_day) = entry.fields.per_day {
        use_parts.push(format!("{per_day}/Day"));
    }
    if let Some(spell) = &entry.fields.spell {
        if let Some(level) = spell.level {
            use_parts.push(format!("{}-Level Spell", ordinal(level)));
        }
        if spell.concentration {
            use_parts.push("Concentration".to_string());
        }
    }
    if !use_parts.is_empty() {
        markers.push(format!("({})", use_parts.join("; ")));
    }

    if let Some(recharge) = entry.fields.recharge {
        markers.push(format!("(Recharge {recharge})"));
    }
    if let Some(cost) = entry.fields.action_cost {
        if cost > 1 {
            markers.push(format!("(Costs {cost} Actions)"));
        }
    }

    if markers.is_empty() {
        String::new()
    } else {
        format!(" {}", markers.join(" "))
    }
}

fn ordinal(value: u32) -> String {
    let suffix = match (value % 10, value % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{value}{suffix}")
}

fn ensure_sentence(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.ends_with(['.', '!', '?', ':']) {
        trimmed.to_string()
    } else {
        format!("{trimmed}.")
    }
}
