//! Damage and condition defense lists, plus languages.

use crate::model::{Bypass, CreatureRecord, Section, SectionId};
use crate::parser::patterns::Patterns;
use crate::util;

pub fn extract(record: &mut CreatureRecord, section: &Section, patterns: &Patterns) {
    let joined = section.text();

    let mut damage_types: Vec<String> = Vec::new();
    for caps in patterns.damage_types.captures_iter(&joined) {
        let damage_type = caps["damage_type"].to_lowercase();
        if !damage_types.contains(&damage_type) {
            damage_types.push(damage_type);
        }
    }

    // Condition names always land in condition immunities, whichever header
    // they sat under; the merged 2024 header mixes both lists on one line.
    for caps in patterns.condition_types.captures_iter(&joined) {
        let condition = caps["condition"].to_lowercase();
        if !record.condition_immunities.types.contains(&condition) {
            record.condition_immunities.types.push(condition);
        }
    }

    let stripped = patterns.defense_prefix.replace(&joined, "").to_string();
    let lowered = stripped.to_lowercase();

    let mut bypasses: Vec<Bypass> = Vec::new();
    if lowered.contains("nonmagical weapons")
        || lowered.contains("nonmagical attacks")
        || lowered.contains("mundane attacks")
    {
        bypasses.push(Bypass::Nonmagical);
    }
    if lowered.contains("adamantine") {
        bypasses.push(Bypass::Adamantine);
    }
    if lowered.contains("silvered") {
        bypasses.push(Bypass::Silvered);
    }

    // Free text like "damage from spells" survives as a special clause, but
    // only when no bypass qualifier consumed the remainder of the line.
    let special = if bypasses.is_empty() {
        let without_damage = patterns.damage_types.replace_all(&stripped, "");
        let without_conditions = patterns.condition_types.replace_all(&without_damage, "");
        let leftover =
            util::collapse_whitespace(&without_conditions.replace(',', " ").replace('\n', " "));
        (!leftover.is_empty()).then_some(leftover)
    } else {
        None
    };

    if section.id == SectionId::ConditionImmunities {
        record.condition_immunities.special = special;
        return;
    }

    let target = match section.id {
        SectionId::DamageResistances => &mut record.damage_resistances,
        SectionId::DamageVulnerabilities => &mut record.damage_vulnerabilities,
        _ => &mut record.damage_immunities,
    };
    target.types.extend(damage_types);
    target.bypasses = bypasses;
    target.special = special;
}

pub fn languages(record: &mut CreatureRecord, section: &Section, patterns: &Patterns) {
    let joined = section.text().replace('\n', " ");

    for caps in patterns.known_languages.captures_iter(&joined) {
        if let Some(telepathy) = caps.name("telepathy") {
            record.languages.telepathy = util::parse_grouped_number(telepathy.as_str());
            continue;
        }
        let language = caps["language"].to_lowercase();
        let key = if language.starts_with("deep") {
            "deep".to_string()
        } else if language.contains("cant") {
            "cant".to_string()
        } else {
            language
        };
        if !record.languages.known.contains(&key) {
            record.languages.known.push(key);
        }
    }

    // Anything the known-language scan left behind ("understands Common but
    // can't speak") is kept verbatim.
    let stripped = patterns.languages_prefix.replace(&joined, "");
    let leftover = patterns.known_languages.replace_all(&stripped, "");
    for token in leftover.split([',', ';']) {
        let token = util::collapse_whitespace(token);
        if token.chars().any(char::is_alphanumeric) {
            record.languages.unknown.push(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawLine;

    fn section(id: SectionId, text: &str) -> Section {
        let mut section = Section::new(id);
        section.lines = vec![RawLine::new(2, text)];
        section
    }

    #[test]
    fn damage_types_and_conditions_split_by_kind() {
        let patterns = Patterns::new().expect("patterns compile");
        let mut record = CreatureRecord::new("Golem");
        extract(
            &mut record,
            &section(
                SectionId::Immunities,
                "Immunities fire, poison, psychic; charmed, frightened",
            ),
            &patterns,
        );
        assert_eq!(record.damage_immunities.types, vec!["fire", "poison", "psychic"]);
        assert_eq!(record.condition_immunities.types, vec!["charmed", "frightened"]);
    }

    #[test]
    fn bypass_phrases_win_over_special_text() {
        let patterns = Patterns::new().expect("patterns compile");
        let mut record = CreatureRecord::new("Devil");
        extract(
            &mut record,
            &section(
                SectionId::DamageResistances,
                "Damage Resistances cold; bludgeoning, piercing, and slashing from nonmagical attacks that aren't silvered",
            ),
            &patterns,
        );
        let resistances = &record.damage_resistances;
        assert_eq!(
            resistances.types,
            vec!["cold", "bludgeoning", "piercing", "slashing"]
        );
        assert_eq!(resistances.bypasses, vec![Bypass::Nonmagical, Bypass::Silvered]);
        assert!(resistances.special.is_none());
    }

    #[test]
    fn free_text_without_bypasses_becomes_special() {
        let patterns = Patterns::new().expect("patterns compile");
        let mut record = CreatureRecord::new("Rakshasa");
        extract(
            &mut record,
            &section(SectionId::DamageVulnerabilities, "Vulnerabilities damage from spells"),
            &patterns,
        );
        assert_eq!(
            record.damage_vulnerabilities.special.as_deref(),
            Some("damage from spells")
        );
    }

    #[test]
    fn condition_section_keeps_special_on_the_condition_list() {
        let patterns = Patterns::new().expect("patterns compile");
        let mut record = CreatureRecord::new("Ghost");
        extract(
            &mut record,
            &section(
                SectionId::ConditionImmunities,
                "Condition Immunities charmed, exhaustion, while in dim light",
            ),
            &patterns,
        );
        assert_eq!(record.condition_immunities.types, vec!["charmed", "exhaustion"]);
        assert_eq!(
            record.condition_immunities.special.as_deref(),
            Some("while in dim light")
        );
        assert!(record.damage_immunities.is_empty());
    }

    #[test]
    fn languages_map_known_names_and_keep_the_rest() {
        let patterns = Patterns::new().expect("patterns compile");
        let mut record = CreatureRecord::new("Aboleth");
        languages(
            &mut record,
            &section(
                SectionId::Languages,
                "Languages Deep Speech, Thieves' Cant, understands Abyssal but speaks in riddles, telepathy 120 ft.",
            ),
            &patterns,
        );
        assert_eq!(record.languages.known, vec!["deep", "cant", "abyssal"]);
        assert_eq!(record.languages.telepathy, Some(120));
        assert_eq!(record.languages.unknown.len(), 1);
        assert!(record.languages.unknown[0].contains("understands"));
    }
}
