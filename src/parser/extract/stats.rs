//! Extractors for the single-line top sections: racial details, armor,
//! health, speed, senses, skills, challenge, and the rest.

use crate::model::{
    Armor, Challenge, CreatureRecord, GearItem, Initiative, MatchSpan, Roll, Section, Sense,
    Size, Skill, SourceBook, SpeedEntry, KNOWN_CREATURE_TYPES,
};
use crate::parser::extract::Joined;
use crate::parser::patterns::Patterns;
use crate::render;
use crate::util;

pub fn racial_details(
    record: &mut CreatureRecord,
    section: &Section,
    patterns: &Patterns,
    annotations: &mut Vec<MatchSpan>,
) {
    let joined = Joined::from_lines(&section.lines);
    let Some(caps) = patterns.racial_details.captures(&joined.text) else {
        return;
    };
    joined.annotate(&patterns.racial_details, &caps, annotations);

    record.size = caps.name("size").and_then(|m| Size::from_token(m.as_str()));
    record.swarm_size = caps.name("swarm").and_then(|m| Size::from_token(m.as_str()));

    if let Some(kind) = caps.name("kind") {
        let lowered = kind.as_str().trim().to_lowercase();
        let singular = singularize(&lowered);
        if KNOWN_CREATURE_TYPES.contains(&singular.as_str()) {
            record.creature_type = Some(singular);
        } else {
            record.custom_type = Some(lowered);
        }
    }

    record.race = caps.name("race").map(|m| m.as_str().trim().to_string());
    record.alignment = caps.name("alignment").map(|m| m.as_str().trim().to_string());
}

fn singularize(kind: &str) -> String {
    let trimmed = kind.strip_suffix('s').unwrap_or(kind);
    if trimmed == "monstrositie" {
        "monstrosity".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn armor(
    record: &mut CreatureRecord,
    section: &Section,
    patterns: &Patterns,
    annotations: &mut Vec<MatchSpan>,
) {
    let joined = Joined::from_lines(&section.lines);
    let Some(caps) = patterns.armor_details.captures(&joined.text) else {
        return;
    };
    joined.annotate(&patterns.armor_details, &caps, annotations);

    let mut armor = Armor {
        ac: util::parse_signed(&caps["ac"]).unwrap_or(0),
        types: Vec::new(),
    };

    // "natural armor" is a property of the creature; anything else in the
    // parenthetical (shield, plate, ...) is equipment and moves to gear.
    if let Some(types) = caps.name("types") {
        for token in types.as_str().split(',') {
            let token = token.trim().to_lowercase();
            if token.is_empty() {
                continue;
            }
            if token == "natural armor" {
                armor.types.push(token);
            } else {
                record.gear.push(GearItem {
                    name: token,
                    quantity: 1,
                });
            }
        }
    }
    record.armor = Some(armor);

    // The 2024 layout folds initiative onto the armor line.
    if let Some(modifier) = caps.name("initiative_modifier") {
        record.initiative = Some(Initiative {
            modifier: util::parse_signed(modifier.as_str()).unwrap_or(0),
            score: caps
                .name("initiative_score")
                .and_then(|m| util::parse_signed(m.as_str())),
        });
    }
}

pub fn initiative(
    record: &mut CreatureRecord,
    section: &Section,
    patterns: &Patterns,
    annotations: &mut Vec<MatchSpan>,
) {
    let joined = Joined::from_lines(&section.lines);
    let Some(caps) = patterns.initiative_details.captures(&joined.text) else {
        return;
    };
    joined.annotate(&patterns.initiative_details, &caps, annotations);
    record.initiative = Some(Initiative {
        modifier: util::parse_signed(&caps["modifier"]).unwrap_or(0),
        score: caps.name("score").and_then(|m| util::parse_signed(m.as_str())),
    });
}

pub fn challenge(
    record: &mut CreatureRecord,
    section: &Section,
    patterns: &Patterns,
    annotations: &mut Vec<MatchSpan>,
) {
    let joined = Joined::from_lines(&section.lines);
    let Some(caps) = patterns.challenge_details.captures(&joined.text) else {
        return;
    };
    joined.annotate(&patterns.challenge_details, &caps, annotations);

    let cr = util::parse_rating(&caps["cr"]).unwrap_or(0.0);
    let xp = caps
        .name("xp")
        .or_else(|| caps.name("xp_alt"))
        .and_then(|m| util::parse_grouped_number(m.as_str()))
        .unwrap_or(0);

    record.challenge = Some(Challenge {
        cr,
        display: render::display_for_cr(cr),
        xp,
        proficiency_bonus: caps.name("pb").and_then(|m| util::parse_grouped_number(m.as_str())),
        role: caps.name("role").map(|m| m.as_str().to_string()),
    });
}

pub fn proficiency_bonus(record: &mut CreatureRecord, section: &Section, patterns: &Patterns) {
    let joined = Joined::from_lines(&section.lines);
    let Some(caps) = patterns.proficiency_bonus_details.captures(&joined.text) else {
        return;
    };
    let Some(pb) = util::parse_grouped_number(&caps["pb"]) else {
        return;
    };

    let challenge = record.challenge.get_or_insert_with(|| Challenge {
        display: "0".to_string(),
        ..Challenge::default()
    });
    challenge.proficiency_bonus = Some(pb);
}

pub fn health(
    record: &mut CreatureRecord,
    section: &Section,
    patterns: &Patterns,
    annotations: &mut Vec<MatchSpan>,
) {
    record.health = roll(section, patterns, annotations);
}

pub fn souls(
    record: &mut CreatureRecord,
    section: &Section,
    patterns: &Patterns,
    annotations: &mut Vec<MatchSpan>,
) {
    record.souls = roll(section, patterns, annotations);
}

fn roll(section: &Section, patterns: &Patterns, annotations: &mut Vec<MatchSpan>) -> Option<Roll> {
    let joined = Joined::from_lines(&section.lines);
    let caps = patterns.roll_details.captures(&joined.text)?;
    joined.annotate(&patterns.roll_details, &caps, annotations);
    Some(Roll {
        value: util::parse_signed(&caps["value"])?,
        formula: caps
            .name("formula")
            .map(|m| util::collapse_whitespace(m.as_str())),
    })
}

pub fn gear(record: &mut CreatureRecord, section: &Section, patterns: &Patterns) {
    let joined = Joined::from_lines(&section.lines);
    let stripped = patterns.gear_prefix.replace(&joined.text, "");
    for token in stripped.split(',') {
        let Some(caps) = patterns.gear_item.captures(token) else {
            continue;
        };
        record.gear.push(GearItem {
            name: caps["name"].trim().to_lowercase(),
            quantity: caps
                .name("quantity")
                .and_then(|m| util::parse_grouped_number(m.as_str()))
                .unwrap_or(1),
        });
    }
}

pub fn senses(
    record: &mut CreatureRecord,
    section: &Section,
    patterns: &Patterns,
    annotations: &mut Vec<MatchSpan>,
) {
    let joined = Joined::from_lines(&section.lines);
    let mut leftover = patterns
        .senses_prefix
        .replace(&joined.text, "")
        .replace('\n', " ");

    for caps in patterns.senses_details.captures_iter(&joined.text) {
        joined.annotate(&patterns.senses_details, &caps, annotations);
        record.senses.push(Sense {
            name: caps["name"].to_lowercase(),
            value: util::parse_signed(&caps["value"]).unwrap_or(0),
        });
        leftover = leftover.replace(&caps[0], "");
    }

    // Whatever the pairwise scan did not consume ("blind beyond this
    // radius") is kept verbatim.
    let special = util::collapse_whitespace(
        &leftover
            .replace("ft.", "")
            .replace("passive", "")
            .replace(',', " "),
    );
    if !special.is_empty() {
        record.special_senses = Some(special);
    }
}

pub fn skills(
    record: &mut CreatureRecord,
    section: &Section,
    patterns: &Patterns,
    annotations: &mut Vec<MatchSpan>,
) {
    let joined = Joined::from_lines(&section.lines);
    for caps in patterns.skill_details.captures_iter(&joined.text) {
        joined.annotate(&patterns.skill_details, &caps, annotations);
        if let Some(modifier) = util::parse_signed(&caps["modifier"]) {
            record.skills.push(Skill {
                name: caps["name"].to_lowercase(),
                modifier,
            });
        }
    }
}

pub fn source(record: &mut CreatureRecord, section: &Section, patterns: &Patterns) {
    let joined = Joined::from_lines(&section.lines);
    let stripped = patterns.source_prefix.replace(&joined.text, "").to_string();
    if stripped.is_empty() {
        return;
    }

    record.source = Some(match patterns.source_page.captures(&stripped) {
        Some(caps) => {
            let start = caps.get(0).map(|m| m.start()).unwrap_or(stripped.len());
            SourceBook {
                book: stripped[..start].trim_end_matches(',').trim().to_string(),
                page: caps
                    .name("page")
                    .and_then(|m| util::parse_grouped_number(m.as_str())),
            }
        }
        None => SourceBook {
            book: stripped.trim().to_string(),
            page: None,
        },
    });
}

pub fn speed(
    record: &mut CreatureRecord,
    section: &Section,
    patterns: &Patterns,
    annotations: &mut Vec<MatchSpan>,
) {
    let joined = Joined::from_lines(&section.lines);
    for caps in patterns.speed_details.captures_iter(&joined.text) {
        joined.annotate(&patterns.speed_details, &caps, annotations);
        let mode = caps
            .name("name")
            .map(|m| m.as_str().to_lowercase())
            .filter(|name| name != "speed")
            .unwrap_or_else(|| "walk".to_string());
        if let Some(distance) = util::parse_grouped_number(&caps["value"]) {
            record.speeds.entries.push(SpeedEntry { mode, distance });
        }
    }
    record.speeds.hover = joined.text.to_lowercase().contains("hover");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawLine, SectionId};

    fn section(id: SectionId, text: &str) -> Section {
        let mut section = Section::new(id);
        section.lines = vec![RawLine::new(2, text)];
        section
    }

    fn parse_into(record: &mut CreatureRecord, id: SectionId, text: &str) {
        let patterns = Patterns::new().expect("patterns compile");
        let section = section(id, text);
        crate::parser::extract::apply(
            record,
            &section,
            crate::parser::normalize::ParseMode::CleanLines,
            &patterns,
            &mut Vec::new(),
        );
    }

    #[test]
    fn racial_line_with_known_type() {
        let mut record = CreatureRecord::new("Aboleth");
        parse_into(
            &mut record,
            SectionId::RacialDetails,
            "Large aberration, lawful evil",
        );
        assert_eq!(record.size, Some(Size::Large));
        assert_eq!(record.creature_type.as_deref(), Some("aberration"));
        assert_eq!(record.alignment.as_deref(), Some("lawful evil"));
        assert!(record.custom_type.is_none());
    }

    #[test]
    fn racial_line_with_swarm_and_race() {
        let mut record = CreatureRecord::new("Swarm");
        parse_into(
            &mut record,
            SectionId::RacialDetails,
            "Medium swarm of Tiny beasts, unaligned",
        );
        assert_eq!(record.size, Some(Size::Medium));
        assert_eq!(record.swarm_size, Some(Size::Tiny));
        assert_eq!(record.creature_type.as_deref(), Some("beast"));

        let mut humanoid = CreatureRecord::new("Cultist");
        parse_into(
            &mut humanoid,
            SectionId::RacialDetails,
            "Medium humanoid (any race), any non-good alignment",
        );
        assert_eq!(humanoid.race.as_deref(), Some("any race"));
    }

    #[test]
    fn unknown_creature_type_is_kept_as_custom() {
        let mut record = CreatureRecord::new("Gonzo");
        parse_into(&mut record, SectionId::RacialDetails, "Large muppet, neutral");
        assert!(record.creature_type.is_none());
        assert_eq!(record.custom_type.as_deref(), Some("muppet"));
    }

    #[test]
    fn armor_splits_equipment_from_natural_armor() {
        let mut record = CreatureRecord::new("Guard");
        parse_into(
            &mut record,
            SectionId::Armor,
            "Armor Class 18 (natural armor, shield)",
        );
        let armor = record.armor.expect("armor parsed");
        assert_eq!(armor.ac, 18);
        assert_eq!(armor.types, vec!["natural armor"]);
        assert_eq!(record.gear.len(), 1);
        assert_eq!(record.gear[0].name, "shield");
    }

    #[test]
    fn armor_line_may_carry_initiative() {
        let mut record = CreatureRecord::new("Knight");
        parse_into(&mut record, SectionId::Armor, "AC 18 Initiative +4 (14)");
        let initiative = record.initiative.expect("initiative parsed");
        assert_eq!(initiative.modifier, 4);
        assert_eq!(initiative.score, Some(14));
    }

    #[test]
    fn challenge_parses_fractions_and_grouped_xp() {
        let mut record = CreatureRecord::new("Bandit");
        parse_into(&mut record, SectionId::Challenge, "Challenge 1/8 (25 XP)");
        let challenge = record.challenge.clone().expect("challenge parsed");
        assert_eq!(challenge.cr, 0.125);
        assert_eq!(challenge.display, "1/8");
        assert_eq!(challenge.xp, 25);

        parse_into(&mut record, SectionId::Challenge, "Challenge 10 (5,900 XP)");
        let challenge = record.challenge.expect("challenge parsed");
        assert_eq!(challenge.cr, 10.0);
        assert_eq!(challenge.xp, 5900);
    }

    #[test]
    fn challenge_accepts_role_and_inline_proficiency() {
        let mut record = CreatureRecord::new("Stalker");
        parse_into(
            &mut record,
            SectionId::Challenge,
            "Challenge 2 Ambusher (450 XP; PB +2)",
        );
        let challenge = record.challenge.expect("challenge parsed");
        assert_eq!(challenge.role.as_deref(), Some("Ambusher"));
        assert_eq!(challenge.xp, 450);
        assert_eq!(challenge.proficiency_bonus, Some(2));
    }

    #[test]
    fn proficiency_line_without_challenge_creates_one() {
        let mut record = CreatureRecord::new("Stalker");
        parse_into(&mut record, SectionId::ProficiencyBonus, "Proficiency Bonus +3");
        let challenge = record.challenge.expect("challenge created");
        assert_eq!(challenge.proficiency_bonus, Some(3));
        assert_eq!(challenge.display, "0");
    }

    #[test]
    fn health_keeps_value_and_formula() {
        let mut record = CreatureRecord::new("Aboleth");
        parse_into(&mut record, SectionId::Health, "Hit Points 135 (18d10 + 36)");
        let health = record.health.expect("health parsed");
        assert_eq!(health.value, 135);
        assert_eq!(health.formula.as_deref(), Some("18d10 + 36"));
    }

    #[test]
    fn souls_line_parses_like_health() {
        let mut record = CreatureRecord::new("Devil");
        parse_into(&mut record, SectionId::Souls, "Souls 13 (3d12)");
        let souls = record.souls.expect("souls parsed");
        assert_eq!(souls.value, 13);
        assert_eq!(souls.formula.as_deref(), Some("3d12"));
    }

    #[test]
    fn gear_items_carry_quantities() {
        let mut record = CreatureRecord::new("Guard");
        parse_into(&mut record, SectionId::Gear, "Gear Chain Mail, Javelin (6), Shield");
        let names: Vec<&str> = record.gear.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["chain mail", "javelin", "shield"]);
        assert_eq!(record.gear[1].quantity, 6);
        assert_eq!(record.gear[0].quantity, 1);
    }

    #[test]
    fn senses_split_pairs_from_special_text() {
        let mut record = CreatureRecord::new("Aboleth");
        parse_into(
            &mut record,
            SectionId::Senses,
            "Senses darkvision 120 ft., passive Perception 20",
        );
        assert_eq!(record.senses.len(), 2);
        assert_eq!(record.senses[0].name, "darkvision");
        assert_eq!(record.senses[0].value, 120);
        assert_eq!(record.senses[1].name, "perception");
        assert!(record.special_senses.is_none());

        let mut grimlock = CreatureRecord::new("Grimlock");
        parse_into(
            &mut grimlock,
            SectionId::Senses,
            "Senses blindsight 30 ft. or 10 ft. while deafened (blind beyond this radius)",
        );
        assert!(grimlock.special_senses.is_some());
    }

    #[test]
    fn skills_lowercase_names_and_parse_signs() {
        let mut record = CreatureRecord::new("Aboleth");
        parse_into(
            &mut record,
            SectionId::Skills,
            "Skills History +12, Perception +10",
        );
        assert_eq!(record.skills.len(), 2);
        assert_eq!(record.skills[0].name, "history");
        assert_eq!(record.skills[0].modifier, 12);
    }

    #[test]
    fn source_splits_book_from_page() {
        let mut record = CreatureRecord::new("Aboleth");
        parse_into(&mut record, SectionId::Source, "Source Monster Manual, pg. 13");
        let source = record.source.expect("source parsed");
        assert_eq!(source.book, "Monster Manual");
        assert_eq!(source.page, Some(13));

        let mut other = CreatureRecord::new("Aboleth");
        parse_into(&mut other, SectionId::Source, "Source Homebrew Collection");
        let source = other.source.expect("source parsed");
        assert_eq!(source.book, "Homebrew Collection");
        assert_eq!(source.page, None);
    }

    #[test]
    fn speed_defaults_unlabeled_mode_to_walk() {
        let mut record = CreatureRecord::new("Aboleth");
        parse_into(
            &mut record,
            SectionId::Speed,
            "Speed 10 ft., swim 40 ft., fly 60 ft. (hover)",
        );
        assert_eq!(record.speeds.get("walk"), Some(10));
        assert_eq!(record.speeds.get("swim"), Some(40));
        assert_eq!(record.speeds.get("fly"), Some(60));
        assert!(record.speeds.hover);
    }
}
