use crate::model::{ActionKind, Hint, SectionId, Size, SpellUseKind, DESCRIPTION_ENTRY};
use crate::parser::{parse, parse_with};
use crate::parser::patterns::Patterns;
use crate::render;

const ABOLETH: &str = "\
Aboleth
Large aberration, lawful evil
Armor Class 17 (natural armor)
Hit Points 135 (18d10 + 36)
Speed 10 ft., swim 40 ft.
STR 21 (+5) DEX 9 (-1) CON 15 (+2) INT 18 (+4) WIS 15 (+2) CHA 18 (+4)
Saving Throws Con +6, Int +8, Wis +6
Skills History +12, Perception +10
Senses darkvision 120 ft., passive Perception 20
Languages Deep Speech, telepathy 120 ft.
Challenge 10 (5,900 XP)
Amphibious. The aboleth can breathe air and water.
Innate Spellcasting. The aboleth's spellcasting ability is Intelligence (spell save DC 16). It can innately cast the following spells, requiring no components:
At will: detect magic
1/day each: confusion
Actions
Multiattack. The aboleth makes three tentacle attacks.
Tentacle. Melee Weapon Attack: +9 to hit, reach 10 ft., one target. Hit: 12 (2d6 + 5) bludgeoning damage.
Legendary Actions
The aboleth can take 3 legendary actions, choosing from the options below.
Detect. The aboleth makes a Wisdom (Perception) check.
";

#[test]
fn classic_block_fills_the_record() {
    let result = parse(ABOLETH, &[]).unwrap().unwrap();
    let record = &result.record;

    assert_eq!(record.name, "Aboleth");
    assert_eq!(record.size, Some(Size::Large));
    assert_eq!(record.creature_type.as_deref(), Some("aberration"));
    assert_eq!(record.alignment.as_deref(), Some("lawful evil"));

    let armor = record.armor.as_ref().unwrap();
    assert_eq!(armor.ac, 17);
    assert_eq!(armor.types, vec!["natural armor".to_string()]);

    let health = record.health.as_ref().unwrap();
    assert_eq!(health.value, 135);
    assert!(health.formula.is_some());

    assert_eq!(record.speeds.get("walk"), Some(10));
    assert_eq!(record.speeds.get("swim"), Some(40));

    assert_eq!(record.abilities.str, Some(21));
    assert_eq!(record.abilities.dex, Some(9));
    assert_eq!(record.abilities.cha, Some(18));

    assert_eq!(record.saving_throws, vec!["con", "int", "wis"]);
    assert_eq!(record.skills.len(), 2);
    assert!(record
        .skills
        .iter()
        .any(|skill| skill.name.eq_ignore_ascii_case("history") && skill.modifier == 12));

    assert!(record
        .senses
        .iter()
        .any(|sense| sense.name == "darkvision" && sense.value == 120));
    assert!(record.languages.known.iter().any(|key| key == "deep"));
    assert_eq!(record.languages.telepathy, Some(120));

    let challenge = record.challenge.as_ref().unwrap();
    assert_eq!(challenge.cr, 10.0);
    assert_eq!(challenge.display, "10");
    assert_eq!(challenge.xp, 5900);

    // The untitled trait run before "Actions" lands in an implicit trait
    // section; the spellcasting entry is pulled out of it.
    assert_eq!(record.features.len(), 1);
    assert_eq!(record.features[0].name, "Amphibious");

    let innate = record.innate_spellcasting.as_ref().unwrap();
    assert_eq!(innate.ability.as_deref(), Some("intelligence"));
    assert_eq!(innate.save_dc, Some(16));
    assert_eq!(innate.groups.len(), 2);
    assert_eq!(innate.groups[0].spells[0].name, "Detect Magic");
    assert_eq!(
        innate.groups[0].spells[0].use_kind,
        Some(SpellUseKind::AtWill)
    );
    assert_eq!(innate.groups[1].spells[0].name, "Confusion");
    assert_eq!(innate.groups[1].spells[0].count, Some(1));

    assert_eq!(record.actions.len(), 2);
    let tentacle = &record.actions[1];
    assert_eq!(tentacle.name, "Tentacle");
    assert_eq!(tentacle.fields.kind, Some(ActionKind::Weapon));
    assert_eq!(
        tentacle.fields.attack.as_ref().unwrap().to_hit,
        Some(9)
    );
    assert_eq!(tentacle.fields.damage.as_ref().unwrap().roll, "2d6");
    assert_eq!(tentacle.fields.reach, Some(10));
    let target = tentacle.fields.target.as_ref().unwrap();
    assert!(target.creature);
    assert_eq!(target.amount, Some(1));

    assert_eq!(record.legendary_actions.len(), 2);
    let preamble = &record.legendary_actions[0];
    assert_eq!(preamble.name, DESCRIPTION_ENTRY);
    assert_eq!(preamble.fields.legendary_action_count, Some(3));
    assert_eq!(record.legendary_actions[1].name, "Detect");
}

#[test]
fn every_line_is_classified_or_reported() {
    let result = parse(ABOLETH, &[]).unwrap().unwrap();

    let classified: usize = result.sections.iter().map(|s| s.lines.len()).sum();
    assert_eq!(
        classified + result.unknown_lines.len(),
        result.lines.len()
    );
    assert!(result.unknown_lines.is_empty());
}

#[test]
fn render_round_trip_is_stable() {
    let patterns = Patterns::new().unwrap();
    let first = parse_with(&patterns, ABOLETH, &[]).unwrap();

    let rendered = render::to_canonical_text(&first.record);
    let second = parse_with(&patterns, &rendered, &[]).unwrap();

    assert_eq!(second.record.name, first.record.name);
    assert_eq!(second.record.size, first.record.size);
    assert_eq!(second.record.abilities, first.record.abilities);
    assert_eq!(second.record.speeds, first.record.speeds);
    assert_eq!(second.record.saving_throws, first.record.saving_throws);

    let challenge = second.record.challenge.as_ref().unwrap();
    assert_eq!(challenge.cr, 10.0);
    assert_eq!(challenge.xp, 5900);

    let named = |entries: &[crate::model::Entry]| {
        entries
            .iter()
            .filter(|entry| entry.name != DESCRIPTION_ENTRY)
            .count()
    };
    assert_eq!(named(&second.record.actions), named(&first.record.actions));
    assert_eq!(
        named(&second.record.legendary_actions),
        named(&first.record.legendary_actions)
    );
    assert!(second.record.innate_spellcasting.is_some());
}

#[test]
fn fractional_challenge_keeps_its_display() {
    let text = "\
Bandit
Medium humanoid (any race), chaotic evil
Challenge 1/8 (25 XP)
";
    let result = parse(text, &[]).unwrap().unwrap();
    let challenge = result.record.challenge.as_ref().unwrap();

    assert_eq!(challenge.cr, 0.125);
    assert_eq!(challenge.display, "1/8");
    assert_eq!(challenge.xp, 25);
    assert_eq!(result.record.race.as_deref(), Some("any race"));
}

#[test]
fn half_rating_glyph_classifies_and_extracts() {
    let text = "\
Shrieker
Medium plant, unaligned
Challenge \u{00bd} (100 XP)
";
    let result = parse(text, &[]).unwrap().unwrap();
    let challenge = result.record.challenge.as_ref().unwrap();

    assert_eq!(challenge.cr, 0.5);
    assert_eq!(challenge.display, "1/2");
    assert_eq!(challenge.xp, 100);
    assert!(result.unknown_lines.is_empty());
}

#[test]
fn dual_spellcasting_traits_fill_both_slots() {
    let text = "\
Drow Priestess of Lolth
Medium humanoid (elf), neutral evil
Armor Class 16 (scale mail)
Hit Points 71 (13d8 + 13)
Challenge 8 (3,900 XP)
Fey Ancestry. The drow has advantage on saving throws against being charmed.
Innate Spellcasting. The drow's spellcasting ability is Charisma (spell save DC 15). She can innately cast the following spells:
At will: dancing lights
1/day each: darkness, faerie fire
Spellcasting. The drow is a 10th-level spellcaster. Her spellcasting ability is Wisdom (spell save DC 14).
Cantrips (at will): guidance, poison spray
1st level (4 slots): bless, cure wounds
";
    let result = parse(text, &[]).unwrap().unwrap();
    let record = &result.record;

    // Spell-group lines must not leak into the trait list as bogus entries.
    let feature_names: Vec<&str> = record.features.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(feature_names, vec!["Fey Ancestry"]);

    let innate = record.innate_spellcasting.as_ref().unwrap();
    assert_eq!(innate.ability.as_deref(), Some("charisma"));
    assert_eq!(innate.save_dc, Some(15));
    assert_eq!(innate.groups.len(), 2);
    assert_eq!(innate.groups[0].spells[0].name, "Dancing Lights");

    let leveled = record.spellcasting.as_ref().unwrap();
    assert_eq!(leveled.ability.as_deref(), Some("wisdom"));
    assert_eq!(leveled.save_dc, Some(14));
    assert_eq!(leveled.caster_level, Some(10));
    assert_eq!(leveled.groups.len(), 2);
    assert_eq!(
        leveled.groups[0].spells[0].use_kind,
        Some(SpellUseKind::Cantrip)
    );
    assert_eq!(leveled.groups[1].spells[0].use_kind, Some(SpellUseKind::Slots));
    assert_eq!(leveled.groups[1].spells[0].count, Some(4));
}

#[test]
fn hints_override_pattern_matching() {
    let text = "\
Grim Reaper
Ambush. Strikes from the dark.
";
    let hints = vec![Hint {
        text: "Ambush. Strikes from the dark.".to_string(),
        section: SectionId::OtherInfo,
    }];

    let result = parse(text, &hints).unwrap().unwrap();
    assert!(result.record.features.is_empty());
    assert_eq!(
        result.record.other_info,
        vec!["Ambush. Strikes from the dark.".to_string()]
    );
}

#[test]
fn blank_input_parses_to_nothing() {
    assert!(parse("", &[]).unwrap().is_none());
    assert!(parse("   \n\n  \t\n", &[]).unwrap().is_none());
}
