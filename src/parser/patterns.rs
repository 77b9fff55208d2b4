//! The compiled pattern set used by segmentation and extraction.
//!
//! Line matchers have to be written carefully so that each one matches the
//! line it cares about but not some other line that happens to start with
//! the same word. Detail patterns use named capture groups; the capture
//! names double as annotation labels.

use anyhow::{Context, Result};
use regex::Regex;

use crate::model::SectionId;

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("invalid pattern: {pattern}"))
}

const ABILITY_WORDS: &str = r"\bstr\b|\bstrength\b|\bdex\b|\bdexterity\b|\bcon\b|\bconstitution\b|\bint\b|\bintelligence\b|\bwis\b|\bwisdom\b|\bcha\b|\bcharisma\b";

const CONDITION_WORDS: &str = r"\bblinded\b|\bcharmed\b|\bdeafened\b|\bdiseased\b|\bexhaustion\b|\bfrightened\b|\bgrappled\b|\bincapacitated\b|\binvisible\b|\bparalyzed\b|\bpetrified\b|\bpoisoned\b|\bprone\b|\brestrained\b|\bstunned\b|\bunconscious\b";

// The racial line ("Large aberration (shapechanger), lawful evil") is also
// needed with its captures at extraction time, so it lives in a const shared
// with the registry.
const RACIAL_DETAILS: &str = r"(?i)^(?P<size>\bfine\b|\bdiminutive\b|\btiny\b|\bsmall\b|\bmedium\b|\blarge\b|\bhuge\b|\bgargantuan\b|\bcolossal\b)?(\sor\s\w+)?(\sswarm of (?P<swarm>\w+))?\b\s?(?P<kind>[\w\s]+\w)([,\s]+\((?P<race>[,\w\s]+)\))?([,\s]+(?P<alignment>[\w\s\-]+))?";

// Section headers whose value normally sits on the same line. Used to stitch
// a header-only line back together with the value line below it.
const VALUE_HEADERS: &str = r"(?:armor|armour) class|ac|challenge rating|challenge|\bcr\b|condition\simmunities|damage\simmunities|immunities|(?:damage\s)?resistances|(?:damage\s)?vulnerabilities|gear|hit points|\bhp\b|initiative|languages|proficiency bonus|saving throws|saves|senses|skills|souls|speed";

/// Every regex the parser needs, compiled once per parse call.
pub struct Patterns {
    /// Ordered line matchers; relative order is match priority.
    pub registry: Vec<(SectionId, Regex)>,
    pub other_block: Regex,

    pub header_only_line: Regex,
    pub header_prefix: Regex,

    block_title: Regex,
    villain_title: Regex,
    pub spell_group: Regex,

    pub ability_names: Regex,
    pub ability_values: Regex,
    pub ability_values_2024: Regex,

    pub racial_details: Regex,
    pub initiative_details: Regex,
    pub armor_details: Regex,
    pub proficiency_bonus_details: Regex,
    pub challenge_details: Regex,
    pub gear_prefix: Regex,
    pub gear_item: Regex,
    pub roll_details: Regex,
    pub senses_details: Regex,
    pub senses_prefix: Regex,
    pub skill_details: Regex,
    pub speed_details: Regex,
    pub source_prefix: Regex,
    pub source_page: Regex,
    pub spellcasting_details: Regex,

    pub damage_types: Regex,
    pub condition_types: Regex,
    pub defense_prefix: Regex,
    pub known_languages: Regex,
    pub languages_prefix: Regex,

    pub saving_throw_details: Regex,
    pub saving_throw_details_2024: Regex,
    pub attack_to_hit: Regex,
    pub attack_roll_2024: Regex,
    pub dc_clause: Regex,
    pub damage_roll: Regex,
    pub per_day_marker: Regex,
    pub recharge: Regex,
    pub reach: Regex,
    pub range: Regex,
    pub target: Regex,
    pub action_cost: Regex,
    pub legendary_action_count: Regex,
    pub lair_initiative_count: Regex,
    pub spell_action_title: Regex,
    pub cast_action: Regex,
    pub spell_attack_text: Regex,

    pub spellcasting_entry_heading: Regex,
    pub spellcasting_bare_heading: Regex,
    pub spellcasting_block_start: Regex,
    pub spell_line_leveled: Regex,
    pub spell_line_innate: Regex,
    pub spell_level_suffix: Regex,
    pub spell_included_in_ac: Regex,
    pub spell_trailing_paren: Regex,
    pub spell_trailing_marker: Regex,
}

impl Patterns {
    pub fn new() -> Result<Patterns> {
        let registry = vec![
            (
                SectionId::Abilities,
                compile(&format!(r"(?i)^({ABILITY_WORDS}|\bmod\b(\s+save\b)?)"))?,
            ),
            (SectionId::Actions, compile(r"(?i)^actions$")?),
            (
                SectionId::Armor,
                compile(r"(?i)^((armor|armour) class|ac)[\s:]+\d+")?,
            ),
            (SectionId::BonusActions, compile(r"(?i)^bonus actions$")?),
            (
                SectionId::Challenge,
                compile(r"(?i)^(challenge|\bcr\b|challenge rating)[\s:]+[½\d]")?,
            ),
            (
                SectionId::ConditionImmunities,
                compile(r"(?i)^condition\simmunities[\s:]+")?,
            ),
            (
                SectionId::DamageImmunities,
                compile(r"(?i)^damage\simmunities[\s:]+")?,
            ),
            (SectionId::Immunities, compile(r"(?i)^immunities[\s:]+")?),
            (
                SectionId::DamageResistances,
                compile(r"(?i)^(damage\s)?resistances[\s:]+")?,
            ),
            (
                SectionId::DamageVulnerabilities,
                compile(r"(?i)^(damage\s)?vulnerabilities[\s:]+")?,
            ),
            (SectionId::Gear, compile(r"(?i)^gear[\s:]+")?),
            (
                SectionId::Health,
                compile(r"(?i)^(hit points|\bhp\b)[\s:]+\d+")?,
            ),
            (SectionId::Initiative, compile(r"(?i)^initiative[\s:]+")?),
            (SectionId::LairActions, compile(r"(?i)^lair actions$")?),
            (SectionId::Languages, compile(r"(?i)^languages[\s:]+")?),
            (
                SectionId::LegendaryActions,
                compile(r"(?i)^legendary actions(\s+\([^\)]*\)$)?")?,
            ),
            (
                SectionId::MythicActions,
                compile(r"(?i)^mythic actions(\s+\([^\)]*\)$)?")?,
            ),
            (
                SectionId::ProficiencyBonus,
                compile(r"(?i)^proficiency bonus[\s:]+\+")?,
            ),
            (SectionId::RacialDetails, compile(RACIAL_DETAILS)?),
            (SectionId::Reactions, compile(r"(?i)^reactions$")?),
            (
                SectionId::SavingThrows,
                compile(
                    r"(?i)^(saving throws|saves)[\s:]+(\bstr(ength)?\b|\bdex(terity)?\b|\bcon(stitution)?\b|\bint(elligence)?\b|\bwis(dom)?\b|\bcha(risma)?\b)",
                )?,
            ),
            (
                SectionId::Senses,
                compile(r"(?i)^senses( passive)?(.+\d+\s\bft\b)?")?,
            ),
            (SectionId::Skills, compile(r"(?i)^skills.+[\+\-]\d+")?),
            (SectionId::Souls, compile(r"(?i)^souls[\s:]+\d+")?),
            (SectionId::Source, compile(r"(?i)^source[\s:]+")?),
            (
                SectionId::Speed,
                compile(r"(?i)^speed[\s:]+(\w+\s+)?\d+\s?ft")?,
            ),
            (
                SectionId::Traits,
                compile(r"(?i)^(special\s)?(traits|abilities)$")?,
            ),
            (SectionId::UtilitySpells, compile(r"(?i)^utility spells$")?),
            (SectionId::VillainActions, compile(r"(?i)^villain actions$")?),
        ];

        Ok(Patterns {
            registry,
            other_block: compile(r"^([A-Z][A-Za-z]+\s?){1,2}$")?,

            header_only_line: compile(&format!(r"(?i)^(?:{VALUE_HEADERS})\s*$"))?,
            header_prefix: compile(&format!(r"(?i)^(?:{VALUE_HEADERS})\s+"))?,

            // An entry title: a capitalized first word, an optional ignored
            // preposition, at most three more words, an optional
            // parenthetical, then terminal punctuation. The caller applies
            // two checks the pattern cannot express: a parenthetical
            // starting with "spell save" disqualifies the match, and a
            // trailing ':' does not count when a number follows it.
            block_title: compile(
                r"^(?P<title>(?:[A-Z][\w\-+,;'’]+[\s\-]?)(?:(?:of|and|the|from|in|at|on|with|to|by|into)\s)?(?:[\w\-+,;'’]+\s?){0,3})(?:\s\((?P<paren>[^)]+)\))?(?P<punct>[.!:])",
            )?,
            villain_title: compile(r"^(?P<title>Action\s[123]:\s.+[.!?])")?,
            spell_group: compile(
                r"(?i)(?P<group>(?:cantrips|at.will|(?P<level>\d+)(?:st|nd|rd|th)\slevel|(?P<per_day>\d+)/day)\s?(?:each)?(?:\s?\((?:(?P<slots>\d+)\sslots?|at.will)\))?):\s?",
            )?,

            ability_names: compile(&format!(r"(?i)(?P<name>{ABILITY_WORDS})"))?,
            ability_values: compile(r"(?P<base>\d+)\s?(?:\((?P<modifier>[\+\-−–]?\d+)\))?")?,
            // Signs are required on both trailing columns so that a plain
            // six-value line is not mistaken for the three-column layout.
            ability_values_2024: compile(
                r"(?P<base>\d+)\s(?P<modifier>[\+\-−–]\d+)\s?(?P<save>[\+\-−–]\d+)",
            )?,

            racial_details: compile(RACIAL_DETAILS)?,
            initiative_details: compile(r"(?P<modifier>[\+\-−–]?\d+)(\s+\((?P<score>\d+)\))?")?,
            armor_details: compile(
                r"(?i)\s(?P<ac>\d+)(\s\((?P<types>[^)]+)\))?(\s+initiative\s(?P<initiative_modifier>[\+\-−–]?\d+)(\s+\((?P<initiative_score>\d+)\))?)?",
            )?,
            proficiency_bonus_details: compile(r"(?i)(?:pb|proficiency\sbonus)\s\+?(?P<pb>\d+)")?,
            // The role group is case-sensitive so that a literal "XP" token
            // between the rating and its value is not taken for a role.
            challenge_details: compile(
                r"(?i)(?P<cr>½|[\d/]+)\s?(?P<role>(?-i:[A-Z][a-z]+))?\s?(?:\(?(?:(?P<xp>[\d,]+)\s?xp|xp\s(?P<xp_alt>[\d,]+))(?:\W+(?:pb|proficiency\sbonus)\s\+?(?P<pb>\d+))?)?",
            )?,
            gear_prefix: compile(r"(?i)^gear[\s:]+")?,
            gear_item: compile(r"(?i)^\s*(?P<name>\w+(?:\s\w+)*)(?:\s?\((?P<quantity>\d+)\))?")?,
            roll_details: compile(
                r"(?P<value>\d+)\s?(\((?P<formula>\d+d\d+(\s?[\+\-−–]\s?\d+)?)\))?",
            )?,
            senses_details: compile(r"(?P<name>\w+) (?P<value>\d+)")?,
            senses_prefix: compile(r"(?i)^senses[\s:]*")?,
            skill_details: compile(
                r"(?i)(?P<name>\bacrobatics\b|\barcana\b|\banimal handling\b|\bathletics\b|\bdeception\b|\bhistory\b|\binsight\b|\bintimidation\b|\binvestigation\b|\bmedicine\b|\bnature\b|\bperception\b|\bperformance\b|\bpersuasion\b|\breligion\b|\bsleight of hand\b|\bstealth\b|\bsurvival\b) (?P<modifier>[\+\-]\d+)",
            )?,
            speed_details: compile(r"(?i)(?:(?P<name>[a-z]+)[\s:]+)?(?P<value>\d+)")?,
            source_prefix: compile(r"(?i)^source[\s:]+")?,
            source_page: compile(r"(?i),?\s+(?:page|pag|pg|p)\.?\s?(?P<page>\d+)")?,
            spellcasting_details: compile(
                r"(?i)spellcasting\sability\sis\s(?P<ability>\w+)|(?P<innate_ability>\w+)\sas\sthe\sspellcasting\sability|spell\ssave\sdc\s(?P<save_dc>\d+)|(?P<level>\d+)(.+)level\sspellcaster",
            )?,

            damage_types: compile(
                r"(?i)(?P<damage_type>\bbludgeoning\b|\bpiercing\b|\bslashing\b|\bacid\b|\bcold\b|\bfire\b|\blightning\b|\bnecrotic\b|\bpoison\b|\bpsychic\b|\bradiant\b|\bthunder\b)",
            )?,
            condition_types: compile(&format!(r"(?i)(?P<condition>{CONDITION_WORDS})"))?,
            defense_prefix: compile(
                r"(?i)^(damage\s|condition\s)?(immunities|resistances|vulnerabilities)[\s:]*",
            )?,
            known_languages: compile(
                r"(?i)(?:\w+\s*\()?(?P<language>\baarakocra\b|\babyssal\b|\baquan\b|\bauran\b|\bcelestial\b|\bcommon\b|\bdeep\s+speech\b|\bdeep\b|\bdraconic\b|\bdruidic\b|\bdwarvish\b|\belvish\b|\bgiant\b|\bgith\b|\bgnoll\b|\bgnomish\b|\bgoblin\b|\bhalfling\b|\bignan\b|\binfernal\b|\borc\b|\bprimordial\b|\bsylvan\b|\bterran\b|\bthieves['’]?\s+cant\b|\bcant\b|\bundercommon\b|\btelepathy\s(?P<telepathy>\d+)\s(f(ee|oo)?t\.?|'|’))\)?",
            )?,
            languages_prefix: compile(r"(?i)^languages[.:]?\s*")?,

            saving_throw_details: compile(&format!(
                r"(?is)must\s(make|succeed\son)\sa\sdc\s(?P<save_dc>\d+)\s(?P<save_ability>\w+)\s(saving\sthrow|save)(?:.*(?P<condition>{CONDITION_WORDS}))?(?:.*(?P<half_damage>\bhalf\b)[a-z\s]*damage)?"
            ))?,
            saving_throw_details_2024: compile(&format!(
                r"(?is)(?P<save_ability>\w+)\s(saving throw):\s*dc\s(?P<save_dc>\d+)(?:.*(?P<condition>{CONDITION_WORDS}))?(?:.*success:\s(?P<half_damage>\bhalf\b))?"
            ))?,
            attack_to_hit: compile(r"(?i)\+(?P<to_hit>\d+)\s+to\s+hit\b")?,
            attack_roll_2024: compile(r"(?i)attack\sroll:\s*(?:\+(?P<to_hit>\d+)|bonus\sequal)")?,
            dc_clause: compile(r"(?i)\bdc\s\d+")?,
            damage_roll: compile(
                r"(?i)\(?(?P<base_roll>\d+d\d+?)\s?(?P<base_modifier>[+\-]\s?\d+)?\)?\s(?P<base_type>\w+)(?:\sdamage)(?:.+(?:(?:\bor\s+(?:\d+\s+\(*)?(?:(?P<versatile_roll>\d+d\d+?)\s?(?P<versatile_modifier>[+\-]\s?\d+)?)\)?\s(?P<versatile_type>\w+)(?:\sdamage\sif\sused\swith\stwo\shands))|(?:plus|and)\s+(?:\d+\s+\(*)?(?:(?P<plus_roll>\d+d\d+?)\s?(?P<plus_modifier>[+\-]\s?\d+)?)\)?\s(?P<plus_type>\w+)(?:\sdamage)))?",
            )?,
            per_day_marker: compile(r"(?i)\((?P<per_day>\d+)/day[\),;]")?,
            recharge: compile(r"(?i)\(recharge\s(?P<recharge>\d+)([–\-]\d+)?\)")?,
            reach: compile(r"(?i)reach\s(?P<reach>\d+)\s?(f(ee|oo)?t|'|’)")?,
            range: compile(r"(?i)range\s(?P<near>\d+)(/(?P<far>\d+))?\s?(f(ee|oo)?t|'|’)")?,
            // Two shapes of target clause: an area ("a 15-foot cone") or
            // creatures ("one target", "each creature within 30 feet"). The
            // range lookup cannot cross a sentence boundary.
            target: compile(
                r"(?i)(?:a\s(?P<area_range>\d+)-?\s?(?:foot|feet|ft\.?|'|’)[\s-](?P<shape>\w+)|(?P<amount>each|one|a)\s(?:creature|target|object|humanoid)s?\b(?:[^.]*?within\s(?P<range>\d+)\s?(?:foot|feet|ft\.?|'|’))?)",
            )?,
            action_cost: compile(r"(?i)\((costs )?(?P<cost>\d+) action(s)?\)")?,
            legendary_action_count: compile(
                r"(?i)take\s(?P<count>\d+)\slegendary|legendary\saction\suses:\s?(?P<uses>\d+)(?:\s?\((?P<lair_uses>\d+)\sin\slair\))?\s*\.",
            )?,
            lair_initiative_count: compile(r"(?i)initiative\scount\s(?P<count>\d+)")?,
            spell_action_title: compile(
                r"(?i)\d+/day(?:[,;]\s?(?P<level>\d)(?:st|nd|rd|th)[-\s]level\sspell)?(?:[,;]\s?(?P<concentration>concentration))?",
            )?,
            // The original phrasing excludes generic objects ("casts a
            // spell"); the caller rejects spell lists starting with "a " or
            // "one of ".
            cast_action: compile(
                r"(?i)^(?P<feature>[^.:!]+)[.:!]\s?(?P<caster>(?:\w+\s){1,4})(?:\bcasts|\bcan\sinnately\scast|\bspellcasting\sto\scast)\s(?P<spell_list>.*?),?\s?(?:in\sresponse|using|requiring|\.)",
            )?,
            spell_attack_text: compile(r"(?i)spell attack")?,

            spellcasting_entry_heading: compile(r"(?i)^(innate )?spellcasting( \([^)/]+\))?\.")?,
            spellcasting_bare_heading: compile(r"(?i)^(innate )?spellcasting( \([^)/]+\))?$")?,
            spellcasting_block_start: compile(r"(?i)^(innate )?spellcasting\b")?,
            spell_line_leveled: compile(
                r"(?i)(at-will|cantrips|1st|2nd|3rd|4th|5th|6th|7th|8th|9th)[\w\s\(\)\-]*:",
            )?,
            spell_line_innate: compile(r"(?i)at will:|\d/day( each)?")?,
            spell_level_suffix: compile(r"(?i)\s*\(level\s(?P<level>\d+)[^)]*\)")?,
            spell_included_in_ac: compile(r"(?i)\s*\(included in ac\)")?,
            spell_trailing_paren: compile(r"\s*\([^)]*\)\s*$")?,
            spell_trailing_marker: compile(r"(\s[ABR]|\s?\+)\s*$")?,
        })
    }

    /// Tests whether a line opens an entry title and returns the title text.
    /// Both disqualifiers the title pattern cannot express are applied here.
    pub fn block_title(&self, line: &str) -> Option<String> {
        let caps = self.block_title.captures(line)?;
        if let Some(paren) = caps.name("paren") {
            if paren.as_str().starts_with("spell save") {
                return None;
            }
        }
        let punct = caps.name("punct")?;
        if punct.as_str() == ":" {
            let rest = line[punct.end()..].trim_start();
            if rest.starts_with(|c: char| c.is_ascii_digit()) {
                return None;
            }
        }
        Some(caps.name("title")?.as_str().trim().to_string())
    }

    pub fn villain_title(&self, line: &str) -> Option<String> {
        let caps = self.villain_title.captures(line)?;
        Some(caps.name("title")?.as_str().trim().to_string())
    }
}
