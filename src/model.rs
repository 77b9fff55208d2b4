use serde::{Deserialize, Serialize};

/// Identifier for one recognized section of a statblock. `Top` sections
/// appear once near the start of the block with their value inline on the
/// same line; `Block` sections are introduced by a heading line and span the
/// lines that follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionId {
    Abilities,
    Actions,
    Armor,
    BonusActions,
    Challenge,
    ConditionImmunities,
    DamageImmunities,
    /// Merged "Immunities" header from the 2024 layout, covering both damage
    /// and condition immunities on one line.
    Immunities,
    DamageResistances,
    DamageVulnerabilities,
    Features,
    Gear,
    Health,
    Initiative,
    LairActions,
    Languages,
    LegendaryActions,
    MythicActions,
    Name,
    ProficiencyBonus,
    RacialDetails,
    Reactions,
    SavingThrows,
    Senses,
    Skills,
    Souls,
    Source,
    Speed,
    Traits,
    UtilitySpells,
    VillainActions,
    OtherInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Top,
    Block,
}

impl SectionId {
    pub fn kind(self) -> SectionKind {
        match self {
            SectionId::Abilities
            | SectionId::Armor
            | SectionId::Challenge
            | SectionId::ConditionImmunities
            | SectionId::DamageImmunities
            | SectionId::Immunities
            | SectionId::DamageResistances
            | SectionId::DamageVulnerabilities
            | SectionId::Gear
            | SectionId::Health
            | SectionId::Initiative
            | SectionId::Languages
            | SectionId::ProficiencyBonus
            | SectionId::RacialDetails
            | SectionId::SavingThrows
            | SectionId::Senses
            | SectionId::Skills
            | SectionId::Souls
            | SectionId::Source
            | SectionId::Speed => SectionKind::Top,
            _ => SectionKind::Block,
        }
    }

    pub fn is_top(self) -> bool {
        self.kind() == SectionKind::Top
    }

    pub fn label(self) -> &'static str {
        match self {
            SectionId::Abilities => "Abilities",
            SectionId::Actions => "Actions",
            SectionId::Armor => "Armor",
            SectionId::BonusActions => "Bonus Actions",
            SectionId::Challenge => "Challenge",
            SectionId::ConditionImmunities => "Condition Immunities",
            SectionId::DamageImmunities => "Damage Immunities",
            SectionId::Immunities => "Immunities",
            SectionId::DamageResistances => "Damage Resistances",
            SectionId::DamageVulnerabilities => "Damage Vulnerabilities",
            SectionId::Features => "Features",
            SectionId::Gear => "Gear",
            SectionId::Health => "Health",
            SectionId::Initiative => "Initiative",
            SectionId::LairActions => "Lair Actions",
            SectionId::Languages => "Languages",
            SectionId::LegendaryActions => "Legendary Actions",
            SectionId::MythicActions => "Mythic Actions",
            SectionId::Name => "Name",
            SectionId::ProficiencyBonus => "Proficiency Bonus",
            SectionId::RacialDetails => "Racial Details",
            SectionId::Reactions => "Reactions",
            SectionId::SavingThrows => "Saving Throws",
            SectionId::Senses => "Senses",
            SectionId::Skills => "Skills",
            SectionId::Souls => "Souls",
            SectionId::Source => "Source",
            SectionId::Speed => "Speed",
            SectionId::Traits => "Traits",
            SectionId::UtilitySpells => "Utility Spells",
            SectionId::VillainActions => "Villain Actions",
            SectionId::OtherInfo => "Other Info",
        }
    }
}

/// One normalized input line. `number` is the line's position in the
/// pre-filtering input, so diagnostics can point back at the original text
/// even after blank and decoration lines are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLine {
    pub number: usize,
    pub text: String,
}

impl RawLine {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        RawLine {
            number,
            text: text.into(),
        }
    }
}

/// Caller-supplied override forcing lines with a given exact trimmed text
/// into a given section, bypassing pattern matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hint {
    pub text: String,
    pub section: SectionId,
}

/// A contiguous run of lines classified under one section id. Line order is
/// meaningful: extractors assume the first line carries the heading or
/// inline value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub lines: Vec<RawLine>,
}

impl Section {
    pub fn new(id: SectionId) -> Self {
        Section {
            id,
            lines: Vec::new(),
        }
    }

    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<&str>>()
            .join("\n")
    }
}

/// A character range consumed by an extractor, recorded for caller-side
/// highlighting. Offsets are byte offsets into the line named by `line`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub line: usize,
    pub label: String,
    pub start: usize,
    pub end: usize,
}

/// Everything a parse produces: the normalized record plus the raw
/// segmentation, kept for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    pub record: CreatureRecord,
    pub sections: Vec<Section>,
    pub unknown_lines: Vec<RawLine>,
    pub lines: Vec<RawLine>,
    pub annotations: Vec<MatchSpan>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    Fine,
    Diminutive,
    Tiny,
    Small,
    Medium,
    Large,
    Huge,
    Gargantuan,
    Colossal,
}

impl Size {
    /// Accepts the canonical size words plus abbreviations that show up in
    /// exported data ("sm", "med", "lg", "grg", "gigantic").
    pub fn from_token(token: &str) -> Option<Size> {
        match token.trim().to_lowercase().as_str() {
            "fine" => Some(Size::Fine),
            "diminutive" => Some(Size::Diminutive),
            "tiny" => Some(Size::Tiny),
            "small" | "sm" => Some(Size::Small),
            "medium" | "med" => Some(Size::Medium),
            "large" | "lg" => Some(Size::Large),
            "huge" => Some(Size::Huge),
            "gargantuan" | "grg" | "gigantic" => Some(Size::Gargantuan),
            "colossal" => Some(Size::Colossal),
            _ => None,
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            Size::Fine => "Fine",
            Size::Diminutive => "Diminutive",
            Size::Tiny => "Tiny",
            Size::Small => "Small",
            Size::Medium => "Medium",
            Size::Large => "Large",
            Size::Huge => "Huge",
            Size::Gargantuan => "Gargantuan",
            Size::Colossal => "Colossal",
        }
    }
}

pub const KNOWN_CREATURE_TYPES: [&str; 14] = [
    "aberration",
    "beast",
    "celestial",
    "construct",
    "dragon",
    "elemental",
    "fey",
    "fiend",
    "giant",
    "humanoid",
    "monstrosity",
    "ooze",
    "plant",
    "undead",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Armor {
    pub ac: i32,
    /// Only implicit armor kinds ("natural armor", spell-granted mage armor)
    /// stay here; worn equipment moves to `CreatureRecord::gear`.
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initiative {
    pub modifier: i32,
    pub score: Option<i32>,
}

/// A rolled value: the stated total plus the dice formula that produced it,
/// e.g. hit points "171 (18d10+72)".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roll {
    pub value: i32,
    pub formula: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedEntry {
    pub mode: String,
    pub distance: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speeds {
    pub entries: Vec<SpeedEntry>,
    pub hover: bool,
}

impl Speeds {
    pub fn get(&self, mode: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|entry| entry.mode == mode)
            .map(|entry| entry.distance)
    }
}

pub const ABILITY_NAMES: [&str; 6] = ["str", "dex", "con", "int", "wis", "cha"];

/// The six ability scores. Conventionally 1-30 but deliberately unbounded;
/// the parser records whatever the text states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub str: Option<i32>,
    pub dex: Option<i32>,
    pub con: Option<i32>,
    pub int: Option<i32>,
    pub wis: Option<i32>,
    pub cha: Option<i32>,
}

impl AbilityScores {
    pub fn get(&self, short: &str) -> Option<i32> {
        match short {
            "str" => self.str,
            "dex" => self.dex,
            "con" => self.con,
            "int" => self.int,
            "wis" => self.wis,
            "cha" => self.cha,
            _ => None,
        }
    }

    pub fn set(&mut self, short: &str, value: i32) {
        match short {
            "str" => self.str = Some(value),
            "dex" => self.dex = Some(value),
            "con" => self.con = Some(value),
            "int" => self.int = Some(value),
            "wis" => self.wis = Some(value),
            "cha" => self.cha = Some(value),
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub modifier: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sense {
    pub name: String,
    pub value: i32,
}

/// Qualifier on a damage resistance or immunity marking attack kinds that
/// bypass it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bypass {
    Nonmagical,
    Adamantine,
    Silvered,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageList {
    pub types: Vec<String>,
    pub bypasses: Vec<Bypass>,
    pub special: Option<String>,
}

impl DamageList {
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.bypasses.is_empty() && self.special.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionList {
    pub types: Vec<String>,
    pub special: Option<String>,
}

impl ConditionList {
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.special.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageList {
    pub known: Vec<String>,
    pub unknown: Vec<String>,
    pub telepathy: Option<u32>,
}

impl LanguageList {
    pub fn is_empty(&self) -> bool {
        self.known.is_empty() && self.unknown.is_empty() && self.telepathy.is_none()
    }
}

/// Challenge rating resolved to a finite decimal plus a canonical display
/// string (fractional ratings render as "1/8", "1/4", "1/2").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub cr: f64,
    pub display: String,
    pub xp: u32,
    pub proficiency_bonus: Option<u32>,
    /// Short role label between the rating and its parenthetical, used by
    /// some third-party books (e.g. "Ambusher").
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBook {
    pub book: String,
    pub page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GearItem {
    pub name: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Weapon,
    Spell,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attack {
    pub to_hit: Option<i32>,
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveEffect {
    pub dc: i32,
    pub ability: String,
    pub condition: Option<String>,
    pub half_on_save: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRoll {
    pub roll: String,
    pub modifier: Option<String>,
    pub damage_type: Option<String>,
    pub plus_roll: Option<String>,
    pub plus_modifier: Option<String>,
    pub plus_type: Option<String>,
    pub versatile_roll: Option<String>,
    pub versatile_modifier: Option<String>,
    pub versatile_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRange {
    pub near: u32,
    pub far: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub range: Option<u32>,
    pub shape: Option<String>,
    pub creature: bool,
    pub amount: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellAction {
    pub level: Option<u32>,
    pub concentration: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellRef {
    pub name: String,
    pub level: Option<u32>,
}

/// Typed values extracted from one entry's text. Every field defaults to
/// absent; extraction misses never fail the parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryFields {
    pub attack: Option<Attack>,
    pub save: Option<SaveEffect>,
    pub damage: Option<DamageRoll>,
    pub per_day: Option<u32>,
    pub recharge: Option<u32>,
    pub reach: Option<u32>,
    pub range: Option<AttackRange>,
    pub target: Option<Target>,
    pub action_cost: Option<u32>,
    pub legendary_action_count: Option<u32>,
    pub lair_initiative_count: Option<u32>,
    pub legendary_resistance_count: Option<u32>,
    pub spell: Option<SpellAction>,
    pub cast_spells: Vec<SpellRef>,
    pub kind: Option<ActionKind>,
}

/// Name given to body text that precedes any titled entry in a block.
pub const DESCRIPTION_ENTRY: &str = "Description";

/// One named sub-item within a block section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub lines: Vec<RawLine>,
    pub fields: EntryFields,
}

impl Entry {
    pub fn new(name: impl Into<String>) -> Self {
        Entry {
            name: name.into(),
            lines: Vec::new(),
            fields: EntryFields::default(),
        }
    }

    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<&str>>()
            .join("\n")
    }

    /// The entry body with the leading "Name." clause removed, flattened to
    /// one line.
    pub fn description(&self) -> String {
        let combined = self.text().replace('\n', " ");
        if self.name == DESCRIPTION_ENTRY {
            return combined.trim().to_string();
        }

        match combined.find(['.', ':', '!']) {
            Some(index) => combined[index + 1..].trim().to_string(),
            None => combined.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpellUseKind {
    Slots,
    Innate,
    Cantrip,
    AtWill,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellEntry {
    pub name: String,
    pub use_kind: Option<SpellUseKind>,
    pub count: Option<u32>,
    pub level: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellGroup {
    pub label: String,
    pub spells: Vec<SpellEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spellcasting {
    pub feature_name: String,
    pub description: Option<String>,
    pub ability: Option<String>,
    pub save_dc: Option<i32>,
    pub caster_level: Option<u32>,
    pub groups: Vec<SpellGroup>,
}

/// The normalized creature record produced by a parse. List-valued fields
/// default to empty rather than absent so consumers can iterate without
/// null checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatureRecord {
    pub name: String,
    pub size: Option<Size>,
    pub swarm_size: Option<Size>,
    pub creature_type: Option<String>,
    pub custom_type: Option<String>,
    pub race: Option<String>,
    pub alignment: Option<String>,

    pub armor: Option<Armor>,
    pub initiative: Option<Initiative>,
    pub health: Option<Roll>,
    pub souls: Option<Roll>,
    pub speeds: Speeds,
    pub abilities: AbilityScores,

    pub saving_throws: Vec<String>,
    pub skills: Vec<Skill>,
    pub senses: Vec<Sense>,
    pub special_senses: Option<String>,

    pub damage_immunities: DamageList,
    pub damage_resistances: DamageList,
    pub damage_vulnerabilities: DamageList,
    pub condition_immunities: ConditionList,

    pub languages: LanguageList,
    pub challenge: Option<Challenge>,
    pub source: Option<SourceBook>,
    pub gear: Vec<GearItem>,

    pub features: Vec<Entry>,
    pub actions: Vec<Entry>,
    pub bonus_actions: Vec<Entry>,
    pub reactions: Vec<Entry>,
    pub legendary_actions: Vec<Entry>,
    pub mythic_actions: Vec<Entry>,
    pub lair_actions: Vec<Entry>,
    pub villain_actions: Vec<Entry>,
    pub regional_effects: Vec<Entry>,

    pub spellcasting: Option<Spellcasting>,
    pub innate_spellcasting: Option<Spellcasting>,
    pub utility_spells: Option<Spellcasting>,

    pub other_info: Vec<String>,
}

impl CreatureRecord {
    pub fn new(name: impl Into<String>) -> Self {
        CreatureRecord {
            name: name.into(),
            ..CreatureRecord::default()
        }
    }
}
