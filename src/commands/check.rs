use anyhow::{bail, Result};
use tracing::{info, warn};

use statblock::model::{CreatureRecord, Entry, ParseResult, DESCRIPTION_ENTRY};
use statblock::parser::patterns::Patterns;
use statblock::{parser, render};

use crate::cli::CheckArgs;
use crate::commands::{load_hints, read_input};

pub fn run(args: CheckArgs) -> Result<()> {
    let text = read_input(args.input.as_deref())?;
    let hints = load_hints(args.hints.as_deref())?;
    let patterns = Patterns::new()?;

    let Some(first) = parser::parse_with(&patterns, &text, &hints) else {
        bail!("input contains no statblock text");
    };

    for line in &first.unknown_lines {
        warn!(line = line.number, text = %line.text, "unclassified line");
    }

    let rendered = render::to_canonical_text(&first.record);
    let Some(second) = parser::parse_with(&patterns, &rendered, &[]) else {
        bail!("rendered text did not parse back into a statblock");
    };

    let drift = compare(&first, &second);
    for message in &drift {
        warn!(%message, "round trip drift");
    }

    if !drift.is_empty() {
        bail!("round trip produced {} difference(s)", drift.len());
    }

    info!(
        name = %first.record.name,
        unknown = first.unknown_lines.len(),
        "round trip stable"
    );
    Ok(())
}

fn compare(first: &ParseResult, second: &ParseResult) -> Vec<String> {
    let a = &first.record;
    let b = &second.record;
    let mut drift = Vec::new();

    let mut field = |name: &str, left: String, right: String| {
        if left != right {
            drift.push(format!("{name}: {left:?} became {right:?}"));
        }
    };

    field("name", a.name.clone(), b.name.clone());
    field("size", format!("{:?}", a.size), format!("{:?}", b.size));
    field(
        "creature type",
        format!("{:?}", a.creature_type),
        format!("{:?}", b.creature_type),
    );
    field(
        "alignment",
        format!("{:?}", a.alignment),
        format!("{:?}", b.alignment),
    );
    field(
        "abilities",
        format!("{:?}", a.abilities),
        format!("{:?}", b.abilities),
    );
    field(
        "armor class",
        format!("{:?}", a.armor.as_ref().map(|armor| armor.ac)),
        format!("{:?}", b.armor.as_ref().map(|armor| armor.ac)),
    );
    field(
        "hit points",
        format!("{:?}", a.health.as_ref().map(|roll| roll.value)),
        format!("{:?}", b.health.as_ref().map(|roll| roll.value)),
    );
    field(
        "challenge",
        format!(
            "{:?}",
            a.challenge.as_ref().map(|c| (c.cr, c.xp))
        ),
        format!(
            "{:?}",
            b.challenge.as_ref().map(|c| (c.cr, c.xp))
        ),
    );
    field(
        "speeds",
        format!("{:?}", a.speeds),
        format!("{:?}", b.speeds),
    );

    entry_count(&mut drift, "features", a, b, |r| &r.features);
    entry_count(&mut drift, "actions", a, b, |r| &r.actions);
    entry_count(&mut drift, "bonus actions", a, b, |r| &r.bonus_actions);
    entry_count(&mut drift, "reactions", a, b, |r| &r.reactions);
    entry_count(&mut drift, "legendary actions", a, b, |r| &r.legendary_actions);
    entry_count(&mut drift, "villain actions", a, b, |r| &r.villain_actions);

    drift
}

// The renderer supplies a stock preamble for legendary and lair actions when
// the source had none, so only named entries are compared.
fn entry_count<'a>(
    drift: &mut Vec<String>,
    name: &str,
    a: &'a CreatureRecord,
    b: &'a CreatureRecord,
    entries: impl Fn(&'a CreatureRecord) -> &'a Vec<Entry>,
) {
    let named = |record| {
        entries(record)
            .iter()
            .filter(|entry| entry.name != DESCRIPTION_ENTRY)
            .count()
    };
    let left = named(a);
    let right = named(b);
    if left != right {
        drift.push(format!("{name}: {left} named entries became {right}"));
    }
}
