//! Input cleanup: markdown decoration stripping, whitespace collapse, and
//! rejoining of section headers that got separated from their values.

use crate::model::RawLine;
use crate::parser::patterns::Patterns;
use crate::util;

/// Whether the source text uses one line per statement or reflowed prose.
/// Clean lines allow entry titles at every line start; prose requires the
/// previous line to have ended a sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    CleanLines,
    Prose,
}

impl ParseMode {
    /// Clean when no line starts with a lowercase character. Digits and
    /// punctuation count as clean starts.
    pub fn detect(lines: &[RawLine]) -> ParseMode {
        let clean = lines.iter().all(|line| {
            line.text
                .chars()
                .next()
                .map(|c| !c.is_lowercase())
                .unwrap_or(true)
        });
        if clean { ParseMode::CleanLines } else { ParseMode::Prose }
    }
}

/// Cleans raw statblock text into numbered lines. Line numbers are 1-based
/// positions in the unfiltered input so diagnostics can point back at the
/// original text.
pub fn normalize(text: &str, patterns: &Patterns) -> Vec<RawLine> {
    let mut lines: Vec<RawLine> = text
        .lines()
        .enumerate()
        .map(|(index, raw)| {
            let cleaned = util::normalize_minus(raw)
                .replace("::", "")
                .replace('\u{2022}', " ");
            RawLine::new(index + 1, util::collapse_whitespace(&cleaned))
        })
        .filter(|line| {
            !line.text.is_empty()
                && line.text != ":"
                && !line.text.starts_with("{{")
                && !line.text.starts_with("}}")
        })
        .collect();

    rejoin_headers(&mut lines, patterns);
    lines
}

/// Stitches a header-only line back together with the value line below it,
/// as in:
///
/// ```text
/// Hit Points
/// 328 (16d20 + 160)
/// ```
///
/// A header followed by another header line is left alone.
fn rejoin_headers(lines: &mut Vec<RawLine>, patterns: &Patterns) {
    let mut merged = Vec::with_capacity(lines.len());
    let mut index = 0;

    while index < lines.len() {
        let is_bare_header = patterns.header_only_line.is_match(&lines[index].text);
        let next_is_header = lines
            .get(index + 1)
            .map(|next| patterns.header_prefix.is_match(&next.text))
            .unwrap_or(true);

        if is_bare_header && !next_is_header {
            let joined = format!("{} {}", lines[index].text, lines[index + 1].text);
            merged.push(RawLine::new(lines[index].number, joined));
            index += 2;
        } else {
            merged.push(lines[index].clone());
            index += 1;
        }
    }

    *lines = merged;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[RawLine]) -> Vec<&str> {
        lines.iter().map(|line| line.text.as_str()).collect()
    }

    #[test]
    fn drops_decoration_and_blank_lines() {
        let patterns = Patterns::new().expect("patterns compile");
        let input = "{{monster,frame\nAboleth\n::\n:\n\nLarge aberration, lawful evil\n}}";
        let lines = normalize(input, &patterns);
        assert_eq!(texts(&lines), vec!["Aboleth", "Large aberration, lawful evil"]);
        assert_eq!(lines[0].number, 2);
        assert_eq!(lines[1].number, 6);
    }

    #[test]
    fn collapses_whitespace_runs() {
        let patterns = Patterns::new().expect("patterns compile");
        let lines = normalize("Armor   Class\t17  (natural armor)", &patterns);
        assert_eq!(texts(&lines), vec!["Armor Class 17 (natural armor)"]);
    }

    #[test]
    fn rejoins_header_with_value_line() {
        let patterns = Patterns::new().expect("patterns compile");
        let input = "Hit Points\n328 (16d20 + 160)\nSpeed 40 ft.";
        let lines = normalize(input, &patterns);
        assert_eq!(
            texts(&lines),
            vec!["Hit Points 328 (16d20 + 160)", "Speed 40 ft."]
        );
        assert_eq!(lines[0].number, 1);
    }

    #[test]
    fn leaves_adjacent_headers_alone() {
        let patterns = Patterns::new().expect("patterns compile");
        let input = "Senses\nLanguages Deep Speech";
        let lines = normalize(input, &patterns);
        assert_eq!(texts(&lines), vec!["Senses", "Languages Deep Speech"]);
    }

    #[test]
    fn normalization_is_idempotent() {
        let patterns = Patterns::new().expect("patterns compile");
        let input = "Aboleth\n\nHit Points\n135 (18d10 + 36)\n  Speed 10 ft.,  swim 40 ft.";
        let once = normalize(input, &patterns);
        let rejoined = once
            .iter()
            .map(|line| line.text.clone())
            .collect::<Vec<String>>()
            .join("\n");
        let twice = normalize(&rejoined, &patterns);
        assert_eq!(texts(&once), texts(&twice));
    }

    #[test]
    fn detects_prose_mode_from_lowercase_starts() {
        let clean = vec![
            RawLine::new(1, "Aboleth"),
            RawLine::new(2, "Large aberration, lawful evil"),
            RawLine::new(3, "123 some numbers"),
        ];
        assert_eq!(ParseMode::detect(&clean), ParseMode::CleanLines);

        let prose = vec![
            RawLine::new(1, "Aboleth"),
            RawLine::new(2, "the aboleth makes a tail attack."),
        ];
        assert_eq!(ParseMode::detect(&prose), ParseMode::Prose);
    }
}
