//! Small string and number helpers shared across the parser and renderer.

/// Replaces unicode minus variants with ASCII `-` so numeric captures parse
/// with `str::parse`.
pub fn normalize_minus(text: &str) -> String {
    text.replace(['\u{2212}', '\u{2013}', '\u{2014}'], "-")
}

/// Parses an integer that may carry an explicit sign and a unicode minus.
pub fn parse_signed(text: &str) -> Option<i32> {
    normalize_minus(text.trim())
        .trim_start_matches('+')
        .parse()
        .ok()
}

/// Parses a challenge rating token: a plain integer, a decimal, the `½`
/// glyph, or a fraction like `1/8`.
pub fn parse_rating(text: &str) -> Option<f64> {
    let token = text.trim();
    if token == "\u{00bd}" {
        return Some(0.5);
    }
    if let Some((numer, denom)) = token.split_once('/') {
        let numer: f64 = numer.trim().parse().ok()?;
        let denom: f64 = denom.trim().parse().ok()?;
        if denom == 0.0 {
            return None;
        }
        return Some(numer / denom);
    }
    token.parse().ok()
}

/// Formats a modifier with its sign, e.g. `+4` / `-1`.
pub fn signed(value: i32) -> String {
    if value >= 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

/// Uppercases the first character, leaving the rest untouched.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Title-cases each whitespace-separated word.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| capitalize(&word.to_lowercase()))
        .collect::<Vec<String>>()
        .join(" ")
}

/// Collapses interior whitespace runs to single spaces and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Strips a comma-separated number like "11,500" down to its digits.
pub fn parse_grouped_number(text: &str) -> Option<u32> {
    text.replace(',', "").trim().parse().ok()
}

/// Formats a number with thousands separators, e.g. `5900` -> `"5,900"`.
pub fn group_digits(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, c) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
