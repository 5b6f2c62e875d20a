//! Character/player name cleanup and splitting.

use std::sync::LazyLock;

use regex::Regex;

use crate::ocr::ExtractMode;

/// Standalone tokens Tesseract produces from the badge icons and borders.
const NOISE_TOKENS: &[&str] = &["@", "(i)", "|", "_", "-", "(", ")", "[", "]", "|,", "B", "="];

/// Title/achievement badge words rendered next to the names.
const TITLE_WORDS: &[&str] = &[
    "finals", "champion", "witness", "legend", "record", "holder", "dream", "team", "ideal",
    "idol", "to",
];

/// Separators that join character and player in a single text block.
const NAME_SEPARATORS: &[&str] = &[" - ", " – ", " — "];

static TRAILING_INFO_MARK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(i\)$").expect("info mark pattern is valid"));

static TRAILING_PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*\)\s*$").expect("parenthetical pattern is valid"));

static TRAILING_AT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*@\s*$").expect("trailing @ pattern is valid"));

fn is_noise(token: &str) -> bool {
    if NOISE_TOKENS.contains(&token) || token.chars().count() == 1 {
        return true;
    }
    // Short numbers are rank or badge digits, never names
    token.len() <= 2 && token.chars().all(|c| c.is_ascii_digit())
}

fn clean_token(token: &str) -> Option<String> {
    if is_noise(token) {
        return None;
    }
    let token = TRAILING_INFO_MARK.replace(token, "");
    let token = token.trim();
    if token.is_empty() || TITLE_WORDS.contains(&token.to_lowercase().as_str()) {
        return None;
    }
    Some(token.to_string())
}

/// Drops OCR noise from one line of name text and strips trailing
/// parenthetical groups and `@` marks.
pub fn clean_name(text: &str) -> String {
    let joined = text
        .split_whitespace()
        .filter_map(clean_token)
        .collect::<Vec<_>>()
        .join(" ");

    let name = TRAILING_PARENTHETICAL.replace(&joined, "");
    let name = TRAILING_AT.replace(&name, "");
    name.trim().to_string()
}

/// Cleans every line of a block and drops the ones left empty.
fn clean_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(clean_name)
        .filter(|line| !line.is_empty())
        .collect()
}

fn split_on_separator(text: &str) -> Option<(&str, &str)> {
    NAME_SEPARATORS
        .iter()
        .filter_map(|sep| text.find(sep).map(|idx| (idx, sep.len())))
        .min_by_key(|(idx, _)| *idx)
        .map(|(idx, len)| (&text[..idx], &text[idx + len..]))
}

/// Resolves the character and player names.
///
/// In [`ExtractMode::Banded`] the two bands are already separate and each is
/// only cleaned; a wrapped band is joined into one name. In
/// [`ExtractMode::Whole`] the character text holds the whole name area: it is
/// split on a dash separator, otherwise the last line is the player and the
/// lines above it the character. A lone line is the player name.
pub fn split_names(character_text: &str, player_text: &str, mode: ExtractMode) -> (String, String) {
    match mode {
        ExtractMode::Banded => (
            clean_lines(character_text).join(" "),
            clean_lines(player_text).join(" "),
        ),
        ExtractMode::Whole => split_block(character_text),
    }
}

fn split_block(text: &str) -> (String, String) {
    if let Some((character, player)) = split_on_separator(text) {
        return (clean_lines(character).join(" "), clean_lines(player).join(" "));
    }

    let mut lines = clean_lines(text);
    let player = lines.pop().unwrap_or_default();
    (lines.join(" "), player)
}
