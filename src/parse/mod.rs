//! Turns raw OCR text for one crop into a [`RaceEntry`].
//!
//! Parsing never fails: unreadable positions fall back to the slot index and
//! unreadable names become empty strings.

pub mod names;
pub mod ordinal;

use std::sync::LazyLock;

use regex::Regex;

use crate::ocr::{ExtractMode, RawTextRegions};
use crate::results::{PositionSource, RaceEntry};

pub use names::{clean_name, split_names};
pub use ordinal::ordinal;

static POSITION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,3})(st|nd|rd|th)?$").expect("position pattern is valid")
});

/// Finds the first integer or ordinal token ("8", "8th") in `text`.
pub fn find_position(text: &str) -> Option<u32> {
    text.split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter_map(|token| POSITION_TOKEN.captures(token))
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .find(|&n| n >= 1)
}

/// Builds the entry for `slot` from its raw OCR text. `mode` says how the
/// name text was read.
pub fn parse_entry(slot: u32, regions: &RawTextRegions, mode: ExtractMode) -> RaceEntry {
    let (position, position_source) = match find_position(&regions.position_text) {
        Some(n) => (Some(n), PositionSource::Ocr),
        None if slot >= 1 => (Some(slot), PositionSource::Slot),
        None => (None, PositionSource::Unknown),
    };

    let (character_name, player_name) =
        split_names(&regions.character_text, &regions.player_text, mode);

    RaceEntry {
        slot,
        position,
        position_source,
        character_name,
        player_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_position_ordinals() {
        assert_eq!(find_position("1st"), Some(1));
        assert_eq!(find_position("2ND"), Some(2));
        assert_eq!(find_position("  8th\n"), Some(8));
        assert_eq!(find_position("12th."), Some(12));
    }

    #[test]
    fn test_find_position_plain_integer() {
        assert_eq!(find_position("3"), Some(3));
        assert_eq!(find_position("~ 5 ~"), Some(5));
    }

    #[test]
    fn test_find_position_rejects_noise() {
        assert_eq!(find_position(""), None);
        assert_eq!(find_position("~~"), None);
        assert_eq!(find_position("zz"), None);
        assert_eq!(find_position("0th"), None);
        assert_eq!(find_position("1sth"), None);
        assert_eq!(find_position("12345"), None);
    }

    #[test]
    fn test_parse_entry_uses_ocr_position() {
        let regions = RawTextRegions::new("3rd", "Rice Shower", "Blue Rose");
        let entry = parse_entry(5, &regions, ExtractMode::Banded);

        assert_eq!(entry.slot, 5);
        assert_eq!(entry.position, Some(3));
        assert_eq!(entry.position_source, PositionSource::Ocr);
        assert_eq!(entry.character_name, "Rice Shower");
        assert_eq!(entry.player_name, "Blue Rose");
    }

    #[test]
    fn test_parse_entry_falls_back_to_slot() {
        let regions = RawTextRegions::new("#$%", "Gold Ship", "Pakupaku");
        let entry = parse_entry(4, &regions, ExtractMode::Banded);

        assert_eq!(entry.position, Some(4));
        assert_eq!(entry.position_source, PositionSource::Slot);
    }

    #[test]
    fn test_parse_entry_empty_text_still_emitted() {
        let entry = parse_entry(6, &RawTextRegions::default(), ExtractMode::Banded);

        assert_eq!(entry.position, Some(6));
        assert_eq!(entry.position_source, PositionSource::Slot);
        assert_eq!(entry.character_name, "");
        assert_eq!(entry.player_name, "");
        assert!(!entry.has_names());
    }

    #[test]
    fn test_parse_entry_invalid_slot_is_unknown() {
        let entry = parse_entry(0, &RawTextRegions::default(), ExtractMode::Banded);
        assert_eq!(entry.position, None);
        assert_eq!(entry.position_source, PositionSource::Unknown);
    }

    #[test]
    fn test_parse_entry_splits_combined_block() {
        let regions = RawTextRegions::new("1st", "Maruzensky - Kysix", "");
        let entry = parse_entry(1, &regions, ExtractMode::Whole);

        assert_eq!(entry.character_name, "Maruzensky");
        assert_eq!(entry.player_name, "Kysix");
    }

    #[test]
    fn test_parse_entry_mode_decides_single_line_owner() {
        let regions = RawTextRegions::new("2nd", "Kysix", "");

        let banded = parse_entry(2, &regions, ExtractMode::Banded);
        assert_eq!((banded.character_name.as_str(), banded.player_name.as_str()), ("Kysix", ""));

        let whole = parse_entry(2, &regions, ExtractMode::Whole);
        assert_eq!((whole.character_name.as_str(), whole.player_name.as_str()), ("", "Kysix"));
    }
}
