use serde::Serialize;
use tracing::warn;

use super::entry::RaceEntry;
use crate::segment::SLOT_COUNT;

/// All entries of one screenshot, always exactly one per slot, slot 1 first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RaceResult {
    pub screenshot: String,
    pub entries: Vec<RaceEntry>,
}

impl RaceResult {
    /// Entries where OCR recovered a character or player name.
    pub fn recognized_count(&self) -> usize {
        self.entries.iter().filter(|e| e.has_names()).count()
    }
}

/// Assembles parsed entries into a [`RaceResult`].
///
/// Entries are placed by slot, never by their parsed position. Missing slots
/// get an empty placeholder; out-of-range and duplicate slots are dropped.
pub fn aggregate(
    screenshot_name: &str,
    entries: impl IntoIterator<Item = RaceEntry>,
) -> RaceResult {
    let mut slots: Vec<Option<RaceEntry>> = vec![None; SLOT_COUNT];

    for entry in entries {
        let index = match entry.slot.checked_sub(1).map(|i| i as usize) {
            Some(i) if i < SLOT_COUNT => i,
            _ => {
                warn!("{}: ignoring entry for slot {}", screenshot_name, entry.slot);
                continue;
            }
        };
        if slots[index].is_some() {
            warn!("{}: duplicate entry for slot {}", screenshot_name, entry.slot);
            continue;
        }
        slots[index] = Some(entry);
    }

    let entries = slots
        .into_iter()
        .enumerate()
        .map(|(i, entry)| entry.unwrap_or_else(|| RaceEntry::empty(i as u32 + 1)))
        .collect();

    RaceResult {
        screenshot: screenshot_name.to_string(),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::PositionSource;

    fn named(slot: u32, position: u32, character: &str, player: &str) -> RaceEntry {
        RaceEntry {
            slot,
            position: Some(position),
            position_source: PositionSource::Ocr,
            character_name: character.to_string(),
            player_name: player.to_string(),
        }
    }

    #[test]
    fn test_aggregate_fills_missing_slots() {
        let result = aggregate("race1", vec![named(2, 2, "Vodka", "P2")]);

        assert_eq!(result.screenshot, "race1");
        assert_eq!(result.entries.len(), 7);
        assert_eq!(result.entries[1].character_name, "Vodka");
        for (i, entry) in result.entries.iter().enumerate() {
            assert_eq!(entry.slot, i as u32 + 1);
        }
        assert_eq!(result.recognized_count(), 1);
    }

    #[test]
    fn test_aggregate_keeps_slot_order_not_position_order() {
        // Completion order and parsed positions are both scrambled
        let entries = vec![
            named(3, 1, "Third Row", "C"),
            named(1, 3, "First Row", "A"),
            named(2, 2, "Second Row", "B"),
        ];
        let result = aggregate("race2", entries);

        assert_eq!(result.entries[0].character_name, "First Row");
        assert_eq!(result.entries[0].position, Some(3));
        assert_eq!(result.entries[2].character_name, "Third Row");
        assert_eq!(result.entries[2].position, Some(1));
    }

    #[test]
    fn test_aggregate_ignores_out_of_range_and_duplicates() {
        let entries = vec![
            named(0, 1, "Zero", "Z"),
            named(8, 8, "Eighth", "E"),
            named(1, 1, "Keep", "K"),
            named(1, 1, "Duplicate", "D"),
        ];
        let result = aggregate("race3", entries);

        assert_eq!(result.entries.len(), 7);
        assert_eq!(result.entries[0].character_name, "Keep");
        assert_eq!(result.recognized_count(), 1);
    }

    #[test]
    fn test_aggregate_empty_input() {
        let result = aggregate("blank", Vec::new());
        assert_eq!(result.entries.len(), 7);
        assert_eq!(result.recognized_count(), 0);
        assert_eq!(result.entries[6].position_label(), "7th");
    }
}
