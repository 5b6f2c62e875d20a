use serde::{Serialize, Serializer};

use crate::parse::ordinal;

/// Label rendered when neither OCR nor the slot index gave a position.
pub const UNKNOWN_POSITION: &str = "[Unknown Position]";

/// Where an entry's displayed position came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSource {
    /// Read from the position band
    Ocr,
    /// Inferred from the row the entry was cut from
    Slot,
    Unknown,
}

/// Parsed result for one standings row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RaceEntry {
    pub slot: u32,
    #[serde(serialize_with = "serialize_position")]
    pub position: Option<u32>,
    pub position_source: PositionSource,
    pub character_name: String,
    pub player_name: String,
}

impl RaceEntry {
    /// Placeholder for a slot that produced no entry.
    pub fn empty(slot: u32) -> Self {
        let (position, position_source) = if slot >= 1 {
            (Some(slot), PositionSource::Slot)
        } else {
            (None, PositionSource::Unknown)
        };
        Self {
            slot,
            position,
            position_source,
            character_name: String::new(),
            player_name: String::new(),
        }
    }

    /// True when OCR recovered at least one of the two names.
    pub fn has_names(&self) -> bool {
        !self.character_name.is_empty() || !self.player_name.is_empty()
    }

    /// Ordinal for display, e.g. "3rd".
    pub fn position_label(&self) -> String {
        match self.position {
            Some(n) => ordinal(n),
            None => UNKNOWN_POSITION.to_string(),
        }
    }
}

fn serialize_position<S: Serializer>(
    position: &Option<u32>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match position {
        Some(n) => serializer.serialize_str(&ordinal(*n)),
        None => serializer.serialize_none(),
    }
}
