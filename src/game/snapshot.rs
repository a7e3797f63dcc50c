//! Persisted Snapshots
//!
//! The only game data that survives outside process memory. JSON is the
//! wire format; bincode is available for compact local storage.
//! Transient flip progress is never captured.

use serde::{Serialize, Deserialize};

use crate::game::config::{ConfigError, GameConfig};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Per-slot persisted flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    /// Slot id
    pub id: String,
    /// Face-up
    pub is_flipped: bool,
    /// Matched
    pub is_matched: bool,
}

/// A serialized game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version
    pub version: u32,
    /// Board configuration; the seed regenerates the deck
    pub config: GameConfig,
    /// Moves so far
    pub moves: u32,
    /// Game start (epoch millis)
    #[serde(rename = "startTs")]
    pub start_ts: u64,
    /// Slot flags in deck order
    pub cards: Vec<CardRecord>,
}

/// Snapshot errors.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// JSON encode/decode failed.
    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary encode/decode failed.
    #[error("Invalid snapshot bytes: {0}")]
    Binary(#[from] bincode::Error),

    /// Snapshot was written by an unknown format version.
    #[error("Unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    /// The persisted config can't produce a board.
    #[error("Invalid snapshot config: {0}")]
    Config(#[from] ConfigError),
}

impl Snapshot {
    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON, rejecting unknown versions.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    /// Encode to bytes using bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from bincode bytes, rejecting unknown versions.
    pub fn from_bytes(data: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = bincode::deserialize(data)?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    /// Number of matched slots recorded.
    pub fn matched_count(&self) -> usize {
        self.cards.iter().filter(|c| c.is_matched).count()
    }

    pub(crate) fn check_version(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            config: GameConfig::new(2, 2, "restore"),
            moves: 5,
            start_ts: 12345,
            cards: vec![
                CardRecord { id: "ak47-0".into(), is_flipped: true, is_matched: true },
                CardRecord { id: "awp-1".into(), is_flipped: false, is_matched: false },
            ],
        }
    }

    #[test]
    fn test_json_field_names() {
        let json: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(json["version"], 1);
        assert_eq!(json["startTs"], 12345);
        assert_eq!(json["config"]["seed"], "restore");
        assert_eq!(json["cards"][0]["isFlipped"], true);
        assert_eq!(json["cards"][0]["isMatched"], true);
    }

    #[test]
    fn test_parses_external_json() {
        let json = r#"{
            "version": 1,
            "config": { "cols": 2, "rows": 2, "seed": "restore" },
            "moves": 5,
            "startTs": 12345,
            "cards": [
                { "id": "ak47-0", "isFlipped": true, "isMatched": true },
                { "id": "awp-1", "isFlipped": false, "isMatched": false }
            ]
        }"#;
        assert_eq!(Snapshot::from_json(json).unwrap(), sample());
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut snapshot = sample();
        snapshot.version = 2;
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(matches!(
            Snapshot::from_json(&json),
            Err(SnapshotError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn test_rejects_negative_moves() {
        let json = r#"{"version":1,"config":{"cols":2,"rows":2,"seed":"s"},"moves":-1,"startTs":0,"cards":[]}"#;
        assert!(matches!(Snapshot::from_json(json), Err(SnapshotError::Json(_))));
    }

    #[test]
    fn test_binary_form() {
        let bytes = sample().to_bytes().unwrap();
        let decoded = Snapshot::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.matched_count(), 1);
        assert!(Snapshot::from_bytes(&bytes[..3]).is_err());
    }
}
