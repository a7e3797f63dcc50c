//! Game Events
//!
//! Notifications emitted by the game manager, consumed by the UI and the
//! persistence layer. The core never reads a response back.

use serde::{Serialize, Deserialize};

/// Game event data.
///
/// Serialized with a `type` tag carrying the event name
/// (`moves-changed`, `pair-matched`, `game-save`, `game-finished`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GameEvent {
    /// A second card was revealed; the move counter advanced
    MovesChanged {
        /// Moves so far
        moves: u32,
    },

    /// The two selected cards matched
    PairMatched,

    /// The current state should be persisted now
    GameSave,

    /// Every pair is matched
    GameFinished {
        /// Total moves
        moves: u32,
        /// Milliseconds since the game started
        elapsed: u64,
    },
}

impl GameEvent {
    /// Event name as used on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::MovesChanged { .. } => "moves-changed",
            GameEvent::PairMatched => "pair-matched",
            GameEvent::GameSave => "game-save",
            GameEvent::GameFinished { .. } => "game-finished",
        }
    }
}
