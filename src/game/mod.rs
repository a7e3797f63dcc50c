//! Game Logic Module
//!
//! Board generation and turn handling. Deterministic given a seed and the
//! sequence of `(click, time)` inputs.
//!
//! ## Module Structure
//!
//! - `weapon`: Weapon catalog and asset paths
//! - `config`: Grid, difficulty and timing configuration
//! - `card`: Per-slot card state machine
//! - `deck`: Seeded board generation
//! - `gate`: Click serialisation
//! - `manager`: Turn orchestration, victory detection
//! - `snapshot`: Persisted state
//! - `events`: Notifications for the UI and persistence

pub mod weapon;
pub mod config;
pub mod card;
pub mod deck;
pub mod gate;
pub mod manager;
pub mod snapshot;
pub mod events;

// Re-export key types
pub use weapon::{Weapon, Rarity, BACK_TEXTURE_PATH, default_catalog, asset_paths};
pub use config::{ConfigError, GameConfig, Difficulty, TimingConfig, ManagerSettings};
pub use card::{Card, CardSlot, CardFace, CardView, FlipStart};
pub use deck::build_deck;
pub use gate::InputGate;
pub use manager::{GameManager, ClickOutcome, RejectReason};
pub use snapshot::{Snapshot, CardRecord, SnapshotError, SNAPSHOT_VERSION};
pub use events::GameEvent;
