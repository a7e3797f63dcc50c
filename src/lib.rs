//! # Memory Match
//!
//! Deterministic game-state engine for a card-matching memory game.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        MEMORY MATCH                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── rng.rs      - Seeded Xorshift128+ PRNG                  │
//! │  ├── shuffle.rs  - Seeded Fisher-Yates shuffle               │
//! │  ├── layout.rs   - Grid to pixel geometry                    │
//! │  └── hash.rs     - Board fingerprints                        │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── weapon.rs   - Weapon catalog                            │
//! │  ├── config.rs   - Grid, difficulty, timing                  │
//! │  ├── card.rs     - Card flip state machine                   │
//! │  ├── deck.rs     - Seeded board generation                   │
//! │  ├── gate.rs     - Input gate                                │
//! │  ├── manager.rs  - Turn orchestration                        │
//! │  ├── snapshot.rs - Save/restore format                       │
//! │  └── events.rs   - Game events                               │
//! │                                                              │
//! │  session/        - Async runtime glue (non-deterministic)    │
//! │  ├── actor.rs    - Session actor                             │
//! │  ├── clock.rs    - Epoch clock over tokio time               │
//! │  ├── assets.rs   - Asset preloading                          │
//! │  ├── store.rs    - Snapshot persistence                      │
//! │  └── timer.rs    - Elapsed-time counter                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules never read a clock or an entropy
//! source. Time is an explicit `now_ms` argument and all randomness comes
//! from the game seed, so the same seed and the same timed clicks always
//! produce the same board, the same events and the same snapshot.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod session;

// Re-export commonly used types
pub use self::core::rng::DeterministicRng;
pub use self::core::shuffle::shuffle;
pub use self::core::layout::{compute_layout, BoardLayout, Viewport};
pub use game::config::{Difficulty, GameConfig};
pub use game::events::GameEvent;
pub use game::manager::{ClickOutcome, GameManager};
pub use game::snapshot::Snapshot;
pub use session::actor::{GameSession, SessionOptions, SessionStart};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
