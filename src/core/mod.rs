//! Core deterministic primitives.
//!
//! Seeded randomness, shuffling, board hashing and layout math. Nothing
//! here knows about cards or sessions.

pub mod rng;
pub mod shuffle;
pub mod layout;
pub mod hash;

// Re-export core types
pub use rng::{DeterministicRng, create_rng, derive_seed};
pub use shuffle::shuffle;
pub use layout::{BoardLayout, LayoutOptions, Point, Viewport, compute_layout, layout_for};
pub use hash::{BoardHash, BoardHasher, compute_board_hash};
