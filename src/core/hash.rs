//! Board Hashing
//!
//! Deterministic fingerprints of generated boards, used to:
//! - Log and compare boards produced from the same seed
//! - Check that a restored game landed on the board it was saved from

use sha2::{Sha256, Digest};

/// Hash output type (256 bits / 32 bytes)
pub type BoardHash = [u8; 32];

/// Deterministic hasher for board data.
///
/// Wraps SHA-256 with typed update helpers.
/// Order of updates is critical for determinism.
pub struct BoardHasher {
    hasher: Sha256,
}

impl BoardHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for a generated board.
    pub fn for_board() -> Self {
        Self::new(b"MEMORY_MATCH_BOARD_V1")
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a string, length-prefixed so adjacent strings can't alias.
    #[inline]
    pub fn update_str(&mut self, value: &str) {
        self.update_u32(value.len() as u32);
        self.hasher.update(value.as_bytes());
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> BoardHash {
        self.hasher.finalize().into()
    }
}

/// Compute a board fingerprint.
///
/// The grid shape is always hashed first; `add_slots` appends the
/// slot data in deck order.
pub fn compute_board_hash<F>(cols: u32, rows: u32, add_slots: F) -> BoardHash
where
    F: FnOnce(&mut BoardHasher),
{
    let mut hasher = BoardHasher::for_board();
    hasher.update_u32(cols);
    hasher.update_u32(rows);
    add_slots(&mut hasher);
    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================
