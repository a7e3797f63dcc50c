//! Card State Machine
//!
//! One card per deck slot. A card is face-down until `flip()` starts a timed
//! transition; the visible face swaps once at the midpoint and `is_flipped`
//! toggles when the transition completes. Matched cards ignore flips.
//!
//! Time is passed in as epoch milliseconds so the machine can be stepped
//! deterministically; progress depends only on elapsed time, never on how
//! often `advance` is called.

use std::time::Duration;
use serde::{Serialize, Deserialize};

use crate::core::layout::Point;
use crate::game::weapon::{Rarity, Weapon};

/// Progress at which the visible face swaps.
pub const FACE_SWAP_PROGRESS: f64 = 0.5;

/// One fixed position in the generated deck.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSlot {
    /// `"{weapon_id}-{slot_index}"`, unique per slot
    pub id: String,
    /// Weapon shown on the front face
    pub weapon: Weapon,
}

impl CardSlot {
    /// Create the slot at `index` for `weapon`.
    pub fn new(weapon: Weapon, index: usize) -> Self {
        Self {
            id: format!("{}-{}", weapon.id, index),
            weapon,
        }
    }
}

/// The face currently rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardFace {
    /// Face-down
    Back,
    /// Weapon visible
    Front,
}

/// Outcome of a `flip()` request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlipStart {
    /// A transition is now in flight
    Started,
    /// Already flipping or matched; completed immediately with no change
    Ignored,
}

#[derive(Clone, Debug)]
struct FlipTransition {
    started_at: u64,
    face_swapped: bool,
}

/// Everything a renderer needs to draw one card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardView {
    /// Slot id
    pub id: String,
    /// Center x
    pub x: f64,
    /// Center y
    pub y: f64,
    /// Side length
    pub side: f64,
    /// Horizontal scale, 1.0 at rest and 0.0 edge-on
    pub scale_x: f64,
    /// Visible face
    pub face: CardFace,
    /// Front texture
    pub texture_path: String,
    /// Rarity, for styling
    pub rarity: Rarity,
    /// Matched cards stay revealed
    pub is_matched: bool,
}

/// Per-slot card state.
#[derive(Clone, Debug)]
pub struct Card {
    slot: CardSlot,
    is_flipped: bool,
    is_matched: bool,
    face: CardFace,
    transition: Option<FlipTransition>,
    flip_duration_ms: u64,
    side: f64,
    center: Point,
    scale_x: f64,
}

impl Card {
    /// Create a face-down card.
    pub fn new(slot: CardSlot, flip_duration: Duration) -> Self {
        Self {
            slot,
            is_flipped: false,
            is_matched: false,
            face: CardFace::Back,
            transition: None,
            flip_duration_ms: flip_duration.as_millis() as u64,
            side: 0.0,
            center: Point { x: 0.0, y: 0.0 },
            scale_x: 1.0,
        }
    }

    /// The slot this card occupies.
    pub fn slot(&self) -> &CardSlot {
        &self.slot
    }

    /// Slot id.
    pub fn id(&self) -> &str {
        &self.slot.id
    }

    /// Weapon id used for pair matching.
    pub fn weapon_id(&self) -> &str {
        &self.slot.weapon.id
    }

    /// Is the card face-up (after any completed transition)?
    pub fn is_flipped(&self) -> bool {
        self.is_flipped
    }

    /// Has the card been matched?
    pub fn is_matched(&self) -> bool {
        self.is_matched
    }

    /// Is a transition in flight?
    pub fn is_flipping(&self) -> bool {
        self.transition.is_some()
    }

    /// Currently rendered face.
    pub fn face(&self) -> CardFace {
        self.face
    }

    /// Current side length.
    pub fn side(&self) -> f64 {
        self.side
    }

    /// Current center.
    pub fn center(&self) -> Point {
        self.center
    }

    /// Current horizontal scale.
    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    /// Start a flip transition at `now_ms`.
    ///
    /// A no-op if a transition is already running or the card is matched.
    pub fn flip(&mut self, now_ms: u64) -> FlipStart {
        if self.is_flipping() || self.is_matched {
            return FlipStart::Ignored;
        }
        self.transition = Some(FlipTransition {
            started_at: now_ms,
            face_swapped: false,
        });
        FlipStart::Started
    }

    /// Transition progress in `[0, 1]`, if flipping.
    pub fn progress(&self, now_ms: u64) -> Option<f64> {
        self.transition
            .as_ref()
            .map(|t| self.progress_since(t.started_at, now_ms))
    }

    /// When the running transition completes.
    pub fn flip_deadline(&self) -> Option<u64> {
        self.transition
            .as_ref()
            .map(|t| t.started_at.saturating_add(self.flip_duration_ms))
    }

    /// Sample the running transition at `now_ms`.
    ///
    /// Returns `true` exactly once per transition, when it completes.
    pub fn advance(&mut self, now_ms: u64) -> bool {
        let Some(started_at) = self.transition.as_ref().map(|t| t.started_at) else {
            return false;
        };
        let progress = self.progress_since(started_at, now_ms);

        if progress >= FACE_SWAP_PROGRESS {
            if let Some(transition) = self.transition.as_mut() {
                if !transition.face_swapped {
                    transition.face_swapped = true;
                    self.face = if self.is_flipped { CardFace::Back } else { CardFace::Front };
                }
            }
        }

        if progress >= 1.0 {
            self.transition = None;
            self.is_flipped = !self.is_flipped;
            self.scale_x = 1.0;
            return true;
        }

        self.scale_x = (1.0 - 2.0 * progress).abs();
        false
    }

    /// Set the face directly, without animating. Used by restore.
    ///
    /// A matched card can't be turned face-down.
    pub fn show_face(&mut self, front: bool) {
        if self.is_matched && !front {
            return;
        }
        self.transition = None;
        self.is_flipped = front;
        self.face = if front { CardFace::Front } else { CardFace::Back };
        self.scale_x = 1.0;
    }

    /// Mark the card matched. Idempotent and never reverted.
    ///
    /// Ignored while a transition is in flight; the card has to settle
    /// before it can be matched.
    pub fn set_matched(&mut self) {
        if self.is_matched || self.is_flipping() {
            return;
        }
        if !self.is_flipped {
            self.show_face(true);
        }
        self.is_matched = true;
    }

    /// Apply a new side length. Flip state is untouched.
    pub fn resize(&mut self, side: f64) {
        self.side = side;
    }

    /// Move the card's center.
    pub fn set_position(&mut self, center: Point) {
        self.center = center;
    }

    /// Render description of the card.
    pub fn view(&self) -> CardView {
        CardView {
            id: self.slot.id.clone(),
            x: self.center.x,
            y: self.center.y,
            side: self.side,
            scale_x: self.scale_x,
            face: self.face,
            texture_path: self.slot.weapon.texture_path.clone(),
            rarity: self.slot.weapon.rarity,
            is_matched: self.is_matched,
        }
    }

    fn progress_since(&self, started_at: u64, now_ms: u64) -> f64 {
        if self.flip_duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(started_at);
        (elapsed as f64 / self.flip_duration_ms as f64).min(1.0)
    }
}
