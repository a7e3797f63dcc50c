//! Game Manager
//!
//! Owns one game session: the deck, every card, the two-card selection,
//! the input gate and the move counter. It is a clock-driven state
//! machine. Callers feed it clicks and `advance(now)` calls; it reports
//! the next instant it needs to be advanced at, and returns the events
//! produced along the way.
//!
//! ## Turn flow
//!
//! ```text
//! click ──► gate locked, card flipping ──► reveal done ──► selection += card
//!                                                         │
//!                     ┌──────── 1 card: gate open ◄───────┤
//!                     │                                   ▼ 2 cards: moves += 1
//!                     │                      ┌─── same weapon ───┐─── different ───┐
//!                     │                      ▼                   │                 ▼
//!                     │          matched, victory check          │        wait mismatch delay
//!                     │          clear, gate open, save          │        flip both back
//!                     │                                          │        clear, gate open, save
//! ```
//!
//! Pending work is stamped with the logical instant it was due at, so the
//! outcome does not depend on how late `advance` is called.

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::core::hash::{BoardHash, compute_board_hash};
use crate::core::layout::{BoardLayout, Viewport, layout_for};
use crate::game::card::{Card, CardSlot, CardView, FlipStart};
use crate::game::config::{ConfigError, GameConfig, ManagerSettings};
use crate::game::deck::build_deck;
use crate::game::events::GameEvent;
use crate::game::gate::InputGate;
use crate::game::snapshot::{CardRecord, Snapshot, SnapshotError, SNAPSHOT_VERSION};
use crate::game::weapon::Weapon;

/// Why a click was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// No card at that index
    UnknownCard,
    /// The card is already part of the selection
    AlreadySelected,
    /// Two cards are already selected
    SelectionFull,
    /// The card is matched
    Matched,
    /// The card is already face-up
    FaceUp,
    /// The card is mid-transition
    Flipping,
    /// Another click is still being resolved
    InputLocked,
}

/// Result of a click.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The card started flipping
    Accepted,
    /// Nothing changed
    Rejected(RejectReason),
}

#[derive(Clone, Copy, Debug)]
enum Pending {
    /// A clicked card is turning face-up.
    Revealing { index: usize, done_at: u64 },
    /// A mismatched pair waits before flipping back.
    Recovering { first: usize, second: usize, resume_at: u64, generation: u64 },
    /// A mismatched pair is turning face-down.
    FlippingBack { first: usize, second: usize, generation: u64 },
    /// A restored pair of face-up cards awaits evaluation.
    Evaluating { at: u64 },
}

/// The game orchestrator.
pub struct GameManager {
    config: GameConfig,
    catalog: Vec<Weapon>,
    settings: ManagerSettings,
    layout: BoardLayout,
    cards: Vec<Card>,
    selection: Vec<usize>,
    gate: InputGate,
    moves: u32,
    start_ts: u64,
    pending: Option<Pending>,
    finished: bool,
    generation: u64,
}

impl GameManager {
    /// Build a new game starting at `now_ms` (epoch millis).
    pub fn new(
        config: GameConfig,
        catalog: Vec<Weapon>,
        settings: ManagerSettings,
        now_ms: u64,
    ) -> Result<Self, ConfigError> {
        let layout = layout_for(settings.viewport, config.cols, config.rows, settings.layout);
        let mut manager = Self {
            config: config.clone(),
            catalog,
            settings,
            layout,
            cards: Vec::new(),
            selection: Vec::with_capacity(2),
            gate: InputGate::Open,
            moves: 0,
            start_ts: now_ms,
            pending: None,
            finished: false,
            generation: 0,
        };
        manager.reset_board(config, now_ms)?;
        Ok(manager)
    }

    /// Rebuild a game from a snapshot, resuming at `now_ms`.
    ///
    /// A turn that was mid-resolution when the snapshot was taken is
    /// evaluated again from `now_ms`.
    pub fn from_snapshot(
        snapshot: &Snapshot,
        catalog: Vec<Weapon>,
        settings: ManagerSettings,
        now_ms: u64,
    ) -> Result<Self, SnapshotError> {
        snapshot.check_version()?;
        let mut manager = Self::new(snapshot.config.clone(), catalog, settings, snapshot.start_ts)?;
        manager.apply_snapshot(snapshot, now_ms);
        Ok(manager)
    }

    /// Discard the current game and start a new one in place.
    ///
    /// On error the current game is left untouched.
    pub fn new_game(&mut self, config: GameConfig, now_ms: u64) -> Result<(), ConfigError> {
        self.reset_board(config, now_ms)
    }

    /// Discard the current game and resume `snapshot` in place at `now_ms`.
    ///
    /// On error the current game is left untouched.
    pub fn restore(&mut self, snapshot: &Snapshot, now_ms: u64) -> Result<(), SnapshotError> {
        snapshot.check_version()?;
        self.reset_board(snapshot.config.clone(), snapshot.start_ts)?;
        self.apply_snapshot(snapshot, now_ms);
        Ok(())
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Check whether a click on `index` would be accepted.
    pub fn can_card_be_flipped(&self, index: usize) -> Result<(), RejectReason> {
        let card = self.cards.get(index).ok_or(RejectReason::UnknownCard)?;

        if self.selection.contains(&index) {
            return Err(RejectReason::AlreadySelected);
        }
        if self.selection.len() >= 2 {
            return Err(RejectReason::SelectionFull);
        }
        if card.is_matched() {
            return Err(RejectReason::Matched);
        }
        if card.is_flipped() {
            return Err(RejectReason::FaceUp);
        }
        if card.is_flipping() {
            return Err(RejectReason::Flipping);
        }
        if self.gate.is_locked() {
            return Err(RejectReason::InputLocked);
        }
        Ok(())
    }

    /// Handle a click on the card at `index`.
    ///
    /// Accepted clicks lock input and start the reveal; the card joins the
    /// selection once `advance` sees the transition complete.
    pub fn on_card_click(&mut self, index: usize, now_ms: u64) -> ClickOutcome {
        if let Err(reason) = self.can_card_be_flipped(index) {
            debug!(index, ?reason, "Click rejected");
            return ClickOutcome::Rejected(reason);
        }
        if !self.gate.try_acquire() {
            return ClickOutcome::Rejected(RejectReason::InputLocked);
        }

        let card = &mut self.cards[index];
        if card.flip(now_ms) == FlipStart::Ignored {
            self.gate.release();
            return ClickOutcome::Rejected(RejectReason::Flipping);
        }
        let done_at = card.flip_deadline().unwrap_or(now_ms);
        self.pending = Some(Pending::Revealing { index, done_at });

        debug!(index, id = card.id(), "Click accepted");
        ClickOutcome::Accepted
    }

    /// Forward a viewport change to the layout and reapply geometry.
    pub fn resize(&mut self, viewport: Viewport) {
        self.settings.viewport = viewport;
        self.relayout();
        debug!(
            width = viewport.width,
            height = viewport.height,
            card_side = self.layout.card_side,
            "Board resized"
        );
    }

    // =========================================================================
    // Time
    // =========================================================================

    /// Advance every transition and any pending turn work to `now_ms`.
    pub fn advance(&mut self, now_ms: u64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for card in &mut self.cards {
            card.advance(now_ms);
        }
        while self.step_pending(now_ms, &mut events) {}
        events
    }

    /// The next instant `advance` has work to do at, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        match self.pending? {
            Pending::Revealing { done_at, .. } => Some(done_at),
            Pending::Recovering { resume_at, .. } => Some(resume_at),
            Pending::FlippingBack { first, second, .. } => {
                let a = self.cards[first].flip_deadline();
                let b = self.cards[second].flip_deadline();
                a.max(b)
            }
            Pending::Evaluating { at } => Some(at),
        }
    }

    /// Is a turn being resolved?
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Declare victory if every card is matched.
    ///
    /// Emits `game-save` then `game-finished` the first time the board is
    /// complete; later calls emit nothing.
    pub fn check_victory(&mut self, now_ms: u64) -> Vec<GameEvent> {
        if self.finished || !self.all_matched() {
            return Vec::new();
        }
        self.finished = true;

        let elapsed = now_ms.saturating_sub(self.start_ts);
        info!(moves = self.moves, elapsed_ms = elapsed, "Board cleared");

        vec![
            GameEvent::GameSave,
            GameEvent::GameFinished {
                moves: self.moves,
                elapsed,
            },
        ]
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Capture the persistent part of the session.
    pub fn serialize(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            config: self.config.clone(),
            moves: self.moves,
            start_ts: self.start_ts,
            cards: self
                .cards
                .iter()
                .map(|card| CardRecord {
                    id: card.id().to_string(),
                    is_flipped: card.is_flipped(),
                    is_matched: card.is_matched(),
                })
                .collect(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Board configuration.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Moves so far.
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Game start (epoch millis).
    pub fn start_ts(&self) -> u64 {
        self.start_ts
    }

    /// Milliseconds since the game started.
    pub fn elapsed(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.start_ts)
    }

    /// Cards in deck order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Slots in deck order.
    pub fn slots(&self) -> impl Iterator<Item = &CardSlot> {
        self.cards.iter().map(Card::slot)
    }

    /// Indices of the currently selected cards.
    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    /// Is input locked?
    pub fn is_input_locked(&self) -> bool {
        self.gate.is_locked()
    }

    /// Has the game been won?
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Incremented on every new game or restore.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current layout.
    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    /// Catalog the board is drawn from.
    pub fn catalog(&self) -> &[Weapon] {
        &self.catalog
    }

    /// Render descriptions of every card.
    pub fn views(&self) -> Vec<CardView> {
        self.cards.iter().map(Card::view).collect()
    }

    /// Fingerprint of the slot order.
    pub fn board_hash(&self) -> BoardHash {
        compute_board_hash(self.config.cols, self.config.rows, |hasher| {
            for card in &self.cards {
                hasher.update_str(card.id());
            }
        })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn reset_board(&mut self, config: GameConfig, start_ts: u64) -> Result<(), ConfigError> {
        let slots = build_deck(&self.catalog, &config)?;
        let flip_duration = self.settings.timing.flip_duration;

        self.cards = slots
            .into_iter()
            .map(|slot| Card::new(slot, flip_duration))
            .collect();
        self.config = config;
        self.selection.clear();
        self.gate.release();
        self.moves = 0;
        self.start_ts = start_ts;
        self.pending = None;
        self.finished = false;
        self.generation += 1;
        self.relayout();

        info!(
            seed = %self.config.seed,
            cols = self.config.cols,
            rows = self.config.rows,
            generation = self.generation,
            board = %hex::encode(&self.board_hash()[..8]),
            "Board built"
        );
        Ok(())
    }

    fn apply_snapshot(&mut self, snapshot: &Snapshot, now_ms: u64) {
        let by_id: BTreeMap<String, usize> = self
            .cards
            .iter()
            .enumerate()
            .map(|(index, card)| (card.id().to_string(), index))
            .collect();

        let mut skipped = 0usize;
        for record in &snapshot.cards {
            match by_id.get(&record.id) {
                Some(&index) => {
                    let card = &mut self.cards[index];
                    card.show_face(record.is_flipped);
                    if record.is_matched {
                        card.set_matched();
                    }
                }
                None => {
                    skipped += 1;
                    debug!(id = %record.id, "Snapshot slot not on rebuilt board");
                }
            }
        }

        self.moves = snapshot.moves;
        self.start_ts = snapshot.start_ts;
        self.finished = self.all_matched();

        // Unresolved face-up cards go back into the selection. A lone card
        // waits for its partner; a pair is evaluated again from `now_ms`.
        // Anything past the first two can't belong to a turn and is hidden.
        let open: Vec<usize> = self
            .cards
            .iter()
            .enumerate()
            .filter(|(_, card)| card.is_flipped() && !card.is_matched())
            .map(|(index, _)| index)
            .collect();
        match open.as_slice() {
            [] => {}
            [single] => self.selection.push(*single),
            [first, second, extra @ ..] => {
                if !extra.is_empty() {
                    warn!(count = open.len(), "Snapshot has several unresolved face-up cards");
                    for &index in extra {
                        self.cards[index].show_face(false);
                    }
                }
                self.selection.extend([*first, *second]);
                self.gate.try_acquire();
                self.pending = Some(Pending::Evaluating { at: now_ms });
            }
        }

        info!(
            moves = self.moves,
            matched = snapshot.matched_count(),
            skipped,
            "Game restored"
        );
    }

    fn relayout(&mut self) {
        self.layout = layout_for(
            self.settings.viewport,
            self.config.cols,
            self.config.rows,
            self.settings.layout,
        );
        for (index, card) in self.cards.iter_mut().enumerate() {
            card.resize(self.layout.card_side);
            if let Some(center) = self.layout.position(index) {
                card.set_position(center);
            }
        }
    }

    fn all_matched(&self) -> bool {
        !self.cards.is_empty() && self.cards.iter().all(Card::is_matched)
    }

    /// Run one step of pending work. Returns `true` if anything changed.
    fn step_pending(&mut self, now_ms: u64, events: &mut Vec<GameEvent>) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };

        match pending {
            Pending::Revealing { index, done_at } => {
                if self.cards[index].is_flipping() {
                    self.pending = Some(pending);
                    return false;
                }
                self.selection.push(index);
                if self.selection.len() < 2 {
                    self.gate.release();
                    return true;
                }

                self.moves += 1;
                events.push(GameEvent::MovesChanged { moves: self.moves });
                self.evaluate_pair(done_at, events);
                true
            }

            Pending::Recovering { first, second, resume_at, generation } => {
                if generation != self.generation {
                    warn!(generation, current = self.generation, "Dropping stale mismatch recovery");
                    return true;
                }
                if now_ms < resume_at {
                    self.pending = Some(pending);
                    return false;
                }
                for index in [first, second] {
                    self.cards[index].flip(resume_at);
                    self.cards[index].advance(now_ms);
                }
                self.pending = Some(Pending::FlippingBack { first, second, generation });
                true
            }

            Pending::FlippingBack { first, second, generation } => {
                if generation != self.generation {
                    warn!(generation, current = self.generation, "Dropping stale flip-back");
                    return true;
                }
                if self.cards[first].is_flipping() || self.cards[second].is_flipping() {
                    self.pending = Some(pending);
                    return false;
                }
                self.selection.clear();
                self.gate.release();
                events.push(GameEvent::GameSave);
                true
            }

            Pending::Evaluating { at } => {
                if now_ms < at {
                    self.pending = Some(pending);
                    return false;
                }
                self.evaluate_pair(at, events);
                true
            }
        }
    }

    fn evaluate_pair(&mut self, at_ms: u64, events: &mut Vec<GameEvent>) {
        let (first, second) = (self.selection[0], self.selection[1]);

        if self.cards[first].weapon_id() == self.cards[second].weapon_id() {
            self.cards[first].set_matched();
            self.cards[second].set_matched();
            events.push(GameEvent::PairMatched);
            info!(
                weapon = self.cards[first].weapon_id(),
                moves = self.moves,
                "Pair matched"
            );

            let victory = self.check_victory(at_ms);
            events.extend(victory);

            self.selection.clear();
            self.gate.release();
            events.push(GameEvent::GameSave);
        } else {
            debug!(
                first = self.cards[first].id(),
                second = self.cards[second].id(),
                "Pair mismatched"
            );
            self.pending = Some(Pending::Recovering {
                first,
                second,
                resume_at: at_ms + self.settings.timing.mismatch_ms(),
                generation: self.generation,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::weapon::default_catalog;

    const START: u64 = 1_000;
    const FLIP: u64 = 150;
    const MISMATCH: u64 = 500;

    /// 2x2 board: ak47 at slots 0 and 2, awp at 1 and 3.
    fn two_by_two() -> GameManager {
        let catalog = default_catalog()[..2].to_vec();
        GameManager::new(GameConfig::new(2, 2, "test"), catalog, ManagerSettings::default(), START)
            .unwrap()
    }

    /// Click and run the reveal to completion.
    fn reveal(manager: &mut GameManager, index: usize, now: &mut u64) -> Vec<GameEvent> {
        assert_eq!(manager.on_card_click(index, *now), ClickOutcome::Accepted);
        *now += FLIP;
        manager.advance(*now)
    }

    #[test]
    fn test_board_layout_on_build() {
        let manager = two_by_two();
        assert_eq!(manager.cards().len(), 4);
        assert_eq!(manager.generation(), 1);
        let side = manager.layout().card_side;
        assert!(manager.cards().iter().all(|c| c.side() == side));
        assert_eq!(manager.cards()[0].weapon_id(), manager.cards()[2].weapon_id());
    }

    #[test]
    fn test_single_click() {
        let mut manager = two_by_two();
        assert_eq!(manager.on_card_click(0, START), ClickOutcome::Accepted);
        assert!(manager.is_input_locked());
        assert_eq!(manager.next_deadline(), Some(START + FLIP));

        assert!(manager.advance(START + FLIP - 1).is_empty());
        assert!(manager.selection().is_empty());

        assert!(manager.advance(START + FLIP).is_empty());
        assert_eq!(manager.selection(), &[0]);
        assert!(!manager.is_input_locked());
        assert!(manager.cards()[0].is_flipped());
        assert!(!manager.is_busy());
    }

    #[test]
    fn test_matching_pair() {
        let mut manager = two_by_two();
        let mut now = START;
        reveal(&mut manager, 0, &mut now);
        let events = reveal(&mut manager, 2, &mut now);

        assert_eq!(
            events,
            vec![GameEvent::MovesChanged { moves: 1 }, GameEvent::PairMatched, GameEvent::GameSave]
        );
        assert_eq!(manager.moves(), 1);
        assert!(manager.cards()[0].is_matched());
        assert!(manager.cards()[2].is_matched());
        assert!(manager.selection().is_empty());
        assert!(!manager.is_input_locked());
    }

    #[test]
    fn test_mismatched_pair_flips_back_after_delay() {
        let mut manager = two_by_two();
        let mut now = START;
        reveal(&mut manager, 0, &mut now);
        let events = reveal(&mut manager, 1, &mut now);

        assert_eq!(events, vec![GameEvent::MovesChanged { moves: 1 }]);
        assert!(manager.is_input_locked());
        assert_eq!(manager.next_deadline(), Some(now + MISMATCH));

        // Input stays locked through the delay
        assert_eq!(
            manager.on_card_click(3, now + 10),
            ClickOutcome::Rejected(RejectReason::SelectionFull)
        );
        assert!(manager.advance(now + MISMATCH - 1).is_empty());
        assert!(manager.cards()[0].is_flipped());

        // Delay elapsed: both cards start flipping back
        assert!(manager.advance(now + MISMATCH).is_empty());
        assert!(manager.cards()[0].is_flipping());
        assert!(manager.cards()[1].is_flipping());

        let events = manager.advance(now + MISMATCH + FLIP);
        assert_eq!(events, vec![GameEvent::GameSave]);
        assert!(!manager.cards()[0].is_flipped());
        assert!(!manager.cards()[1].is_flipped());
        assert!(manager.selection().is_empty());
        assert!(!manager.is_input_locked());
        assert_eq!(manager.moves(), 1);
    }

    #[test]
    fn test_late_advance_resolves_whole_turn() {
        let mut manager = two_by_two();
        let mut now = START;
        reveal(&mut manager, 0, &mut now);
        assert_eq!(manager.on_card_click(1, now), ClickOutcome::Accepted);

        // A single late sample runs reveal, delay and flip-back
        let events = manager.advance(now + 10_000);
        assert_eq!(events, vec![GameEvent::MovesChanged { moves: 1 }, GameEvent::GameSave]);
        assert!(!manager.is_busy());
        assert!(manager.cards().iter().all(|c| !c.is_flipped()));
    }

    #[test]
    fn test_perfect_game_finishes_once() {
        let mut manager = two_by_two();
        let mut now = START;
        let mut events = Vec::new();
        for index in [0, 2, 1, 3] {
            events.extend(reveal(&mut manager, index, &mut now));
        }

        let finished: Vec<&GameEvent> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameFinished { .. }))
            .collect();
        assert_eq!(finished.len(), 1);
        assert_eq!(
            finished[0],
            &GameEvent::GameFinished { moves: 2, elapsed: 4 * FLIP }
        );
        assert!(manager.is_finished());

        // The final match saves before and after announcing the finish
        assert_eq!(
            &events[events.len() - 4..],
            &[
                GameEvent::PairMatched,
                GameEvent::GameSave,
                GameEvent::GameFinished { moves: 2, elapsed: 4 * FLIP },
                GameEvent::GameSave,
            ]
        );

        // Repeated checks don't announce again
        assert!(manager.check_victory(now + 1_000).is_empty());
    }

    #[test]
    fn test_victory_requires_every_card() {
        let mut manager = two_by_two();
        let mut now = START;
        reveal(&mut manager, 0, &mut now);
        reveal(&mut manager, 2, &mut now);
        assert!(manager.check_victory(now).is_empty());
        assert!(!manager.is_finished());
    }

    #[test]
    fn test_click_rejections_leave_state_unchanged() {
        let mut manager = two_by_two();
        let mut now = START;

        assert_eq!(manager.on_card_click(0, now), ClickOutcome::Accepted);
        assert_eq!(
            manager.on_card_click(1, now + 5),
            ClickOutcome::Rejected(RejectReason::InputLocked)
        );
        assert!(!manager.cards()[1].is_flipping());

        now += FLIP;
        manager.advance(now);
        assert_eq!(
            manager.on_card_click(0, now),
            ClickOutcome::Rejected(RejectReason::AlreadySelected)
        );

        reveal(&mut manager, 2, &mut now);
        assert_eq!(
            manager.on_card_click(2, now),
            ClickOutcome::Rejected(RejectReason::Matched)
        );
        assert_eq!(
            manager.on_card_click(9, now),
            ClickOutcome::Rejected(RejectReason::UnknownCard)
        );
        assert_eq!(manager.moves(), 1);
    }

    #[test]
    fn test_third_card_rejected() {
        let mut manager = two_by_two();
        let mut now = START;
        reveal(&mut manager, 0, &mut now);
        reveal(&mut manager, 1, &mut now);
        let moves = manager.moves();

        assert_eq!(
            manager.on_card_click(3, now),
            ClickOutcome::Rejected(RejectReason::SelectionFull)
        );
        assert!(!manager.cards()[3].is_flipping());
        assert_eq!(manager.moves(), moves);
    }

    #[test]
    fn test_identical_seeds_identical_boards() {
        let a = GameManager::new(
            GameConfig::new(4, 4, "same"),
            default_catalog(),
            ManagerSettings::default(),
            0,
        )
        .unwrap();
        let b = GameManager::new(
            GameConfig::new(4, 4, "same"),
            default_catalog(),
            ManagerSettings::default(),
            99,
        )
        .unwrap();

        let ids_a: Vec<&str> = a.slots().map(|s| s.id.as_str()).collect();
        let ids_b: Vec<&str> = b.slots().map(|s| s.id.as_str()).collect();
        assert_eq!(ids_a, ids_b);
        assert_eq!(a.board_hash(), b.board_hash());
    }

    #[test]
    fn test_resize_keeps_game_state() {
        let mut manager = two_by_two();
        let mut now = START;
        reveal(&mut manager, 0, &mut now);
        manager.on_card_click(1, now);

        let before = manager.layout().card_side;
        manager.resize(Viewport::new(1600.0, 1200.0));
        let after = manager.layout().card_side;

        assert!(after > before);
        assert!(manager.cards().iter().all(|c| c.side() == after));
        assert_eq!(manager.cards()[3].center(), manager.layout().positions[3]);
        assert!(manager.cards()[0].is_flipped());
        assert!(manager.cards()[1].is_flipping());
        assert_eq!(manager.selection(), &[0]);
    }

    #[test]
    fn test_serialize_restore_round_trip() {
        let mut manager = two_by_two();
        let mut now = START;
        reveal(&mut manager, 0, &mut now);
        reveal(&mut manager, 2, &mut now);
        reveal(&mut manager, 1, &mut now);

        let snapshot = manager.serialize();
        assert_eq!(snapshot.cards.len(), 4);

        let restored = GameManager::from_snapshot(
            &snapshot,
            default_catalog()[..2].to_vec(),
            ManagerSettings::default(),
            now,
        )
        .unwrap();

        assert_eq!(restored.moves(), manager.moves());
        assert_eq!(restored.start_ts(), START);
        for (a, b) in manager.cards().iter().zip(restored.cards()) {
            assert_eq!(a.id(), b.id());
            assert_eq!(a.is_flipped(), b.is_flipped());
            assert_eq!(a.is_matched(), b.is_matched());
            assert!(!b.is_flipping(), "restore must not animate");
        }
        assert_eq!(restored.serialize(), snapshot);

        // The half-finished turn carries over
        assert_eq!(restored.selection(), &[1]);
    }

    #[test]
    fn test_restore_skips_unknown_slots() {
        let mut manager = two_by_two();
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            config: GameConfig::new(2, 2, "test"),
            moves: 5,
            start_ts: 12345,
            cards: vec![
                CardRecord { id: "ak47-0".into(), is_flipped: true, is_matched: true },
                CardRecord { id: "ak47-2".into(), is_flipped: true, is_matched: true },
                CardRecord { id: "deagle-7".into(), is_flipped: true, is_matched: true },
            ],
        };

        manager.restore(&snapshot, START).unwrap();

        assert_eq!(manager.moves(), 5);
        assert_eq!(manager.start_ts(), 12345);
        assert!(manager.cards()[0].is_matched());
        assert!(manager.cards()[2].is_matched());
        assert!(!manager.cards()[1].is_flipped());
        assert!(!manager.is_finished());
        assert!(manager.selection().is_empty());
    }

    #[test]
    fn test_restore_completed_game_does_not_finish_again() {
        let mut manager = two_by_two();
        let mut now = START;
        for index in [0, 2, 1, 3] {
            reveal(&mut manager, index, &mut now);
        }
        let snapshot = manager.serialize();

        manager.restore(&snapshot, now).unwrap();
        assert!(manager.is_finished());
        assert!(manager.check_victory(now).is_empty());
    }

    #[test]
    fn test_restore_rejects_bad_config() {
        let mut manager = two_by_two();
        let mut snapshot = manager.serialize();
        snapshot.config.cols = 3;
        snapshot.config.rows = 1;

        assert!(matches!(
            manager.restore(&snapshot, START),
            Err(SnapshotError::Config(ConfigError::OddCellCount { .. }))
        ));
        // Current game untouched
        assert_eq!(manager.cards().len(), 4);
        assert_eq!(manager.generation(), 1);
    }

    /// Restore a game saved while `0` and `1` were waiting to flip back.
    fn restored_mid_mismatch(now: u64) -> GameManager {
        let mut manager = two_by_two();
        let mut clock = START;
        reveal(&mut manager, 0, &mut clock);
        reveal(&mut manager, 1, &mut clock);
        assert!(manager.is_busy());
        let snapshot = manager.serialize();

        GameManager::from_snapshot(
            &snapshot,
            default_catalog()[..2].to_vec(),
            ManagerSettings::default(),
            now,
        )
        .unwrap()
    }

    #[test]
    fn test_restore_mid_mismatch_resumes_turn() {
        let mut now = 50_000;
        let mut manager = restored_mid_mismatch(now);

        assert_eq!(manager.selection(), &[0, 1]);
        assert!(manager.is_input_locked());
        assert_eq!(manager.next_deadline(), Some(now));
        assert_eq!(
            manager.on_card_click(2, now),
            ClickOutcome::Rejected(RejectReason::SelectionFull)
        );

        // The recorded move is not counted twice
        assert!(manager.advance(now).is_empty());
        assert_eq!(manager.moves(), 1);
        assert_eq!(manager.next_deadline(), Some(now + MISMATCH));

        let events = manager.advance(now + MISMATCH + FLIP);
        assert_eq!(events, vec![GameEvent::GameSave]);
        assert!(manager.cards().iter().all(|c| !c.is_flipped()));
        assert!(!manager.is_input_locked());

        now += MISMATCH + FLIP;
        let mut events = Vec::new();
        for index in [0, 2, 1, 3] {
            events.extend(reveal(&mut manager, index, &mut now));
        }
        assert!(manager.is_finished());
        assert_eq!(manager.moves(), 3);
        assert!(events.iter().any(|e| matches!(e, GameEvent::GameFinished { moves: 3, .. })));
    }

    #[test]
    fn test_restore_pending_match_resolves() {
        let mut manager = two_by_two();
        let mut snapshot = manager.serialize();
        snapshot.moves = 1;
        snapshot.cards[0].is_flipped = true;
        snapshot.cards[2].is_flipped = true;

        let now = 7_000;
        manager.restore(&snapshot, now).unwrap();
        assert_eq!(manager.selection(), &[0, 2]);

        let events = manager.advance(now);
        assert_eq!(events, vec![GameEvent::PairMatched, GameEvent::GameSave]);
        assert!(manager.cards()[0].is_matched());
        assert!(manager.cards()[2].is_matched());
        assert_eq!(manager.moves(), 1);
        assert!(!manager.is_busy());
        assert!(!manager.is_input_locked());
    }

    #[test]
    fn test_restore_hides_extra_face_up_cards() {
        let mut manager = two_by_two();
        let mut snapshot = manager.serialize();
        for record in &mut snapshot.cards[..3] {
            record.is_flipped = true;
        }

        manager.restore(&snapshot, START).unwrap();
        assert_eq!(manager.selection(), &[0, 1]);
        assert!(manager.cards()[0].is_flipped());
        assert!(manager.cards()[1].is_flipped());
        assert!(!manager.cards()[2].is_flipped());
        assert!(!manager.cards()[3].is_flipped());

        // The mismatch plays out and the board is clickable again
        manager.advance(START + MISMATCH + FLIP);
        assert!(!manager.is_busy());
        assert_eq!(manager.on_card_click(2, START + MISMATCH + FLIP), ClickOutcome::Accepted);
    }

    #[test]
    fn test_restore_rejects_unknown_version() {
        let mut manager = two_by_two();
        let mut snapshot = manager.serialize();
        snapshot.version = SNAPSHOT_VERSION + 1;

        assert!(matches!(
            manager.restore(&snapshot, START),
            Err(SnapshotError::UnsupportedVersion(v)) if v == SNAPSHOT_VERSION + 1
        ));
        assert_eq!(manager.generation(), 1);

        let result = GameManager::from_snapshot(
            &snapshot,
            default_catalog()[..2].to_vec(),
            ManagerSettings::default(),
            START,
        );
        assert!(matches!(result, Err(SnapshotError::UnsupportedVersion(_))));
    }

    #[test]
    fn test_new_game_drops_pending_recovery() {
        let mut manager = two_by_two();
        let mut now = START;
        reveal(&mut manager, 0, &mut now);
        reveal(&mut manager, 1, &mut now);
        assert!(manager.is_busy());

        manager.new_game(GameConfig::new(2, 2, "fresh"), now).unwrap();
        assert_eq!(manager.generation(), 2);
        assert!(!manager.is_busy());
        assert!(!manager.is_input_locked());
        assert_eq!(manager.moves(), 0);

        // The old delay elapsing touches nothing
        assert!(manager.advance(now + MISMATCH + FLIP).is_empty());
        assert!(manager.cards().iter().all(|c| !c.is_flipped()));
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let result = GameManager::new(
            GameConfig::new(3, 3, "odd"),
            default_catalog(),
            ManagerSettings::default(),
            0,
        );
        assert!(matches!(result, Err(ConfigError::OddCellCount { .. })));

        let result = GameManager::new(
            GameConfig::new(2, 2, "empty"),
            Vec::new(),
            ManagerSettings::default(),
            0,
        );
        assert!(matches!(result, Err(ConfigError::EmptyCatalog)));
    }
}
