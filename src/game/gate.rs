//! Input Gate
//!
//! Reject-if-busy gate serialising click acceptance. There is no queue:
//! a click arriving while locked is dropped.

/// Two-state input gate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputGate {
    /// Clicks are accepted
    #[default]
    Open,
    /// A click is being resolved
    Locked,
}

impl InputGate {
    /// Lock the gate if it is open. Returns `false` when already locked.
    pub fn try_acquire(&mut self) -> bool {
        match self {
            InputGate::Open => {
                *self = InputGate::Locked;
                true
            }
            InputGate::Locked => false,
        }
    }

    /// Open the gate.
    pub fn release(&mut self) {
        *self = InputGate::Open;
    }

    /// Is the gate locked?
    pub fn is_locked(&self) -> bool {
        matches!(self, InputGate::Locked)
    }
}
