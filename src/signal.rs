use crate::SignalId;
use serde::{Deserialize, Serialize};

/// The state of a traffic signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignalState {
    /// Vehicles may pass.
    Pass,
    /// Vehicles must come to a stop before the signal.
    Stop,
}

impl SignalState {
    /// Returns the opposite state.
    pub fn toggled(self) -> Self {
        match self {
            SignalState::Pass => SignalState::Stop,
            SignalState::Stop => SignalState::Pass,
        }
    }

    /// Whether vehicles may pass.
    pub fn is_pass(self) -> bool {
        self == SignalState::Pass
    }
}

impl From<bool> for SignalState {
    fn from(pass: bool) -> Self {
        if pass {
            SignalState::Pass
        } else {
            SignalState::Stop
        }
    }
}

/// The attributes of a traffic signal.
#[derive(Clone, Copy, Debug)]
pub struct SignalAttributes {
    /// The state held during the period that begins at `phase_offset`.
    pub initial_state: SignalState,
    /// The number of ticks between toggles, must be positive.
    pub toggle_period: u64,
    /// The tick from which the period is counted.
    pub phase_offset: u64,
}

/// A two-state traffic signal which toggles on a fixed period.
///
/// The signal toggles on every tick `t` where `(t - phase_offset) mod toggle_period == 0`.
/// `initial_state` is the state held during the period that begins at `phase_offset`,
/// so with the default period of 100 and no offset the first toggle happens on tick 100.
#[derive(Clone, Debug)]
pub struct Signal {
    /// The signal's ID.
    id: SignalId,
    /// The current state.
    state: SignalState,
    /// The state held from `phase_offset` until the next toggle.
    initial_state: SignalState,
    /// The number of ticks between toggles.
    toggle_period: u64,
    /// The tick from which the period is counted.
    phase_offset: u64,
}

impl Signal {
    /// Creates a new signal in the state it holds at tick zero.
    pub(crate) fn new(id: SignalId, attributes: &SignalAttributes) -> Self {
        let mut signal = Self {
            id,
            state: attributes.initial_state,
            initial_state: attributes.initial_state,
            toggle_period: attributes.toggle_period,
            phase_offset: attributes.phase_offset,
        };
        signal.state = signal.state_at(0);
        signal
    }

    /// Gets the signal's ID.
    pub fn id(&self) -> SignalId {
        self.id
    }

    /// The current state.
    pub fn state(&self) -> SignalState {
        self.state
    }

    pub fn toggle_period(&self) -> u64 {
        self.toggle_period
    }

    pub fn phase_offset(&self) -> u64 {
        self.phase_offset
    }

    /// Flips the state unconditionally.
    pub fn toggle(&mut self) {
        self.state = self.state.toggled();
    }

    /// Whether the signal is scheduled to toggle on the given tick.
    /// Tick zero is the initial state and is never processed.
    pub fn is_due(&self, tick: u64) -> bool {
        tick > 0 && self.phase(tick).rem_euclid(self.toggle_period as i128) == 0
    }

    /// The state of the signal once the given tick has been processed,
    /// assuming [Self::toggle] was invoked on every tick where [Self::is_due].
    pub fn state_at(&self, tick: u64) -> SignalState {
        let periods = self.phase(tick).div_euclid(self.toggle_period as i128);
        if periods.rem_euclid(2) == 1 {
            self.initial_state.toggled()
        } else {
            self.initial_state
        }
    }

    /// The signed number of ticks since the phase offset.
    fn phase(&self, tick: u64) -> i128 {
        tick as i128 - self.phase_offset as i128
    }
}
