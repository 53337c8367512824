//! Shared vocabulary of the paired devices: states, roles, and the
//! state-change record both sides agree on.
//!
//! The numeric codes are the wire representation (see [`wire`]), so they
//! must never be renumbered.

pub mod wire;

/// One step of the replicated automaton.
///
/// Codes `1..=3` double as the three response options of the menu.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum State {
    /// Nothing pending.
    #[default]
    Idle = 0,
    /// Response option 1.
    Waiting = 1,
    /// Response option 2.
    Active = 2,
    /// Response option 3.
    Reserved = 3,
    /// A call is ringing on the Responder (or awaiting reply on the Caller).
    CallAlert = 4,
    /// The Responder is cycling through the menu.
    MenuInteracting = 5,
}

impl State {
    /// Every state, in code order.
    pub const ALL: [State; 6] = [
        State::Idle,
        State::Waiting,
        State::Active,
        State::Reserved,
        State::CallAlert,
        State::MenuInteracting,
    ];

    /// Decode a raw state code. Anything outside `0..=5` is rejected.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(State::Idle),
            1 => Some(State::Waiting),
            2 => Some(State::Active),
            3 => Some(State::Reserved),
            4 => Some(State::CallAlert),
            5 => Some(State::MenuInteracting),
            _ => None,
        }
    }

    pub const fn code(self) -> u8 {
        self as u8
    }

    /// `true` for the three menu answers (`1..=3`).
    pub const fn is_response(self) -> bool {
        matches!(self, State::Waiting | State::Active | State::Reserved)
    }

    /// Response state for a menu option index, if `option` is `1..=3`.
    pub const fn from_option(option: u8) -> Option<Self> {
        match option {
            1..=3 => State::from_code(option),
            _ => None,
        }
    }
}

/// Which half of the pair this firmware image is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    /// Rings the bell; shows the reply on its lamps.
    Caller,
    /// Receives the call and answers through the menu.
    Responder,
}

impl Role {
    /// The role at the other end of the link.
    pub const fn peer(self) -> Self {
        match self {
            Role::Caller => Role::Responder,
            Role::Responder => Role::Caller,
        }
    }
}

/// What caused a state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Origin {
    /// A debounced button edge on this device.
    Local,
    /// A frame received from the peer.
    Remote,
    /// The activity timer forced it.
    Timer,
}

/// Record of one committed transition. Transient: produced by the
/// machine, consumed in the same controller tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StateChangeEvent {
    pub origin: Origin,
    pub from: State,
    pub to: State,
    pub at_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_roundtrip_for_every_state() {
        for state in State::ALL {
            assert_eq!(State::from_code(state.code()), Some(state));
        }
    }

    #[test]
    fn codes_above_five_are_rejected() {
        assert_eq!(State::from_code(6), None);
        assert_eq!(State::from_code(0xFF), None);
    }

    #[test]
    fn only_options_one_to_three_are_responses() {
        assert_eq!(State::from_option(0), None);
        assert_eq!(State::from_option(1), Some(State::Waiting));
        assert_eq!(State::from_option(3), Some(State::Reserved));
        assert_eq!(State::from_option(4), None);
        assert!(!State::CallAlert.is_response());
        assert!(State::Active.is_response());
    }

    #[test]
    fn roles_pair_up() {
        assert_eq!(Role::Caller.peer(), Role::Responder);
        assert_eq!(Role::Responder.peer(), Role::Caller);
    }
}
