//! The replicated call-alert automaton.
//!
//! [`step`] is a pure function from `(role, policy, snapshot, event)` to
//! the next snapshot plus the effects the controller must carry out. It
//! never touches hardware or time, so every `(state, event)` pair can be
//! exercised on the host. [`Machine`] is the explicit context object that
//! holds the authoritative snapshot and commits transitions.
//!
//! Each role has its own table:
//!
//! | role      | state              | event            | next               | effect          |
//! |-----------|--------------------|------------------|--------------------|-----------------|
//! | Caller    | Idle               | press Call       | CallAlert          | send 4          |
//! | Caller    | CallAlert          | message 1..=3    | that state         | -               |
//! | Responder | Idle, CallAlert    | press State      | MenuInteracting(1) | send 5          |
//! | Responder | MenuInteracting(n) | press State      | MenuInteracting(n+1 wrapping) | -    |
//! | Responder | MenuInteracting(n) | press Send       | n, or Idle         | send n          |
//! | Responder | Idle               | message 4        | CallAlert          | -               |
//! | Responder | any                | message 1..=3    | that state         | -               |
//! | Responder | not Idle           | message 5        | unchanged          | send current    |
//! | both      | any                | idle timeout     | Idle               | optional send 0 |

mod caller;
mod responder;

use crate::input::ButtonId;
use crate::protocol::{Origin, Role, State, StateChangeEvent};
use crate::ui::input_logic::MenuCursor;

/// Upper bound on effects from a single transition.
pub const MAX_EFFECTS: usize = 4;

/// Inputs to the automaton.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Debounced falling edge on a local button.
    Press(ButtonId),
    /// Validated state frame from the peer.
    Message(State),
    /// The activity timer expired.
    IdleTimeout,
}

impl Event {
    pub const fn origin(self) -> Origin {
        match self {
            Event::Press(_) => Origin::Local,
            Event::Message(_) => Origin::Remote,
            Event::IdleTimeout => Origin::Timer,
        }
    }
}

/// Work the controller performs after a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// Transmit this state to the peer (with retry).
    Send(State),
    /// Re-evaluate the lamp pattern.
    RefreshIndicators,
    /// Redraw the menu.
    RefreshDisplay,
}

pub type Effects = heapless::Vec<Effect, MAX_EFFECTS>;

/// Post-send target of the Responder's send button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AfterSend {
    /// Stay on the answer that was sent.
    #[default]
    ChosenOption,
    /// Go back to Idle once the answer is on its way.
    ResetToIdle,
}

/// Behaviour switches the deployed firmware variants disagree on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Policy {
    pub after_send: AfterSend,
    /// Send `Idle` to the peer when the idle timeout fires.
    pub announce_timeout: bool,
}

/// The authoritative per-device state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub state: State,
    /// Present only while `state == MenuInteracting`.
    pub cursor: Option<MenuCursor>,
}

impl Snapshot {
    pub const IDLE: Self = Self {
        state: State::Idle,
        cursor: None,
    };

    /// Snapshot outside the menu.
    pub const fn at(state: State) -> Self {
        Self {
            state,
            cursor: None,
        }
    }

    pub const fn menu(cursor: MenuCursor) -> Self {
        Self {
            state: State::MenuInteracting,
            cursor: Some(cursor),
        }
    }
}

/// Result of an accepted event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub next: Snapshot,
    pub effects: Effects,
}

impl Transition {
    /// Move to `next` and refresh both outputs.
    fn to(next: Snapshot) -> Self {
        let mut effects = Effects::new();
        let _ = effects.push(Effect::RefreshIndicators);
        let _ = effects.push(Effect::RefreshDisplay);
        Self { next, effects }
    }

    /// Same transition, also transmitting `state`.
    fn sending(mut self, state: State) -> Self {
        // Sends go first so the frame leaves before the redraw.
        let _ = self.effects.insert(0, Effect::Send(state));
        self
    }
}

/// Why an event had no effect. The controller drops it silently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ignored {
    /// The event has no meaning in the current state
    /// (e.g. send pressed while Idle).
    NoEffect,
    /// A call arrived while the Responder was busy.
    NotIdle,
    /// The event is not part of this role's table
    /// (e.g. a Responder-only button on the Caller).
    Unsupported,
}

/// Pure transition function.
pub fn step(
    role: Role,
    policy: &Policy,
    current: Snapshot,
    event: Event,
) -> Result<Transition, Ignored> {
    match role {
        Role::Caller => caller::step(policy, current, event),
        Role::Responder => responder::step(policy, current, event),
    }
}

/// Idle-timeout handling shared by both roles.
fn timeout(policy: &Policy, current: Snapshot) -> Result<Transition, Ignored> {
    if current == Snapshot::IDLE {
        return Err(Ignored::NoEffect);
    }
    let t = Transition::to(Snapshot::IDLE);
    Ok(if policy.announce_timeout {
        t.sending(State::Idle)
    } else {
        t
    })
}

/// An `Idle` frame from the peer. It only means something when both ends
/// announce their timeouts, and it is never echoed.
fn peer_idle(policy: &Policy, current: Snapshot) -> Result<Transition, Ignored> {
    if !policy.announce_timeout || current == Snapshot::IDLE {
        return Err(Ignored::NoEffect);
    }
    Ok(Transition::to(Snapshot::IDLE))
}

/// A committed transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Applied {
    pub effects: Effects,
    /// `None` when only the cursor moved or the state was re-asserted.
    pub change: Option<StateChangeEvent>,
}

/// Context object owning the device's single authoritative snapshot.
#[derive(Clone, Debug)]
pub struct Machine {
    role: Role,
    policy: Policy,
    snapshot: Snapshot,
}

impl Machine {
    /// Boot state: Idle.
    pub const fn new(role: Role, policy: Policy) -> Self {
        Self {
            role,
            policy,
            snapshot: Snapshot::IDLE,
        }
    }

    /// Run `event` through the table and commit the result.
    pub fn apply(&mut self, event: Event, now_ms: u64) -> Result<Applied, Ignored> {
        let transition = step(self.role, &self.policy, self.snapshot, event)?;
        let from = self.snapshot.state;
        self.snapshot = transition.next;

        let change = (from != transition.next.state).then_some(StateChangeEvent {
            origin: event.origin(),
            from,
            to: transition.next.state,
            at_ms: now_ms,
        });

        Ok(Applied {
            effects: transition.effects,
            change,
        })
    }

    /// Back to Idle, as at boot.
    pub fn reset(&mut self) {
        self.snapshot = Snapshot::IDLE;
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> State {
        self.snapshot.state
    }

    pub fn cursor(&self) -> Option<MenuCursor> {
        self.snapshot.cursor
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot
    }

    /// Menu line to mark on the display, if any.
    pub fn highlight(&self) -> Option<u8> {
        match self.snapshot.state {
            State::MenuInteracting => self.snapshot.cursor.map(MenuCursor::index),
            s if s.is_response() => Some(s.code()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: Policy = Policy {
        after_send: AfterSend::ChosenOption,
        announce_timeout: false,
    };

    fn sends(t: &Transition) -> Vec<State> {
        t.effects
            .iter()
            .filter_map(|e| match e {
                Effect::Send(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn timeout_returns_every_role_and_state_to_idle() {
        for role in [Role::Caller, Role::Responder] {
            for state in State::ALL.into_iter().filter(|s| *s != State::Idle) {
                let current = if state == State::MenuInteracting {
                    Snapshot::menu(MenuCursor::FIRST)
                } else {
                    Snapshot::at(state)
                };
                let t = step(role, &DEFAULT, current, Event::IdleTimeout).unwrap();
                assert_eq!(t.next, Snapshot::IDLE);
                assert!(sends(&t).is_empty());
            }
        }
    }

    #[test]
    fn timeout_while_idle_is_a_noop() {
        assert_eq!(
            step(Role::Responder, &DEFAULT, Snapshot::IDLE, Event::IdleTimeout),
            Err(Ignored::NoEffect)
        );
    }

    #[test]
    fn timeout_announcement_is_opt_in() {
        let policy = Policy {
            announce_timeout: true,
            ..DEFAULT
        };
        let t = step(
            Role::Caller,
            &policy,
            Snapshot::at(State::Active),
            Event::IdleTimeout,
        )
        .unwrap();
        assert_eq!(sends(&t), vec![State::Idle]);
    }

    #[test]
    fn announced_timeout_brings_the_peer_back_without_an_echo() {
        let policy = Policy {
            announce_timeout: true,
            ..DEFAULT
        };
        for (role, state) in [
            (Role::Caller, State::CallAlert),
            (Role::Caller, State::Reserved),
            (Role::Responder, State::Waiting),
            (Role::Responder, State::CallAlert),
        ] {
            let t = step(role, &policy, Snapshot::at(state), Event::Message(State::Idle)).unwrap();
            assert_eq!(t.next, Snapshot::IDLE);
            assert!(sends(&t).is_empty());
            assert!(t.effects.contains(&Effect::RefreshIndicators));

            assert_eq!(
                step(role, &DEFAULT, Snapshot::at(state), Event::Message(State::Idle)),
                Err(Ignored::NoEffect)
            );
        }
    }

    #[test]
    fn machine_reports_state_changes_with_origin() {
        let mut m = Machine::new(Role::Caller, DEFAULT);
        let applied = m.apply(Event::Press(ButtonId::Call), 1_000).unwrap();
        assert_eq!(
            applied.change,
            Some(StateChangeEvent {
                origin: Origin::Local,
                from: State::Idle,
                to: State::CallAlert,
                at_ms: 1_000,
            })
        );
        assert_eq!(m.state(), State::CallAlert);
        assert_eq!(m.role(), Role::Caller);
    }

    #[test]
    fn cursor_moves_are_not_state_changes() {
        let mut m = Machine::new(Role::Responder, DEFAULT);
        m.apply(Event::Press(ButtonId::State), 0).unwrap();
        let applied = m.apply(Event::Press(ButtonId::State), 10).unwrap();
        assert_eq!(applied.change, None);
        assert_eq!(m.cursor().map(MenuCursor::index), Some(2));
        assert_eq!(m.highlight(), Some(2));
    }

    #[test]
    fn ignored_events_leave_the_snapshot_alone() {
        let mut m = Machine::new(Role::Responder, DEFAULT);
        assert_eq!(
            m.apply(Event::Press(ButtonId::Send), 0),
            Err(Ignored::NoEffect)
        );
        assert_eq!(m.snapshot(), Snapshot::IDLE);
    }

    #[test]
    fn highlight_follows_received_answers() {
        let mut m = Machine::new(Role::Responder, DEFAULT);
        m.apply(Event::Message(State::Reserved), 0).unwrap();
        assert_eq!(m.highlight(), Some(3));
        m.apply(Event::IdleTimeout, 1).unwrap();
        assert_eq!(m.highlight(), None);
    }

    #[test]
    fn reset_restores_boot_state() {
        let mut m = Machine::new(Role::Responder, DEFAULT);
        m.apply(Event::Message(State::CallAlert), 0).unwrap();
        m.reset();
        assert_eq!(m.snapshot(), Snapshot::IDLE);
    }
}
