//! Caller transition table.

use super::{peer_idle, timeout, Event, Ignored, Policy, Snapshot, Transition};
use crate::input::ButtonId;
use crate::protocol::State;

pub(super) fn step(policy: &Policy, current: Snapshot, event: Event) -> Result<Transition, Ignored> {
    match (current.state, event) {
        (_, Event::IdleTimeout) => timeout(policy, current),

        (State::Idle, Event::Press(ButtonId::Call)) => {
            Ok(Transition::to(Snapshot::at(State::CallAlert)).sending(State::CallAlert))
        }
        (
            State::Waiting
            | State::Active
            | State::Reserved
            | State::CallAlert
            | State::MenuInteracting,
            Event::Press(ButtonId::Call),
        ) => Err(Ignored::NoEffect),
        (_, Event::Press(ButtonId::State | ButtonId::Send)) => Err(Ignored::Unsupported),

        // The answer is shown, never echoed back.
        (State::CallAlert, Event::Message(answer)) if answer.is_response() => {
            Ok(Transition::to(Snapshot::at(answer)))
        }
        (_, Event::Message(State::Idle)) => peer_idle(policy, current),
        (
            State::Idle
            | State::Waiting
            | State::Active
            | State::Reserved
            | State::CallAlert
            | State::MenuInteracting,
            Event::Message(_),
        ) => Err(Ignored::NoEffect),
    }
}
