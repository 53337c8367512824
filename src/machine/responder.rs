//! Responder transition table.

use super::{peer_idle, timeout, AfterSend, Event, Ignored, Policy, Snapshot, Transition};
use crate::input::ButtonId;
use crate::protocol::State;
use crate::ui::input_logic::MenuCursor;

pub(super) fn step(policy: &Policy, current: Snapshot, event: Event) -> Result<Transition, Ignored> {
    match event {
        Event::IdleTimeout => timeout(policy, current),
        Event::Press(button) => press(policy, current, button),
        Event::Message(code) => message(policy, current, code),
    }
}

fn press(policy: &Policy, current: Snapshot, button: ButtonId) -> Result<Transition, Ignored> {
    match (current.state, current.cursor, button) {
        (_, _, ButtonId::Call) => Err(Ignored::Unsupported),

        (State::Idle | State::CallAlert, _, ButtonId::State) => {
            Ok(Transition::to(Snapshot::menu(MenuCursor::FIRST)).sending(State::MenuInteracting))
        }
        (State::MenuInteracting, Some(cursor), ButtonId::State) => {
            Ok(Transition::to(Snapshot::menu(cursor.advance())))
        }
        (State::MenuInteracting, Some(cursor), ButtonId::Send) => {
            // Cursor is always 1..=3, so this is always an answer state.
            let answer = State::from_option(cursor.index()).ok_or(Ignored::NoEffect)?;
            let next = match policy.after_send {
                AfterSend::ChosenOption => Snapshot::at(answer),
                AfterSend::ResetToIdle => Snapshot::IDLE,
            };
            Ok(Transition::to(next).sending(answer))
        }
        // A menu without a cursor cannot be built through `Snapshot::menu`.
        (State::MenuInteracting, None, ButtonId::State | ButtonId::Send) => Err(Ignored::NoEffect),

        (State::Waiting | State::Active | State::Reserved, _, ButtonId::State) => {
            Err(Ignored::NoEffect)
        }
        (
            State::Idle | State::Waiting | State::Active | State::Reserved | State::CallAlert,
            _,
            ButtonId::Send,
        ) => Err(Ignored::NoEffect),
    }
}

fn message(policy: &Policy, current: Snapshot, code: State) -> Result<Transition, Ignored> {
    match (current.state, code) {
        (State::Idle, State::CallAlert) => Ok(Transition::to(Snapshot::at(State::CallAlert))),
        (_, State::CallAlert) => Err(Ignored::NotIdle),

        (_, State::Waiting | State::Active | State::Reserved) => {
            Ok(Transition::to(Snapshot::at(code)))
        }

        // Status query: answer with what we are showing.
        (State::Idle, State::MenuInteracting) => Err(Ignored::NoEffect),
        (
            State::Waiting
            | State::Active
            | State::Reserved
            | State::CallAlert
            | State::MenuInteracting,
            State::MenuInteracting,
        ) => Ok(Transition {
            next: current,
            effects: Default::default(),
        }
        .sending(current.state)),

        (_, State::Idle) => peer_idle(policy, current),
    }
}
