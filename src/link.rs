//! Link transport - bounded-retry send and validated receive.
//!
//! Sending is timer-driven rather than a blocking loop: [`Transmitter`]
//! keeps at most one frame in flight and makes one attempt per
//! [`Transmitter::service`] call once it is due. A failing link therefore
//! never stalls button handling, and the total effort per frame is capped
//! at `max_attempts` attempts over `(max_attempts - 1) * retry_delay_ms`.
//!
//! The local state change that caused a send is committed before the
//! first attempt. If every attempt fails the two devices may disagree
//! until the next frame gets through; the failure is reported, not hidden.

use crate::ports::Radio;
use crate::protocol::wire::{self, DecodeError, Frame, WireFormat};
use crate::protocol::State;

/// Attempt ceiling and spacing for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryPolicy {
    pub max_attempts: u8,
    pub retry_delay_ms: u64,
}

impl RetryPolicy {
    /// Time from the first to the last attempt.
    pub const fn worst_case_ms(&self) -> u64 {
        self.retry_delay_ms * (self.max_attempts.saturating_sub(1) as u64)
    }
}

/// Final result of one submitted frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendOutcome {
    Delivered { state: State, attempts: u8 },
    /// Every attempt failed (SendFailure).
    Failed { state: State, attempts: u8 },
    /// A newer frame replaced this one before it got out.
    Superseded { state: State, attempts: u8 },
}

#[derive(Clone, Debug)]
struct Pending {
    state: State,
    frame: Frame,
    attempts: u8,
    due_ms: u64,
}

/// Single-slot retrying sender.
#[derive(Clone, Debug)]
pub struct Transmitter {
    format: WireFormat,
    policy: RetryPolicy,
    pending: Option<Pending>,
}

impl Transmitter {
    pub const fn new(format: WireFormat, policy: RetryPolicy) -> Self {
        Self {
            format,
            policy,
            pending: None,
        }
    }

    /// Queue `state` for immediate transmission.
    ///
    /// Only the latest state matters to the peer, so an unfinished frame
    /// is dropped in favour of the new one and reported as superseded.
    pub fn submit(&mut self, state: State, now_ms: u64) -> Option<SendOutcome> {
        let replaced = self.pending.take().map(|p| SendOutcome::Superseded {
            state: p.state,
            attempts: p.attempts,
        });
        self.pending = Some(Pending {
            state,
            frame: wire::encode_frame(self.format, state),
            attempts: 0,
            due_ms: now_ms,
        });
        replaced
    }

    /// Make at most one attempt if one is due.
    pub fn service<R: Radio + ?Sized>(&mut self, radio: &mut R, now_ms: u64) -> Option<SendOutcome> {
        let pending = self.pending.as_mut()?;
        if now_ms < pending.due_ms {
            return None;
        }

        pending.attempts += 1;
        let attempts = pending.attempts;
        let state = pending.state;

        match radio.send(&pending.frame) {
            Ok(()) => {
                self.pending = None;
                Some(SendOutcome::Delivered { state, attempts })
            }
            Err(_) if attempts >= self.policy.max_attempts => {
                self.pending = None;
                Some(SendOutcome::Failed { state, attempts })
            }
            Err(_) => {
                pending.due_ms = now_ms + self.policy.retry_delay_ms;
                None
            }
        }
    }

    /// `true` while a frame is waiting for its next attempt.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// State of the frame in flight.
    pub fn pending_state(&self) -> Option<State> {
        self.pending.as_ref().map(|p| p.state)
    }
}

/// Validate and decode inbound bytes.
pub fn receive(format: WireFormat, data: &[u8]) -> Result<State, DecodeError> {
    wire::decode(format, data)
}

/// Drops repeats of the same frame inside one advertisement burst.
#[derive(Clone, Debug)]
pub struct DuplicateFilter {
    window_ms: u64,
    last: Option<(Frame, u64)>,
}

impl DuplicateFilter {
    pub const fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last: None,
        }
    }

    /// `true` if `frame` is new and should be processed.
    pub fn accept(&mut self, frame: &[u8], now_ms: u64) -> bool {
        if let Some((last, seen_ms)) = &self.last {
            if last.as_slice() == frame && now_ms.saturating_sub(*seen_ms) < self.window_ms {
                return false;
            }
        }
        // Oversized frames are kept as their prefix; they fail decoding anyway.
        let keep = &frame[..frame.len().min(wire::MAX_FRAME_LEN)];
        self.last = Frame::from_slice(keep).ok().map(|f| (f, now_ms));
        true
    }
}
