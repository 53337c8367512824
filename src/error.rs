//! Unified error type for ringlink.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (behind the `defmt` feature) for efficient
//! on-target logging.
//!
//! None of these end the program. Each is absorbed where it happens and
//! surfaced as a diagnostic at most.

use crate::protocol::wire::DecodeError;
use crate::protocol::State;

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The radio stack did not come up; the device runs local-only.
    RadioInit(RadioInitError),

    /// An inbound frame failed validation and was dropped.
    Malformed(DecodeError),

    /// Every delivery attempt for a frame failed. The local state stands.
    SendFailed { state: State, attempts: u8 },

    /// I²C transaction to the display failed.
    Display,
}

/// Why the radio stack could not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioInitError {
    /// A radio task could not be spawned.
    Spawn,
}

/// Failure of a single transmit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioError {
    /// No radio stack (initialisation failed).
    Offline,
    /// The previous frame is still on air.
    Busy,
    /// The stack rejected the frame.
    Rejected,
}

// Convenience conversions

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Error::Malformed(e)
    }
}

impl From<RadioInitError> for Error {
    fn from(e: RadioInitError) -> Self {
        Error::RadioInit(e)
    }
}
