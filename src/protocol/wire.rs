//! State frame codec.
//!
//! Two encodings exist in deployed pairs:
//! ```text
//! Compact (1 byte):  Byte 0: state code (0..=5)
//! Legacy  (5 bytes): Byte 0: wake flag (0 or 1)
//!                    Byte 1-4: state as little-endian i32
//! ```
//! There is no sequence number and no checksum. A pair must agree on one
//! format; frames of the other length are rejected as malformed.

use super::State;

/// Compact frame size in bytes.
pub const COMPACT_FRAME_SIZE: usize = 1;

/// Legacy wake/state record size in bytes.
pub const LEGACY_FRAME_SIZE: usize = 5;

/// Largest frame of either format.
pub const MAX_FRAME_LEN: usize = LEGACY_FRAME_SIZE;

/// Owned frame bytes as they travel over the link.
pub type Frame = heapless::Vec<u8, MAX_FRAME_LEN>;

/// Encoding used by a deployed pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WireFormat {
    #[default]
    Compact,
    Legacy,
}

impl WireFormat {
    pub const fn frame_len(self) -> usize {
        match self {
            WireFormat::Compact => COMPACT_FRAME_SIZE,
            WireFormat::Legacy => LEGACY_FRAME_SIZE,
        }
    }
}

/// Why an inbound frame was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Payload length does not match the pair's format.
    WrongLength { expected: usize, actual: usize },
    /// State code outside `0..=5`.
    OutOfRange(i32),
    /// Legacy record with the wake flag cleared, or a flag byte other than 0/1.
    Asleep,
}

/// Serialise `state` into `buf`. Returns the number of bytes written,
/// or 0 when `buf` is too small.
pub fn encode(format: WireFormat, state: State, buf: &mut [u8]) -> usize {
    let len = format.frame_len();
    if buf.len() < len {
        return 0;
    }
    match format {
        WireFormat::Compact => buf[0] = state.code(),
        WireFormat::Legacy => {
            buf[0] = 1;
            buf[1..5].copy_from_slice(&i32::from(state.code()).to_le_bytes());
        }
    }
    len
}

/// Encode into an owned [`Frame`].
pub fn encode_frame(format: WireFormat, state: State) -> Frame {
    let mut raw = [0u8; MAX_FRAME_LEN];
    let len = encode(format, state, &mut raw);
    // `len` never exceeds MAX_FRAME_LEN, so this cannot fail.
    Frame::from_slice(&raw[..len]).unwrap_or_default()
}

/// Validate and decode one inbound frame.
pub fn decode(format: WireFormat, data: &[u8]) -> Result<State, DecodeError> {
    let expected = format.frame_len();
    if data.len() != expected {
        return Err(DecodeError::WrongLength {
            expected,
            actual: data.len(),
        });
    }

    let raw = match format {
        WireFormat::Compact => i32::from(data[0]),
        WireFormat::Legacy => {
            if data[0] != 1 {
                return Err(DecodeError::Asleep);
            }
            i32::from_le_bytes([data[1], data[2], data[3], data[4]])
        }
    };

    u8::try_from(raw)
        .ok()
        .and_then(State::from_code)
        .ok_or(DecodeError::OutOfRange(raw))
}
