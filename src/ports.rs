//! Seams to the hardware the core drives but does not own.
//!
//! The embedded binary implements these with GPIO, the SSD1306 and the
//! SoftDevice; tests implement them with plain structs.

use crate::error::RadioError;
use crate::indicator::Lamps;
use crate::input::ButtonId;
use crate::protocol::wire::Frame;

/// Raw button lines.
pub trait Buttons {
    /// Current line level, `true` = high (released).
    fn read_raw(&mut self, id: ButtonId) -> bool;
}

/// Menu screen.
pub trait Display {
    /// Draw `items` (title first) and mark line `highlight`, if any.
    fn render(&mut self, items: &[&str], highlight: Option<u8>);
    fn set_power_save(&mut self, enabled: bool);
}

/// Lamp outputs.
pub trait IndicatorPanel {
    fn set_lamps(&mut self, lamps: Lamps);
}

/// Broadcast link to the single fixed peer.
pub trait Radio {
    /// Hand one frame to the radio. `Ok` means the stack accepted it.
    fn send(&mut self, frame: &[u8]) -> Result<(), RadioError>;
    /// Next frame received from the peer, if any.
    fn receive(&mut self) -> Option<Frame>;
}

/// A radio that never came up behaves as permanently offline.
impl<R: Radio> Radio for Option<R> {
    fn send(&mut self, frame: &[u8]) -> Result<(), RadioError> {
        match self {
            Some(radio) => radio.send(frame),
            None => Err(RadioError::Offline),
        }
    }

    fn receive(&mut self) -> Option<Frame> {
        self.as_mut().and_then(|radio| radio.receive())
    }
}

/// Boards without a screen (the Caller).
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDisplay;

impl Display for NoDisplay {
    fn render(&mut self, _items: &[&str], _highlight: Option<u8>) {}
    fn set_power_save(&mut self, _enabled: bool) {}
}
