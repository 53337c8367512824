//! GPIO button lines.
//!
//! Buttons are active-low with internal pull-ups. The control loop reads
//! raw levels every iteration and debounces them itself, so nothing here
//! waits on edges.

use embassy_nrf::gpio::{AnyPin, Input, Pull};
use ringlink::input::ButtonId;
use ringlink::ports::Buttons;

/// The buttons wired on this board.
pub struct GpioButtons<const N: usize> {
    lines: [(ButtonId, Input<'static>); N],
}

impl<const N: usize> GpioButtons<N> {
    pub fn new(pins: [(ButtonId, AnyPin); N]) -> Self {
        Self {
            lines: pins.map(|(id, pin)| (id, Input::new(pin, Pull::Up))),
        }
    }
}

impl<const N: usize> Buttons for GpioButtons<N> {
    fn read_raw(&mut self, id: ButtonId) -> bool {
        // A button that is not wired reads as released.
        self.lines
            .iter()
            .find(|(line, _)| *line == id)
            .map_or(true, |(_, input)| input.is_high())
    }
}
