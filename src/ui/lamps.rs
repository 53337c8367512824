//! Lamp outputs.

use embassy_nrf::gpio::{AnyPin, Level, Output, OutputDrive};
use ringlink::indicator::Lamps;
use ringlink::ports::IndicatorPanel;

/// Two or three active-high LEDs.
pub struct GpioLamps {
    a: Output<'static>,
    b: Output<'static>,
    /// `None` on two-lamp boards, which show C as A+B.
    c: Option<Output<'static>>,
}

impl GpioLamps {
    pub fn new(a: AnyPin, b: AnyPin, c: Option<AnyPin>) -> Self {
        let out = |pin: AnyPin| Output::new(pin, Level::Low, OutputDrive::Standard);
        Self {
            a: out(a),
            b: out(b),
            c: c.map(out),
        }
    }
}

fn drive(pin: &mut Output<'static>, on: bool) {
    if on {
        pin.set_high();
    } else {
        pin.set_low();
    }
}

impl IndicatorPanel for GpioLamps {
    fn set_lamps(&mut self, lamps: Lamps) {
        match self.c.as_mut() {
            Some(c) => {
                drive(&mut self.a, lamps.a);
                drive(&mut self.b, lamps.b);
                drive(c, lamps.c);
            }
            None => {
                drive(&mut self.a, lamps.a || lamps.c);
                drive(&mut self.b, lamps.b || lamps.c);
            }
        }
    }
}
