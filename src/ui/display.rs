//! SSD1306 OLED display wrapper.

use defmt::warn;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyleBuilder;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;
use ringlink::error::Error;
use ringlink::ports::Display;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

/// Type alias for the concrete display driver.
///
/// Generic over the I²C implementation so callers pass in their HAL's
/// I²C peripheral.
pub type Driver<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// Vertical distance between menu lines (px).
const LINE_PITCH: i32 = 14;

/// The Responder's menu screen.
pub struct OledDisplay<I2C> {
    driver: Driver<I2C>,
}

impl<I2C> OledDisplay<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Initialise the SSD1306 and clear the screen.
    pub fn new(i2c: I2C) -> Self {
        let interface = I2CDisplayInterface::new(i2c);
        let mut driver = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        if driver.init().is_err() {
            warn!("{}", Error::Display);
        }
        driver.clear_buffer();
        let _ = driver.flush();
        Self { driver }
    }
}

fn text_style() -> embedded_graphics::mono_font::MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .build()
}

impl<I2C> Display for OledDisplay<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn render(&mut self, items: &[&str], highlight: Option<u8>) {
        self.driver.clear_buffer();

        for (row, item) in items.iter().enumerate() {
            let marker = if highlight == Some(row as u8) { ">" } else { " " };
            let mut line: heapless::String<24> = heapless::String::new();
            let _ = line.push_str(marker);
            let _ = line.push_str(" ");
            let _ = line.push_str(item);
            let y = 10 + row as i32 * LINE_PITCH;
            let _ = Text::new(line.as_str(), Point::new(0, y), text_style()).draw(&mut self.driver);
        }

        if self.driver.flush().is_err() {
            warn!("{}", Error::Display);
        }
    }

    fn set_power_save(&mut self, enabled: bool) {
        if self.driver.set_display_on(!enabled).is_err() {
            warn!("{}", Error::Display);
        }
    }
}
