//! Board-side user interface - buttons, lamps and the Responder's OLED.
//!
//! ## Components
//!
//! - **Buttons**: active-low tactile switches with internal pull-ups,
//!   sampled by the control loop (debouncing happens in the core)
//! - **Lamps**: two or three active-high LEDs
//! - **Display**: SSD1306 128×64 OLED via I²C (Responder only)

pub mod buttons;
#[cfg(feature = "responder")]
pub mod display;
pub mod lamps;
