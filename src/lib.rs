//! Host-testable core of ringlink.
//!
//! Everything that decides behaviour lives here and builds without any
//! embedded hardware: the state machine, wire codec, debouncer, activity
//! timer, retrying transmitter, lamp animation and the control loop that
//! ties them together over the traits in [`ports`].
//!
//! Usage: `cargo test --lib`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and implements the ports with GPIO, the SSD1306 and the SoftDevice.

#![cfg_attr(not(test), no_std)]

pub mod activity;
pub mod config;
pub mod controller;
pub mod error;
pub mod indicator;
pub mod input;
pub mod link;
pub mod machine;
pub mod ports;
pub mod protocol;

// ═══════════════════════════════════════════════════════════════════════════
// Pure helpers shared with the embedded binary
// ═══════════════════════════════════════════════════════════════════════════

#[path = "ble/adv_parser.rs"]
mod ble_adv_parser_impl;
#[path = "ui/input_logic.rs"]
mod ui_input_logic_impl;

pub mod ble {
    pub mod adv_parser {
        pub use crate::ble_adv_parser_impl::{
            build_advertisement, manufacturer_payload, MAX_ADV_LEN, MAX_FRAME_IN_ADV,
        };
    }
}

pub mod ui {
    pub mod input_logic {
        pub use crate::ui_input_logic_impl::{MenuCursor, MENU_ITEMS, OPTION_COUNT};
    }
}

pub use config::Settings;
pub use controller::{Controller, Diagnostic};
pub use error::Error;
pub use protocol::{Role, State};

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════
