//! Application-wide constants and compile-time configuration.
//!
//! Timing parameters, radio parameters, and addresses live here so they
//! can be tuned in one place. [`Settings`] bundles the run-time view of
//! the same values so tests can adjust them.

use crate::link::RetryPolicy;
use crate::machine::{AfterSend, Policy};
use crate::protocol::wire::WireFormat;
use crate::protocol::Role;

// Role

/// Role of this firmware image, chosen by the `responder` cargo feature.
#[cfg(feature = "responder")]
pub const ROLE: Role = Role::Responder;
#[cfg(not(feature = "responder"))]
pub const ROLE: Role = Role::Caller;

// Control loop

/// Sleep between two control-loop iterations (ms).
pub const LOOP_QUANTUM_MS: u64 = 10;

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

// Activity timer

/// Inactivity before a non-idle device falls back to Idle (ms).
/// CallAlert is exempt: a ringing call waits for the user.
pub const IDLE_TIMEOUT_MS: u64 = 20_000;

/// Inactivity while Idle before display and lamps are switched off (ms).
pub const POWER_SAVE_TIMEOUT_MS: u64 = 30_000;

// Lamps

/// Half-period of the call-alert blink (ms).
pub const BLINK_INTERVAL_MS: u64 = 500;

/// Duration of each step of the boot lamp sequence (ms).
pub const BOOT_STEP_MS: u64 = 500;

// Link

/// Delivery attempts per outbound state frame.
pub const SEND_MAX_ATTEMPTS: u8 = 3;

/// Delay between two delivery attempts (ms).
pub const SEND_RETRY_DELAY_MS: u64 = 100;

/// Identical frames seen within this window are one advertisement burst (ms).
pub const DUPLICATE_WINDOW_MS: u64 = 400;

/// Wire format shared by both boards of a pair.
pub const WIRE_FORMAT: WireFormat = WireFormat::Compact;

/// Where the Responder lands after sending an answer.
pub const AFTER_SEND: AfterSend = AfterSend::ChosenOption;

/// Tell the peer when the idle timeout forces this device back to Idle.
pub const ANNOUNCE_IDLE_TIMEOUT: bool = false;

// BLE broadcast

/// Company identifier in the manufacturer-specific AD structure.
/// 0xFFFF is reserved by the Bluetooth SIG for testing.
pub const BLE_COMPANY_ID: u16 = 0xFFFF;

/// Advertising interval (in 0.625 ms units). 32 = 20 ms, the minimum
/// for non-connectable advertising.
pub const BLE_ADV_INTERVAL: u32 = 32;

/// Advertising events per transmitted frame.
pub const BLE_ADV_BURST_EVENTS: u8 = 4;

/// Scan interval and window (in 0.625 ms units); equal values scan
/// continuously.
pub const BLE_SCAN_INTERVAL: u32 = 160;
pub const BLE_SCAN_WINDOW: u32 = 160;

/// Static random addresses of the pair (LSB first, as the SoftDevice
/// expects; the two top bits of the last byte are set for "static").
pub const CALLER_ADDRESS: [u8; 6] = [0x15, 0x7C, 0x2B, 0xD5, 0xD8, 0xC4];
pub const RESPONDER_ADDRESS: [u8; 6] = [0x25, 0xCE, 0xBC, 0xAB, 0xF4, 0xD8];

/// Own address for `role`.
pub const fn own_address(role: Role) -> [u8; 6] {
    match role {
        Role::Caller => CALLER_ADDRESS,
        Role::Responder => RESPONDER_ADDRESS,
    }
}

/// The single fixed peer for `role`.
pub const fn peer_address(role: Role) -> [u8; 6] {
    own_address(role.peer())
}

// GPIO pin assignments (nRF52840-DK defaults)
//
// Logical names only; the concrete `embassy_nrf::peripherals::*` are
// picked in `main.rs`.  Adjust for your custom PCB.
//
//   Caller:    Call button  → P0.11
//              Lamp A (red) → P0.13, Lamp B (yellow) → P0.14,
//              Lamp C (green) → P0.15
//   Responder: State button → P0.11, Send button → P0.12
//              Lamp A (green) → P0.13, Lamp B (red) → P0.14
//              I²C SDA → P0.26, I²C SCL → P0.27 (SSD1306)

/// Activity timer durations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    pub debounce_ms: u64,
    pub idle_timeout_ms: u64,
    pub power_save_timeout_ms: u64,
    pub blink_interval_ms: u64,
    pub duplicate_window_ms: u64,
}

impl Timing {
    pub const DEFAULT: Self = Self {
        debounce_ms: BUTTON_DEBOUNCE_MS,
        idle_timeout_ms: IDLE_TIMEOUT_MS,
        power_save_timeout_ms: POWER_SAVE_TIMEOUT_MS,
        blink_interval_ms: BLINK_INTERVAL_MS,
        duplicate_window_ms: DUPLICATE_WINDOW_MS,
    };
}

impl Default for Timing {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Everything a [`Controller`](crate::controller::Controller) needs to
/// know about its deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settings {
    pub role: Role,
    pub wire_format: WireFormat,
    pub timing: Timing,
    pub retry: RetryPolicy,
    pub policy: Policy,
}

impl Settings {
    /// Compile-time defaults for `role`.
    pub const fn for_role(role: Role) -> Self {
        Self {
            role,
            wire_format: WIRE_FORMAT,
            timing: Timing::DEFAULT,
            retry: RetryPolicy {
                max_attempts: SEND_MAX_ATTEMPTS,
                retry_delay_ms: SEND_RETRY_DELAY_MS,
            },
            policy: Policy {
                after_send: AFTER_SEND,
                announce_timeout: ANNOUNCE_IDLE_TIMEOUT,
            },
        }
    }
}
