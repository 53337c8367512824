//! Bluetooth Low Energy broadcast link.
//!
//! The pair never connects. Each board drives the Nordic SoftDevice S140
//! in two roles at once:
//!
//! 1. **Scanner** - passive, continuous scan whitelisted to the peer's
//!    static address; state frames found in its advertisements are
//!    queued on [`INBOUND`].
//! 2. **Advertiser** - takes frames from [`OUTBOUND`] and puts each one
//!    on air as a short burst of non-connectable advertisements.
//!
//! [`BleRadio`] is the control loop's side of the two channels.

pub use ringlink::ble::adv_parser;

pub mod advertiser;
pub mod scanner;

use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use nrf_softdevice::ble::{set_address, Address, AddressType};
use nrf_softdevice::Softdevice;
use ringlink::config::{own_address, peer_address};
use ringlink::error::{RadioError, RadioInitError};
use ringlink::ports::Radio;
use ringlink::protocol::wire::Frame;
use ringlink::Role;

/// Frames received but not yet taken by the control loop.
pub const INBOUND_QUEUE_LEN: usize = 4;

pub static INBOUND: Channel<CriticalSectionRawMutex, Frame, INBOUND_QUEUE_LEN> = Channel::new();

/// One frame waits while the previous burst is on air.
pub static OUTBOUND: Channel<CriticalSectionRawMutex, Frame, 1> = Channel::new();

/// Static random address from raw bytes.
pub fn address(bytes: [u8; 6]) -> Address {
    Address::new(AddressType::RandomStatic, bytes)
}

/// Claim this board's address and start both radio tasks.
pub fn start(
    spawner: &Spawner,
    sd: &'static Softdevice,
    role: Role,
) -> Result<BleRadio, RadioInitError> {
    set_address(sd, &address(own_address(role)));

    spawner
        .spawn(scanner::scan_task(sd, address(peer_address(role))))
        .map_err(|_| RadioInitError::Spawn)?;
    spawner
        .spawn(advertiser::advertise_task(sd))
        .map_err(|_| RadioInitError::Spawn)?;

    Ok(BleRadio)
}

/// Non-blocking handle on the radio channels.
pub struct BleRadio;

impl Radio for BleRadio {
    fn send(&mut self, frame: &[u8]) -> Result<(), RadioError> {
        let frame = Frame::from_slice(frame).map_err(|_| RadioError::Rejected)?;
        OUTBOUND.try_send(frame).map_err(|_| RadioError::Busy)
    }

    fn receive(&mut self) -> Option<Frame> {
        INBOUND.try_receive().ok()
    }
}
