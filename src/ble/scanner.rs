//! BLE GAP scanner - listens for the peer's state frames.
//!
//! Uses the SoftDevice Central-role scanning API with a whitelist holding
//! only the peer's address, so advertisements from any other device never
//! reach the callback. The scan runs for the lifetime of the firmware.

use crate::ble::adv_parser::manufacturer_payload;
use crate::ble::INBOUND;
use defmt::{info, warn};
use embassy_time::{Duration, Timer};
use nrf_softdevice::ble::{central, Address};
use nrf_softdevice::Softdevice;
use ringlink::config::{BLE_COMPANY_ID, BLE_SCAN_INTERVAL, BLE_SCAN_WINDOW};
use ringlink::protocol::wire::Frame;

/// Pause before restarting a scan the SoftDevice ended.
const SCAN_RESTART_MS: u64 = 100;

#[embassy_executor::task]
pub async fn scan_task(sd: &'static Softdevice, peer: Address) -> ! {
    let whitelist = [&peer];
    let config = central::ScanConfig {
        whitelist: Some(&whitelist),
        // Passive: the payload is in the advertisement itself.
        active: false,
        interval: BLE_SCAN_INTERVAL,
        window: BLE_SCAN_WINDOW,
        ..Default::default()
    };

    info!("BLE scan starting (peer {})", peer);

    loop {
        let scan_result = central::scan(sd, &config, |params| {
            let data = unsafe {
                core::slice::from_raw_parts(params.data.p_data, params.data.len as usize)
            };

            if let Some(payload) = manufacturer_payload(data, BLE_COMPANY_ID) {
                match Frame::from_slice(payload) {
                    Ok(frame) => {
                        if INBOUND.try_send(frame).is_err() {
                            warn!("inbound queue full, frame dropped");
                        }
                    }
                    Err(()) => warn!("oversized payload ({} bytes) dropped", payload.len()),
                }
            }

            // Never stop on our own.
            None::<()>
        })
        .await;

        if let Err(_e) = scan_result {
            warn!("BLE scan ended with error, restarting");
        }
        Timer::after(Duration::from_millis(SCAN_RESTART_MS)).await;
    }
}
