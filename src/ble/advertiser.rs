//! Puts outbound state frames on air.
//!
//! Each frame becomes one burst of `BLE_ADV_BURST_EVENTS` non-connectable,
//! non-scannable advertisements. The SoftDevice reports the end of a burst
//! as a timeout, which is the normal outcome here.

use crate::ble::adv_parser::{build_advertisement, MAX_ADV_LEN};
use crate::ble::OUTBOUND;
use defmt::{debug, warn};
use nrf_softdevice::ble::peripheral::{self, AdvertiseError, NonconnectableAdvertisement};
use nrf_softdevice::Softdevice;
use ringlink::config::{BLE_ADV_BURST_EVENTS, BLE_ADV_INTERVAL, BLE_COMPANY_ID};

#[embassy_executor::task]
pub async fn advertise_task(sd: &'static Softdevice) -> ! {
    let config = peripheral::Config {
        interval: BLE_ADV_INTERVAL,
        max_events: Some(BLE_ADV_BURST_EVENTS),
        ..Default::default()
    };
    let mut buf = [0u8; MAX_ADV_LEN];

    loop {
        let frame = OUTBOUND.receive().await;

        let len = build_advertisement(BLE_COMPANY_ID, &frame, &mut buf);
        if len == 0 {
            warn!("frame of {} bytes does not fit an advertisement", frame.len());
            continue;
        }

        let adv = NonconnectableAdvertisement::NonscannableUndirected {
            adv_data: &buf[..len],
        };
        match peripheral::advertise(sd, adv, &config).await {
            Ok(()) | Err(AdvertiseError::Timeout) => debug!("burst sent: {=[u8]:x}", &frame[..]),
            Err(_e) => warn!("advertising failed"),
        }
    }
}
