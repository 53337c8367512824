//! ringlink firmware entry point.
//!
//! One image per role: build with `--features embedded` for the Caller,
//! `--features embedded,responder` for the Responder.
//!
//! Start-up plays the boot lamp sequence, brings up the SoftDevice and the
//! two radio tasks, then hands everything to the [`Controller`] and ticks
//! it every `LOOP_QUANTUM_MS`. A radio that fails to come up leaves the
//! board running local-only.

#![no_std]
#![no_main]

mod ble;
mod ui;

use defmt::{debug, error, info, warn};
use embassy_executor::Spawner;
use embassy_nrf::gpio::Pin as _;
use embassy_nrf::interrupt::Priority;
use embassy_time::{Duration, Instant, Timer};
use nrf_softdevice::{raw, Softdevice};
use ringlink::config::{BOOT_STEP_MS, LOOP_QUANTUM_MS, ROLE};
use ringlink::controller::{Controller, Diagnostic};
use ringlink::error::{Error, RadioInitError};
use ringlink::indicator::BootSequence;
use ringlink::input::ButtonId;
use ringlink::ports::IndicatorPanel;
use ringlink::Settings;
use ui::buttons::GpioButtons;
use ui::lamps::GpioLamps;
use {defmt_rtt as _, panic_probe as _};

#[cfg(feature = "responder")]
embassy_nrf::bind_interrupts!(struct Irqs {
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 =>
        embassy_nrf::twim::InterruptHandler<embassy_nrf::peripherals::TWISPI0>;
});

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 0,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        ..Default::default()
    }
}

/// Bring up the SoftDevice and the radio tasks.
///
/// Only task spawning failures come back as `Err`. `Softdevice::enable`
/// panics on its own if the SoftDevice rejects the configuration, so that
/// case never reaches the local-only fallback.
fn start_radio(spawner: &Spawner) -> Result<ble::BleRadio, RadioInitError> {
    let sd: &'static Softdevice = Softdevice::enable(&softdevice_config());
    spawner
        .spawn(softdevice_task(sd))
        .map_err(|_| RadioInitError::Spawn)?;
    ble::start(spawner, sd, ROLE)
}

fn report(diagnostic: &Diagnostic) {
    if let Some(fault) = diagnostic.fault() {
        warn!("{}", fault);
        return;
    }
    match diagnostic {
        Diagnostic::StateChanged(change) => {
            info!("state {} -> {} ({})", change.from, change.to, change.origin)
        }
        Diagnostic::PowerSave(true) => info!("power-save: outputs off"),
        Diagnostic::PowerSave(false) => info!("power-save: outputs on"),
        Diagnostic::Send(outcome) => debug!("send: {}", outcome),
        Diagnostic::Ignored { event, reason } => debug!("ignored {} ({})", event, reason),
        Diagnostic::Malformed(_) => {}
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let mut nrf_config = embassy_nrf::config::Config::default();
    // Priorities 0, 1 and 4 belong to the SoftDevice.
    nrf_config.gpiote_interrupt_priority = Priority::P2;
    nrf_config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(nrf_config);

    info!("ringlink starting as {}", ROLE);

    #[cfg(not(feature = "responder"))]
    let (buttons, display, mut lamps) = (
        GpioButtons::new([(ButtonId::Call, p.P0_11.degrade())]),
        ringlink::ports::NoDisplay,
        GpioLamps::new(
            p.P0_13.degrade(),
            p.P0_14.degrade(),
            Some(p.P0_15.degrade()),
        ),
    );

    #[cfg(feature = "responder")]
    let (buttons, display, mut lamps) = {
        let i2c = embassy_nrf::twim::Twim::new(
            p.TWISPI0,
            Irqs,
            p.P0_26,
            p.P0_27,
            embassy_nrf::twim::Config::default(),
        );
        (
            GpioButtons::new([
                (ButtonId::State, p.P0_11.degrade()),
                (ButtonId::Send, p.P0_12.degrade()),
            ]),
            ui::display::OledDisplay::new(i2c),
            GpioLamps::new(p.P0_13.degrade(), p.P0_14.degrade(), None),
        )
    };

    for (levels, hold_ms) in BootSequence::new(BOOT_STEP_MS) {
        lamps.set_lamps(levels);
        Timer::after(Duration::from_millis(hold_ms)).await;
    }

    let radio = match start_radio(&spawner) {
        Ok(radio) => Some(radio),
        Err(e) => {
            error!("{}; running local-only", Error::from(e));
            None
        }
    };

    let mut controller = Controller::new(
        Settings::for_role(ROLE),
        buttons,
        display,
        lamps,
        radio,
        Instant::now().as_millis(),
    );
    controller.boot(Instant::now().as_millis());
    info!("ready in {}", controller.state());

    loop {
        for diagnostic in controller.tick(Instant::now().as_millis()) {
            report(&diagnostic);
        }
        Timer::after(Duration::from_millis(LOOP_QUANTUM_MS)).await;
    }
}
