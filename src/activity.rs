//! Inactivity tracking: auto-return to Idle and power-save.
//!
//! Both checks run on every loop iteration against monotonic elapsed
//! time; nothing is scheduled. Power-save only switches outputs off and
//! never alters the state.

use crate::config::Timing;
use crate::protocol::State;

/// Last activity plus the two configured timeouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivityClock {
    pub last_activity_ms: u64,
    pub idle_timeout_ms: u64,
    pub power_save_timeout_ms: u64,
}

impl ActivityClock {
    pub fn elapsed(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_activity_ms)
    }
}

/// A timeout that fired during [`ActivityTimer::poll`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Expiry {
    /// Force the machine back to Idle.
    IdleTimeout,
    /// Switch display and lamps off.
    PowerSave,
}

/// Tracks activity and decides when the timeouts fire.
#[derive(Clone, Debug)]
pub struct ActivityTimer {
    clock: ActivityClock,
    power_save: bool,
}

impl ActivityTimer {
    pub fn new(timing: &Timing, now_ms: u64) -> Self {
        Self {
            clock: ActivityClock {
                last_activity_ms: now_ms,
                idle_timeout_ms: timing.idle_timeout_ms,
                power_save_timeout_ms: timing.power_save_timeout_ms,
            },
            power_save: false,
        }
    }

    /// Record activity (transition, press, inbound or outbound frame).
    ///
    /// Returns `true` if this woke the device from power-save.
    pub fn touch(&mut self, now_ms: u64) -> bool {
        self.clock.last_activity_ms = now_ms;
        core::mem::replace(&mut self.power_save, false)
    }

    /// Evaluate both timeouts for the current state.
    pub fn poll(&mut self, state: State, now_ms: u64) -> Option<Expiry> {
        let elapsed = self.clock.elapsed(now_ms);
        match state {
            // A ringing call waits for the user.
            State::CallAlert => None,
            State::Idle => {
                if !self.power_save && elapsed >= self.clock.power_save_timeout_ms {
                    self.power_save = true;
                    Some(Expiry::PowerSave)
                } else {
                    None
                }
            }
            State::Waiting | State::Active | State::Reserved | State::MenuInteracting => {
                (elapsed >= self.clock.idle_timeout_ms).then_some(Expiry::IdleTimeout)
            }
        }
    }

    pub fn in_power_save(&self) -> bool {
        self.power_save
    }

    pub fn clock(&self) -> &ActivityClock {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer() -> ActivityTimer {
        ActivityTimer::new(
            &Timing {
                idle_timeout_ms: 1_000,
                power_save_timeout_ms: 5_000,
                ..Timing::DEFAULT
            },
            0,
        )
    }

    #[test]
    fn idle_timeout_fires_outside_idle_and_call() {
        for state in [State::Waiting, State::Active, State::Reserved, State::MenuInteracting] {
            let mut t = timer();
            assert_eq!(t.poll(state, 999), None);
            assert_eq!(t.poll(state, 1_000), Some(Expiry::IdleTimeout));
        }
    }

    #[test]
    fn call_alert_never_times_out() {
        let mut t = timer();
        assert_eq!(t.poll(State::CallAlert, 1_000_000), None);
        assert!(!t.in_power_save());
    }

    #[test]
    fn touch_restarts_the_clock() {
        let mut t = timer();
        t.touch(800);
        assert_eq!(t.poll(State::Active, 1_500), None);
        assert_eq!(t.poll(State::Active, 1_800), Some(Expiry::IdleTimeout));
        assert_eq!(t.clock().elapsed(1_800), 1_000);
    }

    #[test]
    fn power_save_fires_once_while_idle() {
        let mut t = timer();
        assert_eq!(t.poll(State::Idle, 4_999), None);
        assert_eq!(t.poll(State::Idle, 5_000), Some(Expiry::PowerSave));
        assert!(t.in_power_save());
        assert_eq!(t.poll(State::Idle, 6_000), None);
        assert_eq!(t.poll(State::Idle, 60_000), None);
    }

    #[test]
    fn idle_never_triggers_idle_timeout() {
        let mut t = timer();
        assert_eq!(t.poll(State::Idle, 2_000), None);
    }

    #[test]
    fn touch_wakes_from_power_save() {
        let mut t = timer();
        t.poll(State::Idle, 5_000);
        assert!(t.touch(5_100));
        assert!(!t.in_power_save());
        assert!(!t.touch(5_200));
        assert_eq!(t.poll(State::Idle, 10_199), None);
        assert_eq!(t.poll(State::Idle, 10_200), Some(Expiry::PowerSave));
    }
}
