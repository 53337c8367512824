//! One iteration of the device control loop.
//!
//! [`Controller`] owns the machine and every port, so all state mutations
//! go through [`Controller::tick`] on one execution context. Within a tick
//! the order is fixed:
//!
//! 1. sample buttons, feed press edges to the machine (local first),
//! 2. take at most one inbound frame and feed it to the machine,
//! 3. evaluate the activity timer,
//! 4. apply effects: transmit, redraw, advance the lamp animation.
//!
//! When a press and a frame land in the same tick, the press is applied
//! first and the frame is judged against the state the press produced.

use crate::activity::{ActivityTimer, Expiry};
use crate::config::Settings;
use crate::error::Error;
use crate::indicator::{Indicator, Pattern};
use crate::input::{ButtonChannel, ButtonId, Edge};
use crate::link::{self, DuplicateFilter, SendOutcome, Transmitter};
use crate::machine::{Effect, Event, Ignored, Machine};
use crate::ports::{Buttons, Display, IndicatorPanel, Radio};
use crate::protocol::wire::DecodeError;
use crate::protocol::{State, StateChangeEvent};
use crate::ui::input_logic::{MenuCursor, MENU_ITEMS};

/// Upper bound on diagnostics reported by one tick.
pub const MAX_DIAGNOSTICS: usize = 12;

/// Something worth logging that happened during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Diagnostic {
    StateChanged(StateChangeEvent),
    /// An event with no defined effect in the current state.
    Ignored { event: Event, reason: Ignored },
    /// An inbound frame failed validation.
    Malformed(DecodeError),
    Send(SendOutcome),
    /// Outputs switched off (`true`) or back on (`false`).
    PowerSave(bool),
}

impl Diagnostic {
    /// The fault this diagnostic reports, if it is one.
    pub fn fault(&self) -> Option<Error> {
        match *self {
            Diagnostic::Malformed(e) => Some(e.into()),
            Diagnostic::Send(SendOutcome::Failed { state, attempts }) => {
                Some(Error::SendFailed { state, attempts })
            }
            _ => None,
        }
    }
}

pub type Diagnostics = heapless::Vec<Diagnostic, MAX_DIAGNOSTICS>;

/// The device: state machine, timers and ports.
pub struct Controller<B, D, P, R> {
    settings: Settings,
    machine: Machine,
    channels: heapless::Vec<(ButtonId, ButtonChannel), 3>,
    activity: ActivityTimer,
    transmitter: Transmitter,
    duplicates: DuplicateFilter,
    indicator: Indicator,
    redraw: bool,
    buttons: B,
    display: D,
    panel: P,
    radio: R,
}

impl<B, D, P, R> Controller<B, D, P, R>
where
    B: Buttons,
    D: Display,
    P: IndicatorPanel,
    R: Radio,
{
    pub fn new(settings: Settings, buttons: B, display: D, panel: P, radio: R, now_ms: u64) -> Self {
        let channels = ButtonId::for_role(settings.role)
            .iter()
            .map(|&id| (id, ButtonChannel::with_window(settings.timing.debounce_ms)))
            .collect();

        Self {
            settings,
            machine: Machine::new(settings.role, settings.policy),
            channels,
            activity: ActivityTimer::new(&settings.timing, now_ms),
            transmitter: Transmitter::new(settings.wire_format, settings.retry),
            duplicates: DuplicateFilter::new(settings.timing.duplicate_window_ms),
            indicator: Indicator::new(settings.timing.blink_interval_ms),
            redraw: true,
            buttons,
            display,
            panel,
            radio,
        }
    }

    /// Start from Idle with fresh outputs.
    pub fn boot(&mut self, now_ms: u64) {
        self.machine.reset();
        self.activity.touch(now_ms);
        self.display.set_power_save(false);
        self.indicator.set_enabled(true, now_ms);
        self.indicator.set_pattern(Pattern::for_state(State::Idle), now_ms);
        self.redraw = true;
        self.flush_outputs(now_ms);
    }

    /// Run one loop iteration at `now_ms`.
    pub fn tick(&mut self, now_ms: u64) -> Diagnostics {
        let mut diags = Diagnostics::new();

        // 1. Local input.
        let mut presses: heapless::Vec<ButtonId, 3> = heapless::Vec::new();
        for (id, channel) in self.channels.iter_mut() {
            let level = self.buttons.read_raw(*id);
            if channel.sample(level, now_ms) == Some(Edge::Falling) {
                let _ = presses.push(*id);
            }
        }
        for id in presses {
            self.touch(now_ms, &mut diags);
            self.dispatch(Event::Press(id), now_ms, &mut diags);
        }

        // 2. At most one inbound frame.
        if let Some(frame) = self.radio.receive() {
            if self.duplicates.accept(&frame, now_ms) {
                // Any frame from the peer is activity, even one we cannot read.
                self.touch(now_ms, &mut diags);
                match link::receive(self.settings.wire_format, &frame) {
                    Ok(state) => self.dispatch(Event::Message(state), now_ms, &mut diags),
                    Err(e) => push(&mut diags, Diagnostic::Malformed(e)),
                }
            }
        }

        // 3. Timeouts.
        match self.activity.poll(self.machine.state(), now_ms) {
            Some(Expiry::IdleTimeout) => self.dispatch(Event::IdleTimeout, now_ms, &mut diags),
            Some(Expiry::PowerSave) => {
                self.display.set_power_save(true);
                self.indicator.set_enabled(false, now_ms);
                push(&mut diags, Diagnostic::PowerSave(true));
            }
            None => {}
        }

        // 4. Effects.
        if let Some(outcome) = self.transmitter.service(&mut self.radio, now_ms) {
            push(&mut diags, Diagnostic::Send(outcome));
        }
        self.flush_outputs(now_ms);

        diags
    }

    fn dispatch(&mut self, event: Event, now_ms: u64, diags: &mut Diagnostics) {
        let applied = match self.machine.apply(event, now_ms) {
            Ok(applied) => applied,
            Err(reason) => {
                push(diags, Diagnostic::Ignored { event, reason });
                return;
            }
        };

        if let Some(change) = applied.change {
            self.touch(now_ms, diags);
            push(diags, Diagnostic::StateChanged(change));
        }

        for effect in applied.effects {
            match effect {
                Effect::Send(state) => {
                    self.touch(now_ms, diags);
                    if let Some(replaced) = self.transmitter.submit(state, now_ms) {
                        push(diags, Diagnostic::Send(replaced));
                    }
                }
                Effect::RefreshIndicators => {
                    let pattern = Pattern::for_state(self.machine.state());
                    self.indicator.set_pattern(pattern, now_ms);
                }
                Effect::RefreshDisplay => self.redraw = true,
            }
        }
    }

    /// Record activity; leaving power-save turns the outputs back on.
    fn touch(&mut self, now_ms: u64, diags: &mut Diagnostics) {
        if self.activity.touch(now_ms) {
            self.display.set_power_save(false);
            self.indicator.set_enabled(true, now_ms);
            self.redraw = true;
            push(diags, Diagnostic::PowerSave(false));
        }
    }

    fn flush_outputs(&mut self, now_ms: u64) {
        if self.redraw && !self.activity.in_power_save() {
            self.display.render(&MENU_ITEMS, self.machine.highlight());
            self.redraw = false;
        }
        if let Some(lamps) = self.indicator.tick(now_ms) {
            self.panel.set_lamps(lamps);
        }
    }

    pub fn state(&self) -> State {
        self.machine.state()
    }

    pub fn cursor(&self) -> Option<MenuCursor> {
        self.machine.cursor()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn in_power_save(&self) -> bool {
        self.activity.in_power_save()
    }

    /// `true` while a frame still has retries left.
    pub fn sending(&self) -> bool {
        self.transmitter.is_busy()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    pub fn buttons_mut(&mut self) -> &mut B {
        &mut self.buttons
    }
}

fn push(diags: &mut Diagnostics, d: Diagnostic) {
    // A full report only loses log lines, never state.
    let _ = diags.push(d);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timing;
    use crate::error::RadioError;
    use crate::indicator::Lamps;
    use crate::ports::NoDisplay;
    use crate::protocol::wire::Frame;
    use crate::protocol::Role;

    #[derive(Default)]
    struct Pins {
        call: bool,
        state: bool,
        send: bool,
    }

    impl Pins {
        fn released() -> Self {
            Self {
                call: true,
                state: true,
                send: true,
            }
        }
    }

    impl Buttons for Pins {
        fn read_raw(&mut self, id: ButtonId) -> bool {
            match id {
                ButtonId::Call => self.call,
                ButtonId::State => self.state,
                ButtonId::Send => self.send,
            }
        }
    }

    #[derive(Default)]
    struct Screen {
        renders: Vec<Option<u8>>,
        power_save: bool,
    }

    impl Display for Screen {
        fn render(&mut self, items: &[&str], highlight: Option<u8>) {
            assert_eq!(items.len(), 4);
            self.renders.push(highlight);
        }

        fn set_power_save(&mut self, enabled: bool) {
            self.power_save = enabled;
        }
    }

    #[derive(Default)]
    struct Panel(Vec<Lamps>);

    impl IndicatorPanel for Panel {
        fn set_lamps(&mut self, lamps: Lamps) {
            self.0.push(lamps);
        }
    }

    #[derive(Default)]
    struct FakeRadio {
        inbox: Vec<Frame>,
        sent: Vec<Vec<u8>>,
        fail: bool,
    }

    impl Radio for FakeRadio {
        fn send(&mut self, frame: &[u8]) -> Result<(), RadioError> {
            self.sent.push(frame.to_vec());
            if self.fail {
                Err(RadioError::Rejected)
            } else {
                Ok(())
            }
        }

        fn receive(&mut self) -> Option<Frame> {
            if self.inbox.is_empty() {
                None
            } else {
                Some(self.inbox.remove(0))
            }
        }
    }

    fn settings(role: Role) -> Settings {
        Settings {
            timing: Timing {
                idle_timeout_ms: 1_000,
                power_save_timeout_ms: 3_000,
                ..Timing::DEFAULT
            },
            ..Settings::for_role(role)
        }
    }

    type Responder = Controller<Pins, Screen, Panel, FakeRadio>;

    fn responder() -> Responder {
        let mut c = Controller::new(
            settings(Role::Responder),
            Pins::released(),
            Screen::default(),
            Panel::default(),
            FakeRadio::default(),
            0,
        );
        c.boot(0);
        c
    }

    fn frame(bytes: &[u8]) -> Frame {
        Frame::from_slice(bytes).unwrap()
    }

    /// Tick every 10 ms over `[from, to)`.
    fn run<B: Buttons, D: Display, P: IndicatorPanel, R: Radio>(
        c: &mut Controller<B, D, P, R>,
        from: u64,
        to: u64,
    ) -> Vec<Diagnostic> {
        (from..to).step_by(10).flat_map(|t| c.tick(t)).collect()
    }

    fn press_state(c: &mut Responder, at: u64) -> u64 {
        c.buttons_mut().state = false;
        run(c, at, at + 100);
        c.buttons_mut().state = true;
        run(c, at + 100, at + 200);
        at + 200
    }

    #[test]
    fn boot_draws_idle_menu_and_dark_lamps() {
        let c = responder();
        assert_eq!(c.settings().role, Role::Responder);
        assert_eq!(c.state(), State::Idle);
        assert_eq!(c.display().renders, vec![None]);
        assert_eq!(c.panel().0, vec![Lamps::OFF]);
    }

    #[test]
    fn inbound_call_starts_blinking() {
        let mut c = responder();
        c.radio_mut().inbox.push(frame(&[4]));
        let diags = c.tick(10);
        assert_eq!(c.state(), State::CallAlert);
        assert!(diags.iter().any(|d| matches!(d, Diagnostic::StateChanged(_))));
        assert_eq!(c.panel().0.last(), Some(&Lamps::new(true, false, false)));
        run(&mut c, 20, 600);
        assert_eq!(c.panel().0.last(), Some(&Lamps::new(false, true, false)));
    }

    #[test]
    fn malformed_frames_are_reported_and_dropped() {
        let mut c = responder();
        c.radio_mut().inbox.push(frame(&[9]));
        let diags = c.tick(10);
        assert_eq!(c.state(), State::Idle);
        assert_eq!(
            diags.as_slice(),
            &[Diagnostic::Malformed(DecodeError::OutOfRange(9))]
        );
    }

    #[test]
    fn only_one_frame_is_processed_per_tick() {
        let mut c = responder();
        c.radio_mut().inbox.push(frame(&[4]));
        c.radio_mut().inbox.push(frame(&[2]));
        c.tick(10);
        assert_eq!(c.state(), State::CallAlert);
        c.tick(20);
        assert_eq!(c.state(), State::Active);
    }

    #[test]
    fn burst_repeats_are_filtered() {
        let mut c = responder();
        c.radio_mut().inbox.push(frame(&[4]));
        c.radio_mut().inbox.push(frame(&[4]));
        c.tick(10);
        let diags = c.tick(20);
        assert!(diags.is_empty());
    }

    #[test]
    fn press_opens_menu_and_announces_it() {
        let mut c = responder();
        press_state(&mut c, 0);
        assert_eq!(c.state(), State::MenuInteracting);
        assert_eq!(c.cursor(), MenuCursor::new(1));
        assert_eq!(c.radio().sent, vec![vec![5]]);
        assert_eq!(c.display().renders.last(), Some(&Some(1)));
    }

    #[test]
    fn local_press_wins_over_same_tick_call() {
        let mut c = responder();
        c.buttons_mut().state = false;
        run(&mut c, 0, 50);
        // The debounced edge and the call land in the same tick.
        c.radio_mut().inbox.push(frame(&[4]));
        let diags = c.tick(50);
        assert_eq!(c.state(), State::MenuInteracting);
        assert!(diags.contains(&Diagnostic::Ignored {
            event: Event::Message(State::CallAlert),
            reason: Ignored::NotIdle,
        }));
    }

    #[test]
    fn send_failure_keeps_optimistic_state() {
        let mut c = responder();
        c.radio_mut().fail = true;
        c.buttons_mut().state = false;
        let diags = run(&mut c, 0, 500);
        assert_eq!(c.state(), State::MenuInteracting);
        assert_eq!(c.radio().sent.len(), 3);
        assert!(diags.contains(&Diagnostic::Send(SendOutcome::Failed {
            state: State::MenuInteracting,
            attempts: 3,
        })));
    }

    #[test]
    fn idle_timeout_leaves_menu_once() {
        let mut c = responder();
        let t = press_state(&mut c, 0);
        let diags = run(&mut c, t, 3_000);
        let forced: Vec<_> = diags
            .iter()
            .filter(|d| matches!(d, Diagnostic::StateChanged(e) if e.to == State::Idle))
            .collect();
        assert_eq!(forced.len(), 1);
        assert_eq!(c.state(), State::Idle);
        // Purely local by default: only the menu announcement went out.
        assert_eq!(c.radio().sent, vec![vec![5]]);
    }

    #[test]
    fn power_save_darkens_outputs_without_touching_state() {
        let mut c = responder();
        let diags = run(&mut c, 10, 3_100);
        assert!(diags.contains(&Diagnostic::PowerSave(true)));
        assert!(c.in_power_save());
        assert!(c.display().power_save);
        assert_eq!(c.state(), State::Idle);

        c.radio_mut().inbox.push(frame(&[4]));
        let diags = c.tick(3_200);
        assert!(diags.contains(&Diagnostic::PowerSave(false)));
        assert!(!c.display().power_save);
        assert_eq!(c.state(), State::CallAlert);
    }

    #[test]
    fn unreadable_frame_still_wakes_from_power_save() {
        let mut c = responder();
        run(&mut c, 10, 3_100);
        assert!(c.in_power_save());

        c.radio_mut().inbox.push(frame(&[9]));
        let diags = c.tick(3_200);
        assert!(diags.contains(&Diagnostic::PowerSave(false)));
        assert!(diags.contains(&Diagnostic::Malformed(DecodeError::OutOfRange(9))));
        assert!(!c.in_power_save());
        assert!(!c.display().power_save);
        assert_eq!(c.state(), State::Idle);
    }

    #[test]
    fn faults_are_classified() {
        assert_eq!(
            Diagnostic::Malformed(DecodeError::Asleep).fault(),
            Some(Error::Malformed(DecodeError::Asleep))
        );
        assert_eq!(
            Diagnostic::Send(SendOutcome::Failed {
                state: State::Active,
                attempts: 3
            })
            .fault(),
            Some(Error::SendFailed {
                state: State::Active,
                attempts: 3
            })
        );
        assert_eq!(Diagnostic::PowerSave(true).fault(), None);
    }

    #[test]
    fn caller_without_display_rings_on_press() {
        let mut c = Controller::new(
            settings(Role::Caller),
            Pins::released(),
            NoDisplay,
            Panel::default(),
            FakeRadio::default(),
            0,
        );
        c.boot(0);
        c.buttons_mut().call = false;
        run(&mut c, 0, 100);
        assert_eq!(c.state(), State::CallAlert);
        assert_eq!(c.radio().sent, vec![vec![4]]);
    }

    #[test]
    fn offline_radio_still_runs_locally() {
        let mut c: Controller<Pins, Screen, Panel, Option<FakeRadio>> = Controller::new(
            settings(Role::Responder),
            Pins::released(),
            Screen::default(),
            Panel::default(),
            None,
            0,
        );
        c.boot(0);
        c.buttons_mut().state = false;
        let diags = run(&mut c, 0, 400);
        assert_eq!(c.state(), State::MenuInteracting);
        assert!(diags.contains(&Diagnostic::Send(SendOutcome::Failed {
            state: State::MenuInteracting,
            attempts: 3,
        })));
    }
}
