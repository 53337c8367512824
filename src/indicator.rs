//! Lamp patterns and their tick-driven animation.
//!
//! Nothing here blocks: [`Indicator::tick`] is called once per loop
//! iteration and yields new lamp levels only when they change.

use crate::protocol::State;

/// What the lamps should show.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pattern {
    #[default]
    Off,
    SolidA,
    SolidB,
    SolidC,
    /// A and B alternate every blink interval.
    AlternatingBlink,
}

impl Pattern {
    pub const fn for_state(state: State) -> Self {
        match state {
            State::Idle | State::MenuInteracting => Pattern::Off,
            State::Waiting => Pattern::SolidA,
            State::Active => Pattern::SolidB,
            State::Reserved => Pattern::SolidC,
            State::CallAlert => Pattern::AlternatingBlink,
        }
    }
}

/// Levels of the three lamp outputs. Boards with two lamps show C as A+B.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Lamps {
    pub a: bool,
    pub b: bool,
    pub c: bool,
}

impl Lamps {
    pub const OFF: Self = Self::new(false, false, false);

    pub const fn new(a: bool, b: bool, c: bool) -> Self {
        Self { a, b, c }
    }
}

/// Pattern player.
#[derive(Clone, Debug)]
pub struct Indicator {
    pattern: Pattern,
    enabled: bool,
    blink_interval_ms: u64,
    phase_started_ms: u64,
    phase_on: bool,
    shown: Option<Lamps>,
}

impl Indicator {
    pub const fn new(blink_interval_ms: u64) -> Self {
        Self {
            pattern: Pattern::Off,
            enabled: true,
            blink_interval_ms,
            phase_started_ms: 0,
            phase_on: true,
            shown: None,
        }
    }

    /// Switch pattern. A new blink always starts on its first phase.
    pub fn set_pattern(&mut self, pattern: Pattern, now_ms: u64) {
        if pattern != self.pattern {
            self.pattern = pattern;
            self.phase_started_ms = now_ms;
            self.phase_on = true;
        }
    }

    /// Power-save gate: disabled lamps stay off but keep their pattern.
    pub fn set_enabled(&mut self, enabled: bool, now_ms: u64) {
        if enabled && !self.enabled {
            self.phase_started_ms = now_ms;
            self.phase_on = true;
        }
        self.enabled = enabled;
    }

    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    /// Advance the animation; returns levels to drive if they changed.
    pub fn tick(&mut self, now_ms: u64) -> Option<Lamps> {
        if self.pattern == Pattern::AlternatingBlink
            && now_ms.saturating_sub(self.phase_started_ms) >= self.blink_interval_ms
        {
            self.phase_on = !self.phase_on;
            self.phase_started_ms = now_ms;
        }

        let lamps = self.levels();
        if self.shown == Some(lamps) {
            return None;
        }
        self.shown = Some(lamps);
        Some(lamps)
    }

    fn levels(&self) -> Lamps {
        if !self.enabled {
            return Lamps::OFF;
        }
        match self.pattern {
            Pattern::Off => Lamps::OFF,
            Pattern::SolidA => Lamps::new(true, false, false),
            Pattern::SolidB => Lamps::new(false, true, false),
            Pattern::SolidC => Lamps::new(false, false, true),
            Pattern::AlternatingBlink => Lamps::new(self.phase_on, !self.phase_on, false),
        }
    }
}

/// The fixed boot lamp sequence: A, A+B, B, off.
#[derive(Clone, Debug)]
pub struct BootSequence {
    step: usize,
    step_ms: u64,
}

impl BootSequence {
    const STEPS: [Lamps; 4] = [
        Lamps::new(true, false, false),
        Lamps::new(true, true, false),
        Lamps::new(false, true, false),
        Lamps::OFF,
    ];

    pub const fn new(step_ms: u64) -> Self {
        Self { step: 0, step_ms }
    }
}

impl Iterator for BootSequence {
    /// Lamp levels and how long to hold them.
    type Item = (Lamps, u64);

    fn next(&mut self) -> Option<Self::Item> {
        let lamps = *Self::STEPS.get(self.step)?;
        self.step += 1;
        // The final "off" step is not held.
        let hold = if self.step == Self::STEPS.len() { 0 } else { self.step_ms };
        Some((lamps, hold))
    }
}
