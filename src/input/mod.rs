//! Physical button input.
//!
//! Buttons are active-low with pull-ups: the idle level is high, a press
//! pulls the line low. A [`Edge::Falling`] is therefore a press.

pub mod debounce;

pub use debounce::ButtonChannel;

/// Physical inputs across both boards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonId {
    /// Caller: ring the Responder.
    Call,
    /// Responder: open the menu / move the cursor.
    State,
    /// Responder: send the highlighted option.
    Send,
}

impl ButtonId {
    /// Buttons wired on a board of the given role, in sampling order.
    pub const fn for_role(role: crate::protocol::Role) -> &'static [ButtonId] {
        match role {
            crate::protocol::Role::Caller => &[ButtonId::Call],
            crate::protocol::Role::Responder => &[ButtonId::State, ButtonId::Send],
        }
    }
}

/// A confirmed level transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// High to low: pressed.
    Falling,
    /// Low to high: released.
    Rising,
}
