//! Response menu contents and cursor movement.

/// Menu lines as drawn on the Responder OLED. Line 0 is the title;
/// lines 1..=3 are the answers and match state codes 1..=3.
pub const MENU_ITEMS: [&str; 4] = ["Status", "Not now", "Come quietly", "All good"];

/// Number of selectable answers.
pub const OPTION_COUNT: u8 = 3;

/// Highlighted answer while the Responder is in the menu. Always `1..=3`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MenuCursor(u8);

impl MenuCursor {
    /// Cursor on the first answer.
    pub const FIRST: Self = Self(1);

    /// Cursor on `index`, if it names an answer.
    pub const fn new(index: u8) -> Option<Self> {
        match index {
            1..=OPTION_COUNT => Some(Self(index)),
            _ => None,
        }
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    /// Move to the next answer, wrapping after the last one.
    pub const fn advance(self) -> Self {
        Self(self.0 % OPTION_COUNT + 1)
    }
}

impl Default for MenuCursor {
    fn default() -> Self {
        Self::FIRST
    }
}
