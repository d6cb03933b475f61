//! Picker interaction state: when a selection change opens the picker
//!
//! ```text
//!             selection in zone (pointer/keyboard, outside guard)
//!   Idle  ---------------------------------------------------->  PickerOpen
//!    ^                                                              |
//!    +------------------- picker closed / edit applied -------------+
//! ```
//!
//! Applying an edit also starts a guard window during which selection
//! changes are ignored, so the cursor landing back on the edited zone does
//! not reopen the picker.

use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::lsp::zones::ClickableZone;

/// What caused a selection change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionOrigin {
    Pointer,
    Keyboard,
    /// Caused by an edit or by the editor itself; never opens the picker
    Programmatic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    PickerOpen(ClickableZone),
}

#[derive(Debug)]
pub struct Interaction {
    state: InteractionState,
    guard: Duration,
    suppressed_until: Option<Instant>,
}

impl Interaction {
    pub fn new(guard: Duration) -> Self {
        Self {
            state: InteractionState::Idle,
            guard,
            suppressed_until: None,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// React to a selection change; returns the zone to open the picker for
    pub fn on_selection(
        &mut self,
        zone: Option<&ClickableZone>,
        origin: SelectionOrigin,
        now: Instant,
    ) -> Option<&ClickableZone> {
        if origin == SelectionOrigin::Programmatic || self.is_suppressed(now) {
            return None;
        }
        if matches!(self.state, InteractionState::PickerOpen(_)) {
            return None;
        }

        self.state = InteractionState::PickerOpen(zone?.clone());
        match &self.state {
            InteractionState::PickerOpen(zone) => Some(zone),
            InteractionState::Idle => None,
        }
    }

    /// Explicit open request; bypasses the guard window
    pub fn open_picker(&mut self, zone: ClickableZone) {
        self.state = InteractionState::PickerOpen(zone);
    }

    pub fn close_picker(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// A chosen version was written; close and start the guard window
    pub fn edit_applied(&mut self, now: Instant) {
        self.state = InteractionState::Idle;
        self.suppressed_until = Some(now + self.guard);
    }

    fn is_suppressed(&self, now: Instant) -> bool {
        self.suppressed_until.is_some_and(|until| now < until)
    }
}
