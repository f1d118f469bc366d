//! Doodle popup: a two-state view driven entirely by notifications.
//!
//! Opening is debounced. `doodleAdded` opens after `added_delay`;
//! `doodleSelected` is held until the end of the current tick and then opens
//! after `selected_delay`, so a burst of selection changes settles on the
//! last doodle. Closing uses `closed_delay` (zero by default, applied at once).
//! There is only ever one pending transition; scheduling another replaces it.

use std::time::Duration;

use crate::log::debug;
use crate::notify::{DoodleSummary, EventFilter, EventName, Notification, Subscriber};
use crate::render::defaults;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopupState {
    Open,
    #[default]
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupConfig {
    pub added_delay: Duration,
    pub selected_delay: Duration,
    pub closed_delay: Duration,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            added_delay: defaults::POPUP_ADDED_DELAY,
            selected_delay: defaults::POPUP_SELECTED_DELAY,
            closed_delay: defaults::POPUP_CLOSED_DELAY,
        }
    }
}

/// A state change the view layer should render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupTransition {
    pub state: PopupState,
    pub doodle: Option<DoodleSummary>,
    pub at: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pending {
    state: PopupState,
    doodle: Option<DoodleSummary>,
    due: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct DoodlePopup {
    config: PopupConfig,
    state: PopupState,
    ready: bool,
    current: Option<DoodleSummary>,
    /// Doodle the popup is showing (or last showed)
    shown: Option<DoodleSummary>,
    pending: Option<Pending>,
    deferred_show: Option<DoodleSummary>,
    now: Duration,
    transitions: Vec<PopupTransition>,
}

impl DoodlePopup {
    pub fn new(config: PopupConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Events the popup must be registered for
    pub fn filter() -> EventFilter {
        EventFilter::only([
            EventName::Ready,
            EventName::DoodleAdded,
            EventName::DoodleDeleted,
            EventName::DoodleSelected,
            EventName::DoodleDeselected,
        ])
    }

    pub fn state(&self) -> PopupState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Doodle the most recent added/selected event referred to
    pub fn current_doodle(&self) -> Option<&DoodleSummary> {
        self.current.as_ref()
    }

    pub fn shown_doodle(&self) -> Option<&DoodleSummary> {
        self.shown.as_ref()
    }

    /// State and due time of the outstanding transition, if any
    pub fn pending(&self) -> Option<(PopupState, Duration)> {
        self.pending.map(|p| (p.state, p.due))
    }

    /// Applied transitions since the last call
    pub fn take_transitions(&mut self) -> Vec<PopupTransition> {
        std::mem::take(&mut self.transitions)
    }

    /// Open for the current doodle after `delay`; refused for a locked doodle
    pub fn show(&mut self, delay: Duration) {
        let Some(doodle) = self.current else {
            return;
        };
        if doodle.is_locked {
            debug!(id = %doodle.id, "popup refused for locked doodle");
            return;
        }
        self.schedule(PopupState::Open, Some(doodle), delay);
    }

    pub fn hide(&mut self, delay: Duration) {
        self.schedule(PopupState::Closed, self.shown, delay);
    }

    /// The toggle button: hide when open, show (default delay) when closed
    pub fn toggle(&mut self) {
        match self.state {
            PopupState::Open => self.hide(self.config.closed_delay),
            PopupState::Closed => self.show(self.config.added_delay),
        }
    }

    fn schedule(&mut self, state: PopupState, doodle: Option<DoodleSummary>, delay: Duration) {
        let pending = Pending {
            state,
            doodle,
            due: self.now + delay,
        };
        if delay.is_zero() {
            self.pending = None;
            self.apply(pending);
        } else {
            self.pending = Some(pending);
        }
    }

    fn apply(&mut self, pending: Pending) {
        if pending.state == self.state && pending.doodle == self.shown {
            return;
        }
        self.state = pending.state;
        self.shown = pending.doodle;
        self.transitions.push(PopupTransition {
            state: pending.state,
            doodle: pending.doodle,
            at: pending.due.max(self.now),
        });
    }
}

impl Subscriber for DoodlePopup {
    fn notify(&mut self, notification: &Notification) {
        self.now = self.now.max(notification.at);
        match notification.event {
            EventName::Ready => self.ready = true,
            EventName::DoodleAdded => {
                self.current = notification.doodle().copied();
                self.show(self.config.added_delay);
            }
            EventName::DoodleSelected => {
                self.current = notification.doodle().copied();
                self.deferred_show = self.current;
            }
            EventName::DoodleDeleted | EventName::DoodleDeselected => {
                self.hide(self.config.closed_delay);
            }
            _ => {}
        }
    }

    fn tick(&mut self, now: Duration) {
        self.now = self.now.max(now);
        if let Some(doodle) = self.deferred_show.take() {
            self.current = Some(doodle);
            self.show(self.config.selected_delay);
        }
        if let Some(pending) = self.pending {
            if pending.due <= self.now {
                self.pending = None;
                self.apply(pending);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doodle::{ClassName, DoodleId};
    use crate::notify::Payload;

    fn summary(id: u32, is_locked: bool) -> DoodleSummary {
        DoodleSummary {
            id: DoodleId(id),
            class: ClassName::HardExudate,
            is_locked,
            is_selected: false,
        }
    }

    fn event(event: EventName, doodle: DoodleSummary, at: Duration) -> Notification {
        Notification::new(event, at, Payload::Doodle(doodle))
    }

    #[test]
    fn added_opens_after_delay() {
        let mut popup = DoodlePopup::default();
        popup.notify(&event(EventName::DoodleAdded, summary(1, false), Duration::ZERO));
        popup.tick(Duration::ZERO);
        assert_eq!(popup.state(), PopupState::Closed);
        popup.tick(Duration::from_millis(49));
        assert_eq!(popup.state(), PopupState::Closed);
        popup.tick(Duration::from_millis(50));
        assert_eq!(popup.state(), PopupState::Open);
    }

    #[test]
    fn close_is_immediate_and_cancels_pending_open() {
        let mut popup = DoodlePopup::default();
        popup.notify(&event(EventName::DoodleAdded, summary(1, false), Duration::ZERO));
        popup.notify(&event(EventName::DoodleDeleted, summary(1, false), Duration::ZERO));
        popup.tick(Duration::from_millis(100));
        assert_eq!(popup.state(), PopupState::Closed);
        assert!(popup.pending().is_none());
        assert!(popup.take_transitions().is_empty());
    }

    #[test]
    fn same_tick_deselect_does_not_cancel_selection() {
        let mut popup = DoodlePopup::default();
        popup.notify(&event(EventName::DoodleSelected, summary(2, false), Duration::ZERO));
        popup.notify(&event(EventName::DoodleDeselected, summary(1, false), Duration::ZERO));
        popup.tick(Duration::ZERO);
        assert_eq!(popup.pending().map(|p| p.0), Some(PopupState::Open));
        popup.tick(Duration::from_millis(150));
        assert_eq!(popup.shown_doodle().map(|d| d.id), Some(DoodleId(2)));
    }

    #[test]
    fn toggle_flips_state() {
        let mut popup = DoodlePopup::default();
        popup.notify(&event(EventName::DoodleAdded, summary(1, false), Duration::ZERO));
        popup.tick(Duration::from_millis(50));
        assert_eq!(popup.state(), PopupState::Open);
        popup.toggle();
        assert_eq!(popup.state(), PopupState::Closed);
        popup.toggle();
        popup.tick(Duration::from_millis(100));
        assert_eq!(popup.state(), PopupState::Open);
    }

    #[test]
    fn ready_marks_popup_ready() {
        let mut popup = DoodlePopup::default();
        popup.notify(&Notification::new(EventName::Ready, Duration::ZERO, Payload::None));
        assert!(popup.is_ready());
    }
}
