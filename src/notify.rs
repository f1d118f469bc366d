//! Publish/subscribe channel between a drawing and its doodles and views.
//!
//! Emitting only queues a notification. Its payload is a snapshot taken at
//! emission and its recipients are fixed at that moment too, so no subscriber
//! can see another subscriber's reaction to the same event. The host delivers
//! by draining the queue, in emission order.

use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::time::Duration;

use glam::DVec2;

use crate::doodle::{ClassName, DoodleId};
use crate::errors::{DoodleError, Result};
use crate::log::trace;
use crate::params::ParameterValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventName {
    Ready,
    DoodleAdded,
    DoodleDeleted,
    DoodleSelected,
    DoodleDeselected,
    MouseDown,
    MouseUp,
    ParameterChanged,
}

impl EventName {
    pub const ALL: [EventName; 8] = [
        EventName::Ready,
        EventName::DoodleAdded,
        EventName::DoodleDeleted,
        EventName::DoodleSelected,
        EventName::DoodleDeselected,
        EventName::MouseDown,
        EventName::MouseUp,
        EventName::ParameterChanged,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventName::Ready => "ready",
            EventName::DoodleAdded => "doodleAdded",
            EventName::DoodleDeleted => "doodleDeleted",
            EventName::DoodleSelected => "doodleSelected",
            EventName::DoodleDeselected => "doodleDeselected",
            EventName::MouseDown => "mousedown",
            EventName::MouseUp => "mouseup",
            EventName::ParameterChanged => "parameterChanged",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = DoodleError;

    fn from_str(s: &str) -> Result<Self> {
        EventName::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| DoodleError::UnknownEvent { name: s.to_string() })
    }
}

/// Which events a subscriber wants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventFilter {
    All,
    Only(BTreeSet<EventName>),
}

impl EventFilter {
    pub fn only(events: impl IntoIterator<Item = EventName>) -> Self {
        EventFilter::Only(events.into_iter().collect())
    }

    pub fn accepts(&self, event: EventName) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Only(set) => set.contains(&event),
        }
    }
}

/// Doodle state as seen at the moment a notification was emitted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoodleSummary {
    pub id: DoodleId,
    pub class: ClassName,
    pub is_locked: bool,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    None,
    Doodle(DoodleSummary),
    /// Pointer position in canvas pixels
    Point(DVec2),
    Parameter {
        doodle: DoodleSummary,
        name: String,
        value: ParameterValue,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub event: EventName,
    /// Drawing clock at emission
    pub at: Duration,
    pub payload: Payload,
}

impl Notification {
    pub fn new(event: EventName, at: Duration, payload: Payload) -> Self {
        Self { event, at, payload }
    }

    pub fn doodle(&self) -> Option<&DoodleSummary> {
        match &self.payload {
            Payload::Doodle(d) | Payload::Parameter { doodle: d, .. } => Some(d),
            _ => None,
        }
    }

    pub fn point(&self) -> Option<DVec2> {
        match self.payload {
            Payload::Point(p) => Some(p),
            _ => None,
        }
    }
}

/// Something that reacts to notifications
pub trait Subscriber {
    fn notify(&mut self, notification: &Notification);

    /// Called once the current batch of notifications has been delivered
    fn tick(&mut self, _now: Duration) {}
}

impl<T: Subscriber> Subscriber for Rc<RefCell<T>> {
    fn notify(&mut self, notification: &Notification) {
        self.borrow_mut().notify(notification);
    }

    fn tick(&mut self, now: Duration) {
        self.borrow_mut().tick(now);
    }
}

/// Registrations plus the queue of undelivered notifications.
///
/// `K` identifies a subscriber; the bus never holds subscribers themselves.
#[derive(Debug, Clone)]
pub struct NotificationBus<K> {
    registrations: Vec<(K, EventFilter)>,
    queue: VecDeque<(Notification, Vec<K>)>,
}

impl<K> Default for NotificationBus<K> {
    fn default() -> Self {
        Self {
            registrations: Vec::new(),
            queue: VecDeque::new(),
        }
    }
}

impl<K: Clone + PartialEq + fmt::Debug> NotificationBus<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key`, replacing any earlier filter for it
    pub fn register(&mut self, key: K, filter: EventFilter) {
        match self.registrations.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = filter,
            None => self.registrations.push((key, filter)),
        }
    }

    pub fn unregister(&mut self, key: &K) {
        self.registrations.retain(|(k, _)| k != key);
    }

    pub fn is_registered(&self, key: &K) -> bool {
        self.registrations.iter().any(|(k, _)| k == key)
    }

    /// Queue a notification for everyone interested right now
    pub fn emit(&mut self, notification: Notification) {
        let recipients: Vec<K> = self
            .registrations
            .iter()
            .filter(|(_, filter)| filter.accepts(notification.event))
            .map(|(k, _)| k.clone())
            .collect();
        trace!(event = %notification.event, recipients = recipients.len(), "queued notification");
        self.queue.push_back((notification, recipients));
    }

    /// Oldest undelivered notification with its recipients
    pub fn next(&mut self) -> Option<(Notification, Vec<K>)> {
        self.queue.pop_front()
    }

    /// Everything queued so far, in emission order
    pub fn drain(&mut self) -> Vec<(Notification, Vec<K>)> {
        self.queue.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(event: EventName) -> Notification {
        Notification::new(event, Duration::ZERO, Payload::None)
    }

    #[test]
    fn filters_select_recipients_at_emission() {
        let mut bus = NotificationBus::new();
        bus.register("popup", EventFilter::only([EventName::DoodleSelected]));
        bus.register("all", EventFilter::All);

        bus.emit(note(EventName::MouseDown));
        bus.emit(note(EventName::DoodleSelected));
        // Registered after emission: sees nothing already queued
        bus.register("late", EventFilter::All);

        let delivered = bus.drain();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].1, vec!["all"]);
        assert_eq!(delivered[1].1, vec!["popup", "all"]);
        assert!(bus.is_empty());
    }

    #[test]
    fn register_replaces_filter() {
        let mut bus = NotificationBus::new();
        bus.register(1u32, EventFilter::only([EventName::Ready]));
        bus.register(1u32, EventFilter::only([EventName::MouseUp]));
        bus.emit(note(EventName::Ready));
        bus.emit(note(EventName::MouseUp));
        let delivered = bus.drain();
        assert!(delivered[0].1.is_empty());
        assert_eq!(delivered[1].1, vec![1]);
    }

    #[test]
    fn unregister_stops_delivery() {
        let mut bus = NotificationBus::new();
        bus.register('a', EventFilter::All);
        bus.unregister(&'a');
        bus.emit(note(EventName::Ready));
        assert!(bus.next().is_some_and(|(_, r)| r.is_empty()));
    }

    #[test]
    fn event_names_round_trip_through_strings() {
        for e in EventName::ALL {
            assert_eq!(e.as_str().parse::<EventName>(), Ok(e));
        }
        assert_eq!(
            "click".parse::<EventName>(),
            Err(DoodleError::UnknownEvent { name: "click".into() })
        );
    }

    #[test]
    fn shared_subscribers_forward_calls() {
        #[derive(Default)]
        struct Counter(usize);
        impl Subscriber for Counter {
            fn notify(&mut self, _: &Notification) {
                self.0 += 1;
            }
        }

        let shared = Rc::new(RefCell::new(Counter::default()));
        let mut handle = Rc::clone(&shared);
        handle.notify(&note(EventName::Ready));
        assert_eq!(shared.borrow().0, 1);
    }
}
