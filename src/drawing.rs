//! Reference drawing: owns doodles, routes pointer input and notifications.
//!
//! Doodles are kept back-to-front; index 0 is painted first and hit-tested
//! last. Pointer coordinates arrive in canvas pixels and are mapped into the
//! doodle plane through the drawing's base transform.

use std::time::Duration;

use glam::DVec2;

use crate::doodle::{ClassName, Doodle, DoodleId, SavedDoodle};
use crate::errors::{DoodleError, Result};
use crate::log::{debug, trace};
use crate::notify::{EventFilter, EventName, Notification, NotificationBus, Payload, Subscriber};
use crate::params::{ParameterChange, ParameterValue};
use crate::render::Canvas;
use crate::surface::{ChartBox, DrawingContext, Surface};
use crate::transform::Transform;

/// Who a queued notification is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberKey {
    Doodle(DoodleId),
    View(usize),
}

#[derive(Debug, Clone, Copy)]
struct ChartCell {
    cell: ChartBox,
    occupied: bool,
}

pub struct Drawing {
    context: DrawingContext,
    doodles: Vec<(DoodleId, Doodle)>,
    next_id: u32,
    selected: Option<DoodleId>,
    /// Doodle plane → canvas pixels
    base: Transform,
    bus: NotificationBus<SubscriberKey>,
    views: Vec<Box<dyn Subscriber>>,
    clock: Duration,
    chart: Vec<ChartCell>,
}

impl Default for Drawing {
    fn default() -> Self {
        Self::new(DrawingContext::default())
    }
}

impl Drawing {
    pub fn new(context: DrawingContext) -> Self {
        Self {
            context,
            doodles: Vec::new(),
            next_id: 1,
            selected: None,
            base: Transform::IDENTITY,
            bus: NotificationBus::new(),
            views: Vec::new(),
            clock: Duration::ZERO,
            chart: Vec::new(),
        }
    }

    /// Set the doodle plane → canvas transform
    pub fn with_base_transform(mut self, base: Transform) -> Self {
        self.base = base;
        self
    }

    /// Lay out the dental chart cells new tooth doodles are placed into
    pub fn with_chart(mut self, cells: impl IntoIterator<Item = ChartBox>) -> Self {
        self.chart = cells
            .into_iter()
            .map(|cell| ChartCell { cell, occupied: false })
            .collect();
        self
    }

    pub fn context(&self) -> &DrawingContext {
        &self.context
    }

    pub fn base_transform(&self) -> Transform {
        self.base
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    // ------------------------------------------------------------------------
    // Subscribers
    // ------------------------------------------------------------------------

    /// Attach a view; returns its index for later removal
    pub fn add_view(&mut self, view: Box<dyn Subscriber>, filter: EventFilter) -> usize {
        let index = self.views.len();
        self.views.push(view);
        self.bus.register(SubscriberKey::View(index), filter);
        index
    }

    /// Stop delivering to a view. Its slot stays so other indices remain valid.
    pub fn remove_view(&mut self, index: usize) {
        self.bus.unregister(&SubscriberKey::View(index));
    }

    /// Announce that the drawing is ready for input
    pub fn ready(&mut self) {
        self.emit(EventName::Ready, Payload::None);
        self.flush();
    }

    // ------------------------------------------------------------------------
    // Doodle collection
    // ------------------------------------------------------------------------

    pub fn doodles(&self) -> impl Iterator<Item = (DoodleId, &Doodle)> {
        self.doodles.iter().map(|(id, d)| (*id, d))
    }

    pub fn len(&self) -> usize {
        self.doodles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doodles.is_empty()
    }

    pub fn doodle(&self, id: DoodleId) -> Option<&Doodle> {
        self.doodles.iter().find(|(i, _)| *i == id).map(|(_, d)| d)
    }

    pub fn doodle_mut(&mut self, id: DoodleId) -> Option<&mut Doodle> {
        self.doodles.iter_mut().find(|(i, _)| *i == id).map(|(_, d)| d)
    }

    fn doodle_or_err(&mut self, id: DoodleId) -> Result<&mut Doodle> {
        self.doodle_mut(id).ok_or(DoodleError::UnknownDoodle { id: id.0 })
    }

    pub fn selected(&self) -> Option<DoodleId> {
        self.selected
    }

    pub fn first_of_class(&self, class: ClassName) -> Option<DoodleId> {
        self.doodles
            .iter()
            .find(|(_, d)| d.class_name() == class)
            .map(|(id, _)| *id)
    }

    /// Add a doodle of `class` and select it.
    ///
    /// Only `doodleAdded` is announced; the selection change rides along with
    /// it. A unique class already on the drawing is not added again and the
    /// existing doodle's id is returned instead.
    pub fn add_doodle(&mut self, class: ClassName) -> DoodleId {
        if Doodle::default_flags(class).is_unique {
            if let Some(existing) = self.first_of_class(class) {
                debug!(class = %class, id = %existing, "unique doodle already present");
                return existing;
            }
        }

        let doodle = Doodle::new(class, self);
        let id = self.insert(doodle);

        let selectable = self.doodle(id).is_some_and(|d| d.flags().is_selectable);
        if selectable {
            self.set_selected(Some(id));
        }
        self.emit_doodle(EventName::DoodleAdded, id);
        self.flush();
        id
    }

    /// Add a doodle from its persisted form without selecting it
    pub fn restore_doodle(&mut self, saved: &SavedDoodle) -> Result<DoodleId> {
        let doodle = Doodle::restore(saved, self)?;
        if let Some(cell) = self
            .chart
            .iter_mut()
            .find(|c| c.cell.position == doodle.origin())
        {
            cell.occupied = true;
        }
        Ok(self.insert(doodle))
    }

    pub fn restore_doodles(&mut self, saved: &[SavedDoodle]) -> Result<Vec<DoodleId>> {
        saved.iter().map(|s| self.restore_doodle(s)).collect()
    }

    fn insert(&mut self, doodle: Doodle) -> DoodleId {
        let id = DoodleId(self.next_id);
        self.next_id += 1;

        if let Some(filter) = doodle.subscriptions() {
            self.bus.register(SubscriberKey::Doodle(id), filter);
        }
        if doodle.flags().add_at_back {
            self.doodles.insert(0, (id, doodle));
        } else {
            self.doodles.push((id, doodle));
        }
        trace!(id = %id, count = self.doodles.len(), "inserted doodle");
        id
    }

    /// Remove a doodle. Locked doodles stay put without error.
    pub fn delete_doodle(&mut self, id: DoodleId) -> Result<()> {
        let doodle = self.doodle_or_err(id)?;
        if !doodle.flags().is_deletable {
            return Err(DoodleError::NotDeletable {
                class: doodle.class_name(),
            });
        }
        if doodle.flags().is_locked {
            debug!(id = %id, "delete ignored on locked doodle");
            return Ok(());
        }

        let summary = doodle.summary(id);
        let origin = doodle.origin();
        self.doodles.retain(|(i, _)| *i != id);
        self.bus.unregister(&SubscriberKey::Doodle(id));
        if self.selected == Some(id) {
            self.selected = None;
        }
        let still_used = self.doodles.iter().any(|(_, d)| d.origin() == origin);
        if let Some(cell) = self.chart.iter_mut().find(|c| c.cell.position == origin) {
            cell.occupied = still_used;
        }
        self.emit(EventName::DoodleDeleted, Payload::Doodle(summary));
        self.flush();
        Ok(())
    }

    pub fn delete_selected(&mut self) -> Result<()> {
        match self.selected {
            Some(id) => self.delete_doodle(id),
            None => Ok(()),
        }
    }

    pub fn set_locked(&mut self, id: DoodleId, locked: bool) -> Result<()> {
        self.doodle_or_err(id)?.flags_mut().is_locked = locked;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Selection and pointer input
    // ------------------------------------------------------------------------

    /// Move the selection without announcing it
    fn set_selected(&mut self, id: Option<DoodleId>) {
        if let Some(old) = self.selected.take() {
            if let Some(d) = self.doodle_mut(old) {
                d.flags_mut().is_selected = false;
            }
        }
        if let Some(d) = id.and_then(|id| self.doodle_mut(id)) {
            d.flags_mut().is_selected = true;
            self.selected = id;
        }
    }

    /// Canvas pixels → doodle plane
    pub fn to_plane(&self, pixel: DVec2) -> DVec2 {
        self.base.inverse_apply(pixel)
    }

    /// Handle a press at a canvas point.
    ///
    /// `mousedown` is delivered first, so doodles see it while the previous
    /// selection still stands. Then the front-most selectable, unlocked doodle
    /// containing the point becomes selected. `doodleSelected` for it is
    /// emitted before `doodleDeselected` for the one it replaces.
    pub fn mouse_down(&mut self, pixel: DVec2) -> Option<DoodleId> {
        self.emit(EventName::MouseDown, Payload::Point(pixel));
        self.flush();

        let base = self.base;
        let mut hit = None;
        for (id, doodle) in self.doodles.iter_mut().rev() {
            if hit.is_some() || doodle.flags().is_locked || !doodle.flags().is_selectable {
                continue;
            }
            let local = doodle.transform().then(&base).inverse_apply(pixel);
            if doodle.hit_test(&self.context, local) {
                hit = Some(*id);
            }
        }
        debug!(?hit, "mouse down");

        if hit != self.selected {
            let old = self.selected;
            self.set_selected(hit);
            if let Some(new) = hit {
                self.emit_doodle(EventName::DoodleSelected, new);
            }
            if let Some(old) = old {
                self.emit_doodle(EventName::DoodleDeselected, old);
            }
            self.flush();
        }
        hit
    }

    pub fn mouse_up(&mut self, pixel: DVec2) {
        self.emit(EventName::MouseUp, Payload::Point(pixel));
        self.flush();
    }

    // ------------------------------------------------------------------------
    // Parameters and handles
    // ------------------------------------------------------------------------

    pub fn set_parameter(
        &mut self,
        id: DoodleId,
        name: &str,
        value: impl Into<ParameterValue>,
    ) -> Result<Vec<ParameterChange>> {
        let changes = self.doodle_or_err(id)?.set_parameter(name, value)?;
        self.announce(id, &changes);
        Ok(changes)
    }

    pub fn set_parameter_from_string(&mut self, id: DoodleId, name: &str, text: &str) -> Result<Vec<ParameterChange>> {
        let changes = self.doodle_or_err(id)?.set_parameter_from_string(name, text)?;
        self.announce(id, &changes);
        Ok(changes)
    }

    /// Drag handle `index` of a doodle to a canvas point
    pub fn drag_handle(&mut self, id: DoodleId, index: usize, pixel: DVec2) -> Result<Vec<ParameterChange>> {
        let point = self.to_plane(pixel);
        let changes = self.doodle_or_err(id)?.drag_handle_to(index, point)?;
        self.announce(id, &changes);
        Ok(changes)
    }

    fn announce(&mut self, id: DoodleId, changes: &[ParameterChange]) {
        let Some(summary) = self.doodle(id).map(|d| d.summary(id)) else {
            return;
        };
        for change in changes {
            self.emit(
                EventName::ParameterChanged,
                Payload::Parameter {
                    doodle: summary,
                    name: change.name.clone(),
                    value: change.value.clone(),
                },
            );
        }
        self.flush();
    }

    // ------------------------------------------------------------------------
    // Time and painting
    // ------------------------------------------------------------------------

    /// Move the clock on, stepping animations and ticking views.
    ///
    /// Returns true while any doodle is still animating.
    pub fn advance(&mut self, dt: Duration) -> bool {
        self.clock += dt;
        let mut animating = false;
        for (_, doodle) in &mut self.doodles {
            animating |= doodle.advance(dt);
        }
        self.tick_views();
        animating
    }

    /// Paint every doodle back to front
    pub fn render(&mut self, canvas: &mut dyn Canvas) {
        canvas.save();
        canvas.transform(&self.base);
        for (_, doodle) in &mut self.doodles {
            doodle.render(canvas, &self.context, None);
        }
        canvas.restore();
    }

    // ------------------------------------------------------------------------
    // Reporting and persistence
    // ------------------------------------------------------------------------

    pub fn saved_doodles(&self) -> Vec<SavedDoodle> {
        self.doodles.iter().map(|(_, d)| d.saved()).collect()
    }

    /// One line per described doodle; grouped classes are reported once
    pub fn report(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut groups: Vec<String> = Vec::new();
        for (_, doodle) in &self.doodles {
            if let Some(group) = doodle.group_description() {
                if !groups.contains(&group) {
                    groups.push(group);
                }
                continue;
            }
            let description = doodle.description();
            if !description.is_empty() {
                lines.push(description);
            }
        }
        lines.extend(groups);
        lines
    }

    // ------------------------------------------------------------------------
    // Notification delivery
    // ------------------------------------------------------------------------

    fn emit(&mut self, event: EventName, payload: Payload) {
        self.bus.emit(Notification::new(event, self.clock, payload));
    }

    fn emit_doodle(&mut self, event: EventName, id: DoodleId) {
        if let Some(summary) = self.doodle(id).map(|d| d.summary(id)) {
            self.emit(event, Payload::Doodle(summary));
        }
    }

    /// Deliver everything queued, including notifications raised while
    /// delivering, then give views their end-of-batch tick
    pub fn flush(&mut self) {
        while let Some((notification, recipients)) = self.bus.next() {
            trace!(event = %notification.event, "delivering");
            for key in recipients {
                match key {
                    SubscriberKey::Doodle(id) => {
                        let Some((_, doodle)) = self.doodles.iter_mut().find(|(i, _)| *i == id) else {
                            continue;
                        };
                        let changes = doodle.notify(&notification, &self.context);
                        if changes.is_empty() {
                            continue;
                        }
                        let summary = doodle.summary(id);
                        for change in changes {
                            self.bus.emit(Notification::new(
                                EventName::ParameterChanged,
                                self.clock,
                                Payload::Parameter {
                                    doodle: summary,
                                    name: change.name,
                                    value: change.value,
                                },
                            ));
                        }
                    }
                    SubscriberKey::View(index) => {
                        if let Some(view) = self.views.get_mut(index) {
                            view.notify(&notification);
                        }
                    }
                }
            }
        }
        self.tick_views();
    }

    fn tick_views(&mut self) {
        for view in &mut self.views {
            view.tick(self.clock);
        }
    }
}

impl Surface for Drawing {
    fn context(&self) -> &DrawingContext {
        &self.context
    }

    fn has_doodle_of_class(&self, class: &str) -> bool {
        self.doodles.iter().any(|(_, d)| d.class_name().as_str() == class)
    }

    fn last_origin_of_class(&self, class: &str) -> Option<DVec2> {
        self.doodles
            .iter()
            .filter(|(_, d)| d.class_name().as_str() == class)
            .max_by_key(|(id, _)| *id)
            .map(|(_, d)| d.origin())
    }

    fn claim_chart_box(&mut self) -> Option<ChartBox> {
        let cell = self.chart.iter_mut().find(|c| !c.occupied)?;
        cell.occupied = true;
        Some(cell.cell)
    }

    fn chart_box_at(&self, position: DVec2) -> Option<ChartBox> {
        self.chart
            .iter()
            .map(|c| c.cell)
            .find(|cell| cell.position.distance(position) < 0.5)
    }
}
