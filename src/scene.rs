//! Host-side glue between a [`MapView`] and the labels placed on it.
//!
//! The scene plays the part of the map application: it fans view
//! notifications out to subscribed labels, delivers pointer events to a
//! label's container and lets unstopped clicks reach the map, and honors the
//! removal requests labels make through `close`.

use crate::config::{Config, Environment};
use crate::geo::{LatLng, Point};
use crate::label::Label;
use crate::view::{MapView, OverlayId, PointerEvent, PointerEventKind, ViewEvent};
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::debug;

#[derive(Debug)]
pub struct Scene {
    view: Rc<MapView>,
    environment: Environment,
    labels: BTreeMap<OverlayId, Label<MapView>>,
    map_clicks: Vec<Point>,
}

impl Scene {
    pub fn new(config: &Config) -> Self {
        Self {
            view: Rc::new(MapView::new(&config.view, &config.text)),
            environment: config.environment,
            labels: BTreeMap::new(),
            map_clicks: Vec::new(),
        }
    }

    pub fn view(&self) -> &Rc<MapView> {
        &self.view
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Take ownership of `label` without attaching it.
    pub fn add_label(&mut self, label: Label<MapView>) -> OverlayId {
        let id = label.id();
        self.labels.insert(id, label);
        id
    }

    pub fn open_label(&mut self, id: OverlayId) -> bool {
        let Some(label) = self.labels.get_mut(&id) else {
            return false;
        };
        label.on_add(&self.view);
        true
    }

    /// Close through the label, as a user-facing close would.
    pub fn close_label(&mut self, id: OverlayId) -> bool {
        let Some(label) = self.labels.get_mut(&id) else {
            return false;
        };
        label.close();
        self.process_removals();
        true
    }

    /// Detach and drop ownership of a label.
    pub fn remove_label(&mut self, id: OverlayId) -> Option<Label<MapView>> {
        let mut label = self.labels.remove(&id)?;
        label.on_remove(&self.view);
        Some(label)
    }

    pub fn label(&self, id: OverlayId) -> Option<&Label<MapView>> {
        self.labels.get(&id)
    }

    pub fn label_mut(&mut self, id: OverlayId) -> Option<&mut Label<MapView>> {
        self.labels.get_mut(&id)
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label<MapView>> {
        self.labels.values()
    }

    /// Container points of clicks that reached the map itself.
    pub fn map_clicks(&self) -> &[Point] {
        &self.map_clicks
    }

    /// Deliver a view notification to every label subscribed to its kind.
    pub fn dispatch(&mut self, event: ViewEvent) {
        if let ViewEvent::Click { container_point } = event {
            self.map_clicks.push(container_point);
        }
        for id in self.view.subscribers(event.kind()) {
            if let Some(label) = self.labels.get_mut(&id) {
                label.handle_view_event(&event);
            }
        }
        self.process_removals();
    }

    /// Deliver a pointer event to a label's container. A click nobody stopped
    /// continues to the map.
    pub fn pointer(&mut self, id: OverlayId, event: &mut PointerEvent) {
        if let Some(label) = self.labels.get_mut(&id) {
            label.handle_pointer_event(event);
        }
        self.process_removals();

        if event.kind == PointerEventKind::Click && !event.is_propagation_stopped() {
            self.dispatch(ViewEvent::Click {
                container_point: event.client,
            });
        }
    }

    pub fn pan_by(&mut self, offset: impl Into<Point>) {
        self.view.pan_by(offset.into());
        self.dispatch(ViewEvent::MoveEnd);
    }

    /// Move the view. An animated zoom change emits the zoom-animation frame
    /// and a soft reset that keeps the pane offset; anything else is a hard
    /// reset. Both finish with a move end.
    pub fn set_view(&mut self, center: impl Into<LatLng>, zoom: f64, animate: bool) {
        let center = center.into();
        let zoom_changed = zoom != self.view.zoom();

        if animate && zoom_changed && self.environment.any3d {
            self.dispatch(ViewEvent::ZoomAnim { zoom, center });
            self.view.reset_view(center, zoom, true);
            self.dispatch(ViewEvent::ViewReset { hard: false });
        } else {
            self.view.reset_view(center, zoom, false);
            self.dispatch(ViewEvent::ViewReset { hard: true });
        }
        self.dispatch(ViewEvent::MoveEnd);
    }

    /// Detach every label that asked the view to remove it.
    pub fn process_removals(&mut self) -> Vec<OverlayId> {
        let removed = self.view.take_removals();
        for id in &removed {
            if let Some(label) = self.labels.get_mut(id) {
                label.on_remove(&self.view);
                debug!(overlay = %id, "label removed by request");
            }
        }
        removed
    }
}
