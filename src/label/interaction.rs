//! Pointer handling for clickable labels.
//!
//! Click always stops propagation. The drag family only stops it when someone
//! listens on the label's channel, so an unobserved label drag still reaches
//! the map. Forwarded events always stop; a context menu is additionally
//! prevented when listened for.

use super::{Label, LabelEvent};
use crate::config::LabelOptions;
use crate::view::{HostView, PointerEvent, PointerEventKind, ViewNode};
use std::collections::BTreeSet;
use tracing::trace;

pub const CLICKABLE_CLASS: &str = "map-clickable";

pub const FORWARDED_EVENTS: [PointerEventKind; 5] = [
    PointerEventKind::DblClick,
    PointerEventKind::MouseDown,
    PointerEventKind::MouseOver,
    PointerEventKind::MouseOut,
    PointerEventKind::ContextMenu,
];

const DRAG_EVENTS: [PointerEventKind; 3] = [
    PointerEventKind::DragStart,
    PointerEventKind::Drag,
    PointerEventKind::DragEnd,
];

/// Pointer kinds currently listened for on the container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Interaction {
    registered: BTreeSet<PointerEventKind>,
}

impl Interaction {
    pub(crate) fn register<N: ViewNode>(&mut self, node: &N, options: &LabelOptions) {
        if !options.clickable || !self.registered.is_empty() {
            return;
        }
        node.add_class(CLICKABLE_CLASS);
        self.listen(node, PointerEventKind::Click);

        if !options.draggable {
            return;
        }
        node.set_draggable(true);
        for kind in DRAG_EVENTS.into_iter().chain(FORWARDED_EVENTS) {
            self.listen(node, kind);
        }
    }

    pub(crate) fn unregister<N: ViewNode>(&mut self, node: &N) {
        if self.registered.is_empty() {
            return;
        }
        node.remove_class(CLICKABLE_CLASS);
        if self.registered.contains(&PointerEventKind::DragStart) {
            node.set_draggable(false);
        }
        for kind in std::mem::take(&mut self.registered) {
            node.unlisten(kind);
        }
    }

    pub(crate) fn is_registered(&self, kind: PointerEventKind) -> bool {
        self.registered.contains(&kind)
    }

    fn listen<N: ViewNode>(&mut self, node: &N, kind: PointerEventKind) {
        if self.registered.insert(kind) {
            node.listen(kind);
        }
    }
}

impl<V: HostView> Label<V> {
    /// Pointer kinds the label handles while attached.
    pub fn interactive_events(&self) -> impl Iterator<Item = PointerEventKind> + '_ {
        self.interaction.registered.iter().copied()
    }

    /// Entry point for pointer events delivered to the container.
    pub fn handle_pointer_event(&mut self, event: &mut PointerEvent) {
        if !self.is_open() {
            return;
        }
        trace!(overlay = %self.id, event = %event.kind, "pointer event");

        if self.interaction.is_registered(event.kind) {
            match event.kind {
                PointerEventKind::Click => self.on_mouse_click(event),
                PointerEventKind::DragStart | PointerEventKind::DragEnd => {
                    self.on_drag_boundary(event)
                }
                PointerEventKind::Drag => self.on_drag(event),
                _ => self.fire_mouse_event(event),
            }
        }

        if self.tap_to_close && event.kind == PointerEventKind::Click {
            self.close();
        }
    }

    fn on_mouse_click(&mut self, event: &mut PointerEvent) {
        event.stop_propagation();
        self.fire(event);
    }

    fn on_drag_boundary(&mut self, event: &mut PointerEvent) {
        if self.events.has_listeners(event.kind) {
            event.stop_propagation();
        }
        self.fire(event);
    }

    fn on_drag(&mut self, event: &mut PointerEvent) {
        // Some platforms finish a drag with a bogus sample at the origin.
        if event.client.is_zero() {
            trace!(overlay = %self.id, "ignoring drag sample at the origin");
            return;
        }
        self.on_drag_boundary(event);

        let Some(view) = self.view() else {
            return;
        };
        let layer_point = view.container_point_to_layer_point(event.client);
        self.anchor = Some(view.layer_point_to_lat_lng(layer_point));
        self.update_position(&view);
    }

    fn fire_mouse_event(&mut self, event: &mut PointerEvent) {
        self.fire(event);
        if event.kind == PointerEventKind::ContextMenu && self.events.has_listeners(event.kind) {
            event.prevent_default();
        }
        event.stop_propagation();
    }

    fn fire(&mut self, event: &PointerEvent) {
        self.events.emit(&LabelEvent {
            kind: event.kind,
            original: event.clone(),
        });
    }
}
