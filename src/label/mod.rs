//! The label overlay: a block of markup glued next to a geographic anchor.
//!
//! A [`Label`] is created detached. The host attaches it with [`Label::on_add`],
//! after which it keeps its container positioned through the host's
//! notifications until the host calls [`Label::on_remove`]. The container is
//! created on first attach and kept across detach/re-attach cycles.

pub mod content;
pub mod emitter;
pub mod interaction;
pub mod placement;

use crate::config::{Direction, Environment, LabelOptions};
use crate::geo::{LatLng, Point};
use crate::view::{
    HostView, MARKER_PANE, OverlayId, POPUP_PANE, PointerEventKind, ViewEvent, ViewEventKind,
    ViewNode,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace, warn};

pub use content::ContentCache;
pub use emitter::{EventEmitter, LabelEvent, ListenerId};
pub use interaction::{CLICKABLE_CLASS, FORWARDED_EVENTS};
pub use placement::{Placement, Side, apply_side, compute_position, resolve_side};

pub const LABEL_CLASS: &str = "map-label";
pub const ZOOM_ANIMATED_CLASS: &str = "map-zoom-animated";

static NEXT_OVERLAY_ID: AtomicU64 = AtomicU64::new(1);

/// Kind of map feature a label was bound to. Only used to pick a default pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelSource {
    Marker,
    Path,
}

pub struct Label<V: HostView> {
    id: OverlayId,
    options: LabelOptions,
    environment: Environment,
    animated: bool,
    source: Option<LabelSource>,
    anchor: Option<LatLng>,
    content: ContentCache,
    z_index: Option<i32>,
    host: Option<Weak<V>>,
    pane: Option<String>,
    container: Option<V::Node>,
    events: EventEmitter,
    interaction: interaction::Interaction,
    subscriptions: BTreeSet<ViewEventKind>,
    tap_to_close: bool,
    placement: Option<Placement>,
}

impl<V: HostView> Label<V> {
    pub fn new(options: LabelOptions, environment: Environment, source: Option<LabelSource>) -> Self {
        let animated = environment.any3d && options.zoom_animation;
        Self {
            id: OverlayId(NEXT_OVERLAY_ID.fetch_add(1, Ordering::Relaxed)),
            options,
            environment,
            animated,
            source,
            anchor: None,
            content: ContentCache::default(),
            z_index: None,
            host: None,
            pane: None,
            container: None,
            events: EventEmitter::new(),
            interaction: interaction::Interaction::default(),
            subscriptions: BTreeSet::new(),
            tap_to_close: false,
            placement: None,
        }
    }

    pub fn with_lat_lng(mut self, latlng: impl Into<LatLng>) -> Self {
        self.anchor = Some(latlng.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content.set(content);
        self
    }

    pub fn id(&self) -> OverlayId {
        self.id
    }

    pub fn options(&self) -> &LabelOptions {
        &self.options
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Whether continuous zoom tracking is in effect.
    pub fn is_animated(&self) -> bool {
        self.animated
    }

    pub fn source(&self) -> Option<LabelSource> {
        self.source
    }

    pub fn anchor(&self) -> Option<LatLng> {
        self.anchor
    }

    pub fn content(&self) -> Option<&str> {
        self.content.content()
    }

    pub fn measured_width(&self) -> Option<f64> {
        self.content.width()
    }

    pub fn z_index(&self) -> Option<i32> {
        self.z_index
    }

    pub fn is_open(&self) -> bool {
        self.host.is_some()
    }

    pub fn pane(&self) -> Option<&str> {
        self.pane.as_deref()
    }

    pub fn container(&self) -> Option<&V::Node> {
        self.container.as_ref()
    }

    /// Last placement applied to the container, in layer coordinates.
    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    pub fn side(&self) -> Option<Side> {
        self.placement.map(|placement| placement.side)
    }

    pub fn position(&self) -> Option<Point> {
        self.placement.map(|placement| placement.point)
    }

    pub fn subscriptions(&self) -> impl Iterator<Item = ViewEventKind> + '_ {
        self.subscriptions.iter().copied()
    }

    pub fn has_tap_to_close(&self) -> bool {
        self.tap_to_close
    }

    pub fn on<F>(&mut self, kind: PointerEventKind, listener: F) -> ListenerId
    where
        F: FnMut(&LabelEvent) + 'static,
    {
        self.events.on(kind, listener)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    pub fn has_listeners(&self, kind: PointerEventKind) -> bool {
        self.events.has_listeners(kind)
    }

    pub fn set_lat_lng(&mut self, latlng: impl Into<LatLng>) -> &mut Self {
        self.anchor = Some(latlng.into());
        if let Some(view) = self.view() {
            self.update_position(&view);
        }
        self
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> &mut Self {
        self.content.set(content);
        self.update_content();
        self
    }

    /// Ask the host to detach this label. The host answers with `on_remove`.
    pub fn close(&mut self) {
        let Some(view) = self.view() else {
            return;
        };
        self.uninstall_tap_to_close(&view);
        debug!(overlay = %self.id, "requesting removal from host view");
        view.remove_overlay(self.id);
    }

    pub fn update_z_index(&mut self, z_index: i32) {
        self.z_index = Some(z_index);
        if let Some(container) = &self.container {
            container.set_z_index(z_index);
        }
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        let opacity = opacity.clamp(0.0, 1.0);
        self.options.opacity = opacity;
        if let Some(container) = &self.container {
            container.set_opacity(opacity);
        }
    }

    pub fn on_add(&mut self, view: &Rc<V>) {
        if self.is_open() {
            match self.view() {
                Some(current) => self.on_remove(&current),
                None => self.forget_host(),
            }
        }
        self.host = Some(Rc::downgrade(view));

        let pane = self.resolve_pane();
        let class_name = self.container_class();
        let z_index = self.z_index;
        let container = self.container.get_or_insert_with(|| {
            let node = view.create_node(&class_name);
            if let Some(z_index) = z_index {
                node.set_z_index(z_index);
            }
            node
        });
        view.append_to_pane(&pane, container);
        self.interaction.register(container, &self.options);
        self.pane = Some(pane);

        self.update(view);
        self.set_opacity(self.options.opacity);

        self.subscribe(view, ViewEventKind::MoveEnd);
        self.subscribe(view, ViewEventKind::ViewReset);
        if self.animated {
            self.subscribe(view, ViewEventKind::ZoomAnim);
        }

        if self.environment.touch && !self.options.no_hide {
            if let Some(container) = &self.container {
                container.listen(PointerEventKind::Click);
            }
            self.subscribe(view, ViewEventKind::Click);
            self.tap_to_close = true;
        }

        debug!(
            overlay = %self.id,
            pane = self.pane.as_deref().unwrap_or_default(),
            animated = self.animated,
            "label attached"
        );
    }

    pub fn on_remove(&mut self, view: &V) {
        if self.host.is_none() {
            return;
        }
        self.uninstall_tap_to_close(view);

        for kind in std::mem::take(&mut self.subscriptions) {
            view.unsubscribe(kind, self.id);
        }

        if let Some(container) = &self.container {
            if let Some(pane) = self.pane.take() {
                view.remove_from_pane(&pane, container);
            }
            self.interaction.unregister(container);
        }

        self.host = None;
        debug!(overlay = %self.id, "label detached");
    }

    /// Detach bookkeeping for a host that no longer exists.
    fn forget_host(&mut self) {
        if let Some(container) = &self.container {
            if self.tap_to_close {
                container.unlisten(PointerEventKind::Click);
            }
            self.interaction.unregister(container);
        }
        self.tap_to_close = false;
        self.subscriptions.clear();
        self.pane = None;
        self.host = None;
        debug!(overlay = %self.id, "host view gone, label state reset");
    }

    /// Entry point for host notifications this label subscribed to.
    pub fn handle_view_event(&mut self, event: &ViewEvent) {
        if !self.subscriptions.contains(&event.kind()) {
            return;
        }
        let Some(view) = self.view() else {
            return;
        };
        match *event {
            ViewEvent::MoveEnd => self.on_move_end(&view),
            ViewEvent::ViewReset { hard } => self.on_view_reset(&view, hard),
            ViewEvent::ZoomAnim { zoom, center } => self.zoom_animation(&view, zoom, center),
            ViewEvent::Click { .. } => self.close(),
        }
    }

    fn view(&self) -> Option<Rc<V>> {
        let view = self.host.as_ref()?.upgrade();
        if view.is_none() {
            warn!(overlay = %self.id, "host view dropped while label attached");
        }
        view
    }

    fn resolve_pane(&self) -> String {
        match (&self.options.pane, self.source) {
            (Some(pane), _) => pane.clone(),
            (None, Some(LabelSource::Marker)) => MARKER_PANE.to_string(),
            (None, _) => POPUP_PANE.to_string(),
        }
    }

    fn container_class(&self) -> String {
        [LABEL_CLASS, self.options.class_name.trim(), ZOOM_ANIMATED_CLASS]
            .iter()
            .filter(|class| !class.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn subscribe(&mut self, view: &V, kind: ViewEventKind) {
        if self.subscriptions.insert(kind) {
            view.subscribe(kind, self.id);
        }
    }

    fn uninstall_tap_to_close(&mut self, view: &V) {
        if !self.tap_to_close {
            return;
        }
        if let Some(container) = &self.container {
            container.unlisten(PointerEventKind::Click);
        }
        if self.subscriptions.remove(&ViewEventKind::Click) {
            view.unsubscribe(ViewEventKind::Click, self.id);
        }
        self.tap_to_close = false;
    }

    /// Full refresh: hidden while content and position are brought up to date.
    fn update(&mut self, view: &V) {
        let Some(container) = &self.container else {
            return;
        };
        container.set_visible(false);
        self.update_content();
        self.update_position(view);
        if let Some(container) = &self.container {
            container.set_visible(true);
        }
    }

    fn update_content(&mut self) {
        if !self.is_open() {
            return;
        }
        if let Some(container) = &self.container
            && self.content.render_if_changed(container)
        {
            trace!(overlay = %self.id, width = ?self.content.width(), "content rendered");
        }
    }

    fn update_position(&mut self, view: &V) {
        let Some(anchor) = self.anchor else {
            warn!(overlay = %self.id, "label positioned before an anchor was set");
            return;
        };
        let layer_point = view.lat_lng_to_layer_point(anchor);
        self.set_position(view, layer_point);
    }

    fn set_position(&mut self, view: &V, layer_point: Point) {
        let Some(container) = &self.container else {
            return;
        };
        let center = view.center_container_point();
        let anchor = view.layer_point_to_container_point(layer_point);
        let side = resolve_side(anchor, center, self.options.direction);
        let point = apply_side(layer_point, side, self.content.width(), self.options.offset);

        container.add_class(side.class_name());
        container.remove_class(side.opposite().class_name());
        container.set_position(point);

        trace!(overlay = %self.id, ?side, x = point.x, y = point.y, "label positioned");
        self.placement = Some(Placement { point, side });
    }

    fn zoom_animation(&mut self, view: &V, zoom: f64, center: LatLng) {
        let Some(anchor) = self.anchor else {
            return;
        };
        let layer_point = view.lat_lng_to_new_layer_point(anchor, zoom, center).round();
        self.set_position(view, layer_point);
    }

    fn on_move_end(&mut self, view: &V) {
        // Animated fixed-side labels already tracked the zoom frame by frame.
        if !self.animated || self.options.direction == Direction::Auto {
            self.update_position(view);
        }
    }

    fn on_view_reset(&mut self, view: &V, hard: bool) {
        if hard {
            self.update(view);
        }
    }
}

impl<V: HostView> fmt::Debug for Label<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Label")
            .field("id", &self.id)
            .field("options", &self.options)
            .field("anchor", &self.anchor)
            .field("content", &self.content)
            .field("open", &self.is_open())
            .field("pane", &self.pane)
            .field("placement", &self.placement)
            .field("subscriptions", &self.subscriptions)
            .field("events", &self.events)
            .finish()
    }
}
