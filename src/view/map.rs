use super::{
    HostView, MARKER_PANE, OverlayId, POPUP_PANE, RetainedNode, SphericalMercator, ViewEventKind,
};
use crate::config::{TextConfig, ViewConfig};
use crate::geo::{LatLng, Point};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// Reference slippy-map view.
///
/// Layer points are measured from the pixel origin fixed at the last view
/// reset; container points additionally include the map pane offset that
/// panning accumulates. Projected points are rounded to whole pixels.
#[derive(Debug)]
pub struct MapView {
    crs: SphericalMercator,
    size: Point,
    zoom: Cell<f64>,
    pixel_origin: Cell<Point>,
    pane_offset: Cell<Point>,
    panes: RefCell<BTreeMap<String, Vec<RetainedNode>>>,
    subscriptions: RefCell<BTreeMap<(ViewEventKind, OverlayId), usize>>,
    removals: RefCell<Vec<OverlayId>>,
    text: TextConfig,
}

impl MapView {
    pub fn new(view: &ViewConfig, text: &TextConfig) -> Self {
        let mut panes = BTreeMap::new();
        panes.insert(MARKER_PANE.to_string(), Vec::new());
        panes.insert(POPUP_PANE.to_string(), Vec::new());

        let map = Self {
            crs: SphericalMercator,
            size: Point::new(view.width, view.height),
            zoom: Cell::new(view.zoom),
            pixel_origin: Cell::new(Point::ZERO),
            pane_offset: Cell::new(Point::ZERO),
            panes: RefCell::new(panes),
            subscriptions: RefCell::new(BTreeMap::new()),
            removals: RefCell::new(Vec::new()),
            text: text.clone(),
        };
        map.reset_view(view.center, view.zoom, false);
        map
    }

    pub fn size(&self) -> Point {
        self.size
    }

    pub fn zoom(&self) -> f64 {
        self.zoom.get()
    }

    pub fn pixel_origin(&self) -> Point {
        self.pixel_origin.get()
    }

    pub fn pane_offset(&self) -> Point {
        self.pane_offset.get()
    }

    pub fn center(&self) -> LatLng {
        let half = self.size.scale(0.5);
        self.layer_point_to_lat_lng(self.container_point_to_layer_point(half))
    }

    pub fn lat_lng_to_container_point(&self, latlng: LatLng) -> Point {
        self.layer_point_to_container_point(self.lat_lng_to_layer_point(latlng))
    }

    pub fn container_point_to_lat_lng(&self, point: Point) -> LatLng {
        self.layer_point_to_lat_lng(self.container_point_to_layer_point(point))
    }

    /// Recompute the pixel origin for `center`/`zoom`. Without
    /// `preserve_offset` the pane offset goes back to zero.
    pub fn reset_view(&self, center: LatLng, zoom: f64, preserve_offset: bool) {
        self.zoom.set(zoom);
        let top_left = self.new_top_left(center, zoom);
        if preserve_offset {
            self.pixel_origin.set(top_left + self.pane_offset.get());
        } else {
            self.pane_offset.set(Point::ZERO);
            self.pixel_origin.set(top_left);
        }
    }

    /// Shift the visible area by `offset` pixels.
    pub fn pan_by(&self, offset: Point) {
        self.pane_offset.set(self.pane_offset.get() - offset.round());
    }

    pub fn pane_children(&self, pane: &str) -> Vec<RetainedNode> {
        self.panes.borrow().get(pane).cloned().unwrap_or_default()
    }

    pub fn subscribers(&self, kind: ViewEventKind) -> Vec<OverlayId> {
        self.subscriptions
            .borrow()
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, id)| *id)
            .collect()
    }

    /// Registrations of `overlay` for `kind`; more than one means a handler
    /// was registered twice.
    pub fn subscription_count(&self, kind: ViewEventKind, overlay: OverlayId) -> usize {
        self.subscriptions
            .borrow()
            .get(&(kind, overlay))
            .copied()
            .unwrap_or(0)
    }

    pub fn subscriptions_of(&self, overlay: OverlayId) -> Vec<(ViewEventKind, usize)> {
        self.subscriptions
            .borrow()
            .iter()
            .filter(|((_, id), _)| *id == overlay)
            .map(|((kind, _), count)| (*kind, *count))
            .collect()
    }

    pub fn take_removals(&self) -> Vec<OverlayId> {
        std::mem::take(&mut *self.removals.borrow_mut())
    }

    fn new_top_left(&self, center: LatLng, zoom: f64) -> Point {
        let half = self.size.scale(0.5);
        (self.crs.lat_lng_to_point(center, zoom) - half).round()
    }
}

impl HostView for MapView {
    type Node = RetainedNode;

    fn create_node(&self, class_name: &str) -> RetainedNode {
        RetainedNode::new(class_name, self.text.clone())
    }

    fn append_to_pane(&self, pane: &str, node: &RetainedNode) {
        let mut panes = self.panes.borrow_mut();
        let children = panes.entry(pane.to_string()).or_default();
        if !children.iter().any(|child| child.same_node(node)) {
            children.push(node.clone());
        }
    }

    fn remove_from_pane(&self, pane: &str, node: &RetainedNode) {
        if let Some(children) = self.panes.borrow_mut().get_mut(pane) {
            children.retain(|child| !child.same_node(node));
        }
    }

    fn lat_lng_to_layer_point(&self, latlng: LatLng) -> Point {
        self.crs.lat_lng_to_point(latlng, self.zoom.get()).round() - self.pixel_origin.get()
    }

    fn layer_point_to_lat_lng(&self, point: Point) -> LatLng {
        self.crs
            .point_to_lat_lng(point + self.pixel_origin.get(), self.zoom.get())
    }

    fn layer_point_to_container_point(&self, point: Point) -> Point {
        point + self.pane_offset.get()
    }

    fn container_point_to_layer_point(&self, point: Point) -> Point {
        point - self.pane_offset.get()
    }

    fn lat_lng_to_new_layer_point(&self, latlng: LatLng, zoom: f64, center: LatLng) -> Point {
        let top_left = self.new_top_left(center, zoom) + self.pane_offset.get();
        self.crs.lat_lng_to_point(latlng, zoom) - top_left
    }

    fn center_container_point(&self) -> Point {
        self.lat_lng_to_container_point(self.center())
    }

    fn subscribe(&self, kind: ViewEventKind, overlay: OverlayId) {
        *self
            .subscriptions
            .borrow_mut()
            .entry((kind, overlay))
            .or_insert(0) += 1;
    }

    fn unsubscribe(&self, kind: ViewEventKind, overlay: OverlayId) {
        let mut subscriptions = self.subscriptions.borrow_mut();
        if let Some(count) = subscriptions.get_mut(&(kind, overlay)) {
            *count -= 1;
            if *count == 0 {
                subscriptions.remove(&(kind, overlay));
            }
        }
    }

    fn remove_overlay(&self, overlay: OverlayId) {
        let mut removals = self.removals.borrow_mut();
        if !removals.contains(&overlay) {
            removals.push(overlay);
        }
    }
}
