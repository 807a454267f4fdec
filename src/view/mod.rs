//! Host-side collaborators of a label.
//!
//! A label never talks to a rendering surface or a map engine directly. It goes
//! through [`HostView`] for projection, panes and notifications, and through
//! [`ViewNode`] for every mutation of its rendered container. `map`, `node` and
//! `projection` provide a reference host used by the scene, the CLI and the tests.

pub mod map;
pub mod node;
pub mod projection;

use crate::geo::{LatLng, Point};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use map::MapView;
pub use node::{NodeSnapshot, RetainedNode};
pub use projection::SphericalMercator;

pub const MARKER_PANE: &str = "markerPane";
pub const POPUP_PANE: &str = "popupPane";

/// Identity of an overlay as seen by its host. Subscriptions and removal
/// requests are keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OverlayId(pub u64);

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "overlay#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewEventKind {
    MoveEnd,
    ViewReset,
    ZoomAnim,
    Click,
}

/// Notifications a host view delivers to its subscribers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewEvent {
    MoveEnd,
    /// `hard` is set when the projection changed discontinuously.
    ViewReset { hard: bool },
    /// An animated zoom towards `zoom`/`center` is in progress.
    ZoomAnim { zoom: f64, center: LatLng },
    Click { container_point: Point },
}

impl ViewEvent {
    pub fn kind(&self) -> ViewEventKind {
        match self {
            ViewEvent::MoveEnd => ViewEventKind::MoveEnd,
            ViewEvent::ViewReset { .. } => ViewEventKind::ViewReset,
            ViewEvent::ZoomAnim { .. } => ViewEventKind::ZoomAnim,
            ViewEvent::Click { .. } => ViewEventKind::Click,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEventKind {
    Click,
    DblClick,
    MouseDown,
    MouseOver,
    MouseOut,
    ContextMenu,
    DragStart,
    Drag,
    DragEnd,
}

impl PointerEventKind {
    pub const ALL: [PointerEventKind; 9] = [
        PointerEventKind::Click,
        PointerEventKind::DblClick,
        PointerEventKind::MouseDown,
        PointerEventKind::MouseOver,
        PointerEventKind::MouseOut,
        PointerEventKind::ContextMenu,
        PointerEventKind::DragStart,
        PointerEventKind::Drag,
        PointerEventKind::DragEnd,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PointerEventKind::Click => "click",
            PointerEventKind::DblClick => "dblclick",
            PointerEventKind::MouseDown => "mousedown",
            PointerEventKind::MouseOver => "mouseover",
            PointerEventKind::MouseOut => "mouseout",
            PointerEventKind::ContextMenu => "contextmenu",
            PointerEventKind::DragStart => "dragstart",
            PointerEventKind::Drag => "drag",
            PointerEventKind::DragEnd => "dragend",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for PointerEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Low-level pointer event delivered to a label's container.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    /// Pointer position relative to the map container.
    pub client: Point,
    propagation_stopped: bool,
    default_prevented: bool,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, client: impl Into<Point>) -> Self {
        Self {
            kind,
            client: client.into(),
            propagation_stopped: false,
            default_prevented: false,
        }
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Rendered container of a label. Implementations are handles: cloning one
/// refers to the same underlying node.
pub trait ViewNode {
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn set_html(&self, html: &str);
    /// Laid-out width of the node in pixels.
    fn offset_width(&self) -> f64;
    fn set_position(&self, point: Point);
    fn set_opacity(&self, opacity: f64);
    fn set_z_index(&self, z_index: i32);
    fn set_visible(&self, visible: bool);
    fn set_draggable(&self, draggable: bool);
    /// Listener registrations are counted per kind; every `listen` is paired
    /// with exactly one `unlisten`.
    fn listen(&self, kind: PointerEventKind);
    fn unlisten(&self, kind: PointerEventKind);
}

/// The map view a label attaches to.
pub trait HostView {
    type Node: ViewNode;

    fn create_node(&self, class_name: &str) -> Self::Node;
    fn append_to_pane(&self, pane: &str, node: &Self::Node);
    fn remove_from_pane(&self, pane: &str, node: &Self::Node);

    fn lat_lng_to_layer_point(&self, latlng: LatLng) -> Point;
    fn layer_point_to_lat_lng(&self, point: Point) -> LatLng;
    fn layer_point_to_container_point(&self, point: Point) -> Point;
    fn container_point_to_layer_point(&self, point: Point) -> Point;
    /// Layer point `latlng` will have once a zoom to `zoom`/`center` completes.
    fn lat_lng_to_new_layer_point(&self, latlng: LatLng, zoom: f64, center: LatLng) -> Point;
    /// Container point of the current view center.
    fn center_container_point(&self) -> Point;

    fn subscribe(&self, kind: ViewEventKind, overlay: OverlayId);
    fn unsubscribe(&self, kind: ViewEventKind, overlay: OverlayId);
    /// Ask the host to detach `overlay`. The host answers by calling `on_remove`.
    fn remove_overlay(&self, overlay: OverlayId);
}
