use super::{PointerEventKind, ViewNode};
use crate::config::TextConfig;
use crate::geo::Point;
use crate::text_metrics::markup_width;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

/// In-memory node that keeps every property a label sets on it.
///
/// Besides the current state it counts markup writes, width reads and hides,
/// which is what the scene trace and the tests observe.
#[derive(Debug, Clone)]
pub struct RetainedNode {
    inner: Rc<RefCell<NodeState>>,
}

#[derive(Debug)]
struct NodeState {
    classes: BTreeSet<String>,
    html: String,
    position: Option<Point>,
    opacity: f64,
    z_index: Option<i32>,
    visible: bool,
    draggable: bool,
    listeners: BTreeMap<PointerEventKind, usize>,
    html_writes: usize,
    width_reads: usize,
    hides: usize,
    text: TextConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    pub classes: Vec<String>,
    pub html: String,
    pub position: Option<Point>,
    pub opacity: f64,
    pub z_index: Option<i32>,
    pub visible: bool,
    pub draggable: bool,
    pub width: f64,
}

impl RetainedNode {
    pub fn new(class_name: &str, text: TextConfig) -> Self {
        let classes = class_name
            .split_whitespace()
            .map(|class| class.to_string())
            .collect();
        Self {
            inner: Rc::new(RefCell::new(NodeState {
                classes,
                html: String::new(),
                position: None,
                opacity: 1.0,
                z_index: None,
                visible: true,
                draggable: false,
                listeners: BTreeMap::new(),
                html_writes: 0,
                width_reads: 0,
                hides: 0,
                text,
            })),
        }
    }

    pub fn same_node(&self, other: &RetainedNode) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.inner.borrow().classes.contains(class)
    }

    pub fn classes(&self) -> Vec<String> {
        self.inner.borrow().classes.iter().cloned().collect()
    }

    pub fn html(&self) -> String {
        self.inner.borrow().html.clone()
    }

    pub fn position(&self) -> Option<Point> {
        self.inner.borrow().position
    }

    pub fn opacity(&self) -> f64 {
        self.inner.borrow().opacity
    }

    pub fn z_index(&self) -> Option<i32> {
        self.inner.borrow().z_index
    }

    pub fn is_visible(&self) -> bool {
        self.inner.borrow().visible
    }

    pub fn is_draggable(&self) -> bool {
        self.inner.borrow().draggable
    }

    pub fn listener_count(&self, kind: PointerEventKind) -> usize {
        self.inner
            .borrow()
            .listeners
            .get(&kind)
            .copied()
            .unwrap_or(0)
    }

    pub fn html_writes(&self) -> usize {
        self.inner.borrow().html_writes
    }

    pub fn width_reads(&self) -> usize {
        self.inner.borrow().width_reads
    }

    /// Number of times the node was hidden, i.e. full refreshes it went through.
    pub fn hides(&self) -> usize {
        self.inner.borrow().hides
    }

    /// Current width without counting it as a measurement.
    pub fn measured_width(&self) -> f64 {
        let state = self.inner.borrow();
        markup_width(&state.html, &state.text)
    }

    pub fn snapshot(&self) -> NodeSnapshot {
        let width = self.measured_width();
        let state = self.inner.borrow();
        NodeSnapshot {
            classes: state.classes.iter().cloned().collect(),
            html: state.html.clone(),
            position: state.position,
            opacity: state.opacity,
            z_index: state.z_index,
            visible: state.visible,
            draggable: state.draggable,
            width,
        }
    }
}

impl PartialEq for RetainedNode {
    fn eq(&self, other: &Self) -> bool {
        self.same_node(other)
    }
}

impl ViewNode for RetainedNode {
    fn add_class(&self, class: &str) {
        self.inner.borrow_mut().classes.insert(class.to_string());
    }

    fn remove_class(&self, class: &str) {
        self.inner.borrow_mut().classes.remove(class);
    }

    fn set_html(&self, html: &str) {
        let mut state = self.inner.borrow_mut();
        state.html = html.to_string();
        state.html_writes += 1;
    }

    fn offset_width(&self) -> f64 {
        self.inner.borrow_mut().width_reads += 1;
        self.measured_width()
    }

    fn set_position(&self, point: Point) {
        self.inner.borrow_mut().position = Some(point);
    }

    fn set_opacity(&self, opacity: f64) {
        self.inner.borrow_mut().opacity = opacity;
    }

    fn set_z_index(&self, z_index: i32) {
        self.inner.borrow_mut().z_index = Some(z_index);
    }

    fn set_visible(&self, visible: bool) {
        let mut state = self.inner.borrow_mut();
        if !visible {
            state.hides += 1;
        }
        state.visible = visible;
    }

    fn set_draggable(&self, draggable: bool) {
        self.inner.borrow_mut().draggable = draggable;
    }

    fn listen(&self, kind: PointerEventKind) {
        *self.inner.borrow_mut().listeners.entry(kind).or_insert(0) += 1;
    }

    fn unlisten(&self, kind: PointerEventKind) {
        let mut state = self.inner.borrow_mut();
        if let Some(count) = state.listeners.get_mut(&kind) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                state.listeners.remove(&kind);
            }
        }
    }
}
