//! Scripted label sessions and their per-step trace.
//!
//! A scenario declares named labels and a list of steps against the view or
//! a label. Replaying it records a [`Frame`] after the initial attach and
//! after each step.

use crate::config::{Config, LabelOptionsFile};
use crate::error::{ConfigError, ScenarioError};
use crate::geo::{LatLng, Point};
use crate::label::{Label, LabelSource, Side};
use crate::scene::Scene;
use crate::view::{HostView, NodeSnapshot, OverlayId, PointerEvent, PointerEventKind};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::rc::Rc;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub labels: Vec<LabelSpec>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSpec {
    pub name: String,
    pub latlng: Option<LatLng>,
    pub content: Option<String>,
    pub source: Option<LabelSource>,
    #[serde(default = "default_open")]
    pub open: bool,
    #[serde(default)]
    options: Option<LabelOptionsFile>,
}

fn default_open() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Step {
    Pan {
        by: Point,
    },
    SetView {
        center: LatLng,
        zoom: f64,
        #[serde(default)]
        animate: bool,
    },
    SetLatLng {
        label: String,
        latlng: LatLng,
    },
    SetContent {
        label: String,
        content: String,
    },
    SetOpacity {
        label: String,
        opacity: f64,
    },
    ZIndex {
        label: String,
        value: i32,
    },
    Pointer {
        label: String,
        event: PointerEventKind,
        at: Point,
    },
    Listen {
        label: String,
        event: PointerEventKind,
    },
    Close {
        label: String,
    },
    Open {
        label: String,
    },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Pan { .. } => "pan",
            Step::SetView { .. } => "setView",
            Step::SetLatLng { .. } => "setLatLng",
            Step::SetContent { .. } => "setContent",
            Step::SetOpacity { .. } => "setOpacity",
            Step::ZIndex { .. } => "zIndex",
            Step::Pointer { .. } => "pointer",
            Step::Listen { .. } => "listen",
            Step::Close { .. } => "close",
            Step::Open { .. } => "open",
        }
    }

    fn label(&self) -> Option<&str> {
        match self {
            Step::Pan { .. } | Step::SetView { .. } => None,
            Step::SetLatLng { label, .. }
            | Step::SetContent { label, .. }
            | Step::SetOpacity { label, .. }
            | Step::ZIndex { label, .. }
            | Step::Pointer { label, .. }
            | Step::Listen { label, .. }
            | Step::Close { label }
            | Step::Open { label } => Some(label.as_str()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Trace {
    pub frames: Vec<Frame>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub step: usize,
    pub op: String,
    pub view: ViewDump,
    pub labels: Vec<LabelDump>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer: Option<PointerDump>,
    pub events: Vec<EventDump>,
    pub map_clicks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDump {
    pub zoom: f64,
    pub center: LatLng,
    pub pixel_origin: Point,
    pub pane_offset: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelDump {
    pub name: String,
    pub open: bool,
    pub source: Option<LabelSource>,
    pub z_index: Option<i32>,
    pub side: Option<Side>,
    pub anchor: Option<LatLng>,
    pub layer_point: Option<Point>,
    pub container_point: Option<Point>,
    pub measured_width: Option<f64>,
    pub node: Option<NodeSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerDump {
    pub label: String,
    pub kind: PointerEventKind,
    pub propagation_stopped: bool,
    pub default_prevented: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDump {
    pub label: String,
    pub kind: PointerEventKind,
    pub client: Point,
}

type EventLog = Rc<RefCell<Vec<EventDump>>>;

/// Read a JSON5 scenario file.
pub fn load_scenario(path: &Path) -> Result<Scenario, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_scenario(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_scenario(contents: &str) -> Result<Scenario, json5::Error> {
    json5::from_str(contents)
}

/// Replay `scenario` on a fresh scene built from `config`. Returns the scene
/// in its final state together with the trace.
pub fn run_scenario(scenario: Scenario, config: &Config) -> Result<(Scene, Trace), ScenarioError> {
    let mut scene = Scene::new(config);
    let mut names: Vec<(String, OverlayId)> = Vec::new();

    for spec in scenario.labels {
        if names.iter().any(|(name, _)| *name == spec.name) {
            return Err(ScenarioError::DuplicateLabel { name: spec.name });
        }
        let mut options = config.label.clone();
        if let Some(file) = spec.options {
            options.merge(file);
        }
        let mut label = Label::new(options, config.environment, spec.source);
        if let Some(latlng) = spec.latlng {
            label = label.with_lat_lng(latlng);
        }
        if let Some(content) = spec.content {
            label = label.with_content(content);
        }
        let id = scene.add_label(label);
        if spec.open {
            scene.open_label(id);
        }
        names.push((spec.name, id));
    }

    let log: EventLog = Rc::new(RefCell::new(Vec::new()));
    let mut frames = vec![capture(&scene, &names, 0, "init", None, &log)];

    for (index, step) in scenario.steps.iter().enumerate() {
        let step_no = index + 1;
        let target = match step.label() {
            Some(name) => Some(resolve(&names, step_no, name)?),
            None => None,
        };
        debug!(step = step_no, op = step.name(), "scenario step");

        let pointer = apply_step(&mut scene, step, target, &log);
        frames.push(capture(&scene, &names, step_no, step.name(), pointer, &log));
    }

    Ok((scene, Trace { frames }))
}

fn resolve(names: &[(String, OverlayId)], step: usize, name: &str) -> Result<OverlayId, ScenarioError> {
    names
        .iter()
        .find(|(candidate, _)| candidate == name)
        .map(|(_, id)| *id)
        .ok_or_else(|| ScenarioError::UnknownLabel {
            step,
            name: name.to_string(),
        })
}

fn apply_step(
    scene: &mut Scene,
    step: &Step,
    target: Option<OverlayId>,
    log: &EventLog,
) -> Option<PointerDump> {
    match (step, target) {
        (Step::Pan { by }, _) => scene.pan_by(*by),
        (Step::SetView { center, zoom, animate }, _) => scene.set_view(*center, *zoom, *animate),
        (Step::SetLatLng { latlng, .. }, Some(id)) => {
            if let Some(label) = scene.label_mut(id) {
                label.set_lat_lng(*latlng);
            }
        }
        (Step::SetContent { content, .. }, Some(id)) => {
            if let Some(label) = scene.label_mut(id) {
                label.set_content(content.as_str());
            }
        }
        (Step::SetOpacity { opacity, .. }, Some(id)) => {
            if let Some(label) = scene.label_mut(id) {
                label.set_opacity(*opacity);
            }
        }
        (Step::ZIndex { value, .. }, Some(id)) => {
            if let Some(label) = scene.label_mut(id) {
                label.update_z_index(*value);
            }
        }
        (Step::Pointer { label, event, at }, Some(id)) => {
            let mut pointer = PointerEvent::new(*event, *at);
            scene.pointer(id, &mut pointer);
            return Some(PointerDump {
                label: label.clone(),
                kind: *event,
                propagation_stopped: pointer.is_propagation_stopped(),
                default_prevented: pointer.is_default_prevented(),
            });
        }
        (Step::Listen { label, event }, Some(id)) => {
            let sink = Rc::clone(log);
            let name = label.clone();
            if let Some(target) = scene.label_mut(id) {
                target.on(*event, move |fired| {
                    sink.borrow_mut().push(EventDump {
                        label: name.clone(),
                        kind: fired.kind,
                        client: fired.original.client,
                    });
                });
            }
        }
        (Step::Close { .. }, Some(id)) => {
            scene.close_label(id);
        }
        (Step::Open { .. }, Some(id)) => {
            scene.open_label(id);
        }
        (_, None) => {}
    }
    None
}

fn capture(
    scene: &Scene,
    names: &[(String, OverlayId)],
    step: usize,
    op: &str,
    pointer: Option<PointerDump>,
    log: &EventLog,
) -> Frame {
    let view = scene.view();
    let labels = names
        .iter()
        .filter_map(|(name, id)| {
            let label = scene.label(*id)?;
            let layer_point = label.position();
            Some(LabelDump {
                name: name.clone(),
                open: label.is_open(),
                source: label.source(),
                z_index: label.z_index(),
                side: label.side(),
                anchor: label.anchor(),
                layer_point,
                container_point: layer_point.map(|point| view.layer_point_to_container_point(point)),
                measured_width: label.measured_width(),
                node: label.container().map(|node| node.snapshot()),
            })
        })
        .collect();

    Frame {
        step,
        op: op.to_string(),
        view: ViewDump {
            zoom: view.zoom(),
            center: view.center(),
            pixel_origin: view.pixel_origin(),
            pane_offset: view.pane_offset(),
        },
        labels,
        pointer,
        events: std::mem::take(&mut *log.borrow_mut()),
        map_clicks: scene.map_clicks().len(),
    }
}

pub fn write_trace(trace: &Trace, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)?;
            let writer = BufWriter::new(file);
            serde_json::to_writer_pretty(writer, trace)?;
        }
        None => {
            println!("{}", serde_json::to_string_pretty(trace)?);
        }
    }
    Ok(())
}
