use map_label::{Direction, Placement, Point, compute_position};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaceLabelRequest {
    anchor: Point,
    center: Point,
    #[serde(default)]
    direction: Direction,
    width: Option<f64>,
    offset: Option<Point>,
}

fn place(request: PlaceLabelRequest) -> Placement {
    let offset = request.offset.unwrap_or(Point::new(12.0, -15.0));
    compute_position(
        request.anchor,
        request.center,
        request.direction,
        request.width,
        offset,
    )
}

/// Place a label next to its anchor. Takes and returns JSON; points are
/// container pixels, `[x, y]` or `{x, y}`.
#[wasm_bindgen]
pub fn place_label(request_json: &str) -> Result<String, JsValue> {
    let request = serde_json::from_str::<PlaceLabelRequest>(request_json)
        .map_err(|error| JsValue::from_str(&error.to_string()))?;
    serde_json::to_string(&place(request)).map_err(|error| JsValue::from_str(&error.to_string()))
}
