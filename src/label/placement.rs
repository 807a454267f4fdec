// Side selection and offset arithmetic for a label next to its anchor.
// Pure geometry; the lifecycle applies the result to the container.

use crate::config::Direction;
use crate::geo::Point;
use serde::Serialize;

pub const LEFT_CLASS: &str = "map-label-left";
pub const RIGHT_CLASS: &str = "map-label-right";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn class_name(self) -> &'static str {
        match self {
            Side::Left => LEFT_CLASS,
            Side::Right => RIGHT_CLASS,
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub point: Point,
    pub side: Side,
}

/// Right of the anchor for `Right`, or for `Auto` while the anchor is left of
/// the viewport center. Everything else, including an anchor exactly on the
/// center line, goes left.
pub fn resolve_side(anchor: Point, center: Point, direction: Direction) -> Side {
    match direction {
        Direction::Right => Side::Right,
        Direction::Auto if anchor.x < center.x => Side::Right,
        Direction::Auto | Direction::Left => Side::Left,
    }
}

/// Final point for a label on `side`. Left placement shifts by the label width
/// so the label's right edge sits `offset.x` away from the anchor; an unknown
/// width counts as zero.
pub fn apply_side(anchor: Point, side: Side, measured_width: Option<f64>, offset: Point) -> Point {
    match side {
        Side::Right => anchor + offset,
        Side::Left => {
            let width = measured_width.unwrap_or(0.0);
            anchor + Point::new(-offset.x - width, offset.y)
        }
    }
}

pub fn compute_position(
    anchor: Point,
    center: Point,
    direction: Direction,
    measured_width: Option<f64>,
    offset: Point,
) -> Placement {
    let side = resolve_side(anchor, center, direction);
    Placement {
        point: apply_side(anchor, side, measured_width, offset),
        side,
    }
}
