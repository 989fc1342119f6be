/**
 * Planar coordinates and compass heading arithmetic. Headings are whole
 * degrees, clockwise from North; x points East and y points North.
 */
use std::fmt;

use crate::config::DEG_IN_CIRCLE;

pub type Degrees = i32;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}


/// Rounds half up, also for negative values.
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}


/**
 * Moves any heading into [0, 360). The result is congruent to the input.
 */
pub fn normalize_heading(heading: Degrees) -> Degrees {
    heading.rem_euclid(DEG_IN_CIRCLE)
}


/**
 * Returns the signed rotation in (-180, 180] that takes `current` to
 * `target`. Positive values are clockwise.
 */
pub fn shortest_turn(current: Degrees, target: Degrees) -> Degrees {
    let circle = DEG_IN_CIRCLE as i64;
    let difference = (target as i64 - current as i64).rem_euclid(circle);
    if difference > circle / 2 {
        (difference - circle) as Degrees
    } else {
        difference as Degrees
    }
}


/**
 * True if the headings are within `tolerance` of each other, allowing for
 * wraparound at North.
 */
pub fn heading_reached(current: Degrees, target: Degrees, tolerance: Degrees) -> bool {
    let difference = (target - current).abs();
    difference < tolerance || difference > DEG_IN_CIRCLE - tolerance
}


/// Compass bearing from one point to another, rounded to whole degrees.
pub fn bearing(from: &Point, to: &Point) -> Degrees {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    // x and y are swapped to count clockwise from North
    round_half_up(dx.atan2(dy).to_degrees())
}


pub fn distance(from: &Point, to: &Point) -> f64 {
    (to.x - from.x).hypot(to.y - from.y)
}
