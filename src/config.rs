/**
 * Build time constants for the path finder. Nothing here is configurable at
 * run time; `NavigatorConfig` only bundles the values so that tests can use a
 * smaller path or a different threshold.
 */
use crate::driver::{MotorSpeed, SonarDistance};
use crate::geometry::Degrees;

pub const DEFAULT_SPEED: MotorSpeed = 50;
pub const STOP_SPEED: MotorSpeed = 0;
/// Centimeters. Closer readings halt the car.
pub const SAFETY_DISTANCE: SonarDistance = 20;
pub const ANGLE_TOLERANCE: Degrees = 3;
pub const DEG_IN_CIRCLE: Degrees = 360;
/// Converts odometer readings into path coordinate units
pub const ODOMETER_SCALE: f64 = 1.0;
pub const MAX_PATH_LENGTH: usize = 32;
pub const BUFFER_SIZE: usize = 32;

// Protocol sentinels
pub const APPENDER: u8 = b'[';
pub const SEPARATOR: u8 = b',';
pub const CLOSER: u8 = b']';
pub const CLEAR_CLASS: u8 = b'F';
pub const CLEAR_COMMAND: &[u8] = b"FCLR";
pub const TERMINATOR: u8 = b'\n';

pub const BAUD_RATE: u32 = 9600;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavigatorConfig {
    pub speed: MotorSpeed,
    pub stop_speed: MotorSpeed,
    pub safety_distance: SonarDistance,
    pub angle_tolerance: Degrees,
    pub odometer_scale: f64,
    pub path_capacity: usize,
    pub buffer_capacity: usize,
}

impl NavigatorConfig {
    /**
     * The default configuration driving at a different speed. Negative speeds
     * are flipped, the car always drives forward.
     */
    pub fn with_speed(speed: MotorSpeed) -> NavigatorConfig {
        NavigatorConfig {
            speed: speed.abs(),
            ..NavigatorConfig::default()
        }
    }
}

impl Default for NavigatorConfig {
    fn default() -> NavigatorConfig {
        NavigatorConfig {
            speed: DEFAULT_SPEED,
            stop_speed: STOP_SPEED,
            safety_distance: SAFETY_DISTANCE,
            angle_tolerance: ANGLE_TOLERANCE,
            odometer_scale: ODOMETER_SCALE,
            path_capacity: MAX_PATH_LENGTH,
            buffer_capacity: BUFFER_SIZE,
        }
    }
}
