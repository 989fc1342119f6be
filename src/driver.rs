use crate::geometry::Degrees;

/// Signed motor command, -100 (full reverse) to 100 (full forward).
pub type MotorSpeed = i32;
/// Centimeters reported by the ultrasound sensor. Non-positive means no echo.
pub type SonarDistance = i32;

/// Provides an interface to drive the car and read its heading.
pub trait HeadingCar {
    /// Integrates the latest heading sensor readings.
    fn update(&mut self);
    /// Heading in [0, 360), clockwise from North.
    fn heading(&self) -> Degrees;
    /// Drives both sides at the same speed.
    fn set_speed(&mut self, speed: MotorSpeed);
    fn override_motor_speed(&mut self, left: MotorSpeed, right: MotorSpeed);
}

/// A wheel encoder that cannot tell forward from backward.
pub trait Odometer {
    /// Distance travelled since the last reset. Never negative.
    fn distance(&self) -> f64;
    fn reset(&mut self);
}

/// Forward facing proximity sensor.
pub trait DistanceSensor {
    fn distance(&self) -> SonarDistance;
}
