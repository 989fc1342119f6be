/**
 * A simulated differential drive car. Every call to `HeadingCar::update`
 * advances the simulation by one step using the current motor commands, the
 * same way the real car integrates its gyroscope once per update.
 *
 * All handles share one vehicle state, so the odometers see the distance the
 * car drove and the sonar can be moved around by a test.
 */
use std::cell::RefCell;
use std::rc::Rc;

use crate::driver::{DistanceSensor, HeadingCar, MotorSpeed, Odometer, SonarDistance};
use crate::geometry::{normalize_heading, round_half_up, Degrees, Point};
use crate::navigation::Hardware;
use crate::transport::Transport;

const MAX_SPEED: MotorSpeed = 100;
/// Distance each wheel covers per step and unit of speed
pub const DISTANCE_PER_SPEED: f64 = 0.1;
/// Rotation per step and unit of speed difference between the wheels
pub const DEGREES_PER_SPEED: f64 = 0.04;

#[derive(Clone, Debug, PartialEq)]
pub struct VehicleState {
    pub position: Point,
    pub heading: f64,
    pub left_speed: MotorSpeed,
    pub right_speed: MotorSpeed,
    pub left_distance: f64,
    pub right_distance: f64,
    pub obstacle_distance: SonarDistance,
    pub steps: u64,
}

impl VehicleState {
    fn step(&mut self) {
        let left = self.left_speed as f64 * DISTANCE_PER_SPEED;
        let right = self.right_speed as f64 * DISTANCE_PER_SPEED;
        let rotation = (self.left_speed - self.right_speed) as f64 * 0.5 * DEGREES_PER_SPEED;
        self.heading = (self.heading + rotation).rem_euclid(360.0);

        let forward = (left + right) * 0.5;
        let (sine, cosine) = self.heading.to_radians().sin_cos();
        self.position.x += forward * sine;
        self.position.y += forward * cosine;

        // The encoders can't tell direction
        self.left_distance += left.abs();
        self.right_distance += right.abs();
        self.steps += 1;
    }
}


#[derive(Clone)]
pub struct Simulation {
    vehicle: Rc<RefCell<VehicleState>>,
}

impl Simulation {
    pub fn new(position: Point, heading: f64) -> Simulation {
        Simulation {
            vehicle: Rc::new(RefCell::new(VehicleState {
                position,
                heading: heading.rem_euclid(360.0),
                left_speed: 0,
                right_speed: 0,
                left_distance: 0.0,
                right_distance: 0.0,
                obstacle_distance: 0,
                steps: 0,
            })),
        }
    }

    /// Snapshot of the vehicle.
    pub fn state(&self) -> VehicleState {
        self.vehicle.borrow().clone()
    }

    pub fn set_obstacle_distance(&self, distance: SonarDistance) {
        self.vehicle.borrow_mut().obstacle_distance = distance;
    }

    pub fn hardware(&self) -> SimulatedHardware {
        SimulatedHardware {
            car: SimulatedCar { vehicle: self.vehicle.clone() },
            left_odometer: SimulatedOdometer { vehicle: self.vehicle.clone(), side: Side::Left },
            right_odometer: SimulatedOdometer { vehicle: self.vehicle.clone(), side: Side::Right },
            sonar: SimulatedSonar { vehicle: self.vehicle.clone() },
        }
    }
}


/// The collaborators of one simulated car, ready to be lent to a navigator.
pub struct SimulatedHardware {
    pub car: SimulatedCar,
    pub left_odometer: SimulatedOdometer,
    pub right_odometer: SimulatedOdometer,
    pub sonar: SimulatedSonar,
}

impl SimulatedHardware {
    pub fn lend<'a>(&'a mut self, transport: &'a mut dyn Transport) -> Hardware<'a> {
        Hardware {
            car: &mut self.car,
            left_odometer: &mut self.left_odometer,
            right_odometer: &mut self.right_odometer,
            sonar: &self.sonar,
            transport,
        }
    }
}


pub struct SimulatedCar {
    vehicle: Rc<RefCell<VehicleState>>,
}

impl HeadingCar for SimulatedCar {
    fn update(&mut self) {
        self.vehicle.borrow_mut().step();
    }

    fn heading(&self) -> Degrees {
        normalize_heading(round_half_up(self.vehicle.borrow().heading))
    }

    fn set_speed(&mut self, speed: MotorSpeed) {
        self.override_motor_speed(speed, speed);
    }

    fn override_motor_speed(&mut self, left: MotorSpeed, right: MotorSpeed) {
        let mut vehicle = self.vehicle.borrow_mut();
        vehicle.left_speed = num::clamp(left, -MAX_SPEED, MAX_SPEED);
        vehicle.right_speed = num::clamp(right, -MAX_SPEED, MAX_SPEED);
    }
}


#[derive(Clone, Copy, Debug, PartialEq)]
enum Side {
    Left,
    Right,
}

pub struct SimulatedOdometer {
    vehicle: Rc<RefCell<VehicleState>>,
    side: Side,
}

impl Odometer for SimulatedOdometer {
    fn distance(&self) -> f64 {
        let vehicle = self.vehicle.borrow();
        match self.side {
            Side::Left => vehicle.left_distance,
            Side::Right => vehicle.right_distance,
        }
    }

    fn reset(&mut self) {
        let mut vehicle = self.vehicle.borrow_mut();
        match self.side {
            Side::Left => vehicle.left_distance = 0.0,
            Side::Right => vehicle.right_distance = 0.0,
        }
    }
}


pub struct SimulatedSonar {
    vehicle: Rc<RefCell<VehicleState>>,
}

impl DistanceSensor for SimulatedSonar {
    fn distance(&self) -> SonarDistance {
        self.vehicle.borrow().obstacle_distance
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drives_straight() {
        let simulation = Simulation::new(Point::new(0.0, 0.0), 90.0);
        let mut hardware = simulation.hardware();
        hardware.car.set_speed(50);
        for _ in 0..10 {
            hardware.car.update();
        }
        let state = simulation.state();
        assert_approx_eq!(state.position.x, 50.0);
        assert!(state.position.y.abs() < 1e-9);
        assert_eq!(hardware.car.heading(), 90);
        assert_approx_eq!(hardware.left_odometer.distance(), 50.0);
        assert_approx_eq!(hardware.right_odometer.distance(), 50.0);

        hardware.left_odometer.reset();
        assert_approx_eq!(hardware.left_odometer.distance(), 0.0);
        assert_approx_eq!(hardware.right_odometer.distance(), 50.0);
    }

    #[test]
    fn test_rotates_on_spot() {
        let simulation = Simulation::new(Point::new(1.0, 2.0), 0.0);
        let mut hardware = simulation.hardware();
        hardware.car.override_motor_speed(-50, 50);
        hardware.car.update();
        assert_eq!(hardware.car.heading(), 358);
        let state = simulation.state();
        assert_eq!(state.position, Point::new(1.0, 2.0));
        // Both encoders count while spinning in place
        assert_approx_eq!(state.left_distance, 5.0);
        assert_approx_eq!(state.right_distance, 5.0);
    }

    #[test]
    fn test_clamps_speed() {
        let simulation = Simulation::new(Point::new(0.0, 0.0), 0.0);
        let mut hardware = simulation.hardware();
        hardware.car.override_motor_speed(250, -250);
        let state = simulation.state();
        assert_eq!(state.left_speed, 100);
        assert_eq!(state.right_speed, -100);
    }

    #[test]
    fn test_sonar() {
        let simulation = Simulation::new(Point::new(0.0, 0.0), 0.0);
        let hardware = simulation.hardware();
        assert_eq!(hardware.sonar.distance(), 0);
        simulation.set_obstacle_distance(12);
        assert_eq!(hardware.sonar.distance(), 12);
    }
}
