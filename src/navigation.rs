/**
 * Drives the car along the queued path. `tick` must be called repeatedly by
 * the main loop; each call reads the sensors, handles whatever arrived over
 * the link, and then advances the current turn or drive a little.
 *
 * A leg toward a waypoint is a turn on the spot followed by a straight drive.
 * Position is only known through dead reckoning and is snapped to the
 * waypoint once the leg is done.
 */
use crate::command::{format_position, Command, CommandBuffer};
use crate::config::{NavigatorConfig, DEG_IN_CIRCLE};
use crate::driver::{DistanceSensor, HeadingCar, Odometer};
use crate::error::PathError;
use crate::geometry::{bearing, distance, heading_reached, normalize_heading, shortest_turn, Degrees, Point};
use crate::path::Path;
use crate::position_estimator::PositionEstimator;
use crate::transport::Transport;

/// The collaborators the navigator works with. It borrows them for its whole
/// life but never owns them.
pub struct Hardware<'a> {
    pub car: &'a mut dyn HeadingCar,
    pub left_odometer: &'a mut dyn Odometer,
    pub right_odometer: &'a mut dyn Odometer,
    pub sonar: &'a dyn DistanceSensor,
    pub transport: &'a mut dyn Transport,
}


#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mode {
    Idle,
    Turning,
    Driving,
    /// Stopped for an obstacle. Takes precedence over the other modes.
    ProximityHalted,
}


#[derive(Clone, Copy, Debug, PartialEq)]
enum Motion {
    Idle,
    Turning { drive_distance: Option<f64> },
    /// `target_distance` is compared against the sum of both odometers, so
    /// it is twice the distance to drive.
    Driving { target_distance: f64 },
}


pub struct Navigator<'a> {
    car: &'a mut dyn HeadingCar,
    left_odometer: &'a mut dyn Odometer,
    right_odometer: &'a mut dyn Odometer,
    sonar: &'a dyn DistanceSensor,
    transport: &'a mut dyn Transport,

    config: NavigatorConfig,
    estimator: PositionEstimator,
    path: Path,
    command_buffer: CommandBuffer,

    position: Point,
    leg_origin: Point,
    heading: Degrees,
    target_heading: Degrees,
    distance_so_far: f64,
    destination: Option<Point>,
    motion: Motion,
    proximity_alert: bool,
}


impl<'a> Navigator<'a> {
    pub fn new(hardware: Hardware<'a>, position: Point, config: NavigatorConfig) -> Navigator<'a> {
        Navigator {
            car: hardware.car,
            left_odometer: hardware.left_odometer,
            right_odometer: hardware.right_odometer,
            sonar: hardware.sonar,
            transport: hardware.transport,
            config,
            estimator: PositionEstimator::new(config.odometer_scale),
            path: Path::new(config.path_capacity),
            command_buffer: CommandBuffer::new(config.buffer_capacity),
            position,
            leg_origin: position,
            heading: 0,
            target_heading: 0,
            distance_so_far: 0.0,
            destination: None,
            motion: Motion::Idle,
            proximity_alert: false,
        }
    }

    /**
     * Runs one control step. Sensor refresh, then the link, then the
     * proximity check, then motion, so a clear command that just arrived
     * takes effect before the car moves on.
     */
    pub fn tick(&mut self) {
        self.car.update();
        self.heading = self.car.heading();

        self.read_transport();

        if self.check_proximity() {
            return;
        }

        match self.motion {
            Motion::Turning { drive_distance } => {
                if heading_reached(self.heading, self.target_heading, self.config.angle_tolerance) {
                    self.car.set_speed(self.config.stop_speed);
                    self.motion = Motion::Idle;
                    match drive_distance {
                        Some(leg_distance) => self.move_forward(leg_distance),
                        None => debug!("Reached heading {}", self.heading),
                    }
                }
            },
            Motion::Driving { target_distance } => {
                self.update_position();
                if self.distance_so_far > target_distance {
                    self.finish_leg();
                }
            },
            Motion::Idle => self.set_next_goal(),
        }
    }

    /**
     * Starts a leg toward `destination` from the current position estimate.
     */
    pub fn go_to_point(&mut self, destination: Point) {
        self.destination = Some(destination);
        let heading = bearing(&self.position, &destination);
        let leg_distance = distance(&self.position, &destination);
        info!(
            "Heading to {} from {}: {} degrees, {:.1} away",
            destination,
            self.position,
            normalize_heading(heading),
            leg_distance);
        self.start_turn(heading, Some(leg_distance));
    }

    /**
     * Starts turning on the spot toward `heading`, taking the shorter way
     * around. Does not block; `tick` stops the turn once the heading is
     * reached.
     */
    pub fn rotate_to_heading(&mut self, heading: Degrees) {
        self.start_turn(heading, None);
    }

    /**
     * Starts driving straight for `distance` along the target heading. Does
     * not block; `tick` stops the car once the odometers have covered it.
     */
    pub fn move_forward(&mut self, distance: f64) {
        self.left_odometer.reset();
        self.right_odometer.reset();
        self.leg_origin = self.position;
        self.distance_so_far = 0.0;
        // Twice the distance, compared against the plain sum of both odometers
        self.motion = Motion::Driving { target_distance: 2.0 * distance };
        self.car.set_speed(self.config.speed);
    }

    /**
     * Rotates on the spot by `degrees`, clockwise for positive values, and
     * returns only once the rotation is done. Whole turns are ignored. Meant
     * for calibration while no path is being followed: any leg in progress
     * is abandoned.
     */
    pub fn rotate_on_spot(&mut self, degrees: Degrees) {
        let target = degrees % DEG_IN_CIRCLE;
        if target == 0 {
            return;
        }
        self.stop();
        self.destination = None;

        let speed = self.config.speed;
        if target > 0 {
            self.car.override_motor_speed(speed, -speed);
        } else {
            self.car.override_motor_speed(-speed, speed);
        }

        let initial = self.car.heading();
        let mut turned: Degrees = 0;
        while turned.abs() < target.abs() {
            self.car.update();
            let mut current = self.car.heading();
            // Keep the displacement signed across North
            if target < 0 && current > initial {
                current -= DEG_IN_CIRCLE;
            } else if target > 0 && current < initial {
                current += DEG_IN_CIRCLE;
            }
            turned = initial - current;
        }

        self.car.set_speed(self.config.stop_speed);
        self.heading = self.car.heading();
        debug!("Rotated {} degrees on the spot, now at {}", -turned, self.heading);
    }

    pub fn stop(&mut self) {
        self.car.set_speed(self.config.stop_speed);
        self.motion = Motion::Idle;
        self.distance_so_far = 0.0;
        self.leg_origin = self.position;
    }

    /// Stops the car and forgets every waypoint.
    pub fn clear_path(&mut self) {
        self.stop();
        self.path.clear();
        self.destination = None;
        info!("Path cleared");
    }

    pub fn add_point(&mut self, point: Point) -> Result<(), PathError> {
        self.path.append(point)?;
        debug!("Added {} to the path, {} pending", point, self.path.pending());
        Ok(())
    }

    /// Sends the rounded position over the link.
    pub fn publish_position(&mut self) {
        let report = format_position(&self.position);
        self.transport.print(&report);
    }

    pub fn mode(&self) -> Mode {
        if self.proximity_alert {
            return Mode::ProximityHalted;
        }
        match self.motion {
            Motion::Idle => Mode::Idle,
            Motion::Turning { .. } => Mode::Turning,
            Motion::Driving { .. } => Mode::Driving,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn heading(&self) -> Degrees {
        self.heading
    }

    pub fn target_heading(&self) -> Degrees {
        self.target_heading
    }

    pub fn destination(&self) -> Option<Point> {
        self.destination
    }

    pub fn distance_so_far(&self) -> f64 {
        self.distance_so_far
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn start_turn(&mut self, heading: Degrees, drive_distance: Option<f64>) {
        self.car.set_speed(self.config.stop_speed);
        let target = normalize_heading(heading);
        let difference = shortest_turn(self.heading, target);

        self.target_heading = target;
        self.motion = Motion::Turning { drive_distance };

        let speed = self.config.speed;
        if difference > 0 {
            self.car.override_motor_speed(speed, -speed);
        } else {
            self.car.override_motor_speed(-speed, speed);
        }
    }

    fn update_position(&mut self) {
        let estimate = self.estimator.estimate(
            &self.leg_origin,
            self.left_odometer.distance(),
            self.right_odometer.distance(),
            self.target_heading);
        self.position = estimate.position;
        self.distance_so_far = estimate.total_distance;
    }

    fn finish_leg(&mut self) {
        match self.destination.take() {
            Some(destination) => {
                debug!("Estimated {} on arrival at {}", self.position, destination);
                self.position = destination;
            },
            None => debug!("Drove to {}", self.position),
        }
        self.stop();
        self.publish_position();
        info!("Reached {}", self.position);
    }

    fn set_next_goal(&mut self) {
        if let Some(point) = self.path.consume_next() {
            debug!("Setting next goal, {} left after it", self.path.pending());
            self.go_to_point(point);
        }
    }

    /**
     * Returns true while there is an obstacle in front of the car.
     */
    fn check_proximity(&mut self) -> bool {
        let reading = self.sonar.distance();
        if !self.proximity_alert {
            // Non-positive readings mean no echo
            if reading > 0 && reading < self.config.safety_distance {
                self.car.set_speed(self.config.stop_speed);
                self.proximity_alert = true;
                warn!("Obstacle {} cm ahead, halting", reading);
            }
        } else if reading > self.config.safety_distance {
            self.proximity_alert = false;
            info!("Obstacle cleared");
            self.resume();
        }
        self.proximity_alert
    }

    /**
     * Picks up after an obstacle. With a destination the leg is planned
     * again from the current estimate; otherwise the interrupted turn or
     * drive is restarted as it was.
     */
    fn resume(&mut self) {
        if let Some(destination) = self.destination {
            self.go_to_point(destination);
            return;
        }
        match self.motion {
            Motion::Turning { drive_distance } => self.start_turn(self.target_heading, drive_distance),
            Motion::Driving { .. } => self.car.set_speed(self.config.speed),
            Motion::Idle => (),
        }
    }

    fn read_transport(&mut self) {
        while self.transport.available() > 0 {
            let byte = match self.transport.read() {
                Some(byte) => byte,
                None => break,
            };
            match self.command_buffer.push(byte) {
                Some(Ok(command)) => self.handle_command(command),
                Some(Err(e)) => debug!("Discarding command: {}", e),
                None => (),
            }
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::ClearPath => self.clear_path(),
            Command::AppendPoint(point) => {
                if let Err(e) = self.add_point(point) {
                    warn!("Dropping {}: {}", point, e);
                }
            },
        }
    }
}
