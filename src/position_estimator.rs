/**
 * Dead reckoning for a single leg. The car drives in a straight line after
 * turning, so the displacement is decomposed along the commanded heading of
 * the leg rather than integrated over the live heading.
 */
use crate::geometry::{Degrees, Point};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Estimate {
    pub position: Point,
    /// Scaled sum of both wheel readings. This is twice the distance the
    /// middle of the car travelled.
    pub total_distance: f64,
}


pub struct PositionEstimator {
    scale: f64,
}


impl PositionEstimator {
    pub fn new(scale: f64) -> PositionEstimator {
        PositionEstimator { scale }
    }

    /**
     * Estimates the position reached from `origin` given odometer readings
     * that were reset when the leg started.
     */
    pub fn estimate(&self, origin: &Point, left: f64, right: f64, heading: Degrees) -> Estimate {
        let total_distance = self.scale * (left + right);
        let half_distance = total_distance * 0.5;
        let (sine, cosine) = (heading as f64).to_radians().sin_cos();
        Estimate {
            position: Point {
                x: origin.x + half_distance * sine,
                y: origin.y + half_distance * cosine,
            },
            total_distance,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::PositionEstimator;
    use crate::geometry::Point;

    fn check(heading: i32, left: f64, right: f64, expected: (f64, f64)) {
        let estimator = PositionEstimator::new(1.0);
        let estimate = estimator.estimate(&Point::new(10.0, -5.0), left, right, heading);
        assert_approx_eq!(estimate.position.x, 10.0 + expected.0);
        assert_approx_eq!(estimate.position.y, -5.0 + expected.1);
        assert_approx_eq!(estimate.total_distance, left + right);
    }

    #[test]
    fn test_cardinal_headings() {
        check(0, 50.0, 50.0, (0.0, 50.0));
        check(90, 50.0, 50.0, (50.0, 0.0));
        check(180, 50.0, 50.0, (0.0, -50.0));
        check(270, 50.0, 50.0, (-50.0, 0.0));
    }

    #[test]
    fn test_uneven_wheels_average() {
        // The midpoint travels the mean of both wheels
        check(0, 40.0, 60.0, (0.0, 50.0));
    }

    #[test]
    fn test_diagonal() {
        let half = 2.0f64.sqrt() * 0.5 * 10.0;
        check(45, 10.0, 10.0, (half, half));
        check(-45, 10.0, 10.0, (-half, half));
    }

    #[test]
    fn test_scale() {
        let estimator = PositionEstimator::new(0.5);
        let estimate = estimator.estimate(&Point::new(0.0, 0.0), 100.0, 100.0, 0);
        assert_approx_eq!(estimate.total_distance, 100.0);
        assert_approx_eq!(estimate.position.y, 50.0);
    }

    #[test]
    fn test_no_movement() {
        let estimator = PositionEstimator::new(1.0);
        let origin = Point::new(3.0, 4.0);
        let estimate = estimator.estimate(&origin, 0.0, 0.0, 123);
        assert_eq!(estimate.position, origin);
        assert_approx_eq!(estimate.total_distance, 0.0);
    }
}
