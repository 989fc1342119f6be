#[macro_use]
extern crate enum_primitive;
#[macro_use]
extern crate log;

#[cfg(test)]
macro_rules! assert_approx_eq {
    ($value_1:expr, $value_2:expr) => {
        assert!(
            $crate::approx_eq($value_1, $value_2),
            "{} is not approximately {}",
            $value_1,
            $value_2);
    };
}

#[cfg(test)]
fn approx_eq<T: num::Float + num::FromPrimitive>(value_1: T, value_2: T) -> bool {
    let tolerance: T = match T::from_f64(0.000001) {
        Some(tolerance) => tolerance,
        None => return value_1 == value_2,
    };
    (value_1 - value_2).abs() < tolerance
}

pub mod command;
pub mod config;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod navigation;
pub mod path;
pub mod position_estimator;
pub mod simulation;
pub mod termios;
pub mod transport;
