use thiserror::Error;

/// Failures from the waypoint queue.
#[derive(Error, Debug, PartialEq)]
pub enum PathError {
    #[error("The path has maximum length ({capacity}). No more points can be added to it.")]
    Full { capacity: usize },
}

/**
 * Reasons an inbound line was not a command. These are expected on a noisy
 * Bluetooth link and are discarded by the navigator.
 */
#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command class {0:#04x}")]
    UnknownClass(u8),
    #[error("clear command does not match")]
    BadClearToken,
    #[error("point command is missing its closer")]
    MissingCloser,
    #[error("point command is missing its separator")]
    MissingSeparator,
}
