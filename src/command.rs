/**
 * The text protocol spoken over the Bluetooth link.
 *
 * Inbound, one command per line:
 *   FCLR      clear the path and stop
 *   [x,y]     append the waypoint (x, y)
 * Outbound, after every reached waypoint:
 *   [x,y]\n   the rounded position of the car
 *
 * Anything that does not look like one of the commands is discarded. The link
 * drops and garbles bytes now and then, so a broken line must never stop the
 * car or leave the parser in a bad state.
 */
use crate::config::{APPENDER, CLEAR_CLASS, CLEAR_COMMAND, CLOSER, SEPARATOR, TERMINATOR};
use crate::error::CommandError;
use crate::geometry::{round_half_up, Point};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    ClearPath,
    AppendPoint(Point),
}


macro_rules! bail_none {
    ($option:expr, $error:expr) => {
        match $option {
            Some(s) => s,
            None => return Err($error),
        }
    };
}


/**
 * Parses a single line, without its terminator.
 */
pub fn parse_command(line: &[u8]) -> Result<Command, CommandError> {
    let first = *bail_none!(line.first(), CommandError::Empty);
    if first == CLEAR_CLASS {
        return if line == CLEAR_COMMAND {
            Ok(Command::ClearPath)
        } else {
            Err(CommandError::BadClearToken)
        };
    }
    if first != APPENDER {
        return Err(CommandError::UnknownClass(first));
    }

    if line.len() < 2 || line[line.len() - 1] != CLOSER {
        return Err(CommandError::MissingCloser);
    }
    let interior = &line[1..line.len() - 1];
    let separator = bail_none!(
        interior.iter().position(|&byte| byte == SEPARATOR),
        CommandError::MissingSeparator);
    let x = parse_int(&interior[..separator]);
    let y = parse_int(&interior[separator + 1..]);
    Ok(Command::AppendPoint(Point::new(x as f64, y as f64)))
}


/**
 * Best effort integer parsing: leading whitespace, an optional sign, then as
 * many digits as there are. Text without leading digits is 0. Values outside
 * of i32 saturate.
 */
pub fn parse_int(text: &[u8]) -> i32 {
    let mut bytes = text.iter().skip_while(|byte| byte.is_ascii_whitespace()).peekable();
    let negative = match bytes.peek() {
        Some(b'-') => {
            bytes.next();
            true
        },
        Some(b'+') => {
            bytes.next();
            false
        },
        _ => false,
    };

    let limit = i32::MAX as i64 + 1;
    let mut value: i64 = 0;
    for byte in bytes.take_while(|byte| byte.is_ascii_digit()) {
        value = (value * 10 + (byte - b'0') as i64).min(limit);
    }
    if negative {
        value = -value;
    }
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}


/// Formats the position report sent back to the app.
pub fn format_position(position: &Point) -> String {
    format!(
        "{}{}{}{}{}\n",
        APPENDER as char,
        round_half_up(position.x),
        SEPARATOR as char,
        round_half_up(position.y),
        CLOSER as char)
}


/**
 * Assembles lines from the bytes trickling in over the link. A line ends at a
 * newline or when the buffer is full, whichever comes first.
 */
pub struct CommandBuffer {
    buffer: Vec<u8>,
    capacity: usize,
}


impl CommandBuffer {
    pub fn new(capacity: usize) -> CommandBuffer {
        CommandBuffer {
            buffer: Vec::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /**
     * Adds a byte. Returns the parse result once a line is complete; the
     * buffer is empty again afterwards.
     */
    pub fn push(&mut self, byte: u8) -> Option<Result<Command, CommandError>> {
        if byte != TERMINATOR {
            self.buffer.push(byte);
            if self.buffer.len() < self.capacity {
                return None;
            }
        }
        let result = parse_command(&self.buffer);
        self.buffer.clear();
        Some(result)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn push_all(buffer: &mut CommandBuffer, bytes: &[u8]) -> Vec<Result<Command, CommandError>> {
        bytes.iter().filter_map(|&byte| buffer.push(byte)).collect()
    }

    #[test]
    fn test_parse_clear() {
        assert_eq!(parse_command(b"FCLR"), Ok(Command::ClearPath));
        assert_eq!(parse_command(b"FCLRX"), Err(CommandError::BadClearToken));
        assert_eq!(parse_command(b"FCL"), Err(CommandError::BadClearToken));
        assert_eq!(parse_command(b"Fclr"), Err(CommandError::BadClearToken));
    }

    #[test]
    fn test_parse_point() {
        assert_eq!(
            parse_command(b"[12,34]"),
            Ok(Command::AppendPoint(Point::new(12.0, 34.0))));
        assert_eq!(
            parse_command(b"[-5,+7]"),
            Ok(Command::AppendPoint(Point::new(-5.0, 7.0))));
        assert_eq!(
            parse_command(b"[ 3, -4]"),
            Ok(Command::AppendPoint(Point::new(3.0, -4.0))));
    }

    #[test]
    fn test_parse_point_permissive_numbers() {
        assert_eq!(
            parse_command(b"[abc,12x]"),
            Ok(Command::AppendPoint(Point::new(0.0, 12.0))));
        assert_eq!(
            parse_command(b"[,]"),
            Ok(Command::AppendPoint(Point::new(0.0, 0.0))));
        // Only the first separator splits
        assert_eq!(
            parse_command(b"[1,2,3]"),
            Ok(Command::AppendPoint(Point::new(1.0, 2.0))));
    }

    #[test]
    fn test_parse_malformed() {
        assert_eq!(parse_command(b""), Err(CommandError::Empty));
        assert_eq!(parse_command(b"[12,34"), Err(CommandError::MissingCloser));
        assert_eq!(parse_command(b"["), Err(CommandError::MissingCloser));
        assert_eq!(parse_command(b"[1234]"), Err(CommandError::MissingSeparator));
        assert_eq!(parse_command(b"[]"), Err(CommandError::MissingSeparator));
        assert_eq!(parse_command(b"12,34]"), Err(CommandError::UnknownClass(b'1')));
        assert_eq!(parse_command(b"[12,34]\r"), Err(CommandError::MissingCloser));
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int(b"42"), 42);
        assert_eq!(parse_int(b"-42"), -42);
        assert_eq!(parse_int(b"  +8"), 8);
        assert_eq!(parse_int(b"7up"), 7);
        assert_eq!(parse_int(b"up7"), 0);
        assert_eq!(parse_int(b"-"), 0);
        assert_eq!(parse_int(b""), 0);
        assert_eq!(parse_int(b"99999999999"), i32::MAX);
        assert_eq!(parse_int(b"-99999999999"), i32::MIN);
    }

    #[test]
    fn test_format_position() {
        assert_eq!(format_position(&Point::new(12.0, -7.0)), "[12,-7]\n");
        assert_eq!(format_position(&Point::new(0.49, 99.5)), "[0,100]\n");
        assert_eq!(format_position(&Point::new(-2.5, -2.51)), "[-2,-3]\n");
    }

    #[test]
    fn test_report_parses_as_point() {
        let report = format_position(&Point::new(12.2, -6.8));
        let line = report.trim_end_matches('\n');
        assert_eq!(
            parse_command(line.as_bytes()),
            Ok(Command::AppendPoint(Point::new(12.0, -7.0))));
    }

    #[test]
    fn test_buffer_splits_lines() {
        let mut buffer = CommandBuffer::new(32);
        let results = push_all(&mut buffer, b"[1,2]\nFCLR\n[3,");
        assert_eq!(
            results,
            vec![Ok(Command::AppendPoint(Point::new(1.0, 2.0))), Ok(Command::ClearPath)]);
        assert_eq!(buffer.len(), 3);

        let results = push_all(&mut buffer, b"4]\n");
        assert_eq!(results, vec![Ok(Command::AppendPoint(Point::new(3.0, 4.0)))]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_buffer_flushes_when_full() {
        let mut buffer = CommandBuffer::new(4);
        let results = push_all(&mut buffer, b"FCLR");
        assert_eq!(results, vec![Ok(Command::ClearPath)]);
        assert!(buffer.is_empty());

        // The overflow is parsed as a line of its own, and the rest follows
        let results = push_all(&mut buffer, b"[1,23]\n");
        assert_eq!(
            results,
            vec![Err(CommandError::MissingCloser), Err(CommandError::UnknownClass(b'3'))]);
    }

    #[test]
    fn test_buffer_empty_line() {
        let mut buffer = CommandBuffer::new(8);
        assert_eq!(buffer.push(b'\n'), Some(Err(CommandError::Empty)));
    }
}
