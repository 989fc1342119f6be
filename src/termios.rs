/**
 * Configuration of the serial tty carrying the Bluetooth link. These are thin
 * wrappers over the termios calls from libc.
 */
use std::io::{Error, Result};
use std::mem;
use std::os::unix::io::AsRawFd;

use enum_primitive::FromPrimitive;

pub trait Termio {
    fn set_speed(&self, speed: BaudRate) -> Result<()>;
    fn get_speed(&self) -> Result<BaudRate>;
    /// No echo, no line editing, no translation of carriage returns.
    fn make_raw(&self) -> Result<()>;
    fn drain(&self) -> Result<()>;
    fn drop_input_output(&self) -> Result<()>;
    /// Number of bytes received and not read yet.
    fn input_buffer_count(&self) -> Result<usize>;
}

impl<T> Termio for T where T: AsRawFd {
    fn set_speed(&self, speed: BaudRate) -> Result<()> {
        let mut config = get_attributes(self.as_raw_fd())?;
        check(unsafe { libc::cfsetspeed(&mut config, speed as libc::speed_t) })?;
        set_attributes(self.as_raw_fd(), &config)
    }

    fn get_speed(&self) -> Result<BaudRate> {
        let config = get_attributes(self.as_raw_fd())?;
        let speed = unsafe { libc::cfgetospeed(&config) };
        match BaudRate::from_u64(speed as u64) {
            Some(baud) => Ok(baud),
            None => Err(Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Unknown tty speed code {}", speed))),
        }
    }

    fn make_raw(&self) -> Result<()> {
        let mut config = get_attributes(self.as_raw_fd())?;
        unsafe { libc::cfmakeraw(&mut config) };
        // Reads return whatever is there, even nothing
        config.c_cc[libc::VMIN] = 0;
        config.c_cc[libc::VTIME] = 0;
        set_attributes(self.as_raw_fd(), &config)
    }

    fn drain(&self) -> Result<()> {
        check(unsafe { libc::tcdrain(self.as_raw_fd()) })
    }

    fn drop_input_output(&self) -> Result<()> {
        check(unsafe { libc::tcflush(self.as_raw_fd(), libc::TCIOFLUSH) })
    }

    fn input_buffer_count(&self) -> Result<usize> {
        let mut size: libc::c_int = 0;
        check(unsafe { libc::ioctl(self.as_raw_fd(), libc::FIONREAD, &mut size) })?;
        Ok(size.max(0) as usize)
    }
}


fn get_attributes(fd: libc::c_int) -> Result<libc::termios> {
    let mut config: libc::termios = unsafe { mem::zeroed() };
    check(unsafe { libc::tcgetattr(fd, &mut config) })?;
    Ok(config)
}


fn set_attributes(fd: libc::c_int, config: &libc::termios) -> Result<()> {
    check(unsafe { libc::tcsetattr(fd, libc::TCSANOW, config) })
}


fn check(result: libc::c_int) -> Result<()> {
    if result < 0 {
        Err(Error::last_os_error())
    } else {
        Ok(())
    }
}


enum_from_primitive! {
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BaudRate {
    B1200 = libc::B1200 as isize,
    B2400 = libc::B2400 as isize,
    B4800 = libc::B4800 as isize,
    B9600 = libc::B9600 as isize,
    B19200 = libc::B19200 as isize,
    B38400 = libc::B38400 as isize,
    B57600 = libc::B57600 as isize,
    B115200 = libc::B115200 as isize,
    B230400 = libc::B230400 as isize,
}
}

impl BaudRate {
    /// Looks up the speed code for a rate given in bits per second.
    pub fn from_bits_per_second(rate: u32) -> Option<BaudRate> {
        match rate {
            1200 => Some(BaudRate::B1200),
            2400 => Some(BaudRate::B2400),
            4800 => Some(BaudRate::B4800),
            9600 => Some(BaudRate::B9600),
            19200 => Some(BaudRate::B19200),
            38400 => Some(BaudRate::B38400),
            57600 => Some(BaudRate::B57600),
            115200 => Some(BaudRate::B115200),
            230400 => Some(BaudRate::B230400),
            _ => None,
        }
    }
}
