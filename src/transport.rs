/**
 * Byte oriented links to the app.
 */
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{Read, Result, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::rc::Rc;

use crate::termios::{BaudRate, Termio};

pub trait Transport {
    /// Number of bytes that can be read without blocking.
    fn available(&mut self) -> usize;
    fn read(&mut self) -> Option<u8>;
    fn print(&mut self, message: &str);
}


/**
 * In memory transport. Clones share the same buffers, so one clone can be
 * handed to the navigator while another injects input and inspects output.
 */
#[derive(Clone, Default)]
pub struct BufferedTransport {
    inbound: Rc<RefCell<VecDeque<u8>>>,
    outbound: Rc<RefCell<String>>,
}

impl BufferedTransport {
    pub fn new() -> BufferedTransport {
        BufferedTransport::default()
    }

    pub fn inject(&self, bytes: &[u8]) {
        self.inbound.borrow_mut().extend(bytes.iter().copied());
    }

    /// Bytes injected and not read yet.
    pub fn pending_input(&self) -> usize {
        self.inbound.borrow().len()
    }

    /// Everything printed so far.
    pub fn sent(&self) -> String {
        self.outbound.borrow().clone()
    }

    /// Everything printed since the last call.
    pub fn take_sent(&self) -> String {
        std::mem::take(&mut *self.outbound.borrow_mut())
    }
}

impl Transport for BufferedTransport {
    fn available(&mut self) -> usize {
        self.inbound.borrow().len()
    }

    fn read(&mut self) -> Option<u8> {
        self.inbound.borrow_mut().pop_front()
    }

    fn print(&mut self, message: &str) {
        self.outbound.borrow_mut().push_str(message);
    }
}


/**
 * A serial tty, e.g. the rfcomm device of a paired Bluetooth module. The tty
 * is switched to raw mode so reads never wait for a full line.
 */
pub struct SerialTransport {
    tty: File,
}

impl SerialTransport {
    pub fn open(device: &str, speed: BaudRate) -> Result<SerialTransport> {
        let tty = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(device)?;
        tty.make_raw()?;
        tty.set_speed(speed)?;
        tty.drop_input_output()?;
        match tty.get_speed() {
            Ok(actual) => info!("Opened {} at {:?}", device, actual),
            Err(e) => warn!("Opened {}, unable to read back its speed: {}", device, e),
        }
        Ok(SerialTransport { tty })
    }
}

impl Transport for SerialTransport {
    fn available(&mut self) -> usize {
        match self.tty.input_buffer_count() {
            Ok(count) => count,
            Err(e) => {
                error!("Unable to count pending serial input: {}", e);
                0
            }
        }
    }

    fn read(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.tty.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            Ok(_) => None,
            Err(e) => {
                error!("Unable to read from serial link: {}", e);
                None
            }
        }
    }

    fn print(&mut self, message: &str) {
        if let Err(e) = self.tty.write_all(message.as_bytes()) {
            error!("Unable to send '{}': {}", message.trim_end(), e);
            return;
        }
        if let Err(e) = self.tty.drain() {
            warn!("Unable to drain serial output: {}", e);
        }
    }
}
