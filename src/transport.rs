//! This module owns the physical serial connection and its line-oriented
//! read/write primitives.

use std::io;
use std::time::Duration;

use log::info;
use serialport::{SerialPort, SerialPortType};

use crate::error::{Error, Result};

/// Default TCM baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 57_600;
/// Default read timeout. The controller usually answers well within this.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// A line-oriented transport over any interface which implements
/// [`std::io::Read`] and [`std::io::Write`].
///
/// Production code uses a [`serialport::SerialPort`] underneath; tests
/// substitute a scripted in-memory double.
pub struct Transport<S> {
    interface: S,
}

impl Transport<Box<dyn SerialPort>> {
    /// Open the serial port whose USB hardware serial number equals
    /// `serial_number`.
    ///
    /// Fails with [`Error::DeviceNotFound`] if no currently enumerated port
    /// matches. No retry is attempted.
    pub fn open(serial_number: &str, baud_rate: u32, timeout: Duration) -> Result<Self> {
        let ports = serialport::available_ports()?;
        let port_name = ports
            .into_iter()
            .find(|port| match &port.port_type {
                SerialPortType::UsbPort(usb) => {
                    usb.serial_number.as_deref() == Some(serial_number)
                }
                _ => false,
            })
            .map(|port| port.port_name)
            .ok_or_else(|| Error::DeviceNotFound(serial_number.to_string()))?;

        info!("opening {port_name} (serial number {serial_number}) at {baud_rate} baud");
        let interface = serialport::new(&port_name, baud_rate)
            .timeout(timeout)
            .open()?;
        Ok(Self::new(interface))
    }
}

impl<S: io::Read + io::Write> Transport<S> {
    /// Create a transport over an already-open interface.
    pub fn new(interface: S) -> Self {
        Self { interface }
    }

    /// Write a complete request frame and flush it out.
    pub fn write_line(&mut self, frame: &[u8]) -> io::Result<()> {
        self.interface.write_all(frame)?;
        self.interface.flush()
    }

    /// Read one response line.
    ///
    /// Reads until a newline arrives or the interface reports a timeout,
    /// and returns whatever bytes were available by then - possibly empty or
    /// truncated if the device is slow.
    pub fn read_line(&mut self) -> io::Result<Vec<u8>> {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match self.interface.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    line.push(byte[0]);
                    if byte[0] == b'\n' {
                        break;
                    }
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
                    ) =>
                {
                    break
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(line)
    }
}
