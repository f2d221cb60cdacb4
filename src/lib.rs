//! This crate provides an interface for communicating with and controlling a
//! two-channel TCM thermoelectric temperature controller over a serial link.
//!
//! The device speaks a line-oriented ASCII protocol: each request is a
//! `"<ModuleId>:<Opcode>\r"` frame addressed to one of the two channel
//! modules (`TC1`/`TC2`), and each response is a single text line.
//!
//! The crate exposes:
//! * [`client::TcmClient`] — the protocol-level API (query/set/save target
//!   temperature, query actual temperature) plus a background polling loop
//!   that delivers actual-temperature readings to a registered observer.
//! * [`sim::SimulatedTcmClient`] — a drop-in substitute with fixed readings
//!   for running consumers without hardware.
//!
//! Both implement [`types::TemperatureController`], so consumers can hold a
//! `Box<dyn TemperatureController>` and not care which one they got.
//!
//! The serial port used for controller comms should be configured like so:
//! * Default baud rate: 57600
//! * Data bits: 8
//! * Stop bits: 1
//! * Parity: None
//! * Read timeout: 500 ms

pub mod channel;
pub mod client;
pub mod error;
pub mod poller;
pub mod protocol;
pub mod sim;
pub mod transport;
pub mod types;

#[cfg(test)]
mod mock_serial;
