//! This module serializes command/response exchanges against the transport
//! and applies the uniform response classification.

use std::io;
use std::sync::{Mutex, PoisonError};

use log::debug;

use crate::error::{Error, Result};
use crate::protocol;
use crate::transport::Transport;
use crate::types::Channel;

/// Executes one command/response exchange at a time over a shared
/// [`Transport`].
///
/// The internal mutex is the sole concurrency mechanism for the whole device
/// link: it serializes the background poller's periodic reads against any
/// synchronous command issued from the caller's thread. A command in progress
/// always runs to completion (success or timeout) before the lock is
/// released.
pub struct CommandChannel<S> {
    transport: Mutex<Transport<S>>,
}

impl<S: io::Read + io::Write> CommandChannel<S> {
    /// Take ownership of the transport. All further access goes through
    /// [`execute`](Self::execute).
    pub fn new(transport: Transport<S>) -> Self {
        Self {
            transport: Mutex::new(transport),
        }
    }

    /// Send `opcode` to `channel`'s module and return the raw response line,
    /// trailing whitespace stripped.
    ///
    /// Blocks until the transport lock is free. `CMD:`-prefixed responses are
    /// status frames; any status code other than the two acknowledgement
    /// codes fails with [`Error::Device`] carrying the full response text.
    pub fn execute(&self, opcode: &str, channel: Channel) -> Result<String> {
        let response = {
            let mut transport = self
                .transport
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let frame = protocol::frame(channel, opcode);
            transport.write_line(frame.as_bytes())?;
            let raw = transport.read_line()?;
            String::from_utf8_lossy(&raw).trim_end().to_string()
            // Lock released here, on error paths included.
        };
        debug!("{channel}:{opcode} -> {response:?}");
        check_status(response)
    }
}

/// Classify a response line: pass query payloads and acknowledged status
/// frames through, surface everything else as a device error.
fn check_status(response: String) -> Result<String> {
    if response.starts_with(protocol::STATUS_PREFIX) {
        match response.chars().last() {
            Some(code) if protocol::STATUS_OK_CODES.contains(&code) => {}
            _ => return Err(Error::Device(response)),
        }
    }
    Ok(response)
}
