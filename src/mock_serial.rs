//! We use this mocking module in unit tests to emulate the controller's end
//! of the serial link.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

/// Our mock type used to emulate a serial port.
///
/// Responses are scripted in order with [`push_response`](Self::push_response);
/// each completed request frame (terminated by `\r`) arms the next scripted
/// response for reading. Reads past the armed response fail with a timeout,
/// like a real port with a read timeout configured.
///
/// The state lives behind an [`Arc`] so a clone ([`handle`](Self::handle)) can
/// be moved into the transport while the test keeps inspecting the original.
#[derive(Clone)]
pub struct MockSerial {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Scripted responses not yet armed.
    script: VecDeque<Vec<u8>>,
    /// Bytes of the currently armed response.
    pending: VecDeque<u8>,
    /// Request bytes received since the last complete frame.
    partial_frame: Vec<u8>,
    /// Complete request frames received, in arrival order.
    frames: Vec<Vec<u8>>,
    /// Set if a write started while a previous response was still unread.
    overlapping_exchange: bool,
}

impl MockSerial {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Another handle onto the same mock, for moving into a transport.
    pub fn handle(&self) -> MockSerial {
        self.clone()
    }

    /// Queue the next response line. Include the trailing newline unless the
    /// test wants to exercise a truncated read.
    pub fn push_response(&self, line: &[u8]) {
        self.lock().script.push_back(line.to_vec());
    }

    /// The complete request frames written so far.
    pub fn written_frames(&self) -> Vec<Vec<u8>> {
        self.lock().frames.clone()
    }

    /// Whether any write began while a previous response had unread bytes,
    /// i.e. two exchanges overlapped on the wire.
    pub fn saw_overlapping_exchange(&self) -> bool {
        self.lock().overlapping_exchange
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.lock();
        if !state.pending.is_empty() {
            state.overlapping_exchange = true;
        }
        state.partial_frame.extend_from_slice(buf);
        if state.partial_frame.ends_with(b"\r") {
            let frame = std::mem::take(&mut state.partial_frame);
            state.frames.push(frame);
            let response = state.script.pop_front().unwrap_or_default();
            state.pending = response.into();
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut state = self.lock();
        match state.pending.pop_front() {
            Some(byte) => {
                buf[0] = byte;
                Ok(1)
            }
            None => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "no scripted data left",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    #[test]
    fn scripted_response_is_armed_by_a_complete_frame() {
        let mock = MockSerial::new();
        mock.push_response(b"OK\n");
        let mut port = mock.handle();

        // Nothing to read before a frame is written.
        let mut buf = [0u8; 8];
        assert_eq!(
            port.read(&mut buf).unwrap_err().kind(),
            io::ErrorKind::TimedOut
        );

        port.write_all(b"TC1:TCADJTEMP?\r").unwrap();
        assert_eq!(port.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], b'O');
    }

    #[test]
    fn frames_are_assembled_across_split_writes() {
        let mock = MockSerial::new();
        let mut port = mock.handle();

        port.write_all(b"TC1:TCADJ").unwrap();
        port.write_all(b"TEMP?\r").unwrap();

        assert_eq!(mock.written_frames(), vec![b"TC1:TCADJTEMP?\r".to_vec()]);
    }

    #[test]
    fn reads_time_out_once_the_response_is_drained() {
        let mock = MockSerial::new();
        mock.push_response(b"A\n");
        let mut port = mock.handle();

        port.write_all(b"TC1:TCADJTEMP?\r").unwrap();
        let mut buf = [0u8; 1];
        assert_eq!(port.read(&mut buf).unwrap(), 1);
        assert_eq!(port.read(&mut buf).unwrap(), 1);
        assert_eq!(
            port.read(&mut buf).unwrap_err().kind(),
            io::ErrorKind::TimedOut
        );
    }

    #[test]
    fn overlap_flag_trips_when_a_write_preempts_an_unread_response() {
        let mock = MockSerial::new();
        mock.push_response(b"TC1:TCADJTEMP:25.00\n");
        let mut port = mock.handle();

        port.write_all(b"TC1:TCADJTEMP?\r").unwrap();
        assert!(!mock.saw_overlapping_exchange());

        // Second frame before the first response was read.
        port.write_all(b"TC2:TCADJTEMP?\r").unwrap();
        assert!(mock.saw_overlapping_exchange());
    }
}
