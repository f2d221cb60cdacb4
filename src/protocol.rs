//! This module defines the wire-level constants of the TCM ASCII protocol and
//! the parsing of query responses.
//!
//! Requests are `"<ModuleId>:<Opcode>\r"` frames. Responses are single text
//! lines of two shapes:
//! * Status frames, prefixed `CMD:`. The final character is the status code;
//!   `1` and `8` are the two acknowledgement codes, anything else is a
//!   device-reported error.
//! * Query payloads, fixed-offset text: the temperature value starts at a
//!   fixed character offset depending on the opcode and parses as a decimal
//!   floating-point number.

use crate::error::{Error, Result};
use crate::types::Channel;

/// __R__ - Query the target (setpoint) temperature.
pub const QUERY_TARGET: &str = "TCADJTEMP?";
/// __W__ - Persist the current target into non-volatile storage.
pub const SAVE_TARGET: &str = "TCADJTEMP!";
/// __R__ - Query the actual (measured) temperature.
pub const QUERY_ACTUAL: &str = "TCACTUALTEMP?";

/// Character offset where the payload of a `TCADJTEMP?` response begins.
pub const TARGET_PAYLOAD_OFFSET: usize = 14;
/// Character offset where the payload of a `TCACTUALTEMP?` response begins.
pub const ACTUAL_PAYLOAD_OFFSET: usize = 17;

/// Prefix identifying a status frame.
pub const STATUS_PREFIX: &str = "CMD:";
/// Final characters of a status frame that signal success.
pub const STATUS_OK_CODES: [char; 2] = ['1', '8'];

/// __W__ - Build the set-target opcode for `value`.
///
/// The value is formatted as a plain decimal string, e.g. `TCADJTEMP=12.5`.
pub fn set_target_opcode(value: f64) -> String {
    format!("TCADJTEMP={value}")
}

/// Build the request frame addressed to `channel`, including the trailing
/// carriage return. The frame is pure ASCII.
pub fn frame(channel: Channel, opcode: &str) -> String {
    format!("{}:{}\r", channel.module_id(), opcode)
}

/// Parse the temperature payload of a query response.
///
/// The payload starts at `payload_offset` characters into the response and
/// runs to the end of the line. Fails with [`Error::Parse`] if the response
/// is shorter than the header or the payload is not numeric.
pub fn parse_temperature(response: &str, payload_offset: usize) -> Result<f64> {
    let payload = response.get(payload_offset..).ok_or_else(|| Error::Parse {
        response: response.to_string(),
    })?;
    payload.trim().parse::<f64>().map_err(|_| Error::Parse {
        response: response.to_string(),
    })
}
