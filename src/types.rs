//! This module contains the domain types shared across the crate.

use strum_macros::EnumIter;

use crate::error::Result;
use crate::poller::TemperatureObserver;

/// One of the two independently controlled temperature zones of the TCM.
#[derive(Debug, EnumIter, PartialEq, Eq, Clone, Copy)]
pub enum Channel {
    /// First channel, module `TC1` on the wire.
    Ch1,
    /// Second channel, module `TC2` on the wire.
    Ch2,
}

impl Channel {
    /// Number of channels on the controller.
    pub const COUNT: usize = 2;

    /// The module identifier used to address this channel on the wire.
    pub fn module_id(self) -> &'static str {
        match self {
            Channel::Ch1 => "TC1",
            Channel::Ch2 => "TC2",
        }
    }

    /// Zero-based index, for per-channel storage.
    pub(crate) fn index(self) -> usize {
        match self {
            Channel::Ch1 => 0,
            Channel::Ch2 => 1,
        }
    }
}

impl core::fmt::Display for Channel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.module_id())
    }
}

/// The capability set shared by the real controller client and the simulated
/// one.
///
/// For its methods we use the nomenclature that "target" is the setpoint the
/// controller is commanded to reach and "actual" is the live measured
/// temperature it reports. Temperatures are in the unit the device is
/// configured for; the protocol does not carry the unit.
pub trait TemperatureController {
    /// Query the target temperature for `channel` from the device and cache it.
    fn get_target(&self, channel: Channel) -> Result<f64>;

    /// Command a new target temperature for `channel`.
    ///
    /// On success the cached target is set to `value` without re-reading the
    /// device.
    fn set_target(&self, channel: Channel, value: f64) -> Result<()>;

    /// Persist the current target for `channel` into the device's
    /// non-volatile storage.
    fn save_target(&self, channel: Channel) -> Result<()>;

    /// Query the actual (measured) temperature for `channel`.
    fn get_actual(&self, channel: Channel) -> Result<f64>;

    /// The last target temperature the device acknowledged for `channel`.
    /// No device round-trip.
    fn cached_target(&self, channel: Channel) -> f64;

    /// Start the background poll loop, delivering one reading pair per tick
    /// to `observer`. Does nothing if polling is already running.
    fn start_polling(&mut self, observer: Box<dyn TemperatureObserver>);

    /// Stop the background poll loop and wait for it to finish. Does nothing
    /// if polling is not running.
    fn stop_polling(&mut self);
}
