//! This module contains a hardware-free substitute for the real controller
//! client, for exercising consumers without a device on the bench.

use std::time::Duration;

use log::warn;

use crate::client::TargetCache;
use crate::error::Result;
use crate::poller::{DEFAULT_POLL_INTERVAL, Poller, TemperatureObserver};
use crate::types::{Channel, TemperatureController};

/// Target temperature both channels report before anything is set.
pub const SIM_TARGET_TEMPERATURE: f64 = 10.0;
/// Actual temperature both channels always report.
pub const SIM_ACTUAL_TEMPERATURE: f64 = 12.0;

/// Drop-in substitute for [`TcmClient`](crate::client::TcmClient) with fixed
/// readings.
///
/// `get_actual` always reports [`SIM_ACTUAL_TEMPERATURE`], `save_target` is a
/// no-op, and `set_target` touches only the cache. The polling loop has the
/// same structure as the real client's, so consumers see the same callback
/// cadence and lifecycle.
pub struct SimulatedTcmClient {
    targets: TargetCache,
    poller: Option<Poller>,
}

impl SimulatedTcmClient {
    pub fn new() -> Self {
        let targets = TargetCache::new();
        for channel in [Channel::Ch1, Channel::Ch2] {
            targets.store(channel, SIM_TARGET_TEMPERATURE);
        }
        Self {
            targets,
            poller: None,
        }
    }

    pub(crate) fn start_polling_at(
        &mut self,
        interval: Duration,
        mut observer: Box<dyn TemperatureObserver>,
    ) {
        if self.poller.is_some() {
            return;
        }
        self.poller = Some(Poller::spawn(interval, move || {
            if let Err(e) = observer.on_update(SIM_ACTUAL_TEMPERATURE, SIM_ACTUAL_TEMPERATURE) {
                warn!("{e}");
            }
            true
        }));
    }
}

impl Default for SimulatedTcmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TemperatureController for SimulatedTcmClient {
    fn get_target(&self, channel: Channel) -> Result<f64> {
        Ok(self.targets.load(channel))
    }

    fn set_target(&self, channel: Channel, value: f64) -> Result<()> {
        self.targets.store(channel, value);
        Ok(())
    }

    fn save_target(&self, _channel: Channel) -> Result<()> {
        Ok(())
    }

    fn get_actual(&self, _channel: Channel) -> Result<f64> {
        Ok(SIM_ACTUAL_TEMPERATURE)
    }

    fn cached_target(&self, channel: Channel) -> f64 {
        self.targets.load(channel)
    }

    fn start_polling(&mut self, observer: Box<dyn TemperatureObserver>) {
        self.start_polling_at(DEFAULT_POLL_INTERVAL, observer);
    }

    fn stop_polling(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop();
        }
    }
}
