//! This module contains the protocol-level client for the TCM controller.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use log::{error, info, warn};
use serialport::SerialPort;
use strum::IntoEnumIterator;

use crate::channel::CommandChannel;
use crate::error::Result;
use crate::poller::{DEFAULT_POLL_INTERVAL, Poller, TemperatureObserver};
use crate::protocol;
use crate::transport::Transport;
use crate::types::{Channel, TemperatureController};

/// Per-channel cache of the last target temperature the device acknowledged.
///
/// Values are stored as `f64` bits so each channel's entry stays atomically
/// readable and writable without an extra lock. The command channel's mutex
/// already serializes the exchanges that precede every store.
pub(crate) struct TargetCache([AtomicU64; Channel::COUNT]);

impl TargetCache {
    pub(crate) fn new() -> Self {
        Self([AtomicU64::new(0), AtomicU64::new(0)])
    }

    pub(crate) fn store(&self, channel: Channel, value: f64) {
        self.0[channel.index()].store(value.to_bits(), Ordering::Relaxed);
    }

    pub(crate) fn load(&self, channel: Channel) -> f64 {
        f64::from_bits(self.0[channel.index()].load(Ordering::Relaxed))
    }
}

/// Client for a two-channel TCM thermoelectric controller.
///
/// Construction synchronously queries both channels' target temperatures so
/// the cache is seeded before any consumer can observe it. All exchanges,
/// including the background poller's, are serialized by the underlying
/// [`CommandChannel`].
pub struct TcmClient<S> {
    link: Arc<CommandChannel<S>>,
    targets: TargetCache,
    poller: Option<Poller>,
}

impl TcmClient<Box<dyn SerialPort>> {
    /// Open the controller with the given USB hardware serial number and
    /// seed the target cache.
    ///
    /// See [`Transport::open`] for the port selection rules and
    /// [`DEFAULT_BAUD_RATE`](crate::transport::DEFAULT_BAUD_RATE) /
    /// [`DEFAULT_TIMEOUT`](crate::transport::DEFAULT_TIMEOUT) for the usual
    /// parameters.
    pub fn open(serial_number: &str, baud_rate: u32, timeout: Duration) -> Result<Self> {
        Self::new(Transport::open(serial_number, baud_rate, timeout)?)
    }
}

impl<S: io::Read + io::Write> TcmClient<S> {
    /// Create a client over an already-open transport and seed the target
    /// cache. Fails if either channel's target query fails.
    pub fn new(transport: Transport<S>) -> Result<Self> {
        let client = Self {
            link: Arc::new(CommandChannel::new(transport)),
            targets: TargetCache::new(),
            poller: None,
        };
        for channel in Channel::iter() {
            client.get_target(channel)?;
        }
        Ok(client)
    }

    /// Query the target temperature for `channel` and update the cache.
    pub fn get_target(&self, channel: Channel) -> Result<f64> {
        let response = self.link.execute(protocol::QUERY_TARGET, channel)?;
        let value = protocol::parse_temperature(&response, protocol::TARGET_PAYLOAD_OFFSET)?;
        self.targets.store(channel, value);
        Ok(value)
    }

    /// Command a new target temperature for `channel`.
    ///
    /// On success the cache is set to `value` without re-reading the device,
    /// so it can drift from hardware truth if the write partially failed in a
    /// way the controller did not report.
    pub fn set_target(&self, channel: Channel, value: f64) -> Result<()> {
        self.link
            .execute(&protocol::set_target_opcode(value), channel)?;
        self.targets.store(channel, value);
        Ok(())
    }

    /// Persist the current target for `channel` into the device's
    /// non-volatile storage. No cache effect.
    pub fn save_target(&self, channel: Channel) -> Result<()> {
        let response = self.link.execute(protocol::SAVE_TARGET, channel)?;
        info!("save target temperature ({channel}): {response}");
        Ok(())
    }

    /// Query the actual (measured) temperature for `channel`. Targets and
    /// actuals are distinct quantities; the target cache is not touched.
    pub fn get_actual(&self, channel: Channel) -> Result<f64> {
        query_actual(&self.link, channel)
    }

    /// The last target temperature the device acknowledged for `channel`.
    pub fn cached_target(&self, channel: Channel) -> f64 {
        self.targets.load(channel)
    }
}

impl<S: io::Read + io::Write + Send + 'static> TcmClient<S> {
    /// Start polling actual temperatures in the background, delivering both
    /// channels' readings to `observer` once per tick.
    ///
    /// A [`CallbackError`](crate::error::CallbackError) from the observer is
    /// logged and polling continues; any failure of the reads themselves
    /// terminates the loop.
    pub fn start_polling(&mut self, observer: Box<dyn TemperatureObserver>) {
        self.start_polling_at(DEFAULT_POLL_INTERVAL, observer);
    }

    pub(crate) fn start_polling_at(
        &mut self,
        interval: Duration,
        mut observer: Box<dyn TemperatureObserver>,
    ) {
        if self.poller.is_some() {
            return;
        }
        let link = Arc::clone(&self.link);
        self.poller = Some(Poller::spawn(interval, move || {
            poll_tick(&link, observer.as_mut())
        }));
    }

    /// Stop the background poller and wait for its thread to finish, so the
    /// transport cannot be torn down under a read in flight.
    pub fn stop_polling(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop();
        }
    }
}

impl<S: io::Read + io::Write + Send + 'static> TemperatureController for TcmClient<S> {
    fn get_target(&self, channel: Channel) -> Result<f64> {
        TcmClient::get_target(self, channel)
    }

    fn set_target(&self, channel: Channel, value: f64) -> Result<()> {
        TcmClient::set_target(self, channel, value)
    }

    fn save_target(&self, channel: Channel) -> Result<()> {
        TcmClient::save_target(self, channel)
    }

    fn get_actual(&self, channel: Channel) -> Result<f64> {
        TcmClient::get_actual(self, channel)
    }

    fn cached_target(&self, channel: Channel) -> f64 {
        TcmClient::cached_target(self, channel)
    }

    fn start_polling(&mut self, observer: Box<dyn TemperatureObserver>) {
        TcmClient::start_polling(self, observer);
    }

    fn stop_polling(&mut self) {
        TcmClient::stop_polling(self);
    }
}

fn query_actual<S: io::Read + io::Write>(
    link: &CommandChannel<S>,
    channel: Channel,
) -> Result<f64> {
    let response = link.execute(protocol::QUERY_ACTUAL, channel)?;
    protocol::parse_temperature(&response, protocol::ACTUAL_PAYLOAD_OFFSET)
}

/// One poll cycle: read both channels in fixed order, then notify the
/// observer. Returns `false` to terminate the loop when a read fails.
fn poll_tick<S: io::Read + io::Write>(
    link: &CommandChannel<S>,
    observer: &mut dyn TemperatureObserver,
) -> bool {
    let mut readings = [0.0; Channel::COUNT];
    for channel in Channel::iter() {
        match query_actual(link, channel) {
            Ok(value) => readings[channel.index()] = value,
            Err(e) => {
                error!("temperature poll failed on {channel}: {e}");
                return false;
            }
        }
    }
    if let Err(e) = observer.on_update(readings[0], readings[1]) {
        warn!("{e}");
    }
    true
}
