//! This module contains the background polling loop and the observer seam
//! through which readings reach the consumer.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::error::CallbackError;

/// Interval between poll ticks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Consumer of actual-temperature readings, invoked once per poll tick with
/// both channels' values.
///
/// Returning a [`CallbackError`] makes the poll loop log the failure and keep
/// polling; it is the only failure the loop tolerates.
pub trait TemperatureObserver: Send {
    fn on_update(&mut self, actual_ch1: f64, actual_ch2: f64) -> Result<(), CallbackError>;
}

/// Infallible closures observe directly.
impl<F> TemperatureObserver for F
where
    F: FnMut(f64, f64) + Send,
{
    fn on_update(&mut self, actual_ch1: f64, actual_ch2: f64) -> Result<(), CallbackError> {
        self(actual_ch1, actual_ch2);
        Ok(())
    }
}

/// A cooperative background loop running `tick` once per interval on its own
/// thread.
///
/// The loop blocks on a stop channel with the interval as the timeout, so the
/// sleep doubles as the termination check: a stop request is observed within
/// one interval at most, and no further tick runs after it is observed.
pub struct Poller {
    stop: mpsc::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Spawn the loop. `tick` returns `false` to terminate the loop from the
    /// inside; there is no restart.
    pub(crate) fn spawn<F>(interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let (stop, stop_rx) = mpsc::channel();
        let handle = std::thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if !tick() {
                            break;
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });
        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Request termination and wait for the loop thread to finish.
    ///
    /// Once this returns no further tick will run, so owned resources (the
    /// transport in particular) are safe to tear down.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // The send fails only if the loop already exited on its own.
        let _ = self.stop.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown();
    }
}
