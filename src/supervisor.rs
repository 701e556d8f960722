//! Connection supervisor: the watcher's top-level loop.
//!
//! ```text
//!   ┌──────────── enumerate ◄──────────────┐
//!   │                │                     │ disconnected (no delay)
//!   │   not found /  │ found + opened      │
//!   │   unavailable  ▼                     │
//!   │          ReportDispatcher ───────────┘
//!   ▼
//! wait retry delay (cancellable) ──► enumerate
//! ```
//!
//! Cancellation at any suspension point (the retry wait or a device read) ends
//! [`ConnectionSupervisor::run`] with `Ok(())`. Only fatal failures (no device
//! list, a handle that will not release) come back as `Err`.

use crate::backends::keys::KeyPresser;
use crate::cancel::CancelToken;
use crate::config::WatchConfig;
use crate::device::HidBackend;
use crate::dispatcher::{Disconnect, ReportDispatcher};
use crate::error::{OpenError, RegistryError, SupervisorError};
use crate::metadata::DeviceAttributes;
use crate::registry::DeviceRegistry;
use std::io::Write;
use tracing::{debug, info};

/// Result of one search-and-connect attempt.
#[derive(Debug)]
pub enum Step {
    /// No enumerated device matched the target VID/PID.
    NotFound,
    /// The target was found but could not be opened.
    Unavailable(OpenError),
    /// A connection was made and has ended.
    Disconnected(Disconnect),
}

pub struct ConnectionSupervisor<B, K> {
    registry: DeviceRegistry<B>,
    keys: K,
    config: WatchConfig,
    cancel: CancelToken,
}

impl<B: HidBackend, K: KeyPresser> ConnectionSupervisor<B, K> {
    pub fn new(backend: B, keys: K, config: WatchConfig, cancel: CancelToken) -> Self {
        Self {
            registry: DeviceRegistry::new(backend, config.id_query_policy),
            keys,
            config,
            cancel,
        }
    }

    /// Run until cancelled.
    pub fn run(&mut self) -> Result<(), SupervisorError> {
        searching();
        loop {
            if self.cancel.is_cancelled() {
                return Ok(());
            }
            match self.step()? {
                Step::Disconnected(Disconnect::Cancelled) => return Ok(()),
                Step::Disconnected(reason) => {
                    println!("Disconnected!");
                    info!(?reason, "disconnected");
                    searching();
                }
                Step::NotFound | Step::Unavailable(_) => {
                    print!(".");
                    let _ = std::io::stdout().flush();
                    if self.cancel.wait_timeout(self.config.retry_delay()) {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// One attempt: find the target, and if it opens, serve it until it
    /// disconnects.
    pub fn step(&mut self) -> Result<Step, SupervisorError> {
        let Some(device) = self.find_target()? else {
            return Ok(Step::NotFound);
        };

        let channel = match self.registry.open(&device.path) {
            Ok(channel) => channel,
            Err(e) => {
                debug!("target found but not opened: {e}");
                return Ok(Step::Unavailable(e));
            }
        };

        println!();
        println!("Connected!");
        info!(%device, "connected");

        let reason =
            ReportDispatcher::new(channel, &mut self.keys, &self.config).run(&self.cancel)?;
        Ok(Step::Disconnected(reason))
    }

    fn find_target(&mut self) -> Result<Option<DeviceAttributes>, RegistryError> {
        let (vid, pid) = (self.config.vendor_id, self.config.product_id);
        for device in self.registry.enumerate()? {
            let device = device?;
            if device.matches(vid, pid) {
                return Ok(Some(device));
            }
        }
        Ok(None)
    }
}

fn searching() {
    print!("Searching for device...");
    let _ = std::io::stdout().flush();
}
