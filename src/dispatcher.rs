//! Report read/dispatch loop for one connection.
//!
//! A [`ReportDispatcher`] is the **Connected** state: it owns the open
//! [`DeviceChannel`] and reads reports until the stream ends, a read fails, or
//! the watcher is cancelled. [`ReportDispatcher::run`] consumes the dispatcher
//! and returns the terminal **Disconnected** reason; the channel is closed
//! exactly once on the way out, whichever reason it was.
//!
//! Read faults are not errors at this layer. A transient I/O error or an
//! unplugged device just ends the connection ([`Disconnect::Fault`],
//! [`Disconnect::Closed`]) and the supervisor reconnects.

use crate::backends::keys::KeyPresser;
use crate::cancel::CancelToken;
use crate::channel::DeviceChannel;
use crate::config::WatchConfig;
use crate::error::{ChannelError, ReadError};
use crate::event::{HexBytes, Report};
use std::time::Duration;
use tracing::{debug, trace};

/// Why a connection ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Disconnect {
    Cancelled,
    /// End of stream (device removed).
    Closed,
    /// Read failure.
    Fault(String),
}

pub struct ReportDispatcher<'k, K: ?Sized> {
    channel: DeviceChannel,
    keys: &'k mut K,
    report_len: usize,
    read_slice: Duration,
    hex_dump: bool,
}

impl<'k, K: KeyPresser + ?Sized> ReportDispatcher<'k, K> {
    pub fn new(channel: DeviceChannel, keys: &'k mut K, config: &WatchConfig) -> Self {
        Self {
            channel,
            keys,
            report_len: config.report_len,
            read_slice: config.read_slice(),
            hex_dump: config.hex_dump,
        }
    }

    /// Read and dispatch until disconnected, then close the channel.
    ///
    /// The only error is a failed handle release.
    pub fn run(mut self, cancel: &CancelToken) -> Result<Disconnect, ChannelError> {
        let reason = self.pump(cancel);
        debug!(path = self.channel.path(), ?reason, "connection ended");
        self.channel.close()?;
        Ok(reason)
    }

    fn pump(&mut self, cancel: &CancelToken) -> Disconnect {
        let mut buf = vec![0u8; self.report_len];
        loop {
            match self.channel.read(&mut buf, cancel, self.read_slice) {
                Ok(n) => self.dispatch(&buf[..n]),
                Err(ReadError::Cancelled) => return Disconnect::Cancelled,
                Err(ReadError::Closed) => return Disconnect::Closed,
                Err(ReadError::Io(e)) => return Disconnect::Fault(e),
            }
        }
    }

    fn dispatch(&mut self, bytes: &[u8]) {
        if let Some(line) = self.hex_line(bytes) {
            println!("{line}");
        }
        let Some(report) = Report::parse(bytes) else {
            trace!(len = bytes.len(), "short report ignored");
            return;
        };
        let gesture = report.gesture();
        match gesture.media_key() {
            Some(key) => {
                debug!(?gesture, ?key, "gesture");
                self.keys.press(key);
            }
            None => trace!(?gesture, "ignored gesture"),
        }
    }

    /// Console dump of a raw read, short ones included.
    fn hex_line(&self, bytes: &[u8]) -> Option<String> {
        self.hex_dump.then(|| HexBytes(bytes).to_string())
    }
}
