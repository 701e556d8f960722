//! Raw byte-stream channel to one HID interface.
//!
//! [`DeviceChannel`] owns a single [`RawHandle`]. The handle is released
//! exactly once: by [`DeviceChannel::close`], or by `Drop` if the channel is
//! abandoned on an early-return path. A failed release is logged at error
//! level; through `close` it is also returned to the caller.

use crate::cancel::CancelToken;
use crate::device::{HidBackend, RawHandle, ReadOutcome, StringKind};
use crate::error::{ChannelError, OpenError, ReadError};
use std::time::Duration;
use tracing::{debug, error, warn};

pub struct DeviceChannel {
    path: String,
    handle: Option<Box<dyn RawHandle>>,
}

impl DeviceChannel {
    /// Open `path` through `backend`.
    ///
    /// Busy, removed and access-denied devices come back as
    /// [`OpenError::Unavailable`]; callers poll, so this is not fatal.
    pub fn open<B: HidBackend + ?Sized>(backend: &B, path: &str) -> Result<Self, OpenError> {
        let handle = backend.open(path)?;
        debug!(path, "channel opened");
        Ok(Self {
            path: path.to_owned(),
            handle: Some(handle),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn handle(&self) -> Result<&dyn RawHandle, ChannelError> {
        self.handle.as_deref().ok_or(ChannelError::Released)
    }

    /// Vendor and product id. Fails if the driver query fails.
    pub fn query_attributes(&self) -> Result<(u16, u16), ChannelError> {
        self.handle()?.vendor_product()
    }

    /// Descriptor string; a failed query degrades to `Some("")`.
    pub fn query_string(&self, kind: StringKind) -> Option<String> {
        match self.handle().and_then(|h| h.string(kind)) {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %self.path, ?kind, "string query failed: {e}");
                Some(String::new())
            }
        }
    }

    /// Read one report into `buf`.
    ///
    /// Blocks in slices of at most `slice`, checking `cancel` between slices,
    /// so a cancel request is honoured within one slice.
    pub fn read(
        &mut self,
        buf: &mut [u8],
        cancel: &CancelToken,
        slice: Duration,
    ) -> Result<usize, ReadError> {
        let handle = self
            .handle
            .as_deref_mut()
            .ok_or_else(|| ReadError::Io(ChannelError::Released.to_string()))?;
        loop {
            if cancel.is_cancelled() {
                return Err(ReadError::Cancelled);
            }
            match handle.read_timeout(buf, slice) {
                Ok(ReadOutcome::Data(n)) => return Ok(n),
                Ok(ReadOutcome::TimedOut) => continue,
                Ok(ReadOutcome::Closed) => return Err(ReadError::Closed),
                Err(e) => return Err(ReadError::Io(e.to_string())),
            }
        }
    }

    /// Release the handle.
    pub fn close(mut self) -> Result<(), ChannelError> {
        match self.handle.take() {
            Some(handle) => release(&self.path, handle),
            None => Ok(()),
        }
    }
}

fn release(path: &str, handle: Box<dyn RawHandle>) -> Result<(), ChannelError> {
    handle.release().map_err(|e| {
        error!(path, "failed to release device handle: {e}");
        e
    })?;
    debug!(path, "channel closed");
    Ok(())
}

impl Drop for DeviceChannel {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = release(&self.path, handle);
        }
    }
}

impl std::fmt::Debug for DeviceChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceChannel")
            .field("path", &self.path)
            .field("open", &self.handle.is_some())
            .finish()
    }
}

#[cfg(all(test, feature = "virtual"))]
mod tests {
    use super::*;
    use crate::backends::virtual_input::{VirtualBackend, VirtualDevice};
    use std::thread;
    use std::time::Instant;

    const SLICE: Duration = Duration::from_millis(20);

    #[test]
    fn locked_device_is_unavailable() {
        let backend = VirtualBackend::new();
        backend.plug(VirtualDevice::new("A", 1, 2).locked());
        let err = DeviceChannel::open(&backend, "A").unwrap_err();
        assert!(matches!(err, OpenError::Unavailable { .. }));
        assert_eq!(backend.stats().opens, 0);
    }

    #[test]
    fn close_releases_once() {
        let backend = VirtualBackend::new();
        backend.plug(VirtualDevice::new("A", 1, 2));
        let channel = DeviceChannel::open(&backend, "A").unwrap();
        channel.close().unwrap();
        let stats = backend.stats();
        assert_eq!((stats.opens, stats.releases), (1, 1));
    }

    #[test]
    fn drop_releases_abandoned_channel() {
        let backend = VirtualBackend::new();
        backend.plug(VirtualDevice::new("A", 1, 2));
        drop(DeviceChannel::open(&backend, "A").unwrap());
        assert_eq!(backend.stats().releases, 1);
    }

    #[test]
    fn release_failure_is_returned() {
        let backend = VirtualBackend::new();
        backend.plug(VirtualDevice::new("A", 1, 2).failing_release());
        let channel = DeviceChannel::open(&backend, "A").unwrap();
        assert!(matches!(channel.close(), Err(ChannelError::Release(_))));
    }

    #[test]
    fn string_failure_degrades_to_empty() {
        let backend = VirtualBackend::new();
        backend.plug(
            VirtualDevice::new("A", 1, 2)
                .product("Headset")
                .failing_strings(),
        );
        let channel = DeviceChannel::open(&backend, "A").unwrap();
        assert_eq!(channel.query_string(StringKind::Product), Some(String::new()));
        assert_eq!(channel.query_attributes(), Ok((1, 2)));
    }

    #[test]
    fn read_returns_scripted_report_then_eof() {
        let backend = VirtualBackend::new();
        backend.plug(
            VirtualDevice::new("A", 1, 2)
                .report(&[0x01, 0xB0, 0, 0, 0])
                .eof(),
        );
        let cancel = CancelToken::new();
        let mut channel = DeviceChannel::open(&backend, "A").unwrap();
        let mut buf = [0u8; 5];
        assert_eq!(channel.read(&mut buf, &cancel, SLICE), Ok(5));
        assert_eq!(buf[1], 0xB0);
        assert_eq!(channel.read(&mut buf, &cancel, SLICE), Err(ReadError::Closed));
    }

    #[test]
    fn cancel_interrupts_idle_read() {
        let backend = VirtualBackend::new();
        backend.plug(VirtualDevice::new("A", 1, 2));
        let cancel = CancelToken::new();
        let remote = cancel.clone();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(60));
            remote.cancel();
        });

        let mut channel = DeviceChannel::open(&backend, "A").unwrap();
        let mut buf = [0u8; 5];
        let start = Instant::now();
        assert_eq!(channel.read(&mut buf, &cancel, SLICE), Err(ReadError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(1));
        canceller.join().unwrap();
    }
}
