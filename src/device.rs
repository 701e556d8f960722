//! OS boundary traits.
//!
//! The watcher never talks to hidapi or Win32 directly. Backends implement
//! [`HidBackend`] (listing and opening interfaces) and [`RawHandle`] (one open
//! OS handle). Everything above this layer is platform-neutral and testable
//! with the scripted backend in [`backends::virtual_input`](crate::backends).

use crate::error::{ChannelError, OpenError, RegistryError};
use std::time::Duration;

/// Which descriptor string to query from an open handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StringKind {
    Manufacturer,
    Product,
    SerialNumber,
}

/// Result of one bounded read slice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `n` bytes were written to the front of the buffer.
    Data(usize),
    /// Nothing arrived within the slice.
    TimedOut,
    /// End of stream.
    Closed,
}

/// One open OS handle to a HID interface.
///
/// Owned by exactly one [`DeviceChannel`](crate::channel::DeviceChannel);
/// [`release`](RawHandle::release) is called exactly once.
pub trait RawHandle {
    /// Vendor and product id as reported by the driver.
    fn vendor_product(&self) -> Result<(u16, u16), ChannelError>;

    /// A descriptor string. `Ok(None)` means the device has none.
    fn string(&self, kind: StringKind) -> Result<Option<String>, ChannelError>;

    /// Read one report, waiting at most `timeout`.
    fn read_timeout(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<ReadOutcome, ChannelError>;

    /// Give the handle back to the OS.
    fn release(self: Box<Self>) -> Result<(), ChannelError>;
}

/// Source of HID interfaces.
pub trait HidBackend {
    /// Re-query the OS and return the path of every present HID interface.
    fn device_paths(&mut self) -> Result<Vec<String>, RegistryError>;

    /// Open `path` for shared read/write access.
    fn open(&self, path: &str) -> Result<Box<dyn RawHandle>, OpenError>;
}
