//! `hidapi` backend.
//!
//! On Windows hidapi opens interfaces with `GENERIC_READ | GENERIC_WRITE`,
//! `FILE_SHARE_READ | FILE_SHARE_WRITE` and overlapped I/O, which is exactly
//! the access the headset channel needs. Keyboards and mice refuse that open
//! and are skipped by the registry.

use crate::device::{HidBackend, RawHandle, ReadOutcome, StringKind};
use crate::error::{ChannelError, OpenError, RegistryError};
use hidapi::{HidApi, HidDevice, HidError};
use std::ffi::CString;
use std::time::Duration;

impl From<HidError> for ChannelError {
    fn from(e: HidError) -> Self {
        ChannelError::Io(e.to_string())
    }
}

pub struct HidApiBackend {
    api: HidApi,
}

impl HidApiBackend {
    /// Initialise hidapi. Failure means no device list can ever be obtained.
    pub fn new() -> Result<Self, RegistryError> {
        let api = HidApi::new().map_err(|e| RegistryError::List(e.to_string()))?;
        Ok(Self { api })
    }
}

impl HidBackend for HidApiBackend {
    fn device_paths(&mut self) -> Result<Vec<String>, RegistryError> {
        self.api
            .refresh_devices()
            .map_err(|e| RegistryError::List(e.to_string()))?;
        Ok(self
            .api
            .device_list()
            .map(|info| info.path().to_string_lossy().to_string())
            .collect())
    }

    fn open(&self, path: &str) -> Result<Box<dyn RawHandle>, OpenError> {
        let cpath = CString::new(path).map_err(|_| OpenError::InvalidPath(path.to_string()))?;
        let device = self
            .api
            .open_path(&cpath)
            .map_err(|e| OpenError::Unavailable {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Box::new(HidApiHandle { device }))
    }
}

struct HidApiHandle {
    device: HidDevice,
}

impl RawHandle for HidApiHandle {
    fn vendor_product(&self) -> Result<(u16, u16), ChannelError> {
        let info = self.device.get_device_info()?;
        Ok((info.vendor_id(), info.product_id()))
    }

    fn string(&self, kind: StringKind) -> Result<Option<String>, ChannelError> {
        let value = match kind {
            StringKind::Manufacturer => self.device.get_manufacturer_string()?,
            StringKind::Product => self.device.get_product_string()?,
            StringKind::SerialNumber => self.device.get_serial_number_string()?,
        };
        Ok(value)
    }

    fn read_timeout(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<ReadOutcome, ChannelError> {
        let ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
        // hidapi reports "no data yet" as a zero-length read; a vanished
        // device surfaces as an error.
        match self.device.read_timeout(buf, ms)? {
            0 => Ok(ReadOutcome::TimedOut),
            n => Ok(ReadOutcome::Data(n)),
        }
    }

    fn release(self: Box<Self>) -> Result<(), ChannelError> {
        // HidDevice closes its handle on drop; hidapi offers no fallible close.
        drop(self.device);
        Ok(())
    }
}
