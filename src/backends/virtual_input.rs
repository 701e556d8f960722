//! Scripted in-memory HID backend.
//!
//! [`VirtualBackend`] stands in for the OS in tests and dry runs. Devices are
//! "plugged" with a script of reports; reads replay the script, an idle script
//! blocks for the full read slice, and [`VirtualDevice::eof`] ends the stream
//! and unplugs the device, the way a headset being switched off does.
//!
//! Clones share state, so a test can keep one clone for inspection
//! ([`VirtualBackend::stats`]) while the watcher owns another.

use crate::device::{HidBackend, RawHandle, ReadOutcome, StringKind};
use crate::error::{ChannelError, OpenError, RegistryError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug)]
enum Scripted {
    Report(Vec<u8>),
    Eof,
    Fault(String),
}

/// A fake HID interface.
#[derive(Clone, Debug)]
pub struct VirtualDevice {
    path: String,
    vendor_id: u16,
    product_id: u16,
    product: Option<String>,
    manufacturer: Option<String>,
    serial_number: Option<String>,
    locked: bool,
    failing_ids: bool,
    failing_strings: Vec<StringKind>,
    failing_release: bool,
    script: VecDeque<Scripted>,
}

impl VirtualDevice {
    pub fn new(path: &str, vendor_id: u16, product_id: u16) -> Self {
        Self {
            path: path.to_string(),
            vendor_id,
            product_id,
            product: None,
            manufacturer: None,
            serial_number: None,
            locked: false,
            failing_ids: false,
            failing_strings: Vec::new(),
            failing_release: false,
            script: VecDeque::new(),
        }
    }

    pub fn product(mut self, s: &str) -> Self {
        self.product = Some(s.to_string());
        self
    }

    pub fn manufacturer(mut self, s: &str) -> Self {
        self.manufacturer = Some(s.to_string());
        self
    }

    pub fn serial(mut self, s: &str) -> Self {
        self.serial_number = Some(s.to_string());
        self
    }

    /// Refuse every open, like an interface held exclusively by another driver.
    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Fail the VID/PID query.
    pub fn failing_ids(mut self) -> Self {
        self.failing_ids = true;
        self
    }

    /// Fail one descriptor string query.
    pub fn failing_string(mut self, kind: StringKind) -> Self {
        if !self.failing_strings.contains(&kind) {
            self.failing_strings.push(kind);
        }
        self
    }

    /// Fail every descriptor string query.
    pub fn failing_strings(self) -> Self {
        self.failing_string(StringKind::Manufacturer)
            .failing_string(StringKind::Product)
            .failing_string(StringKind::SerialNumber)
    }

    /// Fail to release handles.
    pub fn failing_release(mut self) -> Self {
        self.failing_release = true;
        self
    }

    /// Queue one input report.
    pub fn report(mut self, bytes: &[u8]) -> Self {
        self.script.push_back(Scripted::Report(bytes.to_vec()));
        self
    }

    /// Queue end of stream; the device unplugs itself when it is read.
    pub fn eof(mut self) -> Self {
        self.script.push_back(Scripted::Eof);
        self
    }

    /// Queue a read error.
    pub fn fault(mut self, msg: &str) -> Self {
        self.script.push_back(Scripted::Fault(msg.to_string()));
        self
    }
}

/// Counters for asserting on handle discipline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VirtualStats {
    pub list_calls: usize,
    pub opens: usize,
    pub releases: usize,
}

#[derive(Default)]
struct State {
    devices: Vec<VirtualDevice>,
    list_error: Option<String>,
    stats: VirtualStats,
}

impl State {
    fn device(&self, path: &str) -> Option<&VirtualDevice> {
        self.devices.iter().find(|d| d.path == path)
    }
}

#[derive(Clone, Default)]
pub struct VirtualBackend {
    state: Arc<Mutex<State>>,
}

impl VirtualBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plug(&self, device: VirtualDevice) {
        self.state.lock().devices.push(device);
    }

    pub fn unplug(&self, path: &str) {
        self.state.lock().devices.retain(|d| d.path != path);
    }

    /// Make every following listing fail.
    pub fn fail_listing(&self, msg: &str) {
        self.state.lock().list_error = Some(msg.to_string());
    }

    pub fn stats(&self) -> VirtualStats {
        self.state.lock().stats
    }
}

impl HidBackend for VirtualBackend {
    fn device_paths(&mut self) -> Result<Vec<String>, RegistryError> {
        let mut state = self.state.lock();
        state.stats.list_calls += 1;
        if let Some(msg) = &state.list_error {
            return Err(RegistryError::List(msg.clone()));
        }
        Ok(state.devices.iter().map(|d| d.path.clone()).collect())
    }

    fn open(&self, path: &str) -> Result<Box<dyn RawHandle>, OpenError> {
        let mut state = self.state.lock();
        let failing_release = match state.device(path) {
            None => {
                return Err(OpenError::Unavailable {
                    path: path.to_string(),
                    reason: "no such device".into(),
                })
            }
            Some(d) if d.locked => {
                return Err(OpenError::Unavailable {
                    path: path.to_string(),
                    reason: "access denied".into(),
                })
            }
            Some(d) => d.failing_release,
        };
        state.stats.opens += 1;
        Ok(Box::new(VirtualHandle {
            state: Arc::clone(&self.state),
            path: path.to_string(),
            failing_release,
        }))
    }
}

struct VirtualHandle {
    state: Arc<Mutex<State>>,
    path: String,
    failing_release: bool,
}

impl VirtualHandle {
    fn removed() -> ChannelError {
        ChannelError::Io("device removed".into())
    }
}

impl RawHandle for VirtualHandle {
    fn vendor_product(&self) -> Result<(u16, u16), ChannelError> {
        let state = self.state.lock();
        let dev = state.device(&self.path).ok_or_else(Self::removed)?;
        if dev.failing_ids {
            return Err(ChannelError::Io("attribute query failed".into()));
        }
        Ok((dev.vendor_id, dev.product_id))
    }

    fn string(&self, kind: StringKind) -> Result<Option<String>, ChannelError> {
        let state = self.state.lock();
        let dev = state.device(&self.path).ok_or_else(Self::removed)?;
        if dev.failing_strings.contains(&kind) {
            return Err(ChannelError::Io(format!("{kind:?} string query failed")));
        }
        Ok(match kind {
            StringKind::Manufacturer => dev.manufacturer.clone(),
            StringKind::Product => dev.product.clone(),
            StringKind::SerialNumber => dev.serial_number.clone(),
        })
    }

    fn read_timeout(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<ReadOutcome, ChannelError> {
        let next = {
            let mut state = self.state.lock();
            match state.devices.iter_mut().find(|d| d.path == self.path) {
                None => return Ok(ReadOutcome::Closed),
                Some(dev) => dev.script.pop_front(),
            }
        };
        match next {
            Some(Scripted::Report(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(ReadOutcome::Data(n))
            }
            Some(Scripted::Eof) => {
                self.state.lock().devices.retain(|d| d.path != self.path);
                Ok(ReadOutcome::Closed)
            }
            Some(Scripted::Fault(msg)) => Err(ChannelError::Io(msg)),
            None => {
                std::thread::sleep(timeout);
                Ok(ReadOutcome::TimedOut)
            }
        }
    }

    fn release(self: Box<Self>) -> Result<(), ChannelError> {
        self.state.lock().stats.releases += 1;
        if self.failing_release {
            return Err(ChannelError::Release("CloseHandle failed".into()));
        }
        Ok(())
    }
}
