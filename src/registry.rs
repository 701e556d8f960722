//! HID device enumeration.
//!
//! [`DeviceRegistry::enumerate`] re-queries the OS on every call and returns a
//! lazy [`Enumeration`]. Each interface is opened only when the iterator
//! reaches it, queried, and closed again before its [`DeviceAttributes`] is
//! yielded; stopping early (e.g. `find`) leaves the remaining interfaces
//! untouched.
//!
//! ## Failure policy
//! - Listing fails → [`RegistryError::List`] from `enumerate` (fatal).
//! - An interface cannot be opened → skipped silently.
//! - A string query fails → that field becomes `Some("")`.
//! - The VID/PID query fails → [`IdQueryPolicy`] decides: skip the device, or
//!   yield [`RegistryError::Attributes`].
//! - The discovery handle cannot be released → [`RegistryError::Release`].

use crate::channel::DeviceChannel;
use crate::config::IdQueryPolicy;
use crate::device::{HidBackend, StringKind};
use crate::error::{OpenError, RegistryError};
use crate::metadata::DeviceAttributes;
use tracing::{debug, warn};

pub struct DeviceRegistry<B> {
    backend: B,
    policy: IdQueryPolicy,
}

impl<B: HidBackend> DeviceRegistry<B> {
    pub fn new(backend: B, policy: IdQueryPolicy) -> Self {
        Self { backend, policy }
    }

    /// Start a fresh enumeration pass.
    pub fn enumerate(&mut self) -> Result<Enumeration<'_, B>, RegistryError> {
        let paths = self.backend.device_paths()?;
        debug!(count = paths.len(), "listed HID interfaces");
        Ok(Enumeration {
            backend: &self.backend,
            paths: paths.into_iter(),
            policy: self.policy,
        })
    }

    /// Open the communication channel for an enumerated device.
    pub fn open(&self, path: &str) -> Result<DeviceChannel, OpenError> {
        DeviceChannel::open(&self.backend, path)
    }
}

/// One lazy enumeration pass. See the module docs for the failure policy.
pub struct Enumeration<'a, B> {
    backend: &'a B,
    paths: std::vec::IntoIter<String>,
    policy: IdQueryPolicy,
}

impl<B: HidBackend> Enumeration<'_, B> {
    fn describe(&self, path: String) -> Option<Result<DeviceAttributes, RegistryError>> {
        if path.is_empty() {
            return Some(Err(RegistryError::MissingPath));
        }

        let channel = match DeviceChannel::open(self.backend, &path) {
            Ok(channel) => channel,
            Err(e) => {
                debug!("skipping: {e}");
                return None;
            }
        };

        let manufacturer = channel.query_string(StringKind::Manufacturer);
        let product = channel.query_string(StringKind::Product);
        let serial_number = channel.query_string(StringKind::SerialNumber);
        let ids = channel.query_attributes();

        if let Err(source) = channel.close() {
            return Some(Err(RegistryError::Release { path, source }));
        }

        match ids {
            Ok((vendor_id, product_id)) => Some(Ok(DeviceAttributes {
                path,
                vendor_id,
                product_id,
                product,
                manufacturer,
                serial_number,
            })),
            Err(source) => match self.policy {
                IdQueryPolicy::Skip => {
                    warn!(%path, "skipping device without VID/PID: {source}");
                    None
                }
                IdQueryPolicy::Abort => Some(Err(RegistryError::Attributes { path, source })),
            },
        }
    }
}

impl<B: HidBackend> Iterator for Enumeration<'_, B> {
    type Item = Result<DeviceAttributes, RegistryError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(path) = self.paths.next() {
            if let Some(item) = self.describe(path) {
                return Some(item);
            }
        }
        None
    }
}
