//! Device attribute snapshot.
//!
//! [`DeviceAttributes`] is an immutable description of one HID interface,
//! built during a single enumeration pass by
//! [`DeviceRegistry`](crate::registry::DeviceRegistry) and discarded at the end
//! of that pass. Nothing is cached across passes.
//!
//! # Conventions
//! - `path` is an OS path (opaque string) used to open a channel. It is always
//!   non-empty and only valid while the device stays attached.
//! - String fields are `None` when the device does not provide them. A string
//!   query that *failed* degrades to `Some("")`, which is distinct from `None`.
//!
//! # Example
//! ```no_run
//! # #[cfg(feature = "hid")]
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use playpause::backends::hid::HidApiBackend;
//! use playpause::{DeviceRegistry, IdQueryPolicy};
//!
//! let mut registry = DeviceRegistry::new(HidApiBackend::new()?, IdQueryPolicy::Skip);
//! for info in registry.enumerate()? {
//!     println!("{}", info?);
//! }
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifying attributes of a single HID interface.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceAttributes {
    /// OS device path; used to open the communication channel.
    pub path: String,

    /// USB Vendor ID (VID).
    pub vendor_id: u16,

    /// USB Product ID (PID).
    pub product_id: u16,

    /// Product string from the firmware, if any.
    pub product: Option<String>,

    /// Manufacturer string from the firmware, if any.
    pub manufacturer: Option<String>,

    /// Serial number string, if any.
    ///
    /// On USB, this usually maps to the iSerialNumber string.
    pub serial_number: Option<String>,
}

impl DeviceAttributes {
    /// `true` if this device carries the given VID/PID pair.
    #[inline]
    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }
}

impl fmt::Display for DeviceAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VID = {:04X} PID = {:04X} Product: {} Path {}",
            self.vendor_id,
            self.product_id,
            self.product.as_deref().unwrap_or(""),
            self.path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headset() -> DeviceAttributes {
        DeviceAttributes {
            path: r"\\?\hid#vid_045e&pid_0627".into(),
            vendor_id: 0x045e,
            product_id: 0x0627,
            product: Some("MDR-1000X".into()),
            manufacturer: None,
            serial_number: Some(String::new()),
        }
    }

    #[test]
    fn display_uses_upper_hex_ids() {
        assert_eq!(
            headset().to_string(),
            r"VID = 045E PID = 0627 Product: MDR-1000X Path \\?\hid#vid_045e&pid_0627"
        );
    }

    #[test]
    fn matches_requires_both_ids() {
        let dev = headset();
        assert!(dev.matches(0x045e, 0x0627));
        assert!(!dev.matches(0x045e, 0x0628));
        assert!(!dev.matches(0x046d, 0x0627));
    }

    #[test]
    fn serializes_missing_and_empty_strings_differently() {
        let json = serde_json::to_value(headset()).unwrap();
        assert!(json["manufacturer"].is_null());
        assert_eq!(json["serial_number"], "");
    }
}
