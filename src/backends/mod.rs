//! Platform backends for `playpause`.
//!
//! Implementations of [`HidBackend`](crate::device::HidBackend) and
//! [`KeyPresser`](keys::KeyPresser) for concrete platforms.
//!
//! # Feature flags
//! - **`hid`**: enables the `hidapi` device backend (default).
//! - **`virtual`**: enables the scripted in-memory device backend (default; used by tests).

pub mod keys;

#[cfg(feature = "hid")]
#[cfg_attr(docsrs, doc(cfg(feature = "hid")))]
pub mod hid;

#[cfg(feature = "virtual")]
#[cfg_attr(docsrs, doc(cfg(feature = "virtual")))]
pub mod virtual_input;

#[cfg(target_os = "windows")]
#[cfg_attr(docsrs, doc(cfg(target_os = "windows")))]
pub mod windows;

#[cfg(target_os = "linux")]
#[cfg_attr(docsrs, doc(cfg(target_os = "linux")))]
pub mod linux;
