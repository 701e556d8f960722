//! playpause: turns a headset's play/pause gesture into a system media key.
//!
//! Watches for one USB HID device (by VID/PID), reads its 5-byte input reports,
//! and presses the play/pause media key whenever the gesture code shows up.
//! Keeps retrying while the device is absent and reconnects after a disconnect.
//!
//! Layers, leaf first:
//! - [`metadata`]: [`DeviceAttributes`]
//! - [`device`]: OS boundary traits, implemented in [`backends`]
//! - [`channel`]: [`DeviceChannel`], one open handle
//! - [`registry`]: [`DeviceRegistry`], lazy enumeration
//! - [`dispatcher`]: [`ReportDispatcher`], the read/dispatch loop
//! - [`supervisor`]: [`ConnectionSupervisor`], search/connect/retry

pub mod backends;
pub mod cancel;
pub mod channel;
pub mod config;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod metadata;
pub mod registry;
pub mod supervisor;

pub use backends::keys::{KeyPresser, LogOnlyKeys, RecordingKeys};
pub use cancel::CancelToken;
pub use channel::DeviceChannel;
pub use config::{IdQueryPolicy, WatchConfig};
pub use device::{HidBackend, RawHandle, ReadOutcome, StringKind};
pub use dispatcher::{Disconnect, ReportDispatcher};
pub use error::*;
pub use event::{Gesture, MediaKey, Report};
pub use metadata::DeviceAttributes;
pub use registry::{DeviceRegistry, Enumeration};
pub use supervisor::{ConnectionSupervisor, Step};
