//! Error types.
//!
//! Errors are split by how the watcher reacts to them:
//! - [`OpenError`] and [`ReadError`] are recoverable; the supervisor treats them
//!   as "currently disconnected" and retries.
//! - [`RegistryError::List`] and handle release failures ([`ChannelError::Release`])
//!   are fatal and end the process.
//! - Cancellation is not an error; see [`ReadError::Cancelled`] and
//!   [`Disconnect::Cancelled`](crate::dispatcher::Disconnect::Cancelled).

use std::path::PathBuf;
use thiserror::Error;

/// A device path could not be opened.
#[derive(Debug, Error)]
pub enum OpenError {
    /// The OS refused the open (busy, removed, access denied). Recoverable.
    #[error("device {path} is not available: {reason}")]
    Unavailable { path: String, reason: String },

    /// The path cannot be handed to the OS at all.
    #[error("invalid device path {0:?}")]
    InvalidPath(String),
}

/// Failure of an operation on an open channel.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("HID I/O error: {0}")]
    Io(String),

    /// Releasing an OS handle failed. Never expected on a valid handle.
    #[error("failed to release device handle: {0}")]
    Release(String),

    #[error("channel handle already released")]
    Released,
}

/// Outcome of a report read that produced no data.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReadError {
    #[error("read cancelled")]
    Cancelled,

    /// End of stream; the device went away.
    #[error("device closed the stream")]
    Closed,

    #[error("read failed: {0}")]
    Io(String),
}

/// Enumeration failure.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The OS device list could not be obtained.
    #[error("failed to list HID devices: {0}")]
    List(String),

    /// An interface was listed without a usable path.
    #[error("HID interface without a device path")]
    MissingPath,

    /// VID/PID query failed under [`IdQueryPolicy::Abort`](crate::config::IdQueryPolicy::Abort).
    #[error("failed to read attributes of {path}")]
    Attributes {
        path: String,
        #[source]
        source: ChannelError,
    },

    /// The discovery channel could not be released.
    #[error("failed to release discovery handle for {path}")]
    Release {
        path: String,
        #[source]
        source: ChannelError,
    },
}

/// Configuration file problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A value that would make the watcher spin or never dispatch.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Fatal supervisor failure; anything recoverable is retried instead.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Channel(#[from] ChannelError),
}

/// Key-press backend setup failure.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("failed to create virtual key device: {0}")]
    CreateDevice(#[source] std::io::Error),
}
