#![cfg(target_os = "linux")]

//! Linux output backends.
//!
//! - **uinput** virtual keyboard for media keys

pub mod uinput;

pub use uinput::UinputKeys;
