#![cfg(target_os = "windows")]

//! Windows output backends.
//!
//! HID access itself goes through `hidapi` ([`backends::hid`](crate::backends::hid));
//! this module only holds what hidapi does not cover:
//! - **SendInput** media-key synthesis

pub mod send_input;

pub use send_input::SendInputKeys;
