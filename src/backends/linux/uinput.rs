#![cfg(target_os = "linux")]

//! Media keys through a uinput virtual keyboard.
//!
//! Needs write access to `/dev/uinput` (usually the `input` group or a udev rule).

use crate::backends::keys::KeyPresser;
use crate::error::KeyError;
use crate::event::MediaKey;
use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AttributeSet, EventType, InputEvent, Key,
};
use tracing::{debug, warn};

/// Name shown by `evtest` and desktop input settings.
pub const DEVICE_NAME: &str = "playpause media keys";

pub struct UinputKeys {
    device: VirtualDevice,
}

fn key_code(key: MediaKey) -> Key {
    match key {
        MediaKey::PlayPause => Key::KEY_PLAYPAUSE,
        MediaKey::NextTrack => Key::KEY_NEXTSONG,
        MediaKey::PreviousTrack => Key::KEY_PREVIOUSSONG,
        MediaKey::Stop => Key::KEY_STOPCD,
    }
}

impl UinputKeys {
    pub fn new() -> Result<Self, KeyError> {
        let mut keys = AttributeSet::<Key>::new();
        for key in [
            MediaKey::PlayPause,
            MediaKey::NextTrack,
            MediaKey::PreviousTrack,
            MediaKey::Stop,
        ] {
            keys.insert(key_code(key));
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(KeyError::CreateDevice)?
            .name(DEVICE_NAME)
            .with_keys(&keys)
            .map_err(KeyError::CreateDevice)?
            .build()
            .map_err(KeyError::CreateDevice)?;

        Ok(Self { device })
    }

    fn emit(&mut self, code: Key, value: i32) -> std::io::Result<()> {
        // emit() appends the SYN_REPORT
        self.device
            .emit(&[InputEvent::new(EventType::KEY, code.code(), value)])
    }
}

impl KeyPresser for UinputKeys {
    fn press(&mut self, key: MediaKey) {
        let code = key_code(key);
        match self.emit(code, 1).and_then(|_| self.emit(code, 0)) {
            Ok(()) => debug!(?key, "uinput media key"),
            Err(e) => warn!(?key, "failed to emit media key: {e}"),
        }
    }
}
