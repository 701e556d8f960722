//! Media-key output.
//!
//! [`KeyPresser`] is the one capability the dispatcher needs from the host:
//! press and release a media key. Implementations are fire-and-forget; a
//! failed press is logged, never returned.
//!
//! [`system_keys`] picks the platform implementation:
//! - Windows: `SendInput` ([`SendInputKeys`](crate::backends::windows::send_input::SendInputKeys))
//! - Linux: a uinput virtual keyboard ([`UinputKeys`](crate::backends::linux::uinput::UinputKeys)),
//!   falling back to [`LogOnlyKeys`] when `/dev/uinput` is not accessible
//! - elsewhere: [`LogOnlyKeys`]

use crate::event::MediaKey;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

pub trait KeyPresser {
    fn press(&mut self, key: MediaKey);
}

impl KeyPresser for Box<dyn KeyPresser + Send> {
    fn press(&mut self, key: MediaKey) {
        (**self).press(key)
    }
}

/// Logs key presses instead of sending them.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogOnlyKeys;

impl KeyPresser for LogOnlyKeys {
    fn press(&mut self, key: MediaKey) {
        info!(?key, vk = format_args!("0x{:02X}", key.vk_code()), "media key (dry run)");
    }
}

/// Remembers every key pressed. Clones share the record.
#[derive(Clone, Debug, Default)]
pub struct RecordingKeys {
    pressed: Arc<Mutex<Vec<MediaKey>>>,
}

impl RecordingKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pressed(&self) -> Vec<MediaKey> {
        self.pressed.lock().clone()
    }
}

impl KeyPresser for RecordingKeys {
    fn press(&mut self, key: MediaKey) {
        self.pressed.lock().push(key);
    }
}

/// Best available key output for this platform.
pub fn system_keys() -> Box<dyn KeyPresser + Send> {
    #[cfg(target_os = "windows")]
    {
        Box::new(crate::backends::windows::send_input::SendInputKeys)
    }

    #[cfg(target_os = "linux")]
    {
        match crate::backends::linux::uinput::UinputKeys::new() {
            Ok(keys) => Box::new(keys),
            Err(e) => {
                tracing::warn!("{e}; media keys will only be logged");
                Box::new(LogOnlyKeys)
            }
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux")))]
    {
        Box::new(LogOnlyKeys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_clones_share_the_record() {
        let keys = RecordingKeys::new();
        let mut writer = keys.clone();
        writer.press(MediaKey::PlayPause);
        writer.press(MediaKey::Stop);
        assert_eq!(keys.pressed(), vec![MediaKey::PlayPause, MediaKey::Stop]);
    }

    #[test]
    fn boxed_pressers_forward() {
        let mut keys: Box<dyn KeyPresser + Send> = Box::new(LogOnlyKeys);
        keys.press(MediaKey::PlayPause);
    }
}
