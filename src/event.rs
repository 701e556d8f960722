//! Reports, gestures and media keys.
//!
//! The headset sends fixed 5-byte input reports:
//!
//! | byte | meaning |
//! |------|---------|
//! | 0    | framing marker (always `0x01`, ignored) |
//! | 1    | gesture code |
//! | 2..5 | unused |
//!
//! Gesture codes `0xB0` and `0xB1` are both emitted for the one play/pause
//! gesture; nobody knows what distinguishes them, so both map to
//! [`Gesture::PlayPause`]. Every other code is ignored.

use std::fmt;

/// Length of one input report, including the framing byte.
pub const REPORT_LEN: usize = 5;

/// Offset of the gesture code within a report.
pub const GESTURE_OFFSET: usize = 1;

/// Gesture decoded from a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    PlayPause,
    /// Any code this watcher does not act on (e.g. `0xB2`).
    Other(u8),
}

impl Gesture {
    pub fn from_code(code: u8) -> Self {
        match code {
            0xB0 | 0xB1 => Gesture::PlayPause,
            other => Gesture::Other(other),
        }
    }

    /// Media key to synthesize for this gesture, if any.
    pub fn media_key(self) -> Option<MediaKey> {
        match self {
            Gesture::PlayPause => Some(MediaKey::PlayPause),
            Gesture::Other(_) => None,
        }
    }
}

/// A borrowed input report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Report<'a> {
    bytes: &'a [u8],
}

impl<'a> Report<'a> {
    /// Wrap raw bytes. Returns `None` if the gesture byte is missing.
    pub fn parse(bytes: &'a [u8]) -> Option<Self> {
        if bytes.len() > GESTURE_OFFSET {
            Some(Self { bytes })
        } else {
            None
        }
    }

    #[inline]
    pub fn gesture(&self) -> Gesture {
        Gesture::from_code(self.bytes[GESTURE_OFFSET])
    }
}

/// Dash-separated upper-case hex, e.g. `01-B1-00-00-00`.
#[derive(Clone, Copy, Debug)]
pub struct HexBytes<'a>(pub &'a [u8]);

impl fmt::Display for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

/// System media keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaKey {
    PlayPause,
    NextTrack,
    PreviousTrack,
    Stop,
}

impl MediaKey {
    /// Windows virtual-key code.
    pub fn vk_code(self) -> u16 {
        match self {
            MediaKey::NextTrack => 0xB0,
            MediaKey::PreviousTrack => 0xB1,
            MediaKey::Stop => 0xB2,
            MediaKey::PlayPause => 0xB3,
        }
    }
}
