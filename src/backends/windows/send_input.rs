#![cfg(target_os = "windows")]

//! Media keys via `SendInput`.
//!
//! Each press is an extended-key down followed by an extended-key up for the
//! key's virtual-key code (e.g. `VK_MEDIA_PLAY_PAUSE` = `0xB3`).

use crate::backends::keys::KeyPresser;
use crate::event::MediaKey;
use std::mem;
use tracing::{debug, warn};
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP,
};

#[derive(Clone, Copy, Debug, Default)]
pub struct SendInputKeys;

fn key_input(vk: u16, up: bool) -> INPUT {
    let mut flags = KEYEVENTF_EXTENDEDKEY;
    if up {
        flags |= KEYEVENTF_KEYUP;
    }
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: vk,
                wScan: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

impl KeyPresser for SendInputKeys {
    fn press(&mut self, key: MediaKey) {
        let vk = key.vk_code();
        let inputs = [key_input(vk, false), key_input(vk, true)];
        let sent = unsafe {
            SendInput(
                inputs.len() as u32,
                inputs.as_ptr(),
                mem::size_of::<INPUT>() as i32,
            )
        };
        if sent as usize != inputs.len() {
            warn!(?key, sent, "SendInput was blocked");
        } else {
            debug!(?key, "SendInput media key");
        }
    }
}
