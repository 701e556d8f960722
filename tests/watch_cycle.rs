//! End-to-end watcher runs against the scripted backend.

use playpause::backends::virtual_input::{VirtualBackend, VirtualDevice};
use playpause::{CancelToken, ConnectionSupervisor, MediaKey, RecordingKeys, WatchConfig};
use std::thread;
use std::time::{Duration, Instant};

const HEADSET_VID: u16 = 0x045E;
const HEADSET_PID: u16 = 0x0627;

fn config() -> WatchConfig {
    WatchConfig {
        read_slice_ms: 20,
        hex_dump: false,
        ..WatchConfig::default()
    }
}

fn wait_for(cond: impl Fn() -> bool, within: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < within {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    cond()
}

#[test]
fn gesture_then_unplug_searches_again_immediately() {
    let backend = VirtualBackend::new();
    backend.plug(VirtualDevice::new("mouse", 0x046D, 0xC077).locked());
    backend.plug(
        VirtualDevice::new("X", HEADSET_VID, HEADSET_PID)
            .product("MDR-1000X")
            .report(&[0x01, 0xB1, 0x00, 0x00, 0x00])
            .eof(),
    );
    let keys = RecordingKeys::new();
    let cancel = CancelToken::new();
    let mut supervisor =
        ConnectionSupervisor::new(backend.clone(), keys.clone(), config(), cancel.clone());

    let start = Instant::now();
    let worker = thread::spawn(move || supervisor.run());

    // The second search follows the disconnect directly; the 10 s retry
    // delay only applies once that search comes up empty.
    assert!(wait_for(
        || backend.stats().list_calls >= 2,
        Duration::from_secs(3)
    ));
    assert!(start.elapsed() < Duration::from_secs(5));

    cancel.cancel();
    worker.join().unwrap().unwrap();

    assert_eq!(keys.pressed(), vec![MediaKey::PlayPause]);
    let stats = backend.stats();
    // discovery handle + communication handle, each released once
    assert_eq!(stats.opens, 2);
    assert_eq!(stats.releases, 2);
}

#[test]
fn late_arrival_is_picked_up_and_cancel_mid_read_releases() {
    let backend = VirtualBackend::new();
    let keys = RecordingKeys::new();
    let cancel = CancelToken::new();
    let fast_retry = WatchConfig {
        retry_delay_secs: 1,
        ..config()
    };
    let mut supervisor =
        ConnectionSupervisor::new(backend.clone(), keys.clone(), fast_retry, cancel.clone());
    let worker = thread::spawn(move || supervisor.run());

    thread::sleep(Duration::from_millis(100));
    backend.plug(
        VirtualDevice::new("X", HEADSET_VID, HEADSET_PID)
            .report(&[0x01, 0xB0, 0x00, 0x00, 0x00])
            .report(&[0x01, 0xB2, 0x00, 0x00, 0x00]),
    );

    let probe = keys.clone();
    assert!(wait_for(
        || !probe.pressed().is_empty(),
        Duration::from_secs(3)
    ));

    // now idle inside a read
    let cancelled_at = Instant::now();
    cancel.cancel();
    worker.join().unwrap().unwrap();
    assert!(cancelled_at.elapsed() < Duration::from_secs(1));

    assert_eq!(keys.pressed(), vec![MediaKey::PlayPause]);
    let stats = backend.stats();
    assert_eq!(stats.opens, stats.releases);
    assert_eq!(stats.opens, 2);
}

#[test]
fn wrong_device_is_never_connected() {
    let backend = VirtualBackend::new();
    backend.plug(VirtualDevice::new("pad", 0x054C, 0x09CC).report(&[0x01, 0xB1, 0, 0, 0]));
    let keys = RecordingKeys::new();
    let cancel = CancelToken::new();
    let mut supervisor =
        ConnectionSupervisor::new(backend.clone(), keys.clone(), config(), cancel.clone());
    let worker = thread::spawn(move || supervisor.run());

    assert!(wait_for(
        || backend.stats().list_calls >= 1,
        Duration::from_secs(1)
    ));
    cancel.cancel();
    worker.join().unwrap().unwrap();

    assert!(keys.pressed().is_empty());
    let stats = backend.stats();
    assert_eq!((stats.opens, stats.releases), (1, 1));
}
