#![allow(dead_code)]
//! Test harness utilities for clipsync-core integration tests.

use std::sync::{Arc, Once};
use std::time::{Duration, Instant};

use clipsync_core::clock::ManualClock;
use clipsync_core::engine::{ClipSync, SyncSettings};
use clipsync_core::host::TestHost;

static LOGGER: Once = Once::new();

/// Route `log` output through the test harness so it shows on failure.
pub fn init_logging() {
    LOGGER.call_once(|| {
        use simplelog::*;
        let _ = TestLogger::init(LevelFilter::Debug, Config::default());
    });
}

/// Engine on a manual clock with default settings.
pub fn manual_engine() -> (ClipSync, TestHost, ManualClock) {
    manual_engine_with(SyncSettings::default())
}

pub fn manual_engine_with(settings: SyncSettings) -> (ClipSync, TestHost, ManualClock) {
    init_logging();
    let host = TestHost::new();
    let clock = ManualClock::new();
    let engine = ClipSync::with_clock(Box::new(host.clone()), settings, Arc::new(clock.clone()));
    (engine, host, clock)
}

/// Settings with short timers for wall-clock tests.
pub fn fast_settings() -> SyncSettings {
    SyncSettings {
        reassert_interval: Duration::from_millis(20),
        secondary_write_delay: Duration::from_millis(20),
        ..SyncSettings::default()
    }
}

/// Poll `check` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    check()
}
