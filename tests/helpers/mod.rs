//! Fixtures for sio integration tests.

use std::time::{Duration, Instant};

use sio::prelude::*;

/// Upper bound for waiting on the dummy backend's audio thread.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(2);

/// A context connected to the Dummy backend with devices flushed, or `None`
/// when libsoundio is not installed.
pub fn dummy_context() -> Option<Context> {
    if sio::sys::load().is_err() {
        eprintln!("libsoundio not available, skipping");
        return None;
    }
    let ctx = Context::builder()
        .app_name("sio-tests")
        .backend(Backend::Dummy)
        .build()
        .expect("Failed to connect to the dummy backend");
    Some(ctx)
}

/// Polls `done` until it holds or [`CALLBACK_TIMEOUT`] passes.
pub fn wait_until(mut done: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < CALLBACK_TIMEOUT {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    done()
}
