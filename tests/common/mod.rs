//! Common test utilities for integration tests.

pub mod fixtures;

pub use fixtures::*;

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize test logging once per process.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}
