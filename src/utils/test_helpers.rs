//! Shared setup for unit and integration tests.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static TEST_SUBSCRIBER: Once = Once::new();

/// Installs a test-writer subscriber once per test binary.
///
/// Honours `RUST_LOG`, otherwise shows this crate's debug output. Do not mix
/// with `#[traced_test]` in the same binary: both claim the global default.
pub fn setup_test_logging() {
    TEST_SUBSCRIBER.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("codetree=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Permission bits do not stop root, so tests that provoke read failures
/// through `chmod` check this and skip.
#[cfg(any(test, doctest))]
pub fn running_as_root() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid has no preconditions and cannot fail.
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
