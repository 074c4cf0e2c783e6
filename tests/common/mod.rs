use std::panic;
use std::sync::Once;
use std::time::Duration;

use simplelog::{Config, LevelFilter, TestLogger};

static LOGGER: Once = Once::new();

// how long a test waits for the network to reach a state
#[allow(dead_code)]
pub const SETTLE: Duration = Duration::from_secs(5);

// common function for wrapping a test with logging setup
pub fn run_test<T>(test: T)
where
    T: FnOnce() + panic::UnwindSafe,
{
    LOGGER.call_once(|| {
        TestLogger::init(LevelFilter::Warn, Config::default()).ok();
    });
    let result = panic::catch_unwind(test);
    assert!(result.is_ok())
}
