//! This crate includes commonly used actors and network setups. They are used
//! in bench and integration tests. They can also be configured and run with the
//! kpn-test-server.
#[macro_use]
extern crate smart_default;
#[allow(unused_imports)]
#[macro_use]
extern crate log;
use std::thread;
use std::time::{Duration, Instant};

use kpn_components::actors::*;
use kpn_core::director::*;
use kpn_core::time::Time;

mod common;
pub use common::{driver_config, wait_for_condition, TestDriver};

pub mod daisy_chain;
pub mod fanout_fanin;
pub mod forwarder;
pub mod timed_clocks;

#[cfg(test)]
pub(crate) mod test_logger {
    use simplelog::{Config, LevelFilter, TestLogger};
    use std::sync::Once;

    static LOGGER: Once = Once::new();

    // install a logger for the unit tests, once per test binary
    pub fn install() {
        LOGGER.call_once(|| {
            TestLogger::init(LevelFilter::Warn, Config::default()).ok();
        });
    }
}
