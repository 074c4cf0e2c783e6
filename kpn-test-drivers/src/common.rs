use super::*;

// Common functions and traits which are used by all drivers

/// A TestDriver builds a network in setup, runs it to completion in run, and
/// releases it in teardown. A director runs once, so every run needs a setup
/// before it. A run which doesn't produce the expected tokens panics.
pub trait TestDriver {
    fn setup(&mut self);
    fn teardown(driver: Self);
    fn run(&mut self);
}

// wait for a condition to become true, giving up after the duration
pub fn wait_for_condition(what: &str, duration: Duration, condition: impl Fn() -> bool) -> Result<(), ()> {
    let start = Instant::now();
    while start.elapsed() < duration {
        if condition() {
            return Ok(());
        }
        thread::sleep(Duration::from_millis(1));
    }
    if log_enabled!(log::Level::Error) {
        log::error!("wait_for_condition failed: {} after {:#?}", what, duration);
    } else {
        println!("wait_for_condition failed: {} after {:#?}", what, duration);
    }
    Err(())
}

// build a director configuration for a driver
pub fn driver_config(name: &str, capacity: usize) -> DirectorConfig {
    DirectorConfig {
        name: name.to_string(),
        initial_queue_capacity: capacity,
        ..DirectorConfig::default()
    }
}
