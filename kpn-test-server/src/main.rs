#[allow(unused_imports)]
#[macro_use]
extern crate log;
extern crate simplelog;

use simplelog::*;

use std::time::Instant;

use kpn_components::settings::{self, Field, FieldMap};
use kpn_core::director::{DirectorConfig, DirectorStats};
use kpn_test_drivers::daisy_chain::DaisyChainDriver;
use kpn_test_drivers::fanout_fanin::FanoutFaninDriver;
use kpn_test_drivers::timed_clocks::TimedClocksDriver;
use kpn_test_drivers::TestDriver;

/// The test server is pretty thin. It consists of:
///     1) Reading configuration
///     2) Initializing logging
///     3) Running each configured driver, for the configured iterations
///
/// Every driver builds a fresh network per iteration, so a run measures the
/// setup, the run to deadlock, and the wrapup of a whole network.
fn main() {
    // process the configuration file.
    let settings = match settings::Settings::new() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            std::process::exit(1);
        },
    };
    // initialize the logger
    if let Err(e) = CombinedLogger::init(vec![TermLogger::new(
        settings.level_filter(),
        Config::default(),
        TerminalMode::Mixed,
    )]) {
        eprintln!("unable to initialize logging: {}", e);
    }
    // ensure we have a log of the settings
    log::info!("{:?}", settings);

    if settings.drivers.run.is_empty() {
        log::warn!("No drivers have been configured.")
    }
    for driver in &settings.drivers.run {
        let fields = settings.drivers.fields_for(*driver);
        match driver {
            Field::daisy_chain => run_daisy_chain(&settings, &fields),
            Field::fanout_fanin => run_fanout_fanin(&settings, &fields),
            Field::timed_clocks if settings.director.is_timed() => run_timed_clocks(&settings, &fields),
            Field::timed_clocks => log::warn!("timed_clocks needs a timed director, skipping"),
            other => log::error!("{:?} is not a driver", other),
        }
    }
}

// read a field, falling back to a default
fn field(fields: &FieldMap, field: Field, default: usize) -> usize { fields.get(&field).copied().unwrap_or(default) }

// the director settings, with the driver's own capacity if it has one
fn director_config(settings: &settings::Settings, name: &str, fields: &FieldMap) -> DirectorConfig {
    let mut config = settings.director.config(name);
    config.initial_queue_capacity = field(fields, Field::capacity, config.initial_queue_capacity);
    config
}

// run a driver for the configured number of iterations, logging the last run's stats
fn run_iterations<T: TestDriver>(name: &str, mut driver: T, iterations: usize, stats: impl Fn(&T) -> Option<DirectorStats>) {
    log::info!("running {} for {} iterations", name, iterations);
    let start = Instant::now();
    for _ in 0 .. iterations {
        driver.setup();
        driver.run();
    }
    log::info!("{} completed {} iterations in {:#?}", name, iterations, start.elapsed());
    if let Some(stats) = stats(&driver) {
        log::info!("{} last run: {:#?}", name, stats);
    }
    T::teardown(driver);
}

fn run_daisy_chain(settings: &settings::Settings, fields: &FieldMap) {
    let driver = DaisyChainDriver {
        process_count: field(fields, Field::processes, 100),
        token_count: field(fields, Field::tokens, 100),
        config: director_config(settings, "daisy_chain", fields),
        ..DaisyChainDriver::default()
    };
    run_iterations("daisy_chain", driver, field(fields, Field::iterations, 1), |d| d.stats);
}

fn run_fanout_fanin(settings: &settings::Settings, fields: &FieldMap) {
    let driver = FanoutFaninDriver {
        fanout: field(fields, Field::fanout, 10),
        token_count: field(fields, Field::tokens, 100),
        config: director_config(settings, "fanout_fanin", fields),
        ..FanoutFaninDriver::default()
    };
    run_iterations("fanout_fanin", driver, field(fields, Field::iterations, 1), |d| d.stats);
}

fn run_timed_clocks(settings: &settings::Settings, fields: &FieldMap) {
    let driver = TimedClocksDriver {
        clock_count: field(fields, Field::clocks, 4),
        max_period: field(fields, Field::period, 4),
        stop_time: field(fields, Field::stop_time, 100),
        config: director_config(settings, "timed_clocks", fields),
        ..TimedClocksDriver::default()
    };
    run_iterations("timed_clocks", driver, field(fields, Field::iterations, 1), |d| d.stats);
}
