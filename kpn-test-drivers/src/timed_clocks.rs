use super::*;
use crate::common::driver_config;
use rand::distributions::{Distribution, Uniform};
use rand::thread_rng;

/// TimedClocks will setup a timed network of independent clocks, each feeding its own
/// recorder. Each clock gets a random whole-number period between 1 and max_period,
/// so many clocks share instants and are released by the same time advance. A
/// recorder must see exactly the ticks 0, p, 2p, ... up to the stop time, each at
/// the model time it was scheduled for.
#[derive(SmartDefault)]
pub struct TimedClocksDriver {
    #[default = 4]
    pub clock_count: usize,

    #[default = 4]
    pub max_period: usize,

    #[default = 100]
    pub stop_time: usize,

    #[default(driver_config("timed_clocks", 1))]
    pub config: DirectorConfig,

    pub periods: Vec<usize>,
    pub stats: Option<DirectorStats>,
    pub director: Option<TimedPNDirector>,
    pub logs: Vec<RecordLog<usize>>,
}
impl TimedClocksDriver {
    // the ticks a clock with the given period should produce
    fn expected_ticks(&self, period: usize) -> Vec<Time> {
        (0 ..= self.stop_time / period).map(|k| Time::from((k * period) as u32)).collect()
    }
}
impl TestDriver for TimedClocksDriver {
    fn setup(&mut self) {
        let mut director = TimedPNDirector::new(self.config.clone());
        let range = Uniform::from(1 ..= self.max_period.max(1));
        let mut rng = thread_rng();
        self.periods = (0 .. self.clock_count).map(|_| range.sample(&mut rng)).collect();
        self.logs.clear();
        for (idx, period) in self.periods.iter().enumerate() {
            let (clock_out, sink_in) = director.channel::<usize>();
            let clock = Clock::new(clock_out, idx, *period as f64).with_stop_time(Time::from(self.stop_time as u32));
            director.add_actor(format!("clock-{}", idx), clock);
            let (recorder, log) = Recorder::new(sink_in);
            director.add_actor(format!("recorder-{}", idx), recorder);
            self.logs.push(log);
        }
        log::debug!("timed_clocks: periods {:?}", self.periods);
        self.director = Some(director);
    }

    fn teardown(mut timed_clocks: Self) {
        timed_clocks.director = None;
        timed_clocks.logs.clear();
        drop(timed_clocks);
        log::debug!("timed_clocks: tear-down complete");
    }

    fn run(&mut self) {
        if let Some(mut director) = self.director.take() {
            let stats = match director.run() {
                Ok(stats) => stats,
                Err(e) => panic!("timed_clocks: run failed: {}", e),
            };
            for (idx, (period, log)) in self.periods.iter().zip(self.logs.iter()).enumerate() {
                let expected = self.expected_ticks(*period);
                if log.times() != expected {
                    panic!(
                        "timed_clocks: clock {} with period {} expected {} ticks, recorded {:?}",
                        idx,
                        period,
                        expected.len(),
                        log.times()
                    );
                }
            }
            let last_tick = self
                .periods
                .iter()
                .map(|period| (self.stop_time / period) * period)
                .max()
                .unwrap_or(0);
            if director.model_time() != Time::from(last_tick as u32) {
                panic!("timed_clocks: finished at {}, expected {}", director.model_time(), last_tick);
            }
            self.stats = Some(stats);
        } else {
            log::warn!("timed_clocks: run without setup");
        }
    }
}
