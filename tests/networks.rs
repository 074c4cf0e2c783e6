mod common;

#[cfg(test)]
mod tests {
    use super::common::*;

    use kpn_test_drivers::daisy_chain::DaisyChainDriver;
    use kpn_test_drivers::fanout_fanin::FanoutFaninDriver;
    use kpn_test_drivers::timed_clocks::TimedClocksDriver;
    use kpn_test_drivers::{driver_config, TestDriver};

    #[test]
    fn daisy_chain() {
        run_test(|| {
            let mut daisy_chain = DaisyChainDriver {
                process_count: 20,
                token_count: 50,
                ..DaisyChainDriver::default()
            };
            daisy_chain.setup();
            daisy_chain.run();
            let stats = daisy_chain.stats.unwrap();
            assert_eq!(stats.processes_started, 22);
            assert_eq!(stats.real_deadlocks, 1);
            assert_eq!(stats.artificial_deadlocks, 0);
            DaisyChainDriver::teardown(daisy_chain);
        });
    }

    #[test]
    fn daisy_chain_with_deep_queues() {
        run_test(|| {
            let mut daisy_chain = DaisyChainDriver {
                process_count: 10,
                token_count: 200,
                config: driver_config("deep_daisy_chain", 16),
                ..DaisyChainDriver::default()
            };
            // a director runs once, each run needs its own setup
            for _ in 0 .. 3 {
                daisy_chain.setup();
                daisy_chain.run();
            }
            DaisyChainDriver::teardown(daisy_chain);
        });
    }

    #[test]
    fn daisy_chain_multiplier() {
        run_test(|| {
            let mut daisy_chain = DaisyChainDriver {
                process_count: 4,
                token_count: 5,
                forwarding_multiplier: 2,
                ..DaisyChainDriver::default()
            };
            daisy_chain.setup();
            assert_eq!(daisy_chain.expected_token_count, 80);
            daisy_chain.run();
            DaisyChainDriver::teardown(daisy_chain);
        });
    }

    #[test]
    fn fanout_fanin() {
        run_test(|| {
            let mut fanout_fanin = FanoutFaninDriver {
                fanout: 5,
                token_count: 40,
                ..FanoutFaninDriver::default()
            };
            fanout_fanin.setup();
            fanout_fanin.run();
            let stats = fanout_fanin.stats.unwrap();
            assert_eq!(stats.processes_started, 5 + 4);
            assert_eq!(stats.tokens_got, stats.tokens_put);
            FanoutFaninDriver::teardown(fanout_fanin);
        });
    }

    #[test]
    fn timed_clocks() {
        run_test(|| {
            let mut timed_clocks = TimedClocksDriver {
                clock_count: 6,
                max_period: 5,
                stop_time: 60,
                ..TimedClocksDriver::default()
            };
            timed_clocks.setup();
            timed_clocks.run();
            let stats = timed_clocks.stats.unwrap();
            assert!(stats.timed_deadlocks > 0);
            assert_eq!(stats.real_deadlocks, 1);
            TimedClocksDriver::teardown(timed_clocks);
        });
    }
}
