use self::forwarder::Forwarder;
use super::*;
use crate::common::driver_config;

/// DaisyChain will setup a linear network of processes in which a token read by a
/// process is put to the next. Every process in the network will see every token.
/// Sending 100 tokens through a chain of 1000 processes produces 100,000 token
/// propagations. With a queue capacity of 1 the chain runs in lock step, each
/// process blocking on its neighbors, until the last token drains into the recorder
/// and the network ends in a real deadlock.
#[derive(SmartDefault)]
pub struct DaisyChainDriver {
    #[default = 100]
    pub process_count: usize,

    #[default = 100]
    pub token_count: usize,

    #[default(driver_config("daisy_chain", 1))]
    pub config: DirectorConfig,

    #[default = 1]
    pub forwarding_multiplier: usize,

    pub expected_token_count: usize,
    pub stats: Option<DirectorStats>,
    pub director: Option<PNDirector>,
    pub log: Option<RecordLog<usize>>,
}
impl TestDriver for DaisyChainDriver {
    // setup the processes
    fn setup(&mut self) {
        let mut director = PNDirector::new(self.config.clone());
        let (first, mut last_input) = director.channel::<usize>();
        director.add_actor("source", Ramp::new(first, 0, 1).with_limit(self.token_count));
        for idx in 1 ..= self.process_count {
            let (output, next_input) = director.channel::<usize>();
            let forwarder = Forwarder::new(idx, last_input, vec![output]).with_forwarding_multiplier(self.forwarding_multiplier);
            let forwarder = if self.forwarding_multiplier == 1 {
                forwarder.validating()
            } else {
                forwarder
            };
            director.add_actor(format!("forwarder-{}", idx), forwarder);
            last_input = next_input;
        }
        let (recorder, log) = Recorder::new(last_input);
        director.add_actor("recorder", recorder);
        self.expected_token_count = self.token_count * self.forwarding_multiplier.pow(self.process_count as u32);
        if self.forwarding_multiplier > 1 {
            log::info!("daisy_chain: expecting {} tokens", self.expected_token_count);
        }
        self.director = Some(director);
        self.log = Some(log);
        log::debug!("daisy_chain: setup complete");
    }

    // tear down the network
    fn teardown(mut daisy_chain: Self) {
        log::debug!("daisy_chain: tear-down started");
        daisy_chain.director = None;
        daisy_chain.log = None;
        drop(daisy_chain);
        log::debug!("daisy_chain: tear-down complete");
    }

    // run the network to completion
    fn run(&mut self) {
        if let (Some(mut director), Some(log)) = (self.director.take(), self.log.take()) {
            let stats = match director.run() {
                Ok(stats) => stats,
                Err(e) => panic!("daisy_chain: run failed: {}", e),
            };
            if log.len() != self.expected_token_count {
                panic!(
                    "daisy_chain: expected {} tokens, recorded {}",
                    self.expected_token_count,
                    log.len()
                );
            }
            if self.forwarding_multiplier == 1 && log.tokens() != (0 .. self.token_count).collect::<Vec<usize>>() {
                panic!("daisy_chain: tokens arrived out of order");
            }
            self.stats = Some(stats);
        } else {
            log::warn!("daisy_chain: run without setup");
        }
    }
}
