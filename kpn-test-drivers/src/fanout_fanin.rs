use self::forwarder::Forwarder;
use super::*;
use crate::common::driver_config;

/// FanoutFanin will setup a network where the first forwarder puts each token to all
/// of the intermediate forwarders. That's the fanout leg. Each of the intermediate
/// forwarders puts what it reads to a round robin merge, that's the fanin leg. The
/// merge reads its inputs in a fixed order, so the recorder sees each token fanout
/// times, in token order, no matter how the threads are scheduled.
#[derive(SmartDefault)]
pub struct FanoutFaninDriver {
    #[default = 10]
    pub fanout: usize,

    #[default = 100]
    pub token_count: usize,

    #[default(driver_config("fanout_fanin", 1))]
    pub config: DirectorConfig,

    pub stats: Option<DirectorStats>,
    pub director: Option<PNDirector>,
    pub log: Option<RecordLog<usize>>,
}
impl TestDriver for FanoutFaninDriver {
    fn setup(&mut self) {
        let mut director = PNDirector::new(self.config.clone());
        let (source_out, fanout_in) = director.channel::<usize>();
        director.add_actor("source", Ramp::new(source_out, 0, 1).with_limit(self.token_count));
        let mut fanout_outputs = Vec::with_capacity(self.fanout);
        let mut merge_inputs = Vec::with_capacity(self.fanout);
        for idx in 1 ..= self.fanout {
            let (fanout_out, fwd_in) = director.channel::<usize>();
            let (fwd_out, merge_in) = director.channel::<usize>();
            director.add_actor(format!("forwarder-{}", idx), Forwarder::new(idx, fwd_in, vec![fwd_out]).validating());
            fanout_outputs.push(fanout_out);
            merge_inputs.push(merge_in);
        }
        director.add_actor("fanout", Forwarder::new(0, fanout_in, fanout_outputs).validating());
        let (merge_out, sink_in) = director.channel::<usize>();
        director.add_actor("fanin", RoundRobinMerge::new(merge_inputs, merge_out));
        let (recorder, log) = Recorder::new(sink_in);
        director.add_actor("recorder", recorder);
        self.director = Some(director);
        self.log = Some(log);
        log::debug!("fanout_fanin: setup complete");
    }

    fn teardown(mut fanout_fanin: Self) {
        fanout_fanin.director = None;
        fanout_fanin.log = None;
        drop(fanout_fanin);
        log::debug!("fanout_fanin: tear-down complete");
    }

    fn run(&mut self) {
        if let (Some(mut director), Some(log)) = (self.director.take(), self.log.take()) {
            let stats = match director.run() {
                Ok(stats) => stats,
                Err(e) => panic!("fanout_fanin: run failed: {}", e),
            };
            let expected: Vec<usize> = (0 .. self.token_count)
                .flat_map(|token| std::iter::repeat(token).take(self.fanout))
                .collect();
            if log.tokens() != expected {
                panic!(
                    "fanout_fanin: expected {} tokens in order, recorded {}",
                    expected.len(),
                    log.len()
                );
            }
            self.stats = Some(stats);
        } else {
            log::warn!("fanout_fanin: run without setup");
        }
    }
}
