use super::*;

/// This is the Forwarder, a general purpose relay. It reads a token and puts it on
/// every output, forwarding_multiplier times each. With several outputs it is a
/// fanout, with one it is a link in a chain. It can also check that the tokens it
/// sees form the sequence 0, 1, 2, ..., failing the run when they don't.
pub struct Forwarder {
    /// an id, mostly used for logging
    id: usize,
    input: Receiver<usize>,
    outputs: Vec<Sender<usize>>,
    forwarding_multiplier: usize,
    validate: bool,
    next_seq: usize,
    received_count: usize,
}

impl Forwarder {
    pub fn new(id: usize, input: Receiver<usize>, outputs: Vec<Sender<usize>>) -> Self {
        Self {
            id,
            input,
            outputs,
            forwarding_multiplier: 1,
            validate: false,
            next_seq: 0,
            received_count: 0,
        }
    }

    pub fn with_forwarding_multiplier(mut self, forwarding_multiplier: usize) -> Self {
        self.forwarding_multiplier = forwarding_multiplier;
        self
    }

    pub fn validating(mut self) -> Self {
        self.validate = true;
        self
    }

    // if validating, check the sequence
    fn validate_sequence(&mut self, token: usize) -> Result<(), ActorError> {
        if self.validate {
            if token != self.next_seq {
                return Err(ActorError::failed(format!(
                    "forwarder {} expected {} but received {}",
                    self.id, self.next_seq, token
                )));
            }
            self.next_seq += 1;
        }
        Ok(())
    }
}

impl Actor for Forwarder {
    fn fire(&mut self, _ctx: &ProcessContext) -> Result<(), ActorError> {
        let token = self.input.get()?;
        self.validate_sequence(token)?;
        self.received_count += 1;
        for output in &self.outputs {
            for _ in 0 .. self.forwarding_multiplier {
                output.put(token)?;
            }
        }
        Ok(())
    }

    fn wrapup(&mut self, _ctx: &ProcessContext) -> Result<(), ActorError> {
        log::trace!("forwarder {} received {} tokens", self.id, self.received_count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_sequence_tokens_fail_the_run() {
        crate::test_logger::install();
        let mut director = PNDirector::new(DirectorConfig::default());
        let (source_out, fwd_in) = director.channel::<usize>();
        let (fwd_out, sink_in) = director.channel::<usize>();
        director.add_actor("source", Ramp::new(source_out, 0, 2).with_limit(3));
        director.add_actor("forwarder", Forwarder::new(1, fwd_in, vec![fwd_out]).validating());
        let (recorder, _log) = Recorder::new(sink_in);
        director.add_actor("recorder", recorder);
        match director.run() {
            Err(DirectorError::Actor { actor, .. }) => assert_eq!(actor, "forwarder"),
            other => panic!("expected the forwarder to fail, got {:?}", other),
        }
    }

    #[test]
    fn multiplier_repeats_tokens() {
        crate::test_logger::install();
        let mut director = PNDirector::new(DirectorConfig::default());
        let (source_out, fwd_in) = director.channel::<usize>();
        let (fwd_out, sink_in) = director.channel::<usize>();
        director.add_actor("source", Ramp::new(source_out, 0, 1).with_limit(2));
        director.add_actor(
            "forwarder",
            Forwarder::new(1, fwd_in, vec![fwd_out]).with_forwarding_multiplier(3).validating(),
        );
        let (recorder, log) = Recorder::new(sink_in);
        director.add_actor("recorder", recorder);
        director.run().unwrap();
        assert_eq!(log.tokens(), vec![0, 0, 0, 1, 1, 1]);
    }
}
