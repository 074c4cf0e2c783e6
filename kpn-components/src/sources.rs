use super::*;
use std::ops::Add;

/// Ramp is a counting source. It puts init, init + step, init + 2 * step and so on,
/// finishing after limit tokens when a limit is given.
pub struct Ramp<T> {
    output: Sender<T>,
    next: T,
    step: T,
    limit: Option<usize>,
    count: usize,
}

impl<T> Ramp<T>
where
    T: Clone + Add<Output = T> + Send + 'static,
{
    pub fn new(output: Sender<T>, init: T, step: T) -> Self {
        Self {
            output,
            next: init,
            step,
            limit: None,
            count: 0,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl<T> Actor for Ramp<T>
where
    T: Clone + Add<Output = T> + Send + 'static,
{
    fn fire(&mut self, _ctx: &ProcessContext) -> Result<(), ActorError> {
        if self.limit.map_or(false, |limit| self.count >= limit) {
            return Ok(());
        }
        let value = self.next.clone();
        self.next = value.clone() + self.step.clone();
        self.output.put(value)?;
        self.count += 1;
        Ok(())
    }

    fn postfire(&mut self, ctx: &ProcessContext) -> Result<bool, ActorError> {
        match self.limit {
            Some(limit) if self.count >= limit => {
                log::debug!("{} reached its limit of {}", ctx.name(), limit);
                Ok(false)
            },
            _ => Ok(true),
        }
    }
}

/// Const puts the same value on every firing, finishing after limit tokens when a
/// limit is given.
pub struct Const<T> {
    output: Sender<T>,
    value: T,
    limit: Option<usize>,
    count: usize,
}

impl<T> Const<T>
where
    T: Clone + Send + 'static,
{
    pub fn new(output: Sender<T>, value: T) -> Self {
        Self {
            output,
            value,
            limit: None,
            count: 0,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl<T> Actor for Const<T>
where
    T: Clone + Send + 'static,
{
    fn fire(&mut self, _ctx: &ProcessContext) -> Result<(), ActorError> {
        if self.limit.map_or(true, |limit| self.count < limit) {
            self.output.put(self.value.clone())?;
            self.count += 1;
        }
        Ok(())
    }

    fn postfire(&mut self, _ctx: &ProcessContext) -> Result<bool, ActorError> {
        Ok(self.limit.map_or(true, |limit| self.count < limit))
    }
}

/// Clock is a timed periodic source. It puts its value at offset, offset + period,
/// offset + 2 * period and so on, waiting for model time in between. It finishes
/// once the next tick would be past the stop time.
pub struct Clock<T> {
    output: Sender<T>,
    value: T,
    period: f64,
    offset: f64,
    stop_time: Time,
    next_tick: Time,
}

impl<T> Clock<T>
where
    T: Clone + Send + 'static,
{
    pub fn new(output: Sender<T>, value: T, period: f64) -> Self {
        Self {
            output,
            value,
            period,
            offset: 0.0,
            stop_time: Time::POSITIVE_INFINITY,
            next_tick: Time::ZERO,
        }
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_stop_time(mut self, stop_time: Time) -> Self {
        self.stop_time = stop_time;
        self
    }
}

impl<T> Actor for Clock<T>
where
    T: Clone + Send + 'static,
{
    fn initialize(&mut self, ctx: &ProcessContext) -> Result<(), ActorError> {
        if !(self.period > 0.0) {
            return Err(ActorError::failed(format!("{} has a period of {}, it must be positive", ctx.name(), self.period)));
        }
        self.next_tick = ctx
            .model_time()
            .checked_add(self.offset)
            .ok_or_else(|| ActorError::failed(format!("{} has an offset of {}", ctx.name(), self.offset)))?;
        Ok(())
    }

    fn fire(&mut self, ctx: &ProcessContext) -> Result<(), ActorError> {
        // an offset past the stop time means no ticks at all
        if self.next_tick <= self.stop_time {
            ctx.fire_at(self.next_tick)?;
            self.output.put(self.value.clone())?;
        }
        Ok(())
    }

    fn postfire(&mut self, _ctx: &ProcessContext) -> Result<bool, ActorError> {
        self.next_tick = self.next_tick + self.period;
        Ok(self.next_tick <= self.stop_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::*;
    use kpn_core::director::*;

    #[test]
    fn ramp_counts_up_to_its_limit() {
        crate::test_logger::install();
        let mut director = PNDirector::new(DirectorConfig::default());
        let (output, input) = director.channel::<i64>();
        director.add_actor("ramp", Ramp::new(output, 10, 5).with_limit(4));
        let (recorder, log) = Recorder::new(input);
        director.add_actor("recorder", recorder);
        let stats = director.run().unwrap();
        assert_eq!(log.tokens(), vec![10, 15, 20, 25]);
        assert_eq!(stats.real_deadlocks, 1);
    }

    #[test]
    fn clock_ticks_on_its_period() {
        crate::test_logger::install();
        let mut director = TimedPNDirector::new(DirectorConfig::default());
        let (output, input) = director.channel::<&'static str>();
        let clock = Clock::new(output, "tick", 2.5).with_offset(1.0).with_stop_time(Time::new(8.5));
        director.add_actor("clock", clock);
        let (recorder, log) = Recorder::new(input);
        director.add_actor("recorder", recorder);
        director.run().unwrap();
        let times: Vec<f64> = log.times().iter().map(|t| t.as_f64()).collect();
        assert_eq!(times, vec![1.0, 3.5, 6.0, 8.5]);
        assert_eq!(director.model_time(), Time::new(8.5));
    }

    #[test]
    fn clock_rejects_a_zero_period() {
        crate::test_logger::install();
        let mut director = TimedPNDirector::new(DirectorConfig::default());
        let (output, _input) = director.channel::<u8>();
        director.add_actor("clock", Clock::new(output, 1, 0.0));
        assert!(matches!(director.run(), Err(DirectorError::Actor { .. })));
    }
}
