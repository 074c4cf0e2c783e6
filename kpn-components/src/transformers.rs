use super::*;

/// Map applies a function to every token passing through.
pub struct Map<I, O, F> {
    input: Receiver<I>,
    output: Sender<O>,
    f: F,
}

impl<I, O, F> Map<I, O, F>
where
    I: Send + 'static,
    O: Send + 'static,
    F: FnMut(I) -> O + Send + 'static,
{
    pub fn new(input: Receiver<I>, output: Sender<O>, f: F) -> Self { Self { input, output, f } }
}

impl<I, O, F> Actor for Map<I, O, F>
where
    I: Send + 'static,
    O: Send + 'static,
    F: FnMut(I) -> O + Send + 'static,
{
    fn fire(&mut self, _ctx: &ProcessContext) -> Result<(), ActorError> {
        let token = self.input.get()?;
        self.output.put((self.f)(token))?;
        Ok(())
    }
}

/// TimedDelay re-emits each token a fixed amount of model time after reading it.
/// Tokens are handled one at a time, a token arriving while another is being delayed
/// waits its turn.
pub struct TimedDelay<T> {
    input: Receiver<T>,
    output: Sender<T>,
    delay: f64,
}

impl<T> TimedDelay<T>
where
    T: Send + 'static,
{
    pub fn new(input: Receiver<T>, output: Sender<T>, delay: f64) -> Self { Self { input, output, delay } }
}

impl<T> Actor for TimedDelay<T>
where
    T: Send + 'static,
{
    fn initialize(&mut self, ctx: &ProcessContext) -> Result<(), ActorError> {
        if !(self.delay >= 0.0) {
            return Err(ActorError::failed(format!("{} has a delay of {}, it can't be negative", ctx.name(), self.delay)));
        }
        Ok(())
    }

    fn fire(&mut self, ctx: &ProcessContext) -> Result<(), ActorError> {
        let token = self.input.get()?;
        ctx.fire_after(self.delay)?;
        self.output.put(token)?;
        Ok(())
    }
}

/// RoundRobinMerge reads its inputs in turn, one token from each, and forwards them
/// to a single output. The order is fixed, so the merge is determinate.
pub struct RoundRobinMerge<T> {
    inputs: Vec<Receiver<T>>,
    output: Sender<T>,
    next: usize,
}

impl<T> RoundRobinMerge<T>
where
    T: Send + 'static,
{
    pub fn new(inputs: Vec<Receiver<T>>, output: Sender<T>) -> Self { Self { inputs, output, next: 0 } }
}

impl<T> Actor for RoundRobinMerge<T>
where
    T: Send + 'static,
{
    fn initialize(&mut self, ctx: &ProcessContext) -> Result<(), ActorError> {
        if self.inputs.is_empty() {
            return Err(ActorError::failed(format!("{} has no inputs", ctx.name())));
        }
        Ok(())
    }

    fn fire(&mut self, _ctx: &ProcessContext) -> Result<(), ActorError> {
        let token = self.inputs[self.next].get()?;
        self.next = (self.next + 1) % self.inputs.len();
        self.output.put(token)?;
        Ok(())
    }
}
