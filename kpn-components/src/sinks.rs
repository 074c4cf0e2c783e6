use super::*;

/// The RecordLog is the shared view of what a Recorder has seen, as (time, token) pairs.
/// It stays readable after the run, when the recorder itself belongs to the director.
pub struct RecordLog<T> {
    records: Arc<Mutex<Vec<(Time, T)>>>,
}

impl<T> Clone for RecordLog<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<T: Clone> RecordLog<T> {
    pub fn records(&self) -> Vec<(Time, T)> { self.records.lock().clone() }

    pub fn tokens(&self) -> Vec<T> { self.records.lock().iter().map(|(_, t)| t.clone()).collect() }

    pub fn times(&self) -> Vec<Time> { self.records.lock().iter().map(|(time, _)| *time).collect() }

    pub fn len(&self) -> usize { self.records.lock().len() }

    pub fn is_empty(&self) -> bool { self.records.lock().is_empty() }
}

/// Recorder is a sink, it records every token with the model time it arrived at.
/// With a limit, it finishes after that many tokens.
pub struct Recorder<T> {
    input: Receiver<T>,
    log: RecordLog<T>,
    limit: Option<usize>,
}

impl<T> Recorder<T>
where
    T: Send + 'static,
{
    pub fn new(input: Receiver<T>) -> (Self, RecordLog<T>) {
        let log = RecordLog {
            records: Arc::new(Mutex::new(Vec::new())),
        };
        let recorder = Self {
            input,
            log: log.clone(),
            limit: None,
        };
        (recorder, log)
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl<T> Actor for Recorder<T>
where
    T: Send + 'static,
{
    fn fire(&mut self, ctx: &ProcessContext) -> Result<(), ActorError> {
        let token = self.input.get()?;
        self.log.records.lock().push((ctx.model_time(), token));
        Ok(())
    }

    fn postfire(&mut self, _ctx: &ProcessContext) -> Result<bool, ActorError> {
        Ok(self.limit.map_or(true, |limit| self.log.records.lock().len() < limit))
    }

    fn wrapup(&mut self, ctx: &ProcessContext) -> Result<(), ActorError> {
        log::debug!("{} recorded {} tokens", ctx.name(), self.log.records.lock().len());
        Ok(())
    }
}
