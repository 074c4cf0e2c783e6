use super::state::*;
use super::*;

/// The ProcessContext is handed to every actor call. It identifies the process and
/// is the actor's window onto the director: model time, delays, and stop requests.
#[derive(Clone)]
pub struct ProcessContext {
    id: ProcessId,
    name: Arc<str>,
    shared: Arc<Shared>,
}

impl ProcessContext {
    pub(crate) fn new(id: ProcessId, name: Arc<str>, shared: Arc<Shared>) -> Self { Self { id, name, shared } }

    #[inline]
    pub fn id(&self) -> ProcessId { self.id }

    #[inline]
    pub fn name(&self) -> &str { &self.name }

    pub(crate) fn name_arc(&self) -> Arc<str> { Arc::clone(&self.name) }

    pub(crate) fn shared(&self) -> &Arc<Shared> { &self.shared }

    /// The current model time of the director.
    pub fn model_time(&self) -> Time { self.shared.lock().model_time() }

    /// True once the director wants every process to finish.
    pub fn is_stop_requested(&self) -> bool { self.shared.lock().is_stop_requested() }

    /// Block until model time reaches the given time, which is returned. Asking for
    /// the current time returns at once, asking for the past is an error. Only timed
    /// directors support this.
    pub fn fire_at(&self, time: Time) -> Result<Time, DirectorError> { self.shared.fire_at(self.id, time) }

    /// Block for the given amount of model time. A NaN delay is an error.
    pub fn fire_after(&self, delay: f64) -> Result<Time, DirectorError> {
        let current = self.model_time();
        match current.checked_add(delay) {
            Some(time) => self.fire_at(time),
            None => Err(DirectorError::InvalidDelay {
                process: self.name.to_string(),
                delay,
                current,
            }),
        }
    }
}

impl fmt::Debug for ProcessContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessContext")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}
