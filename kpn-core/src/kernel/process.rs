use super::context::*;
use super::*;
use std::panic::{catch_unwind, AssertUnwindSafe};

// A ProcessThread gives an actor its own thread of control. The thread iterates
// prefire, fire and postfire until postfire says it's done, a stop is requested,
// or the actor fails. Whatever happens, the process deregisters before the thread
// ends, otherwise the director would wait forever on a process that isn't there.
// The actor is handed back through the join handle for wrapup.
pub(crate) struct ProcessThread {
    actor: Box<dyn Actor>,
    ctx: ProcessContext,
}

impl ProcessThread {
    pub fn new(actor: Box<dyn Actor>, ctx: ProcessContext) -> Self { Self { actor, ctx } }

    // the caller has already counted this process as active
    pub fn spawn(self) -> std::io::Result<thread::JoinHandle<Box<dyn Actor>>> {
        thread::Builder::new()
            .name(self.ctx.name().to_string())
            .spawn(move || self.run())
    }

    fn run(mut self) -> Box<dyn Actor> {
        ProcessData::enter(self.ctx.id(), self.ctx.name_arc());
        log::debug!("{} is running", self.ctx.name());
        let result = match catch_unwind(AssertUnwindSafe(|| self.iterate())) {
            Ok(result) => result,
            Err(_) => Err(ActorError::failed("panicked")),
        };
        let failed = match result {
            Ok(()) => {
                log::debug!("{} has finished", self.ctx.name());
                false
            },
            Err(e) if e.is_stopped() => {
                log::debug!("{} has stopped", self.ctx.name());
                false
            },
            Err(e) => {
                log::error!("{} failed: {}", self.ctx.name(), e);
                self.ctx.shared().lock().record_failure(DirectorError::Actor {
                    actor: self.ctx.name().to_string(),
                    source: Box::new(e),
                });
                true
            },
        };
        self.ctx.shared().deregister(self.ctx.id(), failed);
        ProcessData::leave();
        self.actor
    }

    // A declined prefire backs off, yielding and then parking, before asking again.
    // The process stays active meanwhile, so the director can't see a deadlock.
    fn iterate(&mut self) -> Result<(), ActorError> {
        let mut backoff = LinearBackoff::new();
        loop {
            if self.ctx.is_stop_requested() {
                return Err(DirectorError::Stopped.into());
            }
            if self.actor.prefire(&self.ctx)? {
                if backoff.reset() {
                    log::trace!("{} is ready after parking {} times", self.ctx.name(), backoff.parked());
                }
                self.actor.fire(&self.ctx)?;
                if !self.actor.postfire(&self.ctx)? {
                    return Ok(());
                }
            } else {
                backoff.snooze();
            }
        }
    }
}
