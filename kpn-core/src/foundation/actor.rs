use super::error::ActorError;
use crate::kernel::context::ProcessContext;

/// The Actor is the unit of computation the director runs. Each actor gets its own
/// process, a thread which repeatedly calls prefire, fire and postfire until
/// postfire returns false. Blocking happens inside fire: reading an empty channel,
/// writing a full one, or asking the director for a future time via the context.
///
/// Lifecycle:
/// * initialize is called by the directing thread, before any process starts.
/// * prefire, fire and postfire are called by the actor's own process.
/// * wrapup is called by the directing thread, after the process has been joined.
///
/// Only fire is required, the remaining methods default to doing nothing and
/// iterating forever. A failure returned from any method stops the run and is
/// reported with the actor's name.
pub trait Actor: Send + 'static {
    /// called once, before the process is started
    fn initialize(&mut self, _ctx: &ProcessContext) -> Result<(), ActorError> { Ok(()) }
    /// Return false if the actor isn't ready to fire, the process backs off and asks
    /// again. A process which declines is still running as far as the director is
    /// concerned, it never counts toward a deadlock.
    fn prefire(&mut self, _ctx: &ProcessContext) -> Result<bool, ActorError> { Ok(true) }
    /// do the work, this is where blocking happens
    fn fire(&mut self, ctx: &ProcessContext) -> Result<(), ActorError>;
    /// return false to end the process
    fn postfire(&mut self, _ctx: &ProcessContext) -> Result<bool, ActorError> { Ok(true) }
    /// called once, after the process has terminated
    fn wrapup(&mut self, _ctx: &ProcessContext) -> Result<(), ActorError> { Ok(()) }
}

/// Boxed actors are actors, which lets the director hold a heterogeneous set.
impl<A> Actor for Box<A>
where
    A: Actor + ?Sized,
{
    fn initialize(&mut self, ctx: &ProcessContext) -> Result<(), ActorError> { (**self).initialize(ctx) }
    fn prefire(&mut self, ctx: &ProcessContext) -> Result<bool, ActorError> { (**self).prefire(ctx) }
    fn fire(&mut self, ctx: &ProcessContext) -> Result<(), ActorError> { (**self).fire(ctx) }
    fn postfire(&mut self, ctx: &ProcessContext) -> Result<bool, ActorError> { (**self).postfire(ctx) }
    fn wrapup(&mut self, ctx: &ProcessContext) -> Result<(), ActorError> { (**self).wrapup(ctx) }
}
