use super::{context::*, listener::*, process::*, state::*, stats::*, strategy::*};
use super::*;

/// The DirectorConfig holds the tunables of a director.
#[derive(Debug, Clone, SmartDefault)]
pub struct DirectorConfig {
    /// used in log messages
    #[default = "director"]
    pub name: String,
    /// the capacity of a channel created with channel()
    #[default = 1]
    pub initial_queue_capacity: usize,
    /// the limit on artificial deadlock growth, 0 is unlimited
    #[default = 65536]
    pub maximum_queue_capacity: usize,
}

// The lifecycle phase of a director
#[derive(Debug, Copy, Clone, Eq, PartialEq, SmartDefault)]
enum Phase {
    #[default]
    Created,
    Initialized,
    Running,
    WrappedUp,
}

// an actor which has been added but whose process hasn't started
struct PendingActor {
    id: ProcessId,
    actor: Box<dyn Actor>,
    initialized: bool,
}

/// The ProcessDirector runs a Kahn process network, giving each actor its own thread.
/// The directing thread waits for the network to deadlock and then resolves it:
/// an artificial deadlock grows the smallest full channel with a blocked writer,
/// a real deadlock ends the run, and anything else is left to the strategy, which for
/// a timed network advances model time.
///
/// The lifecycle is initialize, prefire, fire, postfire, wrapup. The run method does all
/// of it, always finishing with wrapup, and returns the statistics of the run.
/// A director runs once.
pub struct ProcessDirector<S: DeadlockStrategy> {
    config: DirectorConfig,
    strategy: S,
    shared: Arc<Shared>,
    phase: SharedProtectedObject<Phase>,
    pending: Vec<PendingActor>,
    running: Vec<(ProcessId, thread::JoinHandle<Box<dyn Actor>>)>,
    started: Option<Instant>,
    elapsed: Option<Duration>,
}

/// A director for untimed networks, actors can't ask for time.
pub type PNDirector = ProcessDirector<Untimed>;

/// A director for timed networks, a timed deadlock advances model time.
pub type TimedPNDirector = ProcessDirector<TimeAdvance>;

impl<S> ProcessDirector<S>
where
    S: DeadlockStrategy + Default,
{
    pub fn new(config: DirectorConfig) -> Self { Self::with_strategy(config, S::default()) }
}

impl<S> ProcessDirector<S>
where
    S: DeadlockStrategy,
{
    pub fn with_strategy(config: DirectorConfig, strategy: S) -> Self {
        if config.maximum_queue_capacity > 0 && config.initial_queue_capacity > config.maximum_queue_capacity {
            log::warn!(
                "{}: initial queue capacity {} exceeds the maximum {}",
                config.name,
                config.initial_queue_capacity,
                config.maximum_queue_capacity
            );
        }
        let state = DirectorState::new(config.maximum_queue_capacity);
        let shared = Arc::new(Shared::new(state, strategy.is_timed()));
        Self {
            config,
            strategy,
            shared,
            phase: SharedProtectedObject::new(Phase::Created),
            pending: Vec::new(),
            running: Vec::new(),
            started: None,
            elapsed: None,
        }
    }

    // ==== Building the network ====

    /// Add an actor, returning the id of its process. Actors are normally added before
    /// the run starts; an actor added while running is initialized and started at once.
    pub fn add_actor<A>(&mut self, name: impl Into<String>, actor: A) -> ProcessId
    where
        A: Actor,
    {
        let name: Arc<str> = Arc::from(name.into());
        let id = self.shared.lock().register_process(Arc::clone(&name));
        let mut actor: Box<dyn Actor> = Box::new(actor);
        if self.phase.get() == Phase::Running {
            let ctx = ProcessContext::new(id, name, Arc::clone(&self.shared));
            let started = actor
                .initialize(&ctx)
                .map_err(|e| actor_failure(&ctx, e))
                .and_then(|()| self.start_process(id, actor, ctx));
            if let Err(e) = started {
                self.shared.lock().record_failure(e);
                self.shared.notify_all();
            }
        } else {
            self.pending.push(PendingActor {
                id,
                actor,
                initialized: false,
            });
        }
        id
    }

    /// Create a channel with the configured initial capacity.
    pub fn channel<T: Send>(&self) -> (Sender<T>, Receiver<T>) {
        new_channel(&self.shared, Some(self.config.initial_queue_capacity))
    }

    /// Create a channel with a specific capacity.
    pub fn channel_with_capacity<T: Send>(&self, capacity: usize) -> (Sender<T>, Receiver<T>) {
        new_channel(&self.shared, Some(capacity))
    }

    /// Create a channel which never blocks a writer.
    pub fn channel_unbounded<T: Send>(&self) -> (Sender<T>, Receiver<T>) { new_channel(&self.shared, None) }

    // ==== Lifecycle ====

    /// Initialize every actor, once.
    pub fn initialize(&mut self) -> Result<(), DirectorError> {
        if self.phase.compare_and_set(Phase::Created, Phase::Initialized) != Phase::Created {
            return Err(DirectorError::AlreadyInitialized);
        }
        log::info!("{}: initializing {} actors", self.config.name, self.pending.len());
        self.initialize_pending()
    }

    /// Start a process for every actor.
    pub fn prefire(&mut self) -> Result<bool, DirectorError> {
        match self.phase.get() {
            Phase::Initialized => (),
            Phase::Running => return Ok(!self.shared.lock().is_stop_requested()),
            Phase::Created | Phase::WrappedUp => return Err(DirectorError::NotInitialized),
        }
        // anything added after initialize
        self.initialize_pending()?;
        self.phase.set(Phase::Running);
        self.started = Some(Instant::now());
        let pending: Vec<PendingActor> = self.pending.drain(..).collect();
        for p in pending {
            let ctx = self.context(p.id)?;
            self.start_process(p.id, p.actor, ctx)?;
        }
        log::debug!("{}: started {} processes", self.config.name, self.running.len());
        Ok(true)
    }

    /// Wait for the network to deadlock and resolve it, repeatedly, until it is over:
    /// a real deadlock, every process finished, or a stop. A failure of any process, or
    /// a failed resolution, ends the run with that error.
    pub fn fire(&mut self) -> Result<(), DirectorError> {
        if self.phase.get() != Phase::Running {
            return Err(DirectorError::NotInitialized);
        }
        let mut state = self.shared.lock();
        loop {
            if let Some(failure) = state.take_failure() {
                return Err(failure);
            }
            if state.is_stop_requested() || state.is_real_deadlock() {
                break;
            }
            if state.active_count() == 0 {
                log::debug!("{}: all processes have finished", self.config.name);
                break;
            }
            if !state.are_threads_deadlocked() {
                self.shared.wait(&mut state);
                continue;
            }
            match resolve(&mut state, &self.strategy) {
                Ok(Resolution::Continue) => self.shared.notify_all(),
                Ok(Resolution::Terminate) => break,
                Err(e) => {
                    state.request_stop();
                    self.shared.notify_all();
                    return Err(e);
                },
            }
        }
        Ok(())
    }

    /// False once there's nothing left to do.
    pub fn postfire(&mut self) -> Result<bool, DirectorError> {
        let mut state = self.shared.lock();
        if let Some(failure) = state.take_failure() {
            return Err(failure);
        }
        Ok(!(state.is_real_deadlock() || state.is_stop_requested() || state.active_count() == 0))
    }

    /// Stop every process, wait for them, wrap up the actors, close the channels and
    /// flush the delay queue. The first error seen is returned, otherwise the statistics.
    pub fn wrapup(&mut self) -> Result<DirectorStats, DirectorError> {
        if self.phase.get() == Phase::WrappedUp {
            return Ok(self.stats());
        }
        self.shared.request_stop();
        let mut first_error: Option<DirectorError> = None;

        let mut actors: Vec<(ProcessId, Box<dyn Actor>)> = Vec::new();
        for p in self.pending.drain(..) {
            if p.initialized {
                actors.push((p.id, p.actor));
            }
        }
        for (id, handle) in self.running.drain(..) {
            match handle.join() {
                Ok(actor) => actors.push((id, actor)),
                Err(_) => {
                    log::error!("{}: {} panicked while shutting down", self.config.name, id);
                    first_error.get_or_insert(DirectorError::Actor {
                        actor: id.to_string(),
                        source: Box::new(ActorError::failed("panicked while shutting down")),
                    });
                },
            }
        }
        if let Some(failure) = self.shared.lock().take_failure() {
            first_error.get_or_insert(failure);
        }
        for (id, mut actor) in actors {
            let ctx = self.context(id)?;
            if let Err(e) = actor.wrapup(&ctx) {
                log::error!("{}: wrapup of {} failed: {}", self.config.name, ctx.name(), e);
                first_error.get_or_insert(actor_failure(&ctx, e));
            }
        }

        self.shared.lock().finalize();
        self.elapsed = self.started.map(|t| t.elapsed());
        self.phase.set(Phase::WrappedUp);
        let stats = self.stats();
        log::info!("{}: wrapped up at time {}: {:#?}", self.config.name, stats.model_time, stats);
        match first_error {
            Some(e) => Err(e),
            None => Ok(stats),
        }
    }

    /// Run the whole lifecycle. Wrapup always happens, and the first error wins.
    pub fn run(&mut self) -> Result<DirectorStats, DirectorError> {
        let executed = self.execute();
        let wrapped = self.wrapup();
        executed.and(wrapped)
    }

    fn execute(&mut self) -> Result<(), DirectorError> {
        self.initialize()?;
        if self.prefire()? {
            loop {
                self.fire()?;
                if !self.postfire()? {
                    break;
                }
            }
        }
        Ok(())
    }

    // ==== Control ====

    /// Ask every process to finish, blocked processes return Stopped.
    pub fn stop(&self) { self.shared.request_stop(); }

    /// A handle which can stop the director from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn add_process_listener(&self, listener: ProcessListener) { self.shared.lock().add_listener(listener); }

    pub fn remove_process_listener(&self, listener: &ProcessListener) { self.shared.lock().remove_listener(listener); }

    // ==== Time ====

    pub fn is_timed(&self) -> bool { self.shared.is_timed() }

    pub fn model_time(&self) -> Time { self.shared.lock().model_time() }

    /// Move model time forward, never backward.
    pub fn set_model_time(&self, time: Time) -> Result<(), DirectorError> {
        self.shared.lock().set_model_time(time)?;
        self.shared.notify_all();
        Ok(())
    }

    /// Block the calling process until model time reaches the given time. It must be
    /// called from the thread of that process, usually through its ProcessContext.
    pub fn fire_at(&self, process: ProcessId, time: Time) -> Result<Time, DirectorError> {
        if ProcessData::current() != Some(process) {
            return Err(DirectorError::UnknownProcess(process));
        }
        self.shared.fire_at(process, time)
    }

    // ==== Deadlock ====

    pub fn are_threads_deadlocked(&self) -> bool { self.shared.lock().are_threads_deadlocked() }

    /// Resolve a deadlock, if there is one. With nothing deadlocked this does nothing and
    /// returns Continue; with no active processes it returns Terminate.
    pub fn resolve_deadlock(&self) -> Result<Resolution, DirectorError> {
        let mut state = self.shared.lock();
        if state.active_count() == 0 {
            return Ok(Resolution::Terminate);
        }
        if !state.are_threads_deadlocked() {
            return Ok(Resolution::Continue);
        }
        let resolution = resolve(&mut state, &self.strategy);
        drop(state);
        self.shared.notify_all();
        resolution
    }

    pub fn active_count(&self) -> usize { self.shared.lock().active_count() }

    pub fn blocked_count(&self) -> usize { self.shared.lock().blocked_count() }

    pub fn read_blocked_count(&self) -> usize { self.shared.lock().read_blocked_count() }

    pub fn write_blocked_count(&self) -> usize { self.shared.lock().write_blocked_count() }

    pub fn delay_block_count(&self) -> usize { self.shared.lock().delay_block_count() }

    // ==== Channels and processes ====

    /// The capacity of a channel, None if unbounded.
    pub fn capacity(&self, channel: ChannelId) -> Result<Option<usize>, DirectorError> {
        self.shared.lock().capacity(channel)
    }

    /// Change the capacity of a channel. It can't go below what is already queued.
    pub fn set_capacity(&self, channel: ChannelId, capacity: usize) -> Result<(), DirectorError> {
        self.shared.lock().set_capacity(channel, Some(capacity))?;
        self.shared.notify_all();
        Ok(())
    }

    pub fn process_state(&self, process: ProcessId) -> Option<ProcessState> { self.shared.lock().process_state(process) }

    pub fn stats(&self) -> DirectorStats {
        let mut stats = self.shared.lock().stats();
        stats.run_time = match (self.elapsed, self.started) {
            (Some(elapsed), _) => elapsed,
            (None, Some(started)) => started.elapsed(),
            (None, None) => Duration::default(),
        };
        stats
    }

    pub fn name(&self) -> &str { &self.config.name }

    pub fn config(&self) -> &DirectorConfig { &self.config }

    // ==== Helpers ====

    fn context(&self, id: ProcessId) -> Result<ProcessContext, DirectorError> {
        let name = self.shared.lock().process_name(id)?;
        Ok(ProcessContext::new(id, name, Arc::clone(&self.shared)))
    }

    fn initialize_pending(&mut self) -> Result<(), DirectorError> {
        for p in self.pending.iter_mut().filter(|p| !p.initialized) {
            let name = self.shared.lock().process_name(p.id)?;
            let ctx = ProcessContext::new(p.id, name, Arc::clone(&self.shared));
            p.actor.initialize(&ctx).map_err(|e| actor_failure(&ctx, e))?;
            p.initialized = true;
        }
        Ok(())
    }

    // the process is counted as active before its thread starts
    fn start_process(&mut self, id: ProcessId, actor: Box<dyn Actor>, ctx: ProcessContext) -> Result<(), DirectorError> {
        self.shared.lock().activate_process(id);
        let name = ctx.name().to_string();
        match ProcessThread::new(actor, ctx).spawn() {
            Ok(handle) => {
                self.running.push((id, handle));
                Ok(())
            },
            Err(e) => {
                self.shared.deregister(id, true);
                Err(DirectorError::Actor {
                    actor: name,
                    source: Box::new(ActorError::failed(format!("unable to spawn a thread: {}", e))),
                })
            },
        }
    }
}

// Processes which are still running when the director goes away are stopped and joined.
impl<S> Drop for ProcessDirector<S>
where
    S: DeadlockStrategy,
{
    fn drop(&mut self) {
        if !self.running.is_empty() {
            log::debug!("{}: dropped while running, stopping processes", self.config.name);
            self.shared.request_stop();
            for (_, handle) in self.running.drain(..) {
                handle.join().ok();
            }
        }
    }
}

impl<S> fmt::Debug for ProcessDirector<S>
where
    S: DeadlockStrategy,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessDirector")
            .field("name", &self.config.name)
            .field("phase", &self.phase)
            .field("state", &*self.shared.lock())
            .finish()
    }
}

fn actor_failure(ctx: &ProcessContext, e: ActorError) -> DirectorError {
    DirectorError::Actor {
        actor: ctx.name().to_string(),
        source: Box::new(e),
    }
}

/// The StopHandle can stop a running director from any thread.
#[derive(Clone)]
pub struct StopHandle {
    shared: Arc<Shared>,
}
impl StopHandle {
    pub fn stop(&self) { self.shared.request_stop(); }

    pub fn is_stop_requested(&self) -> bool { self.shared.lock().is_stop_requested() }
}

impl fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopHandle")
            .field("stop_requested", &self.is_stop_requested())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // wait for a condition, giving up after a while
    fn wait_for(what: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if what() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    struct Writer {
        output: Sender<usize>,
        count: usize,
    }
    impl Actor for Writer {
        fn fire(&mut self, _ctx: &ProcessContext) -> Result<(), ActorError> {
            self.output.put(self.count)?;
            self.count += 1;
            Ok(())
        }
    }

    struct Reader {
        input: Receiver<usize>,
    }
    impl Actor for Reader {
        fn fire(&mut self, _ctx: &ProcessContext) -> Result<(), ActorError> {
            self.input.get()?;
            Ok(())
        }
    }

    struct Sleeper {
        wake: f64,
    }
    impl Actor for Sleeper {
        fn fire(&mut self, ctx: &ProcessContext) -> Result<(), ActorError> {
            ctx.fire_at(Time::new(self.wake))?;
            Ok(())
        }
        fn postfire(&mut self, _ctx: &ProcessContext) -> Result<bool, ActorError> { Ok(false) }
    }

    struct Napper {
        delay: f64,
    }
    impl Actor for Napper {
        fn fire(&mut self, ctx: &ProcessContext) -> Result<(), ActorError> {
            ctx.fire_after(self.delay)?;
            Ok(())
        }
        fn postfire(&mut self, _ctx: &ProcessContext) -> Result<bool, ActorError> { Ok(false) }
    }

    #[test]
    fn nan_delay_is_an_invalid_delay() {
        crate::test_logger::install();
        let mut director = TimedPNDirector::new(DirectorConfig::default());
        director.add_actor("napper", Napper { delay: f64::NAN });
        match director.run() {
            Err(DirectorError::Actor { actor, source }) => {
                assert_eq!(actor, "napper");
                match *source {
                    ActorError::Director(DirectorError::InvalidDelay { process, delay, current }) => {
                        assert_eq!(process, "napper");
                        assert!(delay.is_nan());
                        assert_eq!(current, Time::ZERO);
                    },
                    other => panic!("expected an invalid delay, got {:?}", other),
                }
            },
            other => panic!("expected an actor failure, got {:?}", other),
        }
        assert_eq!(director.stats().processes_failed, 1);
    }

    #[test]
    fn write_block_resolves_by_growing_the_channel() {
        crate::test_logger::install();
        let mut director = TimedPNDirector::new(DirectorConfig::default());
        let (output, input) = director.channel::<usize>();
        let ch = output.id();
        director.add_actor("writer", Writer { output, count: 0 });
        director.initialize().unwrap();
        director.prefire().unwrap();
        assert!(wait_for(|| director.are_threads_deadlocked() && director.write_blocked_count() == 1));
        assert_eq!(director.capacity(ch).unwrap(), Some(1));
        assert_eq!(director.resolve_deadlock().unwrap(), Resolution::Continue);
        assert!(wait_for(|| director.capacity(ch).unwrap() == Some(2) && director.are_threads_deadlocked()));
        assert_eq!(input.len(), 2);
        director.wrapup().unwrap();
    }

    #[test]
    fn timed_deadlock_advances_time_in_order() {
        crate::test_logger::install();
        let mut director = TimedPNDirector::new(DirectorConfig::default());
        let late = director.add_actor("late", Sleeper { wake: 7.0 });
        let early = director.add_actor("early", Sleeper { wake: 5.0 });
        director.initialize().unwrap();
        director.prefire().unwrap();
        assert!(wait_for(|| director.delay_block_count() == 2));
        assert_eq!(director.resolve_deadlock().unwrap(), Resolution::Continue);
        assert_eq!(director.model_time(), Time::new(5.0));
        assert!(wait_for(|| director.process_state(early) == Some(ProcessState::Finished)));
        assert_eq!(director.delay_block_count(), 1);
        assert_eq!(director.process_state(late), Some(ProcessState::DelayBlocked(Time::new(7.0))));
        assert_eq!(director.resolve_deadlock().unwrap(), Resolution::Continue);
        assert_eq!(director.model_time(), Time::new(7.0));
        assert!(wait_for(|| director.active_count() == 0));
        let stats = director.wrapup().unwrap();
        assert_eq!(stats.timed_deadlocks, 2);
        assert_eq!(stats.processes_finished, 2);
    }

    #[test]
    fn read_deadlock_terminates() {
        crate::test_logger::install();
        let mut director = TimedPNDirector::new(DirectorConfig::default());
        let (_output, input) = director.channel::<usize>();
        director.add_actor("reader", Reader { input });
        director.initialize().unwrap();
        director.prefire().unwrap();
        assert!(wait_for(|| director.are_threads_deadlocked() && director.read_blocked_count() == 1));
        assert_eq!(director.resolve_deadlock().unwrap(), Resolution::Terminate);
        assert!(!director.postfire().unwrap());
        let stats = director.wrapup().unwrap();
        assert_eq!(stats.real_deadlocks, 1);
        assert_eq!(stats.processes_finished, 1);
    }

    #[test]
    fn untimed_director_refuses_time() {
        crate::test_logger::install();
        let mut director = PNDirector::new(DirectorConfig::default());
        director.add_actor("sleeper", Sleeper { wake: 1.0 });
        match director.run() {
            Err(DirectorError::Actor { actor, source }) => {
                assert_eq!(actor, "sleeper");
                assert!(matches!(*source, ActorError::Director(DirectorError::Untimed)));
            },
            other => panic!("expected an actor failure, got {:?}", other),
        }
    }

    #[test]
    fn a_director_runs_once() {
        crate::test_logger::install();
        let mut director = PNDirector::new(DirectorConfig::default());
        assert!(matches!(director.prefire(), Err(DirectorError::NotInitialized)));
        director.run().unwrap();
        assert!(matches!(director.initialize(), Err(DirectorError::AlreadyInitialized)));
    }
}
