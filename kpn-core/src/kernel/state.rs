use super::{delay_queue::*, listener::*, stats::*};
use super::*;

// The director state is the single place where block accounting lives. Every count,
// the delay queue, the model time and the channel capacities sit behind one mutex,
// because deadlock detection needs a consistent snapshot of all of them at once.
// Processes never touch the fields, they call methods while holding the lock.
//
// Shared wraps the state with the condition variable used for every wait: processes
// blocked on a channel, processes waiting for time, and the directing thread waiting
// for the network to stall. Waking is always a broadcast, each waiter re-checks its
// own condition.

pub(crate) struct Shared {
    state: Mutex<DirectorState>,
    cond: Condvar,
    timed: bool,
}
impl Shared {
    pub fn new(state: DirectorState, timed: bool) -> Self {
        Self {
            state: Mutex::new(state),
            cond: Condvar::new(),
            timed,
        }
    }

    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, DirectorState> { self.state.lock() }

    #[inline]
    pub fn wait(&self, guard: &mut MutexGuard<'_, DirectorState>) { self.cond.wait(guard); }

    #[inline]
    pub fn notify_all(&self) { self.cond.notify_all(); }

    #[inline]
    pub const fn is_timed(&self) -> bool { self.timed }

    // request a stop, waking everyone so they can notice
    pub fn request_stop(&self) {
        self.lock().request_stop();
        self.notify_all();
    }

    // Block the calling process until model time reaches requested. Requesting the
    // current time returns immediately, there's nothing to wait for.
    pub fn fire_at(&self, process: ProcessId, requested: Time) -> Result<Time, DirectorError> {
        if !self.timed {
            return Err(DirectorError::Untimed);
        }
        let mut state = self.lock();
        if state.is_stop_requested() {
            return Err(DirectorError::Stopped);
        }
        let current = state.model_time();
        if requested < current {
            return Err(DirectorError::InvalidTime {
                process: state.process_name(process)?.to_string(),
                requested,
                current,
            });
        }
        if requested == current {
            return Ok(requested);
        }
        state.request_delay(process, requested)?;
        self.notify_all();
        while state.model_time() < requested {
            if state.is_stop_requested() {
                state.abandon_delay(process)?;
                self.notify_all();
                return Err(DirectorError::Stopped);
            }
            if !state.is_delay_blocked_at(process, requested) {
                // released before our time came, block again
                log::warn!("{} released at {} while waiting for {}", process, state.model_time(), requested);
                state.request_delay(process, requested)?;
                self.notify_all();
            }
            self.wait(&mut state);
        }
        // reached by an administrative time change, the time advance never released us
        state.abandon_delay(process)?;
        Ok(requested)
    }

    // a process thread is done, for better or worse
    pub fn deregister(&self, process: ProcessId, failed: bool) {
        let mut state = self.lock();
        if let Err(e) = state.deregister_process(process, failed) {
            state.record_failure(e);
        }
        drop(state);
        self.notify_all();
    }
}

// What the director knows about each channel. The tokens themselves live in the
// channel, len mirrors the queue length so capacity decisions can be made here.
#[derive(Debug, Default)]
pub(crate) struct ChannelMeta {
    capacity: Option<usize>,
    len: usize,
    read_blocked: Option<ProcessId>,
    write_blocked: Option<ProcessId>,
    closed: bool,
}
impl ChannelMeta {
    #[inline]
    fn has_room(&self) -> bool { self.capacity.map_or(true, |c| self.len < c) }
}

// What the director knows about each process
#[derive(Debug)]
struct ProcessRecord {
    name: Arc<str>,
    state: ProcessState,
}

/// The DirectorState holds the process and channel bookkeeping for a director. Strategies
/// receive it, locked, when resolving a deadlock; they act on it through its methods.
pub struct DirectorState {
    active_count: usize,
    read_block_count: usize,
    write_block_count: usize,
    delay_block_count: usize,
    model_time: Time,
    delay_queue: DelayQueue,
    channels: Vec<ChannelMeta>,
    processes: Vec<ProcessRecord>,
    stop_requested: bool,
    real_deadlock: bool,
    failure: Option<DirectorError>,
    listeners: Listeners,
    maximum_queue_capacity: usize,
    stats: DirectorStats,
}

impl DirectorState {
    pub(crate) fn new(maximum_queue_capacity: usize) -> Self {
        Self {
            active_count: 0,
            read_block_count: 0,
            write_block_count: 0,
            delay_block_count: 0,
            model_time: Time::ZERO,
            delay_queue: DelayQueue::new(),
            channels: Vec::new(),
            processes: Vec::new(),
            stop_requested: false,
            real_deadlock: false,
            failure: None,
            listeners: Listeners::default(),
            maximum_queue_capacity,
            stats: DirectorStats::default(),
        }
    }

    // ==== Getters and Predicates ====

    #[inline]
    pub fn active_count(&self) -> usize { self.active_count }

    #[inline]
    pub fn read_blocked_count(&self) -> usize { self.read_block_count }

    #[inline]
    pub fn write_blocked_count(&self) -> usize { self.write_block_count }

    /// processes blocked on a read or a write
    #[inline]
    pub fn blocked_count(&self) -> usize { self.read_block_count + self.write_block_count }

    #[inline]
    pub fn delay_block_count(&self) -> usize { self.delay_block_count }

    #[inline]
    pub fn model_time(&self) -> Time { self.model_time }

    #[inline]
    pub fn delay_queue(&self) -> &DelayQueue { &self.delay_queue }

    #[inline]
    pub fn is_stop_requested(&self) -> bool { self.stop_requested }

    #[inline]
    pub fn is_real_deadlock(&self) -> bool { self.real_deadlock }

    #[inline]
    pub fn stats(&self) -> DirectorStats { self.stats }

    /// True when no process can make progress unaided. This is a pure function of the
    /// counts; with no active processes it is trivially true.
    #[inline]
    pub fn are_threads_deadlocked(&self) -> bool {
        self.blocked_count() + self.delay_block_count >= self.active_count
    }

    pub fn process_state(&self, process: ProcessId) -> Option<ProcessState> {
        self.processes.get(process.0).map(|p| p.state)
    }

    pub fn process_name(&self, process: ProcessId) -> Result<Arc<str>, DirectorError> {
        self.processes
            .get(process.0)
            .map(|p| Arc::clone(&p.name))
            .ok_or(DirectorError::UnknownProcess(process))
    }

    pub fn capacity(&self, channel: ChannelId) -> Result<Option<usize>, DirectorError> {
        Ok(self.channel(channel)?.capacity)
    }

    pub fn queued(&self, channel: ChannelId) -> Result<usize, DirectorError> { Ok(self.channel(channel)?.len) }

    // ==== Model time ====

    /// Moves model time forward. Moving it backward fails and leaves it unchanged.
    pub fn set_model_time(&mut self, time: Time) -> Result<(), DirectorError> {
        if time < self.model_time {
            return Err(DirectorError::TimeBackward {
                requested: time,
                current: self.model_time,
            });
        }
        self.model_time = time;
        self.stats.model_time = time;
        Ok(())
    }

    // queue a delay request for a process which will now wait for time
    pub(crate) fn request_delay(&mut self, process: ProcessId, wake_time: Time) -> Result<(), DirectorError> {
        if wake_time < self.model_time {
            return Err(DirectorError::InvalidTime {
                process: self.process_name(process)?.to_string(),
                requested: wake_time,
                current: self.model_time,
            });
        }
        self.delay_queue.push(wake_time, process);
        self.stats.delay_requests += 1;
        match self.process_state(process) {
            Some(ProcessState::DelayBlocked(_)) => (),
            Some(_) => {
                self.delay_block_count += 1;
                self.set_process_state(process, ProcessState::DelayBlocked(wake_time));
            },
            None => return Err(DirectorError::UnknownProcess(process)),
        }
        Ok(())
    }

    // release a delay-blocked process, returns false if it wasn't delay-blocked
    fn release_delay(&mut self, process: ProcessId) -> Result<bool, DirectorError> {
        if let Some(ProcessState::DelayBlocked(_)) = self.process_state(process) {
            self.delay_block_count = self.delay_block_count.checked_sub(1).ok_or_else(|| {
                DirectorError::inconsistency(format!("delay-blocked count went negative releasing {}", process))
            })?;
            self.set_process_state(process, ProcessState::Unblocked);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    // a process leaving fire_at on its own account takes its requests with it
    pub(crate) fn abandon_delay(&mut self, process: ProcessId) -> Result<(), DirectorError> {
        self.delay_queue.remove(process);
        self.release_delay(process).map(|_| ())
    }

    // true if the process is waiting for exactly this time
    fn is_delay_blocked_at(&self, process: ProcessId, wake_time: Time) -> bool {
        self.process_state(process) == Some(ProcessState::DelayBlocked(wake_time))
    }

    /// The time-advance step of deadlock resolution. The earliest live entry is removed
    /// from the delay queue and model time moves to its wake time T. Every other entry at
    /// T is drained as well, so all processes scheduled for the same instant wake together.
    /// Each distinct process is released once, no matter how many entries it had.
    ///
    /// An entry is live only while its process is delay-blocked for exactly that time,
    /// anything else is left over from a request which has been satisfied or abandoned
    /// and is dropped. Returns the number of processes released. No live entry while
    /// processes are delay-blocked is an internal inconsistency.
    pub fn advance_to_next_wake(&mut self) -> Result<usize, DirectorError> {
        let (wake_time, first) = loop {
            let (wake_time, process) = self.delay_queue.pop().ok_or_else(|| {
                DirectorError::inconsistency(format!(
                    "delay queue is empty while {} processes are delay-blocked",
                    self.delay_block_count
                ))
            })?;
            if wake_time >= self.model_time && self.is_delay_blocked_at(process, wake_time) {
                break (wake_time, process);
            }
            log::trace!("dropping stale delay request of {} at {}", process, wake_time);
        };
        if let Err(e) = self.set_model_time(wake_time) {
            return Err(DirectorError::inconsistency(format!("delay queue is out of order: {}", e)));
        }
        let mut batch = vec![first];
        batch.extend(self.delay_queue.drain_at(wake_time));
        let mut released = 0;
        let mut seen: Vec<ProcessId> = Vec::with_capacity(batch.len());
        for process in batch {
            if seen.contains(&process) {
                continue;
            }
            seen.push(process);
            if self.is_delay_blocked_at(process, wake_time) && self.release_delay(process)? {
                released += 1;
            }
        }
        self.stats.timed_deadlocks += 1;
        self.stats.processes_released += released;
        log::debug!("timed deadlock: advanced time to {}, released {} processes", wake_time, released);
        Ok(released)
    }

    // ==== Capacity ====

    /// The artificial-deadlock step. Among the channels with a write-blocked process, the
    /// one with the smallest capacity grows by one, ties going to the earliest created
    /// channel. Growing beyond a non-zero maximum fails. Returns the grown channel.
    pub fn grow_smallest_write_blocked(&mut self) -> Result<ChannelId, DirectorError> {
        let mut smallest: Option<(usize, usize)> = None;
        for (idx, meta) in self.channels.iter().enumerate() {
            if meta.write_blocked.is_none() {
                continue;
            }
            if let Some(capacity) = meta.capacity {
                match smallest {
                    Some((_, c)) if c <= capacity => (),
                    _ => smallest = Some((idx, capacity)),
                }
            }
        }
        let (idx, capacity) = smallest.ok_or_else(|| {
            DirectorError::inconsistency(format!(
                "{} processes are write-blocked, but no bounded channel has a blocked writer",
                self.write_block_count
            ))
        })?;
        let channel = ChannelId(idx);
        let grown = capacity + 1;
        if self.maximum_queue_capacity > 0 && grown > self.maximum_queue_capacity {
            log::debug!("refusing to grow {} to {}", channel, grown);
            return Err(DirectorError::CapacityExceeded {
                channel,
                capacity: grown,
                maximum: self.maximum_queue_capacity,
            });
        }
        self.channels[idx].capacity = Some(grown);
        self.stats.artificial_deadlocks += 1;
        self.stats.capacity_increases += 1;
        log::debug!("artificial deadlock: increased capacity of {} to {}", channel, grown);
        self.unblock_writer(channel)?;
        Ok(channel)
    }

    /// Administrative capacity change, None is unbounded. The capacity can never drop
    /// below what is already queued. A blocked writer which now has room is released.
    pub fn set_capacity(&mut self, channel: ChannelId, capacity: Option<usize>) -> Result<(), DirectorError> {
        let meta = self.channel_mut(channel)?;
        if let Some(c) = capacity {
            if c < meta.len {
                return Err(DirectorError::CapacityBelowSize {
                    channel,
                    requested: c,
                    len: meta.len,
                });
            }
        }
        meta.capacity = capacity;
        if meta.has_room() && meta.write_blocked.is_some() {
            self.unblock_writer(channel)?;
        }
        Ok(())
    }

    // ==== Deadlock outcome ====

    pub(crate) fn note_real_deadlock(&mut self) {
        self.real_deadlock = true;
        self.stats.real_deadlocks += 1;
        log::info!(
            "real deadlock: {} active processes, {} read-blocked, time {}",
            self.active_count,
            self.read_block_count,
            self.model_time
        );
    }

    // ==== Stop and failure ====

    pub(crate) fn request_stop(&mut self) {
        if !self.stop_requested {
            log::debug!("stop requested");
        }
        self.stop_requested = true;
    }

    // remember the first failure and stop everything
    pub(crate) fn record_failure(&mut self, failure: DirectorError) {
        if self.failure.is_none() {
            self.failure = Some(failure);
        } else {
            log::warn!("additional failure after the first: {}", failure);
        }
        self.request_stop();
    }

    pub(crate) fn take_failure(&mut self) -> Option<DirectorError> { self.failure.take() }

    // ==== Processes ====

    pub(crate) fn register_process(&mut self, name: Arc<str>) -> ProcessId {
        let id = ProcessId(self.processes.len());
        self.processes.push(ProcessRecord {
            name,
            state: ProcessState::Created,
        });
        id
    }

    // counted as active before its thread exists, so the directing thread can't miss it
    pub(crate) fn activate_process(&mut self, process: ProcessId) {
        self.active_count += 1;
        self.stats.processes_started += 1;
        self.set_process_state(process, ProcessState::Started);
    }

    pub(crate) fn deregister_process(&mut self, process: ProcessId, failed: bool) -> Result<(), DirectorError> {
        // a process is never blocked when it leaves, but be sure
        self.release_delay(process)?;
        self.active_count = self.active_count.checked_sub(1).ok_or_else(|| {
            DirectorError::inconsistency(format!("active count went negative deregistering {}", process))
        })?;
        if failed {
            self.stats.processes_failed += 1;
            self.set_process_state(process, ProcessState::Failed);
        } else {
            self.stats.processes_finished += 1;
            self.set_process_state(process, ProcessState::Finished);
        }
        Ok(())
    }

    fn set_process_state(&mut self, process: ProcessId, state: ProcessState) {
        if let Some(record) = self.processes.get_mut(process.0) {
            record.state = state;
            if !self.listeners.is_empty() {
                let event = ProcessEvent {
                    process,
                    name: Arc::clone(&record.name),
                    state,
                    model_time: self.model_time,
                };
                self.listeners.try_fwd(event);
            }
        }
    }

    pub(crate) fn add_listener(&mut self, listener: ProcessListener) { self.listeners.add(listener); }

    pub(crate) fn remove_listener(&mut self, listener: &ProcessListener) { self.listeners.remove(listener); }

    // ==== Channels ====

    pub(crate) fn register_channel(&mut self, capacity: Option<usize>) -> ChannelId {
        let id = ChannelId(self.channels.len());
        self.channels.push(ChannelMeta {
            capacity,
            ..ChannelMeta::default()
        });
        id
    }

    fn channel(&self, channel: ChannelId) -> Result<&ChannelMeta, DirectorError> {
        self.channels.get(channel.0).ok_or(DirectorError::UnknownChannel(channel))
    }

    fn channel_mut(&mut self, channel: ChannelId) -> Result<&mut ChannelMeta, DirectorError> {
        self.channels.get_mut(channel.0).ok_or(DirectorError::UnknownChannel(channel))
    }

    pub(crate) fn is_closed(&self, channel: ChannelId) -> Result<bool, DirectorError> {
        Ok(self.channel(channel)?.closed)
    }

    pub(crate) fn has_room_for(&self, channel: ChannelId, tokens: usize) -> Result<bool, DirectorError> {
        let meta = self.channel(channel)?;
        Ok(meta.capacity.map_or(true, |c| c.saturating_sub(meta.len) >= tokens))
    }

    // a token was queued, a blocked reader can go
    pub(crate) fn note_put(&mut self, channel: ChannelId) -> Result<(), DirectorError> {
        let meta = self.channel_mut(channel)?;
        meta.len += 1;
        let wake_reader = meta.read_blocked.is_some();
        self.stats.tokens_put += 1;
        if wake_reader {
            self.unblock_reader(channel)?;
        }
        Ok(())
    }

    // a token was taken, a blocked writer can go
    pub(crate) fn note_get(&mut self, channel: ChannelId) -> Result<(), DirectorError> {
        let meta = self.channel_mut(channel)?;
        meta.len = meta.len.checked_sub(1).ok_or_else(|| {
            DirectorError::inconsistency(format!("{} length went negative", channel))
        })?;
        let wake_writer = meta.write_blocked.is_some() && meta.has_room();
        self.stats.tokens_got += 1;
        if wake_writer {
            self.unblock_writer(channel)?;
        }
        Ok(())
    }

    // Register a process as read-blocked on a channel, returns true if newly blocked.
    pub(crate) fn block_reader(&mut self, channel: ChannelId, process: ProcessId) -> Result<bool, DirectorError> {
        let meta = self.channel_mut(channel)?;
        if meta.read_blocked.is_some() {
            return Ok(false);
        }
        meta.read_blocked = Some(process);
        self.read_block_count += 1;
        self.set_process_state(process, ProcessState::ReadBlocked(channel));
        Ok(true)
    }

    // Register a process as write-blocked on a channel, returns true if newly blocked.
    pub(crate) fn block_writer(&mut self, channel: ChannelId, process: ProcessId) -> Result<bool, DirectorError> {
        let meta = self.channel_mut(channel)?;
        if meta.write_blocked.is_some() {
            return Ok(false);
        }
        meta.write_blocked = Some(process);
        self.write_block_count += 1;
        self.set_process_state(process, ProcessState::WriteBlocked(channel));
        Ok(true)
    }

    pub(crate) fn is_read_blocked(&self, channel: ChannelId, process: ProcessId) -> Result<bool, DirectorError> {
        Ok(self.channel(channel)?.read_blocked == Some(process))
    }

    pub(crate) fn is_write_blocked(&self, channel: ChannelId, process: ProcessId) -> Result<bool, DirectorError> {
        Ok(self.channel(channel)?.write_blocked == Some(process))
    }

    fn unblock_reader(&mut self, channel: ChannelId) -> Result<(), DirectorError> {
        if let Some(process) = self.channel_mut(channel)?.read_blocked.take() {
            self.read_block_count = self.read_block_count.checked_sub(1).ok_or_else(|| {
                DirectorError::inconsistency(format!("read-blocked count went negative on {}", channel))
            })?;
            self.set_process_state(process, ProcessState::Unblocked);
        }
        Ok(())
    }

    fn unblock_writer(&mut self, channel: ChannelId) -> Result<(), DirectorError> {
        if let Some(process) = self.channel_mut(channel)?.write_blocked.take() {
            self.write_block_count = self.write_block_count.checked_sub(1).ok_or_else(|| {
                DirectorError::inconsistency(format!("write-blocked count went negative on {}", channel))
            })?;
            self.set_process_state(process, ProcessState::Unblocked);
        }
        Ok(())
    }

    // a blocked call is leaving without completing, if it's still registered undo it
    pub(crate) fn abandon_read(&mut self, channel: ChannelId, process: Option<ProcessId>) -> Result<(), DirectorError> {
        match process {
            Some(p) if self.is_read_blocked(channel, p)? => self.unblock_reader(channel),
            _ => Ok(()),
        }
    }

    pub(crate) fn abandon_write(&mut self, channel: ChannelId, process: Option<ProcessId>) -> Result<(), DirectorError> {
        match process {
            Some(p) if self.is_write_blocked(channel, p)? => self.unblock_writer(channel),
            _ => Ok(()),
        }
    }

    // ==== Wrapup ====

    // close every channel, flush the delay queue and check that the counts came back to zero
    pub(crate) fn finalize(&mut self) -> usize {
        for meta in self.channels.iter_mut() {
            meta.closed = true;
        }
        let flushed = self.delay_queue.clear();
        if flushed > 0 {
            log::debug!("flushed {} delay requests at wrapup", flushed);
        }
        if self.active_count != 0 || self.blocked_count() != 0 || self.delay_block_count != 0 {
            log::warn!(
                "counts not settled at wrapup: active={} read={} write={} delay={}",
                self.active_count,
                self.read_block_count,
                self.write_block_count,
                self.delay_block_count
            );
        }
        self.read_block_count = 0;
        self.write_block_count = 0;
        self.delay_block_count = 0;
        flushed
    }
}

impl fmt::Debug for DirectorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectorState")
            .field("active_count", &self.active_count)
            .field("read_block_count", &self.read_block_count)
            .field("write_block_count", &self.write_block_count)
            .field("delay_block_count", &self.delay_block_count)
            .field("model_time", &self.model_time)
            .field("delay_queue_len", &self.delay_queue.len())
            .field("stop_requested", &self.stop_requested)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(v: f64) -> Time { Time::new(v) }

    // a state with n active processes, none blocked
    fn state_with(n: usize) -> (DirectorState, Vec<ProcessId>) {
        let mut state = DirectorState::new(0);
        let ids: Vec<ProcessId> = (0 .. n)
            .map(|idx| {
                let id = state.register_process(Arc::from(format!("p{}", idx)));
                state.activate_process(id);
                id
            })
            .collect();
        (state, ids)
    }

    #[test]
    fn model_time_is_monotonic() {
        let mut state = DirectorState::new(0);
        let mut seen = vec![state.model_time()];
        for v in [1.0, 1.0, 3.0, 2.0, 5.0, 0.0].iter() {
            match state.set_model_time(t(*v)) {
                Ok(()) => seen.push(state.model_time()),
                Err(DirectorError::TimeBackward { requested, current }) => {
                    assert_eq!(requested, t(*v));
                    assert_eq!(current, state.model_time());
                },
                Err(e) => panic!("unexpected {}", e),
            }
        }
        assert_eq!(state.model_time(), t(5.0));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn batch_draining_releases_each_instant_together() {
        let (mut state, ids) = state_with(3);
        state.request_delay(ids[0], t(5.0)).unwrap();
        state.request_delay(ids[1], t(5.0)).unwrap();
        state.request_delay(ids[2], t(7.0)).unwrap();
        assert_eq!(state.delay_block_count(), 3);
        assert!(state.are_threads_deadlocked());

        assert_eq!(state.advance_to_next_wake().unwrap(), 2);
        assert_eq!(state.delay_block_count(), 1);
        assert_eq!(state.model_time(), t(5.0));
        assert_eq!(state.process_state(ids[0]), Some(ProcessState::Unblocked));
        assert_eq!(state.process_state(ids[1]), Some(ProcessState::Unblocked));
        assert_eq!(state.process_state(ids[2]), Some(ProcessState::DelayBlocked(t(7.0))));
        assert!(!state.are_threads_deadlocked());
    }

    #[test]
    fn duplicate_requests_release_once() {
        let (mut state, ids) = state_with(2);
        state.request_delay(ids[0], t(2.0)).unwrap();
        state.request_delay(ids[0], t(2.0)).unwrap();
        state.request_delay(ids[1], t(2.0)).unwrap();
        assert_eq!(state.delay_block_count(), 2);
        assert_eq!(state.delay_queue().len(), 3);
        assert_eq!(state.advance_to_next_wake().unwrap(), 2);
        assert_eq!(state.delay_block_count(), 0);
        assert!(state.delay_queue().is_empty());
    }

    #[test]
    fn empty_queue_with_delay_blocks_is_fatal() {
        let (mut state, _) = state_with(1);
        state.delay_block_count = 1;
        match state.advance_to_next_wake() {
            Err(DirectorError::InternalConsistency(msg)) => assert!(msg.contains("empty")),
            other => panic!("expected an inconsistency, got {:?}", other),
        }
        assert_eq!(state.model_time(), Time::ZERO);
    }

    #[test]
    fn stale_entries_are_skipped_after_a_time_jump() {
        let (mut state, ids) = state_with(2);
        state.request_delay(ids[0], t(2.0)).unwrap();
        state.set_model_time(t(3.0)).unwrap();
        state.abandon_delay(ids[0]).unwrap();
        state.request_delay(ids[1], t(4.0)).unwrap();
        assert_eq!(state.advance_to_next_wake().unwrap(), 1);
        assert_eq!(state.model_time(), t(4.0));
        assert!(state.delay_queue().is_empty());
    }

    #[test]
    fn satisfied_requests_never_release_a_later_wait() {
        let (mut state, ids) = state_with(1);
        // reached by setting the time, fire_at abandons what is left
        state.request_delay(ids[0], t(5.0)).unwrap();
        state.set_model_time(t(5.0)).unwrap();
        state.abandon_delay(ids[0]).unwrap();
        assert!(state.delay_queue().is_empty());
        state.request_delay(ids[0], t(8.0)).unwrap();
        assert_eq!(state.advance_to_next_wake().unwrap(), 1);
        assert_eq!(state.model_time(), t(8.0));
        assert_eq!(state.process_state(ids[0]), Some(ProcessState::Unblocked));

        // an entry left behind for an earlier wait is dropped, not used
        state.request_delay(ids[0], t(9.0)).unwrap();
        state.release_delay(ids[0]).unwrap();
        state.request_delay(ids[0], t(12.0)).unwrap();
        assert_eq!(state.delay_queue().len(), 2);
        assert_eq!(state.advance_to_next_wake().unwrap(), 1);
        assert_eq!(state.model_time(), t(12.0));
        assert_eq!(state.delay_block_count(), 0);
        assert!(state.delay_queue().is_empty());
    }

    #[test]
    fn only_stale_entries_left_is_fatal() {
        let (mut state, ids) = state_with(1);
        state.request_delay(ids[0], t(3.0)).unwrap();
        state.release_delay(ids[0]).unwrap();
        state.delay_block_count = 1;
        assert!(matches!(
            state.advance_to_next_wake(),
            Err(DirectorError::InternalConsistency(_))
        ));
        assert_eq!(state.model_time(), Time::ZERO);
    }

    #[test]
    fn past_delay_requests_are_rejected() {
        let (mut state, ids) = state_with(1);
        state.set_model_time(t(4.0)).unwrap();
        assert!(matches!(
            state.request_delay(ids[0], t(3.0)),
            Err(DirectorError::InvalidTime { .. })
        ));
        assert_eq!(state.delay_block_count(), 0);
        assert!(state.delay_queue().is_empty());
    }

    #[test]
    fn deadlock_check_is_idempotent() {
        let (mut state, ids) = state_with(2);
        let ch = state.register_channel(Some(1));
        state.block_reader(ch, ids[0]).unwrap();
        assert_eq!(state.are_threads_deadlocked(), state.are_threads_deadlocked());
        assert!(!state.are_threads_deadlocked());
        state.request_delay(ids[1], t(1.0)).unwrap();
        assert!(state.are_threads_deadlocked());
        assert!(state.are_threads_deadlocked());
    }

    #[test]
    fn smallest_write_blocked_channel_grows() {
        let (mut state, ids) = state_with(3);
        let big = state.register_channel(Some(4));
        let small_a = state.register_channel(Some(2));
        let small_b = state.register_channel(Some(2));
        for (ch, p) in [(big, ids[0]), (small_a, ids[1]), (small_b, ids[2])].iter() {
            for _ in 0 .. state.capacity(*ch).unwrap().unwrap() {
                state.note_put(*ch).unwrap();
            }
            assert!(!state.has_room_for(*ch, 1).unwrap());
            assert!(state.block_writer(*ch, *p).unwrap());
        }
        assert_eq!(state.write_blocked_count(), 3);
        // ties go to the first channel created
        assert_eq!(state.grow_smallest_write_blocked().unwrap(), small_a);
        assert_eq!(state.capacity(small_a).unwrap(), Some(3));
        assert_eq!(state.write_blocked_count(), 2);
        assert_eq!(state.process_state(ids[1]), Some(ProcessState::Unblocked));
        assert_eq!(state.grow_smallest_write_blocked().unwrap(), small_b);
        assert_eq!(state.grow_smallest_write_blocked().unwrap(), big);
        assert_eq!(state.stats().capacity_increases, 3);
    }

    #[test]
    fn growth_beyond_maximum_fails() {
        let mut state = DirectorState::new(2);
        let p = state.register_process(Arc::from("writer"));
        state.activate_process(p);
        let ch = state.register_channel(Some(2));
        state.note_put(ch).unwrap();
        state.note_put(ch).unwrap();
        state.block_writer(ch, p).unwrap();
        assert!(matches!(
            state.grow_smallest_write_blocked(),
            Err(DirectorError::CapacityExceeded { capacity: 3, maximum: 2, .. })
        ));
        assert_eq!(state.capacity(ch).unwrap(), Some(2));
        assert_eq!(state.write_blocked_count(), 1);
    }

    #[test]
    fn capacity_never_drops_below_size() {
        let (mut state, ids) = state_with(1);
        let ch = state.register_channel(Some(3));
        for _ in 0 .. 3 {
            state.note_put(ch).unwrap();
        }
        state.block_writer(ch, ids[0]).unwrap();
        assert!(matches!(
            state.set_capacity(ch, Some(2)),
            Err(DirectorError::CapacityBelowSize { requested: 2, len: 3, .. })
        ));
        state.set_capacity(ch, Some(3)).unwrap();
        assert_eq!(state.write_blocked_count(), 1);
        state.set_capacity(ch, None).unwrap();
        assert_eq!(state.write_blocked_count(), 0);
        assert!(state.has_room_for(ch, 1000).unwrap());
    }

    #[test]
    fn put_and_get_release_the_other_side() {
        let (mut state, ids) = state_with(2);
        let ch = state.register_channel(Some(1));
        assert!(state.block_reader(ch, ids[1]).unwrap());
        assert!(!state.block_reader(ch, ids[1]).unwrap());
        assert_eq!(state.read_blocked_count(), 1);
        state.note_put(ch).unwrap();
        assert_eq!(state.read_blocked_count(), 0);
        state.block_writer(ch, ids[0]).unwrap();
        state.note_get(ch).unwrap();
        assert_eq!(state.write_blocked_count(), 0);
        assert!(matches!(state.note_get(ch), Err(DirectorError::InternalConsistency(_))));
    }

    #[test]
    fn deregistering_more_than_registered_is_fatal() {
        let (mut state, ids) = state_with(1);
        state.deregister_process(ids[0], false).unwrap();
        assert_eq!(state.active_count(), 0);
        assert!(matches!(
            state.deregister_process(ids[0], false),
            Err(DirectorError::InternalConsistency(_))
        ));
    }
}
