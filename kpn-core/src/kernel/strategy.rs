use super::state::*;
use super::*;

/// The outcome of resolving a deadlock.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Resolution {
    /// progress was made, the processes have been woken
    Continue,
    /// nothing can make progress, the run is over
    Terminate,
}

/// The DeadlockStrategy decides what a director does once every blocked process is
/// waiting for time. Artificial deadlocks (a write-blocked process) and real deadlocks
/// (no write-blocked and no delay-blocked processes) are handled by the director
/// itself, before the strategy is consulted.
///
/// The state is locked for the duration of the call.
pub trait DeadlockStrategy: Send + Sync + 'static {
    /// true if processes may ask for model time under this strategy
    fn is_timed(&self) -> bool;

    /// called with at least one delay-blocked process and no write-blocked process
    fn resolve_timed_deadlock(&self, state: &mut DirectorState) -> Result<Resolution, DirectorError>;
}

/// Untimed process networks, nobody ever delay-blocks.
#[derive(Debug, Default, Copy, Clone)]
pub struct Untimed;
impl DeadlockStrategy for Untimed {
    fn is_timed(&self) -> bool { false }

    fn resolve_timed_deadlock(&self, state: &mut DirectorState) -> Result<Resolution, DirectorError> {
        Err(DirectorError::inconsistency(format!(
            "{} processes are delay-blocked under an untimed director",
            state.delay_block_count()
        )))
    }
}

/// Timed process networks, a timed deadlock advances model time to the earliest
/// pending wake time and releases every process waiting for it.
#[derive(Debug, Default, Copy, Clone)]
pub struct TimeAdvance;
impl DeadlockStrategy for TimeAdvance {
    fn is_timed(&self) -> bool { true }

    fn resolve_timed_deadlock(&self, state: &mut DirectorState) -> Result<Resolution, DirectorError> {
        state.advance_to_next_wake()?;
        Ok(Resolution::Continue)
    }
}

// Resolve a detected deadlock, in order: grow a channel if anyone is write-blocked,
// terminate if nobody is waiting for time, otherwise let the strategy handle it.
pub(crate) fn resolve<S: DeadlockStrategy>(state: &mut DirectorState, strategy: &S) -> Result<Resolution, DirectorError> {
    if state.write_blocked_count() > 0 {
        state.grow_smallest_write_blocked()?;
        return Ok(Resolution::Continue);
    }
    if state.delay_block_count() == 0 {
        state.note_real_deadlock();
        return Ok(Resolution::Terminate);
    }
    strategy.resolve_timed_deadlock(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deadlocked_state(delays: &[f64], readers: usize) -> DirectorState {
        let mut state = DirectorState::new(0);
        for (idx, wake) in delays.iter().enumerate() {
            let p = state.register_process(Arc::from(format!("delayed{}", idx)));
            state.activate_process(p);
            state.request_delay(p, Time::new(*wake)).unwrap();
        }
        for idx in 0 .. readers {
            let p = state.register_process(Arc::from(format!("reader{}", idx)));
            state.activate_process(p);
            let ch = state.register_channel(Some(1));
            state.block_reader(ch, p).unwrap();
        }
        state
    }

    #[test]
    fn read_only_deadlock_terminates() {
        let mut state = deadlocked_state(&[], 2);
        assert!(state.are_threads_deadlocked());
        assert_eq!(resolve(&mut state, &TimeAdvance).unwrap(), Resolution::Terminate);
        assert!(state.is_real_deadlock());
        assert_eq!(state.stats().real_deadlocks, 1);
    }

    #[test]
    fn timed_deadlock_advances_time() {
        let mut state = deadlocked_state(&[3.0, 1.5], 1);
        assert_eq!(resolve(&mut state, &TimeAdvance).unwrap(), Resolution::Continue);
        assert_eq!(state.model_time(), Time::new(1.5));
        assert_eq!(state.delay_block_count(), 1);
        assert!(!state.is_real_deadlock());
    }

    #[test]
    fn untimed_strategy_rejects_delay_blocks() {
        let mut state = deadlocked_state(&[1.0], 0);
        assert!(matches!(
            resolve(&mut state, &Untimed),
            Err(DirectorError::InternalConsistency(_))
        ));
    }

    #[test]
    fn write_blocks_win_over_time() {
        let mut state = deadlocked_state(&[2.0], 0);
        let writer = state.register_process(Arc::from("writer"));
        state.activate_process(writer);
        let ch = state.register_channel(Some(1));
        state.note_put(ch).unwrap();
        state.block_writer(ch, writer).unwrap();
        assert!(state.are_threads_deadlocked());
        assert_eq!(resolve(&mut state, &TimeAdvance).unwrap(), Resolution::Continue);
        assert_eq!(state.model_time(), Time::ZERO);
        assert_eq!(state.capacity(ch).unwrap(), Some(2));
        assert_eq!(state.delay_block_count(), 1);
    }
}
