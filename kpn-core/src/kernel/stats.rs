use super::*;

/// Statistics for a director run. They're logged at wrapup and returned by run().
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct DirectorStats {
    pub processes_started: usize,
    pub processes_finished: usize,
    pub processes_failed: usize,
    pub artificial_deadlocks: usize,
    pub capacity_increases: usize,
    pub timed_deadlocks: usize,
    pub processes_released: usize,
    pub real_deadlocks: usize,
    pub delay_requests: usize,
    pub tokens_put: u64,
    pub tokens_got: u64,
    pub model_time: Time,
    pub run_time: Duration,
}
