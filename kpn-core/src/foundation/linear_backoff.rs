use super::*;

const MAX_YIELD: u8 = 16;
const PARK_TIME: Duration = Duration::from_millis(1);

// A backoff for a process whose actor declines to fire. Each snooze yields one
// more time than the last, until reaching the max, then every snooze parks for a
// short while. A completed sequence has yielded 1+2+3..+15+16 = 136 times.
#[derive(Debug, Default)]
pub struct LinearBackoff {
    count: u8,
    parked: usize,
}
impl LinearBackoff {
    pub fn new() -> Self { Self::default() }

    // yield, or park once the yields are used up
    pub fn snooze(&mut self) {
        if self.is_completed() {
            self.parked += 1;
            thread::park_timeout(PARK_TIME);
            return;
        }
        self.count += 1;
        for _ in 0 .. self.count {
            thread::yield_now();
        }
    }

    // start over, returns true if the sequence had been completed
    pub fn reset(&mut self) -> bool {
        let completed = self.is_completed();
        self.count = 0;
        completed
    }

    pub fn is_completed(&self) -> bool { self.count == MAX_YIELD }

    // how many times a completed sequence has parked
    pub fn parked(&self) -> usize { self.parked }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_then_parks() {
        let mut backoff = LinearBackoff::new();
        for _ in 0 .. MAX_YIELD {
            assert!(!backoff.is_completed());
            backoff.snooze();
        }
        assert!(backoff.is_completed());
        assert_eq!(backoff.parked(), 0);
        backoff.snooze();
        backoff.snooze();
        assert_eq!(backoff.parked(), 2);
        assert!(backoff.reset());
        assert!(!backoff.is_completed());
        assert!(!backoff.reset());
    }
}
