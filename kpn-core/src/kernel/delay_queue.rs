use super::*;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// The DelayQueue holds the processes waiting for model time to advance, as
/// (wake time, process) pairs ordered by wake time. Several entries may share a
/// wake time, they come out in insertion order, which makes draining a batch
/// deterministic.
///
/// Under the hood, this is a binary heap keyed by (time, epoch), where the epoch
/// is a counter bumped on every insertion.
#[derive(Debug, Default)]
pub struct DelayQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    next_epoch: u64,
}

#[derive(Debug, Copy, Clone)]
struct Entry {
    wake_time: Time,
    epoch: u64,
    process: ProcessId,
}
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}
impl Eq for Entry {}
impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.wake_time
            .cmp(&other.wake_time)
            .then_with(|| self.epoch.cmp(&other.epoch))
    }
}

impl DelayQueue {
    pub fn new() -> Self { Self::default() }

    #[inline]
    pub fn len(&self) -> usize { self.heap.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.heap.is_empty() }

    /// Adds a process which wants to wake at wake_time.
    pub fn push(&mut self, wake_time: Time, process: ProcessId) {
        let epoch = self.next_epoch;
        self.next_epoch += 1;
        self.heap.push(Reverse(Entry {
            wake_time,
            epoch,
            process,
        }));
    }

    /// The earliest entry, without removing it.
    pub fn peek(&self) -> Option<(Time, ProcessId)> { self.heap.peek().map(|e| (e.0.wake_time, e.0.process)) }

    /// The earliest wake time, if any.
    pub fn next_wake_time(&self) -> Option<Time> { self.heap.peek().map(|e| e.0.wake_time) }

    /// Removes the earliest entry.
    pub fn pop(&mut self) -> Option<(Time, ProcessId)> { self.heap.pop().map(|e| (e.0.wake_time, e.0.process)) }

    /// Removes every entry whose wake time is exactly wake_time, returning the
    /// processes in insertion order. Entries for a later time are left alone.
    pub fn drain_at(&mut self, wake_time: Time) -> Vec<ProcessId> {
        let mut drained = Vec::new();
        while let Some(Reverse(entry)) = self.heap.peek() {
            if entry.wake_time != wake_time {
                break;
            }
            drained.push(entry.process);
            self.heap.pop();
        }
        drained
    }

    /// Removes every entry of a process, returning how many there were.
    pub fn remove(&mut self, process: ProcessId) -> usize {
        let len = self.heap.len();
        let heap = std::mem::take(&mut self.heap);
        self.heap = heap.into_iter().filter(|e| e.0.process != process).collect();
        len - self.heap.len()
    }

    /// Removes all entries, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let len = self.heap.len();
        self.heap.clear();
        len
    }
}
