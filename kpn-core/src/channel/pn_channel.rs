use super::{receiver::*, sender::*};
use super::*;

// A channel is a FIFO queue of tokens between exactly one writer and one reader.
// The tokens live here, the capacity and block bookkeeping live in the director
// state. Lock order is always director, then queue; the queue lock is only taken
// with the director lock held, so the two can never disagree for an observer.
//
// A put on a full channel, or a get on an empty one, registers the calling process
// as blocked and waits on the director's condition variable. Whoever makes progress
// possible (the other end, or a capacity increase) clears the registration and
// adjusts the counts before waking everyone. The waiter then re-checks. A thread
// which isn't a process still waits, but isn't counted, the director can't see it.

pub(crate) struct ChannelInner<T> {
    id: ChannelId,
    queue: Mutex<VecDeque<T>>,
    shared: Arc<Shared>,
}

pub(crate) fn new_channel<T: Send>(shared: &Arc<Shared>, capacity: Option<usize>) -> (Sender<T>, Receiver<T>) {
    let id = shared.lock().register_channel(capacity);
    match capacity {
        Some(c) => log::trace!("created {} with capacity {}", id, c),
        None => log::trace!("created unbounded {}", id),
    }
    let inner = Arc::new(ChannelInner {
        id,
        queue: Mutex::new(VecDeque::new()),
        shared: Arc::clone(shared),
    });
    (Sender::wrap(Arc::clone(&inner)), Receiver::wrap(inner))
}

impl<T> ChannelInner<T> {
    #[inline]
    pub fn id(&self) -> ChannelId { self.id }

    pub fn put(&self, token: T) -> Result<(), DirectorError> {
        let process = ProcessData::current();
        let mut state = self.shared.lock();
        let mut warned = false;
        loop {
            if state.is_closed(self.id)? {
                state.abandon_write(self.id, process)?;
                return Err(DirectorError::ChannelClosed(self.id));
            }
            if state.is_stop_requested() {
                state.abandon_write(self.id, process)?;
                self.shared.notify_all();
                return Err(DirectorError::Stopped);
            }
            if state.has_room_for(self.id, 1)? {
                self.queue.lock().push_back(token);
                state.note_put(self.id)?;
                self.shared.notify_all();
                return Ok(());
            }
            match process {
                Some(p) => {
                    if state.block_writer(self.id, p)? {
                        self.shared.notify_all();
                    }
                },
                None if !warned => {
                    log::warn!("blocking a thread which is not a process, writing to {}", self.id);
                    warned = true;
                },
                None => (),
            }
            self.shared.wait(&mut state);
        }
    }

    pub fn get(&self) -> Result<T, DirectorError> {
        let process = ProcessData::current();
        let mut state = self.shared.lock();
        let mut warned = false;
        loop {
            if state.is_stop_requested() && !state.is_closed(self.id)? {
                state.abandon_read(self.id, process)?;
                self.shared.notify_all();
                return Err(DirectorError::Stopped);
            }
            let token = self.queue.lock().pop_front();
            if let Some(token) = token {
                state.note_get(self.id)?;
                self.shared.notify_all();
                return Ok(token);
            }
            if state.is_closed(self.id)? {
                state.abandon_read(self.id, process)?;
                return Err(DirectorError::ChannelClosed(self.id));
            }
            match process {
                Some(p) => {
                    if state.block_reader(self.id, p)? {
                        self.shared.notify_all();
                    }
                },
                None if !warned => {
                    log::warn!("blocking a thread which is not a process, reading from {}", self.id);
                    warned = true;
                },
                None => (),
            }
            self.shared.wait(&mut state);
        }
    }

    pub fn has_room_for(&self, tokens: usize) -> bool {
        self.shared.lock().has_room_for(self.id, tokens).unwrap_or(false)
    }

    pub fn len(&self) -> usize { self.shared.lock().queued(self.id).unwrap_or(0) }

    pub fn capacity(&self) -> Option<usize> { self.shared.lock().capacity(self.id).unwrap_or(None) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared() -> Arc<Shared> { Arc::new(Shared::new(DirectorState::new(0), true)) }

    #[test]
    fn tokens_arrive_in_order() {
        let shared = shared();
        let (sender, receiver) = new_channel::<u32>(&shared, None);
        for v in 0 .. 10 {
            sender.put(v).unwrap();
        }
        assert_eq!(receiver.len(), 10);
        let got: Vec<u32> = (0 .. 10).map(|_| receiver.get().unwrap()).collect();
        assert_eq!(got, (0 .. 10).collect::<Vec<u32>>());
        assert!(!receiver.has_token());
    }

    #[test]
    fn a_non_process_writer_waits_for_room() {
        let shared = shared();
        let (sender, receiver) = new_channel::<u32>(&shared, Some(1));
        sender.put(1).unwrap();
        assert!(!sender.has_room());
        let writer = thread::spawn(move || sender.put(2));
        thread::sleep(Duration::from_millis(20));
        // not a process, so nothing is counted as blocked
        assert_eq!(shared.lock().write_blocked_count(), 0);
        assert_eq!(receiver.get().unwrap(), 1);
        writer.join().unwrap().unwrap();
        assert_eq!(receiver.get().unwrap(), 2);
    }

    #[test]
    fn stop_releases_a_blocked_reader() {
        let shared = shared();
        let (_sender, receiver) = new_channel::<u32>(&shared, Some(1));
        let reader = thread::spawn(move || receiver.get());
        thread::sleep(Duration::from_millis(20));
        shared.request_stop();
        assert!(matches!(reader.join().unwrap(), Err(DirectorError::Stopped)));
    }

    #[test]
    fn closed_channels_refuse_tokens() {
        let shared = shared();
        let (sender, receiver) = new_channel::<u32>(&shared, Some(2));
        sender.put(7).unwrap();
        shared.lock().finalize();
        assert!(matches!(sender.put(8), Err(DirectorError::ChannelClosed(_))));
        assert_eq!(receiver.get().unwrap(), 7);
        assert!(matches!(receiver.get(), Err(DirectorError::ChannelClosed(_))));
    }
}
