use super::*;
use crossbeam::channel::TrySendError;

/// The state a process is in, as reported to process listeners.
#[derive(Copy, Clone, Debug, Eq, PartialEq, SmartDefault)]
pub enum ProcessState {
    #[default]
    Created,
    Started,
    ReadBlocked(ChannelId),
    WriteBlocked(ChannelId),
    DelayBlocked(Time),
    Unblocked,
    Finished,
    Failed,
}

/// A ProcessEvent is sent to every listener as a process changes state.
#[derive(Clone, Debug)]
pub struct ProcessEvent {
    pub process: ProcessId,
    pub name: Arc<str>,
    pub state: ProcessState,
    pub model_time: Time,
}

/// A listener is just the sending side of a crossbeam channel.
pub type ProcessListener = crossbeam::channel::Sender<ProcessEvent>;

// The listeners are owned by the director state, events are forwarded while the
// director lock is held, so delivery is try_send; a full listener misses events
// and a disconnected one is dropped.
#[derive(Default)]
pub struct Listeners {
    senders: Vec<ProcessListener>,
}
impl Listeners {
    // add sender if not already in the list
    pub fn add(&mut self, sender: ProcessListener) {
        for s in &self.senders {
            if sender.same_channel(s) {
                return;
            }
        }
        self.senders.push(sender);
    }

    // remove sender if in the list
    pub fn remove(&mut self, sender: &ProcessListener) { self.senders.retain(|s| !s.same_channel(sender)); }

    #[inline]
    pub fn is_empty(&self) -> bool { self.senders.is_empty() }

    pub fn try_fwd(&mut self, event: ProcessEvent) {
        match self.senders.len() {
            0 => (),
            1 => {
                if let Err(TrySendError::Disconnected(_)) = self.senders[0].try_send(event) {
                    self.senders.clear()
                }
            },
            _ => {
                let mut alive: Vec<ProcessListener> = Vec::with_capacity(self.senders.len());
                for s in self.senders.drain(..) {
                    match s.try_send(event.clone()) {
                        Ok(()) => alive.push(s),
                        Err(TrySendError::Full(_)) => alive.push(s),
                        _ => (),
                    }
                }
                self.senders = alive;
            },
        }
    }
}
