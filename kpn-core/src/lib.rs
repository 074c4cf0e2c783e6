//! As the name implies, kpn-core is the core foundation for running a Kahn process network.
//! It is responsible for giving every actor a thread of control, moving tokens through
//! bounded channels, noticing when the whole network has stalled, and deciding how to make
//! progress: by growing a channel (artificial deadlock), by advancing model time (timed
//! deadlock), or by terminating (real deadlock).
//!
//! # examples
//! ```
//! use kpn_core::director::*;
//! use kpn_core::process::*;
//! use kpn_core::time::Time;
//!
//! // A source that sends three values and then finishes.
//! struct Counter { output: Sender<u32>, next: u32 }
//! impl Actor for Counter {
//!     fn fire(&mut self, _ctx: &ProcessContext) -> Result<(), ActorError> {
//!         self.output.put(self.next)?;
//!         self.next += 1;
//!         Ok(())
//!     }
//!     fn postfire(&mut self, _ctx: &ProcessContext) -> Result<bool, ActorError> { Ok(self.next < 3) }
//! }
//!
//! // A sink that sums whatever arrives. It starves once the counter is done,
//! // which is a real deadlock and ends the run.
//! struct Summer { input: Receiver<u32>, total: std::sync::Arc<std::sync::atomic::AtomicU32> }
//! impl Actor for Summer {
//!     fn fire(&mut self, _ctx: &ProcessContext) -> Result<(), ActorError> {
//!         let value = self.input.get()?;
//!         self.total.fetch_add(value, std::sync::atomic::Ordering::SeqCst);
//!         Ok(())
//!     }
//! }
//!
//! let mut director = TimedPNDirector::new(DirectorConfig::default());
//! let (output, input) = director.channel::<u32>();
//! let total = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));
//! director.add_actor("counter", Counter { output, next: 0 });
//! director.add_actor("summer", Summer { input, total: total.clone() });
//! let stats = director.run().expect("run failed");
//! assert_eq!(total.load(std::sync::atomic::Ordering::SeqCst), 3);
//! assert_eq!(stats.real_deadlocks, 1);
//! assert_eq!(director.model_time(), Time::ZERO);
//! ```

// pull in commonly used elements
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// bring in addition utilities
use crossbeam::atomic::AtomicCell;
use parking_lot::{Condvar, Mutex, MutexGuard};

#[allow(unused_imports)]
#[macro_use]
extern crate smart_default;

#[allow(unused_imports)]
#[macro_use]
extern crate log;

// pull in all of the modules
mod foundation {
    use super::*;
    pub mod actor;
    pub mod error;
    pub mod ids;
    pub mod linear_backoff;
    pub mod thread_safe;
    pub mod time;
}
mod tls {
    use super::*;
    use crate::foundation::ids::*;
    pub mod process_data;
}
mod kernel {
    use super::*;
    use crate::channel::{pn_channel::*, receiver::*, sender::*};
    use crate::foundation::{actor::*, error::*, ids::*, linear_backoff::*, thread_safe::*, time::*};
    use crate::tls::process_data::*;
    pub mod context;
    pub mod delay_queue;
    pub mod listener;
    pub mod process;
    pub mod process_director;
    pub mod state;
    pub mod stats;
    pub mod strategy;
}
mod channel {
    use super::*;
    use crate::foundation::{error::*, ids::*};
    use crate::kernel::{listener::*, state::*};
    use crate::tls::process_data::*;
    pub mod pn_channel;
    pub mod receiver;
    pub mod sender;
}

// publish the parts needed outside of the core

/// Model time and the queue of delayed processes.
pub mod time {
    pub use crate::kernel::delay_queue::DelayQueue;
    pub use crate::foundation::time::Time;
}

/// Everything an actor needs: the actor contract, its context, and the channel ends.
pub mod process {
    pub use crate::channel::{receiver::Receiver, sender::Sender};
    pub use crate::kernel::context::ProcessContext;
    pub use crate::foundation::actor::Actor;
    pub use crate::foundation::error::{ActorError, DirectorError};
    pub use crate::foundation::ids::{ChannelId, ProcessId};
}

/// The directors, their configuration, and what they report.
pub mod director {
    pub use crate::channel::{receiver::Receiver, sender::Sender};
    pub use crate::kernel::{
        context::ProcessContext,
        listener::{ProcessEvent, ProcessListener, ProcessState},
        process_director::{DirectorConfig, PNDirector, ProcessDirector, StopHandle, TimedPNDirector},
        state::DirectorState,
        stats::DirectorStats,
        strategy::{DeadlockStrategy, Resolution, TimeAdvance, Untimed},
    };
    pub use crate::foundation::actor::Actor;
    pub use crate::foundation::error::{ActorError, DirectorError};
    pub use crate::foundation::ids::{ChannelId, ProcessId};
}
