//! Timed Kahn Process Networks
//! What we have here is a director for Kahn process networks, where every actor runs
//! in its own process, a thread, and actors talk only through bounded FIFO channels.
//! A read from an empty channel blocks, as does a write to a full one. Under a timed
//! director an actor can also block until model time reaches a given instant.
//!
//! ## Deadlocks
//! The director never schedules anything. It watches the block counts, and once every
//! active process is blocked it resolves the deadlock:
//!
//! * An artificial deadlock, where someone is blocked writing to a full channel, is
//!   resolved by growing the smallest such channel by one.
//! * A timed deadlock, where the remaining processes wait for time, is resolved by
//!   advancing model time to the earliest requested instant and releasing everyone
//!   waiting for it.
//! * A real deadlock, where everyone is waiting for data which will never come, ends
//!   the run.
//!
//! ## Example
//!
//! ```
//! use kpn::components::actors::*;
//! use kpn::core::director::*;
//! use kpn::core::time::Time;
//!
//! let mut director = TimedPNDirector::new(DirectorConfig::default());
//! let (clock_out, delay_in) = director.channel::<&str>();
//! let (delay_out, sink_in) = director.channel::<&str>();
//! director.add_actor("clock", Clock::new(clock_out, "tick", 1.0).with_stop_time(Time::new(3.0)));
//! director.add_actor("delay", TimedDelay::new(delay_in, delay_out, 0.25));
//! let (recorder, log) = Recorder::new(sink_in);
//! director.add_actor("recorder", recorder);
//! let stats = director.run().expect("run failed");
//! assert_eq!(log.len(), 4);
//! assert_eq!(director.model_time(), Time::new(3.25));
//! assert_eq!(stats.real_deadlocks, 1);
//! ```
//!
//! ## Core
//!
//! * [`kpn-core`], the directors, channels, model time and the delay queue.
//!
//! ## Components
//!
//! * [`kpn-components`], layered settings and a library of stock actors.
//!
//! ## Test Drivers
//!
//! * [`kpn-test-drivers`], networks used by the integration tests, the benches and the
//!   kpn-test-server.
//!
//! [`kpn-core`]: ../kpn_core/index.html
//! [`kpn-components`]: ../kpn_components/index.html
//! [`kpn-test-drivers`]: ../kpn_test_drivers/index.html

pub mod core {
    pub use kpn_core::*;
}
pub mod components {
    pub use kpn_components::*;
}
