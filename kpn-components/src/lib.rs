//! The component layer of kpn. It holds the layered settings used by binaries and tests,
//! and a small library of stock actors for building networks: sources, transformers,
//! timed actors and sinks.
#[macro_use]
extern crate smart_default;
#[macro_use]
extern crate serde_derive;

use std::sync::Arc;

use parking_lot::Mutex;

use kpn_core::process::*;
use kpn_core::time::Time;

pub mod settings;

mod sinks;
mod sources;
mod transformers;

/// The stock actors.
pub mod actors {
    pub use crate::sinks::{RecordLog, Recorder};
    pub use crate::sources::{Clock, Const, Ramp};
    pub use crate::transformers::{Map, RoundRobinMerge, TimedDelay};
}
