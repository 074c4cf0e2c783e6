use super::{ids::*, time::*};
use thiserror::Error;

/// The DirectorError covers everything that can go wrong while a director runs a
/// network. There are a few distinct families:
///
/// * Invalid time requests, made by an actor asking for the past. These are
///   programming errors in the actor, they are never clamped or retried.
/// * Internal consistency errors. These indicate a bug in the block bookkeeping
///   and abort the run.
/// * Stopped, which is cooperative cancellation. A blocking call returns it when a
///   stop has been requested, and a process seeing it simply winds down.
/// * Actor failures, carrying the name of the offending actor.
#[derive(Debug, Error)]
pub enum DirectorError {
    #[error("{process} wants to be fired in the past: requested {requested}, current time is {current}")]
    InvalidTime {
        process: String,
        requested: Time,
        current: Time,
    },
    #[error("{process} wants to wait for a delay of {delay} at time {current}, which is not a time")]
    InvalidDelay {
        process: String,
        delay: f64,
        current: Time,
    },
    #[error("attempt to set the model time to the past: requested {requested}, current time is {current}")]
    TimeBackward { requested: Time, current: Time },
    #[error("internal inconsistency: {0}")]
    InternalConsistency(String),
    #[error("queue size {capacity} exceeds the maximum capacity {maximum} on {channel}, perhaps you have an unbounded queue?")]
    CapacityExceeded {
        channel: ChannelId,
        capacity: usize,
        maximum: usize,
    },
    #[error("capacity {requested} is below the {len} tokens already queued on {channel}")]
    CapacityBelowSize {
        channel: ChannelId,
        requested: usize,
        len: usize,
    },
    #[error("{0} has been closed")]
    ChannelClosed(ChannelId),
    #[error("{0} is not a channel of this director")]
    UnknownChannel(ChannelId),
    #[error("{0} is not a process of this director")]
    UnknownProcess(ProcessId),
    #[error("the director has no notion of time")]
    Untimed,
    #[error("execution has been stopped")]
    Stopped,
    #[error("actor {actor} failed: {source}")]
    Actor {
        actor: String,
        #[source]
        source: Box<ActorError>,
    },
    #[error("the director is already initialized")]
    AlreadyInitialized,
    #[error("the director must be initialized first")]
    NotInitialized,
}

impl DirectorError {
    // build an internal consistency error, logging it as we go
    pub(crate) fn inconsistency(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        log::error!("internal inconsistency: {}", msg);
        Self::InternalConsistency(msg)
    }

    #[inline]
    pub fn is_stopped(&self) -> bool { matches!(self, Self::Stopped) }
}

/// The ActorError is what an actor's lifecycle methods return. Director errors
/// convert with `?`, anything else is a failure message.
#[derive(Debug, Error)]
pub enum ActorError {
    #[error(transparent)]
    Director(#[from] DirectorError),
    #[error("{0}")]
    Failed(String),
}

impl ActorError {
    pub fn failed(msg: impl Into<String>) -> Self { Self::Failed(msg.into()) }

    // true if this is just the echo of a stop request
    #[inline]
    pub fn is_stopped(&self) -> bool {
        match self {
            Self::Director(e) => e.is_stopped(),
            Self::Failed(_) => false,
        }
    }
}
