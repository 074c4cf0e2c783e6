use super::*;

/// The ProcessId identifies a process, and its actor, for the lifetime of a director.
/// Ids are handed out in registration order, starting at 0.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ProcessId(pub(crate) usize);

impl ProcessId {
    #[inline]
    pub const fn index(self) -> usize { self.0 }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "process-{}", self.0) }
}

/// The ChannelId identifies a channel (receiver) created by a director. The
/// channel id is used in logging and for picking among write-blocked channels.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ChannelId(pub(crate) usize);

impl ChannelId {
    #[inline]
    pub const fn index(self) -> usize { self.0 }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "chan-{}", self.0) }
}
