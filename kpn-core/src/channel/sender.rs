use super::pn_channel::*;
use super::*;

/// The Sender is the writing end of a channel. A put on a full channel blocks the
/// process until the reader makes room or the director grows the channel. There is
/// exactly one Sender per channel, it can be moved but not cloned.
pub struct Sender<T> {
    inner: Arc<ChannelInner<T>>,
}

impl<T> Sender<T> {
    pub(crate) fn wrap(inner: Arc<ChannelInner<T>>) -> Self { Self { inner } }

    pub fn id(&self) -> ChannelId { self.inner.id() }

    /// Queue a token, blocking while the channel is full.
    pub fn put(&self, token: T) -> Result<(), DirectorError> { self.inner.put(token) }

    /// True if a put wouldn't block right now.
    pub fn has_room(&self) -> bool { self.inner.has_room_for(1) }

    pub fn has_room_for(&self, tokens: usize) -> bool { self.inner.has_room_for(tokens) }

    pub fn len(&self) -> usize { self.inner.len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// None if the channel is unbounded.
    pub fn capacity(&self) -> Option<usize> { self.inner.capacity() }
}

impl<T> fmt::Debug for Sender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Sender({})", self.id()) }
}
