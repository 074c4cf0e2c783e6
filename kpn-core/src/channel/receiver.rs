use super::pn_channel::*;
use super::*;

/// The Receiver is the reading end of a channel. A get on an empty channel blocks the
/// process until a token arrives. There is exactly one Receiver per channel, which is
/// what keeps a network determinate.
pub struct Receiver<T> {
    inner: Arc<ChannelInner<T>>,
}

impl<T> Receiver<T> {
    pub(crate) fn wrap(inner: Arc<ChannelInner<T>>) -> Self { Self { inner } }

    pub fn id(&self) -> ChannelId { self.inner.id() }

    /// Take the next token, blocking while the channel is empty.
    pub fn get(&self) -> Result<T, DirectorError> { self.inner.get() }

    /// True if a get wouldn't block right now.
    pub fn has_token(&self) -> bool { self.len() > 0 }

    pub fn has_tokens(&self, tokens: usize) -> bool { self.len() >= tokens }

    pub fn len(&self) -> usize { self.inner.len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn capacity(&self) -> Option<usize> { self.inner.capacity() }
}

impl<T> fmt::Debug for Receiver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Receiver({})", self.id()) }
}
