use super::*;

// These are some low-level primitives.

/// A wrapper around an object, allowing it to be safely shared between threads.
/// The director keeps its lifecycle phase in one of these, so that it can be
/// read without taking the director lock.
#[derive(Default, Clone)]
pub struct SharedProtectedObject<T> {
    object: Arc<AtomicCell<T>>,
}
impl<T> fmt::Debug for SharedProtectedObject<T>
where
    T: std::fmt::Debug + Copy,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{:#?}", &self.object.load()) }
}

impl<T> SharedProtectedObject<T>
where
    T: Copy + Eq,
{
    pub fn new(value: T) -> Self {
        Self {
            object: Arc::new(AtomicCell::new(value)),
        }
    }
    #[inline]
    pub fn get(&self) -> T { self.object.load() }
    #[inline]
    pub fn set(&self, new: T) { self.object.store(new) }
    /// Returns the value prior to the attempt, which equals current on success.
    #[inline]
    pub fn compare_and_set(&self, current: T, new: T) -> T {
        match self.object.compare_exchange(current, new) {
            Ok(prior) => prior,
            Err(prior) => prior,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    enum Phase {
        A,
        B,
    }

    #[test]
    fn compare_and_set_only_moves_from_current() {
        let p = SharedProtectedObject::new(Phase::A);
        assert_eq!(p.compare_and_set(Phase::B, Phase::A), Phase::A);
        assert_eq!(p.get(), Phase::A);
        assert_eq!(p.compare_and_set(Phase::A, Phase::B), Phase::A);
        assert_eq!(p.get(), Phase::B);
        let q = p.clone();
        q.set(Phase::A);
        assert_eq!(p.get(), Phase::A);
    }
}
