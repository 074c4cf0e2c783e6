use super::*;
use std::cmp::Ordering;
use std::ops::Add;

/// Time is the model time shared by every process under a timed director. It is
/// a plain f64 which can never be NaN, giving it a total order, with a
/// distinguished positive infinity that compares greater than any finite time.
///
/// Time is a value type, there are no error conditions, other than constructing
/// it from a NaN, which is a programming error and panics.
#[derive(Copy, Clone)]
pub struct Time(f64);

impl Time {
    /// The start of every run.
    pub const ZERO: Time = Time(0.0);
    /// Later than any finite time.
    pub const POSITIVE_INFINITY: Time = Time(f64::INFINITY);

    // new normalizes -0.0, so that equality and ordering agree
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            panic!("Time can not be constructed from NaN.");
        }
        if value == 0.0 {
            Self::ZERO
        } else {
            Self(value)
        }
    }

    /// Like new, but None for a NaN.
    pub fn try_new(value: f64) -> Option<Self> {
        if value.is_nan() {
            None
        } else {
            Some(Self::new(value))
        }
    }

    /// Adds a duration, None if the duration or the result is NaN.
    pub fn checked_add(self, duration: f64) -> Option<Self> {
        if duration.is_nan() {
            None
        } else if self.is_infinite() {
            Some(self)
        } else {
            Self::try_new(self.0 + duration)
        }
    }

    #[inline]
    pub const fn as_f64(self) -> f64 { self.0 }

    #[inline]
    pub fn is_infinite(self) -> bool { self.0 == f64::INFINITY }

    #[inline]
    pub fn is_finite(self) -> bool { self.0.is_finite() }
}

impl Default for Time {
    fn default() -> Self { Self::ZERO }
}

/// Adding a duration to infinity leaves it at infinity.
impl Add<f64> for Time {
    type Output = Time;
    fn add(self, duration: f64) -> Time {
        if self.is_infinite() {
            self
        } else {
            Time::new(self.0 + duration)
        }
    }
}

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl Eq for Time {}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for Time {
    fn cmp(&self, other: &Self) -> Ordering { self.0.total_cmp(&other.0) }
}

impl From<u32> for Time {
    fn from(value: u32) -> Self { Time::new(value as f64) }
}

impl fmt::Debug for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Time({})", self) }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            write!(f, "+inf")
        } else {
            write!(f, "{}", self.0)
        }
    }
}
