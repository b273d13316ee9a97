//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use cgmath::num_traits::Float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: std::cmp::PartialOrd> Interval<T> {
    /// Returns true if this interval overlaps with the other.
    /// Intervals which merely touch do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.max > other.min && other.max > self.min
    }

    /// Returns true if this interval contains the value.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

impl<T: Float> Interval<T> {
    /// Computes the gap between two intervals.
    /// Will be negative if the intervals overlap.
    pub fn clearance_with(&self, other: &Self) -> T {
        T::max(other.min - self.max, self.min - other.max)
    }

    /// Restricts this interval to lie within the other.
    pub fn clamp_to(&self, other: &Self) -> Self {
        Self {
            min: T::max(self.min, other.min),
            max: T::min(self.max, other.max),
        }
    }

    /// The smallest interval containing both intervals.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: T::min(self.min, other.min),
            max: T::max(self.max, other.max),
        }
    }
}

impl<T: Float> std::ops::Add<T> for Interval<T> {
    type Output = Interval<T>;

    fn add(self, rhs: T) -> Self::Output {
        Self {
            min: self.min + rhs,
            max: self.max + rhs,
        }
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

#[cfg(test)]
mod test {
    use super::Interval;

    #[test]
    fn touching_intervals_do_not_overlap() {
        let a = Interval::new(0.0, 2.0);
        assert!(a.overlaps(&Interval::new(1.0, 3.0)));
        assert!(!a.overlaps(&Interval::new(2.0, 3.0)));
        assert!(!a.overlaps(&Interval::new(-1.0, 0.0)));
    }

    #[test]
    fn clearance_and_clamping() {
        let a = Interval::new(2.0, 3.0);
        assert_eq!(a.clearance_with(&Interval::new(4.0, 5.0)), 1.0);
        assert_eq!(a.clearance_with(&Interval::new(2.5, 5.0)), -0.5);
        assert_eq!(
            Interval::new(0.0, 10.0).clamp_to(&Interval::new(4.0, 12.0)),
            Interval::new(4.0, 10.0)
        );
        assert_eq!(a.union(&Interval::new(4.0, 5.0)), Interval::new(2.0, 5.0));
        assert_eq!(a + 1.0, Interval::new(3.0, 4.0));
    }
}
