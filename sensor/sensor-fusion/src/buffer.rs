//! Bounded history of timestamped samples.

use std::collections::VecDeque;

use crate::error::{FusionError, Result};

/// One buffered sample: a value and the capture-clock second it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<T> {
    /// Seconds on the capture clock.
    pub time: f64,
    /// The sampled value.
    pub value: T,
}

/// Where a query time falls among the buffered samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bracket<'a, T> {
    /// The query hits a sample, or the buffer has only one sample there.
    Exact(&'a Sample<T>),
    /// The query lies strictly between two neighbouring samples.
    Between(&'a Sample<T>, &'a Sample<T>),
}

/// Fixed-capacity, time-ordered sample history.
///
/// Holds the newest `capacity` samples; recording into a full buffer drops
/// the oldest. Times must not go backwards.
///
/// ```
/// use sensor_fusion::{Bracket, StreamBuffer};
///
/// let mut buffer = StreamBuffer::new(2);
/// buffer.push(0.0, 'a').unwrap();
/// buffer.push(0.1, 'b').unwrap();
/// buffer.push(0.2, 'c').unwrap();
///
/// assert_eq!(buffer.window(), Some((0.1, 0.2)));
/// assert!(matches!(buffer.bracket(0.15), Some(Bracket::Between(b, c)) if b.value == 'b' && c.value == 'c'));
/// assert!(buffer.bracket(0.05).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct StreamBuffer<T> {
    capacity: usize,
    samples: VecDeque<Sample<T>>,
}

impl<T> StreamBuffer<T> {
    /// Creates an empty buffer retaining at most `capacity` samples (at
    /// least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    /// Maximum number of retained samples.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of retained samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drops every sample.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Records `value` at `time`, dropping the oldest sample when full.
    ///
    /// # Errors
    ///
    /// [`FusionError::NonFiniteTimestamp`] for a `NaN` or infinite time and
    /// [`FusionError::OutOfOrder`] for a time before the newest sample. The
    /// buffer is unchanged on error.
    pub fn push(&mut self, time: f64, value: T) -> Result<()> {
        if !time.is_finite() {
            return Err(FusionError::NonFiniteTimestamp(time));
        }
        if let Some(latest) = self.samples.back().map(|s| s.time) {
            if time < latest {
                return Err(FusionError::OutOfOrder {
                    timestamp: time,
                    latest,
                });
            }
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(Sample { time, value });
        Ok(())
    }

    /// Newest sample.
    #[must_use]
    pub fn latest(&self) -> Option<&Sample<T>> {
        self.samples.back()
    }

    /// `(oldest, newest)` sample times.
    #[must_use]
    pub fn window(&self) -> Option<(f64, f64)> {
        Some((self.samples.front()?.time, self.samples.back()?.time))
    }

    /// Locates `time` among the samples. `None` outside [`window`](Self::window).
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn bracket(&self, time: f64) -> Option<Bracket<'_, T>> {
        let (oldest, newest) = self.window()?;
        if !(oldest..=newest).contains(&time) {
            return None;
        }
        // First sample at or after `time`; exists because time <= newest.
        let after = self.samples.partition_point(|s| s.time < time);
        let hit = self.samples.get(after)?;
        if hit.time == time || after == 0 {
            return Some(Bracket::Exact(hit));
        }
        Some(Bracket::Between(self.samples.get(after - 1)?, hit))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::similar_names
)]
mod tests {
    use super::*;

    fn seq(times: &[f64]) -> StreamBuffer<usize> {
        let mut buffer = StreamBuffer::new(16);
        for (i, t) in times.iter().enumerate() {
            buffer.push(*t, i).unwrap();
        }
        buffer
    }

    fn values(bracket: Option<Bracket<'_, usize>>) -> Option<(usize, usize)> {
        match bracket? {
            Bracket::Exact(s) => Some((s.value, s.value)),
            Bracket::Between(a, b) => Some((a.value, b.value)),
        }
    }

    #[test]
    fn zero_capacity_holds_one() {
        let mut buffer = StreamBuffer::new(0);
        assert_eq!(buffer.capacity(), 1);
        buffer.push(0.0, 1).unwrap();
        buffer.push(1.0, 2).unwrap();
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.latest().unwrap().value, 2);
    }

    #[test]
    fn full_buffer_drops_oldest() {
        let mut buffer = StreamBuffer::new(3);
        for (i, t) in [0.0, 0.1, 0.2, 0.3].into_iter().enumerate() {
            buffer.push(t, i).unwrap();
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.window(), Some((0.1, 0.3)));
    }

    #[test]
    fn rejects_time_going_backwards() {
        let mut buffer = seq(&[1.0, 2.0]);
        let err = buffer.push(1.5, 9).unwrap_err();
        assert!(matches!(err, FusionError::OutOfOrder { latest, .. } if latest == 2.0));
        assert_eq!(buffer.len(), 2);

        // Repeated times are fine.
        buffer.push(2.0, 9).unwrap();
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn rejects_non_finite_time() {
        let mut buffer = StreamBuffer::new(4);
        assert!(buffer.push(f64::NAN, 0).is_err());
        assert!(buffer.push(f64::NEG_INFINITY, 0).is_err());
        assert!(buffer.is_empty());
        assert!(buffer.window().is_none());
    }

    #[test]
    fn bracket_cases() {
        let buffer = seq(&[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(values(buffer.bracket(1.0)), Some((1, 1)));
        assert_eq!(values(buffer.bracket(1.5)), Some((1, 2)));
        assert_eq!(values(buffer.bracket(0.0)), Some((0, 0)));
        assert_eq!(values(buffer.bracket(3.0)), Some((3, 3)));
        assert_eq!(values(buffer.bracket(-0.5)), None);
        assert_eq!(values(buffer.bracket(3.5)), None);
    }

    #[test]
    fn clear_empties() {
        let mut buffer = seq(&[0.0, 1.0]);
        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.bracket(0.0).is_none());
    }
}
