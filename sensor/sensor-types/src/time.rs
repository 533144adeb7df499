//! Capture-clock time.
//!
//! The decoder stamps each detection with its frame's capture time and the
//! render tick reads "now" from the same monotonic nanosecond clock, so both
//! are plain [`Timestamp`]s. Differences between them are [`Duration`]s.
//! Both serialize as bare nanosecond counts.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const NANOS_PER_SEC: f64 = 1e9;

#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
fn nanos_from_secs(secs: f64) -> u64 {
    // `as` saturates: NaN and negatives become 0, overflow becomes u64::MAX.
    (secs * NANOS_PER_SEC).round() as u64
}

#[allow(clippy::cast_precision_loss)]
fn secs_from_nanos(nanos: u64) -> f64 {
    nanos as f64 / NANOS_PER_SEC
}

/// Instant on the device's monotonic clock, in nanoseconds.
///
/// ```
/// use sensor_types::Timestamp;
///
/// let captured = Timestamp::from_secs_f64(1.5);
/// assert_eq!(captured, Timestamp::from_nanos(1_500_000_000));
/// assert!((captured.as_secs_f64() - 1.5).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Timestamp(u64);

impl Timestamp {
    /// Clock origin.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Wraps a nanosecond count.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Wraps a signed nanosecond count as carried on the decoder wire.
    ///
    /// `None` for negative values.
    ///
    /// ```
    /// use sensor_types::Timestamp;
    ///
    /// assert_eq!(Timestamp::from_signed_nanos(42), Some(Timestamp::from_nanos(42)));
    /// assert!(Timestamp::from_signed_nanos(-1).is_none());
    /// ```
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn from_signed_nanos(nanos: i64) -> Option<Self> {
        if nanos < 0 {
            return None;
        }
        Some(Self(nanos as u64))
    }

    /// Converts from seconds, rounding to the nearest nanosecond. Times
    /// before the origin clamp to it.
    #[must_use]
    pub fn from_secs_f64(secs: f64) -> Self {
        Self(nanos_from_secs(secs))
    }

    /// Nanoseconds since the clock origin.
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    /// Seconds since the clock origin, the unit pose history is keyed by.
    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        secs_from_nanos(self.0)
    }

    /// `self + duration`, stopping at the end of the clock.
    #[must_use]
    pub const fn saturating_add(self, duration: Duration) -> Self {
        Self(self.0.saturating_add(duration.0))
    }

    /// Time from `earlier` to `self`; zero if `earlier` is in fact later.
    ///
    /// ```
    /// use sensor_types::{Duration, Timestamp};
    ///
    /// let seen = Timestamp::from_nanos(300);
    /// let now = Timestamp::from_nanos(1000);
    /// assert_eq!(now.saturating_since(seen), Duration::from_nanos(700));
    /// assert_eq!(seen.saturating_since(now), Duration::zero());
    /// ```
    #[must_use]
    pub const fn saturating_since(self, earlier: Self) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }
}

/// Span between two [`Timestamp`]s, in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Duration(u64);

impl Duration {
    /// No time at all.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Wraps a nanosecond count.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Whole seconds.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1_000_000_000))
    }

    /// Converts from seconds, rounding to the nearest nanosecond. Negative
    /// spans clamp to zero.
    ///
    /// ```
    /// use sensor_types::Duration;
    ///
    /// assert_eq!(Duration::from_secs_f64(0.5), Duration::from_nanos(500_000_000));
    /// assert_eq!(Duration::from_secs_f64(-1.0), Duration::zero());
    /// ```
    #[must_use]
    pub fn from_secs_f64(secs: f64) -> Self {
        Self(nanos_from_secs(secs))
    }

    /// Length in nanoseconds.
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    /// Length in seconds.
    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        secs_from_nanos(self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn secs_roundtrip_rounds_to_nanos() {
        let ts = Timestamp::from_secs_f64(0.1);
        assert_eq!(ts.as_nanos(), 100_000_000);
        assert_eq!(Timestamp::from_secs_f64(ts.as_secs_f64()), ts);
    }

    #[test]
    fn negative_and_nan_secs_clamp_to_origin() {
        assert_eq!(Timestamp::from_secs_f64(-3.0), Timestamp::zero());
        assert_eq!(Timestamp::from_secs_f64(f64::NAN), Timestamp::zero());
        assert_eq!(Duration::from_secs_f64(-0.25), Duration::zero());
    }

    #[test]
    fn signed_wire_nanos() {
        assert_eq!(Timestamp::from_signed_nanos(0), Some(Timestamp::zero()));
        assert_eq!(
            Timestamp::from_signed_nanos(i64::MAX).map(Timestamp::as_nanos),
            Some(i64::MAX.unsigned_abs())
        );
        assert!(Timestamp::from_signed_nanos(i64::MIN).is_none());
    }

    #[test]
    fn add_saturates_at_clock_end() {
        let late = Timestamp::from_nanos(u64::MAX - 1);
        assert_eq!(
            late.saturating_add(Duration::from_secs(1)),
            Timestamp::from_nanos(u64::MAX)
        );
        assert_eq!(
            Timestamp::zero().saturating_add(Duration::from_secs(2)),
            Timestamp::from_nanos(2_000_000_000)
        );
    }

    #[test]
    fn since_never_goes_negative() {
        let seen = Timestamp::from_secs_f64(1.0);
        let now = Timestamp::from_secs_f64(3.5);
        assert_eq!(now.saturating_since(seen), Duration::from_secs_f64(2.5));
        assert_eq!(seen.saturating_since(now), Duration::zero());
    }

    #[test]
    fn durations_order_for_timeout_checks() {
        let timeout = Duration::from_secs(2);
        assert!(Duration::from_secs_f64(2.001) > timeout);
        assert!(Duration::from_secs_f64(1.999) < timeout);
        assert!((Duration::from_secs(2).as_secs_f64() - 2.0).abs() < 1e-12);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_bare_nanos() {
        let ts = Timestamp::from_nanos(1_500_000_000);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "1500000000");
        let back: Timestamp = serde_json::from_str("1500000000").unwrap();
        assert_eq!(back, ts);
        assert_eq!(serde_json::to_string(&Duration::from_nanos(7)).unwrap(), "7");
    }
}
