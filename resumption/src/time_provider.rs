//! The library's source of time.

use core::fmt::Debug;
use core::time::Duration;
use std::time::SystemTime;

/// A point in time, as nanoseconds since the UNIX epoch.
///
/// Resumption state stores issue times at nanosecond resolution, so this
/// is finer grained than the second-resolution times used elsewhere in TLS.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnixTime(u64);

impl UnixTime {
    /// The current wall time according to the system clock.
    ///
    /// Returns `None` for times before the epoch, or beyond what fits
    /// in 64 bits of nanoseconds.
    pub fn now() -> Option<Self> {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .ok()
            .and_then(Self::since_unix_epoch)
    }

    /// Convert a duration since the epoch.
    pub fn since_unix_epoch(duration: Duration) -> Option<Self> {
        u64::try_from(duration.as_nanos())
            .ok()
            .map(Self)
    }

    /// Construct directly from a nanosecond count.
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Nanoseconds since the epoch.
    pub fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Whole seconds since the epoch.
    pub fn as_secs(&self) -> u64 {
        self.0 / NANOS_PER_SEC
    }
}

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// An object that provides the current time.
///
/// This is used to timestamp issued tickets, to check the age of a ticket
/// being resumed, and to drive ticket key rotation.  Supply a fixed
/// implementation to make those decisions deterministic.
pub trait TimeProvider: Debug + Send + Sync {
    /// Returns the current wall time.
    ///
    /// This is not required to be monotonic.
    ///
    /// Return `None` if unable to retrieve the time.
    fn current_time(&self) -> Option<UnixTime>;
}

#[derive(Debug)]
/// Default `TimeProvider` implementation that uses `std`
pub struct DefaultTimeProvider;

impl TimeProvider for DefaultTimeProvider {
    fn current_time(&self) -> Option<UnixTime> {
        UnixTime::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_truncate() {
        let t = UnixTime::from_nanos(283686952306183);
        assert_eq!(t.as_secs(), 283686);
        assert_eq!(t.as_nanos(), 283686952306183);
    }

    #[test]
    fn since_unix_epoch_overflow() {
        assert_eq!(
            UnixTime::since_unix_epoch(Duration::from_secs(10)),
            Some(UnixTime::from_nanos(10 * NANOS_PER_SEC))
        );
        assert_eq!(UnixTime::since_unix_epoch(Duration::MAX), None);
    }

    #[test]
    fn default_provider_is_after_2020() {
        let now = DefaultTimeProvider.current_time().unwrap();
        assert!(now.as_secs() > 1_577_836_800);
    }
}
