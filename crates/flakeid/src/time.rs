use core::time::Duration;
use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

/// Default epoch: Wednesday, January 1, 2025 00:00:00 UTC+08:00
///
/// This is the origin IDs have always been issued against, so existing IDs
/// keep decoding to the right instant.
pub const DEFAULT_EPOCH: Duration = Duration::from_millis(1_735_660_800_000);

/// Wednesday, January 1, 2025 00:00:00 UTC
pub const UTC_2025_EPOCH: Duration = Duration::from_millis(1_735_689_600_000);

/// A trait for time sources that return a wall-clock timestamp.
///
/// The value is **milliseconds** relative to the source's epoch. It is signed
/// because a misconfigured clock can read before the epoch, and it is allowed
/// to move backwards (e.g. when NTP steps the clock).
///
/// This abstraction allows you to plug in the system clock or a mocked time
/// source in tests.
///
/// # Example
///
/// ```
/// use flakeid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn now_millis(&self) -> i64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.now_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn now_millis(&self) -> i64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}

/// A time source backed by [`SystemTime`], offset by a fixed epoch.
///
/// Every call samples the system clock, so wall-clock adjustments are
/// visible to the allocator, including backward steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallClock {
    epoch: Duration,
}

impl Default for WallClock {
    /// Constructs a wall clock aligned to [`DEFAULT_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(DEFAULT_EPOCH)
    }
}

impl WallClock {
    /// Constructs a wall clock using `epoch` (a [`Duration`] since
    /// 1970-01-01 UTC) as the origin.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::{Duration, SystemTime, UNIX_EPOCH};
    /// use flakeid::{TimeSource, WallClock};
    ///
    /// let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
    /// let clock = WallClock::with_epoch(now - Duration::from_secs(1));
    ///
    /// let ts = clock.now_millis();
    /// assert!(ts >= 1000);
    /// ```
    pub const fn with_epoch(epoch: Duration) -> Self {
        Self { epoch }
    }

    /// The origin of this clock.
    pub const fn epoch(&self) -> Duration {
        self.epoch
    }
}

impl TimeSource for WallClock {
    fn now_millis(&self) -> i64 {
        let epoch = self.epoch.as_millis() as i64;
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since) => since.as_millis() as i64 - epoch,
            // The system clock reads before 1970; report how far back.
            Err(e) => -(e.duration().as_millis() as i64) - epoch,
        }
    }
}
