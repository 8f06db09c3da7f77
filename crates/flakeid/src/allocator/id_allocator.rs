use core::{cmp::Ordering, fmt, time::Duration};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    allocator::{Mutex, MutexGuard},
    error::{Error, Result},
    id::SnowflakeId,
    status::IdGenStatus,
    time::{TimeSource, WallClock},
};

/// How long a blocked caller sleeps between clock samples while waiting for
/// the next millisecond or for the clock to pass the epoch.
pub const SPIN_INTERVAL: Duration = Duration::from_micros(100);

/// A lock-based Snowflake ID allocator suitable for multi-threaded
/// environments.
///
/// The allocator owns a `(datacenter, worker)` identity and the state of the
/// last issued ID. Every allocation attempt samples the clock and updates that
/// state inside a single critical section, so concurrent callers never observe
/// a partial update.
///
/// ## Features
/// - ✅ Thread-safe (`Send + Sync` when the clock is)
/// - ✅ Unique across allocators with distinct identities
/// - ✅ Strictly increasing while the clock moves forward
///
/// ## Clock regression
///
/// A clock that steps backwards is not rejected: the smaller timestamp is
/// accepted as a new millisecond and the sequence restarts at zero. IDs issued
/// right after the step can therefore sort before IDs issued just before it,
/// until the clock catches up again.
///
/// ## See Also
/// - [`generate_id`] for the process-wide allocator
///
/// [`generate_id`]: crate::generate_id
pub struct IdAllocator<T = WallClock>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<SnowflakeId>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<SnowflakeId>,
    datacenter_id: u64,
    worker_id: u64,
    time: T,
}

impl IdAllocator<WallClock> {
    /// Creates an allocator for the given identity, reading time from a
    /// [`WallClock`] anchored at [`DEFAULT_EPOCH`].
    ///
    /// The last timestamp and the sequence both start at zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDatacenterId`] or [`Error::InvalidWorkerId`] if
    /// either value is outside `0..=31`. No allocator is created in that case.
    ///
    /// # Example
    /// ```
    /// use flakeid::{Error, IdAllocator};
    ///
    /// let allocator = IdAllocator::new(1, 1).unwrap();
    /// let id = allocator.generate();
    /// assert_ne!(id, 0);
    ///
    /// assert!(matches!(
    ///     IdAllocator::new(32, 0),
    ///     Err(Error::InvalidDatacenterId { value: 32 })
    /// ));
    /// ```
    ///
    /// [`DEFAULT_EPOCH`]: crate::DEFAULT_EPOCH
    pub fn new(datacenter_id: i64, worker_id: i64) -> Result<Self> {
        Self::with_clock(datacenter_id, worker_id, WallClock::default())
    }
}

impl<T> IdAllocator<T>
where
    T: TimeSource,
{
    /// Creates an allocator for the given identity that reads time from
    /// `time`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDatacenterId`] or [`Error::InvalidWorkerId`] if
    /// either value is outside `0..=31`.
    pub fn with_clock(datacenter_id: i64, worker_id: i64, time: T) -> Result<Self> {
        let datacenter_id = u64::try_from(datacenter_id)
            .ok()
            .filter(|&id| id <= SnowflakeId::MAX_DATACENTER_ID)
            .ok_or(Error::InvalidDatacenterId {
                value: datacenter_id,
            })?;
        let worker_id = u64::try_from(worker_id)
            .ok()
            .filter(|&id| id <= SnowflakeId::MAX_WORKER_ID)
            .ok_or(Error::InvalidWorkerId { value: worker_id })?;
        Ok(Self::from_identity(datacenter_id, worker_id, time))
    }

    /// Builds an allocator from an identity that is already known to fit its
    /// fields.
    pub(crate) fn from_identity(datacenter_id: u64, worker_id: u64, time: T) -> Self {
        debug_assert!(datacenter_id <= SnowflakeId::MAX_DATACENTER_ID);
        debug_assert!(worker_id <= SnowflakeId::MAX_WORKER_ID);
        let id = SnowflakeId::from_components(0, datacenter_id, worker_id, 0);
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(Mutex::new(id)),
            #[cfg(not(feature = "cache-padded"))]
            state: Mutex::new(id),
            datacenter_id,
            worker_id,
            time,
        }
    }

    /// The datacenter ID stamped into every ID.
    pub fn datacenter_id(&self) -> u64 {
        self.datacenter_id
    }

    /// The worker ID stamped into every ID.
    pub fn worker_id(&self) -> u64 {
        self.worker_id
    }

    /// The time source this allocator samples.
    pub fn clock(&self) -> &T {
        &self.time
    }

    /// Generates the next ID, blocking while the current millisecond is
    /// exhausted or the clock reads before the epoch.
    ///
    /// # Panics
    ///
    /// Panics if the clock has run past the 41-bit timestamp range. There is
    /// no valid ID to return at that point and continuing would break the
    /// uniqueness guarantee; the epoch has to be rotated. Use
    /// [`IdAllocator::try_generate`] to handle the condition as a value.
    ///
    /// # Example
    /// ```
    /// use flakeid::{IdAllocator, SnowflakeId};
    ///
    /// let allocator = IdAllocator::new(3, 9).unwrap();
    /// let id = SnowflakeId::from_raw(allocator.generate());
    /// assert_eq!(id.datacenter_id(), 3);
    /// assert_eq!(id.worker_id(), 9);
    /// ```
    pub fn generate(&self) -> u64 {
        match self.try_generate() {
            Ok(id) => id.to_raw(),
            Err(e) => panic!("unable to generate id: {e}"),
        }
    }

    /// Generates the next ID with fallible error handling.
    ///
    /// Blocks the calling thread in [`SPIN_INTERVAL`] sleeps while the
    /// allocator is pending. The lock is not held while sleeping.
    ///
    /// # Errors
    ///
    /// - [`Error::TimestampOverflow`] if the clock is past the 41-bit range.
    /// - [`Error::LockPoisoned`] if another thread panicked while holding the
    ///   lock (std mutex only).
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_generate(&self) -> Result<SnowflakeId> {
        loop {
            match self.try_poll_id()? {
                IdGenStatus::Ready { id } => return Ok(id),
                IdGenStatus::Pending { yield_until } => {
                    while self.time.now_millis() < yield_until {
                        std::thread::sleep(SPIN_INTERVAL);
                    }
                }
            }
        }
    }

    /// Makes a single, non-blocking allocation attempt.
    ///
    /// # Returns
    /// - `Ok(IdGenStatus::Ready { id })`: a new ID was issued
    /// - `Ok(IdGenStatus::Pending { yield_until })`: retry once the clock
    ///   reads at least `yield_until`
    ///
    /// # Errors
    /// - [`Error::TimestampOverflow`] if the clock is past the 41-bit range.
    /// - [`Error::LockPoisoned`] if the lock is poisoned (std mutex only).
    ///
    /// # Example
    /// ```
    /// use flakeid::{IdAllocator, IdGenStatus};
    ///
    /// let allocator = IdAllocator::new(0, 0).unwrap();
    /// let id = loop {
    ///     match allocator.try_poll_id().unwrap() {
    ///         IdGenStatus::Ready { id } => break id,
    ///         IdGenStatus::Pending { .. } => std::thread::yield_now(),
    ///     }
    /// };
    /// assert_eq!(id.worker_id(), 0);
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<IdGenStatus> {
        let mut id = self.lock()?;

        // Sampled under the lock: a timestamp read before another caller's
        // update would look like a clock regression.
        let now = self.time.now_millis();
        if now < 0 {
            return Ok(Self::cold_before_epoch(now));
        }
        if now as u64 > SnowflakeId::MAX_TIMESTAMP {
            return Err(Self::cold_overflow(now));
        }
        let now = now as u64;

        let last = id.timestamp();
        match now.cmp(&last) {
            Ordering::Equal => {
                if id.has_sequence_room() {
                    *id = id.increment_sequence();
                    Ok(IdGenStatus::Ready { id: *id })
                } else {
                    Ok(IdGenStatus::Pending {
                        yield_until: last as i64 + 1,
                    })
                }
            }
            Ordering::Greater => {
                *id = id.rollover_to_timestamp(now);
                Ok(IdGenStatus::Ready { id: *id })
            }
            Ordering::Less => {
                Self::cold_clock_behind(now, last);
                *id = id.rollover_to_timestamp(now);
                Ok(IdGenStatus::Ready { id: *id })
            }
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, SnowflakeId>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_before_epoch(_now: i64) -> IdGenStatus {
        #[cfg(feature = "tracing")]
        tracing::debug!(now = _now, "clock reads before the epoch, waiting");
        IdGenStatus::Pending { yield_until: 0 }
    }

    #[cold]
    #[inline(never)]
    fn cold_overflow(now: i64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::error!(now, "timestamp overflows the 41-bit field");
        Error::TimestampOverflow { timestamp: now }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(_now: u64, _last: u64) {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            now = _now,
            last = _last,
            behind_ms = _last - _now,
            "clock moved backwards, accepting the earlier timestamp"
        );
    }
}

impl<T> fmt::Debug for IdAllocator<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdAllocator")
            .field("datacenter_id", &self.datacenter_id)
            .field("worker_id", &self.worker_id)
            .finish_non_exhaustive()
    }
}
