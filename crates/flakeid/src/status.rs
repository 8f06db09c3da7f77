use crate::id::SnowflakeId;

/// Represents the result of a single, non-blocking allocation attempt.
///
/// This type models the outcome of [`IdAllocator::try_poll_id`]:
///
/// - [`IdGenStatus::Ready`] indicates a new ID was successfully generated.
/// - [`IdGenStatus::Pending`] means the allocator cannot produce an ID until
///   the clock reaches `yield_until`, either because the current millisecond's
///   sequence is exhausted or because the clock still reads before the epoch.
///
/// # Example
///
/// ```
/// use flakeid::{IdAllocator, IdGenStatus, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn now_millis(&self) -> i64 {
///         -3
///     }
/// }
///
/// let allocator = IdAllocator::with_clock(1, 1, FixedTime).unwrap();
/// match allocator.try_poll_id().unwrap() {
///     IdGenStatus::Ready { id } => println!("ID: {id}"),
///     IdGenStatus::Pending { yield_until } => assert_eq!(yield_until, 0),
/// }
/// ```
///
/// [`IdAllocator::try_poll_id`]: crate::IdAllocator::try_poll_id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: SnowflakeId,
    },
    /// No ID could be generated right now.
    ///
    /// Wait until the clock reads at least `yield_until` (milliseconds since
    /// the epoch) before trying again.
    Pending {
        /// The first timestamp (inclusive) at which a retry can succeed.
        yield_until: i64,
    },
}
