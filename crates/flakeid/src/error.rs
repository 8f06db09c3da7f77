/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `flakeid` can emit.
///
/// Identity errors are raised once, at construction, and prevent an allocator
/// from existing at all. [`Error::TimestampOverflow`] is fatal: the epoch must
/// be rotated before any more IDs can be issued.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The datacenter ID does not fit the 5-bit datacenter field.
    #[error("datacenter id {value} is out of range (0..=31)")]
    InvalidDatacenterId { value: i64 },

    /// The worker ID does not fit the 5-bit worker field.
    #[error("worker id {value} is out of range (0..=31)")]
    InvalidWorkerId { value: i64 },

    /// The clock is past the last millisecond representable in the 41-bit
    /// timestamp field.
    #[error("timestamp {timestamp} overflows the 41-bit field; rotate the epoch")]
    TimestampOverflow { timestamp: i64 },

    /// The process-wide allocator was already installed.
    #[error("the global allocator is already initialized")]
    AlreadyInitialized,

    /// A byte encoding was not a 16-byte, zero-padded big-endian ID.
    #[error("invalid padded id encoding ({len} bytes)")]
    InvalidEncoding { len: usize },

    /// The operation failed because the lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is not available.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("the allocator lock was poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use crate::allocator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
