use core::{future::Future, time::Duration};

use super::SleepProvider;
use crate::{
    allocator::{IdAllocator, SPIN_INTERVAL},
    error::Result,
    id::SnowflakeId,
    status::IdGenStatus,
    time::TimeSource,
};

/// Extension trait for asynchronously generating IDs.
///
/// Instead of blocking the thread while the allocator is pending, the future
/// awaits the [`SleepProvider`] and retries. The lock is never held across an
/// await point.
pub trait IdAllocatorAsyncExt {
    /// Returns a future that resolves to the next available ID.
    ///
    /// # Errors
    ///
    /// Fails with the same errors as [`IdAllocator::try_generate`].
    fn try_generate_async<S>(&self) -> impl Future<Output = Result<SnowflakeId>>
    where
        S: SleepProvider;
}

impl<T> IdAllocatorAsyncExt for IdAllocator<T>
where
    T: TimeSource + Sync,
{
    fn try_generate_async<S>(&self) -> impl Future<Output = Result<SnowflakeId>>
    where
        S: SleepProvider,
    {
        async {
            loop {
                let dur = match self.try_poll_id()? {
                    IdGenStatus::Ready { id } => return Ok(id),
                    IdGenStatus::Pending { yield_until } => {
                        let wait = yield_until.saturating_sub(self.clock().now_millis());
                        u64::try_from(wait)
                            .ok()
                            .filter(|&ms| ms > 0)
                            .map_or(SPIN_INTERVAL, Duration::from_millis)
                    }
                };
                S::sleep_for(dur).await;
            }
        }
    }
}
