use core::{future::Future, time::Duration};

use crate::{
    allocator::IdAllocator,
    error::Result,
    futures::{IdAllocatorAsyncExt, SleepProvider},
    id::SnowflakeId,
    time::TimeSource,
};

/// An implementation of [`SleepProvider`] using Smol's timer.
pub struct SmolSleep;
impl SleepProvider for SmolSleep {
    async fn sleep_for(dur: Duration) {
        ::smol::Timer::after(dur).await;
    }
}

/// An implementation of [`SleepProvider`] using Smol's yield.
///
/// Yielding avoids timer-based delays at the cost of tighter polling loops
/// and more CPU under load. Prefer [`SmolSleep`] in highly concurrent cases.
pub struct SmolYield;
impl SleepProvider for SmolYield {
    async fn sleep_for(_dur: Duration) {
        ::smol::future::yield_now().await;
    }
}

/// Convenience methods that use [`SmolSleep`] as the sleep provider.
pub trait IdAllocatorAsyncSmolExt {
    /// Returns a future that resolves to the next ID using [`SmolSleep`].
    ///
    /// # Errors
    ///
    /// Fails with the same errors as [`IdAllocator::try_generate`].
    fn try_generate_smol(&self) -> impl Future<Output = Result<SnowflakeId>>;
}

impl<T> IdAllocatorAsyncSmolExt for IdAllocator<T>
where
    T: TimeSource + Sync,
{
    fn try_generate_smol(&self) -> impl Future<Output = Result<SnowflakeId>> {
        <Self as IdAllocatorAsyncExt>::try_generate_async::<SmolSleep>(self)
    }
}
