use core::{future::Future, time::Duration};

use crate::{
    allocator::IdAllocator,
    error::Result,
    futures::{IdAllocatorAsyncExt, SleepProvider},
    id::SnowflakeId,
    time::TimeSource,
};

/// An implementation of [`SleepProvider`] using Tokio's timer.
///
/// This is the default provider for use in async applications built on Tokio.
pub struct TokioSleep;
impl SleepProvider for TokioSleep {
    async fn sleep_for(dur: Duration) {
        ::tokio::time::sleep(dur).await;
    }
}

/// An implementation of [`SleepProvider`] using Tokio's yield.
///
/// This strategy avoids timer-based delays by yielding to the scheduler
/// immediately, which can improve responsiveness in low-concurrency scenarios.
///
/// However, it comes at the cost of more frequent rescheduling, which can
/// result in tighter polling loops and increased CPU usage under load. In
/// highly concurrent cases, a timer-based sleep (e.g., [`TokioSleep`]) is often
/// more efficient due to reduced scheduler churn.
pub struct TokioYield;
impl SleepProvider for TokioYield {
    async fn sleep_for(_dur: Duration) {
        ::tokio::task::yield_now().await;
    }
}

/// Convenience methods that use [`TokioSleep`] as the sleep provider.
pub trait IdAllocatorAsyncTokioExt {
    /// Returns a future that resolves to the next ID as a raw `u64`.
    ///
    /// # Panics
    ///
    /// Panics on timestamp overflow, like [`IdAllocator::generate`].
    fn generate_async(&self) -> impl Future<Output = u64>;

    /// Returns a future that resolves to the next ID using [`TokioSleep`].
    ///
    /// # Errors
    ///
    /// Fails with the same errors as [`IdAllocator::try_generate`].
    fn try_generate_tokio(&self) -> impl Future<Output = Result<SnowflakeId>>;
}

impl<T> IdAllocatorAsyncTokioExt for IdAllocator<T>
where
    T: TimeSource + Sync,
{
    fn generate_async(&self) -> impl Future<Output = u64> {
        async {
            match self.try_generate_tokio().await {
                Ok(id) => id.to_raw(),
                Err(e) => panic!("unable to generate id: {e}"),
            }
        }
    }

    fn try_generate_tokio(&self) -> impl Future<Output = Result<SnowflakeId>> {
        <Self as IdAllocatorAsyncExt>::try_generate_async::<TokioSleep>(self)
    }
}
