use core::{future::Future, time::Duration};

/// A trait that abstracts over how to sleep for a given [`Duration`] in async
/// contexts.
///
/// This allows the allocator to be generic over runtimes like `Tokio` or
/// `Smol`.
pub trait SleepProvider {
    /// The returned future must be `Send` so that callers can hold it across
    /// threads.
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send;
}
