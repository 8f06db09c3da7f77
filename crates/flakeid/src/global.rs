use std::sync::OnceLock;

use crate::{
    allocator::IdAllocator,
    config::{DEFAULT_DATACENTER_ID, DEFAULT_WORKER_ID},
    error::{Error, Result},
    time::WallClock,
};

static GLOBAL: OnceLock<IdAllocator> = OnceLock::new();

/// Installs the process-wide allocator with the given identity.
///
/// Call this once at startup, before anything calls [`generate_id`]. If the
/// allocator was already installed (by an earlier call, or lazily by
/// [`generate_id`]/[`global`]) the existing one is left untouched.
///
/// # Errors
///
/// - [`Error::InvalidDatacenterId`] / [`Error::InvalidWorkerId`] for an
///   out-of-range identity.
/// - [`Error::AlreadyInitialized`] if the global allocator already exists.
pub fn init_global(datacenter_id: i64, worker_id: i64) -> Result<&'static IdAllocator> {
    let allocator = IdAllocator::new(datacenter_id, worker_id)?;
    let mut installed = false;
    let global = GLOBAL.get_or_init(|| {
        installed = true;
        allocator
    });
    if installed {
        #[cfg(feature = "tracing")]
        tracing::info!(datacenter_id, worker_id, "installed global id allocator");
        Ok(global)
    } else {
        Err(Error::AlreadyInitialized)
    }
}

/// Returns the process-wide allocator, creating it with the default identity
/// `(1, 1)` if nothing was installed.
///
/// Concurrent first callers construct it exactly once.
pub fn global() -> &'static IdAllocator {
    GLOBAL.get_or_init(|| {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            datacenter_id = DEFAULT_DATACENTER_ID,
            worker_id = DEFAULT_WORKER_ID,
            "no global id allocator configured, using the default identity"
        );
        IdAllocator::from_identity(
            DEFAULT_DATACENTER_ID as u64,
            DEFAULT_WORKER_ID as u64,
            WallClock::default(),
        )
    })
}

/// Generates an ID from the process-wide allocator.
///
/// # Panics
///
/// Panics if the clock has run past the 41-bit timestamp range (see
/// [`IdAllocator::generate`]).
///
/// # Example
/// ```
/// let a = flakeid::generate_id();
/// let b = flakeid::generate_id();
/// assert!(b > a);
/// ```
pub fn generate_id() -> u64 {
    global().generate()
}
