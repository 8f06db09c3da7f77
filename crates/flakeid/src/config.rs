use crate::{
    allocator::IdAllocator,
    error::{Error, Result},
    time::{TimeSource, WallClock},
};

/// Datacenter ID used when nothing else is configured.
pub const DEFAULT_DATACENTER_ID: i64 = 1;

/// Worker ID used when nothing else is configured.
pub const DEFAULT_WORKER_ID: i64 = 1;

/// The externally assigned identity of an allocator.
///
/// The host application decides how each process gets a distinct pair (a
/// config file, an orchestrator-provided ordinal, ...) and hands it over in
/// this form. With the `serde` feature it deserializes from any format the
/// application already uses; missing fields fall back to the defaults.
///
/// # Example
///
/// ```
/// use flakeid::{AllocatorConfig, IdAllocator};
///
/// let config = AllocatorConfig { datacenter_id: 2, worker_id: 14 };
/// let allocator: IdAllocator = config.try_into().unwrap();
/// assert_eq!(allocator.worker_id(), 14);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AllocatorConfig {
    /// Deployment zone, `0..=31`.
    pub datacenter_id: i64,
    /// Instance within the datacenter, `0..=31`.
    pub worker_id: i64,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            datacenter_id: DEFAULT_DATACENTER_ID,
            worker_id: DEFAULT_WORKER_ID,
        }
    }
}

impl AllocatorConfig {
    /// Builds a wall-clock allocator for this identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDatacenterId`] or [`Error::InvalidWorkerId`] if
    /// the identity is out of range.
    pub fn build(&self) -> Result<IdAllocator> {
        IdAllocator::new(self.datacenter_id, self.worker_id)
    }

    /// Builds an allocator for this identity on a custom time source.
    ///
    /// # Errors
    ///
    /// Same as [`AllocatorConfig::build`].
    pub fn build_with_clock<T: TimeSource>(&self, time: T) -> Result<IdAllocator<T>> {
        IdAllocator::with_clock(self.datacenter_id, self.worker_id, time)
    }
}

impl TryFrom<AllocatorConfig> for IdAllocator<WallClock> {
    type Error = Error;

    fn try_from(config: AllocatorConfig) -> Result<Self> {
        config.build()
    }
}
