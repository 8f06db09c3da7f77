use core::{fmt, time::Duration};

use crate::error::{Error, Result};

/// A 64-bit Snowflake ID with a datacenter/worker identity.
///
/// - 41 bits timestamp (ms since the allocator's epoch)
/// - 5 bits datacenter ID
/// - 5 bits worker ID
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63             22 21              17 16          12 11             0
///              +----------------+------------------+--------------+---------------+
///  Field:      | timestamp (41) | datacenter (5)   | worker (5)   | sequence (12) |
///              +----------------+------------------+--------------+---------------+
///              |<----- MSB ------------- 64 bits ------------- LSB --------------->|
/// ```
///
/// Ordering follows the raw value, so IDs sort by timestamp first.
///
/// # Example
///
/// ```
/// use flakeid::SnowflakeId;
///
/// let id = SnowflakeId::from_components(5000, 1, 1, 2);
/// assert_eq!(id.to_raw(), (5000 << 22) | (1 << 17) | (1 << 12) | 2);
/// assert_eq!(id.timestamp(), 5000);
/// assert_eq!(id.datacenter_id(), 1);
/// assert_eq!(id.worker_id(), 1);
/// assert_eq!(id.sequence(), 2);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SnowflakeId {
    id: u64,
}

impl SnowflakeId {
    /// Width of the timestamp field.
    pub const TIMESTAMP_BITS: u32 = 41;
    /// Width of the datacenter field.
    pub const DATACENTER_ID_BITS: u32 = 5;
    /// Width of the worker field.
    pub const WORKER_ID_BITS: u32 = 5;
    /// Width of the sequence field.
    pub const SEQUENCE_BITS: u32 = 12;

    /// Bitmask for extracting the 41-bit timestamp field. Occupies bits 22
    /// through 62.
    pub const TIMESTAMP_MASK: u64 = (1 << Self::TIMESTAMP_BITS) - 1;

    /// Bitmask for extracting the 5-bit datacenter field. Occupies bits 17
    /// through 21.
    pub const DATACENTER_ID_MASK: u64 = (1 << Self::DATACENTER_ID_BITS) - 1;

    /// Bitmask for extracting the 5-bit worker field. Occupies bits 12 through
    /// 16.
    pub const WORKER_ID_MASK: u64 = (1 << Self::WORKER_ID_BITS) - 1;

    /// Bitmask for extracting the 12-bit sequence field. Occupies bits 0
    /// through 11.
    pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

    /// Number of bits to shift the timestamp to its position (bit 22).
    pub const TIMESTAMP_SHIFT: u32 =
        Self::DATACENTER_ID_SHIFT + Self::DATACENTER_ID_BITS;

    /// Number of bits to shift the datacenter ID to its position (bit 17).
    pub const DATACENTER_ID_SHIFT: u32 = Self::WORKER_ID_SHIFT + Self::WORKER_ID_BITS;

    /// Number of bits to shift the worker ID to its position (bit 12).
    pub const WORKER_ID_SHIFT: u32 = Self::SEQUENCE_BITS;

    /// Number of bits to shift the sequence field (bit 0).
    pub const SEQUENCE_SHIFT: u32 = 0;

    /// Largest timestamp, about 69.7 years after the epoch.
    pub const MAX_TIMESTAMP: u64 = Self::TIMESTAMP_MASK;
    /// Largest datacenter ID.
    pub const MAX_DATACENTER_ID: u64 = Self::DATACENTER_ID_MASK;
    /// Largest worker ID.
    pub const MAX_WORKER_ID: u64 = Self::WORKER_ID_MASK;
    /// Largest sequence value; 4096 IDs fit in one millisecond.
    pub const MAX_SEQUENCE: u64 = Self::SEQUENCE_MASK;

    /// Size of [`SnowflakeId::to_padded_be_bytes`].
    pub const PADDED_LEN: usize = 16;

    /// Packs the four fields into an ID. Each value is masked to its field
    /// width.
    pub const fn from_components(
        timestamp: u64,
        datacenter_id: u64,
        worker_id: u64,
        sequence: u64,
    ) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let datacenter_id =
            (datacenter_id & Self::DATACENTER_ID_MASK) << Self::DATACENTER_ID_SHIFT;
        let worker_id = (worker_id & Self::WORKER_ID_MASK) << Self::WORKER_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | datacenter_id | worker_id | sequence,
        }
    }

    /// Wraps a raw `u64`.
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns the raw `u64`.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Extracts the timestamp from the packed ID.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the datacenter ID from the packed ID.
    pub const fn datacenter_id(&self) -> u64 {
        (self.id >> Self::DATACENTER_ID_SHIFT) & Self::DATACENTER_ID_MASK
    }

    /// Extracts the worker ID from the packed ID.
    pub const fn worker_id(&self) -> u64 {
        (self.id >> Self::WORKER_ID_SHIFT) & Self::WORKER_ID_MASK
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Milliseconds since the Unix epoch at which this ID was issued, given
    /// the epoch its allocator was configured with.
    pub fn unix_millis(&self, epoch: Duration) -> u128 {
        epoch.as_millis() + u128::from(self.timestamp())
    }

    /// Returns the ID as a zero-padded 20-digit string.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }

    /// Big-endian bytes of the raw value.
    pub const fn to_be_bytes(&self) -> [u8; 8] {
        self.id.to_be_bytes()
    }

    /// Inverse of [`SnowflakeId::to_be_bytes`].
    pub const fn from_be_bytes(bytes: [u8; 8]) -> Self {
        Self::from_raw(u64::from_be_bytes(bytes))
    }

    /// Encodes the ID into a 16-byte field: the big-endian value occupies the
    /// low 8 bytes and the high 8 bytes are zero.
    ///
    /// ```
    /// use flakeid::SnowflakeId;
    ///
    /// let id = SnowflakeId::from_raw(0x0102_0304_0506_0708);
    /// let bytes = id.to_padded_be_bytes();
    /// assert_eq!(&bytes[..8], &[0; 8]);
    /// assert_eq!(&bytes[8..], &[1, 2, 3, 4, 5, 6, 7, 8]);
    /// ```
    pub fn to_padded_be_bytes(&self) -> [u8; Self::PADDED_LEN] {
        let mut buf = [0; Self::PADDED_LEN];
        buf[8..].copy_from_slice(&self.id.to_be_bytes());
        buf
    }

    /// Decodes a 16-byte field produced by [`SnowflakeId::to_padded_be_bytes`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] if `bytes` is not exactly 16 bytes
    /// long or if any of the 8 padding bytes is non-zero.
    pub fn try_from_padded_be_bytes(bytes: &[u8]) -> Result<Self> {
        let invalid = || Error::InvalidEncoding { len: bytes.len() };
        let bytes: &[u8; Self::PADDED_LEN] = bytes.try_into().map_err(|_| invalid())?;
        let (padding, value) = bytes.split_at(8);
        if padding.iter().any(|&b| b != 0) {
            return Err(invalid());
        }
        let value: [u8; 8] = value.try_into().map_err(|_| invalid())?;
        Ok(Self::from_be_bytes(value))
    }

    pub(crate) const fn has_sequence_room(&self) -> bool {
        self.sequence() < Self::MAX_SEQUENCE
    }

    pub(crate) const fn increment_sequence(&self) -> Self {
        Self::from_components(
            self.timestamp(),
            self.datacenter_id(),
            self.worker_id(),
            self.sequence() + 1,
        )
    }

    pub(crate) const fn rollover_to_timestamp(&self, ts: u64) -> Self {
        Self::from_components(ts, self.datacenter_id(), self.worker_id(), 0)
    }
}

impl From<u64> for SnowflakeId {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeId")
            .field("id", &self.id)
            .field("timestamp", &self.timestamp())
            .field("datacenter_id", &self.datacenter_id())
            .field("worker_id", &self.worker_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}
