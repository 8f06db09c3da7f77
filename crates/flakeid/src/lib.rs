//! Thread-safe, time-ordered 64-bit Snowflake IDs.
//!
//! Every ID packs a millisecond timestamp, a `(datacenter, worker)` identity
//! and an intra-millisecond sequence:
//!
//! ```text
//!  Bit Index:  63             22 21              17 16          12 11             0
//!              +----------------+------------------+--------------+---------------+
//!  Field:      | timestamp (41) | datacenter (5)   | worker (5)   | sequence (12) |
//!              +----------------+------------------+--------------+---------------+
//!              |<----- MSB ------------- 64 bits ------------- LSB --------------->|
//! ```
//!
//! Allocators with distinct identities never collide, and a single allocator
//! issues strictly increasing IDs while the wall clock moves forward.
//!
//! ```
//! use flakeid::IdAllocator;
//!
//! let allocator = IdAllocator::new(1, 7).expect("valid identity");
//! let a = allocator.generate();
//! let b = allocator.generate();
//! assert!(a < b);
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

mod allocator;
mod config;
mod error;
#[cfg(feature = "futures")]
mod futures;
mod global;
mod id;
mod status;
mod time;

pub use crate::allocator::*;
pub use crate::config::*;
pub use crate::error::*;
#[cfg_attr(docsrs, doc(cfg(feature = "futures")))]
#[cfg(feature = "futures")]
pub use crate::futures::*;
pub use crate::global::*;
pub use crate::id::*;
pub use crate::status::*;
pub use crate::time::*;
