//! Compile-time tunables shared by both heap variants.
//!
//! These are constants, not runtime configuration: the data model fixes them as part of the block layout itself, so there is
//! nothing here a caller should be rebinding per-instance.

/// Every header address, payload address, and block size is a multiple of
/// this many bytes.
pub const ALIGNMENT: usize = 8;

/// Requests above this size are rejected outright by `alloc`/`resize`.
pub const MAX_REQUEST_SIZE: usize = 1 << 30;

/// Page size assumed by the OS segment helper when rounding a requested
/// segment size up before calling into `mmap`.
pub const PAGE_SIZE: usize = 4096;

/// Default segment size used by the bundled example drivers when the caller
/// does not specify one on the command line.
#[cfg(target_pointer_width = "64")]
pub const DEFAULT_SEGMENT_SIZE: usize = 1usize << 32;

#[cfg(not(target_pointer_width = "64"))]
pub const DEFAULT_SEGMENT_SIZE: usize = 1usize << 28;
