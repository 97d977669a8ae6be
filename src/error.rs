//! Error types for the one boundary in this crate that talks to a fallible
//! external system: the OS segment helper. The allocator's own entry
//! points (`init`/`alloc`/`resize`/`free`) never raise errors as exceptional
//! control flow: every failure there is an ordinary `bool`/`Option` return.
//! This type exists so that the *reason* an `mmap` call failed isn't
//! silently discarded before it collapses into that `None`.

use thiserror::Error;

/// Failure reserving or releasing memory from the operating system.
#[derive(Debug, Error)]
pub enum SegmentError {
  /// `mmap` declined to hand back a region of the requested size.
  #[error("failed to reserve {requested} bytes from the OS: {source}")]
  Reserve {
    requested: usize,
    #[source]
    source: std::io::Error,
  },
}
