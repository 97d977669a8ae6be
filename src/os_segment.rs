//! The external OS-level segment helper: the one collaborator outside
//! the allocator core. It reserves a single, fixed, page-aligned region of
//! memory and hands the base address and length to whoever owns it; the
//! allocator core never calls into this module directly: the client wires
//! the two together by passing `segment_start()`/`segment_size()` into
//! [`crate::heap::Heap::init`].
//!
//! `sbrk` is the right tool for a pointer that only ever moves forward one
//! step at a time. This segment is the opposite: one fixed-size region,
//! reserved once and never grown or shrunk back to the OS, so
//! `mmap(MAP_PRIVATE | MAP_ANONYMOUS)` is used instead. It returns a
//! page-aligned region of exactly the size asked for in one call.

use std::ptr::NonNull;

use libc::{MAP_ANONYMOUS, MAP_FAILED, MAP_PRIVATE, PROT_READ, PROT_WRITE, c_void};

use crate::align::round_up;
use crate::config::PAGE_SIZE;
use crate::error::SegmentError;

/// Owns at most one reserved region at a time; a fresh call to
/// [`OsSegment::init_segment`] discards whatever region came before it, and
/// `Drop` releases the region back to the OS.
#[derive(Debug, Default)]
pub struct OsSegment {
  region: Option<(NonNull<u8>, usize)>,
}

impl OsSegment {
  /// Creates a helper with no reserved region yet.
  pub fn new() -> Self {
    Self { region: None }
  }

  /// Reserves a fresh, page-aligned region of at least `total_bytes`.
  ///
  /// Discards any prior region first ("discards any prior region on
  /// re-call").
  pub fn init_segment(&mut self, total_bytes: usize) -> Option<NonNull<u8>> {
    self.release();

    let size = round_up(total_bytes.max(1), PAGE_SIZE);

    let addr = unsafe {
      libc::mmap(
        std::ptr::null_mut(),
        size,
        PROT_READ | PROT_WRITE,
        MAP_PRIVATE | MAP_ANONYMOUS,
        -1,
        0,
      )
    };

    if addr == MAP_FAILED {
      let err = SegmentError::Reserve {
        requested: size,
        source: std::io::Error::last_os_error(),
      };
      log::warn!("{err}");
      return None;
    }

    let base = NonNull::new(addr as *mut u8)?;
    self.region = Some((base, size));
    Some(base)
  }

  /// Base address of the currently reserved region, or `None` if there is
  /// no active region.
  pub fn segment_start(&self) -> Option<NonNull<u8>> {
    self.region.map(|(base, _)| base)
  }

  /// Size in bytes of the currently reserved region, or `0` if there is no
  /// active region.
  pub fn segment_size(&self) -> usize {
    self.region.map(|(_, size)| size).unwrap_or(0)
  }

  fn release(&mut self) {
    if let Some((base, size)) = self.region.take() {
      unsafe {
        libc::munmap(base.as_ptr() as *mut c_void, size);
      }
    }
  }
}

impl Drop for OsSegment {
  fn drop(&mut self) {
    self.release();
  }
}
