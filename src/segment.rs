//! The allocator core's own view of its segment: base address, total
//! length, and the running `nused` accounting. This is distinct from
//! [`crate::os_segment::OsSegment`], which is the external collaborator that
//! produced the region in the first place; `SegmentBinding` just remembers
//! what the core was handed by `init`.

use crate::header::Addr;

/// Process-wide (per-heap-instance) state: `segment_start`, `segment_size`,
/// and `nused`. `nused` is diagnostic only: it is never consulted by the
/// engines to decide correctness, only updated by them.
#[derive(Debug, Clone, Copy)]
pub struct SegmentBinding {
  pub start: Addr,
  pub size: usize,
  pub nused: usize,
}

impl SegmentBinding {
  /// Whether `h` is at or past the end of the bound segment: the
  /// "is_past_end" predicate used throughout to terminate block and
  /// free-list walks.
  pub fn is_past_end(&self, h: Addr) -> bool {
    let end = self.start.as_ptr() as usize + self.size;
    h.as_ptr() as usize >= end
  }

  /// Whether `addr` lies strictly inside `[segment_start, segment_start +
  /// segment_size)`, the bound every header and link is required to stay
  /// within.
  pub fn contains(&self, addr: Addr) -> bool {
    let start = self.start.as_ptr() as usize;
    let end = start + self.size;
    let a = addr.as_ptr() as usize;
    a >= start && a < end
  }
}
