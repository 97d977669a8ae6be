//! The diagnostic printer that sits alongside the consistency checker:
//! dumps every block's header address, used flag, and size, plus the
//! `nused` figure and segment bounds. Unlike [`crate::heap::Heap::validate`]
//! this produces no pass/fail verdict: it's purely for a human staring at
//! a misbehaving trace.

use crate::config::ALIGNMENT;
use crate::header;
use crate::heap::Heap;

/// Prints a full block-by-block dump of `heap`'s segment to stdout.
pub fn dump<H: Heap>(heap: &H) {
  let seg = heap.segment();
  println!(
    "segment: start={:p} size={} nused={}",
    seg.start.as_ptr(),
    seg.size,
    seg.nused
  );

  let mut h = seg.start;
  let mut index = 0;
  while !seg.is_past_end(h) {
    let size = unsafe { header::size_of(h) };
    let used = unsafe { header::is_used(h) };
    println!(
      " [{index}] header={:p} used={used} size={size} (block bytes = {})",
      h.as_ptr(),
      size + ALIGNMENT
    );
    h = unsafe { header::next_header(h) };
    index += 1;
  }

  heap.dump_index();
}
