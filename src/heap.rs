//! The shared engine both variants implement. Allocation,
//! deallocation, resize, and validation are algorithmically identical
//! between the implicit and explicit free lists except for a handful of
//! steps: what counts as the minimum block size, how big a leftover has to
//! be before it's worth splitting off, how a fit is found, and what (if
//! anything) needs updating when a block changes free/used state. Those few
//! steps are the trait's required methods; everything else is a default
//! method built on top of them, so [`crate::implicit::ImplicitHeap`] and
//! [`crate::explicit::ExplicitHeap`] each implement only their own
//! differences, not the whole algorithm twice.
//!
//! Every entry point here is `unsafe`: misuse (freeing an invalid pointer,
//! double-free, use after free, calling before `init`) is undefined
//! behavior that this crate does not defend against.

use crate::config::{ALIGNMENT, MAX_REQUEST_SIZE};
use crate::header::{self, Addr};
use crate::segment::SegmentBinding;

/// Shared template for both free-list variants. See the module docs for why
/// this is a trait rather than one concrete struct.
pub trait Heap {
  /// Read access to this heap's segment binding.
  fn segment(&self) -> &SegmentBinding;

  /// Mutable access to this heap's segment binding.
  fn segment_mut(&mut self) -> &mut SegmentBinding;

  /// Smallest payload size this variant can host (`ALIGNMENT` for the
  /// implicit variant, `2 * ALIGNMENT` for the explicit variant, which
  /// needs room for both free-list links).
  fn min_payload(&self) -> usize;

  /// How much slack beyond `needed` a victim block must have before it's
  /// worth splitting into an allocated block and a fresh free trailer,
  /// rather than simply absorbing the whole block.
  fn split_threshold(&self) -> usize;

  /// Locates a first-fit candidate of at least `needed` bytes, or `None` if
  /// none exists. The implicit variant scans every block; the explicit
  /// variant walks only the free list.
  ///
  /// # Safety
  /// Must only be called while `self.segment()` is bound to a valid region.
  unsafe fn find_fit(&mut self, needed: usize) -> Option<Addr>;

  /// Called once, immediately after `init` writes the segment's first
  /// (and, at that point, only) block header. The explicit variant seeds
  /// `free_head` here; the implicit variant has nothing to do.
  ///
  /// # Safety
  /// `first_block` must be the address just written by `init`.
  unsafe fn on_init(&mut self, first_block: Addr);

  /// Called when a free block is about to become (part of) an allocated
  /// block: at minimum, removes it from whatever free-structure the
  /// variant maintains. The explicit variant unlinks it; the implicit
  /// variant has nothing to do (there is no structure beyond the header
  /// itself).
  ///
  /// # Safety
  /// `h` must currently be a free block reachable by this variant's own
  /// bookkeeping.
  unsafe fn remove_from_free(&mut self, h: Addr);

  /// Called when a block has just been written as a fresh free block (a
  /// split trailer, or a shrink trailer). The explicit variant threads it
  /// onto the free list; the implicit variant has nothing to do.
  ///
  /// # Safety
  /// `h` must head a just-created free block inside the bound segment.
  unsafe fn add_to_free(&mut self, h: Addr);

  /// Called after a block has been marked free by [`Heap::free`], with the
  /// chance to coalesce. The explicit variant performs the right-coalesce
  /// walk; the implicit variant does nothing (freed blocks stay
  /// discoverable only by the next linear scan).
  ///
  /// # Safety
  /// `h` must be the just-freed block.
  unsafe fn on_free(&mut self, h: Addr);

  /// Variant-specific half of [`Heap::validate`]'s second pass: free-list
  /// integrity for the explicit variant, trivially `true` for the
  /// implicit variant (which has no separate index to check).
  fn validate_index(&self) -> bool;

  /// Variant-specific line(s) appended to the diagnostic dump in
  /// [`crate::validate::dump`] (e.g. the explicit variant's free-list
  /// head).
  fn dump_index(&self);

  /// Initializes (or re-initializes, discarding all prior state) this heap
  /// over `[base, base + length)`. Returns `false` if `length` is too small
  /// to host even one minimally sized block, in which case no state is
  /// left usable.
  ///
  /// # Safety
  /// `base` must address a region of at least `length` bytes that this
  /// heap will own exclusively until the next `init`.
  unsafe fn init(&mut self, base: Addr, length: usize) -> bool {
    if length < ALIGNMENT + self.min_payload() {
      return false;
    }

    *self.segment_mut() = SegmentBinding {
      start: base,
      size: length,
      nused: 0,
    };

    let first = base;
    unsafe {
      header::write_size_and_used(first, length - ALIGNMENT, false);
      self.on_init(first);
    }
    true
  }

  /// First-fit allocation: rejects zero and oversized requests,
  /// locates a victim, splits it if there's enough slack to be worth it,
  /// and returns the payload address, or `None` if no block fits.
  ///
  /// # Safety
  /// `self` must be bound by a prior successful `init`.
  unsafe fn alloc(&mut self, requested: usize) -> Option<Addr> {
    if requested == 0 || requested > MAX_REQUEST_SIZE {
      return None;
    }

    let needed = header::round_up_to_alignment(requested).max(self.min_payload());
    let victim = unsafe { self.find_fit(needed)? };
    let block_size = unsafe { header::size_of(victim) };
    let threshold = self.split_threshold();

    unsafe {
      self.remove_from_free(victim);

      if block_size < needed + threshold {
        // Absorb: no slack worth carving off, the allocation grows to fill
        // the whole block.
        header::write_size_and_used(victim, block_size, true);
        self.segment_mut().nused += block_size;
      } else {
        header::write_size_and_used(victim, needed, true);
        self.segment_mut().nused += needed;

        let trailer = header::next_header(victim);
        let trailer_size = block_size - needed - ALIGNMENT;
        header::write_size_and_used(trailer, trailer_size, false);
        self.add_to_free(trailer);
      }

      Some(header::payload_of(victim))
    }
  }

  /// Marks `payload` free. A `None` payload is a no-op.
  ///
  /// # Safety
  /// `payload` must either be `None` or a live payload previously returned
  /// by `alloc`/`resize` on this heap and not already freed.
  unsafe fn free(&mut self, payload: Option<Addr>) {
    let Some(p) = payload else { return };
    unsafe {
      let h = header::header_of_payload(p);
      let size = header::size_of(h);
      self.segment_mut().nused -= size;
      header::set_free(h);
      self.on_free(h);
    }
  }

  /// Resize dispatch.
  ///
  /// # Safety
  /// `old_payload` must either be `None` or a live payload previously
  /// returned by `alloc`/`resize` on this heap and not already freed.
  unsafe fn resize(&mut self, old_payload: Option<Addr>, new_size: usize) -> Option<Addr> {
    // Case A: no existing allocation, delegate to alloc.
    let old_payload = match old_payload {
      None => return unsafe { self.alloc(new_size) },
      Some(p) => p,
    };

    // Case B: shrinking to nothing is a free.
    if new_size == 0 {
      unsafe { self.free(Some(old_payload)) };
      return None;
    }

    let h = unsafe { header::header_of_payload(old_payload) };
    let orig_size = unsafe { header::size_of(h) };
    let need = header::round_up_to_alignment(new_size).max(self.min_payload());

    if need <= orig_size {
      // Case C.
      unsafe { self.shrink_in_place(h, orig_size, need) };
      return Some(old_payload);
    }

    // Case D: absorb free right-neighbors until there's enough room, or
    // until the walk runs out of free neighbors to absorb.
    let mut acc = orig_size;
    loop {
      let n = unsafe { header::next_header(h) };
      if self.segment().is_past_end(n) || unsafe { header::is_used(n) } {
        break;
      }
      let nsize = unsafe { header::size_of(n) };
      unsafe {
        self.remove_from_free(n);
        acc += nsize + ALIGNMENT;
        header::write_size_and_used(h, acc, true);
      }
      if acc >= need {
        break;
      }
    }

    if acc != orig_size {
      // Absorption already happened and is never undone, win or lose,
      // so account for it now, at the one confirmed mutation point, per
      // the "nused on relocate failure" resolution in the design notes.
      self.segment_mut().nused += acc - orig_size;
    }

    if acc >= need {
      unsafe { self.shrink_in_place(h, acc, need) };
      return Some(old_payload);
    }

    // Case E: relocate. The absorbed-but-insufficient neighbors legitimately
    // belong to `h` now even if this allocation fails.
    let new_payload = unsafe { self.alloc(new_size)? };
    let copy_len = orig_size.min(new_size);
    unsafe {
      std::ptr::copy_nonoverlapping(old_payload.as_ptr(), new_payload.as_ptr(), copy_len);
      self.free(Some(old_payload));
    }
    Some(new_payload)
  }

  /// Shared shrink/split step used directly by resize Case C, and again
  /// after a Case D absorption to trim the now-oversized block down to
  /// `need`. If there isn't enough slack to carve off a new free block,
  /// the block is left at `cur_size` untouched.
  ///
  /// # Safety
  /// `h` must be the header of a used block of size `cur_size`, with
  /// `need <= cur_size`.
  unsafe fn shrink_in_place(&mut self, h: Addr, cur_size: usize, need: usize) {
    let threshold = self.split_threshold();
    if cur_size >= need + threshold {
      unsafe {
        header::write_size_and_used(h, need, true);
        self.segment_mut().nused -= cur_size - need;

        let trailer = header::next_header(h);
        let trailer_size = cur_size - need - ALIGNMENT;
        header::write_size_and_used(trailer, trailer_size, false);
        self.add_to_free(trailer);
      }
    }
    // Otherwise: not enough slack to be worth splitting, leave `cur_size`
    // as-is (still used, still accounted for at its current size).
  }

  /// Consistency checker: walks the segment tiling and, per variant,
  /// the free-list index. Read-only; mutates nothing.
  fn validate(&self) -> bool {
    let seg = self.segment();
    let mut total = 0usize;
    let mut h = seg.start;
    while !seg.is_past_end(h) {
      total += unsafe { header::size_of(h) } + ALIGNMENT;
      h = unsafe { header::next_header(h) };
    }

    if total != seg.size {
      log::error!(
        "heap corruption: block walk totals {total} bytes, segment is {} bytes",
        seg.size
      );
      crate::error_hooks::debug_break();
      return false;
    }

    if !self.validate_index() {
      crate::error_hooks::debug_break();
      return false;
    }

    true
  }
}
