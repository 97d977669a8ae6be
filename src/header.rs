//! The one place in this crate that reinterprets segment bytes as a typed
//! header word. Every function here is `unsafe`: each requires `h` to be the
//! address of a live header inside the segment currently bound by the
//! caller. Everything outside this module manipulates headers only through
//! these functions, never through raw pointer casts of its own: this is the
//! one small, explicitly-unsafe module the rest of the crate builds on.
//!
//! Layout: one `ALIGNMENT`-byte header word per block, bit 0 the used flag,
//! the remaining bits the payload size (always alignment-clean, so bit 0 is
//! free for the flag). No footers.

use std::ptr::NonNull;

use crate::align::round_up;
use crate::config::ALIGNMENT;

/// A byte address of a block header, free-block link word, or payload.
pub type Addr = NonNull<u8>;

const USED_BIT: usize = 1;

#[inline(always)]
unsafe fn read_word(addr: Addr) -> usize {
  unsafe { (addr.as_ptr() as *const usize).read() }
}

#[inline(always)]
unsafe fn write_word(addr: Addr, word: usize) {
  unsafe { (addr.as_ptr() as *mut usize).write(word) }
}

/// Payload size encoded in the header at `h`, in bytes, excluding the
/// header word itself.
///
/// # Safety
/// `h` must address a live header inside the bound segment.
pub unsafe fn size_of(h: Addr) -> usize {
  unsafe { read_word(h) & !USED_BIT }
}

/// Whether the block headed at `h` is marked used.
///
/// # Safety
/// `h` must address a live header inside the bound segment.
pub unsafe fn is_used(h: Addr) -> bool {
  unsafe { read_word(h) & USED_BIT != 0 }
}

/// Writes `size | used` into the header at `h`.
///
/// # Safety
/// `h` must address a live header inside the bound segment. `size` must
/// already be alignment-clean (`size & 1 == 0`).
pub unsafe fn write_size_and_used(h: Addr, size: usize, used: bool) {
  debug_assert_eq!(size & USED_BIT, 0, "block size must be alignment-clean");
  unsafe { write_word(h, size | (used as usize)) }
}

/// Flips the used bit on without touching the encoded size.
///
/// # Safety
/// `h` must address a live header inside the bound segment.
pub unsafe fn set_used(h: Addr) {
  let size = unsafe { size_of(h) };
  unsafe { write_size_and_used(h, size, true) }
}

/// Flips the used bit off without touching the encoded size.
///
/// # Safety
/// `h` must address a live header inside the bound segment.
pub unsafe fn set_free(h: Addr) {
  let size = unsafe { size_of(h) };
  unsafe { write_size_and_used(h, size, false) }
}

/// The payload address for the block headed at `h`.
///
/// # Safety
/// `h` must address a live header inside the bound segment.
pub unsafe fn payload_of(h: Addr) -> Addr {
  unsafe { Addr::new_unchecked(h.as_ptr().add(ALIGNMENT)) }
}

/// The header address for a payload previously returned by [`payload_of`].
///
/// # Safety
/// `p` must be a payload address previously handed out for a live block.
pub unsafe fn header_of_payload(p: Addr) -> Addr {
  unsafe { Addr::new_unchecked(p.as_ptr().sub(ALIGNMENT)) }
}

/// The header address immediately following the block headed at `h`. May
/// land exactly at the end of the segment (callers must check that
/// separately, see [`crate::segment::SegmentBinding::is_past_end`]).
///
/// # Safety
/// `h` must address a live header inside the bound segment.
pub unsafe fn next_header(h: Addr) -> Addr {
  unsafe { Addr::new_unchecked(h.as_ptr().add(ALIGNMENT + size_of(h))) }
}

/// Reads the free-list link word at `link_addr` (the first or second
/// aligned word of a free block's payload). `0` decodes as "none".
///
/// # Safety
/// `link_addr` must address a live, aligned word inside the bound segment
/// (i.e. the payload of a block at least `2 * ALIGNMENT` bytes, used only
/// while that block is free).
pub unsafe fn read_link(link_addr: Addr) -> Option<Addr> {
  let raw = unsafe { read_word(link_addr) };
  Addr::new(raw as *mut u8)
}

/// Writes a free-list link word at `link_addr`. `None` encodes as `0`.
///
/// # Safety
/// `link_addr` must address a live, aligned word inside the bound segment.
pub unsafe fn write_link(link_addr: Addr, value: Option<Addr>) {
  let raw = value.map(|a| a.as_ptr() as usize).unwrap_or(0);
  unsafe { write_word(link_addr, raw) }
}

/// `round_up(n, ALIGNMENT)`, convenience re-export so call sites outside
/// this module don't need to import `align` separately for the common case.
#[inline(always)]
pub fn round_up_to_alignment(n: usize) -> usize {
  round_up(n, ALIGNMENT)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::alloc::{Layout, alloc, dealloc};

  struct Scratch {
    ptr: *mut u8,
    layout: Layout,
  }

  impl Scratch {
    fn new(size: usize) -> Self {
      let layout = Layout::from_size_align(size, ALIGNMENT).unwrap();
      let ptr = unsafe { alloc(layout) };
      assert!(!ptr.is_null());
      Self { ptr, layout }
    }

    fn addr(&self, offset: usize) -> Addr {
      unsafe { Addr::new_unchecked(self.ptr.add(offset)) }
    }
  }

  impl Drop for Scratch {
    fn drop(&mut self) {
      unsafe { dealloc(self.ptr, self.layout) };
    }
  }

  #[test]
  fn size_and_used_round_trip() {
    let scratch = Scratch::new(64);
    let h = scratch.addr(0);
    unsafe {
      write_size_and_used(h, 48, true);
      assert_eq!(size_of(h), 48);
      assert!(is_used(h));

      write_size_and_used(h, 48, false);
      assert_eq!(size_of(h), 48);
      assert!(!is_used(h));
    }
  }

  #[test]
  fn set_used_and_set_free_preserve_size() {
    let scratch = Scratch::new(64);
    let h = scratch.addr(0);
    unsafe {
      write_size_and_used(h, 24, false);
      set_used(h);
      assert_eq!(size_of(h), 24);
      assert!(is_used(h));
      set_free(h);
      assert_eq!(size_of(h), 24);
      assert!(!is_used(h));
    }
  }

  #[test]
  fn payload_and_header_round_trip() {
    let scratch = Scratch::new(64);
    let h = scratch.addr(0);
    unsafe {
      let p = payload_of(h);
      assert_eq!(p.as_ptr() as usize, h.as_ptr() as usize + ALIGNMENT);
      assert_eq!(header_of_payload(p), h);
    }
  }

  #[test]
  fn next_header_steps_past_header_and_payload() {
    let scratch = Scratch::new(64);
    let h = scratch.addr(0);
    unsafe {
      write_size_and_used(h, 32, true);
      let n = next_header(h);
      assert_eq!(n.as_ptr() as usize, h.as_ptr() as usize + ALIGNMENT + 32);
    }
  }

  #[test]
  fn link_words_round_trip_including_none() {
    let scratch = Scratch::new(64);
    let link = scratch.addr(8);
    unsafe {
      write_link(link, None);
      assert_eq!(read_link(link), None);

      let target = scratch.addr(16);
      write_link(link, Some(target));
      assert_eq!(read_link(link), Some(target));
    }
  }
}
