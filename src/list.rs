//! The explicit variant's free-list index: a doubly linked list
//! threaded through the payloads of free blocks, LIFO insertion, no tail
//! sentinel. The two primitives here (`insert_at_head`, `unlink`) take the
//! list head as an explicit `&mut Option<Addr>` rather than reaching into a
//! struct field, so they read like plain pseudocode and so
//! [`crate::validate`] can drive them read-only against a borrowed head.

use crate::config::ALIGNMENT;
use crate::header::{self, Addr};

/// Address of the prev-link word inside a free block's payload.
fn prev_slot(h: Addr) -> Addr {
  unsafe { header::payload_of(h) }
}

/// Address of the next-link word inside a free block's payload, one aligned
/// word after the prev-link.
fn next_slot(h: Addr) -> Addr {
  unsafe { Addr::new_unchecked(header::payload_of(h).as_ptr().add(ALIGNMENT)) }
}

/// Reads the prev-free link stored in block `h`'s payload.
///
/// # Safety
/// `h` must head a free block at least `2 * ALIGNMENT` bytes long.
pub unsafe fn prev(h: Addr) -> Option<Addr> {
  unsafe { header::read_link(prev_slot(h)) }
}

/// Reads the next-free link stored in block `h`'s payload.
///
/// # Safety
/// `h` must head a free block at least `2 * ALIGNMENT` bytes long.
pub unsafe fn next(h: Addr) -> Option<Addr> {
  unsafe { header::read_link(next_slot(h)) }
}

/// Sets the prev-free link stored in block `h`'s payload.
///
/// # Safety
/// `h` must head a free block at least `2 * ALIGNMENT` bytes long.
pub unsafe fn set_prev(h: Addr, v: Option<Addr>) {
  unsafe { header::write_link(prev_slot(h), v) }
}

/// Sets the next-free link stored in block `h`'s payload.
///
/// # Safety
/// `h` must head a free block at least `2 * ALIGNMENT` bytes long.
pub unsafe fn set_next(h: Addr, v: Option<Addr>) {
  unsafe { header::write_link(next_slot(h), v) }
}

/// Threads `h` onto the front of the free list rooted at `*free_head`.
///
/// # Safety
/// `h` must head a free block at least `2 * ALIGNMENT` bytes long, not
/// already on the list.
pub unsafe fn insert_at_head(free_head: &mut Option<Addr>, h: Addr) {
  unsafe {
    set_prev(h, None);
    set_next(h, *free_head);
    if let Some(old_head) = *free_head {
      set_prev(old_head, Some(h));
    }
  }
  *free_head = Some(h);
}

/// Removes `h` from the free list rooted at `*free_head`.
///
/// # Safety
/// `h` must currently be on the list rooted at `*free_head`.
pub unsafe fn unlink(free_head: &mut Option<Addr>, h: Addr) {
  unsafe {
    let p = prev(h);
    let n = next(h);
    match p {
      Some(pp) => set_next(pp, n),
      None => *free_head = n,
    }
    if let Some(nn) = n {
      set_prev(nn, p);
    }
  }
}
