//! A narrated, step-by-step walk through the explicit free-list variant,
//! in the press-ENTER-to-continue style of the teacher crate's own demo.
//! Run with `cargo run --example explicit_demo` and watch `validate()` and
//! `dump()` after each step.

use std::io::Read;

use segalloc::{ExplicitHeap, Heap, OsSegment};

fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

fn main() {
  env_logger::init();

  let mut os = OsSegment::default();
  let base = os.init_segment(4096).expect("failed to reserve a segment");
  println!(
    "[start] reserved {} bytes at {:p}",
    os.segment_size(),
    base.as_ptr()
  );

  let mut heap = ExplicitHeap::new();

  unsafe {
    assert!(heap.init(base, os.segment_size()));
    println!("\n[0] fresh heap, one big free block");
    segalloc::validate::dump(&heap);
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 1) Three small allocations carve the free block up from the left.
    // --------------------------------------------------------------------
    let a = heap.alloc(32).unwrap();
    let b = heap.alloc(32).unwrap();
    let c = heap.alloc(32).unwrap();
    println!(
      "\n[1] allocated a={:p} b={:p} c={:p}",
      a.as_ptr(),
      b.as_ptr(),
      c.as_ptr()
    );
    segalloc::validate::dump(&heap);
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 2) Free the middle block. It has no free neighbor on either side yet,
    // so it becomes its own one-block free list.
    // --------------------------------------------------------------------
    heap.free(Some(b));
    println!("\n[2] freed the middle block b");
    segalloc::validate::dump(&heap);
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 3) Free the last small allocation. Its right neighbor is the
    // segment's original trailing free block, so this free coalesces
    // with it into one larger free block.
    // --------------------------------------------------------------------
    heap.free(Some(c));
    println!("\n[3] freed c; coalesced rightward with the trailing free block");
    segalloc::validate::dump(&heap);
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 4) Grow `a` past what its own block can hold. Its right neighbor (b)
    // is free, so resize absorbs it in place rather than relocating.
    // --------------------------------------------------------------------
    let a = heap.resize(Some(a), 96).unwrap();
    println!("\n[4] grew a to 96 bytes by absorbing its free right neighbor");
    segalloc::validate::dump(&heap);
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 5) Shrink it back down. The freed tail rejoins the free list.
    // --------------------------------------------------------------------
    let a = heap.resize(Some(a), 16).unwrap();
    println!("\n[5] shrank a back to 16 bytes, freeing a new trailer");
    segalloc::validate::dump(&heap);
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 6) Free everything and confirm the heap reports itself consistent.
    // --------------------------------------------------------------------
    heap.free(Some(a));
    println!("\n[6] freed the last live block");
    segalloc::validate::dump(&heap);
    assert!(heap.validate());
    println!("\n[7] validate() == true, end of demo");
  }
}
