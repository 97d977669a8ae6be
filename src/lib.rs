//! # segalloc - A Custom Memory Allocator Library
//!
//! This crate provides two user-space heap allocators: an **implicit
//! free-list** allocator and an **explicit free-list** allocator, both
//! carved out of a single fixed region of memory reserved up front from the
//! OS, rather than a region that grows on demand.
//!
//! ## Overview
//!
//! Both variants tile a reserved segment into a sequence of blocks, each
//! prefixed by a one-word header packing a size and a used/free bit:
//!
//! ```text
//! Segment Layout (either variant):
//!
//! ┌────────────────────────────────────────────────────────────────────┐
//! │ RESERVED SEGMENT │
//! │ │
//! │ ┌──────┬─────────────┬──────┬─────────────┬──────┬─────────────┐ │
//! │ │ hdr │ payload A │ hdr │ payload B │ hdr │ payload C │ │
//! │ └──────┴─────────────┴──────┴─────────────┴──────┴─────────────┘ │
//! │ used=1 used=0 used=1 │
//! │ │
//! └────────────────────────────────────────────────────────────────────┘
//!
//! implicit: a free block is found by scanning headers left to right.
//! explicit: free blocks are additionally threaded into a doubly linked
//! list through their own payload bytes, so only free blocks
//! are visited while searching for a fit.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//! segalloc
//! ├── align - Alignment macros (align!, align_to!) and round_up
//! ├── config - Tunable constants (alignment, page size, segment size)
//! ├── error - SegmentError, the one fallible OS boundary
//! ├── error_hooks - Debugger breakpoint hook for validate() failures
//! ├── os_segment - Reserves/releases the backing segment via mmap
//! ├── header - Unsafe byte-level header codec (internal)
//! ├── segment - SegmentBinding: a heap's view of its own bounds
//! ├── list - Free-list link primitives shared by variants
//! ├── heap - The Heap trait: shared alloc/free/resize/validate
//! ├── implicit - ImplicitHeap: linear-scan, no coalescing
//! ├── explicit - ExplicitHeap: free list, right-only coalescing
//! ├── validate - Stand-alone diagnostic dump (not pass/fail)
//! └── global - Thin process-wide singleton over ExplicitHeap
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use segalloc::{ExplicitHeap, Heap, OsSegment};
//!
//! fn main() {
//! let mut os = OsSegment::default();
//! let base = os.init_segment(1 << 20).expect("mmap failed");
//!
//! let mut heap = ExplicitHeap::new();
//! unsafe {
//! heap.init(base, os.segment_size());
//!
//! let a = heap.alloc(64).unwrap();
//! let b = heap.resize(Some(a), 128).unwrap();
//! heap.free(Some(b));
//!
//! assert!(heap.validate());
//! }
//! }
//! ```
//!
//! ## How It Works
//!
//! Unlike a bump allocator, which only ever grows its break pointer, these
//! allocators reuse freed blocks: the implicit variant by re-scanning the
//! whole segment, the explicit one by walking a free list sized to the
//! number of free blocks rather than the number of blocks total. Neither
//! variant returns memory to the OS block by block: that only happens all
//! at once, when the owning [`OsSegment`] is dropped or re-initialized.
//!
//! ## Features
//!
//! - **Two strategies, one trait**: [`Heap`] factors the shared algorithm
//! (first-fit search, splitting, five-case resize, consistency
//! checking) out of both variants, which differ only in how they find and
//! track free blocks.
//! - **Fixed-segment reservation**: the backing memory is reserved once via
//! `mmap` and handed to a heap as a `(base, length)` pair; heaps never
//! grow their segment.
//! - **Proper alignment**: every returned payload address is a multiple of
//! [`config::ALIGNMENT`].
//! - **Right-only coalescing**: the explicit variant merges a freed block
//! with its free right neighbor, never its left one, see
//! [`mod@explicit`] for why.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no synchronization primitives anywhere in
//! this crate, [`mod@global`] included.
//! - **No footers**: left-coalescing would need one; it's out of scope.
//! - **Fixed capacity**: once a segment is reserved, its size never grows.
//!
//! ## Safety
//!
//! This crate is inherently unsafe as it deals with raw memory management.
//! Nearly every operation on a [`Heap`] requires an `unsafe` block and
//! carries caller obligations documented on the method itself.

pub mod align;
pub mod config;
pub mod error;
pub mod error_hooks;
pub mod explicit;
pub mod global;
pub mod header;
pub mod heap;
pub mod implicit;
pub mod list;
pub mod os_segment;
pub mod segment;
pub mod validate;

pub use error::SegmentError;
pub use explicit::ExplicitHeap;
pub use heap::Heap;
pub use implicit::ImplicitHeap;
pub use os_segment::OsSegment;
pub use segment::SegmentBinding;
