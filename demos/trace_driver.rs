//! A small interpreter for scripted allocation traces, standing in for the
//! repository's own external test harness.
//!
//! Each line of the script (read from a file given as the first argument,
//! or from stdin) is one of:
//!
//! ```text
//! alloc <id> <size> # id must be unused
//! resize <id> <size> # id must be live; size 0 frees it
//! free <id> # id must be live
//! validate # runs the consistency check, panics if false
//! dump # prints the block-by-block diagnostic dump
//! ```
//!
//! `<id>` is an arbitrary token the script uses to refer back to a
//! previous allocation; this driver keeps its own id -> payload table and
//! never interprets ids as addresses.
//!
//! Select the variant with `--implicit` or `--explicit` (default) as a
//! second CLI argument.

use std::collections::HashMap;
use std::io::{self, BufRead};

use segalloc::{ExplicitHeap, Heap, ImplicitHeap, OsSegment};

const SEGMENT_BYTES: usize = 1 << 20;

enum Variant {
  Implicit(ImplicitHeap),
  Explicit(ExplicitHeap),
}

impl Variant {
  unsafe fn init(&mut self, base: segalloc::header::Addr, len: usize) -> bool {
    match self {
      Variant::Implicit(h) => unsafe { h.init(base, len) },
      Variant::Explicit(h) => unsafe { h.init(base, len) },
    }
  }

  unsafe fn alloc(&mut self, n: usize) -> Option<segalloc::header::Addr> {
    match self {
      Variant::Implicit(h) => unsafe { h.alloc(n) },
      Variant::Explicit(h) => unsafe { h.alloc(n) },
    }
  }

  unsafe fn resize(
    &mut self,
    old: Option<segalloc::header::Addr>,
    n: usize,
  ) -> Option<segalloc::header::Addr> {
    match self {
      Variant::Implicit(h) => unsafe { h.resize(old, n) },
      Variant::Explicit(h) => unsafe { h.resize(old, n) },
    }
  }

  unsafe fn free(&mut self, p: Option<segalloc::header::Addr>) {
    match self {
      Variant::Implicit(h) => unsafe { h.free(p) },
      Variant::Explicit(h) => unsafe { h.free(p) },
    }
  }

  fn validate(&self) -> bool {
    match self {
      Variant::Implicit(h) => h.validate(),
      Variant::Explicit(h) => h.validate(),
    }
  }

  fn dump(&self) {
    match self {
      Variant::Implicit(h) => segalloc::validate::dump(h),
      Variant::Explicit(h) => segalloc::validate::dump(h),
    }
  }
}

fn run(mut variant: Variant, lines: impl Iterator<Item = io::Result<String>>) {
  let mut os = OsSegment::default();
  let base = os
    .init_segment(SEGMENT_BYTES)
    .expect("failed to reserve the trace segment");

  let mut live: HashMap<String, segalloc::header::Addr> = HashMap::new();

  unsafe {
    assert!(variant.init(base, os.segment_size()), "segment too small");
  }

  for line in lines {
    let line = line.expect("failed to read trace line");
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
      continue;
    }
    let mut words = line.split_whitespace();
    match words.next().expect("empty trace line") {
      "alloc" => {
        let id = words.next().expect("alloc needs an id").to_string();
        let size: usize = words.next().expect("alloc needs a size").parse().unwrap();
        let payload = unsafe { variant.alloc(size) };
        match payload {
          Some(p) => {
            println!("alloc {id} {size} -> {:p}", p.as_ptr());
            live.insert(id, p);
          }
          None => println!("alloc {id} {size} -> REJECTED"),
        }
      }
      "resize" => {
        let id = words.next().expect("resize needs an id").to_string();
        let size: usize = words.next().expect("resize needs a size").parse().unwrap();
        let old = live.remove(&id);
        let payload = unsafe { variant.resize(old, size) };
        match payload {
          Some(p) => {
            println!("resize {id} {size} -> {:p}", p.as_ptr());
            live.insert(id, p);
          }
          None => println!("resize {id} {size} -> None"),
        }
      }
      "free" => {
        let id = words.next().expect("free needs an id").to_string();
        let payload = live.remove(&id);
        unsafe { variant.free(payload) };
        println!("free {id}");
      }
      "validate" => {
        let ok = variant.validate();
        println!("validate -> {ok}");
        assert!(ok, "trace script failed a validate step");
      }
      "dump" => variant.dump(),
      other => panic!("unrecognized trace command: {other}"),
    }
  }
}

fn main() {
  env_logger::init();

  let mut args = std::env::args().skip(1);
  let mut path = None;
  let mut explicit = true;

  for arg in args.by_ref() {
    match arg.as_str() {
      "--implicit" => explicit = false,
      "--explicit" => explicit = true,
      other => path = Some(other.to_string()),
    }
  }

  let variant = if explicit {
    Variant::Explicit(ExplicitHeap::new())
  } else {
    Variant::Implicit(ImplicitHeap::new())
  };

  match path {
    Some(path) => {
      let file = std::fs::File::open(&path).expect("could not open trace file");
      run(variant, io::BufReader::new(file).lines());
    }
    None => {
      let stdin = io::stdin();
      run(variant, stdin.lock().lines());
    }
  }
}
