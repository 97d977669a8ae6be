//! Throughput benchmarks for both variants, modeled on the teacher pack's own
//! allocate/deallocate microbenchmark shape (pre-fill the heap to a given
//! occupancy, then measure one more alloc/dealloc cycle) but run through
//! `criterion` instead of the nightly `test` bencher, since this crate
//! targets stable.

use criterion::{Criterion, criterion_group, criterion_main};
use segalloc::{ExplicitHeap, Heap, ImplicitHeap, OsSegment};

const SEGMENT_BYTES: usize = 4 << 20;

fn bench_variant<H: Heap>(c: &mut Criterion, name: &str, mut heap: H, pre_allocations: usize) {
  let mut os = OsSegment::default();
  let base = os
    .init_segment(SEGMENT_BYTES)
    .expect("failed to reserve benchmark segment");
  unsafe {
    assert!(heap.init(base, os.segment_size()));
    for _ in 0..pre_allocations {
      heap.alloc(8);
    }
  }

  c.bench_function(name, |b| {
      b.iter(|| unsafe {
          let p = heap.alloc(8);
          heap.free(p);
      });
  });
}

fn implicit_no_preload(c: &mut Criterion) {
  bench_variant(c, "implicit/no_preload", ImplicitHeap::new(), 0);
}

fn implicit_medium_preload(c: &mut Criterion) {
  bench_variant(c, "implicit/medium_preload", ImplicitHeap::new(), 4096);
}

fn explicit_no_preload(c: &mut Criterion) {
  bench_variant(c, "explicit/no_preload", ExplicitHeap::new(), 0);
}

fn explicit_medium_preload(c: &mut Criterion) {
  bench_variant(c, "explicit/medium_preload", ExplicitHeap::new(), 4096);
}

criterion_group!(
  benches,
  implicit_no_preload,
  implicit_medium_preload,
  explicit_no_preload,
  explicit_medium_preload,
);
criterion_main!(benches);
