//! The debugger breakpoint hook: when [`crate::heap::Heap::validate`]
//! finds corruption, it logs a diagnostic line and then traps here before
//! returning `false`, so a debugger already attached to the process stops
//! right at the point of detection instead of the caller having to set a
//! breakpoint on the return value. Outside a debug build (or on a target
//! without the `int3` trap), this is a no-op.

/// Traps into an attached debugger on `x86_64` debug builds; a no-op
/// everywhere else.
#[cfg(all(debug_assertions, target_arch = "x86_64"))]
pub fn debug_break() {
  unsafe {
    std::arch::asm!("int3", options(nomem, nostack));
  }
}

#[cfg(not(all(debug_assertions, target_arch = "x86_64")))]
pub fn debug_break() {}
