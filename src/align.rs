//! Alignment macros (`align_to!`, `align!`) and a `round_up` function wrapping
//! them for call sites that need a plain function rather than a macro.
//!
//! `align_to!` is the general form: round `$value` up to a multiple of
//! `$align`, which must be a power of two. `align!` is the common case of
//! rounding to a machine word, kept for call sites that only care about
//! native alignment.

/// Rounds `$value` up to the nearest multiple of `$align`.
///
/// `$align` must be a power of two; this is a precondition, not checked here.
///
/// # Examples
///
/// ```rust
/// use segalloc::align_to;
///
/// assert_eq!(align_to!(13, 8), 16);
/// assert_eq!(align_to!(16, 8), 16);
/// assert_eq!(align_to!(0, 8), 0);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $align:expr) => {
    (($value) + ($align) - 1) & !(($align) - 1)
  };
}

/// Rounds `$value` up to a machine-word (`usize`) boundary.
///
/// # Examples
///
/// ```rust
/// use std::mem;
/// use segalloc::align;
///
/// match mem::size_of::<usize>() {
/// 8 => assert_eq!(align!(13), 16), // 64 bit machine.
/// 4 => assert_eq!(align!(11), 12), // 32 bit machine.
/// _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    $crate::align_to!($value, mem::size_of::<usize>())
  };
}

/// Function form of [`align_to!`], for call sites where a macro is awkward
/// (e.g. passed as a value, used inside another macro expansion).
///
/// `align` must be a power of two.
#[inline(always)]
pub fn round_up(value: usize, align: usize) -> usize {
  debug_assert!(align.is_power_of_two(), "alignment must be a power of two");
  align_to!(value, align)
}
