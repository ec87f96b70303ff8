//! Host stack growth for the recursive passes.
//!
//! Parsing, printing and evaluation all recurse once per level of source
//! nesting.  Each recursive entry point runs through
//! [`ensure_sufficient_stack`], which moves onto a freshly allocated segment
//! when the current one runs low, so nesting depth is bounded by memory
//! rather than by the thread's stack size.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated segment.
const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
