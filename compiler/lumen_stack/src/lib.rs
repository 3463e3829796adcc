//! Stack growth for recursive passes.
//!
//! Expression resolution is iterative, but type resolution, constant
//! evaluation and the uniformity walk recurse over the syntax graph. Each
//! recursive step goes through [`ensure_sufficient_stack`] so pathological
//! nesting grows the stack instead of overflowing it.
//!
//! On `wasm32` the call is a plain passthrough.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if the red zone has been reached.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests;
