//! Recursion hardening for the demangler.
//!
//! Mangled names come out of binary images and are routinely adversarial:
//! a few hundred bytes of nested generic arguments can drive the grammar
//! driver arbitrarily deep. Two independent guards live here:
//!
//! - [`ensure_sufficient_stack`] grows the native stack on demand so that a
//!   legitimately deep (but bounded) parse never overflows.
//! - [`DepthLimit`] counts nesting explicitly and refuses to go past a fixed
//!   bound, so an unbounded parse fails fast instead of allocating stack
//!   segments forever.
//!
//! # Platform Support
//!
//! - **Native targets**: `stacker` grows the stack when the red zone is hit.
//! - **WASM targets**: no-op passthrough. The depth limit still applies.

/// Minimum stack space to keep available (64KB red zone).
const RED_ZONE: usize = 64 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - just call directly (WASM has its own stack management).
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Returned by [`DepthLimit::enter`] when the bound would be exceeded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DepthExceeded {
    /// The configured bound that was hit.
    pub limit: usize,
}

/// Explicit nesting counter threaded through recursive entry points.
///
/// Callers pair every successful [`enter`](Self::enter) with one
/// [`exit`](Self::exit). A failed `enter` leaves the counter untouched.
#[derive(Copy, Clone, Debug)]
pub struct DepthLimit {
    current: usize,
    limit: usize,
}

impl DepthLimit {
    pub fn new(limit: usize) -> Self {
        DepthLimit { current: 0, limit }
    }

    /// Current nesting depth.
    #[inline]
    pub fn current(&self) -> usize {
        self.current
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Step one level deeper.
    #[inline]
    pub fn enter(&mut self) -> Result<(), DepthExceeded> {
        if self.current >= self.limit {
            return Err(DepthExceeded { limit: self.limit });
        }
        self.current += 1;
        Ok(())
    }

    /// Step one level back out.
    #[inline]
    pub fn exit(&mut self) {
        debug_assert!(self.current > 0, "unbalanced DepthLimit::exit");
        self.current = self.current.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_nesting_grows_stack() {
        // One frame per `Optional<...>` layer of a very deep type.
        fn unwrap_layers(name: &[u8]) -> usize {
            ensure_sufficient_stack(|| match name {
                [b'S', b'q', rest @ ..] => unwrap_layers(rest) + 1,
                _ => 0,
            })
        }

        let name = "Sq".repeat(100_000);
        assert_eq!(unwrap_layers(name.as_bytes()), 100_000);
    }

    #[test]
    fn test_passes_result_through() {
        let parsed: Result<u64, DepthExceeded> = ensure_sufficient_stack(|| Ok(42));
        assert_eq!(parsed, Ok(42));
    }

    #[test]
    fn test_depth_limit_counts_up_and_down() {
        let mut depth = DepthLimit::new(3);
        assert_eq!(depth.enter(), Ok(()));
        assert_eq!(depth.enter(), Ok(()));
        assert_eq!(depth.current(), 2);
        depth.exit();
        assert_eq!(depth.current(), 1);
    }

    #[test]
    fn test_depth_limit_refuses_past_bound() {
        let mut depth = DepthLimit::new(2);
        assert_eq!(depth.enter(), Ok(()));
        assert_eq!(depth.enter(), Ok(()));
        assert_eq!(depth.enter(), Err(DepthExceeded { limit: 2 }));
        // A refused enter does not move the counter.
        assert_eq!(depth.current(), 2);
    }

    #[test]
    fn test_zero_limit_refuses_everything() {
        let mut depth = DepthLimit::new(0);
        assert!(depth.enter().is_err());
        assert_eq!(depth.limit(), 0);
    }

    #[test]
    fn test_guarded_recursion_stops_at_limit() {
        fn nest(depth: &mut DepthLimit, remaining: u32) -> Result<u32, DepthExceeded> {
            depth.enter()?;
            let result = ensure_sufficient_stack(|| {
                if remaining == 0 {
                    Ok(0)
                } else {
                    nest(depth, remaining - 1).map(|n| n + 1)
                }
            });
            depth.exit();
            result
        }

        let mut depth = DepthLimit::new(50);
        assert_eq!(nest(&mut depth, 10), Ok(10));
        assert_eq!(depth.current(), 0);
        assert_eq!(nest(&mut depth, 1_000), Err(DepthExceeded { limit: 50 }));
    }
}
