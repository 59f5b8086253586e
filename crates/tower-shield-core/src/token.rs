//! Per-call identity tokens.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(0);

/// Opaque identity for one logical call across all of its physical attempts.
///
/// Tokens are minted from a process-wide counter, so two in-flight calls can
/// never share retry state even when they carry identical requests. A token
/// is meaningful only while its call is in flight; it is never reused as a
/// persistent identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallToken(u64);

impl CallToken {
    /// Mints a fresh token.
    pub fn next() -> Self {
        CallToken(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for CallToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call-{}", self.0)
    }
}
