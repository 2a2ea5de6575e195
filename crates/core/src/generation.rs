//! Request generation tokens.
//!
//! Async lookups are not cancellable. Every request is stamped with the
//! generation that was current when it started; a response is applied only if
//! its stamp still matches the owner's current generation.

use serde::{Deserialize, Serialize};

/// Monotonically increasing request generation.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    /// Advance to the next generation and return it.
    pub fn bump(&mut self) -> Generation {
        self.0 = self.0.wrapping_add(1);
        *self
    }

    /// True when a response stamped with `stamp` may still be applied.
    pub fn accepts(self, stamp: Generation) -> bool {
        self == stamp
    }
}

impl core::fmt::Display for Generation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}
