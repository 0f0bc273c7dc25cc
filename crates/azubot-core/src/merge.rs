//! First-writer-wins field merging.
//!
//! Records are filled from several sources of decreasing priority (page
//! markup, embedded state, stats API, rendered page, per-item detail pages).
//! The rule is the same for every field: a slot that already holds a
//! non-empty/non-zero value is never overwritten, and an unset incoming value
//! never clears a slot. Record types route every field through [`fill`] so the
//! policy lives in one place.

use crate::creator::MembershipTier;

/// A field value that can be "unset" (empty string, zero count, `None`).
pub trait Fill {
    fn is_unset(&self) -> bool;
}

impl Fill for String {
    fn is_unset(&self) -> bool {
        self.trim().is_empty()
    }
}

impl Fill for u64 {
    fn is_unset(&self) -> bool {
        *self == 0
    }
}

impl Fill for u32 {
    fn is_unset(&self) -> bool {
        *self == 0
    }
}

impl<T> Fill for Option<T> {
    fn is_unset(&self) -> bool {
        self.is_none()
    }
}

impl Fill for MembershipTier {
    fn is_unset(&self) -> bool {
        *self == MembershipTier::None
    }
}

/// Writes `incoming` into `slot` only when `slot` is unset and `incoming` is
/// not. Returns `true` when the slot changed.
pub fn fill<T: Fill>(slot: &mut T, incoming: T) -> bool {
    if slot.is_unset() && !incoming.is_unset() {
        *slot = incoming;
        true
    } else {
        false
    }
}
