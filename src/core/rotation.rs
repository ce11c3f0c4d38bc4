//! Rotation state machine and payload fingerprinting
//!
//! The scheduler's observable state is either "no ad" or "showing one ad".
//! All of the decision logic lives here as pure functions over an explicit
//! [`RotationState`], so the tick behavior is unit-testable without a live
//! timer.

use crate::display::DisplayPayload;
use crate::errors::{Error, Result};
use sha2::{Digest, Sha256};

/// Cursor position plus the fingerprint of the last payload that was
/// successfully pushed. The fingerprint is only advanced on a successful
/// push, so a failed push is retried on every tick until the display has
/// caught up.
#[derive(Debug, Clone, Default)]
pub struct RotationState {
    pub cursor: usize,
    pub last_fingerprint: Option<String>,
}

impl RotationState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the payload with this fingerprint was already pushed.
    #[must_use]
    pub fn already_showing(&self, fingerprint: &str) -> bool {
        self.last_fingerprint.as_deref() == Some(fingerprint)
    }
}

/// Advances the rotation by one tick over an active set of the given size.
///
/// Returns the index to show this tick, or `None` when the set is empty (the
/// cursor resets so a later non-empty set starts from the beginning). The
/// cursor is clamped into bounds first, which absorbs ads having been removed
/// since the previous tick, then advanced with wraparound so consecutive
/// ticks cycle through the set.
pub fn advance(state: &mut RotationState, active_len: usize) -> Option<usize> {
    if active_len == 0 {
        state.cursor = 0;
        return None;
    }
    if state.cursor >= active_len {
        state.cursor = 0;
    }
    let selected = state.cursor;
    state.cursor = (state.cursor + 1) % active_len;
    Some(selected)
}

/// Stable content fingerprint of a display payload: SHA-256 over the
/// canonical JSON encoding.
pub fn fingerprint(payload: &DisplayPayload) -> Result<String> {
    let canonical = serde_json::to_vec(payload).map_err(|e| Error::Storage {
        message: format!("Failed to encode display payload: {e}"),
    })?;
    Ok(hex::encode(Sha256::digest(&canonical)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::sample_ad;

    #[test]
    fn test_advance_cycles_through_set() {
        let mut state = RotationState::new();
        assert_eq!(advance(&mut state, 2), Some(0));
        assert_eq!(advance(&mut state, 2), Some(1));
        assert_eq!(advance(&mut state, 2), Some(0));
    }

    #[test]
    fn test_single_ad_selected_every_tick() {
        let mut state = RotationState::new();
        for _ in 0..3 {
            assert_eq!(advance(&mut state, 1), Some(0));
        }
    }

    #[test]
    fn test_empty_set_resets_cursor() {
        let mut state = RotationState::new();
        advance(&mut state, 3);
        advance(&mut state, 3);
        assert_eq!(state.cursor, 2);

        assert_eq!(advance(&mut state, 0), None);
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn test_cursor_clamped_when_set_shrinks() {
        let mut state = RotationState::new();
        advance(&mut state, 3);
        advance(&mut state, 3);
        // Two ads were removed between ticks; the cursor (2) is out of
        // bounds for the shrunken set and must clamp back to the start.
        assert_eq!(advance(&mut state, 1), Some(0));
    }

    #[test]
    fn test_fingerprint_detects_change() {
        let ad_a = sample_ad("biz-1", "adA");
        let ad_b = sample_ad("biz-1", "adB");

        let fp_a = fingerprint(&DisplayPayload::for_ad(&ad_a, None)).unwrap();
        let fp_a_again = fingerprint(&DisplayPayload::for_ad(&ad_a, None)).unwrap();
        let fp_b = fingerprint(&DisplayPayload::for_ad(&ad_b, None)).unwrap();
        let fp_none = fingerprint(&DisplayPayload::no_ad("uploads/no-ad.png")).unwrap();

        assert_eq!(fp_a, fp_a_again);
        assert_ne!(fp_a, fp_b);
        assert_ne!(fp_a, fp_none);
    }
}
