use std::collections::BTreeMap;

/// Remaining successful moves before each locked tube opens.
///
/// Every successful pour counts down every lock, whichever tubes it touched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LockTracker {
    remaining: BTreeMap<usize, u32>,
}

impl LockTracker {
    pub fn new(unlock_after_moves: &BTreeMap<usize, u32>) -> Self {
        Self {
            remaining: unlock_after_moves.clone(),
        }
    }

    pub fn is_locked(&self, tube_idx: usize) -> bool {
        self.remaining_moves(tube_idx) > 0
    }

    pub fn remaining_moves(&self, tube_idx: usize) -> u32 {
        self.remaining.get(&tube_idx).copied().unwrap_or(0)
    }

    pub fn any_locked(&self) -> bool {
        self.remaining.values().any(|&r| r > 0)
    }

    pub fn decrement_after_success(&mut self) {
        for remaining in self.remaining.values_mut() {
            *remaining = remaining.saturating_sub(1);
        }
    }
}
