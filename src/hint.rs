use crate::locks::LockTracker;
use crate::model::{MoveAction, Tube};
use crate::rules::can_pour;

/// Every legal pour between unlocked tubes, ordered by source then
/// destination index. Pouring an already complete tube into an empty one is
/// legal but never offered.
pub fn all_valid_moves(tubes: &[Tube], locks: &LockTracker) -> Vec<MoveAction> {
    let mut moves = Vec::new();
    for (src, from) in tubes.iter().enumerate() {
        if locks.is_locked(src) || from.is_empty() {
            continue;
        }
        for (dst, to) in tubes.iter().enumerate() {
            if src == dst || locks.is_locked(dst) {
                continue;
            }
            if !can_pour(from, to) {
                continue;
            }
            if from.is_complete() && to.is_empty() {
                continue;
            }
            moves.push(MoveAction::new(src, dst));
        }
    }
    moves
}

pub fn first_hint(tubes: &[Tube], locks: &LockTracker) -> Option<MoveAction> {
    all_valid_moves(tubes, locks).into_iter().next()
}
