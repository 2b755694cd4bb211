//! Pour rules. Pure functions over the tubes they are handed.

use crate::model::{FluidColor, Tube};

pub fn top_run(tube: &Tube) -> Option<(FluidColor, usize)> {
    tube.top_run()
}

pub fn can_pour(src: &Tube, dst: &Tube) -> bool {
    src.could_pour_into(dst)
}

/// Pours `tubes[src]` onto `tubes[dst]` and returns the number of units moved.
/// Returns 0 without touching anything when the pour is illegal, when
/// `src == dst`, or when either index is out of range.
pub fn pour(tubes: &mut [Tube], src: usize, dst: usize) -> usize {
    match tubes.get_disjoint_mut([src, dst]) {
        Ok([from, to]) => from.pour_into(to),
        Err(_) => 0,
    }
}

pub fn is_tube_complete(tube: &Tube) -> bool {
    tube.is_complete()
}

/// Every non-empty tube is complete. Empty tubes never block a win.
pub fn check_win(tubes: &[Tube]) -> bool {
    tubes.iter().filter(|t| !t.is_empty()).all(Tube::is_complete)
}
