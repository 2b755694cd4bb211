/// Extra moves charged against a level attempt that used any hint.
pub const HINT_PENALTY: u32 = 2;

/// Star rating (1..=3) for a finished level.
pub fn compute_stars(moves: u32, par_moves: u32, hints_used: bool) -> u8 {
    let penalty = if hints_used { HINT_PENALTY } else { 0 };
    let effective = moves.saturating_add(penalty);
    if effective <= par_moves {
        3
    } else if effective <= par_moves.saturating_add(3) {
        2
    } else {
        1
    }
}

/// Par used for scoring when a level does not declare one.
pub fn par_or_default(par_moves: Option<u32>, moves: u32) -> u32 {
    par_moves.unwrap_or(moves.saturating_add(2))
}

pub fn star_string(stars: u8) -> String {
    let filled = usize::from(stars.min(3));
    format!("{}{}", "★".repeat(filled), "☆".repeat(3 - filled))
}
