//! Live play of one level: selection, pours, locks, undo and hints.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::hint;
use crate::level::Level;
use crate::locks::LockTracker;
use crate::model::{MoveAction, Tube};
use crate::rules;
use crate::score::{compute_stars, par_or_default};

/// What a tube click did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing happened: the level is won, or the tube is locked, empty or
    /// does not exist.
    Ignored,
    Selected(usize),
    Deselected,
    /// The pour was illegal; selection is cleared and nothing else changes.
    Rejected(MoveAction),
    Poured {
        action: MoveAction,
        moved: usize,
        win: Option<WinReport>,
    },
}

/// Produced once, on the pour that solves the level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WinReport {
    pub level_id: String,
    pub moves: u32,
    pub elapsed_secs: u64,
    pub stars: u8,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Snapshot {
    tubes: Vec<Tube>,
    moves: u32,
    won: bool,
    locks: LockTracker,
    hint_move: Option<MoveAction>,
    hints_used: u32,
    started_at: Duration,
}

#[derive(Clone, Debug)]
pub struct SessionState {
    level: Arc<Level>,
    tubes: Vec<Tube>,
    moves: u32,
    won: bool,
    selected: Option<usize>,
    locks: LockTracker,
    hint_move: Option<MoveAction>,
    hints_used: u32,
    started_at: Duration,
    history: Vec<Snapshot>,
}

impl SessionState {
    /// Starts the level. `now` anchors the level timer.
    pub fn new(level: Arc<Level>, now: Duration) -> Self {
        let tubes = level.tubes.clone();
        let locks = LockTracker::new(&level.unlock_after_moves);
        Self {
            level,
            tubes,
            moves: 0,
            won: false,
            selected: None,
            locks,
            hint_move: None,
            hints_used: 0,
            started_at: now,
            history: Vec::new(),
        }
    }

    pub fn level(&self) -> &Arc<Level> {
        &self.level
    }

    pub fn tubes(&self) -> &[Tube] {
        &self.tubes
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn locks(&self) -> &LockTracker {
        &self.locks
    }

    pub fn is_locked(&self, tube_idx: usize) -> bool {
        self.locks.is_locked(tube_idx)
    }

    pub fn hint_move(&self) -> Option<MoveAction> {
        self.hint_move
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn elapsed_secs(&self, now: Duration) -> u64 {
        now.saturating_sub(self.started_at).as_secs()
    }

    /// Stars the current move count would earn.
    pub fn current_stars(&self) -> u8 {
        let par = par_or_default(self.level.par_moves, self.moves);
        compute_stars(self.moves, par, self.hints_used > 0)
    }

    pub fn click_tube(&mut self, idx: usize, now: Duration) -> ClickOutcome {
        if self.won || idx >= self.tubes.len() {
            return ClickOutcome::Ignored;
        }

        let Some(src) = self.selected else {
            if self.locks.is_locked(idx) || self.tubes[idx].is_empty() {
                debug!(tube = idx, "Tube cannot be selected");
                return ClickOutcome::Ignored;
            }
            self.selected = Some(idx);
            return ClickOutcome::Selected(idx);
        };

        self.selected = None;
        if idx == src {
            return ClickOutcome::Deselected;
        }
        if self.locks.is_locked(src) || self.locks.is_locked(idx) {
            debug!(from = src, to = idx, "Pour blocked by lock");
            return ClickOutcome::Deselected;
        }

        let action = MoveAction::new(src, idx);
        if !rules::can_pour(&self.tubes[src], &self.tubes[idx]) {
            debug!(from = src, to = idx, "Illegal pour");
            return ClickOutcome::Rejected(action);
        }

        self.history.push(self.snapshot());
        let moved = rules::pour(&mut self.tubes, src, idx);
        self.moves += 1;
        self.hint_move = None;
        self.locks.decrement_after_success();
        self.won = rules::check_win(&self.tubes);
        debug!(from = src, to = idx, moved, moves = self.moves, "Poured");

        let win = self.won.then(|| WinReport {
            level_id: self.level.id.clone(),
            moves: self.moves,
            elapsed_secs: self.elapsed_secs(now),
            stars: self.current_stars(),
        });
        ClickOutcome::Poured { action, moved, win }
    }

    /// Back to the level's starting configuration with a fresh timer.
    pub fn restart(&mut self, now: Duration) {
        *self = Self::new(Arc::clone(&self.level), now);
    }

    /// Restores the state before the last successful pour. Returns false if
    /// there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(prev) = self.history.pop() else {
            return false;
        };
        self.tubes = prev.tubes;
        self.moves = prev.moves;
        self.won = prev.won;
        self.locks = prev.locks;
        self.hint_move = prev.hint_move;
        self.hints_used = prev.hints_used;
        self.started_at = prev.started_at;
        self.selected = None;
        true
    }

    /// Suggests the first legal, useful pour. Returns the hint when one was
    /// produced; it then counts against the score.
    pub fn request_hint(&mut self) -> Option<MoveAction> {
        if self.won {
            return None;
        }
        self.hint_move = hint::first_hint(&self.tubes, &self.locks);
        if self.hint_move.is_some() {
            self.hints_used += 1;
        }
        self.hint_move
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            tubes: self.tubes.clone(),
            moves: self.moves,
            won: self.won,
            locks: self.locks.clone(),
            hint_move: self.hint_move,
            hints_used: self.hints_used,
            started_at: self.started_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TUBE_CAPACITY;
    use std::collections::BTreeMap;

    fn level(reprs: &[&str], locks: &[(usize, u32)], par: Option<u32>) -> Arc<Level> {
        Arc::new(Level {
            id: "test".to_string(),
            name: "Test".to_string(),
            difficulty: "Easy".to_string(),
            tags: vec![],
            tubes: reprs
                .iter()
                .map(|r| Tube::new_from_repr(r, TUBE_CAPACITY).unwrap())
                .collect(),
            par_moves: par,
            unlock_after_moves: locks.iter().copied().collect::<BTreeMap<_, _>>(),
            is_demo_level: false,
        })
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_pour_into_empty_tube() {
        let mut session = SessionState::new(level(&["ABAB", "BABA", "", ""], &[], None), secs(0));
        assert_eq!(session.click_tube(1, secs(1)), ClickOutcome::Selected(1));
        let outcome = session.click_tube(3, secs(2));
        assert_eq!(
            outcome,
            ClickOutcome::Poured {
                action: MoveAction::new(1, 3),
                moved: 1,
                win: None
            }
        );
        assert_eq!(session.tubes()[1].get_text_representation(), "BAB.");
        assert_eq!(session.tubes()[3].get_text_representation(), "A...");
        assert_eq!(session.moves(), 1);
        assert!(!session.is_won());
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn test_select_rules() {
        let mut session =
            SessionState::new(level(&["AB", "", "B"], &[(2, 1)], None), secs(0));
        assert_eq!(session.click_tube(1, secs(0)), ClickOutcome::Ignored);
        assert_eq!(session.click_tube(2, secs(0)), ClickOutcome::Ignored);
        assert_eq!(session.click_tube(9, secs(0)), ClickOutcome::Ignored);
        assert_eq!(session.click_tube(0, secs(0)), ClickOutcome::Selected(0));
        assert_eq!(session.click_tube(0, secs(0)), ClickOutcome::Deselected);
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn test_locked_destination_deselects_without_pouring() {
        let mut session = SessionState::new(level(&["AB", "", "B"], &[(2, 1)], None), secs(0));
        session.click_tube(0, secs(0));
        assert_eq!(session.click_tube(2, secs(0)), ClickOutcome::Deselected);
        assert_eq!(session.moves(), 0);
        assert!(!session.can_undo());
    }

    #[test]
    fn test_rejected_pour_changes_nothing() {
        let mut session = SessionState::new(level(&["AB", "BA"], &[], None), secs(0));
        session.click_tube(0, secs(0));
        assert_eq!(
            session.click_tube(1, secs(0)),
            ClickOutcome::Rejected(MoveAction::new(0, 1))
        );
        assert_eq!(session.moves(), 0);
        assert!(!session.can_undo());
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn test_win_reports_once_and_blocks_clicks() {
        let mut session = SessionState::new(level(&["AAA", "A", "BBBB"], &[], Some(1)), secs(10));
        session.click_tube(1, secs(11));
        let outcome = session.click_tube(0, secs(25));
        let ClickOutcome::Poured { win: Some(report), .. } = outcome else {
            panic!("expected a winning pour, got {outcome:?}");
        };
        assert_eq!(
            report,
            WinReport {
                level_id: "test".to_string(),
                moves: 1,
                elapsed_secs: 15,
                stars: 3
            }
        );
        assert!(session.is_won());
        assert_eq!(session.click_tube(0, secs(26)), ClickOutcome::Ignored);
        assert_eq!(session.request_hint(), None);
    }

    #[test]
    fn test_undo_reverts_a_win() {
        let mut session = SessionState::new(level(&["AAA", "A"], &[], None), secs(0));
        let before = session.tubes().to_vec();
        session.click_tube(1, secs(1));
        session.click_tube(0, secs(2));
        assert!(session.is_won());
        assert!(session.undo());
        assert!(!session.is_won());
        assert_eq!(session.tubes(), &before[..]);
        assert_eq!(session.moves(), 0);
        assert!(!session.undo());
    }

    #[test]
    fn test_locks_count_down_on_unrelated_pours() {
        let mut session =
            SessionState::new(level(&["AB", "", "", "C"], &[(3, 2)], None), secs(0));
        session.click_tube(0, secs(0));
        session.click_tube(1, secs(0));
        assert!(session.is_locked(3));
        session.click_tube(1, secs(0));
        session.click_tube(2, secs(0));
        assert!(!session.is_locked(3));
    }

    #[test]
    fn test_undo_restores_locks_and_hint() {
        let mut session = SessionState::new(level(&["AB", "", "", "C"], &[(3, 2)], None), secs(0));
        let hint = session.request_hint();
        assert_eq!(hint, Some(MoveAction::new(0, 1)));
        session.click_tube(0, secs(0));
        session.click_tube(2, secs(0));
        assert_eq!(session.hint_move(), None);
        assert_eq!(session.locks().remaining_moves(3), 1);

        session.undo();
        assert_eq!(session.locks().remaining_moves(3), 2);
        assert_eq!(session.hint_move(), hint);
        assert_eq!(session.hints_used(), 1);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut session = SessionState::new(level(&["AB", "", "", "C"], &[(3, 2)], None), secs(0));
        session.request_hint();
        session.click_tube(0, secs(0));
        session.click_tube(1, secs(0));
        session.click_tube(0, secs(0));
        session.restart(secs(30));
        assert_eq!(session.moves(), 0);
        assert_eq!(session.hints_used(), 0);
        assert_eq!(session.hint_move(), None);
        assert_eq!(session.selected(), None);
        assert!(!session.can_undo());
        assert_eq!(session.locks().remaining_moves(3), 2);
        assert_eq!(session.tubes(), &session.level().tubes[..]);
        assert_eq!(session.elapsed_secs(secs(35)), 5);
    }

    #[test]
    fn test_sorted_level_starts_unwon_and_wins_on_a_pour() {
        let sorted = level(&["AAAA", "", ""], &[], None);
        assert!(rules::check_win(&sorted.tubes));

        let mut session = SessionState::new(sorted, secs(0));
        assert!(!session.is_won());
        session.click_tube(0, secs(1));
        let outcome = session.click_tube(1, secs(2));
        assert!(matches!(outcome, ClickOutcome::Poured { win: Some(_), .. }));
        assert!(session.is_won());

        session.restart(secs(3));
        assert!(!session.is_won());
        assert_eq!(session.moves(), 0);
        assert_eq!(session.click_tube(0, secs(3)), ClickOutcome::Selected(0));
    }

    #[test]
    fn test_hint_survives_selection_changes() {
        let mut session = SessionState::new(level(&["AB", "", "B"], &[], None), secs(0));
        let hint = session.request_hint();
        assert!(hint.is_some());
        session.click_tube(0, secs(0));
        assert_eq!(session.hint_move(), hint);
        session.click_tube(0, secs(0));
        assert_eq!(session.selected(), None);
        assert_eq!(session.hint_move(), hint);
    }

    #[test]
    fn test_hint_without_moves_clears_and_is_free() {
        let mut session = SessionState::new(level(&["AB", "BA", "CCCC"], &[], None), secs(0));
        assert_eq!(session.request_hint(), None);
        assert_eq!(session.hints_used(), 0);
    }
}
