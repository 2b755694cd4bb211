use std::time::Duration;

use tracing::{debug, info, instrument};

use crate::level::LevelSet;
use crate::model::board_text_representation;
use crate::score::star_string;
use crate::session::{ClickOutcome, SessionState};
use crate::stats::StatsRecorder;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ControlAction {
    ClickTube(usize),
    Restart,
    Undo,
    Hint,
    NextLevel,
    PrevLevel,
    ToggleDemoMode,
    CopyState,
    Quit,
}

/// Work the engine hands back to the frontend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    None,
    CopyToClipboard(String),
    Quit,
}

/// Owns the level set, the live session and the stats recorder, and routes
/// player actions between them.
pub struct GameEngine<S: StatsRecorder> {
    levels: LevelSet,
    level_index: usize,
    demo_only: bool,
    session: SessionState,
    stats: S,
}

impl<S: StatsRecorder> GameEngine<S> {
    pub fn new(levels: LevelSet, mut stats: S, start_level: usize, demo_only: bool, now: Duration) -> Self {
        let mut level_index = start_level % levels.len();
        if demo_only && !levels.is_demo_index(level_index) {
            level_index = levels.first_demo();
        }
        let level = levels.get(level_index).clone();
        stats.on_level_loaded(&level.id);
        info!(level_id = %level.id, level_index, demo_only, "Starting game");
        Self {
            session: SessionState::new(level, now),
            levels,
            level_index,
            demo_only,
            stats,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn levels(&self) -> &LevelSet {
        &self.levels
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn is_demo_only(&self) -> bool {
        self.demo_only
    }

    pub fn stats(&self) -> &S {
        &self.stats
    }

    #[instrument(skip(self), fields(level_index = self.level_index))]
    pub fn handle_game_action(&mut self, action: ControlAction, now: Duration) -> Effect {
        match action {
            ControlAction::ClickTube(index) => self.click_tube(index, now),
            ControlAction::Restart => {
                self.session.restart(now);
                self.stats.on_restart();
                info!(level_id = %self.session.level().id, "Restarted level");
            }
            ControlAction::Undo => {
                if !self.session.undo() {
                    debug!("Nothing to undo");
                }
            }
            ControlAction::Hint => {
                if let Some(hint) = self.session.request_hint() {
                    self.stats.on_hint_used();
                    debug!(from = hint.from, to = hint.to, "Hint given");
                }
            }
            ControlAction::NextLevel => {
                let next = self.levels.next_index(self.level_index, self.demo_only);
                self.load_level(next, now);
            }
            ControlAction::PrevLevel => {
                let prev = self.levels.prev_index(self.level_index, self.demo_only);
                self.load_level(prev, now);
            }
            ControlAction::ToggleDemoMode => {
                self.demo_only = !self.demo_only;
                info!(demo_only = self.demo_only, "Toggled demo mode");
                if self.demo_only && !self.levels.is_demo_index(self.level_index) {
                    self.load_level(self.levels.first_demo(), now);
                }
            }
            ControlAction::CopyState => {
                return Effect::CopyToClipboard(board_text_representation(self.session.tubes()));
            }
            ControlAction::Quit => return Effect::Quit,
        }
        Effect::None
    }

    fn click_tube(&mut self, index: usize, now: Duration) {
        if let ClickOutcome::Poured { win: Some(report), .. } = self.session.click_tube(index, now) {
            info!(
                level_id = %report.level_id,
                moves = report.moves,
                elapsed_secs = report.elapsed_secs,
                rating = %star_string(report.stars),
                "Level complete"
            );
            self.stats.on_level_won(
                &report.level_id,
                report.moves,
                report.elapsed_secs,
                report.stars,
            );
        }
    }

    pub fn load_level(&mut self, index: usize, now: Duration) {
        self.level_index = index % self.levels.len();
        let level = self.levels.get(self.level_index).clone();
        self.stats.on_level_loaded(&level.id);
        info!(level_id = %level.id, level_index = self.level_index, "Loaded level");
        self.session = SessionState::new(level, now);
    }
}
