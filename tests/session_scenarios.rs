//! End-to-end play through the engine with a real stats file.

use std::time::Duration;

use water_sort_plus::stats::StatsRecorder;
use water_sort_plus::{ControlAction, GameEngine, LevelSet, MoveAction, StatsStore};

const LEVELS: &str = r#"
[[level]]
id = "swap"
par_moves = 6
tubes = ["ABAB", "BABA", "", ""]

[[level]]
id = "locked"
par_moves = 2
tubes = ["AAA", "A", "", "BBBB"]
locks = [{ tube = 2, after_moves = 2 }]
"#;

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn click(engine: &mut GameEngine<StatsStore>, idx: usize, at: u64) {
    engine.handle_game_action(ControlAction::ClickTube(idx), secs(at));
}

#[test]
fn test_first_pour_into_empty_tube() {
    let levels = LevelSet::from_toml_str(LEVELS).unwrap();
    let mut engine = GameEngine::new(levels, StatsStore::in_memory(), 0, false, secs(0));
    click(&mut engine, 1, 1);
    click(&mut engine, 3, 2);

    let session = engine.session();
    assert_eq!(session.tubes()[1].get_text_representation(), "BAB.");
    assert_eq!(session.tubes()[3].get_text_representation(), "A...");
    assert_eq!(session.moves(), 1);
    assert!(!session.is_won());
}

#[test]
fn test_full_solve_records_stats() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stats.json");
    let levels = LevelSet::from_toml_str(LEVELS).unwrap();
    let mut engine = GameEngine::new(levels, StatsStore::open(&path), 0, false, secs(0));

    // ABAB / BABA: peel the tops apart into the two spare tubes.
    let pours = [(0, 2), (1, 3), (0, 3), (1, 2), (0, 2), (1, 3), (0, 3), (1, 2)];
    for (i, (from, to)) in pours.into_iter().enumerate() {
        assert!(!engine.session().is_won(), "won early at pour {i}");
        click(&mut engine, from, 10);
        click(&mut engine, to, 10);
    }
    assert!(engine.session().is_won());
    assert_eq!(engine.session().moves(), 8);

    let record = engine.stats().level_record("swap").unwrap();
    assert_eq!(record.wins, 1);
    assert_eq!(record.best_moves, Some(8));
    assert_eq!(record.best_time_sec, Some(10));
    assert_eq!(record.stars, 2);

    let reopened = StatsStore::open(&path);
    assert_eq!(reopened.level_record("swap"), Some(record));
}

#[test]
fn test_hint_respects_locks_and_costs_a_star() {
    let levels = LevelSet::from_toml_str(LEVELS).unwrap();
    let mut engine = GameEngine::new(levels, StatsStore::in_memory(), 1, false, secs(0));

    engine.handle_game_action(ControlAction::Hint, secs(0));
    assert_eq!(engine.session().hint_move(), Some(MoveAction::new(0, 1)));
    assert_eq!(engine.stats().data().total_hints, 1);

    // Tube 2 is locked, so the selection is dropped without pouring.
    click(&mut engine, 1, 1);
    click(&mut engine, 2, 1);
    assert_eq!(engine.session().moves(), 0);

    click(&mut engine, 1, 2);
    click(&mut engine, 0, 2);
    assert!(engine.session().is_won());
    assert_eq!(engine.session().hint_move(), None);
    // 1 move + 2 penalty against par 2.
    assert_eq!(engine.stats().level_record("locked").unwrap().stars, 2);
}

#[test]
fn test_builtin_levels_are_playable() {
    let levels = LevelSet::builtin().unwrap();
    for index in 0..levels.len() {
        let mut engine = GameEngine::new(levels.clone(), StatsStore::in_memory(), index, false, secs(0));
        assert!(!engine.session().is_won());
        engine.handle_game_action(ControlAction::Hint, secs(0));
        assert!(
            engine.session().hint_move().is_some(),
            "level {index} has no opening move"
        );
    }
}
