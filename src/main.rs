mod renderer;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use clipboard_rs::{Clipboard, ClipboardContext};
use macroquad::prelude::*;
use macroquad::window::Conf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use water_sort_plus::config::AppConfig;
use water_sort_plus::{ControlAction, Effect, GameEngine, LevelSet, StatsStore};

use crate::renderer::{HitItem, Renderer, default_buttons};

/// Liquid-sorting puzzle.
#[derive(Debug, Parser)]
#[command(name = "water_sort_plus", version)]
struct Cli {
    /// TOML config file.
    #[arg(long, default_value = "watersort.toml")]
    config: PathBuf,
    /// Level pack to play instead of the built-in one.
    #[arg(long)]
    levels: Option<PathBuf>,
    /// Where progress is stored.
    #[arg(long)]
    stats: Option<PathBuf>,
    /// Zero-based index of the first level.
    #[arg(long)]
    level: Option<usize>,
    /// Only cycle through demo levels.
    #[arg(long)]
    demo: bool,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "WaterSort+".to_string(),
        window_width: 1080,
        window_height: 760,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    if let Some(levels) = &cli.levels {
        config.levels_path = Some(levels.clone());
    }
    if let Some(stats) = &cli.stats {
        config.stats_path = stats.clone();
    }
    if let Some(level) = cli.level {
        config.start_level = level;
    }
    config.demo_only |= cli.demo;
    config.validate()?;
    Ok(config)
}

fn init_tracing(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .try_init();
}

fn now() -> Duration {
    Duration::from_secs_f64(get_time().max(0.0))
}

fn key_action() -> Option<ControlAction> {
    const BINDINGS: [(KeyCode, ControlAction); 8] = [
        (KeyCode::R, ControlAction::Restart),
        (KeyCode::U, ControlAction::Undo),
        (KeyCode::H, ControlAction::Hint),
        (KeyCode::N, ControlAction::NextLevel),
        (KeyCode::B, ControlAction::PrevLevel),
        (KeyCode::D, ControlAction::ToggleDemoMode),
        (KeyCode::C, ControlAction::CopyState),
        (KeyCode::Escape, ControlAction::Quit),
    ];
    BINDINGS
        .iter()
        .find(|(key, _)| is_key_pressed(*key))
        .map(|(_, action)| *action)
}

fn copy_to_clipboard(content: &str) {
    match ClipboardContext::new() {
        Ok(ctx) => {
            if let Err(err) = ctx.set_text(content.to_string()) {
                warn!(error = %err, "Failed to write clipboard");
            } else {
                info!("Copied board to clipboard");
            }
        }
        Err(err) => warn!(error = %err, "Clipboard unavailable"),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    init_tracing(&config.log_filter);
    info!(?config, "Starting WaterSort+");

    let levels = match &config.levels_path {
        Some(path) => LevelSet::load(path)
            .with_context(|| format!("loading levels from {}", path.display()))?,
        None => LevelSet::builtin().context("loading built-in levels")?,
    };
    let stats = StatsStore::open(&config.stats_path);
    let mut engine = GameEngine::new(levels, stats, config.start_level, config.demo_only, now());
    let mut renderer = Renderer::new();
    let buttons = default_buttons();

    loop {
        let elapsed = engine.session().elapsed_secs(now());
        renderer.autoset_viewport();
        renderer.render_game(&engine, &buttons, elapsed);

        let mut actions = Vec::new();
        if is_mouse_button_pressed(MouseButton::Left) {
            let (x, y) = mouse_position();
            if let Some(hit) = renderer.get_hit_test_registry().hit_test(x, y) {
                actions.push(match hit.item {
                    HitItem::Button { action } => action,
                    HitItem::Tube { index } => ControlAction::ClickTube(index),
                });
            }
        }
        actions.extend(key_action());

        for action in actions {
            match engine.handle_game_action(action, now()) {
                Effect::None => {}
                Effect::CopyToClipboard(content) => copy_to_clipboard(&content),
                Effect::Quit => {
                    info!("Quitting");
                    return Ok(());
                }
            }
        }
        next_frame().await;
    }
}
