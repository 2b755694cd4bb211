//! # WaterSort+
//!
//! Rules engine and session state for a liquid-sorting puzzle: tubes of
//! colored units, pours of the top run, timed tube locks, undo, hints and
//! star scoring.
//!
//! ## Modules
//!
//! - [`model`] — colors, tubes and moves
//! - [`rules`] — pour legality, pouring and win detection
//! - [`locks`] — tubes that open after a number of successful moves
//! - [`hint`] — legal move enumeration for hints
//! - [`score`] — star rating
//! - [`session`] — one level attempt: selection, pours, undo
//! - [`level`] — level data and navigation
//! - [`stats`] — progress records and the JSON stats file
//! - [`engine`] — routes player actions between session, levels and stats
//! - [`config`] — TOML configuration
//! - [`error`] — error types

pub mod config;
pub mod engine;
pub mod error;
pub mod hint;
pub mod level;
pub mod locks;
pub mod model;
pub mod rules;
pub mod score;
pub mod session;
pub mod stats;

pub use engine::{ControlAction, Effect, GameEngine};
pub use level::{Level, LevelSet};
pub use model::{FluidColor, MoveAction, TUBE_CAPACITY, Tube};
pub use session::{ClickOutcome, SessionState, WinReport};
pub use stats::{LevelStats, StatsRecorder, StatsStore};
