use std::{collections::HashMap, sync::Mutex};

use macroquad::prelude::*;
use water_sort_plus::score::par_or_default;
use water_sort_plus::{ControlAction, FluidColor, GameEngine, StatsRecorder, Tube};

pub const FLUID_COLORS: [Color; 12] = [
    Color::new(0.937, 0.325, 0.314, 1.0), //RED
    Color::new(0.259, 0.647, 0.961, 1.0), //BLUE
    Color::new(0.400, 0.733, 0.416, 1.0), //GREEN
    Color::new(1.0  , 0.792, 0.157, 1.0), //YELLOW
    Color::new(0.671, 0.278, 0.737, 1.0), //PURPLE
    Color::new(1.0  , 0.439, 0.263, 1.0), //ORANGE
    Color::new(0.149, 0.776, 0.855, 1.0), //CYAN
    Color::new(0.553, 0.431, 0.388, 1.0), //BROWN
    Color::new(1.0  , 0.0  , 1.0  , 1.0), //MAGENTA
    Color::new(1.0  , 0.752, 0.796, 1.0), //PINK
    Color::new(0.0  , 0.5  , 0.5  , 1.0), //TEAL
    Color::new(0.75 , 0.75 , 0.75 , 1.0), //SILVER
];

const BG_COLOR: Color = Color::new(0.063, 0.086, 0.125, 1.0);
const PANEL_COLOR: Color = Color::new(0.129, 0.169, 0.235, 1.0);
const SUBTEXT_COLOR: Color = Color::new(0.725, 0.776, 0.863, 1.0);
const SELECT_COLOR: Color = Color::new(1.0, 0.843, 0.0, 1.0);
const HINT_COLOR: Color = Color::new(1.0, 0.706, 0.235, 1.0);
const LOCK_COLOR: Color = Color::new(0.471, 0.529, 0.627, 1.0);
const EMPTY_SLOT: Color = Color::new(0.235, 0.275, 0.361, 1.0);
const WIN_GREEN: Color = Color::new(0.204, 0.667, 0.431, 1.0);

fn fluid_color(color: FluidColor, locked: bool) -> Color {
    let base = FLUID_COLORS[color.get_color_id() % FLUID_COLORS.len()];
    if locked {
        Color::new(base.r * 0.6, base.g * 0.6, base.b * 0.6, 1.0)
    } else {
        base
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Button {
    label: String,
    action: ControlAction,
    color: Color,
}
impl Button {
    pub fn new(label: &str, action: ControlAction, color: Color) -> Self {
        Self {
            label: label.to_string(),
            action,
            color,
        }
    }
}

/// The toolbar, in display order.
pub fn default_buttons() -> Vec<Button> {
    vec![
        Button::new("Restart", ControlAction::Restart, Color::new(0.290, 0.522, 0.749, 1.0)),
        Button::new("Undo", ControlAction::Undo, Color::new(0.459, 0.361, 0.749, 1.0)),
        Button::new("Hint", ControlAction::Hint, Color::new(0.749, 0.541, 0.290, 1.0)),
        Button::new("Prev", ControlAction::PrevLevel, Color::new(0.373, 0.451, 0.588, 1.0)),
        Button::new("Next", ControlAction::NextLevel, Color::new(0.290, 0.627, 0.455, 1.0)),
        Button::new("Demo", ControlAction::ToggleDemoMode, Color::new(0.588, 0.361, 0.667, 1.0)),
        Button::new("Copy", ControlAction::CopyState, Color::new(0.373, 0.412, 0.490, 1.0)),
    ]
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HitItem {
    Button { action: ControlAction },
    Tube { index: usize },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HitRecord {
    pub rect: Rect,
    pub item: HitItem,
}

#[derive(Default)]
pub struct HitTestRegistry {
    items: Vec<HitRecord>,
}

impl HitTestRegistry {
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn push(&mut self, rect: Rect, item: HitItem) {
        self.items.push(HitRecord { rect, item });
    }

    /// Returns the topmost item under the point (last drawn wins).
    pub fn hit_test(&self, x: f32, y: f32) -> Option<&HitRecord> {
        self.items
            .iter()
            .rev()
            .find(|r| r.rect.contains(vec2(x, y)))
    }
}

#[derive(Hash, PartialEq, Eq, Clone, Debug)]
struct TextCacheKey {
    text: String,
    w_px: u16,
    h_px: u16,
}
type TextMaxSize = (f32, f32, f32);

/// Finds the font size that fits a string in a rect, caching by rect size.
pub struct CachedTextSizer {
    final_size_cache: Mutex<HashMap<TextCacheKey, TextMaxSize>>,
}

impl CachedTextSizer {
    pub fn new() -> Self {
        Self {
            final_size_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_text_max_size(&self, text: &str, rect_width: f32, rect_height: f32) -> TextMaxSize {
        let key = TextCacheKey {
            text: text.to_string(),
            w_px: rect_width.round().clamp(0.0, u16::MAX as f32) as u16,
            h_px: rect_height.round().clamp(0.0, u16::MAX as f32) as u16,
        };

        if let Ok(cache) = self.final_size_cache.lock()
            && let Some(cached_size) = cache.get(&key)
        {
            return *cached_size;
        }

        let text_size = Self::measure(text, rect_width, rect_height);
        if let Ok(mut cache) = self.final_size_cache.lock() {
            cache.insert(key, text_size);
        }
        text_size
    }

    fn measure(text: &str, rect_width: f32, rect_height: f32) -> TextMaxSize {
        let reference_size = 100u16;
        let dimensions = measure_text(text, None, reference_size, 1.0);
        if dimensions.width <= 0.0 || dimensions.height <= 0.0 {
            return (reference_size as f32, 0.0, rect_height);
        }
        let scale = (rect_width / dimensions.width).min(rect_height / dimensions.height);
        let optimal_size = reference_size as f32 * scale;
        let final_width = dimensions.width * scale;
        let offset_x = (rect_width - final_width) / 2.0;
        // draw_text positions by baseline.
        let offset_y = (rect_height + dimensions.offset_y * scale) / 2.0;
        (optimal_size, offset_x, offset_y)
    }
}

pub struct Renderer {
    cached_text_sizer: CachedTextSizer,
    hit_test: HitTestRegistry,
    width: f32,
    height: f32,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            cached_text_sizer: CachedTextSizer::new(),
            hit_test: HitTestRegistry::default(),
            width: 1080.0,
            height: 760.0,
        }
    }

    pub fn get_hit_test_registry(&self) -> &HitTestRegistry {
        &self.hit_test
    }

    pub fn autoset_viewport(&mut self) {
        self.width = screen_width();
        self.height = screen_height();
    }

    pub fn render_game<S: StatsRecorder>(
        &mut self,
        engine: &GameEngine<S>,
        buttons: &[Button],
        elapsed_secs: u64,
    ) {
        self.hit_test.clear();
        clear_background(BG_COLOR);

        let padding = 12.0;
        let button_area = Rect::new(padding, padding, self.width - 2.0 * padding, self.height * 0.08);
        let header_area = Rect::new(
            padding,
            button_area.bottom() + padding / 2.0,
            self.width - 2.0 * padding,
            self.height * 0.08,
        );
        let hud_height = self.height * 0.1;
        let hud_area = Rect::new(
            padding,
            self.height - hud_height - padding,
            self.width - 2.0 * padding,
            hud_height,
        );
        let tube_area = Rect::new(
            padding * 4.0,
            header_area.bottom() + padding * 3.0,
            self.width - 8.0 * padding,
            hud_area.y - header_area.bottom() - padding * 6.0,
        );

        self.render_button_lineup(buttons, engine, button_area);
        self.render_header(engine, header_area);
        self.render_tube_grid(engine, 6, tube_area);
        self.render_hud(engine, elapsed_secs, hud_area);
        if engine.session().is_won() {
            self.render_win_banner(engine, elapsed_secs, tube_area);
        }
    }

    pub fn render_text(&self, text: &str, rect: Rect, color: Color) {
        let (optimal_size, x, y) = self
            .cached_text_sizer
            .get_text_max_size(text, rect.w, rect.h);
        draw_text(text, rect.x + x, rect.y + y, optimal_size, color);
    }

    fn render_header<S: StatsRecorder>(&self, engine: &GameEngine<S>, rect: Rect) {
        let session = engine.session();
        let level = session.level();
        let tags = if level.tags.is_empty() {
            "none".to_string()
        } else {
            level.tags.join(", ")
        };
        let par = level
            .par_moves
            .map_or_else(|| "-".to_string(), |p| p.to_string());
        let line = format!(
            "{}  |  {}  |  Par {}  |  Tags: {}",
            level.name, level.difficulty, par, tags
        );
        self.render_text(&line, Rect::new(rect.x, rect.y, rect.w, rect.h * 0.5), SUBTEXT_COLOR);

        if let Some(hint) = session.hint_move()
            && !session.is_won()
        {
            let text = format!("Hint: Try pouring Tube {} -> Tube {}", hint.from + 1, hint.to + 1);
            self.render_text(
                &text,
                Rect::new(rect.x, rect.y + rect.h * 0.55, rect.w, rect.h * 0.45),
                HINT_COLOR,
            );
        }
    }

    fn render_hud<S: StatsRecorder>(&self, engine: &GameEngine<S>, elapsed_secs: u64, rect: Rect) {
        draw_rectangle(rect.x, rect.y, rect.w, rect.h, PANEL_COLOR);
        let session = engine.session();
        let level = session.level();
        let record = engine.stats().level_record(&level.id).unwrap_or_default();
        let par = par_or_default(level.par_moves, session.moves());

        let line = format!(
            "Level {}/{}   Moves {}   Time {}s   Par {}   Hints used {}   Demo {}{}",
            engine.level_index() + 1,
            engine.levels().len(),
            session.moves(),
            elapsed_secs,
            par,
            session.hints_used(),
            if engine.is_demo_only() { "ON" } else { "OFF" },
            if session.locks().any_locked() { "   Locked tubes" } else { "" },
        );
        let best = format!(
            "Best moves {}   Best time {}   Wins {}   Stars {}/3",
            record.best_moves.map_or_else(|| "-".to_string(), |m| m.to_string()),
            record.best_time_sec.map_or_else(|| "-".to_string(), |t| format!("{t}s")),
            record.wins,
            record.stars,
        );
        let half = rect.h / 2.0;
        self.render_text(&line, Rect::new(rect.x + 8.0, rect.y + 4.0, rect.w - 16.0, half - 6.0), WHITE);
        self.render_text(&best, Rect::new(rect.x + 8.0, rect.y + half + 2.0, rect.w - 16.0, half - 6.0), SUBTEXT_COLOR);
    }

    fn render_tube(&mut self, tube: &Tube, index: usize, state: TubeState, rect: Rect) {
        self.hit_test.push(rect, HitItem::Tube { index });

        if state.selected {
            let glow = if state.locked { LOCK_COLOR } else { SELECT_COLOR };
            draw_rectangle_lines(rect.x - 6.0, rect.y - 6.0, rect.w + 12.0, rect.h + 12.0, 4.0, glow);
        }
        if state.hinted {
            draw_rectangle_lines(rect.x - 3.0, rect.y - 3.0, rect.w + 6.0, rect.h + 6.0, 2.0, HINT_COLOR);
        }
        let border = if state.locked { LOCK_COLOR } else { WHITE };

        let capacity = tube.get_capacity().max(1);
        let slot_gap = 5.0;
        let slot_h = (rect.h - (capacity as f32 + 1.0) * slot_gap) / capacity as f32;
        for level in 0..capacity {
            let y = rect.y + rect.h - slot_gap - (level as f32 + 1.0) * (slot_h + slot_gap) + slot_gap;
            let color = match tube.get_packets().get(level) {
                Some(&packet) => fluid_color(packet, state.locked),
                None => EMPTY_SLOT,
            };
            draw_rectangle(rect.x + 5.0, y, rect.w - 10.0, slot_h, color);
        }
        draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 3.0, border);

        let label_color = if state.locked { HINT_COLOR } else { SUBTEXT_COLOR };
        self.render_text(
            &(index + 1).to_string(),
            Rect::new(rect.x, rect.bottom() + 4.0, rect.w, 20.0),
            label_color,
        );
        if state.lock_remaining > 0 {
            self.render_text(
                &format!("locked {}", state.lock_remaining),
                Rect::new(rect.x, rect.y - 24.0, rect.w, 20.0),
                HINT_COLOR,
            );
        }
    }

    fn render_tube_grid<S: StatsRecorder>(&mut self, engine: &GameEngine<S>, max_columns: usize, rect: Rect) {
        let session = engine.session();
        let tubes = session.tubes();
        if tubes.is_empty() {
            return;
        }
        let columns = max_columns.min(tubes.len());
        let rows = tubes.len().div_ceil(columns);
        let spacing_x = 34.0;
        let spacing_y = 52.0;
        let tube_w = ((rect.w - spacing_x * (columns as f32 - 1.0)) / columns as f32).min(82.0);
        let tube_h = ((rect.h - spacing_y * (rows as f32 - 1.0)) / rows as f32).min(260.0);
        let total_w = columns as f32 * tube_w + (columns as f32 - 1.0) * spacing_x;
        let start_x = rect.x + (rect.w - total_w) / 2.0;

        let hint = session.hint_move();
        for (i, tube) in tubes.iter().enumerate() {
            let row = i / columns;
            let col = i % columns;
            let x = start_x + col as f32 * (tube_w + spacing_x);
            let y = rect.y + row as f32 * (tube_h + spacing_y);
            let state = TubeState {
                selected: session.selected() == Some(i),
                locked: session.is_locked(i),
                lock_remaining: session.locks().remaining_moves(i),
                hinted: hint.is_some_and(|h| h.from == i || h.to == i),
            };
            self.render_tube(tube, i, state, Rect::new(x, y, tube_w, tube_h));
        }
    }

    fn render_win_banner<S: StatsRecorder>(&self, engine: &GameEngine<S>, elapsed_secs: u64, area: Rect) {
        let session = engine.session();
        let banner = Rect::new(area.center().x - 300.0, area.bottom() - 30.0, 600.0, 60.0);
        draw_rectangle(banner.x, banner.y, banner.w, banner.h, WIN_GREEN);
        draw_rectangle_lines(banner.x, banner.y, banner.w, banner.h, 2.0, WHITE);
        let mut msg = format!(
            "Level Complete!  {}/3 stars  -  {} moves  -  {}s",
            session.current_stars(),
            session.moves(),
            elapsed_secs
        );
        if session.hints_used() > 0 {
            msg.push_str("  -  hint penalty applied");
        }
        self.render_text(&msg, Rect::new(banner.x + 10.0, banner.y + 10.0, banner.w - 20.0, banner.h - 20.0), WHITE);
    }

    fn render_button<S: StatsRecorder>(&mut self, button: &Button, engine: &GameEngine<S>, rect: Rect) {
        self.hit_test.push(rect, HitItem::Button { action: button.action });

        let session = engine.session();
        let enabled = match button.action {
            ControlAction::Undo => session.can_undo(),
            ControlAction::Hint => !session.is_won(),
            _ => true,
        };
        let fill = if enabled { button.color } else { GRAY };
        draw_rectangle(rect.x, rect.y, rect.w, rect.h, fill);
        draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 2.0, BLACK);
        let label = match button.action {
            ControlAction::ToggleDemoMode => {
                format!("{}: {}", button.label, if engine.is_demo_only() { "ON" } else { "OFF" })
            }
            _ => button.label.clone(),
        };
        self.render_text(
            &label,
            Rect::new(rect.x + 6.0, rect.y + 6.0, rect.w - 12.0, rect.h - 12.0),
            WHITE,
        );
    }

    fn render_button_lineup<S: StatsRecorder>(&mut self, buttons: &[Button], engine: &GameEngine<S>, rect: Rect) {
        if buttons.is_empty() {
            return;
        }
        let button_count = buttons.len() as f32;
        let spacing = 10.0;
        let button_width = (rect.w - spacing * (button_count - 1.0)) / button_count;
        for (i, button) in buttons.iter().enumerate() {
            let button_x = rect.x + i as f32 * (button_width + spacing);
            self.render_button(button, engine, Rect::new(button_x, rect.y, button_width, rect.h));
        }
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct TubeState {
    selected: bool,
    locked: bool,
    lock_remaining: u32,
    hinted: bool,
}
