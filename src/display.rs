//! Terminal rendering. All terminal output goes through here.
//!
//! `TerminalRenderer` implements the simulation's render service by mapping
//! world pixels onto terminal cells and sprites onto small glyph blocks. The
//! HUD, border and overlays are drawn directly from an immutable view of
//! the game state. No game logic is performed here.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use glam::Vec2;

use arena_survival::config::WorldTuning;
use arena_survival::effects::IconKind;
use arena_survival::entities::{Direction, EnemyKind, GameState, GameStatus, PotionKind};
use arena_survival::error::AssetError;
use arena_survival::popup::PopupKind;
use arena_survival::render;
use arena_survival::services::{Renderer, Sheet, SpriteCache, SpriteKey, TextTint};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_HP: Color = Color::Red;
const C_HUD_MANA: Color = Color::Blue;
const C_HUD_TEXT: Color = Color::White;
const C_HUD_COOLDOWN: Color = Color::DarkGrey;
const C_PLAYER: Color = Color::White;
const C_WOLF: Color = Color::Grey;
const C_BRUTE: Color = Color::DarkYellow;
const C_BAT: Color = Color::Magenta;
const C_HORNET: Color = Color::Yellow;
const C_DEAD: Color = Color::DarkGrey;
const C_GRENADE: Color = Color::White;
const C_EXPLOSION: Color = Color::Yellow;
const C_POTION_MANA: Color = Color::Cyan;
const C_POTION_HEALTH: Color = Color::Red;
const C_WAVE: Color = Color::Cyan;
const C_BURST: Color = Color::White;
const C_BADGE: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;

/// Alpha below which a draw is skipped, and below which it is dimmed.
const ALPHA_HIDDEN: u8 = 60;
const ALPHA_DIM: u8 = 150;

// ── Glyph sprites ─────────────────────────────────────────────────────────────

/// A sprite as the terminal sees it: a few rows of text centred on the
/// sprite's world footprint.
#[derive(Clone, Debug)]
pub struct Glyph {
    lines: &'static [&'static str],
    color: Color,
    footprint: Vec2,
}

fn enemy_color(kind: EnemyKind) -> Color {
    match kind {
        EnemyKind::Wolf => C_WOLF,
        EnemyKind::Brute => C_BRUTE,
        EnemyKind::Bat => C_BAT,
        EnemyKind::Hornet => C_HORNET,
    }
}

fn enemy_art(kind: EnemyKind, facing: Direction, frame: usize) -> &'static [&'static str] {
    let step = frame % 2 == 0;
    match (kind, facing) {
        (EnemyKind::Wolf, Direction::Right) if step => &["  ▄▄▀", "▀▀ ▀ "],
        (EnemyKind::Wolf, Direction::Right) => &["  ▄▄▀", " ▀▀▀ "],
        (EnemyKind::Wolf, Direction::Left) if step => &["▀▄▄  ", " ▀ ▀▀"],
        (EnemyKind::Wolf, Direction::Left) => &["▀▄▄  ", " ▀▀▀ "],
        (EnemyKind::Brute, _) if step => &[" (@) ", "/███\\", " / \\ "],
        (EnemyKind::Brute, _) => &[" (@) ", "/███\\", " | | "],
        (EnemyKind::Bat, _) if step => &["\\^v^/"],
        (EnemyKind::Bat, _) => &["_^v^_"],
        (EnemyKind::Hornet, Direction::Right) => &[" ≈≈ ", "=▓▓>"],
        (EnemyKind::Hornet, Direction::Left) => &[" ≈≈ ", "<▓▓="],
    }
}

fn player_art(sheet: Sheet, facing: Option<Direction>, frame: usize) -> &'static [&'static str] {
    let right = facing != Some(Direction::Left);
    match sheet {
        Sheet::PlayerWalk if frame % 2 == 0 => {
            if right { &[" O ", "/█>", "/ \\"] } else { &[" O ", "<█\\", "/ \\"] }
        }
        Sheet::PlayerWalk => {
            if right { &[" O ", "/█>", " | "] } else { &[" O ", "<█\\", " | "] }
        }
        Sheet::PlayerJump => &["\\O/", " █ ", "/ \\"],
        Sheet::PlayerAttack => match (right, frame) {
            (true, 0 | 1) => &[" O  ", "/█═>", "/ \\ "],
            (true, _) => &[" O   ", "/█══>", "/ \\  "],
            (false, 0 | 1) => &["  O ", "<═█\\", " / \\"],
            (false, _) => &["   O ", "<══█\\", "  / \\"],
        },
        Sheet::PlayerUltimate => &["\\O/", "*█*", "/ \\"],
        _ => {
            if right { &[" O ", "/█|", "/ \\"] } else { &[" O ", "|█\\", "/ \\"] }
        }
    }
}

type Art = (&'static [&'static str], Color);

fn art(lines: &'static [&'static str], color: Color) -> Art {
    (lines, color)
}

/// Resolve a sprite key to glyph art.
pub fn glyph_for(key: &SpriteKey) -> Result<Glyph, AssetError> {
    let footprint = key.sheet.footprint();
    let (lines, color) = match key.sheet {
        Sheet::PlayerIdle
        | Sheet::PlayerWalk
        | Sheet::PlayerJump
        | Sheet::PlayerAttack
        | Sheet::PlayerUltimate => art(player_art(key.sheet, key.facing, key.frame), C_PLAYER),
        Sheet::Enemy(kind) => {
            let facing = key.facing.unwrap_or_default();
            art(enemy_art(kind, facing, key.frame), enemy_color(kind))
        }
        Sheet::EnemyDead(EnemyKind::Bat) | Sheet::EnemyDead(EnemyKind::Hornet) => art(&["x_x"], C_DEAD),
        Sheet::EnemyDead(_) => art(&["_x_x_"], C_DEAD),
        Sheet::Grenade => art(&["ó"], C_GRENADE),
        Sheet::Explosion => match key.frame {
            0 => art(&[" * ", "*@*", " * "], C_EXPLOSION),
            1 => art(&["\\ | /", "- @ -", "/ | \\"], C_EXPLOSION),
            2 => art(&[" .:*:. ", ":*@@@*:", " ':*:' "], C_EXPLOSION),
            _ => art(&[" .  . ", ".    .", " .  . "], C_DEAD),
        },
        Sheet::Potion(PotionKind::Mana) => art(&["♦"], C_POTION_MANA),
        Sheet::Potion(PotionKind::Health) => art(&["♥"], C_POTION_HEALTH),
        Sheet::Icon(IconKind::Milk) => art(&["(milk)"], Color::White),
        Sheet::Icon(IconKind::Crit) => art(&["CRIT!"], Color::Red),
        Sheet::Icon(IconKind::Sparkle) => art(&["✧ ✦ ✧"], Color::Cyan),
        Sheet::UltimateWave => match key.facing {
            Some(Direction::Left) => art(&["<<<≈≈≈≈≈≈≈≈", "<<<≈≈≈≈≈≈≈≈≈≈", "<<<≈≈≈≈≈≈≈≈"], C_WAVE),
            _ => art(&["≈≈≈≈≈≈≈≈>>>", "≈≈≈≈≈≈≈≈≈≈>>>", "≈≈≈≈≈≈≈≈>>>"], C_WAVE),
        },
        Sheet::Burst => art(&["\\  |  /", " ·:✺:· ", "/  |  \\"], C_BURST),
        Sheet::Badge => art(&["★"], C_BADGE),
    };
    Ok(Glyph { lines, color, footprint })
}

// ── Terminal render service ───────────────────────────────────────────────────

/// Maps world pixels into the bordered play area of the terminal.
pub struct TerminalRenderer<'a, W: Write> {
    out: &'a mut W,
    cols: u16,
    rows: u16,
    world: WorldTuning,
}

impl<'a, W: Write> TerminalRenderer<'a, W> {
    pub fn new(out: &'a mut W, cols: u16, rows: u16, world: WorldTuning) -> Self {
        TerminalRenderer { out, cols, rows, world }
    }

    fn play_top(&self) -> i32 {
        2
    }

    fn play_bottom(&self) -> i32 {
        self.rows as i32 - 3
    }

    /// World point → (col, row), not yet clipped.
    fn to_cell(&self, p: Vec2) -> (i32, i32) {
        let inner_w = self.cols.saturating_sub(2) as f32;
        let inner_h = (self.play_bottom() - self.play_top() + 1).max(1) as f32;
        let col = 1 + (p.x / self.world.width * inner_w).floor() as i32;
        let row = self.play_top() + (p.y / self.world.height * inner_h).floor() as i32;
        (col, row)
    }

    /// Print `text` starting at a cell, dropping whatever falls outside the
    /// play area.
    fn put(&mut self, col: i32, row: i32, text: &str, color: Color) -> std::io::Result<()> {
        if row < self.play_top() || row > self.play_bottom() {
            return Ok(());
        }
        let min_col = 1;
        let max_col = self.cols as i32 - 2;
        let visible: String = text
            .chars()
            .enumerate()
            .filter(|(i, _)| {
                let c = col + *i as i32;
                c >= min_col && c <= max_col
            })
            .map(|(_, ch)| ch)
            .collect();
        if visible.is_empty() {
            return Ok(());
        }
        let start = col.max(min_col) as u16;
        self.out.queue(cursor::MoveTo(start, row as u16))?;
        self.out.queue(style::SetForegroundColor(color))?;
        self.out.queue(Print(visible))?;
        Ok(())
    }
}

fn shade(color: Color, alpha: u8) -> Option<Color> {
    if alpha < ALPHA_HIDDEN {
        None
    } else if alpha < ALPHA_DIM {
        Some(Color::DarkGrey)
    } else {
        Some(color)
    }
}

impl<'a, W: Write> Renderer for TerminalRenderer<'a, W> {
    type Handle = Glyph;
    type Error = std::io::Error;

    fn load_sprite(&mut self, key: &SpriteKey) -> Result<Glyph, AssetError> {
        glyph_for(key)
    }

    fn draw_sprite(
        &mut self,
        sprite: &Glyph,
        pos: Vec2,
        alpha: Option<u8>,
        _scale: Option<f32>,
    ) -> std::io::Result<()> {
        let Some(color) = shade(sprite.color, alpha.unwrap_or(255)) else {
            return Ok(());
        };
        // Anchor the art on the bottom centre of the footprint so figures
        // stand on the ground line.
        let anchor = pos + Vec2::new(sprite.footprint.x / 2.0, sprite.footprint.y * 0.85);
        let (col, row) = self.to_cell(anchor);
        let height = sprite.lines.len() as i32;
        for (i, line) in sprite.lines.iter().enumerate() {
            let width = line.chars().count() as i32;
            self.put(col - width / 2, row - height + 1 + i as i32, line, color)?;
        }
        Ok(())
    }

    fn draw_text(&mut self, text: &str, pos: Vec2, alpha: u8, tint: TextTint) -> std::io::Result<()> {
        let base = match tint {
            TextTint::Popup(PopupKind::Damage) => Color::Red,
            TextTint::Popup(PopupKind::Heal) => Color::Green,
            TextTint::Popup(PopupKind::Mana) => Color::Cyan,
            TextTint::Caption => Color::White,
        };
        let Some(color) = shade(base, alpha) else {
            return Ok(());
        };
        let (col, row) = self.to_cell(pos);
        let width = text.chars().count() as i32;
        self.put(col - width / 2, row, text, color)
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    state: &GameState,
    sprites: &mut SpriteCache<Glyph>,
    paused: bool,
) -> std::io::Result<()> {
    let (cols, rows) = terminal::size()?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, cols, rows)?;
    draw_hud(out, state, cols)?;

    {
        let mut scene = TerminalRenderer::new(out, cols, rows, state.tuning.world);
        render::draw_frame(state, sprites, &mut scene)?;
    }

    draw_controls_hint(out, rows)?;

    if state.status == GameStatus::GameOver {
        draw_game_over(out, state, cols, rows)?;
    } else if paused {
        draw_paused(out, cols, rows)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, cols: u16, rows: u16) -> std::io::Result<()> {
    let w = cols as usize;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    // Row 1: top bar
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    // Row h-2: bottom bar, which doubles as the ground
    out.queue(cursor::MoveTo(0, rows.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "▀".repeat(w.saturating_sub(2)))))?;

    // Side walls
    for row in 2..rows.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn bar(value: i32, max: i32, width: usize) -> String {
    let filled = if max > 0 {
        (value.clamp(0, max) as usize * width) / max as usize
    } else {
        0
    };
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn draw_hud<W: Write>(out: &mut W, state: &GameState, cols: u16) -> std::io::Result<()> {
    let p = &state.player;

    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_HP))?;
    out.queue(Print(format!("HP {} {:>3}/{:<3} ", bar(p.hp, p.max_hp(), 10), p.hp, p.max_hp())))?;
    out.queue(style::SetForegroundColor(C_HUD_MANA))?;
    out.queue(Print(format!("MP {} {:>3}/{:<3} ", bar(p.mana, p.max_mana(), 10), p.mana, p.max_mana())))?;

    // Cooldowns, shown in seconds
    let rate = state.tuning.world.tick_rate.max(1);
    let secs = |ticks: u32| ticks.div_ceil(rate);
    out.queue(style::SetForegroundColor(C_HUD_COOLDOWN))?;
    let ult = if p.ultimate_active() {
        "ULT ON ".to_string()
    } else if p.ultimate_cooldown > 0 {
        format!("ULT {}s ", secs(p.ultimate_cooldown))
    } else {
        "ULT -- ".to_string()
    };
    out.queue(Print(ult))?;
    if p.grenade_cooldown > 0 {
        out.queue(Print(format!("GRN {}s", secs(p.grenade_cooldown))))?;
    } else {
        out.queue(Print("GRN --"))?;
    }

    // Right side
    let elapsed = state.seconds_alive();
    let right_str = format!(
        "Time {:02}:{:02}  Foes {}  Kills {}  Lv {}",
        elapsed / 60,
        elapsed % 60,
        state.alive_enemies(),
        state.kills,
        state.spawner.difficulty
    );
    let rx = cols.saturating_sub(right_str.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_TEXT))?;
    out.queue(Print(&right_str))?;

    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, rows: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "← → / A D : Move   W/↑ : Jump   SPACE : Attack   X : Ultimate   Q : Grenade   P : Pause   ESC : Quit",
    ))?;
    Ok(())
}

// ── Pause overlay ─────────────────────────────────────────────────────────────

fn draw_paused<W: Write>(out: &mut W, cols: u16, rows: u16) -> std::io::Result<()> {
    let lines = ["  PAUSED  ", "P - Resume  ESC - Quit"];
    for (i, msg) in lines.iter().enumerate() {
        let col = (cols / 2).saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, rows / 2 + i as u16))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(*msg))?;
    }
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(
    out: &mut W,
    state: &GameState,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    let elapsed = state.seconds_alive();
    let time_line = format!("Time alive: {:02}:{:02}", elapsed / 60, elapsed % 60);
    let kills_line = format!("Kills: {}", state.kills);

    let lines: &[(&str, Color)] = &[
        ("╔════════════════════╗", Color::Red),
        ("║    GAME  OVER      ║", Color::Red),
        ("╚════════════════════╝", Color::Red),
    ];

    let cx = cols / 2;
    let total_rows = lines.len() + 3; // 3 box lines + time + kills + hint
    let start_row = (rows / 2).saturating_sub(total_rows as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }

    let rest: [(&str, Color); 3] = [
        (&time_line, Color::Yellow),
        (&kills_line, Color::Yellow),
        ("R - Play Again  M - Menu  ESC - Quit", Color::White),
    ];
    for (i, (msg, color)) in rest.iter().enumerate() {
        let row = start_row + (lines.len() + i) as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_sheet_has_art() {
        let sheets = [
            Sheet::PlayerIdle,
            Sheet::PlayerWalk,
            Sheet::PlayerAttack,
            Sheet::Enemy(EnemyKind::Hornet),
            Sheet::EnemyDead(EnemyKind::Wolf),
            Sheet::Explosion,
            Sheet::Potion(PotionKind::Health),
            Sheet::UltimateWave,
            Sheet::Badge,
        ];
        for sheet in sheets {
            for frame in 0..4 {
                let g = glyph_for(&SpriteKey::new(sheet, Some(Direction::Left), frame)).unwrap();
                assert!(!g.lines.is_empty());
            }
        }
    }

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(bar(50, 100, 10), "█████░░░░░");
        assert_eq!(bar(0, 100, 4), "░░░░");
        assert_eq!(bar(150, 100, 4), "████");
    }

    #[test]
    fn sprites_are_clipped_to_play_area() {
        let mut buf: Vec<u8> = Vec::new();
        {
            let mut r = TerminalRenderer::new(&mut buf, 80, 24, WorldTuning::default());
            let glyph = glyph_for(&SpriteKey::new(Sheet::Grenade, None, 0)).unwrap();
            r.draw_sprite(&glyph, Vec2::new(-5000.0, -5000.0), None, None).unwrap();
        }
        assert!(buf.is_empty());
    }
}
