//! Visual-only overlays driven by gameplay events.
//!
//! Effects never touch gameplay entities. The simulation step hands them
//! positions when it spawns them and reads back exactly one thing: the damage
//! area of the ultimate's wave.

use glam::Vec2;

use crate::config::WorldTuning;
use crate::entities::Direction;
use crate::geometry::Rect;

pub const MAX_ALPHA: f32 = 255.0;

/// Frames in the ultimate's wave sequence and ticks each is shown.
pub const WAVE_FRAMES: usize = 6;
pub const WAVE_TICKS_PER_FRAME: u32 = 5;
/// Reach of the wave in front of the player, and its height.
pub const WAVE_REACH: f32 = 520.0;
pub const WAVE_HEIGHT: f32 = 220.0;

const ICON_SIZE: f32 = 150.0;
const BADGE_SCALE_MIN: f32 = 0.9;
const BADGE_SCALE_MAX: f32 = 1.1;
const BADGE_SCALE_STEP: f32 = 0.01;
const BADGE_FLOAT_MAX: f32 = 6.0;
const BADGE_FLOAT_STEP: f32 = 0.4;
const BADGE_FADE: f32 = 20.0;
const BURST_GROWTH: f32 = 0.05;
const BURST_MAX_SCALE: f32 = 2.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IconKind {
    /// Shown above the player when a grenade is thrown.
    Milk,
    /// Critical melee hit.
    Crit,
    /// Potion collected.
    Sparkle,
}

/// Pulsing, floating indicator tied to a HUD slot.
#[derive(Clone, Debug, PartialEq)]
pub struct Badge {
    pub anchor: Vec2,
    pub caption: Option<String>,
    pub ready: bool,
    pub scale: f32,
    growing: bool,
    pub float_offset: f32,
    rising: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EffectKind {
    /// Fades in, holds, fades out.
    Icon { icon: IconKind, pos: Vec2 },
    Badge(Badge),
    /// The ultimate's directional sequence.
    Wave {
        origin: Vec2,
        direction: Direction,
        frame: usize,
    },
    /// Growing flash at the centre of the screen.
    Burst { center: Vec2, scale: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Effect {
    pub kind: EffectKind,
    pub alpha: f32,
    pub age: u32,
    pub duration: u32,
}

impl Effect {
    /// Alpha gained per tick while fading in and lost per tick while fading
    /// out.
    fn fade_rates(&self) -> (f32, f32) {
        match self.kind {
            EffectKind::Icon { .. } => (15.0, 10.0),
            EffectKind::Wave { .. } => (40.0, 12.0),
            EffectKind::Burst { .. } => (30.0, 4.0),
            EffectKind::Badge(_) => (BADGE_FADE, BADGE_FADE),
        }
    }

    fn is_well_formed(&self) -> bool {
        let finite = |v: Vec2| v.is_finite();
        let shape_ok = match &self.kind {
            EffectKind::Icon { pos, .. } => finite(*pos),
            EffectKind::Badge(b) => finite(b.anchor),
            EffectKind::Wave { origin, .. } => finite(*origin),
            EffectKind::Burst { center, scale } => finite(*center) && scale.is_finite(),
        };
        shape_ok && self.alpha.is_finite() && (self.duration > 0 || matches!(self.kind, EffectKind::Badge(_)))
    }

    pub fn alpha_u8(&self) -> u8 {
        self.alpha.clamp(0.0, MAX_ALPHA) as u8
    }

    fn is_done(&self) -> bool {
        match self.kind {
            // Badges live for the whole run and just fade to invisible.
            EffectKind::Badge(_) => false,
            _ => self.alpha <= 0.0 && self.age >= self.duration,
        }
    }

    fn update(&mut self) {
        self.age = self.age.saturating_add(1);
        let (fade_in, fade_out) = self.fade_rates();

        if let EffectKind::Badge(badge) = &mut self.kind {
            badge.step();
            self.alpha = if badge.ready {
                (self.alpha + fade_in).min(MAX_ALPHA)
            } else {
                (self.alpha - fade_out).max(0.0)
            };
            return;
        }

        if self.age < self.duration / 2 {
            self.alpha = (self.alpha + fade_in).min(MAX_ALPHA);
        } else {
            self.alpha = (self.alpha - fade_out).max(0.0);
        }

        match &mut self.kind {
            EffectKind::Wave { frame, .. } => {
                *frame = ((self.age / WAVE_TICKS_PER_FRAME) as usize).min(WAVE_FRAMES - 1);
            }
            EffectKind::Burst { scale, .. } => {
                *scale = (*scale + BURST_GROWTH).min(BURST_MAX_SCALE);
            }
            EffectKind::Icon { .. } | EffectKind::Badge(_) => {}
        }
    }

    /// Damage area of a wave effect.
    pub fn damage_area(&self) -> Option<Rect> {
        match self.kind {
            EffectKind::Wave { origin, direction, .. } => Some(wave_area(origin, direction)),
            _ => None,
        }
    }
}

impl Badge {
    fn step(&mut self) {
        if self.growing {
            self.scale += BADGE_SCALE_STEP;
            if self.scale >= BADGE_SCALE_MAX {
                self.scale = BADGE_SCALE_MAX;
                self.growing = false;
            }
        } else {
            self.scale -= BADGE_SCALE_STEP;
            if self.scale <= BADGE_SCALE_MIN {
                self.scale = BADGE_SCALE_MIN;
                self.growing = true;
            }
        }

        if self.rising {
            self.float_offset -= BADGE_FLOAT_STEP;
            if self.float_offset <= -BADGE_FLOAT_MAX {
                self.float_offset = -BADGE_FLOAT_MAX;
                self.rising = false;
            }
        } else {
            self.float_offset += BADGE_FLOAT_STEP;
            if self.float_offset >= BADGE_FLOAT_MAX {
                self.float_offset = BADGE_FLOAT_MAX;
                self.rising = true;
            }
        }
    }

    /// Where to draw it this tick.
    pub fn position(&self) -> Vec2 {
        self.anchor + Vec2::new(0.0, self.float_offset)
    }
}

/// Rectangle swept by an ultimate fired from `origin` toward `direction`.
pub fn wave_area(origin: Vec2, direction: Direction) -> Rect {
    let top = origin.y - WAVE_HEIGHT / 2.0;
    match direction {
        Direction::Right => Rect::new(origin.x, top, WAVE_REACH, WAVE_HEIGHT),
        Direction::Left => Rect::new(origin.x - WAVE_REACH, top, WAVE_REACH, WAVE_HEIGHT),
    }
}

// ── Manager ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct EffectManager {
    effects: Vec<Effect>,
}

impl EffectManager {
    pub fn new() -> EffectManager {
        EffectManager::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Add an effect. Malformed instances are dropped with a warning.
    pub fn spawn(&mut self, effect: Effect) {
        if !effect.is_well_formed() {
            log::warn!("Dropping malformed effect: {:?}", effect);
            return;
        }
        self.effects.push(effect);
    }

    /// Icon centred horizontally above `above`, kept on screen.
    pub fn add_icon(&mut self, icon: IconKind, above: Vec2, duration: u32, world: &WorldTuning) {
        let x = (above.x - ICON_SIZE / 2.0).clamp(0.0, (world.width - ICON_SIZE).max(0.0));
        let y = (above.y - ICON_SIZE - 20.0).max(0.0);
        self.spawn(Effect {
            kind: EffectKind::Icon { icon, pos: Vec2::new(x, y) },
            alpha: 0.0,
            age: 0,
            duration,
        });
    }

    pub fn add_wave(&mut self, origin: Vec2, direction: Direction) {
        self.spawn(Effect {
            kind: EffectKind::Wave { origin, direction, frame: 0 },
            alpha: 0.0,
            age: 0,
            duration: WAVE_FRAMES as u32 * WAVE_TICKS_PER_FRAME,
        });
    }

    pub fn add_burst(&mut self, center: Vec2, duration: u32) {
        self.spawn(Effect {
            kind: EffectKind::Burst { center, scale: 1.0 },
            alpha: 0.0,
            age: 0,
            duration,
        });
    }

    /// Show or hide the ultimate-ready badge. There is only ever one; later
    /// calls update it in place.
    pub fn set_ultimate_badge(&mut self, ready: bool, anchor: Vec2, caption: &str) {
        if let Some(badge) = self.effects.iter_mut().find_map(|e| match &mut e.kind {
            EffectKind::Badge(b) => Some(b),
            _ => None,
        }) {
            badge.ready = ready;
            badge.anchor = anchor;
            return;
        }
        self.spawn(Effect {
            kind: EffectKind::Badge(Badge {
                anchor,
                caption: Some(caption.to_string()),
                ready,
                scale: 1.0,
                growing: true,
                float_offset: 0.0,
                rising: true,
            }),
            alpha: 0.0,
            age: 0,
            duration: 0,
        });
    }

    pub fn badge(&self) -> Option<&Badge> {
        self.effects.iter().find_map(|e| match &e.kind {
            EffectKind::Badge(b) => Some(b),
            _ => None,
        })
    }

    /// Damage rectangle of the most recent ultimate wave still on screen.
    pub fn ultimate_area(&self) -> Option<Rect> {
        self.effects.iter().rev().find_map(Effect::damage_area)
    }

    pub fn update(&mut self) {
        for effect in self.effects.iter_mut() {
            effect.update();
        }
        self.effects.retain(|e| {
            if !e.is_well_formed() {
                log::warn!("Discarding effect that went malformed: {:?}", e.kind);
                return false;
            }
            !e.is_done()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_fades_in_then_out_and_is_removed() {
        let world = WorldTuning::default();
        let mut m = EffectManager::new();
        m.add_icon(IconKind::Milk, Vec2::new(640.0, 400.0), 60, &world);
        let mut peak: f32 = 0.0;
        for _ in 0..30 {
            m.update();
            peak = peak.max(m.iter().next().unwrap().alpha);
        }
        assert_eq!(peak, MAX_ALPHA);
        for _ in 0..40 {
            m.update();
        }
        assert!(m.is_empty());
    }

    #[test]
    fn icon_is_kept_on_screen() {
        let world = WorldTuning::default();
        let mut m = EffectManager::new();
        m.add_icon(IconKind::Crit, Vec2::new(5.0, 10.0), 30, &world);
        match m.iter().next().unwrap().kind {
            EffectKind::Icon { pos, .. } => assert_eq!(pos, Vec2::new(0.0, 0.0)),
            _ => unreachable!(),
        };
    }

    #[test]
    fn burst_outlives_standard_fade() {
        let mut m = EffectManager::new();
        m.add_burst(Vec2::new(640.0, 360.0), 40);
        for _ in 0..60 {
            m.update();
        }
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn badge_is_never_duplicated() {
        let mut m = EffectManager::new();
        m.set_ultimate_badge(false, Vec2::ZERO, "ULTIMATE READY");
        m.set_ultimate_badge(true, Vec2::ZERO, "ULTIMATE READY");
        m.set_ultimate_badge(true, Vec2::new(5.0, 5.0), "ULTIMATE READY");
        assert_eq!(m.len(), 1);
        assert!(m.badge().unwrap().ready);
    }

    #[test]
    fn badge_pulse_stays_within_bounds() {
        let mut m = EffectManager::new();
        m.set_ultimate_badge(true, Vec2::ZERO, "ULTIMATE READY");
        for _ in 0..200 {
            m.update();
            let b = m.badge().unwrap();
            assert!(b.scale >= BADGE_SCALE_MIN && b.scale <= BADGE_SCALE_MAX);
            assert!(b.float_offset.abs() <= BADGE_FLOAT_MAX);
        }
    }

    #[test]
    fn wave_area_follows_direction() {
        let origin = Vec2::new(600.0, 500.0);
        let right = wave_area(origin, Direction::Right);
        let left = wave_area(origin, Direction::Left);
        assert_eq!(right.x, 600.0);
        assert_eq!(left.right(), 600.0);
    }

    #[test]
    fn malformed_effect_is_dropped() {
        let mut m = EffectManager::new();
        m.add_burst(Vec2::new(f32::NAN, 0.0), 40);
        m.add_icon(IconKind::Milk, Vec2::new(100.0, 300.0), 0, &WorldTuning::default());
        assert!(m.is_empty());
    }
}
