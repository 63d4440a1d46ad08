//! Seams to the outside world: input snapshots, audio, rendering and the
//! sprite cache. The simulation only ever talks to these traits.

use std::collections::HashMap;

use glam::Vec2;

use crate::effects::IconKind;
use crate::entities::{Direction, EnemyKind, PotionKind};
use crate::error::AssetError;
use crate::geometry::SPRITE_SIZE;
use crate::popup::PopupKind;

// ── Input ─────────────────────────────────────────────────────────────────────

/// Logical keys held during one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Keys {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub attack: bool,
    pub ultimate: bool,
    pub grenade: bool,
}

// ── Audio ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundId {
    Swing,
    Hit,
    Crit,
    PlayerHurt,
    EnemyDeath,
    Ultimate,
    GrenadeThrow,
    Explosion,
    PotionPickup,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackId {
    Soundtrack,
}

/// Fire-and-forget sound playback.
pub trait AudioSink {
    fn play_effect(&mut self, sound: SoundId);
    fn play_track(&mut self, track: TrackId);
    fn stop_track(&mut self);
}

// ── Sprites ───────────────────────────────────────────────────────────────────

/// Which image set a sprite belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sheet {
    PlayerIdle,
    PlayerWalk,
    PlayerJump,
    PlayerAttack,
    PlayerUltimate,
    Enemy(EnemyKind),
    EnemyDead(EnemyKind),
    Grenade,
    Explosion,
    Potion(PotionKind),
    Icon(IconKind),
    UltimateWave,
    Burst,
    Badge,
}

impl Sheet {
    /// Size of one frame in world pixels.
    pub fn footprint(self) -> Vec2 {
        match self {
            Sheet::PlayerIdle
            | Sheet::PlayerWalk
            | Sheet::PlayerJump
            | Sheet::PlayerAttack
            | Sheet::PlayerUltimate
            | Sheet::Enemy(_)
            | Sheet::EnemyDead(_) => Vec2::splat(SPRITE_SIZE),
            Sheet::Grenade => Vec2::splat(36.0),
            Sheet::Explosion => Vec2::splat(200.0),
            Sheet::Potion(_) => Vec2::splat(40.0),
            Sheet::Icon(_) => Vec2::splat(150.0),
            Sheet::UltimateWave => Vec2::new(520.0, 220.0),
            Sheet::Burst => Vec2::splat(300.0),
            Sheet::Badge => Vec2::new(160.0, 48.0),
        }
    }
}

/// One frame of one sheet. `facing` is `None` for sets without mirrored
/// frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpriteKey {
    pub sheet: Sheet,
    pub facing: Option<Direction>,
    pub frame: usize,
}

impl SpriteKey {
    pub fn new(sheet: Sheet, facing: Option<Direction>, frame: usize) -> SpriteKey {
        SpriteKey { sheet, facing, frame }
    }
}

/// Colour role for text draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextTint {
    Popup(PopupKind),
    Caption,
}

/// Immediate-mode drawing backend.
pub trait Renderer {
    type Handle: Clone;
    type Error;

    /// Resolve a sprite. Called at most once per key; see `SpriteCache`.
    fn load_sprite(&mut self, key: &SpriteKey) -> Result<Self::Handle, AssetError>;

    fn draw_sprite(
        &mut self,
        sprite: &Self::Handle,
        pos: Vec2,
        alpha: Option<u8>,
        scale: Option<f32>,
    ) -> Result<(), Self::Error>;

    fn draw_text(&mut self, text: &str, pos: Vec2, alpha: u8, tint: TextTint) -> Result<(), Self::Error>;
}

/// Per-run memo of resolved sprites. A key that failed to load stays absent
/// for the rest of the run and is skipped without retrying.
#[derive(Debug)]
pub struct SpriteCache<H> {
    entries: HashMap<SpriteKey, Option<H>>,
}

impl<H> Default for SpriteCache<H> {
    fn default() -> Self {
        SpriteCache { entries: HashMap::new() }
    }
}

impl<H: Clone> SpriteCache<H> {
    pub fn new() -> SpriteCache<H> {
        SpriteCache::default()
    }

    pub fn get_or_load<F>(&mut self, key: SpriteKey, load: F) -> Option<H>
    where
        F: FnOnce(&SpriteKey) -> Result<H, AssetError>,
    {
        self.entries
            .entry(key)
            .or_insert_with(|| match load(&key) {
                Ok(handle) => Some(handle),
                Err(e) => {
                    log::warn!("{}; drawing of {:?} disabled", e, key);
                    None
                }
            })
            .clone()
    }

    pub fn missing(&self) -> usize {
        self.entries.values().filter(|v| v.is_none()).count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_loads_each_key_once() {
        let mut cache: SpriteCache<u32> = SpriteCache::new();
        let key = SpriteKey::new(Sheet::Grenade, Some(Direction::Left), 0);
        let mut calls = 0;
        for _ in 0..3 {
            let got = cache.get_or_load(key, |_| {
                calls += 1;
                Ok(7)
            });
            assert_eq!(got, Some(7));
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn failed_load_is_remembered_as_missing() {
        let mut cache: SpriteCache<u32> = SpriteCache::new();
        let key = SpriteKey::new(Sheet::Burst, None, 0);
        assert_eq!(
            cache.get_or_load(key, |k| Err(AssetError::Missing(format!("{:?}", k)))),
            None
        );
        assert_eq!(cache.get_or_load(key, |_| Ok(1)), None);
        assert_eq!(cache.missing(), 1);
    }
}
