//! Shared entity vocabulary and the master game state.
//!
//! The per-entity behaviour lives in its own module (`player`, `enemy`,
//! `grenade`, `potion`); this file only names things and holds them together.

use crate::config::Tuning;
use crate::effects::EffectManager;
use crate::enemy::Enemy;
use crate::grenade::Grenade;
use crate::player::Player;
use crate::potion::Potion;
use crate::services::SoundId;
use crate::spawner::Spawner;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    Left,
    #[default]
    Right,
}

impl Direction {
    /// -1.0 for left, 1.0 for right.
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    GameOver,
}

/// Stable identity of an enemy for the lifetime of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    /// Fast, fragile ground chaser.
    Wolf,
    /// Slow, tough ground chaser.
    Brute,
    /// Weak flier.
    Bat,
    /// Late-game flier.
    Hornet,
}

impl EnemyKind {
    pub fn is_flying(self) -> bool {
        matches!(self, EnemyKind::Bat | EnemyKind::Hornet)
    }

    /// Number of frames in the walk/fly cycle.
    pub fn frame_count(self) -> usize {
        match self {
            EnemyKind::Wolf => 4,
            EnemyKind::Brute => 3,
            EnemyKind::Bat => 2,
            EnemyKind::Hornet => 3,
        }
    }

    /// Mana granted to the player for a melee kill.
    pub fn mana_reward(self) -> i32 {
        match self {
            EnemyKind::Wolf => 10,
            EnemyKind::Brute => 12,
            EnemyKind::Bat => 8,
            EnemyKind::Hornet => 10,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PotionKind {
    Mana,
    Health,
}

impl PotionKind {
    /// Amount of mana or hp restored on collection.
    pub fn restore_amount(self) -> i32 {
        match self {
            PotionKind::Mana => 30,
            PotionKind::Health => 25,
        }
    }
}

// ── Master game state ─────────────────────────────────────────────────────────

/// Everything a run owns. The simulation step in `compute` is the only
/// writer; renderers and the HUD only read it.
#[derive(Clone, Debug)]
pub struct GameState {
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub grenades: Vec<Grenade>,
    pub potions: Vec<Potion>,
    pub effects: EffectManager,
    pub spawner: Spawner,
    pub status: GameStatus,
    pub kills: u32,
    /// Ticks simulated while playing.
    pub ticks: u64,
    pub tuning: Tuning,
    /// Sounds requested this frame, drained by the frame loop.
    pub sounds: Vec<SoundId>,
}

impl GameState {
    /// Whole seconds survived, for the HUD.
    pub fn seconds_alive(&self) -> u64 {
        self.ticks / u64::from(self.tuning.world.tick_rate.max(1))
    }

    pub fn drain_sounds(&mut self) -> std::vec::Drain<'_, SoundId> {
        self.sounds.drain(..)
    }

    pub fn alive_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }
}
