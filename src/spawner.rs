//! Time-driven difficulty ramp and enemy selection.

use glam::Vec2;
use rand::Rng;

use crate::config::{SpawnerTuning, WorldTuning};
use crate::enemy::{Drop, Enemy, EnemyStats};
use crate::entities::{Direction, EnemyId, EnemyKind, PotionKind};
use crate::geometry::SPRITE_SIZE;

// ── Difficulty tables ────────────────────────────────────────────────────────

/// Stats for `kind` at difficulty `d` (1-based).
pub fn stats_for(kind: EnemyKind, d: u32) -> EnemyStats {
    let half = (d / 2) as i32;
    let third = (d / 3) as f32;
    match kind {
        EnemyKind::Wolf => EnemyStats {
            max_hp: 5,
            speed: 6.0 + half as f32,
            dmg_min: 1 + half,
            dmg_max: 7 + half,
        },
        EnemyKind::Brute => EnemyStats {
            max_hp: 10,
            speed: 3.0 + third,
            dmg_min: 3 + half,
            dmg_max: 11 + half,
        },
        EnemyKind::Bat => EnemyStats {
            max_hp: 4,
            speed: 4.0 + third,
            dmg_min: 2 + half,
            dmg_max: 6 + half,
        },
        EnemyKind::Hornet => EnemyStats {
            max_hp: 6,
            speed: 5.0 + third,
            dmg_min: 3 + half,
            dmg_max: 8 + half,
        },
    }
}

/// Loot table.
pub fn drop_for(kind: EnemyKind) -> Drop {
    match kind {
        EnemyKind::Wolf => Drop { item: PotionKind::Mana, chance: 0.25 },
        EnemyKind::Brute => Drop { item: PotionKind::Health, chance: 0.30 },
        EnemyKind::Bat => Drop { item: PotionKind::Mana, chance: 0.35 },
        EnemyKind::Hornet => Drop { item: PotionKind::Health, chance: 0.25 },
    }
}

/// Probability that a spawn at difficulty `d` is a flier.
pub fn flier_chance(d: u32) -> f64 {
    (0.1 * d.saturating_sub(1) as f64).min(0.4)
}

/// First difficulty at which hornets replace half of the fliers.
const HORNET_DIFFICULTY: u32 = 4;

// ── Spawner ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Spawner {
    pub spawn_timer: u32,
    pub difficulty_timer: u32,
    pub difficulty: u32,
    pub game_time: u64,
    next_id: u64,
    tuning: SpawnerTuning,
    world: WorldTuning,
}

impl Spawner {
    pub fn new(tuning: SpawnerTuning, world: WorldTuning) -> Spawner {
        Spawner {
            spawn_timer: 0,
            difficulty_timer: 0,
            difficulty: 1,
            game_time: 0,
            next_id: 0,
            tuning,
            world,
        }
    }

    /// Ticks that must pass between spawns at the current difficulty.
    pub fn spawn_interval(&self) -> u32 {
        let step = self.tuning.spawn_interval_step.saturating_mul(self.difficulty);
        self.tuning
            .base_spawn_interval
            .saturating_sub(step)
            .max(self.tuning.min_spawn_interval)
    }

    /// Advance one tick. Returns the enemy to add, if one is due.
    pub fn update(&mut self, player_alive: bool, rng: &mut impl Rng) -> Option<Enemy> {
        self.game_time += 1;
        self.spawn_timer += 1;
        self.difficulty_timer += 1;

        if self.difficulty_timer > self.tuning.difficulty_interval {
            self.difficulty += 1;
            self.difficulty_timer = 0;
            log::info!("Difficulty raised to {}", self.difficulty);
        }

        if !player_alive || self.spawn_timer <= self.spawn_interval() {
            return None;
        }
        self.spawn_timer = 0;
        Some(self.spawn(rng))
    }

    fn pick_kind(&self, rng: &mut impl Rng) -> EnemyKind {
        if rng.gen_bool(flier_chance(self.difficulty)) {
            if self.difficulty >= HORNET_DIFFICULTY && rng.gen_bool(0.5) {
                EnemyKind::Hornet
            } else {
                EnemyKind::Bat
            }
        } else if rng.gen_bool(0.5) {
            EnemyKind::Wolf
        } else {
            EnemyKind::Brute
        }
    }

    fn spawn(&mut self, rng: &mut impl Rng) -> Enemy {
        let from_left = rng.gen_bool(0.5);
        let (x, facing) = if from_left {
            (0.0, Direction::Right)
        } else {
            (self.world.width - SPRITE_SIZE, Direction::Left)
        };
        let kind = self.pick_kind(rng);
        let y = if kind.is_flying() {
            Enemy::flier_altitude(&self.world)
        } else {
            self.world.ground_y()
        };

        let id = EnemyId(self.next_id);
        self.next_id += 1;
        log::debug!("Spawned {:?} #{} at difficulty {}", kind, id.0, self.difficulty);
        Enemy::new(
            id,
            kind,
            Vec2::new(x, y),
            facing,
            stats_for(kind, self.difficulty),
            Some(drop_for(kind)),
        )
    }
}
