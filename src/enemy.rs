//! Enemies: ground chasers and oscillating fliers in a single record.
//!
//! Behaviour is selected by the `Behavior` payload rather than by subtype, so
//! update and draw code dispatch with a `match`.

use glam::Vec2;
use rand::Rng;

use crate::animation::{Animator, LOCOMOTION_SPEED};
use crate::config::WorldTuning;
use crate::entities::{Direction, EnemyId, EnemyKind, PotionKind};
use crate::geometry::{self, Rect, SPRITE_SIZE};
use crate::popup::{self, Popup, PopupKind};

/// Horizontal gap (centre to centre) at which chasers stop advancing.
pub const STOP_DISTANCE: f32 = 60.0;
/// Ticks a dead chaser lies still before fading.
pub const SETTLE_DELAY: u32 = 60;
/// Ticks between two body hits on the player.
pub const CONTACT_COOLDOWN: u32 = 30;

const CHASER_FADE_STEP: u8 = 10;
const FLIER_FADE_STEP: u8 = 5;
const FLIER_GRAVITY: f32 = 0.6;
const FLIER_AMPLITUDE: f32 = 60.0;
const FLIER_PHASE_STEP: f32 = 0.08;
/// Base altitude of fliers, above the ground line.
const FLIER_ALTITUDE: f32 = 120.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Life {
    Alive,
    Dead,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Behavior {
    Chaser,
    Flier {
        base_y: f32,
        phase: f32,
        fall_velocity: f32,
        landed: bool,
    },
}

/// What an enemy may leave behind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Drop {
    pub item: PotionKind,
    pub chance: f64,
}

/// Combat stats as rolled by the spawner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    pub max_hp: i32,
    pub speed: f32,
    pub dmg_min: i32,
    pub dmg_max: i32,
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub facing: Direction,
    pub hp: i32,
    pub max_hp: i32,
    pub speed: f32,
    pub dmg_min: i32,
    pub dmg_max: i32,
    pub life: Life,
    /// Ticks since death.
    pub death_ticks: u32,
    pub fade_alpha: u8,
    pub contact_cooldown: u32,
    pub drop: Option<Drop>,
    pub item_dropped: bool,
    pub behavior: Behavior,
    pub animator: Animator,
    pub popups: Vec<Popup>,
}

impl Enemy {
    pub fn new(
        id: EnemyId,
        kind: EnemyKind,
        pos: Vec2,
        facing: Direction,
        stats: EnemyStats,
        drop: Option<Drop>,
    ) -> Enemy {
        let behavior = if kind.is_flying() {
            Behavior::Flier {
                base_y: pos.y,
                phase: 0.0,
                fall_velocity: 0.0,
                landed: false,
            }
        } else {
            Behavior::Chaser
        };
        Enemy {
            id,
            kind,
            pos,
            facing,
            hp: stats.max_hp,
            max_hp: stats.max_hp,
            speed: stats.speed,
            dmg_min: stats.dmg_min,
            dmg_max: stats.dmg_max.max(stats.dmg_min),
            life: Life::Alive,
            death_ticks: 0,
            fade_alpha: 255,
            contact_cooldown: 0,
            drop,
            item_dropped: false,
            behavior,
            animator: Animator::new(),
            popups: Vec::new(),
        }
    }

    /// Altitude fliers cruise around for a given world.
    pub fn flier_altitude(world: &WorldTuning) -> f32 {
        world.ground_y() - FLIER_ALTITUDE
    }

    pub fn is_alive(&self) -> bool {
        self.life == Life::Alive
    }

    pub fn hitbox(&self) -> Rect {
        geometry::enemy_hitbox(self.pos)
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + SPRITE_SIZE / 2.0
    }

    /// Dead and no longer moving: chasers immediately, fliers once landed.
    pub fn is_settled(&self) -> bool {
        match (self.life, self.behavior) {
            (Life::Alive, _) => false,
            (Life::Dead, Behavior::Chaser) => true,
            (Life::Dead, Behavior::Flier { landed, .. }) => landed,
        }
    }

    /// The death sequence has played out and the enemy can be removed.
    pub fn is_finished(&self) -> bool {
        self.is_settled() && self.fade_alpha == 0
    }

    // ── Per-tick update ───────────────────────────────────────────────────────

    pub fn update(&mut self, player_center_x: f32, world: &WorldTuning) {
        popup::update_popups(&mut self.popups);
        self.contact_cooldown = self.contact_cooldown.saturating_sub(1);

        if self.life == Life::Dead {
            self.update_dead(world);
            return;
        }

        self.animator.advance(LOCOMOTION_SPEED, self.kind.frame_count());
        match self.behavior {
            Behavior::Chaser => self.chase(player_center_x),
            Behavior::Flier { .. } => self.fly(world),
        }
    }

    fn chase(&mut self, player_center_x: f32) {
        let dx = player_center_x - self.center_x();
        if dx.abs() <= STOP_DISTANCE {
            return;
        }
        self.facing = if dx > 0.0 { Direction::Right } else { Direction::Left };
        self.pos.x += self.facing.sign() * self.speed;
    }

    fn fly(&mut self, world: &WorldTuning) {
        let Behavior::Flier { base_y, phase, .. } = &mut self.behavior else {
            return;
        };
        *phase += FLIER_PHASE_STEP;
        self.pos.y = *base_y + phase.sin() * FLIER_AMPLITUDE;

        self.pos.x += self.facing.sign() * self.speed;
        let max_x = world.width - SPRITE_SIZE;
        if self.pos.x <= 0.0 || self.pos.x >= max_x {
            self.pos.x = self.pos.x.clamp(0.0, max_x);
            self.facing = self.facing.flipped();
        }
    }

    fn update_dead(&mut self, world: &WorldTuning) {
        self.death_ticks += 1;
        match &mut self.behavior {
            Behavior::Chaser => {
                if self.death_ticks > SETTLE_DELAY {
                    self.fade_alpha = self.fade_alpha.saturating_sub(CHASER_FADE_STEP);
                }
            }
            Behavior::Flier { fall_velocity, landed, .. } => {
                self.fade_alpha = self.fade_alpha.saturating_sub(FLIER_FADE_STEP);
                if !*landed {
                    *fall_velocity += FLIER_GRAVITY;
                    self.pos.y += *fall_velocity;
                    let ground = world.ground_y();
                    if self.pos.y >= ground {
                        self.pos.y = ground;
                        *fall_velocity = 0.0;
                        *landed = true;
                    }
                }
            }
        }
    }

    // ── Combat ────────────────────────────────────────────────────────────────

    /// Apply a hit. Returns `true` only for the hit that killed it.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.hp -= amount;
        let anchor = Vec2::new(self.pos.x + SPRITE_SIZE / 2.0, self.pos.y - 25.0);
        self.popups.push(Popup::new(amount, anchor, PopupKind::Damage));

        if self.hp <= 0 && self.life == Life::Alive {
            self.life = Life::Dead;
            self.animator.reset();
            self.death_ticks = 0;
            self.fade_alpha = 255;
            return true;
        }
        false
    }

    /// Roll damage against the player if the contact cooldown allows it.
    /// Sets the cooldown on success.
    pub fn try_contact_damage(&mut self, rng: &mut impl Rng) -> Option<i32> {
        if !self.is_alive() || self.contact_cooldown > 0 {
            return None;
        }
        self.contact_cooldown = CONTACT_COOLDOWN;
        Some(rng.gen_range(self.dmg_min..=self.dmg_max))
    }

    /// Resolve the loot roll. Runs at most once per enemy, on the first call
    /// after it has died and settled, whatever the outcome.
    pub fn roll_drop(&mut self, rng: &mut impl Rng) -> Option<PotionKind> {
        if self.item_dropped || !self.is_settled() {
            return None;
        }
        self.item_dropped = true;
        let drop = self.drop?;
        if rng.gen_bool(drop.chance.clamp(0.0, 1.0)) {
            Some(drop.item)
        } else {
            None
        }
    }

    /// Where a dropped item appears.
    pub fn drop_point(&self) -> Vec2 {
        self.hitbox().center()
    }
}
