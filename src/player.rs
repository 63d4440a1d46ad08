//! Player controller: input handling, movement, resources and abilities.
//!
//! The player never creates projectiles or effects itself. Abilities push a
//! `PlayerEvent` onto an outbound queue which the simulation step drains once
//! per frame.

use std::collections::HashSet;

use glam::Vec2;

use crate::animation::{Animator, ATTACK_SPEED, LOCOMOTION_SPEED};
use crate::config::{PlayerTuning, WorldTuning};
use crate::entities::{Direction, EnemyId};
use crate::geometry::{self, Rect, SPRITE_SIZE};
use crate::popup::{self, Popup, PopupKind};
use crate::services::Keys;

/// Frames per directional set.
pub const WALK_FRAMES: usize = 4;
pub const JUMP_FRAMES: usize = 4;
pub const ATTACK_FRAMES: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Walk,
    Jump,
    Attack,
    Ultimate,
}

impl PlayerState {
    /// Length of the frame set shown in this state. Idle and ultimate hold a
    /// single static frame.
    pub fn frame_count(self) -> usize {
        match self {
            PlayerState::Walk => WALK_FRAMES,
            PlayerState::Jump => JUMP_FRAMES,
            PlayerState::Attack => ATTACK_FRAMES,
            PlayerState::Idle | PlayerState::Ultimate => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UltimateState {
    Inactive,
    /// `direction` is frozen at activation; turning afterwards does not
    /// redirect it.
    Active { remaining: u32, direction: Direction },
}

/// Requests the simulation step must service, each exactly once.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerEvent {
    /// Spawn the ultimate's visual sequence.
    UltimateEffect { origin: Vec2, direction: Direction },
    /// Apply the ultimate's single damage pass.
    UltimateDamage { origin: Vec2, direction: Direction },
    GrenadeThrown { origin: Vec2, direction: Direction },
}

#[derive(Clone, Debug)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub on_ground: bool,
    pub facing: Direction,
    pub state: PlayerState,
    pub animator: Animator,
    pub hp: i32,
    pub mana: i32,
    pub attack_cooldown: u32,
    pub ultimate: UltimateState,
    pub ultimate_cooldown: u32,
    pub grenade_cooldown: u32,
    /// Enemies already struck by the current swing.
    pub attack_hits: HashSet<EnemyId>,
    pub popups: Vec<Popup>,
    events: Vec<PlayerEvent>,
    pub tuning: PlayerTuning,
    world: WorldTuning,
}

impl Player {
    pub fn new(tuning: PlayerTuning, world: WorldTuning) -> Player {
        Player {
            pos: Vec2::new((world.width / 2.0).floor(), world.ground_y()),
            vel: Vec2::ZERO,
            on_ground: true,
            facing: Direction::Right,
            state: PlayerState::Idle,
            animator: Animator::new(),
            hp: tuning.max_hp,
            mana: tuning.max_mana,
            attack_cooldown: 0,
            ultimate: UltimateState::Inactive,
            ultimate_cooldown: 0,
            grenade_cooldown: 0,
            attack_hits: HashSet::new(),
            popups: Vec::new(),
            events: Vec::new(),
            tuning,
            world,
        }
    }

    pub fn max_hp(&self) -> i32 {
        self.tuning.max_hp
    }

    pub fn max_mana(&self) -> i32 {
        self.tuning.max_mana
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn hitbox(&self) -> Rect {
        geometry::player_hitbox(self.pos)
    }

    pub fn attack_hitbox(&self) -> Rect {
        geometry::attack_hitbox(self.pos, self.facing)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(SPRITE_SIZE / 2.0)
    }

    pub fn ultimate_active(&self) -> bool {
        matches!(self.ultimate, UltimateState::Active { .. })
    }

    pub fn can_use_ultimate(&self) -> bool {
        self.mana >= self.tuning.max_mana && self.ultimate_cooldown == 0
    }

    pub fn can_throw_grenade(&self) -> bool {
        self.mana >= self.tuning.grenade_cost && self.grenade_cooldown == 0
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, keys: &Keys) {
        if self.attack_cooldown == 0 {
            self.handle_movement(keys);
        }

        // Abilities are gated by their own resources, not by the swing.
        if keys.ultimate && self.can_use_ultimate() {
            self.use_ultimate();
        }
        if keys.grenade && self.can_throw_grenade() {
            self.throw_grenade();
        }
    }

    fn handle_movement(&mut self, keys: &Keys) {
        self.vel.x = 0.0;
        let horizontal = match (keys.left, keys.right) {
            (true, _) => Some(Direction::Left),
            (false, true) => Some(Direction::Right),
            _ => None,
        };
        match horizontal {
            Some(dir) => {
                self.vel.x = dir.sign() * self.tuning.speed;
                self.facing = dir;
                if self.on_ground {
                    self.state = PlayerState::Walk;
                }
            }
            None => {
                if self.on_ground {
                    self.state = PlayerState::Idle;
                }
            }
        }

        if keys.jump && self.on_ground {
            self.vel.y = -self.tuning.jump_power;
            self.on_ground = false;
            self.state = PlayerState::Jump;
        }

        if keys.attack {
            self.begin_attack();
        }
    }

    fn begin_attack(&mut self) {
        self.animator.reset();
        self.state = PlayerState::Attack;
        self.attack_cooldown = self.tuning.attack_cooldown;
        self.attack_hits.clear();
    }

    // ── Per-tick update ───────────────────────────────────────────────────────

    pub fn update(&mut self) {
        popup::update_popups(&mut self.popups);

        let max_x = self.world.width - SPRITE_SIZE;
        self.pos.x = (self.pos.x + self.vel.x).clamp(0.0, max_x);

        if !self.on_ground {
            self.vel.y += self.tuning.gravity;
            self.pos.y += self.vel.y;
            let ground = self.world.ground_y();
            if self.pos.y >= ground {
                self.pos.y = ground;
                self.vel.y = 0.0;
                self.on_ground = true;
                self.state = PlayerState::Idle;
            }
        }

        if let UltimateState::Active { remaining, direction } = self.ultimate {
            let remaining = remaining.saturating_sub(1);
            self.ultimate = if remaining == 0 {
                UltimateState::Inactive
            } else {
                UltimateState::Active { remaining, direction }
            };
        }
        self.ultimate_cooldown = self.ultimate_cooldown.saturating_sub(1);
        self.grenade_cooldown = self.grenade_cooldown.saturating_sub(1);

        let speed = if self.state == PlayerState::Attack {
            ATTACK_SPEED
        } else {
            LOCOMOTION_SPEED
        };
        let wrapped = self.animator.advance(speed, self.state.frame_count());
        if wrapped && self.state == PlayerState::Attack {
            self.state = PlayerState::Idle;
            self.attack_hits.clear();
        }

        // Leaving the attack state early cancels what is left of the swing.
        if self.state == PlayerState::Attack {
            self.attack_cooldown = self.attack_cooldown.saturating_sub(1);
        } else {
            self.attack_cooldown = 0;
        }
    }

    // ── Resources ─────────────────────────────────────────────────────────────

    fn popup_anchor(&self) -> Vec2 {
        Vec2::new(self.pos.x + 90.0, self.pos.y - 30.0)
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount).max(0);
        let anchor = self.popup_anchor();
        self.popups.push(Popup::new(amount, anchor, PopupKind::Damage));
    }

    /// Restore hp up to the cap. Returns the amount actually applied; the
    /// popup shows that, not the request.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).min(self.tuning.max_hp);
        let applied = self.hp - before;
        if applied > 0 {
            let anchor = self.popup_anchor();
            self.popups.push(Popup::new(applied, anchor, PopupKind::Heal));
        }
        applied
    }

    /// Restore mana up to the cap. Returns the amount actually applied.
    pub fn restore_mana(&mut self, amount: i32) -> i32 {
        let before = self.mana;
        self.mana = (self.mana + amount.max(0)).min(self.tuning.max_mana);
        let applied = self.mana - before;
        if applied > 0 {
            let anchor = self.popup_anchor();
            self.popups.push(Popup::new(applied, anchor, PopupKind::Mana));
        }
        applied
    }

    // ── Abilities ─────────────────────────────────────────────────────────────

    pub fn use_ultimate(&mut self) {
        if !self.can_use_ultimate() {
            return;
        }
        self.mana = 0;
        self.ultimate_cooldown = self.tuning.ultimate_cooldown;
        let direction = self.facing;
        self.ultimate = UltimateState::Active {
            remaining: self.tuning.ultimate_duration,
            direction,
        };
        let heal = (self.tuning.max_hp as f32 * self.tuning.ultimate_heal) as i32;
        self.heal(heal);
        self.state = PlayerState::Ultimate;

        log::debug!("Ultimate activated facing {:?}", direction);
        let origin = self.center();
        self.events.push(PlayerEvent::UltimateEffect { origin, direction });
        self.events.push(PlayerEvent::UltimateDamage { origin, direction });
    }

    pub fn throw_grenade(&mut self) {
        if !self.can_throw_grenade() {
            return;
        }
        self.mana -= self.tuning.grenade_cost;
        self.grenade_cooldown = self.tuning.grenade_cooldown;
        self.events.push(PlayerEvent::GrenadeThrown {
            origin: self.center(),
            direction: self.facing,
        });
    }

    /// Hand all pending events to the caller, leaving the queue empty.
    pub fn take_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[PlayerEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(PlayerTuning::default(), WorldTuning::default())
    }

    #[test]
    fn starts_grounded_with_full_resources() {
        let p = player();
        assert!(p.on_ground);
        assert_eq!(p.hp, 100);
        assert_eq!(p.mana, 100);
        assert_eq!(p.pos.y, WorldTuning::default().ground_y());
    }

    #[test]
    fn walking_sets_facing_and_state() {
        let mut p = player();
        p.handle_input(&Keys { left: true, ..Keys::default() });
        assert_eq!(p.facing, Direction::Left);
        assert_eq!(p.state, PlayerState::Walk);
        assert_eq!(p.vel.x, -16.0);
    }

    #[test]
    fn jump_lands_back_on_ground_as_idle() {
        let mut p = player();
        p.handle_input(&Keys { jump: true, ..Keys::default() });
        assert!(!p.on_ground);
        assert_eq!(p.state, PlayerState::Jump);
        for _ in 0..100 {
            p.update();
        }
        assert!(p.on_ground);
        assert_eq!(p.state, PlayerState::Idle);
        assert_eq!(p.vel.y, 0.0);
    }

    #[test]
    fn attack_cooldown_blocks_movement_but_not_grenade() {
        let mut p = player();
        p.handle_input(&Keys { attack: true, ..Keys::default() });
        assert_eq!(p.attack_cooldown, 20);
        p.handle_input(&Keys { right: true, grenade: true, ..Keys::default() });
        assert_eq!(p.vel.x, 0.0);
        assert_eq!(p.grenade_cooldown, 120);
        assert_eq!(p.mana, 70);
    }

    #[test]
    fn attack_finishes_back_to_idle_and_clears_hits() {
        let mut p = player();
        p.handle_input(&Keys { attack: true, ..Keys::default() });
        p.attack_hits.insert(EnemyId(3));
        for _ in 0..30 {
            p.update();
        }
        assert_eq!(p.state, PlayerState::Idle);
        assert!(p.attack_hits.is_empty());
        assert_eq!(p.attack_cooldown, 0);
    }

    #[test]
    fn horizontal_position_is_clamped() {
        let mut p = player();
        p.pos.x = 5.0;
        p.vel.x = -16.0;
        p.update();
        assert_eq!(p.pos.x, 0.0);
    }
}
