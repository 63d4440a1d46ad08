//! Potions dropped by enemies.

use glam::Vec2;

use crate::animation::{Animator, PICKUP_SPEED};
use crate::entities::PotionKind;
use crate::geometry::Rect;

pub const POTION_SIZE: f32 = 40.0;
pub const POTION_FRAMES: usize = 4;
const GRAVITY: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PotionPhase {
    Falling,
    Collectible,
    Consumed,
}

#[derive(Clone, Debug)]
pub struct Potion {
    pub kind: PotionKind,
    pub pos: Vec2,
    pub vel_y: f32,
    pub phase: PotionPhase,
    /// Line the potion comes to rest on.
    pub floor_y: f32,
    pub animator: Animator,
}

impl Potion {
    /// Drop a potion centred on `at`.
    pub fn new(kind: PotionKind, at: Vec2, floor_y: f32) -> Potion {
        Potion {
            kind,
            pos: at - Vec2::splat(POTION_SIZE / 2.0),
            vel_y: 0.0,
            phase: PotionPhase::Falling,
            floor_y,
            animator: Animator::new(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, POTION_SIZE, POTION_SIZE)
    }

    pub fn is_resting(&self) -> bool {
        self.phase == PotionPhase::Collectible
    }

    pub fn is_consumed(&self) -> bool {
        self.phase == PotionPhase::Consumed
    }

    pub fn update(&mut self) {
        if self.phase == PotionPhase::Consumed {
            return;
        }
        if self.phase == PotionPhase::Falling {
            self.vel_y += GRAVITY;
            self.pos.y += self.vel_y;
            if self.pos.y >= self.floor_y {
                self.pos.y = self.floor_y;
                self.vel_y = 0.0;
                self.phase = PotionPhase::Collectible;
            }
        }
        self.animator.advance(PICKUP_SPEED, POTION_FRAMES);
    }

    /// Consume the potion. Returns the restore amount, or 0 while it is still
    /// falling or already consumed.
    pub fn collect(&mut self) -> i32 {
        if self.phase != PotionPhase::Collectible {
            return 0;
        }
        self.phase = PotionPhase::Consumed;
        self.kind.restore_amount()
    }
}
