//! Thrown grenade: ballistic flight, timed detonation and a single damage
//! pass with linear falloff.

use glam::Vec2;

use crate::config::{GrenadeTuning, WorldTuning};
use crate::entities::Direction;
use crate::geometry::Rect;

pub const GRENADE_SIZE: f32 = 36.0;
pub const EXPLOSION_FRAMES: usize = 4;
/// How far past the screen edge a grenade may fly before it is discarded.
const OFFSCREEN_MARGIN: f32 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrenadePhase {
    Flying,
    Exploding,
    Spent,
}

/// Damage area of one detonation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blast {
    pub center: Vec2,
    pub radius: f32,
    pub max_damage: i32,
    pub min_damage: i32,
}

impl Blast {
    /// Square bounding the blast circle.
    pub fn area(&self) -> Rect {
        Rect::from_center(self.center, self.radius * 2.0, self.radius * 2.0)
    }

    /// Damage at `point`: `max_damage` at the centre falling linearly to
    /// `min_damage` at the radius, and flat beyond it.
    pub fn damage_at(&self, point: Vec2) -> i32 {
        let t = (self.center.distance(point) / self.radius).clamp(0.0, 1.0);
        let span = (self.max_damage - self.min_damage) as f32;
        (self.max_damage as f32 - span * t).round() as i32
    }
}

#[derive(Clone, Debug)]
pub struct Grenade {
    /// Top-left of the grenade sprite.
    pub pos: Vec2,
    pub vel: Vec2,
    pub direction: Direction,
    pub phase: GrenadePhase,
    /// Ticks in the current phase.
    pub timer: u32,
    blast_released: bool,
    tuning: GrenadeTuning,
    world: WorldTuning,
}

impl Grenade {
    /// Launch from `origin` (the thrower's centre).
    pub fn new(origin: Vec2, direction: Direction, tuning: GrenadeTuning, world: WorldTuning) -> Grenade {
        let angle = tuning.launch_angle.to_radians();
        let vel = Vec2::new(
            direction.sign() * tuning.launch_speed * angle.cos(),
            -tuning.launch_speed * angle.sin(),
        );
        Grenade {
            pos: origin,
            vel,
            direction,
            phase: GrenadePhase::Flying,
            timer: 0,
            blast_released: false,
            tuning,
            world,
        }
    }

    pub fn is_spent(&self) -> bool {
        self.phase == GrenadePhase::Spent
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(GRENADE_SIZE / 2.0)
    }

    pub fn update(&mut self) {
        match self.phase {
            GrenadePhase::Spent => {}
            GrenadePhase::Exploding => {
                self.timer += 1;
                if self.timer >= self.tuning.explosion_ticks {
                    self.phase = GrenadePhase::Spent;
                }
            }
            GrenadePhase::Flying => {
                self.timer += 1;
                if self.timer >= self.tuning.fuse_ticks {
                    self.detonate();
                    return;
                }

                self.pos += self.vel;
                self.vel.y += self.tuning.gravity;

                let floor = self.world.grenade_floor_y();
                if self.pos.y > floor {
                    self.pos.y = floor;
                    self.detonate();
                    return;
                }
                if self.pos.x < -OFFSCREEN_MARGIN || self.pos.x > self.world.width + OFFSCREEN_MARGIN {
                    log::debug!("Grenade left the screen at x={:.0}", self.pos.x);
                    self.phase = GrenadePhase::Spent;
                }
            }
        }
    }

    fn detonate(&mut self) {
        self.phase = GrenadePhase::Exploding;
        self.timer = 0;
    }

    /// Which explosion frame to show.
    pub fn explosion_frame(&self) -> usize {
        let per_frame = (self.tuning.explosion_ticks as usize / EXPLOSION_FRAMES).max(1);
        (self.timer as usize / per_frame).min(EXPLOSION_FRAMES - 1)
    }

    /// Blast geometry while exploding, for display.
    pub fn blast(&self) -> Option<Blast> {
        if self.phase != GrenadePhase::Exploding {
            return None;
        }
        Some(Blast {
            center: self.center(),
            radius: self.tuning.radius,
            max_damage: self.tuning.max_damage,
            min_damage: self.tuning.min_damage,
        })
    }

    /// The blast, handed out once per detonation. Later calls during the
    /// same explosion return `None`.
    pub fn take_blast(&mut self) -> Option<Blast> {
        if self.blast_released {
            return None;
        }
        let blast = self.blast()?;
        self.blast_released = true;
        Some(blast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blast() -> Blast {
        Blast { center: Vec2::ZERO, radius: 250.0, max_damage: 15, min_damage: 5 }
    }

    #[test]
    fn falloff_is_max_at_center_and_min_at_edge() {
        let b = blast();
        assert_eq!(b.damage_at(Vec2::ZERO), 15);
        assert_eq!(b.damage_at(Vec2::new(250.0, 0.0)), 5);
        assert_eq!(b.damage_at(Vec2::new(125.0, 0.0)), 10);
        assert_eq!(b.damage_at(Vec2::new(900.0, 0.0)), 5);
    }

    #[test]
    fn falloff_uses_euclidean_distance() {
        let b = blast();
        // 150-200-250 triangle: the corner sits exactly on the radius.
        assert_eq!(b.damage_at(Vec2::new(150.0, 200.0)), 5);
    }

    #[test]
    fn thrown_left_travels_left() {
        let mut g = Grenade::new(Vec2::new(600.0, 500.0), Direction::Left, GrenadeTuning::default(), WorldTuning::default());
        g.update();
        assert!(g.pos.x < 600.0);
        assert!(g.pos.y < 500.0);
    }

    #[test]
    fn leaving_the_screen_skips_the_explosion() {
        let mut g = Grenade::new(Vec2::new(1300.0, 300.0), Direction::Right, GrenadeTuning::default(), WorldTuning::default());
        for _ in 0..5 {
            g.update();
        }
        assert!(g.is_spent());
        assert_eq!(g.take_blast(), None);
    }
}
