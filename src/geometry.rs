//! Axis-aligned rectangles and the per-type hitbox layouts.

use glam::Vec2;

use crate::entities::Direction;

/// Axis-aligned rectangle, top-left anchored, y growing downwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect { x, y, w, h }
    }

    pub fn from_center(center: Vec2, w: f32, h: f32) -> Rect {
        Rect::new(center.x - w / 2.0, center.y - h / 2.0, w, h)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Half-open: the right and bottom edges are outside.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Strict overlap: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

// ── Hitbox layouts ────────────────────────────────────────────────────────────

/// Side length of the square player and enemy sprites.
pub const SPRITE_SIZE: f32 = 180.0;

pub fn player_hitbox(pos: Vec2) -> Rect {
    Rect::new(pos.x + 40.0, pos.y + 40.0, 100.0, 120.0)
}

pub fn enemy_hitbox(pos: Vec2) -> Rect {
    Rect::new(pos.x + 30.0, pos.y + 40.0, 100.0, 120.0)
}

/// Melee reach, in front of the player.
pub fn attack_hitbox(pos: Vec2, facing: Direction) -> Rect {
    match facing {
        Direction::Right => Rect::new(pos.x + 110.0, pos.y + 50.0, 80.0, 80.0),
        Direction::Left => Rect::new(pos.x - 10.0, pos.y + 50.0, 80.0, 80.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_rects_intersect_both_ways() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn attack_box_mirrors_with_facing() {
        let pos = Vec2::new(100.0, 100.0);
        let right = attack_hitbox(pos, Direction::Right);
        let left = attack_hitbox(pos, Direction::Left);
        assert!(right.x > player_hitbox(pos).x);
        assert!(left.x < player_hitbox(pos).x);
        assert_eq!(right.w, left.w);
    }

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Vec2::ZERO));
        assert!(r.contains(Vec2::new(9.9, 9.9)));
        assert!(!r.contains(Vec2::new(10.0, 5.0)));
    }

    #[test]
    fn from_center_round_trips_center() {
        let r = Rect::from_center(Vec2::new(50.0, 40.0), 20.0, 10.0);
        assert_eq!(r.center(), Vec2::new(50.0, 40.0));
    }
}
