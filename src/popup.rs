//! Floating combat numbers above players and enemies.

use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopupKind {
    Damage,
    Heal,
    Mana,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Popup {
    pub text: String,
    pub pos: Vec2,
    pub alpha: u8,
    pub age: u32,
    pub kind: PopupKind,
}

const RISE_PER_TICK: f32 = 1.0;
const FADE_PER_TICK: u8 = 8;
const MAX_AGE: u32 = 40;

impl Popup {
    pub fn new(amount: i32, pos: Vec2, kind: PopupKind) -> Popup {
        Popup {
            text: amount.to_string(),
            pos,
            alpha: 255,
            age: 0,
            kind,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.alpha == 0 || self.age > MAX_AGE
    }
}

/// Rise, fade and drop expired popups.
pub fn update_popups(popups: &mut Vec<Popup>) {
    for p in popups.iter_mut() {
        p.pos.y -= RISE_PER_TICK;
        p.alpha = p.alpha.saturating_sub(FADE_PER_TICK);
        p.age += 1;
    }
    popups.retain(|p| !p.is_expired());
}
