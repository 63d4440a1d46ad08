//! Turn a finished game state into render-service calls.
//!
//! Called once per frame after `compute::tick`, so every draw sees the same
//! snapshot. Sprites that fail to resolve are skipped.

use glam::Vec2;

use crate::effects::{EffectKind, WAVE_FRAMES};
use crate::enemy::Enemy;
use crate::entities::{Direction, GameState};
use crate::grenade::{Grenade, GrenadePhase, EXPLOSION_FRAMES, GRENADE_SIZE};
use crate::player::{Player, PlayerState};
use crate::popup::Popup;
use crate::potion::{Potion, POTION_FRAMES};
use crate::services::{Renderer, Sheet, SpriteCache, SpriteKey, TextTint};

/// Draws go through the cache so each sprite is resolved once per run.
struct Painter<'a, R: Renderer> {
    out: &'a mut R,
    cache: &'a mut SpriteCache<R::Handle>,
}

impl<'a, R: Renderer> Painter<'a, R> {
    fn sprite(
        &mut self,
        key: SpriteKey,
        pos: Vec2,
        alpha: Option<u8>,
        scale: Option<f32>,
    ) -> Result<(), R::Error> {
        let out = &mut *self.out;
        let Some(handle) = self.cache.get_or_load(key, |k| out.load_sprite(k)) else {
            return Ok(());
        };
        self.out.draw_sprite(&handle, pos, alpha, scale)
    }

    fn popups(&mut self, popups: &[Popup]) -> Result<(), R::Error> {
        for p in popups {
            self.out.draw_text(&p.text, p.pos, p.alpha, TextTint::Popup(p.kind))?;
        }
        Ok(())
    }
}

/// Draw the whole scene back to front.
pub fn draw_frame<R: Renderer>(
    state: &GameState,
    cache: &mut SpriteCache<R::Handle>,
    out: &mut R,
) -> Result<(), R::Error> {
    let mut painter = Painter { out, cache };

    for enemy in &state.enemies {
        draw_enemy(&mut painter, enemy)?;
    }
    for potion in &state.potions {
        draw_potion(&mut painter, potion)?;
    }
    for grenade in &state.grenades {
        draw_grenade(&mut painter, grenade)?;
    }
    draw_player(&mut painter, &state.player)?;
    for enemy in &state.enemies {
        painter.popups(&enemy.popups)?;
    }
    painter.popups(&state.player.popups)?;
    draw_effects(&mut painter, state)?;
    Ok(())
}

fn draw_player<R: Renderer>(p: &mut Painter<'_, R>, player: &Player) -> Result<(), R::Error> {
    let (sheet, mirrored) = match player.state {
        PlayerState::Walk => (Sheet::PlayerWalk, true),
        PlayerState::Jump => (Sheet::PlayerJump, false),
        PlayerState::Attack => (Sheet::PlayerAttack, true),
        PlayerState::Ultimate => (Sheet::PlayerUltimate, true),
        PlayerState::Idle => (Sheet::PlayerIdle, true),
    };
    let facing = mirrored.then_some(player.facing);
    let frame = player.animator.frame(player.state.frame_count());
    p.sprite(SpriteKey::new(sheet, facing, frame), player.pos, None, None)
}

fn draw_enemy<R: Renderer>(p: &mut Painter<'_, R>, enemy: &Enemy) -> Result<(), R::Error> {
    if enemy.is_alive() {
        let frame = enemy.animator.frame(enemy.kind.frame_count());
        let key = SpriteKey::new(Sheet::Enemy(enemy.kind), Some(enemy.facing), frame);
        p.sprite(key, enemy.pos, None, None)?;
        let bar = format!("{}/{}", enemy.hp.max(0), enemy.max_hp);
        p.out.draw_text(&bar, enemy.pos + Vec2::new(30.0, -10.0), 255, TextTint::Caption)
    } else {
        let key = SpriteKey::new(Sheet::EnemyDead(enemy.kind), None, 0);
        p.sprite(key, enemy.pos, Some(enemy.fade_alpha), None)
    }
}

fn draw_potion<R: Renderer>(p: &mut Painter<'_, R>, potion: &Potion) -> Result<(), R::Error> {
    let frame = potion.animator.frame(POTION_FRAMES);
    p.sprite(SpriteKey::new(Sheet::Potion(potion.kind), None, frame), potion.pos, None, None)
}

fn draw_grenade<R: Renderer>(p: &mut Painter<'_, R>, grenade: &Grenade) -> Result<(), R::Error> {
    match grenade.phase {
        GrenadePhase::Flying => {
            let key = SpriteKey::new(Sheet::Grenade, Some(grenade.direction), 0);
            p.sprite(key, grenade.pos, None, None)
        }
        GrenadePhase::Exploding => {
            let frame = grenade.explosion_frame().min(EXPLOSION_FRAMES - 1);
            let size = Sheet::Explosion.footprint();
            let pos = grenade.pos + Vec2::splat(GRENADE_SIZE / 2.0) - size / 2.0;
            p.sprite(SpriteKey::new(Sheet::Explosion, None, frame), pos, None, None)
        }
        GrenadePhase::Spent => Ok(()),
    }
}

fn draw_effects<R: Renderer>(p: &mut Painter<'_, R>, state: &GameState) -> Result<(), R::Error> {
    for effect in state.effects.iter() {
        let alpha = Some(effect.alpha_u8());
        match &effect.kind {
            EffectKind::Icon { icon, pos } => {
                p.sprite(SpriteKey::new(Sheet::Icon(*icon), None, 0), *pos, alpha, None)?;
            }
            EffectKind::Wave { origin, direction, frame } => {
                let size = Sheet::UltimateWave.footprint();
                let x = match direction {
                    Direction::Right => origin.x,
                    Direction::Left => origin.x - size.x,
                };
                let pos = Vec2::new(x, origin.y - size.y / 2.0);
                let key = SpriteKey::new(Sheet::UltimateWave, Some(*direction), (*frame).min(WAVE_FRAMES - 1));
                p.sprite(key, pos, alpha, None)?;
            }
            EffectKind::Burst { center, scale } => {
                let size = Sheet::Burst.footprint() * *scale;
                p.sprite(SpriteKey::new(Sheet::Burst, None, 0), *center - size / 2.0, alpha, Some(*scale))?;
            }
            EffectKind::Badge(badge) => {
                if effect.alpha_u8() == 0 {
                    continue;
                }
                let pos = badge.position();
                p.sprite(SpriteKey::new(Sheet::Badge, None, 0), pos, alpha, Some(badge.scale))?;
                if let Some(caption) = &badge.caption {
                    let below = pos + Vec2::new(0.0, Sheet::Badge.footprint().y);
                    p.out.draw_text(caption, below, effect.alpha_u8(), TextTint::Caption)?;
                }
            }
        }
    }
    Ok(())
}
