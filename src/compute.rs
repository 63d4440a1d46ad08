//! The per-frame simulation step.
//!
//! `tick` mutates the game state in a fixed order: player, spawner, enemies,
//! melee, abilities, grenades, drops and potions, then effects. Later stages
//! rely on earlier ones having run this frame (e.g. melee is tested against
//! enemy positions that were already moved). All randomness comes through
//! `rng` so tests can seed it.

use std::ops::RangeInclusive;

use glam::Vec2;
use rand::Rng;

use crate::config::Tuning;
use crate::effects::{wave_area, EffectManager, IconKind};
use crate::enemy::Enemy;
use crate::entities::{GameState, GameStatus, PotionKind};
use crate::geometry::Rect;
use crate::grenade::Grenade;
use crate::player::{Player, PlayerEvent, PlayerState};
use crate::potion::Potion;
use crate::services::{Keys, SoundId};
use crate::spawner::Spawner;

// ── Combat constants ─────────────────────────────────────────────────────────

pub const MELEE_DAMAGE: RangeInclusive<i32> = 1..=5;
pub const CRIT_CHANCE: f64 = 0.2;
/// Extra damage rolled separately on a critical hit.
pub const CRIT_BONUS: RangeInclusive<i32> = 3..=6;
/// Damage dealt once to every enemy caught in the ultimate's wave.
pub const ULTIMATE_DAMAGE: i32 = 20;

const ICON_TICKS: u32 = 60;
const BURST_TICKS: u32 = 40;
const BADGE_ANCHOR: Vec2 = Vec2::new(30.0, 96.0);
pub const BADGE_CAPTION: &str = "ULTIMATE READY";

// ── Constructors ─────────────────────────────────────────────────────────────

/// Fresh run state.
pub fn init_state(tuning: Tuning) -> GameState {
    GameState {
        player: Player::new(tuning.player, tuning.world),
        enemies: Vec::new(),
        grenades: Vec::new(),
        potions: Vec::new(),
        effects: EffectManager::new(),
        spawner: Spawner::new(tuning.spawner, tuning.world),
        status: GameStatus::Playing,
        kills: 0,
        ticks: 0,
        tuning,
        sounds: Vec::new(),
    }
}

/// Start a new run with the same tuning.
pub fn restart(state: &mut GameState) {
    log::info!("Restarting run after {} kills", state.kills);
    *state = init_state(state.tuning);
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by one tick. Does nothing once the run is over.
pub fn tick(state: &mut GameState, keys: &Keys, rng: &mut impl Rng) {
    if state.status != GameStatus::Playing {
        return;
    }
    state.ticks += 1;

    // ── 1. Player ────────────────────────────────────────────────────────────
    let cooldown_before = state.player.attack_cooldown;
    state.player.handle_input(keys);
    if state.player.attack_cooldown > cooldown_before {
        state.sounds.push(SoundId::Swing);
    }
    state.player.update();

    // ── 2. Spawner ───────────────────────────────────────────────────────────
    if let Some(enemy) = state.spawner.update(state.player.is_alive(), rng) {
        state.enemies.push(enemy);
    }

    // ── 3. Enemies: movement, body contact, loot ─────────────────────────────
    update_enemies(state, rng);

    // ── 4. Melee ─────────────────────────────────────────────────────────────
    resolve_melee(state, rng);

    // ── 5. Ultimate and grenade requests ─────────────────────────────────────
    for event in state.player.take_events() {
        handle_player_event(state, event);
    }

    // ── 6. Grenades ──────────────────────────────────────────────────────────
    update_grenades(state);

    // ── 7. Potions ───────────────────────────────────────────────────────────
    update_potions(state);

    state.enemies.retain(|e| !e.is_finished());

    // ── 8. Effects ───────────────────────────────────────────────────────────
    let ready = state.player.can_use_ultimate();
    state.effects.set_ultimate_badge(ready, BADGE_ANCHOR, BADGE_CAPTION);
    state.effects.update();

    // ── 9. Status ────────────────────────────────────────────────────────────
    if !state.player.is_alive() {
        state.status = GameStatus::GameOver;
        log::info!(
            "Player died after {}s with {} kills",
            state.seconds_alive(),
            state.kills
        );
    }
}

fn update_enemies(state: &mut GameState, rng: &mut impl Rng) {
    let player_center_x = state.player.center().x;
    let player_box = state.player.hitbox();
    let invulnerable = state.player.ultimate_active();
    let floor = state.tuning.world.potion_floor_y();

    for enemy in state.enemies.iter_mut() {
        enemy.update(player_center_x, &state.tuning.world);

        if !invulnerable && enemy.is_alive() && player_box.intersects(&enemy.hitbox()) {
            if let Some(dmg) = enemy.try_contact_damage(rng) {
                state.player.take_damage(dmg);
                state.sounds.push(SoundId::PlayerHurt);
            }
        }

        if let Some(item) = enemy.roll_drop(rng) {
            log::debug!("{:?} #{} dropped a {:?} potion", enemy.kind, enemy.id.0, item);
            state.potions.push(Potion::new(item, enemy.drop_point(), floor));
        }
    }
}

/// Base roll plus, on a critical, a separately rolled bonus.
pub fn roll_melee(rng: &mut impl Rng) -> (i32, bool) {
    let base = rng.gen_range(MELEE_DAMAGE);
    if rng.gen_bool(CRIT_CHANCE) {
        (base + rng.gen_range(CRIT_BONUS), true)
    } else {
        (base, false)
    }
}

fn resolve_melee(state: &mut GameState, rng: &mut impl Rng) {
    if state.player.state != PlayerState::Attack {
        state.player.attack_hits.clear();
        return;
    }
    let reach = state.player.attack_hitbox();
    let body = state.player.hitbox();

    for enemy in state.enemies.iter_mut() {
        if !enemy.is_alive() {
            continue;
        }
        let target = enemy.hitbox();
        if !reach.intersects(&target) && !body.intersects(&target) {
            continue;
        }
        if !state.player.attack_hits.insert(enemy.id) {
            continue;
        }

        let (dmg, crit) = roll_melee(rng);
        if crit {
            let above = Vec2::new(enemy.center_x(), enemy.pos.y);
            state.effects.add_icon(IconKind::Crit, above, ICON_TICKS / 2, &state.tuning.world);
            state.sounds.push(SoundId::Crit);
        } else {
            state.sounds.push(SoundId::Hit);
        }

        if enemy.take_damage(dmg) {
            state.kills += 1;
            state.sounds.push(SoundId::EnemyDeath);
            state.player.restore_mana(enemy.kind.mana_reward());
        }
    }
}

fn handle_player_event(state: &mut GameState, event: PlayerEvent) {
    match event {
        PlayerEvent::UltimateEffect { origin, direction } => {
            state.effects.add_wave(origin, direction);
            state.effects.add_burst(state.tuning.world.center(), BURST_TICKS);
            state.sounds.push(SoundId::Ultimate);
        }
        PlayerEvent::UltimateDamage { origin, direction } => {
            let area = state
                .effects
                .ultimate_area()
                .unwrap_or_else(|| wave_area(origin, direction));
            let kills = damage_in_area(&mut state.enemies, area, |_| ULTIMATE_DAMAGE);
            record_kills(state, kills);
        }
        PlayerEvent::GrenadeThrown { origin, direction } => {
            log::debug!("Grenade thrown {:?} from {:?}", direction, origin);
            state.effects.add_icon(IconKind::Milk, origin, ICON_TICKS, &state.tuning.world);
            state
                .grenades
                .push(Grenade::new(origin, direction, state.tuning.grenade, state.tuning.world));
            state.sounds.push(SoundId::GrenadeThrow);
        }
    }
}

/// Damage every living enemy whose hitbox overlaps `area`. Returns the
/// number of enemies killed.
fn damage_in_area<F>(enemies: &mut [Enemy], area: Rect, damage: F) -> u32
where
    F: Fn(&Enemy) -> i32,
{
    let mut kills = 0;
    for enemy in enemies.iter_mut().filter(|e| e.is_alive()) {
        if area.intersects(&enemy.hitbox()) {
            let dmg = damage(enemy);
            if enemy.take_damage(dmg) {
                kills += 1;
            }
        }
    }
    kills
}

fn record_kills(state: &mut GameState, kills: u32) {
    state.kills += kills;
    for _ in 0..kills {
        state.sounds.push(SoundId::EnemyDeath);
    }
}

fn update_grenades(state: &mut GameState) {
    let mut kills = 0;
    for grenade in state.grenades.iter_mut() {
        grenade.update();
        if let Some(blast) = grenade.take_blast() {
            state.sounds.push(SoundId::Explosion);
            kills += damage_in_area(&mut state.enemies, blast.area(), |e| {
                blast.damage_at(e.hitbox().center())
            });
        }
    }
    state.grenades.retain(|g| !g.is_spent());
    record_kills(state, kills);
}

fn update_potions(state: &mut GameState) {
    let player_box = state.player.hitbox();
    for potion in state.potions.iter_mut() {
        potion.update();
        if !potion.is_resting() || !player_box.intersects(&potion.rect()) {
            continue;
        }
        let amount = potion.collect();
        match potion.kind {
            PotionKind::Mana => state.player.restore_mana(amount),
            PotionKind::Health => state.player.heal(amount),
        };
        state.effects.add_icon(
            IconKind::Sparkle,
            state.player.center() - Vec2::new(0.0, 60.0),
            ICON_TICKS / 2,
            &state.tuning.world,
        );
        state.sounds.push(SoundId::PotionPickup);
    }
    state.potions.retain(|p| !p.is_consumed());
}
