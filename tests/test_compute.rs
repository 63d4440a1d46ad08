use arena_survival::compute::*;
use arena_survival::config::Tuning;
use arena_survival::effects::EffectKind;
use arena_survival::enemy::{Drop, Enemy, EnemyStats};
use arena_survival::entities::*;
use arena_survival::player::UltimateState;
use arena_survival::potion::Potion;
use arena_survival::services::{Keys, SoundId};

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn make_state() -> GameState {
    init_state(Tuning::default())
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn idle() -> Keys {
    Keys::default()
}

/// Stationary ground enemy with a fixed contact damage.
fn dummy(id: u64, x: f32, hp: i32, state: &GameState) -> Enemy {
    Enemy::new(
        EnemyId(id),
        EnemyKind::Wolf,
        Vec2::new(x, state.tuning.world.ground_y()),
        Direction::Left,
        EnemyStats { max_hp: hp, speed: 0.0, dmg_min: 5, dmg_max: 5 },
        None,
    )
}

fn run(state: &mut GameState, keys: Keys, ticks: u32, rng: &mut StdRng) {
    for _ in 0..ticks {
        tick(state, &keys, rng);
    }
}

// ── init_state / restart ──────────────────────────────────────────────────────

#[test]
fn init_state_player_full_and_grounded() {
    let s = make_state();
    assert_eq!(s.player.hp, 100);
    assert_eq!(s.player.mana, 100);
    assert!(s.player.on_ground);
    assert_eq!(s.player.pos.y, s.tuning.world.ground_y());
}

#[test]
fn init_state_empty_collections() {
    let s = make_state();
    assert!(s.enemies.is_empty());
    assert!(s.grenades.is_empty());
    assert!(s.potions.is_empty());
    assert!(s.effects.is_empty());
    assert_eq!(s.kills, 0);
    assert_eq!(s.ticks, 0);
    assert_eq!(s.status, GameStatus::Playing);
}

#[test]
fn restart_clears_the_run() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    s.kills = 7;
    s.enemies.push(dummy(1, 100.0, 5, &s));
    run(&mut s, idle(), 5, &mut rng);
    restart(&mut s);
    assert_eq!(s.kills, 0);
    assert_eq!(s.ticks, 0);
    assert!(s.enemies.is_empty());
    assert_eq!(s.spawner.difficulty, 1);
}

// ── tick: status ──────────────────────────────────────────────────────────────

#[test]
fn tick_counts_frames() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    run(&mut s, idle(), 10, &mut rng);
    assert_eq!(s.ticks, 10);
}

#[test]
fn dead_player_ends_the_run_and_freezes_state() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    s.player.hp = 0;
    tick(&mut s, &idle(), &mut rng);
    assert_eq!(s.status, GameStatus::GameOver);
    tick(&mut s, &idle(), &mut rng);
    assert_eq!(s.ticks, 1);
}

#[test]
fn hp_and_mana_stay_in_range_under_random_input() {
    for seed in 0..8 {
        let mut s = make_state();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut input = StdRng::seed_from_u64(seed + 1000);
        for _ in 0..3000 {
            let keys = Keys {
                left: input.gen_bool(0.3),
                right: input.gen_bool(0.3),
                jump: input.gen_bool(0.05),
                attack: input.gen_bool(0.2),
                ultimate: input.gen_bool(0.02),
                grenade: input.gen_bool(0.02),
            };
            tick(&mut s, &keys, &mut rng);
            let p = &s.player;
            assert!((0..=p.max_hp()).contains(&p.hp), "seed {}: hp {}", seed, p.hp);
            assert!((0..=p.max_mana()).contains(&p.mana), "seed {}: mana {}", seed, p.mana);
            if s.status == GameStatus::GameOver {
                break;
            }
        }
    }
}

#[test]
fn seconds_alive_follows_tick_rate() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    run(&mut s, idle(), 125, &mut rng);
    assert_eq!(s.seconds_alive(), 2);
}

// ── tick: spawner ─────────────────────────────────────────────────────────────

#[test]
fn spawn_is_due_right_after_interval() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    s.spawner.spawn_timer = 110;
    tick(&mut s, &idle(), &mut rng);
    assert_eq!(s.enemies.len(), 1);
    assert_eq!(s.spawner.spawn_timer, 0);
}

#[test]
fn first_spawn_arrives_on_tick_111() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    run(&mut s, idle(), 110, &mut rng);
    assert!(s.enemies.is_empty());
    tick(&mut s, &idle(), &mut rng);
    assert_eq!(s.enemies.len(), 1);
}

// ── tick: melee ───────────────────────────────────────────────────────────────

#[test]
fn swing_hits_each_enemy_once() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    // Inside the right-hand attack box, clear of the player's body.
    s.enemies.push(dummy(1, 760.0, 100, &s));

    tick(&mut s, &Keys { attack: true, ..idle() }, &mut rng);
    let after_first = s.enemies[0].hp;
    assert!(after_first < 100);

    run(&mut s, idle(), 10, &mut rng);
    assert_eq!(s.enemies[0].hp, after_first);
}

#[test]
fn next_swing_can_hit_again() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    s.enemies.push(dummy(1, 760.0, 100, &s));

    tick(&mut s, &Keys { attack: true, ..idle() }, &mut rng);
    run(&mut s, idle(), 30, &mut rng);
    let before = s.enemies[0].hp;
    tick(&mut s, &Keys { attack: true, ..idle() }, &mut rng);
    assert!(s.enemies[0].hp < before);
}

#[test]
fn melee_kill_counts_and_rewards_mana() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    s.player.mana = 0;
    s.enemies.push(dummy(1, 760.0, 1, &s));

    tick(&mut s, &Keys { attack: true, ..idle() }, &mut rng);
    assert_eq!(s.kills, 1);
    assert_eq!(s.player.mana, EnemyKind::Wolf.mana_reward());
    assert!(s.sounds.contains(&SoundId::EnemyDeath));
    assert!(s.sounds.contains(&SoundId::Swing));
}

#[test]
fn melee_roll_stays_in_range() {
    let mut rng = seeded_rng();
    let mut crits = 0;
    for _ in 0..2000 {
        let (dmg, crit) = roll_melee(&mut rng);
        if crit {
            crits += 1;
            assert!((4..=11).contains(&dmg));
        } else {
            assert!((1..=5).contains(&dmg));
        }
    }
    assert!(crits > 300 && crits < 500, "crits = {}", crits);
}

// ── tick: contact damage ──────────────────────────────────────────────────────

#[test]
fn touching_enemy_hurts_on_cooldown() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    s.enemies.push(dummy(1, 660.0, 100, &s));

    tick(&mut s, &idle(), &mut rng);
    assert_eq!(s.player.hp, 95);
    run(&mut s, idle(), 29, &mut rng);
    assert_eq!(s.player.hp, 95);
    tick(&mut s, &idle(), &mut rng);
    assert_eq!(s.player.hp, 90);
}

// ── tick: ultimate ────────────────────────────────────────────────────────────

#[test]
fn ultimate_damages_only_in_front_and_only_once() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    s.enemies.push(dummy(1, 900.0, 100, &s)); // in front
    s.enemies.push(dummy(2, 300.0, 100, &s)); // behind

    tick(&mut s, &Keys { ultimate: true, ..idle() }, &mut rng);
    assert_eq!(s.enemies[0].hp, 100 - ULTIMATE_DAMAGE);
    assert_eq!(s.enemies[1].hp, 100);
    assert_eq!(s.player.mana, 0);

    run(&mut s, idle(), 40, &mut rng);
    assert_eq!(s.enemies[0].hp, 100 - ULTIMATE_DAMAGE);
}

#[test]
fn ultimate_spawns_wave_and_burst() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    tick(&mut s, &Keys { ultimate: true, ..idle() }, &mut rng);
    assert!(s.effects.iter().any(|e| matches!(e.kind, EffectKind::Wave { .. })));
    assert!(s.effects.iter().any(|e| matches!(e.kind, EffectKind::Burst { .. })));
    assert!(s.sounds.contains(&SoundId::Ultimate));
}

#[test]
fn player_is_invulnerable_while_ultimate_runs() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    s.enemies.push(dummy(1, 660.0, 1000, &s));

    tick(&mut s, &Keys { ultimate: true, ..idle() }, &mut rng);
    run(&mut s, idle(), 100, &mut rng);
    assert_eq!(s.player.hp, 100);

    run(&mut s, idle(), 100, &mut rng);
    assert!(s.player.hp < 100);
}

#[test]
fn ultimate_keeps_its_direction_while_the_player_turns() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    tick(&mut s, &Keys { ultimate: true, ..idle() }, &mut rng);
    assert!(matches!(
        s.player.ultimate,
        UltimateState::Active { direction: Direction::Right, .. }
    ));

    let mut ended_after = None;
    for i in 0..200u32 {
        let keys = if i % 2 == 0 {
            Keys { left: true, ..idle() }
        } else {
            Keys { right: true, ..idle() }
        };
        tick(&mut s, &keys, &mut rng);
        match s.player.ultimate {
            UltimateState::Active { direction, .. } => assert_eq!(direction, Direction::Right),
            UltimateState::Inactive => {
                ended_after = Some(i + 1);
                break;
            }
        }
    }
    let ended_after = ended_after.expect("ultimate never ended");
    assert!(ended_after <= 180, "ended after {} ticks", ended_after);
}

#[test]
fn badge_tracks_ultimate_readiness() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    tick(&mut s, &idle(), &mut rng);
    assert!(s.effects.badge().map(|b| b.ready).unwrap_or(false));

    tick(&mut s, &Keys { ultimate: true, ..idle() }, &mut rng);
    assert!(!s.effects.badge().map(|b| b.ready).unwrap_or(true));
}

// ── tick: grenades ────────────────────────────────────────────────────────────

#[test]
fn grenade_explodes_on_fuse_and_hits_each_enemy_once() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    s.player.pos.x = 100.0;
    s.enemies.push(dummy(1, 950.0, 100, &s)); // near the landing point
    s.enemies.push(dummy(2, 400.0, 100, &s)); // well outside the blast

    tick(&mut s, &Keys { grenade: true, ..idle() }, &mut rng);
    assert_eq!(s.grenades.len(), 1);
    assert_eq!(s.player.mana, 70);

    run(&mut s, idle(), 58, &mut rng);
    assert_eq!(s.enemies[0].hp, 100);

    tick(&mut s, &idle(), &mut rng);
    let hit = 100 - s.enemies[0].hp;
    assert!((5..=15).contains(&hit), "blast dealt {}", hit);
    assert!(s.sounds.contains(&SoundId::Explosion));

    run(&mut s, idle(), 30, &mut rng);
    assert_eq!(s.enemies[0].hp, 100 - hit);
    assert_eq!(s.enemies[1].hp, 100);
    assert!(s.grenades.is_empty());
}

#[test]
fn grenade_throw_shows_milk_icon() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    tick(&mut s, &Keys { grenade: true, ..idle() }, &mut rng);
    assert!(s.effects.iter().any(|e| matches!(e.kind, EffectKind::Icon { .. })));
}

// ── tick: drops and potions ───────────────────────────────────────────────────

#[test]
fn standing_on_potion_collects_it_once() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    s.player.mana = 50;
    let floor = s.tuning.world.potion_floor_y();
    s.potions.push(Potion::new(PotionKind::Mana, s.player.center(), floor));

    run(&mut s, idle(), 20, &mut rng);
    assert_eq!(s.player.mana, 80);
    assert!(s.potions.is_empty());
    assert!(s.sounds.contains(&SoundId::PotionPickup));
}

#[test]
fn certain_drop_spawns_one_potion() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    let mut e = dummy(1, 1000.0, 5, &s);
    e.drop = Some(Drop { item: PotionKind::Health, chance: 1.0 });
    e.take_damage(5);
    s.enemies.push(e);

    tick(&mut s, &idle(), &mut rng);
    assert_eq!(s.potions.len(), 1);

    run(&mut s, idle(), 100, &mut rng);
    assert_eq!(s.potions.len(), 1);
    assert!(s.enemies.is_empty());
}

// ── sound outbox ──────────────────────────────────────────────────────────────

#[test]
fn sounds_are_drained_by_the_caller() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    tick(&mut s, &Keys { attack: true, ..idle() }, &mut rng);
    let played: Vec<SoundId> = s.drain_sounds().collect();
    assert_eq!(played, vec![SoundId::Swing]);
    assert!(s.sounds.is_empty());
}
