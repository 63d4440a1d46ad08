//! Balance and world tuning, loadable from a RON file.
//!
//! Every field has a default, so a tuning file only needs to mention the
//! values it wants to change.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

// ── Sections ──────────────────────────────────────────────────────────────────

/// Screen and ground lines, in world pixels (y grows downwards).
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub width: f32,
    pub height: f32,
    pub tick_rate: u32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        WorldTuning {
            width: 1280.0,
            height: 720.0,
            tick_rate: 60,
        }
    }
}

impl WorldTuning {
    /// Top edge of a standing player or ground enemy.
    pub fn ground_y(&self) -> f32 {
        self.height - 250.0
    }

    /// Line a thrown grenade detonates on.
    pub fn grenade_floor_y(&self) -> f32 {
        self.height - 100.0
    }

    /// Line dropped potions come to rest on.
    pub fn potion_floor_y(&self) -> f32 {
        self.height - 150.0
    }

    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_hp: i32,
    pub max_mana: i32,
    pub speed: f32,
    pub jump_power: f32,
    pub gravity: f32,
    /// Ticks a melee swing blocks movement input.
    pub attack_cooldown: u32,
    pub ultimate_cooldown: u32,
    pub ultimate_duration: u32,
    /// Fraction of max hp restored by the ultimate.
    pub ultimate_heal: f32,
    pub grenade_cost: i32,
    pub grenade_cooldown: u32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        PlayerTuning {
            max_hp: 100,
            max_mana: 100,
            speed: 16.0,
            jump_power: 48.0,
            gravity: 2.0,
            attack_cooldown: 20,
            ultimate_cooldown: 300,
            ultimate_duration: 180,
            ultimate_heal: 0.3,
            grenade_cost: 30,
            grenade_cooldown: 120,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GrenadeTuning {
    pub launch_speed: f32,
    /// Launch angle above the horizon, in degrees.
    pub launch_angle: f32,
    pub gravity: f32,
    /// Ticks of flight before the fuse detonates it.
    pub fuse_ticks: u32,
    pub explosion_ticks: u32,
    pub radius: f32,
    pub max_damage: i32,
    pub min_damage: i32,
}

impl Default for GrenadeTuning {
    fn default() -> Self {
        GrenadeTuning {
            launch_speed: 20.0,
            launch_angle: 45.0,
            gravity: 0.5,
            fuse_ticks: 60,
            explosion_ticks: 24,
            radius: 250.0,
            max_damage: 15,
            min_damage: 5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpawnerTuning {
    /// Ticks between difficulty increases.
    pub difficulty_interval: u32,
    pub base_spawn_interval: u32,
    /// Ticks shaved off the spawn interval per difficulty level.
    pub spawn_interval_step: u32,
    pub min_spawn_interval: u32,
}

impl Default for SpawnerTuning {
    fn default() -> Self {
        SpawnerTuning {
            difficulty_interval: 600,
            base_spawn_interval: 120,
            spawn_interval_step: 10,
            min_spawn_interval: 30,
        }
    }
}

// ── Root ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub world: WorldTuning,
    pub player: PlayerTuning,
    pub grenade: GrenadeTuning,
    pub spawner: SpawnerTuning,
}

impl Tuning {
    /// Parse a tuning document from RON text.
    pub fn from_ron(text: &str, origin: &str) -> Result<Tuning, ConfigError> {
        let tuning: Tuning = ron::from_str(text).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            details: e.to_string(),
        })?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a tuning file.
    pub fn load(path: &Path) -> Result<Tuning, ConfigError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Tuning::from_ron(&text, &display)
    }

    /// Load `path` if it exists, otherwise use the defaults. A broken file is
    /// logged and ignored.
    pub fn load_or_default(path: &Path) -> Tuning {
        if !path.exists() {
            return Tuning::default();
        }
        match Tuning::load(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                log::warn!("{}; using default tuning", e);
                Tuning::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.world;
        if w.width <= 180.0 || w.height <= 250.0 {
            return Err(ConfigError::Invalid(format!(
                "screen {}x{} is too small",
                w.width, w.height
            )));
        }
        if w.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick_rate must be positive".into()));
        }
        let p = &self.player;
        if p.max_hp <= 0 || p.max_mana <= 0 {
            return Err(ConfigError::Invalid("max_hp and max_mana must be positive".into()));
        }
        if p.grenade_cost > p.max_mana {
            return Err(ConfigError::Invalid(format!(
                "grenade_cost {} exceeds max_mana {}",
                p.grenade_cost, p.max_mana
            )));
        }
        let g = &self.grenade;
        if g.min_damage > g.max_damage {
            return Err(ConfigError::Invalid(format!(
                "grenade min_damage {} exceeds max_damage {}",
                g.min_damage, g.max_damage
            )));
        }
        if g.radius <= 0.0 || g.explosion_ticks == 0 {
            return Err(ConfigError::Invalid("grenade radius and explosion_ticks must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let t = Tuning::from_ron("(player: (max_hp: 150))", "inline").unwrap();
        assert_eq!(t.player.max_hp, 150);
        assert_eq!(t.player.max_mana, 100);
        assert_eq!(t.grenade.fuse_ticks, 60);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = Tuning::from_ron("(player: oops", "inline").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn inverted_damage_range_is_rejected() {
        let err = Tuning::from_ron("(grenade: (min_damage: 30, max_damage: 10))", "inline")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let t = Tuning::load_or_default(Path::new("/definitely/not/here.ron"));
        assert_eq!(t, Tuning::default());
    }
}
