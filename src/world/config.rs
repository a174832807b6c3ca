use crate::engine::Size;
use crate::world::enemy::EnemyKind;
use anyhow::{ensure, Result};
use once_cell::sync::Lazy;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How a round ends
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum WinPolicy {
    /// play until the clock runs out, then compare score to the target
    #[default]
    RunFullTime,
    /// also stop as soon as the score passes the target
    EndOnWinningScore,
}

/// Cumulative threshold: a roll below `below` (and not below any earlier
/// entry) spawns `kind`.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
pub struct SpawnWeight {
    pub kind: EnemyKind,
    pub below: f64,
}

/// Ordered weighted choice of which enemy enters next. Rolls past the last
/// threshold spawn `fallback`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SpawnTable {
    pub entries: Vec<SpawnWeight>,
    pub fallback: EnemyKind,
}

static DEFAULT_SPAWN_TABLE: Lazy<SpawnTable> = Lazy::new(|| SpawnTable {
    entries: vec![
        SpawnWeight {
            kind: EnemyKind::Angler1,
            below: 0.1,
        },
        SpawnWeight {
            kind: EnemyKind::Stalker,
            below: 0.3,
        },
        SpawnWeight {
            kind: EnemyKind::Razorfin,
            below: 0.5,
        },
        SpawnWeight {
            kind: EnemyKind::Angler2,
            below: 0.6,
        },
        SpawnWeight {
            kind: EnemyKind::HiveWhale,
            below: 0.7,
        },
        SpawnWeight {
            kind: EnemyKind::BulbWhale,
            below: 0.8,
        },
        SpawnWeight {
            kind: EnemyKind::MoonFish,
            below: 0.9,
        },
    ],
    fallback: EnemyKind::LuckyFish,
});

impl Default for SpawnTable {
    fn default() -> Self {
        DEFAULT_SPAWN_TABLE.clone()
    }
}

impl SpawnTable {
    /// Maps a roll in `[0, 1)` to a kind
    pub fn pick(&self, roll: f64) -> EnemyKind {
        self.entries
            .iter()
            .find(|entry| roll < entry.below)
            .map_or(self.fallback, |entry| entry.kind)
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> EnemyKind {
        self.pick(rng.gen::<f64>())
    }

    pub fn validate(&self) -> Result<()> {
        let mut previous = 0.0;
        for entry in &self.entries {
            ensure!(
                entry.below > previous && entry.below <= 1.0,
                "spawn table thresholds must increase within (0, 1], got {} after {}",
                entry.below,
                previous
            );
            previous = entry.below;
        }
        Ok(())
    }
}

/// Tuning for one round. Every field has a default, so a JSON file only
/// needs the values it changes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: f64,
    pub height: f64,
    pub time_limit_ms: f64,
    pub winning_score: i32,
    pub win_policy: WinPolicy,
    pub starting_ammo: f64,
    pub max_ammo: f64,
    pub ammo_regen_interval_ms: f64,
    pub enemy_spawn_interval_ms: f64,
    pub world_speed: f64,
    /// fraction of the height enemies may spawn in, measured from the top
    pub spawn_band: f64,
    pub power_up_limit_ms: f64,
    pub spawn_table: SpawnTable,
    pub debug: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width: 1000.0,
            height: 500.0,
            time_limit_ms: 35_000.0,
            winning_score: 80,
            win_policy: WinPolicy::default(),
            starting_ammo: 20.0,
            max_ammo: 50.0,
            ammo_regen_interval_ms: 350.0,
            enemy_spawn_interval_ms: 2000.0,
            world_speed: 1.0,
            spawn_band: 0.95,
            power_up_limit_ms: 10_000.0,
            spawn_table: SpawnTable::default(),
            debug: false,
        }
    }
}

impl GameConfig {
    pub fn viewport(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.width.is_finite() && self.width > 0.0,
            "width must be positive, got {}",
            self.width
        );
        ensure!(
            self.height.is_finite() && self.height > 0.0,
            "height must be positive, got {}",
            self.height
        );
        ensure!(
            self.time_limit_ms >= 0.0,
            "time limit must not be negative, got {}",
            self.time_limit_ms
        );
        ensure!(
            self.max_ammo > 0.0,
            "max ammo must be positive, got {}",
            self.max_ammo
        );
        ensure!(
            (0.0..=self.max_ammo).contains(&self.starting_ammo),
            "starting ammo {} outside [0, {}]",
            self.starting_ammo,
            self.max_ammo
        );
        ensure!(
            self.ammo_regen_interval_ms > 0.0,
            "ammo regen interval must be positive, got {}",
            self.ammo_regen_interval_ms
        );
        ensure!(
            self.enemy_spawn_interval_ms > 0.0,
            "enemy spawn interval must be positive, got {}",
            self.enemy_spawn_interval_ms
        );
        ensure!(
            self.spawn_band > 0.0 && self.spawn_band <= 1.0,
            "spawn band must be within (0, 1], got {}",
            self.spawn_band
        );
        ensure!(
            self.world_speed.is_finite() && self.world_speed >= 0.0,
            "world speed must not be negative, got {}",
            self.world_speed
        );
        ensure!(
            self.power_up_limit_ms >= 0.0,
            "power up limit must not be negative, got {}",
            self.power_up_limit_ms
        );
        self.spawn_table.validate()
    }
}
