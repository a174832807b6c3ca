//! The simulation: everything that changes from one frame to the next.
//! Nothing in here touches the browser, so it runs the same under
//! `cargo test` as it does in the page.

pub mod ammo;
pub mod background;
pub mod config;
pub mod effects;
pub mod enemy;
pub mod events;
pub mod projectile;

use crate::engine::{Point, Rect, Size};
use crate::sprite::submarine::{HeldKeys, Player};
use ammo::Ammo;
use anyhow::Result;
use background::Background;
use config::{GameConfig, WinPolicy};
use effects::{Explosion, Particle, Shield};
use enemy::{Effect, Enemy, EnemyKind};
use events::GameEvent;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::vec::Drain;

/// Velocities are tuned per frame at 60 fps
pub const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;

/// How many reference frames `delta_ms` is worth
pub fn frame_scale(delta_ms: f64) -> f64 {
    delta_ms / REFERENCE_FRAME_MS
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

/// Owns every entity of a round and advances them together. Generic over
/// the random source so tests can run from a fixed seed.
pub struct GameState<R = StdRng> {
    config: GameConfig,
    rng: R,
    elapsed_ms: f64,
    game_over: bool,
    score: i32,
    ammo: Ammo,
    ammo_regen_timer: f64,
    enemy_spawn_timer: f64,
    world_speed: f64,
    debug: bool,
    keys: HeldKeys,
    background: Background,
    player: Player,
    shield: Shield,
    enemies: Vec<Enemy>,
    particles: Vec<Particle>,
    explosions: Vec<Explosion>,
    events: Vec<GameEvent>,
}

impl GameState<StdRng> {
    pub fn new(config: GameConfig) -> Result<Self> {
        GameState::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self> {
        GameState::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameState<R> {
    pub fn with_rng(config: GameConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(GameState {
            ammo: Ammo::new(config.starting_ammo, config.max_ammo),
            world_speed: config.world_speed,
            debug: config.debug,
            player: Player::new(config.power_up_limit_ms),
            config,
            rng,
            elapsed_ms: 0.0,
            game_over: false,
            score: 0,
            ammo_regen_timer: 0.0,
            enemy_spawn_timer: 0.0,
            keys: HeldKeys::default(),
            background: Background::default(),
            shield: Shield::default(),
            enemies: Vec::new(),
            particles: Vec::new(),
            explosions: Vec::new(),
            events: Vec::new(),
        })
    }

    /// Advances the whole round by one frame. Order matters: collisions are
    /// resolved against positions from this frame.
    pub fn update(&mut self, delta_ms: f64) {
        self.advance_clock(delta_ms);

        self.background.update(delta_ms, self.world_speed);

        let viewport = self.config.viewport();
        self.player.update(
            delta_ms,
            self.keys,
            viewport,
            &mut self.ammo,
            &mut self.events,
        );
        self.shield.update(delta_ms);

        // regen keeps running after the game is over
        if self.ammo_regen_timer > self.config.ammo_regen_interval_ms {
            self.ammo.add(1.0);
            self.ammo_regen_timer = 0.0;
        } else {
            self.ammo_regen_timer += delta_ms;
        }

        for particle in self.particles.iter_mut() {
            particle.update(delta_ms, self.world_speed, viewport);
        }
        self.particles.retain(|particle| !particle.is_marked_for_deletion());

        for explosion in self.explosions.iter_mut() {
            explosion.update(delta_ms, self.world_speed);
        }
        self.explosions
            .retain(|explosion| !explosion.is_marked_for_deletion());

        self.update_enemies(delta_ms);
        self.enemies.retain(|enemy| !enemy.is_marked_for_deletion());

        if self.enemy_spawn_timer > self.config.enemy_spawn_interval_ms && !self.game_over {
            self.add_enemy();
            self.enemy_spawn_timer = 0.0;
        } else {
            self.enemy_spawn_timer += delta_ms;
        }
    }

    fn advance_clock(&mut self, delta_ms: f64) {
        if self.game_over {
            return;
        }
        self.elapsed_ms += delta_ms;
        if self.elapsed_ms > self.config.time_limit_ms {
            self.end_game();
        }
    }

    fn update_enemies(&mut self, delta_ms: f64) {
        // drones released this frame join after the pass
        let mut released = Vec::new();
        let mut enemies = std::mem::take(&mut self.enemies);

        for enemy in enemies.iter_mut() {
            enemy.update(delta_ms, self.world_speed);
            if enemy.is_marked_for_deletion() {
                continue;
            }

            if self.player.bounding_box().intersects(enemy.bounding_box()) {
                self.ram(enemy);
                continue;
            }

            let mut shot_down = false;
            for projectile in self.player.projectiles_mut() {
                if projectile.is_marked_for_deletion()
                    || !projectile.bounding_box().intersects(enemy.bounding_box())
                {
                    continue;
                }
                projectile.mark_for_deletion();
                shot_down = enemy.hit();
                self.particles
                    .push(Particle::new(enemy.bounding_box().center(), &mut self.rng));
                self.events.push(GameEvent::EnemyHit {
                    kind: enemy.kind(),
                    lives_left: enemy.lives(),
                });
                if shot_down {
                    break;
                }
            }

            if shot_down {
                self.kill(enemy, &mut released);
            }
        }

        enemies.append(&mut released);
        self.enemies = enemies;
    }

    /// Enemy rammed the player
    fn ram(&mut self, enemy: &mut Enemy) {
        enemy.mark_for_deletion();
        self.burst(enemy);
        self.shield.reset();
        self.events.push(GameEvent::PlayerHit { kind: enemy.kind() });

        let rules = enemy.kind().rules();
        for effect in rules.on_contact {
            self.apply(*effect, enemy, &mut Vec::new());
        }
        if rules.contact_penalty && !self.game_over {
            self.score -= 1;
        }
    }

    /// Enemy shot down
    fn kill(&mut self, enemy: &Enemy, released: &mut Vec<Enemy>) {
        self.burst(enemy);
        self.events.push(GameEvent::EnemyKilled {
            kind: enemy.kind(),
            score: enemy.score(),
        });

        for effect in enemy.kind().rules().on_killed {
            self.apply(*effect, enemy, released);
        }
        if !self.game_over {
            self.score += enemy.score();
            self.check_winning_score();
        }
    }

    /// Explosion plus one particle per point the enemy is worth
    fn burst(&mut self, enemy: &Enemy) {
        let center = enemy.bounding_box().center();
        for _ in 0..enemy.score() {
            self.particles.push(Particle::new(center, &mut self.rng));
        }
        self.explosions.push(Explosion::new(center, &mut self.rng));
    }

    fn apply(&mut self, effect: Effect, source: &Enemy, released: &mut Vec<Enemy>) {
        match effect {
            Effect::GrantPowerUp => self.player.enter_power_up(&mut self.ammo, &mut self.events),
            Effect::ReleaseDrones(count) => {
                let area: &Rect = source.bounding_box();
                for _ in 0..count {
                    let position = Point {
                        x: area.x() + self.rng.gen::<f64>() * area.width(),
                        y: area.y() + self.rng.gen::<f64>() * area.height() * 0.5,
                    };
                    released.push(Enemy::new(EnemyKind::Drone, position, &mut self.rng));
                }
                log::debug!("{:?} released {} drones", source.kind(), count);
                self.events.push(GameEvent::DronesReleased { count });
            }
        }
    }

    fn check_winning_score(&mut self) {
        if self.config.win_policy == WinPolicy::EndOnWinningScore
            && self.score > self.config.winning_score
        {
            self.end_game();
        }
    }

    fn end_game(&mut self) {
        if self.game_over {
            return;
        }
        self.game_over = true;
        let outcome = self.judge();
        log::info!("game over after {:.0}ms, score {} ({:?})", self.elapsed_ms, self.score, outcome);
        self.events.push(GameEvent::GameOver { outcome });
    }

    fn judge(&self) -> Outcome {
        if self.score > self.config.winning_score {
            Outcome::Won
        } else {
            Outcome::Lost
        }
    }

    /// Spawns one enemy at the right edge, kind drawn from the spawn table
    pub fn add_enemy(&mut self) {
        let kind = self.config.spawn_table.choose(&mut self.rng);
        let enemy = Enemy::at_right_edge(
            kind,
            self.config.viewport(),
            self.config.spawn_band,
            &mut self.rng,
        );
        log::debug!("spawned {:?} at y {:.0}", kind, enemy.bounding_box().y());
        self.events.push(GameEvent::EnemySpawned { kind });
        self.enemies.push(enemy);
    }

    /// Inserts a ready made enemy, e.g. a scripted encounter
    pub fn push_enemy(&mut self, enemy: Enemy) {
        self.enemies.push(enemy);
    }

    /// Fire action, once per key press
    pub fn fire(&mut self) -> bool {
        self.player
            .shoot_top(&mut self.ammo, &mut self.rng, &mut self.events)
    }

    pub fn set_held_keys(&mut self, keys: HeldKeys) {
        self.keys = keys;
    }

    pub fn toggle_debug(&mut self) {
        self.debug = !self.debug;
    }

    pub fn set_world_speed(&mut self, world_speed: f64) {
        self.world_speed = world_speed.max(0.0);
    }

    /// Events recorded since the last drain, oldest first
    pub fn drain_events(&mut self) -> Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    /// Winner once the round is over, `None` while it is running
    pub fn outcome(&self) -> Option<Outcome> {
        self.game_over.then(|| self.judge())
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn viewport(&self) -> Size {
        self.config.viewport()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn ammo(&self) -> &Ammo {
        &self.ammo
    }

    pub fn world_speed(&self) -> f64 {
        self.world_speed
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn shield(&self) -> &Shield {
        &self.shield
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn explosions(&self) -> &[Explosion] {
        &self.explosions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        GameState::with_seed(GameConfig::default(), 1234).expect("default config is valid")
    }

    fn enemy(kind: EnemyKind, x: f64, y: f64, rng: &mut StdRng) -> Enemy {
        Enemy::new(kind, Point { x, y }, rng).with_speed(0.0)
    }

    #[test]
    fn rejects_invalid_config() {
        let config = GameConfig {
            width: 0.0,
            ..GameConfig::default()
        };
        assert!(GameState::with_seed(config, 1).is_err());
    }

    #[test]
    fn clock_stops_and_game_ends_past_limit() {
        let mut state = GameState::with_seed(
            GameConfig {
                time_limit_ms: 100.0,
                ..GameConfig::default()
            },
            1,
        )
        .unwrap();
        state.update(60.0);
        state.update(60.0);
        assert!(state.is_game_over());
        let elapsed = state.elapsed_ms();
        state.update(60.0);
        assert_eq!(state.elapsed_ms(), elapsed);
        assert_eq!(state.outcome(), Some(Outcome::Lost));
        let game_overs = state
            .drain_events()
            .filter(|event| matches!(event, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
    }

    #[test]
    fn ammo_regenerates_one_round_per_interval() {
        let mut state = state();
        let start = state.ammo().current();
        // timer must exceed 350ms before a round is added
        for _ in 0..9 {
            state.update(50.0);
        }
        assert_eq!(state.ammo().current(), start + 1.0);
    }

    #[test]
    fn enemy_spawns_after_interval() {
        let mut state = state();
        state.update(1000.0);
        state.update(1001.0);
        assert!(state.enemies().is_empty());
        state.update(16.0);
        assert_eq!(state.enemies().len(), 1);
        assert_eq!(state.enemies()[0].bounding_box().x(), 1000.0);
    }

    #[test]
    fn ramming_costs_a_point() {
        let mut state = state();
        let mut rng = StdRng::seed_from_u64(5);
        state.push_enemy(enemy(EnemyKind::Razorfin, 60.0, 120.0, &mut rng));
        state.update(REFERENCE_FRAME_MS);
        assert_eq!(state.score(), -1);
        assert!(state.enemies().is_empty());
        assert_eq!(state.particles().len(), 7);
        assert_eq!(state.explosions().len(), 1);
        assert!(state.shield().is_active());
    }

    /// Fires one projectile that overlaps `target_x` on the next update,
    /// then parks the player out of the way.
    fn fire_point_blank(state: &mut GameState, target_x: f64, target_y: f64) {
        state.player_mut().move_to(Point {
            x: target_x - 80.0,
            y: target_y,
        });
        assert!(state.fire());
        state.player_mut().move_to(Point { x: 20.0, y: 300.0 });
    }

    #[test]
    fn killing_moonfish_grants_power_up() {
        let mut state = state();
        let mut rng = StdRng::seed_from_u64(5);
        state.push_enemy(enemy(EnemyKind::MoonFish, 400.0, 100.0, &mut rng).with_lives(1));
        fire_point_blank(&mut state, 400.0, 100.0);
        state.update(REFERENCE_FRAME_MS);

        assert!(state.enemies().is_empty());
        assert!(state.player().is_powered_up());
        assert_eq!(state.score(), 10);
        assert_eq!(state.ammo().current(), 50.0);
    }

    #[test]
    fn killing_hive_whale_releases_five_drones() {
        let mut state = state();
        let mut rng = StdRng::seed_from_u64(5);
        state.push_enemy(enemy(EnemyKind::HiveWhale, 300.0, 0.0, &mut rng).with_lives(1));
        fire_point_blank(&mut state, 330.0, 0.0);
        state.update(REFERENCE_FRAME_MS);

        let drones: Vec<&Enemy> = state
            .enemies()
            .iter()
            .filter(|enemy| enemy.kind() == EnemyKind::Drone)
            .collect();
        assert_eq!(drones.len(), 5);
        assert_eq!(state.enemies().len(), 5);
        for drone in drones {
            let position = drone.bounding_box().position;
            // the whale drifted one pixel before it died
            assert!(position.x >= 299.0 && position.x < 699.0);
            assert!(position.y >= 0.0 && position.y < 113.5);
        }
        assert_eq!(state.score(), 20);
    }

    #[test]
    fn score_frozen_after_game_over() {
        let mut state = GameState::with_seed(
            GameConfig {
                time_limit_ms: 10.0,
                ..GameConfig::default()
            },
            1,
        )
        .unwrap();
        state.update(20.0);
        assert!(state.is_game_over());

        let mut rng = StdRng::seed_from_u64(5);
        state.push_enemy(enemy(EnemyKind::Stalker, 60.0, 120.0, &mut rng));
        state.update(REFERENCE_FRAME_MS);
        assert_eq!(state.score(), 0);
        assert!(state.enemies().is_empty());
    }

    #[test]
    fn winning_score_can_end_round_early() {
        let mut state = GameState::with_seed(
            GameConfig {
                winning_score: 4,
                win_policy: WinPolicy::EndOnWinningScore,
                ..GameConfig::default()
            },
            1,
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        state.push_enemy(enemy(EnemyKind::Stalker, 300.0, 100.0, &mut rng).with_lives(1));
        fire_point_blank(&mut state, 330.0, 100.0);
        state.update(REFERENCE_FRAME_MS);

        assert_eq!(state.score(), 5);
        assert!(state.is_game_over());
        assert_eq!(state.outcome(), Some(Outcome::Won));
    }

    #[test]
    fn drained_events_are_consumed() {
        let mut state = state();
        state.fire();
        assert_eq!(state.drain_events().count(), 1);
        assert_eq!(state.drain_events().count(), 0);
    }
}
