//! Whole rounds driven through the public API, no browser involved.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sub_shooter::engine::Point;
use sub_shooter::sprite::submarine::HeldKeys;
use sub_shooter::world::enemy::{Enemy, EnemyKind};
use sub_shooter::world::REFERENCE_FRAME_MS;
use sub_shooter::{GameConfig, GameEvent, GameState, Outcome};

const SEED: u64 = 42;

fn seeded(config: GameConfig) -> GameState {
    GameState::with_seed(config, SEED).expect("config should be valid")
}

fn parked_enemy(kind: EnemyKind, x: f64, y: f64) -> Enemy {
    let mut rng = StdRng::seed_from_u64(7);
    Enemy::new(kind, Point { x, y }, &mut rng).with_speed(0.0)
}

#[test]
fn ramming_lucky_fish_powers_up_without_penalty() {
    let mut state = seeded(GameConfig::default());
    state.push_enemy(parked_enemy(EnemyKind::LuckyFish, 500.0, 200.0));
    state.player_mut().move_to(Point { x: 450.0, y: 200.0 });

    state.update(REFERENCE_FRAME_MS);

    assert!(state.player().is_powered_up());
    assert_eq!(state.ammo().current(), state.ammo().max());
    assert!(state.enemies().is_empty());
    assert_eq!(state.score(), 0);
    assert!(state.shield().is_active());

    let events: Vec<GameEvent> = state.drain_events().collect();
    assert!(events.contains(&GameEvent::PlayerHit {
        kind: EnemyKind::LuckyFish
    }));
    assert!(events.contains(&GameEvent::PowerUpEntered));
}

#[test]
fn firing_without_ammo_does_nothing() {
    let mut state = seeded(GameConfig {
        starting_ammo: 0.0,
        ..GameConfig::default()
    });

    assert!(!state.fire());
    assert!(state.player().projectiles().is_empty());
    assert_eq!(state.ammo().current(), 0.0);
    assert_eq!(state.drain_events().count(), 0);
}

#[test]
fn last_life_hit_scores_and_bursts() {
    let mut state = seeded(GameConfig::default());
    state.push_enemy(parked_enemy(EnemyKind::Angler1, 400.0, 100.0).with_lives(1));
    state.player_mut().move_to(Point { x: 320.0, y: 100.0 });
    assert!(state.fire());
    state.player_mut().move_to(Point { x: 20.0, y: 300.0 });

    state.update(REFERENCE_FRAME_MS);

    assert!(state.enemies().is_empty());
    assert_eq!(state.score(), 5);
    // one for the hit, five for the kill
    assert_eq!(state.particles().len(), 6);
    assert_eq!(state.explosions().len(), 1);
    let killed = state
        .drain_events()
        .filter(|event| {
            matches!(
                event,
                GameEvent::EnemyKilled {
                    kind: EnemyKind::Angler1,
                    score: 5
                }
            )
        })
        .count();
    assert_eq!(killed, 1);
}

#[test]
fn nothing_spawns_after_game_over_but_ammo_regenerates() {
    let mut state = seeded(GameConfig {
        time_limit_ms: 100.0,
        ..GameConfig::default()
    });
    while !state.is_game_over() {
        state.update(REFERENCE_FRAME_MS);
    }
    let ammo_at_end = state.ammo().current();
    state.drain_events().for_each(drop);

    // ten seconds, long past several spawn intervals
    for _ in 0..600 {
        state.update(REFERENCE_FRAME_MS);
    }

    assert!(state.enemies().is_empty());
    assert!(!state
        .drain_events()
        .any(|event| matches!(event, GameEvent::EnemySpawned { .. })));
    assert!(state.ammo().current() > ammo_at_end);
    assert_eq!(state.outcome(), Some(Outcome::Lost));
    assert!(state.elapsed_ms() <= 100.0 + REFERENCE_FRAME_MS);
}

#[test]
fn invariants_hold_through_a_random_round() {
    let mut state = seeded(GameConfig {
        time_limit_ms: 20_000.0,
        ..GameConfig::default()
    });
    let mut input = StdRng::seed_from_u64(99);
    let half_height = state.player().bounding_box().height() * 0.5;
    let viewport = state.viewport();

    for _ in 0..1500 {
        state.set_held_keys(HeldKeys {
            up: input.gen_bool(0.3),
            down: input.gen_bool(0.3),
        });
        if input.gen_bool(0.2) {
            state.fire();
        }
        state.update(input.gen_range(8.0..40.0));

        let ammo = state.ammo();
        assert!(ammo.current() >= 0.0 && ammo.current() <= ammo.max());

        let y = state.player().bounding_box().y();
        assert!(y >= -half_height && y <= viewport.height - half_height);

        assert!(state
            .enemies()
            .iter()
            .all(|enemy| !enemy.is_marked_for_deletion()));
        assert!(state
            .particles()
            .iter()
            .all(|particle| !particle.is_marked_for_deletion()));
        assert!(state
            .explosions()
            .iter()
            .all(|explosion| !explosion.is_marked_for_deletion()));
        state.drain_events().for_each(drop);
    }

    assert!(state.is_game_over());
}

#[test]
fn same_seed_same_round() {
    let play = || {
        let mut state = seeded(GameConfig::default());
        let mut events = Vec::new();
        for frame in 0..900 {
            if frame % 20 == 0 {
                state.fire();
            }
            state.set_held_keys(HeldKeys {
                up: frame % 200 < 100,
                down: frame % 200 >= 100,
            });
            state.update(REFERENCE_FRAME_MS);
            events.extend(state.drain_events());
        }
        let positions: Vec<Point> = state
            .enemies()
            .iter()
            .map(|enemy| enemy.bounding_box().position)
            .collect();
        (state.score(), positions, events)
    };

    assert_eq!(play(), play());
}
