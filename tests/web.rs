//! Browser-side checks, run with `wasm-pack test --headless --firefox`
#![cfg(target_arch = "wasm32")]

use sub_shooter::engine::LoopHandle;
use sub_shooter::world::config::WinPolicy;
use sub_shooter::world::REFERENCE_FRAME_MS;
use sub_shooter::{GameConfig, GameState};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn config_from_json(json: &str) -> GameConfig {
    let value = js_sys::JSON::parse(json).expect("test json should parse");
    serde_wasm_bindgen::from_value(value).expect("config should decode")
}

#[wasm_bindgen_test]
fn partial_config_keeps_defaults() {
    let config = config_from_json(r#"{ "time_limit_ms": 5000, "win_policy": "EndOnWinningScore" }"#);
    assert_eq!(config.time_limit_ms, 5000.0);
    assert_eq!(config.win_policy, WinPolicy::EndOnWinningScore);
    assert_eq!(config.width, GameConfig::default().width);
    assert_eq!(config.spawn_table, GameConfig::default().spawn_table);
}

#[wasm_bindgen_test]
fn custom_spawn_table_decodes() {
    let config = config_from_json(
        r#"{ "spawn_table": { "entries": [{ "kind": "Drone", "below": 0.5 }], "fallback": "MoonFish" } }"#,
    );
    assert!(config.validate().is_ok());
    assert_eq!(config.spawn_table.entries.len(), 1);
}

#[wasm_bindgen_test]
fn round_runs_with_browser_entropy() {
    // from_entropy goes through getrandom's js backend here
    let seed = (js_sys::Math::random() * 1e9) as u64;
    let mut state = GameState::with_seed(GameConfig::default(), seed).expect("default config");
    let mut fresh = GameState::new(GameConfig::default()).expect("default config");
    for _ in 0..120 {
        state.update(REFERENCE_FRAME_MS);
        fresh.update(REFERENCE_FRAME_MS);
    }
    assert!(!state.is_game_over());
    assert!(fresh.elapsed_ms() > 0.0);
}

#[wasm_bindgen_test]
fn stopped_loop_stays_stopped() {
    let handle = LoopHandle::default();
    let shared = handle.clone();
    shared.stop();
    assert!(!handle.is_running());
}
