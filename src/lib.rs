// ==================== Imports ====================
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

mod browser;
pub mod engine;
mod game;
pub mod sprite;
pub mod world;

pub use world::config::GameConfig;
pub use world::events::{GameEvent, SoundCue};
pub use world::{GameState, Outcome};

use engine::{GameLoop, LoopHandle};
use game::DeepDive;

thread_local! {
    // wasm is single threaded, the running loop lives here so JS can stop it
    static RUNNING: RefCell<Option<LoopHandle>> = RefCell::new(None);
}

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - installs panic hook and console logging
/// - loads config, sprites and sounds
/// - starts the animation frame loop
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();
    browser::init_logging();

    browser::spawn_local(async move {
        match GameLoop::start(DeepDive::new()).await {
            Ok(handle) => {
                log::info!("dive started");
                RUNNING.with(|running| {
                    if let Some(previous) = running.borrow_mut().replace(handle) {
                        previous.stop();
                    }
                });
            }
            Err(err) => log::error!("could not start game : {:#}", err),
        }
    });

    Ok(())
}

/// Halts the running loop after the current frame. No-op when nothing runs.
#[wasm_bindgen]
pub fn stop_game() {
    RUNNING.with(|running| {
        if let Some(handle) = running.borrow_mut().take() {
            handle.stop();
            log::info!("dive stopped");
        }
    });
}
