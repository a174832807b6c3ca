use crate::browser;
use crate::engine::{
    self, DebugDraw, Game, Image, KeyState, Point, Rect, Renderer, Sound, TextStyle,
};
use crate::sprite::submarine::HeldKeys;
use crate::sprite::{EXPLOSION, GEARS_CELL, PLAYER, PROJECTILE, SHIELD};
use crate::world::background::Layer;
use crate::world::config::GameConfig;
use crate::world::effects::ExplosionSkin;
use crate::world::enemy::EnemyKind;
use crate::world::events::SoundCue;
use crate::world::{GameState, Outcome};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::future::try_join_all;
use futures::join;
use std::collections::HashMap;
use web_sys::HtmlImageElement;

/// ┌──────────────────────── Frame Flow ─────────────────────────┐
/// │  GameLoop ──► DeepDive::update ──► GameState::update        │
/// │                     │                    │                  │
/// │                KeyState             GameEvent queue         │
/// │                     │                    │                  │
/// │               fire / debug         SoundCue ──► Sound::play │
/// │                                                             │
/// │  GameLoop ──► DeepDive::draw ──► Renderer (canvas 2d)       │
/// └─────────────────────────────────────────────────────────────┘
pub enum DeepDive {
    /// assets and config are still being fetched
    Loading,
    Loaded(Dive),
}

pub struct Dive {
    state: GameState,
    art: Art,
    sounds: HashMap<SoundCue, Sound>,
}

struct Art {
    player: HtmlImageElement,
    shield: HtmlImageElement,
    projectile: HtmlImageElement,
    gears: HtmlImageElement,
    smoke: HtmlImageElement,
    fire: HtmlImageElement,
    layers: Vec<Image>,
    foreground: Image,
    enemies: HashMap<EnemyKind, HtmlImageElement>,
}

mod keys {
    pub const UP: &str = "ArrowUp";
    pub const DOWN: &str = "ArrowDown";
    pub const FIRE: &str = "Space";
    pub const DEBUG: &str = "KeyD";
}

mod ui {
    pub const FONT: &str = "25px Bangers";
    pub const TITLE_FONT: &str = "70px Bangers";
    pub const SUBTITLE_FONT: &str = "35px Bangers";
    pub const DEBUG_FONT: &str = "20px Helvetica";
    pub const COLOR: &str = "white";
    pub const POWERED_AMMO_COLOR: &str = "#ffffbd";
}

impl DeepDive {
    const CONFIG_PATH: &'static str = "config.json";

    pub fn new() -> Self {
        DeepDive::Loading
    }

    /// A missing or broken config file is not fatal, defaults are playable
    async fn load_config() -> GameConfig {
        match browser::fetch_json::<GameConfig>(Self::CONFIG_PATH).await {
            Ok(config) => config,
            Err(err) => {
                log::warn!("using default config, {} unavailable: {:#}", Self::CONFIG_PATH, err);
                GameConfig::default()
            }
        }
    }

    async fn load_art() -> Result<Art> {
        let (player, shield, projectile, gears, smoke, fire) = join!(
            image("player.png"),
            image("shield.png"),
            image("projectile.png"),
            image("gears.png"),
            image("smokeExplosion.png"),
            image("fireExplosion.png")
        );
        let layers = try_join_all(
            ["layer1.png", "layer2.png", "layer3.png"]
                .into_iter()
                .map(image),
        )
        .await?;
        let foreground = image("layer4.png").await?;
        let enemies = try_join_all(
            EnemyKind::ALL
                .into_iter()
                .map(|kind| async move { image(sprite_path(kind)).await.map(|sprite| (kind, sprite)) }),
        )
        .await?;

        Ok(Art {
            player: player?,
            shield: shield?,
            projectile: projectile?,
            gears: gears?,
            smoke: smoke?,
            fire: fire?,
            layers: layers
                .into_iter()
                .map(Image::new)
                .collect(),
            foreground: Image::new(foreground),
            enemies: enemies.into_iter().collect(),
        })
    }

    fn load_sounds() -> Result<HashMap<SoundCue, Sound>> {
        [
            (SoundCue::Shot, "shot.wav"),
            (SoundCue::Hit, "hit.wav"),
            (SoundCue::Explosion, "explosion.wav"),
            (SoundCue::PowerUp, "powerup.wav"),
            (SoundCue::PowerDown, "powerdown.wav"),
            (SoundCue::Shield, "shield.wav"),
        ]
        .into_iter()
        .map(|(cue, path)| {
            engine::load_sound(path)
                .with_context(|| format!("Failed to load sound from : {}", path))
                .map(|sound| (cue, sound))
        })
        .collect()
    }
}

impl Default for DeepDive {
    fn default() -> Self {
        DeepDive::new()
    }
}

async fn image(path: &'static str) -> Result<HtmlImageElement> {
    engine::load_image(path)
        .await
        .with_context(|| format!("Failed to load sprite image resource from : {}", path))
}

fn sprite_path(kind: EnemyKind) -> &'static str {
    match kind {
        EnemyKind::Angler1 => "angler1.png",
        EnemyKind::Angler2 => "angler2.png",
        EnemyKind::LuckyFish => "lucky.png",
        EnemyKind::HiveWhale => "hivewhale.png",
        EnemyKind::Drone => "drone.png",
        EnemyKind::BulbWhale => "bulbwhale.png",
        EnemyKind::MoonFish => "moonfish.png",
        EnemyKind::Stalker => "stalker.png",
        EnemyKind::Razorfin => "razorfin.png",
    }
}

#[async_trait(?Send)]
impl Game for DeepDive {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            DeepDive::Loading => {
                let (config, art) = join!(Self::load_config(), Self::load_art());
                let state = GameState::new(config).context("Invalid game config")?;
                let dive = Dive {
                    state,
                    art: art?,
                    sounds: Self::load_sounds()?,
                };
                Ok(Box::new(DeepDive::Loaded(dive)))
            }
            DeepDive::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, delta_ms: f64, keystate: &KeyState) {
        if let DeepDive::Loaded(dive) = self {
            dive.state.set_held_keys(HeldKeys {
                up: keystate.is_pressed(keys::UP),
                down: keystate.is_pressed(keys::DOWN),
            });
            if keystate.was_just_pressed(keys::FIRE) {
                dive.state.fire();
            }
            if keystate.was_just_pressed(keys::DEBUG) {
                dive.state.toggle_debug();
            }

            dive.state.update(delta_ms);

            for event in dive.state.drain_events() {
                for cue in event.sound_cues() {
                    if let Some(sound) = dive.sounds.get(cue) {
                        sound.play();
                    }
                }
            }
        }
    }

    fn draw(&self, renderer: &Renderer) {
        if let DeepDive::Loaded(dive) = self {
            let viewport = dive.state.viewport();
            renderer.clear(&Rect::new(Point::default(), viewport));
            // draw order : backdrop -> hud -> player -> debris -> enemies -> foreground
            for (image, layer) in dive.art.layers.iter().zip(dive.state.background().layers()) {
                draw_layer(renderer, image, layer);
            }
            dive.draw_hud(renderer);
            dive.draw_player(renderer);
            dive.draw_particles(renderer);
            dive.draw_enemies(renderer);
            dive.draw_explosions(renderer);
            draw_layer(
                renderer,
                &dive.art.foreground,
                dive.state.background().foreground(),
            );
        }
    }
}

fn draw_layer(renderer: &Renderer, image: &Image, layer: &Layer) {
    // second copy to the right makes the strip look endless
    image.draw_at(renderer, &Point { x: layer.x(), y: 0.0 });
    image.draw_at(
        renderer,
        &Point {
            x: layer.x() + Layer::WIDTH,
            y: 0.0,
        },
    );
}

impl Dive {
    fn draw_hud(&self, renderer: &Renderer) {
        let style = TextStyle {
            font: ui::FONT,
            color: ui::COLOR,
            align: "left",
        };
        renderer.draw_text(
            &format!("Score: {}", self.state.score()),
            &Point { x: 20.0, y: 40.0 },
            &style,
        );
        renderer.draw_text(
            &format!("Time: {:.1}", self.state.elapsed_ms() * 0.001),
            &Point { x: 20.0, y: 100.0 },
            &style,
        );

        let ammo_color = if self.state.player().is_powered_up() {
            ui::POWERED_AMMO_COLOR
        } else {
            ui::COLOR
        };
        for round in 0..self.state.ammo().rounds() {
            renderer.fill_rect(
                &Rect::new_from_x_y(20.0 + 5.0 * f64::from(round), 50.0, 3.0, 20.0),
                ammo_color,
            );
        }

        if let Some(outcome) = self.state.outcome() {
            let (title, subtitle) = match outcome {
                Outcome::Won => ("Most Wondrous!", "Well done explorer!"),
                Outcome::Lost => ("Blazes!", "Get my repair kit and try again!"),
            };
            let viewport = self.state.viewport();
            let center = Point {
                x: viewport.width * 0.5,
                y: viewport.height * 0.5,
            };
            renderer.draw_text(
                title,
                &Point {
                    x: center.x,
                    y: center.y - 20.0,
                },
                &TextStyle {
                    font: ui::TITLE_FONT,
                    color: ui::COLOR,
                    align: "center",
                },
            );
            renderer.draw_text(
                subtitle,
                &Point {
                    x: center.x,
                    y: center.y + 30.0,
                },
                &TextStyle {
                    font: ui::SUBTITLE_FONT,
                    color: ui::COLOR,
                    align: "center",
                },
            );
        }
    }

    fn draw_player(&self, renderer: &Renderer) {
        let player = self.state.player();
        let bounding_box = player.bounding_box();
        if self.state.is_debug() {
            bounding_box.draw_debug(renderer);
        }

        for projectile in player.projectiles() {
            renderer.draw_image(
                &self.art.projectile,
                &PROJECTILE.source(projectile.frame(), 0),
                projectile.bounding_box(),
            );
        }

        renderer.draw_image(
            &self.art.player,
            &PLAYER.source(player.frame(), player.row()),
            bounding_box,
        );

        let shield = self.state.shield();
        if shield.is_active() {
            renderer.draw_image(
                &self.art.shield,
                &SHIELD.source(shield.frame(), 0),
                bounding_box,
            );
        }
    }

    fn draw_particles(&self, renderer: &Renderer) {
        for particle in self.state.particles() {
            let (column, row) = particle.cell();
            let source = Rect::new_from_x_y(
                f64::from(column) * GEARS_CELL,
                f64::from(row) * GEARS_CELL,
                GEARS_CELL,
                GEARS_CELL,
            );
            renderer.draw_rotated_image(
                &self.art.gears,
                &source,
                &particle.position(),
                particle.size(),
                particle.angle(),
            );
        }
    }

    fn draw_enemies(&self, renderer: &Renderer) {
        for enemy in self.state.enemies() {
            let bounding_box = enemy.bounding_box();
            if let Some(image) = self.art.enemies.get(&enemy.kind()) {
                let cell = bounding_box.size;
                let source = Rect::new_from_x_y(
                    f64::from(enemy.frame()) * cell.width,
                    f64::from(enemy.row()) * cell.height,
                    cell.width,
                    cell.height,
                );
                renderer.draw_image(image, &source, bounding_box);
            }
            if self.state.is_debug() {
                bounding_box.draw_debug(renderer);
                renderer.draw_text(
                    &enemy.lives().to_string(),
                    &bounding_box.position,
                    &TextStyle {
                        font: ui::DEBUG_FONT,
                        color: "black",
                        align: "left",
                    },
                );
            }
        }
    }

    fn draw_explosions(&self, renderer: &Renderer) {
        for explosion in self.state.explosions() {
            let image = match explosion.skin() {
                ExplosionSkin::Smoke => &self.art.smoke,
                ExplosionSkin::Fire => &self.art.fire,
            };
            renderer.draw_image(
                image,
                &EXPLOSION.source(explosion.frame(), 0),
                explosion.bounding_box(),
            );
        }
    }
}
