//! Cosmetic entities. They follow the same soft delete lifecycle as the
//! gameplay entities but never feed back into score or health.

use crate::engine::{Point, Rect, Size};
use crate::sprite::{FrameTimer, EXPLOSION, GEARS_CELL, GEARS_GRID, SHIELD};
use crate::world::frame_scale;
use rand::Rng;

const GRAVITY: f64 = 0.5;
const MAX_BOUNCES: u8 = 2;
const BOUNCE_DAMPING: f64 = -0.5;

/// Gear or bolt knocked off an enemy. Ballistic, bounces off an uneven
/// floor a couple of times, then falls out of the viewport.
#[derive(Debug, Clone)]
pub struct Particle {
    position: Point,
    speed_x: f64,
    speed_y: f64,
    size: f64,
    angle: f64,
    spin: f64,
    bounced: u8,
    floor_offset: f64,
    cell: (u8, u8),
    marked_for_deletion: bool,
}

impl Particle {
    pub fn new<R: Rng + ?Sized>(position: Point, rng: &mut R) -> Self {
        // one decimal, 0.5..=1.0
        let size_modifier = (rng.gen_range(0.5..1.0_f64) * 10.0).round() / 10.0;
        Particle {
            position,
            speed_x: rng.gen_range(-3.0..3.0),
            speed_y: -rng.gen_range(0.0..15.0),
            size: GEARS_CELL * size_modifier,
            angle: 0.0,
            spin: rng.gen_range(-0.1..0.1),
            bounced: 0,
            floor_offset: rng.gen_range(60.0..140.0),
            cell: (rng.gen_range(0..GEARS_GRID), rng.gen_range(0..GEARS_GRID)),
            marked_for_deletion: false,
        }
    }

    pub fn update(&mut self, delta_ms: f64, world_speed: f64, viewport: Size) {
        let scale = frame_scale(delta_ms);
        self.angle += self.spin * scale;
        self.speed_y += GRAVITY * scale;
        self.position.x -= (self.speed_x + world_speed) * scale;
        self.position.y += self.speed_y * scale;

        if self.position.y > viewport.height + self.size || self.position.x < -self.size {
            self.mark_for_deletion();
        }

        if self.position.y > viewport.height - self.floor_offset && self.bounced < MAX_BOUNCES {
            self.bounced += 1;
            self.speed_y *= BOUNCE_DAMPING;
        }
    }

    /// Centre of the particle, it is drawn rotated around this point
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn bounces(&self) -> u8 {
        self.bounced
    }

    /// Column and row in the gears sheet
    pub fn cell(&self) -> (u8, u8) {
        self.cell
    }

    pub fn is_marked_for_deletion(&self) -> bool {
        self.marked_for_deletion
    }

    pub fn mark_for_deletion(&mut self) {
        self.marked_for_deletion = true;
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExplosionSkin {
    Smoke,
    Fire,
}

#[derive(Debug, Clone)]
pub struct Explosion {
    skin: ExplosionSkin,
    bounding_box: Rect,
    animation: FrameTimer,
    marked_for_deletion: bool,
}

impl Explosion {
    /// Explosion centred on `center`, skin picked with equal odds
    pub fn new<R: Rng + ?Sized>(center: Point, rng: &mut R) -> Self {
        let skin = if rng.gen_bool(0.5) {
            ExplosionSkin::Smoke
        } else {
            ExplosionSkin::Fire
        };
        let size = EXPLOSION.cell;
        Explosion {
            skin,
            bounding_box: Rect::new_from_x_y(
                center.x - size.width * 0.5,
                center.y - size.height * 0.5,
                size.width,
                size.height,
            ),
            animation: EXPLOSION.timer(),
            marked_for_deletion: false,
        }
    }

    pub fn update(&mut self, delta_ms: f64, world_speed: f64) {
        let x = self.bounding_box.x() - world_speed * frame_scale(delta_ms);
        self.bounding_box.set_x(x);
        self.animation.tick(delta_ms);
        if self.animation.frame() > EXPLOSION.max_frame {
            self.mark_for_deletion();
        }
    }

    pub fn skin(&self) -> ExplosionSkin {
        self.skin
    }

    pub fn bounding_box(&self) -> &Rect {
        &self.bounding_box
    }

    pub fn frame(&self) -> u8 {
        self.animation.frame()
    }

    pub fn is_marked_for_deletion(&self) -> bool {
        self.marked_for_deletion
    }

    pub fn mark_for_deletion(&mut self) {
        self.marked_for_deletion = true;
    }
}

/// Flash drawn over the player when something rams it. Plays once per
/// contact, idle otherwise.
#[derive(Debug, Clone)]
pub struct Shield {
    animation: FrameTimer,
    active: bool,
}

impl Default for Shield {
    fn default() -> Self {
        Shield {
            animation: SHIELD.timer(),
            active: false,
        }
    }
}

impl Shield {
    pub fn update(&mut self, delta_ms: f64) {
        if self.active {
            self.animation.tick(delta_ms);
            if self.animation.frame() > SHIELD.max_frame {
                self.active = false;
            }
        }
    }

    pub fn reset(&mut self) {
        self.animation.reset();
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn frame(&self) -> u8 {
        self.animation.frame()
    }
}
