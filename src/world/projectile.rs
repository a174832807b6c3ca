use crate::engine::{Point, Rect};
use crate::sprite::{FrameTimer, PROJECTILE};
use crate::world::frame_scale;
use rand::Rng;

/// Torpedo fired by the player, travels right until it leaves the range
#[derive(Debug, Clone)]
pub struct Projectile {
    bounding_box: Rect,
    speed: f64,
    animation: FrameTimer,
    marked_for_deletion: bool,
}

impl Projectile {
    /// Fraction of the viewport width a projectile can travel
    pub const RANGE: f64 = 0.8;

    pub fn new<R: Rng + ?Sized>(position: Point, rng: &mut R) -> Self {
        Projectile {
            bounding_box: Rect::new(position, PROJECTILE.cell),
            speed: rng.gen_range(2.8..3.0),
            animation: PROJECTILE.timer(),
            marked_for_deletion: false,
        }
    }

    pub fn update(&mut self, delta_ms: f64, viewport_width: f64) {
        let x = self.bounding_box.x() + self.speed * frame_scale(delta_ms);
        self.bounding_box.set_x(x);
        self.animation.tick_looping(delta_ms, PROJECTILE.max_frame);

        if x > viewport_width * Self::RANGE {
            self.mark_for_deletion();
        }
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
