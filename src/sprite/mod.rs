// Sprite sheets in this game are horizontal strips: frame N lives at
// x = N * cell width, and rows select a variant (power up, colour, ...).
//
// ┌────────────────┬──────────────────────────────────────────────┐
// │ File           │ Contents                                     │
// ├────────────────┼──────────────────────────────────────────────┤
// │ mod.rs         │ SpriteStrip metadata + FrameTimer cadence    │
// │ state.rs       │ Normal / Powered typestates for the sub      │
// │ submarine.rs   │ Player: movement, shooting, state machine    │
// └────────────────┴──────────────────────────────────────────────┘
pub mod state;
pub mod submarine;

use crate::engine::{Rect, Size};

/// Layout of one animated strip
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpriteStrip {
    /// last frame index, frames run 0..=max_frame
    pub max_frame: u8,
    pub fps: f64,
    pub cell: Size,
}

impl SpriteStrip {
    /// Source rectangle of `frame` on `row` inside the sheet
    pub fn source(&self, frame: u8, row: u8) -> Rect {
        Rect::new_from_x_y(
            f64::from(frame) * self.cell.width,
            f64::from(row) * self.cell.height,
            self.cell.width,
            self.cell.height,
        )
    }

    pub fn timer(&self) -> FrameTimer {
        FrameTimer::with_fps(self.fps)
    }
}

pub const PLAYER: SpriteStrip = SpriteStrip {
    max_frame: 37,
    fps: 60.0,
    cell: Size {
        width: 120.0,
        height: 190.0,
    },
};

/// Enemy cells match each enemy's own size, so only cadence is shared
pub const ENEMY_MAX_FRAME: u8 = 37;
pub const ENEMY_FPS: f64 = 60.0;

pub const PROJECTILE: SpriteStrip = SpriteStrip {
    max_frame: 3,
    fps: 20.0,
    cell: Size {
        width: 36.25,
        height: 20.0,
    },
};

pub const EXPLOSION: SpriteStrip = SpriteStrip {
    max_frame: 8,
    fps: 30.0,
    cell: Size {
        width: 200.0,
        height: 200.0,
    },
};

pub const SHIELD: SpriteStrip = SpriteStrip {
    max_frame: 24,
    fps: 30.0,
    cell: PLAYER.cell,
};

/// Particle sheet is a 3x3 grid of gears and bolts
pub const GEARS_CELL: f64 = 50.0;
pub const GEARS_GRID: u8 = 3;

/// Frame counter driven by elapsed milliseconds instead of frame count
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTimer {
    frame: u8,
    timer_ms: f64,
    interval_ms: f64,
}

impl FrameTimer {
    pub fn with_fps(fps: f64) -> Self {
        FrameTimer {
            frame: 0,
            timer_ms: 0.0,
            interval_ms: 1000.0 / fps,
        }
    }

    pub fn frame(&self) -> u8 {
        self.frame
    }

    pub fn reset(&mut self) {
        self.frame = 0;
        self.timer_ms = 0.0;
    }

    /// Moves one frame forward once the interval has been exceeded, never
    /// more than one frame per call. Returns whether the frame changed.
    pub fn tick(&mut self, delta_ms: f64) -> bool {
        if self.timer_ms > self.interval_ms {
            self.frame = self.frame.saturating_add(1);
            self.timer_ms = 0.0;
            true
        } else {
            self.timer_ms += delta_ms;
            false
        }
    }

    /// Same as [`FrameTimer::tick`] but wraps back to 0 after `max_frame`
    pub fn tick_looping(&mut self, delta_ms: f64, max_frame: u8) -> bool {
        if self.timer_ms > self.interval_ms {
            self.frame = if self.frame < max_frame {
                self.frame + 1
            } else {
                0
            };
            self.timer_ms = 0.0;
            true
        } else {
            self.timer_ms += delta_ms;
            false
        }
    }
}
