use crate::world::frame_scale;

/// One horizontally repeating strip of the parallax backdrop. It is drawn
/// twice side by side, so wrapping after a full width is seamless.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    x: f64,
    speed_modifier: f64,
}

impl Layer {
    pub const WIDTH: f64 = 1768.0;

    pub fn new(speed_modifier: f64) -> Self {
        Layer {
            x: 0.0,
            speed_modifier,
        }
    }

    pub fn update(&mut self, delta_ms: f64, world_speed: f64) {
        if self.x <= -Self::WIDTH {
            self.x = 0.0;
        }
        self.x -= world_speed * self.speed_modifier * frame_scale(delta_ms);
    }

    pub fn x(&self) -> f64 {
        self.x
    }
}

/// Three backdrop layers behind the action and one foreground layer drawn
/// over it, each scrolling at its own fraction of the world speed.
#[derive(Debug, Clone)]
pub struct Background {
    layers: [Layer; 3],
    foreground: Layer,
}

impl Default for Background {
    fn default() -> Self {
        Background {
            layers: [Layer::new(0.2), Layer::new(0.4), Layer::new(1.0)],
            foreground: Layer::new(1.5),
        }
    }
}

impl Background {
    pub fn update(&mut self, delta_ms: f64, world_speed: f64) {
        for layer in self.layers.iter_mut() {
            layer.update(delta_ms, world_speed);
        }
        self.foreground.update(delta_ms, world_speed);
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn foreground(&self) -> &Layer {
        &self.foreground
    }
}
