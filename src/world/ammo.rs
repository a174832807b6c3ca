/// Ammunition pool. Fractional so a power up can trickle ammo in every
/// frame; only whole rounds can be spent or shown.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ammo {
    current: f64,
    max: f64,
}

impl Ammo {
    /// `current` is clamped into `[0, max]`
    pub fn new(current: f64, max: f64) -> Self {
        Ammo {
            current: current.clamp(0.0, max),
            max,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Whole rounds available
    pub fn rounds(&self) -> u32 {
        self.current.floor() as u32
    }

    pub fn has_round(&self) -> bool {
        self.current >= 1.0
    }

    /// Spends one round. Returns false and leaves the pool untouched when
    /// less than a whole round is left.
    pub fn spend(&mut self) -> bool {
        if self.has_round() {
            self.current -= 1.0;
            true
        } else {
            false
        }
    }

    pub fn add(&mut self, amount: f64) {
        self.current = (self.current + amount).min(self.max);
    }

    /// Tops up to the maximum, never lowers a full pool
    pub fn refill(&mut self) {
        if self.current < self.max {
            self.current = self.max;
        }
    }
}
