/// Power up window of the submarine as typestates. A transition is only
/// reachable through the methods below:
/// - PUBLIC  : SubmarineState and SubmarineContext
/// - PRIVATE : the fields, so a state cannot be forged from outside
///
/// The state knows nothing about ammo or events, the state machine in
/// submarine.rs turns transitions into those.

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Normal;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Powered;

pub enum IsPowered {
    Expired(SubmarineState<Normal>),
    Active(SubmarineState<Powered>),
}

/// Data shared by every state
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SubmarineContext {
    pub power_up_timer: f64,
    pub power_up_limit: f64,
}

#[derive(Debug, Copy, Clone)]
pub struct SubmarineState<S> {
    context: SubmarineContext,
    // type level tag only, never read
    _state: S,
}

impl<S> SubmarineState<S> {
    pub fn context(&self) -> &SubmarineContext {
        &self.context
    }
}

impl SubmarineState<Normal> {
    pub fn new(power_up_limit: f64) -> Self {
        SubmarineState {
            context: SubmarineContext {
                power_up_timer: 0.0,
                power_up_limit,
            },
            _state: Normal,
        }
    }

    pub fn power_up(self) -> SubmarineState<Powered> {
        SubmarineState {
            context: self.context.reset_timer(),
            _state: Powered,
        }
    }
}

impl SubmarineState<Powered> {
    /// Collecting another power up while powered restarts the window
    pub fn power_up(self) -> Self {
        SubmarineState {
            context: self.context.reset_timer(),
            _state: Powered,
        }
    }

    /// Timer is checked before it grows, so the window closes on the first
    /// update after the limit has been exceeded.
    pub fn update(mut self, delta_ms: f64) -> IsPowered {
        if self.context.power_up_timer > self.context.power_up_limit {
            IsPowered::Expired(self.power_down())
        } else {
            self.context.power_up_timer += delta_ms;
            IsPowered::Active(self)
        }
    }

    fn power_down(self) -> SubmarineState<Normal> {
        SubmarineState {
            context: self.context.reset_timer(),
            _state: Normal,
        }
    }
}

impl SubmarineContext {
    fn reset_timer(mut self) -> Self {
        self.power_up_timer = 0.0;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_up_starts_window_at_zero() {
        let powered = SubmarineState::new(100.0).power_up();
        assert_eq!(powered.context().power_up_timer, 0.0);
    }

    #[test]
    fn window_expires_on_first_update_past_limit() {
        let mut state = SubmarineState::new(100.0).power_up();
        for _ in 0..5 {
            state = match state.update(25.0) {
                IsPowered::Active(state) => state,
                IsPowered::Expired(_) => panic!("expired too early"),
            };
        }
        // 125ms accumulated, limit exceeded
        match state.update(25.0) {
            IsPowered::Expired(normal) => assert_eq!(normal.context().power_up_timer, 0.0),
            IsPowered::Active(_) => panic!("window should have closed"),
        }
    }

    #[test]
    fn repeated_power_up_restarts_window() {
        let state = SubmarineState::new(100.0).power_up();
        let state = match state.update(80.0) {
            IsPowered::Active(state) => state,
            IsPowered::Expired(_) => panic!("expired too early"),
        };
        let state = state.power_up();
        assert_eq!(state.context().power_up_timer, 0.0);
    }
}
