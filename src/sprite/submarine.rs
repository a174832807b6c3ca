use crate::engine::{Point, Rect, Size};
use crate::sprite::state::{IsPowered, Normal, Powered, SubmarineContext, SubmarineState};
use crate::sprite::{FrameTimer, PLAYER};
use crate::world::ammo::Ammo;
use crate::world::events::GameEvent;
use crate::world::frame_scale;
use crate::world::projectile::Projectile;
use rand::Rng;

/// Direction keys currently held down
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct HeldKeys {
    pub up: bool,
    pub down: bool,
}

/// ┌──────────── Power Up Transitions ────────────┐
/// │  From      →  Event    →  To                 │
/// ├──────────────────────────────────────────────┤
/// │  Normal    →  PowerUp  →  Powered            │
/// │  Powered   →  PowerUp  →  Powered (restart)  │
/// │  Powered   →  Update   →  Normal (expired)   │
/// │  Normal    →  Update   →  Normal             │
/// └──────────────────────────────────────────────┘
pub enum Event {
    PowerUp,
    Update(f64),
}

#[derive(Debug, Copy, Clone)]
enum SubmarineStateMachine {
    Normal(SubmarineState<Normal>),
    Powered(SubmarineState<Powered>),
}

impl From<SubmarineState<Normal>> for SubmarineStateMachine {
    fn from(state: SubmarineState<Normal>) -> Self {
        SubmarineStateMachine::Normal(state)
    }
}

impl From<SubmarineState<Powered>> for SubmarineStateMachine {
    fn from(state: SubmarineState<Powered>) -> Self {
        SubmarineStateMachine::Powered(state)
    }
}

impl From<IsPowered> for SubmarineStateMachine {
    fn from(is_powered: IsPowered) -> Self {
        match is_powered {
            IsPowered::Expired(normal) => normal.into(),
            IsPowered::Active(powered) => powered.into(),
        }
    }
}

impl SubmarineStateMachine {
    // consumes the old state so it cannot be used after the transition
    fn transition(self, event: Event) -> Self {
        use SubmarineStateMachine::*;
        match (self, event) {
            (Normal(state), Event::PowerUp) => state.power_up().into(),
            (Powered(state), Event::PowerUp) => state.power_up().into(),
            (Powered(state), Event::Update(delta_ms)) => state.update(delta_ms).into(),
            (Normal(_), Event::Update(_)) => self,
        }
    }

    fn is_powered(&self) -> bool {
        matches!(self, SubmarineStateMachine::Powered(_))
    }

    fn context(&self) -> &SubmarineContext {
        match self {
            SubmarineStateMachine::Normal(state) => state.context(),
            SubmarineStateMachine::Powered(state) => state.context(),
        }
    }
}

/// The player's submarine. Moves vertically only, owns its projectiles.
#[derive(Debug, Clone)]
pub struct Player {
    state: SubmarineStateMachine,
    bounding_box: Rect,
    speed_y: f64,
    projectiles: Vec<Projectile>,
    animation: FrameTimer,
}

impl Player {
    pub const MAX_SPEED: f64 = 5.0;
    pub const START: Point = Point { x: 20.0, y: 100.0 };
    const TOP_MUZZLE: Point = Point { x: 80.0, y: 30.0 };
    const BOTTOM_MUZZLE: Point = Point { x: 80.0, y: 175.0 };
    const POWER_UP_AMMO_PER_FRAME: f64 = 0.1;

    pub fn new(power_up_limit_ms: f64) -> Self {
        Player {
            state: SubmarineState::new(power_up_limit_ms).into(),
            bounding_box: Rect::new(Self::START, PLAYER.cell),
            speed_y: 0.0,
            projectiles: Vec::new(),
            animation: PLAYER.timer(),
        }
    }

    pub fn update(
        &mut self,
        delta_ms: f64,
        keys: HeldKeys,
        viewport: Size,
        ammo: &mut Ammo,
        events: &mut Vec<GameEvent>,
    ) {
        self.speed_y = if keys.up {
            -Self::MAX_SPEED
        } else if keys.down {
            Self::MAX_SPEED
        } else {
            0.0
        };

        // half the hull may leave the screen at either edge
        let half_height = self.bounding_box.height() * 0.5;
        let y = (self.bounding_box.y() + self.speed_y * frame_scale(delta_ms))
            .clamp(-half_height, viewport.height - half_height);
        self.bounding_box.set_y(y);

        for projectile in self.projectiles.iter_mut() {
            projectile.update(delta_ms, viewport.width);
        }
        self.projectiles
            .retain(|projectile| !projectile.is_marked_for_deletion());

        self.animation.tick_looping(delta_ms, PLAYER.max_frame);

        let was_powered = self.state.is_powered();
        self.state = self.state.transition(Event::Update(delta_ms));
        if self.state.is_powered() {
            ammo.add(Self::POWER_UP_AMMO_PER_FRAME * frame_scale(delta_ms));
        } else if was_powered {
            log::info!("power up expired");
            events.push(GameEvent::PowerUpExpired);
        }
    }

    /// Fires from the upper muzzle for one round, plus a free shot from the
    /// lower muzzle while powered up. Without a whole round nothing happens.
    pub fn shoot_top<R: Rng + ?Sized>(
        &mut self,
        ammo: &mut Ammo,
        rng: &mut R,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        if !ammo.spend() {
            return false;
        }
        self.projectiles
            .push(Projectile::new(self.muzzle(Self::TOP_MUZZLE), rng));
        let mut fired = 1;
        if self.state.is_powered() {
            self.projectiles
                .push(Projectile::new(self.muzzle(Self::BOTTOM_MUZZLE), rng));
            fired += 1;
        }
        events.push(GameEvent::ShotFired { projectiles: fired });
        true
    }

    /// Opens (or restarts) the power up window and tops up ammo
    pub fn enter_power_up(&mut self, ammo: &mut Ammo, events: &mut Vec<GameEvent>) {
        self.state = self.state.transition(Event::PowerUp);
        ammo.refill();
        log::info!("power up entered");
        events.push(GameEvent::PowerUpEntered);
    }

    fn muzzle(&self, offset: Point) -> Point {
        Point {
            x: self.bounding_box.x() + offset.x,
            y: self.bounding_box.y() + offset.y,
        }
    }

    pub fn move_to(&mut self, position: Point) {
        self.bounding_box.position = position;
    }

    pub fn bounding_box(&self) -> &Rect {
        &self.bounding_box
    }

    pub fn speed_y(&self) -> f64 {
        self.speed_y
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn projectiles_mut(&mut self) -> &mut [Projectile] {
        &mut self.projectiles
    }

    pub fn is_powered_up(&self) -> bool {
        self.state.is_powered()
    }

    pub fn power_up_timer(&self) -> f64 {
        self.state.context().power_up_timer
    }

    pub fn frame(&self) -> u8 {
        self.animation.frame()
    }

    /// Sheet row, the powered up animation sits on the second row
    pub fn row(&self) -> u8 {
        u8::from(self.state.is_powered())
    }
}
