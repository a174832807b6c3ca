use crate::engine::{Point, Rect, Size};
use crate::sprite::{FrameTimer, ENEMY_FPS, ENEMY_MAX_FRAME};
use crate::world::frame_scale;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum EnemyKind {
    Angler1,
    Angler2,
    LuckyFish,
    HiveWhale,
    Drone,
    BulbWhale,
    MoonFish,
    Stalker,
    Razorfin,
}

/// Special behaviour attached to a kind, looked up in [`Behavior::rules`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Behavior {
    Lucky,
    Hive,
    Moon,
    Drone,
}

/// Side effects the game state applies on contact or on a kill
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Effect {
    GrantPowerUp,
    ReleaseDrones(u8),
}

#[derive(Debug, PartialEq)]
pub struct BehaviorRules {
    /// effects of ramming the player
    pub on_contact: &'static [Effect],
    /// whether ramming the player costs a point
    pub contact_penalty: bool,
    /// effects of being shot down
    pub on_killed: &'static [Effect],
}

static PLAIN: BehaviorRules = BehaviorRules {
    on_contact: &[],
    contact_penalty: true,
    on_killed: &[],
};

static LUCKY: BehaviorRules = BehaviorRules {
    on_contact: &[Effect::GrantPowerUp],
    contact_penalty: false,
    on_killed: &[],
};

static HIVE: BehaviorRules = BehaviorRules {
    on_contact: &[],
    contact_penalty: true,
    on_killed: &[Effect::ReleaseDrones(5)],
};

static MOON: BehaviorRules = BehaviorRules {
    on_contact: &[],
    contact_penalty: true,
    on_killed: &[Effect::GrantPowerUp],
};

impl Behavior {
    pub fn rules(self) -> &'static BehaviorRules {
        match self {
            Behavior::Lucky => &LUCKY,
            Behavior::Hive => &HIVE,
            Behavior::Moon => &MOON,
            Behavior::Drone => &PLAIN,
        }
    }
}

pub fn rules_for(behavior: Option<Behavior>) -> &'static BehaviorRules {
    behavior.map_or(&PLAIN, Behavior::rules)
}

/// Fixed stat block of a kind
#[derive(Debug, PartialEq)]
pub struct EnemyStats {
    pub size: Size,
    pub lives: i32,
    pub score: i32,
    /// speed is drawn once from `[min_speed, max_speed)`
    pub min_speed: f64,
    pub max_speed: f64,
    pub behavior: Option<Behavior>,
    /// animation rows in the sheet, one picked at random per enemy
    pub sprite_rows: u8,
}

const fn stats(
    width: f64,
    height: f64,
    lives: i32,
    score: i32,
    (min_speed, max_speed): (f64, f64),
    behavior: Option<Behavior>,
    sprite_rows: u8,
) -> EnemyStats {
    EnemyStats {
        size: Size { width, height },
        lives,
        score,
        min_speed,
        max_speed,
        behavior,
        sprite_rows,
    }
}

const CRUISING: (f64, f64) = (0.5, 2.0);
const SLUGGISH: (f64, f64) = (0.2, 1.4);
const HUNTING: (f64, f64) = (1.0, 2.0);

static ANGLER1: EnemyStats = stats(228.0, 169.0, 5, 5, CRUISING, None, 3);
static ANGLER2: EnemyStats = stats(213.0, 165.0, 6, 6, CRUISING, None, 2);
static LUCKY_FISH: EnemyStats = stats(99.0, 95.0, 5, 15, CRUISING, Some(Behavior::Lucky), 2);
static HIVE_WHALE: EnemyStats = stats(400.0, 227.0, 20, 20, SLUGGISH, Some(Behavior::Hive), 1);
static DRONE: EnemyStats = stats(115.0, 95.0, 3, 3, (0.5, 4.7), Some(Behavior::Drone), 2);
static BULB_WHALE: EnemyStats = stats(270.0, 219.0, 20, 20, SLUGGISH, None, 2);
static MOON_FISH: EnemyStats = stats(227.0, 240.0, 10, 10, (2.0, 3.2), Some(Behavior::Moon), 1);
static STALKER: EnemyStats = stats(243.0, 123.0, 5, 5, HUNTING, None, 1);
static RAZORFIN: EnemyStats = stats(187.0, 149.0, 7, 7, HUNTING, None, 1);

impl EnemyKind {
    pub const ALL: [EnemyKind; 9] = [
        EnemyKind::Angler1,
        EnemyKind::Angler2,
        EnemyKind::LuckyFish,
        EnemyKind::HiveWhale,
        EnemyKind::Drone,
        EnemyKind::BulbWhale,
        EnemyKind::MoonFish,
        EnemyKind::Stalker,
        EnemyKind::Razorfin,
    ];

    pub fn stats(self) -> &'static EnemyStats {
        match self {
            EnemyKind::Angler1 => &ANGLER1,
            EnemyKind::Angler2 => &ANGLER2,
            EnemyKind::LuckyFish => &LUCKY_FISH,
            EnemyKind::HiveWhale => &HIVE_WHALE,
            EnemyKind::Drone => &DRONE,
            EnemyKind::BulbWhale => &BULB_WHALE,
            EnemyKind::MoonFish => &MOON_FISH,
            EnemyKind::Stalker => &STALKER,
            EnemyKind::Razorfin => &RAZORFIN,
        }
    }

    pub fn rules(self) -> &'static BehaviorRules {
        rules_for(self.stats().behavior)
    }
}

#[derive(Debug, Clone)]
pub struct Enemy {
    kind: EnemyKind,
    bounding_box: Rect,
    speed: f64,
    lives: i32,
    row: u8,
    animation: FrameTimer,
    marked_for_deletion: bool,
}

impl Enemy {
    pub fn new<R: Rng + ?Sized>(kind: EnemyKind, position: Point, rng: &mut R) -> Self {
        let stats = kind.stats();
        Enemy {
            kind,
            bounding_box: Rect::new(position, stats.size),
            speed: rng.gen_range(stats.min_speed..stats.max_speed),
            lives: stats.lives,
            row: rng.gen_range(0..stats.sprite_rows.max(1)),
            animation: FrameTimer::with_fps(ENEMY_FPS),
            marked_for_deletion: false,
        }
    }

    /// New enemy at the right edge of the viewport, somewhere inside the top
    /// `band` fraction of its height.
    pub fn at_right_edge<R: Rng + ?Sized>(
        kind: EnemyKind,
        viewport: Size,
        band: f64,
        rng: &mut R,
    ) -> Self {
        let span = (viewport.height * band - kind.stats().size.height).max(0.0);
        let y = rng.gen::<f64>() * span;
        Enemy::new(kind, Point { x: viewport.width, y }, rng)
    }

    pub fn with_lives(mut self, lives: i32) -> Self {
        self.lives = lives;
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn update(&mut self, delta_ms: f64, world_speed: f64) {
        let x = self.bounding_box.x() - (self.speed + world_speed) * frame_scale(delta_ms);
        self.bounding_box.set_x(x);
        self.animation.tick_looping(delta_ms, ENEMY_MAX_FRAME);

        if self.bounding_box.right() < 0.0 {
            self.mark_for_deletion();
        }
    }

    /// One projectile hit. Returns true when this hit is the kill; an enemy
    /// already marked for deletion ignores further hits.
    pub fn hit(&mut self) -> bool {
        if self.marked_for_deletion {
            return false;
        }
        self.lives -= 1;
        if self.lives <= 0 {
            self.mark_for_deletion();
            true
        } else {
            false
        }
    }

    pub fn kind(&self) -> EnemyKind {
        self.kind
    }

    pub fn stats(&self) -> &'static EnemyStats {
        self.kind.stats()
    }

    pub fn score(&self) -> i32 {
        self.stats().score
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn bounding_box(&self) -> &Rect {
        &self.bounding_box
    }

    pub fn frame(&self) -> u8 {
        self.animation.frame()
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn is_marked_for_deletion(&self) -> bool {
        self.marked_for_deletion
    }

    pub fn mark_for_deletion(&mut self) {
        self.marked_for_deletion = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::REFERENCE_FRAME_MS;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn speed_is_drawn_inside_kind_range() {
        let mut rng = rng();
        for kind in EnemyKind::ALL {
            for _ in 0..20 {
                let enemy = Enemy::new(kind, Point::default(), &mut rng);
                let stats = kind.stats();
                assert!(enemy.speed() >= stats.min_speed && enemy.speed() < stats.max_speed);
                assert!(enemy.row() < stats.sprite_rows);
            }
        }
    }

    #[test]
    fn spawns_at_right_edge_inside_band() {
        let mut rng = rng();
        let viewport = Size {
            width: 1000.0,
            height: 500.0,
        };
        for _ in 0..50 {
            let enemy = Enemy::at_right_edge(EnemyKind::Angler1, viewport, 0.9, &mut rng);
            assert_eq!(enemy.bounding_box().x(), 1000.0);
            assert!(enemy.bounding_box().y() >= 0.0);
            assert!(enemy.bounding_box().y() <= 450.0 - 169.0);
        }
    }

    #[test]
    fn moves_left_by_speed_plus_world_speed() {
        let mut enemy = Enemy::new(EnemyKind::Stalker, Point { x: 500.0, y: 0.0 }, &mut rng())
            .with_speed(1.5);
        enemy.update(REFERENCE_FRAME_MS, 1.0);
        assert_relative_eq!(enemy.bounding_box().x(), 497.5);
        // half a reference frame moves half as far
        enemy.update(REFERENCE_FRAME_MS / 2.0, 1.0);
        assert_relative_eq!(enemy.bounding_box().x(), 496.25);
    }

    #[test]
    fn marked_once_fully_off_screen() {
        let mut enemy = Enemy::new(EnemyKind::LuckyFish, Point { x: -98.0, y: 0.0 }, &mut rng())
            .with_speed(0.5);
        enemy.update(REFERENCE_FRAME_MS, 0.0);
        assert!(!enemy.is_marked_for_deletion());
        enemy.update(REFERENCE_FRAME_MS * 4.0, 0.0);
        assert!(enemy.is_marked_for_deletion());
    }

    #[test]
    fn kill_is_reported_exactly_once() {
        let mut enemy = Enemy::new(EnemyKind::Drone, Point::default(), &mut rng());
        assert!(!enemy.hit());
        assert!(!enemy.hit());
        assert!(enemy.hit());
        assert_eq!(enemy.lives(), 0);
        assert!(enemy.is_marked_for_deletion());
        assert!(!enemy.hit());
        assert_eq!(enemy.lives(), 0);
    }

    #[test]
    fn special_rules_are_keyed_by_behavior() {
        assert_eq!(EnemyKind::LuckyFish.rules().on_contact, &[Effect::GrantPowerUp]);
        assert!(!EnemyKind::LuckyFish.rules().contact_penalty);
        assert_eq!(EnemyKind::MoonFish.rules().on_killed, &[Effect::GrantPowerUp]);
        assert_eq!(EnemyKind::HiveWhale.rules().on_killed, &[Effect::ReleaseDrones(5)]);
        assert_eq!(EnemyKind::Drone.rules(), EnemyKind::Razorfin.rules());
        assert!(EnemyKind::Angler1.rules().contact_penalty);
    }
}
