use crate::world::enemy::EnemyKind;
use crate::world::Outcome;

/// Something that happened during an update or a fire action. The
/// simulation only records these; audio and visuals react to them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GameEvent {
    ShotFired { projectiles: u8 },
    EnemySpawned { kind: EnemyKind },
    EnemyHit { kind: EnemyKind, lives_left: i32 },
    EnemyKilled { kind: EnemyKind, score: i32 },
    PlayerHit { kind: EnemyKind },
    PowerUpEntered,
    PowerUpExpired,
    DronesReleased { count: u8 },
    GameOver { outcome: Outcome },
}

/// Keyed sound effects the shell knows how to play
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Shot,
    Hit,
    Explosion,
    PowerUp,
    PowerDown,
    Shield,
}

impl GameEvent {
    pub fn sound_cues(&self) -> &'static [SoundCue] {
        match self {
            GameEvent::ShotFired { .. } => &[SoundCue::Shot],
            GameEvent::PlayerHit { .. } => &[SoundCue::Hit, SoundCue::Shield],
            GameEvent::EnemyKilled { .. } => &[SoundCue::Explosion],
            GameEvent::PowerUpEntered => &[SoundCue::PowerUp],
            GameEvent::PowerUpExpired => &[SoundCue::PowerDown],
            GameEvent::EnemySpawned { .. }
            | GameEvent::EnemyHit { .. }
            | GameEvent::DronesReleased { .. }
            | GameEvent::GameOver { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_contact_plays_hit_and_shield() {
        let event = GameEvent::PlayerHit {
            kind: EnemyKind::Angler1,
        };
        assert_eq!(event.sound_cues(), &[SoundCue::Hit, SoundCue::Shield]);
    }

    #[test]
    fn bookkeeping_events_are_silent() {
        assert!(GameEvent::DronesReleased { count: 5 }.sound_cues().is_empty());
        assert!(GameEvent::EnemySpawned {
            kind: EnemyKind::Drone
        }
        .sound_cues()
        .is_empty());
    }
}
