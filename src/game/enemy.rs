//! Enemy entity.

use serde::{Serialize, Deserialize};

use crate::core::vec2::{Vec2, circles_overlap};
use crate::game::element::Element;

/// Enemy identifier (monotonic per combat resolver).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

/// A hostile that chases the player and deals contact damage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    /// Identifier
    pub id: EnemyId,
    /// World position
    pub position: Vec2,
    /// Elemental affinity (decides the essence reward)
    pub element: Element,
    /// Current health
    pub health: u32,
    /// Maximum health
    pub max_health: u32,
    /// Units moved per tick while chasing
    pub speed: f32,
    /// Latched on the killing blow
    pub dead: bool,
}

impl Enemy {
    /// Collision radius.
    pub const RADIUS: f32 = 12.0;

    /// Default health for spawns without an explicit value.
    pub const DEFAULT_HEALTH: u32 = 30;

    /// Default chase speed.
    pub const DEFAULT_SPEED: f32 = 1.0;

    /// Enemies stop closing in once this near the target.
    pub const STOP_DISTANCE: f32 = 5.0;

    /// Create a live enemy at full health.
    pub fn new(id: EnemyId, position: Vec2, element: Element, health: u32) -> Self {
        Self {
            id,
            position,
            element,
            health,
            max_health: health,
            speed: Self::DEFAULT_SPEED,
            dead: false,
        }
    }

    /// Step toward the target.
    pub fn pursue(&mut self, target: Vec2) {
        if self.dead {
            return;
        }
        if self.position.distance(target) > Self::STOP_DISTANCE {
            self.position = self.position.move_toward(target, self.speed);
        }
    }

    /// Apply damage. Returns true only on the blow that kills.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if self.dead {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.dead = true;
            return true;
        }
        false
    }

    /// Contact test against a circle of `radius` at `point`.
    pub fn is_overlapping(&self, point: Vec2, radius: f32) -> bool {
        !self.dead && circles_overlap(self.position, Self::RADIUS, point, radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dies_exactly_once() {
        let mut enemy = Enemy::new(EnemyId(0), Vec2::ZERO, Element::Fire, 30);
        assert!(!enemy.take_damage(15));
        assert_eq!(enemy.health, 15);
        assert!(enemy.take_damage(15));
        assert!(enemy.dead);
        assert!(!enemy.take_damage(15));
        assert_eq!(enemy.health, 0);
    }

    #[test]
    fn test_pursue_stops_near_target() {
        let mut enemy = Enemy::new(EnemyId(0), Vec2::new(10.0, 0.0), Element::Air, 30);
        enemy.pursue(Vec2::ZERO);
        assert!((enemy.position.x - 9.0).abs() < 1e-4);

        enemy.position = Vec2::new(4.0, 0.0);
        enemy.pursue(Vec2::ZERO);
        assert_eq!(enemy.position, Vec2::new(4.0, 0.0));
    }

    #[test]
    fn test_dead_enemy_never_overlaps() {
        let mut enemy = Enemy::new(EnemyId(0), Vec2::ZERO, Element::Earth, 1);
        assert!(enemy.is_overlapping(Vec2::ZERO, 10.0));
        enemy.take_damage(1);
        assert!(!enemy.is_overlapping(Vec2::ZERO, 10.0));
    }

    #[test]
    fn test_overlap_includes_touching() {
        let enemy = Enemy::new(EnemyId(0), Vec2::new(22.0, 0.0), Element::Fire, 30);
        assert!(enemy.is_overlapping(Vec2::ZERO, 10.0));
        assert!(!enemy.is_overlapping(Vec2::new(-0.01, 0.0), 10.0));
    }
}
