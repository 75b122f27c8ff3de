//! Companion entity.
//!
//! Trails the player and strikes nearby enemies on its own cooldown.

use serde::{Serialize, Deserialize};

use crate::core::clock::{Millis, cooldown_ready};
use crate::core::vec2::Vec2;

/// Friendly follower with its own attack cadence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Companion {
    /// World position
    pub position: Vec2,
    /// Damage per strike
    pub damage: u32,
    /// Milliseconds between strikes
    pub attack_cooldown: Millis,
    /// Strike reach
    pub attack_range: f32,
    /// Preferred gap to the player
    pub follow_distance: f32,
    /// Units moved per tick while catching up
    pub speed: f32,
    last_attack: Option<Millis>,
}

impl Companion {
    /// Default damage per strike.
    pub const DEFAULT_DAMAGE: u32 = 10;
    /// Default strike cooldown.
    pub const DEFAULT_COOLDOWN_MS: Millis = 1000;
    /// Default strike reach.
    pub const DEFAULT_RANGE: f32 = 25.0;

    /// Companion with default stats at `position`.
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            damage: Self::DEFAULT_DAMAGE,
            attack_cooldown: Self::DEFAULT_COOLDOWN_MS,
            attack_range: Self::DEFAULT_RANGE,
            follow_distance: 30.0,
            speed: 1.5,
            last_attack: None,
        }
    }

    /// Close the gap to the player without entering the follow radius.
    pub fn follow(&mut self, player: Vec2) {
        let distance = self.position.distance(player);
        if distance > self.follow_distance {
            let step = self.speed.min(distance - self.follow_distance);
            self.position = self.position.move_toward(player, step);
        }
    }

    /// Off cooldown at `now`.
    pub fn can_attack(&self, now: Millis) -> bool {
        cooldown_ready(self.last_attack, now, self.attack_cooldown)
    }

    /// Time of the last strike, if any.
    pub fn last_attack(&self) -> Option<Millis> {
        self.last_attack
    }

    /// Record a strike at `now`.
    pub fn record_attack(&mut self, now: Millis) {
        self.last_attack = Some(now);
    }

    /// Whether `target` is within strike reach (inclusive).
    pub fn is_in_range(&self, target: Vec2) -> bool {
        self.position.distance(target) <= self.attack_range
    }

    /// Forget the last strike so the next one is immediately available.
    pub fn reset_cooldown(&mut self) {
        self.last_attack = None;
    }
}
