//! Combat Resolver
//!
//! Owns the live enemies, the optional companion and the player's vitals.
//! Resolves player attacks, companion strikes and enemy contact damage, each
//! on its own cooldown measured against the driver's clock.
//!
//! Nothing here is an error: "on cooldown" and "no target in range" are
//! ordinary outcomes reported as `false`.

use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::core::clock::{Millis, cooldown_ready};
use crate::core::vec2::Vec2;
use crate::game::companion::Companion;
use crate::game::element::Element;
use crate::game::enemy::{Enemy, EnemyId};
use crate::game::events::{EventBus, EventSink, GameEvent};

/// Tunable combat numbers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Player maximum (and starting) health
    pub player_max_health: u32,
    /// Damage per landed player attack
    pub player_damage: u32,
    /// Player attack reach (exclusive)
    pub player_attack_range: f32,
    /// Milliseconds between landed player attacks
    pub player_attack_cooldown_ms: Millis,
    /// Damage per enemy contact proc
    pub contact_damage: u32,
    /// Milliseconds between contact procs
    pub contact_cooldown_ms: Millis,
    /// Player-side radius of the contact circle
    pub contact_radius: f32,
    /// Attach a companion when a room loads
    pub companion: bool,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            player_max_health: 100,
            player_damage: 15,
            player_attack_range: 20.0,
            player_attack_cooldown_ms: 500,
            contact_damage: 10,
            contact_cooldown_ms: 1000,
            contact_radius: 10.0,
            companion: true,
        }
    }
}

/// Read-only player health snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerHealth {
    /// Remaining health
    pub current: u32,
    /// Maximum health
    pub max: u32,
}

/// Real-time combat between player, companion and enemies.
#[derive(Debug)]
pub struct CombatResolver {
    config: CombatConfig,
    enemies: Vec<Enemy>,
    companion: Option<Companion>,
    health: u32,
    player_dead: bool,
    last_player_attack: Option<Millis>,
    last_contact_damage: Option<Millis>,
    next_enemy_id: u32,
    events: EventBus,
}

impl Default for CombatResolver {
    fn default() -> Self {
        Self::new(CombatConfig::default())
    }
}

impl CombatResolver {
    /// Create a resolver with a full-health player and no enemies.
    pub fn new(config: CombatConfig) -> Self {
        Self {
            health: config.player_max_health,
            config,
            enemies: Vec::new(),
            companion: None,
            player_dead: false,
            last_player_attack: None,
            last_contact_damage: None,
            next_enemy_id: 0,
            events: EventBus::new(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Attach (or replace) the companion.
    pub fn set_companion(&mut self, companion: Companion) {
        self.companion = Some(companion);
    }

    /// Current companion, if any.
    pub fn companion(&self) -> Option<&Companion> {
        self.companion.as_ref()
    }

    /// Register an enemy.
    pub fn add_enemy(&mut self, position: Vec2, element: Element, health: u32) -> EnemyId {
        let id = EnemyId(self.next_enemy_id);
        self.next_enemy_id += 1;
        self.enemies.push(Enemy::new(id, position, element, health));
        id
    }

    /// Look up a live enemy.
    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Live enemies in spawn order.
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Advance one tick: pursuit, companion, contact damage.
    pub fn update(&mut self, player: Vec2, now: Millis) {
        for enemy in &mut self.enemies {
            enemy.pursue(player);
        }

        if let Some(companion) = self.companion.as_mut() {
            companion.follow(player);
        }
        self.companion_combat(now);

        self.enemy_contact_damage(player, now);
    }

    /// Player swings at the nearest enemy.
    ///
    /// Returns true if a hit landed. A whiff does not consume the cooldown.
    pub fn player_attack(&mut self, player: Vec2, now: Millis) -> bool {
        if !cooldown_ready(self.last_player_attack, now, self.config.player_attack_cooldown_ms) {
            return false;
        }

        let mut target = None;
        let mut min_distance = self.config.player_attack_range;
        for enemy in &self.enemies {
            if enemy.dead {
                continue;
            }
            let distance = enemy.position.distance(player);
            if distance < min_distance {
                min_distance = distance;
                target = Some(enemy.id);
            }
        }

        match target {
            Some(id) => {
                self.last_player_attack = Some(now);
                self.damage_enemy(id, self.config.player_damage);
                true
            }
            None => false,
        }
    }

    /// Apply damage to one enemy. Returns true if this killed it.
    pub fn damage_enemy(&mut self, id: EnemyId, amount: u32) -> bool {
        let Some(index) = self.enemies.iter().position(|e| e.id == id) else {
            return false;
        };
        if !self.enemies[index].take_damage(amount) {
            return false;
        }

        let enemy = self.enemies.remove(index);
        debug!(enemy = enemy.id.0, element = %enemy.element, "enemy defeated");
        self.events.emit(GameEvent::EnemyDied {
            enemy: enemy.id,
            element: enemy.element,
        });
        true
    }

    fn companion_combat(&mut self, now: Millis) {
        let Some(companion) = self.companion.as_mut() else {
            return;
        };
        if !companion.can_attack(now) {
            return;
        }

        let target = self
            .enemies
            .iter()
            .find(|e| !e.dead && companion.is_in_range(e.position))
            .map(|e| e.id);

        if let Some(id) = target {
            companion.record_attack(now);
            let damage = companion.damage;
            self.damage_enemy(id, damage);
        }
    }

    fn enemy_contact_damage(&mut self, player: Vec2, now: Millis) {
        if !cooldown_ready(self.last_contact_damage, now, self.config.contact_cooldown_ms) {
            return;
        }

        let touching = self
            .enemies
            .iter()
            .any(|e| e.is_overlapping(player, self.config.contact_radius));

        if touching {
            self.last_contact_damage = Some(now);
            self.player_take_damage(self.config.contact_damage);
        }
    }

    fn player_take_damage(&mut self, amount: u32) {
        if self.player_dead {
            return;
        }

        self.health = self.health.saturating_sub(amount);
        self.events.emit(GameEvent::PlayerDamaged {
            current: self.health,
            max: self.config.player_max_health,
        });

        if self.health == 0 {
            self.player_dead = true;
            info!("player defeated");
            self.events.emit(GameEvent::PlayerDied);
        }
    }

    /// Restore up to `amount` health. Returns the amount actually restored.
    pub fn heal_player(&mut self, amount: u32) -> u32 {
        if self.player_dead {
            return 0;
        }
        let healed = amount.min(self.config.player_max_health - self.health);
        if healed > 0 {
            self.health += healed;
            self.events.emit(GameEvent::PlayerDamaged {
                current: self.health,
                max: self.config.player_max_health,
            });
        }
        healed
    }

    /// Time of the last landed player hit, if any.
    pub fn last_player_attack(&self) -> Option<Millis> {
        self.last_player_attack
    }

    /// Time of the last contact damage, if any.
    pub fn last_contact_damage(&self) -> Option<Millis> {
        self.last_contact_damage
    }

    /// Player health snapshot.
    pub fn player_health(&self) -> PlayerHealth {
        PlayerHealth {
            current: self.health,
            max: self.config.player_max_health,
        }
    }

    /// Whether the player has died this life.
    pub fn is_player_dead(&self) -> bool {
        self.player_dead
    }

    /// Count of living enemies.
    pub fn enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| !e.dead).count()
    }

    /// Drop every enemy (room transition).
    pub fn clear_enemies(&mut self) {
        self.enemies.clear();
    }

    /// Full health, both cooldowns cleared, new life.
    pub fn reset_player(&mut self) {
        self.health = self.config.player_max_health;
        self.player_dead = false;
        self.last_player_attack = None;
        self.last_contact_damage = None;
        if let Some(companion) = self.companion.as_mut() {
            companion.reset_cooldown();
        }
        self.events.emit(GameEvent::PlayerDamaged {
            current: self.health,
            max: self.config.player_max_health,
        });
    }

    /// Subscribe to combat events.
    pub fn subscribe(&mut self, sink: impl EventSink + 'static) {
        self.events.subscribe(sink);
    }

    /// Take buffered events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.events.take_events()
    }

    /// Stop (or resume) buffering events for `take_events`. Subscribers
    /// still receive every event.
    pub fn set_event_buffering(&mut self, enabled: bool) {
        self.events.set_buffering(enabled);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn death_count(events: &[GameEvent]) -> usize {
        events.iter().filter(|e| matches!(e, GameEvent::EnemyDied { .. })).count()
    }

    #[test]
    fn test_player_attack_hits_nearest() {
        let mut combat = CombatResolver::default();
        let far = combat.add_enemy(Vec2::new(15.0, 0.0), Element::Fire, 30);
        let near = combat.add_enemy(Vec2::new(5.0, 0.0), Element::Water, 30);

        assert!(combat.player_attack(Vec2::ZERO, 0));
        assert_eq!(combat.enemy(near).unwrap().health, 15);
        assert_eq!(combat.enemy(far).unwrap().health, 30);
    }

    #[test]
    fn test_player_attack_cooldown() {
        let mut combat = CombatResolver::default();
        let id = combat.add_enemy(Vec2::new(5.0, 0.0), Element::Fire, 100);

        assert!(combat.player_attack(Vec2::ZERO, 1000));
        assert!(!combat.player_attack(Vec2::ZERO, 1499));
        assert!(combat.player_attack(Vec2::ZERO, 1500));
        assert_eq!(combat.enemy(id).unwrap().health, 70);
    }

    #[test]
    fn test_whiff_does_not_consume_cooldown() {
        let mut combat = CombatResolver::default();
        // Out of range
        let id = combat.add_enemy(Vec2::new(50.0, 0.0), Element::Air, 30);

        assert!(!combat.player_attack(Vec2::ZERO, 0));
        // Immediately retry from closer, no penalty
        assert!(combat.player_attack(Vec2::new(45.0, 0.0), 16));
        assert_eq!(combat.enemy(id).unwrap().health, 15);
    }

    #[test]
    fn test_attack_range_is_exclusive() {
        let mut combat = CombatResolver::default();
        combat.add_enemy(Vec2::new(20.0, 0.0), Element::Air, 30);
        assert!(!combat.player_attack(Vec2::ZERO, 0));
    }

    #[test]
    fn test_contact_at_touching_distance() {
        // Enemies step 1 unit closer before contact is checked
        let mut touching = CombatResolver::default();
        touching.add_enemy(Vec2::new(23.0, 0.0), Element::Fire, 30);
        touching.update(Vec2::ZERO, 0);
        assert_eq!(touching.enemies()[0].position, Vec2::new(22.0, 0.0));
        assert_eq!(touching.player_health().current, 90);

        let mut apart = CombatResolver::default();
        apart.add_enemy(Vec2::new(23.5, 0.0), Element::Fire, 30);
        apart.update(Vec2::ZERO, 0);
        assert_eq!(apart.player_health().current, 100);
        assert!(apart.last_contact_damage().is_none());
    }

    #[test]
    fn test_companion_reach_is_inclusive() {
        let mut combat = CombatResolver::default();
        combat.set_companion(Companion::new(Vec2::ZERO));
        let near = combat.add_enemy(Vec2::new(26.0, 0.0), Element::Water, 30);
        combat.update(Vec2::ZERO, 0);
        assert_eq!(combat.enemy(near).unwrap().health, 20);
        assert_eq!(combat.companion().unwrap().last_attack(), Some(0));

        let mut combat = CombatResolver::default();
        combat.set_companion(Companion::new(Vec2::ZERO));
        let far = combat.add_enemy(Vec2::new(26.5, 0.0), Element::Water, 30);
        combat.update(Vec2::ZERO, 0);
        assert_eq!(combat.enemy(far).unwrap().health, 30);
        assert!(combat.companion().unwrap().last_attack().is_none());
    }

    #[test]
    fn test_enemy_death_fires_once_and_removes() {
        let mut combat = CombatResolver::default();
        let id = combat.add_enemy(Vec2::new(5.0, 0.0), Element::Earth, 30);

        assert!(!combat.damage_enemy(id, 15));
        assert!(combat.damage_enemy(id, 15));
        assert!(!combat.damage_enemy(id, 15));

        let events = combat.take_events();
        assert_eq!(death_count(&events), 1);
        assert_eq!(
            events[0],
            GameEvent::EnemyDied { enemy: id, element: Element::Earth }
        );
        assert_eq!(combat.enemy_count(), 0);
        assert!(combat.enemy(id).is_none());
    }

    #[test]
    fn test_contact_damage_once_per_window() {
        let mut combat = CombatResolver::default();
        combat.add_enemy(Vec2::new(3.0, 0.0), Element::Fire, 30);
        combat.add_enemy(Vec2::new(-3.0, 0.0), Element::Water, 30);

        // Many overlapping ticks inside one window
        for t in (0..1000).step_by(16) {
            combat.update(Vec2::ZERO, t);
        }
        assert_eq!(combat.player_health().current, 90);

        combat.update(Vec2::ZERO, 1000);
        assert_eq!(combat.player_health().current, 80);
    }

    #[test]
    fn test_player_death_fires_once() {
        let config = CombatConfig {
            player_max_health: 20,
            ..CombatConfig::default()
        };
        let mut combat = CombatResolver::new(config);
        combat.add_enemy(Vec2::ZERO, Element::Fire, 30);

        for i in 0..5 {
            combat.update(Vec2::ZERO, i * 1000);
        }

        let events = combat.take_events();
        let deaths = events.iter().filter(|e| matches!(e, GameEvent::PlayerDied)).count();
        assert_eq!(deaths, 1);
        assert_eq!(combat.player_health().current, 0);
        assert!(combat.is_player_dead());
    }

    #[test]
    fn test_reset_player_starts_new_life() {
        let config = CombatConfig {
            player_max_health: 10,
            ..CombatConfig::default()
        };
        let mut combat = CombatResolver::new(config);
        combat.add_enemy(Vec2::ZERO, Element::Fire, 30);
        combat.update(Vec2::ZERO, 0);
        assert!(combat.is_player_dead());

        combat.reset_player();
        assert_eq!(combat.player_health(), PlayerHealth { current: 10, max: 10 });
        assert!(!combat.is_player_dead());

        // Cooldown cleared: damage can land immediately
        combat.update(Vec2::ZERO, 1);
        assert!(combat.is_player_dead());

        let deaths = combat
            .take_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::PlayerDied))
            .count();
        assert_eq!(deaths, 2);
    }

    #[test]
    fn test_companion_strikes_one_enemy() {
        let mut combat = CombatResolver::default();
        combat.set_companion(Companion::new(Vec2::new(30.0, 0.0)));
        let a = combat.add_enemy(Vec2::new(40.0, 0.0), Element::Fire, 30);
        let b = combat.add_enemy(Vec2::new(45.0, 0.0), Element::Fire, 30);

        // Player far away so enemies move away from the companion slowly
        combat.update(Vec2::new(200.0, 0.0), 0);
        let hurt = [a, b]
            .iter()
            .filter(|id| combat.enemy(**id).unwrap().health < 30)
            .count();
        assert_eq!(hurt, 1);

        // On cooldown next tick
        combat.update(Vec2::new(200.0, 0.0), 16);
        assert_eq!(combat.enemy(a).unwrap().health, 20);
        assert_eq!(combat.enemy(b).unwrap().health, 30);
    }

    #[test]
    fn test_heal_capped() {
        let mut combat = CombatResolver::default();
        combat.add_enemy(Vec2::ZERO, Element::Fire, 30);
        combat.update(Vec2::ZERO, 0);
        combat.clear_enemies();

        assert_eq!(combat.heal_player(30), 10);
        assert_eq!(combat.player_health().current, 100);
        assert_eq!(combat.heal_player(5), 0);
    }
}
