//! Run Session and Tick
//!
//! The driver that owns every system for one run and advances them in a
//! fixed order each tick. Systems never call each other; the session drains
//! their events after every call, applies the cross-system consequences and
//! forwards each event to its own subscribers in commit order.
//!
//! ## Tick order
//!
//! 1. Totem resolution, then interaction
//! 2. Combat update, then player attack
//! 3. Room clearance check
//! 4. Portal transition

use sha2::{Sha256, Digest};
use serde::{Serialize, Deserialize};
use tracing::info;
#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::config::GameConfig;
use crate::core::clock::{Millis, VirtualClock};
use crate::core::vec2::Vec2;
use crate::game::combat::{CombatResolver, PlayerHealth};
use crate::game::companion::Companion;
use crate::game::enemy::Enemy;
use crate::game::essence::{EssenceCounts, EssenceLedger};
use crate::game::events::{EventBus, EventSink, GameEvent};
use crate::game::input::InputRecording;
use crate::game::input::InputFrame;
use crate::game::room::RoomSequencer;
use crate::game::templates::RoomTemplate;
use crate::game::totem::{Outcome, TotemEngine};

/// Where the companion appears relative to the player start.
const COMPANION_SPAWN_OFFSET: Vec2 = Vec2::new(-20.0, 0.0);

/// Lifecycle of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Player alive, run in progress
    Playing,
    /// Player died; waiting for restart
    Dead,
    /// Last room's portal used; waiting for restart
    Won,
}

impl RunPhase {
    /// Dead or won.
    pub fn is_terminal(self) -> bool {
        self != RunPhase::Playing
    }
}

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events committed this tick, in order
    pub events: Vec<GameEvent>,
    /// A new room was loaded this tick
    pub room_changed: bool,
    /// The run ended (death or victory) this tick
    pub run_ended: bool,
}

/// One player's run: all systems plus the glue between them.
#[derive(Debug)]
pub struct RunSession {
    config: GameConfig,
    totems: TotemEngine,
    combat: CombatResolver,
    essence: EssenceLedger,
    rooms: RoomSequencer,
    phase: RunPhase,
    player: Vec2,
    events: EventBus,
}

impl RunSession {
    /// Build every system and load the first room.
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let rooms = RoomSequencer::with_config(config.room.clone(), seed);
        Self::assemble(config, rooms)
    }

    /// Session over an already-built sequencer.
    pub fn with_sequencer(config: GameConfig, rooms: RoomSequencer) -> Self {
        Self::assemble(config, rooms)
    }

    fn assemble(config: GameConfig, rooms: RoomSequencer) -> Self {
        let mut session = Self {
            totems: TotemEngine::new(config.totem.resolution_delay_ms),
            combat: CombatResolver::new(config.combat.clone()),
            essence: EssenceLedger::new(config.essence.max_essence),
            rooms,
            phase: RunPhase::Playing,
            player: Vec2::ZERO,
            events: EventBus::new(),
            config,
        };
        session.load_current_room();
        // Loading the first room is setup, not gameplay
        session.events.take_events();
        session
    }

    /// Populate the systems from the sequencer's current room.
    pub fn load_current_room(&mut self) {
        let Some(room) = self.rooms.current_room().cloned() else {
            return;
        };

        self.combat.clear_enemies();
        self.totems.clear();

        for spawn in &room.totem_spawns {
            self.totems.add_totem(spawn.position, spawn.element);
        }
        for spawn in &room.enemy_spawns {
            let health = spawn.health.unwrap_or(Enemy::DEFAULT_HEALTH);
            self.combat.add_enemy(spawn.position, spawn.element, health);
        }

        self.player = room.player_start;
        if self.config.combat.companion {
            self.combat.set_companion(Companion::new(room.player_start + COMPANION_SPAWN_OFFSET));
        }

        if self.rooms.is_rest_room() {
            self.combat.heal_player(self.config.room.rest_heal);
            self.rooms.mark_room_cleared();
        }

        info!(
            "Loaded {}: {} totems, {} enemies",
            self.rooms.room_type_description(),
            self.totems.remaining_count(),
            self.combat.enemy_count()
        );
        self.flush();
    }

    /// Advance the run by one tick at time `now`.
    pub fn tick(&mut self, input: &InputFrame, now: Millis) -> TickResult {
        let mut result = TickResult::default();

        if input.restart_pressed() {
            self.restart_run();
            result.room_changed = true;
            result.events = self.events.take_events();
            return result;
        }

        if self.phase.is_terminal() {
            return result;
        }

        #[cfg(feature = "debug-tracing")]
        trace!(now, x = input.position.x, y = input.position.y, flags = input.flags, "tick");

        self.player = input.position;

        // 1. Totems
        self.update_totems(now);
        if input.interact_pressed() {
            if let Some(id) = self.totems.find_nearest(self.player, self.config.totem.interact_distance) {
                self.totems.activate_totem(id, now);
            }
        }
        self.flush();

        // 2. Combat
        self.combat.update(self.player, now);
        self.flush();
        if self.phase == RunPhase::Playing && input.attack_pressed() {
            self.combat.player_attack(self.player, now);
            self.flush();
        }

        // 3. Clearance
        if self.phase == RunPhase::Playing
            && !self.rooms.is_cleared()
            && self.totems.remaining_count() == 0
            && self.combat.enemy_count() == 0
        {
            self.rooms.mark_room_cleared();
            self.flush();
        }

        // 4. Transition
        if self.phase == RunPhase::Playing
            && input.transition_pressed()
            && self.rooms.can_transition(self.player)
        {
            if self.rooms.transition_to_next_room() {
                self.flush();
                self.load_current_room();
                result.room_changed = true;
            } else {
                self.flush();
            }
        }

        result.run_ended = self.phase.is_terminal();
        result.events = self.events.take_events();
        result
    }

    /// Start a fresh run: new rooms, empty ledger, full health.
    pub fn restart_run(&mut self) {
        self.rooms.regenerate_run();
        self.essence.reset();
        self.combat.reset_player();
        self.totems.reset();
        self.phase = RunPhase::Playing;
        info!("Run restarted ({} rooms)", self.rooms.total_rooms());
        self.flush();
        self.load_current_room();
    }

    /// Subscribe to every event from every system.
    pub fn subscribe(&mut self, sink: impl EventSink + 'static) {
        self.events.subscribe(sink);
    }

    fn update_totems(&mut self, now: Millis) {
        let Some(resolution) = self.totems.update(now) else {
            return;
        };
        if resolution.outcome == Outcome::Mismatched {
            let first = &resolution.first;
            self.combat.add_enemy(first.position, first.element, Enemy::DEFAULT_HEALTH);
        }
    }

    /// Drain every system and commit their events until quiescent.
    fn flush(&mut self) {
        loop {
            let mut batch = self.totems.take_events();
            batch.extend(self.combat.take_events());
            batch.extend(self.rooms.take_events());
            batch.extend(self.essence.take_events());
            if batch.is_empty() {
                break;
            }
            for event in batch {
                #[cfg(feature = "debug-tracing")]
                trace!(event = event.kind(), "commit");
                self.route(&event);
                self.events.emit(event);
            }
        }
    }

    fn route(&mut self, event: &GameEvent) {
        match event {
            GameEvent::TotemMatched { element } => {
                self.essence.add_essence(*element, 1);
            }
            GameEvent::EnemyDied { element, .. } => {
                self.essence.add_essence(*element, 1);
            }
            GameEvent::PlayerDied => {
                if self.phase == RunPhase::Playing {
                    info!("Run lost in room {}", self.rooms.current_index() + 1);
                    self.phase = RunPhase::Dead;
                }
            }
            GameEvent::RunComplete => {
                if self.phase == RunPhase::Playing {
                    info!("Run won with {} essence", self.essence.total());
                    self.phase = RunPhase::Won;
                }
            }
            _ => {}
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Current phase.
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Last known player position.
    pub fn player_position(&self) -> Vec2 {
        self.player
    }

    /// Player health.
    pub fn player_health(&self) -> PlayerHealth {
        self.combat.player_health()
    }

    /// Essence balances.
    pub fn essence(&self) -> EssenceCounts {
        self.essence.snapshot()
    }

    /// Totem engine (read-only).
    pub fn totems(&self) -> &TotemEngine {
        &self.totems
    }

    /// Combat resolver (read-only).
    pub fn combat(&self) -> &CombatResolver {
        &self.combat
    }

    /// Room sequencer (read-only).
    pub fn rooms(&self) -> &RoomSequencer {
        &self.rooms
    }

    /// Active configuration.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// SHA-256 over the gameplay-relevant state.
    ///
    /// Covers everything a future tick reads: phase, positions, health, essence,
    /// live totems and enemies, the pending pair resolution, player and
    /// companion cooldowns, the room list and the sequencer's generator state.
    /// Two sessions with equal fingerprints evolve identically under the same
    /// input.
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update([self.phase as u8]);
        hash_vec2(&mut hasher, self.player);

        let health = self.combat.player_health();
        hasher.update(health.current.to_le_bytes());
        hasher.update(health.max.to_le_bytes());
        hasher.update([self.combat.is_player_dead() as u8]);
        hash_millis(&mut hasher, self.combat.last_player_attack());
        hash_millis(&mut hasher, self.combat.last_contact_damage());

        let essence = self.essence.snapshot();
        for count in [essence.fire, essence.water, essence.earth, essence.air] {
            hasher.update(count.to_le_bytes());
        }

        for totem in self.totems.totems() {
            hasher.update(totem.id.0.to_le_bytes());
            hasher.update([totem.element as u8, totem.activated as u8]);
            hash_vec2(&mut hasher, totem.position);
        }
        match self.totems.pending_resolution() {
            Some(pending) => {
                hasher.update([1u8]);
                hasher.update(pending.first.0.to_le_bytes());
                hasher.update(pending.second.0.to_le_bytes());
                hasher.update(pending.resolves_at.to_le_bytes());
            }
            None => hasher.update([0u8]),
        }

        for enemy in self.combat.enemies() {
            hasher.update(enemy.id.0.to_le_bytes());
            hasher.update([enemy.element as u8, enemy.dead as u8]);
            hasher.update(enemy.health.to_le_bytes());
            hash_vec2(&mut hasher, enemy.position);
        }
        match self.combat.companion() {
            Some(companion) => {
                hasher.update([1u8]);
                hash_vec2(&mut hasher, companion.position);
                hash_millis(&mut hasher, companion.last_attack());
            }
            None => hasher.update([0u8]),
        }

        let rooms = &self.rooms;
        hasher.update((rooms.current_index() as u64).to_le_bytes());
        hasher.update([rooms.is_cleared() as u8]);
        match rooms.exit_portal() {
            Some(portal) => {
                hasher.update([1u8]);
                hash_vec2(&mut hasher, portal);
            }
            None => hasher.update([0u8]),
        }
        let run = rooms.run_config();
        for index in [run.total_rooms, run.rest_room_index, run.boss_room_index] {
            hasher.update((index as u64).to_le_bytes());
        }
        hasher.update((rooms.rooms().len() as u64).to_le_bytes());
        for room in rooms.rooms() {
            hash_room(&mut hasher, room);
        }
        for word in rooms.rng_state() {
            hasher.update(word.to_le_bytes());
        }

        hasher.finalize().into()
    }
}

fn hash_vec2(hasher: &mut Sha256, v: Vec2) {
    hasher.update(v.x.to_bits().to_le_bytes());
    hasher.update(v.y.to_bits().to_le_bytes());
}

fn hash_millis(hasher: &mut Sha256, at: Option<Millis>) {
    match at {
        Some(at) => {
            hasher.update([1u8]);
            hasher.update(at.to_le_bytes());
        }
        None => hasher.update([0u8]),
    }
}

fn hash_room(hasher: &mut Sha256, room: &RoomTemplate) {
    hasher.update([room.room_type as u8, room.theme.map_or(u8::MAX, |t| t as u8)]);
    for row in room.tiles.rows() {
        hasher.update((row.len() as u64).to_le_bytes());
        hasher.update(row.iter().map(|tile| *tile as u8).collect::<Vec<_>>());
    }
    hasher.update((room.totem_spawns.len() as u64).to_le_bytes());
    for spawn in &room.totem_spawns {
        hasher.update([spawn.element as u8]);
        hash_vec2(hasher, spawn.position);
    }
    hasher.update((room.enemy_spawns.len() as u64).to_le_bytes());
    for spawn in &room.enemy_spawns {
        hasher.update([spawn.element as u8]);
        hasher.update(spawn.health.unwrap_or(0).to_le_bytes());
        hash_vec2(hasher, spawn.position);
    }
    hash_vec2(hasher, room.exit_portal);
    hash_vec2(hasher, room.player_start);
}

/// Replay a recorded run from its seed.
///
/// Each recorded tick is fed at `tick * FRAME_MS`. Returns the final session
/// and every event committed along the way.
pub fn replay_run(config: GameConfig, recording: &InputRecording) -> (RunSession, Vec<GameEvent>) {
    let mut session = RunSession::new(config, recording.seed);
    let mut all_events = Vec::new();

    for (tick, frame) in recording.replay_iter() {
        let now = Millis::from(tick) * VirtualClock::FRAME_MS;
        let result = session.tick(&frame, now);
        all_events.extend(result.events);
    }

    (session, all_events)
}

// =============================================================================
// TESTS
// =============================================================================
