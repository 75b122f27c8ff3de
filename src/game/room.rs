//! Room/Run Sequencer
//!
//! Generates the room list for a run from a seeded RNG and walks the player
//! through it: clear a room, the exit portal appears, step into it, advance.
//! Reaching the portal of the last room completes the run.
//!
//! ## Run layout
//!
//! ```text
//!   index:  0       1       2      ...    total-1
//!           normal  normal  rest   normal boss
//!                           ▲                ▲
//!                   rest_room_index   boss_room_index
//! ```

use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::core::rng::DeterministicRng;
use crate::core::vec2::Vec2;
use crate::game::events::{EventBus, EventSink, GameEvent};
use crate::game::templates::{
    self, RoomTemplate, RoomType, boss_room, ensure_totem_pair, random_normal_room, rest_room,
};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Run generation and room traversal settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Fewest rooms in a run (boss included)
    pub min_rooms: usize,
    /// Most rooms in a run (boss included)
    pub max_rooms: usize,
    /// Earliest rest room index
    pub min_rest_index: usize,
    /// Latest rest room index
    pub max_rest_index: usize,
    /// Inclusive distance at which the exit portal can be used
    pub portal_reach: f32,
    /// Health restored on entering a rest room
    pub rest_heal: u32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_rooms: 6,
            max_rooms: 8,
            min_rest_index: 2,
            max_rest_index: 3,
            portal_reach: 30.0,
            rest_heal: 30,
        }
    }
}

/// Shape of one generated run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of rooms, boss included
    pub total_rooms: usize,
    /// Index of the rest room
    pub rest_room_index: usize,
    /// Index of the boss room (always the last)
    pub boss_room_index: usize,
}

impl RunConfig {
    /// Run shape with the boss in the last slot.
    pub fn new(total_rooms: usize, rest_room_index: usize) -> Self {
        Self {
            total_rooms,
            rest_room_index,
            boss_room_index: total_rooms.saturating_sub(1),
        }
    }

    /// Roll a run shape within the configured bounds.
    pub fn roll(config: &RoomConfig, rng: &mut DeterministicRng) -> Self {
        let total = rng.next_int_range(config.min_rooms as u32, config.max_rooms as u32) as usize;
        let rest = rng.next_int_range(config.min_rest_index as u32, config.max_rest_index as u32) as usize;
        Self::new(total, rest)
    }
}

/// Build the room list for a run shape.
pub fn build_rooms(run: &RunConfig, rng: &mut DeterministicRng) -> Vec<RoomTemplate> {
    (0..run.total_rooms)
        .map(|index| {
            if index == run.rest_room_index {
                rest_room()
            } else if index == run.boss_room_index {
                boss_room(templates::random_theme(rng))
            } else {
                ensure_totem_pair(random_normal_room(rng))
            }
        })
        .collect()
}

// =============================================================================
// SEQUENCER
// =============================================================================

/// Linear walk through the rooms of one run.
#[derive(Debug)]
pub struct RoomSequencer {
    config: RoomConfig,
    rng: DeterministicRng,
    run: RunConfig,
    rooms: Vec<RoomTemplate>,
    current: usize,
    cleared: bool,
    exit_portal: Option<Vec2>,
    events: EventBus,
}

impl RoomSequencer {
    /// Fresh run with default settings.
    pub fn new(seed: u64) -> Self {
        Self::with_config(RoomConfig::default(), seed)
    }

    /// Fresh run with custom generation bounds.
    pub fn with_config(config: RoomConfig, seed: u64) -> Self {
        let mut rng = DeterministicRng::new(seed);
        let run = RunConfig::roll(&config, &mut rng);
        let rooms = build_rooms(&run, &mut rng);
        Self::assemble(config, rng, run, rooms)
    }

    /// Run with a fixed shape. Layouts and themes still come from `seed`.
    pub fn with_run_config(run: RunConfig, seed: u64) -> Self {
        let mut rng = DeterministicRng::new(seed);
        let rooms = build_rooms(&run, &mut rng);
        Self::assemble(RoomConfig::default(), rng, run, rooms)
    }

    /// Run over a hand-built room list, used as-is.
    ///
    /// The first rest room (if any) is the rest slot and the last room is the
    /// boss slot. `regenerate_run` rolls a normal run from `seed`.
    pub fn from_templates(rooms: Vec<RoomTemplate>, seed: u64) -> Self {
        let total = rooms.len();
        let rest = rooms
            .iter()
            .position(|r| r.room_type == RoomType::Rest)
            .unwrap_or(total);
        let run = RunConfig::new(total, rest);
        Self::assemble(RoomConfig::default(), DeterministicRng::new(seed), run, rooms)
    }

    fn assemble(
        config: RoomConfig,
        rng: DeterministicRng,
        run: RunConfig,
        rooms: Vec<RoomTemplate>,
    ) -> Self {
        info!(
            "Generated run: {} rooms, rest at {}, boss at {}",
            run.total_rooms, run.rest_room_index, run.boss_room_index
        );
        Self {
            config,
            rng,
            run,
            rooms,
            current: 0,
            cleared: false,
            exit_portal: None,
            events: EventBus::new(),
        }
    }

    /// Mark the current room cleared and open its exit portal.
    ///
    /// Calling this on an already-cleared room does nothing.
    pub fn mark_room_cleared(&mut self) {
        if self.cleared {
            return;
        }
        let Some(room) = self.rooms.get(self.current) else {
            return;
        };

        self.cleared = true;
        self.exit_portal = Some(room.exit_portal);
        debug!(room = self.current, portal = %room.exit_portal, "room cleared");
        self.events.emit(GameEvent::RoomCleared);
    }

    /// Whether the player stands close enough to an open portal.
    pub fn can_transition(&self, player: Vec2) -> bool {
        match self.exit_portal {
            Some(portal) if self.cleared => portal.distance(player) <= self.config.portal_reach,
            _ => false,
        }
    }

    /// Advance to the next room.
    ///
    /// Returns false when the room is not cleared, or when this is the last
    /// room (the run completes instead and `RunComplete` is emitted).
    pub fn transition_to_next_room(&mut self) -> bool {
        if !self.cleared {
            return false;
        }

        if self.current + 1 >= self.rooms.len() {
            info!("Run complete after {} rooms", self.rooms.len());
            self.events.emit(GameEvent::RunComplete);
            return false;
        }

        self.current += 1;
        self.cleared = false;
        self.exit_portal = None;
        info!("Entering room {} ({})", self.current + 1, self.room_type_description());
        self.events.emit(GameEvent::RoomTransition { index: self.current });

        if self.is_rest_room() {
            self.mark_room_cleared();
        }
        true
    }

    /// Roll a new run and return to its first room.
    pub fn regenerate_run(&mut self) {
        self.run = RunConfig::roll(&self.config, &mut self.rng);
        self.rooms = build_rooms(&self.run, &mut self.rng);
        self.current = 0;
        self.cleared = false;
        self.exit_portal = None;
        info!(
            "Regenerated run: {} rooms, rest at {}, boss at {}",
            self.run.total_rooms, self.run.rest_room_index, self.run.boss_room_index
        );
    }

    /// Close the portal and un-clear the current room.
    pub fn reset_room_state(&mut self) {
        self.cleared = false;
        self.exit_portal = None;
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Template of the current room.
    pub fn current_room(&self) -> Option<&RoomTemplate> {
        self.rooms.get(self.current)
    }

    /// Zero-based index of the current room.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Rooms in this run.
    pub fn total_rooms(&self) -> usize {
        self.rooms.len()
    }

    /// Shape of this run.
    pub fn run_config(&self) -> RunConfig {
        self.run
    }

    /// Generation and traversal settings.
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// All rooms of this run in order.
    pub fn rooms(&self) -> &[RoomTemplate] {
        &self.rooms
    }

    /// HUD label for the current room.
    pub fn room_type_description(&self) -> String {
        match self.current_room().map(|r| r.room_type) {
            Some(RoomType::Rest) => "Rest Room - Safe Zone".to_string(),
            Some(RoomType::Boss) => "Boss Room - Final Challenge!".to_string(),
            _ => format!("Room {}/{}", self.current + 1, self.rooms.len()),
        }
    }

    /// Current index is the run's rest slot.
    pub fn is_rest_room(&self) -> bool {
        self.current == self.run.rest_room_index
    }

    /// Current index is the run's boss slot.
    pub fn is_boss_room(&self) -> bool {
        self.current == self.run.boss_room_index
    }

    /// Generator state, advanced by each `regenerate_run`.
    pub fn rng_state(&self) -> [u64; 2] {
        self.rng.state()
    }

    /// Current room has been cleared.
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    /// Open portal position, if any.
    pub fn exit_portal(&self) -> Option<Vec2> {
        self.exit_portal
    }

    /// Subscribe to clear/transition/completion events.
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
