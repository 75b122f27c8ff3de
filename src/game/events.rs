//! Game Events
//!
//! Notifications emitted by the core systems when a state change commits.
//!
//! Each system owns an [`EventBus`]. Emitting an event calls every
//! subscribed [`EventSink`] synchronously, in subscription order, and also
//! buffers the event so the owner (usually the run driver) can drain it with
//! [`EventBus::take_events`] and route it to other systems.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Serialize, Deserialize};

use crate::game::element::Element;
use crate::game::enemy::EnemyId;
use crate::game::essence::EssenceCounts;

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Two totems of the same element were matched and removed
    TotemMatched {
        /// Element of the pair
        element: Element,
    },

    /// Two totems of different elements were deactivated
    TotemMismatched,

    /// An enemy reached zero health
    EnemyDied {
        /// Which enemy
        enemy: EnemyId,
        /// Its element (decides the essence reward)
        element: Element,
    },

    /// Player health changed through damage or reset
    PlayerDamaged {
        /// Health after the change
        current: u32,
        /// Maximum health
        max: u32,
    },

    /// Player health reached zero (once per life)
    PlayerDied,

    /// Current room became clear and the exit portal opened
    RoomCleared,

    /// Player moved into the room at `index`
    RoomTransition {
        /// Zero-based room index
        index: usize,
    },

    /// Player left the final room
    RunComplete,

    /// Essence counts changed; carries the full snapshot
    EssenceChanged(EssenceCounts),
}

impl GameEvent {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::TotemMatched { .. } => "totem_matched",
            GameEvent::TotemMismatched => "totem_mismatched",
            GameEvent::EnemyDied { .. } => "enemy_died",
            GameEvent::PlayerDamaged { .. } => "player_damaged",
            GameEvent::PlayerDied => "player_died",
            GameEvent::RoomCleared => "room_cleared",
            GameEvent::RoomTransition { .. } => "room_transition",
            GameEvent::RunComplete => "run_complete",
            GameEvent::EssenceChanged(_) => "essence_changed",
        }
    }
}

// =============================================================================
// SUBSCRIBERS
// =============================================================================

/// Receiver of game events.
pub trait EventSink {
    /// Called once per emitted event, at commit time.
    fn on_event(&mut self, event: &GameEvent);
}

impl<F> EventSink for F
where
    F: FnMut(&GameEvent),
{
    fn on_event(&mut self, event: &GameEvent) {
        self(event)
    }
}

/// Shared event log.
///
/// Clones share the same buffer, so one handle can be subscribed while
/// another is kept for inspection.
#[derive(Clone, Debug, Default)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<GameEvent>>>,
}

impl EventRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<GameEvent> {
        self.events.borrow().clone()
    }

    /// Number of recorded events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&GameEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| predicate(e)).count()
    }

    /// Drop everything recorded so far.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl EventSink for EventRecorder {
    fn on_event(&mut self, event: &GameEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

// =============================================================================
// EVENT BUS
// =============================================================================

/// Zero-or-more subscriber event bus with a drainable pending buffer.
///
/// Buffering is on by default and the owner must drain it with
/// [`take_events`](Self::take_events). Callers that only listen through
/// subscribers turn it off with [`set_buffering`](Self::set_buffering).
pub struct EventBus {
    sinks: Vec<Box<dyn EventSink>>,
    pending: Vec<GameEvent>,
    buffering: bool,
}

impl Default for EventBus {
    fn default() -> Self {
        Self {
            sinks: Vec::new(),
            pending: Vec::new(),
            buffering: true,
        }
    }
}

impl EventBus {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber.
    pub fn subscribe(&mut self, sink: impl EventSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    /// Number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sinks.len()
    }

    /// Enable or disable the pending buffer. Disabling drops anything buffered.
    pub fn set_buffering(&mut self, enabled: bool) {
        self.buffering = enabled;
        if !enabled {
            self.pending.clear();
        }
    }

    /// Whether emitted events are kept for `take_events`.
    pub fn is_buffering(&self) -> bool {
        self.buffering
    }

    /// Deliver an event to every subscriber and buffer it if enabled.
    pub fn emit(&mut self, event: GameEvent) {
        for sink in &mut self.sinks {
            sink.on_event(&event);
        }
        if self.buffering {
            self.pending.push(event);
        }
    }

    /// Take buffered events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Buffered events not yet taken.
    pub fn pending(&self) -> &[GameEvent] {
        &self.pending
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.sinks.len())
            .field("pending", &self.pending)
            .field("buffering", &self.buffering)
            .finish()
    }
}
