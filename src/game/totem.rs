//! Totem Matching Engine
//!
//! Tracks the totems of the current room and resolves activation pairs.
//!
//! ## Resolution lifecycle
//!
//! ```text
//!   idle ──activate──▶ one pending ──activate──▶ resolving (locked)
//!    ▲                                               │
//!    └────────── update(now >= resolves_at) ─────────┘
//!                 match: both removed
//!                 mismatch: both deactivated
//! ```
//!
//! The grace delay between the second activation and the outcome is stored
//! as a [`PendingResolution`] and checked against the clock each tick. While
//! it exists every activation is rejected.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::clock::Millis;
use crate::core::vec2::Vec2;
use crate::game::element::Element;
use crate::game::events::{EventBus, EventSink, GameEvent};

/// Default delay between the second activation and its outcome.
pub const DEFAULT_RESOLUTION_DELAY_MS: Millis = 400;

/// Default interaction distance for `find_nearest`.
pub const DEFAULT_INTERACT_DISTANCE: f32 = 40.0;

/// Totem engine settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TotemConfig {
    /// Grace delay before a pair resolves
    pub resolution_delay_ms: Millis,
    /// Reach for interacting with the nearest totem (exclusive)
    pub interact_distance: f32,
}

impl Default for TotemConfig {
    fn default() -> Self {
        Self {
            resolution_delay_ms: DEFAULT_RESOLUTION_DELAY_MS,
            interact_distance: DEFAULT_INTERACT_DISTANCE,
        }
    }
}

/// Totem identifier (monotonic per engine).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TotemId(pub u32);

/// A placed totem.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Totem {
    /// Identifier
    pub id: TotemId,
    /// World position
    pub position: Vec2,
    /// Elemental affinity
    pub element: Element,
    /// Activated and awaiting resolution
    pub activated: bool,
}

/// Result of an activation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    /// Unknown totem, already active, or a pair is resolving
    Rejected,
    /// First of a pair; waiting for a second activation
    AwaitingPair,
    /// Second of a pair; resolution scheduled and the engine is locked
    Resolving,
}

/// Scheduled resolution of an activated pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingResolution {
    /// First activated totem
    pub first: TotemId,
    /// Second activated totem
    pub second: TotemId,
    /// Timestamp at which the pair resolves
    pub resolves_at: Millis,
}

/// Outcome of a resolved pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Same element: both removed
    Matched(Element),
    /// Different elements: both deactivated
    Mismatched,
}

/// A resolved pair with the state of both totems at resolution time.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    /// Match or mismatch
    pub outcome: Outcome,
    /// First totem of the pair
    pub first: Totem,
    /// Second totem of the pair
    pub second: Totem,
}

/// Pairwise totem matching state machine.
#[derive(Debug)]
pub struct TotemEngine {
    totems: Vec<Totem>,
    activated: Vec<TotemId>,
    pending: Option<PendingResolution>,
    resolution_delay: Millis,
    next_id: u32,
    events: EventBus,
}

impl Default for TotemEngine {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLUTION_DELAY_MS)
    }
}

impl TotemEngine {
    /// Create an empty engine with the given grace delay.
    pub fn new(resolution_delay: Millis) -> Self {
        Self {
            totems: Vec::new(),
            activated: Vec::with_capacity(2),
            pending: None,
            resolution_delay,
            next_id: 0,
            events: EventBus::new(),
        }
    }

    /// Register a totem for the current room.
    pub fn add_totem(&mut self, position: Vec2, element: Element) -> TotemId {
        let id = TotemId(self.next_id);
        self.next_id += 1;
        self.totems.push(Totem {
            id,
            position,
            element,
            activated: false,
        });
        id
    }

    /// Look up a live totem.
    pub fn totem(&self, id: TotemId) -> Option<&Totem> {
        self.totems.iter().find(|t| t.id == id)
    }

    /// Live totems in insertion order.
    pub fn totems(&self) -> &[Totem] {
        &self.totems
    }

    /// Nearest unactivated totem strictly closer than `max_distance`.
    ///
    /// Exact ties keep the earliest-inserted totem.
    pub fn find_nearest(&self, position: Vec2, max_distance: f32) -> Option<TotemId> {
        let mut nearest = None;
        let mut min_distance = max_distance;

        for totem in &self.totems {
            if totem.activated {
                continue;
            }
            let distance = totem.position.distance(position);
            if distance < min_distance {
                min_distance = distance;
                nearest = Some(totem.id);
            }
        }

        nearest
    }

    /// Activate a totem at time `now`.
    pub fn activate_totem(&mut self, id: TotemId, now: Millis) -> Activation {
        if self.pending.is_some() {
            return Activation::Rejected;
        }

        let Some(totem) = self.totems.iter_mut().find(|t| t.id == id) else {
            return Activation::Rejected;
        };
        if totem.activated {
            return Activation::Rejected;
        }

        totem.activated = true;
        self.activated.push(id);

        if self.activated.len() == 1 {
            return Activation::AwaitingPair;
        }

        let (first, second) = (self.activated[0], self.activated[1]);
        self.pending = Some(PendingResolution {
            first,
            second,
            resolves_at: now.saturating_add(self.resolution_delay),
        });
        Activation::Resolving
    }

    /// Resolve the pending pair once its delay has elapsed.
    ///
    /// Returns `None` while nothing is due.
    pub fn update(&mut self, now: Millis) -> Option<Resolution> {
        let pending = self.pending?;
        if now < pending.resolves_at {
            return None;
        }

        self.pending = None;
        self.activated.clear();

        let first = self.totem(pending.first).cloned();
        let second = self.totem(pending.second).cloned();
        let (first, second) = match (first, second) {
            (Some(a), Some(b)) => (a, b),
            // Pair vanished under us (room cleared mid-resolution)
            _ => return None,
        };

        let outcome = if first.element == second.element {
            self.totems.retain(|t| t.id != first.id && t.id != second.id);
            debug!(element = %first.element, remaining = self.totems.len(), "totems matched");
            self.events.emit(GameEvent::TotemMatched { element: first.element });
            Outcome::Matched(first.element)
        } else {
            for totem in &mut self.totems {
                if totem.id == first.id || totem.id == second.id {
                    totem.activated = false;
                }
            }
            debug!(first = %first.element, second = %second.element, "totems mismatched");
            self.events.emit(GameEvent::TotemMismatched);
            Outcome::Mismatched
        };

        Some(Resolution { outcome, first, second })
    }

    /// Totems not yet matched (active or not).
    pub fn remaining_count(&self) -> usize {
        self.totems.len()
    }

    /// Whether a pair is awaiting its resolution.
    pub fn is_resolving(&self) -> bool {
        self.pending.is_some()
    }

    /// Scheduled resolution, if any.
    pub fn pending_resolution(&self) -> Option<PendingResolution> {
        self.pending
    }

    /// Number of activated-but-unresolved totems (0, 1 or 2).
    pub fn pending_count(&self) -> usize {
        self.activated.len()
    }

    /// Deactivate any pending totems and release the lock.
    ///
    /// The live totem list is left untouched.
    pub fn reset(&mut self) {
        for totem in &mut self.totems {
            if self.activated.contains(&totem.id) {
                totem.activated = false;
            }
        }
        self.activated.clear();
        self.pending = None;
    }

    /// Drop every totem (room teardown).
    pub fn clear(&mut self) {
        self.reset();
        self.totems.clear();
    }

    /// Subscribe to match/mismatch events.
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
