//! Game Logic Module
//!
//! All run simulation code. Deterministic given a seed and input frames.
//!
//! ## Module Structure
//!
//! - `element`: The four elements and their contrasts
//! - `events`: Game events, sinks and the per-system event bus
//! - `totem`: Totem pairing with a timed resolution lock
//! - `enemy` / `companion`: Combat entities
//! - `combat`: Player attacks, companion strikes, contact damage
//! - `essence`: Per-element capped currency
//! - `templates`: Hand-authored room layouts and themes
//! - `room`: Run generation and room-to-room progression
//! - `input`: Per-tick input frames and recordings
//! - `tick`: The run session that drives everything

pub mod element;
pub mod events;
pub mod totem;
pub mod enemy;
pub mod companion;
pub mod combat;
pub mod essence;
pub mod templates;
pub mod room;
pub mod input;
pub mod tick;

// Re-export key types
pub use element::Element;
pub use events::{EventBus, EventRecorder, EventSink, GameEvent};
pub use totem::{Activation, Outcome, TotemConfig, TotemEngine, TotemId};
pub use combat::{CombatConfig, CombatResolver, PlayerHealth};
pub use essence::{EssenceConfig, EssenceCounts, EssenceLedger};
pub use room::{RoomConfig, RoomSequencer, RunConfig};
pub use input::{InputFrame, InputRecording};
pub use tick::{RunPhase, RunSession, TickResult, replay_run};
