//! # Totem Run
//!
//! Deterministic gameplay core for a room-by-room action-adventure run:
//! match elemental totems in pairs, fight what mismatches summon, bank
//! essence, and walk through the exit portal of each cleared room until
//! the boss room is done.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        TOTEM RUN                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                                │
//! │  ├── vec2.rs     - 2D vector and circle overlap              │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── clock.rs    - Injected millisecond clock, cooldowns     │
//! │                                                              │
//! │  game/           - Run logic                                 │
//! │  ├── totem.rs    - Pair matching with resolution lock        │
//! │  ├── combat.rs   - Attacks, companion, contact damage        │
//! │  ├── essence.rs  - Capped per-element ledger                 │
//! │  ├── room.rs     - Run generation and progression            │
//! │  ├── templates.rs- Room layouts and themes                   │
//! │  └── tick.rs     - Run session driving all systems           │
//! │                                                              │
//! │  config.rs       - Run configuration and loading             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! Time is passed in by the caller, never read from the system, and all
//! randomness comes from a seeded Xorshift128+. Given the same seed and the
//! same input frames at the same timestamps, a run replays identically.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod game;

// Re-export commonly used types
pub use config::{ConfigError, GameConfig};
pub use core::clock::{Millis, VirtualClock};
pub use core::rng::DeterministicRng;
pub use core::vec2::Vec2;
pub use game::element::Element;
pub use game::events::{EventSink, GameEvent};
pub use game::input::{InputFrame, InputRecording};
pub use game::tick::{RunPhase, RunSession, TickResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;
