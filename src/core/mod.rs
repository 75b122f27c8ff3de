//! Core primitives.
//!
//! Seeded randomness, 2D vectors and the injected millisecond clock. Nothing
//! in here knows about totems, rooms or combat.

pub mod vec2;
pub mod rng;
pub mod clock;

// Re-export core types
pub use vec2::{Vec2, circles_overlap};
pub use rng::DeterministicRng;
pub use clock::{Millis, VirtualClock, cooldown_ready};
