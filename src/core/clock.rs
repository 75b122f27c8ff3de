//! Game Clock
//!
//! Cooldowns and the totem resolution delay compare against a monotonic
//! millisecond timestamp that the driver passes in each tick. The core never
//! reads system time.

use serde::{Serialize, Deserialize};

/// Monotonic timestamp in milliseconds since the session started.
pub type Millis = u64;

/// True when `cooldown` has fully elapsed since `last`.
///
/// `None` means the action has never fired (or was reset) and is ready.
#[inline]
pub fn cooldown_ready(last: Option<Millis>, now: Millis, cooldown: Millis) -> bool {
    match last {
        None => true,
        Some(last) => now.saturating_sub(last) >= cooldown,
    }
}

/// Virtual clock advanced explicitly by the caller.
///
/// Used by the headless demo, replays and tests in place of a real timer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualClock {
    now: Millis,
}

impl VirtualClock {
    /// Frame duration at 60 Hz, rounded down.
    pub const FRAME_MS: Millis = 16;

    /// Clock starting at zero.
    pub const fn new() -> Self {
        Self { now: 0 }
    }

    /// Current timestamp.
    #[inline]
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Advance by `ms` and return the new timestamp.
    #[inline]
    pub fn advance(&mut self, ms: Millis) -> Millis {
        self.now = self.now.saturating_add(ms);
        self.now
    }

    /// Advance by one 60 Hz frame.
    #[inline]
    pub fn step_frame(&mut self) -> Millis {
        self.advance(Self::FRAME_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_ready() {
        assert!(cooldown_ready(None, 0, 500));
        assert!(!cooldown_ready(Some(100), 599, 500));
        assert!(cooldown_ready(Some(100), 600, 500));
        // Timestamps before `last` never underflow
        assert!(!cooldown_ready(Some(100), 50, 500));
    }

    #[test]
    fn test_virtual_clock() {
        let mut clock = VirtualClock::new();
        assert_eq!(clock.now(), 0);
        assert_eq!(clock.advance(400), 400);
        assert_eq!(clock.step_frame(), 416);
    }
}
