//! Input Frames and Recording
//!
//! One `InputFrame` per tick: where the player stands plus edge-triggered
//! action flags. Movement itself belongs to the presentation layer; the
//! core only needs the resulting position.
//!
//! `InputRecording` stores frames delta-compressed so a run can be replayed
//! tick-for-tick from its seed.

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;

// =============================================================================
// INPUT TYPES
// =============================================================================

/// Player input for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Player world position this tick
    pub position: Vec2,

    /// Action flags (packed bits):
    /// - Bit 0: Interact with nearest totem
    /// - Bit 1: Attack
    /// - Bit 2: Use exit portal
    /// - Bit 3: Restart run
    /// - Bit 4-7: Reserved
    pub flags: u8,
}

impl InputFrame {
    /// Interact flag bit
    pub const FLAG_INTERACT: u8 = 0x01;

    /// Attack flag bit
    pub const FLAG_ATTACK: u8 = 0x02;

    /// Portal flag bit
    pub const FLAG_TRANSITION: u8 = 0x04;

    /// Restart flag bit
    pub const FLAG_RESTART: u8 = 0x08;

    /// Idle frame at a position.
    pub const fn at(position: Vec2) -> Self {
        Self { position, flags: 0 }
    }

    /// Add the interact flag.
    pub const fn interact(mut self) -> Self {
        self.flags |= Self::FLAG_INTERACT;
        self
    }

    /// Add the attack flag.
    pub const fn attack(mut self) -> Self {
        self.flags |= Self::FLAG_ATTACK;
        self
    }

    /// Add the portal flag.
    pub const fn transition(mut self) -> Self {
        self.flags |= Self::FLAG_TRANSITION;
        self
    }

    /// Add the restart flag.
    pub const fn restart(mut self) -> Self {
        self.flags |= Self::FLAG_RESTART;
        self
    }

    /// Check if interact was pressed this frame.
    #[inline]
    pub fn interact_pressed(&self) -> bool {
        self.flags & Self::FLAG_INTERACT != 0
    }

    /// Check if attack was pressed this frame.
    #[inline]
    pub fn attack_pressed(&self) -> bool {
        self.flags & Self::FLAG_ATTACK != 0
    }

    /// Check if the portal was requested this frame.
    #[inline]
    pub fn transition_pressed(&self) -> bool {
        self.flags & Self::FLAG_TRANSITION != 0
    }

    /// Check if a restart was requested this frame.
    #[inline]
    pub fn restart_pressed(&self) -> bool {
        self.flags & Self::FLAG_RESTART != 0
    }

    /// No action flags set.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.flags == 0
    }
}

/// Frame change at a given tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputDelta {
    /// Tick when this input state began
    pub tick: u32,
    /// The new input state
    pub frame: InputFrame,
}

// =============================================================================
// RECORDING
// =============================================================================

/// Delta-compressed input log for one run.
///
/// Only ticks where the frame changed are stored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputRecording {
    /// Seed the run was started with
    pub seed: u64,

    /// Last recorded tick
    pub end_tick: u32,

    deltas: Vec<InputDelta>,

    #[serde(skip)]
    last_frame: Option<InputFrame>,
}

impl InputRecording {
    /// Empty recording for a run seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            end_tick: 0,
            deltas: Vec::with_capacity(256),
            last_frame: None,
        }
    }

    /// Record the frame for a tick.
    pub fn record(&mut self, tick: u32, frame: InputFrame) {
        self.end_tick = tick;

        if self.last_frame != Some(frame) {
            self.deltas.push(InputDelta { tick, frame });
            self.last_frame = Some(frame);
        }
    }

    /// Frame in effect at `tick`. Default frame before the first delta.
    pub fn get_input_at(&self, tick: u32) -> InputFrame {
        let idx = self.deltas.partition_point(|d| d.tick <= tick);
        if idx == 0 {
            InputFrame::default()
        } else {
            self.deltas[idx - 1].frame
        }
    }

    /// Stored deltas.
    pub fn deltas(&self) -> &[InputDelta] {
        &self.deltas
    }

    /// Iterate `(tick, frame)` for every tick from 0 to `end_tick`.
    pub fn replay_iter(&self) -> ReplayIterator<'_> {
        ReplayIterator {
            recording: self,
            current_tick: 0,
            delta_idx: 0,
            current_frame: InputFrame::default(),
            done: self.deltas.is_empty(),
        }
    }
}

/// Iterator for replaying inputs tick-by-tick.
pub struct ReplayIterator<'a> {
    recording: &'a InputRecording,
    current_tick: u32,
    delta_idx: usize,
    current_frame: InputFrame,
    done: bool,
}

impl<'a> Iterator for ReplayIterator<'a> {
    type Item = (u32, InputFrame);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.current_tick > self.recording.end_tick {
            return None;
        }

        while let Some(delta) = self.recording.deltas.get(self.delta_idx) {
            if delta.tick > self.current_tick {
                break;
            }
            self.current_frame = delta.frame;
            self.delta_idx += 1;
        }

        let result = (self.current_tick, self.current_frame);
        match self.current_tick.checked_add(1) {
            Some(next) => self.current_tick = next,
            None => self.done = true,
        }
        Some(result)
    }
}

// =============================================================================
// TESTS
// =============================================================================
