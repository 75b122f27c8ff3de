//! Elements
//!
//! The four elemental affinities shared by totems, enemies and essence.

use std::fmt;
use serde::{Serialize, Deserialize};

/// Elemental affinity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Element {
    /// Fire
    Fire = 0,
    /// Water
    Water = 1,
    /// Earth
    Earth = 2,
    /// Air
    Air = 3,
}

impl Element {
    /// All elements in ledger order.
    pub const ALL: [Element; 4] = [Element::Fire, Element::Water, Element::Earth, Element::Air];

    /// Number of elements.
    pub const COUNT: usize = 4;

    /// Stable index (0-3).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Get element from index (0-3).
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Element::Fire),
            1 => Some(Element::Water),
            2 => Some(Element::Earth),
            3 => Some(Element::Air),
            _ => None,
        }
    }

    /// Opposing element used when authoring rooms (fire/water, earth/air).
    pub fn contrast(self) -> Self {
        match self {
            Element::Fire => Element::Water,
            Element::Water => Element::Fire,
            Element::Earth => Element::Air,
            Element::Air => Element::Earth,
        }
    }

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Element::Fire => "fire",
            Element::Water => "water",
            Element::Earth => "earth",
            Element::Air => "air",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
