//! Essence Ledger
//!
//! Per-element currency earned from totem matches and enemy kills. Each
//! element is capped independently; there is no shared cap.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::game::element::Element;
use crate::game::events::{EventBus, EventSink, GameEvent};

/// Default per-element cap.
pub const DEFAULT_MAX_ESSENCE: u32 = 99;

/// Essence ledger settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EssenceConfig {
    /// Per-element cap
    pub max_essence: u32,
}

impl Default for EssenceConfig {
    fn default() -> Self {
        Self { max_essence: DEFAULT_MAX_ESSENCE }
    }
}

/// Snapshot of all four essence counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EssenceCounts {
    /// Fire essence
    pub fire: u32,
    /// Water essence
    pub water: u32,
    /// Earth essence
    pub earth: u32,
    /// Air essence
    pub air: u32,
}

impl EssenceCounts {
    /// Count for one element.
    pub fn get(&self, element: Element) -> u32 {
        match element {
            Element::Fire => self.fire,
            Element::Water => self.water,
            Element::Earth => self.earth,
            Element::Air => self.air,
        }
    }

    /// Sum across elements.
    pub fn total(&self) -> u32 {
        self.fire + self.water + self.earth + self.air
    }
}

/// Capped per-element essence counter.
#[derive(Debug)]
pub struct EssenceLedger {
    counts: [u32; Element::COUNT],
    max_essence: u32,
    events: EventBus,
}

impl Default for EssenceLedger {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ESSENCE)
    }
}

impl EssenceLedger {
    /// Create an empty ledger with the given per-element cap.
    pub fn new(max_essence: u32) -> Self {
        Self {
            counts: [0; Element::COUNT],
            max_essence,
            events: EventBus::new(),
        }
    }

    /// Add essence of one element.
    ///
    /// Returns false and changes nothing when the element is already at the
    /// cap. Otherwise the count is raised, clamped to the cap.
    pub fn add_essence(&mut self, element: Element, amount: u32) -> bool {
        let current = self.counts[element.index()];
        if current >= self.max_essence {
            return false;
        }

        self.counts[element.index()] = current.saturating_add(amount).min(self.max_essence);
        debug!(%element, count = self.counts[element.index()], "essence added");
        self.emit_changed();
        true
    }

    /// Spend essence of one element. Returns false if the balance is short.
    pub fn spend_essence(&mut self, element: Element, amount: u32) -> bool {
        let current = self.counts[element.index()];
        if current < amount {
            return false;
        }

        self.counts[element.index()] = current - amount;
        self.emit_changed();
        true
    }

    /// Count for one element.
    pub fn get(&self, element: Element) -> u32 {
        self.counts[element.index()]
    }

    /// Copy of all counts.
    pub fn snapshot(&self) -> EssenceCounts {
        EssenceCounts {
            fire: self.counts[Element::Fire.index()],
            water: self.counts[Element::Water.index()],
            earth: self.counts[Element::Earth.index()],
            air: self.counts[Element::Air.index()],
        }
    }

    /// Sum across elements.
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Per-element cap.
    pub fn max_essence(&self) -> u32 {
        self.max_essence
    }

    /// Whether an element has reached its cap.
    pub fn is_at_cap(&self, element: Element) -> bool {
        self.counts[element.index()] >= self.max_essence
    }

    /// Zero every count.
    pub fn reset(&mut self) {
        self.counts = [0; Element::COUNT];
        self.emit_changed();
    }

    /// Subscribe to `EssenceChanged` events.
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

    fn emit_changed(&mut self) {
        let snapshot = self.snapshot();
        self.events.emit(GameEvent::EssenceChanged(snapshot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_starts_empty() {
        let ledger = EssenceLedger::default();
        for element in Element::ALL {
            assert_eq!(ledger.get(element), 0);
        }
        assert_eq!(ledger.max_essence(), 99);
    }

    #[test]
    fn test_add_clamps_to_cap() {
        let mut ledger = EssenceLedger::new(5);
        assert!(ledger.add_essence(Element::Fire, 3));
        assert!(ledger.add_essence(Element::Fire, 10));
        assert_eq!(ledger.get(Element::Fire), 5);
        assert!(ledger.is_at_cap(Element::Fire));

        // At cap: rejected, no event
        ledger.take_events();
        assert!(!ledger.add_essence(Element::Fire, 1));
        assert!(ledger.take_events().is_empty());

        // Other elements are independent
        assert!(!ledger.is_at_cap(Element::Water));
        assert!(ledger.add_essence(Element::Water, 1));
    }

    #[test]
    fn test_spend_requires_balance() {
        let mut ledger = EssenceLedger::default();
        ledger.add_essence(Element::Earth, 2);

        assert!(!ledger.spend_essence(Element::Earth, 3));
        assert_eq!(ledger.get(Element::Earth), 2);

        assert!(ledger.spend_essence(Element::Earth, 2));
        assert_eq!(ledger.get(Element::Earth), 0);
    }

    #[test]
    fn test_changed_event_carries_snapshot() {
        let mut ledger = EssenceLedger::default();
        ledger.add_essence(Element::Air, 1);
        ledger.add_essence(Element::Fire, 2);

        let events = ledger.take_events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            GameEvent::EssenceChanged(EssenceCounts { fire: 2, water: 0, earth: 0, air: 1 })
        );
    }

    #[test]
    fn test_reset_zeroes_and_notifies() {
        let mut ledger = EssenceLedger::default();
        ledger.add_essence(Element::Water, 4);
        ledger.take_events();

        ledger.reset();
        assert_eq!(ledger.total(), 0);
        assert_eq!(
            ledger.take_events(),
            vec![GameEvent::EssenceChanged(EssenceCounts::default())]
        );
    }

    #[test]
    fn test_subscriber_only_ledger_keeps_no_backlog() {
        let mut ledger = EssenceLedger::default();
        let recorder = crate::game::events::EventRecorder::new();
        ledger.subscribe(recorder.clone());
        ledger.set_event_buffering(false);

        for _ in 0..50 {
            ledger.add_essence(Element::Earth, 1);
        }

        assert_eq!(recorder.count(|e| matches!(e, GameEvent::EssenceChanged(_))), 50);
        assert!(ledger.take_events().is_empty());
    }

    fn element_strategy() -> impl Strategy<Value = Element> {
        (0u8..4).prop_map(|i| Element::from_index(i).unwrap())
    }

    proptest! {
        #[test]
        fn prop_counts_stay_within_bounds(
            cap in 1u32..120,
            ops in proptest::collection::vec((element_strategy(), any::<bool>(), 0u32..40), 0..200),
        ) {
            let mut ledger = EssenceLedger::new(cap);
            for (element, add, amount) in ops {
                if add {
                    ledger.add_essence(element, amount);
                } else {
                    ledger.spend_essence(element, amount);
                }
                for e in Element::ALL {
                    prop_assert!(ledger.get(e) <= cap);
                }
            }
        }
    }
}
