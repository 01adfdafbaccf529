//! Store change events
//!
//! The verdict store publishes a `StoreEvent` for every successful mutation so
//! the presentation layer can re-render without the store knowing about it.

use crate::Verdict;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Change notifications emitted by `VerdictStore`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreEvent {
    /// A character joined the roster
    CharacterAdded {
        name: String,
        /// 0-based column the character occupies
        position: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A character and its whole mapping were removed
    CharacterRemoved {
        name: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A single (character, entity) verdict was written
    VerdictChanged {
        character: String,
        entity_id: String,
        old: Verdict,
        new: Verdict,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Contents were replaced wholesale (CSV import)
    StoreReplaced {
        characters: Vec<String>,
        /// Number of stored (character, entity) entries after the replace
        entries: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl StoreEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            StoreEvent::CharacterAdded { .. } => "CharacterAdded",
            StoreEvent::CharacterRemoved { .. } => "CharacterRemoved",
            StoreEvent::VerdictChanged { .. } => "VerdictChanged",
            StoreEvent::StoreReplaced { .. } => "StoreReplaced",
        }
    }
}

/// Broadcast bus for `StoreEvent`s
///
/// Backed by `tokio::sync::broadcast`: publishing never blocks, slow
/// subscribers see `Lagged`, and dropped receivers are cleaned up.
///
/// # Examples
///
/// ```
/// use smashpass_common::events::EventBus;
/// use smashpass_common::VerdictStore;
///
/// let bus = EventBus::new(64);
/// let mut rx = bus.subscribe();
///
/// let mut store = VerdictStore::with_events(bus.clone());
/// store.add_character("Alex").unwrap();
///
/// let event = rx.try_recv().unwrap();
/// assert_eq!(event.event_type(), "CharacterAdded");
/// ```
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: StoreEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn removed(name: &str) -> StoreEvent {
        StoreEvent::CharacterRemoved {
            name: name.to_string(),
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_emit_without_subscribers_is_silent() {
        let bus = EventBus::new(10);
        bus.emit_lossy(removed("Alex"));

        // Late subscribers do not see earlier events
        let mut rx = bus.subscribe();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_subscribers_receive_events() {
        let bus = EventBus::new(10);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.emit_lossy(removed("Amun"));
        assert_eq!(rx1.try_recv().unwrap().event_type(), "CharacterRemoved");
        assert_eq!(rx2.try_recv().unwrap().event_type(), "CharacterRemoved");
    }

    #[test]
    fn test_slow_subscriber_lags() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for name in ["A", "B", "C"] {
            bus.emit_lossy(removed(name));
        }
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(1))
        ));
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = StoreEvent::VerdictChanged {
            character: "Alex".to_string(),
            entity_id: "001".to_string(),
            old: Verdict::Undecided,
            new: Verdict::Smash,
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "VerdictChanged");
        assert_eq!(json["new"], "Smash");
    }
}
