//! Notification bus for match events.
//!
//! Each [`crate::Match`] owns its own bus. Listeners subscribe per
//! [`EventKind`] and receive shared, immutable snapshots; they have no path
//! back into the match. A panicking listener is isolated so the remaining
//! listeners still get the event.

use crate::games::cubes::geometry::Point;
use crate::games::cubes::types::{GameState, PlayerId};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use strum::EnumDiscriminants;
use tracing::{debug, error, instrument, warn};

/// Why the current state changed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ChangeType {
    /// A local move was applied.
    Move,
    /// An authoritative snapshot replaced local state.
    Sync,
    /// The match restarted.
    Reset,
    /// The match was created.
    Initial,
    /// A caller installed a state directly.
    Forced,
    /// An externally observed state was adopted.
    AutoDetect,
}

/// Category of a reported error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorKind {
    /// A remote payload was discarded.
    Synchronization,
    /// A state failed its audit.
    InvariantViolation,
    /// A listener panicked during delivery.
    ListenerFault,
}

/// Events published by a match.
#[derive(Debug, Clone, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(EventKind))]
#[strum_discriminants(derive(Hash, strum::Display, strum::EnumIter))]
pub enum GameEvent {
    /// The current state was replaced.
    StateChanged {
        /// Why.
        change: ChangeType,
        /// The new state.
        state: Arc<GameState>,
        /// Free-form context for logs and HUDs.
        context: String,
    },
    /// A move was applied locally.
    MoveMade {
        /// First endpoint.
        start: Point,
        /// Second endpoint.
        end: Point,
        /// State after the move.
        state: Arc<GameState>,
    },
    /// The player to move changed.
    TurnChanged {
        /// The new current player.
        player: PlayerId,
        /// State at the change.
        state: Arc<GameState>,
    },
    /// A winner was decided.
    GameEnded {
        /// The winner.
        winner: PlayerId,
        /// Final state.
        state: Arc<GameState>,
    },
    /// Something went wrong outside a direct caller's reach.
    Error {
        /// Category.
        kind: ErrorKind,
        /// Human-readable detail.
        detail: String,
    },
}

impl GameEvent {
    /// The discriminant used for subscriptions.
    pub fn kind(&self) -> EventKind {
        EventKind::from(self)
    }
}

/// Handle returned by [`NotificationBus::subscribe`]; pass it back to cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    kind: EventKind,
    id: u64,
}

impl Subscription {
    /// The event kind this subscription listens to.
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

type Listener = Box<dyn FnMut(&GameEvent) + Send>;

/// Typed subscription registry.
#[derive(Default)]
pub struct NotificationBus {
    listeners: HashMap<EventKind, Vec<(u64, Listener)>>,
    next_id: u64,
}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<_, _> = self
            .listeners
            .iter()
            .map(|(k, v)| (k.to_string(), v.len()))
            .collect();
        f.debug_struct("NotificationBus")
            .field("listeners", &counts)
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl NotificationBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for events of `kind`.
    ///
    /// Listeners of one kind are called in subscription order.
    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> Subscription
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Box::new(listener)));
        debug!(%kind, id, "Listener subscribed");
        Subscription { kind, id }
    }

    /// Cancels a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let Some(list) = self.listeners.get_mut(&subscription.kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(id, _)| *id != subscription.id);
        let removed = list.len() != before;
        debug!(kind = %subscription.kind, id = subscription.id, removed, "Listener unsubscribed");
        removed
    }

    /// Number of listeners registered for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    /// Delivers `event` to every listener of its kind.
    ///
    /// Returns the number of listeners that panicked. Faults are reported as
    /// an [`ErrorKind::ListenerFault`] event, except while delivering an
    /// error event, where they are only logged.
    #[instrument(skip_all, fields(kind = %event.kind()))]
    pub fn publish(&mut self, event: &GameEvent) -> usize {
        let kind = event.kind();
        let mut faulted = Vec::new();
        if let Some(list) = self.listeners.get_mut(&kind) {
            for (id, listener) in list.iter_mut() {
                if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                    warn!(id = *id, %kind, "Listener panicked");
                    faulted.push(*id);
                }
            }
        }

        if faulted.is_empty() {
            return 0;
        }
        if kind == EventKind::Error {
            error!(count = faulted.len(), "Error listener panicked");
        } else {
            self.publish(&GameEvent::Error {
                kind: ErrorKind::ListenerFault,
                detail: format!(
                    "{} listener(s) panicked handling {kind}: {faulted:?}",
                    faulted.len()
                ),
            });
        }
        faulted.len()
    }
}
