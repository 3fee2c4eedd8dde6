use core::fmt;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};

use crate::*;

/// What a game tells its observers.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GameEvent {
    GameStarted,
    /// Sent once per game, right before the first successful reveal is applied.
    FirstMove {
        position: Position,
    },
    CellRevealed {
        position: Position,
        cell: CellSnapshot,
        kind: RevealKind,
    },
    CellFlagged {
        position: Position,
        cell: CellSnapshot,
        action: FlagAction,
    },
    GameWon {
        summary: GameSummary,
    },
    GameLost {
        summary: GameSummary,
    },
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::GameStarted => EventKind::GameStarted,
            Self::FirstMove { .. } => EventKind::FirstMove,
            Self::CellRevealed { .. } => EventKind::CellRevealed,
            Self::CellFlagged { .. } => EventKind::CellFlagged,
            Self::GameWon { .. } => EventKind::GameWon,
            Self::GameLost { .. } => EventKind::GameLost,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    GameStarted,
    FirstMove,
    CellRevealed,
    CellFlagged,
    GameWon,
    GameLost,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GameStarted => "game-started",
            Self::FirstMove => "first-move",
            Self::CellRevealed => "cell-revealed",
            Self::CellFlagged => "cell-flagged",
            Self::GameWon => "game-won",
            Self::GameLost => "game-lost",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
pub type HandlerResult = core::result::Result<(), HandlerError>;

type BoxedHandler = Box<dyn FnMut(&GameEvent) -> HandlerResult + Send>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    kind: Option<EventKind>,
    handler: BoxedHandler,
}

impl Subscription {
    fn wants(&self, kind: EventKind) -> bool {
        self.kind.is_none_or(|wanted| wanted == kind)
    }
}

/// Synchronous publish/subscribe channel for [`GameEvent`]s.
///
/// Handlers run in subscription order on the publishing thread. A handler that returns an error
/// or panics is logged and skipped, the remaining handlers still run.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) -> HandlerResult + Send + 'static,
    {
        self.add(Some(kind), Box::new(handler))
    }

    /// Subscribes to every kind of event.
    pub fn subscribe_all<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) -> HandlerResult + Send + 'static,
    {
        self.add(None, Box::new(handler))
    }

    fn add(&mut self, kind: Option<EventKind>, handler: BoxedHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription { id, kind, handler });
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|subscription| subscription.id != id);
        self.subscriptions.len() != before
    }

    /// Handlers that would receive an event of `kind`, wildcard subscriptions included.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.subscriptions
            .iter()
            .filter(|subscription| subscription.wants(kind))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }

    /// Delivers `event` to every interested handler and returns how many of them failed.
    pub fn publish(&mut self, event: &GameEvent) -> usize {
        let kind = event.kind();
        log::trace!("Publishing {}", kind);

        let mut failures = 0;
        for subscription in self
            .subscriptions
            .iter_mut()
            .filter(|subscription| subscription.wants(kind))
        {
            match panic::catch_unwind(AssertUnwindSafe(|| (subscription.handler)(event))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    log::error!("Error in event handler for {}: {}", kind, err);
                    failures += 1;
                }
                Err(_) => {
                    log::error!("Event handler for {} panicked", kind);
                    failures += 1;
                }
            }
        }
        failures
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}
