//! Event stream for observers of the pet store.
//!
//! A presentation layer can subscribe to these instead of polling
//! [`PetStore::pet`](crate::store::PetStore::pet). Publishing never blocks:
//! if the channel is full or closed the event is dropped.

use crate::pet::{PetId, PetStats};
use tokio::sync::mpsc;

/// Default channel buffer size.
const DEFAULT_CHANNEL_SIZE: usize = 100;

/// An interaction a player can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Feed,
    Play,
    /// The "pet" action.
    Affection,
}

/// Events emitted by the store after each successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A new pet replaced whatever was there before.
    Created {
        /// The new pet's id.
        id: PetId,
        /// The new pet's name.
        name: String,
    },

    /// The player interacted with the pet.
    Interacted {
        /// What the player did.
        interaction: Interaction,
        /// Stats after the interaction.
        stats: PetStats,
    },

    /// A decay tick was applied.
    Decayed {
        /// Stats after the tick.
        stats: PetStats,
        /// Whether the loneliness penalty was part of this tick.
        lonely: bool,
    },

    /// The pet was removed.
    Cleared,

    /// A mutation was applied in memory but could not be written to storage.
    PersistFailed {
        /// The storage error message.
        message: String,
    },
}

/// Sender for events.
pub type EventSender = mpsc::Sender<Event>;

/// Receiver for events.
pub type EventReceiver = mpsc::Receiver<Event>;

/// Create a new event channel with the default buffer size.
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_SIZE)
}

/// Create a new event channel with a custom buffer size.
pub fn channel_with_size(size: usize) -> (EventSender, EventReceiver) {
    mpsc::channel(size)
}

impl Event {
    /// Create a persist-failed event from any displayable error.
    pub fn persist_failed(message: impl std::fmt::Display) -> Self {
        Self::PersistFailed {
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for Interaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Interaction::Feed => write!(f, "feed"),
            Interaction::Play => write!(f, "play"),
            Interaction::Affection => write!(f, "pet"),
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::Created { name, .. } => write!(f, "{} was born", name),
            Event::Interacted { interaction, stats } => write!(
                f,
                "{}: energy {}, hunger {}, happiness {}",
                interaction, stats.energy, stats.hunger, stats.happiness
            ),
            Event::Decayed { stats, lonely } => write!(
                f,
                "decay{}: energy {}, hunger {}, happiness {}",
                if *lonely { " (lonely)" } else { "" },
                stats.energy,
                stats.hunger,
                stats.happiness
            ),
            Event::Cleared => write!(f, "pet cleared"),
            Event::PersistFailed { message } => write!(f, "failed to save: {}", message),
        }
    }
}
