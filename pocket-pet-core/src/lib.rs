//! Pocket Pet core library
//!
//! This crate provides the stat-management engine for a single virtual pet:
//! the pet data model, the store that applies player interactions and decay,
//! the persisted slot layout, and the scheduler that drives passive decay.

pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod event;
pub mod pet;
pub mod scheduler;
pub mod storage;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::STORAGE_KEY;
pub use config::Config;
pub use error::{Error, Result};
pub use event::{Event, EventReceiver, EventSender, Interaction};
pub use pet::{Pet, PetId, PetStats, Stat, PRESET_APPEARANCES};
pub use scheduler::{DecayHandle, DecayScheduler};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{Outcome, PetStore, SharedStore};
