//! The pet state store.
//!
//! [`PetStore`] is the only owner of the pet record and the only writer of
//! the storage slot. Every command mutates the in-memory record first and
//! then writes the whole post-state through the codec before returning, so a
//! reader of the slot right after a call sees the new state.
//!
//! Commands that need a pet are silent no-ops without one and report
//! [`Outcome::NoPet`]. A failed write is returned to the caller but the
//! in-memory mutation is kept.

use crate::clock::Clock;
use crate::codec::{self, STORAGE_KEY};
use crate::config::Config;
use crate::error::Result;
use crate::event::{Event, EventSender, Interaction};
use crate::pet::{Pet, PetId, DEFAULT_APPEARANCE, DEFAULT_NAME};
use crate::storage::Storage;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Hunger restored by feeding.
pub const FEED_HUNGER: i32 = 20;
/// Energy restored by feeding.
pub const FEED_ENERGY: i32 = 10;
/// Happiness gained by playing.
pub const PLAY_HAPPINESS: i32 = 15;
/// Energy spent by playing.
pub const PLAY_ENERGY_COST: i32 = 10;
/// Happiness gained by the "pet" action.
pub const AFFECTION_HAPPINESS: i32 = 10;

/// Hunger lost per decay tick.
pub const DECAY_HUNGER: i32 = 3;
/// Happiness lost per decay tick.
pub const DECAY_HAPPINESS: i32 = 2;
/// Energy lost per decay tick.
pub const DECAY_ENERGY: i32 = 1;
/// Extra happiness lost on a tick when the pet has been left alone.
pub const LONELINESS_PENALTY: i32 = 2;
/// A pet is lonely once strictly more than this many milliseconds have
/// passed since the last interaction.
pub const LONELINESS_THRESHOLD_MS: i64 = 30_000;

/// A store shared between the decay scheduler and a presentation layer.
pub type SharedStore = Arc<Mutex<PetStore>>;

/// What a command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The command changed (or re-saved) the pet.
    Applied,
    /// There was no pet, so nothing happened.
    NoPet,
}

/// Owner of the single pet record.
#[derive(Debug)]
pub struct PetStore {
    pet: Option<Pet>,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    key: String,
    default_name: String,
    default_appearance: String,
    events: Option<EventSender>,
}

impl PetStore {
    /// Restore the store from the default slot.
    ///
    /// A missing, unreadable, or malformed slot starts the store with no
    /// pet. Elapsed offline time is not decayed.
    pub fn load(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self::restore(
            storage,
            clock,
            STORAGE_KEY.to_string(),
            DEFAULT_NAME.to_string(),
            DEFAULT_APPEARANCE.to_string(),
        )
    }

    /// Restore the store using the slot name and defaults from `config`.
    pub fn load_with_config(
        config: &Config,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::restore(
            storage,
            clock,
            config.storage_key.clone(),
            config.default_name.clone(),
            config.default_appearance.clone(),
        )
    }

    fn restore(
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        key: String,
        default_name: String,
        default_appearance: String,
    ) -> Self {
        let pet = match storage.load(&key) {
            Ok(Some(raw)) => match codec::decode(&raw) {
                Ok(pet) => pet,
                Err(e) => {
                    warn!(key = %key, error = %e, "discarding unreadable pet state");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "failed to read pet state");
                None
            }
        };

        match &pet {
            Some(pet) => info!(id = %pet.id(), name = pet.name(), "restored pet"),
            None => debug!(key = %key, "no stored pet"),
        }

        Self {
            pet,
            storage,
            clock,
            key,
            default_name,
            default_appearance,
            events: None,
        }
    }

    /// Publish events on `events` after each mutation.
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Wrap the store for sharing with a scheduler.
    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    /// The current pet, if any.
    pub fn pet(&self) -> Option<&Pet> {
        self.pet.as_ref()
    }

    /// Check if a pet currently exists.
    pub fn has_pet(&self) -> bool {
        self.pet.is_some()
    }

    /// The clock this store stamps interactions with.
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Replace any existing pet with a new full-stat one.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the new state could not be written; the
    /// new pet is still in place.
    pub fn create_pet(
        &mut self,
        name: impl Into<String>,
        appearance: impl Into<String>,
    ) -> Result<PetId> {
        let pet = Pet::new(name, appearance, self.clock.now());
        let id = pet.id();
        info!(id = %id, name = pet.name(), appearance = pet.appearance(), "created pet");

        self.emit(Event::Created {
            id,
            name: pet.name().to_string(),
        });
        self.pet = Some(pet);
        self.commit()?;
        Ok(id)
    }

    /// Feed the pet: more hunger and energy.
    pub fn feed(&mut self) -> Result<Outcome> {
        self.interact(Interaction::Feed)
    }

    /// Play with the pet: more happiness, less energy.
    pub fn play(&mut self) -> Result<Outcome> {
        self.interact(Interaction::Play)
    }

    /// Pet the pet: more happiness.
    pub fn affection(&mut self) -> Result<Outcome> {
        self.interact(Interaction::Affection)
    }

    /// Run one interaction against the current pet.
    pub fn interact(&mut self, interaction: Interaction) -> Result<Outcome> {
        let now = self.clock.now();
        let Some(pet) = self.pet.as_mut() else {
            debug!(%interaction, "no pet, ignoring interaction");
            return Ok(Outcome::NoPet);
        };

        let stats = &mut pet.stats;
        match interaction {
            Interaction::Feed => {
                stats.hunger = stats.hunger.adjust(FEED_HUNGER);
                stats.energy = stats.energy.adjust(FEED_ENERGY);
            }
            Interaction::Play => {
                stats.happiness = stats.happiness.adjust(PLAY_HAPPINESS);
                stats.energy = stats.energy.adjust(-PLAY_ENERGY_COST);
            }
            Interaction::Affection => {
                stats.happiness = stats.happiness.adjust(AFFECTION_HAPPINESS);
            }
        }
        pet.touch(now);

        let stats = pet.stats;
        debug!(%interaction, ?stats, "interaction applied");
        self.emit(Event::Interacted { interaction, stats });
        self.commit()?;
        Ok(Outcome::Applied)
    }

    /// Apply one decay tick as of `now`.
    ///
    /// Decay is not an interaction and leaves `last_interaction_at` alone.
    pub fn apply_decay(&mut self, now: DateTime<Utc>) -> Result<Outcome> {
        let Some(pet) = self.pet.as_mut() else {
            debug!("no pet, skipping decay");
            return Ok(Outcome::NoPet);
        };

        let lonely = pet.millis_since_interaction(now) > LONELINESS_THRESHOLD_MS;

        let stats = &mut pet.stats;
        stats.hunger = stats.hunger.adjust(-DECAY_HUNGER);
        stats.happiness = stats.happiness.adjust(-DECAY_HAPPINESS);
        stats.energy = stats.energy.adjust(-DECAY_ENERGY);
        if lonely {
            stats.happiness = stats.happiness.adjust(-LONELINESS_PENALTY);
        }

        let stats = pet.stats;
        debug!(?stats, lonely, "decay applied");
        self.emit(Event::Decayed { stats, lonely });
        self.commit()?;
        Ok(Outcome::Applied)
    }

    /// Remove the pet, leaving the store with no pet.
    ///
    /// Always rewrites the slot, so repeated calls are harmless. Reports
    /// `Outcome::NoPet` if there was nothing to remove.
    pub fn clear(&mut self) -> Result<Outcome> {
        let outcome = match self.pet.take() {
            Some(pet) => {
                info!(id = %pet.id(), name = pet.name(), "cleared pet");
                self.emit(Event::Cleared);
                Outcome::Applied
            }
            None => Outcome::NoPet,
        };
        self.commit()?;
        Ok(outcome)
    }

    /// Replace the pet with a fresh default one.
    pub fn reinitialize(&mut self) -> Result<PetId> {
        let name = self.default_name.clone();
        let appearance = self.default_appearance.clone();
        self.create_pet(name, appearance)
    }

    /// Write the current state to the slot.
    fn commit(&self) -> Result<()> {
        let written = codec::encode(self.pet.as_ref())
            .and_then(|raw| self.storage.save(&self.key, &raw));

        if let Err(e) = &written {
            warn!(key = %self.key, error = %e, "failed to persist pet state");
            self.emit(Event::persist_failed(e));
        }
        written
    }

    fn emit(&self, event: Event) {
        if let Some(events) = &self.events {
            if let Err(e) = events.try_send(event) {
                debug!(error = %e, "dropping pet event");
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn pet_mut(&mut self) -> Option<&mut Pet> {
        self.pet.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::Error;
    use crate::event;
    use crate::pet::PetStats;
    use crate::storage::MemoryStorage;
    use chrono::TimeZone;
    use std::path::PathBuf;
    use std::time::Duration;

    /// Storage that refuses every write.
    #[derive(Debug)]
    struct FullStorage;

    impl Storage for FullStorage {
        fn load(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn save(&self, key: &str, _value: &str) -> Result<()> {
            Err(Error::StorageWrite {
                path: PathBuf::from(format!("{}.json", key)),
                source: std::io::Error::new(std::io::ErrorKind::Other, "no space left"),
            })
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    fn setup() -> (PetStore, MemoryStorage, ManualClock) {
        let storage = MemoryStorage::new();
        let clock = ManualClock::new(start());
        let store = PetStore::load(Arc::new(storage.clone()), Arc::new(clock.clone()));
        (store, storage, clock)
    }

    fn with_stats(store: &mut PetStore, energy: i64, hunger: i64, happiness: i64) {
        store.pet_mut().unwrap().stats = PetStats::clamped(energy, hunger, happiness);
    }

    fn stored(storage: &MemoryStorage) -> Option<Pet> {
        let raw = storage.load(STORAGE_KEY).unwrap().expect("slot should be written");
        codec::decode(&raw).unwrap()
    }

    #[test]
    fn test_starts_empty_without_slot() {
        let (store, _storage, _clock) = setup();
        assert!(store.pet().is_none());
        assert!(!store.has_pet());
    }

    #[test]
    fn test_create_pet_full_stats_and_persisted() {
        let (mut store, storage, _clock) = setup();
        let id = store.create_pet("Fluffy", "🐱").unwrap();

        let pet = store.pet().unwrap();
        assert_eq!(pet.id(), id);
        assert_eq!(pet.name(), "Fluffy");
        assert_eq!(pet.stats(), PetStats::FULL);
        assert_eq!(pet.created_at(), start());
        assert_eq!(pet.created_at(), pet.last_interaction_at());

        assert_eq!(stored(&storage).as_ref(), Some(pet));
    }

    #[test]
    fn test_create_pet_overwrites_existing() {
        let (mut store, _storage, _clock) = setup();
        let first = store.create_pet("Fluffy", "🐱").unwrap();
        with_stats(&mut store, 10, 10, 10);

        let second = store.create_pet("Rex", "🐶").unwrap();
        assert_ne!(first, second);
        let pet = store.pet().unwrap();
        assert_eq!(pet.name(), "Rex");
        assert_eq!(pet.stats(), PetStats::FULL);
    }

    #[test]
    fn test_feed_from_half_hunger() {
        let (mut store, _storage, _clock) = setup();
        store.create_pet("Fluffy", "🐱").unwrap();
        with_stats(&mut store, 50, 50, 50);

        assert_eq!(store.feed().unwrap(), Outcome::Applied);
        let stats = store.pet().unwrap().stats();
        assert_eq!(stats.hunger.value(), 70);
        assert_eq!(stats.energy.value(), 60);
        assert_eq!(stats.happiness.value(), 50);
    }

    #[test]
    fn test_feed_clamps_at_max() {
        let (mut store, _storage, _clock) = setup();
        store.create_pet("Fluffy", "🐱").unwrap();
        with_stats(&mut store, 95, 95, 50);

        store.feed().unwrap();
        let stats = store.pet().unwrap().stats();
        assert_eq!(stats.hunger.value(), 100);
        assert_eq!(stats.energy.value(), 100);
    }

    #[test]
    fn test_feed_at_full_still_touches_and_persists() {
        let (mut store, storage, clock) = setup();
        store.create_pet("Fluffy", "🐱").unwrap();
        clock.advance(Duration::from_secs(5));

        store.feed().unwrap();
        let pet = store.pet().unwrap();
        assert_eq!(pet.stats(), PetStats::FULL);
        assert_eq!(pet.last_interaction_at(), clock.now());
        assert_eq!(
            stored(&storage).unwrap().last_interaction_at(),
            clock.now()
        );
    }

    #[test]
    fn test_play() {
        let (mut store, _storage, _clock) = setup();
        store.create_pet("Fluffy", "🐱").unwrap();
        with_stats(&mut store, 50, 80, 50);

        store.play().unwrap();
        let stats = store.pet().unwrap().stats();
        assert_eq!(stats.happiness.value(), 65);
        assert_eq!(stats.energy.value(), 40);
        assert_eq!(stats.hunger.value(), 80);
    }

    #[test]
    fn test_play_never_drives_energy_negative() {
        let (mut store, _storage, _clock) = setup();
        store.create_pet("Fluffy", "🐱").unwrap();
        with_stats(&mut store, 5, 100, 100);

        for _ in 0..3 {
            store.play().unwrap();
        }
        let stats = store.pet().unwrap().stats();
        assert_eq!(stats.energy.value(), 0);
        assert_eq!(stats.happiness.value(), 100);
    }

    #[test]
    fn test_affection() {
        let (mut store, _storage, _clock) = setup();
        store.create_pet("Fluffy", "🐱").unwrap();
        with_stats(&mut store, 50, 50, 50);

        store.affection().unwrap();
        assert_eq!(store.pet().unwrap().stats().happiness.value(), 60);
    }

    #[test]
    fn test_interactions_without_pet_are_noops() {
        let (mut store, storage, _clock) = setup();

        assert_eq!(store.feed().unwrap(), Outcome::NoPet);
        assert_eq!(store.play().unwrap(), Outcome::NoPet);
        assert_eq!(store.affection().unwrap(), Outcome::NoPet);
        assert_eq!(store.apply_decay(start()).unwrap(), Outcome::NoPet);

        assert!(store.pet().is_none());
        assert!(storage.load(STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_decay_from_full() {
        let (mut store, _storage, clock) = setup();
        store.create_pet("Fluffy", "🐱").unwrap();

        store.apply_decay(clock.now()).unwrap();
        let stats = store.pet().unwrap().stats();
        assert_eq!(stats.hunger.value(), 97);
        assert_eq!(stats.happiness.value(), 98);
        assert_eq!(stats.energy.value(), 99);
    }

    #[test]
    fn test_decay_adds_loneliness_penalty() {
        let (mut store, _storage, clock) = setup();
        store.create_pet("Fluffy", "🐱").unwrap();
        let now = clock.now();
        store
            .pet_mut()
            .unwrap()
            .set_last_interaction_at(now - chrono::TimeDelta::milliseconds(40_000));

        store.apply_decay(now).unwrap();
        let stats = store.pet().unwrap().stats();
        assert_eq!(stats.happiness.value(), 96);
        assert_eq!(stats.hunger.value(), 97);
        assert_eq!(stats.energy.value(), 99);
    }

    #[test]
    fn test_loneliness_threshold_is_strict() {
        let (mut store, _storage, clock) = setup();
        store.create_pet("Fluffy", "🐱").unwrap();

        clock.advance(Duration::from_millis(30_000));
        store.apply_decay(clock.now()).unwrap();
        assert_eq!(store.pet().unwrap().stats().happiness.value(), 98);

        clock.advance(Duration::from_millis(1));
        store.apply_decay(clock.now()).unwrap();
        assert_eq!(store.pet().unwrap().stats().happiness.value(), 94);
    }

    #[test]
    fn test_decay_does_not_touch_last_interaction() {
        let (mut store, _storage, clock) = setup();
        store.create_pet("Fluffy", "🐱").unwrap();
        let before = store.pet().unwrap().last_interaction_at();

        clock.advance(Duration::from_secs(10));
        store.apply_decay(clock.now()).unwrap();
        assert_eq!(store.pet().unwrap().last_interaction_at(), before);
    }

    #[test]
    fn test_decay_floors_at_zero() {
        let (mut store, _storage, clock) = setup();
        store.create_pet("Fluffy", "🐱").unwrap();
        with_stats(&mut store, 0, 2, 1);

        for _ in 0..3 {
            clock.advance(Duration::from_secs(10));
            store.apply_decay(clock.now()).unwrap();
        }
        let stats = store.pet().unwrap().stats();
        assert_eq!(stats.hunger.value(), 0);
        assert_eq!(stats.happiness.value(), 0);
        assert_eq!(stats.energy.value(), 0);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (mut store, storage, _clock) = setup();
        store.create_pet("Fluffy", "🐱").unwrap();

        assert_eq!(store.clear().unwrap(), Outcome::Applied);
        assert!(store.pet().is_none());
        assert!(stored(&storage).is_none());

        assert_eq!(store.clear().unwrap(), Outcome::NoPet);
        assert!(store.pet().is_none());
        assert!(stored(&storage).is_none());
    }

    #[test]
    fn test_reinitialize_gives_default_pet() {
        let (mut store, storage, _clock) = setup();
        store.create_pet("Rex", "🐶").unwrap();
        with_stats(&mut store, 1, 1, 1);

        let first = store.reinitialize().unwrap();
        let second = store.reinitialize().unwrap();
        assert_ne!(first, second);

        let pet = store.pet().unwrap();
        assert_eq!(pet.name(), DEFAULT_NAME);
        assert_eq!(pet.appearance(), DEFAULT_APPEARANCE);
        assert_eq!(pet.stats(), PetStats::FULL);
        assert_eq!(stored(&storage).unwrap().id(), second);
    }

    #[test]
    fn test_reinitialize_uses_config_defaults() {
        let config = Config::new().default_name("Rex").default_appearance("🐶");
        let mut store = PetStore::load_with_config(
            &config,
            Arc::new(MemoryStorage::new()),
            Arc::new(ManualClock::new(start())),
        );

        store.reinitialize().unwrap();
        let pet = store.pet().unwrap();
        assert_eq!(pet.name(), "Rex");
        assert_eq!(pet.appearance(), "🐶");
    }

    #[test]
    fn test_restores_from_slot() {
        let (mut store, storage, clock) = setup();
        store.create_pet("Fluffy", "🐱").unwrap();
        store.play().unwrap();
        let before = store.pet().cloned();

        let reloaded = PetStore::load(Arc::new(storage), Arc::new(clock));
        assert_eq!(reloaded.pet().cloned(), before);
    }

    #[test]
    fn test_malformed_slot_starts_empty() {
        let storage = MemoryStorage::new();
        storage
            .save(STORAGE_KEY, r#"{"state":{"pet":{"name":"half"}},"version":0}"#)
            .unwrap();

        let store = PetStore::load(Arc::new(storage), Arc::new(ManualClock::new(start())));
        assert!(store.pet().is_none());
    }

    #[test]
    fn test_persist_failure_keeps_in_memory_state() {
        let mut store = PetStore::load(Arc::new(FullStorage), Arc::new(ManualClock::new(start())));

        let err = store.create_pet("Fluffy", "🐱").unwrap_err();
        assert!(matches!(err, Error::StorageWrite { .. }));
        assert!(store.has_pet());

        with_stats(&mut store, 50, 50, 50);
        assert!(store.feed().is_err());
        assert_eq!(store.pet().unwrap().stats().hunger.value(), 70);
    }

    #[tokio::test]
    async fn test_events_emitted() {
        let (tx, mut rx) = event::channel();
        let (store, _storage, clock) = setup();
        let mut store = store.with_events(tx);

        let id = store.create_pet("Fluffy", "🐱").unwrap();
        store.feed().unwrap();
        store.apply_decay(clock.now()).unwrap();
        store.clear().unwrap();
        drop(store);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert_eq!(
            events[0],
            Event::Created {
                id,
                name: "Fluffy".to_string()
            }
        );
        assert!(matches!(
            events[1],
            Event::Interacted {
                interaction: Interaction::Feed,
                ..
            }
        ));
        assert!(matches!(events[2], Event::Decayed { lonely: false, .. }));
        assert_eq!(events[3], Event::Cleared);
        assert_eq!(events.len(), 4);
    }

    #[tokio::test]
    async fn test_persist_failure_emits_event() {
        let (tx, mut rx) = event::channel();
        let mut store = PetStore::load(Arc::new(FullStorage), Arc::new(ManualClock::new(start())))
            .with_events(tx);

        let _ = store.create_pet("Fluffy", "🐱");
        drop(store);

        assert!(matches!(rx.recv().await, Some(Event::Created { .. })));
        assert!(matches!(rx.recv().await, Some(Event::PersistFailed { .. })));
    }
}
