//! Persisted layout of the pet slot.
//!
//! ```json
//! {"state":{"pet":{"id":"…","name":"Fluffy","emoji":"🐱",
//!   "stats":{"energy":100,"hunger":100,"happiness":100},
//!   "createdAt":1700000000000,"lastInteraction":1700000000000}},
//!  "version":0}
//! ```
//!
//! `pet` is `null` when there is no pet. The layout is the authoritative
//! format; loading never catches up on decay for time spent offline.

use crate::error::{Error, Result};
use crate::pet::Pet;
use serde::{Deserialize, Serialize};

/// Name of the slot holding the pet state.
pub const STORAGE_KEY: &str = "pet-storage";

/// Layout version written by this build.
pub const FORMAT_VERSION: u32 = 0;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<P> {
    state: PetState<P>,
    #[serde(default)]
    version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct PetState<P> {
    pet: Option<P>,
}

/// Serialize the pet-or-absent state into the slot layout.
pub fn encode(pet: Option<&Pet>) -> Result<String> {
    let envelope = Envelope {
        state: PetState { pet },
        version: FORMAT_VERSION,
    };
    serde_json::to_string(&envelope).map_err(|source| Error::Encode { source })
}

/// Parse a slot back into the pet-or-absent state.
///
/// # Errors
///
/// Returns `Error::Decode` for malformed JSON, missing fields, non-integer
/// or out-of-range stats, and malformed ids. Returns `Error::InvalidPet`
/// for a layout version newer than this build understands.
pub fn decode(raw: &str) -> Result<Option<Pet>> {
    let envelope: Envelope<Pet> =
        serde_json::from_str(raw).map_err(|source| Error::Decode { source })?;

    if envelope.version > FORMAT_VERSION {
        return Err(Error::invalid_pet(format!(
            "stored layout version {} is newer than supported version {}",
            envelope.version, FORMAT_VERSION
        )));
    }

    Ok(envelope.state.pet)
}
