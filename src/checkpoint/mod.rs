//! Compile and reload machine definitions.
//!
//! A [`Checkpoint`] is the serializable snapshot of an [`Fsm`]: symbols,
//! states, final states, initial/current state and the full transition
//! function. It is written either as a compact binary "compiled" file or as
//! JSON. The [`script`] submodule renders the same definition back into the
//! command language.

use crate::core::{Fsm, StateId, Symbol};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

pub mod error;
pub mod script;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Leading bytes of every binary checkpoint
pub const MAGIC: &[u8; 4] = b"FSMC";

/// On-disk encoding of a checkpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Binary,
    Json,
}

impl Format {
    /// Pick the encoding from a file name.
    ///
    /// `compiled_extension` (without the dot) selects the binary form,
    /// `.json` the JSON form. Anything else is not a checkpoint.
    pub fn for_path(path: &str, compiled_extension: &str) -> Option<Self> {
        let extension = Path::new(path).extension()?.to_str()?;
        if extension.eq_ignore_ascii_case(compiled_extension) {
            Some(Self::Binary)
        } else if extension.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else {
            None
        }
    }
}

/// One entry of the transition function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub symbol: Symbol,
    pub from: StateId,
    pub to: StateId,
}

/// Serializable snapshot of a machine definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: Uuid,

    /// When checkpoint was created
    pub created_at: DateTime<Utc>,

    pub symbols: Vec<Symbol>,

    /// States in declaration order
    pub states: Vec<StateId>,

    pub final_states: Vec<StateId>,

    pub initial_state: Option<StateId>,

    pub current_state: Option<StateId>,

    pub transitions: Vec<TransitionRecord>,
}

impl Checkpoint {
    /// Snapshot the full definition of `fsm`.
    pub fn capture(fsm: &Fsm) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            symbols: fsm.symbols().copied().collect(),
            states: fsm.states().to_vec(),
            final_states: fsm.final_states().cloned().collect(),
            initial_state: fsm.initial_state().cloned(),
            current_state: fsm.current_state().cloned(),
            transitions: fsm
                .transitions()
                .map(|(key, to)| TransitionRecord {
                    symbol: key.symbol,
                    from: key.from.clone(),
                    to: to.clone(),
                })
                .collect(),
        }
    }

    /// Rebuild a machine from this snapshot.
    ///
    /// Every state referenced as initial, current, final or transition
    /// endpoint must appear in the state list, and every transition symbol
    /// in the symbol list. Duplicate entries are rejected rather than
    /// merged, so the warnings of the rebuild steps are always empty.
    pub fn restore(&self) -> Result<Fsm, CheckpointError> {
        self.validate()?;

        let mut fsm = Fsm::new();
        let invalid = |e: crate::core::FsmError| CheckpointError::ValidationFailed(e.to_string());

        for symbol in &self.symbols {
            fsm.add_symbol(&symbol.to_string()).map_err(invalid)?;
        }
        for state in &self.states {
            fsm.add_state(state.as_str()).map_err(invalid)?;
        }
        if let Some(initial) = &self.initial_state {
            fsm.set_initial_state(initial.as_str()).map_err(invalid)?;
        }
        for state in &self.final_states {
            fsm.add_final_state(state.as_str()).map_err(invalid)?;
        }
        for t in &self.transitions {
            fsm.add_transition(&t.symbol.to_string(), t.from.as_str(), t.to.as_str())
                .map_err(invalid)?;
        }
        if let Some(current) = &self.current_state {
            fsm.set_current_state(current.as_str()).map_err(invalid)?;
        }
        Ok(fsm)
    }

    fn validate(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }

        if let Some(symbol) = first_duplicate(&self.symbols) {
            return Err(duplicate("symbol", symbol));
        }
        if let Some(state) = first_duplicate(&self.states) {
            return Err(duplicate("state", state));
        }
        if let Some(state) = first_duplicate(&self.final_states) {
            return Err(duplicate("final state", state));
        }
        let mut keys = BTreeSet::new();
        if let Some(t) = self
            .transitions
            .iter()
            .find(|t| !keys.insert((t.symbol, &t.from)))
        {
            return Err(CheckpointError::ValidationFailed(format!(
                "transition <{},{}> is listed more than once",
                t.symbol, t.from
            )));
        }

        let undeclared = |state: &StateId| !self.states.contains(state);
        let mut referenced = self
            .initial_state
            .iter()
            .chain(self.current_state.iter())
            .chain(self.final_states.iter())
            .chain(self.transitions.iter().flat_map(|t| [&t.from, &t.to]));
        if let Some(state) = referenced.find(|s| undeclared(*s)) {
            return Err(CheckpointError::ValidationFailed(format!(
                "state {} is referenced but not declared",
                state
            )));
        }

        if let Some(t) = self
            .transitions
            .iter()
            .find(|t| !self.symbols.contains(&t.symbol))
        {
            return Err(CheckpointError::ValidationFailed(format!(
                "symbol {} is referenced but not declared",
                t.symbol
            )));
        }
        Ok(())
    }

    /// Encode as magic header followed by bincode payload.
    pub fn to_binary(&self) -> Result<Vec<u8>, CheckpointError> {
        let payload = bincode::serialize(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))?;
        let mut bytes = Vec::with_capacity(MAGIC.len() + payload.len());
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let payload = bytes
            .strip_prefix(MAGIC.as_slice())
            .ok_or_else(|| CheckpointError::DeserializationFailed("missing FSM header".into()))?;
        bincode::deserialize(payload)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        serde_json::from_str(json).map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }

    /// Write the checkpoint to `path`.
    ///
    /// The data goes to a sibling temp file first and is renamed into place.
    pub fn save(&self, path: &str, format: Format) -> Result<(), CheckpointError> {
        let bytes = match format {
            Format::Binary => self.to_binary()?,
            Format::Json => self.to_json()?.into_bytes(),
        };

        let temp_path = format!("{}.tmp", path);
        fs::write(&temp_path, bytes).map_err(|e| CheckpointError::file(path, e))?;
        fs::rename(&temp_path, path).map_err(|e| CheckpointError::file(path, e))?;

        info!(path, id = %self.id, ?format, "compiled FSM written");
        Ok(())
    }

    /// Read a checkpoint from `path`.
    ///
    /// Decoding and validation failures are reported as
    /// [`CheckpointError::InvalidFileFormat`].
    pub fn load(path: &str, format: Format) -> Result<Self, CheckpointError> {
        let bytes = fs::read(path).map_err(|e| CheckpointError::file(path, e))?;
        let decoded = match format {
            Format::Binary => Self::from_binary(&bytes),
            Format::Json => std::str::from_utf8(&bytes)
                .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
                .and_then(Self::from_json),
        };
        let checkpoint = decoded.map_err(|e| CheckpointError::InvalidFileFormat {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        info!(
            path,
            id = %checkpoint.id,
            created_at = %checkpoint.created_at,
            "compiled FSM read"
        );
        Ok(checkpoint)
    }

    /// Load `path` and rebuild the machine in one step.
    pub fn load_fsm(path: &str, format: Format) -> Result<Fsm, CheckpointError> {
        Self::load(path, format)?
            .restore()
            .map_err(|e| match e {
                CheckpointError::ValidationFailed(reason) => CheckpointError::InvalidFileFormat {
                    path: path.to_string(),
                    reason,
                },
                other => other,
            })
    }
}

fn first_duplicate<T: Ord>(items: &[T]) -> Option<&T> {
    let mut seen = BTreeSet::new();
    items.iter().find(|item| !seen.insert(*item))
}

fn duplicate(kind: &str, item: impl Display) -> CheckpointError {
    CheckpointError::ValidationFailed(format!("{} {} is listed more than once", kind, item))
}
