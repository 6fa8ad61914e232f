//! Conversion between engine state records and store blobs.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::dialog::{ConversationState, DialogError};
use crate::domain::user::UserState;
use crate::ports::{SessionStoreError, StateBlob, STATE_SCHEMA_VERSION};

impl From<SessionStoreError> for DialogError {
    fn from(err: SessionStoreError) -> Self {
        DialogError::PersistenceFailure(err.to_string())
    }
}

/// A decoded record together with the revision it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub state: T,
    pub revision: u64,
}

impl<T: Default> Loaded<T> {
    fn fresh() -> Self {
        Self {
            state: T::default(),
            revision: 0,
        }
    }
}

pub fn encode<T: Serialize>(state: &T, revision: u64) -> Result<StateBlob, DialogError> {
    let data = serde_json::to_value(state)
        .map_err(|e| DialogError::from(SessionStoreError::SerializationFailed(e.to_string())))?;
    Ok(StateBlob::new(data).at_revision(revision))
}

/// Decodes a blob; a missing blob is a fresh default record.
pub fn decode<T>(blob: Option<StateBlob>) -> Result<Loaded<T>, DialogError>
where
    T: DeserializeOwned + Default,
{
    let Some(blob) = blob else {
        return Ok(Loaded::fresh());
    };
    if blob.schema_version != STATE_SCHEMA_VERSION {
        return Err(DialogError::PersistenceFailure(format!(
            "unsupported schema version {} (expected {})",
            blob.schema_version, STATE_SCHEMA_VERSION
        )));
    }
    let state = serde_json::from_value(blob.data)
        .map_err(|e| DialogError::from(SessionStoreError::DeserializationFailed(e.to_string())))?;
    Ok(Loaded {
        state,
        revision: blob.revision,
    })
}

pub fn decode_conversation(
    blob: Option<StateBlob>,
) -> Result<Loaded<ConversationState>, DialogError> {
    decode(blob)
}

pub fn decode_user(blob: Option<StateBlob>) -> Result<Loaded<UserState>, DialogError> {
    decode(blob)
}
