//! Document encoding at the storage boundary.
//!
//! Documents are stored as JSON text columns; the rest of the crate only sees
//! decoded domain types.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::ServerError;

pub fn encode_doc<T: Serialize>(doc: &T) -> Result<String, ServerError> {
    Ok(serde_json::to_string(doc)?)
}

pub fn decode_doc<T: DeserializeOwned>(raw: &str) -> Result<T, ServerError> {
    Ok(serde_json::from_str(raw)?)
}
