//! The success/failure wrapper handed to callers.
//!
//! Serializes as `{"success": true, "data": ...}` or
//! `{"success": false, "error": "..."}`.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Result of one gateway call.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T = Value> {
    Success(T),
    Failure(String),
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Envelope::Success(data)
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Envelope::Failure(error.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Envelope::Success(data) => Some(data),
            Envelope::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Envelope::Success(_) => None,
            Envelope::Failure(error) => Some(error),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            Envelope::Success(data) => Ok(data),
            Envelope::Failure(error) => Err(error),
        }
    }

    /// Convert the payload, keeping failures as they are.
    pub fn and_then<U, F>(self, f: F) -> Envelope<U>
    where
        F: FnOnce(T) -> Envelope<U>,
    {
        match self {
            Envelope::Success(data) => f(data),
            Envelope::Failure(error) => Envelope::Failure(error),
        }
    }
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Envelope", 2)?;
        match self {
            Envelope::Success(data) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
            }
            Envelope::Failure(error) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
            }
        }
        state.end()
    }
}
