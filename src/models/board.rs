//! Board model. A board owns zero or more lines; the inverse side is not
//! modeled on the wire.

use serde::{Deserialize, Serialize};

use super::Identified;

/// A persisted board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A board draft, not yet persisted. The backend assigns the identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBoard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Request body accepted by the board write endpoints.
///
/// POST requires `id` to be absent, PUT and PATCH require it to match the
/// path. For PATCH, absent fields are left untouched (merge-patch).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoardPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Identified for Board {
    fn identifier(&self) -> Option<i64> {
        Some(self.id)
    }
}

impl Identified for BoardPayload {
    fn identifier(&self) -> Option<i64> {
        self.id
    }
}
