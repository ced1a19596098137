//! Line model. A line belongs to at most one board (nullable foreign key);
//! responses nest the referenced board.

use serde::{Deserialize, Serialize};

use super::{Board, Identified};

/// A persisted line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<Board>,
}

/// A line draft, not yet persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<Board>,
}

/// Reference to a line by identifier, as embedded in a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRef {
    pub id: i64,
}

/// Request body accepted by the line write endpoints. Only the identifier of
/// the nested board reference is consulted; other nested fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<BoardRef>,
}

/// Reference to a board by identifier, as embedded in a line payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardRef {
    pub id: i64,
}

impl Identified for Line {
    fn identifier(&self) -> Option<i64> {
        Some(self.id)
    }
}

impl Identified for LineRef {
    fn identifier(&self) -> Option<i64> {
        Some(self.id)
    }
}

impl Identified for LinePayload {
    fn identifier(&self) -> Option<i64> {
        self.id
    }
}

impl From<LineRef> for Line {
    /// A bare reference widened to a line with only its identifier set, so a
    /// card's current line can be offered in a picker even when the full
    /// record was not part of the fetched page.
    fn from(r: LineRef) -> Self {
        Line {
            id: r.id,
            title: None,
            board: None,
        }
    }
}
