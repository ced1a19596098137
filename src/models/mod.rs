//! Data models for the kanban application.
//!
//! Each entity comes in three shapes: the persisted record (non-null id), the
//! draft used before creation (no id at all), and the payload accepted by the
//! write endpoints (nullable id, every other field optional).

mod board;
mod card;
mod line;

pub use board::*;
pub use card::*;
pub use line::*;

/// Projection of the identifier from anything that carries one.
///
/// Persisted entities always return `Some`; payloads return whatever the
/// caller put in. Identity comparison and collection merging are built on
/// this projection rather than on field access.
pub trait Identified {
    fn identifier(&self) -> Option<i64>;
}
