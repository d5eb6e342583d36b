//! Validated room, item and used-with records.
//!
//! Each record is built once from a loosely-typed `*Fields` struct, checked in its
//! constructor and then only read or dumped into the `paignion_data` defs.

mod item;
mod room;
mod used_with;

pub use item::{Item, ItemError, ItemFields, RawAmount};
pub use room::{Room, RoomError, RoomFields};
pub use used_with::{UsedWith, UsedWithError, UsedWithFields};
