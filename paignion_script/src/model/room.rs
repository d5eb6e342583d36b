use paignion_data::{ItemsDef, RoomDef, RoomName};

use super::Item;

/// Errors raised while building a [`Room`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    #[error("Name missing for room")]
    MissingName,
    #[error("Description missing for room `{name}`")]
    MissingDescription { name: String },
    #[error("Items should be a mapping for room `{name}`")]
    ItemsNotAMapping { name: String },
    #[error("Tangible items should be a list for room `{name}`")]
    TangibleNotAList { name: String },
    #[error("Intangible items should be a list for room `{name}`")]
    IntangibleNotAList { name: String },
    #[error("Item `{entry}` has incorrect type for room `{name}`")]
    ItemWrongType { entry: String, name: String },
}

/// Unvalidated room fields.
///
/// `name` comes from the file stem and `description` is the rendered body.
#[derive(Debug, Clone, Default)]
pub struct RoomFields {
    pub name: String,
    pub description: String,
    pub north: Option<RoomName>,
    pub east: Option<RoomName>,
    pub south: Option<RoomName>,
    pub west: Option<RoomName>,
    pub up: Option<RoomName>,
    pub down: Option<RoomName>,
    pub tangible_items: Vec<Item>,
    pub intangible_items: Vec<Item>,
}

/// A validated room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    name: RoomName,
    description: String,
    north: Option<RoomName>,
    east: Option<RoomName>,
    south: Option<RoomName>,
    west: Option<RoomName>,
    up: Option<RoomName>,
    down: Option<RoomName>,
    tangible_items: Vec<Item>,
    intangible_items: Vec<Item>,
}

impl Room {
    /// # Errors
    /// Returns [`RoomError`] when the name or the description is empty.
    pub fn new(fields: RoomFields) -> Result<Self, RoomError> {
        if fields.name.is_empty() {
            return Err(RoomError::MissingName);
        }
        if fields.description.trim().is_empty() {
            return Err(RoomError::MissingDescription { name: fields.name });
        }
        Ok(Self {
            name: fields.name,
            description: fields.description,
            north: fields.north,
            east: fields.east,
            south: fields.south,
            west: fields.west,
            up: fields.up,
            down: fields.down,
            tangible_items: fields.tangible_items,
            intangible_items: fields.intangible_items,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tangible_items(&self) -> &[Item] {
        &self.tangible_items
    }

    pub fn intangible_items(&self) -> &[Item] {
        &self.intangible_items
    }

    /// The record stored under [`Room::name`] in the game data.
    pub fn dump(&self) -> RoomDef {
        RoomDef {
            north: self.north.clone(),
            east: self.east.clone(),
            south: self.south.clone(),
            west: self.west.clone(),
            up: self.up.clone(),
            down: self.down.clone(),
            description: self.description.clone(),
            items: ItemsDef {
                tangible: self.tangible_items.iter().map(Item::dump).collect(),
                intangible: self.intangible_items.iter().map(Item::dump).collect(),
            },
        }
    }
}
