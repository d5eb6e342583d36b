//! Parsing of a single room file.
//!
//! A room file is a YAML metadata block fenced by `---` lines followed by a
//! Markdown body:
//!
//! ```text
//! ---
//! north: hall
//! items:
//!   tangible:
//!     - name: coin
//!       description: A *shiny* coin.
//! ---
//! You are in a small room.
//! ```
//!
//! The metadata is decoded into a `serde_yaml::Value` first and walked by hand
//! so that shape errors (a list where a mapping belongs, and so on) can name
//! the room and item they occur in.

use std::fmt;

use log::debug;
use serde::{Deserialize, de};
use serde_yaml::Value;

use crate::action::ActionCompiler;
use crate::config::ProjectConfig;
use crate::markdown::MarkdownOptions;
use crate::model::{
    Item, ItemError, ItemFields, RawAmount, Room, RoomError, RoomFields, UsedWith, UsedWithError, UsedWithFields,
};

/// Split `text` into its metadata and body.
///
/// The first line must be `---`; the metadata runs up to the next `---` line.
/// Returns `None` when either fence is missing.
pub fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != "---" {
        return None;
    }
    let start = first.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == "---" {
            return Some((&text[start..offset], &text[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Whether an item is carried by the player or fixed in the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Tangible,
    Intangible,
}

impl ItemKind {
    fn key(self) -> &'static str {
        match self {
            ItemKind::Tangible => "tangible",
            ItemKind::Intangible => "intangible",
        }
    }

    fn not_a_list(self, room: &str) -> RoomError {
        let name = room.to_string();
        match self {
            ItemKind::Tangible => RoomError::TangibleNotAList { name },
            ItemKind::Intangible => RoomError::IntangibleNotAList { name },
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RoomFileError {
    #[error("Missing `---` metadata block in room `{room}`")]
    MissingFrontmatter { room: String },
    #[error("Invalid metadata in room `{room}`")]
    Metadata {
        room: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Could not parse {kind} item in room `{room}`")]
    InvalidItem {
        kind: ItemKind,
        room: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Could not parse {kind} item in room `{room}`")]
    Item {
        kind: ItemKind,
        room: String,
        #[source]
        source: ItemError,
    },
    #[error("Could not parse used_with item for {kind} item `{item}` in room `{room}`")]
    InvalidUsedWith {
        kind: ItemKind,
        item: String,
        room: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Could not parse used_with item for {kind} item `{item}` in room `{room}`")]
    UsedWith {
        kind: ItemKind,
        item: String,
        room: String,
        #[source]
        source: UsedWithError,
    },
    #[error("Could not parse room `{room}`")]
    Room {
        room: String,
        #[source]
        source: RoomError,
    },
}

/// A name written as any YAML scalar, so `north: 2` links to `rooms/2.md`.
///
/// Sequences and mappings still fail to decode.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum ScalarName {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<ScalarName> for String {
    fn from(name: ScalarName) -> Self {
        match name {
            ScalarName::Text(s) => s,
            ScalarName::Int(n) => n.to_string(),
            ScalarName::Float(f) => f.to_string(),
            ScalarName::Bool(b) => b.to_string(),
        }
    }
}

fn name_of(raw: Option<ScalarName>) -> Option<String> {
    raw.map(String::from)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFrontmatter {
    north: Option<ScalarName>,
    east: Option<ScalarName>,
    south: Option<ScalarName>,
    west: Option<ScalarName>,
    up: Option<ScalarName>,
    down: Option<ScalarName>,
    items: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    name: Option<ScalarName>,
    description: Option<String>,
    amount: Option<RawAmount>,
    visible: Option<bool>,
    effect: Option<String>,
    used_with: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawUsedWith {
    name: Option<ScalarName>,
    effect_message: Option<String>,
    consumes_subject: Option<bool>,
    consumes_object: Option<bool>,
    actions: Option<Value>,
}

/// Builds [`Room`]s from room-file text.
#[derive(Debug, Clone, Default)]
pub struct RoomParser {
    actions: ActionCompiler,
}

impl RoomParser {
    pub fn new(markdown: MarkdownOptions) -> Self {
        Self {
            actions: ActionCompiler::new(markdown),
        }
    }

    pub fn from_config(config: &ProjectConfig) -> Self {
        Self::new(config.markdown)
    }

    fn markdown(&self) -> &MarkdownOptions {
        self.actions.markdown()
    }

    /// Parse the room called `room_name` from the full text of its file.
    ///
    /// # Errors
    /// Returns [`RoomFileError`] naming the room, plus the item or used-with
    /// entry when the failure is inside one.
    pub fn parse(&self, text: &str, room_name: &str) -> Result<Room, RoomFileError> {
        let (yaml, body) = split_frontmatter(text).ok_or_else(|| RoomFileError::MissingFrontmatter {
            room: room_name.to_string(),
        })?;
        let meta = parse_metadata(yaml).map_err(|source| RoomFileError::Metadata {
            room: room_name.to_string(),
            source,
        })?;

        let (tangible_items, intangible_items) = self.parse_items(meta.items.as_ref(), room_name)?;
        debug!(
            "room '{room_name}': {} tangible, {} intangible item(s)",
            tangible_items.len(),
            intangible_items.len()
        );

        Room::new(RoomFields {
            name: room_name.to_string(),
            description: self.markdown().render(body),
            north: name_of(meta.north),
            east: name_of(meta.east),
            south: name_of(meta.south),
            west: name_of(meta.west),
            up: name_of(meta.up),
            down: name_of(meta.down),
            tangible_items,
            intangible_items,
        })
        .map_err(|source| room_error(room_name, source))
    }

    fn parse_items(&self, items: Option<&Value>, room: &str) -> Result<(Vec<Item>, Vec<Item>), RoomFileError> {
        let items = match items {
            None | Some(Value::Null) => return Ok((Vec::new(), Vec::new())),
            Some(Value::Mapping(map)) => map,
            Some(_) => {
                return Err(room_error(room, RoomError::ItemsNotAMapping { name: room.to_string() }));
            },
        };
        let tangible = self.parse_item_list(items.get(ItemKind::Tangible.key()), ItemKind::Tangible, room)?;
        let intangible = self.parse_item_list(items.get(ItemKind::Intangible.key()), ItemKind::Intangible, room)?;
        Ok((tangible, intangible))
    }

    fn parse_item_list(&self, list: Option<&Value>, kind: ItemKind, room: &str) -> Result<Vec<Item>, RoomFileError> {
        let entries = match list {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Sequence(seq)) => seq,
            Some(_) => return Err(room_error(room, kind.not_a_list(room))),
        };
        entries
            .iter()
            .map(|entry| {
                if !entry.is_mapping() {
                    return Err(room_error(
                        room,
                        RoomError::ItemWrongType {
                            entry: describe(entry),
                            name: room.to_string(),
                        },
                    ));
                }
                self.parse_item(entry, kind, room)
            })
            .collect()
    }

    fn parse_item(&self, entry: &Value, kind: ItemKind, room: &str) -> Result<Item, RoomFileError> {
        let raw: RawItem = serde_yaml::from_value(entry.clone()).map_err(|source| RoomFileError::InvalidItem {
            kind,
            room: room.to_string(),
            source,
        })?;
        let name = name_of(raw.name);
        let item_name = name.clone().unwrap_or_default();
        let item_error = |source: ItemError| RoomFileError::Item {
            kind,
            room: room.to_string(),
            source,
        };

        let used_with_entries = match &raw.used_with {
            None | Some(Value::Null) => &[][..],
            Some(Value::Sequence(seq)) => seq.as_slice(),
            Some(_) => return Err(item_error(ItemError::UsedWithNotAList { name: item_name })),
        };
        let mut used_with = Vec::with_capacity(used_with_entries.len());
        for uw in used_with_entries {
            if !uw.is_mapping() {
                return Err(item_error(ItemError::UsedWithWrongType {
                    entry: describe(uw),
                    name: item_name,
                }));
            }
            used_with.push(self.parse_used_with(uw, kind, &item_name, room)?);
        }

        Item::new(ItemFields {
            name,
            description: raw.description.map(|d| self.markdown().render(&d)),
            amount: raw.amount,
            visible: raw.visible,
            effect: raw.effect,
            used_with,
        })
        .map_err(item_error)
    }

    fn parse_used_with(
        &self,
        entry: &Value,
        kind: ItemKind,
        item: &str,
        room: &str,
    ) -> Result<UsedWith, RoomFileError> {
        let raw: RawUsedWith =
            serde_yaml::from_value(entry.clone()).map_err(|source| RoomFileError::InvalidUsedWith {
                kind,
                item: item.to_string(),
                room: room.to_string(),
                source,
            })?;
        let used_with_error = |source: UsedWithError| RoomFileError::UsedWith {
            kind,
            item: item.to_string(),
            room: room.to_string(),
            source,
        };
        let name = name_of(raw.name);
        let uw_name = name.clone().unwrap_or_default();

        let actions = match raw.actions {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(seq)) => seq
                .into_iter()
                .map(|action| match action {
                    Value::String(s) => Ok(s),
                    other => Err(UsedWithError::ActionWrongType {
                        entry: describe(&other),
                        name: uw_name.clone(),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()
                .map_err(used_with_error)?,
            Some(_) => return Err(used_with_error(UsedWithError::ActionsNotAList { name: uw_name })),
        };

        UsedWith::new(
            UsedWithFields {
                name,
                effect_message: raw.effect_message.map(|m| self.markdown().render(&m)),
                consumes_subject: raw.consumes_subject,
                consumes_object: raw.consumes_object,
                actions,
            },
            &self.actions,
        )
        .map_err(used_with_error)
    }
}

fn parse_metadata(yaml: &str) -> Result<RawFrontmatter, serde_yaml::Error> {
    let blank = yaml.lines().all(|l| {
        let l = l.trim();
        l.is_empty() || l.starts_with('#')
    });
    if blank {
        return Ok(RawFrontmatter::default());
    }
    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Null => Ok(RawFrontmatter::default()),
        value @ Value::Mapping(_) => serde_yaml::from_value(value),
        _ => Err(de::Error::custom("metadata should be a mapping")),
    }
}

fn room_error(room: &str, source: RoomError) -> RoomFileError {
    RoomFileError::Room {
        room: room.to_string(),
        source,
    }
}

/// Short single-line rendering of a YAML value for error messages.
fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().replace('\n', " "))
            .unwrap_or_else(|_| format!("{other:?}")),
    }
}
