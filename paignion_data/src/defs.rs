use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Room name used as the key of the compiled game data.
pub type RoomName = String;

/// Top-level compiled game data handed to the runtime engine.
///
/// Keyed by room name; a `BTreeMap` keeps the emitted JSON stable between builds.
pub type GameData = BTreeMap<RoomName, RoomDef>;

/// Name of the room the player starts in.
pub const ORIGIN_ROOM: &str = "origin";

/// The six directions a room may link to, in emission order.
pub const DIRECTIONS: [&str; 6] = ["north", "east", "south", "west", "up", "down"];

/// Room record as seen by the runtime through `getRoomOrItem`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDef {
    #[serde(default)]
    pub north: Option<RoomName>,
    #[serde(default)]
    pub east: Option<RoomName>,
    #[serde(default)]
    pub south: Option<RoomName>,
    #[serde(default)]
    pub west: Option<RoomName>,
    #[serde(default)]
    pub up: Option<RoomName>,
    #[serde(default)]
    pub down: Option<RoomName>,
    pub description: String,
    #[serde(default)]
    pub items: ItemsDef,
}

impl RoomDef {
    /// Iterate over `(direction, target)` pairs for every link that is set.
    pub fn exits(&self) -> impl Iterator<Item = (&'static str, &str)> {
        DIRECTIONS
            .into_iter()
            .zip([&self.north, &self.east, &self.south, &self.west, &self.up, &self.down])
            .filter_map(|(dir, to)| to.as_deref().map(|to| (dir, to)))
    }
}

/// Items held by a room, split by whether the player can carry them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemsDef {
    #[serde(default)]
    pub tangible: Vec<ItemDef>,
    #[serde(default)]
    pub intangible: Vec<ItemDef>,
}

/// Item record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Amount,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub effect: Option<String>,
    #[serde(default)]
    pub used_with: Vec<UsedWithDef>,
}

fn default_visible() -> bool {
    true
}

/// What happens when an item is used with another named item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedWithDef {
    pub name: String,
    pub effect_message: String,
    #[serde(default)]
    pub consumes_subject: bool,
    #[serde(default)]
    pub consumes_object: bool,
    /// Compiled statements, concatenated and ready for the runtime to evaluate.
    #[serde(default)]
    pub actions: String,
}

/// How many instances of an item exist: a positive count, or unlimited.
///
/// Serialized as a JSON integer, or as the string `"inf"` when unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amount {
    Count(u64),
    Unlimited,
}

impl Amount {
    /// Sentinel spelling of an unlimited amount.
    pub const UNLIMITED: &'static str = "inf";
}

impl Default for Amount {
    fn default() -> Self {
        Amount::Count(1)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Count(n) => write!(f, "{n}"),
            Amount::Unlimited => f.write_str(Amount::UNLIMITED),
        }
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Amount::Count(n) => serializer.serialize_u64(*n),
            Amount::Unlimited => serializer.serialize_str(Amount::UNLIMITED),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl Visitor<'_> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a positive integer or \"inf\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
                if v == 0 {
                    return Err(E::invalid_value(de::Unexpected::Unsigned(v), &self));
                }
                Ok(Amount::Count(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
                match u64::try_from(v) {
                    Ok(v) => self.visit_u64(v),
                    Err(_) => Err(E::invalid_value(de::Unexpected::Signed(v), &self)),
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
                if v == Amount::UNLIMITED {
                    Ok(Amount::Unlimited)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(description: &str) -> RoomDef {
        RoomDef {
            north: None,
            east: Some("hall".into()),
            south: None,
            west: None,
            up: Some("attic".into()),
            down: None,
            description: description.into(),
            items: ItemsDef::default(),
        }
    }

    #[test]
    fn exits_only_lists_set_directions_in_order() {
        let room = room("<p>Cellar</p>");
        let exits: Vec<_> = room.exits().collect();
        assert_eq!(exits, vec![("east", "hall"), ("up", "attic")]);
    }

    #[test]
    fn amount_serializes_as_number_or_sentinel() {
        assert_eq!(serde_json::to_string(&Amount::Count(3)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&Amount::Unlimited).unwrap(), "\"inf\"");
    }

    #[test]
    fn amount_rejects_zero_and_unknown_strings() {
        assert!(serde_json::from_str::<Amount>("0").is_err());
        assert!(serde_json::from_str::<Amount>("-4").is_err());
        assert!(serde_json::from_str::<Amount>("\"lots\"").is_err());
        assert_eq!(serde_json::from_str::<Amount>("\"inf\"").unwrap(), Amount::Unlimited);
    }

    #[test]
    fn room_dump_round_trips_through_json() {
        let mut def = room("<p>Cellar</p>");
        def.items.tangible.push(ItemDef {
            name: "coin".into(),
            description: Some("<p>Shiny.</p>".into()),
            amount: Amount::Unlimited,
            visible: true,
            effect: None,
            used_with: vec![UsedWithDef {
                name: "slot".into(),
                effect_message: "<p>Clink.</p>".into(),
                consumes_subject: true,
                consumes_object: false,
                actions: "getRoomOrItem(\"slot\")[\"amount\"] += 1;".into(),
            }],
        });
        let json = serde_json::to_string(&def).unwrap();
        let back: RoomDef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, def);
    }

    #[test]
    fn room_dump_uses_runtime_key_names() {
        let value = serde_json::to_value(room("<p>Cellar</p>")).unwrap();
        assert_eq!(value["east"], "hall");
        assert!(value["north"].is_null());
        assert!(value["items"]["tangible"].as_array().unwrap().is_empty());
        assert!(value["items"]["intangible"].as_array().unwrap().is_empty());
    }
}
