use std::fmt;

use crate::*;

/// Lint raised for missing or dangling references in compiled `GameData`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingOrigin,
    MissingReference { kind: &'static str, id: String, context: String },
    InvalidValue { context: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingOrigin => {
                write!(f, "missing origin room '{ORIGIN_ROOM}'")
            },
            ValidationError::MissingReference { kind, id, context } => {
                write!(f, "missing {kind} '{id}' ({context})")
            },
            ValidationError::InvalidValue { context } => {
                write!(f, "invalid value ({context})")
            },
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check cross-references in compiled game data.
///
/// Directional links are resolved by the runtime at play time, so a dangling
/// link is legal data; this only surfaces the likely authoring mistakes.
///
/// ```
/// use paignion_data::{GameData, ItemsDef, RoomDef, validate_game};
///
/// let mut game = GameData::new();
/// game.insert(
///     "origin".into(),
///     RoomDef {
///         north: None,
///         east: None,
///         south: None,
///         west: None,
///         up: None,
///         down: None,
///         description: "<p>Start.</p>".into(),
///         items: ItemsDef::default(),
///     },
/// );
/// assert!(validate_game(&game).is_empty());
/// ```
pub fn validate_game(game: &GameData) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !game.contains_key(ORIGIN_ROOM) {
        errors.push(ValidationError::MissingOrigin);
    }

    for (name, room) in game {
        for (direction, to) in room.exits() {
            if to.trim().is_empty() {
                errors.push(ValidationError::InvalidValue {
                    context: format!("room '{name}' exit '{direction}' is empty"),
                });
                continue;
            }
            if !game.contains_key(to) {
                errors.push(ValidationError::MissingReference {
                    kind: "room",
                    id: to.to_string(),
                    context: format!("room '{name}' exit '{direction}'"),
                });
            }
        }
        check_item_names(name, "tangible", &room.items.tangible, &mut errors);
        check_item_names(name, "intangible", &room.items.intangible, &mut errors);
    }

    errors
}

fn check_item_names(room: &str, kind: &str, items: &[ItemDef], errors: &mut Vec<ValidationError>) {
    for (idx, item) in items.iter().enumerate() {
        if items[..idx].iter().any(|other| other.name == item.name) {
            errors.push(ValidationError::InvalidValue {
                context: format!("room '{room}' lists {kind} item '{}' more than once", item.name),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(links: &[(&str, &str)]) -> RoomDef {
        let mut def = RoomDef {
            north: None,
            east: None,
            south: None,
            west: None,
            up: None,
            down: None,
            description: "<p>Room.</p>".into(),
            items: ItemsDef::default(),
        };
        for (dir, to) in links {
            let slot = match *dir {
                "north" => &mut def.north,
                "east" => &mut def.east,
                "south" => &mut def.south,
                "west" => &mut def.west,
                "up" => &mut def.up,
                _ => &mut def.down,
            };
            *slot = Some((*to).to_string());
        }
        def
    }

    fn item(name: &str) -> ItemDef {
        ItemDef {
            name: name.into(),
            description: Some("<p>Thing.</p>".into()),
            amount: Amount::default(),
            visible: true,
            effect: None,
            used_with: Vec::new(),
        }
    }

    #[test]
    fn consistent_game_has_no_lints() {
        let mut game = GameData::new();
        game.insert("origin".into(), room(&[("east", "hall")]));
        game.insert("hall".into(), room(&[("west", "origin")]));
        assert!(validate_game(&game).is_empty());
    }

    #[test]
    fn reports_missing_origin() {
        let mut game = GameData::new();
        game.insert("hall".into(), room(&[]));
        assert_eq!(validate_game(&game), vec![ValidationError::MissingOrigin]);
    }

    #[test]
    fn reports_dangling_and_empty_links() {
        let mut game = GameData::new();
        game.insert("origin".into(), room(&[("north", "nowhere"), ("down", " ")]));
        let errors = validate_game(&game);
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0],
            ValidationError::MissingReference {
                kind: "room",
                id: "nowhere".into(),
                context: "room 'origin' exit 'north'".into(),
            }
        );
        assert!(errors[1].to_string().contains("exit 'down' is empty"));
    }

    #[test]
    fn reports_duplicate_item_names_per_kind() {
        let mut origin = room(&[]);
        origin.items.tangible = vec![item("coin"), item("coin")];
        origin.items.intangible = vec![item("coin")];
        let mut game = GameData::new();
        game.insert("origin".into(), origin);
        let errors = validate_game(&game);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "invalid value (room 'origin' lists tangible item 'coin' more than once)"
        );
    }
}
