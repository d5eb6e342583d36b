//! paignion_script: compiler for Paignion room files and actions.
//!
//! A Paignion project is a directory of Markdown room files, each opening
//! with a YAML metadata block that lists exits and items. Items can carry
//! `used_with` interactions whose `actions` are written in a small call
//! language:
//!
//! - `set(key, value, element)`
//! - `add(value, key, element)`
//! - `sub(value, key, element)`
//! - `mul(value, key, element)`
//! - `div(value, key, element)`
//!
//! Each action compiles to a `getRoomOrItem("element")["key"] op value;`
//! statement for the runtime. The whole project compiles to a
//! [`paignion_data::GameData`] map keyed by room name.

pub mod action;
pub mod config;
pub mod markdown;
pub mod model;
pub mod project;
pub mod room_file;

pub use action::{ActionAst, ActionCompiler, ActionError, ActionValue, compile_action};
pub use config::{ConfigError, ProjectConfig};
pub use markdown::{MarkdownOptions, markdownify};
pub use model::{Item, ItemError, Room, RoomError, UsedWith, UsedWithError};
pub use project::{ProjectError, collect_room_files, compile_project, parse_room_files, verify_project_dir};
pub use room_file::{ItemKind, RoomFileError, RoomParser, split_frontmatter};
