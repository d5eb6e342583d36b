//! Project-level compilation: locate room files, parse them and merge the
//! results into one [`GameData`] map.
//!
//! A project is a directory holding a `rooms/` folder with at least
//! `rooms/origin.md`, and optionally a `paignion.toml`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use paignion_data::{GameData, ORIGIN_ROOM};
use walkdir::WalkDir;

use crate::config::{ConfigError, ProjectConfig};
use crate::room_file::{RoomFileError, RoomParser};

/// Directory, relative to the project root, that holds the room files.
pub const ROOMS_DIR: &str = "rooms";
/// Extension of room files.
pub const ROOM_EXTENSION: &str = "md";

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Rooms directory not found in {0}. Please create the rooms/ directory.")]
    MissingRoomsDir(PathBuf),
    #[error("Origin room (origin.md) not found in {0}. Please create an origin room.")]
    MissingOriginRoom(PathBuf),
    #[error("could not read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not list room files in {path}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("in room file {path}")]
    RoomFile {
        path: PathBuf,
        #[source]
        source: RoomFileError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Check that `project_dir` has a rooms directory containing the origin room.
///
/// # Errors
/// [`ProjectError::MissingRoomsDir`] or [`ProjectError::MissingOriginRoom`].
pub fn verify_project_dir(project_dir: &Path) -> Result<(), ProjectError> {
    let rooms_dir = project_dir.join(ROOMS_DIR);
    if !rooms_dir.is_dir() {
        return Err(ProjectError::MissingRoomsDir(project_dir.to_path_buf()));
    }
    let origin = rooms_dir.join(format!("{ORIGIN_ROOM}.{ROOM_EXTENSION}"));
    if !origin.is_file() {
        return Err(ProjectError::MissingOriginRoom(project_dir.to_path_buf()));
    }
    Ok(())
}

/// List `*.md` files directly inside `rooms_dir`, sorted by path.
///
/// Subdirectories are not searched.
///
/// # Errors
/// Returns [`ProjectError::Walk`] if the directory cannot be read.
pub fn collect_room_files(rooms_dir: &Path) -> Result<Vec<PathBuf>, ProjectError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(rooms_dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| ProjectError::Walk {
            path: rooms_dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == ROOM_EXTENSION) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Room name for a room file: its stem.
pub fn room_name(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Parse `files` in order and merge them into one map.
///
/// A later file replaces an earlier one with the same room name.
///
/// # Errors
/// Stops at the first file that cannot be read or parsed.
pub fn parse_room_files(files: &[PathBuf], parser: &RoomParser) -> Result<GameData, ProjectError> {
    files.iter().try_fold(GameData::new(), |mut game, path| {
        let text = fs::read_to_string(path).map_err(|source| ProjectError::Io {
            path: path.clone(),
            source,
        })?;
        let name = room_name(path);
        let room = parser.parse(&text, &name).map_err(|source| ProjectError::RoomFile {
            path: path.clone(),
            source,
        })?;
        debug!("compiled room '{name}' from {}", path.display());
        if game.insert(name, room.dump()).is_some() {
            warn!("room '{}' defined more than once; {} wins", room.name(), path.display());
        }
        Ok(game)
    })
}

/// Compile the project rooted at `project_dir`.
///
/// Loads `paignion.toml` when present, verifies the layout, then parses every
/// room file.
///
/// # Errors
/// Returns the first [`ProjectError`] encountered.
pub fn compile_project(project_dir: &Path) -> Result<GameData, ProjectError> {
    verify_project_dir(project_dir)?;
    let config = ProjectConfig::load(project_dir)?;
    let parser = RoomParser::from_config(&config);

    let files = collect_room_files(&project_dir.join(ROOMS_DIR))?;
    let game = parse_room_files(&files, &parser)?;
    let items: usize = game
        .values()
        .map(|room| room.items.tangible.len() + room.items.intangible.len())
        .sum();
    info!("compiled {} room(s) with {items} item(s)", game.len());
    Ok(game)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_name_is_the_file_stem() {
        assert_eq!(room_name(Path::new("rooms/old hall.md")), "old hall");
        assert_eq!(room_name(Path::new("origin.md")), "origin");
    }

    #[test]
    fn verify_reports_missing_pieces_in_order() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            verify_project_dir(dir.path()),
            Err(ProjectError::MissingRoomsDir(_))
        ));

        fs::create_dir(dir.path().join(ROOMS_DIR)).unwrap();
        let err = verify_project_dir(dir.path()).unwrap_err();
        assert!(matches!(err, ProjectError::MissingOriginRoom(_)));
        assert!(err.to_string().starts_with("Origin room (origin.md) not found"));

        fs::write(dir.path().join(ROOMS_DIR).join("origin.md"), "---\n---\nHi").unwrap();
        assert!(verify_project_dir(dir.path()).is_ok());
    }

    #[test]
    fn collect_is_sorted_flat_and_md_only() {
        let dir = tempfile::tempdir().unwrap();
        let rooms = dir.path();
        for name in ["b.md", "a.md", "notes.txt"] {
            fs::write(rooms.join(name), "").unwrap();
        }
        fs::create_dir(rooms.join("nested")).unwrap();
        fs::write(rooms.join("nested").join("c.md"), "").unwrap();

        let files = collect_room_files(rooms).unwrap();
        let names: Vec<_> = files.iter().map(|p| room_name(p)).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
