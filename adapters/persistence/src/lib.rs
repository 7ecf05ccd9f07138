#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! On-disk and clipboard formats for Wizard Dungeon levels and texture sets.
//!
//! Levels are stored as `level.toml` inside a level directory, texture sets as
//! a `textures.toml` manifest next to their images, and whole levels can be
//! moved through a single-line share string.

mod document;
mod share;
mod textures;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::info;
use thiserror::Error;
use wizard_dungeon_core::LevelError;
use wizard_dungeon_level::Level;

use document::LevelDocument;

pub use share::{decode_share_string, encode_share_string, ShareStringError, SHARE_HEADER};
pub use textures::{export_textures, import_textures, TextureError, TextureKey, TextureSet};

/// File name of the level description inside a level directory.
pub const LEVEL_FILE: &str = "level.toml";

/// Errors raised while reading or writing level files.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Reading or writing a file failed.
    #[error("failed to access {}", .path.display())]
    Io {
        /// File or directory being accessed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The level file is not valid TOML or does not match the expected layout.
    #[error("failed to parse {}", .path.display())]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: toml::de::Error,
    },
    /// The level could not be rendered as TOML.
    #[error("failed to serialise level")]
    Serialize(#[from] toml::ser::Error),
    /// The file was written by an unsupported format version.
    #[error("unsupported level version {found}; expected {expected}")]
    UnsupportedVersion {
        /// Version stored in the file.
        found: u32,
        /// Version this build understands.
        expected: u32,
    },
    /// The number of tile rows disagrees with the declared height.
    #[error("level declares {expected} rows but contains {found}")]
    RowCount {
        /// Declared height.
        expected: u32,
        /// Rows present.
        found: usize,
    },
    /// A tile row disagrees with the declared width.
    #[error("row {row} has {found} tiles; expected {expected}")]
    RowWidth {
        /// Zero-based row index.
        row: usize,
        /// Declared width.
        expected: u32,
        /// Tiles present in the row.
        found: usize,
    },
    /// A tile row contains a character that is neither `#` nor `.`.
    #[error("unknown tile glyph {glyph:?} at row {row}, column {column}")]
    InvalidGlyph {
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
        /// Offending character.
        glyph: char,
    },
    /// The stored level violates a level invariant.
    #[error(transparent)]
    Level(#[from] LevelError),
}

/// Loads the level stored in `dir/level.toml`.
pub fn import_level(dir: impl AsRef<Path>) -> Result<Level, PersistenceError> {
    let path = dir.as_ref().join(LEVEL_FILE);
    let contents = fs::read_to_string(&path).map_err(|source| PersistenceError::Io {
        path: path.clone(),
        source,
    })?;
    let document: LevelDocument =
        toml::from_str(&contents).map_err(|source| PersistenceError::Parse {
            path: path.clone(),
            source,
        })?;
    let level = document.into_level()?;
    info!("[Persistence] Imported level from {}", path.display());
    Ok(level)
}

/// Writes the level to `dir/level.toml`, creating `dir` when needed.
pub fn export_level(level: &Level, dir: impl AsRef<Path>) -> Result<(), PersistenceError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|source| PersistenceError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(LEVEL_FILE);
    let contents = toml::to_string_pretty(&LevelDocument::from_level(level))?;
    fs::write(&path, contents).map_err(|source| PersistenceError::Io {
        path: path.clone(),
        source,
    })?;
    info!("[Persistence] Exported level to {}", path.display());
    Ok(())
}
