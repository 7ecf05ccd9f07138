//! Single-line level snapshots suitable for clipboard transfer.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wizard_dungeon_level::Level;

use crate::{
    document::{LevelDocument, DOCUMENT_VERSION},
    PersistenceError,
};

const SHARE_DOMAIN: &str = "dungeon";
const SHARE_VERSION: &str = "v1";

/// Identifier prefix emitted before the grid dimensions and payload.
pub const SHARE_HEADER: &str = "dungeon:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Errors that can occur while encoding or decoding share strings.
#[derive(Debug, Error)]
pub enum ShareStringError {
    /// The provided string was empty or contained only whitespace.
    #[error("share string was empty")]
    EmptyPayload,
    /// The version segment was missing.
    #[error("share string is missing the version")]
    MissingVersion,
    /// The grid dimensions segment was missing.
    #[error("share string is missing the grid dimensions")]
    MissingDimensions,
    /// The payload segment was missing.
    #[error("share string is missing the payload")]
    MissingPayload,
    /// Segments followed the payload.
    #[error("unexpected data after the share payload: '{0}'")]
    TrailingData(String),
    /// The prefix named another kind of snapshot.
    #[error("share prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The version segment named an unsupported format.
    #[error("share version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode share payload")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload was not a level snapshot.
    #[error("could not parse share payload")]
    InvalidPayload(#[source] serde_json::Error),
    /// The level could not be rendered as JSON.
    #[error("could not encode level")]
    Encode(#[source] serde_json::Error),
    /// The snapshot decoded but does not describe a valid level.
    #[error("shared level is invalid")]
    InvalidLevel(#[source] PersistenceError),
}

/// Level content carried in the payload; dimensions travel in the header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct SharedLevel {
    time_limit: u32,
    start: Option<[i32; 2]>,
    goal: Option<[i32; 2]>,
    enemies: Vec<[i32; 2]>,
    fires: Vec<[i32; 2]>,
    tiles: Vec<String>,
}

/// Encodes the level into a single-line share string.
pub fn encode_share_string(level: &Level) -> Result<String, ShareStringError> {
    let document = LevelDocument::from_level(level);
    let payload = SharedLevel {
        time_limit: document.time_limit,
        start: document.start,
        goal: document.goal,
        enemies: document.enemies,
        fires: document.fires,
        tiles: document.tiles,
    };
    let json = serde_json::to_vec(&payload).map_err(ShareStringError::Encode)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!(
        "{SHARE_HEADER}{FIELD_DELIMITER}{}x{}{FIELD_DELIMITER}{encoded}",
        document.width, document.height
    ))
}

/// Decodes a level from its share string representation.
pub fn decode_share_string(value: &str) -> Result<Level, ShareStringError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ShareStringError::EmptyPayload);
    }

    let segments: Vec<&str> = trimmed.split(FIELD_DELIMITER).collect();
    let (domain, version, dimensions, payload) = match segments.as_slice() {
        [domain, version, dimensions, payload] => (*domain, *version, *dimensions, *payload),
        [_, _, _, _, trailing @ ..] => {
            return Err(ShareStringError::TrailingData(trailing.join(":")));
        }
        [_, _, _] => return Err(ShareStringError::MissingPayload),
        [_, _] => return Err(ShareStringError::MissingDimensions),
        _ => return Err(ShareStringError::MissingVersion),
    };

    if domain != SHARE_DOMAIN {
        return Err(ShareStringError::InvalidPrefix(domain.to_owned()));
    }
    if version != SHARE_VERSION {
        return Err(ShareStringError::UnsupportedVersion(version.to_owned()));
    }

    let (width, height) = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(ShareStringError::InvalidEncoding)?;
    let shared: SharedLevel =
        serde_json::from_slice(&bytes).map_err(ShareStringError::InvalidPayload)?;

    LevelDocument {
        version: DOCUMENT_VERSION,
        width,
        height,
        time_limit: shared.time_limit,
        start: shared.start,
        goal: shared.goal,
        enemies: shared.enemies,
        fires: shared.fires,
        tiles: shared.tiles,
    }
    .into_level()
    .map_err(ShareStringError::InvalidLevel)
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), ShareStringError> {
    let invalid = || ShareStringError::InvalidDimensions(dimensions.to_owned());
    let (width, height) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;
    let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
    let height = height.trim().parse::<u32>().map_err(|_| invalid())?;
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wizard_dungeon_core::{Command, Coordinate, EntityKind, Marker, Tile};
    use wizard_dungeon_level::{self as level, query};

    fn sample_level() -> Level {
        let mut level = Level::new();
        let mut events = Vec::new();
        for command in [
            Command::ResizeGrid {
                width: 5,
                height: 3,
            },
            Command::SetTile {
                at: Coordinate::new(4, 2),
                tile: Tile::Wall,
            },
            Command::AddEntity {
                kind: EntityKind::Fire,
                at: Coordinate::new(1, 1),
            },
            Command::SetMarker {
                marker: Marker::Goal,
                at: Some(Coordinate::new(0, 2)),
            },
            Command::SetTimeLimit { seconds: 90 },
        ] {
            level::apply(&mut level, command, &mut events).expect("setup");
        }
        level
    }

    #[test]
    fn share_string_carries_the_whole_level() {
        let level = sample_level();

        let encoded = encode_share_string(&level).expect("level encodes");
        assert!(encoded.starts_with(&format!("{SHARE_HEADER}:5x3:")));
        assert!(!encoded.contains('\n'));

        let decoded = decode_share_string(&encoded).expect("share string decodes");
        assert_eq!(decoded, level);
        assert_eq!(query::time_limit(&decoded), 90);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let level = sample_level();
        let encoded = encode_share_string(&level).expect("level encodes");
        let decoded = decode_share_string(&format!("  {encoded}\n")).expect("decodes");
        assert_eq!(decoded, level);
    }

    #[test]
    fn malformed_segments_are_reported() {
        assert!(matches!(
            decode_share_string("   "),
            Err(ShareStringError::EmptyPayload)
        ));
        assert!(matches!(
            decode_share_string("dungeon"),
            Err(ShareStringError::MissingVersion)
        ));
        assert!(matches!(
            decode_share_string("dungeon:v1"),
            Err(ShareStringError::MissingDimensions)
        ));
        assert!(matches!(
            decode_share_string("dungeon:v1:3x3"),
            Err(ShareStringError::MissingPayload)
        ));
        assert!(matches!(
            decode_share_string("dungeon:v1:3x3:e30:junk"),
            Err(ShareStringError::TrailingData(extra)) if extra == "junk"
        ));
        assert!(matches!(
            decode_share_string("vault:v1:3x3:e30"),
            Err(ShareStringError::InvalidPrefix(prefix)) if prefix == "vault"
        ));
        assert!(matches!(
            decode_share_string("dungeon:v9:3x3:e30"),
            Err(ShareStringError::UnsupportedVersion(version)) if version == "v9"
        ));
        assert!(matches!(
            decode_share_string("dungeon:v1:three:e30"),
            Err(ShareStringError::InvalidDimensions(_))
        ));
        assert!(matches!(
            decode_share_string("dungeon:v1:3x3:!!!"),
            Err(ShareStringError::InvalidEncoding(_))
        ));
        assert!(matches!(
            decode_share_string("dungeon:v1:3x3:e30"),
            Err(ShareStringError::InvalidPayload(_))
        ));
    }

    #[test]
    fn header_dimensions_must_match_payload() {
        let encoded = encode_share_string(&sample_level()).expect("level encodes");
        let tampered = encoded.replacen(":5x3:", ":5x4:", 1);
        assert!(matches!(
            decode_share_string(&tampered),
            Err(ShareStringError::InvalidLevel(
                PersistenceError::RowCount { .. }
            ))
        ));
    }
}
