//! Texture sets described by a `textures.toml` manifest.

use std::{
    collections::BTreeMap,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;
const MANIFEST_FILE: &str = "textures.toml";

/// Image slots a texture set must fill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureKey {
    /// Wall tiles.
    Wall,
    /// Floor tiles.
    Floor,
    /// The player sprite.
    Player,
    /// Enemy sprites.
    Enemy,
    /// Fire hazards.
    Fire,
    /// The goal marker.
    Goal,
}

impl TextureKey {
    /// Every key, in manifest order.
    pub const ALL: [Self; 6] = [
        Self::Wall,
        Self::Floor,
        Self::Player,
        Self::Enemy,
        Self::Fire,
        Self::Goal,
    ];

    /// Name used for the key in manifests and on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Wall => "wall",
            Self::Floor => "floor",
            Self::Player => "player",
            Self::Enemy => "enemy",
            Self::Fire => "fire",
            Self::Goal => "goal",
        }
    }

    /// Looks up a key by its manifest name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }
}

impl fmt::Display for TextureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised while loading, editing or exporting texture sets.
#[derive(Debug, Error)]
pub enum TextureError {
    /// Reading, writing or copying a file failed.
    #[error("failed to access {}", .path.display())]
    Io {
        /// File or directory being accessed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The manifest is not valid TOML or has the wrong layout.
    #[error("failed to parse texture manifest {}", .path.display())]
    Parse {
        /// Manifest being parsed.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: toml::de::Error,
    },
    /// The manifest could not be rendered as TOML.
    #[error("failed to serialise texture manifest")]
    Serialize(#[from] toml::ser::Error),
    /// The manifest was written by an unsupported format version.
    #[error("unsupported texture manifest version {found}; expected {expected}")]
    UnsupportedVersion {
        /// Version stored in the manifest.
        found: u32,
        /// Version this build understands.
        expected: u32,
    },
    /// The manifest names a key outside the known set.
    #[error("unknown texture key `{0}`")]
    UnknownKey(String),
    /// The manifest omits a required key.
    #[error("texture manifest missing entry for `{0}`")]
    MissingKey(TextureKey),
    /// The image for a key does not exist.
    #[error("texture `{key}` points at missing file {}", .path.display())]
    MissingFile {
        /// Key whose image is missing.
        key: TextureKey,
        /// Resolved image path.
        path: PathBuf,
    },
}

/// Complete set of images used to draw a level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureSet {
    paths: BTreeMap<TextureKey, PathBuf>,
}

impl TextureSet {
    /// Image path currently assigned to the key.
    #[must_use]
    pub fn path(&self, key: TextureKey) -> &Path {
        // Every constructor fills all keys.
        self.paths.get(&key).map_or(Path::new(""), PathBuf::as_path)
    }

    /// Iterates over every key and its image path in manifest order.
    pub fn iter(&self) -> impl Iterator<Item = (TextureKey, &Path)> {
        self.paths.iter().map(|(key, path)| (*key, path.as_path()))
    }

    /// Replaces the image assigned to one key.
    pub fn set(&mut self, key: TextureKey, path: impl Into<PathBuf>) -> Result<(), TextureError> {
        let path = path.into();
        ensure_file(key, &path)?;
        debug!("[Textures] {key} now uses {}", path.display());
        let _ = self.paths.insert(key, path);
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    version: u32,
    textures: BTreeMap<String, PathBuf>,
}

/// Loads the texture set described by `dir/textures.toml`.
///
/// Paths in the manifest are resolved relative to `dir`.
pub fn import_textures(dir: impl AsRef<Path>) -> Result<TextureSet, TextureError> {
    let dir = dir.as_ref();
    let manifest_path = dir.join(MANIFEST_FILE);
    let contents = fs::read_to_string(&manifest_path).map_err(|source| TextureError::Io {
        path: manifest_path.clone(),
        source,
    })?;
    let paths = parse_manifest(&contents, &manifest_path, dir)?;
    for (key, path) in &paths {
        ensure_file(*key, path)?;
    }

    info!("[Textures] Imported texture set from {}", dir.display());
    Ok(TextureSet { paths })
}

/// Copies every image into `dir` and writes a manifest referencing the copies.
pub fn export_textures(textures: &TextureSet, dir: impl AsRef<Path>) -> Result<(), TextureError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|source| TextureError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    // Sources may sit in `dir` under another slot's file name; read them all first.
    let mut staged = Vec::with_capacity(TextureKey::ALL.len());
    for (key, source_path) in textures.iter() {
        let bytes = fs::read(source_path).map_err(|source| TextureError::Io {
            path: source_path.to_path_buf(),
            source,
        })?;
        let file_name = match source_path.extension() {
            Some(extension) => format!("{key}.{}", extension.to_string_lossy()),
            None => key.name().to_owned(),
        };
        staged.push((key, file_name, bytes));
    }

    let mut entries = BTreeMap::new();
    for (key, file_name, bytes) in staged {
        let destination = dir.join(&file_name);
        fs::write(&destination, bytes).map_err(|source| TextureError::Io {
            path: destination.clone(),
            source,
        })?;
        debug!("[Textures] Wrote {key} image to {}", destination.display());
        let _ = entries.insert(key.name().to_owned(), PathBuf::from(file_name));
    }

    let manifest = Manifest {
        version: SUPPORTED_MANIFEST_VERSION,
        textures: entries,
    };
    let manifest_path = dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, toml::to_string_pretty(&manifest)?).map_err(|source| {
        TextureError::Io {
            path: manifest_path.clone(),
            source,
        }
    })?;

    info!("[Textures] Exported texture set to {}", dir.display());
    Ok(())
}

fn parse_manifest(
    contents: &str,
    manifest_path: &Path,
    base_path: &Path,
) -> Result<BTreeMap<TextureKey, PathBuf>, TextureError> {
    let manifest: Manifest = toml::from_str(contents).map_err(|source| TextureError::Parse {
        path: manifest_path.to_path_buf(),
        source,
    })?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        return Err(TextureError::UnsupportedVersion {
            found: manifest.version,
            expected: SUPPORTED_MANIFEST_VERSION,
        });
    }

    let mut resolved = BTreeMap::new();
    for (name, relative_path) in manifest.textures {
        let key = TextureKey::from_name(&name).ok_or(TextureError::UnknownKey(name))?;
        let _ = resolved.insert(key, base_path.join(relative_path));
    }

    if let Some(missing) = TextureKey::ALL
        .into_iter()
        .find(|key| !resolved.contains_key(key))
    {
        return Err(TextureError::MissingKey(missing));
    }

    Ok(resolved)
}

fn ensure_file(key: TextureKey, path: &Path) -> Result<(), TextureError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(TextureError::MissingFile {
            key,
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_manifest_requires_all_known_keys() {
        let manifest = r#"
            version = 1

            [textures]
            wall = "wall.png"
            floor = "floor.png"
            player = "player.png"
            enemy = "enemy.png"
            fire = "fire.png"
        "#;

        let result = parse_manifest(manifest, Path::new("textures.toml"), Path::new("assets"));
        assert!(matches!(
            result,
            Err(TextureError::MissingKey(TextureKey::Goal))
        ));
    }

    #[test]
    fn manifest_rejects_unknown_keys() {
        let manifest = r#"
            version = 1

            [textures]
            wall = "wall.png"
            floor = "floor.png"
            player = "player.png"
            enemy = "enemy.png"
            fire = "fire.png"
            goal = "goal.png"
            lava = "lava.png"
        "#;

        let result = parse_manifest(manifest, Path::new("textures.toml"), Path::new("assets"));
        assert!(matches!(result, Err(TextureError::UnknownKey(name)) if name == "lava"));
    }

    #[test]
    fn manifest_resolves_paths_relative_to_base_directory() {
        let manifest = r#"
            version = 1

            [textures]
            goal = "markers/goal.png"
            wall = "tiles/wall.png"
            floor = "tiles/floor.png"
            player = "player.png"
            enemy = "enemy.png"
            fire = "fire.png"
        "#;

        let parsed = parse_manifest(manifest, Path::new("textures.toml"), Path::new("root"))
            .expect("manifest should parse");
        let keys: Vec<_> = parsed.keys().copied().collect();
        assert_eq!(keys, TextureKey::ALL);
        assert_eq!(
            parsed.get(&TextureKey::Goal),
            Some(&PathBuf::from("root/markers/goal.png"))
        );
    }

    #[test]
    fn manifest_version_is_checked() {
        let manifest = r#"
            version = 2

            [textures]
        "#;
        let result = parse_manifest(manifest, Path::new("textures.toml"), Path::new("."));
        assert!(matches!(
            result,
            Err(TextureError::UnsupportedVersion {
                found: 2,
                expected: 1
            })
        ));
    }

    #[test]
    fn key_names_round_trip() {
        for key in TextureKey::ALL {
            assert_eq!(TextureKey::from_name(key.name()), Some(key));
        }
        assert_eq!(TextureKey::from_name("Wall"), None);
    }
}
