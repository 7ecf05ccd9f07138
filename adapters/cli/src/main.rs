#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for building and editing Wizard Dungeon levels.

mod config;
mod prompt;

use std::{
    io,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec2;
use log::debug;
use wizard_dungeon_core::{
    Command, Coordinate, EntityKind, Event, FlipDirection, Marker, PlacementMode, PlacementOutcome,
    Tile,
};
use wizard_dungeon_level::{self as level, query, Level};
use wizard_dungeon_persistence::{
    decode_share_string, encode_share_string, export_level, export_textures, import_level,
    import_textures, TextureKey,
};
use wizard_dungeon_system_editor::{Confirm, PlacementController, ReplacePrompt, TileMetrics};

use config::EditorConfig;
use prompt::TerminalConfirm;

#[derive(Parser, Debug)]
#[command(name = "wizard-dungeon")]
#[command(about = "Build and edit Wizard Dungeon levels")]
struct Cli {
    /// Editor config file (defaults to ./wizard-dungeon.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Create an empty all-floor level
    New {
        /// Level directory to create
        dir: PathBuf,
        /// Grid size (format: WIDTHxHEIGHT)
        #[arg(long, value_parser = parse_size)]
        size: (i32, i32),
        /// Time limit in seconds (defaults to the configured limit)
        #[arg(long)]
        time: Option<u32>,
    },
    /// Print level statistics and an ASCII map
    Info {
        /// Level directory
        dir: PathBuf,
    },
    /// Resize the grid, pruning entities that fall outside it
    Resize {
        /// Level directory
        dir: PathBuf,
        /// New grid size (format: WIDTHxHEIGHT)
        #[arg(long, value_parser = parse_size, allow_hyphen_values = true)]
        size: (i32, i32),
    },
    /// Apply an editing tool to one tile
    Place {
        /// Level directory
        dir: PathBuf,
        /// Tool to apply
        #[arg(long, value_enum)]
        mode: Tool,
        /// Target tile (format: X,Y)
        #[arg(
            long,
            value_parser = parse_coordinate,
            conflicts_with = "pixel",
            required_unless_present = "pixel",
            allow_hyphen_values = true
        )]
        at: Option<Coordinate>,
        /// Target canvas pixel (format: PX,PY)
        #[arg(long, value_parser = parse_pixel, allow_hyphen_values = true)]
        pixel: Option<Vec2>,
        /// Tile size in pixels for --pixel targets (overrides the config)
        #[arg(long)]
        tile_size: Option<u32>,
        /// Skip wall and entity conflict checks
        #[arg(long)]
        allow_overlap: bool,
        /// Replace occupants without asking
        #[arg(long, conflicts_with = "no")]
        yes: bool,
        /// Keep occupants and cancel instead of asking
        #[arg(long)]
        no: bool,
    },
    /// Mirror the level along an axis
    Flip {
        /// Level directory
        dir: PathBuf,
        /// Axis to mirror along
        #[arg(long, value_enum)]
        direction: Axis,
    },
    /// Set the time limit
    Time {
        /// Level directory
        dir: PathBuf,
        /// Time limit in seconds
        seconds: u32,
    },
    /// Print a single-line share string for the level
    Share {
        /// Level directory
        dir: PathBuf,
    },
    /// Write the level encoded in a share string
    Unshare {
        /// Level directory to write
        dir: PathBuf,
        /// Share string produced by `share`
        value: String,
    },
    /// Inspect, edit or export a texture set
    Textures {
        /// Directory holding textures.toml
        dir: PathBuf,
        /// Replace one texture (format: KEY=PATH)
        #[arg(long = "set", value_parser = parse_texture_assignment)]
        assignments: Vec<(TextureKey, PathBuf)>,
        /// Copy the set into another directory instead of updating it in place
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Tool {
    Tile,
    Fire,
    Enemy,
    Start,
    Goal,
}

impl From<Tool> for PlacementMode {
    fn from(tool: Tool) -> Self {
        match tool {
            Tool::Tile => Self::ToggleTile,
            Tool::Fire => Self::PlaceFire,
            Tool::Enemy => Self::PlaceEnemy,
            Tool::Start => Self::PlaceStart,
            Tool::Goal => Self::PlaceGoal,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Axis {
    Horizontal,
    Vertical,
}

impl From<Axis> for FlipDirection {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => Self::Horizontal,
            Axis::Vertical => Self::Vertical,
        }
    }
}

/// How replacement questions are answered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Answer {
    Always(bool),
    Ask,
}

/// Entry point for the Wizard Dungeon command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = EditorConfig::load(cli.config.as_deref())?;
    run(cli.command, &config)
}

fn run(action: Action, config: &EditorConfig) -> Result<()> {
    match action {
        Action::New { dir, size, time } => {
            let mut level = Level::new();
            let seconds = time.unwrap_or(config.default_time_limit);
            let _ = edit(
                &mut level,
                [
                    Command::ResizeGrid {
                        width: size.0,
                        height: size.1,
                    },
                    Command::SetTimeLimit { seconds },
                ],
            )?;
            save(&level, &dir)?;
            println!("{}", query::stats(&level));
        }
        Action::Info { dir } => {
            let level = load(&dir)?;
            let (width, height) = query::dimensions(&level);
            println!("Size: {width}x{height} | Time limit: {}s", query::time_limit(&level));
            println!("{}", query::stats(&level));
            print!("{}", render_map(&level));
        }
        Action::Resize { dir, size } => {
            let mut level = load(&dir)?;
            let events = edit(
                &mut level,
                [Command::ResizeGrid {
                    width: size.0,
                    height: size.1,
                }],
            )?;
            report_pruned(&events);
            save(&level, &dir)?;
            println!("{}", query::stats(&level));
        }
        Action::Place {
            dir,
            mode,
            at,
            pixel,
            tile_size,
            allow_overlap,
            yes,
            no,
        } => {
            let mut level = load(&dir)?;
            let mut controller = PlacementController::new();
            controller.set_mode(mode.into());
            controller.set_overlap_prevention(config.overlap_prevention && !allow_overlap);

            let answer = match (yes, no) {
                (true, _) => Answer::Always(true),
                (_, true) => Answer::Always(false),
                _ => Answer::Ask,
            };
            let mut fixed = |_: &ReplacePrompt| matches!(answer, Answer::Always(true));
            let stdin = io::stdin();
            let mut terminal = TerminalConfirm::new(stdin.lock(), io::stdout());
            let confirm: &mut dyn Confirm = match answer {
                Answer::Always(_) => &mut fixed,
                Answer::Ask => &mut terminal,
            };

            let mut events = Vec::new();
            let outcome = match (at, pixel) {
                (Some(target), _) => {
                    controller.apply_placement(&mut level, target, confirm, &mut events)?
                }
                (None, Some(pixel)) => {
                    let metrics = TileMetrics::new(tile_size.unwrap_or(config.tile_size));
                    controller.apply_click(&mut level, pixel, metrics, confirm, &mut events)?
                }
                (None, None) => bail!("either --at or --pixel is required"),
            };
            debug!("[Cli] Placement produced {events:?}");

            match outcome {
                PlacementOutcome::Applied => {
                    save(&level, &dir)?;
                    println!("{}", query::stats(&level));
                }
                PlacementOutcome::Rejected(reason) => println!("{reason}"),
                PlacementOutcome::Aborted => println!("Placement cancelled"),
                PlacementOutcome::Skipped => println!("Nothing to place there"),
                PlacementOutcome::Locked => println!("End the game before altering the level"),
            }
        }
        Action::Flip { dir, direction } => {
            let mut level = load(&dir)?;
            let _ = edit(
                &mut level,
                [Command::Flip {
                    direction: direction.into(),
                }],
            )?;
            save(&level, &dir)?;
        }
        Action::Time { dir, seconds } => {
            let mut level = load(&dir)?;
            let _ = edit(&mut level, [Command::SetTimeLimit { seconds }])?;
            save(&level, &dir)?;
        }
        Action::Share { dir } => {
            let level = load(&dir)?;
            let encoded = encode_share_string(&level).context("failed to encode share string")?;
            println!("{encoded}");
        }
        Action::Unshare { dir, value } => {
            let level = decode_share_string(&value).context("failed to decode share string")?;
            save(&level, &dir)?;
            println!("{}", query::stats(&level));
        }
        Action::Textures {
            dir,
            assignments,
            export,
        } => {
            let mut textures = import_textures(&dir)
                .with_context(|| format!("failed to load textures from {}", dir.display()))?;
            for (key, path) in &assignments {
                textures
                    .set(*key, path)
                    .with_context(|| format!("failed to set texture `{key}`"))?;
            }

            let destination = export.as_deref().unwrap_or(dir.as_path());
            if export.is_some() || !assignments.is_empty() {
                export_textures(&textures, destination).with_context(|| {
                    format!("failed to write textures to {}", destination.display())
                })?;
            }
            for (key, path) in textures.iter() {
                println!("{key}: {}", path.display());
            }
        }
    }

    Ok(())
}

fn load(dir: &Path) -> Result<Level> {
    import_level(dir).with_context(|| format!("failed to load level from {}", dir.display()))
}

fn save(level: &Level, dir: &Path) -> Result<()> {
    export_level(level, dir).with_context(|| format!("failed to save level to {}", dir.display()))
}

fn edit<const N: usize>(level: &mut Level, commands: [Command; N]) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    for command in commands {
        level::apply(level, command, &mut events)?;
    }
    Ok(events)
}

fn report_pruned(events: &[Event]) {
    for event in events {
        match event {
            Event::EntityRemoved { kind, at } => println!("Removed {kind} at {at}"),
            Event::MarkerMoved {
                marker,
                from: Some(at),
                to: None,
            } => println!("Cleared {marker} at {at}"),
            _ => {}
        }
    }
}

/// Draws the level one character per tile, markers over entities over tiles.
fn render_map(level: &Level) -> String {
    let (width, height) = query::dimensions(level);
    let mut map = String::new();
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            map.push(symbol(level, Coordinate::new(x, y)));
        }
        map.push('\n');
    }
    map
}

fn symbol(level: &Level, at: Coordinate) -> char {
    if query::marker(level, Marker::Start) == Some(at) {
        'S'
    } else if query::marker(level, Marker::Goal) == Some(at) {
        'G'
    } else if query::has_entity(level, EntityKind::Enemy, at) {
        'E'
    } else if query::has_entity(level, EntityKind::Fire, at) {
        'F'
    } else {
        match query::tile(level, at) {
            Ok(Tile::Wall) => '#',
            _ => '.',
        }
    }
}

fn parse_size(value: &str) -> Result<(i32, i32), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size '{value}'; expected WIDTHxHEIGHT"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<i32>()
            .map_err(|_| format!("invalid size value '{part}'"))
    };
    Ok((parse(width)?, parse(height)?))
}

fn parse_coordinate(value: &str) -> Result<Coordinate, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("invalid coordinate '{value}'; expected X,Y"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<i32>()
            .map_err(|_| format!("invalid coordinate value '{part}'"))
    };
    Ok(Coordinate::new(parse(x)?, parse(y)?))
}

fn parse_pixel(value: &str) -> Result<Vec2, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("invalid pixel '{value}'; expected PX,PY"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f32>()
            .map_err(|_| format!("invalid pixel value '{part}'"))
    };
    Ok(Vec2::new(parse(x)?, parse(y)?))
}

fn parse_texture_assignment(value: &str) -> Result<(TextureKey, PathBuf), String> {
    let (name, path) = value
        .split_once('=')
        .ok_or_else(|| format!("invalid texture assignment '{value}'; expected KEY=PATH"))?;
    let key = TextureKey::from_name(name.trim()).ok_or_else(|| {
        let known: Vec<_> = TextureKey::ALL.iter().map(|key| key.name()).collect();
        format!("unknown texture key '{name}'; expected one of {}", known.join(", "))
    })?;
    Ok((key, PathBuf::from(path.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn place_requires_a_target() {
        let result = Cli::try_parse_from(["wizard-dungeon", "place", "lvl", "--mode", "fire"]);
        assert!(result.is_err());
    }

    #[test]
    fn place_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "wizard-dungeon",
            "place",
            "lvl",
            "--mode",
            "goal",
            "--at",
            "-1,2",
            "--yes",
        ])
        .expect("arguments parse");
        match cli.command {
            Action::Place { at, mode, yes, .. } => {
                assert_eq!(at, Some(Coordinate::new(-1, 2)));
                assert_eq!(mode, Tool::Goal);
                assert!(yes);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn yes_and_no_conflict() {
        let result = Cli::try_parse_from([
            "wizard-dungeon",
            "place",
            "lvl",
            "--mode",
            "tile",
            "--at",
            "0,0",
            "--yes",
            "--no",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn size_parsing_keeps_sign() {
        assert_eq!(parse_size("12x8"), Ok((12, 8)));
        assert_eq!(parse_size("-3X4"), Ok((-3, 4)));
        assert!(parse_size("12").is_err());
        assert!(parse_size("ax8").is_err());
    }

    #[test]
    fn texture_assignments_name_known_keys() {
        assert_eq!(
            parse_texture_assignment("fire=art/lava.png"),
            Ok((TextureKey::Fire, PathBuf::from("art/lava.png")))
        );
        assert!(parse_texture_assignment("lava=art/lava.png").is_err());
        assert!(parse_texture_assignment("fire").is_err());
    }

    #[test]
    fn map_draws_markers_over_entities_over_tiles() {
        let mut level = Level::new();
        let _ = edit(
            &mut level,
            [
                Command::ResizeGrid {
                    width: 3,
                    height: 2,
                },
                Command::SetTile {
                    at: Coordinate::new(2, 1),
                    tile: Tile::Wall,
                },
                Command::AddEntity {
                    kind: EntityKind::Fire,
                    at: Coordinate::new(1, 0),
                },
                Command::AddEntity {
                    kind: EntityKind::Enemy,
                    at: Coordinate::new(0, 1),
                },
                Command::AddEntity {
                    kind: EntityKind::Enemy,
                    at: Coordinate::new(0, 0),
                },
                Command::SetMarker {
                    marker: Marker::Start,
                    at: Some(Coordinate::new(0, 0)),
                },
            ],
        )
        .expect("setup");

        assert_eq!(render_map(&level), "SF.\nE.#\n");
    }
}
