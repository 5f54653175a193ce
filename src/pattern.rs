//! Plain-text pattern codec: one `x, y` line per living cell.
//!
//! Whitespace around the comma is ignored. Blank lines and `#` comments are
//! skipped. Decoding stops at the first malformed line; cells from earlier
//! lines stay active.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::chunklife::{Coordinate, World};
use crate::error::{LifeError, PatternError};

fn parse_line(line: &str) -> Option<Coordinate> {
    let (x, y) = line.split_once(',')?;
    let x = x.trim().parse::<i64>().ok()?;
    let y = y.trim().parse::<i64>().ok()?;
    Some(Coordinate::new(x, y))
}

/// Activate every cell listed in `reader`. Returns the number of lines
/// that activated a cell.
pub fn decode<R: BufRead>(reader: R, world: &mut World) -> Result<usize, PatternError> {
    let mut activated = 0usize;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some(coordinate) = parse_line(trimmed) else {
            warn!(line = index + 1, content = %trimmed, "malformed pattern line");
            return Err(PatternError::Malformed {
                line: index + 1,
                content: line,
            });
        };
        world.activate(coordinate);
        activated += 1;
    }
    Ok(activated)
}

pub fn decode_str(text: &str, world: &mut World) -> Result<usize, PatternError> {
    decode(text.as_bytes(), world)
}

/// Write every living cell, sorted by `(x, y)`, one `x, y` line each.
pub fn encode<W: Write>(world: &World, mut writer: W) -> Result<usize, PatternError> {
    let live = world.live_cells();
    for coordinate in &live {
        writeln!(writer, "{coordinate}")?;
    }
    writer.flush()?;
    Ok(live.len())
}

pub fn encode_string(world: &World) -> String {
    let mut out = String::new();
    for coordinate in world.live_cells() {
        out.push_str(&coordinate.to_string());
        out.push('\n');
    }
    out
}

/// Replace the world's contents with the pattern stored at `path`.
pub fn load_file(path: impl AsRef<Path>, world: &mut World) -> Result<usize, LifeError> {
    let path = path.as_ref();
    let wrap = |source: PatternError| LifeError::PatternFile {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(|e| wrap(e.into()))?;
    world.clear();
    let count = decode(BufReader::new(file), world).map_err(wrap)?;
    info!(path = %path.display(), cells = count, "pattern loaded");
    Ok(count)
}

pub fn save_file(world: &World, path: impl AsRef<Path>) -> Result<usize, LifeError> {
    let path = path.as_ref();
    let wrap = |source: PatternError| LifeError::PatternFile {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(|e| wrap(e.into()))?;
    let count = encode(world, BufWriter::new(file)).map_err(wrap)?;
    info!(path = %path.display(), cells = count, "pattern saved");
    Ok(count)
}

/// A bundled pattern, stored at `<presets dir>/<category>/<name>.life`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Preset {
    pub category: &'static str,
    pub name: &'static str,
}

impl Preset {
    const fn new(category: &'static str, name: &'static str) -> Self {
        Self { category, name }
    }

    pub fn relative_path(&self) -> PathBuf {
        Path::new(self.category).join(format!("{}.life", self.name))
    }

    pub fn path_in(&self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(self.relative_path())
    }
}

pub const PRESETS: &[Preset] = &[
    Preset::new("still_lifes", "block"),
    Preset::new("still_lifes", "bee_hive"),
    Preset::new("still_lifes", "loaf"),
    Preset::new("still_lifes", "boat"),
    Preset::new("still_lifes", "tub"),
    Preset::new("oscillators", "blinker"),
    Preset::new("oscillators", "toad"),
    Preset::new("oscillators", "beacon"),
    Preset::new("oscillators", "pulsar"),
    Preset::new("oscillators", "penta_decathlon"),
    Preset::new("spaceships", "glider"),
    Preset::new("spaceships", "lwss"),
    Preset::new("spaceships", "mwss"),
    Preset::new("spaceships", "hwss"),
    Preset::new("spaceships", "canada_goose"),
    Preset::new("guns", "glider_gun"),
    Preset::new("methuselahs", "r_pentomino"),
    Preset::new("methuselahs", "die_hard"),
    Preset::new("methuselahs", "bunnies"),
    Preset::new("methuselahs", "acorn"),
];

/// Loaded when no pattern source is given.
pub const DEFAULT_PRESET: &str = "glider_gun";

/// Directory the bundled presets ship in.
pub fn presets_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/patterns"))
}

/// Look a preset up by `name` or `category/name`. Dashes match underscores.
pub fn find_preset(name: &str) -> Option<&'static Preset> {
    let wanted = name.trim().to_ascii_lowercase().replace('-', "_");
    let (category, name) = match wanted.split_once('/') {
        Some((category, name)) => (Some(category.to_owned()), name.to_owned()),
        None => (None, wanted),
    };
    PRESETS.iter().find(|preset| {
        preset.name == name && category.as_deref().is_none_or(|c| c == preset.category)
    })
}

/// Replace the world's contents with the named preset from `dir`.
pub fn load_preset(
    dir: impl AsRef<Path>,
    name: &str,
    world: &mut World,
) -> Result<usize, LifeError> {
    let preset = find_preset(name).ok_or_else(|| LifeError::UnknownPreset(name.to_owned()))?;
    load_file(preset.path_in(dir), world)
}

#[cfg(test)]
mod tests {
    use super::{PRESETS, decode_str, encode_string, find_preset, parse_line};
    use crate::chunklife::{Coordinate, World};
    use crate::error::PatternError;

    #[test]
    fn parse_tolerates_whitespace_around_comma() {
        assert_eq!(parse_line("3,4"), Some(Coordinate::new(3, 4)));
        assert_eq!(parse_line(" -3 ,\t 12 "), Some(Coordinate::new(-3, 12)));
        assert_eq!(parse_line("3 4"), None);
        assert_eq!(parse_line("a, 4"), None);
        assert_eq!(parse_line("1, 2, 3"), None);
    }

    #[test]
    fn decode_skips_blank_and_comment_lines() {
        let mut world = World::new();
        let count = decode_str("# glider\n1, 2\n\n0, 1\n0,0\n1 , 0\n2, 0\n", &mut world)
            .expect("valid pattern");
        assert_eq!(count, 5);
        assert_eq!(world.population(), 5);
    }

    #[test]
    fn decode_stops_at_first_malformed_line() {
        let mut world = World::new();
        let err = decode_str("0, 0\n1; 1\n2, 2\n", &mut world).unwrap_err();
        match err {
            PatternError::Malformed { line, content } => {
                assert_eq!(line, 2);
                assert_eq!(content, "1; 1");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(world.live_cells(), vec![Coordinate::new(0, 0)]);
    }

    #[test]
    fn encode_lists_only_living_cells() {
        let mut world = World::new();
        world.activate(Coordinate::new(2, -1));
        world.activate(Coordinate::new(-5, 7));
        // Placeholders around both cells must not be written.
        assert!(world.cell_count() > 2);
        assert_eq!(encode_string(&world), "-5, 7\n2, -1\n");
    }

    #[test]
    fn presets_resolve_by_name_or_category() {
        assert_eq!(find_preset("glider").map(|p| p.category), Some("spaceships"));
        assert_eq!(find_preset("guns/glider_gun").map(|p| p.name), Some("glider_gun"));
        assert_eq!(find_preset("Die-Hard").map(|p| p.name), Some("die_hard"));
        assert!(find_preset("oscillators/glider").is_none());
        assert!(find_preset("puffer_9").is_none());
    }

    #[test]
    fn preset_names_are_unique() {
        for (i, preset) in PRESETS.iter().enumerate() {
            assert!(
                PRESETS[i + 1..].iter().all(|other| other.name != preset.name),
                "duplicate preset {}",
                preset.name
            );
        }
    }
}
