//! Text rendering of a rectangular window onto the plane.
//!
//! Rows are emitted top to bottom, i.e. from the highest `y` to the lowest,
//! so the picture reads the same way the plane is laid out.

use std::io::{self, Write};

use tracing::warn;

use crate::chunklife::{CHUNK_SIZE, Coordinate, World, is_isolated, is_overpopulated};

pub const ALIVE: char = '#';
pub const DOOMED: char = 'o';
pub const CORNER: char = '+';
pub const BLANK: char = '.';

/// Rectangle of the plane to draw. `min_x`/`min_y` is the lower-left cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub min_x: i64,
    pub min_y: i64,
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub const fn new(min_x: i64, min_y: i64, width: usize, height: usize) -> Self {
        Self {
            min_x,
            min_y,
            width,
            height,
        }
    }

    /// Smallest viewport holding every living cell plus `margin` on each
    /// side. An empty world yields a `margin`-sized square at the origin.
    pub fn fit(world: &World, margin: usize) -> Self {
        let m = margin as i64;
        match world.bounds() {
            Some((min_x, min_y, max_x, max_y)) => Self {
                min_x: min_x - m,
                min_y: min_y - m,
                width: (max_x - min_x + 1 + 2 * m) as usize,
                height: (max_y - min_y + 1 + 2 * m) as usize,
            },
            None => Self::new(-m, -m, margin * 2 + 1, margin * 2 + 1),
        }
    }

    pub fn max_x(&self) -> i64 {
        self.min_x + self.width as i64 - 1
    }

    pub fn max_y(&self) -> i64 {
        self.min_y + self.height as i64 - 1
    }

    pub fn contains(&self, coordinate: Coordinate) -> bool {
        (self.min_x..=self.max_x()).contains(&coordinate.x)
            && (self.min_y..=self.max_y()).contains(&coordinate.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Mark living cells that will die next generation.
    pub colored_cells: bool,
    /// Mark the origin corner of every chunk.
    pub chunk_borders: bool,
}

impl RenderOptions {
    pub fn colored_cells(mut self, on: bool) -> Self {
        self.colored_cells = on;
        self
    }

    pub fn chunk_borders(mut self, on: bool) -> Self {
        self.chunk_borders = on;
        self
    }
}

pub trait Renderer {
    fn render(&mut self, world: &World);
}

fn glyph(world: &World, coordinate: Coordinate, options: RenderOptions) -> char {
    if let Some(cell) = world.cell_at(coordinate).filter(|cell| cell.is_alive()) {
        if options.colored_cells {
            let neighbors = cell.neighbor_count();
            if is_isolated(neighbors) || is_overpopulated(neighbors) {
                return DOOMED;
            }
        }
        return ALIVE;
    }
    let on_corner =
        coordinate.x.rem_euclid(CHUNK_SIZE) == 0 && coordinate.y.rem_euclid(CHUNK_SIZE) == 0;
    if options.chunk_borders && on_corner {
        CORNER
    } else {
        BLANK
    }
}

/// Draw `viewport` into `out`, one line per row.
pub fn write_ascii<W: Write>(
    world: &World,
    viewport: Viewport,
    options: RenderOptions,
    out: &mut W,
) -> io::Result<()> {
    let mut line = String::with_capacity(viewport.width + 1);
    for y in (viewport.min_y..=viewport.max_y()).rev() {
        line.clear();
        for x in viewport.min_x..=viewport.max_x() {
            line.push(glyph(world, Coordinate::new(x, y), options));
        }
        line.push('\n');
        out.write_all(line.as_bytes())?;
    }
    Ok(())
}

pub fn render_ascii(world: &World, viewport: Viewport, options: RenderOptions) -> String {
    let mut out = Vec::with_capacity((viewport.width + 1) * viewport.height);
    // Writing into a Vec cannot fail.
    let _ = write_ascii(world, viewport, options, &mut out);
    String::from_utf8_lossy(&out).into_owned()
}

/// Renders each frame as text, followed by a generation/population footer.
pub struct AsciiRenderer<W: Write> {
    out: W,
    viewport: Option<Viewport>,
    options: RenderOptions,
    frames: u64,
}

impl<W: Write> AsciiRenderer<W> {
    /// A renderer that re-fits its viewport to the live cells every frame.
    pub fn new(out: W, options: RenderOptions) -> Self {
        Self {
            out,
            viewport: None,
            options,
            frames: 0,
        }
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, world: &World) -> io::Result<()> {
        let viewport = self.viewport.unwrap_or_else(|| Viewport::fit(world, 2));
        write_ascii(world, viewport, self.options, &mut self.out)?;
        writeln!(
            self.out,
            "gen {} | pop {} | chunks {}",
            world.generation(),
            world.population(),
            world.chunk_count()
        )?;
        self.out.flush()
    }
}

impl<W: Write> Renderer for AsciiRenderer<W> {
    fn render(&mut self, world: &World) {
        match self.draw(world) {
            Ok(()) => self.frames += 1,
            Err(err) => warn!(%err, "frame dropped"),
        }
    }
}
