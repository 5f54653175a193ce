//! Timed loop: advances a shared world at a fixed tick rate and hands it to
//! a renderer at a separate frame rate.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::chunklife::{Coordinate, SharedWorld};
use crate::error::{LifeError, Result};
use crate::render::Renderer;

pub const DEFAULT_TICKS_PER_SECOND: f64 = 6.0;
pub const DEFAULT_FRAMES_PER_SECOND: f64 = 12.0;

const IDLE_SLEEP: Duration = Duration::from_millis(1);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoopConfig {
    pub ticks_per_second: f64,
    pub frames_per_second: f64,
    /// Whether `Driver::edit` may toggle cells.
    pub editing: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            frames_per_second: DEFAULT_FRAMES_PER_SECOND,
            editing: true,
        }
    }
}

/// Period of an event happening `rate` times per second. Rejects rates that
/// are not positive or whose period does not fit a `Duration`.
fn interval(name: &str, rate: f64) -> Result<Duration> {
    if !(rate.is_finite() && rate > 0.0) {
        return Err(LifeError::InvalidConfig(format!(
            "{name} must be a positive number, got {rate}"
        )));
    }
    Duration::try_from_secs_f64(1.0 / rate).map_err(|_| {
        LifeError::InvalidConfig(format!("{name} of {rate} gives an unrepresentable period"))
    })
}

impl LoopConfig {
    pub fn ticks_per_second(mut self, tps: f64) -> Self {
        self.ticks_per_second = tps;
        self
    }

    pub fn frames_per_second(mut self, fps: f64) -> Self {
        self.frames_per_second = fps;
        self
    }

    pub fn editing(mut self, on: bool) -> Self {
        self.editing = on;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.tick_interval()?;
        self.frame_interval()?;
        Ok(())
    }

    pub fn tick_interval(&self) -> Result<Duration> {
        interval("ticks_per_second", self.ticks_per_second)
    }

    pub fn frame_interval(&self) -> Result<Duration> {
        interval("frames_per_second", self.frames_per_second)
    }
}

pub struct Driver {
    world: SharedWorld,
    config: LoopConfig,
    tick_every: Duration,
    frame_every: Duration,
    playing: bool,
}

impl Driver {
    /// A paused driver over `world`.
    pub fn new(world: SharedWorld, config: LoopConfig) -> Result<Self> {
        Ok(Self {
            tick_every: config.tick_interval()?,
            frame_every: config.frame_interval()?,
            world,
            config,
            playing: false,
        })
    }

    pub fn world(&self) -> &SharedWorld {
        &self.world
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle_playing(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_ticks_per_second(&mut self, tps: f64) -> Result<()> {
        self.tick_every = interval("ticks_per_second", tps)?;
        self.config.ticks_per_second = tps;
        Ok(())
    }

    /// Advance one generation if playing. Returns whether it did.
    pub fn tick(&mut self) -> bool {
        if !self.playing {
            return false;
        }
        self.world.update();
        true
    }

    /// Toggle the cell at `coordinate` if editing is enabled.
    pub fn edit(&mut self, coordinate: Coordinate) -> bool {
        if !self.config.editing {
            return false;
        }
        self.world.toggle(coordinate);
        true
    }

    fn render_with(&self, renderer: &mut dyn Renderer) {
        let world = self.world.read();
        renderer.render(&world);
    }

    /// Play until `generations` more ticks have run, rendering on the frame
    /// cadence, then render the final state once more. Returns the world's
    /// generation at exit.
    pub fn run(&mut self, generations: u64, renderer: &mut dyn Renderer) -> u64 {
        let tick_every = self.tick_every;
        let frame_every = self.frame_every;
        let start_generation = self.world.read().generation();
        info!(
            generations,
            tps = self.config.ticks_per_second,
            fps = self.config.frames_per_second,
            "loop started"
        );

        self.play();
        self.render_with(renderer);
        let mut ticks = 0u64;
        let mut next_tick = Instant::now() + tick_every;
        let mut next_frame = Instant::now() + frame_every;

        while ticks < generations {
            let now = Instant::now();
            let mut busy = false;
            if now >= next_tick {
                if self.tick() {
                    ticks += 1;
                }
                next_tick += tick_every;
                busy = true;
            }
            if now >= next_frame {
                self.render_with(renderer);
                next_frame += frame_every;
                busy = true;
            }
            if !busy {
                thread::sleep(IDLE_SLEEP);
            }
        }

        self.pause();
        self.render_with(renderer);
        let generation = self.world.read().generation();
        debug!(ticks, from = start_generation, to = generation, "loop finished");
        generation
    }
}
