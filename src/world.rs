//! Pure simulation core: bird physics, scrolling gates, collision, scoring.
//!
//! Everything here operates on plain data in a fixed 800x600 logical
//! coordinate space. No terminal, no audio, no clock; the loop in `main`
//! feeds in a loudness sample per tick and the renderer scales the result
//! to whatever terminal it has.

use rand::Rng;

// ── World constants ─────────────────────────────────────────────────────────

pub const WORLD_W: f64 = 800.0;
pub const WORLD_H: f64 = 600.0;

pub const BIRD_X: f64 = 100.0;
pub const BIRD_START_Y: f64 = 300.0;
pub const BIRD_W: f64 = 40.0;
pub const BIRD_H: f64 = 30.0;

/// Upward impulse scale; velocity is set to `LIFT * (loudness / 100)`.
pub const LIFT: f64 = -8.0;
pub const GRAVITY: f64 = 0.4;

/// Loudness below this is treated as silence and the bird just falls.
pub const LOUDNESS_THRESHOLD: f64 = 50.0;

pub const GAME_SPEED: f64 = 2.0;
pub const PIPE_WIDTH: f64 = 60.0;
pub const PIPE_GAP: f64 = 150.0;
/// A gate spawns every this many frames.
pub const PIPE_FREQUENCY: u64 = 150;
pub const MIN_PIPE_HEIGHT: f64 = 50.0;

/// Pipes are dropped once their trailing edge is this far off screen.
const CLEANUP_X: f64 = -50.0;

/// Full scale of the volume indicator; loudness at or above this reads 100%.
const INDICATOR_FULL_SCALE: f64 = 150.0;

// ── Data model ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bird {
    /// Top edge. The horizontal position is fixed at `BIRD_X` forever.
    pub y: f64,
    pub velocity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Set once when the trailing edge crosses the bird's leading edge.
    pub passed: bool,
}

impl Pipe {
    /// The top member of a gate sits flush with the ceiling; only that
    /// member carries the gate's score credit.
    pub fn is_top(&self) -> bool {
        self.y == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    GameOver,
}

#[derive(Debug, Clone)]
pub struct World {
    pub phase: Phase,
    pub score: u32,
    /// Session best, kept across resets.
    pub best: u32,
    pub frame_count: u64,
    pub bird: Bird,
    /// Spawn order; pairs stay adjacent (top first, then bottom).
    pub pipes: Vec<Pipe>,
    /// Most recent loudness sample, mean of the frequency bins.
    pub loudness: f64,
    /// Indicator height for the HUD, 0..=100.
    pub volume_pct: f64,
}

impl World {
    pub fn new() -> Self {
        World {
            phase: Phase::Idle,
            score: 0,
            best: 0,
            frame_count: 0,
            bird: Bird {
                y: BIRD_START_Y,
                velocity: 0.0,
            },
            pipes: Vec::new(),
            loudness: 0.0,
            volume_pct: 0.0,
        }
    }

    /// Shared start/restart procedure: full reset, then running. Never a
    /// resume; a finished game always begins from scratch.
    pub fn reset(&mut self) {
        self.phase = Phase::Running;
        self.score = 0;
        self.frame_count = 0;
        self.bird = Bird {
            y: BIRD_START_Y,
            velocity: 0.0,
        };
        self.pipes.clear();
        self.loudness = 0.0;
        self.volume_pct = 0.0;
    }

    /// Advance the world by one tick. Does nothing unless running.
    pub fn step<R: Rng>(&mut self, loudness: f64, rng: &mut R) {
        if self.phase != Phase::Running {
            return;
        }

        self.loudness = loudness;
        self.volume_pct = (loudness / INDICATOR_FULL_SCALE * 100.0).min(100.0);

        // A shout overwrites the velocity outright rather than adding an
        // impulse, and loudness past 100 over-drives the nominal lift.
        if loudness > LOUDNESS_THRESHOLD {
            self.bird.velocity = LIFT * (loudness / 100.0);
        }

        self.bird.velocity += GRAVITY;
        self.bird.y += self.bird.velocity;

        self.frame_count += 1;
        if self.frame_count % PIPE_FREQUENCY == 0 {
            self.spawn_gate(rng);
        }

        for pipe in &mut self.pipes {
            pipe.x -= GAME_SPEED;
            if !pipe.passed && pipe.x + pipe.width < BIRD_X {
                pipe.passed = true;
                // Credit the gate once, on its top member.
                if pipe.is_top() {
                    self.score += 1;
                }
            }
        }

        self.pipes.retain(|p| p.x + p.width > CLEANUP_X);

        if self.out_of_bounds() || self.hits_pipe() {
            self.game_over();
        }
    }

    /// Emit one gate at the right edge: a top pipe flush with the ceiling
    /// and a bottom pipe leaving a fixed gap, at a uniformly random split.
    fn spawn_gate<R: Rng>(&mut self, rng: &mut R) {
        let max_height = WORLD_H - PIPE_GAP - MIN_PIPE_HEIGHT;
        let top_height = rng.gen_range(MIN_PIPE_HEIGHT..max_height);

        self.pipes.push(Pipe {
            x: WORLD_W,
            y: 0.0,
            width: PIPE_WIDTH,
            height: top_height,
            passed: false,
        });
        self.pipes.push(Pipe {
            x: WORLD_W,
            y: top_height + PIPE_GAP,
            width: PIPE_WIDTH,
            height: WORLD_H - top_height - PIPE_GAP,
            passed: false,
        });
    }

    /// Ceiling is inclusive at 0; floor is inclusive at the world height.
    fn out_of_bounds(&self) -> bool {
        self.bird.y <= 0.0 || self.bird.y + BIRD_H >= WORLD_H
    }

    fn hits_pipe(&self) -> bool {
        self.pipes.iter().any(|p| {
            BIRD_X < p.x + p.width
                && BIRD_X + BIRD_W > p.x
                && self.bird.y < p.y + p.height
                && self.bird.y + BIRD_H > p.y
        })
    }

    fn game_over(&mut self) {
        self.phase = Phase::GameOver;
        if self.score > self.best {
            self.best = self.score;
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
