//! Half-block terminal renderer.
//!
//! The world lives in fixed 800x600 logical coordinates; drawing scales it to
//! the current pixel buffer (terminal columns x rows*2). Rendering is a pure
//! read of the world, and the bird falls back to a plain rectangle whenever
//! the sprite has not finished loading.

use crossterm::{cursor, queue, style, style::Color as CColor};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;

use crate::world::{BIRD_H, BIRD_W, BIRD_X, Phase, WORLD_H, WORLD_W, World};

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }
}

const SKY_TOP: Rgb = Rgb(70, 180, 200);
const SKY_BOT: Rgb = Rgb(190, 232, 245);
const CLOUD: Rgb = Rgb(255, 255, 255);
const PIPE_FILL: Rgb = Rgb(76, 175, 80);
const PIPE_EDGE: Rgb = Rgb(46, 125, 50);
const BIRD_FALLBACK: Rgb = Rgb(255, 215, 0);
const WHITE: Rgb = Rgb(255, 255, 255);
const SHADOW: Rgb = Rgb(30, 30, 30);
const PANEL: Rgb = Rgb(210, 185, 110);
const PANEL_LIGHT: Rgb = Rgb(220, 195, 120);
const VOLUME_BAR: Rgb = Rgb(245, 200, 66);
const NO_MIC: Rgb = Rgb(220, 60, 50);

/// Cloud translucency against the sky, out of 256.
const CLOUD_ALPHA: u16 = 180;

// ── Pixel buffer with half-block rendering ──────────────────────────────────

pub struct PixelBuf {
    pub w: usize,
    pub h: usize, // pixel height = terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![SKY_TOP; w * h],
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, SKY_TOP);
    }

    pub fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    pub fn stroke_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dx in 0..w {
            self.set(x + dx, y, c);
            self.set(x + dx, y + h - 1, c);
        }
        for dy in 0..h {
            self.set(x, y + dy, c);
            self.set(x + w - 1, y + dy, c);
        }
    }

    /// Filled circle, blended into the backdrop at `alpha_256 / 256`.
    pub fn blend_circle(&mut self, cx: i32, cy: i32, r: i32, c: Rgb, alpha_256: u16) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy > r * r {
                    continue;
                }
                let (x, y) = (cx + dx, cy + dy);
                if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
                    let bg = self.get(x as usize, y as usize);
                    self.set(x, y, Rgb::lerp(bg, c, alpha_256));
                }
            }
        }
    }

    // World-to-pixel mapping. Widths go through end coordinates so adjacent
    // world rects stay adjacent on screen.
    pub fn wx(&self, x: f64) -> i32 {
        (x * self.w as f64 / WORLD_W) as i32
    }

    pub fn wy(&self, y: f64) -> i32 {
        (y * self.h as f64 / WORLD_H) as i32
    }

    pub fn world_rect(&self, x: f64, y: f64, w: f64, h: f64) -> (i32, i32, i32, i32) {
        let x0 = self.wx(x);
        let y0 = self.wy(y);
        let pw = (self.wx(x + w) - x0).max(1);
        let ph = (self.wy(y + h) - y0).max(1);
        (x0, y0, pw, ph)
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut prev_fg = Rgb(0, 0, 0);
        let mut prev_bg = Rgb(0, 0, 0);
        let mut need_fg = true;
        let mut need_bg = true;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if top == bot {
                    if need_bg || prev_bg != top {
                        queue!(
                            out,
                            style::SetBackgroundColor(CColor::Rgb {
                                r: top.0,
                                g: top.1,
                                b: top.2
                            })
                        )?;
                        prev_bg = top;
                        need_bg = false;
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if need_fg || prev_fg != top {
                        queue!(
                            out,
                            style::SetForegroundColor(CColor::Rgb {
                                r: top.0,
                                g: top.1,
                                b: top.2
                            })
                        )?;
                        prev_fg = top;
                        need_fg = false;
                    }
                    if need_bg || prev_bg != bot {
                        queue!(
                            out,
                            style::SetBackgroundColor(CColor::Rgb {
                                r: bot.0,
                                g: bot.1,
                                b: bot.2
                            })
                        )?;
                        prev_bg = bot;
                        need_bg = false;
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row < rows - 1 {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                need_fg = true;
                need_bg = true;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

// ── Bird sprite ─────────────────────────────────────────────────────────────

pub struct Sprite {
    w: usize,
    h: usize,
    rgba: Vec<u8>,
}

impl Sprite {
    /// Nearest-neighbor sample at normalized (u, v); None where transparent.
    fn sample(&self, u: f64, v: f64) -> Option<Rgb> {
        let x = ((u * self.w as f64) as usize).min(self.w - 1);
        let y = ((v * self.h as f64) as usize).min(self.h - 1);
        let i = (y * self.w + x) * 4;
        if self.rgba[i + 3] < 128 {
            return None;
        }
        Some(Rgb(self.rgba[i], self.rgba[i + 1], self.rgba[i + 2]))
    }
}

/// Holder for the asynchronously decoded bird sprite. Decoding happens on a
/// background thread; until it lands (or if it never does) the slot reads as
/// empty and the bird draws as a rectangle.
pub struct SpriteSlot {
    cell: Arc<Mutex<Option<Sprite>>>,
}

impl SpriteSlot {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let cell = Arc::new(Mutex::new(None));
        let loader_cell = Arc::clone(&cell);
        let path = path.into();
        thread::spawn(move || {
            if let Ok(img) = image::open(&path) {
                let img = img.to_rgba8();
                let sprite = Sprite {
                    w: img.width() as usize,
                    h: img.height() as usize,
                    rgba: img.into_raw(),
                };
                if sprite.w > 0 && sprite.h > 0 {
                    if let Ok(mut slot) = loader_cell.lock() {
                        *slot = Some(sprite);
                    }
                }
            }
        });
        SpriteSlot { cell }
    }

    pub fn empty() -> Self {
        SpriteSlot {
            cell: Arc::new(Mutex::new(None)),
        }
    }

    fn with<R>(&self, f: impl FnOnce(Option<&Sprite>) -> R) -> R {
        match self.cell.lock() {
            Ok(guard) => f(guard.as_ref()),
            Err(_) => f(None),
        }
    }
}

// ── 3x5 bitmap digits ──────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

fn draw_digit(buf: &mut PixelBuf, x: i32, y: i32, d: u8, fg: Rgb, shadow: bool) {
    let glyph = &DIGITS[d as usize];
    for row in 0..5 {
        for col in 0..3 {
            if glyph[row * 3 + col] == 1 {
                let px = x + col as i32;
                let py = y + row as i32;
                if shadow {
                    buf.set(px + 1, py + 1, SHADOW);
                }
                buf.set(px, py, fg);
            }
        }
    }
}

fn draw_number(buf: &mut PixelBuf, cx: i32, y: i32, n: u32, fg: Rgb) {
    let s = n.to_string();
    let total_w = s.len() as i32 * 4 - 1; // 3px per digit + 1px spacing
    let start_x = cx - total_w / 2;
    for (i, ch) in s.chars().enumerate() {
        let d = ch as u8 - b'0';
        draw_digit(buf, start_x + i as i32 * 4, y, d, fg, true);
    }
}

// ── Frame drawing ───────────────────────────────────────────────────────────

/// Paint the whole frame from world state. Never mutates the world and never
/// fails: a missing sprite or microphone only changes what gets drawn.
pub fn draw(world: &World, sprite: &SpriteSlot, mic_ready: bool, buf: &mut PixelBuf) {
    draw_sky(buf);
    draw_clouds(buf);
    draw_pipes(world, buf);
    draw_bird(world, sprite, buf);
    draw_hud(world, mic_ready, buf);

    match world.phase {
        Phase::Idle => draw_title(buf),
        Phase::GameOver => draw_game_over(world, buf),
        Phase::Running => {}
    }
}

fn draw_sky(buf: &mut PixelBuf) {
    for y in 0..buf.h {
        let t = (y as u16 * 256) / buf.h.max(1) as u16;
        let c = Rgb::lerp(SKY_TOP, SKY_BOT, t);
        for x in 0..buf.w {
            buf.set(x as i32, y as i32, c);
        }
    }
}

/// Fixed decorative cloud clusters: always the same four, never random.
fn draw_clouds(buf: &mut PixelBuf) {
    const CLOUDS: [(f64, f64, f64); 4] = [
        (100.0, 100.0, 30.0),
        (300.0, 150.0, 25.0),
        (500.0, 80.0, 35.0),
        (650.0, 120.0, 20.0),
    ];

    for &(x, y, size) in &CLOUDS {
        let cy = buf.wy(y);
        let r = buf.wx(size).max(1);
        buf.blend_circle(buf.wx(x), cy, r, CLOUD, CLOUD_ALPHA);
        buf.blend_circle(
            buf.wx(x + 20.0),
            cy,
            buf.wx(size * 0.8).max(1),
            CLOUD,
            CLOUD_ALPHA,
        );
        buf.blend_circle(
            buf.wx(x + 35.0),
            cy,
            buf.wx(size * 0.6).max(1),
            CLOUD,
            CLOUD_ALPHA,
        );
    }
}

fn draw_pipes(world: &World, buf: &mut PixelBuf) {
    for pipe in &world.pipes {
        let (x, y, w, h) = buf.world_rect(pipe.x, pipe.y, pipe.width, pipe.height);
        buf.fill_rect(x, y, w, h, PIPE_FILL);
        buf.stroke_rect(x, y, w, h, PIPE_EDGE);
    }
}

fn draw_bird(world: &World, sprite: &SpriteSlot, buf: &mut PixelBuf) {
    let (x, y, w, h) = buf.world_rect(BIRD_X, world.bird.y, BIRD_W, BIRD_H);

    sprite.with(|sprite| match sprite {
        Some(sprite) => {
            for py in 0..h {
                for px in 0..w {
                    let u = (px as f64 + 0.5) / w as f64;
                    let v = (py as f64 + 0.5) / h as f64;
                    if let Some(c) = sprite.sample(u, v) {
                        buf.set(x + px, y + py, c);
                    }
                }
            }
        }
        None => buf.fill_rect(x, y, w, h, BIRD_FALLBACK),
    });
}

fn draw_hud(world: &World, mic_ready: bool, buf: &mut PixelBuf) {
    draw_number(buf, buf.w as i32 / 2, 3, world.score, WHITE);

    // Volume indicator, bottom-up along the left edge.
    let max_h = buf.h as i32 - 4;
    let bar_h = (world.volume_pct / 100.0 * max_h as f64) as i32;
    buf.fill_rect(1, buf.h as i32 - 2 - bar_h, 3, bar_h, VOLUME_BAR);

    if !mic_ready {
        buf.fill_rect(1, 1, 3, 3, NO_MIC);
    }
}

fn draw_title(buf: &mut PixelBuf) {
    let cx = buf.w as i32 / 2;
    let cy = buf.h as i32 / 4;
    let scale = buf.h as f64 / 48.0;
    let char_w = (4.0 * scale).max(3.0) as i32;
    let char_h = (6.0 * scale).max(4.0) as i32;

    // "SCREAM" in big blocky letters.
    let text = "SCREAM";
    let total_w = text.len() as i32 * char_w;
    let sx = cx - total_w / 2;
    for (i, _) in text.chars().enumerate() {
        let bx = sx + i as i32 * char_w;
        buf.fill_rect(bx, cy, char_w - 1, char_h, BIRD_FALLBACK);
        buf.fill_rect(bx, cy, char_w - 1, 1, WHITE);
    }

    // Subtitle blocks.
    let sub_y = cy + char_h + 4;
    let msg = "YELL TO FLAP";
    let msg_w = msg.len() as i32 * 4;
    let msg_x = cx - msg_w / 2;
    for (i, ch) in msg.chars().enumerate() {
        if ch == ' ' {
            continue;
        }
        buf.fill_rect(msg_x + i as i32 * 4, sub_y, 3, 3, WHITE);
    }
}

fn draw_game_over(world: &World, buf: &mut PixelBuf) {
    let cx = buf.w as i32 / 2;
    let cy = buf.h as i32 / 2;
    let scale = buf.h as f64 / 48.0;
    let panel_w = (40.0 * scale).max(30.0) as i32;
    let panel_h = (20.0 * scale).max(16.0) as i32;

    // Dim the scene behind the panel.
    for y in 0..buf.h {
        for x in 0..buf.w {
            let c = buf.get(x, y);
            buf.set(x as i32, y as i32, Rgb(c.0 / 2, c.1 / 2, c.2 / 2));
        }
    }

    let px = cx - panel_w / 2;
    let py = cy - panel_h / 2;
    buf.fill_rect(px - 1, py - 1, panel_w + 2, panel_h + 2, SHADOW);
    buf.fill_rect(px, py, panel_w, panel_h, PANEL);
    buf.fill_rect(px + 1, py + 1, panel_w - 2, panel_h - 2, PANEL_LIGHT);

    // Final score, then session best below it.
    draw_number(buf, cx, py + 4, world.score, WHITE);
    draw_number(buf, cx, py + 12, world.best, BIRD_FALLBACK);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::World;

    #[test]
    fn test_world_to_pixel_mapping() {
        let buf = PixelBuf::new(80, 60);
        assert_eq!(buf.wx(0.0), 0);
        assert_eq!(buf.wx(WORLD_W), 80);
        assert_eq!(buf.wy(300.0), 30);

        // Adjacent world rects stay adjacent in pixels.
        let (x0, _, w0, _) = buf.world_rect(0.0, 0.0, 400.0, 100.0);
        let (x1, _, _, _) = buf.world_rect(400.0, 0.0, 400.0, 100.0);
        assert_eq!(x0 + w0, x1);
    }

    #[test]
    fn test_world_rect_never_degenerates() {
        let buf = PixelBuf::new(20, 10);
        let (_, _, w, h) = buf.world_rect(100.0, 300.0, 1.0, 1.0);
        assert!(w >= 1 && h >= 1);
    }

    #[test]
    fn test_set_out_of_bounds_is_ignored() {
        let mut buf = PixelBuf::new(4, 4);
        buf.set(-1, 0, WHITE);
        buf.set(0, -1, WHITE);
        buf.set(4, 0, WHITE);
        buf.set(0, 4, WHITE);
        assert_eq!(buf.get(0, 0), SKY_TOP);
    }

    #[test]
    fn test_bird_falls_back_to_rectangle_without_sprite() {
        let mut buf = PixelBuf::new(80, 60);
        let mut world = World::new();
        world.reset();
        draw_bird(&world, &SpriteSlot::empty(), &mut buf);

        let (x, y, w, h) = buf.world_rect(BIRD_X, world.bird.y, BIRD_W, BIRD_H);
        for py in 0..h {
            for px in 0..w {
                assert_eq!(buf.get((x + px) as usize, (y + py) as usize), BIRD_FALLBACK);
            }
        }
    }

    #[test]
    fn test_full_frame_draws_in_every_phase() {
        let mut buf = PixelBuf::new(60, 40);
        let sprite = SpriteSlot::empty();
        let mut world = World::new();

        draw(&world, &sprite, false, &mut buf);

        world.reset();
        world.volume_pct = 80.0;
        world.pipes.push(crate::world::Pipe {
            x: 400.0,
            y: 0.0,
            width: 60.0,
            height: 200.0,
            passed: false,
        });
        draw(&world, &sprite, true, &mut buf);

        world.phase = Phase::GameOver;
        draw(&world, &sprite, true, &mut buf);
    }

    #[test]
    fn test_render_writes_ansi_frame() {
        let buf = PixelBuf::new(8, 8);
        let mut out = Vec::new();
        buf.render(&mut out).unwrap();
        assert!(!out.is_empty());
    }
}
