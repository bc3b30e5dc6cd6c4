//! Half-block terminal renderer.
//!
//! Every terminal cell holds two vertical pixels drawn with `▀`: the top
//! pixel is the foreground color and the bottom one the background. The
//! renderer only reads the engine; world coordinates are scaled onto
//! whatever pixel buffer the terminal currently provides.

use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};
use rand::Rng;

use crate::engine::Engine;

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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

    const fn dim(self) -> Rgb {
        Rgb(self.0 / 2, self.1 / 2, self.2 / 2)
    }
}

const SKY_TOP: Rgb = Rgb(70, 180, 200);
const SKY_BOT: Rgb = Rgb(190, 232, 245);
const PIPE_L: Rgb = Rgb(74, 122, 26);
const PIPE_M: Rgb = Rgb(100, 170, 40);
const PIPE_R: Rgb = Rgb(115, 191, 46);
const PIPE_HI: Rgb = Rgb(145, 215, 62);
const CAP_DARK: Rgb = Rgb(60, 100, 20);
const BIRD_Y: Rgb = Rgb(245, 200, 66);
const BIRD_HI: Rgb = Rgb(255, 225, 100);
const BIRD_WING: Rgb = Rgb(215, 165, 35);
const BIRD_EYE: Rgb = Rgb(255, 255, 255);
const BIRD_PUPIL: Rgb = Rgb(20, 20, 20);
const BIRD_BEAK: Rgb = Rgb(225, 75, 35);
const HILL_FAR: Rgb = Rgb(120, 195, 75);
const HILL_NEAR: Rgb = Rgb(95, 175, 55);
const PANEL: Rgb = Rgb(210, 185, 110);
const PANEL_IN: Rgb = Rgb(220, 195, 120);
const GAME_OVER_RED: Rgb = Rgb(220, 50, 40);
const WHITE: Rgb = Rgb(255, 255, 255);
const SHADOW: Rgb = Rgb(30, 30, 30);

// ── Pixel buffer ────────────────────────────────────────────────────────────

pub struct PixelBuf {
    w: usize,
    h: usize, // pixel height = terminal rows * 2
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

    /// Buffer covering a terminal of `cols` × `rows` cells.
    pub fn for_terminal(cols: u16, rows: u16) -> Self {
        Self::new(cols as usize, rows as usize * 2)
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, SKY_TOP);
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
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

    /// Flush the buffer to the terminal, only emitting color changes.
    pub fn flush_to(&self, out: &mut impl Write) -> io::Result<()> {
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
                        queue!(out, style::SetBackgroundColor(to_term(top)))?;
                        prev_bg = top;
                        need_bg = false;
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if need_fg || prev_fg != top {
                        queue!(out, style::SetForegroundColor(to_term(top)))?;
                        prev_fg = top;
                        need_fg = false;
                    }
                    if need_bg || prev_bg != bot {
                        queue!(out, style::SetBackgroundColor(to_term(bot)))?;
                        prev_bg = bot;
                        need_bg = false;
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row + 1 < rows {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                need_fg = true;
                need_bg = true;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

fn to_term(c: Rgb) -> CColor {
    CColor::Rgb {
        r: c.0,
        g: c.1,
        b: c.2,
    }
}

// ── 3x5 bitmap glyphs ───────────────────────────────────────────────────────

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

fn draw_glyph(buf: &mut PixelBuf, x: i32, y: i32, glyph: &[u8; 15], fg: Rgb) {
    for row in 0..5 {
        for col in 0..3 {
            if glyph[row * 3 + col] == 1 {
                let px = x + col as i32;
                let py = y + row as i32;
                buf.set(px + 1, py + 1, SHADOW);
                buf.set(px, py, fg);
            }
        }
    }
}

/// Draw `n` centered on `cx`, 3px per digit plus 1px spacing.
fn draw_number(buf: &mut PixelBuf, cx: i32, y: i32, n: u32, fg: Rgb) {
    let s = n.to_string();
    let total_w = s.len() as i32 * 4 - 1;
    let start_x = cx - total_w / 2;
    for (i, ch) in s.bytes().enumerate() {
        let d = (ch - b'0') as usize;
        draw_glyph(buf, start_x + i as i32 * 4, y, &DIGITS[d], fg);
    }
}

// ── Scene ───────────────────────────────────────────────────────────────────

/// Paints one frame of engine state. `best` is the session's best score,
/// kept by the front-end and shown on the game-over panel.
pub struct Renderer {
    buf: PixelBuf,
}

impl Renderer {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            buf: PixelBuf::for_terminal(cols, rows),
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.buf.resize(cols as usize, rows as usize * 2);
    }

    pub fn buffer(&self) -> &PixelBuf {
        &self.buf
    }

    pub fn draw<R: Rng>(&mut self, engine: &Engine<R>, best: u32) {
        let view = View::fit(engine, &self.buf);
        let buf = &mut self.buf;
        draw_sky(buf);
        let scroll = engine.frame_count() as f64 * engine.config().scroll_speed * view.sx;
        draw_hills(buf, scroll, view.scale);
        draw_pipes(buf, engine, &view);
        draw_bird(buf, engine, &view);
        let cx = buf.w as i32 / 2;
        draw_number(buf, cx, 4, engine.score(), WHITE);
        if engine.is_game_over() {
            draw_game_over(buf, engine.score(), best, view.scale);
        }
    }

    pub fn flush_to(&self, out: &mut impl Write) -> io::Result<()> {
        self.buf.flush_to(out)
    }
}

/// World-to-buffer mapping for the current frame.
struct View {
    sx: f64,
    sy: f64,
    /// Detail scale relative to a 48px tall buffer.
    scale: f64,
}

impl View {
    fn fit<R: Rng>(engine: &Engine<R>, buf: &PixelBuf) -> Self {
        let config = engine.config();
        Self {
            sx: buf.w as f64 / config.screen_width,
            sy: buf.h as f64 / config.screen_height,
            scale: (buf.h as f64 / 48.0).max(0.5),
        }
    }

    fn x(&self, wx: f64) -> i32 {
        (wx * self.sx).round() as i32
    }

    fn y(&self, wy: f64) -> i32 {
        (wy * self.sy).round() as i32
    }
}

fn draw_sky(buf: &mut PixelBuf) {
    let h = buf.h;
    for y in 0..h {
        let t = (y * 256 / h.max(1)) as u16;
        let c = Rgb::lerp(SKY_TOP, SKY_BOT, t);
        for x in 0..buf.w {
            buf.set(x as i32, y as i32, c);
        }
    }
}

/// A parallax band of hills along the bottom edge.
struct HillLayer {
    /// Fraction of the world scroll this layer moves by.
    parallax: f64,
    freq: f64,
    amp: f64,
    ripple: f64,
    lift: f64,
    color: Rgb,
}

const HILLS: [HillLayer; 2] = [
    HillLayer { parallax: 0.25, freq: 0.04, amp: 6.0, ripple: 1.7, lift: 4.0, color: HILL_FAR },
    HillLayer { parallax: 0.5, freq: 0.06, amp: 4.0, ripple: 2.3, lift: 2.0, color: HILL_NEAR },
];

/// Top pixel row of `layer` at column `x` after the world scrolled
/// `scroll` buffer pixels.
fn hill_top(layer: &HillLayer, x: i32, scroll: f64, base: i32, scale: f64) -> i32 {
    let fx = (x as f64 + scroll * layer.parallax) * layer.freq;
    let h = (fx.sin() * layer.amp + (fx * layer.ripple).sin() * layer.amp / 2.0) * scale;
    base - h as i32 - (layer.lift * scale) as i32
}

fn draw_hills(buf: &mut PixelBuf, scroll: f64, scale: f64) {
    let base = buf.h as i32;
    for layer in &HILLS {
        for x in 0..buf.w as i32 {
            for y in hill_top(layer, x, scroll, base, scale)..base {
                buf.set(x, y, layer.color);
            }
        }
    }
}

fn draw_pipes<R: Rng>(buf: &mut PixelBuf, engine: &Engine<R>, view: &View) {
    let config = engine.config();
    let cap_extra = (view.scale).max(1.0) as i32;
    let cap_h = (2.0 * view.scale).max(1.0) as i32;
    let pw = (view.x(config.pipe_width)).max(1);
    let floor = buf.h as i32;

    for pipe in engine.pipes() {
        let px = view.x(pipe.x);
        let gap_top = view.y(pipe.top_height);
        let gap_bot = view.y(config.screen_height - pipe.bottom_height);

        for x in 0..pw {
            let c = pipe_shade(x, pw);
            for y in 0..gap_top - cap_h {
                buf.set(px + x, y, c);
            }
            for y in (gap_bot + cap_h)..floor {
                buf.set(px + x, y, c);
            }
        }

        if gap_top > 0 {
            for x in -cap_extra..(pw + cap_extra) {
                let c = pipe_shade(x + cap_extra, pw + cap_extra * 2);
                for y in (gap_top - cap_h)..gap_top {
                    buf.set(px + x, y, c);
                }
                buf.set(px + x, gap_top - 1, CAP_DARK);
            }
        }
        if gap_bot < floor {
            for x in -cap_extra..(pw + cap_extra) {
                let c = pipe_shade(x + cap_extra, pw + cap_extra * 2);
                for y in gap_bot..(gap_bot + cap_h) {
                    buf.set(px + x, y, c);
                }
                buf.set(px + x, gap_bot, CAP_DARK);
            }
        }
    }
}

fn pipe_shade(x: i32, total_w: i32) -> Rgb {
    if total_w <= 1 {
        return PIPE_M;
    }
    let t = (x as f64 / (total_w - 1) as f64 * 256.0) as u16;
    if t < 64 {
        Rgb::lerp(PIPE_L, PIPE_M, (t * 4).min(256))
    } else if t < 100 {
        Rgb::lerp(PIPE_M, PIPE_HI, ((t - 64) * 7).min(256))
    } else if t < 160 {
        Rgb::lerp(PIPE_HI, PIPE_R, ((t - 100) * 4).min(256))
    } else {
        Rgb::lerp(PIPE_R, PIPE_L, ((t - 160) * 3).min(256))
    }
}

/// Drawn over the bird's collision box.
fn draw_bird<R: Rng>(buf: &mut PixelBuf, engine: &Engine<R>, view: &View) {
    let bird = engine.bird();
    let x0 = view.x(bird.x);
    let y0 = view.y(bird.y);
    let bw = view.x(bird.x + bird.width).max(x0 + 2) - x0;
    let bh = view.y(bird.y + bird.height).max(y0 + 2) - y0;

    buf.fill_rect(x0, y0, bw, bh, BIRD_Y);
    buf.fill_rect(x0 + 1, y0, (bw - 2).max(1), 1, BIRD_HI);

    // Wing flaps every few frames, dips while falling.
    let wing_up = engine.frame_count() % 8 < 4 && bird.velocity < 0.0;
    let wing_y = if wing_up { y0 + bh / 2 - 1 } else { y0 + bh / 2 };
    buf.fill_rect(x0, wing_y, (bw / 2).max(1), (bh / 3).max(1), BIRD_WING);

    let ex = x0 + bw - (bw / 3).max(1) - 1;
    let ey = y0 + (bh / 4).max(1) - 1;
    buf.fill_rect(ex, ey, (bw / 4).max(1), (bh / 4).max(1), BIRD_EYE);
    buf.set(ex + (bw / 4).max(1) - 1, ey + (bh / 4).max(1) - 1, BIRD_PUPIL);

    let beak_h = (bh / 3).max(1);
    buf.fill_rect(x0 + bw, y0 + bh / 2 - beak_h / 2, (bw / 3).max(1), beak_h, BIRD_BEAK);
}

fn draw_game_over(buf: &mut PixelBuf, score: u32, best: u32, scale: f64) {
    for y in 0..buf.h {
        for x in 0..buf.w {
            let c = buf.get(x, y).dim();
            buf.set(x as i32, y as i32, c);
        }
    }

    let cx = buf.w as i32 / 2;
    let cy = buf.h as i32 / 2;
    let panel_w = (40.0 * scale).max(24.0) as i32;
    let panel_h = (22.0 * scale).max(22.0) as i32;
    let px = cx - panel_w / 2;
    let py = cy - panel_h / 2;
    buf.fill_rect(px - 1, py - 1, panel_w + 2, panel_h + 2, SHADOW);
    buf.fill_rect(px, py, panel_w, panel_h, PANEL);
    buf.fill_rect(px + 1, py + 1, panel_w - 2, panel_h - 2, PANEL_IN);

    // Red banner in place of a "game over" title.
    buf.fill_rect(px + 2, py + 2, panel_w - 4, 4, GAME_OVER_RED);
    draw_number(buf, cx, py + 9, score, WHITE);
    draw_number(buf, cx, py + 16, best, BIRD_Y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    #[test]
    fn test_set_out_of_bounds_is_ignored() {
        let mut buf = PixelBuf::new(4, 4);
        buf.set(-1, 0, WHITE);
        buf.set(0, -1, WHITE);
        buf.set(4, 0, WHITE);
        buf.set(0, 4, WHITE);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(buf.get(x, y), SKY_TOP);
            }
        }
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut buf = PixelBuf::new(4, 4);
        buf.fill_rect(2, 2, 10, 10, WHITE);
        assert_eq!(buf.get(3, 3), WHITE);
        assert_eq!(buf.get(1, 1), SKY_TOP);
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(Rgb::lerp(SKY_TOP, SKY_BOT, 0), SKY_TOP);
        assert_eq!(Rgb::lerp(SKY_TOP, SKY_BOT, 256), SKY_BOT);
    }

    #[test]
    fn test_bird_painted_at_scaled_position() {
        let engine = Engine::with_seed(GameConfig::default(), 7).unwrap();
        let mut renderer = Renderer::new(80, 40);
        renderer.draw(&engine, 0);
        // 80x80 pixels over a 400x400 world: the bird box starts at (10, 30).
        assert_eq!(renderer.buffer().get(11, 33), BIRD_Y);
    }

    #[test]
    fn test_draw_survives_tiny_and_resized_terminals() {
        let mut engine = Engine::with_seed(GameConfig::default(), 7).unwrap();
        let mut renderer = Renderer::new(1, 1);
        for _ in 0..200 {
            engine.tick();
            renderer.draw(&engine, 3);
        }
        assert!(engine.is_game_over());
        renderer.resize(120, 50);
        renderer.draw(&engine, 3);
        assert_eq!(renderer.buffer().width(), 120);
        assert_eq!(renderer.buffer().height(), 100);
    }

    #[test]
    fn test_hills_follow_world_scroll() {
        // Scrolling 8px moves the far layer 2px and the near layer 4px.
        for x in 0..40 {
            assert_eq!(hill_top(&HILLS[0], x, 8.0, 80, 1.0), hill_top(&HILLS[0], x + 2, 0.0, 80, 1.0));
            assert_eq!(hill_top(&HILLS[1], x, 8.0, 80, 1.0), hill_top(&HILLS[1], x + 4, 0.0, 80, 1.0));
        }
    }

    #[test]
    fn test_flush_emits_half_blocks() {
        let mut buf = PixelBuf::new(2, 2);
        buf.set(0, 0, WHITE);
        let mut out = Vec::new();
        buf.flush_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains('\u{2580}'));
    }
}
