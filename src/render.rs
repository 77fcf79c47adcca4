//! Drawing: the `Surface` the game draws on, and the terminal pixel buffer behind it.
//!
//! Game code draws in logical canvas units. `Viewport` scales those onto a
//! `PixelBuf`, which is flushed to the terminal two pixels per cell using the
//! upper-half-block glyph.

use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};

use crate::assets::{Assets, Sprite};
use crate::character::FRAME_COUNT;
use crate::session::{Phase, Session};

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn hex(v: u32) -> Rgb {
        Rgb((v >> 16) as u8, (v >> 8) as u8, v as u8)
    }

    const fn halved(self) -> Rgb {
        Rgb(self.0 / 2, self.1 / 2, self.2 / 2)
    }

    fn term(self) -> CColor {
        CColor::Rgb {
            r: self.0,
            g: self.1,
            b: self.2,
        }
    }
}

pub const SKY: Rgb = Rgb(135, 206, 235);
pub const BLACK: Rgb = Rgb(0, 0, 0);
const WHITE: Rgb = Rgb(255, 255, 255);
const SHADOW: Rgb = Rgb(30, 30, 30);
const BANNER: Rgb = Rgb(245, 200, 66);
const BANNER_HI: Rgb = Rgb(255, 225, 100);
const PANEL_EDGE: Rgb = Rgb(210, 185, 110);
const PANEL: Rgb = Rgb(220, 195, 120);

// ── Surface ─────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle in whatever units the caller is working in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircleSpan {
    Full,
    /// The half above the center line.
    Upper,
}

/// A 2D drawing context addressed in canvas units.
pub trait Surface {
    fn clear(&mut self, c: Rgb);
    fn fill_rect(&mut self, r: Rect, c: Rgb);
    fn fill_triangle(&mut self, pts: [(f64, f64); 3], c: Rgb);
    fn fill_circle(&mut self, center: (f64, f64), radius: f64, span: CircleSpan, c: Rgb);
    /// Copy `src` (sprite pixels) scaled into `dst` (canvas units).
    fn draw_image(&mut self, sprite: &Sprite, src: Rect, dst: Rect);
    /// Bitmap digits with their top-left at `(x, y)`.
    fn draw_number(&mut self, x: f64, y: f64, n: u32, c: Rgb);
    /// Darken everything drawn so far.
    fn dim(&mut self);
}

// ── Pixel buffer with half-block rendering ──────────────────────────────────

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
            px: vec![SKY; w * h],
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, SKY);
    }

    pub fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut pen = Pen::default();

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);
                if top == bot {
                    pen.background(out, top)?;
                    queue!(out, style::Print(' '))?;
                } else {
                    pen.foreground(out, top)?;
                    pen.background(out, bot)?;
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row + 1 < rows {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                pen = Pen::default();
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

/// Last colors sent to the terminal, so runs of equal cells skip the escape codes.
#[derive(Default)]
struct Pen {
    fg: Option<Rgb>,
    bg: Option<Rgb>,
}

impl Pen {
    fn foreground(&mut self, out: &mut impl Write, c: Rgb) -> io::Result<()> {
        if self.fg != Some(c) {
            queue!(out, style::SetForegroundColor(c.term()))?;
            self.fg = Some(c);
        }
        Ok(())
    }

    fn background(&mut self, out: &mut impl Write, c: Rgb) -> io::Result<()> {
        if self.bg != Some(c) {
            queue!(out, style::SetBackgroundColor(c.term()))?;
            self.bg = Some(c);
        }
        Ok(())
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

fn blit_number(buf: &mut PixelBuf, x: i32, y: i32, n: u32, fg: Rgb) {
    for (i, ch) in n.to_string().bytes().enumerate() {
        let glyph = &DIGITS[(ch - b'0') as usize];
        let gx = x + i as i32 * 4;
        for (k, &on) in glyph.iter().enumerate() {
            if on == 1 {
                let px = gx + (k % 3) as i32;
                let py = y + (k / 3) as i32;
                buf.set(px + 1, py + 1, SHADOW);
                buf.set(px, py, fg);
            }
        }
    }
}

// ── Viewport: canvas units onto the pixel buffer ────────────────────────────

pub struct Viewport<'a> {
    buf: &'a mut PixelBuf,
    sx: f64,
    sy: f64,
}

impl<'a> Viewport<'a> {
    pub fn new(buf: &'a mut PixelBuf, canvas_w: f64, canvas_h: f64) -> Self {
        let sx = buf.w as f64 / canvas_w;
        let sy = buf.h as f64 / canvas_h;
        Self { buf, sx, sy }
    }

    /// Pixel span `[from, to)` covering canvas span `[a, a + len)`, at least one pixel wide.
    fn span(a: f64, len: f64, scale: f64) -> (i32, i32) {
        let from = (a * scale).round() as i32;
        let to = ((a + len) * scale).round() as i32;
        (from, to.max(from + 1))
    }

    fn pixel_box(&self, r: Rect) -> (i32, i32, i32, i32) {
        let (x0, x1) = Self::span(r.x, r.w, self.sx);
        let (y0, y1) = Self::span(r.y, r.h, self.sy);
        (
            x0.max(0),
            x1.min(self.buf.w as i32),
            y0.max(0),
            y1.min(self.buf.h as i32),
        )
    }

    /// Canvas coordinates of the center of pixel `(px, py)`.
    fn canvas_point(&self, px: i32, py: i32) -> (f64, f64) {
        ((px as f64 + 0.5) / self.sx, (py as f64 + 0.5) / self.sy)
    }

    fn fill_where(&mut self, bounds: Rect, c: Rgb, inside: impl Fn(f64, f64) -> bool) {
        let (x0, x1, y0, y1) = self.pixel_box(bounds);
        for py in y0..y1 {
            for px in x0..x1 {
                let (cx, cy) = self.canvas_point(px, py);
                if inside(cx, cy) {
                    self.buf.set(px, py, c);
                }
            }
        }
    }
}

impl Surface for Viewport<'_> {
    fn clear(&mut self, c: Rgb) {
        self.buf.px.fill(c);
    }

    fn fill_rect(&mut self, r: Rect, c: Rgb) {
        if r.w <= 0.0 || r.h <= 0.0 {
            return;
        }
        let (x0, x1, y0, y1) = self.pixel_box(r);
        for py in y0..y1 {
            for px in x0..x1 {
                self.buf.set(px, py, c);
            }
        }
    }

    fn fill_triangle(&mut self, [a, b, p]: [(f64, f64); 3], c: Rgb) {
        let min_x = a.0.min(b.0).min(p.0);
        let max_x = a.0.max(b.0).max(p.0);
        let min_y = a.1.min(b.1).min(p.1);
        let max_y = a.1.max(b.1).max(p.1);
        let edge = |u: (f64, f64), v: (f64, f64), x: f64, y: f64| {
            (v.0 - u.0) * (y - u.1) - (v.1 - u.1) * (x - u.0)
        };
        self.fill_where(
            Rect::new(min_x, min_y, max_x - min_x, max_y - min_y),
            c,
            |x, y| {
                let d0 = edge(a, b, x, y);
                let d1 = edge(b, p, x, y);
                let d2 = edge(p, a, x, y);
                (d0 >= 0.0 && d1 >= 0.0 && d2 >= 0.0) || (d0 <= 0.0 && d1 <= 0.0 && d2 <= 0.0)
            },
        );
    }

    fn fill_circle(&mut self, (cx, cy): (f64, f64), radius: f64, span: CircleSpan, c: Rgb) {
        let bounds = Rect::new(cx - radius, cy - radius, radius * 2.0, radius * 2.0);
        self.fill_where(bounds, c, |x, y| {
            let (dx, dy) = (x - cx, y - cy);
            dx * dx + dy * dy <= radius * radius && (span == CircleSpan::Full || dy <= 0.0)
        });
    }

    fn draw_image(&mut self, sprite: &Sprite, src: Rect, dst: Rect) {
        if dst.w <= 0.0 || dst.h <= 0.0 {
            return;
        }
        let (x0, x1, y0, y1) = self.pixel_box(dst);
        for py in y0..y1 {
            for px in x0..x1 {
                let (cx, cy) = self.canvas_point(px, py);
                let u = src.x + (cx - dst.x) / dst.w * src.w;
                let v = src.y + (cy - dst.y) / dst.h * src.h;
                // Edge pixels may round outside dst; never bleed into the next frame.
                if u < src.x || u >= src.x + src.w || v < src.y || v >= src.y + src.h {
                    continue;
                }
                if let Some(c) = sprite.sample(u, v) {
                    self.buf.set(px, py, c);
                }
            }
        }
    }

    fn draw_number(&mut self, x: f64, y: f64, n: u32, c: Rgb) {
        let px = (x * self.sx).round() as i32;
        let py = (y * self.sy).round() as i32;
        blit_number(self.buf, px, py, n, c);
    }

    fn dim(&mut self) {
        for p in self.buf.px.iter_mut() {
            *p = p.halved();
        }
    }
}

// ── Scene ───────────────────────────────────────────────────────────────────

/// Draw one full frame of `session`.
pub fn draw_scene<S: Surface, R>(surface: &mut S, session: &Session<R>, assets: &Assets) {
    let canvas = session.canvas();
    surface.clear(SKY);

    let full = Rect::new(0.0, 0.0, canvas.width, canvas.height);
    if let Some(bg) = assets.background() {
        let src = Rect::new(0.0, 0.0, bg.width() as f64, bg.height() as f64);
        surface.draw_image(bg, src, full);
    }

    if session.phase() != Phase::Ready {
        let ch = session.character();
        if let Some(sheet) = assets.character_sprite() {
            let (fw, fh) = assets.frame_size();
            let frame = ch.frame_index() % FRAME_COUNT;
            let src = Rect::new(frame as f64 * fw, 0.0, fw, fh);
            surface.draw_image(sheet, src, Rect::new(ch.x, ch.y, ch.width, ch.height));
        }
        for obstacle in session.obstacles().iter() {
            obstacle.draw(surface, canvas.height);
        }
    }

    surface.draw_number(10.0, 10.0, session.score(), WHITE);

    match session.phase() {
        Phase::Ready => draw_title(surface, canvas.width, canvas.height),
        Phase::Terminal => draw_game_over(surface, session, canvas.width, canvas.height),
        Phase::Running => {}
    }
}

fn draw_title<S: Surface>(surface: &mut S, w: f64, h: f64) {
    // Block letters for "FLAPPY", then a bar standing in for "press enter".
    let letters = 6.0;
    let char_w = w * 0.06;
    let char_h = h * 0.12;
    let sx = w / 2.0 - letters * char_w / 2.0;
    let y = h / 4.0;
    for i in 0..letters as usize {
        let x = sx + i as f64 * char_w;
        surface.fill_rect(Rect::new(x, y, char_w * 0.8, char_h), BANNER);
        surface.fill_rect(Rect::new(x, y, char_w * 0.8, char_h * 0.15), BANNER_HI);
    }
    surface.fill_rect(
        Rect::new(w * 0.35, y + char_h * 1.4, w * 0.3, h * 0.02),
        WHITE,
    );
}

fn draw_game_over<S: Surface, R>(surface: &mut S, session: &Session<R>, w: f64, h: f64) {
    surface.dim();
    let pw = w * 0.4;
    let ph = h * 0.3;
    let panel = Rect::new(w / 2.0 - pw / 2.0, h / 2.0 - ph / 2.0, pw, ph);
    surface.fill_rect(
        Rect::new(panel.x - 4.0, panel.y - 4.0, pw + 8.0, ph + 8.0),
        SHADOW,
    );
    surface.fill_rect(panel, PANEL_EDGE);
    surface.fill_rect(
        Rect::new(panel.x + 6.0, panel.y + 6.0, pw - 12.0, ph - 12.0),
        PANEL,
    );
    surface.draw_number(w / 2.0 - 10.0, panel.y + ph * 0.2, session.score(), WHITE);
    surface.draw_number(w / 2.0 - 10.0, panel.y + ph * 0.6, session.best(), BANNER);
}
