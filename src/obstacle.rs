//! Procedurally styled buildings rising from the bottom of the canvas.

use rand::Rng;

use crate::character::Character;
use crate::render::{BLACK, CircleSpan, Rect, Rgb, Surface};

pub const MIN_WIDTH: f64 = 50.0;
/// Widths are drawn from `[MIN_WIDTH, MIN_WIDTH + WIDTH_SPREAD)`.
pub const WIDTH_SPREAD: f64 = 30.0;
pub const MIN_HEIGHT: f64 = 50.0;

pub const BODY_COLORS: [Rgb; 7] = [
    Rgb::hex(0xA9A9A9),
    Rgb::hex(0x808080),
    Rgb::hex(0xD3D3D3),
    Rgb::hex(0xC0C0C0),
    Rgb::hex(0x8B4513),
    Rgb::hex(0xA0522D),
    Rgb::hex(0xB22222),
];

pub const WINDOW_COLORS: [Rgb; 5] = [
    Rgb::hex(0xFFFFFF),
    Rgb::hex(0xF0F8FF),
    Rgb::hex(0xE6E6FA),
    Rgb::hex(0xB0E0E6),
    Rgb::hex(0xADD8E6),
];

const WINDOW_SPACING: f64 = 5.0;
/// How far pointed, slanted and antenna roofs reach above the body.
const ROOF_RISE: f64 = 20.0;
const ANTENNA_WIDTH: f64 = 4.0;
const ANTENNA_TIP_RADIUS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoofStyle {
    Flat,
    Pointed,
    Antenna,
    Dome,
    Slanted,
}

impl RoofStyle {
    pub const ALL: [RoofStyle; 5] = [
        RoofStyle::Flat,
        RoofStyle::Pointed,
        RoofStyle::Antenna,
        RoofStyle::Dome,
        RoofStyle::Slanted,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPattern {
    Square,
    Rectangular,
}

impl WindowPattern {
    pub const ALL: [WindowPattern; 2] = [WindowPattern::Square, WindowPattern::Rectangular];

    /// Window `(width, height)` in canvas units.
    pub fn window_size(self) -> (f64, f64) {
        match self {
            WindowPattern::Square => (10.0, 10.0),
            WindowPattern::Rectangular => (10.0, 20.0),
        }
    }
}

fn pick<T: Copy, R: Rng + ?Sized>(rng: &mut R, options: &[T]) -> T {
    options[rng.gen_range(0..options.len())]
}

/// One building. Only `x` changes after creation.
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub x: f64,
    width: f64,
    height: f64,
    body: Rgb,
    window: Rgb,
    roof: RoofStyle,
    pattern: WindowPattern,
}

impl Obstacle {
    /// Roll a fresh building with its left edge at `x`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, x: f64, canvas_height: f64) -> Self {
        Self {
            x,
            width: MIN_WIDTH + rng.gen_range(0.0..WIDTH_SPREAD),
            height: MIN_HEIGHT + rng.gen_range(0.0..canvas_height / 2.0),
            body: pick(rng, &BODY_COLORS),
            window: pick(rng, &WINDOW_COLORS),
            roof: pick(rng, &RoofStyle::ALL),
            pattern: pick(rng, &WindowPattern::ALL),
        }
    }

    /// A building with explicit geometry and style.
    pub fn with_shape(
        x: f64,
        width: f64,
        height: f64,
        roof: RoofStyle,
        pattern: WindowPattern,
    ) -> Self {
        Self {
            x,
            width,
            height,
            body: BODY_COLORS[0],
            window: WINDOW_COLORS[0],
            roof,
            pattern,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn body_color(&self) -> Rgb {
        self.body
    }

    pub fn window_color(&self) -> Rgb {
        self.window
    }

    pub fn roof(&self) -> RoofStyle {
        self.roof
    }

    pub fn window_pattern(&self) -> WindowPattern {
        self.pattern
    }

    pub fn advance(&mut self, speed: f64) {
        self.x -= speed;
    }

    /// Past the left edge of the canvas.
    pub fn is_offscreen(&self) -> bool {
        self.x + self.width < 0.0
    }

    /// Box test of the character against the body. Roofs are decoration only.
    pub fn collides_with(&self, ch: &Character, canvas_height: f64) -> bool {
        ch.x < self.x + self.width
            && ch.x + ch.width > self.x
            && ch.y + ch.height > canvas_height - self.height
    }

    pub fn draw<S: Surface + ?Sized>(&self, s: &mut S, canvas_height: f64) {
        let top = canvas_height - self.height;
        s.fill_rect(Rect::new(self.x, top, self.width, self.height), self.body);

        let (ww, wh) = self.pattern.window_size();
        let mut wy = top + WINDOW_SPACING;
        while wy < canvas_height - wh {
            let mut wx = self.x + WINDOW_SPACING;
            while wx < self.x + self.width - ww {
                s.fill_rect(Rect::new(wx, wy, ww, wh), self.window);
                wx += ww + WINDOW_SPACING;
            }
            wy += wh + WINDOW_SPACING;
        }

        let (left, mid, right) = (self.x, self.x + self.width / 2.0, self.x + self.width);
        match self.roof {
            RoofStyle::Flat => {}
            RoofStyle::Pointed => {
                s.fill_triangle([(left, top), (mid, top - ROOF_RISE), (right, top)], self.body);
            }
            RoofStyle::Antenna => {
                s.fill_rect(
                    Rect::new(
                        mid - ANTENNA_WIDTH / 2.0,
                        top - ROOF_RISE,
                        ANTENNA_WIDTH,
                        ROOF_RISE,
                    ),
                    BLACK,
                );
                s.fill_circle(
                    (mid, top - ROOF_RISE - ANTENNA_TIP_RADIUS),
                    ANTENNA_TIP_RADIUS,
                    CircleSpan::Full,
                    BLACK,
                );
            }
            RoofStyle::Dome => {
                s.fill_circle((mid, top), self.width / 2.0, CircleSpan::Upper, self.body);
            }
            RoofStyle::Slanted => {
                s.fill_triangle([(left, top), (right, top - ROOF_RISE), (right, top)], self.body);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;
    use crate::render::testing::{DrawCall, Recorder};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const H: f64 = 600.0;

    fn roof_calls(o: &Obstacle) -> Vec<DrawCall> {
        let mut rec = Recorder::default();
        o.draw(&mut rec, H);
        rec.calls
            .into_iter()
            .filter(|c| match c {
                DrawCall::Rect(_, color) => *color == BLACK,
                DrawCall::Triangle(..) | DrawCall::Circle(..) => true,
                _ => false,
            })
            .collect()
    }

    #[test]
    fn test_generated_attributes_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            let o = Obstacle::generate(&mut rng, 800.0, H);
            assert!(o.width() >= 50.0 && o.width() < 80.0);
            assert!(o.height() >= 50.0 && o.height() < H / 2.0 + 50.0);
            assert!(BODY_COLORS.contains(&o.body_color()));
            assert!(WINDOW_COLORS.contains(&o.window_color()));
            assert!(RoofStyle::ALL.contains(&o.roof()));
            assert!(WindowPattern::ALL.contains(&o.window_pattern()));
            assert_eq!(o.x, 800.0);
        }
    }

    #[test]
    fn test_generation_covers_every_style() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let built: Vec<Obstacle> = (0..400)
            .map(|_| Obstacle::generate(&mut rng, 0.0, H))
            .collect();
        for roof in RoofStyle::ALL {
            assert!(built.iter().any(|o| o.roof() == roof), "{roof:?} never drawn");
        }
        for pattern in WindowPattern::ALL {
            assert!(built.iter().any(|o| o.window_pattern() == pattern));
        }
    }

    #[test]
    fn test_advance_moves_left_only() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut o = Obstacle::generate(&mut rng, 800.0, H);
        let before = o.clone();
        for n in 1..=10 {
            o.advance(2.0);
            assert!((o.x - (800.0 - 2.0 * n as f64)).abs() < 1e-9);
        }
        assert_eq!(o.width(), before.width());
        assert_eq!(o.height(), before.height());
        assert_eq!(o.body_color(), before.body_color());
        assert_eq!(o.window_color(), before.window_color());
        assert_eq!(o.roof(), before.roof());
        assert_eq!(o.window_pattern(), before.window_pattern());
    }

    #[test]
    fn test_offscreen_only_after_right_edge_passes_zero() {
        let mut o = Obstacle::with_shape(-59.0, 60.0, 100.0, RoofStyle::Flat, WindowPattern::Square);
        assert!(!o.is_offscreen());
        o.advance(2.0);
        assert!(o.is_offscreen());
    }

    #[test]
    fn test_collision_box() {
        let ch = Character::new(H, &Tuning::default());
        // Character spans x 50..200, y 300..450.
        let tall = Obstacle::with_shape(100.0, 60.0, 200.0, RoofStyle::Flat, WindowPattern::Square);
        assert!(tall.collides_with(&ch, H));

        let short = Obstacle::with_shape(100.0, 60.0, 150.0, RoofStyle::Flat, WindowPattern::Square);
        assert!(!short.collides_with(&ch, H), "bottom edge exactly on the roof line");

        let ahead = Obstacle::with_shape(200.0, 60.0, 300.0, RoofStyle::Flat, WindowPattern::Square);
        assert!(!ahead.collides_with(&ch, H), "touching spans do not overlap");

        let trailing = Obstacle::with_shape(-5.0, 60.0, 300.0, RoofStyle::Flat, WindowPattern::Square);
        assert!(trailing.collides_with(&ch, H));

        let passed = Obstacle::with_shape(-10.0, 60.0, 300.0, RoofStyle::Flat, WindowPattern::Square);
        assert!(!passed.collides_with(&ch, H));
    }

    #[test]
    fn test_roof_drawing_matches_style() {
        let mk = |roof| Obstacle::with_shape(100.0, 60.0, 200.0, roof, WindowPattern::Square);

        assert!(roof_calls(&mk(RoofStyle::Flat)).is_empty());

        let pointed = roof_calls(&mk(RoofStyle::Pointed));
        assert!(matches!(
            pointed.as_slice(),
            [DrawCall::Triangle([_, (x, y), _], _)] if *x == 130.0 && *y == 380.0
        ));

        let slanted = roof_calls(&mk(RoofStyle::Slanted));
        assert!(matches!(
            slanted.as_slice(),
            [DrawCall::Triangle([_, (x, y), _], _)] if *x == 160.0 && *y == 380.0
        ));

        let antenna = roof_calls(&mk(RoofStyle::Antenna));
        assert!(matches!(
            antenna.as_slice(),
            [DrawCall::Rect(..), DrawCall::Circle(_, r, CircleSpan::Full, _)] if *r == 5.0
        ));

        let dome = roof_calls(&mk(RoofStyle::Dome));
        assert!(matches!(
            dome.as_slice(),
            [DrawCall::Circle(_, r, CircleSpan::Upper, _)] if *r == 30.0
        ));
    }

    #[test]
    fn test_window_pattern_sets_window_size() {
        for (pattern, expected) in [
            (WindowPattern::Square, (10.0, 10.0)),
            (WindowPattern::Rectangular, (10.0, 20.0)),
        ] {
            let o = Obstacle::with_shape(0.0, 80.0, 200.0, RoofStyle::Flat, pattern);
            let mut rec = Recorder::default();
            o.draw(&mut rec, H);
            let windows: Vec<Rect> = rec
                .calls
                .iter()
                .filter_map(|c| match c {
                    DrawCall::Rect(r, color) if *color == o.window_color() => Some(*r),
                    _ => None,
                })
                .collect();
            assert!(!windows.is_empty());
            assert!(windows.iter().all(|r| (r.w, r.h) == expected));
            assert!(windows.iter().all(|r| r.x + r.w <= o.x + o.width()));
            assert!(windows.iter().all(|r| r.y >= H - o.height()));
        }
    }
}
