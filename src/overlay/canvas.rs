//! Drawing surface abstraction.
//!
//! The renderer only speaks in primitives (lines, polylines, rectangles,
//! text). `RasterCanvas` turns them into pixels; `PrimitiveRecorder`
//! keeps them as values so overlays can be checked without rasterizing.

use super::font;
use crate::raster::{Bgr, BgrImage};
use image::Rgb;
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

/// Integer pixel position; may lie outside the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    /// Column.
    pub x: i64,
    /// Row.
    pub y: i64,
}

impl Point {
    /// Creates a point.
    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Font parameters for a text primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font scale; one glyph pixel is `round(scale * 3)` canvas pixels.
    pub scale: f64,
    /// Brush size per glyph pixel.
    pub thickness: u32,
    /// Text color.
    pub color: Bgr,
}

/// A surface the overlay renderer can draw on.
pub trait Canvas {
    /// `(width, height)` in pixels.
    fn size(&self) -> (usize, usize);

    /// Straight segment between two points, both inclusive.
    fn line(&mut self, from: Point, to: Point, color: Bgr, thickness: u32);

    /// Text with its baseline-left corner at `origin`.
    fn text(&mut self, origin: Point, text: &str, style: &TextStyle);

    /// Connected segments through `points`.
    fn polyline(&mut self, points: &[Point], color: Bgr, thickness: u32) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], color, thickness);
        }
    }

    /// Rectangle outline through two opposite corners.
    fn rectangle(&mut self, a: Point, b: Point, color: Bgr, thickness: u32) {
        let c = Point::new(b.x, a.y);
        let d = Point::new(a.x, b.y);
        self.line(a, c, color, thickness);
        self.line(c, b, color, thickness);
        self.line(b, d, color, thickness);
        self.line(d, a, color, thickness);
    }

    /// Pixel size of `text` in `style`.
    fn text_size(&self, text: &str, style: &TextStyle) -> (i64, i64) {
        font::measure(text, style.scale)
    }
}

/// Canvas that rasterizes onto a `BgrImage`.
pub struct RasterCanvas<'a> {
    surface: BgrSurface<'a>,
}

impl<'a> RasterCanvas<'a> {
    /// Creates a canvas drawing directly into `image`.
    pub fn new(image: &'a mut BgrImage) -> Self {
        Self {
            surface: BgrSurface(image),
        }
    }

    /// Square brush of side `thickness` centered on `(x, y)`.
    fn stamp(&mut self, x: i64, y: i64, color: Bgr, thickness: u32) {
        let t = thickness.max(1);
        let lo = -(i64::from(t) / 2);
        let (Ok(left), Ok(top)) = (
            i32::try_from(x.saturating_add(lo)),
            i32::try_from(y.saturating_add(lo)),
        ) else {
            return;
        };
        draw_filled_rect_mut(
            &mut self.surface,
            Rect::at(left, top).of_size(t, t),
            Rgb(color.to_array()),
        );
    }
}

impl Canvas for RasterCanvas<'_> {
    fn size(&self) -> (usize, usize) {
        (self.surface.0.width(), self.surface.0.height())
    }

    fn line(&mut self, from: Point, to: Point, color: Bgr, thickness: u32) {
        let t = i64::from(thickness.max(1));
        let lo = -(t / 2);
        let hi = (t - 1) / 2;
        let (w, h) = self.size();
        let Some((start, end)) = clip_segment(from, to, w, h, t) else {
            return;
        };
        // Thick lines are the 1px segment swept by a square brush.
        for dy in lo..=hi {
            for dx in lo..=hi {
                let (dx, dy) = (dx as f32, dy as f32);
                draw_line_segment_mut(
                    &mut self.surface,
                    (start.0 + dx, start.1 + dy),
                    (end.0 + dx, end.1 + dy),
                    Rgb(color.to_array()),
                );
            }
        }
    }

    fn text(&mut self, origin: Point, text: &str, style: &TextStyle) {
        let mut lit = Vec::new();
        font::rasterize(text, origin.x, origin.y, style.scale, |x, y| lit.push((x, y)));
        for (x, y) in lit {
            self.stamp(x, y, style.color, style.thickness);
        }
    }
}

/// `imageproc` drawing target over a `BgrImage`. Pixels carry BGR bytes
/// in an `Rgb` container; nothing here reorders channels.
struct BgrSurface<'a>(&'a mut BgrImage);

impl imageproc::drawing::Canvas for BgrSurface<'_> {
    type Pixel = Rgb<u8>;

    fn dimensions(&self) -> (u32, u32) {
        (self.0.width() as u32, self.0.height() as u32)
    }

    fn get_pixel(&self, x: u32, y: u32) -> Rgb<u8> {
        Rgb(self.0.get(x as usize, y as usize).to_array())
    }

    fn draw_pixel(&mut self, x: u32, y: u32, color: Rgb<u8>) {
        let [b, g, r] = color.0;
        self.0.set(x as usize, y as usize, Bgr(b, g, r));
    }
}

/// Liang-Barsky clip of `from`-`to` against the canvas grown by `margin`
/// on every side. Endpoints come back rounded to whole pixels.
fn clip_segment(
    from: Point,
    to: Point,
    width: usize,
    height: usize,
    margin: i64,
) -> Option<((f32, f32), (f32, f32))> {
    let (x0, y0) = (from.x as f64, from.y as f64);
    let (dx, dy) = (to.x as f64 - x0, to.y as f64 - y0);
    let m = margin as f64;
    let (x_max, y_max) = (width as f64 - 1.0 + m, height as f64 - 1.0 + m);

    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [(-dx, x0 + m), (dx, x_max - x0), (-dy, y0 + m), (dy, y_max - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| ((x0 + t * dx).round() as f32, (y0 + t * dy).round() as f32);
    Some((at(t0), at(t1)))
}

/// A drawing primitive captured by `PrimitiveRecorder`.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// A segment from `Canvas::line`.
    Line {
        from: Point,
        to: Point,
        color: Bgr,
        thickness: u32,
    },
    /// A string from `Canvas::text`.
    Text {
        origin: Point,
        text: String,
        style: TextStyle,
    },
}

/// Canvas that records primitives instead of drawing them.
#[derive(Debug, Clone)]
pub struct PrimitiveRecorder {
    width: usize,
    height: usize,
    primitives: Vec<Primitive>,
}

impl PrimitiveRecorder {
    /// Creates an empty recorder for a `width`×`height` surface.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            primitives: Vec::new(),
        }
    }

    /// Returns everything drawn so far, in order.
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// All recorded text strings, in drawing order.
    pub fn texts(&self) -> Vec<&str> {
        self.primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Recorded lines of a given color.
    pub fn lines_with_color(&self, color: Bgr) -> Vec<(Point, Point)> {
        self.primitives
            .iter()
            .filter_map(|p| match *p {
                Primitive::Line { from, to, color: c, .. } if c == color => Some((from, to)),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for PrimitiveRecorder {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn line(&mut self, from: Point, to: Point, color: Bgr, thickness: u32) {
        self.primitives.push(Primitive::Line {
            from,
            to,
            color,
            thickness,
        });
    }

    fn text(&mut self, origin: Point, text: &str, style: &TextStyle) {
        self.primitives.push(Primitive::Text {
            origin,
            text: text.to_string(),
            style: *style,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line_inclusive() {
        let mut img = BgrImage::new_fill(10, 3, Bgr::BLACK);
        RasterCanvas::new(&mut img).line(Point::new(2, 1), Point::new(6, 1), Bgr::WHITE, 1);
        let lit: Vec<usize> = (0..10).filter(|&x| img.get(x, 1) == Bgr::WHITE).collect();
        assert_eq!(lit, vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_diagonal_line() {
        let mut img = BgrImage::new_fill(5, 5, Bgr::BLACK);
        RasterCanvas::new(&mut img).line(Point::new(4, 4), Point::new(0, 0), Bgr::RED, 1);
        for i in 0..5 {
            assert_eq!(img.get(i, i), Bgr::RED);
        }
    }

    #[test]
    fn test_thick_line_width() {
        let mut img = BgrImage::new_fill(10, 10, Bgr::BLACK);
        RasterCanvas::new(&mut img).line(Point::new(0, 5), Point::new(9, 5), Bgr::WHITE, 2);
        assert_eq!(img.get(3, 4), Bgr::WHITE);
        assert_eq!(img.get(3, 5), Bgr::WHITE);
        assert_eq!(img.get(3, 6), Bgr::BLACK);
    }

    #[test]
    fn test_offscreen_line_clips() {
        let mut img = BgrImage::new_fill(4, 4, Bgr::BLACK);
        RasterCanvas::new(&mut img).line(Point::new(-10, 2), Point::new(20, 2), Bgr::WHITE, 1);
        assert!((0..4).all(|x| img.get(x, 2) == Bgr::WHITE));
    }

    #[test]
    fn test_extreme_line_is_clipped() {
        let mut img = BgrImage::new_fill(8, 4, Bgr::BLACK);
        let far = i64::MAX / 2;
        RasterCanvas::new(&mut img).line(Point::new(-far, 1), Point::new(far, 1), Bgr::WHITE, 1);
        assert!((0..8).all(|x| img.get(x, 1) == Bgr::WHITE));
        assert!((0..8).all(|x| img.get(x, 0) == Bgr::BLACK));
    }

    #[test]
    fn test_line_outside_canvas_draws_nothing() {
        let mut img = BgrImage::new_fill(8, 4, Bgr::BLACK);
        RasterCanvas::new(&mut img).line(Point::new(-50, -5), Point::new(50, -5), Bgr::WHITE, 1);
        assert!(img.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_line_keeps_channel_order() {
        let mut img = BgrImage::new_fill(4, 4, Bgr::BLACK);
        RasterCanvas::new(&mut img).line(Point::new(0, 0), Point::new(3, 0), Bgr::RED, 1);
        assert_eq!(img.get(2, 0), Bgr::RED);
        assert_eq!(&img.data()[..3], &[0, 0, 255]);
    }

    #[test]
    fn test_rectangle_records_four_lines() {
        let mut rec = PrimitiveRecorder::new(20, 20);
        rec.rectangle(Point::new(1, 2), Point::new(5, 8), Bgr::WHITE, 2);
        let lines = rec.lines_with_color(Bgr::WHITE);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], (Point::new(1, 2), Point::new(5, 2)));
    }

    #[test]
    fn test_text_draws_pixels() {
        let mut img = BgrImage::new_fill(60, 30, Bgr::BLACK);
        let style = TextStyle {
            scale: 0.6,
            thickness: 1,
            color: Bgr::WHITE,
        };
        RasterCanvas::new(&mut img).text(Point::new(2, 20), "8", &style);
        assert!(img.data().iter().any(|&v| v == 255));
    }
}
