//! Diagnostic overlay composition.

use super::canvas::{Canvas, Point, RasterCanvas, TextStyle};
use super::colormap;
use super::config::OverlayConfig;
use super::grid::RulerGrid;
use crate::analysis::{BeamExtent, Metrics};
use crate::pipeline::CalibrationParams;
use crate::raster::{Bgr, BgrImage, GrayImage};

/// Text shown when a frame has no beam.
pub const BEAM_NOT_FOUND: &str = "Beam not found";

/// One line of the info panel.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoRow {
    /// Left-hand label.
    pub title: String,
    /// Formatted value.
    pub value: String,
    /// Color of the value text.
    pub color: Bgr,
}

impl InfoRow {
    /// Creates a row.
    pub fn new(title: impl Into<String>, value: impl Into<String>, color: Bgr) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            color,
        }
    }
}

/// Info panel rows describing `metrics`.
///
/// Physical rows are added when the beam was found.
pub fn metrics_rows(
    metrics: &Metrics,
    calibration: &CalibrationParams,
    width: usize,
    height: usize,
) -> Vec<InfoRow> {
    let white = Bgr::WHITE;
    let mut rows = vec![
        InfoRow::new("Centroid X", format!("{} px", metrics.centroid_x_px()), white),
        InfoRow::new("Centroid Y", format!("{} px", metrics.centroid_y_px()), white),
        InfoRow::new("Dist X", format!("{:.1} px", metrics.dist_x_px), white),
        InfoRow::new("Dist Y", format!("{:.1} px", metrics.dist_y_px), white),
        InfoRow::new("Width", format!("{} px", metrics.width_px), white),
        InfoRow::new("Height", format!("{} px", metrics.height_px), white),
        InfoRow::new("Volume", metrics.volume.to_string(), white),
    ];
    if let Some(p) = metrics.to_physical(calibration, width, height) {
        rows.push(InfoRow::new("Pos X", format!("{:.0} um", p.centroid_x_um), Bgr::YELLOW));
        rows.push(InfoRow::new("Pos Y", format!("{:.0} um", p.centroid_y_um), Bgr::YELLOW));
        rows.push(InfoRow::new("Width", format!("{:.0} um", p.width_um), Bgr::YELLOW));
        rows.push(InfoRow::new("Height", format!("{:.0} um", p.height_um), Bgr::YELLOW));
    }
    rows
}

/// Draws the diagnostic overlay for one frame.
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    config: OverlayConfig,
}

impl OverlayRenderer {
    /// Creates a renderer with the given styling.
    pub fn new(config: OverlayConfig) -> Self {
        Self { config }
    }

    /// Returns the styling in use.
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Renders onto a fresh false-color image of `smoothed`.
    pub fn render(
        &self,
        smoothed: &GrayImage,
        metrics: &Metrics,
        extent: &BeamExtent,
        calibration: &CalibrationParams,
    ) -> BgrImage {
        let mut output = colormap::colorize(smoothed);
        let mut canvas = RasterCanvas::new(&mut output);
        self.draw(&mut canvas, smoothed, metrics, extent, calibration);
        output
    }

    /// Draws every overlay primitive on `canvas`.
    ///
    /// With no beam only the status message is drawn.
    pub fn draw<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        smoothed: &GrayImage,
        metrics: &Metrics,
        extent: &BeamExtent,
        calibration: &CalibrationParams,
    ) {
        let Some((cx, cy)) = metrics.centroid.position() else {
            self.draw_status(canvas, BEAM_NOT_FOUND);
            return;
        };
        let (cx, cy) = (cx as i64, cy as i64);

        self.draw_crosshair(canvas, cx, cy);
        self.draw_cuts(canvas, smoothed, cx, cy);
        self.draw_extent(canvas, extent);
        self.draw_ruler(canvas, calibration);

        if self.config.show_info_panel {
            let (w, h) = canvas.size();
            let rows = metrics_rows(metrics, calibration, w, h);
            self.draw_info(canvas, &rows);
        }
    }

    /// Status message in the top-left corner.
    pub fn draw_status<C: Canvas + ?Sized>(&self, canvas: &mut C, message: &str) {
        let style = TextStyle {
            scale: self.config.status_font_scale,
            thickness: self.config.status_thickness,
            color: self.config.status_color,
        };
        canvas.text(Point::new(10, 50), message, &style);
    }

    /// Title/value table anchored to the top-right corner.
    pub fn draw_info<C: Canvas + ?Sized>(&self, canvas: &mut C, rows: &[InfoRow]) {
        const ROW_STEP: i64 = 20;
        const VALUE_COLUMN: i64 = 170;

        let (w, _) = canvas.size();
        let title_x = w as i64 - 300;
        let mut y = ROW_STEP;
        for row in rows {
            let style = TextStyle {
                scale: self.config.font_scale,
                thickness: self.config.font_thickness,
                color: row.color,
            };
            canvas.text(Point::new(title_x, y), &row.title, &style);
            canvas.text(Point::new(title_x + VALUE_COLUMN, y), &row.value, &style);
            y += ROW_STEP;
        }
    }

    /// Small caption line at the top-left.
    pub fn draw_caption<C: Canvas + ?Sized>(&self, canvas: &mut C, text: &str, color: Bgr) {
        let style = TextStyle {
            scale: self.config.caption_font_scale,
            thickness: 1,
            color,
        };
        canvas.text(Point::new(20, 10), text, &style);
    }

    fn draw_crosshair<C: Canvas + ?Sized>(&self, canvas: &mut C, cx: i64, cy: i64) {
        let (w, h) = canvas.size();
        let color = self.config.crosshair_color;
        let t = self.config.line_width;
        canvas.line(Point::new(0, cy), Point::new(w as i64, cy), color, t);
        canvas.line(Point::new(cx, 0), Point::new(cx, h as i64), color, t);
    }

    /// Row and column intensity profiles through the centroid.
    ///
    /// The row profile rises from the bottom edge, the column profile
    /// extends from the left edge.
    fn draw_cuts<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        smoothed: &GrayImage,
        cx: i64,
        cy: i64,
    ) {
        let (w, h) = (smoothed.width(), smoothed.height());
        let color = self.config.cut_color;
        let t = self.config.line_width_bold;

        let row: Vec<Point> = (0..w)
            .map(|x| Point::new(x as i64, h as i64 - smoothed.get(x, cy as usize) as i64))
            .collect();
        let column: Vec<Point> = (0..h)
            .map(|y| Point::new(smoothed.get(cx as usize, y) as i64, y as i64))
            .collect();
        canvas.polyline(&row, color, t);
        canvas.polyline(&column, color, t);
    }

    fn draw_extent<C: Canvas + ?Sized>(&self, canvas: &mut C, extent: &BeamExtent) {
        let a = Point::new(extent.left as i64, extent.top as i64);
        let b = Point::new(extent.right() as i64, extent.bottom() as i64);
        canvas.rectangle(a, b, self.config.box_color, self.config.line_width_bold);
    }

    fn draw_ruler<C: Canvas + ?Sized>(&self, canvas: &mut C, calibration: &CalibrationParams) {
        let (w, h) = canvas.size();
        let grid = RulerGrid::compute(calibration, w, h);
        let h_i = h as i64;
        let cfg = &self.config;
        let color = cfg.ruler_color;
        let t = cfg.line_width;
        let style = TextStyle {
            scale: cfg.font_scale,
            thickness: cfg.font_thickness,
            color,
        };

        let ox = grid.origin.0.floor() as i64;
        let oy = grid.origin.1.floor() as i64;
        let r = cfg.center_cross_half_len;
        canvas.line(
            Point::new(ox, oy.saturating_sub(r)),
            Point::new(ox, oy.saturating_add(r)),
            color,
            t,
        );
        canvas.line(
            Point::new(ox.saturating_sub(r), oy),
            Point::new(ox.saturating_add(r), oy),
            color,
            t,
        );

        let tick_len = |emphasized: bool| {
            if emphasized {
                cfg.major_tick_len
            } else {
                cfg.minor_tick_len
            }
        };

        for tick in &grid.horizontal.majors {
            let x = tick.position;
            canvas.line(Point::new(x, h_i), Point::new(x, h_i - cfg.major_tick_len), color, t);
            let label = tick.label_um.to_string();
            let (tw, _) = canvas.text_size(&label, &style);
            canvas.text(Point::new(x.saturating_sub(tw / 2), h_i - cfg.label_offset), &label, &style);
        }
        for tick in &grid.horizontal.minors {
            let len = tick_len(tick.emphasized);
            let x = tick.position;
            canvas.line(Point::new(x, h_i), Point::new(x, h_i - len), color, t);
        }

        for tick in &grid.vertical.majors {
            let y = tick.position;
            canvas.line(Point::new(0, y), Point::new(cfg.major_tick_len, y), color, t);
            let label = tick.label_um.to_string();
            let (_, th) = canvas.text_size(&label, &style);
            canvas.text(Point::new(cfg.label_offset, y.saturating_add(th / 2)), &label, &style);
        }
        for tick in &grid.vertical.minors {
            let len = tick_len(tick.emphasized);
            let y = tick.position;
            canvas.line(Point::new(0, y), Point::new(len, y), color, t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Centroid;
    use crate::overlay::canvas::{Primitive, PrimitiveRecorder};

    fn found_metrics() -> (Metrics, BeamExtent) {
        let extent = BeamExtent {
            left: 100,
            top: 80,
            width: 41,
            height: 31,
        };
        let metrics = Metrics::from_stages(320, 240, Centroid::Present { x: 120, y: 95 }, &extent, 5000);
        (metrics, extent)
    }

    #[test]
    fn test_absent_draws_only_status() {
        let renderer = OverlayRenderer::default();
        let smoothed = GrayImage::new_fill(320, 240, 0);
        let mut rec = PrimitiveRecorder::new(320, 240);
        renderer.draw(
            &mut rec,
            &smoothed,
            &Metrics::empty(),
            &BeamExtent::default(),
            &CalibrationParams::default(),
        );
        assert_eq!(rec.primitives().len(), 1);
        assert_eq!(rec.texts(), vec![BEAM_NOT_FOUND]);
        match &rec.primitives()[0] {
            Primitive::Text { origin, style, .. } => {
                assert_eq!(*origin, Point::new(10, 50));
                assert_eq!(style.color, Bgr::RED);
            }
            other => panic!("unexpected primitive {other:?}"),
        }
    }

    #[test]
    fn test_crosshair_through_centroid() {
        let renderer = OverlayRenderer::default();
        let smoothed = GrayImage::new_fill(320, 240, 0);
        let (metrics, extent) = found_metrics();
        let mut rec = PrimitiveRecorder::new(320, 240);
        renderer.draw(&mut rec, &smoothed, &metrics, &extent, &CalibrationParams::default());

        let cross = rec.lines_with_color(Bgr::GRAY);
        assert_eq!(cross.len(), 2);
        assert_eq!(cross[0], (Point::new(0, 95), Point::new(320, 95)));
        assert_eq!(cross[1], (Point::new(120, 0), Point::new(120, 240)));
    }

    #[test]
    fn test_cuts_follow_profile() {
        let renderer = OverlayRenderer::default();
        let mut smoothed = GrayImage::new_fill(320, 240, 0);
        smoothed.set(10, 95, 200);
        smoothed.set(120, 30, 150);
        let (metrics, extent) = found_metrics();
        let mut rec = PrimitiveRecorder::new(320, 240);
        renderer.draw(&mut rec, &smoothed, &metrics, &extent, &CalibrationParams::default());

        let cuts = rec.lines_with_color(Bgr::YELLOW);
        assert_eq!(cuts.len(), 319 + 239);
        assert!(cuts.contains(&(Point::new(9, 240), Point::new(10, 40))));
        assert!(cuts.contains(&(Point::new(0, 29), Point::new(150, 30))));
    }

    #[test]
    fn test_extent_rectangle() {
        let renderer = OverlayRenderer::default();
        let smoothed = GrayImage::new_fill(320, 240, 0);
        let (metrics, extent) = found_metrics();
        let mut rec = PrimitiveRecorder::new(320, 240);
        renderer.draw(&mut rec, &smoothed, &metrics, &extent, &CalibrationParams::default());

        let bold_white: Vec<_> = rec
            .primitives()
            .iter()
            .filter_map(|p| match *p {
                Primitive::Line {
                    from,
                    to,
                    color,
                    thickness,
                } if color == Bgr::WHITE && thickness == 2 => Some((from, to)),
                _ => None,
            })
            .collect();
        assert_eq!(bold_white.len(), 4);
        assert_eq!(bold_white[0], (Point::new(100, 80), Point::new(141, 80)));
        assert_eq!(bold_white[1], (Point::new(141, 80), Point::new(141, 111)));
    }

    #[test]
    fn test_ruler_labels() {
        let renderer = OverlayRenderer::default();
        let smoothed = GrayImage::new_fill(640, 480, 0);
        let extent = BeamExtent::default();
        let metrics = Metrics::from_stages(640, 480, Centroid::Present { x: 320, y: 240 }, &extent, 0);
        let mut rec = PrimitiveRecorder::new(640, 480);
        renderer.draw(&mut rec, &smoothed, &metrics, &extent, &CalibrationParams::new(5.86, 15.0));

        let texts = rec.texts();
        // Horizontal labels first, then vertical.
        assert_eq!(&texts[..4], &["2000", "1000", "0", "-1000"]);
        assert_eq!(&texts[4..], &["-2000", "-1000", "0", "1000"]);
    }

    #[test]
    fn test_info_panel_toggle() {
        let smoothed = GrayImage::new_fill(320, 240, 0);
        let (metrics, extent) = found_metrics();

        let mut rec = PrimitiveRecorder::new(320, 240);
        let config = OverlayConfig {
            show_info_panel: true,
            ..Default::default()
        };
        OverlayRenderer::new(config).draw(&mut rec, &smoothed, &metrics, &extent, &CalibrationParams::default());
        assert!(rec.texts().contains(&"Volume"));
        assert!(rec.texts().contains(&"5000"));

        let mut rec = PrimitiveRecorder::new(320, 240);
        OverlayRenderer::default().draw(&mut rec, &smoothed, &metrics, &extent, &CalibrationParams::default());
        assert!(!rec.texts().contains(&"Volume"));
    }

    #[test]
    fn test_render_starts_from_false_color() {
        let smoothed = GrayImage::new_fill(64, 48, 100);
        let out = OverlayRenderer::default().render(
            &smoothed,
            &Metrics::empty(),
            &BeamExtent::default(),
            &CalibrationParams::default(),
        );
        assert_eq!((out.width(), out.height()), (64, 48));
        // Bottom-right corner is far from the status text.
        assert_eq!(out.get(63, 47), colormap::false_color(100));
    }

    #[test]
    fn test_render_survives_out_of_range_calibration() {
        let smoothed = GrayImage::new_fill(320, 240, 0);
        let (metrics, extent) = found_metrics();
        for calibration in [
            CalibrationParams::new(1e-16, 15.0),
            CalibrationParams::new(5.86, 15.0).with_center_offset(1e30, -1e30),
        ] {
            let out = OverlayRenderer::default().render(&smoothed, &metrics, &extent, &calibration);
            assert_eq!((out.width(), out.height()), (320, 240));
        }
    }

    #[test]
    fn test_metrics_rows_physical() {
        let (metrics, _) = found_metrics();
        let rows = metrics_rows(&metrics, &CalibrationParams::default(), 320, 240);
        assert_eq!(rows.len(), 11);
        assert_eq!(rows[0].value, "120 px");
        assert_eq!(metrics_rows(&Metrics::empty(), &CalibrationParams::default(), 320, 240).len(), 7);
    }
}
