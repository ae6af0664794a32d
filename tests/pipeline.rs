use beam_profiler::analysis::{BeamExtent, Metrics, VolumeIntegrator};
use beam_profiler::capture::{DeviceSelector, Frame, FrameSource, MockSource, StreamConfig};
use beam_profiler::config::FileConfig;
use beam_profiler::overlay::{OverlayConfig, RulerGrid};
use beam_profiler::pipeline::{BeamPipeline, CalibrationParams, PipelineError};
use beam_profiler::raster::{Bgr, BgrImage, GrayImage};
use proptest::prelude::*;
use std::time::Duration;

fn gaussian_frame(width: usize, height: usize, cx: f64, cy: f64, sigma: f64) -> Frame {
    let mut image = BgrImage::new_fill(width, height, Bgr::BLACK);
    for y in 0..height {
        for x in 0..width {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            let v = (250.0 * (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp()).round() as u8;
            image.set(x, y, Bgr(v, v, v));
        }
    }
    Frame::from_bgr_image(image, 1)
}

fn rectangle_frame(width: usize, height: usize, rect: (usize, usize, usize, usize)) -> Frame {
    let (left, top, w, h) = rect;
    let mut image = BgrImage::new_fill(width, height, Bgr::BLACK);
    for y in top..top + h {
        for x in left..left + w {
            image.set(x, y, Bgr::WHITE);
        }
    }
    Frame::from_bgr_image(image, 1)
}

fn pipeline_with_threshold(threshold_percent: f64) -> BeamPipeline {
    BeamPipeline::new(
        CalibrationParams::new(5.86, threshold_percent),
        OverlayConfig::default(),
    )
    .unwrap()
}

#[test]
fn test_gaussian_centroid_within_two_pixels() {
    let frame = gaussian_frame(200, 160, 90.0, 70.0, 12.0);
    for threshold in [5.0, 15.0, 30.0] {
        let (_, metrics) = pipeline_with_threshold(threshold).process(&frame).unwrap();
        assert!(metrics.beam_found(), "threshold {threshold}");
        assert!(metrics.centroid_x_px().abs_diff(90) <= 2, "threshold {threshold}: {metrics:?}");
        assert!(metrics.centroid_y_px().abs_diff(70) <= 2, "threshold {threshold}: {metrics:?}");
    }
}

#[test]
fn test_black_frame_all_zero() {
    let frame = Frame::from_bgr_image(BgrImage::new_fill(120, 90, Bgr::BLACK), 1);
    let (output, metrics) = BeamPipeline::default().process(&frame).unwrap();
    assert_eq!(metrics, Metrics::empty());
    assert_eq!(metrics.centroid_x_px(), 0);
    assert_eq!(metrics.volume, 0);
    assert_eq!((output.width(), output.height()), (120, 90));
}

#[test]
fn test_rectangle_extent_matches_size() {
    let frame = rectangle_frame(200, 160, (70, 50, 60, 40));
    let (_, metrics) = BeamPipeline::default().process(&frame).unwrap();
    assert!(metrics.beam_found());
    assert!(metrics.width_px.abs_diff(60) <= 1, "{metrics:?}");
    assert!(metrics.height_px.abs_diff(40) <= 1, "{metrics:?}");
}

#[test]
fn test_distance_from_center() {
    let frame = rectangle_frame(200, 160, (20, 20, 30, 30));
    let (_, metrics) = BeamPipeline::default().process(&frame).unwrap();
    // Spot sits up and left of center.
    assert!(metrics.dist_x_px > 0.0);
    assert!(metrics.dist_y_px > 0.0);
    assert_eq!(metrics.dist_x_px, 100.0 - metrics.centroid_x_px() as f64);
}

#[test]
fn test_idempotent_and_input_untouched() {
    let frame = gaussian_frame(160, 120, 80.0, 60.0, 10.0);
    let before = frame.pixels().to_vec();
    let pipeline = BeamPipeline::default();

    let (out_a, metrics_a) = pipeline.process(&frame).unwrap();
    let (out_b, metrics_b) = pipeline.process(&frame).unwrap();

    assert_eq!(out_a.digest(), out_b.digest());
    assert_eq!(out_a, out_b);
    assert_eq!(metrics_a, metrics_b);
    assert_eq!(frame.pixels(), before.as_slice());
}

#[test]
fn test_zero_area_frame_rejected_and_pipeline_reusable() {
    let pipeline = BeamPipeline::default();
    let empty = Frame::bgr(Vec::new(), 0, 0, 1);
    match pipeline.process(&empty) {
        Err(PipelineError::InvalidFrame(_)) => {}
        other => panic!("expected InvalidFrame, got {other:?}"),
    }

    let short = Frame::bgr(vec![0; 10], 4, 4, 2);
    assert!(matches!(pipeline.process(&short), Err(PipelineError::InvalidFrame(_))));

    let frame = gaussian_frame(80, 60, 40.0, 30.0, 6.0);
    assert!(pipeline.process(&frame).unwrap().1.beam_found());
}

#[test]
fn test_mono_frame_matches_bgr() {
    let bgr = gaussian_frame(96, 64, 50.0, 30.0, 7.0);
    let gray: Vec<u8> = bgr.pixels().chunks_exact(3).map(|p| p[0]).collect();
    let mono = Frame::mono(gray, 96, 64, 1);

    let pipeline = BeamPipeline::default();
    let (out_bgr, m_bgr) = pipeline.process(&bgr).unwrap();
    let (out_mono, m_mono) = pipeline.process(&mono).unwrap();
    assert_eq!(m_bgr, m_mono);
    assert_eq!(out_bgr, out_mono);
}

#[test]
fn test_mock_stream_end_to_end() {
    let mut source = MockSource::new();
    source
        .start_stream(&DeviceSelector::default(), &StreamConfig::default())
        .unwrap();
    let pipeline = BeamPipeline::default();

    for _ in 0..3 {
        let frame = source.next_frame(Duration::from_millis(100)).unwrap();
        let (_, report) = pipeline.process_with_report(&frame).unwrap();
        assert!(report.metrics.beam_found());
        assert!(report.metrics.centroid_x_px().abs_diff(320) <= 2);
        assert!(report.metrics.centroid_y_px().abs_diff(240) <= 2);
    }
    source.stop_stream();
    assert!(!source.is_streaming());
}

#[test]
fn test_config_file_drives_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("beam.toml");
    std::fs::write(
        &path,
        r#"
        [calibration]
        pixel_size_um = 5.86
        threshold_percent = 30

        [overlay]
        show_info_panel = true
        "#,
    )
    .unwrap();

    let config = FileConfig::from_file(&path).unwrap();
    let pipeline = BeamPipeline::new(config.calibration.clone(), config.overlay.clone()).unwrap();
    assert_eq!(pipeline.calibration().threshold_percent, 30.0);
    assert!(pipeline.renderer().config().show_info_panel);

    let grid = RulerGrid::compute(pipeline.calibration(), 640, 480);
    assert_eq!(grid.major_step_px, 170);
}

#[test]
fn test_ruler_label_directions() {
    let grid = RulerGrid::compute(&CalibrationParams::new(5.86, 15.0), 1280, 960);
    let h: Vec<i64> = grid.horizontal.majors.iter().map(|t| t.label_um).collect();
    let v: Vec<i64> = grid.vertical.majors.iter().map(|t| t.label_um).collect();
    assert!(h.windows(2).all(|w| w[0] - w[1] == 1000));
    assert!(v.windows(2).all(|w| w[1] - w[0] == 1000));
    assert!(h.contains(&0) && v.contains(&0));
}

proptest! {
    #[test]
    fn prop_volume_monotonic_in_brightness(
        background in 0u8..64,
        low in 64u8..=255,
        boost in 0u8..=64,
    ) {
        let high = low.saturating_add(boost);
        let extent = BeamExtent { left: 10, top: 8, width: 20, height: 12 };

        let paint = |level: u8| {
            let mut img = GrayImage::new_fill(48, 32, background);
            for y in extent.top..extent.bottom() {
                for x in extent.left..extent.right() {
                    img.set(x, y, level);
                }
            }
            img
        };

        let integrator = VolumeIntegrator::new();
        let v_low = integrator.integrate(&paint(low), &extent);
        let v_high = integrator.integrate(&paint(high), &extent);
        prop_assert!(v_high >= v_low);
        prop_assert_eq!(v_low, low as u64 * 240);
    }

    #[test]
    fn prop_extent_stays_in_frame(
        left in 0usize..60,
        top in 0usize..40,
        w in 4usize..40,
        h in 4usize..30,
    ) {
        let frame = rectangle_frame(100, 70, (left, top, w.min(100 - left), h.min(70 - top)));
        let (_, metrics) = BeamPipeline::default().process(&frame).unwrap();
        if metrics.beam_found() {
            prop_assert!(metrics.centroid_x_px() < 100);
            prop_assert!(metrics.centroid_y_px() < 70);
            prop_assert!(metrics.width_px <= 100);
            prop_assert!(metrics.height_px <= 70);
        }
    }
}
