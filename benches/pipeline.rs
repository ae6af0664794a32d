use beam_profiler::analysis::Preprocessor;
use beam_profiler::capture::{DeviceSelector, Frame, FrameSource, MockSource, StreamConfig};
use beam_profiler::pipeline::BeamPipeline;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;

fn mock_frame() -> Frame {
    let mut source = MockSource::new();
    source
        .start_stream(&DeviceSelector::default(), &StreamConfig::default())
        .expect("mock stream starts");
    source
        .next_frame(Duration::from_millis(100))
        .expect("mock frame")
}

fn bench_preprocess(c: &mut Criterion) {
    let image = mock_frame().to_bgr_image().expect("valid frame");
    let preprocessor = Preprocessor::new();

    c.bench_function("preprocess_640x480", |b| {
        b.iter(|| {
            let out = preprocessor.preprocess(black_box(&image), 15.0).expect("non-empty");
            black_box(out.threshold_map.peak());
        });
    });
}

fn bench_measure(c: &mut Criterion) {
    let frame = mock_frame();
    let pipeline = BeamPipeline::default();

    c.bench_function("measure_640x480", |b| {
        b.iter(|| {
            let m = pipeline.measure(black_box(&frame)).expect("valid frame");
            black_box(m.metrics.volume);
        });
    });
}

fn bench_process(c: &mut Criterion) {
    let frame = mock_frame();
    let pipeline = BeamPipeline::default();

    c.bench_function("process_with_overlay_640x480", |b| {
        b.iter(|| {
            let (out, metrics) = pipeline.process(black_box(&frame)).expect("valid frame");
            black_box((out.width(), metrics.volume));
        });
    });
}

criterion_group!(benches, bench_preprocess, bench_measure, bench_process);
criterion_main!(benches);
