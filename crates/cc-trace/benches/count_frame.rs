use cc_core::{Frame, Rgb8};
use cc_trace::CellCounter;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

const LINE: Rgb8 = Rgb8::new(255, 127, 127);

fn synthetic_frame(width: usize, height: usize) -> Frame {
    let mut frame = Frame::new_fill(width, height, Rgb8::new(255, 255, 255));

    // A grid of hollow squares plus a few open segments.
    let side = 24;
    for y0 in (8..height.saturating_sub(side + 8)).step_by(side + 12) {
        for x0 in (8..width.saturating_sub(side + 8)).step_by(side + 12) {
            for i in 0..side {
                *frame.get_mut(x0 + i, y0).expect("top") = LINE;
                *frame.get_mut(x0 + i, y0 + side - 1).expect("bottom") = LINE;
                *frame.get_mut(x0, y0 + i).expect("left") = LINE;
                *frame.get_mut(x0 + side - 1, y0 + i).expect("right") = LINE;
            }
        }
    }

    for x in 4..width.saturating_sub(4) {
        if x % 3 != 0 {
            *frame.get_mut(x, height - 4).expect("segment") = LINE;
        }
    }

    frame
}

fn bench_count_frame(c: &mut Criterion) {
    let frame = synthetic_frame(1280, 1024);

    c.bench_function("cc_trace_count_frame_1280x1024", |b| {
        b.iter(|| {
            let mut counter = CellCounter::default();
            let stats = counter
                .count_frame(black_box(&frame))
                .expect("non-empty frame");
            black_box(stats.cells);
        });
    });
}

criterion_group!(benches, bench_count_frame);
criterion_main!(benches);
