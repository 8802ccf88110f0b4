use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use blobseg_image::{Image, ImageSize};
use blobseg_imgproc::label::{label_connected_components, Connectivity};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn create_test_mask(width: usize, height: usize, density: f64) -> Image<u8, 1> {
    let mut rng = StdRng::seed_from_u64(42);
    let data = (0..(width * height))
        .map(|_| if rng.random_bool(density) { 255 } else { 0 })
        .collect();
    Image::new(ImageSize { width, height }, data).unwrap()
}

fn bench_label(c: &mut Criterion) {
    let mut group = c.benchmark_group("Connected Components");

    let (w, h) = (1920, 1080);
    for density in [0.1, 0.5, 0.9] {
        let src = create_test_mask(w, h, density);

        group.bench_with_input(
            BenchmarkId::new("label_eight", format!("{}x{}@{}", w, h, density)),
            &src,
            |b, src| {
                let mut dst = Image::from_size_val(src.size(), 0u32).unwrap();
                b.iter(|| {
                    black_box(label_connected_components(
                        src,
                        &mut dst,
                        Connectivity::Eight,
                    ))
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_label);
criterion_main!(benches);
