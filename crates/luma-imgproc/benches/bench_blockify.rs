use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use luma_image::{Colorspace, ImageSize, PixelBuffer};
use luma_imgproc::{
    histogram::{self, HistogramOptions},
    segment::{self, BlockifyOptions},
};

// smooth gradient bands, so regions actually grow instead of staying single pixels
fn banded_image(width: usize, height: usize) -> PixelBuffer {
    let data = (0..width * height)
        .flat_map(|i| {
            let (x, y) = (i % width, i / width);
            [(x / 16 * 40 % 256) as u8, (y / 16 * 40 % 256) as u8, 90]
        })
        .collect();
    PixelBuffer::new(ImageSize { width, height }, Colorspace::Rgb, data).unwrap()
}

fn bench_blockify(c: &mut Criterion) {
    let mut group = c.benchmark_group("Segmentation");

    for (width, height) in [(128, 96), (256, 224), (512, 448)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);
        let image = banded_image(*width, *height);

        group.bench_with_input(
            BenchmarkId::new("blockify", &parameter_string),
            &image,
            |b, i| b.iter(|| segment::blockify(black_box(i), black_box(&BlockifyOptions::default()))),
        );

        group.bench_with_input(
            BenchmarkId::new("histograms", &parameter_string),
            &image,
            |b, i| {
                b.iter(|| histogram::histograms(black_box(i), black_box(&HistogramOptions::default())))
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_blockify);
criterion_main!(benches);
