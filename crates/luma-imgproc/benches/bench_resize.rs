use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use luma_image::{Colorspace, ImageSize, PixelBuffer};
use luma_imgproc::resize::{self, ResizeMethod, ResizeOptions};

fn random_image(width: usize, height: usize) -> PixelBuffer {
    let data = (0..width * height * 3).map(|_| rand::random::<u8>()).collect();
    PixelBuffer::new(ImageSize { width, height }, Colorspace::Rgb, data).unwrap()
}

fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("Resize");

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);

        let image = random_image(*width, *height);
        let half = ImageSize {
            width: width / 2,
            height: height / 2,
        };
        // not an integer factor, so bilinear cannot take the box shortcut
        let odd = ImageSize {
            width: width / 3 + 1,
            height: height / 3 + 1,
        };

        group.bench_with_input(
            BenchmarkId::new("nearest_neighbor", &parameter_string),
            &image,
            |b, i| b.iter(|| resize::nearest_neighbor(black_box(i), black_box(odd))),
        );

        group.bench_with_input(
            BenchmarkId::new("bilinear", &parameter_string),
            &image,
            |b, i| b.iter(|| resize::bilinear(black_box(i), black_box(odd))),
        );

        group.bench_with_input(
            BenchmarkId::new("box_resize", &parameter_string),
            &image,
            |b, i| b.iter(|| resize::box_resize(black_box(i), black_box(half))),
        );

        let options = ResizeOptions {
            width: Some(200),
            method: ResizeMethod::Bilinear,
            ..Default::default()
        };
        group.bench_with_input(
            BenchmarkId::new("resize_auto_height", &parameter_string),
            &image,
            |b, i| b.iter(|| resize::resize(black_box(i), black_box(&options))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_resize);
criterion_main!(benches);
