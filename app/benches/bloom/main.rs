use bloomfx::{BloomImageMut, BloomMode, BloomProcessor};
use criterion::{criterion_group, criterion_main, Criterion};
use image::{ImageReader, RgbaImage};

fn load_frame() -> RgbaImage {
    let img = ImageReader::open("../assets/test_image_4.png")
        .ok()
        .and_then(|reader| reader.decode().ok())
        .map(|img| img.resize_exact(1280, 832, image::imageops::FilterType::Triangle))
        .map(|img| img.to_rgba8());
    img.unwrap_or_else(|| {
        RgbaImage::from_fn(1280, 832, |x, y| {
            let v = ((x * 7 + y * 13) % 256) as u8;
            image::Rgba([v, v / 2, 255 - v, 255])
        })
    })
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut c = c.benchmark_group("Bloom");
    c.sample_size(20);

    let source = load_frame();

    for mode in [
        BloomMode::Scalar,
        BloomMode::Baseline,
        BloomMode::Advanced,
        BloomMode::AdvancedThreaded,
    ] {
        if !mode.is_supported() {
            continue;
        }
        c.bench_function(format!("RGBA bloom 1280x832: {mode:?}"), |b| {
            let mut frame = source.clone();
            let mut image = BloomImageMut::borrow(&mut frame, 1280, 832);
            let mut processor = BloomProcessor::with_mode(&image, mode).unwrap();
            b.iter(|| {
                processor.go(&mut image).unwrap();
            })
        });

        c.bench_function(format!("RGBA bloom 1280x832 upsize: {mode:?}"), |b| {
            let mut frame = source.clone();
            let mut image = BloomImageMut::borrow(&mut frame, 1280, 832);
            let mut processor = BloomProcessor::with_mode(&image, mode).unwrap();
            processor.downsize_pass(&image).unwrap();
            processor.horizontal_pass();
            processor.vertical_pass();
            b.iter(|| {
                processor.upsize_blend_pass(&mut image).unwrap();
            })
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
