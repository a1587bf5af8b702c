use std::io::Cursor;

use alpha_premultiply::{
    compare, compare_encoded, premultiply, ArchivePackager, BatchPipeline, BatchSession,
    DirectoryPackager, ErrorKind, ImageCodec, PixelBuffer, PngCodec, TargetVariant, Verdict,
};
use image::{DynamicImage, ImageFormat, RgbaImage};

fn png_bytes(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| image::Rgba(f(x, y)));
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn two_pixel_png() -> Vec<u8> {
    png_bytes(2, 1, |x, _| {
        if x == 0 {
            [200, 100, 50, 128]
        } else {
            [10, 20, 30, 0]
        }
    })
}

#[test]
fn end_to_end_premultiplied_png() {
    let jobs = BatchPipeline::png().run_sources(
        [("swatch.png", two_pixel_png())],
        TargetVariant::StandardPremultiplied,
    );
    let artifact = jobs[0].artifact().unwrap();
    assert_eq!(artifact.filename, "swatch_premult.png");

    let out = PngCodec.decode(&artifact.bytes).unwrap();
    assert_eq!(out.pixel(0, 0), Some([100, 50, 25, 128]));
    assert_eq!(out.pixel(1, 0), Some([0, 0, 0, 0]));
}

#[test]
fn end_to_end_tga_decodes_to_premultiplied_pixels() {
    let jobs = BatchPipeline::png().run_sources(
        [("swatch.png", two_pixel_png())],
        TargetVariant::RawContainer,
    );
    let artifact = jobs[0].artifact().unwrap();
    assert_eq!(artifact.filename, "swatch.tga");
    assert_eq!(artifact.mime, "image/x-tga");
    assert_eq!(
        &artifact.bytes[..],
        &[
            0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 0, 1, 0, 32, 0x28, //
            25, 50, 100, 128, //
            0, 0, 0, 0,
        ]
    );

    let decoded = image::load_from_memory_with_format(&artifact.bytes, ImageFormat::Tga)
        .unwrap()
        .to_rgba8();
    assert_eq!(decoded.get_pixel(0, 0).0, [100, 50, 25, 128]);
}

#[test]
fn generated_tga_matches_reference_premultiply() {
    let src = png_bytes(120, 80, |x, y| {
        [(x * 2) as u8, (y * 3) as u8, 180, ((x + y) % 256) as u8]
    });
    let jobs = BatchPipeline::png()
        .run_sources([("grad.png", src.clone())], TargetVariant::RawContainer);
    let tga = &jobs[0].artifact().unwrap().bytes;

    let reference = premultiply(PngCodec.decode(&src).unwrap()).into_buffer();
    let ours = PngCodec.decode_artifact(tga).unwrap();
    let report = compare(&ours, &reference);
    assert_eq!(report.verdict, Verdict::Match);
    assert_eq!(report.checked_count, 9 * 2);

    let straight = PngCodec.decode(&src).unwrap();
    assert_eq!(compare(&ours, &straight).verdict, Verdict::ContentMismatch);
}

#[test]
fn batch_of_three_isolates_middle_failure() {
    let pipeline = BatchPipeline::png();
    let jobs = pipeline.run_sources(
        vec![
            ("first.png", png_bytes(4, 3, |_, _| [255, 255, 255, 255])),
            ("second.png", b"\x89PNG but truncated".to_vec()),
            ("third.png", png_bytes(4, 3, |_, _| [255, 0, 0, 64])),
        ],
        TargetVariant::StandardPremultiplied,
    );

    assert_eq!(jobs.len(), 3);
    assert_eq!(jobs[0].source_name(), "first.png");
    assert!(jobs[0].artifact().is_some());
    assert_eq!(jobs[1].source_name(), "second.png");
    assert_eq!(jobs[1].failure().unwrap().kind(), ErrorKind::Decode);
    assert_eq!(jobs[2].source_name(), "third.png");
    assert!(jobs[2].artifact().is_some());
}

#[test]
fn session_packages_artifacts_to_directory() {
    let dir = std::env::temp_dir().join(format!(
        "alpha_premultiply_session_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));

    let mut session = BatchSession::new();
    session.add("a.png", png_bytes(2, 2, |_, _| [9, 9, 9, 9]), TargetVariant::RawContainer);
    session.add("b.png", Vec::<u8>::new(), TargetVariant::RawContainer);
    let summary = session.run(&BatchPipeline::png());
    assert_eq!((summary.succeeded, summary.failed), (1, 1));

    let artifacts: Vec<_> = session.artifacts().collect();
    let written = DirectoryPackager::new(&dir).package(&artifacts).unwrap();
    assert_eq!(written, [dir.join("a.tga")]);
    assert_eq!(std::fs::read(&written[0]).unwrap().len(), 18 + 2 * 2 * 4);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn compare_encoded_flags_dimension_mismatch() {
    let a = png_bytes(4, 3, |_, _| [0, 0, 0, 255]);
    let b = png_bytes(3, 4, |_, _| [0, 0, 0, 255]);
    let report = compare_encoded(&PngCodec, &a, &b);
    assert!(matches!(report.verdict, Verdict::DimensionMismatch { .. }));
    assert_eq!(report.checked_count, 0);
    assert!(report.mismatches.is_empty());
}

#[test]
fn oversized_raw_target_fails_with_dimension_error() {
    let buf = PixelBuffer::from_raw(70_000, 1, vec![0; 70_000 * 4]).unwrap();
    let err = alpha_premultiply::tga::encode_straight(buf).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DimensionTooLarge);
}

#[test]
fn non_png_sources_settle_as_decode_failures() {
    let rgb = image::RgbImage::from_fn(16, 16, |x, y| image::Rgb([x as u8 * 16, y as u8 * 16, 90]));
    let encode = |format| {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(rgb.clone())
            .write_to(&mut Cursor::new(&mut buf), format)
            .unwrap();
        buf
    };
    let jobs = BatchPipeline::png().run_sources(
        [
            ("photo.jpg", encode(ImageFormat::Jpeg)),
            ("scan.bmp", encode(ImageFormat::Bmp)),
        ],
        TargetVariant::StandardPremultiplied,
    );
    for job in &jobs {
        assert!(job.artifact().is_none(), "{}", job.source_name());
        assert_eq!(job.failure().unwrap().kind(), ErrorKind::Decode);
    }

    let raw = BatchPipeline::png()
        .run_sources([("scan.bmp", encode(ImageFormat::Bmp))], TargetVariant::RawContainer);
    assert_eq!(raw[0].failure().unwrap().kind(), ErrorKind::Decode);
}

#[test]
fn colliding_and_nested_names_are_packaged_safely() {
    let dir = std::env::temp_dir().join(format!(
        "alpha_premultiply_collide_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let png = png_bytes(1, 1, |_, _| [1, 2, 3, 255]);

    let mut session = BatchSession::new();
    session.add("logo.png", png.clone(), TargetVariant::RawContainer);
    session.add("logo.PNG", png.clone(), TargetVariant::RawContainer);
    assert_eq!(session.run(&BatchPipeline::png()).succeeded, 2);
    let artifacts: Vec<_> = session.artifacts().collect();
    let err = DirectoryPackager::new(&dir).package(&artifacts).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Package);
    assert!(!dir.exists());

    session.clear();
    session.add("../escaped.png", png, TargetVariant::RawContainer);
    session.run(&BatchPipeline::png());
    let artifacts: Vec<_> = session.artifacts().collect();
    let written = DirectoryPackager::new(&dir).package(&artifacts).unwrap();
    assert_eq!(written, [dir.join("escaped.tga")]);

    std::fs::remove_dir_all(&dir).unwrap();
}
