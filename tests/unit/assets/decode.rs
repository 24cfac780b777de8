use std::io::Cursor;

use super::*;
use crate::assets::svg_raster::ResvgRasterizer;

fn png_bytes(img: &image::RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img.clone())
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn temp_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "traitstack_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn decode_image_keeps_straight_alpha() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100, 50, 200, 128]).unwrap();
    let decoded = decode_image(&png_bytes(&img)).unwrap();
    assert_eq!(decoded.dimensions(), (1, 1));
    assert_eq!(decoded.as_raw().as_slice(), &[100, 50, 200, 128]);
}

#[test]
fn decode_image_rejects_garbage() {
    let err = decode_image(b"definitely not a png").unwrap_err();
    assert!(matches!(err, TraitStackError::Decode(_)));
}

#[test]
fn vector_detection_uses_extension() {
    assert!(is_vector_path(Path::new("layers/hat.svg")));
    assert!(is_vector_path(Path::new("layers/HAT.SVG")));
    assert!(!is_vector_path(Path::new("layers/hat.png")));
    assert!(!is_vector_path(Path::new("layers/svg")));
}

#[test]
fn unpremultiply_restores_straight_channels() {
    let mut px = [64u8, 32, 0, 128, 9, 9, 9, 0];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, [128, 64, 0, 128, 0, 0, 0, 0]);
}

#[test]
fn load_layer_reads_rasters_and_vectors() {
    let dir = temp_dir("load_layer");
    let png = dir.join("dot.png");
    let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]));
    std::fs::write(&png, png_bytes(&img)).unwrap();

    let svg = dir.join("square.svg");
    std::fs::write(
        &svg,
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10" fill="#00ff00"/></svg>"##,
    )
    .unwrap();

    let rasterizer = ResvgRasterizer::without_fonts();
    let size = RasterSize::new(4, 4).unwrap();

    let loaded = load_layer(&png, size, &rasterizer).unwrap();
    assert_eq!(loaded, img);

    let loaded = load_layer(&svg, size, &rasterizer).unwrap();
    assert_eq!(loaded.dimensions(), (4, 4));
    assert_eq!(loaded.get_pixel(2, 2).0, [0, 255, 0, 255]);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn load_layer_errors_name_the_file() {
    let dir = temp_dir("load_layer_err");
    let bad = dir.join("broken.png");
    std::fs::write(&bad, b"nope").unwrap();

    let err = load_layer(
        &bad,
        RasterSize::default(),
        &ResvgRasterizer::without_fonts(),
    )
    .unwrap_err();
    assert!(matches!(err, TraitStackError::Decode(_)));
    assert!(err.to_string().contains("broken.png"));

    std::fs::remove_dir_all(&dir).ok();
}
