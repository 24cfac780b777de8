use std::{io::Cursor, sync::Mutex};

use super::*;

struct Recording {
    sizes: std::sync::Arc<Mutex<Vec<RasterSize>>>,
}

impl VectorRasterizer for Recording {
    fn rasterize(
        &self,
        _bytes: &[u8],
        _resources_dir: Option<&Path>,
        size: RasterSize,
    ) -> TraitStackResult<image::RgbaImage> {
        self.sizes.lock().unwrap().push(size);
        Ok(image::RgbaImage::from_pixel(
            size.width,
            size.height,
            image::Rgba([0, 0, 0, 64]),
        ))
    }
}

fn temp_dir(name: &str) -> PathBuf {
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

fn write_png(dir: &Path, name: &str, img: &image::RgbaImage) -> PathBuf {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img.clone())
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(dir.join(name), buf).unwrap();
    PathBuf::from(name)
}

fn compositor(root: &Path) -> (LayerCompositor, std::sync::Arc<Mutex<Vec<RasterSize>>>) {
    let sizes = std::sync::Arc::new(Mutex::new(Vec::new()));
    let settings = CompositorSettings {
        default_vector_size: RasterSize::new(6, 5).unwrap(),
        assets_root: root.to_path_buf(),
    };
    let rasterizer = Recording {
        sizes: sizes.clone(),
    };
    (LayerCompositor::new(settings, Box::new(rasterizer)), sizes)
}

#[test]
fn empty_layer_list_is_no_layers() {
    let dir = temp_dir("compositor_empty");
    let (c, _) = compositor(&dir);
    assert!(matches!(c.composite(&[]), Err(TraitStackError::NoLayers)));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn only_missing_files_is_no_layers() {
    let dir = temp_dir("compositor_missing");
    let (c, _) = compositor(&dir);
    let layers = vec![PathBuf::from("nope.png"), PathBuf::from("gone.svg")];
    assert!(matches!(
        c.composite(&layers),
        Err(TraitStackError::NoLayers)
    ));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn first_layer_fixes_canvas_and_later_layers_align_top_left() {
    let dir = temp_dir("compositor_align");
    let base = write_png(
        &dir,
        "base.png",
        &image::RgbaImage::from_pixel(4, 3, image::Rgba([0, 0, 255, 255])),
    );
    let dot = write_png(
        &dir,
        "dot.png",
        &image::RgbaImage::from_pixel(2, 1, image::Rgba([255, 0, 0, 255])),
    );
    let (c, _) = compositor(&dir);

    let out = c
        .composite(&[base, PathBuf::from("missing.png"), dot])
        .unwrap();
    assert_eq!(out.dimensions(), (4, 3));
    assert_eq!(out.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(out.get_pixel(1, 0).0, [255, 0, 0, 255]);
    assert_eq!(out.get_pixel(2, 0).0, [0, 0, 255, 255]);
    assert_eq!(out.get_pixel(0, 1).0, [0, 0, 255, 255]);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn first_layer_is_converted_to_rgba() {
    let dir = temp_dir("compositor_rgb");
    let rgb = image::RgbImage::from_pixel(2, 2, image::Rgb([9, 8, 7]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(rgb)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(dir.join("rgb.png"), buf).unwrap();

    let (c, _) = compositor(&dir);
    let out = c.composite(&[PathBuf::from("rgb.png")]).unwrap();
    assert_eq!(out.get_pixel(1, 1).0, [9, 8, 7, 255]);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn vector_layers_use_default_size_then_canvas_size() {
    let dir = temp_dir("compositor_vector");
    std::fs::write(dir.join("a.svg"), b"<svg/>").unwrap();
    let big = write_png(
        &dir,
        "big.png",
        &image::RgbaImage::from_pixel(9, 7, image::Rgba([1, 1, 1, 255])),
    );

    let (c, sizes) = compositor(&dir);
    let out = c.composite(&[PathBuf::from("a.svg")]).unwrap();
    assert_eq!(out.dimensions(), (6, 5));

    let out = c.composite(&[big, PathBuf::from("a.svg")]).unwrap();
    assert_eq!(out.dimensions(), (9, 7));

    assert_eq!(
        *sizes.lock().unwrap(),
        vec![RasterSize::new(6, 5).unwrap(), RasterSize::new(9, 7).unwrap()]
    );
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn sequential_overlay_matches_direct_composite() {
    let dir = temp_dir("compositor_assoc");
    let l1 = write_png(
        &dir,
        "l1.png",
        &image::RgbaImage::from_fn(3, 3, |x, y| {
            image::Rgba([(x * 80) as u8, (y * 80) as u8, 40, 100 + (x * 50) as u8])
        }),
    );
    let l2_img = image::RgbaImage::from_fn(2, 3, |x, y| {
        image::Rgba([200, (x * 90) as u8, (y * 70) as u8, 30 + (y * 60) as u8])
    });
    let l2 = write_png(&dir, "l2.png", &l2_img);

    let (c, _) = compositor(&dir);
    let direct = c.composite(&[l1.clone(), l2]).unwrap();

    let mut stepwise = c.composite(&[l1]).unwrap();
    overlay_top_left(&mut stepwise, &l2_img).unwrap();
    assert_eq!(direct, stepwise);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn decode_failures_propagate() {
    let dir = temp_dir("compositor_decode");
    std::fs::write(dir.join("bad.png"), b"not an image").unwrap();
    let (c, _) = compositor(&dir);
    assert!(matches!(
        c.composite(&[PathBuf::from("bad.png")]),
        Err(TraitStackError::Decode(_))
    ));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn vector_layer_over_oversized_canvas_is_rejected_before_rasterizing() {
    let dir = temp_dir("compositor_oversized");
    std::fs::write(dir.join("a.svg"), b"<svg/>").unwrap();
    let wide = write_png(
        &dir,
        "wide.png",
        &image::RgbaImage::from_pixel(16_385, 1, image::Rgba([1, 1, 1, 255])),
    );

    let (c, sizes) = compositor(&dir);
    let err = c.composite(&[wide, PathBuf::from("a.svg")]).unwrap_err();
    assert!(matches!(err, TraitStackError::Decode(_)), "{err:?}");
    assert!(err.to_string().contains("a.svg"));
    assert!(sizes.lock().unwrap().is_empty());
    std::fs::remove_dir_all(&dir).ok();
}
