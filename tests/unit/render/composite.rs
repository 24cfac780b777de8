use super::*;

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    assert_eq!(over(dst, [255, 255, 255, 0]), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let src = [255, 0, 0, 255];
    assert_eq!(over([0, 0, 255, 255], src), src);
}

#[test]
fn over_dst_transparent_returns_src() {
    let src = [100, 110, 120, 200];
    assert_eq!(over([0, 0, 0, 0], src), src);
    assert_eq!(over([77, 77, 77, 0], src), src);
}

#[test]
fn over_half_alpha_on_opaque_mixes_evenly() {
    let out = over([0, 0, 0, 255], [255, 255, 255, 128]);
    assert_eq!(out[3], 255);
    for c in &out[..3] {
        assert_eq!(*c, 128);
    }
}

#[test]
fn over_two_translucent_layers_accumulates_alpha() {
    // a_out = 0.5 + 0.5 * 0.5 = 0.75; red weight = 0.5 / 0.75.
    let out = over([0, 0, 255, 128], [255, 0, 0, 128]);
    assert_eq!(out[3], 192);
    assert!((169..=171).contains(&out[0]), "{out:?}");
    assert_eq!(out[1], 0);
    assert!((84..=86).contains(&out[2]), "{out:?}");
}

#[test]
fn over_in_place_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4]).is_err());
    assert!(over_in_place(&mut dst[..6], &[0u8; 6]).is_err());
}

#[test]
fn overlay_clips_larger_layers_and_pads_smaller_ones() {
    let mut canvas = image::RgbaImage::from_pixel(3, 2, image::Rgba([0, 0, 255, 255]));

    let small = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 0, 0, 255]));
    overlay_top_left(&mut canvas, &small).unwrap();
    assert_eq!(canvas.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(canvas.get_pixel(1, 0).0, [0, 0, 255, 255]);
    assert_eq!(canvas.get_pixel(0, 1).0, [0, 0, 255, 255]);

    let large = image::RgbaImage::from_pixel(5, 5, image::Rgba([0, 255, 0, 255]));
    overlay_top_left(&mut canvas, &large).unwrap();
    assert_eq!(canvas.dimensions(), (3, 2));
    assert!(canvas.pixels().all(|p| p.0 == [0, 255, 0, 255]));
}
