use crate::foundation::error::{TraitStackError, TraitStackResult};

/// One straight (non-premultiplied) RGBA8 pixel.
pub type StraightRgba8 = [u8; 4];

/// Porter-Duff "over" of `src` onto `dst`, both in straight alpha.
///
/// Matches the arithmetic of the usual `alpha_composite` helpers: color channels are weighted
/// by each side's contribution to the output alpha, then divided back out.
pub fn over(dst: StraightRgba8, src: StraightRgba8) -> StraightRgba8 {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let blend = u32::from(dst[3]) * (255 - sa);
    let out_a255 = sa * 255 + blend;

    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = u32::from(src[i]) * sa * 255 + u32::from(dst[i]) * blend;
        out[i] = ((c + out_a255 / 2) / out_a255).min(255) as u8;
    }
    out[3] = ((out_a255 + 127) / 255).min(255) as u8;
    out
}

/// Apply [`over`] pixel by pixel, writing into `dst`.
pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> TraitStackResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(TraitStackError::decode(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Composite `layer` over `canvas` with both top-left corners aligned.
///
/// The layer is first copied onto a transparent buffer of the canvas size, so a larger layer
/// is clipped and a smaller one padded; it is never scaled.
pub fn overlay_top_left(
    canvas: &mut image::RgbaImage,
    layer: &image::RgbaImage,
) -> TraitStackResult<()> {
    let (width, height) = canvas.dimensions();
    let mut padded = image::RgbaImage::new(width, height);
    image::imageops::replace(&mut padded, layer, 0, 0);
    over_in_place(canvas, padded.as_raw())
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
