//! Interleaved 8-bit image resampling for region-sized buffers.
//!
//! Both filters map pixel centres the way common imaging libraries do
//! (`src = (dst + 0.5) * scale - 0.5`), so a downsample followed by a
//! nearest-neighbour upsample produces aligned blocks.

/// Bilinear resize of a `width` x `height` buffer to `target_w` x `target_h`.
pub fn resize_bilinear(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    target_w: usize,
    target_h: usize,
) -> Vec<u8> {
    let mut out = vec![0u8; target_w * target_h * channels];
    if width == 0 || height == 0 {
        return out;
    }

    let scale_x = width as f32 / target_w as f32;
    let scale_y = height as f32 / target_h as f32;

    for y in 0..target_h {
        let (y0, y1, fy) = source_span(y, scale_y, height);
        for x in 0..target_w {
            let (x0, x1, fx) = source_span(x, scale_x, width);
            for c in 0..channels {
                let v00 = data[(y0 * width + x0) * channels + c] as f32;
                let v10 = data[(y0 * width + x1) * channels + c] as f32;
                let v01 = data[(y1 * width + x0) * channels + c] as f32;
                let v11 = data[(y1 * width + x1) * channels + c] as f32;

                let top = v00 + (v10 - v00) * fx;
                let bottom = v01 + (v11 - v01) * fx;
                let val = top + (bottom - top) * fy;
                out[(y * target_w + x) * channels + c] = val.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    out
}

/// Nearest-neighbour resize; every output pixel copies exactly one source pixel.
pub fn resize_nearest(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    target_w: usize,
    target_h: usize,
) -> Vec<u8> {
    let mut out = vec![0u8; target_w * target_h * channels];
    if width == 0 || height == 0 {
        return out;
    }

    for y in 0..target_h {
        let sy = (y * height / target_h).min(height - 1);
        for x in 0..target_w {
            let sx = (x * width / target_w).min(width - 1);
            let src = (sy * width + sx) * channels;
            let dst = (y * target_w + x) * channels;
            out[dst..dst + channels].copy_from_slice(&data[src..src + channels]);
        }
    }

    out
}

/// Left/right source indices and the weight of the right one.
fn source_span(dst: usize, scale: f32, len: usize) -> (usize, usize, f32) {
    let pos = ((dst as f32 + 0.5) * scale - 0.5).max(0.0);
    let i0 = (pos.floor() as usize).min(len - 1);
    let i1 = (i0 + 1).min(len - 1);
    let frac = if i1 == i0 { 0.0 } else { pos - i0 as f32 };
    (i0, i1, frac)
}
