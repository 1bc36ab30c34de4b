use luma_image::PixelBuffer;
use rayon::prelude::*;

/// Apply a function to each pixel in the image in parallel.
///
/// The source and destination must share width and height; the pixel slices
/// handed to `f` have the channel count of their respective buffers.
pub fn par_iter_rows(
    src: &PixelBuffer,
    dst: &mut PixelBuffer,
    f: impl Fn(&[u8], &mut [u8]) + Send + Sync,
) {
    let c1 = src.num_channels();
    let c2 = dst.num_channels();
    let cols = src.cols();
    if cols == 0 {
        return;
    }

    src.as_slice()
        .par_chunks_exact(c1 * cols)
        .zip(dst.as_slice_mut().par_chunks_exact_mut(c2 * cols))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .chunks_exact(c1)
                .zip(dst_chunk.chunks_exact_mut(c2))
                .for_each(|(src_pixel, dst_pixel)| {
                    f(src_pixel, dst_pixel);
                });
        });
}

/// Fill the rows of a flat buffer in parallel.
///
/// `f` receives the row index and the mutable row slice of `row_stride` elements.
pub fn par_iter_rows_indexed<T: Send>(
    dst: &mut [T],
    row_stride: usize,
    f: impl Fn(usize, &mut [T]) + Send + Sync,
) {
    if row_stride == 0 {
        return;
    }

    dst.par_chunks_exact_mut(row_stride)
        .enumerate()
        .for_each(|(row, dst_row)| f(row, dst_row));
}
