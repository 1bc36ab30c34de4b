//! Block segmentation
//!
//! Partition an image into connected blocks of similar color, merge adjacent blocks
//! with close hues and optionally repaint every block with its color.

mod union_find;
pub use union_find::UnionFind;

use std::collections::VecDeque;

use luma_image::{saturate_u8, Colorspace, ImageError, PixelBuffer};

use crate::color::{convert, hue_degrees};
use crate::filter::{gaussian_blur, GaussianBlurOptions};

/// Options of [`blockify`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockifyOptions {
    /// Maximum RGB distance between a pixel and the block it joins.
    pub threshold: f32,
    /// Radius of the gaussian pre-blur, 0 disables it.
    pub blur_radius: usize,
    /// Adjacent blocks merge below `threshold * merge_threshold_multiplier`, 0 disables merging.
    pub merge_threshold_multiplier: f32,
    /// Paint every pixel with the color of its block.
    pub recolor: bool,
}

impl Default for BlockifyOptions {
    fn default() -> Self {
        Self {
            threshold: 20.0,
            blur_radius: 2,
            merge_threshold_multiplier: 1.5,
            recolor: true,
        }
    }
}

/// A connected region of similar color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    /// Left edge of the bounding box.
    pub x: usize,
    /// Top edge of the bounding box.
    pub y: usize,
    /// Width of the bounding box.
    pub width: usize,
    /// Height of the bounding box.
    pub height: usize,
    /// Red component of the block color.
    pub r: u8,
    /// Green component of the block color.
    pub g: u8,
    /// Blue component of the block color.
    pub b: u8,
    /// Number of pixels in the block.
    pub count: usize,
}

/// Result of [`blockify`].
#[derive(Clone, Debug, PartialEq)]
pub struct BlockifyOutput {
    /// RGB image, recolored by block when requested.
    pub image: PixelBuffer,
    /// Blocks in discovery order.
    pub blocks: Vec<Block>,
}

/// Distance between two RGB colors that penalizes hue differences of saturated colors.
///
/// The Euclidean distance divided by 4 is scaled by `1 + w * dh / 22.5`, where `dh`
/// is the circular hue difference in degrees and `w` ramps from 0 to 1 as the smaller
/// chroma of the pair goes from 0 to 20. Near-grey colors compare by intensity alone.
///
/// # Example
///
/// ```
/// use luma_imgproc::segment::hue_color_distance;
///
/// assert_eq!(hue_color_distance([255.0, 0.0, 0.0], [230.0, 0.0, 0.0]), 6.25);
/// ```
pub fn hue_color_distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    let euclidean = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f32>()
        .sqrt();

    let chroma = |c: [f32; 3]| c[0].max(c[1]).max(c[2]) - c[0].min(c[1]).min(c[2]);
    let weight = num_traits::clamp(chroma(a).min(chroma(b)) / 20.0, 0.0, 1.0);

    let hue_diff = (hue_degrees(a) - hue_degrees(b)).abs();
    let hue_diff = hue_diff.min(360.0 - hue_diff);

    euclidean / 4.0 * (1.0 + weight * hue_diff / 22.5)
}

/// A block while it grows: running color sums and bounds.
#[derive(Clone, Debug)]
struct Region {
    sum: [f64; 3],
    count: usize,
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
    // color frozen at the end of region growth
    color: [f32; 3],
}

impl Region {
    fn seed(x: usize, y: usize, rgb: [f32; 3]) -> Self {
        Self {
            sum: rgb.map(f64::from),
            count: 1,
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
            color: rgb,
        }
    }

    fn average(&self) -> [f32; 3] {
        self.sum.map(|s| (s / self.count as f64) as f32)
    }

    fn add(&mut self, x: usize, y: usize, rgb: [f32; 3]) {
        self.sum
            .iter_mut()
            .zip(rgb)
            .for_each(|(s, v)| *s += v as f64);
        self.count += 1;
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn absorb(&mut self, other: &Region) {
        self.count += other.count;
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    fn to_block(&self) -> Block {
        let [r, g, b] = self.color.map(saturate_u8);
        Block {
            x: self.min_x,
            y: self.min_y,
            width: self.max_x - self.min_x + 1,
            height: self.max_y - self.min_y + 1,
            r,
            g,
            b,
            count: self.count,
        }
    }
}

fn rgb_at(data: &[u8], index: usize) -> [f32; 3] {
    [
        data[index * 3] as f32,
        data[index * 3 + 1] as f32,
        data[index * 3 + 2] as f32,
    ]
}

fn euclidean(a: [f32; 3], b: [f32; 3]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f32>()
        .sqrt()
}

/// Grow 4-connected regions in raster order, returning the label of every pixel.
fn grow_regions(data: &[u8], cols: usize, rows: usize, threshold: f32) -> (Vec<usize>, Vec<Region>) {
    const UNASSIGNED: usize = usize::MAX;
    let mut labels = vec![UNASSIGNED; cols * rows];
    let mut regions: Vec<Region> = Vec::new();
    let mut queue = VecDeque::new();

    for seed in 0..cols * rows {
        if labels[seed] != UNASSIGNED {
            continue;
        }

        let id = regions.len();
        let mut region = Region::seed(seed % cols, seed / cols, rgb_at(data, seed));
        labels[seed] = id;
        queue.push_back(seed);

        while let Some(index) = queue.pop_front() {
            let (x, y) = (index % cols, index / cols);
            let neighbors = [
                (x > 0).then(|| index - 1),
                (x + 1 < cols).then(|| index + 1),
                (y > 0).then(|| index - cols),
                (y + 1 < rows).then(|| index + cols),
            ];

            for neighbor in neighbors.into_iter().flatten() {
                if labels[neighbor] != UNASSIGNED {
                    continue;
                }
                let rgb = rgb_at(data, neighbor);
                if euclidean(rgb, region.average()) < threshold {
                    labels[neighbor] = id;
                    region.add(neighbor % cols, neighbor / cols, rgb);
                    queue.push_back(neighbor);
                }
            }
        }

        region.color = region.average();
        regions.push(region);
    }

    (labels, regions)
}

/// Merge adjacent regions whose colors are closer than `threshold`.
///
/// Returns the root of every region; surviving roots absorb the counts and bounds of
/// the regions merged into them and keep their own color.
fn merge_regions(
    labels: &[usize],
    regions: &mut [Region],
    cols: usize,
    threshold: f32,
) -> Vec<usize> {
    let mut sets = UnionFind::new(regions.len());

    for (index, &label) in labels.iter().enumerate() {
        let x = index % cols;
        let right = (x + 1 < cols).then(|| index + 1);
        let down = (index + cols < labels.len()).then(|| index + cols);

        for neighbor in [right, down].into_iter().flatten() {
            let a = sets.get_representative(label);
            let b = sets.get_representative(labels[neighbor]);
            if a == b {
                continue;
            }
            if hue_color_distance(regions[a].color, regions[b].color) < threshold {
                let keep = sets.connect(a, b);
                let merged = if keep == a { b } else { a };
                let absorbed = regions[merged].clone();
                regions[keep].absorb(&absorbed);
            }
        }
    }

    (0..regions.len())
        .map(|id| sets.get_representative(id))
        .collect()
}

/// Segment an image into blocks of similar color.
///
/// The image is converted to RGB and optionally blurred. Blocks grow breadth-first
/// from every unassigned pixel in raster order through 4-connected neighbors closer
/// than `threshold` to the running block average. Adjacent blocks whose
/// [`hue_color_distance`] is below `threshold * merge_threshold_multiplier` are then
/// merged into the earlier block.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `options` - The growth threshold, blur, merge and recolor options.
///
/// # Returns
///
/// The RGB image, recolored when requested, and the surviving blocks in discovery order.
pub fn blockify(src: &PixelBuffer, options: &BlockifyOptions) -> Result<BlockifyOutput, ImageError> {
    let rgb = convert(src, Colorspace::Rgb)?;
    let blurred = gaussian_blur(&rgb, &GaussianBlurOptions::with_radius(options.blur_radius))?;

    let (cols, rows) = (rgb.cols(), rgb.rows());
    let (labels, mut regions) = grow_regions(blurred.as_slice(), cols, rows, options.threshold);
    log::debug!("blockify: grew {} blocks", regions.len());

    let merge_threshold = options.threshold * options.merge_threshold_multiplier;
    let roots = if merge_threshold > 0.0 {
        merge_regions(&labels, &mut regions, cols, merge_threshold)
    } else {
        (0..regions.len()).collect()
    };

    let blocks: Vec<Block> = regions
        .iter()
        .enumerate()
        .filter(|(id, _)| roots[*id] == *id)
        .map(|(_, region)| region.to_block())
        .collect();
    log::debug!("blockify: {} blocks after merging", blocks.len());

    let mut image = rgb;
    if options.recolor {
        image
            .as_slice_mut()
            .chunks_exact_mut(3)
            .zip(labels.iter())
            .for_each(|(pixel, &label)| {
                let color = regions[roots[label]].color.map(saturate_u8);
                pixel.copy_from_slice(&color);
            });
    }

    Ok(BlockifyOutput { image, blocks })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use luma_image::{Colorspace, ImageError, ImageSize, PixelBuffer};
    use rand::Rng;

    use super::*;

    #[test]
    fn test_hue_color_distance() {
        for (a, b, expected) in [
            ([255.0, 0.0, 0.0], [230.0, 0.0, 0.0], 6.25),
            ([5.0, 31.0, 50.0], [44.0, 74.0, 94.0], 19.289718968598702),
            ([5.0, 31.0, 50.0], [83.0, 92.0, 106.0], 42.58158950481536),
            ([44.0, 74.0, 94.0], [83.0, 92.0, 106.0], 17.3545193854566),
            ([76.0, 86.0, 38.0], [39.0, 45.0, 6.0], 18.27550799341211),
            ([76.0, 86.0, 38.0], [97.0, 110.0, 61.0], 11.323218199183048),
            ([39.0, 45.0, 6.0], [97.0, 110.0, 61.0], 33.411455104015545),
            ([132.0, 103.0, 80.0], [39.0, 45.0, 6.0], 95.79356455519681),
            ([175.0, 140.0, 115.0], [79.0, 80.0, 40.0], 89.02289967568268),
        ] {
            assert_relative_eq!(hue_color_distance(a, b), expected, max_relative = 1e-4);
            assert_eq!(hue_color_distance(a, b), hue_color_distance(b, a));
            assert_eq!(hue_color_distance(a, a), 0.0);
        }
    }

    #[test]
    fn test_blockify_staircase() -> Result<(), ImageError> {
        let mut reds = [225u8, 240, 233, 230, 236, 233, 228, 238, 231, 236].into_iter();
        let mut blues = [220u8, 235, 228, 230, 226, 228, 232, 224, 228, 230, 226, 229, 228]
            .into_iter();
        let mut greens = [230u8, 225, 235, 230, 228, 232, 230, 226, 234, 230, 229, 231, 230]
            .into_iter();

        #[rustfmt::skip]
        let layout = [
            "rrrrbb",
            "rrrbbb",
            "rrbbgg",
            "rbbggg",
            "bbgggg",
            "bbgggg",
        ];

        let mut data = Vec::new();
        let mut expected = Vec::new();
        for row in layout {
            for tag in row.chars() {
                let (pixel, block) = match tag {
                    'r' => ([reds.next().unwrap_or(0), 0, 0], [233, 0, 0]),
                    'b' => ([0, 0, blues.next().unwrap_or(0)], [0, 0, 228]),
                    _ => ([0, greens.next().unwrap_or(0), 0], [0, 230, 0]),
                };
                data.extend_from_slice(&pixel);
                expected.extend_from_slice(&block);
            }
        }

        let image = PixelBuffer::new(
            ImageSize {
                width: 6,
                height: 6,
            },
            Colorspace::Rgb,
            data,
        )?;
        let output = blockify(
            &image,
            &BlockifyOptions {
                threshold: 30.0,
                blur_radius: 0,
                ..Default::default()
            },
        )?;

        assert_eq!(output.image.as_slice(), expected.as_slice());
        assert_eq!(
            output.blocks,
            vec![
                Block { x: 0, y: 0, width: 4, height: 4, r: 233, g: 0, b: 0, count: 10 },
                Block { x: 0, y: 0, width: 6, height: 6, r: 0, g: 0, b: 228, count: 13 },
                Block { x: 2, y: 2, width: 4, height: 4, r: 0, g: 230, b: 0, count: 13 },
            ]
        );
        Ok(())
    }

    #[test]
    fn test_blockify_merge() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let reds = [
            199u8, 190, 181, 190,
            190, 181, 190, 190,
            181, 190, 190, 190,
            190, 190, 190, 190,
        ];
        let data = reds.iter().flat_map(|&r| [r, 0, 0]).collect();
        let image = PixelBuffer::new(
            ImageSize {
                width: 4,
                height: 4,
            },
            Colorspace::Rgb,
            data,
        )?;

        let separate = BlockifyOptions {
            threshold: 10.0,
            blur_radius: 0,
            merge_threshold_multiplier: 0.0,
            recolor: true,
        };
        let unmerged = blockify(&image, &separate)?;

        #[rustfmt::skip]
        let expected = [
            193u8, 193, 188, 188,
            193, 188, 188, 188,
            188, 188, 188, 188,
            188, 188, 188, 188,
        ];
        let reds_out: Vec<u8> = unmerged.image.as_slice().iter().step_by(3).copied().collect();
        assert_eq!(reds_out, expected);
        assert_eq!(unmerged.blocks.len(), 2);

        let merged = blockify(
            &image,
            &BlockifyOptions {
                merge_threshold_multiplier: 1.0,
                ..separate
            },
        )?;
        assert_eq!(merged.blocks.len(), 1);
        assert_eq!(merged.blocks[0].count, 16);
        assert_eq!((merged.blocks[0].width, merged.blocks[0].height), (4, 4));
        assert!(merged
            .image
            .as_slice()
            .chunks_exact(3)
            .all(|pixel| pixel == [193, 0, 0]));
        Ok(())
    }

    #[test]
    fn test_blockify_random_partition() -> Result<(), ImageError> {
        let (width, height) = (200, 300);
        let mut rng = rand::rng();
        let data = (0..width * height * 3).map(|_| rng.random::<u8>()).collect();
        let image = PixelBuffer::new(ImageSize { width, height }, Colorspace::Rgb, data)?;

        let output = blockify(
            &image,
            &BlockifyOptions {
                blur_radius: 0,
                merge_threshold_multiplier: 0.0,
                ..Default::default()
            },
        )?;
        assert!(output.blocks.len() as f64 > (width * height) as f64 * 0.9);
        assert_eq!(
            output.blocks.iter().map(|b| b.count).sum::<usize>(),
            width * height
        );

        let merged = blockify(&image, &BlockifyOptions::default())?;
        assert_eq!(
            merged.blocks.iter().map(|b| b.count).sum::<usize>(),
            width * height
        );
        Ok(())
    }

    #[test]
    fn test_blockify_without_recolor() -> Result<(), ImageError> {
        let image = PixelBuffer::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            Colorspace::Rgba,
            vec![10, 20, 30, 255, 12, 20, 30, 255],
        )?;
        let output = blockify(
            &image,
            &BlockifyOptions {
                blur_radius: 0,
                recolor: false,
                ..Default::default()
            },
        )?;
        assert_eq!(output.image.colorspace(), Colorspace::Rgb);
        assert_eq!(output.image.as_slice(), &[10, 20, 30, 12, 20, 30]);
        assert_eq!(output.blocks.len(), 1);
        assert_eq!(output.blocks[0].r, 11);
        Ok(())
    }
}
