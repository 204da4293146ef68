//! The shared "segment an image into N regions" contract.
//!
//! Both engines consume a [`PixelBuffer`] and a requested segment count and
//! produce a [`Segmentation`]: a region label per pixel plus the recolored
//! packed buffer.

use std::collections::HashMap;

use crate::buffer::PixelBuffer;
use crate::color::Argb;
use crate::error::SegmentError;
use crate::graph::{GraphConfig, GraphSegmenter};
use crate::kmeans::{KMeansConfig, KMeansSegmenter};

/// An engine that partitions an image into a requested number of regions.
pub trait Segmenter {
    fn segment(&self, image: &PixelBuffer, segments: usize) -> Result<Segmentation, SegmentError>;
}

/// Segmentation method selection
#[derive(Clone, Debug)]
pub enum SegmentationMethod {
    /// Centroid-based clustering on pixel color
    KMeans(KMeansConfig),
    /// Adjacency graph with threshold merge and size-ordered refinement
    Graph(GraphConfig),
}

impl Default for SegmentationMethod {
    fn default() -> Self {
        SegmentationMethod::Graph(GraphConfig::default())
    }
}

/// Result of a segmentation call.
#[derive(Clone, Debug)]
pub struct Segmentation {
    pub width: usize,
    pub height: usize,
    /// Region ordinal per pixel, in `[0, num_segments)`
    pub labels: Vec<usize>,
    pub num_segments: usize,
    /// Recolored packed pixels
    pub pixels: Vec<u32>,
    /// Alpha-presence flag carried over from the input
    pub has_alpha: bool,
}

impl Segmentation {
    /// Assemble a result from per-pixel region keys of any numbering.
    ///
    /// Keys are compacted into labels in first-seen scan order.
    pub(crate) fn from_region_keys(
        image: &PixelBuffer,
        region_keys: &[usize],
        pixels: Vec<u32>,
    ) -> Self {
        let (labels, num_segments) = compact_labels(region_keys);
        Self {
            width: image.width(),
            height: image.height(),
            labels,
            num_segments,
            pixels,
            has_alpha: image.has_alpha(),
        }
    }

    pub fn get_label(&self, x: usize, y: usize) -> usize {
        self.labels[y * self.width + x]
    }

    /// Output color of each region, indexed by label.
    pub fn segment_colors(&self) -> Vec<Argb> {
        let mut colors = vec![Argb::default(); self.num_segments];
        for (&label, &raw) in self.labels.iter().zip(&self.pixels) {
            colors[label] = Argb(raw);
        }
        colors
    }

    /// Pixel count of each region, indexed by label.
    pub fn segment_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.num_segments];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }

    /// Recolored pixels as a buffer, checked against the stored dimensions.
    pub fn into_buffer(self) -> Result<PixelBuffer, SegmentError> {
        PixelBuffer::new(self.pixels, self.width, self.height, self.has_alpha)
    }
}

/// Renumber arbitrary keys to `0..n` in order of first appearance.
pub fn compact_labels(keys: &[usize]) -> (Vec<usize>, usize) {
    let mut map: HashMap<usize, usize> = HashMap::new();
    let labels: Vec<usize> = keys
        .iter()
        .map(|&key| {
            let next = map.len();
            *map.entry(key).or_insert(next)
        })
        .collect();
    (labels, map.len())
}

/// Reject calls the engines are not defined for. Buffer dimensions are
/// already guaranteed by [`PixelBuffer`].
pub(crate) fn validate_request(segments: usize) -> Result<(), SegmentError> {
    if segments == 0 {
        return Err(SegmentError::InvalidSegmentCount(segments));
    }
    Ok(())
}

/// Segment `image` into `segments` regions with the chosen method.
pub fn segment_image(
    image: &PixelBuffer,
    segments: usize,
    method: &SegmentationMethod,
) -> Result<Segmentation, SegmentError> {
    match method {
        SegmentationMethod::KMeans(config) => {
            KMeansSegmenter::new(config.clone()).segment(image, segments)
        }
        SegmentationMethod::Graph(config) => {
            GraphSegmenter::new(config.clone()).segment(image, segments)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_labels() {
        let (labels, n) = compact_labels(&[7, 7, 3, 9, 3]);
        assert_eq!(labels, vec![0, 0, 1, 2, 1]);
        assert_eq!(n, 3);
    }

    #[test]
    fn test_rejects_zero_segments() {
        let image = PixelBuffer::new(vec![0xFF00_0000; 4], 2, 2, false).unwrap();
        for method in [
            SegmentationMethod::KMeans(KMeansConfig::default()),
            SegmentationMethod::Graph(GraphConfig::default()),
        ] {
            let err = segment_image(&image, 0, &method).unwrap_err();
            assert_eq!(err, SegmentError::InvalidSegmentCount(0));
        }
    }

    #[test]
    fn test_segment_summaries() {
        let image = PixelBuffer::new(vec![1, 1, 2, 2], 2, 2, true).unwrap();
        let seg = Segmentation::from_region_keys(&image, &[5, 5, 8, 8], vec![1, 1, 2, 2]);
        assert_eq!(seg.num_segments, 2);
        assert_eq!(seg.segment_sizes(), vec![2, 2]);
        assert_eq!(seg.segment_colors(), vec![Argb(1), Argb(2)]);
        assert_eq!(seg.get_label(1, 1), 1);

        let buf = seg.into_buffer().unwrap();
        assert!(buf.has_alpha());
        assert_eq!(buf.pixels(), &[1, 1, 2, 2]);
    }

    #[test]
    fn test_into_buffer_rejects_bad_dimensions() {
        let seg = Segmentation {
            width: 0,
            height: 5,
            labels: vec![0; 5],
            num_segments: 1,
            pixels: vec![0xFF00_0000; 5],
            has_alpha: false,
        };
        assert_eq!(seg.clone().into_buffer().unwrap_err(), SegmentError::ZeroDimension);

        let seg = Segmentation {
            width: 2,
            height: 2,
            ..seg
        };
        assert_eq!(
            seg.into_buffer().unwrap_err(),
            SegmentError::DimensionMismatch {
                len: 5,
                width: 2,
                height: 2
            }
        );
    }
}
