//! Smart Segmenter Library
//!
//! Partitions a raster image into a requested number of regions and recolors
//! every pixel by the region it lands in. Two interchangeable engines:
//! K-means clustering on pixel color, and graph partitioning over a
//! luma-weighted neighbor graph.

pub mod buffer;
pub mod color;
pub mod disjoint_set;
pub mod error;
pub mod graph;
pub mod kmeans;
pub mod rng;
pub mod segmentation;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export key types for easy usage
pub use buffer::PixelBuffer;
pub use color::Argb;
pub use error::SegmentError;
pub use graph::{graph_segment, Connectivity, GraphConfig, GraphSegmenter};
pub use kmeans::{kmeans_segment_with_rng, KMeansConfig, KMeansSegmenter};
pub use segmentation::{segment_image, Segmentation, SegmentationMethod, Segmenter};

pub mod prelude {
    pub use crate::buffer::PixelBuffer;
    pub use crate::color::Argb;
    pub use crate::error::SegmentError;
    pub use crate::graph::{Connectivity, GraphConfig, GraphSegmenter};
    pub use crate::kmeans::{KMeansConfig, KMeansSegmenter};
    pub use crate::segmentation::{segment_image, Segmentation, SegmentationMethod, Segmenter};
}
