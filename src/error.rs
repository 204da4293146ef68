use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SegmentError {
    #[error("image dimensions cannot be zero")]
    ZeroDimension,

    #[error("pixel buffer length {len} does not match dimensions {width}x{height}")]
    DimensionMismatch {
        len: usize,
        width: usize,
        height: usize,
    },

    #[error("segment count must be positive, got {0}")]
    InvalidSegmentCount(usize),

    #[error("cannot form {k} clusters from {pixels} pixels")]
    TooManyClusters { k: usize, pixels: usize },
}
