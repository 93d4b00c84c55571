use thiserror::Error;

/// Errors surfaced while building or querying a [`SegmentSet`].
///
/// No variant is recovered internally: the operation that raised
/// it simply fails and the set is left unchanged.
///
/// [`SegmentSet`]: crate::SegmentSet
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The two end points of a segment coincide.
    #[error("segment end points coincide")]
    Degenerate,

    /// A coordinate was NaN or infinite.
    #[error("segment coordinates must be finite")]
    NonFinite,

    /// Segment lookup outside `[0, len)`.
    #[error("segment index {index} out of range for a set of {len} segments")]
    OutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
