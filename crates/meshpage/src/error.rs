/// Errors reported by the cluster compressor.
///
/// Caller-contract violations are fatal: the build returns an error and
/// no partial output. `InternalConsistency` signals a layout invariant
/// that failed at serialization time; it is a bug in the compressor, not
/// in the input, and is reported rather than emitting a malformed page.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The mesh has no vertices.
    #[error("mesh has no vertices")]
    EmptyMesh,

    /// The position array is not a whole number of triangles.
    #[error("position count {len} is not a multiple of three")]
    NotTriangleList { len: usize },

    /// An attribute array does not match the position array length.
    #[error("{attribute} count {actual} does not match vertex count {expected}")]
    AttributeLengthMismatch {
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },

    /// More UV channels than the packed format can address.
    #[error("mesh has {count} UV channels, the format supports at most {max}")]
    TooManyUvChannels { count: usize, max: usize },

    /// A serialization-time layout invariant failed.
    #[error("internal consistency check failed: {0}")]
    InternalConsistency(String),
}

impl BuildError {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        BuildError::InternalConsistency(message.into())
    }
}
