use std::path::PathBuf;

/// Errors that can occur during mesh preparation.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// I/O error reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse an OBJ mesh file.
    #[error("OBJ parse error for {path}: {message}")]
    ObjParse { path: PathBuf, message: String },

    /// Input validation failed (empty mesh, degenerate data, etc.).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The cluster compressor rejected the mesh.
    #[error("Compression error: {0}")]
    Build(#[from] meshpage::BuildError),
}
