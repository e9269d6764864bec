/// Error types for mesh preparation.
pub mod error;

/// OBJ to triangle-soup conversion.
pub mod obj_converter;

/// Output file generation (blob + manifest).
pub mod output_gen;

pub use error::AssetError;
pub use obj_converter::SoupMesh;

use meshpage::{BuildOutput, Builder, MeshData};
use std::path::Path;

/// Convert a single OBJ mesh and write its outputs to `out_dir`.
///
/// Returns the build output so callers can report statistics.
pub fn convert_mesh(
    input: &Path,
    out_dir: &Path,
    position_precision: i32,
) -> Result<BuildOutput, AssetError> {
    let soup = obj_converter::load_and_convert(input)?;

    let uv_channels: Vec<&[glam::Vec2]> = if soup.has_uvs {
        vec![soup.uvs.as_slice()]
    } else {
        Vec::new()
    };

    let mut builder = Builder::new(MeshData {
        positions: &soup.positions,
        normals: &soup.normals,
        colors: &[],
        uv_channels,
    });
    builder.position_precision = position_precision;
    let output = builder.build()?;

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mesh".to_string());
    output_gen::write_mesh_output(&stem, &output, out_dir)?;

    Ok(output)
}
