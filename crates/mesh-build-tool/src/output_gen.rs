use crate::error::AssetError;
use meshpage::BuildOutput;
use std::fs;
use std::path::{Path, PathBuf};

/// Write the compressed resource outputs for one mesh.
///
/// Produces `<stem>.bin` (the page blob: fix-up chunks + page images)
/// and `<stem>.manifest.txt` (counts, bounds, and the per-page tables a
/// loader needs to slice the blob).
pub fn write_mesh_output(
    stem: &str,
    output: &BuildOutput,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, AssetError> {
    fs::create_dir_all(out_dir)?;

    let bin_path = out_dir.join(format!("{stem}.bin"));
    fs::write(&bin_path, &output.resources.root_data)?;

    let manifest_path = out_dir.join(format!("{stem}.manifest.txt"));
    fs::write(&manifest_path, render_manifest(stem, output))?;

    Ok(vec![bin_path, manifest_path])
}

fn render_manifest(stem: &str, output: &BuildOutput) -> String {
    let resources = &output.resources;

    let mut manifest = format!(
        "# Generated manifest for {stem}.bin\n\
         input_vertices: {}\n\
         clusters: {}\n\
         root_pages: {}\n\
         hierarchy_nodes: {}\n\
         root_data_bytes: {}\n\
         bounds_min: {} {} {}\n\
         bounds_max: {} {} {}\n",
        resources.num_input_vertices,
        resources.num_clusters,
        resources.num_root_pages,
        resources.hierarchy_nodes.len(),
        resources.root_data.len(),
        resources.mesh_bounds.min.x,
        resources.mesh_bounds.min.y,
        resources.mesh_bounds.min.z,
        resources.mesh_bounds.max.x,
        resources.mesh_bounds.max.y,
        resources.mesh_bounds.max.z,
    );

    manifest.push_str("# page: bulk_offset bulk_size page_size vertex_offset\n");
    for (state, vertex_offset) in resources
        .page_streaming_states
        .iter()
        .zip(&output.vertex_offsets)
    {
        manifest.push_str(&format!(
            "page: {} {} {} {}\n",
            state.bulk_offset, state.bulk_size, state.page_size, vertex_offset
        ));
    }

    manifest
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use meshpage::{Builder, MeshData, Octahedron};

    fn build_single_triangle() -> BuildOutput {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        let normals = vec![Octahedron { x: 128, y: 128 }; 3];
        Builder::new(MeshData {
            positions: &positions,
            normals: &normals,
            colors: &[],
            uv_channels: Vec::new(),
        })
        .build()
        .unwrap()
    }

    #[test]
    fn writes_blob_and_manifest() {
        let output = build_single_triangle();
        let dir = tempfile::tempdir().unwrap();

        let files = write_mesh_output("tri", &output, dir.path()).unwrap();
        assert_eq!(files.len(), 2);

        let blob = fs::read(dir.path().join("tri.bin")).unwrap();
        assert_eq!(blob, output.resources.root_data);

        let manifest = fs::read_to_string(dir.path().join("tri.manifest.txt")).unwrap();
        assert!(manifest.contains("clusters: 1"));
        assert!(manifest.contains("root_pages: 1"));
        assert!(manifest.contains("page: 0 "));
    }

    #[test]
    fn manifest_lists_every_page() {
        let output = build_single_triangle();
        let manifest = render_manifest("tri", &output);
        let page_lines = manifest.lines().filter(|l| l.starts_with("page: ")).count();
        assert_eq!(page_lines, output.resources.num_root_pages as usize);
    }
}
