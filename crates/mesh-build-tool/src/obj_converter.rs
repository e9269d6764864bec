use crate::error::AssetError;
use glam::{Vec2, Vec3};
use meshpage::Octahedron;
use std::path::Path;

/// Triangle soup expanded from an OBJ file, ready for compression.
///
/// Vertices are fully expanded (three per triangle, no sharing) because
/// the compressor delta-codes them in triangle order.
pub struct SoupMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Octahedron>,
    pub uvs: Vec<Vec2>,
    /// Whether any source geometry carried texture coordinates. When
    /// false, `uvs` is empty and no UV channel is emitted.
    pub has_uvs: bool,
}

/// Load an OBJ file, merge all objects/groups, expand to triangle soup.
pub fn load_and_convert(path: &Path) -> Result<SoupMesh, AssetError> {
    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };

    let (models, _materials) =
        tobj::load_obj(path, &load_options).map_err(|e| AssetError::ObjParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if models.is_empty() {
        return Err(AssetError::Validation(format!(
            "OBJ file has no geometry: {}",
            path.display()
        )));
    }

    // Warn about multiple objects/groups being merged
    if models.len() > 1 {
        log::warn!(
            "OBJ contains {} objects/groups, all geometry will be merged",
            models.len()
        );
    }

    let soup = expand_models(&models)?;

    if soup.positions.is_empty() {
        return Err(AssetError::Validation(format!(
            "Mesh has no faces: {}",
            path.display()
        )));
    }

    Ok(soup)
}

/// Expand all tobj models into one unindexed triangle soup.
fn expand_models(models: &[tobj::Model]) -> Result<SoupMesh, AssetError> {
    let has_uvs = models.iter().any(|m| !m.mesh.texcoords.is_empty());

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();

    for model in models {
        let mesh = &model.mesh;

        if mesh.positions.is_empty() {
            continue;
        }

        let has_normals = !mesh.normals.is_empty();
        if !has_normals {
            log::warn!(
                "Mesh '{}' has no normals, using default (0.0, 0.0, 1.0)",
                model.name
            );
        }
        if has_uvs && mesh.texcoords.is_empty() {
            log::warn!(
                "Mesh '{}' has no UV coordinates, using default (0.0, 0.0)",
                model.name
            );
        }

        if mesh.indices.len() % 3 != 0 {
            return Err(AssetError::Validation(format!(
                "Mesh '{}' is not triangulated ({} indices)",
                model.name,
                mesh.indices.len()
            )));
        }

        for &index in &mesh.indices {
            let i = index as usize;

            positions.push(Vec3::new(
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            ));

            let normal = if has_normals && i * 3 + 2 < mesh.normals.len() {
                Vec3::new(
                    mesh.normals[i * 3],
                    mesh.normals[i * 3 + 1],
                    mesh.normals[i * 3 + 2],
                )
            } else {
                Vec3::Z
            };
            normals.push(Octahedron::from_normal(normal));

            if has_uvs {
                let uv = if i * 2 + 1 < mesh.texcoords.len() {
                    Vec2::new(mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1])
                } else {
                    Vec2::ZERO
                };
                uvs.push(uv);
            }
        }
    }

    Ok(SoupMesh {
        positions,
        normals,
        uvs,
        has_uvs,
    })
}
