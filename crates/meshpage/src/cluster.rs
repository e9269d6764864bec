use crate::encoding::EncodingInfo;
use crate::mesh::{Aabb, MeshData, Octahedron};
use crate::{MAX_CLUSTER_TRIANGLES, MAX_CLUSTER_VERTICES};
use glam::{Vec2, Vec3};

/// A bundle of up to 128 triangles encoded as one unit.
///
/// Vertices are stored in the order their triangles were added; there is
/// no index remapping and no deduplication. `positions` and `normals`
/// are always parallel; `colors` is empty or parallel; every UV channel
/// is parallel.
pub struct Cluster {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Octahedron>,
    pub colors: Vec<[u8; 4]>,
    pub uv_channels: Vec<Vec<Vec2>>,
}

impl Cluster {
    pub fn with_uv_channels(num_uv_channels: usize) -> Self {
        Self {
            positions: Vec::with_capacity(MAX_CLUSTER_VERTICES),
            normals: Vec::with_capacity(MAX_CLUSTER_VERTICES),
            colors: Vec::new(),
            uv_channels: (0..num_uv_channels)
                .map(|_| Vec::with_capacity(MAX_CLUSTER_VERTICES))
                .collect(),
        }
    }

    pub fn num_vertices(&self) -> usize {
        debug_assert!(self.positions.len() == self.normals.len());
        self.positions.len()
    }

    pub fn num_triangles(&self) -> usize {
        debug_assert!(self.positions.len() % 3 == 0);
        self.positions.len() / 3
    }

    /// Batches of the vertex-reuse subsystem. Each batch carries up to 32
    /// vertices; without reuse that is 10 whole triangles.
    pub fn num_material_batches(&self) -> usize {
        const MAX_VERTICES_PER_BATCH: usize = 32;
        let triangles_per_batch = MAX_VERTICES_PER_BATCH / 3;
        self.num_triangles().div_ceil(triangles_per_batch)
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.positions)
    }

    /// Longest triangle edge in the cluster.
    pub fn max_edge_length(&self) -> f32 {
        let mut max_squared = 0.0f32;
        for triangle in self.positions.chunks_exact(3) {
            max_squared = max_squared
                .max(triangle[0].distance_squared(triangle[1]))
                .max(triangle[1].distance_squared(triangle[2]))
                .max(triangle[0].distance_squared(triangle[2]));
        }
        max_squared.sqrt()
    }
}

/// A cluster paired with its derived quantization envelope.
pub(crate) struct EncodedCluster {
    pub cluster: Cluster,
    pub info: EncodingInfo,
}

/// Greedy in-order split of the mesh into clusters.
///
/// A new cluster starts whenever the current one is at its triangle
/// limit or three more vertices would overflow the vertex limit. Each
/// triangle contributes three fresh vertices; the mesh's index buffer is
/// never consulted.
pub fn build_clusters(mesh: &MeshData) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = Vec::new();

    for triangle_index in 0..mesh.num_triangles() {
        let needs_new_cluster = match clusters.last() {
            None => true,
            Some(cluster) => {
                cluster.num_triangles() == MAX_CLUSTER_TRIANGLES
                    || cluster.positions.len() + 3 > MAX_CLUSTER_VERTICES
            }
        };
        if needs_new_cluster {
            clusters.push(Cluster::with_uv_channels(mesh.uv_channels.len()));
        }

        let cluster = clusters.last_mut().unwrap();
        for corner in 0..3 {
            let index = 3 * triangle_index + corner;

            cluster.positions.push(mesh.positions[index]);
            cluster.normals.push(mesh.normals[index]);
            if !mesh.colors.is_empty() {
                cluster.colors.push(mesh.colors[index]);
            }
            for (channel, uvs) in mesh.uv_channels.iter().enumerate() {
                cluster.uv_channels[channel].push(uvs[index]);
            }
        }
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soup(num_triangles: usize) -> (Vec<Vec3>, Vec<Octahedron>) {
        let mut positions = Vec::new();
        for i in 0..num_triangles {
            let base = Vec3::new(i as f32, 0.0, 0.0);
            positions.push(base);
            positions.push(base + Vec3::X);
            positions.push(base + Vec3::Y);
        }
        let normals = vec![Octahedron { x: 128, y: 128 }; positions.len()];
        (positions, normals)
    }

    #[test]
    fn single_triangle_single_cluster() {
        let (positions, normals) = soup(1);
        let mesh = MeshData {
            positions: &positions,
            normals: &normals,
            colors: &[],
            uv_channels: Vec::new(),
        };
        let clusters = build_clusters(&mesh);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].num_vertices(), 3);
        assert_eq!(clusters[0].num_triangles(), 1);
    }

    #[test]
    fn vertex_limit_splits_at_42_triangles() {
        // 42 triangles leave 126 vertices; the 43rd would need 129
        let (positions, normals) = soup(43);
        let mesh = MeshData {
            positions: &positions,
            normals: &normals,
            colors: &[],
            uv_channels: Vec::new(),
        };
        let clusters = build_clusters(&mesh);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].num_triangles(), 42);
        assert_eq!(clusters[1].num_triangles(), 1);
    }

    #[test]
    fn exact_multiple_fills_every_cluster() {
        let (positions, normals) = soup(42 * 3);
        let mesh = MeshData {
            positions: &positions,
            normals: &normals,
            colors: &[],
            uv_channels: Vec::new(),
        };
        let clusters = build_clusters(&mesh);
        assert_eq!(clusters.len(), 3);
        for cluster in &clusters {
            assert_eq!(cluster.num_triangles(), 42);
        }
    }

    #[test]
    fn attributes_follow_their_triangles() {
        let (positions, normals) = soup(43);
        let colors: Vec<[u8; 4]> = (0..positions.len())
            .map(|i| [i as u8, 0, 0, 255])
            .collect();
        let uvs: Vec<Vec2> = (0..positions.len())
            .map(|i| Vec2::new(i as f32, 0.0))
            .collect();
        let mesh = MeshData {
            positions: &positions,
            normals: &normals,
            colors: &colors,
            uv_channels: vec![&uvs],
        };
        let clusters = build_clusters(&mesh);
        assert_eq!(clusters.len(), 2);

        // The second cluster starts at vertex 126
        assert_eq!(clusters[1].colors[0], [126, 0, 0, 255]);
        assert_eq!(clusters[1].uv_channels[0][0], Vec2::new(126.0, 0.0));
        assert_eq!(clusters[1].positions.len(), clusters[1].uv_channels[0].len());
    }

    #[test]
    fn material_batch_counts() {
        let (positions, normals) = soup(128);
        let mesh = MeshData {
            positions: &positions,
            normals: &normals,
            colors: &[],
            uv_channels: Vec::new(),
        };
        let clusters = build_clusters(&mesh);
        // 42-triangle clusters need 5 batches of up to 10 triangles
        assert_eq!(clusters[0].num_material_batches(), 5);
    }

    #[test]
    fn max_edge_length_over_triangles() {
        let mut cluster = Cluster::with_uv_channels(0);
        cluster.positions = vec![Vec3::ZERO, Vec3::X * 3.0, Vec3::Y * 4.0];
        cluster.normals = vec![Octahedron { x: 0, y: 0 }; 3];
        // Hypotenuse of the 3-4 right triangle
        assert_eq!(cluster.max_edge_length(), 5.0);
    }
}
