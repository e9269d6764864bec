use crate::error::BuildError;
use crate::{MAX_UVS, NORMAL_BITS};
use glam::{Vec2, Vec3};

/// A unit normal packed as two 8-bit octahedral coordinates.
///
/// The compressor consumes normals already in this form; [`Octahedron::from_normal`]
/// exists for producers that start from floating-point vectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Octahedron {
    pub x: u8,
    pub y: u8,
}

impl Octahedron {
    /// Project a unit vector onto the octahedron and quantize to `NORMAL_BITS` per axis.
    ///
    /// Zero-length input maps to the +Z pole.
    pub fn from_normal(normal: Vec3) -> Self {
        let sum = normal.x.abs() + normal.y.abs() + normal.z.abs();
        if sum == 0.0 {
            return Self::from_unit_square(0.0, 0.0);
        }

        let p = normal / sum;
        let (u, v) = if p.z >= 0.0 {
            (p.x, p.y)
        } else {
            // Fold the lower hemisphere over the diagonals
            (
                (1.0 - p.y.abs()) * p.x.signum(),
                (1.0 - p.x.abs()) * p.y.signum(),
            )
        };
        Self::from_unit_square(u, v)
    }

    fn from_unit_square(u: f32, v: f32) -> Self {
        let max = ((1u32 << NORMAL_BITS) - 1) as f32;
        let quantize = |value: f32| ((value * 0.5 + 0.5) * max).round().clamp(0.0, max) as u8;
        Self {
            x: quantize(u),
            y: quantize(v),
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Smallest box containing all `points`. Empty input yields a zero box.
    pub fn from_points(points: &[Vec3]) -> Self {
        let Some(&first) = points.first() else {
            return Self {
                min: Vec3::ZERO,
                max: Vec3::ZERO,
            };
        };

        let mut min = first;
        let mut max = first;
        for &p in &points[1..] {
            min = min.min(p);
            max = max.max(p);
        }
        Self { min, max }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full edge lengths.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Half edge lengths.
    pub fn extent(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// Radius of the sphere used for LOD bounds: the length of the size vector.
    pub fn sphere_radius(&self) -> f32 {
        self.size().length()
    }
}

/// Borrowed triangle-soup input.
///
/// Triangle `i` owns vertices `3i`, `3i + 1`, `3i + 2`; vertices are never
/// deduplicated. `colors` may be empty (absent); every UV channel must be
/// parallel to `positions`.
#[derive(Clone)]
pub struct MeshData<'a> {
    pub positions: &'a [Vec3],
    pub normals: &'a [Octahedron],
    pub colors: &'a [[u8; 4]],
    pub uv_channels: Vec<&'a [Vec2]>,
}

impl MeshData<'_> {
    /// Check the caller contract. Violations are fatal build failures.
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.positions.is_empty() {
            return Err(BuildError::EmptyMesh);
        }
        if self.positions.len() % 3 != 0 {
            return Err(BuildError::NotTriangleList {
                len: self.positions.len(),
            });
        }
        if self.normals.len() != self.positions.len() {
            return Err(BuildError::AttributeLengthMismatch {
                attribute: "normal",
                expected: self.positions.len(),
                actual: self.normals.len(),
            });
        }
        if !self.colors.is_empty() && self.colors.len() != self.positions.len() {
            return Err(BuildError::AttributeLengthMismatch {
                attribute: "color",
                expected: self.positions.len(),
                actual: self.colors.len(),
            });
        }
        if self.uv_channels.len() > MAX_UVS {
            return Err(BuildError::TooManyUvChannels {
                count: self.uv_channels.len(),
                max: MAX_UVS,
            });
        }
        for uvs in &self.uv_channels {
            if uvs.len() != self.positions.len() {
                return Err(BuildError::AttributeLengthMismatch {
                    attribute: "UV",
                    expected: self.positions.len(),
                    actual: uvs.len(),
                });
            }
        }
        Ok(())
    }

    pub fn num_triangles(&self) -> usize {
        self.positions.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn octahedron_poles() {
        // +Z maps to the center of the unit square
        assert_eq!(
            Octahedron::from_normal(Vec3::Z),
            Octahedron { x: 128, y: 128 }
        );
        // -Z folds to a corner
        let down = Octahedron::from_normal(Vec3::NEG_Z);
        assert!(down.x == 255 || down.x == 0);
    }

    #[test]
    fn octahedron_axes() {
        assert_eq!(
            Octahedron::from_normal(Vec3::X),
            Octahedron { x: 255, y: 128 }
        );
        assert_eq!(
            Octahedron::from_normal(Vec3::NEG_X),
            Octahedron { x: 0, y: 128 }
        );
        assert_eq!(
            Octahedron::from_normal(Vec3::Y),
            Octahedron { x: 128, y: 255 }
        );
    }

    #[test]
    fn octahedron_zero_input() {
        assert_eq!(
            Octahedron::from_normal(Vec3::ZERO),
            Octahedron { x: 128, y: 128 }
        );
    }

    #[test]
    fn aabb_from_points() {
        let points = [
            Vec3::new(-1.0, 2.0, 0.5),
            Vec3::new(3.0, -4.0, 0.0),
            Vec3::new(0.0, 0.0, 7.0),
        ];
        let aabb = Aabb::from_points(&points);
        assert_eq!(aabb.min, Vec3::new(-1.0, -4.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(3.0, 2.0, 7.0));
        assert_eq!(aabb.center(), Vec3::new(1.0, -1.0, 3.5));
        assert_eq!(aabb.size(), Vec3::new(4.0, 6.0, 7.0));
    }

    #[test]
    fn aabb_empty() {
        let aabb = Aabb::from_points(&[]);
        assert_eq!(aabb.min, Vec3::ZERO);
        assert_eq!(aabb.max, Vec3::ZERO);
    }

    fn triangle() -> Vec<Vec3> {
        vec![Vec3::ZERO, Vec3::X, Vec3::Y]
    }

    #[test]
    fn validate_accepts_minimal_mesh() {
        let positions = triangle();
        let normals = vec![Octahedron { x: 128, y: 128 }; 3];
        let mesh = MeshData {
            positions: &positions,
            normals: &normals,
            colors: &[],
            uv_channels: Vec::new(),
        };
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.num_triangles(), 1);
    }

    #[test]
    fn validate_rejects_empty() {
        let mesh = MeshData {
            positions: &[],
            normals: &[],
            colors: &[],
            uv_channels: Vec::new(),
        };
        assert!(matches!(mesh.validate(), Err(BuildError::EmptyMesh)));
    }

    #[test]
    fn validate_rejects_non_triangle_list() {
        let positions = vec![Vec3::ZERO, Vec3::X];
        let normals = vec![Octahedron { x: 0, y: 0 }; 2];
        let mesh = MeshData {
            positions: &positions,
            normals: &normals,
            colors: &[],
            uv_channels: Vec::new(),
        };
        assert!(matches!(
            mesh.validate(),
            Err(BuildError::NotTriangleList { len: 2 })
        ));
    }

    #[test]
    fn validate_rejects_short_normals() {
        let positions = triangle();
        let normals = vec![Octahedron { x: 0, y: 0 }; 2];
        let mesh = MeshData {
            positions: &positions,
            normals: &normals,
            colors: &[],
            uv_channels: Vec::new(),
        };
        assert!(matches!(
            mesh.validate(),
            Err(BuildError::AttributeLengthMismatch { .. })
        ));
    }

    #[test]
    fn validate_rejects_mismatched_uvs() {
        let positions = triangle();
        let normals = vec![Octahedron { x: 0, y: 0 }; 3];
        let uvs = vec![Vec2::ZERO; 2];
        let mesh = MeshData {
            positions: &positions,
            normals: &normals,
            colors: &[],
            uv_channels: vec![&uvs],
        };
        assert!(matches!(
            mesh.validate(),
            Err(BuildError::AttributeLengthMismatch { .. })
        ));
    }
}
