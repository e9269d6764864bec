//! Cluster compressor for virtualized-geometry streaming.
//!
//! Takes a flat triangle soup (positions, octahedral normals, optional
//! vertex colors, up to four UV channels), splits it into fixed-capacity
//! clusters, derives per-cluster quantization envelopes, and serializes
//! everything into the bit-packed page images a streaming runtime loads
//! straight onto the GPU. A 4-ary hierarchy of proxy bounding nodes is
//! built on top so the runtime can address leaf clusters.
//!
//! Entry point is [`Builder`]:
//!
//! ```no_run
//! use glam::Vec3;
//! use meshpage::{Builder, MeshData, Octahedron};
//!
//! let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
//! let normals = vec![Octahedron { x: 128, y: 128 }; 3];
//! let mesh = MeshData {
//!     positions: &positions,
//!     normals: &normals,
//!     colors: &[],
//!     uv_channels: Vec::new(),
//! };
//! let output = Builder::new(mesh).build().unwrap();
//! ```

/// Error types for the build pipeline.
pub mod error;

/// Input mesh views, octahedral normals, bounding boxes.
pub mod mesh;

/// Arbitrary-width bit appends with alignment flush.
pub mod bitwriter;

/// Zig-zag coding, shortest-wrap reduction, order-preserving UV floats.
pub mod codec;

/// Per-cluster quantization envelopes and GPU section sizes.
pub mod encoding;

/// Cluster storage and the greedy cluster builder.
pub mod cluster;

/// Fixed-layout packed cluster descriptor.
pub mod packed;

/// Page disk-image serialization.
pub mod page;

/// Proxy bounding-node hierarchy.
pub mod hierarchy;

/// Page packing, fix-up chunks, and the top-level driver.
pub mod builder;

pub use builder::{BuildOutput, Builder, PageStreamingState, Resources};
pub use cluster::Cluster;
pub use encoding::{EncodingInfo, EncodingSettings};
pub use error::BuildError;
pub use hierarchy::PackedHierarchyNode;
pub use mesh::{Aabb, MeshData, Octahedron};
pub use packed::PackedCluster;

/// Maximum vertices a cluster may hold.
pub const MAX_CLUSTER_VERTICES: usize = 128;
/// Maximum triangles a cluster may hold.
pub const MAX_CLUSTER_TRIANGLES: usize = 128;

/// Per-axis ceiling on quantized-position bit widths.
pub const MAX_POSITION_QUANTIZATION_BITS: u32 = 21;
/// Bias applied to the position precision when stored in a packed cluster.
pub const MIN_POSITION_PRECISION: i32 = -20;

/// Bits per octahedral normal component.
pub const NORMAL_BITS: u32 = 8;

/// Maximum UV channels per mesh.
pub const MAX_UVS: usize = 4;
/// Exponent bits of the order-preserving UV float format.
pub const UV_FLOAT_NUM_EXPONENT_BITS: u32 = 5;
/// Mantissa bits of the order-preserving UV float format.
pub const UV_FLOAT_NUM_MANTISSA_BITS: u32 = 21;
/// Total bits of an encoded UV float (sign + exponent + mantissa).
pub const UV_FLOAT_MAX_BITS: u32 = 1 + UV_FLOAT_NUM_EXPONENT_BITS + UV_FLOAT_NUM_MANTISSA_BITS;

/// Hard GPU-size budget for one page, in bytes.
pub const ROOT_PAGE_GPU_SIZE: u32 = 128 * 1024;
/// Hard cluster-count budget for one page.
pub const ROOT_PAGE_MAX_CLUSTERS: usize = 256;
/// Size of the GPU page header, in bytes.
pub const GPU_PAGE_HEADER_SIZE: u32 = 16;

/// Depth limit of the cluster hierarchy.
pub const MAX_CLUSTER_HIERARCHY_DEPTH: u32 = 12;

/// Color mode: every vertex is white.
pub const VERTEX_COLOR_MODE_WHITE: u32 = 0;
/// Color mode: one constant color for the whole cluster.
pub const VERTEX_COLOR_MODE_CONSTANT: u32 = 1;
/// Color mode: per-vertex delta-coded colors.
pub const VERTEX_COLOR_MODE_VARIABLE: u32 = 2;

/// Cluster flag: terminal unit of streaming.
pub const CLUSTER_FLAG_STREAMING_LEAF: u32 = 1;
/// Cluster flag: coarsest-LOD leaf.
pub const CLUSTER_FLAG_ROOT_LEAF: u32 = 2;

/// Magic number of a fix-up chunk header.
pub const FIXUP_MAGIC: u16 = 0x464E;
