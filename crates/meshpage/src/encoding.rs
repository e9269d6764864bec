//! Per-cluster quantization envelopes and GPU section-size arithmetic.

use crate::cluster::Cluster;
use crate::codec::encode_uv_float;
use crate::packed::{PackedCluster, PackedUvRange};
use crate::{GPU_PAGE_HEADER_SIZE, MAX_POSITION_QUANTIZATION_BITS, NORMAL_BITS, UV_FLOAT_NUM_MANTISSA_BITS};
use glam::{IVec3, UVec2};
use std::ops::AddAssign;

/// Build-time knobs. The quantization step size is `2^(-position_precision)`.
#[derive(Clone, Copy, Debug)]
pub struct EncodingSettings {
    pub position_precision: i32,
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self {
            position_precision: 4,
        }
    }
}

/// Encoded-value range of one UV channel within a cluster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UvRange {
    pub min: UVec2,
    pub num_bits: UVec2,
}

/// Byte sizes (or, after [`PageSections::offsets`], byte offsets) of the
/// GPU-visible sections of a page.
///
/// The section order is fixed: packed clusters, material table,
/// vertex-reuse batch info, decode info, index data, position data,
/// attribute data. The material-table and batch-info sections are
/// 16-byte aligned at their ends; decode info onwards accumulate raw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageSections {
    pub cluster: u32,
    pub material_table: u32,
    pub vert_reuse_batch_info: u32,
    pub decode_info: u32,
    pub index: u32,
    pub position: u32,
    pub attribute: u32,
}

/// Round up to a 16-byte boundary.
pub fn align16(value: u32) -> u32 {
    (value + 15) & !15
}

impl PageSections {
    pub fn cluster_offset() -> u32 {
        GPU_PAGE_HEADER_SIZE
    }

    pub fn material_table_offset(&self) -> u32 {
        Self::cluster_offset() + self.cluster
    }

    pub fn vert_reuse_batch_info_offset(&self) -> u32 {
        self.material_table_offset() + align16(self.material_table)
    }

    pub fn decode_info_offset(&self) -> u32 {
        self.vert_reuse_batch_info_offset() + align16(self.vert_reuse_batch_info)
    }

    pub fn index_offset(&self) -> u32 {
        self.decode_info_offset() + self.decode_info
    }

    pub fn position_offset(&self) -> u32 {
        self.index_offset() + self.index
    }

    pub fn attribute_offset(&self) -> u32 {
        self.position_offset() + self.position
    }

    pub fn total(&self) -> u32 {
        self.attribute_offset() + self.attribute
    }

    /// Rewrite every size as the absolute offset where its section starts.
    pub fn offsets(&self) -> PageSections {
        PageSections {
            cluster: Self::cluster_offset(),
            material_table: self.material_table_offset(),
            vert_reuse_batch_info: self.vert_reuse_batch_info_offset(),
            decode_info: self.decode_info_offset(),
            index: self.index_offset(),
            position: self.position_offset(),
            attribute: self.attribute_offset(),
        }
    }
}

impl AddAssign for PageSections {
    fn add_assign(&mut self, other: Self) {
        self.cluster += other.cluster;
        self.material_table += other.material_table;
        self.vert_reuse_batch_info += other.vert_reuse_batch_info;
        self.decode_info += other.decode_info;
        self.index += other.index;
        self.position += other.position;
        self.attribute += other.attribute;
    }
}

/// Derived, immutable encoding parameters of one cluster.
#[derive(Clone, Debug)]
pub struct EncodingInfo {
    pub settings: EncodingSettings,

    pub bits_per_index: u32,
    pub bits_per_attribute: u32,

    pub position_min: IVec3,
    pub position_bits: IVec3,

    pub color_min: [u8; 4],
    pub color_max: [u8; 4],
    pub color_bits: [u32; 4],

    pub uv_ranges: Vec<UvRange>,

    pub gpu_sizes: PageSections,
}

/// `ceil(log2(value))`; zero for 0 and 1.
pub fn ceil_log2(value: u32) -> u32 {
    if value <= 1 {
        0
    } else {
        32 - (value - 1).leading_zeros()
    }
}

fn floor_log2(value: u32) -> u32 {
    debug_assert!(value > 0);
    31 - value.leading_zeros()
}

impl EncodingInfo {
    /// Derive the quantization envelope and GPU section sizes for `cluster`.
    ///
    /// If an axis needs more than `MAX_POSITION_QUANTIZATION_BITS`, a
    /// warning is logged and the width is clamped; quantization error in
    /// that case is unavoidable.
    pub fn for_cluster(cluster: &Cluster, settings: &EncodingSettings) -> Self {
        let bounds = cluster.bounds();
        let num_vertices = cluster.num_vertices() as u32;
        let num_triangles = cluster.num_triangles() as u32;

        let bits_per_index = floor_log2((num_vertices - 1).max(1)) + 1;
        let mut bits_per_attribute = 2 * NORMAL_BITS;

        let scale = (settings.position_precision as f32).exp2();
        let quantized_min = IVec3::new(
            (bounds.min.x * scale).floor() as i32,
            (bounds.min.y * scale).floor() as i32,
            (bounds.min.z * scale).floor() as i32,
        );
        let quantized_max = IVec3::new(
            (bounds.max.x * scale).ceil() as i32,
            (bounds.max.y * scale).ceil() as i32,
            (bounds.max.z * scale).ceil() as i32,
        );

        let range = quantized_max - quantized_min;
        let mut position_bits = IVec3::new(
            ceil_log2(range.x as u32 + 1) as i32,
            ceil_log2(range.y as u32 + 1) as i32,
            ceil_log2(range.z as u32 + 1) as i32,
        );

        if position_bits.max_element() > MAX_POSITION_QUANTIZATION_BITS as i32 {
            log::warn!(
                "position precision {} too high for cluster spanning {:?}, clamping to {} bits",
                settings.position_precision,
                bounds.size(),
                MAX_POSITION_QUANTIZATION_BITS
            );
            position_bits = position_bits.min(IVec3::splat(MAX_POSITION_QUANTIZATION_BITS as i32));
        }

        let mut color_min = [0u8; 4];
        let mut color_max = [0u8; 4];
        let mut color_bits = [0u32; 4];
        if !cluster.colors.is_empty() {
            color_min = cluster.colors[0];
            color_max = cluster.colors[0];
            for color in &cluster.colors[1..] {
                for channel in 0..4 {
                    color_min[channel] = color_min[channel].min(color[channel]);
                    color_max[channel] = color_max[channel].max(color[channel]);
                }
            }

            if color_min != color_max {
                for channel in 0..4 {
                    color_bits[channel] =
                        ceil_log2(color_max[channel] as u32 - color_min[channel] as u32 + 1);
                    bits_per_attribute += color_bits[channel];
                }
            }
        }

        let mut uv_ranges = Vec::with_capacity(cluster.uv_channels.len());
        for uvs in &cluster.uv_channels {
            let mut min = UVec2::MAX;
            let mut max = UVec2::ZERO;
            for uv in uvs {
                let encoded = UVec2::new(
                    encode_uv_float(uv.x, UV_FLOAT_NUM_MANTISSA_BITS),
                    encode_uv_float(uv.y, UV_FLOAT_NUM_MANTISSA_BITS),
                );
                min = min.min(encoded);
                max = max.max(encoded);
            }

            let delta = max - min;
            let num_bits = UVec2::new(ceil_log2(delta.x + 1), ceil_log2(delta.y + 1));
            bits_per_attribute += num_bits.x + num_bits.y;
            uv_ranges.push(UvRange { min, num_bits });
        }

        let mut gpu_sizes = PageSections {
            cluster: std::mem::size_of::<PackedCluster>() as u32,
            decode_info: (cluster.uv_channels.len() * std::mem::size_of::<PackedUvRange>()) as u32,
            ..Default::default()
        };

        // Base index plus two 5-bit strip offsets per triangle
        let bits_per_triangle = bits_per_index + 2 * 5;
        gpu_sizes.index = (num_triangles * bits_per_triangle).div_ceil(32) * 4;

        let position_bits_per_vertex =
            (position_bits.x + position_bits.y + position_bits.z) as u32;
        gpu_sizes.position = (num_vertices * position_bits_per_vertex).div_ceil(32) * 4;
        gpu_sizes.attribute = (num_vertices * bits_per_attribute).div_ceil(32) * 4;

        Self {
            settings: *settings,
            bits_per_index,
            bits_per_attribute,
            position_min: quantized_min,
            position_bits,
            color_min,
            color_max,
            color_bits,
            uv_ranges,
            gpu_sizes,
        }
    }

    /// True when the cluster stores one color for every vertex.
    pub fn has_constant_color(&self) -> bool {
        self.color_bits == [0; 4]
    }
}
