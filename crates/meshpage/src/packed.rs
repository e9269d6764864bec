//! Fixed-layout descriptors shared with the GPU decoder.
//!
//! Field packing is bit-exact; the decoder addresses every field by
//! position. All multi-bit fields are little-endian within their word.

use crate::bitwriter::BitWriter;
use crate::cluster::Cluster;
use crate::encoding::EncodingInfo;
use crate::{
    CLUSTER_FLAG_ROOT_LEAF, CLUSTER_FLAG_STREAMING_LEAF, MAX_UVS, MIN_POSITION_PRECISION,
    NORMAL_BITS, VERTEX_COLOR_MODE_CONSTANT, VERTEX_COLOR_MODE_VARIABLE,
};
use bytemuck::{Pod, Zeroable};
use half::f16;

/// One cluster's GPU descriptor: 256 bytes, 16 float4 vectors.
///
/// Word layout:
/// - `num_verts_position_offset`: verts in bits `[8:0]`, position-section
///   offset in `[31:9]`
/// - `num_tris_index_offset`: triangles in `[7:0]`, index-section offset
///   in `[31:8]`
/// - `color_bits_group_index`: RGBA bit widths in four nibbles, page-local
///   vertex offset in `[31:16]`
/// - `bits_per_index_pos_precision_pos_bits`: index bits `[3:0]`,
///   precision (biased by `-MIN_POSITION_PRECISION`) `[9:4]`, per-axis
///   position bits `[14:10]`, `[19:15]`, `[24:20]`
/// - `lod_error_and_edge_length`: LOD error f16 low, max edge f16 high
/// - `attribute_offset_bits_per_attribute`: offset `[21:0]`, bits `[31:22]`
/// - `decode_info_offset_num_uvs_color_mode`: offset `[21:0]`, UV count
///   `[24:22]`, color mode `[26:25]`, tangent flag `[27]`, normal
///   precision `[31:28]`
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct PackedCluster {
    pub num_verts_position_offset: u32,
    pub num_tris_index_offset: u32,
    pub color_min: u32,
    pub color_bits_group_index: u32,

    pub pos_start: [i32; 3],
    pub bits_per_index_pos_precision_pos_bits: u32,

    pub lod_bounds: [f32; 4],

    pub box_bounds_center: [f32; 3],
    pub lod_error_and_edge_length: u32,

    pub box_bounds_extent: [f32; 3],
    pub flags: u32,

    pub attribute_offset_bits_per_attribute: u32,
    pub decode_info_offset_num_uvs_color_mode: u32,
    pub uv_bit_offsets: u32,
    pub packed_material_info: u32,

    pub vert_reuse_batch_info: [u32; 4],

    pub reserved: [u32; 36],
}

/// One UV channel's decode-info record: `(min << 5) | num_bits` per axis.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct PackedUvRange {
    pub data: [u32; 2],
}

/// Pack RGBA into the ABGR word layout of `color_min`.
pub fn pack_abgr(color: [u8; 4]) -> u32 {
    let [r, g, b, a] = color;
    ((a as u32) << 24) | ((b as u32) << 16) | ((g as u32) << 8) | (r as u32)
}

impl PackedCluster {
    pub fn num_verts(&self) -> u32 {
        self.num_verts_position_offset & 0x1FF
    }

    pub fn num_tris(&self) -> u32 {
        self.num_tris_index_offset & 0xFF
    }

    pub fn color_mode(&self) -> u32 {
        (self.decode_info_offset_num_uvs_color_mode >> 25) & 0x3
    }

    pub fn bits_per_attribute(&self) -> u32 {
        self.attribute_offset_bits_per_attribute >> 22
    }

    pub fn set_group_index(&mut self, group_index: u16) {
        self.color_bits_group_index =
            (self.color_bits_group_index & 0xFFFF) | ((group_index as u32) << 16);
    }

    pub fn set_index_offset(&mut self, offset: u32) {
        debug_assert!(offset < (1 << 24));
        self.num_tris_index_offset = (self.num_tris_index_offset & 0xFF) | (offset << 8);
    }

    pub fn set_position_offset(&mut self, offset: u32) {
        debug_assert!(offset < (1 << 23));
        self.num_verts_position_offset = (self.num_verts_position_offset & 0x1FF) | (offset << 9);
    }

    pub fn set_attribute_offset(&mut self, offset: u32) {
        debug_assert!(offset < (1 << 22));
        self.attribute_offset_bits_per_attribute =
            (self.attribute_offset_bits_per_attribute & !0x3F_FFFF) | offset;
    }

    pub fn set_decode_info_offset(&mut self, offset: u32) {
        debug_assert!(offset < (1 << 22));
        self.decode_info_offset_num_uvs_color_mode =
            (self.decode_info_offset_num_uvs_color_mode & !0x3F_FFFF) | offset;
    }

    /// Copy the inline material-batch descriptor words into place.
    pub fn set_vert_reuse_batch_info(&mut self, words: &[u32]) {
        debug_assert!(words.len() <= self.vert_reuse_batch_info.len());
        self.vert_reuse_batch_info[..words.len()].copy_from_slice(words);
    }
}

/// Populate the fixed descriptor from a cluster and its envelope.
///
/// The page-relative fields (group index, section offsets, material
/// info, batch descriptor) are filled in by the page serializer.
pub fn pack_cluster(cluster: &Cluster, info: &EncodingInfo) -> PackedCluster {
    let bounds = cluster.bounds();
    let center = bounds.center();
    let extent = bounds.extent();

    let mut packed = PackedCluster::zeroed();

    packed.num_verts_position_offset = cluster.num_vertices() as u32;
    packed.num_tris_index_offset = cluster.num_triangles() as u32;

    let (color_mode, color_min, color_bits) = if cluster.colors.is_empty() {
        (VERTEX_COLOR_MODE_CONSTANT, pack_abgr([255; 4]), [0; 4])
    } else if info.has_constant_color() {
        (VERTEX_COLOR_MODE_CONSTANT, pack_abgr(info.color_min), [0; 4])
    } else {
        (
            VERTEX_COLOR_MODE_VARIABLE,
            pack_abgr(info.color_min),
            info.color_bits,
        )
    };
    packed.color_min = color_min;
    packed.color_bits_group_index = color_bits[0]
        | (color_bits[1] << 4)
        | (color_bits[2] << 8)
        | (color_bits[3] << 12);

    packed.pos_start = info.position_min.to_array();

    let biased_precision = (info.settings.position_precision - MIN_POSITION_PRECISION) as u32;
    debug_assert!(biased_precision < (1 << 6));
    packed.bits_per_index_pos_precision_pos_bits = info.bits_per_index
        | (biased_precision << 4)
        | ((info.position_bits.x as u32) << 10)
        | ((info.position_bits.y as u32) << 15)
        | ((info.position_bits.z as u32) << 20);

    packed.lod_bounds = [center.x, center.y, center.z, bounds.sphere_radius()];
    packed.box_bounds_center = center.to_array();
    packed.box_bounds_extent = extent.to_array();

    // No simplification chain: a fixed small LOD error
    packed.lod_error_and_edge_length = (f16::from_f32(0.1).to_bits() as u32)
        | ((f16::from_f32(cluster.max_edge_length()).to_bits() as u32) << 16);

    packed.flags = CLUSTER_FLAG_STREAMING_LEAF | CLUSTER_FLAG_ROOT_LEAF;

    packed.attribute_offset_bits_per_attribute = info.bits_per_attribute << 22;

    debug_assert!(cluster.uv_channels.len() <= MAX_UVS);
    packed.decode_info_offset_num_uvs_color_mode = ((cluster.uv_channels.len() as u32) << 22)
        | (color_mode << 25)
        | (NORMAL_BITS << 28);

    let mut bit_offset = 0u32;
    for (uv_index, range) in info.uv_ranges.iter().enumerate() {
        debug_assert!(bit_offset < 256);
        packed.uv_bit_offsets |= bit_offset << (uv_index * 8);
        bit_offset += range.num_bits.x + range.num_bits.y;
    }

    packed
}

/// Build the bit-packed material-batch descriptor for one cluster.
///
/// One 4-bit batch count followed by two zero counts (three material
/// ranges, only the first populated), then 5 bits of `count - 1` per
/// batch, flushed to a word boundary.
pub fn material_batch_info(cluster: &Cluster) -> Vec<u32> {
    const BATCH_COUNT_BITS: u32 = 4;
    const TRIANGLE_COUNT_BITS: u32 = 5;

    let num_batches = cluster.num_material_batches();

    let mut writer = BitWriter::new();
    writer.append(num_batches as u32, BATCH_COUNT_BITS);
    writer.append(0, BATCH_COUNT_BITS);
    writer.append(0, BATCH_COUNT_BITS);

    let triangles_per_batch = 32 / 3;
    let mut triangles_left = cluster.num_triangles();
    for _ in 0..num_batches {
        let in_batch = triangles_left.min(triangles_per_batch);
        writer.append(in_batch as u32 - 1, TRIANGLE_COUNT_BITS);
        triangles_left -= in_batch;
    }
    debug_assert!(triangles_left == 0);

    writer.flush(4);
    writer.words()
}
