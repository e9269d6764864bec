//! Page disk-image serialization.
//!
//! A page is written in one pass into the growing output buffer, with
//! the disk headers back-patched at the end. Every offset stored in a
//! header is relative to the page's first byte; the layout is described
//! field by field on [`write_page_data`].

use crate::cluster::EncodedCluster;
use crate::codec::{encode_uv_float, encode_zigzag, shortest_wrap};
use crate::encoding::{align16, EncodingSettings, PageSections};
use crate::error::BuildError;
use crate::packed::{material_batch_info, pack_cluster, PackedCluster, PackedUvRange};
use crate::{
    MAX_CLUSTER_TRIANGLES, MAX_CLUSTER_VERTICES, NORMAL_BITS, ROOT_PAGE_GPU_SIZE,
    UV_FLOAT_MAX_BITS, UV_FLOAT_NUM_MANTISSA_BITS,
};
use bytemuck::{bytes_of, cast_slice, Pod, Zeroable};
use glam::{IVec2, IVec3, IVec4};

/// Header of one page's disk image, back-patched after serialization.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct PageDiskHeader {
    pub num_clusters: u32,
    pub num_raw_float4s: u32,
    pub num_vertex_refs: u32,
    pub decode_info_offset: u32,
    pub strip_bitmask_offset: u32,
    pub vertex_ref_bitmask_offset: u32,
}

/// Per-cluster disk header, back-patched after serialization.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct ClusterDiskHeader {
    pub index_data_offset: u32,
    pub page_cluster_map_offset: u32,
    pub vertex_ref_data_offset: u32,
    pub low_bytes_offset: u32,
    pub mid_bytes_offset: u32,
    pub high_bytes_offset: u32,
    pub num_vertex_refs: u32,
    pub num_prev_ref_vertices_before_dwords: u32,
    pub num_prev_new_vertices_before_dwords: u32,
}

/// 16-byte header at the start of the GPU-visible part of a page.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct PageGpuHeader {
    pub num_clusters: u32,
    pub pad: [u32; 3],
}

/// The three parallel delta byte streams of a page.
#[derive(Default)]
struct ByteStreams {
    low: Vec<u8>,
    mid: Vec<u8>,
    high: Vec<u8>,
}

impl ByteStreams {
    /// Zig-zag `delta` and split it across the streams, lowest byte to
    /// the low stream.
    fn write_delta(&mut self, delta: i32, num_bytes: u32) {
        let value = encode_zigzag(delta);

        debug_assert!(num_bytes <= 3);
        debug_assert!((value as u64) < (1u64 << (num_bytes * 8)));

        if num_bytes >= 3 {
            self.high.push((value >> 16) as u8);
        }
        if num_bytes >= 2 {
            self.mid.push((value >> 8) as u8);
        }
        if num_bytes >= 1 {
            self.low.push(value as u8);
        }
    }
}

#[derive(Clone, Copy, Default)]
struct StreamCounters {
    low: u32,
    mid: u32,
    high: u32,
}

/// `floor(value + 0.5)`, matching the decoder's reconstruction.
fn round_to_int(value: f32) -> i32 {
    (value + 0.5).floor() as i32
}

/// Serialize one page of clusters into `page_data`, advancing
/// `vertex_offset` by every vertex written.
///
/// Layout, in order: page disk header, cluster disk headers, GPU page
/// header, packed clusters in column-major 16-byte interleave, decode
/// info (padded to 16), index data (empty), strip bitmasks, page-cluster
/// map (empty), vertex-ref bitmasks, vertex-ref data (empty), then the
/// low, mid, and high delta byte streams back to back.
pub(crate) fn write_page_data(
    clusters: &[EncodedCluster],
    settings: &EncodingSettings,
    page_data: &mut Vec<u8>,
    vertex_offset: &mut i32,
) -> Result<(), BuildError> {
    if clusters.is_empty() {
        return Err(BuildError::internal("page has no clusters"));
    }
    if page_data.len() % 4 != 0 {
        return Err(BuildError::internal("page does not start word-aligned"));
    }

    let page_start = page_data.len();
    let num_clusters = clusters.len();

    let num_uvs = clusters[0].cluster.uv_channels.len();
    for encoded in clusters {
        debug_assert!(encoded.cluster.num_triangles() <= MAX_CLUSTER_TRIANGLES);
        if encoded.cluster.uv_channels.len() != num_uvs {
            return Err(BuildError::internal(
                "UV channel count differs between clusters in one page",
            ));
        }
    }

    // GPU section sizes for the whole page, then running per-cluster offsets
    let mut page_gpu_sizes = PageSections::default();
    for encoded in clusters {
        page_gpu_sizes += encoded.info.gpu_sizes;
    }
    let mut gpu_section_offsets = page_gpu_sizes.offsets();

    let start_vertex_offset = *vertex_offset;
    let mut packed_clusters = Vec::with_capacity(num_clusters);
    for encoded in clusters {
        let cluster = &encoded.cluster;
        let info = &encoded.info;

        let mut packed = pack_cluster(cluster, info);

        let relative_vertex_offset = *vertex_offset - start_vertex_offset;
        let group_index = u16::try_from(relative_vertex_offset)
            .map_err(|_| BuildError::internal("page-relative vertex offset exceeds 16 bits"))?;
        packed.set_group_index(group_index);
        *vertex_offset += cluster.num_vertices() as i32;

        let batch_words = material_batch_info(cluster);
        packed.packed_material_info = (cluster.num_triangles() as u32 - 1) << 18;

        if gpu_section_offsets.index % 4 != 0
            || gpu_section_offsets.position % 4 != 0
            || gpu_section_offsets.attribute % 4 != 0
        {
            return Err(BuildError::internal("misaligned GPU section offset"));
        }
        packed.set_index_offset(gpu_section_offsets.index);
        packed.set_position_offset(gpu_section_offsets.position);
        packed.set_attribute_offset(gpu_section_offsets.attribute);
        packed.set_decode_info_offset(gpu_section_offsets.decode_info);
        packed.set_vert_reuse_batch_info(&batch_words);

        gpu_section_offsets += info.gpu_sizes;
        packed_clusters.push(packed);
    }

    // The running offsets must land exactly on the next section's start
    if gpu_section_offsets.cluster != page_gpu_sizes.material_table_offset()
        || align16(gpu_section_offsets.material_table) != page_gpu_sizes.vert_reuse_batch_info_offset()
        || align16(gpu_section_offsets.vert_reuse_batch_info) != page_gpu_sizes.decode_info_offset()
        || gpu_section_offsets.decode_info != page_gpu_sizes.index_offset()
        || gpu_section_offsets.index != page_gpu_sizes.position_offset()
        || gpu_section_offsets.position != page_gpu_sizes.attribute_offset()
        || gpu_section_offsets.attribute != page_gpu_sizes.total()
    {
        return Err(BuildError::internal("GPU section offsets out of step"));
    }
    if page_gpu_sizes.total() > ROOT_PAGE_GPU_SIZE {
        return Err(BuildError::internal("page exceeds the GPU size budget"));
    }

    let mut disk_header = PageDiskHeader {
        num_clusters: num_clusters as u32,
        ..Default::default()
    };
    let disk_header_pos = page_data.len();
    page_data.extend_from_slice(bytes_of(&PageDiskHeader::zeroed()));

    let mut cluster_headers = vec![ClusterDiskHeader::zeroed(); num_clusters];
    let cluster_headers_pos = page_data.len();
    page_data.extend_from_slice(cast_slice(&cluster_headers));

    let page_offset = |page_data: &Vec<u8>| (page_data.len() - page_start) as u32;

    let raw_float4_start = page_offset(page_data);

    let gpu_header = PageGpuHeader {
        num_clusters: num_clusters as u32,
        pad: [0; 3],
    };
    page_data.extend_from_slice(bytes_of(&gpu_header));

    // Packed clusters, column-major: vector v of every cluster, then v + 1.
    // The decoder reads these with lane-parallel 16-byte loads.
    const VECTOR_SIZE: usize = 16;
    let vectors_per_cluster = std::mem::size_of::<PackedCluster>() / VECTOR_SIZE;
    for vector_index in 0..vectors_per_cluster {
        for packed in &packed_clusters {
            let bytes = bytes_of(packed);
            page_data
                .extend_from_slice(&bytes[vector_index * VECTOR_SIZE..(vector_index + 1) * VECTOR_SIZE]);
        }
    }

    // Decode info: one packed UV range per cluster per channel
    {
        disk_header.decode_info_offset = page_offset(page_data);

        for encoded in clusters {
            for range in &encoded.info.uv_ranges {
                debug_assert!(
                    range.num_bits.x <= UV_FLOAT_MAX_BITS && range.num_bits.y <= UV_FLOAT_MAX_BITS
                );
                debug_assert!(
                    range.min.x < (1 << UV_FLOAT_MAX_BITS) && range.min.y < (1 << UV_FLOAT_MAX_BITS)
                );

                let packed_range = PackedUvRange {
                    data: [
                        (range.min.x << 5) | range.num_bits.x,
                        (range.min.y << 5) | range.num_bits.y,
                    ],
                };
                page_data.extend_from_slice(bytes_of(&packed_range));
            }
        }

        while (page_offset(page_data) - disk_header.decode_info_offset) % 16 != 0 {
            page_data.push(0);
        }
    }

    let raw_float4_end = page_offset(page_data);
    if (raw_float4_end - raw_float4_start) % 16 != 0 {
        return Err(BuildError::internal("raw float4 region not vector-aligned"));
    }
    disk_header.num_raw_float4s = (raw_float4_end - raw_float4_start) / 16;

    // Index data region: strip indices replace explicit indices, and with
    // vertex reuse disabled there is nothing to write. Only the per-dword
    // new-vertex prefix counts survive.
    {
        for (cluster_index, encoded) in clusters.iter().enumerate() {
            let header = &mut cluster_headers[cluster_index];

            let mut new_vertices_in_dword = [0u32; MAX_CLUSTER_TRIANGLES / 32];
            for triangle_index in 0..encoded.cluster.num_triangles() {
                new_vertices_in_dword[triangle_index >> 5] += 3;
            }

            let before_1 = new_vertices_in_dword[0];
            let before_2 = new_vertices_in_dword[1] + before_1;
            let before_3 = new_vertices_in_dword[2] + before_2;
            debug_assert!(before_1 < 1024 && before_2 < 1024 && before_3 < 1024);

            header.num_prev_new_vertices_before_dwords =
                (before_3 << 20) | (before_2 << 10) | before_1;
            // Vertex reuse is disabled, so no references precede any dword
            header.num_prev_ref_vertices_before_dwords = 0;

            header.index_data_offset = page_offset(page_data);
        }

        while page_data.len() % 4 != 0 {
            page_data.push(0);
        }
    }

    // Strip bitmasks: every triangle starts a new strip, nothing is reused
    {
        disk_header.strip_bitmask_offset = page_offset(page_data);

        for _ in 0..num_clusters {
            for _ in 0..MAX_CLUSTER_TRIANGLES / 32 {
                page_data.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
                page_data.extend_from_slice(&0u32.to_le_bytes());
                page_data.extend_from_slice(&0u32.to_le_bytes());
            }
        }
    }

    // Page-cluster map: the region itself is empty
    for header in &mut cluster_headers {
        header.page_cluster_map_offset = page_offset(page_data);
    }

    // Vertex-reference bitmasks: all zero, no vertex is a reference
    {
        disk_header.vertex_ref_bitmask_offset = page_offset(page_data);
        let zero_words = vec![0u8; (MAX_CLUSTER_VERTICES / 32) * 4];
        for _ in 0..num_clusters {
            page_data.extend_from_slice(&zero_words);
        }
    }

    // Vertex-reference data: empty
    {
        disk_header.num_vertex_refs = 0;
        for header in &mut cluster_headers {
            header.vertex_ref_data_offset = page_offset(page_data);
            header.num_vertex_refs = 0;
        }
        while page_data.len() % 4 != 0 {
            page_data.push(0);
        }
    }

    // Attribute delta streams
    {
        let mut streams = ByteStreams::default();
        let mut counters = vec![StreamCounters::default(); num_clusters];

        for (cluster_index, encoded) in clusters.iter().enumerate() {
            let cluster = &encoded.cluster;
            let info = &encoded.info;

            let low_before = streams.low.len();
            let mid_before = streams.mid.len();
            let high_before = streams.high.len();

            let bytes_per_position_component =
                (info.position_bits.max_element() as u32).div_ceil(8);
            let bytes_per_normal_component = NORMAL_BITS.div_ceil(8);

            {
                let scale = (settings.position_precision as f32).exp2();

                let mut prev_position = IVec3::new(
                    (1 << info.position_bits.x) / 2,
                    (1 << info.position_bits.y) / 2,
                    (1 << info.position_bits.z) / 2,
                );

                for &float_position in &cluster.positions {
                    let position = IVec3::new(
                        round_to_int(float_position.x * scale),
                        round_to_int(float_position.y * scale),
                        round_to_int(float_position.z * scale),
                    ) - info.position_min;
                    let delta = position - prev_position;

                    streams.write_delta(
                        shortest_wrap(delta.x, info.position_bits.x as u32),
                        bytes_per_position_component,
                    );
                    streams.write_delta(
                        shortest_wrap(delta.y, info.position_bits.y as u32),
                        bytes_per_position_component,
                    );
                    streams.write_delta(
                        shortest_wrap(delta.z, info.position_bits.z as u32),
                        bytes_per_position_component,
                    );

                    prev_position = position;
                }
            }

            {
                let mut prev_normal = IVec2::ZERO;
                for packed_normal in &cluster.normals {
                    let normal = IVec2::new(packed_normal.x as i32, packed_normal.y as i32);
                    let delta = normal - prev_normal;

                    streams.write_delta(
                        shortest_wrap(delta.x, NORMAL_BITS),
                        bytes_per_normal_component,
                    );
                    streams.write_delta(
                        shortest_wrap(delta.y, NORMAL_BITS),
                        bytes_per_normal_component,
                    );

                    prev_normal = normal;
                }
            }

            if !cluster.colors.is_empty() && !info.has_constant_color() {
                let mut prev_color = IVec4::ZERO;
                for color in &cluster.colors {
                    let relative = IVec4::new(
                        color[0] as i32 - info.color_min[0] as i32,
                        color[1] as i32 - info.color_min[1] as i32,
                        color[2] as i32 - info.color_min[2] as i32,
                        color[3] as i32 - info.color_min[3] as i32,
                    );
                    let delta = relative - prev_color;

                    streams.write_delta(shortest_wrap(delta.x, info.color_bits[0]), 1);
                    streams.write_delta(shortest_wrap(delta.y, info.color_bits[1]), 1);
                    streams.write_delta(shortest_wrap(delta.z, info.color_bits[2]), 1);
                    streams.write_delta(shortest_wrap(delta.w, info.color_bits[3]), 1);

                    prev_color = relative;
                }
            }

            for uv_index in 0..num_uvs {
                let range = &info.uv_ranges[uv_index];
                let bytes_per_component =
                    range.num_bits.x.max(range.num_bits.y).div_ceil(8);

                let mut prev_uv = IVec2::ZERO;
                for uv in &cluster.uv_channels[uv_index] {
                    let encoded_u = encode_uv_float(uv.x, UV_FLOAT_NUM_MANTISSA_BITS);
                    let encoded_v = encode_uv_float(uv.y, UV_FLOAT_NUM_MANTISSA_BITS);

                    debug_assert!(encoded_u >= range.min.x && encoded_v >= range.min.y);
                    let relative = IVec2::new(
                        (encoded_u - range.min.x) as i32,
                        (encoded_v - range.min.y) as i32,
                    );
                    let delta = relative - prev_uv;

                    streams.write_delta(
                        shortest_wrap(delta.x, range.num_bits.x),
                        bytes_per_component,
                    );
                    streams.write_delta(
                        shortest_wrap(delta.y, range.num_bits.y),
                        bytes_per_component,
                    );

                    prev_uv = relative;
                }
            }

            counters[cluster_index] = StreamCounters {
                low: (streams.low.len() - low_before) as u32,
                mid: (streams.mid.len() - mid_before) as u32,
                high: (streams.high.len() - high_before) as u32,
            };
        }

        cluster_headers[0].low_bytes_offset = page_offset(page_data);
        page_data.extend_from_slice(&streams.low);
        cluster_headers[0].mid_bytes_offset = page_offset(page_data);
        page_data.extend_from_slice(&streams.mid);
        cluster_headers[0].high_bytes_offset = page_offset(page_data);
        page_data.extend_from_slice(&streams.high);

        for cluster_index in 1..num_clusters {
            let previous = cluster_headers[cluster_index - 1];
            let previous_counters = counters[cluster_index - 1];

            let header = &mut cluster_headers[cluster_index];
            header.low_bytes_offset = previous.low_bytes_offset + previous_counters.low;
            header.mid_bytes_offset = previous.mid_bytes_offset + previous_counters.mid;
            header.high_bytes_offset = previous.high_bytes_offset + previous_counters.high;
        }

        let last_header = cluster_headers[num_clusters - 1];
        let last_counters = counters[num_clusters - 1];
        if last_header.low_bytes_offset + last_counters.low != cluster_headers[0].mid_bytes_offset
            || last_header.mid_bytes_offset + last_counters.mid
                != cluster_headers[0].high_bytes_offset
            || last_header.high_bytes_offset + last_counters.high != page_offset(page_data)
        {
            return Err(BuildError::internal("byte-stream offsets do not chain"));
        }

        while page_data.len() % 4 != 0 {
            page_data.push(0);
        }
    }

    // Back-patch the headers
    page_data[disk_header_pos..disk_header_pos + std::mem::size_of::<PageDiskHeader>()]
        .copy_from_slice(bytes_of(&disk_header));
    page_data[cluster_headers_pos
        ..cluster_headers_pos + num_clusters * std::mem::size_of::<ClusterDiskHeader>()]
        .copy_from_slice(cast_slice(&cluster_headers));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::EncodingInfo;
    use crate::mesh::Octahedron;
    use glam::Vec3;

    fn encode(cluster: crate::cluster::Cluster, settings: &EncodingSettings) -> EncodedCluster {
        let info = EncodingInfo::for_cluster(&cluster, settings);
        EncodedCluster { cluster, info }
    }

    fn single_triangle() -> crate::cluster::Cluster {
        let mut cluster = crate::cluster::Cluster::with_uv_channels(0);
        cluster.positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        cluster.normals = vec![Octahedron { x: 128, y: 128 }; 3];
        cluster
    }

    #[test]
    fn header_sizes() {
        assert_eq!(std::mem::size_of::<PageDiskHeader>(), 24);
        assert_eq!(std::mem::size_of::<ClusterDiskHeader>(), 36);
        assert_eq!(std::mem::size_of::<PageGpuHeader>(), 16);
    }

    #[test]
    fn single_triangle_page_layout() {
        let settings = EncodingSettings {
            position_precision: 0,
        };
        let clusters = vec![encode(single_triangle(), &settings)];

        let mut page_data = Vec::new();
        let mut vertex_offset = 0;
        write_page_data(&clusters, &settings, &mut page_data, &mut vertex_offset).unwrap();

        assert_eq!(vertex_offset, 3);
        assert!(page_data.len() % 4 == 0);

        let header: PageDiskHeader = bytemuck::pod_read_unaligned(&page_data[0..24]);
        assert_eq!(header.num_clusters, 1);
        assert_eq!(header.num_vertex_refs, 0);

        // Headers 24 + 36, GPU header 16, one packed cluster 256
        assert_eq!(header.decode_info_offset, 24 + 36 + 16 + 256);
        // No UVs: decode info is empty and already 16-aligned
        assert_eq!(header.num_raw_float4s, (16 + 256) / 16);

        let cluster_header: ClusterDiskHeader = bytemuck::pod_read_unaligned(&page_data[24..60]);
        assert_eq!(cluster_header.index_data_offset, header.decode_info_offset);
        assert_eq!(header.strip_bitmask_offset, header.decode_info_offset);

        // Strip bitmasks: 4 groups of 3 words
        let strip_end = header.strip_bitmask_offset + 4 * 3 * 4;
        assert_eq!(cluster_header.page_cluster_map_offset, strip_end);
        assert_eq!(header.vertex_ref_bitmask_offset, strip_end);

        // Vertex-ref bitmask: 4 zero words
        assert_eq!(cluster_header.vertex_ref_data_offset, strip_end + 16);

        // Byte streams: 3 position bytes + 2 normal bytes per vertex
        assert_eq!(cluster_header.low_bytes_offset, strip_end + 16);
        assert_eq!(
            cluster_header.mid_bytes_offset,
            cluster_header.low_bytes_offset + 15
        );
        assert_eq!(
            cluster_header.high_bytes_offset,
            cluster_header.mid_bytes_offset
        );
        assert_eq!(
            page_data.len() as u32,
            (cluster_header.high_bytes_offset + 3) / 4 * 4
        );

        // New-vertex prefix counts: 3 vertices in dword 0
        assert_eq!(
            cluster_header.num_prev_new_vertices_before_dwords,
            (3 << 20) | (3 << 10) | 3
        );
        assert_eq!(cluster_header.num_prev_ref_vertices_before_dwords, 0);
    }

    #[test]
    fn first_vertex_delta_is_centered() {
        let settings = EncodingSettings {
            position_precision: 0,
        };
        let clusters = vec![encode(single_triangle(), &settings)];

        let mut page_data = Vec::new();
        let mut vertex_offset = 0;
        write_page_data(&clusters, &settings, &mut page_data, &mut vertex_offset).unwrap();

        let cluster_header: ClusterDiskHeader = bytemuck::pod_read_unaligned(&page_data[24..60]);
        let low_start = cluster_header.low_bytes_offset as usize;

        // position_bits = (1, 1, 0); first previous is (1, 1, 0) >> centered.
        // Vertex 0 quantizes to (0, 0, 0): deltas (-1, -1, 0) wrap to
        // (-1 -> zigzag 1, -1 -> 1, 0 in zero bits -> 0)
        assert_eq!(page_data[low_start], 1);
        assert_eq!(page_data[low_start + 1], 1);
        assert_eq!(page_data[low_start + 2], 0);

        // Vertex 1 is (1, 0, 0): deltas (+1, 0, 0); +1 wraps to -1 in one bit
        assert_eq!(page_data[low_start + 3], 1);
        assert_eq!(page_data[low_start + 4], 0);
    }

    #[test]
    fn two_cluster_streams_chain() {
        let settings = EncodingSettings {
            position_precision: 0,
        };
        let clusters = vec![
            encode(single_triangle(), &settings),
            encode(single_triangle(), &settings),
        ];

        let mut page_data = Vec::new();
        let mut vertex_offset = 10;
        write_page_data(&clusters, &settings, &mut page_data, &mut vertex_offset).unwrap();
        assert_eq!(vertex_offset, 16);

        let first: ClusterDiskHeader = bytemuck::pod_read_unaligned(&page_data[24..60]);
        let second: ClusterDiskHeader = bytemuck::pod_read_unaligned(&page_data[60..96]);

        assert_eq!(second.low_bytes_offset, first.low_bytes_offset + 15);
        assert_eq!(second.mid_bytes_offset, first.mid_bytes_offset);
        assert_eq!(second.high_bytes_offset, first.high_bytes_offset);
        assert_eq!(first.mid_bytes_offset, first.low_bytes_offset + 30);
    }

    #[test]
    fn position_wrap_alternating_extremes() {
        // Quantized X alternates 0 and 255: every delta wraps to +-1
        let settings = EncodingSettings {
            position_precision: 0,
        };
        let mut cluster = crate::cluster::Cluster::with_uv_channels(0);
        for i in 0..6 {
            let x = if i % 2 == 0 { 0.0 } else { 255.0 };
            cluster.positions.push(Vec3::new(x, 0.0, 0.0));
            cluster.normals.push(Octahedron { x: 0, y: 0 });
        }
        let clusters = vec![encode(cluster, &settings)];
        assert_eq!(clusters[0].info.position_bits.x, 8);

        let mut page_data = Vec::new();
        let mut vertex_offset = 0;
        write_page_data(&clusters, &settings, &mut page_data, &mut vertex_offset).unwrap();

        let cluster_header: ClusterDiskHeader = bytemuck::pod_read_unaligned(&page_data[24..60]);
        let low = cluster_header.low_bytes_offset as usize;

        // First vertex: 0 - 128 = -128, stays -128 in 8 bits, zigzag 255
        assert_eq!(page_data[low], 255);
        // Second: 255 - 0 = 255 wraps to -1, zigzag 1
        assert_eq!(page_data[low + 3], 1);
        // Third: 0 - 255 = -255 wraps to +1, zigzag 2
        assert_eq!(page_data[low + 6], 2);
    }
}
