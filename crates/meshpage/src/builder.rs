//! Top-level driver: clusters to pages to the final resource blob.

use crate::cluster::{build_clusters, EncodedCluster};
use crate::encoding::{EncodingInfo, EncodingSettings};
use crate::error::BuildError;
use crate::hierarchy::{
    build_hierarchy, page_range_key, group_part_size_value, PackedHierarchyNode,
    CHILD_REFERENCE_NONE, PAGE_RANGE_KEY_EMPTY,
};
use crate::mesh::{Aabb, MeshData};
use crate::page::write_page_data;
use crate::{FIXUP_MAGIC, MAX_CLUSTER_HIERARCHY_DEPTH, ROOT_PAGE_GPU_SIZE, ROOT_PAGE_MAX_CLUSTERS};
use bytemuck::{bytes_of, Pod, Zeroable};

/// Streaming bookkeeping for one page, consumed by the runtime.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct PageStreamingState {
    pub bulk_offset: u32,
    pub bulk_size: u32,
    pub page_size: u32,
    pub dependencies_start: u32,
    pub dependencies_num: u32,
    pub max_hierarchy_depth: u32,
}

/// Header of the fix-up chunk prepended to each page image.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct FixupChunkHeader {
    pub magic: u16,
    pub num_group_fixups: u16,
    pub num_part_fixups: u16,
    pub num_clusters: u16,
    pub num_reconsider_pages: u16,
    pub num_parent_fixups: u16,
    pub num_hierarchy_locations: u32,
    pub num_cluster_indices: u32,
}

/// Group-level fix-up: which pages this page's cluster group depends on.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct GroupFixup {
    pub page_dependencies: u32,
    pub flags: u32,
    pub first_part_fixup: u16,
    pub num_part_fixups: u16,
    pub first_parent_fixup: u16,
    pub num_parent_fixups: u16,
}

/// Part-level fix-up: one streamed cluster and its hierarchy locations.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct PartFixup {
    pub page_index: u16,
    pub start_cluster_index: u8,
    pub leaf_counter: u8,
    pub first_hierarchy_location: u32,
    pub num_hierarchy_locations: u16,
    pub pad: u16,
}

/// Pack a hierarchy location: `(node_index << 2) | node_slot`.
fn hierarchy_location(node_index: usize, node_slot: usize) -> u32 {
    ((node_index as u32) << 2) | node_slot as u32
}

/// Everything the streaming runtime needs, plus build statistics.
pub struct Resources {
    /// All page images, each prefixed by its fix-up chunk.
    pub root_data: Vec<u8>,
    pub hierarchy_nodes: Vec<PackedHierarchyNode>,
    pub page_streaming_states: Vec<PageStreamingState>,
    pub hierarchy_root_offsets: Vec<u32>,
    pub num_input_vertices: u32,
    pub num_clusters: u32,
    pub num_root_pages: u32,
    /// Always -1: per-cluster precision is read from the packed clusters.
    pub position_precision: i32,
    /// Always -1: precision is read from the packed clusters.
    pub normal_precision: i32,
    pub mesh_bounds: Aabb,
}

/// A finished build.
pub struct BuildOutput {
    pub resources: Resources,
    /// Global vertex offset at the start of each page, for downstream
    /// vertex-buffer fills.
    pub vertex_offsets: Vec<i32>,
}

/// Compresses one mesh into pages, hierarchy, and streaming states.
pub struct Builder<'a> {
    pub mesh: MeshData<'a>,
    /// Fractional bits of the quantization grid; step is `2^(-precision)`.
    pub position_precision: i32,
}

impl<'a> Builder<'a> {
    pub fn new(mesh: MeshData<'a>) -> Self {
        Self {
            mesh,
            position_precision: EncodingSettings::default().position_precision,
        }
    }

    /// Run the whole pipeline. Either returns a fully valid blob or a
    /// single aggregate failure; never partial output.
    pub fn build(&self) -> Result<BuildOutput, BuildError> {
        self.mesh.validate()?;

        let mesh_bounds = Aabb::from_points(self.mesh.positions);
        let settings = EncodingSettings {
            position_precision: self.position_precision,
        };

        let clusters = build_clusters(&self.mesh);
        let num_clusters = clusters.len();

        let encoded: Vec<EncodedCluster> = clusters
            .into_iter()
            .map(|cluster| {
                let info = EncodingInfo::for_cluster(&cluster, &settings);
                EncodedCluster { cluster, info }
            })
            .collect();

        let pages = create_pages(encoded);

        let (mut hierarchy_nodes, leaf_slots) = build_hierarchy(num_clusters, &mesh_bounds);
        if num_clusters > leaf_slots.len() {
            return Err(BuildError::internal("hierarchy has too few leaf slots"));
        }

        let mut root_data: Vec<u8> = Vec::new();
        let mut page_streaming_states = Vec::with_capacity(pages.len());
        let mut vertex_offsets = Vec::with_capacity(pages.len());

        let mut vertex_offset = 0i32;
        let mut cluster_index_offset = 0usize;
        for (page_index, page_clusters) in pages.iter().enumerate() {
            // Attach this page's clusters to their hierarchy leaf slots
            for (cluster_index, encoded) in page_clusters.iter().enumerate() {
                let slot = leaf_slots[cluster_index_offset + cluster_index];
                let node = &mut hierarchy_nodes[slot.node_index];

                let bounds = encoded.cluster.bounds();
                let center = bounds.center();
                node.lod_bounds[slot.node_slot] =
                    [center.x, center.y, center.z, bounds.sphere_radius()];

                if node.misc1[slot.node_slot].child_start_reference != CHILD_REFERENCE_NONE
                    || node.misc2[slot.node_slot].resource_page_range_key != PAGE_RANGE_KEY_EMPTY
                {
                    return Err(BuildError::internal("leaf slot already occupied"));
                }
                node.misc1[slot.node_slot].child_start_reference =
                    ((page_index as u32) << 8) | cluster_index as u32;
                node.misc2[slot.node_slot].resource_page_range_key =
                    page_range_key(page_index as u32, 1);
                node.misc2[slot.node_slot].group_part_size_assembly_part_index =
                    group_part_size_value(1);
            }

            let bulk_offset = root_data.len() as u32;

            write_fixup_chunk(
                &mut root_data,
                page_index,
                page_clusters.len(),
                &leaf_slots[cluster_index_offset..cluster_index_offset + page_clusters.len()],
            );

            let page_start = root_data.len();
            vertex_offsets.push(vertex_offset);

            write_page_data(page_clusters, &settings, &mut root_data, &mut vertex_offset)?;

            page_streaming_states.push(PageStreamingState {
                bulk_offset,
                bulk_size: root_data.len() as u32 - bulk_offset,
                page_size: (root_data.len() - page_start) as u32,
                dependencies_start: 0,
                dependencies_num: 0,
                max_hierarchy_depth: MAX_CLUSTER_HIERARCHY_DEPTH,
            });

            cluster_index_offset += page_clusters.len();
        }

        Ok(BuildOutput {
            resources: Resources {
                root_data,
                hierarchy_nodes,
                page_streaming_states,
                hierarchy_root_offsets: vec![0],
                num_input_vertices: self.mesh.positions.len() as u32,
                num_clusters: num_clusters as u32,
                num_root_pages: pages.len() as u32,
                position_precision: -1,
                normal_precision: -1,
                mesh_bounds,
            },
            vertex_offsets,
        })
    }
}

/// Greedy in-order page packing.
///
/// A page closes when the next cluster would push the summed GPU size
/// past the budget or the cluster-count limit is reached. The first
/// cluster of a page is always admitted, so pages are never empty.
fn create_pages(clusters: Vec<EncodedCluster>) -> Vec<Vec<EncodedCluster>> {
    let mut pages: Vec<Vec<EncodedCluster>> = Vec::new();
    let mut gpu_size = 0u32;

    for encoded in clusters {
        let cluster_gpu_size = encoded.info.gpu_sizes.total();

        let close_page = match pages.last() {
            None => true,
            Some(page) => {
                !page.is_empty()
                    && (gpu_size + cluster_gpu_size > ROOT_PAGE_GPU_SIZE
                        || page.len() >= ROOT_PAGE_MAX_CLUSTERS)
            }
        };
        if close_page {
            pages.push(Vec::new());
            gpu_size = 0;
        }

        gpu_size += cluster_gpu_size;
        pages.last_mut().unwrap().push(encoded);
    }

    pages
}

/// Emit the fix-up chunk that patches hierarchy references when the page
/// becomes resident: one group fix-up for the page, one part fix-up and
/// one hierarchy location per cluster.
fn write_fixup_chunk(
    root_data: &mut Vec<u8>,
    page_index: usize,
    num_clusters: usize,
    leaf_slots: &[crate::hierarchy::LeafSlot],
) {
    let header = FixupChunkHeader {
        magic: FIXUP_MAGIC,
        num_group_fixups: 1,
        num_part_fixups: num_clusters as u16,
        num_clusters: num_clusters as u16,
        num_reconsider_pages: 0,
        num_parent_fixups: 0,
        num_hierarchy_locations: num_clusters as u32,
        num_cluster_indices: 0,
    };
    root_data.extend_from_slice(bytes_of(&header));

    let group_fixup = GroupFixup {
        page_dependencies: page_range_key(page_index as u32, 1),
        flags: 0,
        first_part_fixup: 0,
        num_part_fixups: num_clusters as u16,
        first_parent_fixup: 0,
        num_parent_fixups: 0,
    };
    root_data.extend_from_slice(bytes_of(&group_fixup));

    for cluster_index in 0..num_clusters {
        let part_fixup = PartFixup {
            page_index: page_index as u16,
            start_cluster_index: cluster_index as u8,
            leaf_counter: 0,
            first_hierarchy_location: cluster_index as u32,
            num_hierarchy_locations: 1,
            pad: 0,
        };
        root_data.extend_from_slice(bytes_of(&part_fixup));
    }

    for slot in leaf_slots {
        let location = hierarchy_location(slot.node_index, slot.node_slot);
        root_data.extend_from_slice(&location.to_le_bytes());
    }
}

/// Size in bytes of a page's fix-up chunk.
pub fn fixup_chunk_size(num_clusters: usize) -> usize {
    std::mem::size_of::<FixupChunkHeader>()
        + std::mem::size_of::<GroupFixup>()
        + num_clusters
            * (std::mem::size_of::<PartFixup>() + std::mem::size_of::<u32>())
}
