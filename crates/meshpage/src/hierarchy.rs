//! 4-ary hierarchy of proxy bounding nodes.
//!
//! The tree is complete: every level is fully allocated and every slot
//! initialized with the whole-mesh bounds and sentinel references. The
//! driver then points each cluster's leaf slot at its page address.

use crate::mesh::Aabb;
use bytemuck::{Pod, Zeroable};
use half::f16;

/// Sentinel for an unused child slot.
pub const CHILD_REFERENCE_NONE: u32 = 0xFFFF_FFFF;
/// Sentinel for an empty page range.
pub const PAGE_RANGE_KEY_EMPTY: u32 = 0xFFFF_FFFF;

/// Assembly-part index meaning "no assembly transform".
const ASSEMBLY_PART_NONE: u32 = 0xFF_FFFF;
/// Bit position of the group part size above the assembly-part index.
const ASSEMBLY_PART_INDEX_BITS: u32 = 24;

/// Per-child payload: box center plus packed LOD error bounds.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct HierarchyNodeMisc0 {
    pub box_bounds_center: [f32; 3],
    /// f16 min LOD error in the low half, f16 max parent LOD error high.
    pub min_lod_error_max_parent_lod_error: u32,
}

/// Per-child payload: box extent plus child reference.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct HierarchyNodeMisc1 {
    pub box_bounds_extent: [f32; 3],
    /// Index of a child node, or for a leaf slot
    /// `(page_index << 8) | cluster_index_in_page`.
    pub child_start_reference: u32,
}

/// Per-child payload: streaming page range.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct HierarchyNodeMisc2 {
    pub resource_page_range_key: u32,
    pub group_part_size_assembly_part_index: u32,
}

/// One four-child proxy node, laid out for lane-parallel decoding.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct PackedHierarchyNode {
    /// Per-child bounding sphere (center, radius).
    pub lod_bounds: [[f32; 4]; 4],
    pub misc0: [HierarchyNodeMisc0; 4],
    pub misc1: [HierarchyNodeMisc1; 4],
    pub misc2: [HierarchyNodeMisc2; 4],
}

/// Pack a page range into its key: `(page_start << 10) | num_pages`.
pub fn page_range_key(page_start: u32, num_pages: u32) -> u32 {
    debug_assert!(num_pages < (1 << 10));
    (page_start << 10) | num_pages
}

/// Pack the group part size next to the (unused) assembly-part index.
pub fn group_part_size_value(group_part_size: u32) -> u32 {
    ASSEMBLY_PART_NONE | (group_part_size << ASSEMBLY_PART_INDEX_BITS)
}

/// The leaf slot a cluster is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LeafSlot {
    pub node_index: usize,
    pub node_slot: usize,
}

/// Wide LOD-error sentinels: min error saturates high, max parent error
/// is negative, so the decoder never culls these slots by LOD.
fn lod_error_sentinel() -> u32 {
    (f16::from_f32(1.0e10).to_bits() as u32) | ((f16::from_f32(-1.0).to_bits() as u32) << 16)
}

fn make_node(bounds: &Aabb) -> PackedHierarchyNode {
    let center = bounds.center();
    let extent = bounds.extent();

    let mut node = PackedHierarchyNode::zeroed();
    for slot in 0..4 {
        node.lod_bounds[slot] = [center.x, center.y, center.z, bounds.sphere_radius()];
        node.misc0[slot] = HierarchyNodeMisc0 {
            box_bounds_center: center.to_array(),
            min_lod_error_max_parent_lod_error: lod_error_sentinel(),
        };
        node.misc1[slot] = HierarchyNodeMisc1 {
            box_bounds_extent: extent.to_array(),
            child_start_reference: CHILD_REFERENCE_NONE,
        };
        node.misc2[slot] = HierarchyNodeMisc2 {
            resource_page_range_key: PAGE_RANGE_KEY_EMPTY,
            group_part_size_assembly_part_index: 0,
        };
    }
    node
}

/// `floor(log4(value))`, exact. `value` must be positive.
fn floor_log4(value: u32) -> u32 {
    debug_assert!(value > 0);
    (31 - value.leading_zeros()) / 2
}

/// Build the complete tree and the cluster-to-leaf-slot assignment.
///
/// Depth is `floor(log4(max(num_clusters - 1, 1)))`, which always leaves
/// enough leaf slots: the bottom level holds `4^(depth + 1)` of them.
/// All nodes start with the whole-mesh bounds; only leaf slots are later
/// overwritten with actual cluster bounds.
pub(crate) fn build_hierarchy(
    num_clusters: usize,
    mesh_bounds: &Aabb,
) -> (Vec<PackedHierarchyNode>, Vec<LeafSlot>) {
    let tree_depth = floor_log4((num_clusters as u32).saturating_sub(1).max(1));

    let mut nodes = vec![make_node(mesh_bounds)];
    let mut level = vec![0usize];

    for _ in 0..tree_depth {
        let mut next_level = Vec::with_capacity(level.len() * 4);
        for &parent_index in &level {
            for slot in 0..4 {
                let child_index = nodes.len();
                nodes.push(make_node(mesh_bounds));

                let parent = &mut nodes[parent_index];
                debug_assert!(parent.misc1[slot].child_start_reference == CHILD_REFERENCE_NONE);
                parent.misc1[slot].child_start_reference = child_index as u32;
                parent.misc2[slot].resource_page_range_key = PAGE_RANGE_KEY_EMPTY;
                parent.misc2[slot].group_part_size_assembly_part_index = group_part_size_value(0);

                next_level.push(child_index);
            }
        }
        level = next_level;
    }

    let mut slots = Vec::with_capacity(level.len() * 4);
    for &node_index in &level {
        for node_slot in 0..4 {
            slots.push(LeafSlot {
                node_index,
                node_slot,
            });
        }
    }
    debug_assert!(num_clusters <= slots.len());

    (nodes, slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn bounds() -> Aabb {
        Aabb {
            min: Vec3::ZERO,
            max: Vec3::ONE,
        }
    }

    #[test]
    fn node_size_is_fixed() {
        assert_eq!(std::mem::size_of::<PackedHierarchyNode>(), 224);
    }

    #[test]
    fn single_cluster_tree_is_one_node() {
        let (nodes, slots) = build_hierarchy(1, &bounds());
        assert_eq!(nodes.len(), 1);
        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0].node_index, 0);
    }

    #[test]
    fn four_clusters_still_fit_the_root() {
        // floor(log4(3)) = 0: the root's four slots suffice
        let (nodes, slots) = build_hierarchy(4, &bounds());
        assert_eq!(nodes.len(), 1);
        assert_eq!(slots.len(), 4);
    }

    #[test]
    fn five_clusters_grow_one_level() {
        let (nodes, slots) = build_hierarchy(5, &bounds());
        assert_eq!(nodes.len(), 1 + 4);
        assert_eq!(slots.len(), 16);

        // Root children reference nodes 1..=4
        for slot in 0..4 {
            assert_eq!(nodes[0].misc1[slot].child_start_reference, slot as u32 + 1);
            assert_eq!(nodes[0].misc2[slot].resource_page_range_key, PAGE_RANGE_KEY_EMPTY);
        }
    }

    #[test]
    fn seventeen_clusters_need_depth_two() {
        // floor(log4(16)) = 2: levels of 1, 4, and 16 nodes; 64 leaf slots
        let (nodes, slots) = build_hierarchy(17, &bounds());
        assert_eq!(nodes.len(), 1 + 4 + 16);
        assert_eq!(slots.len(), 64);
    }

    #[test]
    fn sixteen_clusters_stay_at_depth_one() {
        let (nodes, slots) = build_hierarchy(16, &bounds());
        assert_eq!(nodes.len(), 1 + 4);
        assert_eq!(slots.len(), 16);
    }

    #[test]
    fn leaf_slots_start_as_sentinels() {
        let (nodes, slots) = build_hierarchy(17, &bounds());
        for slot in &slots {
            let node = &nodes[slot.node_index];
            assert_eq!(
                node.misc1[slot.node_slot].child_start_reference,
                CHILD_REFERENCE_NONE
            );
            assert_eq!(
                node.misc2[slot.node_slot].group_part_size_assembly_part_index,
                0
            );
        }
    }

    #[test]
    fn page_range_key_packing() {
        assert_eq!(page_range_key(0, 1), 1);
        assert_eq!(page_range_key(3, 1), (3 << 10) | 1);
    }
}
