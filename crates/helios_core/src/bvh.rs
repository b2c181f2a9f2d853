//! Bounding Volume Hierarchy construction for triangle meshes.
//!
//! Builds a binary tree over a mesh's face array by median split: each
//! interior node sorts its face sub-slice along the longest axis of the
//! centroid bounds and splits at the midpoint, so every leaf ends up
//! owning a contiguous face-index range. Traversal lives in the renderer;
//! this module only produces the tree.

use std::cmp::Ordering;
use std::ops::Range;

use helios_math::Aabb;

use crate::mesh::Face;

/// Maximum faces per leaf node before splitting.
const LEAF_MAX_FACES: usize = 4;

/// BVH node - either an interior node with two children or a leaf with a
/// face-index range into the owning mesh's face array.
#[derive(Debug, Clone)]
pub enum BvhNode {
    /// Internal node with two children.
    Interior {
        bbox: Aabb,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
    /// Leaf node owning faces `[start, end)` of the mesh.
    Leaf { bbox: Aabb, faces: Range<usize> },
}

impl BvhNode {
    /// Bounding box of this subtree.
    pub fn bbox(&self) -> &Aabb {
        match self {
            BvhNode::Interior { bbox, .. } => bbox,
            BvhNode::Leaf { bbox, .. } => bbox,
        }
    }
}

/// Build a BVH over `faces`, reordering the slice in place so that leaf
/// ranges index contiguous runs. Returns `None` for an empty slice.
pub fn build(faces: &mut [Face]) -> Option<BvhNode> {
    if faces.is_empty() {
        return None;
    }
    Some(build_node(faces, 0))
}

fn build_node(faces: &mut [Face], offset: usize) -> BvhNode {
    let bbox = faces
        .iter()
        .fold(Aabb::EMPTY, |acc, f| Aabb::surrounding(&acc, &f.bbox()));

    if faces.len() <= LEAF_MAX_FACES {
        return BvhNode::Leaf {
            bbox,
            faces: offset..offset + faces.len(),
        };
    }

    // Split along the axis where the centroids spread the most
    let centroid_bounds = faces.iter().fold(Aabb::EMPTY, |mut acc, f| {
        acc.grow(f.centroid());
        acc
    });
    let axis = centroid_bounds.longest_axis();

    faces.sort_unstable_by(|a, b| {
        a.centroid()[axis]
            .partial_cmp(&b.centroid()[axis])
            .unwrap_or(Ordering::Equal)
    });

    let mid = faces.len() / 2;
    let (left_faces, right_faces) = faces.split_at_mut(mid);

    BvhNode::Interior {
        bbox,
        left: Box::new(build_node(left_faces, offset)),
        right: Box::new(build_node(right_faces, offset + mid)),
    }
}
