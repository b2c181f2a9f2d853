use crate::{Ray, Vec3};

/// Axis-Aligned Bounding Box for the mesh BVH.
///
/// Defined by its min and max corners. An `EMPTY` box has inverted corners
/// and grows to fit whatever is merged into it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// An empty AABB (contains nothing).
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// Create an AABB from two corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// Extend the box to contain a point.
    pub fn grow(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let size = self.max - self.min;
        if size.x > size.y && size.x > size.z {
            0
        } else if size.y > size.z {
            1
        } else {
            2
        }
    }

    /// Test whether a ray intersects this AABB, using the slab method.
    ///
    /// The box is hit iff the largest per-axis entry parameter does not
    /// exceed the smallest per-axis exit parameter and the exit is not
    /// behind the ray origin. A zero direction component divides to +-inf,
    /// which the comparisons classify correctly.
    pub fn hit(&self, ray: &Ray) -> bool {
        let t0 = (self.min - ray.origin) / ray.direction;
        let t1 = (self.max - ray.origin) / ray.direction;
        let tmin = t0.min(t1).max_element();
        let tmax = t0.max(t1).min_element();
        tmin <= tmax && tmax >= 0.0
    }
}
