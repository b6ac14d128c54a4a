/// Axis-aligned bounding box over `glam::Vec3`.
///
/// All containment tests are inclusive on both corners.

use glam::Vec3;

/// Axis-Aligned Bounding Box
///
/// Invariant expected by every structure: `min <= max` componentwise.
/// Use [`AABB::is_valid`] to check caller-supplied boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl AABB {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Bounding box of a sphere
    pub fn from_sphere(center: Vec3, radius: f32) -> Self {
        Self::from_center_half_extents(center, Vec3::splat(radius))
    }

    /// Tightest box around a point set, or `None` for an empty set.
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(mn, mx), p| (mn.min(p), mx.max(p)));
        Some(Self { min, max })
    }

    /// `min <= max` on every axis and all components finite
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn half_extents(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// Index of the longest axis (0 = x, 1 = y, 2 = z). Ties prefer the lower axis.
    pub fn longest_axis(&self) -> usize {
        let size = self.size();
        if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        }
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Test if this AABB fully contains another AABB.
    pub fn contains(&self, other: &AABB) -> bool {
        self.min.x <= other.min.x && self.max.x >= other.max.x
        && self.min.y <= other.min.y && self.max.y >= other.max.y
        && self.min.z <= other.min.z && self.max.z >= other.max.z
    }

    /// Test if the sphere lies entirely inside this box.
    pub fn contains_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.contains(&AABB::from_sphere(center, radius))
    }

    /// Test if this AABB intersects (overlaps or touches) another AABB.
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
        && self.min.y <= other.max.y && self.max.y >= other.min.y
        && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Squared distance from `p` to the closest point of the box (0 inside).
    pub fn distance_squared_to_point(&self, p: Vec3) -> f32 {
        let clamped = p.clamp(self.min, self.max);
        (p - clamped).length_squared()
    }

    /// Sphere/box overlap, compared in squared space.
    ///
    /// An infinite radius overlaps everything.
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        if radius < 0.0 {
            return false;
        }
        self.distance_squared_to_point(center) <= radius * radius
    }

    /// Same center, extents scaled by `factor`.
    pub fn expanded(&self, factor: f32) -> AABB {
        AABB::from_center_half_extents(self.center(), self.half_extents() * factor)
    }

    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Compute the AABB of a specific octant (0-7).
    ///
    /// Octant bit layout: bit0 = X, bit1 = Y, bit2 = Z (0 = low half, 1 = high half).
    pub fn octant(&self, octant: u8) -> AABB {
        let center = self.center();
        AABB {
            min: Vec3::new(
                if octant & 1 == 0 { self.min.x } else { center.x },
                if octant & 2 == 0 { self.min.y } else { center.y },
                if octant & 4 == 0 { self.min.z } else { center.z },
            ),
            max: Vec3::new(
                if octant & 1 == 0 { center.x } else { self.max.x },
                if octant & 2 == 0 { center.y } else { self.max.y },
                if octant & 4 == 0 { center.z } else { self.max.z },
            ),
        }
    }

    /// Determine which octant a point falls into relative to this box's center.
    ///
    /// Points exactly on a splitting plane go to the high side.
    pub fn point_octant(&self, point: Vec3) -> u8 {
        let center = self.center();
        ((point.x >= center.x) as u8)
            | (((point.y >= center.y) as u8) << 1)
            | (((point.z >= center.z) as u8) << 2)
    }

    /// Slab-method ray/box test.
    ///
    /// `inv_dir` is the componentwise reciprocal of the ray direction.
    /// Returns the entry distance (clamped to 0 when the origin is inside),
    /// or `None` when the ray misses or the box lies behind the origin.
    pub fn ray_entry(&self, origin: Vec3, inv_dir: Vec3) -> Option<f32> {
        let t1 = (self.min - origin) * inv_dir;
        let t2 = (self.max - origin) * inv_dir;

        // f32::min/max drop NaN (0 * inf on an axis-parallel ray grazing a face)
        let t_min = t1.min(t2).max_element();
        let t_max = t1.max(t2).min_element();

        if t_max >= t_min && t_max >= 0.0 {
            Some(t_min.max(0.0))
        } else {
            None
        }
    }
}

#[cfg(test)]
#[path = "aabb_tests.rs"]
mod tests;
