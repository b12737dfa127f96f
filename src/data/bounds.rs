use glam::{DMat4, DVec3, Mat4, Vec3};

use crate::hash::{ContentHash, KeyHasher};

/// Single precision axis-aligned box, the bound type the hierarchy produces.
///
/// An empty box has `min = +inf` and `max = -inf`, so extending it by any
/// point yields a degenerate box around that point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BoundingBox {
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    #[must_use]
    pub fn extend_by(&self, point: Vec3) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    #[must_use]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[must_use]
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.is_empty() || (self.min.cmple(other.min).all() && self.max.cmpge(other.max).all())
    }

    /// Bound of all eight transformed corners.
    #[must_use]
    pub fn transform(&self, matrix: &Mat4) -> Self {
        if self.is_empty() {
            return *self;
        }

        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];

        corners
            .into_iter()
            .fold(Self::EMPTY, |acc, p| acc.extend_by(matrix.project_point3(p)))
    }

    /// Bound of a point cloud.
    pub fn from_points(points: &[Vec3]) -> Self {
        points.iter().fold(Self::EMPTY, |acc, &p| acc.extend_by(p))
    }
}

impl ContentHash for BoundingBox {
    fn content_hash(&self, h: &mut KeyHasher) {
        h.append(&self.min).append(&self.max);
    }
}

/// Double precision box, as agent bounds are recorded in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box3d {
    pub min: DVec3,
    pub max: DVec3,
}

impl Box3d {
    #[must_use]
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Moves the box into the space of `matrix`'s inverse frame.
    ///
    /// Only the `min` and `max` corners are transformed and the result is
    /// the box that encloses both, matching how agent bounds are authored.
    /// Returns `None` when `matrix` is singular.
    #[must_use]
    pub fn to_local(&self, matrix: &DMat4) -> Option<BoundingBox> {
        let det = matrix.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inverse = matrix.inverse();

        let min = inverse.project_point3(self.min).as_vec3();
        let max = inverse.project_point3(self.max).as_vec3();

        Some(BoundingBox::EMPTY.extend_by(min).extend_by(max))
    }
}

impl ContentHash for Box3d {
    fn content_hash(&self, h: &mut KeyHasher) {
        h.append(&self.min).append(&self.max);
    }
}
