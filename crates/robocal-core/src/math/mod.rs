//! Linear algebra type definitions shared across the workspace.

use nalgebra::{Isometry3, Point2, Point3, Vector3};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 2D point with [`Real`] coordinates.
pub type Pt2 = Point2<Real>;
/// 3D point with [`Real`] coordinates.
pub type Pt3 = Point3<Real>;
/// 3D rigid transform (SE(3)) using [`Real`].
pub type Iso3 = Isometry3<Real>;

/// Apply a rigid transform to every point of a set.
pub fn transform_points(iso: &Iso3, points: &[Pt3]) -> Vec<Pt3> {
    points.iter().map(|p| iso.transform_point(p)).collect()
}
