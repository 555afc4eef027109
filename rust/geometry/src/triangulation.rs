// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon face triangulation
//!
//! Faces with more than 3 vertices are projected onto a best-fit plane and
//! split by ear clipping. Triangles are expressed in terms of the face's own
//! triplets, so no new vertices are ever created.
//!
//! Every emitted ear is written as `(i1, i3, i2)` where `i1 < i2 < i3` are the
//! vertices' positions in the original face. The renderer culls with a
//! clockwise-front convention and depends on this order.

use crate::error::DegenerateReason;
use crate::triplet::{AttributeTriplet, Triangle, VertexAttributes};
use crate::{Point2, Point3, Vector3};

type TriangulationResult<T> = std::result::Result<T, DegenerateReason>;

/// Shortest normal accepted before falling back to another estimate
const MIN_NORMAL_LENGTH: f64 = 1e-15;

/// Triangulate one face.
///
/// Triangles pass through untouched. Larger faces are ear clipped and each
/// ear is emitted in corrected winding order.
pub fn triangulate_face(
    face: &[AttributeTriplet],
    attributes: &VertexAttributes,
    epsilon: f64,
) -> TriangulationResult<Vec<Triangle<AttributeTriplet>>> {
    let n = face.len();

    if n < 3 {
        return Err(DegenerateReason::TooFewVertices { count: n });
    }

    if let Some(index) = face.iter().find_map(|t| attributes.out_of_range(t)) {
        return Err(DegenerateReason::AttributeOutOfRange { index });
    }

    // FAST PATH: already a triangle
    if n == 3 {
        return Ok(vec![[face[0], face[1], face[2]]]);
    }

    let points = face
        .iter()
        .map(|triplet| {
            attributes
                .position(triplet)
                .ok_or(DegenerateReason::AttributeOutOfRange {
                    index: triplet.position,
                })
        })
        .collect::<TriangulationResult<Vec<_>>>()?;

    let normal = find_plane_normal(face, &points, attributes)?;
    let projected = project_to_2d(&points, &normal);
    let ears = ear_clip(&projected, epsilon)?;

    Ok(ears
        .into_iter()
        .map(|[a, b, c]| [face[a], face[b], face[c]])
        .collect())
}

/// Normal of the plane the face is projected onto.
///
/// When every triplet carries a normal, this is the renormalized mean of the
/// referenced vertex normals. Otherwise the whole face uses
/// [`fallback_plane_normal`].
pub fn find_plane_normal(
    face: &[AttributeTriplet],
    points: &[Point3<f64>],
    attributes: &VertexAttributes,
) -> TriangulationResult<Vector3<f64>> {
    let normal_indices: Option<Vec<u32>> = face.iter().map(|t| t.normal).collect();

    if let Some(indices) = normal_indices {
        let mut sum = Vector3::<f64>::zeros();
        for index in indices {
            let normal = attributes
                .normals
                .get(index as usize)
                .ok_or(DegenerateReason::AttributeOutOfRange { index })?;
            sum += normal;
        }
        // Opposing vertex normals can cancel out
        if let Some(normal) = sum.try_normalize(MIN_NORMAL_LENGTH) {
            return Ok(normal);
        }
    }

    fallback_plane_normal(points).ok_or(DegenerateReason::ZeroArea)
}

/// Normal of the triangle formed by the first, second and last vertex:
/// `(v1 - v0) x (v[n-1] - v0)`.
///
/// If those three vertices are collinear, Newell's method over the whole
/// ring is used instead. Returns `None` when the polygon has no area at all.
pub fn fallback_plane_normal(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    let n = points.len();
    if n < 3 {
        return None;
    }

    let v0 = points[0];
    let normal = (points[1] - v0).cross(&(points[n - 1] - v0));

    normal
        .try_normalize(MIN_NORMAL_LENGTH)
        .or_else(|| newell_normal(points))
}

/// Newell's method for the normal of an arbitrary (possibly concave) polygon
fn newell_normal(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    let n = points.len();
    let mut normal = Vector3::<f64>::zeros();

    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];

        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }

    normal.try_normalize(MIN_NORMAL_LENGTH)
}

/// Project 3D points onto the plane through the first point with the given
/// normal.
///
/// The in-plane basis `(u, v)` satisfies `u x v = normal`, so a ring that
/// winds counter-clockwise around `normal` stays counter-clockwise in 2D.
pub fn project_to_2d(points_3d: &[Point3<f64>], normal: &Vector3<f64>) -> Vec<Point2<f64>> {
    let Some(&origin) = points_3d.first() else {
        return Vec::new();
    };

    // Find the axis least parallel to the normal for stable cross product
    let abs_x = normal.x.abs();
    let abs_y = normal.y.abs();
    let abs_z = normal.z.abs();

    let reference = if abs_x <= abs_y && abs_x <= abs_z {
        Vector3::new(1.0, 0.0, 0.0)
    } else if abs_y <= abs_z {
        Vector3::new(0.0, 1.0, 0.0)
    } else {
        Vector3::new(0.0, 0.0, 1.0)
    };

    let u_axis = normal.cross(&reference).normalize();
    let v_axis = normal.cross(&u_axis).normalize();

    points_3d
        .iter()
        .map(|p| {
            let v = p - origin;
            Point2::new(v.dot(&u_axis), v.dot(&v_axis))
        })
        .collect()
}

/// Ear clipping over a simple 2D polygon.
///
/// Returns triangles as indices into `points`, already in corrected winding.
/// The ring may wind either way; its orientation is taken from its signed
/// area. `epsilon` is relative to the squared extent of the polygon and is
/// clamped to zero.
pub fn ear_clip(
    points: &[Point2<f64>],
    epsilon: f64,
) -> TriangulationResult<Vec<Triangle<usize>>> {
    let n = points.len();

    if n < 3 {
        return Err(DegenerateReason::TooFewVertices { count: n });
    }

    // Negative or NaN epsilon would admit collinear tips
    let tolerance = epsilon.max(0.0) * squared_extent(points);
    let area = twice_signed_area(points);
    if area.abs() <= tolerance {
        return Err(DegenerateReason::ZeroArea);
    }
    let orientation = area.signum();

    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);
    let mut cursor = 0;

    while remaining.len() > 3 {
        let m = remaining.len();

        let ear = (0..m)
            .map(|step| (cursor + step) % m)
            .find(|&i| is_ear(points, &remaining, i, orientation, tolerance));

        let Some(i) = ear else {
            return Err(DegenerateReason::EarClippingStalled { remaining: m });
        };

        let prev = remaining[(i + m - 1) % m];
        let next = remaining[(i + 1) % m];
        triangles.push(corrected_winding(prev, remaining[i], next));
        remaining.remove(i);

        // The predecessor's neighbourhood changed, look there first
        cursor = if i == 0 { remaining.len() - 1 } else { i - 1 };
    }

    triangles.push(corrected_winding(remaining[0], remaining[1], remaining[2]));

    Ok(triangles)
}

/// Sorts the ear's original positions `i1 < i2 < i3` and emits `(i1, i3, i2)`.
#[inline]
fn corrected_winding(a: usize, b: usize, c: usize) -> Triangle<usize> {
    let mut sorted = [a, b, c];
    sorted.sort_unstable();
    [sorted[0], sorted[2], sorted[1]]
}

/// Is `remaining[i]` a convex vertex whose triangle holds no other vertex?
fn is_ear(
    points: &[Point2<f64>],
    remaining: &[usize],
    i: usize,
    orientation: f64,
    tolerance: f64,
) -> bool {
    let m = remaining.len();
    let prev = (i + m - 1) % m;
    let next = (i + 1) % m;

    let a = points[remaining[prev]];
    let b = points[remaining[i]];
    let c = points[remaining[next]];

    // Reflex or collinear tips are never ears
    if orient2d(&a, &b, &c) * orientation <= tolerance {
        return false;
    }

    remaining
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != prev && j != i && j != next)
        .all(|(_, &v)| !point_in_triangle(&points[v], &a, &b, &c, tolerance))
}

/// Twice the signed area of triangle `abc`; positive when counter-clockwise.
#[inline]
fn orient2d(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Boundary-inclusive containment test, independent of triangle winding.
#[inline]
fn point_in_triangle(
    p: &Point2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
    tolerance: f64,
) -> bool {
    let d1 = orient2d(a, b, p);
    let d2 = orient2d(b, c, p);
    let d3 = orient2d(c, a, p);

    let has_neg = d1 < -tolerance || d2 < -tolerance || d3 < -tolerance;
    let has_pos = d1 > tolerance || d2 > tolerance || d3 > tolerance;

    !(has_neg && has_pos)
}

/// Shoelace formula, doubled
fn twice_signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let p = &points[i];
            let q = &points[(i + 1) % n];
            p.x * q.y - q.x * p.y
        })
        .sum()
}

fn squared_extent(points: &[Point2<f64>]) -> f64 {
    let mut min = Point2::new(f64::MAX, f64::MAX);
    let mut max = Point2::new(f64::MIN, f64::MIN);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    let extent = (max.x - min.x).max(max.y - min.y);
    extent * extent
}
