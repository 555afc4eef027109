// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertex buffers and per-load geometry bookkeeping

use nalgebra::{Point2, Point3, Vector3};

use crate::compaction::CompactionMap;
use crate::error::{Error, Result};
use crate::triplet::VertexAttributes;

/// Offset subtracted from every position to keep large world coordinates
/// precise once narrowed to f32
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoordinateShift {
    /// X offset (subtracted from all X coordinates)
    pub x: f64,
    /// Y offset (subtracted from all Y coordinates)
    pub y: f64,
    /// Z offset (subtracted from all Z coordinates)
    pub z: f64,
}

impl CoordinateShift {
    /// Create a new coordinate shift
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Shift for a model whose positions exceed `threshold` on any axis:
    /// the centroid of all positions rounded to whole units. Zero otherwise.
    pub fn for_positions(positions: &[Point3<f64>], threshold: f64) -> Self {
        let exceeds = positions
            .iter()
            .any(|p| p.x.abs() > threshold || p.y.abs() > threshold || p.z.abs() > threshold);
        if !exceeds {
            return Self::default();
        }

        let mut sum = Vector3::<f64>::zeros();
        for p in positions {
            sum += p.coords;
        }
        let centroid = sum / positions.len() as f64;

        Self::new(centroid.x.round(), centroid.y.round(), centroid.z.round())
    }

    /// Check if shift is zero (no shifting needed)
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Subtract the shift in f64
    #[inline]
    pub fn apply(&self, position: Point3<f64>) -> Point3<f64> {
        Point3::new(position.x - self.x, position.y - self.y, position.z - self.z)
    }
}

/// Geometry accumulators scoped to one load
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeometryBookkeeping {
    /// Lowest Y of every vertex seen so far, after shifting.
    /// `f64::MAX` until the first vertex is observed.
    pub min_y: f64,
    pub shift: CoordinateShift,
}

impl GeometryBookkeeping {
    pub fn new(shift: CoordinateShift) -> Self {
        Self {
            min_y: f64::MAX,
            shift,
        }
    }

    /// Fold one referenced vertex into the running minimum.
    #[inline]
    pub fn observe(&mut self, position: Point3<f64>) {
        self.min_y = self.min_y.min(position.y - self.shift.y);
    }

    /// Running minimum, `None` if no vertex was observed.
    #[inline]
    pub fn min_y(&self) -> Option<f64> {
        (self.min_y != f64::MAX).then_some(self.min_y)
    }
}

impl Default for GeometryBookkeeping {
    fn default() -> Self {
        Self::new(CoordinateShift::default())
    }
}

/// Compacted vertex buffers, one entry per compact id in id order
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexBuffers {
    /// Vertex positions (x, y, z), shifted
    pub positions: Vec<f32>,
    /// Texture coordinates (u, v), zero when absent
    pub uvs: Vec<f32>,
    /// Vertex normals (nx, ny, nz), zero when absent
    pub normals: Vec<f32>,
}

impl VertexBuffers {
    /// Create buffers with capacity
    pub fn with_capacity(vertex_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            uvs: Vec::with_capacity(vertex_count * 2),
            normals: Vec::with_capacity(vertex_count * 3),
        }
    }

    /// Gather every compacted triplet's attributes in id order.
    ///
    /// The shift is subtracted in f64 BEFORE the f32 conversion. Absent UV and
    /// normal channels are written as zeros. A triplet indexing past any
    /// attribute array is an [`Error::InvariantViolation`].
    pub fn gather(
        compaction: &CompactionMap,
        attributes: &VertexAttributes,
        shift: &CoordinateShift,
    ) -> Result<Self> {
        let mut buffers = Self::with_capacity(compaction.len());

        for triplet in compaction.triplets() {
            let missing = |index: u32| {
                Error::invariant(format!(
                    "compacted vertex {triplet} indexes missing attribute {index}"
                ))
            };

            let position = attributes
                .position(triplet)
                .map(|p| shift.apply(p))
                .ok_or_else(|| missing(triplet.position))?;
            buffers.positions.push(position.x as f32);
            buffers.positions.push(position.y as f32);
            buffers.positions.push(position.z as f32);

            let uv = match triplet.uv {
                Some(index) => attributes.uv(triplet).ok_or_else(|| missing(index))?,
                None => Point2::origin(),
            };
            buffers.uvs.push(uv.x as f32);
            buffers.uvs.push(uv.y as f32);

            let normal = match triplet.normal {
                Some(index) => attributes.normal(triplet).ok_or_else(|| missing(index))?,
                None => Vector3::zeros(),
            };
            buffers.normals.push(normal.x as f32);
            buffers.normals.push(normal.y as f32);
            buffers.normals.push(normal.z as f32);
        }

        Ok(buffers)
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triplet::AttributeTriplet;
    use approx::assert_relative_eq;

    #[test]
    fn test_small_model_has_no_shift() {
        let positions = vec![Point3::new(1.0, 2.0, 3.0), Point3::new(-5.0, 0.0, 9.0)];
        let shift = CoordinateShift::for_positions(&positions, 1_000_000.0);
        assert!(shift.is_zero());
    }

    #[test]
    fn test_large_model_shifts_by_rounded_centroid() {
        let positions = vec![
            Point3::new(2679012.2, 1247892.4, 432.0),
            Point3::new(2679014.2, 1247894.4, 434.0),
        ];
        let shift = CoordinateShift::for_positions(&positions, 1_000_000.0);
        assert_eq!(shift, CoordinateShift::new(2679013.0, 1247893.0, 433.0));
    }

    #[test]
    fn test_min_y_tracks_shifted_minimum() {
        let mut bookkeeping = GeometryBookkeeping::new(CoordinateShift::new(0.0, 100.0, 0.0));
        assert_eq!(bookkeeping.min_y(), None);

        bookkeeping.observe(Point3::new(0.0, 105.0, 0.0));
        bookkeeping.observe(Point3::new(0.0, 98.5, 0.0));
        bookkeeping.observe(Point3::new(0.0, 120.0, 0.0));

        assert_eq!(bookkeeping.min_y(), Some(-1.5));
    }

    #[test]
    fn test_gather_follows_id_order() {
        let attributes = VertexAttributes::new(
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0)],
            vec![Point2::new(0.25, 0.75)],
            vec![Vector3::new(0.0, 1.0, 0.0)],
        );
        let mut compaction = CompactionMap::new();
        compaction.compact_key(AttributeTriplet::new(1, Some(0), Some(0)));
        compaction.compact_key(AttributeTriplet::position_only(0));

        let buffers =
            VertexBuffers::gather(&compaction, &attributes, &CoordinateShift::default()).unwrap();

        assert_eq!(buffers.vertex_count(), 2);
        assert_eq!(buffers.positions, vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0]);
        assert_eq!(buffers.uvs, vec![0.25, 0.75, 0.0, 0.0]);
        assert_eq!(buffers.normals, vec![0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_gather_preserves_precision_with_shift() {
        // Swiss UTM coordinates: direct f32 conversion would lose ~0.1m
        let attributes = VertexAttributes::from_positions(vec![
            Point3::new(2679012.123456, 1247892.654321, 432.111),
            Point3::new(2679012.223456, 1247892.754321, 432.211),
        ]);
        let mut compaction = CompactionMap::new();
        compaction.compact_key(AttributeTriplet::position_only(0));
        compaction.compact_key(AttributeTriplet::position_only(1));
        let shift = CoordinateShift::new(2679012.0, 1247892.0, 432.0);

        let buffers = VertexBuffers::gather(&compaction, &attributes, &shift).unwrap();

        assert_relative_eq!(buffers.positions[0], 0.123456, epsilon = 1e-4);
        assert_relative_eq!(buffers.positions[1], 0.654321, epsilon = 1e-4);
        assert_relative_eq!(buffers.positions[2], 0.111, epsilon = 1e-4);
        assert_relative_eq!(buffers.positions[3] - buffers.positions[0], 0.1, epsilon = 1e-4);
    }

    #[test]
    fn test_gather_rejects_missing_attributes() {
        let attributes = VertexAttributes::from_positions(vec![Point3::origin()]);
        let shift = CoordinateShift::default();

        let mut position = CompactionMap::new();
        position.compact_key(AttributeTriplet::position_only(0));
        position.compact_key(AttributeTriplet::position_only(4));
        assert!(matches!(
            VertexBuffers::gather(&position, &attributes, &shift),
            Err(Error::InvariantViolation(_))
        ));

        let mut normal = CompactionMap::new();
        normal.compact_key(AttributeTriplet::new(0, None, Some(0)));
        assert!(matches!(
            VertexBuffers::gather(&normal, &attributes, &shift),
            Err(Error::InvariantViolation(_))
        ));
    }
}
