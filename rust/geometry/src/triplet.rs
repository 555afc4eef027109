// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Attribute triplets, faces and the model-wide attribute arrays they index.

use std::fmt;

use nalgebra::{Point2, Point3, Vector3};
use smallvec::SmallVec;

/// Index into one of the model-wide attribute arrays.
pub type AttributeIndex = u32;

/// Triangle expressed as three items in emission order.
pub type Triangle<T> = [T; 3];

/// Storage for one face's triplets. Triangles and quads stay inline.
pub type FaceTriplets = SmallVec<[AttributeTriplet; 4]>;

/// One logical vertex instance: a (position, uv, normal) index combination.
///
/// `uv` and `normal` are `None` when the source data omits that channel.
/// Two triplets are the same vertex only if all three fields match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeTriplet {
    pub position: AttributeIndex,
    pub uv: Option<AttributeIndex>,
    pub normal: Option<AttributeIndex>,
}

impl AttributeTriplet {
    #[inline]
    pub fn new(
        position: AttributeIndex,
        uv: Option<AttributeIndex>,
        normal: Option<AttributeIndex>,
    ) -> Self {
        Self {
            position,
            uv,
            normal,
        }
    }

    /// Triplet with neither UV nor normal.
    #[inline]
    pub fn position_only(position: AttributeIndex) -> Self {
        Self::new(position, None, None)
    }

    #[inline]
    pub fn has_uv(&self) -> bool {
        self.uv.is_some()
    }

    /// Canonical text key (`p`, `p/t`, `p//n` or `p/t/n`).
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AttributeTriplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.uv, self.normal) {
            (None, None) => write!(f, "{}", self.position),
            (Some(uv), None) => write!(f, "{}/{}", self.position, uv),
            (None, Some(normal)) => write!(f, "{}//{}", self.position, normal),
            (Some(uv), Some(normal)) => write!(f, "{}/{}/{}", self.position, uv, normal),
        }
    }
}

/// One polygon in original winding order. Always has at least 3 triplets.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Face {
    triplets: FaceTriplets,
}

impl Face {
    /// Caller guarantees `triplets.len() >= 3`; the registry checks this.
    pub(crate) fn new(triplets: FaceTriplets) -> Self {
        debug_assert!(triplets.len() >= 3);
        Self { triplets }
    }

    #[inline]
    pub fn triplets(&self) -> &[AttributeTriplet] {
        &self.triplets
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.triplets.len()
    }

    /// Faces are never empty, kept for the usual `len`/`is_empty` pairing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triplets.is_empty()
    }
}

/// Dense attribute arrays supplied by the upstream loader, indexed from 0.
#[derive(Debug, Clone, Default)]
pub struct VertexAttributes {
    pub positions: Vec<Point3<f64>>,
    pub uvs: Vec<Point2<f64>>,
    pub normals: Vec<Vector3<f64>>,
}

impl VertexAttributes {
    pub fn new(
        positions: Vec<Point3<f64>>,
        uvs: Vec<Point2<f64>>,
        normals: Vec<Vector3<f64>>,
    ) -> Self {
        Self {
            positions,
            uvs,
            normals,
        }
    }

    /// Attributes carrying positions only.
    pub fn from_positions(positions: Vec<Point3<f64>>) -> Self {
        Self {
            positions,
            ..Self::default()
        }
    }

    #[inline]
    pub fn position(&self, triplet: &AttributeTriplet) -> Option<Point3<f64>> {
        self.positions.get(triplet.position as usize).copied()
    }

    #[inline]
    pub fn uv(&self, triplet: &AttributeTriplet) -> Option<Point2<f64>> {
        triplet.uv.and_then(|i| self.uvs.get(i as usize).copied())
    }

    #[inline]
    pub fn normal(&self, triplet: &AttributeTriplet) -> Option<Vector3<f64>> {
        triplet.normal.and_then(|i| self.normals.get(i as usize).copied())
    }

    /// First index of `triplet` that points past its attribute array.
    ///
    /// Absent UV and normal channels are never out of range.
    pub fn out_of_range(&self, triplet: &AttributeTriplet) -> Option<AttributeIndex> {
        if triplet.position as usize >= self.positions.len() {
            return Some(triplet.position);
        }
        triplet
            .uv
            .filter(|&i| i as usize >= self.uvs.len())
            .or_else(|| triplet.normal.filter(|&i| i as usize >= self.normals.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_forms() {
        assert_eq!(AttributeTriplet::position_only(4).key(), "4");
        assert_eq!(AttributeTriplet::new(4, Some(2), None).key(), "4/2");
        assert_eq!(AttributeTriplet::new(4, None, Some(9)).key(), "4//9");
        assert_eq!(AttributeTriplet::new(4, Some(2), Some(9)).key(), "4/2/9");
    }

    #[test]
    fn test_equality_uses_all_fields() {
        let a = AttributeTriplet::new(1, Some(1), Some(1));
        let b = AttributeTriplet::new(1, Some(1), None);
        assert_ne!(a, b);
        assert_eq!(a, AttributeTriplet::new(1, Some(1), Some(1)));
    }

    #[test]
    fn test_attribute_lookup_out_of_range() {
        let attributes = VertexAttributes::new(
            vec![Point3::new(0.0, 1.0, 2.0)],
            vec![Point2::new(0.5, 0.5)],
            Vec::new(),
        );
        let triplet = AttributeTriplet::new(0, Some(0), Some(0));
        assert_eq!(attributes.position(&triplet), Some(Point3::new(0.0, 1.0, 2.0)));
        assert_eq!(attributes.uv(&triplet), Some(Point2::new(0.5, 0.5)));
        assert_eq!(attributes.normal(&triplet), None);
        assert_eq!(attributes.position(&AttributeTriplet::position_only(3)), None);
    }

    #[test]
    fn test_out_of_range_checks_present_channels() {
        let attributes = VertexAttributes::new(
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
            vec![Point2::origin()],
            vec![Vector3::z()],
        );
        assert_eq!(attributes.out_of_range(&AttributeTriplet::position_only(1)), None);
        assert_eq!(attributes.out_of_range(&AttributeTriplet::new(1, Some(0), Some(0))), None);
        assert_eq!(attributes.out_of_range(&AttributeTriplet::position_only(2)), Some(2));
        assert_eq!(attributes.out_of_range(&AttributeTriplet::new(0, Some(4), None)), Some(4));
        assert_eq!(attributes.out_of_range(&AttributeTriplet::new(0, None, Some(7))), Some(7));
    }
}
