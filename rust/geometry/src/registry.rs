// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-submesh face storage.
//!
//! A [`SubMesh`] holds the faces of one material or group in the order they
//! were parsed, plus every derived per-face list. All per-face lists are
//! index-aligned with [`SubMesh::original_faces`].

use crate::compaction::{CompactionMap, VertexId};
use crate::edges::{deduplicate_edges, flatten_edges, Edge};
use crate::error::{Error, Result};
use crate::triplet::{AttributeTriplet, Face, FaceTriplets, Triangle};

/// Faces and derived buffers of one material/group
#[derive(Debug, Clone)]
pub struct SubMesh {
    index: usize,
    name: String,
    original_faces: Vec<Face>,
    triangulated_faces: Vec<Vec<Triangle<AttributeTriplet>>>,
    face_rings: Vec<Vec<VertexId>>,
    triangle_indices: Vec<Vec<Triangle<VertexId>>>,
    edge_lists: Vec<Vec<Edge>>,
    skipped_faces: Vec<usize>,
    is_complete_uv: bool,
}

impl SubMesh {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            original_faces: Vec::new(),
            triangulated_faces: Vec::new(),
            face_rings: Vec::new(),
            triangle_indices: Vec::new(),
            edge_lists: Vec::new(),
            skipped_faces: Vec::new(),
            is_complete_uv: true,
        }
    }

    /// Register a face and fold its triplets into the shared key set.
    ///
    /// Returns the face's index within this submesh. Faces with fewer than 3
    /// triplets are rejected with [`Error::MalformedFace`] and leave both the
    /// submesh and the key set untouched.
    pub fn add_face(
        &mut self,
        triplets: impl IntoIterator<Item = AttributeTriplet>,
        compaction: &mut CompactionMap,
    ) -> Result<usize> {
        let triplets: FaceTriplets = triplets.into_iter().collect();
        let face = self.original_faces.len();

        if triplets.len() < 3 {
            return Err(Error::MalformedFace {
                submesh: self.index,
                face,
                vertex_count: triplets.len(),
            });
        }

        for triplet in &triplets {
            compaction.compact_key(*triplet);
        }
        self.is_complete_uv &= triplets.iter().all(AttributeTriplet::has_uv);
        self.original_faces.push(Face::new(triplets));

        Ok(face)
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.original_faces.len()
    }

    #[inline]
    pub fn original_faces(&self) -> &[Face] {
        &self.original_faces
    }

    /// Triangles per face, as triplets
    #[inline]
    pub fn triangulated_faces(&self) -> &[Vec<Triangle<AttributeTriplet>>] {
        &self.triangulated_faces
    }

    /// Compact ids of each original face ring
    #[inline]
    pub fn face_rings(&self) -> &[Vec<VertexId>] {
        &self.face_rings
    }

    /// Triangles per face, as compact ids
    #[inline]
    pub fn triangle_indices(&self) -> &[Vec<Triangle<VertexId>>] {
        &self.triangle_indices
    }

    /// Directed outline edges per face
    #[inline]
    pub fn edge_lists(&self) -> &[Vec<Edge>] {
        &self.edge_lists
    }

    /// Faces dropped because they could not be triangulated
    #[inline]
    pub fn skipped_faces(&self) -> &[usize] {
        &self.skipped_faces
    }

    /// True when every registered triplet carries a UV index.
    #[inline]
    pub fn is_complete_uv(&self) -> bool {
        self.is_complete_uv
    }

    /// Flattened triangle list, ready for a GPU index buffer.
    pub fn triangle_index_buffer(&self) -> Vec<VertexId> {
        self.triangle_indices
            .iter()
            .flatten()
            .flat_map(|triangle| triangle.iter().copied())
            .collect()
    }

    /// Flattened line list of every face's outline.
    pub fn line_index_buffer(&self) -> Vec<VertexId> {
        flatten_edges(&self.edge_lists)
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangle_indices.iter().map(Vec::len).sum()
    }

    pub(crate) fn push_triangulated(&mut self, triangles: Vec<Triangle<AttributeTriplet>>) {
        self.triangulated_faces.push(triangles);
    }

    pub(crate) fn push_skipped(&mut self, face: usize) {
        self.skipped_faces.push(face);
        self.triangulated_faces.push(Vec::new());
    }

    /// Convert every face to compact ids and derive its outline.
    ///
    /// Skipped faces keep empty triangle and edge lists so all per-face
    /// lists stay aligned.
    pub(crate) fn convert_face_indices(&mut self, compaction: &CompactionMap) -> Result<()> {
        let face_count = self.original_faces.len();
        if self.triangulated_faces.len() != face_count {
            return Err(Error::invariant(format!(
                "submesh {} has {} faces but {} triangulated entries",
                self.index,
                face_count,
                self.triangulated_faces.len()
            )));
        }

        self.face_rings = Vec::with_capacity(face_count);
        self.triangle_indices = Vec::with_capacity(face_count);
        self.edge_lists = Vec::with_capacity(face_count);

        for (face, triangles) in self.original_faces.iter().zip(&self.triangulated_faces) {
            let ring = compaction.convert_face_indices(face.triplets())?;

            let flat: Vec<AttributeTriplet> = triangles.iter().flatten().copied().collect();
            let ids = compaction.convert_face_indices(&flat)?;
            let indices: Vec<Triangle<VertexId>> = ids
                .chunks_exact(3)
                .map(|chunk| [chunk[0], chunk[1], chunk[2]])
                .collect();

            let edges = if triangles.is_empty() {
                Vec::new()
            } else {
                deduplicate_edges(&ring)
            };

            self.face_rings.push(ring);
            self.triangle_indices.push(indices);
            self.edge_lists.push(edges);
        }

        Ok(())
    }
}
