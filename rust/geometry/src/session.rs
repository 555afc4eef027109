// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model load sessions.
//!
//! A [`LoadSession`] owns everything one model load mutates: the shared
//! [`CompactionMap`], the geometry accumulators and the submeshes. Nothing is
//! global, so independent loads never observe each other's state.
//!
//! ```text
//! add_face* ──> triangulate ──> compact + outline ──> gather buffers
//!   (registry)   (ear clipping)   (compact ids, edges)  (VertexBuffers)
//! ```

use crate::compaction::CompactionMap;
use crate::config::{DegenerateFacePolicy, SessionConfig};
use crate::error::{DegenerateReason, Error, Result};
use crate::mesh::{CoordinateShift, GeometryBookkeeping, VertexBuffers};
use crate::registry::SubMesh;
use crate::triangulation::triangulate_face;
use crate::triplet::{AttributeTriplet, FaceTriplets, VertexAttributes};

/// Mutable state of one model load
#[derive(Debug)]
pub struct LoadSession {
    config: SessionConfig,
    attributes: VertexAttributes,
    compaction: CompactionMap,
    bookkeeping: GeometryBookkeeping,
    submeshes: Vec<SubMesh>,
}

impl LoadSession {
    /// Start a load with fresh accumulators.
    pub fn new(attributes: VertexAttributes, config: SessionConfig) -> Self {
        let shift =
            CoordinateShift::for_positions(&attributes.positions, config.large_coordinate_threshold);
        if !shift.is_zero() {
            tracing::debug!(x = shift.x, y = shift.y, z = shift.z, "Large coordinates, shifting model");
        }

        Self {
            config,
            attributes,
            compaction: CompactionMap::new(),
            bookkeeping: GeometryBookkeeping::new(shift),
            submeshes: Vec::new(),
        }
    }

    /// Open a new submesh for a material or group and return its index.
    pub fn add_submesh(&mut self, name: impl Into<String>) -> usize {
        let index = self.submeshes.len();
        self.submeshes.push(SubMesh::new(index, name));
        index
    }

    /// Register a face on `submesh`.
    ///
    /// A face with fewer than 3 triplets is a [`Error::MalformedFace`]. A face
    /// indexing past any attribute array is a [`Error::DegenerateFace`] with
    /// [`DegenerateReason::AttributeOutOfRange`]. Either error only rejects
    /// this face, leaves the session untouched and keeps it usable.
    pub fn add_face(
        &mut self,
        submesh: usize,
        triplets: impl IntoIterator<Item = AttributeTriplet>,
    ) -> Result<usize> {
        let target = self
            .submeshes
            .get_mut(submesh)
            .ok_or(Error::UnknownSubMesh(submesh))?;

        let triplets: FaceTriplets = triplets.into_iter().collect();
        let out_of_range = match triplets.len() {
            0..=2 => None,
            _ => triplets.iter().find_map(|t| self.attributes.out_of_range(t)),
        };
        if let Some(index) = out_of_range {
            return Err(Error::DegenerateFace {
                submesh,
                face: target.face_count(),
                reason: DegenerateReason::AttributeOutOfRange { index },
            });
        }

        let face = target.add_face(triplets, &mut self.compaction)?;

        for triplet in target.original_faces()[face].triplets() {
            if let Some(position) = self.attributes.position(triplet) {
                self.bookkeeping.observe(position);
            }
        }

        Ok(face)
    }

    #[inline]
    pub fn compaction(&self) -> &CompactionMap {
        &self.compaction
    }

    #[inline]
    pub fn submeshes(&self) -> &[SubMesh] {
        &self.submeshes
    }

    /// Run triangulation, compaction and outline extraction, and gather the
    /// compacted vertex buffers.
    ///
    /// Degenerate faces are skipped or abort the load depending on
    /// [`SessionConfig::degenerate_faces`]. Any [`Error::InvariantViolation`]
    /// aborts the load, including a compacted triplet whose attributes cannot
    /// be gathered.
    pub fn finish(mut self) -> Result<LoadedModel> {
        let degenerate_faces = self.triangulate()?;

        for submesh in &mut self.submeshes {
            submesh.convert_face_indices(&self.compaction)?;
        }

        let buffers =
            VertexBuffers::gather(&self.compaction, &self.attributes, &self.bookkeeping.shift)?;

        let model = LoadedModel {
            submeshes: self.submeshes,
            compaction: self.compaction,
            bookkeeping: self.bookkeeping,
            buffers,
            degenerate_faces,
        };

        tracing::info!(
            submeshes = model.submeshes.len(),
            vertices = model.vertex_count(),
            triangles = model.triangle_count(),
            skipped = model.degenerate_faces.len(),
            "Model load complete"
        );

        Ok(model)
    }

    /// Triangulate every face, routing emitted triplets through the shared
    /// key set. Returns the faces skipped as degenerate.
    fn triangulate(&mut self) -> Result<Vec<Error>> {
        let mut degenerate = Vec::new();

        for submesh in &mut self.submeshes {
            tracing::debug!(
                submesh = submesh.index(),
                name = submesh.name(),
                faces = submesh.face_count(),
                "Triangulating submesh"
            );

            for face in 0..submesh.face_count() {
                let triplets = submesh.original_faces()[face].triplets();

                match triangulate_face(triplets, &self.attributes, self.config.epsilon) {
                    Ok(triangles) => {
                        for triplet in triangles.iter().flatten() {
                            self.compaction.compact_key(*triplet);
                        }
                        submesh.push_triangulated(triangles);
                    }
                    Err(reason) => {
                        let err = Error::DegenerateFace {
                            submesh: submesh.index(),
                            face,
                            reason,
                        };
                        if self.config.degenerate_faces == DegenerateFacePolicy::Abort {
                            return Err(err);
                        }
                        tracing::warn!(
                            submesh = submesh.index(),
                            face,
                            %reason,
                            "Skipping degenerate face"
                        );
                        submesh.push_skipped(face);
                        degenerate.push(err);
                    }
                }
            }
        }

        Ok(degenerate)
    }
}

/// Read-only result of a finished load
#[derive(Debug, Clone)]
pub struct LoadedModel {
    submeshes: Vec<SubMesh>,
    compaction: CompactionMap,
    bookkeeping: GeometryBookkeeping,
    buffers: VertexBuffers,
    degenerate_faces: Vec<Error>,
}

impl LoadedModel {
    #[inline]
    pub fn submeshes(&self) -> &[SubMesh] {
        &self.submeshes
    }

    #[inline]
    pub fn compaction(&self) -> &CompactionMap {
        &self.compaction
    }

    /// Number of unique vertices after compaction.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.compaction.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.submeshes.iter().map(SubMesh::triangle_count).sum()
    }

    /// Lowest shifted Y over every registered vertex.
    #[inline]
    pub fn min_y(&self) -> Option<f64> {
        self.bookkeeping.min_y()
    }

    #[inline]
    pub fn coordinate_shift(&self) -> &CoordinateShift {
        &self.bookkeeping.shift
    }

    #[inline]
    pub fn vertex_buffers(&self) -> &VertexBuffers {
        &self.buffers
    }

    /// Faces skipped because they could not be triangulated.
    #[inline]
    pub fn degenerate_faces(&self) -> &[Error] {
        &self.degenerate_faces
    }
}
