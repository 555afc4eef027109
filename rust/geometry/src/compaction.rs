// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Compact vertex ids for attribute triplets.
//!
//! A single [`CompactionMap`] is shared by every submesh of a model, so a
//! triplet referenced from two submeshes resolves to the same vertex. Ids are
//! handed out in first-seen order starting at 0 and are never reassigned.

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::triplet::AttributeTriplet;

/// Compact vertex id.
pub type VertexId = u32;

/// Append-only mapping from triplet to compact id.
#[derive(Debug, Clone, Default)]
pub struct CompactionMap {
    ids: FxHashMap<AttributeTriplet, VertexId>,
    /// Triplets in id order; `triplets[id]` is the triplet bound to `id`.
    triplets: Vec<AttributeTriplet>,
}

impl CompactionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id bound to `key`, binding the next free id if `key` is new.
    #[inline]
    pub fn compact_key(&mut self, key: AttributeTriplet) -> VertexId {
        let next = self.triplets.len() as VertexId;
        let id = *self.ids.entry(key).or_insert(next);
        if id == next {
            self.triplets.push(key);
        }
        id
    }

    /// Id bound to `key`, without inserting.
    #[inline]
    pub fn get(&self, key: &AttributeTriplet) -> Option<VertexId> {
        self.ids.get(key).copied()
    }

    /// Triplet bound to `id`.
    #[inline]
    pub fn triplet(&self, id: VertexId) -> Option<AttributeTriplet> {
        self.triplets.get(id as usize).copied()
    }

    /// All bound triplets in id order.
    #[inline]
    pub fn triplets(&self) -> &[AttributeTriplet] {
        &self.triplets
    }

    /// Number of distinct vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.triplets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triplets.is_empty()
    }

    /// Replaces every triplet of `keys` by its compact id, preserving order.
    ///
    /// Every key must already be bound; a miss means some face bypassed the
    /// shared key set and is reported as [`Error::InvariantViolation`].
    pub fn convert_face_indices(&self, keys: &[AttributeTriplet]) -> Result<Vec<VertexId>> {
        keys.iter()
            .map(|key| {
                self.get(key).ok_or_else(|| {
                    Error::invariant(format!("triplet {key} was never registered"))
                })
            })
            .collect()
    }
}
