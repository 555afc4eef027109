// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polyface Geometry
//!
//! Turns the polygon faces of a parsed mesh model into render-ready data:
//! ear-clipped triangles with a fixed winding, one compact vertex id per
//! unique attribute triplet, and per-face outline edges for wireframes.
//!
//! ```
//! use polyface_geometry::{AttributeTriplet, LoadSession, Point3, SessionConfig, VertexAttributes};
//!
//! let attributes = VertexAttributes::from_positions(vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ]);
//! let mut session = LoadSession::new(attributes, SessionConfig::default());
//! let submesh = session.add_submesh("default");
//! session
//!     .add_face(submesh, (0..4).map(AttributeTriplet::position_only))
//!     .unwrap();
//!
//! let model = session.finish().unwrap();
//! assert_eq!(model.vertex_count(), 4);
//! assert_eq!(model.submeshes()[0].triangle_count(), 2);
//! ```

pub mod compaction;
pub mod config;
pub mod edges;
pub mod error;
pub mod mesh;
pub mod registry;
pub mod session;
pub mod triangulation;
pub mod triplet;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};

pub use compaction::{CompactionMap, VertexId};
pub use config::{DegenerateFacePolicy, SessionConfig};
pub use edges::{deduplicate_edges, Edge};
pub use error::{DegenerateReason, Error, Result};
pub use mesh::{CoordinateShift, GeometryBookkeeping, VertexBuffers};
pub use registry::SubMesh;
pub use session::{LoadSession, LoadedModel};
pub use triangulation::{ear_clip, triangulate_face};
pub use triplet::{AttributeIndex, AttributeTriplet, Face, Triangle, VertexAttributes};
