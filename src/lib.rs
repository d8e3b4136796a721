//! Procedural mesh synthesis for IFC building models
//!
//! Converts resolved IFC representation items — extruded and revolved
//! area sweeps, swept disks, connected face sets, boolean clips — into
//! plain polygonal meshes, using i_overlay fixed-point polygon clipping,
//! earcutr triangulation, and nalgebra for the linear algebra.
//!
//! The heart of the crate is [`generate_openings`], which cuts door and
//! window holes into wall faces: opening solids are projected onto the
//! wall plane, merged where they overlap, the plane is tiled into quads
//! around the hole bounding boxes, and the real hole contours are sewn
//! back in before everything returns to world space.

pub mod clip;
pub mod error;
pub mod mesh;
pub mod openings;
pub mod plane;
pub mod solids;

pub use clip::ExPolygon;
pub use error::{Error, Result};
pub use mesh::PolyMesh;
pub use openings::{generate_openings, Opening};
pub use plane::{project_onto_plane, PlaneProjection};
pub use solids::{
    process_item, BooleanSolid, ConversionContext, ExtrudedSolid, Face, FaceSet, FirstOperand,
    HalfSpace, ProfileKind, RevolvedSolid, SecondOperand, Settings, Solid, SweptDiskSolid,
    SweptProfile,
};

pub use nalgebra::{Matrix3, Matrix4, Point2, Point3, Vector2, Vector3};
