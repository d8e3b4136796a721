// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Procedural solid producers and per-item dispatch
//!
//! Representation items arrive fully resolved (polygons, sampled curves,
//! placement matrices); schema dispatch, curve evaluation, and unit
//! handling live upstream. Every supported solid kind is one variant of a
//! closed enum, dispatched exactly once per item.

mod boolean;
mod extrude;
mod faceset;
mod revolve;
mod sweep;

use crate::mesh::PolyMesh;
use crate::openings::Opening;
use nalgebra::{Matrix4, Point3, Vector3};

pub use boolean::{BooleanSolid, FirstOperand, HalfSpace, SecondOperand};
pub use faceset::{Face, FaceSet};

/// Whether a swept profile bounds an area or is a bare curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    /// Closed profile: sweeps of it get caps
    Area,
    /// Open curve: sweeps of it stay lateral surfaces
    Curve,
}

/// A 2D profile already evaluated into a polygon in profile-local space
#[derive(Debug, Clone)]
pub struct SweptProfile {
    pub points: Vec<Point3<f64>>,
    pub kind: ProfileKind,
}

/// Profile swept along a straight direction
#[derive(Debug, Clone)]
pub struct ExtrudedSolid {
    pub profile: SweptProfile,
    /// Extrusion direction in placement-local coordinates, unit length
    pub direction: Vector3<f64>,
    pub depth: f64,
    /// Placement of the profile plane
    pub position: Matrix4<f64>,
}

/// Profile swept around an axis
#[derive(Debug, Clone)]
pub struct RevolvedSolid {
    pub profile: SweptProfile,
    pub axis: Vector3<f64>,
    pub axis_origin: Point3<f64>,
    /// Sweep angle in radians
    pub angle: f64,
    pub position: Matrix4<f64>,
}

/// Disk swept along a sampled directrix curve
#[derive(Debug, Clone)]
pub struct SweptDiskSolid {
    /// Curve samples, already evaluated by the caller
    pub directrix: Vec<Point3<f64>>,
    pub radius: f64,
}

/// A resolved geometric representation item
#[derive(Debug, Clone)]
pub enum Solid {
    /// Connected face set, also the shape of shell- and face-based
    /// surface model boundaries
    FaceSet(FaceSet),
    Extrusion(ExtrudedSolid),
    Revolution(RevolvedSolid),
    SweptDisk(SweptDiskSolid),
    /// CSG difference
    Boolean(BooleanSolid),
    /// Bounding boxes carry no renderable geometry
    BoundingBox,
}

/// Configuration flags for the conversion
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    /// Skip openings whose prism does not straddle the wall plane
    pub check_intersection: bool,
    /// Emit lateral jamb geometry connecting both faces of a wall
    pub generate_connection_geometry: bool,
    /// Leave opening ordering to a downstream triangulator
    pub use_custom_triangulation: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            check_intersection: true,
            generate_connection_geometry: true,
            use_custom_triangulation: false,
        }
    }
}

/// Mutable conversion state shared across the items of one element
#[derive(Debug, Default)]
pub struct ConversionContext {
    pub settings: Settings,
    /// Openings to cut into swept solids produced under this context
    pub apply_openings: Option<Vec<Opening>>,
    /// When set, produced meshes are captured as opening prisms for a
    /// parent element instead of being returned
    pub collect_openings: Option<Vec<Opening>>,
}

impl ConversionContext {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            apply_openings: None,
            collect_openings: None,
        }
    }
}

/// Convert one representation item into a polygon mesh
///
/// Returns `None` when the item carries no geometry (bounding boxes, empty
/// results) or when the context captured the mesh as an opening.
pub fn process_item(solid: &Solid, ctx: &mut ConversionContext) -> Option<PolyMesh> {
    let mut mesh = PolyMesh::new();
    match solid {
        Solid::FaceSet(fset) => faceset::process_connected_face_set(fset, &mut mesh),
        Solid::Extrusion(e) => extrude::process_extruded_solid(e, &mut mesh, ctx),
        Solid::Revolution(r) => revolve::process_revolved_solid(r, &mut mesh),
        Solid::SweptDisk(s) => sweep::process_swept_disk(s, &mut mesh),
        Solid::Boolean(b) => boolean::process_boolean(b, &mut mesh, ctx),
        Solid::BoundingBox => return None,
    }

    mesh.remove_adjacent_duplicates();
    mesh.remove_degenerates();

    // When we are just collecting openings for a parent element, generate
    // the polygonal mesh as usual but hand it to the context; it will be
    // applied to the wall it pertains to later on.
    if let Some(collected) = ctx.collect_openings.as_mut() {
        collected.push(Opening::new(mesh, Vector3::zeros()));
        return None;
    }

    if mesh.is_empty() {
        None
    } else {
        Some(mesh)
    }
}
