// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connected face sets and nested polygon boundaries
//!
//! A face may carry several closed boundaries, one of which is the outer
//! contour. The inner boundaries are turned into synthetic openings and
//! the whole face is handed to the opening generator, which reduces the
//! triangulation problem to the same machinery that pours windows out of
//! walls. That does not handle every case, but it is numerically stable
//! and produces nicely shaped polygons.

use crate::mesh::PolyMesh;
use crate::openings::{generate_openings, Opening};
use log::warn;
use nalgebra::{Point3, Vector3};

/// A face bounded by one or more closed polyloops
#[derive(Debug, Clone)]
pub struct Face {
    /// Closed boundaries; the outer one need not come first
    pub bounds: Vec<Vec<Point3<f64>>>,
}

/// A set of connected faces
#[derive(Debug, Clone)]
pub struct FaceSet {
    pub faces: Vec<Face>,
}

/// Append a closed polyloop as one face; trivial loops are ignored
pub(super) fn process_polyloop(polygon: &[Point3<f64>], meshout: &mut PolyMesh) -> bool {
    if polygon.len() <= 1 {
        return false;
    }
    meshout.push_face(polygon);
    true
}

/// Reduce a multi-boundary face to an opening generation problem
///
/// `master_bounds` may name the outer boundary. It cannot be relied upon
/// in general, so by default the polygon covering the largest area is
/// taken as the outer bound.
pub(super) fn process_polygon_boundaries(
    result: &mut PolyMesh,
    inmesh: &PolyMesh,
    master_bounds: Option<usize>,
) {
    if inmesh.vertcnt.is_empty() {
        return;
    }
    if inmesh.vertcnt.len() == 1 {
        result.append(inmesh);
        return;
    }
    debug_assert!(inmesh.vertcnt.iter().all(|&c| c != 0));

    // Newell normals, unnormalized: their lengths are the polygon areas.
    let normals = inmesh.compute_polygon_normals(false);

    let outer_index = match master_bounds {
        Some(idx) => {
            debug_assert!(idx < inmesh.vertcnt.len());
            idx
        }
        None => {
            let mut best = 0usize;
            let mut best_area = 1e-10;
            for (i, n) in normals.iter().enumerate() {
                let area = n.norm_squared();
                if area > best_area {
                    best_area = area;
                    best = i;
                }
            }
            best
        }
    };

    // Convert the inner boundaries into synthetic openings. The extrusion
    // direction is the outer contour's normal: that is the plane the
    // opening generator will project the entire face onto.
    let master_normal = normals[outer_index];

    let mut fake_openings: Vec<Opening> = Vec::with_capacity(inmesh.vertcnt.len() - 1);
    let mut fake_normals: Vec<Vector3<f64>> = Vec::with_capacity(inmesh.vertcnt.len() - 1);
    let mut outer_polygon: &[Point3<f64>] = &[];

    for (fi, face) in inmesh.faces().enumerate() {
        if fi == outer_index {
            outer_polygon = face;
            continue;
        }

        // degenerate boundaries would only cause trouble later on
        if normals[fi].norm_squared() < 1e-5 {
            warn!("skipping degenerate polygon among the face boundaries");
            continue;
        }

        let mut profile = PolyMesh::new();
        profile.push_face(face);
        fake_openings.push(Opening::new(profile, master_normal));
        fake_normals.push(normals[fi].normalize());
    }

    // a mesh with only the outer polygon
    let mut temp = PolyMesh::new();
    temp.push_face(outer_polygon);

    generate_openings(&mut fake_openings, &fake_normals, &mut temp, false, false);
    result.append(&temp);
}

/// Convert a connected face set into mesh faces
pub(super) fn process_connected_face_set(fset: &FaceSet, result: &mut PolyMesh) {
    for face in &fset.faces {
        let mut meshout = PolyMesh::new();
        for bound in &face.bounds {
            process_polyloop(bound, &mut meshout);
        }
        process_polygon_boundaries(result, &meshout, None);
    }
}
