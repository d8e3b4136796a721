// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Window closing
//!
//! Connects the hole contour on one face of a wall with its counterpart on
//! the opposite face, producing the lateral jamb geometry. The first face
//! processed stores its unprojected contour points in the openings'
//! `wall_points`; the opposite face pairs each of its contour points with
//! the nearest stored point and emits one quad per contour edge.
//!
//! Contours may pertain to several openings after merging; the pairing
//! assumes merging happened symmetrically on both wall faces.

use super::contour::ProjectedContour;
use super::Opening;
use crate::mesh::PolyMesh;
use nalgebra::{Matrix4, Point2, Point3};

/// Distance from the unit-square border below which a projected point
/// counts as lying on the wall outline
const BORDER_EPS: f64 = 1e-4;

/// Threshold for treating a border-to-border edge as axis-aligned
const AXIS_ALIGNED_EPS: f64 = 1e-5;

pub fn close_windows(
    contours: &[ProjectedContour],
    from_plane: &Matrix4<f64>,
    contours_to_openings: &[Vec<usize>],
    openings: &mut [Opening],
    curmesh: &mut PolyMesh,
) {
    for (ci, window) in contours.iter().enumerate() {
        if window.is_invalid() {
            continue;
        }
        let refs = &contours_to_openings[ci];

        let has_other_side = refs
            .iter()
            .any(|&oi| !openings[oi].wall_points.is_empty());

        if has_other_side {
            emit_jambs(window, from_plane, refs, openings, curmesh);
        } else {
            // First side of this wall: stash the unprojected contour so the
            // opposite face can pair with it later.
            for &oi in refs {
                let opening = &mut openings[oi];
                opening.wall_points.reserve(window.contour.len());
                for p in &window.contour {
                    opening
                        .wall_points
                        .push(from_plane.transform_point(&Point3::new(p.x, p.y, 0.0)));
                }
            }
        }
    }
}

fn emit_jambs(
    window: &ProjectedContour,
    from_plane: &Matrix4<f64>,
    refs: &[usize],
    openings: &[Opening],
    curmesh: &mut PolyMesh,
) {
    let contour = &window.contour;
    let size = contour.len();
    if size < 2 {
        return;
    }

    // Pair every contour point with the closest stored opposite point.
    // Nearest-distance is a heuristic, but merged contours keep no vertex
    // correspondence to rely on.
    let mut world = Vec::with_capacity(size);
    let mut paired = Vec::with_capacity(size);
    let mut on_border = Vec::with_capacity(size);
    for p in contour {
        let w = from_plane.transform_point(&Point3::new(p.x, p.y, 0.0));

        let mut best = f64::MAX;
        let mut bestv = w;
        for &oi in refs {
            for other in &openings[oi].wall_points {
                let sqdist = (w - other).norm_squared();
                if sqdist < best {
                    best = sqdist;
                    bestv = *other;
                }
            }
        }

        world.push(w);
        paired.push(bestv);
        on_border.push(is_on_border(p));
    }

    curmesh.verts.reserve(curmesh.verts.len() + size * 4);
    curmesh.vertcnt.reserve(curmesh.vertcnt.len() + size);

    for i in 0..size {
        let next = (i + 1) % size;

        // Edges running along the outer wall outline get no closing
        // geometry; a door threshold must stay open.
        if on_border[i] && on_border[next] && is_axis_aligned(&contour[i], &contour[next]) {
            continue;
        }

        curmesh.verts.push(world[i]);
        curmesh.verts.push(paired[i]);
        curmesh.verts.push(paired[next]);
        curmesh.verts.push(world[next]);
        curmesh.vertcnt.push(4);
    }
}

#[inline]
fn is_on_border(p: &Point2<f64>) -> bool {
    p.x <= BORDER_EPS
        || p.x >= 1.0 - BORDER_EPS
        || p.y <= BORDER_EPS
        || p.y >= 1.0 - BORDER_EPS
}

#[inline]
fn is_axis_aligned(p: &Point2<f64>, q: &Point2<f64>) -> bool {
    ((p.x - q.x) * (p.y - q.y)).abs() < AXIS_ALIGNED_EPS
}
