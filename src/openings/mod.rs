// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall opening generation
//!
//! Given a single (roughly planar) wall face and a set of opening solids
//! piercing it, replace the face with a polygonal surface carrying the
//! correctly shaped holes. The pipeline projects everything onto the wall
//! plane, merges overlapping opening silhouettes with fixed-point polygon
//! booleans, tiles the plane around their bounding boxes, sews the real
//! contours back in, and clips the result to the wall outline. Layouts the
//! tiler cannot express fall back to plain triangulation.

mod close;
mod contour;
mod fallback;
mod insert;
mod quadrify;

use crate::mesh::PolyMesh;
use crate::plane::project_onto_plane;
use contour::{
    cleanup_outer_contour, contour_bounds, extract_vertices, is_duplicate_vertex,
    make_disjoint_window_contours, merge_window_contours, validate_window_contours, Bounds2,
    ProjectedContour,
};
use log::{debug, error, warn};
use nalgebra::{Point2, Point3, Vector3};

/// Profile faces pointing mostly sideways contribute nothing to the
/// projected silhouette
const FACE_ALIGNMENT_MIN: f64 = 0.5;

/// Projected openings with a smaller bounding-box area are projection
/// noise from the far side of the wall
const MIN_BB_AREA: f64 = 1e-5;

/// Relative tolerance for the plane-straddling test of an opening prism
const PLANE_INTERSECT_REL_EPS: f64 = 0.01;

/// An opening solid to be cut out of a wall
///
/// `wall_points` starts empty and is filled by the first wall face that
/// processes the opening, so the opposite face can close the jamb between
/// the two holes. Openings are shared across all faces of one extrusion.
#[derive(Debug, Clone)]
pub struct Opening {
    /// Direction in which the opening was swept through the wall
    pub extrusion_dir: Vector3<f64>,
    /// Polygonal mesh of the opening profile
    pub profile: PolyMesh,
    /// Unprojected hole contour of the first processed wall face
    pub wall_points: Vec<Point3<f64>>,
}

impl Opening {
    pub fn new(profile: PolyMesh, extrusion_dir: Vector3<f64>) -> Self {
        Self {
            extrusion_dir,
            profile,
            wall_points: Vec::new(),
        }
    }
}

/// Cut the given openings into a single-face wall mesh
///
/// `opening_normals` carries one profile normal per opening (zero for
/// degenerate profiles); it is only consulted by the triangulation
/// fallback. With `check_intersection`, openings whose prism does not
/// straddle the wall plane are skipped. With
/// `generate_connection_geometry`, contour-to-opening bookkeeping is
/// maintained and the lateral jamb geometry between both wall faces is
/// emitted.
///
/// On success the mesh holds the tiled wall with holes and `true` is
/// returned. On failure the mesh is left as it was and `false` is
/// returned; per-opening rejects are silent skips.
pub fn generate_openings(
    openings: &mut [Opening],
    opening_normals: &[Vector3<f64>],
    curmesh: &mut PolyMesh,
    check_intersection: bool,
    generate_connection_geometry: bool,
) -> bool {
    let Some((projection, contour_flat)) = project_onto_plane(curmesh) else {
        return false;
    };
    let nor = projection.normal();

    // Build bounding boxes for all 2D openings in projection space,
    // merging overlapping silhouettes as they come in.
    let mut contours: Vec<ProjectedContour> = Vec::new();
    let mut contours_to_openings: Vec<Vec<usize>> = Vec::new();

    for oi in 0..openings.len() {
        let profile = &openings[oi].profile;
        if profile.verts.len() <= 2 {
            continue;
        }

        let mut bb = Bounds2::empty();
        let mut dmin = f64::MAX;
        let mut dmax = f64::MIN;
        let mut temp_contour: Vec<Point2<f64>> = Vec::new();

        // The opening prisms are real 3D meshes, so skip all faces that
        // clearly point into the wrong direction, and record the plane
        // equation offsets of the remaining vertices to later check
        // whether the prism straddles the wall plane at all.
        let mut vi_total = 0usize;
        for &fcnt in &profile.vertcnt {
            let fcnt = fcnt as usize;
            let face = &profile.verts[vi_total..vi_total + fcnt];
            vi_total += fcnt;
            if fcnt < 3 {
                continue;
            }

            let face_nor = (face[2] - face[0]).cross(&(face[1] - face[0])).normalize();
            if nor.dot(&face_nor).abs() < FACE_ALIGNMENT_MIN {
                continue;
            }

            for x in face {
                if check_intersection {
                    let vert_d = -x.coords.dot(&nor);
                    dmin = dmin.min(vert_d);
                    dmax = dmax.max(vert_d);
                }

                let v = projection.to_plane.transform_point(x);
                let vv = Point2::new(v.x.clamp(0.0, 1.0), v.y.clamp(0.0, 1.0));
                bb.extend(&vv);

                if !is_duplicate_vertex(&vv, &temp_contour) {
                    temp_contour.push(vv);
                }
            }
        }

        if temp_contour.len() <= 2 {
            continue;
        }

        let epsilon = (dmax - dmin).abs() * PLANE_INTERSECT_REL_EPS;
        if check_intersection
            && (projection.base_d < dmin - epsilon || projection.base_d > dmax + epsilon)
        {
            continue;
        }

        // Very small openings are likely projection errors from the other
        // side of the wall.
        if bb.area() < MIN_BB_AREA {
            continue;
        }

        let mut joined_openings: Vec<usize> = vec![oi];

        // See whether this bounding box intersects any we already have.
        let mut it = 0usize;
        while it < contours.len() {
            let ibb = contours[it].bb;
            if ibb.overlaps(&bb) {
                // First check whether subtracting the old contour from the
                // new one yields an updated box that no longer overlaps.
                match make_disjoint_window_contours(&contours[it].contour, &temp_contour) {
                    Ok(poly) if poly.len() == 1 => {
                        let newbb = contour_bounds(&poly[0].outer);
                        if !ibb.overlaps(&newbb) {
                            bb = newbb;
                            temp_contour = extract_vertices(&poly[0].outer, false);
                            it += 1;
                            continue;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!("error during polygon clipping, skipping openings for this face: {e}");
                        return false;
                    }
                }

                // The two contours genuinely overlap; resume with a single
                // merged contour and a single bounding box.
                match merge_window_contours(&temp_contour, &contours[it].contour) {
                    Ok(poly) if poly.len() > 1 => {
                        // not simply connected, the tiler cannot express it
                        return fallback::try_openings_with_triangulation(
                            openings,
                            opening_normals,
                            curmesh,
                        );
                    }
                    Ok(poly) if poly.is_empty() => {
                        warn!("ignoring duplicate opening");
                        temp_contour.clear();
                        break;
                    }
                    Ok(poly) => {
                        debug!("merging overlapping openings");
                        temp_contour = extract_vertices(&poly[0].outer, true);
                        bb = bb.union(&ibb);

                        if generate_connection_geometry {
                            let joined = contours_to_openings.remove(it);
                            joined_openings.extend(joined);
                        }
                        contours.remove(it);

                        // The merged box may now overlap boxes its parts
                        // did not; restart from scratch.
                        it = 0;
                        continue;
                    }
                    Err(e) => {
                        error!("error during polygon clipping, skipping openings for this face: {e}");
                        return false;
                    }
                }
            }
            it += 1;
        }

        if !temp_contour.is_empty() {
            if generate_connection_geometry {
                contours_to_openings.push(joined_openings);
            }
            contours.push(ProjectedContour::new(temp_contour, bb));
        }
    }

    // It may well be that no opening candidate intersects this face or
    // they all point perpendicular to it.
    if contours.is_empty() {
        return false;
    }

    curmesh.clear();

    // Base subdivision into quads around the bounding boxes.
    quadrify::quadrify(&contours, curmesh);

    // Sanity pass so degenerate contours cannot corrupt the reinjection.
    validate_window_contours(&mut contours);

    // Replace the rectangular holes with the real window shapes.
    insert::insert_window_contours(&contours, curmesh);

    // The tiling always spans the whole unit square; cut it back to the
    // real wall outline.
    cleanup_outer_contour(&contour_flat, curmesh);

    // Undo the projection.
    for v in &mut curmesh.verts {
        *v = projection.from_plane.transform_point(v);
    }

    if generate_connection_geometry {
        close::close_windows(
            &contours,
            &projection.from_plane,
            &contours_to_openings,
            openings,
            curmesh,
        );
    }
    true
}
