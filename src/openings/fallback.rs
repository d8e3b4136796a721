// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Triangulation fallback for wall openings
//!
//! Used when the quadrify pipeline cannot represent the opening layout,
//! most notably when merging two overlapping openings yields more than one
//! polygon. All openings facing the wall are unioned into one hole set,
//! subtracted from the wall outline, and the resulting polygons-with-holes
//! are triangulated directly.

use super::Opening;
use crate::clip;
use crate::mesh::PolyMesh;
use crate::plane::derive_plane_coordinate_space;
use log::{error, warn};
use nalgebra::{Point2, Point3, Vector3};

/// Openings qualify for the fallback only when their profile normal is
/// almost exactly parallel to the wall normal
const ALIGNMENT_EPS: f64 = 1e-6;

/// Closing the opening sides from within the fallback duplicates faces
/// whenever both wall faces run through it, so the branch stays off. The
/// extrusion bookkeeping it needs is still maintained above.
const EMIT_CONNECTION_GEOMETRY: bool = false;

pub fn try_openings_with_triangulation(
    openings: &[Opening],
    nors: &[Vector3<f64>],
    curmesh: &mut PolyMesh,
) -> bool {
    warn!("forced to use triangulation fallback to generate wall openings");

    let Some((m, _)) = derive_plane_coordinate_space(curmesh) else {
        return false;
    };
    let Some(minv) = m.try_inverse() else {
        return false;
    };
    let nor = Vector3::new(m[(2, 0)], m[(2, 1)], m[(2, 2)]);

    // Move the wall outline into plane coordinates, tracking its extent.
    // The Z offset should be the same for all vertices of the planar face.
    let mut coord = -1.0;
    let mut vmin = Point2::new(f64::MAX, f64::MAX);
    let mut vmax = Point2::new(f64::MIN, f64::MIN);
    let mut contour_flat = Vec::with_capacity(curmesh.verts.len());
    for x in &curmesh.verts {
        let vv = m * x.coords;
        coord = vv.z;
        let p = Point2::new(vv.x, vv.y);
        vmin = Point2::from(vmin.coords.inf(&p.coords));
        vmax = Point2::from(vmax.coords.sup(&p.coords));
        contour_flat.push(p);
    }

    let extent = vmax - vmin;
    if !(extent.norm() > 0.0) {
        return false;
    }

    let normalize = |p: Point2<f64>| {
        Point2::new((p.x - vmin.x) / extent.x, (p.y - vmin.y) / extent.y)
    };

    // Collect the projected outline of every opening that faces the wall.
    let mut wall_extrusion = Vector3::zeros();
    let mut do_connections = false;
    let mut first = true;

    let mut holes: Vec<Vec<Point2<f64>>> = Vec::new();
    for (opening, outernor) in openings.iter().zip(nors) {
        let dot = nor.dot(outernor);
        if dot.abs() < 1.0 - ALIGNMENT_EPS {
            continue;
        }

        let va = &opening.profile.verts;
        if va.len() <= 2 {
            continue;
        }

        let mut contour = Vec::with_capacity(va.len());
        for xx in va {
            let vv = m * xx.coords;
            let vv_extr = m * (xx.coords + opening.extrusion_dir);

            // The profile prism has two faces parallel to the wall; take
            // whichever end of the extrusion lies on this wall face.
            let is_extruded_side = (vv.z - coord).abs() > (vv_extr.z - coord).abs();
            if first {
                first = false;
                if dot > 0.0 {
                    do_connections = true;
                    wall_extrusion = if is_extruded_side {
                        -opening.extrusion_dir
                    } else {
                        opening.extrusion_dir
                    };
                }
            }

            let vv = if is_extruded_side { vv_extr } else { vv };
            contour.push(normalize(Point2::new(vv.x, vv.y)));
        }
        holes.push(contour);
    }

    if holes.is_empty() {
        return false;
    }

    // Union all holes, then punch the union out of the wall outline.
    let holes_union = match clip::union_all(&holes) {
        Ok(u) => u,
        Err(e) => {
            error!("error during polygon clipping, skipping openings for this face: {e}");
            return false;
        }
    };
    if holes_union.is_empty() {
        return false;
    }
    let hole_outers: Vec<Vec<Point2<f64>>> =
        holes_union.iter().map(|ex| ex.outer.clone()).collect();

    let outer_norm: Vec<Point2<f64>> =
        contour_flat.iter().map(|p| normalize(*p)).collect();
    let clipped = match clip::subtract_all(&outer_norm, &hole_outers) {
        Ok(c) => c,
        Err(e) => {
            error!("error during polygon clipping, skipping openings for this face: {e}");
            return false;
        }
    };

    let old_verts = std::mem::take(&mut curmesh.verts);
    let old_vertcnt = std::mem::take(&mut curmesh.vertcnt);

    let unproject = |p: &Point2<f64>| -> Point3<f64> {
        Point3::from(
            minv * Vector3::new(
                vmin.x + p.x * extent.x,
                vmin.y + p.y * extent.y,
                coord,
            ),
        )
    };

    // Connection geometry to close the adjacent holes of the openings.
    // Only one wall side may emit these or the polygons appear twice.
    if EMIT_CONNECTION_GEOMETRY && do_connections {
        for opening in &hole_outers {
            let tmpvec: Vec<Point3<f64>> = opening.iter().map(&unproject).collect();
            for i in 0..tmpvec.len() {
                let next = (i + 1) % tmpvec.len();
                // assumes through openings and uniform wall thickness
                curmesh.verts.push(tmpvec[i]);
                curmesh.verts.push(tmpvec[i] + wall_extrusion);
                curmesh.verts.push(tmpvec[next] + wall_extrusion);
                curmesh.verts.push(tmpvec[next]);
                curmesh.vertcnt.push(4);
            }
        }
    }

    let mut result = false;
    for ex in &clipped {
        match triangulate_expolygon(ex) {
            Ok(triangles) => {
                for tri in triangles.chunks_exact(3) {
                    for p in tri {
                        curmesh.verts.push(unproject(p));
                    }
                    curmesh.vertcnt.push(3);
                }
                result = true;
            }
            Err(e) => {
                error!("error during polygon triangulation, skipping some openings: {e}");
                continue;
            }
        }
    }

    if !result {
        // revert -- it's a shame, but better than nothing
        curmesh.verts.extend(old_verts);
        curmesh.vertcnt.extend(old_vertcnt);
        error!("revert, could not generate openings for this wall");
    }

    result
}

/// Triangulate a polygon with holes, returning triangle corner points
fn triangulate_expolygon(ex: &clip::ExPolygon) -> crate::Result<Vec<Point2<f64>>> {
    let total = ex.outer.len() + ex.holes.iter().map(Vec::len).sum::<usize>();
    let mut vertices = Vec::with_capacity(total * 2);
    let mut points = Vec::with_capacity(total);

    for p in &ex.outer {
        vertices.push(p.x);
        vertices.push(p.y);
        points.push(*p);
    }
    let mut hole_indices = Vec::with_capacity(ex.holes.len());
    for hole in &ex.holes {
        hole_indices.push(vertices.len() / 2);
        for p in hole {
            vertices.push(p.x);
            vertices.push(p.y);
            points.push(*p);
        }
    }

    let indices = earcutr::earcut(&vertices, &hole_indices, 2)
        .map_err(|e| crate::Error::Triangulation(format!("{e:?}")))?;
    if indices.is_empty() {
        return Err(crate::Error::Triangulation(
            "triangulator produced no triangles".to_string(),
        ));
    }

    Ok(indices.into_iter().map(|i| points[i]).collect())
}
