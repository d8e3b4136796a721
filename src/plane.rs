// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Best-fit plane derivation and 2D projection
//!
//! Maps a (roughly planar) polygon face into a 2D coordinate system on its
//! own plane, rescaled so the face's bounding box becomes the unit square.
//! Working in `[0,1]²` lets every later epsilon be a plain constant.

use crate::mesh::PolyMesh;
use nalgebra::{Matrix3, Matrix4, Point2, Point3, Vector3};

/// Minimum cross-product length accepted while searching for a plane normal
const NORMAL_SEARCH_EPS: f64 = 1e-8;

/// Projection onto a wall plane together with its inverse
#[derive(Debug, Clone)]
pub struct PlaneProjection {
    /// World space -> unit-square plane space
    pub to_plane: Matrix4<f64>,
    /// Unit-square plane space -> world space
    pub from_plane: Matrix4<f64>,
    /// Plane offset `d` of the derived basis (`-p · n` for a point `p` on
    /// the plane); used to test whether opening prisms straddle the plane
    pub base_d: f64,
}

impl PlaneProjection {
    /// Row 2 of the projection: the plane normal in world space
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        Vector3::new(
            self.to_plane[(2, 0)],
            self.to_plane[(2, 1)],
            self.to_plane[(2, 2)],
        )
    }
}

/// Derive an orthonormal basis whose third row is the polygon normal
///
/// The polygon is arbitrarily shaped, so vertex pairs are probed until one
/// spans a usable normal with the last vertex. This also yields a natural
/// first axis for the 2D space, exploiting the fact that input faces are
/// nearly always quads. Returns the row-major basis and the plane offset
/// `d`, or `None` when every probe is degenerate.
pub fn derive_plane_coordinate_space(mesh: &PolyMesh) -> Option<(Matrix3<f64>, f64)> {
    let verts = &mesh.verts;
    let s = verts.len();
    debug_assert!(mesh.vertcnt.len() == 1 && mesh.vertcnt[0] as usize == s);
    if s < 3 {
        return None;
    }

    let any_point = verts[s - 1];

    let mut nor = Vector3::zeros();
    let mut first_axis_vert = 0usize;
    let mut done = false;
    'outer: for i in 0..s - 1 {
        for j in i + 1..s {
            nor = -(verts[i] - any_point).cross(&(verts[j] - any_point));
            if nor.norm() > NORMAL_SEARCH_EPS {
                first_axis_vert = i;
                done = true;
                break 'outer;
            }
        }
    }
    if !done {
        return None;
    }

    let nor = nor.normalize();
    let r = (verts[first_axis_vert] - any_point).normalize();
    let u = r.cross(&nor).normalize();
    let d = -any_point.coords.dot(&nor);

    #[rustfmt::skip]
    let m = Matrix3::new(
        r.x, r.y, r.z,
        u.x, u.y, u.z,
        nor.x, nor.y, nor.z,
    );
    Some((m, d))
}

/// Project a single-face mesh onto its best-fit plane
///
/// Returns the projection (with inverse) and the face contour rescaled and
/// clamped into `[0,1]²`. Fails when no plane basis can be derived or the
/// projected extent collapses in either axis.
pub fn project_onto_plane(mesh: &PolyMesh) -> Option<(PlaneProjection, Vec<Point2<f64>>)> {
    let (basis, base_d) = derive_plane_coordinate_space(mesh)?;
    let m = basis.to_homogeneous();

    let mut coord = -1.0;
    let mut vmin = Point2::new(f64::MAX, f64::MAX);
    let mut vmax = Point2::new(f64::MIN, f64::MIN);
    let mut contour = Vec::with_capacity(mesh.verts.len());

    for x in &mesh.verts {
        let vv = m.transform_point(x);
        // The Z offset in plane coordinates should be the same for every
        // vertex of a planar polygon, modulo numeric noise; the last one
        // wins.
        coord = vv.z;
        let p = Point2::new(vv.x, vv.y);
        vmin = Point2::from(vmin.coords.inf(&p.coords));
        vmax = Point2::from(vmax.coords.sup(&p.coords));
        contour.push(p);
    }

    let extent = vmax - vmin;
    if !(extent.x > 0.0) || !(extent.y > 0.0) {
        return None;
    }

    for p in &mut contour {
        p.x = ((p.x - vmin.x) / extent.x).clamp(0.0, 1.0);
        p.y = ((p.y - vmin.y) / extent.y).clamp(0.0, 1.0);
    }

    // Compose the rescale into the projection so a single matrix maps
    // world space straight into the unit square with z = 0 on the plane.
    let mut rescale = Matrix4::identity();
    rescale[(0, 0)] = 1.0 / extent.x;
    rescale[(1, 1)] = 1.0 / extent.y;
    rescale[(0, 3)] = -vmin.x / extent.x;
    rescale[(1, 3)] = -vmin.y / extent.y;
    rescale[(2, 3)] = -coord;

    let to_plane = rescale * m;
    let from_plane = to_plane.try_inverse()?;

    Some((
        PlaneProjection {
            to_plane,
            from_plane,
            base_d,
        },
        contour,
    ))
}
