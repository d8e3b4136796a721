// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boolean difference of solids
//!
//! Two second-operand kinds are supported: half spaces, clipped per face
//! against the boundary plane, and extruded solids, which reduce to an
//! instance of the opening generator with the prism acting as a synthetic
//! opening. The first operand must already be polygonal, so it is either a
//! swept solid or another boolean difference.

use super::{extrude, revolve, ConversionContext, ExtrudedSolid, RevolvedSolid};
use crate::mesh::PolyMesh;
use crate::openings::{generate_openings, Opening};
use log::{debug, warn};
use nalgebra::{Point3, Vector3};

/// Infinite region on one side of a plane
#[derive(Debug, Clone)]
pub struct HalfSpace {
    /// A point on the boundary plane
    pub position: Point3<f64>,
    /// Plane normal; the kept side is where `(x - position) · normal > 0`
    pub normal: Vector3<f64>,
    /// When false, the agreement flag flips the kept side
    pub agreement: bool,
}

/// First operand of a boolean difference
#[derive(Debug, Clone)]
pub enum FirstOperand {
    Boolean(Box<BooleanSolid>),
    Extrusion(ExtrudedSolid),
    Revolution(RevolvedSolid),
}

/// Second operand of a boolean difference
#[derive(Debug, Clone)]
pub enum SecondOperand {
    HalfSpace(HalfSpace),
    Extrusion(ExtrudedSolid),
}

/// CSG difference of two operands
#[derive(Debug, Clone)]
pub struct BooleanSolid {
    pub first: FirstOperand,
    pub second: SecondOperand,
}

pub(super) fn process_boolean(
    solid: &BooleanSolid,
    result: &mut PolyMesh,
    ctx: &mut ConversionContext,
) {
    let mut first_operand = PolyMesh::new();
    match &solid.first {
        FirstOperand::Boolean(nested) => process_boolean(nested, &mut first_operand, ctx),
        FirstOperand::Extrusion(e) => extrude::process_extruded_solid(e, &mut first_operand, ctx),
        FirstOperand::Revolution(r) => revolve::process_revolved_solid(r, &mut first_operand),
    }

    match &solid.second {
        SecondOperand::HalfSpace(hs) => {
            process_half_space_difference(hs, result, &first_operand);
        }
        SecondOperand::Extrusion(prism) => {
            process_extruded_solid_difference(prism, result, &first_operand, ctx);
        }
    }
}

enum PlaneIntersect {
    No,
    LiesOnPlane,
    Yes(Point3<f64>),
}

fn intersect_segment_plane(
    p: &Point3<f64>,
    n: &Vector3<f64>,
    e0: &Point3<f64>,
    e1: &Point3<f64>,
) -> PlaneIntersect {
    let pdelta = e0 - p;
    let seg = e1 - e0;
    let dot_one = n.dot(&seg);
    let dot_two = -n.dot(&pdelta);

    if dot_one.abs() < 1e-6 {
        return if dot_two.abs() < 1e-6 {
            PlaneIntersect::LiesOnPlane
        } else {
            PlaneIntersect::No
        };
    }

    // t must be within the segment
    let t = dot_two / dot_one;
    if !(0.0..=1.0).contains(&t) {
        return PlaneIntersect::No;
    }
    PlaneIntersect::Yes(e0 + seg * t)
}

/// Clip every face of the operand against the half-space boundary plane
fn process_half_space_difference(
    hs: &HalfSpace,
    result: &mut PolyMesh,
    first_operand: &PolyMesh,
) {
    let p = hs.position;
    let mut n = hs.normal;
    if !hs.agreement {
        n = -n;
    }

    result.verts.reserve(first_operand.verts.len());
    result.vertcnt.reserve(first_operand.vertcnt.len());

    for face in first_operand.faces() {
        let old = result.verts.len();

        for i in 0..face.len() {
            let e0 = face[i];
            let e1 = face[(i + 1) % face.len()];

            match intersect_segment_plane(&p, &n, &e0, &e1) {
                PlaneIntersect::No | PlaneIntersect::LiesOnPlane => {
                    if (e0 - p).normalize().dot(&n) > 0.0 {
                        result.verts.push(e0);
                    }
                }
                PlaneIntersect::Yes(isect) => {
                    if (e0 - p).normalize().dot(&n) > 0.0 {
                        // e0 is on the kept side
                        result.verts.push(e0);
                        result.verts.push(isect);
                    } else {
                        // e0 is on the clipped side, keep the crossing only
                        result.verts.push(isect);
                    }
                }
            }
        }

        let mut newcount = result.verts.len() - old;
        if newcount == 0 {
            continue;
        }

        // Points on the intersection line come out twice, but float
        // precision rules out bitwise comparison; dedup with a tolerance
        // relative to the face extent.
        let mut vmin = result.verts[old].coords;
        let mut vmax = result.verts[old].coords;
        for v in &result.verts[old..] {
            vmin = vmin.inf(&v.coords);
            vmax = vmax.sup(&v.coords);
        }
        let eps_sq = (vmax - vmin).norm_squared() / 1e6;

        let mut deduped: Vec<Point3<f64>> = Vec::with_capacity(newcount);
        for v in &result.verts[old..] {
            if deduped
                .last()
                .map_or(true, |prev| (v - prev).norm_squared() >= eps_sq)
            {
                deduped.push(*v);
            }
        }
        if deduped.len() > 1 && (deduped[0] - deduped[deduped.len() - 1]).norm_squared() < eps_sq
        {
            deduped.pop();
        }

        result.verts.truncate(old);
        newcount = deduped.len();
        if newcount > 2 {
            result.verts.extend(deduped);
            result.vertcnt.push(newcount as u32);
        }
    }

    debug!("generated CSG geometry by plane clipping");
}

/// Subtract an extruded prism by reducing to the opening generator
///
/// This cannot handle arbitrarily complex cases; the first operand should
/// be near planar, which it usually is for building elements.
fn process_extruded_solid_difference(
    prism: &ExtrudedSolid,
    result: &mut PolyMesh,
    first_operand: &PolyMesh,
    ctx: &ConversionContext,
) {
    // the subtracted prism is meshed on its own, outside the openings or
    // collection state of the surrounding conversion
    let mut prism_ctx = ConversionContext::new(ctx.settings);
    let mut prism_mesh = PolyMesh::new();
    extrude::process_extruded_solid(prism, &mut prism_mesh, &mut prism_ctx);

    let mut openings = vec![Opening::new(prism_mesh, Vector3::zeros())];
    let nors = vec![Vector3::new(1.0, 0.0, 0.0)];

    let mut temp = PolyMesh::new();
    for face in first_operand.faces() {
        temp.clear();
        temp.push_face(face);

        // The producers sometimes spit out lines or other degenerates
        // which would trip the opening generator. The Newell normal's
        // length is the polygon area.
        let normal = temp.compute_last_polygon_normal(false);
        if normal.norm_squared() < 1e-5 {
            warn!("skipping degenerate polygon during solid difference");
            continue;
        }

        generate_openings(&mut openings, &nors, &mut temp, true, true);
        result.append(&temp);
    }

    debug!("generated CSG geometry by geometric difference to a solid");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solids::{ProfileKind, Settings, SweptProfile};
    use nalgebra::Matrix4;

    fn slab() -> ExtrudedSolid {
        ExtrudedSolid {
            profile: SweptProfile {
                points: vec![
                    Point3::new(0.0, 0.0, 0.0),
                    Point3::new(2.0, 0.0, 0.0),
                    Point3::new(2.0, 2.0, 0.0),
                    Point3::new(0.0, 2.0, 0.0),
                ],
                kind: ProfileKind::Area,
            },
            direction: Vector3::z(),
            depth: 1.0,
            position: Matrix4::identity(),
        }
    }

    #[test]
    fn test_half_space_clip_keeps_one_side() {
        let boolean = BooleanSolid {
            first: FirstOperand::Extrusion(slab()),
            // keep everything below z = 0.5
            second: SecondOperand::HalfSpace(HalfSpace {
                position: Point3::new(0.0, 0.0, 0.5),
                normal: Vector3::z(),
                agreement: false,
            }),
        };

        let mut ctx = ConversionContext::new(Settings::default());
        let mut mesh = PolyMesh::new();
        process_boolean(&boolean, &mut mesh, &mut ctx);

        assert!(!mesh.is_empty());
        for v in &mesh.verts {
            assert!(v.z <= 0.5 + 1e-9);
        }
    }

    #[test]
    fn test_half_space_drops_mesh_entirely() {
        let boolean = BooleanSolid {
            first: FirstOperand::Extrusion(slab()),
            // keep everything above z = 2, which is empty
            second: SecondOperand::HalfSpace(HalfSpace {
                position: Point3::new(0.0, 0.0, 2.0),
                normal: Vector3::z(),
                agreement: true,
            }),
        };

        let mut ctx = ConversionContext::new(Settings::default());
        let mut mesh = PolyMesh::new();
        process_boolean(&boolean, &mut mesh, &mut ctx);
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_prism_difference_cuts_hole() {
        // punch a 0.5 x 0.5 shaft through a flat 2 x 2 slab face
        let shaft = ExtrudedSolid {
            profile: SweptProfile {
                points: vec![
                    Point3::new(0.75, 0.75, -0.5),
                    Point3::new(1.25, 0.75, -0.5),
                    Point3::new(1.25, 1.25, -0.5),
                    Point3::new(0.75, 1.25, -0.5),
                ],
                kind: ProfileKind::Area,
            },
            direction: Vector3::z(),
            depth: 2.0,
            position: Matrix4::identity(),
        };

        let boolean = BooleanSolid {
            first: FirstOperand::Extrusion(slab()),
            second: SecondOperand::Extrusion(shaft),
        };

        let mut ctx = ConversionContext::new(Settings::default());
        let mut mesh = PolyMesh::new();
        process_boolean(&boolean, &mut mesh, &mut ctx);

        assert!(!mesh.is_empty());
        assert!(mesh.vertcnt.iter().all(|&c| c >= 3));
        // the caps alone would be 2 faces; the cut multiplies them
        assert!(mesh.face_count() > 6);
    }
}
