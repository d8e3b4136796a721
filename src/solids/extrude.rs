// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Straight extrusion of swept profiles
//!
//! Emits one lateral quad per profile edge plus two caps for area
//! profiles. When the conversion context carries pending openings, every
//! produced face is run through the opening generator before it is
//! appended, so walls come out with their holes already cut.

use super::{ConversionContext, ExtrudedSolid, ProfileKind};
use crate::mesh::PolyMesh;
use crate::openings::{generate_openings, Opening};
use log::{debug, warn};
use nalgebra::{Point3, Vector3};

pub(super) fn process_extruded_solid(
    solid: &ExtrudedSolid,
    result: &mut PolyMesh,
    ctx: &mut ConversionContext,
) {
    if solid.profile.points.len() <= 1 {
        return;
    }

    let mut profile: Vec<Point3<f64>> = solid.profile.points.clone();
    let size = profile.len();
    let has_area = solid.profile.kind == ProfileKind::Area && size > 2;

    if solid.depth < 1e-3 {
        // a degenerate extrusion is just the flat profile
        if has_area {
            result.push_face(&profile);
        }
        return;
    }

    // Move the profile into the target coordinate space; the extrusion
    // direction rotates along with the placement.
    for v in &mut profile {
        *v = solid.position.transform_point(v);
    }
    let dir: Vector3<f64> =
        solid.position.fixed_view::<3, 3>(0, 0) * (solid.direction * solid.depth);

    let openings_pending = ctx
        .apply_openings
        .as_ref()
        .is_some_and(|o| !o.is_empty());

    // Openings must be applied in spatial order or a door between two
    // windows would disturb the window merging. The reference point is the
    // minimum vertex of the transformed profile.
    let mut nors: Vec<Vector3<f64>> = Vec::new();
    if openings_pending {
        let base = Point3::from(
            profile
                .iter()
                .skip(1)
                .fold(profile[0].coords, |acc, p| acc.inf(&p.coords)),
        );

        if let Some(openings) = ctx.apply_openings.as_mut() {
            if !ctx.settings.use_custom_triangulation {
                openings.sort_by(|a, b| {
                    let da = (a.profile.center() - base).norm_squared();
                    let db = (b.profile.center() - base).norm_squared();
                    da.total_cmp(&db)
                });
            }
            nors = openings.iter().map(opening_profile_normal).collect();
        }
    }

    let mut temp = PolyMesh::new();
    let mut sides_with_openings = 0usize;
    for i in 0..size {
        let next = (i + 1) % size;

        let curmesh = if openings_pending { &mut temp } else { &mut *result };
        curmesh.push_face(&[profile[i], profile[i] + dir, profile[next] + dir, profile[next]]);

        if openings_pending {
            if let Some(openings) = ctx.apply_openings.as_mut() {
                if generate_openings(
                    openings,
                    &nors,
                    &mut temp,
                    ctx.settings.check_intersection,
                    ctx.settings.generate_connection_geometry,
                ) {
                    sides_with_openings += 1;
                }
            }
            result.append(&temp);
            temp.clear();
        }
    }

    let mut sides_with_v_openings = 0usize;
    if has_area {
        for n in 0..2 {
            let curmesh = if openings_pending { &mut temp } else { &mut *result };
            for i in (0..size).rev() {
                curmesh
                    .verts
                    .push(if n == 1 { profile[i] + dir } else { profile[i] });
            }
            curmesh.vertcnt.push(size as u32);

            if openings_pending {
                if let Some(openings) = ctx.apply_openings.as_mut() {
                    if generate_openings(
                        openings,
                        &nors,
                        &mut temp,
                        ctx.settings.check_intersection,
                        ctx.settings.generate_connection_geometry,
                    ) {
                        sides_with_v_openings += 1;
                    }
                }
                result.append(&temp);
                temp.clear();
            }
        }
    }

    // A wall pierced by a through opening resolves the hole on both of its
    // long faces; a prismatic solid on both caps. Anything else means some
    // opening topology went unresolved.
    if openings_pending && (sides_with_openings == 1 || sides_with_v_openings == 2) {
        warn!("failed to resolve all openings, presumably their topology is not supported");
    }

    debug!("generated mesh procedurally by extrusion");
}

/// Face normal of an opening profile, zero for degenerate profiles
pub(super) fn opening_profile_normal(opening: &Opening) -> Vector3<f64> {
    let verts = &opening.profile.verts;
    if verts.len() <= 2 {
        return Vector3::zeros();
    }
    (verts[2] - verts[0])
        .cross(&(verts[1] - verts[0]))
        .normalize()
}
