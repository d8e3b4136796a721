// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Radial extrusion of swept profiles
//!
//! Rotates the profile ring around the revolution axis in fixed angular
//! steps, emitting one lateral quad per profile edge and step. Area
//! profiles that do not sweep the full circle additionally get the start
//! and end rings as caps.

use super::{ProfileKind, RevolvedSolid};
use crate::mesh::PolyMesh;
use log::debug;
use nalgebra::{Matrix4, Point3, Rotation3, Unit};
use std::f64::consts::{FRAC_PI_2, TAU};

pub(super) fn process_revolved_solid(solid: &RevolvedSolid, result: &mut PolyMesh) {
    let profile = &solid.profile.points;
    if profile.len() <= 1 {
        return;
    }
    let size = profile.len();

    let mut has_area = solid.profile.kind == ProfileKind::Area && size > 2;
    let max_angle = solid.angle;
    if max_angle.abs() < 1e-3 {
        if has_area {
            result.push_face(profile);
        }
        return;
    }

    let cnt_segments = 2u32.max((16.0 * max_angle.abs() / FRAC_PI_2) as u32);
    let delta = max_angle / cnt_segments as f64;

    has_area = has_area && max_angle.abs() < TAU * 0.99;

    result
        .verts
        .reserve(size * (cnt_segments as usize * 4 + if has_area { 2 } else { 0 }));
    result
        .vertcnt
        .reserve(size * cnt_segments as usize + 2);

    let axis = Unit::new_normalize(solid.axis);
    let rot = Matrix4::new_translation(&solid.axis_origin.coords)
        * Rotation3::from_axis_angle(&axis, delta).to_homogeneous()
        * Matrix4::new_translation(&-solid.axis_origin.coords);

    let mut ring: Vec<Point3<f64>> = profile.clone();
    for _ in 0..cnt_segments {
        let next_ring: Vec<Point3<f64>> = ring.iter().map(|p| rot.transform_point(p)).collect();
        for i in 0..size {
            let next = (i + 1) % size;
            result.push_face(&[ring[i], ring[next], next_ring[next], next_ring[i]]);
        }
        ring = next_ring;
    }

    if has_area {
        // end ring reversed, start ring forward; the downstream
        // orientation fixup settles which one faces outward
        let mut end_cap = ring;
        end_cap.reverse();
        result.push_face(&end_cap);
        result.push_face(profile);
    }

    result.transform(&solid.position);
    debug!("generated mesh procedurally by radial extrusion");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solids::SweptProfile;
    use nalgebra::Vector3;

    fn l_profile() -> SweptProfile {
        SweptProfile {
            points: vec![
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 1.0),
                Point3::new(1.0, 0.0, 1.0),
            ],
            kind: ProfileKind::Area,
        }
    }

    fn revolution(angle: f64) -> RevolvedSolid {
        RevolvedSolid {
            profile: l_profile(),
            axis: Vector3::z(),
            axis_origin: Point3::origin(),
            angle,
            position: Matrix4::identity(),
        }
    }

    #[test]
    fn test_quarter_revolution_has_caps() {
        let mut mesh = PolyMesh::new();
        process_revolved_solid(&revolution(FRAC_PI_2), &mut mesh);

        // 16 segments per quarter circle, 4 profile edges, plus 2 caps
        assert_eq!(mesh.face_count(), 16 * 4 + 2);
        assert_eq!(*mesh.vertcnt.last().unwrap(), 4);
    }

    #[test]
    fn test_full_revolution_has_no_caps() {
        let mut mesh = PolyMesh::new();
        process_revolved_solid(&revolution(TAU), &mut mesh);

        assert!(mesh.vertcnt.iter().all(|&c| c == 4));
        assert_eq!(mesh.face_count() % 4, 0);

        // the seam ring returns to the start ring
        let first = mesh.verts[0];
        assert!((first - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_near_zero_angle_emits_profile() {
        let mut mesh = PolyMesh::new();
        process_revolved_solid(&revolution(1e-4), &mut mesh);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.vertcnt, vec![4]);
    }
}
