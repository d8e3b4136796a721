// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Disk sweeps along sampled curves
//!
//! Generates a ring of points per curve sample, oriented by the local
//! tangent, and stitches consecutive rings with quads. Rings are aligned
//! by the nearest-point offset so the tube does not twist at sharp turns.

use super::SweptDiskSolid;
use crate::mesh::PolyMesh;
use log::{debug, warn};
use nalgebra::{Point3, Rotation3, Unit, Vector3};
use std::f64::consts::TAU;

const CNT_SEGMENTS: usize = 16;

pub(super) fn process_swept_disk(solid: &SweptDiskSolid, result: &mut PolyMesh) {
    let curve_points = &solid.directrix;
    let samples = curve_points.len();
    if samples < 2 {
        warn!("curve evaluation yielded no usable points for the swept disk");
        return;
    }

    let delta_angle = TAU / CNT_SEGMENTS as f64;

    result.verts.reserve(CNT_SEGMENTS * samples * 4);
    result.vertcnt.reserve((samples - 1) * CNT_SEGMENTS);

    let mut points: Vec<Point3<f64>> = Vec::with_capacity(CNT_SEGMENTS * samples);

    let mut current = curve_points[0];
    let mut previous = current;
    let mut next = current;

    // seed for the ring construction; carried between samples so
    // consecutive rings start out roughly aligned
    let mut startvec = Vector3::new(1.0, 1.0, 1.0);
    let mut last_dir = 0u8;

    // generate circles at the sweep positions
    for i in 0..samples {
        if i != samples - 1 {
            next = curve_points[i + 1];
        }

        // direction vector reflecting the approximate curvature
        let d = ((current - previous) + (next - previous)).normalize();

        // find q with (p-q)·d = 0, preferring the axis used last time so
        // the seed changes smoothly along the curve
        let mut q = Vector3::zeros();
        let mut take_any = false;
        for _ in 0..2 {
            if (last_dir == 0 || take_any) && d.x.abs() > 1e-6 {
                q.y = startvec.y;
                q.z = startvec.z;
                q.x = -(d.y * q.y + d.z * q.z) / d.x;
                last_dir = 0;
                break;
            } else if (last_dir == 1 || take_any) && d.y.abs() > 1e-6 {
                q.x = startvec.x;
                q.z = startvec.z;
                q.y = -(d.x * q.x + d.z * q.z) / d.y;
                last_dir = 1;
                break;
            } else if (last_dir == 2 && d.z.abs() > 1e-6) || take_any {
                q.y = startvec.y;
                q.x = startvec.x;
                q.z = -(d.y * q.y + d.x * q.x) / d.z;
                last_dir = 2;
                break;
            }
            take_any = true;
        }

        q *= solid.radius / q.norm();
        startvec = q;

        let rot = Rotation3::from_axis_angle(&Unit::new_normalize(d), delta_angle);
        for _ in 0..CNT_SEGMENTS {
            points.push(current + q);
            q = rot * q;
        }

        previous = current;
        current = next;
    }

    // stitch the rings with quads
    for i in 0..samples - 1 {
        let this_start = points[i * CNT_SEGMENTS];

        // locate the corresponding point on the next ring
        let mut best_pair_offset = 0;
        let mut best_distance_squared = f64::MAX;
        for seg in 0..CNT_SEGMENTS {
            let p = points[(i + 1) * CNT_SEGMENTS + seg];
            let l = (p - this_start).norm_squared();
            if l < best_distance_squared {
                best_pair_offset = seg;
                best_distance_squared = l;
            }
        }

        for seg in 0..CNT_SEGMENTS {
            let mut quad = [
                points[i * CNT_SEGMENTS + seg],
                points[i * CNT_SEGMENTS + (seg + 1) % CNT_SEGMENTS],
                points[(i + 1) * CNT_SEGMENTS + (seg + 1 + best_pair_offset) % CNT_SEGMENTS],
                points[(i + 1) * CNT_SEGMENTS + (seg + best_pair_offset) % CNT_SEGMENTS],
            ];

            // keep the quad facing away from the tube center
            let n = (quad[0] - quad[1]).cross(&(quad[0] - quad[3]));
            if n.dot(&(quad[0] - curve_points[i])) < 0.0 {
                quad.swap(0, 3);
                quad.swap(1, 2);
            }

            result.push_face(&quad);
        }
    }

    debug!("generated mesh procedurally by sweeping a disk along a curve");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_tube() {
        let solid = SweptDiskSolid {
            directrix: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(0.0, 0.0, 2.0),
            ],
            radius: 0.1,
        };
        let mut mesh = PolyMesh::new();
        process_swept_disk(&solid, &mut mesh);

        assert_eq!(mesh.face_count(), 2 * CNT_SEGMENTS);
        assert!(mesh.vertcnt.iter().all(|&c| c == 4));

        // all ring points sit on the tube surface
        for v in &mesh.verts {
            let r = (v.x * v.x + v.y * v.y).sqrt();
            assert!((r - 0.1).abs() < 1e-9);
        }
    }

    #[test]
    fn test_bent_tube_keeps_radius() {
        let solid = SweptDiskSolid {
            directrix: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
            radius: 0.05,
        };
        let mut mesh = PolyMesh::new();
        process_swept_disk(&solid, &mut mesh);
        assert_eq!(mesh.face_count(), 2 * CNT_SEGMENTS);
    }

    #[test]
    fn test_too_few_samples() {
        let solid = SweptDiskSolid {
            directrix: vec![Point3::new(0.0, 0.0, 0.0)],
            radius: 0.1,
        };
        let mut mesh = PolyMesh::new();
        process_swept_disk(&solid, &mut mesh);
        assert!(mesh.is_empty());
    }
}
