// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Driver-level opening generation scenarios
//!
//! Each test drives `generate_openings` on a small wall and checks the
//! resulting polygon layout. The wall is a 1m x 3m face in the XZ plane;
//! openings are swept through it along +Y.

use ifc_meshgen::{generate_openings, Opening, Point3, PolyMesh, Vector3};

/// 1m x 3m wall face in the XZ plane
fn wall_face() -> PolyMesh {
    let mut mesh = PolyMesh::new();
    mesh.push_face(&[
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 3.0),
        Point3::new(0.0, 0.0, 3.0),
    ]);
    mesh
}

/// The wall face on the other side of a 0.2m thick wall
fn back_face() -> PolyMesh {
    let mut mesh = wall_face();
    for v in &mut mesh.verts {
        v.y = 0.2;
    }
    mesh.reverse_face(0);
    mesh
}

/// Rectangular opening prism piercing the wall: the two faces parallel to
/// the wall sit at y = -0.1 and y = 0.3, straddling both wall planes
fn rect_opening(x0: f64, z0: f64, x1: f64, z1: f64) -> Opening {
    let mut profile = PolyMesh::new();
    for y in [-0.1, 0.3] {
        profile.push_face(&[
            Point3::new(x0, y, z0),
            Point3::new(x1, y, z0),
            Point3::new(x1, y, z1),
            Point3::new(x0, y, z1),
        ]);
    }
    Opening::new(profile, Vector3::new(0.0, 0.2, 0.0))
}

fn profile_normal(opening: &Opening) -> Vector3<f64> {
    let v = &opening.profile.verts;
    if v.len() <= 2 {
        return Vector3::zeros();
    }
    (v[2] - v[0]).cross(&(v[1] - v[0])).normalize()
}

fn normals_of(openings: &[Opening]) -> Vec<Vector3<f64>> {
    openings.iter().map(profile_normal).collect()
}

fn face_area(face: &[Point3<f64>]) -> f64 {
    PolyMesh::newell_normal(face).norm() * 0.5
}

fn total_area(mesh: &PolyMesh) -> f64 {
    mesh.faces().map(face_area).sum()
}

fn check_mesh_invariants(mesh: &PolyMesh) {
    // vertex counts partition the vertex list
    let total: usize = mesh.vertcnt.iter().map(|&c| c as usize).sum();
    assert_eq!(total, mesh.verts.len());
    // no degenerate faces
    assert!(mesh.vertcnt.iter().all(|&c| c >= 3));
    // faces are planar to a tolerance proportional to their diagonal
    for face in mesh.faces() {
        let n = PolyMesh::newell_normal(face);
        if n.norm_squared() < 1e-12 {
            continue;
        }
        let n = n.normalize();
        let d = -face[0].coords.dot(&n);
        let mut diag: f64 = 0.0;
        for a in face {
            for b in face {
                diag = diag.max((a - b).norm());
            }
        }
        for v in face {
            assert!((v.coords.dot(&n) + d).abs() < 1e-6 * diag.max(1.0));
        }
    }
}

/// Faces connecting the y = 0 plane with the y = 0.2 plane
fn count_jambs(mesh: &PolyMesh) -> usize {
    mesh.faces()
        .filter(|f| {
            f.len() == 4
                && f.iter().filter(|v| v.y.abs() < 1e-6).count() == 2
                && f.iter().filter(|v| (v.y - 0.2).abs() < 1e-6).count() == 2
        })
        .count()
}

// S1: a solid wall without openings stays a single unmodified face
#[test]
fn solid_wall_without_openings() {
    let mut mesh = wall_face();
    let before = mesh.verts.clone();

    let ok = generate_openings(&mut [], &[], &mut mesh, true, true);
    assert!(!ok);
    assert_eq!(mesh.verts, before);
    assert_eq!(mesh.vertcnt, vec![4]);
}

// S2: a centered rectangular window tiles the wall into four quads
#[test]
fn centered_window_four_quads() {
    let mut mesh = wall_face();
    let mut openings = vec![rect_opening(0.3, 1.0, 0.7, 2.0)];
    let nors = normals_of(&openings);

    let ok = generate_openings(&mut openings, &nors, &mut mesh, true, true);
    assert!(ok);
    check_mesh_invariants(&mesh);

    assert_eq!(mesh.face_count(), 4);
    assert!((total_area(&mesh) - (3.0 - 0.4)).abs() < 1e-3);

    // the hole is exactly the opening rectangle: no vertex falls inside
    for face in mesh.faces() {
        for v in face {
            let inside = v.x > 0.3 + 1e-6
                && v.x < 0.7 - 1e-6
                && v.z > 1.0 + 1e-6
                && v.z < 2.0 - 1e-6;
            assert!(!inside, "vertex {v} lies inside the hole");
        }
    }
}

// S2 continued: processing the opposite wall face closes the jambs
#[test]
fn window_jambs_close_between_faces() {
    let mut openings = vec![rect_opening(0.3, 1.0, 0.7, 2.0)];
    let nors = normals_of(&openings);

    let mut front = wall_face();
    assert!(generate_openings(&mut openings, &nors, &mut front, true, true));
    assert_eq!(openings[0].wall_points.len(), 4);

    let mut back = back_face();
    assert!(generate_openings(&mut openings, &nors, &mut back, true, true));
    check_mesh_invariants(&back);

    // four jamb quads spanning the 0.2m wall thickness, each linking two
    // points of this face with two stored points of the other
    let jambs: Vec<_> = back
        .faces()
        .filter(|f| {
            f.iter().any(|v| v.y.abs() < 1e-6) && f.iter().any(|v| (v.y - 0.2).abs() < 1e-6)
        })
        .collect();
    assert_eq!(jambs.len(), 4);
    for jamb in &jambs {
        assert_eq!(jamb.len(), 4);
        assert_eq!(jamb.iter().filter(|v| v.y.abs() < 1e-6).count(), 2);
        assert_eq!(jamb.iter().filter(|v| (v.y - 0.2).abs() < 1e-6).count(), 2);
    }
}

// S3: a door touching the floor produces three quads and no threshold jamb
#[test]
fn door_three_quads_no_threshold() {
    let mut openings = vec![rect_opening(0.4, 0.0, 0.6, 2.0)];
    let nors = normals_of(&openings);

    let mut front = wall_face();
    assert!(generate_openings(&mut openings, &nors, &mut front, true, true));
    check_mesh_invariants(&front);
    assert_eq!(front.face_count(), 3);
    assert!((total_area(&front) - (3.0 - 0.4)).abs() < 1e-3);

    // opposite face: the bottom edge lies on the wall outline, so only
    // three jambs (left, right, top) are emitted
    let mut back = back_face();
    assert!(generate_openings(&mut openings, &nors, &mut back, true, true));
    assert_eq!(count_jambs(&back), 3);
}

// S4: two overlapping windows merge into a single contour carrying both
// openings
#[test]
fn overlapping_windows_merge() {
    let mut mesh = wall_face();
    // the second window overlaps the first and sticks out to +x and +z
    let mut openings = vec![
        rect_opening(0.2, 1.0, 0.5, 2.0),
        rect_opening(0.4, 1.2, 0.7, 2.4),
    ];
    let nors = normals_of(&openings);

    let ok = generate_openings(&mut openings, &nors, &mut mesh, true, true);
    assert!(ok);
    check_mesh_invariants(&mesh);

    // hole area is the union of both rectangles
    let union_area = 0.3 * 1.0 + 0.3 * 1.2 - 0.1 * 0.8;
    assert!((total_area(&mesh) - (3.0 - union_area)).abs() < 1e-3);

    // both openings ended up in the merged contour's opening set: they
    // receive the identical stored contour for the later jamb pass
    assert!(!openings[0].wall_points.is_empty());
    assert_eq!(openings[0].wall_points.len(), openings[1].wall_points.len());
    for (a, b) in openings[0]
        .wall_points
        .iter()
        .zip(openings[1].wall_points.iter())
    {
        assert!((a - b).norm() < 1e-12);
    }
}

// Overlapping bounding boxes whose contours become disjoint after
// subtraction stay separate contours; the hole region is preserved
#[test]
fn overlap_resolved_by_subtraction() {
    let mut mesh = wall_face();
    let mut openings = vec![
        rect_opening(0.2, 1.0, 0.5, 2.0),
        rect_opening(0.4, 1.2, 0.7, 1.8),
    ];
    let nors = normals_of(&openings);

    assert!(generate_openings(&mut openings, &nors, &mut mesh, true, true));
    check_mesh_invariants(&mesh);

    // hole region is still the union of the rectangles, split into the
    // first rectangle and the clipped remainder of the second
    let union_area = 0.3 * 1.0 + (0.7 - 0.5) * 0.6;
    assert!((total_area(&mesh) - (3.0 - union_area)).abs() < 1e-3);

    // each opening keeps its own contour
    assert_eq!(openings[0].wall_points.len(), 4);
    assert_eq!(openings[1].wall_points.len(), 4);
}

// S5: overlapping bounding boxes with a disjoint union fall back to
// plain triangulation with both holes present
#[test]
fn disjoint_union_triggers_triangulation_fallback() {
    let mut mesh = wall_face();
    // boxes overlap, the polygons do not: a rectangle plus a triangle
    // tucked into the rectangle's bounding-box corner
    let mut tri_profile = PolyMesh::new();
    tri_profile.push_face(&[
        Point3::new(0.9, 0.0, 1.0),
        Point3::new(0.9, 0.0, 2.2),
        Point3::new(0.55, 0.0, 2.2),
    ]);
    let mut openings = vec![
        rect_opening(0.2, 0.4, 0.6, 1.6),
        Opening::new(tri_profile, Vector3::new(0.0, 0.2, 0.0)),
    ];
    let nors = normals_of(&openings);

    let ok = generate_openings(&mut openings, &nors, &mut mesh, true, true);
    assert!(ok);
    check_mesh_invariants(&mesh);

    // the fallback emits triangles only
    assert!(mesh.vertcnt.iter().all(|&c| c == 3));

    // wall minus both holes
    let tri_area = 0.5 * 0.35 * 1.2;
    let expected = 3.0 - 0.4 * 1.2 - tri_area;
    assert!((total_area(&mesh) - expected).abs() < 1e-2);
}

// S6: an opening whose profile plane is perpendicular to the wall is
// skipped and the wall face stays unmodified
#[test]
fn sideways_opening_is_skipped() {
    let mut mesh = wall_face();
    let before = mesh.verts.clone();

    // profile in the YZ plane: its normal is orthogonal to the wall normal
    let mut profile = PolyMesh::new();
    profile.push_face(&[
        Point3::new(0.5, -0.1, 1.0),
        Point3::new(0.5, 0.3, 1.0),
        Point3::new(0.5, 0.3, 2.0),
        Point3::new(0.5, -0.1, 2.0),
    ]);
    let mut openings = vec![Opening::new(profile, Vector3::new(0.2, 0.0, 0.0))];
    let nors = normals_of(&openings);

    let ok = generate_openings(&mut openings, &nors, &mut mesh, true, true);
    assert!(!ok);
    assert_eq!(mesh.verts, before);
}

// an opening prism entirely in front of the wall plane is skipped by the
// intersection check
#[test]
fn non_straddling_opening_is_skipped() {
    let mut mesh = wall_face();
    let before = mesh.verts.clone();

    let mut opening = rect_opening(0.3, 1.0, 0.7, 2.0);
    for v in &mut opening.profile.verts {
        v.y += 1.0;
    }
    let mut openings = vec![opening];
    let nors = normals_of(&openings);

    let ok = generate_openings(&mut openings, &nors, &mut mesh, true, true);
    assert!(!ok);
    assert_eq!(mesh.verts, before);
}

// a duplicate opening is dropped without disturbing the first
#[test]
fn duplicate_opening_is_ignored() {
    let mut mesh = wall_face();
    let mut openings = vec![
        rect_opening(0.3, 1.0, 0.7, 2.0),
        rect_opening(0.3, 1.0, 0.7, 2.0),
    ];
    let nors = normals_of(&openings);

    assert!(generate_openings(&mut openings, &nors, &mut mesh, true, true));
    assert_eq!(mesh.face_count(), 4);
    assert!((total_area(&mesh) - (3.0 - 0.4)).abs() < 1e-3);
}
