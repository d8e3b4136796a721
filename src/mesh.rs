// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon-soup mesh buffer
//!
//! Faces are stored as a flat vertex list plus a parallel list of per-face
//! vertex counts. This is the working representation for all procedural
//! producers; triangulation of n-gons is left to downstream consumers.

use nalgebra::{Matrix4, Point3, Vector3};

/// Faces whose Newell normal is shorter than this (squared) carry no
/// usable area and are dropped by [`PolyMesh::remove_degenerates`].
const DEGENERATE_NORMAL_EPS_SQ: f64 = 1e-5;

/// Relative squared-distance threshold for collapsing successive duplicate
/// vertices, scaled by the squared face diagonal.
const DUPLICATE_VERTEX_EPS_SQ: f64 = 1e-10;

/// Mesh of planar polygonal faces
///
/// Face `k` owns the vertex slice `[sum(vertcnt[..k]), sum(vertcnt[..=k]))`.
/// The sum of `vertcnt` always equals `verts.len()`.
#[derive(Debug, Clone, Default)]
pub struct PolyMesh {
    /// Vertex positions, all faces appended back to back
    pub verts: Vec<Point3<f64>>,
    /// Number of vertices per face
    pub vertcnt: Vec<u32>,
}

impl PolyMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            verts: Vec::new(),
            vertcnt: Vec::new(),
        }
    }

    /// Check if the mesh has no faces
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.verts.is_empty()
    }

    /// Number of faces
    #[inline]
    pub fn face_count(&self) -> usize {
        self.vertcnt.len()
    }

    /// Remove all faces
    #[inline]
    pub fn clear(&mut self) {
        self.verts.clear();
        self.vertcnt.clear();
    }

    /// Append all faces of another mesh
    #[inline]
    pub fn append(&mut self, other: &PolyMesh) {
        self.verts.extend_from_slice(&other.verts);
        self.vertcnt.extend_from_slice(&other.vertcnt);
    }

    /// Push a single face from a vertex slice
    pub fn push_face(&mut self, face: &[Point3<f64>]) {
        self.verts.extend_from_slice(face);
        self.vertcnt.push(face.len() as u32);
    }

    /// Transform all vertices by a homogeneous matrix
    pub fn transform(&mut self, m: &Matrix4<f64>) {
        for v in &mut self.verts {
            *v = m.transform_point(v);
        }
    }

    /// Average of all vertex positions
    pub fn center(&self) -> Point3<f64> {
        if self.verts.is_empty() {
            return Point3::origin();
        }
        let mut sum = Vector3::zeros();
        for v in &self.verts {
            sum += v.coords;
        }
        Point3::from(sum / self.verts.len() as f64)
    }

    /// Iterate over faces as vertex slices
    pub fn faces(&self) -> impl Iterator<Item = &[Point3<f64>]> {
        FaceIter {
            verts: &self.verts,
            vertcnt: &self.vertcnt,
            face: 0,
            offset: 0,
        }
    }

    /// Reverse the winding of face `i`
    pub fn reverse_face(&mut self, i: usize) {
        let start: usize = self.vertcnt[..i].iter().map(|&c| c as usize).sum();
        let end = start + self.vertcnt[i] as usize;
        self.verts[start..end].reverse();
    }

    /// Newell normal of a polygon; its length equals twice the polygon area
    pub fn newell_normal(face: &[Point3<f64>]) -> Vector3<f64> {
        let mut n = Vector3::zeros();
        for i in 0..face.len() {
            let a = &face[i];
            let b = &face[(i + 1) % face.len()];
            n.x += (a.y - b.y) * (a.z + b.z);
            n.y += (a.z - b.z) * (a.x + b.x);
            n.z += (a.x - b.x) * (a.y + b.y);
        }
        n
    }

    /// Compute one Newell normal per face
    ///
    /// Unnormalized normals carry the polygon area in their length, which
    /// is what the outer-bound selection in face-set processing relies on.
    pub fn compute_polygon_normals(&self, normalize: bool) -> Vec<Vector3<f64>> {
        let mut normals = Vec::with_capacity(self.vertcnt.len());
        for face in self.faces() {
            let n = Self::newell_normal(face);
            normals.push(if normalize { n.normalize() } else { n });
        }
        normals
    }

    /// Newell normal of the most recently appended face
    pub fn compute_last_polygon_normal(&self, normalize: bool) -> Vector3<f64> {
        let Some(&last) = self.vertcnt.last() else {
            return Vector3::zeros();
        };
        let start = self.verts.len() - last as usize;
        let n = Self::newell_normal(&self.verts[start..]);
        if normalize {
            n.normalize()
        } else {
            n
        }
    }

    /// Collapse successive duplicate vertices within each face
    ///
    /// The tolerance is relative to the face diagonal so that the pass
    /// behaves identically across coordinate scales. The wrap-around pair
    /// (last vertex equal to the first) is collapsed as well.
    pub fn remove_adjacent_duplicates(&mut self) {
        let mut new_verts: Vec<Point3<f64>> = Vec::with_capacity(self.verts.len());
        let mut new_vertcnt = Vec::with_capacity(self.vertcnt.len());

        let mut offset = 0usize;
        for &cnt in &self.vertcnt {
            let face = &self.verts[offset..offset + cnt as usize];
            offset += cnt as usize;

            let eps_sq = face_diag_sq(face) * DUPLICATE_VERTEX_EPS_SQ;

            let start = new_verts.len();
            for v in face {
                if let Some(prev) = new_verts.last() {
                    if new_verts.len() > start && ((*v) - *prev).norm_squared() < eps_sq {
                        continue;
                    }
                }
                new_verts.push(*v);
            }
            // wrap-around duplicate
            while new_verts.len() - start > 1 {
                let first = new_verts[start];
                let last = new_verts[new_verts.len() - 1];
                if (last - first).norm_squared() < eps_sq {
                    new_verts.pop();
                } else {
                    break;
                }
            }

            let kept = new_verts.len() - start;
            if kept > 0 {
                new_vertcnt.push(kept as u32);
            }
        }

        self.verts = new_verts;
        self.vertcnt = new_vertcnt;
    }

    /// Drop faces with fewer than three vertices or with near-zero area
    pub fn remove_degenerates(&mut self) {
        let mut new_verts = Vec::with_capacity(self.verts.len());
        let mut new_vertcnt = Vec::with_capacity(self.vertcnt.len());

        let mut offset = 0usize;
        for &cnt in &self.vertcnt {
            let face = &self.verts[offset..offset + cnt as usize];
            offset += cnt as usize;

            if cnt < 3 || Self::newell_normal(face).norm_squared() < DEGENERATE_NORMAL_EPS_SQ {
                continue;
            }
            new_verts.extend_from_slice(face);
            new_vertcnt.push(cnt);
        }

        self.verts = new_verts;
        self.vertcnt = new_vertcnt;
    }
}

/// Squared diagonal of the axis-aligned bounding box of a face
fn face_diag_sq(face: &[Point3<f64>]) -> f64 {
    if face.is_empty() {
        return 0.0;
    }
    let mut min = face[0].coords;
    let mut max = face[0].coords;
    for v in face.iter().skip(1) {
        min = min.inf(&v.coords);
        max = max.sup(&v.coords);
    }
    (max - min).norm_squared()
}

struct FaceIter<'a> {
    verts: &'a [Point3<f64>],
    vertcnt: &'a [u32],
    face: usize,
    offset: usize,
}

impl<'a> Iterator for FaceIter<'a> {
    type Item = &'a [Point3<f64>];

    fn next(&mut self) -> Option<Self::Item> {
        let cnt = *self.vertcnt.get(self.face)? as usize;
        let slice = &self.verts[self.offset..self.offset + cnt];
        self.face += 1;
        self.offset += cnt;
        Some(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_quad() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_vertcnt_matches_verts() {
        let mut mesh = PolyMesh::new();
        mesh.push_face(&unit_quad());
        mesh.push_face(&unit_quad()[..3]);
        let total: usize = mesh.vertcnt.iter().map(|&c| c as usize).sum();
        assert_eq!(total, mesh.verts.len());
    }

    #[test]
    fn test_newell_normal_area() {
        // Newell normal length equals twice the face area
        let n = PolyMesh::newell_normal(&unit_quad());
        assert!((n.norm() - 2.0).abs() < 1e-12);
        assert!((n.z.abs() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_remove_adjacent_duplicates() {
        let mut mesh = PolyMesh::new();
        let mut face = unit_quad();
        face.insert(1, Point3::new(1e-9, 1e-9, 0.0));
        face.push(Point3::new(0.0, 0.0, 0.0)); // wrap-around duplicate
        mesh.push_face(&face);

        mesh.remove_adjacent_duplicates();
        assert_eq!(mesh.vertcnt, vec![4]);

        // no successive pair closer than the relative tolerance remains
        let face: Vec<_> = mesh.faces().next().unwrap().to_vec();
        for i in 0..face.len() {
            let d = (face[(i + 1) % face.len()] - face[i]).norm_squared();
            assert!(d > 1e-10);
        }
    }

    #[test]
    fn test_remove_degenerates() {
        let mut mesh = PolyMesh::new();
        mesh.push_face(&unit_quad());
        // a sliver with almost no area
        mesh.push_face(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1e-8, 0.0),
        ]);
        // a two-point scratch face
        mesh.push_face(&unit_quad()[..2]);

        mesh.remove_degenerates();
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.vertcnt, vec![4]);
    }

    #[test]
    fn test_reverse_face() {
        let mut mesh = PolyMesh::new();
        mesh.push_face(&unit_quad());
        let before = PolyMesh::newell_normal(&mesh.verts);
        mesh.reverse_face(0);
        let after = PolyMesh::newell_normal(&mesh.verts);
        assert!((before.z + after.z).abs() < 1e-12);
    }

    #[test]
    fn test_transform_and_center() {
        let mut mesh = PolyMesh::new();
        mesh.push_face(&unit_quad());
        let m = Matrix4::new_translation(&Vector3::new(10.0, 0.0, 0.0));
        mesh.transform(&m);
        let c = mesh.center();
        assert!((c.x - 10.5).abs() < 1e-12);
        assert!((c.y - 0.5).abs() < 1e-12);
    }
}
