// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Projected opening contours and their bookkeeping
//!
//! A contour is the 2D silhouette of one opening (or of several openings
//! merged together) on the wall plane, paired with its axis-aligned
//! bounding box. The bounding box drives the quadrify tiling; the contour
//! itself is reinjected afterwards.

use crate::clip::{self, ExPolygon};
use crate::mesh::PolyMesh;
use log::error;
use nalgebra::{Point2, Point3};

/// Squared distance under which two projected vertices count as the same
const DUPLICATE_EPS_SQ: f64 = 1e-10;

/// Axis-aligned box in projected plane space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds2 {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl Bounds2 {
    /// Empty box ready to absorb points
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::MAX, f64::MAX),
            max: Point2::new(f64::MIN, f64::MIN),
        }
    }

    /// Grow to include a point
    #[inline]
    pub fn extend(&mut self, p: &Point2<f64>) {
        self.min = Point2::from(self.min.coords.inf(&p.coords));
        self.max = Point2::from(self.max.coords.sup(&p.coords));
    }

    /// Smallest box containing both
    pub fn union(&self, other: &Bounds2) -> Bounds2 {
        Bounds2 {
            min: Point2::from(self.min.coords.inf(&other.min.coords)),
            max: Point2::from(self.max.coords.sup(&other.max.coords)),
        }
    }

    /// Strict overlap test; boxes that merely touch count as adjacent
    pub fn overlaps(&self, other: &Bounds2) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    #[inline]
    pub fn area(&self) -> f64 {
        (self.max.x - self.min.x).abs() * (self.max.y - self.min.y).abs()
    }

    #[inline]
    pub fn diagonal(&self) -> f64 {
        (self.max - self.min).norm()
    }
}

/// Silhouette of one or more openings on the wall plane
#[derive(Debug, Clone)]
pub struct ProjectedContour {
    /// Contour vertices in `[0,1]²`; empty marks the contour invalid
    pub contour: Vec<Point2<f64>>,
    /// Bounding box used by the quadrify tiler
    pub bb: Bounds2,
}

impl ProjectedContour {
    pub fn new(contour: Vec<Point2<f64>>, bb: Bounds2) -> Self {
        Self { contour, bb }
    }

    #[inline]
    pub fn is_invalid(&self) -> bool {
        self.contour.is_empty()
    }

    pub fn flag_invalid(&mut self) {
        self.contour.clear();
    }
}

/// Check a projected vertex against the contour gathered so far
pub fn is_duplicate_vertex(vv: &Point2<f64>, contour: &[Point2<f64>]) -> bool {
    contour
        .iter()
        .any(|cp| (cp - vv).norm_squared() < DUPLICATE_EPS_SQ)
}

/// Copy a clipper contour back into plane space, clamped to the unit square
pub fn extract_vertices(poly: &[Point2<f64>], filter_duplicates: bool) -> Vec<Point2<f64>> {
    let mut out = Vec::with_capacity(poly.len());
    for p in poly {
        let vv = Point2::new(p.x.clamp(0.0, 1.0), p.y.clamp(0.0, 1.0));
        if !filter_duplicates || !is_duplicate_vertex(&vv, &out) {
            out.push(vv);
        }
    }
    out
}

/// Bounding box of a clipper contour, clamped to the unit square
pub fn contour_bounds(poly: &[Point2<f64>]) -> Bounds2 {
    let mut bb = Bounds2::empty();
    for p in poly {
        bb.extend(&Point2::new(p.x.clamp(0.0, 1.0), p.y.clamp(0.0, 1.0)));
    }
    bb
}

/// Union of two opening silhouettes
pub fn merge_window_contours(
    a: &[Point2<f64>],
    b: &[Point2<f64>],
) -> crate::Result<Vec<ExPolygon>> {
    clip::merge(a, b)
}

/// Subtract contour `a` from contour `b`
pub fn make_disjoint_window_contours(
    a: &[Point2<f64>],
    b: &[Point2<f64>],
) -> crate::Result<Vec<ExPolygon>> {
    clip::subtract(a, b)
}

/// Sanity pass over the merged window contours
///
/// A self-union must yield exactly one polygon; contours that dissolve
/// entirely are flagged invalid so the later phases skip them, contours
/// that split are kept as-is (their first part is what the tiler already
/// accounted for) and reported.
pub fn validate_window_contours(contours: &mut [ProjectedContour]) {
    for window in contours.iter_mut() {
        if window.is_invalid() {
            continue;
        }
        match clip::union_all(std::slice::from_ref(&window.contour)) {
            Ok(clipped) => {
                if clipped.is_empty() {
                    error!("window contour is degenerate, dropping it");
                    window.flag_invalid();
                } else if clipped.len() != 1 {
                    error!("window contour is not simply connected, shape may be wrong");
                }
            }
            Err(e) => {
                error!("error during polygon clipping, window shape may be wrong: {e}");
            }
        }
    }
}

/// Clip every face of the tiled mesh against the real outer contour
///
/// The quadrify output always spans the whole unit square; this cuts it
/// back to the actual wall outline. Intersection holes cannot occur for
/// the convex quads the tiler emits and are discarded.
pub fn cleanup_outer_contour(contour_flat: &[Point2<f64>], curmesh: &mut PolyMesh) {
    let mut vold: Vec<Point3<f64>> = Vec::with_capacity(curmesh.verts.len());
    let mut iold: Vec<u32> = Vec::with_capacity(curmesh.vertcnt.len());

    let mut subject: Vec<Point2<f64>> = Vec::with_capacity(4);
    for face in curmesh.faces() {
        subject.clear();
        subject.extend(face.iter().map(|v| Point2::new(v.x, v.y)));

        match clip::intersect(&subject, contour_flat) {
            Ok(clipped) => {
                for ex in &clipped {
                    iold.push(ex.outer.len() as u32);
                    vold.extend(ex.outer.iter().map(|p| Point3::new(p.x, p.y, 0.0)));
                }
            }
            Err(e) => {
                error!("error during polygon clipping, wall contour line may be wrong: {e}");
                return;
            }
        }
    }

    std::mem::swap(&mut vold, &mut curmesh.verts);
    std::mem::swap(&mut iold, &mut curmesh.vertcnt);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_counts_touching_as_adjacent() {
        let a = Bounds2 {
            min: Point2::new(0.0, 0.0),
            max: Point2::new(0.5, 0.5),
        };
        let b = Bounds2 {
            min: Point2::new(0.5, 0.0),
            max: Point2::new(1.0, 0.5),
        };
        let c = Bounds2 {
            min: Point2::new(0.4, 0.4),
            max: Point2::new(0.6, 0.6),
        };
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
    }

    #[test]
    fn test_duplicate_vertex() {
        let contour = vec![Point2::new(0.5, 0.5)];
        assert!(is_duplicate_vertex(&Point2::new(0.5 + 1e-6, 0.5), &contour));
        assert!(!is_duplicate_vertex(&Point2::new(0.6, 0.5), &contour));
    }

    #[test]
    fn test_extract_clamps_and_dedups() {
        let poly = vec![
            Point2::new(-0.1, 0.2),
            Point2::new(-0.1 + 1e-7, 0.2),
            Point2::new(1.3, 0.2),
        ];
        let out = extract_vertices(&poly, true);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Point2::new(0.0, 0.2));
        assert_eq!(out[1], Point2::new(1.0, 0.2));
    }

    #[test]
    fn test_cleanup_outer_contour_trims_overhang() {
        // one quad spanning the unit square, outer contour only its left half
        let mut mesh = PolyMesh::new();
        mesh.push_face(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ]);
        let outer = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.5, 0.0),
            Point2::new(0.5, 1.0),
            Point2::new(0.0, 1.0),
        ];
        cleanup_outer_contour(&outer, &mut mesh);
        assert_eq!(mesh.face_count(), 1);
        for v in &mesh.verts {
            assert!(v.x <= 0.5 + 1e-6);
        }
    }
}
