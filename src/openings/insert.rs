// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Window contour reinjection
//!
//! The quadrify tiler leaves a rectangular hole per opening. Many windows
//! are rectangular and fit their hole exactly; the rest get the gap
//! between the bounding box and the real contour filled here, by walking
//! the contour from one box-edge hit to the next and emitting one face per
//! span. When the two hits lie on different box edges, the matching box
//! corner completes the face.

use super::contour::{Bounds2, ProjectedContour};
use crate::mesh::PolyMesh;
use log::error;
use nalgebra::{Point2, Point3};

/// Fraction of the squared box diagonal beyond which a contour vertex is
/// treated as a self-intersection artifact and skipped
const SELF_INTERSECT_GUARD: f64 = 0.7;

/// Which bounding-box edges a contour vertex lies on, as the matched edge
/// coordinates
#[derive(Clone, Copy, PartialEq)]
struct EdgeHit {
    x: Option<f64>,
    y: Option<f64>,
}

impl EdgeHit {
    fn detect(v: &Point2<f64>, bb: &Bounds2, eps: f64) -> Option<EdgeHit> {
        let x = if (v.x - bb.min.x).abs() < eps {
            Some(bb.min.x)
        } else if (v.x - bb.max.x).abs() < eps {
            Some(bb.max.x)
        } else {
            None
        };
        let y = if (v.y - bb.min.y).abs() < eps {
            Some(bb.min.y)
        } else if (v.y - bb.max.y).abs() < eps {
            Some(bb.max.y)
        } else {
            None
        };
        if x.is_some() || y.is_some() {
            Some(EdgeHit { x, y })
        } else {
            None
        }
    }

    /// Two hits share a box edge when a matched coordinate coincides
    fn shares_edge(&self, other: &EdgeHit) -> bool {
        (self.x.is_some() && self.x == other.x) || (self.y.is_some() && self.y == other.y)
    }
}

pub fn insert_window_contours(contours: &[ProjectedContour], curmesh: &mut PolyMesh) {
    for window in contours {
        let bb = &window.bb;
        let contour = &window.contour;
        if contour.is_empty() {
            continue;
        }

        let diag = bb.diagonal();
        let epsilon = diag / 1000.0;

        // Rectangular windows already are their bounding boxes; nothing to
        // sew in that case.
        if contour.len() == 4 && contour_matches_box(contour, bb, epsilon) {
            continue;
        }

        let size = contour.len();
        let mut last_hit: Option<(usize, EdgeHit)> = None;
        let mut very_first_hit: Option<usize> = None;

        let mut n = 0usize;
        let mut iterations = 0usize;
        loop {
            if iterations == size * 2 {
                error!("encountered unexpected topology while generating window contour");
                break;
            }

            if let Some(hit) = EdgeHit::detect(&contour[n], bb, epsilon) {
                if let Some((last, last_edge)) = last_hit {
                    // the point the current span is anchored to; unmatched
                    // components fall back to the vertex itself
                    let anchor = Point2::new(
                        hit.x.unwrap_or(contour[n].x),
                        hit.y.unwrap_or(contour[n].y),
                    );

                    let old = curmesh.verts.len();
                    let cnt = if last > n { size - (last - n) } else { n - last };

                    let mut a = last;
                    for _ in 0..=cnt {
                        // Clipper never outputs self-intersecting polygons,
                        // but the trip back into floating point can consume
                        // the tiny distances that kept them apart. Vertices
                        // implausibly far from the current edge are such
                        // artifacts.
                        if (contour[a] - anchor).norm_squared()
                            <= diag * diag * SELF_INTERSECT_GUARD
                        {
                            curmesh
                                .verts
                                .push(Point3::new(contour[a].x, contour[a].y, 0.0));
                        }
                        a = (a + 1) % size;
                    }

                    if !hit.shares_edge(&last_edge) {
                        // hits sit on different box edges; the matching
                        // corner closes the span. The previous hit's edge
                        // wins where both constrain the same component.
                        let corner = Point2::new(
                            last_edge.x.or(hit.x).unwrap_or(anchor.x),
                            last_edge.y.or(hit.y).unwrap_or(anchor.y),
                        );
                        curmesh.verts.push(Point3::new(corner.x, corner.y, 0.0));
                    }

                    // spans that collapsed to lines or points are not faces
                    if curmesh.verts.len() - old < 3 {
                        curmesh.verts.truncate(old);
                    }

                    let d = curmesh.verts.len() - old;
                    if d > 0 {
                        curmesh.vertcnt.push(d as u32);
                        curmesh.verts[old..].reverse();
                    }
                    if Some(n) == very_first_hit {
                        break;
                    }
                } else {
                    very_first_hit = Some(n);
                }

                last_hit = Some((n, hit));
            }

            n = (n + 1) % size;
            iterations += 1;
        }
    }
}

/// Check that every corner of the box has a contour vertex within `eps`
fn contour_matches_box(contour: &[Point2<f64>], bb: &Bounds2, eps: f64) -> bool {
    let corners = [
        bb.min,
        bb.max,
        Point2::new(bb.min.x, bb.max.y),
        Point2::new(bb.max.x, bb.min.y),
    ];
    corners
        .iter()
        .all(|c| contour.iter().any(|v| (v - c).norm() < eps))
}
