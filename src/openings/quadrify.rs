// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Quadrify tiling
//!
//! Tiles the unit square minus a set of axis-aligned opening boxes into
//! axis-aligned quads. The recursion peels off an opaque strip left of the
//! first box it finds, sweeps the box column vertically, and continues
//! with the remainder to the right. Boxes that merely touch a region edge
//! count as adjacent; the edge stays with the quad side.

use super::contour::{Bounds2, ProjectedContour};
use crate::mesh::PolyMesh;
use log::warn;
use nalgebra::{Point2, Point3};

/// Opening boxes sorted by their minimum corner, x first, then y
struct XySortedField {
    entries: Vec<(Point2<f64>, usize)>,
}

impl XySortedField {
    fn new(bbs: &[Bounds2]) -> Self {
        let mut entries: Vec<(Point2<f64>, usize)> =
            bbs.iter().enumerate().map(|(i, bb)| (bb.min, i)).collect();
        entries.sort_by(|a, b| {
            a.0.x
                .total_cmp(&b.0.x)
                .then_with(|| a.0.y.total_cmp(&b.0.y))
        });

        // Two boxes anchored at the same corner break the sweep ordering;
        // keep the later one, like a map insert would.
        let mut deduped: Vec<(Point2<f64>, usize)> = Vec::with_capacity(entries.len());
        for e in entries {
            if let Some(last) = deduped.last_mut() {
                if last.0 == e.0 {
                    warn!("constraint failure during generation of wall openings, results may be faulty");
                    *last = e;
                    continue;
                }
            }
            deduped.push(e);
        }
        Self { entries: deduped }
    }
}

fn push_quad(out: &mut Vec<Point2<f64>>, a: Point2<f64>, b: Point2<f64>, c: Point2<f64>, d: Point2<f64>) {
    out.push(a);
    out.push(b);
    out.push(c);
    out.push(d);
}

fn quadrify_part(
    pmin: Point2<f64>,
    pmax: Point2<f64>,
    field: &XySortedField,
    bbs: &[Bounds2],
    out: &mut Vec<Point2<f64>>,
) {
    if pmin.x == pmax.x || pmin.y == pmax.y {
        return;
    }

    // Search along the x axis for the first box cutting into this region
    let mut xs = 1e10;
    let mut xe = 1e10;
    let mut found = false;
    let mut start = 0usize;
    while start < field.entries.len() {
        let bb = &bbs[field.entries[start].1];
        if bb.min.x >= pmax.x {
            break;
        }
        if bb.max.x > pmin.x && bb.max.y > pmin.y && bb.min.y < pmax.y {
            xs = bb.min.x;
            xe = bb.max.x;
            found = true;
            break;
        }
        start += 1;
    }

    if !found {
        // the whole region is opaque
        push_quad(
            out,
            pmin,
            Point2::new(pmin.x, pmax.y),
            pmax,
            Point2::new(pmax.x, pmin.y),
        );
        return;
    }

    xs = xs.max(pmin.x);
    xe = xe.min(pmax.x);

    // opaque strip left of the first box
    if xs - pmin.x != 0.0 {
        push_quad(
            out,
            pmin,
            Point2::new(pmin.x, pmax.y),
            Point2::new(xs, pmax.y),
            Point2::new(xs, pmin.y),
        );
    }

    // sweep the vertical strip [xs,xe], recursing on every gap between
    // boxes that cover it
    let mut ylast = pmin.y;
    let mut found = false;
    while start < field.entries.len() {
        let bb = &bbs[field.entries[start].1];
        if bb.min.x > xs || bb.min.y >= pmax.y {
            break;
        }
        if bb.max.y > ylast {
            found = true;
            let ys = bb.min.y.max(pmin.y);
            let ye = bb.max.y.min(pmax.y);
            if ys - ylast > 0.0 {
                quadrify_part(
                    Point2::new(xs, ylast),
                    Point2::new(xe, ys),
                    field,
                    bbs,
                    out,
                );
            }
            ylast = ye;
        }
        start += 1;
    }
    if !found {
        push_quad(
            out,
            Point2::new(xs, pmin.y),
            Point2::new(xs, pmax.y),
            Point2::new(xe, pmax.y),
            Point2::new(xe, pmin.y),
        );
        return;
    }
    if ylast < pmax.y {
        quadrify_part(
            Point2::new(xs, ylast),
            Point2::new(xe, pmax.y),
            field,
            bbs,
            out,
        );
    }

    // remainder right of the strip
    if pmax.x - xe != 0.0 {
        quadrify_part(Point2::new(xe, pmin.y), pmax, field, bbs, out);
    }
}

/// Tile the unit square around the given boxes into quad faces
pub fn quadrify_boxes(bbs: &[Bounds2], curmesh: &mut PolyMesh) {
    debug_assert!(curmesh.is_empty());

    let field = XySortedField::new(bbs);

    let mut quads: Vec<Point2<f64>> = Vec::with_capacity(bbs.len() * 4);
    quadrify_part(
        Point2::new(0.0, 0.0),
        Point2::new(1.0, 1.0),
        &field,
        bbs,
        &mut quads,
    );
    debug_assert!(quads.len() % 4 == 0);

    curmesh.vertcnt.resize(quads.len() / 4, 4);
    curmesh.verts.reserve(quads.len());
    for v2 in &quads {
        curmesh.verts.push(Point3::new(v2.x, v2.y, 0.0));
    }
}

/// Tile the unit square around the contours' bounding boxes
pub fn quadrify(contours: &[ProjectedContour], curmesh: &mut PolyMesh) {
    let bbs: Vec<Bounds2> = contours.iter().map(|c| c.bb).collect();
    quadrify_boxes(&bbs, curmesh);
}
