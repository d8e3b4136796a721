// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixed-point 2D polygon booleans
//!
//! Thin wrapper around the i_overlay integer overlay. All inputs live in
//! the unit square of projected plane space; they are clamped and scaled
//! to integer coordinates, combined with the non-zero fill rule, and
//! scaled back. Keeping the booleans in a fixed-point domain makes the
//! results independent of float evaluation order.
//!
//! This is the only module that touches i_overlay types.

use crate::error::{Error, Result};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay::{Overlay, ShapeType};
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::i_float::int::point::IntPoint;
use nalgebra::Point2;

/// Fixed-point scale for the unit square, the classic clipper `hiRange`
pub const FIXED_SCALE: i64 = 1_518_500_249;

/// Polygon with holes, the output shape of every boolean
///
/// Outer contours wind counter-clockwise, holes clockwise.
#[derive(Debug, Clone)]
pub struct ExPolygon {
    pub outer: Vec<Point2<f64>>,
    pub holes: Vec<Vec<Point2<f64>>>,
}

/// Union of two contours
///
/// A result with more than one polygon means the inputs do not form a
/// simply connected region; callers treat that as unsupported topology.
pub fn merge(a: &[Point2<f64>], b: &[Point2<f64>]) -> Result<Vec<ExPolygon>> {
    let subject = vec![fixed_path(a)?, fixed_path(b)?];
    Ok(run(subject, Vec::new(), OverlayRule::Subject))
}

/// Subtract contour `a` from contour `b`
pub fn subtract(a: &[Point2<f64>], b: &[Point2<f64>]) -> Result<Vec<ExPolygon>> {
    let subject = vec![fixed_path(b)?];
    let clip = vec![fixed_path(a)?];
    Ok(run(subject, clip, OverlayRule::Difference))
}

/// Union of an arbitrary set of contours
pub fn union_all(contours: &[Vec<Point2<f64>>]) -> Result<Vec<ExPolygon>> {
    let mut subject = Vec::with_capacity(contours.len());
    for c in contours {
        subject.push(fixed_path(c)?);
    }
    Ok(run(subject, Vec::new(), OverlayRule::Subject))
}

/// Subtract a set of contours from a subject contour
pub fn subtract_all(
    subject: &[Point2<f64>],
    clips: &[Vec<Point2<f64>>],
) -> Result<Vec<ExPolygon>> {
    let subject = vec![fixed_path(subject)?];
    let mut clip = Vec::with_capacity(clips.len());
    for c in clips {
        clip.push(fixed_path(c)?);
    }
    Ok(run(subject, clip, OverlayRule::Difference))
}

/// Intersection of a subject contour with a clip contour
pub fn intersect(subject: &[Point2<f64>], clip: &[Point2<f64>]) -> Result<Vec<ExPolygon>> {
    let subject = vec![fixed_path(subject)?];
    let clip = vec![fixed_path(clip)?];
    Ok(run(subject, clip, OverlayRule::Intersect))
}

/// Check whether a contour winds counter-clockwise
pub fn is_ccw(contour: &[Point2<f64>]) -> bool {
    let path: Vec<IntPoint> = contour.iter().map(to_fixed).collect();
    signed_area_doubled(&path) >= 0
}

// ============================================================================
// Internal helpers
// ============================================================================

#[inline]
fn to_fixed(p: &Point2<f64>) -> IntPoint {
    // Sanity clamp: projected coordinates may stray slightly outside the
    // unit square, and the integer domain must not overflow.
    IntPoint::new(
        (p.x.clamp(0.0, 1.0) * FIXED_SCALE as f64) as i32,
        (p.y.clamp(0.0, 1.0) * FIXED_SCALE as f64) as i32,
    )
}

#[inline]
fn from_fixed(p: &IntPoint) -> Point2<f64> {
    Point2::new(
        p.x as f64 / FIXED_SCALE as f64,
        p.y as f64 / FIXED_SCALE as f64,
    )
}

/// Convert a contour to a counter-clockwise fixed-point path
///
/// Canonical winding keeps the non-zero fill rule from cancelling
/// same-role contours that arrive with opposite orientations.
fn fixed_path(contour: &[Point2<f64>]) -> Result<Vec<IntPoint>> {
    if contour.len() < 3 {
        return Err(Error::DegeneratePolygon(format!(
            "contour with {} vertices cannot be clipped",
            contour.len()
        )));
    }
    let mut path: Vec<IntPoint> = contour.iter().map(to_fixed).collect();
    if signed_area_doubled(&path) < 0 {
        path.reverse();
    }
    Ok(path)
}

/// Twice the signed area of an integer path
fn signed_area_doubled(path: &[IntPoint]) -> i128 {
    let mut area: i128 = 0;
    for i in 0..path.len() {
        let a = &path[i];
        let b = &path[(i + 1) % path.len()];
        area += a.x as i128 * b.y as i128 - b.x as i128 * a.y as i128;
    }
    area
}

fn run(subject: Vec<Vec<IntPoint>>, clip: Vec<Vec<IntPoint>>, rule: OverlayRule) -> Vec<ExPolygon> {
    let capacity = subject.iter().chain(clip.iter()).map(Vec::len).sum();
    let mut overlay = Overlay::new(capacity);
    for path in &subject {
        overlay.add_contour(path, ShapeType::Subject);
    }
    for path in &clip {
        overlay.add_contour(path, ShapeType::Clip);
    }

    let graph = overlay.into_graph(FillRule::NonZero);
    let shapes = graph.extract_shapes(rule);

    let mut out = Vec::with_capacity(shapes.len());
    for shape in &shapes {
        let Some(outer) = shape.first() else {
            continue;
        };
        if outer.len() < 3 {
            continue;
        }
        out.push(ExPolygon {
            outer: outer.iter().map(from_fixed).collect(),
            holes: shape
                .iter()
                .skip(1)
                .filter(|h| h.len() >= 3)
                .map(|h| h.iter().map(from_fixed).collect())
                .collect(),
        });
    }
    out
}
