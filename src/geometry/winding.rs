//! Polygon reconstruction from ring winding order.
//!
//! A polygon feature is a flat list of rings. Shells and holes are told apart
//! by the sign of each ring's area:
//!
//! 1. Classify every ring as shell (positive area), hole (negative area) or
//!    degenerate (zero area).
//! 2. Walk the rings in order: a shell starts a new polygon, a hole is added
//!    to the most recent polygon, a degenerate ring is discarded.
//!
//! A hole that appears before any shell has nothing to attach to and is
//! dropped.

use tracing::debug;

/// A projected `[longitude, latitude]` position.
pub type Position = [f64; 2];

/// Role of a ring within a polygon feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingRole {
    Shell,
    Hole,
    Degenerate,
}

/// Twice the signed area of a ring, `Σ (x_j - x_i)(y_i + y_j)` where `j` is
/// the vertex before `i`.
///
/// Positive for rings that run counter-clockwise with y pointing up.
pub fn signed_area(ring: &[Position]) -> f64 {
    let len = ring.len();
    if len == 0 {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut j = len - 1;
    for i in 0..len {
        let p1 = ring[i];
        let p2 = ring[j];
        sum += (p2[0] - p1[0]) * (p1[1] + p2[1]);
        j = i;
    }
    sum
}

/// Classify a ring by the sign of its area.
pub fn ring_role(ring: &[Position]) -> RingRole {
    let area = signed_area(ring);
    if area > 0.0 {
        RingRole::Shell
    } else if area < 0.0 {
        RingRole::Hole
    } else {
        RingRole::Degenerate
    }
}

/// Group a flat ring list into polygons of `[shell, holes...]`.
pub fn group_rings(rings: Vec<Vec<Position>>) -> Vec<Vec<Vec<Position>>> {
    let roles: Vec<RingRole> = rings.iter().map(|ring| ring_role(ring)).collect();

    let mut polygons: Vec<Vec<Vec<Position>>> = Vec::new();
    for (index, (ring, role)) in rings.into_iter().zip(roles).enumerate() {
        match role {
            RingRole::Shell => polygons.push(vec![ring]),
            RingRole::Hole => match polygons.last_mut() {
                Some(polygon) => polygon.push(ring),
                None => debug!(ring = index, "Dropping hole that precedes any shell"),
            },
            RingRole::Degenerate => debug!(ring = index, "Dropping zero-area ring"),
        }
    }
    polygons
}
