// src/sanitize.rs

/*
Polygon repair.

1. Exact duplicate vertices are nudged by a position-dependent offset far
   below display precision, so no edge has zero length.
2. Self-intersecting rings are cut at their first crossing into two rings,
   repeatedly, until every ring is simple. Each cut strictly shrinks both
   halves, and a piece budget bounds the work stack.

A ring that is already simple comes back untouched.
*/

use std::collections::HashSet;

use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{Area, Coord, Line, LineString, Polygon};

use crate::config::SanitizeConfig;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::feature::{Feature, Geometry};

// Offsets cycle through this many multiples of the fuzz step.
const FUZZ_CYCLE: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum RepairError {
    #[error("ring edges {first} and {second} overlap collinearly")]
    CollinearOverlap { first: usize, second: usize },
    #[error("decomposition exceeded {limit} pieces")]
    TooManyPieces { limit: usize },
    #[error("ring has no area left after decomposition")]
    Degenerate,
    #[error("duplicate vertex {position} could not be shifted to a free position")]
    UnresolvedDuplicate { position: usize },
}

/* ---------------- DEDUPLICATION ---------------- */

fn key(c: Coord<f64>) -> (u64, u64) {
    (c.x.to_bits(), c.y.to_bits())
}

// Shifts every exact repeat of an earlier vertex by `step * (1 + position mod 50)`
// degrees on both axes. The closing vertex of a closed ring is not a repeat.
// Fails when no shift frees the vertex, which a zero or non-finite step guarantees.
pub fn fuzz_duplicates(ring: &LineString<f64>, step: f64) -> Result<LineString<f64>, RepairError> {
    let coords = &ring.0;
    let closed = coords.len() > 1 && ring.is_closed();
    let open_len = if closed { coords.len() - 1 } else { coords.len() };
    let usable_step = step.is_finite() && step > 0.0;

    let mut seen: HashSet<(u64, u64)> = HashSet::with_capacity(open_len);
    let mut out: Vec<Coord<f64>> = Vec::with_capacity(coords.len());

    for (position, &c) in coords[..open_len].iter().enumerate() {
        if seen.insert(key(c)) {
            out.push(c);
            continue;
        }

        let fuzzed = (0..FUZZ_CYCLE)
            .filter(|_| usable_step)
            .map(|attempt| {
                let offset = step * ((position + attempt) % FUZZ_CYCLE + 1) as f64;
                Coord {
                    x: c.x + offset,
                    y: c.y + offset,
                }
            })
            .find(|candidate| seen.insert(key(*candidate)))
            .ok_or(RepairError::UnresolvedDuplicate { position })?;
        out.push(fuzzed);
    }

    if closed {
        out.push(out[0]);
    }

    Ok(LineString::new(out))
}

/* ---------------- DECOMPOSITION ---------------- */

#[derive(Debug, Clone, Copy)]
struct Crossing {
    first: usize,
    second: usize,
    at: Coord<f64>,
}

// First proper crossing between two non-adjacent edges of an open ring.
// Touching edges are left alone; collinear overlaps cannot be cut.
fn first_crossing(verts: &[Coord<f64>]) -> Result<Option<Crossing>, RepairError> {
    let n = verts.len();
    for i in 0..n {
        let a = Line::new(verts[i], verts[(i + 1) % n]);
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let b = Line::new(verts[j], verts[(j + 1) % n]);
            match line_intersection(a, b) {
                Some(LineIntersection::SinglePoint {
                    intersection,
                    is_proper: true,
                }) => {
                    return Ok(Some(Crossing {
                        first: i,
                        second: j,
                        at: intersection,
                    }));
                }
                Some(LineIntersection::Collinear { .. }) => {
                    return Err(RepairError::CollinearOverlap { first: i, second: j });
                }
                _ => {}
            }
        }
    }
    Ok(None)
}

fn distinct_vertices(verts: &[Coord<f64>]) -> usize {
    verts.iter().map(|&c| key(c)).collect::<HashSet<_>>().len()
}

fn close(mut verts: Vec<Coord<f64>>) -> LineString<f64> {
    if let Some(&first) = verts.first() {
        verts.push(first);
    }
    LineString::new(verts)
}

// Decomposes a closed ring into simple closed rings.
// A simple ring is returned as the only element, unchanged.
pub fn decompose(ring: &LineString<f64>, max_pieces: usize) -> Result<Vec<LineString<f64>>, RepairError> {
    let coords = &ring.0;
    if coords.len() < 4 {
        return Ok(vec![ring.clone()]);
    }

    let open = coords[..coords.len() - 1].to_vec();
    if first_crossing(&open)?.is_none() {
        return Ok(vec![ring.clone()]);
    }

    let mut stack = vec![open];
    let mut done = Vec::new();

    while let Some(verts) = stack.pop() {
        if done.len() + stack.len() >= max_pieces {
            return Err(RepairError::TooManyPieces { limit: max_pieces });
        }
        if distinct_vertices(&verts) < 3 {
            continue;
        }

        match first_crossing(&verts)? {
            None => {
                let ring = close(verts);
                if Polygon::new(ring.clone(), vec![]).unsigned_area() > 0.0 {
                    done.push(ring);
                }
            }
            Some(Crossing { first, second, at }) => {
                // Loop enclosed between the two crossing edges.
                let mut inner = Vec::with_capacity(second - first + 1);
                inner.push(at);
                inner.extend_from_slice(&verts[first + 1..=second]);

                // The rest of the ring, joined through the crossing point.
                let mut outer = Vec::with_capacity(verts.len() - (second - first) + 1);
                outer.push(at);
                outer.extend_from_slice(&verts[second + 1..]);
                outer.extend_from_slice(&verts[..=first]);

                stack.push(outer);
                stack.push(inner);
            }
        }
    }

    if done.is_empty() {
        return Err(RepairError::Degenerate);
    }
    Ok(done)
}

/* ---------------- FEATURES ---------------- */

// Repairs a polygon feature. Pieces of a decomposed ring get ids `<id>.<n>`
// and point back to the original id. When decomposition fails the fuzzed polygon
// is kept; when fuzzing fails the polygon is kept as given.
pub fn sanitize_feature(feature: Feature, config: &SanitizeConfig) -> (Vec<Feature>, Option<Diagnostic>) {
    let (fuzzed, interiors) = match &feature.geometry {
        Geometry::Polygon(polygon) => (
            fuzz_duplicates(polygon.exterior(), config.fuzz_step),
            polygon.interiors().to_vec(),
        ),
        _ => return (vec![feature], None),
    };

    let exterior = match fuzzed {
        Ok(exterior) => exterior,
        Err(e) => {
            let diagnostic = Diagnostic::new(
                DiagnosticKind::PolygonRepairFailure,
                &feature.properties.name,
                format!("{e}, original polygon kept"),
            )
            .with_offending(feature.id.clone());
            return (vec![feature], Some(diagnostic));
        }
    };

    let rings = match decompose(&exterior, config.max_pieces) {
        Ok(rings) => rings,
        Err(e) => {
            let diagnostic = Diagnostic::new(
                DiagnosticKind::PolygonRepairFailure,
                &feature.properties.name,
                format!("{e}, original polygon kept"),
            )
            .with_offending(feature.id.clone());

            let kept = Feature {
                geometry: Geometry::Polygon(Polygon::new(exterior, interiors)),
                ..feature
            };
            return (vec![kept], Some(diagnostic));
        }
    };

    if let [only] = rings.as_slice() {
        if only == &exterior {
            let kept = Feature {
                geometry: Geometry::Polygon(Polygon::new(exterior, interiors)),
                ..feature
            };
            return (vec![kept], None);
        }
    }

    tracing::debug!(feature = %feature.id, pieces = rings.len(), "self-intersecting ring decomposed");

    let pieces = rings
        .into_iter()
        .enumerate()
        .map(|(n, ring)| {
            let mut properties = feature.properties.clone();
            properties.source_feature = Some(feature.id.clone());
            Feature {
                id: format!("{}.{}", feature.id, n + 1),
                geometry: Geometry::Polygon(Polygon::new(ring, vec![])),
                properties,
            }
        })
        .collect();

    (pieces, None)
}

/* ---------------- TEST ---------------- */
