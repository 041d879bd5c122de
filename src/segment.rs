// src/segment.rs

/*
A coordinate list whose consecutive points jump hundreds of kilometres is
almost always two or more zones pasted under one heading. The list is cut at
every such jump and each run is classified on its own.
*/

use crate::config::SegmentConfig;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::sequence::{GeoPoint, PointSequence};
use crate::util::{HaversineError, haversine, round};

// Result of walking the edges of one sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeScan {
    // Index `i` marks the edge between points `i` and `i + 1`.
    pub cuts: Vec<usize>,
    pub max_distance_km: f64,
}

pub fn scan_edges(points: &[GeoPoint], max_edge_km: f64) -> Result<EdgeScan, HaversineError> {
    let mut cuts = Vec::new();
    let mut max_distance_km = 0.0_f64;

    for (i, pair) in points.windows(2).enumerate() {
        let d = haversine(pair[0].lat, pair[0].lon, pair[1].lat, pair[1].lon)?;
        max_distance_km = max_distance_km.max(d);
        if d > max_edge_km {
            cuts.push(i);
        }
    }

    Ok(EdgeScan { cuts, max_distance_km })
}

// Cuts the points at the given edges; the cut edges belong to no run.
fn split_at(points: &[GeoPoint], cuts: &[usize]) -> Vec<Vec<GeoPoint>> {
    let mut runs = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for &cut in cuts {
        runs.push(points[start..=cut].to_vec());
        start = cut + 1;
    }
    runs.push(points[start..].to_vec());
    runs
}

// Splits a polygon candidate at anomalous edges. Never fails: when distances
// cannot be computed the sequence comes back whole, with a diagnostic.
pub fn segment_sequence(seq: &PointSequence, config: &SegmentConfig) -> (Vec<PointSequence>, Option<Diagnostic>) {
    if seq.len() < 3 {
        return (vec![seq.clone()], None);
    }

    let scan = match scan_edges(&seq.points, config.max_edge_km) {
        Ok(scan) => scan,
        Err(e) => {
            let diagnostic = Diagnostic::new(
                DiagnosticKind::AnomalousSegmentDistance,
                &seq.name,
                format!("edge distances could not be computed ({e}), sequence left unsplit"),
            );
            return (vec![seq.clone()], Some(diagnostic));
        }
    };

    if scan.cuts.is_empty() {
        return (vec![seq.clone()], None);
    }

    let runs: Vec<PointSequence> = split_at(&seq.points, &scan.cuts)
        .into_iter()
        .map(|points| PointSequence::new(seq.name.clone(), points))
        .collect();

    let offending = scan
        .cuts
        .iter()
        .map(|&i| format!("#{}-#{}", seq.points[i].index, seq.points[i + 1].index))
        .collect::<Vec<_>>()
        .join(", ");

    let diagnostic = Diagnostic::new(
        DiagnosticKind::AnomalousSegmentDistance,
        &seq.name,
        format!(
            "max edge {} km exceeds {} km, split into {} parts",
            round(scan.max_distance_km, 1),
            config.max_edge_km,
            runs.len()
        ),
    )
    .with_offending(offending);

    (runs, Some(diagnostic))
}

/* ---------------- TEST ---------------- */

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(index: usize, lat: f64, lon: f64) -> GeoPoint {
        GeoPoint {
            index,
            lat,
            lon,
            original: format!("#{index}"),
        }
    }

    fn seq(points: Vec<GeoPoint>) -> PointSequence {
        PointSequence::new("zone", points)
    }

    #[test]
    fn test_short_sequence_untouched() {
        let s = seq(vec![pt(1, 55.0, 37.0), pt(2, 60.0, 37.0)]);
        let (runs, diag) = segment_sequence(&s, &SegmentConfig::default());
        assert_eq!(runs, vec![s]);
        assert!(diag.is_none());
    }

    #[test]
    fn test_close_points_untouched() {
        let s = seq(vec![pt(1, 55.0, 37.0), pt(2, 55.01, 37.0), pt(3, 55.01, 37.01)]);
        let (runs, diag) = segment_sequence(&s, &SegmentConfig::default());
        assert_eq!(runs.len(), 1);
        assert!(diag.is_none());
    }

    #[test]
    fn test_split_at_500_km_jump() {
        // About 4.5 degrees of latitude between points 3 and 4.
        let s = seq(vec![
            pt(1, 55.00, 37.00),
            pt(2, 55.01, 37.00),
            pt(3, 55.01, 37.01),
            pt(4, 59.50, 37.01),
            pt(5, 59.51, 37.02),
        ]);
        let (runs, diag) = segment_sequence(&s, &SegmentConfig { max_edge_km: 100.0 });

        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].len(), 3);
        assert_eq!(runs[1].len(), 2);
        assert_eq!(runs.iter().map(PointSequence::len).sum::<usize>(), 5);
        assert_eq!(runs[1].points[0].index, 4);

        let diag = diag.unwrap();
        assert_eq!(diag.kind, DiagnosticKind::AnomalousSegmentDistance);
        assert_eq!(diag.offending.as_deref(), Some("#3-#4"));
        assert!(diag.message.contains("split into 2 parts"));
    }

    #[test]
    fn test_alternate_threshold() {
        let s = seq(vec![pt(1, 55.0, 37.0), pt(2, 55.1, 37.0), pt(3, 55.2, 37.0)]);
        let (runs, _) = segment_sequence(&s, &SegmentConfig { max_edge_km: 5.0 });
        assert_eq!(runs.len(), 3);
        assert!(runs.iter().all(|r| r.len() == 1));
    }

    #[test]
    fn test_unscannable_sequence_is_returned_whole() {
        let s = seq(vec![pt(1, 55.0, 37.0), pt(2, f64::NAN, 37.0), pt(3, 55.2, 37.0)]);
        let (runs, diag) = segment_sequence(&s, &SegmentConfig::default());
        assert_eq!(runs.len(), 1);
        assert!(diag.is_some());
    }

    #[test]
    fn test_scan_edges_max_distance() -> Result<(), Box<dyn std::error::Error>> {
        let points = vec![pt(1, 55.0, 37.0), pt(2, 56.0, 37.0)];
        let scan = scan_edges(&points, 100.0)?;
        assert_eq!(scan.cuts, vec![0]);
        assert!((scan.max_distance_km - 111.19).abs() < 0.1);
        Ok(())
    }
}
