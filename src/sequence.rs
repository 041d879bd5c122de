// src/sequence.rs

use serde::Serialize;

use crate::config::ParserConfig;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::dms::parse_point;
use crate::text::normalize_whitespace;
use crate::token::{StrayReason, scan_tokens};

/* ---------------- DOMAIN TYPES ---------------- */

// One converted point. `index` is the 1-based position in extraction order,
// never the numbering printed in the source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    pub index: usize,
    pub lat: f64,
    pub lon: f64,
    pub original: String,
}

// Ordered points of one zone. The order is the boundary traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSequence {
    pub name: String,
    pub points: Vec<GeoPoint>,
}

impl PointSequence {
    pub fn new(name: impl Into<String>, points: Vec<GeoPoint>) -> Self {
        PointSequence {
            name: name.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/* ---------------- BUILDER ---------------- */

// Extracts the point sequence of one zone.
// Unconvertible or unpaired literals are dropped and reported; they never abort the zone.
pub fn build_sequence(name: &str, text: &str, config: &ParserConfig) -> (PointSequence, Vec<Diagnostic>) {
    let normalized = normalize_whitespace(text);
    let scan = scan_tokens(&normalized, &config.literal_pattern);

    let mut diagnostics = Vec::new();
    for stray in &scan.strays {
        let (kind, message) = match stray.reason {
            StrayReason::LatitudeWithoutLongitude => (
                DiagnosticKind::UnmatchedPair,
                "latitude literal not followed by a longitude literal",
            ),
            StrayReason::LongitudeWithoutLatitude => (
                DiagnosticKind::UnmatchedPair,
                "longitude literal without a preceding latitude literal",
            ),
            StrayReason::UnknownMarker => (
                DiagnosticKind::MalformedCoordinateToken,
                "unrecognized hemisphere marker",
            ),
        };
        diagnostics.push(Diagnostic::new(kind, name, message).with_offending(stray.text));
    }

    let mut points = Vec::with_capacity(scan.tokens.len());
    for token in &scan.tokens {
        match parse_point(token.text, &config.literal_pattern) {
            Ok((lat, lon)) => points.push(GeoPoint {
                index: points.len() + 1,
                lat,
                lon,
                original: token.text.to_string(),
            }),
            Err(e) => {
                tracing::debug!(zone = name, literal = token.text, error = %e, "dropping point");
                diagnostics.push(
                    Diagnostic::new(DiagnosticKind::MalformedCoordinateToken, name, e.to_string())
                        .with_offending(token.text),
                );
            }
        }
    }

    (PointSequence::new(name, points), diagnostics)
}

/* ---------------- TEST ---------------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_two_points_in_order() {
        let text = "1. 55°30'0\" с.ш. 37°30'0\" в.д. 2. 55°31'0\" с.ш. 37°31'0\" в.д.";
        let (seq, diags) = build_sequence("zone", text, &ParserConfig::default());

        assert!(diags.is_empty());
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.points[0].index, 1);
        assert_eq!(seq.points[1].index, 2);
        assert_eq!(seq.points[0].lat, 55.5);
        assert_eq!(seq.points[0].lon, 37.5);
        assert!(seq.points[1].lat > seq.points[0].lat);
        assert_eq!(seq.points[0].original, "55°30'0\" с.ш. 37°30'0\" в.д.");
    }

    #[test]
    fn test_build_ignores_source_numbering() {
        let text = "7. 55°30'0\" с.ш. 37°30'0\" в.д. 3. 55°31'0\" с.ш. 37°31'0\" в.д.";
        let (seq, _) = build_sequence("zone", text, &ParserConfig::default());
        let indices: Vec<_> = seq.points.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_build_drops_out_of_range_point() {
        let text = "1. 95°00'0\" с.ш. 37°30'0\" в.д. 2. 55°31'0\" с.ш. 37°31'0\" в.д.";
        let (seq, diags) = build_sequence("р. Ока", text, &ParserConfig::default());

        assert_eq!(seq.len(), 1);
        assert_eq!(seq.points[0].index, 1);
        assert_eq!(seq.points[0].lat, 55.0 + 31.0 / 60.0);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::MalformedCoordinateToken);
        assert_eq!(diags[0].zone, "р. Ока");
        assert_eq!(diags[0].offending.as_deref(), Some("95°00'0\" с.ш. 37°30'0\" в.д."));
    }

    #[test]
    fn test_build_reports_unmatched_pair() {
        let text = "55°30'0\" с.ш. 1. 55°31'0\" с.ш. 37°31'0\" в.д.";
        let (seq, diags) = build_sequence("zone", text, &ParserConfig::default());
        assert_eq!(seq.len(), 1);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::UnmatchedPair);
    }

    #[test]
    fn test_build_multiline_cell() {
        let text = "1. 55°30'0\"\n с.ш.\n37°30'0\" в.д.";
        let (seq, diags) = build_sequence("zone", text, &ParserConfig::default());
        assert!(diags.is_empty());
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn test_build_unknown_marker_is_malformed() -> Result<(), Box<dyn std::error::Error>> {
        let config = ParserConfig::with_pattern(r#"(?P<deg>\d+)°(?P<min>\d+)'(?P<sec>\d+)"\s*(?P<mark>\S+)"#)?;
        let (seq, diags) = build_sequence("zone", "37°30'0\" Q", &config);

        assert!(seq.is_empty());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::MalformedCoordinateToken);
        assert_eq!(diags[0].offending.as_deref(), Some("37°30'0\" Q"));
        Ok(())
    }

    #[test]
    fn test_build_empty_text() {
        let (seq, diags) = build_sequence("zone", "", &ParserConfig::default());
        assert!(seq.is_empty());
        assert!(diags.is_empty());
    }
}
