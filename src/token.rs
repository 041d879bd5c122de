// src/token.rs

use std::ops::Range;

use regex::Regex;

use crate::dms::{CoordinateKind, Direction};

// Raw text of one latitude literal immediately followed by its longitude literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateToken<'a> {
    pub text: &'a str,
    pub span: (usize, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrayReason {
    LatitudeWithoutLongitude,
    LongitudeWithoutLatitude,
    UnknownMarker,
}

// Literal that could not take part in a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrayLiteral<'a> {
    pub text: &'a str,
    pub reason: StrayReason,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenScan<'a> {
    pub tokens: Vec<CoordinateToken<'a>>,
    pub strays: Vec<StrayLiteral<'a>>,
}

// Only blanks and list punctuation may sit between the two halves of a point.
fn is_pair_gap(gap: &str) -> bool {
    gap.chars().all(|c| c.is_whitespace() || matches!(c, ',' | ';'))
}

// Scans normalized text for point literals in order of appearance.
// Ordinal prefixes ("3. ") fall outside the literal pattern and are skipped.
pub fn scan_tokens<'a>(text: &'a str, pattern: &Regex) -> TokenScan<'a> {
    let mut scan = TokenScan::default();
    let mut pending: Option<Range<usize>> = None;

    for caps in pattern.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let range = whole.range();

        let direction = caps.name("mark").and_then(|m| Direction::from_marker(m.as_str()));
        let Some(direction) = direction else {
            if let Some(lat) = pending.take() {
                scan.stray(text, lat, StrayReason::LatitudeWithoutLongitude);
            }
            scan.stray(text, range, StrayReason::UnknownMarker);
            continue;
        };

        match (pending.take(), direction.kind()) {
            (None, CoordinateKind::Latitude) => pending = Some(range),
            (None, CoordinateKind::Longitude) => {
                scan.stray(text, range, StrayReason::LongitudeWithoutLatitude);
            }
            (Some(lat), CoordinateKind::Latitude) => {
                scan.stray(text, lat, StrayReason::LatitudeWithoutLongitude);
                pending = Some(range);
            }
            (Some(lat), CoordinateKind::Longitude) => {
                if is_pair_gap(&text[lat.end..range.start]) {
                    scan.tokens.push(CoordinateToken {
                        text: &text[lat.start..range.end],
                        span: (lat.start, range.end),
                    });
                } else {
                    scan.stray(text, lat, StrayReason::LatitudeWithoutLongitude);
                    scan.stray(text, range, StrayReason::LongitudeWithoutLatitude);
                }
            }
        }
    }

    if let Some(lat) = pending {
        scan.stray(text, lat, StrayReason::LatitudeWithoutLongitude);
    }

    scan
}

impl<'a> TokenScan<'a> {
    fn stray(&mut self, text: &'a str, range: Range<usize>, reason: StrayReason) {
        self.strays.push(StrayLiteral {
            text: &text[range],
            reason,
        });
    }
}

/* ---------------- TEST ---------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dms::LITERAL_RE;

    #[test]
    fn test_scan_numbered_points() {
        let text = "1. 55°30'0\" с.ш. 37°30'0\" в.д. 2. 55°31'0\" с.ш. 37°31'0\" в.д.";
        let scan = scan_tokens(text, &LITERAL_RE);
        assert_eq!(scan.tokens.len(), 2);
        assert!(scan.strays.is_empty());
        assert_eq!(scan.tokens[0].text, "55°30'0\" с.ш. 37°30'0\" в.д.");
        assert_eq!(scan.tokens[1].text, "55°31'0\" с.ш. 37°31'0\" в.д.");
        assert_eq!(&text[scan.tokens[1].span.0..scan.tokens[1].span.1], scan.tokens[1].text);
    }

    #[test]
    fn test_scan_comma_between_halves() {
        let scan = scan_tokens("55°30'0\" с.ш., 37°30'0\" в.д.", &LITERAL_RE);
        assert_eq!(scan.tokens.len(), 1);
    }

    #[test]
    fn test_scan_latitude_without_longitude() {
        let text = "55°30'0\" с.ш. 55°31'0\" с.ш. 37°31'0\" в.д.";
        let scan = scan_tokens(text, &LITERAL_RE);
        assert_eq!(scan.tokens.len(), 1);
        assert_eq!(scan.tokens[0].text, "55°31'0\" с.ш. 37°31'0\" в.д.");
        assert_eq!(
            scan.strays,
            vec![StrayLiteral {
                text: "55°30'0\" с.ш.",
                reason: StrayReason::LatitudeWithoutLongitude,
            }]
        );
    }

    #[test]
    fn test_scan_text_between_halves_breaks_the_pair() {
        let scan = scan_tokens("55°30'0\" с.ш. и далее 37°30'0\" в.д.", &LITERAL_RE);
        assert!(scan.tokens.is_empty());
        assert_eq!(scan.strays.len(), 2);
        assert_eq!(scan.strays[1].reason, StrayReason::LongitudeWithoutLatitude);
    }

    #[test]
    fn test_scan_trailing_latitude() {
        let scan = scan_tokens("от точки 55°30'0\" с.ш.", &LITERAL_RE);
        assert!(scan.tokens.is_empty());
        assert_eq!(scan.strays[0].reason, StrayReason::LatitudeWithoutLongitude);
    }

    #[test]
    fn test_scan_unknown_marker() {
        // Custom pattern whose `mark` group accepts anything.
        let pattern = Regex::new(r#"(?P<deg>\d+)°(?P<min>\d+)'(?P<sec>\d+)"\s*(?P<mark>\S+)"#).unwrap();
        let scan = scan_tokens("55°30'0\" с.ш. 37°30'0\" Q", &pattern);

        assert!(scan.tokens.is_empty());
        assert_eq!(
            scan.strays,
            vec![
                StrayLiteral {
                    text: "55°30'0\" с.ш.",
                    reason: StrayReason::LatitudeWithoutLongitude,
                },
                StrayLiteral {
                    text: "37°30'0\" Q",
                    reason: StrayReason::UnknownMarker,
                },
            ]
        );
    }

    #[test]
    fn test_scan_empty_text() {
        assert_eq!(scan_tokens("", &LITERAL_RE), TokenScan::default());
    }
}
