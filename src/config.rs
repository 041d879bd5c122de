// src/config.rs

use regex::Regex;

use crate::dms::LITERAL_RE;

/* ---------------- CONSTANTES ---------------- */

// Consecutive vertices further apart than this are treated as a data-entry
// jump between two disjoint zones.
pub const DEFAULT_MAX_EDGE_KM: f64 = 100.0;
// Base offset for duplicate vertices (~1 mm at the equator).
pub const DEFAULT_FUZZ_STEP: f64 = 1e-8;
// Upper bound on rings produced by one self-intersection decomposition.
pub const DEFAULT_MAX_PIECES: usize = 256;
// Named groups every literal pattern must define.
pub const LITERAL_GROUPS: &[&str] = &["deg", "min", "sec", "mark"];

/* ---------------- STAGE CONFIG ---------------- */

#[derive(Debug, Clone)]
pub struct ParserConfig {
    // Single DMS literal with named groups `deg`, `min`, `sec`, `mark`.
    pub literal_pattern: Regex,
}

// Errors raised when compiling a custom literal pattern.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error(transparent)]
    Regex(#[from] regex::Error),
    #[error("pattern lacks the named group `{0}`")]
    MissingGroup(&'static str),
}

impl ParserConfig {
    pub fn with_pattern(pattern: &str) -> Result<Self, PatternError> {
        let literal_pattern = Regex::new(pattern)?;

        let names: Vec<&str> = literal_pattern.capture_names().flatten().collect();
        if let Some(&missing) = LITERAL_GROUPS.iter().find(|&&g| !names.contains(&g)) {
            return Err(PatternError::MissingGroup(missing));
        }

        Ok(ParserConfig { literal_pattern })
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            literal_pattern: LITERAL_RE.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentConfig {
    pub max_edge_km: f64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        SegmentConfig {
            max_edge_km: DEFAULT_MAX_EDGE_KM,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SanitizeConfig {
    pub fuzz_step: f64,
    pub max_pieces: usize,
    // When false polygons are emitted exactly as classified.
    pub repair: bool,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        SanitizeConfig {
            fuzz_step: DEFAULT_FUZZ_STEP,
            max_pieces: DEFAULT_MAX_PIECES,
            repair: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub parser: ParserConfig,
    pub segment: SegmentConfig,
    pub sanitize: SanitizeConfig,
}

/* ---------------- TEST ---------------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pattern_has_every_group() -> Result<(), Box<dyn std::error::Error>> {
        let config = ParserConfig::with_pattern(crate::dms::LITERAL_PATTERN)?;
        assert_eq!(config.literal_pattern.as_str(), LITERAL_RE.as_str());
        Ok(())
    }

    #[test]
    fn test_pattern_without_mark_group_is_rejected() {
        let pattern = r#"(?P<deg>\d+)°(?P<min>\d+)'(?P<sec>\d+)"\s*\S+"#;
        assert!(matches!(
            ParserConfig::with_pattern(pattern),
            Err(PatternError::MissingGroup("mark"))
        ));
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        assert!(matches!(
            ParserConfig::with_pattern("(unclosed"),
            Err(PatternError::Regex(_))
        ));
    }
}
