// src/dms.rs

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/* ---------------- DOMAIN TYPES ---------------- */

// Indicates whether a coordinate is a latitude or a longitude.
// Used to apply correct bounds and to pair literals into points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateKind {
    Latitude,
    Longitude,
}

impl std::fmt::Display for CoordinateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CoordinateKind::Latitude => "latitude",
            CoordinateKind::Longitude => "longitude",
        };
        write!(f, "{s}")
    }
}

// Hemisphere marker following a DMS literal.
// Regulatory documents only use north latitude (с.ш.) and east longitude (в.д.),
// the other two are accepted so the parser stays general.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    // Reads the marker text captured after a literal (`с.ш.`, `в.д.`, `ю.ш.`, `з.д.`, `N`...).
    pub fn from_marker(marker: &str) -> Option<Self> {
        let first = marker.trim().chars().next()?.to_lowercase().next()?;
        match first {
            // Latin `c` shows up in place of Cyrillic `с` in converted documents.
            'с' | 'c' | 'n' => Some(Direction::North),
            'ю' | 's' => Some(Direction::South),
            'в' | 'e' => Some(Direction::East),
            'з' | 'w' => Some(Direction::West),
            _ => None,
        }
    }

    pub fn kind(self) -> CoordinateKind {
        match self {
            Direction::North | Direction::South => CoordinateKind::Latitude,
            Direction::East | Direction::West => CoordinateKind::Longitude,
        }
    }

    fn sign(self) -> f64 {
        match self {
            Direction::North | Direction::East => 1.0,
            Direction::South | Direction::West => -1.0,
        }
    }
}

// Identifies which field failed during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordField {
    Deg,
    Min,
    Sec,
    Dir,
}

impl std::fmt::Display for CoordField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CoordField::Deg => "degrees",
            CoordField::Min => "minutes",
            CoordField::Sec => "seconds",
            CoordField::Dir => "direction",
        };
        write!(f, "{s}")
    }
}

// One degree-minute-second literal with its hemisphere.
#[derive(Debug, Clone, PartialEq)]
pub struct DmsLiteral {
    pub degrees: u32,
    pub minutes: u32,
    pub seconds: f64,
    pub direction: Direction,
}

/* ---------------- LOW LEVEL VALIDATION ---------------- */

// Errors related to numeric values and geographic limits.
#[derive(Debug, thiserror::Error)]
pub enum CoordError {
    #[error("{kind} {value} out of range")]
    OutOfRange { kind: CoordinateKind, value: f64 },
    #[error("coordinate value is not finite")]
    NotFinite,
}

// Converts DMS components to signed decimal degrees.
// Minutes and seconds are not range checked: source documents occasionally
// carry 60' or 60" and the value is passed through as written.
pub fn convert(degrees: u32, minutes: u32, seconds: f64, direction: Direction) -> f64 {
    let value = f64::from(degrees) + f64::from(minutes) / 60.0 + seconds / 3600.0;
    direction.sign() * value
}

impl DmsLiteral {
    // Decimal value, rejected when it leaves the valid range of its axis.
    pub fn to_decimal(&self) -> Result<f64, CoordError> {
        let value = convert(self.degrees, self.minutes, self.seconds, self.direction);
        if !value.is_finite() {
            return Err(CoordError::NotFinite);
        }

        let kind = self.direction.kind();
        let limit = match kind {
            CoordinateKind::Latitude => 90.0,
            CoordinateKind::Longitude => 180.0,
        };
        if value.abs() > limit {
            return Err(CoordError::OutOfRange { kind, value });
        }

        Ok(value)
    }

    fn from_captures(caps: &Captures<'_>) -> Result<Self, DmsError> {
        let field = |name: &str, field: CoordField| {
            caps.name(name)
                .map(|m| m.as_str())
                .ok_or(DmsError::InvalidField { field })
        };

        let degrees = field("deg", CoordField::Deg)?
            .parse::<u32>()
            .map_err(|_| DmsError::InvalidField { field: CoordField::Deg })?;
        let minutes = field("min", CoordField::Min)?
            .parse::<u32>()
            .map_err(|_| DmsError::InvalidField { field: CoordField::Min })?;
        let seconds = field("sec", CoordField::Sec)?
            .replace(',', ".")
            .parse::<f64>()
            .map_err(|_| DmsError::InvalidField { field: CoordField::Sec })?;
        let direction = Direction::from_marker(field("mark", CoordField::Dir)?)
            .ok_or(DmsError::InvalidField { field: CoordField::Dir })?;

        Ok(DmsLiteral { degrees, minutes, seconds, direction })
    }
}

/* ---------------- DMS ---------------- */

// Pattern for one DMS literal followed by its hemisphere marker.
// Groups `deg`, `min`, `sec` and `mark` are required by every caller,
// a custom pattern passed through configuration must keep them.
pub const LITERAL_PATTERN: &str = r#"(?xi)
    (?P<deg>\d+) \s* [°º˚] \s*
    (?P<min>\d+) \s* ['′’"] \s*
    (?P<sec>\d+(?:[.,]\d+)?) \s* (?:''|["″”])? \s*
    (?P<mark> [сc]\.\s?ш\.? | ю\.\s?ш\.? | в\.\s?д\.? | з\.\s?д\.? | [NSEW]\b )
"#;

pub static LITERAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(LITERAL_PATTERN).expect("Invalid DMS literal regex"));

// Errors specific to DMS parsing.
#[derive(Debug, thiserror::Error)]
pub enum DmsError {
    #[error("invalid DMS format")]
    InvalidFormat,
    #[error("invalid DMS field: {field}")]
    InvalidField { field: CoordField },
    #[error("expected a {expected} literal, found {found}")]
    WrongAxis {
        expected: CoordinateKind,
        found: CoordinateKind,
    },
    #[error("point literal must hold one latitude followed by one longitude")]
    InvalidPoint,
    #[error("invalid coord ({0})")]
    InvalidCoord(#[from] CoordError),
}

// Parses the first DMS literal found in `input` with the given pattern.
pub fn parse_literal(input: &str, pattern: &Regex) -> Result<DmsLiteral, DmsError> {
    let caps = pattern.captures(input).ok_or(DmsError::InvalidFormat)?;
    DmsLiteral::from_captures(&caps)
}

// Parses a DMS string and converts it to decimal degrees.
pub fn dms_to_dd(input: &str, kind: CoordinateKind) -> Result<f64, DmsError> {
    let literal = parse_literal(input, &LITERAL_RE)?;
    let found = literal.direction.kind();
    if found != kind {
        return Err(DmsError::WrongAxis { expected: kind, found });
    }

    Ok(literal.to_decimal()?)
}

// Splits a point literal into latitude and longitude and converts both.
// Returns `(lat, lon)`.
pub fn parse_point(input: &str, pattern: &Regex) -> Result<(f64, f64), DmsError> {
    let mut literals = Vec::with_capacity(2);
    for caps in pattern.captures_iter(input) {
        literals.push(DmsLiteral::from_captures(&caps)?);
    }

    match literals.as_slice() {
        [lat, lon]
            if lat.direction.kind() == CoordinateKind::Latitude
                && lon.direction.kind() == CoordinateKind::Longitude =>
        {
            Ok((lat.to_decimal()?, lon.to_decimal()?))
        }
        [] => Err(DmsError::InvalidFormat),
        _ => Err(DmsError::InvalidPoint),
    }
}

/* ---------------- TEST ---------------- */
