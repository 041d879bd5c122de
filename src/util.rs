// src/util.rs

use geo::{Distance, HaversineMeasure, Point};

/* ---------------- CONSTANTES ---------------- */

// Overall numerical precision used for geographical comparisons.
const GEO_PRECISION: f64 = 1e-10;
// Average radius of the Earth in kilometers (spherical model).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/* ---------------- NUMERIC UTILS -------------- */

// Rounding of a floating-point number to N decimal places (max 10).
pub fn round(value: f64, decimals: u32) -> f64 {
    let precision = decimals.min(10);
    let factor = 10_f64.powi(precision as i32);
    (value * factor).round() / factor
}

/* ---------------- GEO DISTANCE--------------- */

// Errors specific to Haversine calculation.
#[derive(Debug, thiserror::Error)]
pub enum HaversineError {
    #[error("invalid distance")]
    InvalidDistance,

    // A negative distance should never happen.
    #[error("negative distance `{dist}`")]
    NegativeDistance { dist: f64 },
}

// Great circle distance (Haversine) on a sphere of radius EARTH_RADIUS_KM.
// Inputs in decimal degrees, output in kilometers.
pub fn haversine(lat1_deg: f64, lon1_deg: f64, lat2_deg: f64, lon2_deg: f64) -> Result<f64, HaversineError> {
    let origin = Point::new(lon1_deg, lat1_deg);
    let destination = Point::new(lon2_deg, lat2_deg);

    let distance = HaversineMeasure::new(EARTH_RADIUS_KM).distance(origin, destination);

    if !distance.is_finite() {
        return Err(HaversineError::InvalidDistance);
    }
    if distance < -GEO_PRECISION {
        return Err(HaversineError::NegativeDistance { dist: distance });
    }

    Ok(distance)
}

/* ---------------- IDENTIFIERS --------------- */

// Builds an ASCII identifier from a Cyrillic title
// ("Тверская область" -> "tverskaya-oblast").
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.to_lowercase().chars() {
        match translit(ch) {
            Some(latin) => out.push_str(latin),
            None if ch.is_ascii_alphanumeric() => out.push(ch),
            None if ch.is_whitespace() || ch == '-' || ch == '_' => out.push('-'),
            None => {}
        }
    }

    let mut slug = String::with_capacity(out.len());
    for part in out.split('-').filter(|p| !p.is_empty()) {
        if !slug.is_empty() {
            slug.push('-');
        }
        slug.push_str(part);
    }

    if slug.is_empty() {
        "unnamed".to_string()
    } else {
        slug
    }
}

fn translit(ch: char) -> Option<&'static str> {
    let latin = match ch {
        'а' => "a", 'б' => "b", 'в' => "v", 'г' => "g", 'д' => "d", 'е' => "e", 'ё' => "yo",
        'ж' => "zh", 'з' => "z", 'и' => "i", 'й' => "y", 'к' => "k", 'л' => "l", 'м' => "m",
        'н' => "n", 'о' => "o", 'п' => "p", 'р' => "r", 'с' => "s", 'т' => "t", 'у' => "u",
        'ф' => "f", 'х' => "h", 'ц' => "ts", 'ч' => "ch", 'ш' => "sh", 'щ' => "sch", 'ъ' => "",
        'ы' => "y", 'ь' => "", 'э' => "e", 'ю' => "yu", 'я' => "ya",
        _ => return None,
    };
    Some(latin)
}

/* ---------------- TEST ---------------- */
