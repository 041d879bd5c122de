// src/classify.rs

use geo::{Coord, LineString, Point, Polygon};

use crate::feature::Geometry;
use crate::sequence::GeoPoint;

fn coord(p: &GeoPoint) -> Coord<f64> {
    Coord { x: p.lon, y: p.lat }
}

// Geometry of a point sequence, decided by its length alone:
// 0 -> none, 1 -> Point, 2 -> LineString, 3+ -> Polygon with a closed ring.
pub fn classify(points: &[GeoPoint]) -> Option<Geometry> {
    match points {
        [] => None,
        [p] => Some(Geometry::Point(Point::from(coord(p)))),
        [a, b] => Some(Geometry::LineString(LineString::new(vec![coord(a), coord(b)]))),
        _ => {
            let mut ring: Vec<Coord<f64>> = points.iter().map(coord).collect();
            if ring.first() != ring.last() {
                ring.push(ring[0]);
            }
            Some(Geometry::Polygon(Polygon::new(LineString::new(ring), vec![])))
        }
    }
}
