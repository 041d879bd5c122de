// src/feature.rs

use geo::{Coord, LineString, Point, Polygon};
use serde::Serialize;
use serde_json::{Value, json};

use crate::catalog::{DocumentId, RegionId};
use crate::sequence::GeoPoint;

/* ---------------- GEOMETRY ---------------- */

// x is longitude, y is latitude.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point<f64>),
    LineString(LineString<f64>),
    Polygon(Polygon<f64>),
}

impl Geometry {
    // Number of stored vertices, closing vertex of polygon rings included.
    pub fn vertex_count(&self) -> usize {
        match self {
            Geometry::Point(_) => 1,
            Geometry::LineString(line) => line.0.len(),
            Geometry::Polygon(poly) => {
                poly.exterior().0.len() + poly.interiors().iter().map(|r| r.0.len()).sum::<usize>()
            }
        }
    }

    fn to_geojson(&self) -> geojson::Value {
        match self {
            Geometry::Point(p) => geojson::Value::Point(vec![p.x(), p.y()]),
            Geometry::LineString(line) => geojson::Value::LineString(positions(line)),
            Geometry::Polygon(poly) => {
                let mut rings = Vec::with_capacity(1 + poly.interiors().len());
                rings.push(positions(poly.exterior()));
                rings.extend(poly.interiors().iter().map(positions));
                geojson::Value::Polygon(rings)
            }
        }
    }
}

fn positions(line: &LineString<f64>) -> Vec<Vec<f64>> {
    line.0.iter().map(|c: &Coord<f64>| vec![c.x, c.y]).collect()
}

// Role of a feature on the map, derived from its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    RestrictedArea,
    Route,
    Marker,
}

impl FeatureKind {
    pub fn of(geometry: &Geometry) -> Self {
        match geometry {
            Geometry::Polygon(_) => FeatureKind::RestrictedArea,
            Geometry::LineString(_) => FeatureKind::Route,
            Geometry::Point(_) => FeatureKind::Marker,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureKind::RestrictedArea => "restricted-area",
            FeatureKind::Route => "route",
            FeatureKind::Marker => "marker",
        }
    }

    // Default styling consumed by the map layer.
    fn style(self) -> Value {
        match self {
            FeatureKind::RestrictedArea => json!({
                "fillColor": "#ff0000",
                "fillOpacity": 0.3,
                "strokeColor": "#ff0000",
            }),
            FeatureKind::Route => json!({
                "color": "#ff0000",
                "width": 2,
            }),
            FeatureKind::Marker => json!({
                "color": "#ff0000",
                "radius": 1.5,
                "strokeColor": "#ff0000",
                "strokeWidth": 2,
            }),
        }
    }
}

/* ---------------- FEATURES ---------------- */

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureProperties {
    pub name: String,
    pub region: RegionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
    pub document: DocumentId,
    // Source excerpts of every point, in sequence order.
    pub originals: Vec<String>,
    pub indices: Vec<usize>,
    // Id of the feature this one was split or repaired from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_feature: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub label_heuristic: bool,
}

impl FeatureProperties {
    pub fn record_points(&mut self, points: &[GeoPoint]) {
        self.originals = points.iter().map(|p| p.original.clone()).collect();
        self.indices = points.iter().map(|p| p.index).collect();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: String,
    pub geometry: Geometry,
    pub properties: FeatureProperties,
}

impl Feature {
    pub fn kind(&self) -> FeatureKind {
        FeatureKind::of(&self.geometry)
    }

    pub fn to_geojson(&self) -> Result<geojson::Feature, serde_json::Error> {
        let Value::Object(mut properties) = serde_json::to_value(&self.properties)? else {
            return Err(serde::ser::Error::custom("feature properties must serialize to an object"));
        };

        let kind = self.kind();
        properties.insert("type".to_string(), Value::from(kind.as_str()));
        if let Value::Object(style) = kind.style() {
            properties.extend(style);
        }

        Ok(geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(self.geometry.to_geojson())),
            id: Some(geojson::feature::Id::String(self.id.clone())),
            properties: Some(properties),
            foreign_members: None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn to_geojson(&self) -> Result<geojson::FeatureCollection, serde_json::Error> {
        Ok(geojson::FeatureCollection {
            bbox: None,
            features: self.features.iter().map(Feature::to_geojson).collect::<Result<_, _>>()?,
            foreign_members: None,
        })
    }
}

/* ---------------- TEST ---------------- */
