// src/lib.rs

/*
Turns coordinate descriptions of fishing restriction zones, as printed in
regional regulations, into map features.

  catalog / table rows / free text
    -> DMS literals paired into points (dms, token, sequence)
    -> runs cut at implausible jumps (segment)
    -> Point / LineString / Polygon (classify)
    -> repaired polygons (sanitize)
    -> GeoJSON features plus diagnostics (feature, diagnostic)

`pipeline` wires the stages together.
*/

pub mod catalog;
pub mod classify;
pub mod config;
pub mod diagnostic;
pub mod dms;
pub mod feature;
pub mod pipeline;
pub mod sanitize;
pub mod segment;
pub mod sequence;
pub mod text;
pub mod token;
pub mod util;

pub use crate::catalog::{Catalog, Document, DocumentId, Region, RegionId, TableRecord, TableRow};
pub use crate::config::{ParserConfig, PatternError, PipelineConfig, SanitizeConfig, SegmentConfig};
pub use crate::diagnostic::{Diagnostic, DiagnosticKind};
pub use crate::feature::{Feature, FeatureCollection, FeatureKind, FeatureProperties, Geometry};
pub use crate::pipeline::{Pipeline, PipelineOutput};
