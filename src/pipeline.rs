// src/pipeline.rs

/*
Zone processing order:

  text -> point sequence -> distance segmentation -> classification
       -> polygon sanitation -> features

Every zone is isolated: whatever goes wrong inside one zone ends up as
diagnostics next to whatever features could still be built. Documents are
independent and run in parallel; output keeps catalog order.
*/

use rayon::prelude::*;

use crate::catalog::{Catalog, Document, DocumentId, RegionId, TableRow};
use crate::classify::classify;
use crate::config::PipelineConfig;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::feature::{Feature, FeatureCollection, FeatureProperties, Geometry};
use crate::sanitize::sanitize_feature;
use crate::segment::segment_sequence;
use crate::sequence::build_sequence;

// Identity and references of one zone, copied onto each of its features.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneContext {
    pub feature_id: String,
    pub name: String,
    pub region: RegionId,
    pub region_name: Option<String>,
    pub document: DocumentId,
    pub label_heuristic: bool,
}

impl ZoneContext {
    fn properties(&self) -> FeatureProperties {
        FeatureProperties {
            name: self.name.clone(),
            region: self.region.clone(),
            region_name: self.region_name.clone(),
            document: self.document.clone(),
            originals: Vec::new(),
            indices: Vec::new(),
            source_feature: None,
            label_heuristic: self.label_heuristic,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneOutcome {
    pub features: Vec<Feature>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ZoneOutcome {
    fn append(&mut self, mut other: ZoneOutcome) {
        self.features.append(&mut other.features);
        self.diagnostics.append(&mut other.diagnostics);
    }

    fn in_document(mut self, document: &DocumentId) -> Self {
        self.diagnostics = self
            .diagnostics
            .into_iter()
            .map(|d| if d.document.is_none() { d.with_document(document) } else { d })
            .collect();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutput {
    pub collection: FeatureCollection,
    pub diagnostics: Vec<Diagnostic>,
}

impl PipelineOutput {
    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.kind.is_warning()).count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Pipeline { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    // Runs every stage on the coordinate text of one zone.
    pub fn process_zone(&self, zone: &ZoneContext, text: &str) -> ZoneOutcome {
        let mut outcome = ZoneOutcome::default();

        let (sequence, diagnostics) = build_sequence(&zone.name, text, &self.config.parser);
        outcome.diagnostics.extend(diagnostics);

        if sequence.is_empty() {
            if text.contains(['°', 'º', '˚']) && outcome.diagnostics.is_empty() {
                outcome.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::EmptyPointList,
                        &zone.name,
                        "degree signs present but no coordinate point recognized",
                    )
                    .with_offending(text.trim()),
                );
            }
            return outcome.in_document(&zone.document);
        }

        let (runs, diagnostic) = segment_sequence(&sequence, &self.config.segment);
        outcome.diagnostics.extend(diagnostic);

        let split = runs.len() > 1;
        for (n, run) in runs.iter().enumerate() {
            let Some(geometry) = classify(&run.points) else { continue };

            let mut properties = zone.properties();
            properties.record_points(&run.points);
            let id = if split {
                properties.source_feature = Some(zone.feature_id.clone());
                format!("{}.{}", zone.feature_id, n + 1)
            } else {
                zone.feature_id.clone()
            };

            let feature = Feature { id, geometry, properties };
            if self.config.sanitize.repair && matches!(feature.geometry, Geometry::Polygon(_)) {
                let (features, diagnostic) = sanitize_feature(feature, &self.config.sanitize);
                outcome.features.extend(features);
                outcome.diagnostics.extend(diagnostic);
            } else {
                outcome.features.push(feature);
            }
        }

        tracing::debug!(
            zone = %zone.name,
            points = sequence.len(),
            features = outcome.features.len(),
            "zone processed"
        );

        outcome.in_document(&zone.document)
    }

    // Processes every row of one document.
    pub fn process_document(&self, catalog: &Catalog, document: &Document) -> ZoneOutcome {
        let region_name = catalog.region(&document.region).map(|r| r.name.clone());
        if region_name.is_none() {
            tracing::warn!(document = %document.id, region = %document.region, "document refers to an unknown region");
        }

        let mut outcome = ZoneOutcome::default();
        for (row_index, row) in document.rows.iter().enumerate() {
            let zone = zone_context(document, row, row_index, region_name.clone());
            outcome.append(self.process_zone(&zone, row.coordinate_text()));
        }
        outcome
    }

    // Processes the whole catalog, documents in parallel.
    pub fn run_catalog(&self, catalog: &Catalog) -> PipelineOutput {
        let outcomes: Vec<ZoneOutcome> = catalog
            .documents
            .par_iter()
            .map(|document| self.process_document(catalog, document))
            .collect();

        let mut output = PipelineOutput::default();
        for outcome in outcomes {
            output.collection.features.extend(outcome.features);
            output.diagnostics.extend(outcome.diagnostics);
        }

        tracing::info!(
            documents = catalog.documents.len(),
            features = output.collection.len(),
            diagnostics = output.diagnostics.len(),
            "catalog processed"
        );
        output
    }

    // Free text of a single document.
    pub fn run_text(&self, region: &str, document: &str, text: &str) -> PipelineOutput {
        self.run_catalog(&Catalog::from_text(region, document, text))
    }
}

fn zone_context(document: &Document, row: &TableRow, row_index: usize, region_name: Option<String>) -> ZoneContext {
    ZoneContext {
        feature_id: format!("{}#{}", document.id, row_index + 1),
        name: row.label(),
        region: document.region.clone(),
        region_name,
        document: document.id.clone(),
        label_heuristic: row.label_heuristic,
    }
}

/* ---------------- TEST ---------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TableRecord;
    use crate::config::SegmentConfig;

    fn context() -> ZoneContext {
        ZoneContext {
            feature_id: "doc#1".to_string(),
            name: "р. Тьма".to_string(),
            region: RegionId("tver".to_string()),
            region_name: Some("Тверская область".to_string()),
            document: DocumentId("doc".to_string()),
            label_heuristic: false,
        }
    }

    fn record(document: &str, zone: &str, coordinates: &str) -> TableRecord {
        TableRecord {
            region: "Тверская область".to_string(),
            document: document.to_string(),
            zone: zone.to_string(),
            coordinates: coordinates.to_string(),
        }
    }

    const SQUARE: &str = "1. 56°00'00\" с.ш. 35°00'00\" в.д. \
                          2. 56°00'00\" с.ш. 35°01'00\" в.д. \
                          3. 56°01'00\" с.ш. 35°01'00\" в.д. \
                          4. 56°01'00\" с.ш. 35°00'00\" в.д.";

    #[test]
    fn test_empty_input_yields_nothing() {
        let output = Pipeline::default().run_text("r", "d", "");
        assert!(output.collection.is_empty());
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_single_point_zone() {
        let outcome = Pipeline::default().process_zone(&context(), "56°00'00\" с.ш. 35°00'00\" в.д.");
        assert_eq!(outcome.features.len(), 1);
        assert!(matches!(outcome.features[0].geometry, Geometry::Point(_)));
        assert_eq!(outcome.features[0].id, "doc#1");
    }

    #[test]
    fn test_square_zone_is_closed_polygon() {
        let outcome = Pipeline::default().process_zone(&context(), SQUARE);
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(outcome.features.len(), 1);

        let feature = &outcome.features[0];
        let Geometry::Polygon(poly) = &feature.geometry else {
            panic!("expected a polygon");
        };
        assert_eq!(poly.exterior().0.len(), 5);
        assert_eq!(poly.exterior().0.first(), poly.exterior().0.last());
        assert_eq!(feature.properties.indices, vec![1, 2, 3, 4]);
        assert_eq!(feature.properties.region_name.as_deref(), Some("Тверская область"));
        assert!(feature.properties.source_feature.is_none());
    }

    #[test]
    fn test_far_jump_splits_into_polygon_and_line() {
        // Third and fourth points are about 500 km apart.
        let text = "1. 56°00'00\" с.ш. 35°00'00\" в.д. \
                    2. 56°00'00\" с.ш. 35°01'00\" в.д. \
                    3. 56°01'00\" с.ш. 35°01'00\" в.д. \
                    4. 60°30'00\" с.ш. 35°01'00\" в.д. \
                    5. 60°31'00\" с.ш. 35°02'00\" в.д.";
        let outcome = Pipeline::default().process_zone(&context(), text);

        assert_eq!(outcome.features.len(), 2);
        assert!(matches!(outcome.features[0].geometry, Geometry::Polygon(_)));
        assert!(matches!(outcome.features[1].geometry, Geometry::LineString(_)));
        assert_eq!(outcome.features[0].id, "doc#1.1");
        assert_eq!(outcome.features[1].properties.source_feature.as_deref(), Some("doc#1"));

        let vertices: usize = outcome
            .features
            .iter()
            .map(|f| match &f.geometry {
                Geometry::Polygon(p) => p.exterior().0.len() - 1,
                other => other.vertex_count(),
            })
            .sum();
        assert_eq!(vertices, 5);

        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].kind, DiagnosticKind::AnomalousSegmentDistance);
        assert_eq!(outcome.diagnostics[0].document, Some(DocumentId("doc".to_string())));
    }

    #[test]
    fn test_bow_tie_zone_is_decomposed() {
        let text = "1. 56°00'00\" с.ш. 35°00'00\" в.д. \
                    2. 56°02'00\" с.ш. 35°02'00\" в.д. \
                    3. 56°00'00\" с.ш. 35°02'00\" в.д. \
                    4. 56°02'00\" с.ш. 35°00'00\" в.д.";
        let outcome = Pipeline::default().process_zone(&context(), text);

        assert_eq!(outcome.features.len(), 2);
        assert!(outcome.features.iter().all(|f| f.properties.source_feature.as_deref() == Some("doc#1")));
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_repair_disabled_keeps_bow_tie() {
        let text = "1. 56°00'00\" с.ш. 35°00'00\" в.д. \
                    2. 56°02'00\" с.ш. 35°02'00\" в.д. \
                    3. 56°00'00\" с.ш. 35°02'00\" в.д. \
                    4. 56°02'00\" с.ш. 35°00'00\" в.д.";
        let mut config = PipelineConfig::default();
        config.sanitize.repair = false;
        let outcome = Pipeline::new(config).process_zone(&context(), text);
        assert_eq!(outcome.features.len(), 1);
    }

    #[test]
    fn test_degree_sign_without_points_is_reported() {
        let outcome = Pipeline::default().process_zone(&context(), "в районе 56° северной широты");
        assert!(outcome.features.is_empty());
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].kind, DiagnosticKind::EmptyPointList);
    }

    #[test]
    fn test_plain_text_without_coordinates_is_silent() {
        let outcome = Pipeline::default().process_zone(&context(), "по всей акватории водоема");
        assert_eq!(outcome, ZoneOutcome::default());
    }

    #[test]
    fn test_run_catalog_keeps_document_order() {
        let catalog = Catalog::from_table_records(vec![
            record("Приказ 1", "A", SQUARE),
            record("Приказ 1", "B", "56°00'00\" с.ш. 35°00'00\" в.д."),
            record("Приказ 2", "C", "нет координат"),
            record("Приказ 3", "D", "56°00'00\" с.ш. 35°00'00\" в.д. 56°01'00\" с.ш. 35°01'00\" в.д."),
        ]);
        let output = Pipeline::default().run_catalog(&catalog);

        let ids: Vec<_> = output.collection.features.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "tverskaya-oblast/prikaz-1#1",
                "tverskaya-oblast/prikaz-1#2",
                "tverskaya-oblast/prikaz-3#1",
            ]
        );
        assert!(output.collection.features[0].properties.name.starts_with("A "));
        assert_eq!(output.warning_count(), 0);
    }

    #[test]
    fn test_run_text_with_dash_labels() {
        let text = "- р. Тьма:\n\
                    1. 56°51'40\" с.ш. 35°54'10\" в.д.\n\
                    2. 56°51'02\" с.ш. 35°55'31\" в.д.\n";
        let output = Pipeline::default().run_text("Тверская область", "Нерест", text);

        assert_eq!(output.collection.len(), 1);
        let feature = &output.collection.features[0];
        assert!(matches!(feature.geometry, Geometry::LineString(_)));
        assert!(feature.properties.label_heuristic);
        assert_eq!(feature.properties.name, "р. Тьма");
    }

    #[test]
    fn test_run_text_zone_without_ordinal_is_kept() {
        let text = "- р. А:\n\
                    1. 56°51'40\" с.ш. 35°54'10\" в.д.\n\
                    - р. Б:\n\
                    57°10'00\" с.ш. 33°05'00\" в.д.\n";
        let output = Pipeline::default().run_text("r", "d", text);

        let names: Vec<_> = output.collection.features.iter().map(|f| f.properties.name.as_str()).collect();
        assert_eq!(names, vec!["р. А", "р. Б"]);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_run_text_reports_broken_degree_line() {
        let text = "- р. А:\n56° северной широты\n";
        let output = Pipeline::default().run_text("r", "d", text);
        assert!(output.collection.is_empty());
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].kind, DiagnosticKind::EmptyPointList);
        assert_eq!(output.diagnostics[0].zone, "р. А");
    }

    #[test]
    fn test_alternate_threshold_from_config() {
        let mut config = PipelineConfig::default();
        config.segment = SegmentConfig { max_edge_km: 1.0 };
        let outcome = Pipeline::new(config).process_zone(&context(), SQUARE);
        // Every edge of the square is about 1.1-1.9 km long.
        assert_eq!(outcome.features.len(), 4);
        assert!(outcome.features.iter().all(|f| matches!(f.geometry, Geometry::Point(_))));
    }
}
