// src/catalog.rs

/*
Regions and their documents.

Documents point at their region by identifier. Features produced from a
document carry the same identifiers, and the region display name is looked
up in the region table when the feature is built.
*/

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::text::split_zones;
use crate::util::slug;

/* ---------------- IDENTIFIERS ---------------- */

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/* ---------------- TABLES ---------------- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<String>,
    // Zone name given apart from the cells (dash label of free text).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    // Label came from the dash-line heuristic of the free-text splitter.
    #[serde(default)]
    pub label_heuristic: bool,
}

impl TableRow {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TableRow {
            cells: cells.into_iter().map(Into::into).collect(),
            name: None,
            label_heuristic: false,
        }
    }

    // Zone label: the explicit name, otherwise every cell of the row joined by a space.
    pub fn label(&self) -> String {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        self.cells
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    // The coordinate list lives in the second column of location tables.
    pub fn coordinate_text(&self) -> &str {
        self.cells
            .get(1)
            .or_else(|| self.cells.first())
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub region: RegionId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub header: String,
    #[serde(default)]
    pub rows: Vec<TableRow>,
}

impl Document {
    // Spawning-season restriction orders mention "нерест" in their header.
    pub fn is_spawning_restriction(&self) -> bool {
        self.header.to_lowercase().contains("нерест")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub documents: Vec<Document>,
}

// One line of a flat location table.
#[derive(Debug, Clone, Deserialize)]
pub struct TableRecord {
    pub region: String,
    pub document: String,
    pub zone: String,
    pub coordinates: String,
}

impl Catalog {
    pub fn region(&self, id: &RegionId) -> Option<&Region> {
        self.regions.iter().find(|r| &r.id == id)
    }

    pub fn document(&self, id: &DocumentId) -> Option<&Document> {
        self.documents.iter().find(|d| &d.id == id)
    }

    // Keeps only spawning-season documents. Regions stay in the table.
    pub fn spawning_only(mut self) -> Self {
        self.documents.retain(Document::is_spawning_restriction);
        self
    }

    // Groups flat table records into regions and documents, keeping first-seen order.
    // Documents are told apart by their exact title within a region.
    pub fn from_table_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = TableRecord>,
    {
        let mut catalog = Catalog::default();
        let mut documents: HashMap<(RegionId, String), usize> = HashMap::new();

        for record in records {
            let region = catalog.ensure_region(&record.region);
            let title = record.document.trim().to_string();
            let key = (region.clone(), title.clone());

            let idx = match documents.get(&key) {
                Some(&idx) => idx,
                None => {
                    let id = catalog.new_document_id(&region, &title);
                    catalog.documents.push(Document {
                        id,
                        region,
                        title: title.clone(),
                        url: String::new(),
                        header: title,
                        rows: Vec::new(),
                    });
                    documents.insert(key, catalog.documents.len() - 1);
                    catalog.documents.len() - 1
                }
            };

            catalog.documents[idx]
                .rows
                .push(TableRow::new([record.zone, record.coordinates]));
        }

        catalog
    }

    // Single-document catalog built from free text.
    pub fn from_text(region_name: &str, document_title: &str, text: &str) -> Self {
        let mut catalog = Catalog::default();
        let region = catalog.ensure_region(region_name);

        let rows = split_zones(text)
            .into_iter()
            .map(|zone| TableRow {
                name: Some(zone.label.clone()).filter(|l| !l.is_empty()),
                cells: vec![zone.label, zone.body],
                label_heuristic: zone.label_heuristic,
            })
            .collect();

        let id = catalog.new_document_id(&region, document_title);
        catalog.documents.push(Document {
            id,
            region,
            title: document_title.to_string(),
            url: String::new(),
            header: document_title.to_string(),
            rows,
        });

        catalog
    }

    // Region of that exact name, created on first use.
    fn ensure_region(&mut self, name: &str) -> RegionId {
        let name = name.trim();
        if let Some(region) = self.regions.iter().find(|r| r.name == name) {
            return region.id.clone();
        }

        let id = RegionId(unique_id(slug(name), |c| self.regions.iter().any(|r| r.id.0 == c)));
        self.regions.push(Region {
            id: id.clone(),
            name: name.to_string(),
            title: String::new(),
            url: String::new(),
        });
        id
    }

    fn new_document_id(&self, region: &RegionId, title: &str) -> DocumentId {
        let base = format!("{}/{}", region, slug(title));
        DocumentId(unique_id(base, |c| self.documents.iter().any(|d| d.id.0 == c)))
    }
}

// Different titles may transliterate to the same slug; later ones get `-2`, `-3`...
fn unique_id(base: String, taken: impl Fn(&str) -> bool) -> String {
    if !taken(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/* ---------------- TEST ---------------- */
