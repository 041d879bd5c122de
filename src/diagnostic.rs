// src/diagnostic.rs

use serde::Serialize;

use crate::catalog::DocumentId;

// Non-fatal conditions raised while turning one zone into features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    // DMS literal that could not be converted; the point is dropped.
    MalformedCoordinateToken,
    // Latitude without an immediately following longitude, or the reverse.
    UnmatchedPair,
    // Text carries a degree sign but no point could be extracted.
    EmptyPointList,
    // Consecutive vertices too far apart; the sequence was split.
    AnomalousSegmentDistance,
    // Self-intersection decomposition failed; original polygon kept.
    PolygonRepairFailure,
}

impl DiagnosticKind {
    pub fn is_warning(self) -> bool {
        !matches!(self, DiagnosticKind::EmptyPointList)
    }
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DiagnosticKind::MalformedCoordinateToken => "malformed coordinate token",
            DiagnosticKind::UnmatchedPair => "unmatched coordinate pair",
            DiagnosticKind::EmptyPointList => "empty point list",
            DiagnosticKind::AnomalousSegmentDistance => "anomalous segment distance",
            DiagnosticKind::PolygonRepairFailure => "polygon repair failure",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub offending: Option<String>,
    pub zone: String,
    pub document: Option<DocumentId>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, zone: &str, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            message: message.into(),
            offending: None,
            zone: zone.to_string(),
            document: None,
        }
    }

    pub fn with_offending(mut self, text: impl Into<String>) -> Self {
        self.offending = Some(text.into());
        self
    }

    pub fn with_document(mut self, document: &DocumentId) -> Self {
        self.document = Some(document.clone());
        self
    }

    // Emits the diagnostic as a tracing event.
    pub fn log(&self) {
        let document = self.document.as_ref().map(|d| d.0.as_str()).unwrap_or("-");
        let offending = self.offending.as_deref().unwrap_or("");
        if self.kind.is_warning() {
            tracing::warn!(kind = %self.kind, zone = %self.zone, document, offending, "{}", self.message);
        } else {
            tracing::info!(kind = %self.kind, zone = %self.zone, document, offending, "{}", self.message);
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} in zone `{}`: {}", self.kind, self.zone, self.message)?;
        if let Some(text) = &self.offending {
            write!(f, " ({text})")?;
        }
        Ok(())
    }
}
