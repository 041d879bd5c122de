// src/text.rs

/*
Free-text zone splitting.

Coordinate lists in running text look like

    - р. Волга от устья до моста:
    1. 56°51'40" с.ш. 35°54'10" в.д.
    2. 56°51'02" с.ш. 35°55'31" в.д.

A line starting with a dash names the zone whose coordinate lines follow.
The ordinal in front of a coordinate line is optional. This is a lossy heuristic: a dash also starts hyphenated names and
list items. Dashes directly followed by a digit are never treated as labels,
and every label found this way is flagged so consumers can tell it apart
from a table-provided one.
*/

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

// Table headers copied into the text along with the coordinate lists.
const HEADER_MARKERS: &[&str] = &["Наименование", "Место расположения"];

const DEGREE_SIGNS: [char; 3] = ['°', 'º', '˚'];

// Any degree-bearing line belongs to the coordinate block, numbered or not and
// well-formed or not; the pipeline reports what it cannot use.
fn is_coordinate_line(line: &str) -> bool {
    line.contains(DEGREE_SIGNS)
}

// Only spans that actually need rewriting: runs, or a single non-space blank.
static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s{2,}|[^\S ]").expect("Invalid whitespace regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneText {
    pub label: String,
    pub body: String,
    pub label_heuristic: bool,
}

// Collapses runs of whitespace (including line breaks and NBSP) to one space.
pub fn normalize_whitespace(text: &str) -> Cow<'_, str> {
    let trimmed = text.trim();
    match WHITESPACE_RE.replace_all(trimmed, " ") {
        Cow::Borrowed(_) => Cow::Borrowed(trimmed),
        Cow::Owned(s) => Cow::Owned(s),
    }
}

// Splits free text into zone blocks. Text without any degree-bearing line
// comes back as a single unlabelled zone.
pub fn split_zones(text: &str) -> Vec<ZoneText> {
    let mut zones = Vec::new();
    let mut block: Vec<&str> = Vec::new();
    let mut label = String::new();
    let mut label_heuristic = false;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if HEADER_MARKERS.iter().any(|m| line.contains(m)) {
            continue;
        }

        if let Some(name) = dash_label(line) {
            flush(&mut zones, &mut block, &label, label_heuristic);
            label = name;
            label_heuristic = true;
            // "- р. Б 57°10'00" с.ш. ..." opens the zone and starts its block.
            if is_coordinate_line(line) {
                block.push(line);
            }
            continue;
        }

        if is_coordinate_line(line) {
            block.push(line);
            continue;
        }

        flush(&mut zones, &mut block, &label, label_heuristic);
    }
    flush(&mut zones, &mut block, &label, label_heuristic);

    if zones.is_empty() && !text.trim().is_empty() {
        zones.push(ZoneText {
            label: String::new(),
            body: normalize_whitespace(text).into_owned(),
            label_heuristic: false,
        });
    }

    zones
}

fn flush(zones: &mut Vec<ZoneText>, block: &mut Vec<&str>, label: &str, label_heuristic: bool) {
    if block.is_empty() {
        return;
    }
    zones.push(ZoneText {
        label: label.to_string(),
        body: block.join(" "),
        label_heuristic,
    });
    block.clear();
}

fn dash_label(line: &str) -> Option<String> {
    let rest = line
        .strip_prefix('-')
        .or_else(|| line.strip_prefix('–'))
        .or_else(|| line.strip_prefix('—'))?;

    if rest.trim_start().starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let name = rest.trim();
    let name = name.strip_suffix(':').unwrap_or(name).trim_end();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/* ---------------- TEST ---------------- */
